// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.
use super::{
    combine_crc, plan_parts, Part, DEFAULT_PARALLEL, DEFAULT_PART_SIZE, MAX_PARTS, MIN_PART_SIZE,
};
use crate::api::multipart::{
    AbortMultipartUploadRequest, CompleteMultipartUploadRequest, CompleteMultipartUploadResult,
    InitiateMultipartUploadRequest, UploadPart, UploadPartRequest,
};
use crate::api::object_basic::{ObjectOptions, PutObjectRequest};
use crate::Client;
use alioss_core::crc64::crc64;
use alioss_core::{Error, Result};
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use log::{debug, warn};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Where an uploaded object goes.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub bucket: String,
    pub key: String,
    /// Applied to the single `PutObject` or to `InitiateMultipartUpload`.
    pub options: ObjectOptions,
}

impl UploadRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            options: ObjectOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ObjectOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct UploadResult {
    pub etag: Option<String>,
    pub version_id: Option<String>,
    pub hash_crc64: Option<u64>,
    /// Set when the object was uploaded in parts.
    pub upload_id: Option<String>,
}

enum Source {
    Bytes(Bytes),
    File(PathBuf),
}

impl Source {
    async fn read(&self, offset: u64, len: u64) -> Result<Bytes> {
        match self {
            Source::Bytes(data) => Ok(data.slice(offset as usize..(offset + len) as usize)),
            Source::File(path) => {
                let mut file = tokio::fs::File::open(path).await?;
                file.seek(SeekFrom::Start(offset)).await?;
                let mut buf = vec![0; len as usize];
                file.read_exact(&mut buf).await?;
                Ok(buf.into())
            }
        }
    }
}

/// Uploader sends large objects as concurrently uploaded parts.
///
/// Objects no larger than one part are sent with a single `PutObject`.
///
/// ```no_run
/// use alioss::{Client, UploadRequest, Uploader};
///
/// # async fn example(client: Client) -> alioss_core::Result<()> {
/// let uploader = Uploader::new(client).with_parallel(4);
/// let result = uploader
///     .upload_file(UploadRequest::new("examplebucket", "backup.tar"), "/tmp/backup.tar")
///     .await?;
/// println!("uploaded with crc64 {:?}", result.hash_crc64);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Uploader {
    client: Client,
    part_size: u64,
    parallel: usize,
    leave_parts_on_error: bool,
}

impl Uploader {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            part_size: DEFAULT_PART_SIZE,
            parallel: DEFAULT_PARALLEL,
            leave_parts_on_error: false,
        }
    }

    /// Set the part size, raised to 100 KiB at least.
    pub fn with_part_size(mut self, part_size: u64) -> Self {
        self.part_size = part_size.max(MIN_PART_SIZE);
        self
    }

    /// Set the number of parts uploaded at the same time.
    pub fn with_parallel(mut self, parallel: usize) -> Self {
        self.parallel = parallel.max(1);
        self
    }

    /// Keep the uploaded parts when the upload fails instead of aborting it.
    pub fn with_leave_parts_on_error(mut self, leave: bool) -> Self {
        self.leave_parts_on_error = leave;
        self
    }

    /// Upload an in memory object.
    pub async fn upload(
        &self,
        request: UploadRequest,
        body: impl Into<Bytes>,
    ) -> Result<UploadResult> {
        let body = body.into();
        let size = body.len() as u64;
        self.upload_source(request, Source::Bytes(body), size).await
    }

    /// Upload the content of a local file.
    pub async fn upload_file(
        &self,
        request: UploadRequest,
        path: impl AsRef<Path>,
    ) -> Result<UploadResult> {
        let path = path.as_ref().to_path_buf();
        let size = tokio::fs::metadata(&path).await?.len();
        self.upload_source(request, Source::File(path), size).await
    }

    /// Part size used for an object of `size` bytes.
    fn part_size_for(&self, size: u64) -> u64 {
        self.part_size.max(size.div_ceil(MAX_PARTS))
    }

    async fn upload_source(
        &self,
        request: UploadRequest,
        source: Source,
        size: u64,
    ) -> Result<UploadResult> {
        let part_size = self.part_size_for(size);
        if size <= part_size {
            let body = source.read(0, size).await?;
            let result = self
                .client
                .put_object(
                    PutObjectRequest::new(request.bucket, request.key, body)
                        .with_options(request.options),
                )
                .await?;
            return Ok(UploadResult {
                etag: result.etag,
                version_id: result.version_id,
                hash_crc64: result.hash_crc64,
                upload_id: None,
            });
        }

        let init = self
            .client
            .initiate_multipart_upload(
                InitiateMultipartUploadRequest::new(&request.bucket, &request.key)
                    .with_options(request.options.clone()),
            )
            .await?;
        let upload_id = init.upload_id;
        debug!(
            "upload {}/{}: {size} bytes in parts of {part_size} as {upload_id}",
            request.bucket, request.key
        );

        let (complete, crc) = match self
            .upload_parts(&request, &source, &upload_id, size, part_size)
            .await
        {
            Ok(v) => v,
            Err(err) => {
                if !self.leave_parts_on_error {
                    self.abort(&request, &upload_id).await;
                }
                return Err(err);
            }
        };

        if !self.client.config().disable_upload_crc64_check {
            if let Some(server) = complete.hash_crc64 {
                if server != crc {
                    return Err(Error::checksum_mismatch(format!(
                        "upload {}/{}: crc64 mismatch, client {crc}, server {server}",
                        request.bucket, request.key
                    )));
                }
            }
        }

        Ok(UploadResult {
            etag: complete.etag,
            version_id: complete.version_id,
            hash_crc64: Some(crc),
            upload_id: Some(upload_id),
        })
    }

    async fn upload_parts(
        &self,
        request: &UploadRequest,
        source: &Source,
        upload_id: &str,
        size: u64,
        part_size: u64,
    ) -> Result<(CompleteMultipartUploadResult, u64)> {
        let mut uploaded: Vec<(Part, String, u64)> =
            futures::stream::iter(plan_parts(size, part_size))
                .map(|part| async move {
                    let body = source.read(part.offset, part.len).await?;
                    let crc = crc64(&body);
                    let result = self
                        .client
                        .upload_part(UploadPartRequest::new(
                            request.bucket.as_str(),
                            request.key.as_str(),
                            upload_id,
                            part.number,
                            body,
                        ))
                        .await?;
                    let etag = result.etag.ok_or_else(|| {
                        Error::response_invalid(format!("part {} has no etag", part.number))
                    })?;
                    Ok::<_, Error>((part, etag, crc))
                })
                .buffer_unordered(self.parallel)
                .try_collect()
                .await?;
        uploaded.sort_by_key(|(part, ..)| part.number);

        let crc = combine_crc(uploaded.iter().map(|(part, _, crc)| (*crc, part.len)));
        let parts = uploaded
            .into_iter()
            .map(|(part, etag, _)| UploadPart::new(part.number, etag))
            .collect();
        let complete = self
            .client
            .complete_multipart_upload(CompleteMultipartUploadRequest::new(
                request.bucket.as_str(),
                request.key.as_str(),
                upload_id,
                parts,
            ))
            .await?;
        Ok((complete, crc))
    }

    async fn abort(&self, request: &UploadRequest, upload_id: &str) {
        let abort = AbortMultipartUploadRequest::new(
            request.bucket.as_str(),
            request.key.as_str(),
            upload_id,
        );
        if let Err(err) = self.client.abort_multipart_upload(abort).await {
            warn!("abort upload {upload_id} of {}/{} failed: {err}", request.bucket, request.key);
        }
    }
}
