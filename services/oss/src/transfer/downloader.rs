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
use super::{combine_crc, plan_parts, Part, DEFAULT_PARALLEL, DEFAULT_PART_SIZE};
use crate::api::object_basic::{GetObjectRequest, HeadObjectRequest};
use crate::Client;
use alioss_core::crc64::crc64;
use alioss_core::{Error, Result};
use futures::{StreamExt, TryStreamExt};
use log::{debug, warn};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

/// The object to download.
#[derive(Debug, Clone, Default)]
pub struct DownloadRequest {
    pub bucket: String,
    pub key: String,
    pub version_id: Option<String>,
}

impl DownloadRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            version_id: None,
        }
    }

    pub fn with_version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct DownloadResult {
    pub content_length: u64,
    pub etag: Option<String>,
    pub version_id: Option<String>,
    /// Checksum computed over the downloaded bytes.
    pub hash_crc64: u64,
}

/// Downloader fetches an object into a local file with concurrent ranged
/// reads.
///
/// Every range is requested with `If-Match` on the ETag seen by the initial
/// `HeadObject`, so an object replaced during the download fails it. Data is
/// written to a temporary file next to the target which is renamed once the
/// checksum is verified.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    part_size: u64,
    parallel: usize,
}

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            part_size: DEFAULT_PART_SIZE,
            parallel: DEFAULT_PARALLEL,
        }
    }

    pub fn with_part_size(mut self, part_size: u64) -> Self {
        self.part_size = part_size.max(1);
        self
    }

    pub fn with_parallel(mut self, parallel: usize) -> Self {
        self.parallel = parallel.max(1);
        self
    }

    /// Download the object into `path`, replacing any existing file.
    pub async fn download_file(
        &self,
        request: DownloadRequest,
        path: impl AsRef<Path>,
    ) -> Result<DownloadResult> {
        let path = path.as_ref();
        let mut head = HeadObjectRequest::new(request.bucket.as_str(), request.key.as_str());
        head.version_id = request.version_id.clone();
        let head = self.client.head_object(head).await?;
        let size = head.content_length.ok_or_else(|| {
            Error::response_invalid(format!(
                "download {}/{}: content length is missing",
                request.bucket, request.key
            ))
        })?;
        debug!(
            "download {}/{}: {size} bytes in parts of {}",
            request.bucket, request.key, self.part_size
        );

        let temp = temp_path(path);
        let crc = match self
            .download_parts(&request, head.etag.as_deref(), &temp, size)
            .await
        {
            Ok(crc) => crc,
            Err(err) => {
                remove_temp(&temp).await;
                return Err(err);
            }
        };

        if !self.client.config().disable_download_crc64_check {
            if let Some(server) = head.hash_crc64 {
                if server != crc {
                    remove_temp(&temp).await;
                    return Err(Error::checksum_mismatch(format!(
                        "download {}/{}: crc64 mismatch, client {crc}, server {server}",
                        request.bucket, request.key
                    )));
                }
            }
        }

        tokio::fs::rename(&temp, path).await?;
        Ok(DownloadResult {
            content_length: size,
            etag: head.etag,
            version_id: head.version_id,
            hash_crc64: crc,
        })
    }

    async fn download_parts(
        &self,
        request: &DownloadRequest,
        etag: Option<&str>,
        temp: &Path,
        size: u64,
    ) -> Result<u64> {
        let file = tokio::fs::File::create(temp).await?;
        file.set_len(size).await?;
        drop(file);

        let mut parts: Vec<(Part, u64)> = futures::stream::iter(plan_parts(size, self.part_size))
            .map(|part| async move {
                let crc = self.download_part(request, etag, temp, part).await?;
                Ok::<_, Error>((part, crc))
            })
            .buffer_unordered(self.parallel)
            .try_collect()
            .await?;
        parts.sort_by_key(|(part, _)| part.number);
        Ok(combine_crc(parts.iter().map(|(part, crc)| (*crc, part.len))))
    }

    async fn download_part(
        &self,
        request: &DownloadRequest,
        etag: Option<&str>,
        temp: &Path,
        part: Part,
    ) -> Result<u64> {
        let mut get = GetObjectRequest::new(request.bucket.as_str(), request.key.as_str())
            .with_range(part.offset, Some(part.offset + part.len - 1));
        get.version_id = request.version_id.clone();
        if let Some(etag) = etag {
            get = get.with_if_match(etag);
        }
        let result = self.client.get_object(get).await?;
        if result.body.len() as u64 != part.len {
            return Err(Error::response_invalid(format!(
                "download {}/{}: part {} expects {} bytes, got {}",
                request.bucket,
                request.key,
                part.number,
                part.len,
                result.body.len()
            )));
        }

        let mut file = tokio::fs::OpenOptions::new().write(true).open(temp).await?;
        file.seek(SeekFrom::Start(part.offset)).await?;
        file.write_all(&result.body).await?;
        file.flush().await?;
        Ok(crc64(&result.body))
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".alioss-download");
    PathBuf::from(name)
}

async fn remove_temp(temp: &Path) {
    if let Err(err) = tokio::fs::remove_file(temp).await {
        warn!("remove {} failed: {err}", temp.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provide_credential::StaticCredentialProvider;
    use crate::retry::NopRetryer;
    use crate::testing::MockHttpSend;
    use crate::Config;
    use alioss_core::{Context, ErrorKind};
    use http::header::{IF_MATCH, RANGE};

    const DATA: &[u8] = b"hello world!";

    fn client(http: MockHttpSend) -> Client {
        Client::new(Context::new().with_http_send(http), Config::new("cn-hangzhou"))
            .unwrap()
            .with_credential_provider(StaticCredentialProvider::new("ak", "sk"))
            .unwrap()
            .with_retryer(NopRetryer)
    }

    fn mock(crc: &str) -> MockHttpSend {
        let len = DATA.len().to_string();
        MockHttpSend::new()
            .with_response_headers(
                200,
                &[
                    ("Content-Length", len.as_str()),
                    ("ETag", "\"object-etag\""),
                    ("x-oss-hash-crc64ecma", crc),
                ],
                "",
            )
            .with_response(206, &DATA[0..5])
            .with_response(206, &DATA[5..10])
            .with_response(206, &DATA[10..])
    }

    #[tokio::test]
    async fn test_download_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("object.txt");
        let http = mock(&crc64(DATA).to_string());
        let downloader = Downloader::new(client(http.clone()))
            .with_part_size(5)
            .with_parallel(1);

        let result = downloader
            .download_file(DownloadRequest::new("bucket", "object.txt"), &target)
            .await
            .unwrap();
        assert_eq!(result.content_length, 12);
        assert_eq!(result.hash_crc64, crc64(DATA));
        assert_eq!(tokio::fs::read(&target).await.unwrap(), DATA);
        assert!(!temp_path(&target).exists());

        let reqs = http.requests();
        assert_eq!(reqs.len(), 4);
        assert_eq!(reqs[1].headers()[RANGE], "bytes=0-4");
        assert_eq!(reqs[3].headers()[RANGE], "bytes=10-11");
        assert_eq!(reqs[2].headers()[IF_MATCH], "\"object-etag\"");
    }

    #[tokio::test]
    async fn test_download_crc_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("object.txt");
        let downloader = Downloader::new(client(mock("1")))
            .with_part_size(5)
            .with_parallel(1);

        let err = downloader
            .download_file(DownloadRequest::new("bucket", "object.txt"), &target)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ChecksumMismatch);
        assert!(!target.exists());
        assert!(!temp_path(&target).exists());
    }

    #[tokio::test]
    async fn test_download_short_part() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("object.txt");
        let http = MockHttpSend::new()
            .with_response_headers(200, &[("Content-Length", "12")], "")
            .with_response(206, "hello");
        let downloader = Downloader::new(client(http)).with_parallel(1);

        let err = downloader
            .download_file(DownloadRequest::new("bucket", "object.txt"), &target)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseInvalid);
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_download_empty_object() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("empty.txt");
        let http = MockHttpSend::new().with_response_headers(
            200,
            &[("Content-Length", "0"), ("x-oss-hash-crc64ecma", "0")],
            "",
        );
        let downloader = Downloader::new(client(http.clone()));

        let result = downloader
            .download_file(DownloadRequest::new("bucket", "empty.txt"), &target)
            .await
            .unwrap();
        assert_eq!(result.content_length, 0);
        assert_eq!(tokio::fs::read(&target).await.unwrap(), b"");
        assert_eq!(http.requests().len(), 1);
    }
}
