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
//! Multipart uploads.
//!
//! An upload is initiated, its parts are uploaded independently in any order,
//! and it is completed with the list of part numbers and ETags. See
//! [`Uploader`](crate::transfer::Uploader) for a driver.

use super::de_opt_time;
use super::object_basic::{copy_source, ObjectOptions};
use crate::constants::*;
use crate::operation::{
    url_decode, CrcCheck, FromOperationOutput, Operation, OperationInput, OperationOutput,
    ResultCommon,
};
use crate::paginator::PaginatedRequest;
use crate::types::{Acl, EncodingType, StorageClass};
use alioss_core::Result;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::{ETAG, LAST_MODIFIED};
use http::Method;
use serde::{Deserialize, Serialize};

fn decode_if(encoded: bool, value: &mut String) -> Result<()> {
    if encoded {
        *value = url_decode(value)?;
    }
    Ok(())
}

fn decode_opt_if(encoded: bool, value: &mut Option<String>) -> Result<()> {
    match value.as_mut() {
        Some(v) => decode_if(encoded, v),
        None => Ok(()),
    }
}

/// Start a multipart upload.
#[derive(Debug, Clone, Default)]
pub struct InitiateMultipartUploadRequest {
    pub bucket: String,
    pub key: String,
    pub options: ObjectOptions,
}

impl InitiateMultipartUploadRequest {
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

impl Operation for InitiateMultipartUploadRequest {
    type Output = InitiateMultipartUploadResult;

    fn into_input(self) -> Result<OperationInput> {
        let input = OperationInput::new("InitiateMultipartUpload", Method::POST)
            .with_bucket(self.bucket)
            .with_key(self.key)
            .with_sub_resource("uploads")
            .with_param("encoding-type", EncodingType::Url);
        self.options.apply(input)
    }
}

/// Result of `InitiateMultipartUpload`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InitiateMultipartUploadResult {
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub upload_id: String,
    #[serde(default)]
    pub encoding_type: Option<EncodingType>,
    #[serde(skip)]
    pub common: ResultCommon,
}

impl FromOperationOutput for InitiateMultipartUploadResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        let mut result: Self = output.xml()?;
        let encoded = result.encoding_type == Some(EncodingType::Url);
        decode_if(encoded, &mut result.key)?;
        result.common = output.common();
        Ok(result)
    }
}

/// Upload one part, numbered from 1 to 10000.
#[derive(Debug, Clone, Default)]
pub struct UploadPartRequest {
    pub bucket: String,
    pub key: String,
    pub upload_id: String,
    pub part_number: u32,
    pub body: Bytes,
    pub content_md5: Option<String>,
    pub traffic_limit: Option<u64>,
}

impl UploadPartRequest {
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        upload_id: impl Into<String>,
        part_number: u32,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            upload_id: upload_id.into(),
            part_number,
            body: body.into(),
            ..Default::default()
        }
    }
}

impl Operation for UploadPartRequest {
    type Output = UploadPartResult;

    fn into_input(self) -> Result<OperationInput> {
        OperationInput::new("UploadPart", Method::PUT)
            .with_bucket(self.bucket)
            .with_key(self.key)
            .with_param("partNumber", self.part_number)
            .with_param("uploadId", self.upload_id)
            .with_body(self.body)
            .with_crc_check(CrcCheck::Upload)
            .with_header_opt(CONTENT_MD5, self.content_md5)?
            .with_header_opt(X_OSS_TRAFFIC_LIMIT, self.traffic_limit)
    }
}

/// Result of `UploadPart`.
#[derive(Debug, Clone, Default)]
pub struct UploadPartResult {
    pub etag: Option<String>,
    pub hash_crc64: Option<u64>,
    pub content_md5: Option<String>,
    pub common: ResultCommon,
}

impl FromOperationOutput for UploadPartResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        Ok(Self {
            etag: output.header(ETAG),
            hash_crc64: output.header_parse(X_OSS_HASH_CRC64ECMA)?,
            content_md5: output.header(CONTENT_MD5),
            common: output.common(),
        })
    }
}

/// Copy a range of an existing object as one part.
#[derive(Debug, Clone, Default)]
pub struct UploadPartCopyRequest {
    pub bucket: String,
    pub key: String,
    pub upload_id: String,
    pub part_number: u32,
    /// Defaults to `bucket`.
    pub source_bucket: Option<String>,
    pub source_key: String,
    pub source_version_id: Option<String>,
    /// Such as `bytes=0-1023`.
    pub source_range: Option<String>,
    pub source_if_match: Option<String>,
    pub source_if_none_match: Option<String>,
}

impl UploadPartCopyRequest {
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        upload_id: impl Into<String>,
        part_number: u32,
        source_key: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            upload_id: upload_id.into(),
            part_number,
            source_key: source_key.into(),
            ..Default::default()
        }
    }

    pub fn with_source_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.source_bucket = Some(bucket.into());
        self
    }

    /// Copy `start..=end` of the source.
    pub fn with_source_range(mut self, start: u64, end: u64) -> Self {
        self.source_range = Some(format!("bytes={start}-{end}"));
        self
    }
}

impl Operation for UploadPartCopyRequest {
    type Output = UploadPartCopyResult;

    fn into_input(self) -> Result<OperationInput> {
        let source_bucket = self.source_bucket.as_deref().unwrap_or(&self.bucket);
        let source = copy_source(
            source_bucket,
            &self.source_key,
            self.source_version_id.as_deref(),
        );
        OperationInput::new("UploadPartCopy", Method::PUT)
            .with_bucket(self.bucket.clone())
            .with_key(self.key)
            .with_param("partNumber", self.part_number)
            .with_param("uploadId", self.upload_id)
            .with_header(X_OSS_COPY_SOURCE, source)?
            .with_header_opt(X_OSS_COPY_SOURCE_RANGE, self.source_range)?
            .with_header_opt(X_OSS_COPY_SOURCE_IF_MATCH, self.source_if_match)?
            .with_header_opt(X_OSS_COPY_SOURCE_IF_NONE_MATCH, self.source_if_none_match)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CopyPartBody {
    #[serde(rename = "ETag", default)]
    etag: Option<String>,
    #[serde(default, deserialize_with = "de_opt_time")]
    last_modified: Option<DateTime<Utc>>,
}

/// Result of `UploadPartCopy`.
#[derive(Debug, Clone, Default)]
pub struct UploadPartCopyResult {
    pub etag: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub source_version_id: Option<String>,
    pub common: ResultCommon,
}

impl FromOperationOutput for UploadPartCopyResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        let body: CopyPartBody = output.xml()?;
        Ok(Self {
            etag: body.etag,
            last_modified: body.last_modified,
            source_version_id: output.header(X_OSS_COPY_SOURCE_VERSION_ID),
            common: output.common(),
        })
    }
}

/// A part listed in `CompleteMultipartUpload`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UploadPart {
    pub part_number: u32,
    #[serde(rename = "ETag")]
    pub etag: String,
}

impl UploadPart {
    pub fn new(part_number: u32, etag: impl Into<String>) -> Self {
        Self {
            part_number,
            etag: etag.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompleteBody {
    #[serde(rename = "Part")]
    parts: Vec<UploadPart>,
}

/// Assemble the uploaded parts into the object.
#[derive(Debug, Clone, Default)]
pub struct CompleteMultipartUploadRequest {
    pub bucket: String,
    pub key: String,
    pub upload_id: String,
    /// Parts to assemble, sorted by part number before sending.
    pub parts: Vec<UploadPart>,
    /// Assemble every uploaded part, `parts` is ignored.
    pub complete_all: bool,
    pub acl: Option<Acl>,
    pub forbid_overwrite: Option<bool>,
}

impl CompleteMultipartUploadRequest {
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        upload_id: impl Into<String>,
        parts: Vec<UploadPart>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            upload_id: upload_id.into(),
            parts,
            ..Default::default()
        }
    }

    pub fn with_complete_all(mut self, complete_all: bool) -> Self {
        self.complete_all = complete_all;
        self
    }
}

impl Operation for CompleteMultipartUploadRequest {
    type Output = CompleteMultipartUploadResult;

    fn into_input(mut self) -> Result<OperationInput> {
        let input = OperationInput::new("CompleteMultipartUpload", Method::POST)
            .with_bucket(self.bucket)
            .with_key(self.key)
            .with_param("uploadId", self.upload_id)
            .with_param("encoding-type", EncodingType::Url)
            .with_header_opt(X_OSS_OBJECT_ACL, self.acl)?
            .with_header_opt(X_OSS_FORBID_OVERWRITE, self.forbid_overwrite)?;
        if self.complete_all {
            return input.with_header(X_OSS_COMPLETE_ALL, "yes");
        }
        self.parts.sort_by_key(|p| p.part_number);
        input.with_xml_body("CompleteMultipartUpload", &CompleteBody { parts: self.parts })
    }
}

/// Result of `CompleteMultipartUpload`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompleteMultipartUploadResult {
    #[serde(default)]
    pub encoding_type: Option<EncodingType>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub key: String,
    #[serde(rename = "ETag", default)]
    pub etag: Option<String>,
    #[serde(skip)]
    pub version_id: Option<String>,
    #[serde(skip)]
    pub hash_crc64: Option<u64>,
    #[serde(skip)]
    pub common: ResultCommon,
}

impl FromOperationOutput for CompleteMultipartUploadResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        let mut result: Self = if output.body.is_empty() {
            Self::default()
        } else {
            output.xml()?
        };
        let encoded = result.encoding_type == Some(EncodingType::Url);
        decode_if(encoded, &mut result.key)?;
        result.version_id = output.header(X_OSS_VERSION_ID);
        result.hash_crc64 = output.header_parse(X_OSS_HASH_CRC64ECMA)?;
        result.common = output.common();
        Ok(result)
    }
}

/// Cancel a multipart upload and drop its parts.
#[derive(Debug, Clone, Default)]
pub struct AbortMultipartUploadRequest {
    pub bucket: String,
    pub key: String,
    pub upload_id: String,
}

impl AbortMultipartUploadRequest {
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        upload_id: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            upload_id: upload_id.into(),
        }
    }
}

impl Operation for AbortMultipartUploadRequest {
    type Output = AbortMultipartUploadResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(OperationInput::new("AbortMultipartUpload", Method::DELETE)
            .with_bucket(self.bucket)
            .with_key(self.key)
            .with_param("uploadId", self.upload_id))
    }
}

empty_result!(
    /// Result of `AbortMultipartUpload`.
    AbortMultipartUploadResult
);

/// List the multipart uploads in progress.
#[derive(Debug, Clone, Default)]
pub struct ListMultipartUploadsRequest {
    pub bucket: String,
    pub prefix: Option<String>,
    pub delimiter: Option<String>,
    pub key_marker: Option<String>,
    pub upload_id_marker: Option<String>,
    pub max_uploads: Option<u32>,
}

impl ListMultipartUploadsRequest {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_max_uploads(mut self, max_uploads: u32) -> Self {
        self.max_uploads = Some(max_uploads);
        self
    }
}

impl Operation for ListMultipartUploadsRequest {
    type Output = ListMultipartUploadsResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(OperationInput::new("ListMultipartUploads", Method::GET)
            .with_bucket(self.bucket)
            .with_sub_resource("uploads")
            .with_param("encoding-type", EncodingType::Url)
            .with_param_opt("prefix", self.prefix)
            .with_param_opt("delimiter", self.delimiter)
            .with_param_opt("key-marker", self.key_marker)
            .with_param_opt("upload-id-marker", self.upload_id_marker)
            .with_param_opt("max-uploads", self.max_uploads))
    }
}

impl PaginatedRequest for ListMultipartUploadsRequest {
    fn advance(&mut self, page: &ListMultipartUploadsResult) -> bool {
        if !page.is_truncated {
            return false;
        }
        let Some(key_marker) = page.next_key_marker.clone().filter(|v| !v.is_empty()) else {
            return false;
        };
        let upload_id_marker = page.next_upload_id_marker.clone();
        if self.key_marker.as_ref() == Some(&key_marker)
            && self.upload_id_marker == upload_id_marker
        {
            return false;
        }
        self.key_marker = Some(key_marker);
        self.upload_id_marker = upload_id_marker;
        true
    }
}

/// An upload in progress.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MultipartUpload {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub upload_id: String,
    #[serde(default, deserialize_with = "de_opt_time")]
    pub initiated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub storage_class: Option<StorageClass>,
}

/// Result of `ListMultipartUploads`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListMultipartUploadsResult {
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub encoding_type: Option<EncodingType>,
    #[serde(default)]
    pub key_marker: Option<String>,
    #[serde(default)]
    pub upload_id_marker: Option<String>,
    #[serde(default)]
    pub next_key_marker: Option<String>,
    #[serde(default)]
    pub next_upload_id_marker: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub delimiter: Option<String>,
    #[serde(default)]
    pub max_uploads: Option<u32>,
    #[serde(default)]
    pub is_truncated: bool,
    #[serde(rename = "Upload", default)]
    pub uploads: Vec<MultipartUpload>,
    #[serde(default)]
    pub common_prefixes: Vec<super::bucket_basic::CommonPrefix>,
    #[serde(skip)]
    pub common: ResultCommon,
}

impl FromOperationOutput for ListMultipartUploadsResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        let mut result: Self = output.xml()?;
        let encoded = result.encoding_type == Some(EncodingType::Url);
        decode_opt_if(encoded, &mut result.key_marker)?;
        decode_opt_if(encoded, &mut result.next_key_marker)?;
        decode_opt_if(encoded, &mut result.prefix)?;
        decode_opt_if(encoded, &mut result.delimiter)?;
        for upload in &mut result.uploads {
            decode_if(encoded, &mut upload.key)?;
        }
        for prefix in &mut result.common_prefixes {
            decode_if(encoded, &mut prefix.prefix)?;
        }
        result.common = output.common();
        Ok(result)
    }
}

/// List the parts uploaded so far.
#[derive(Debug, Clone, Default)]
pub struct ListPartsRequest {
    pub bucket: String,
    pub key: String,
    pub upload_id: String,
    pub part_number_marker: Option<u32>,
    pub max_parts: Option<u32>,
}

impl ListPartsRequest {
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        upload_id: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            upload_id: upload_id.into(),
            ..Default::default()
        }
    }

    pub fn with_max_parts(mut self, max_parts: u32) -> Self {
        self.max_parts = Some(max_parts);
        self
    }
}

impl Operation for ListPartsRequest {
    type Output = ListPartsResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(OperationInput::new("ListParts", Method::GET)
            .with_bucket(self.bucket)
            .with_key(self.key)
            .with_param("uploadId", self.upload_id)
            .with_param("encoding-type", EncodingType::Url)
            .with_param_opt("part-number-marker", self.part_number_marker)
            .with_param_opt("max-parts", self.max_parts))
    }
}

impl PaginatedRequest for ListPartsRequest {
    fn advance(&mut self, page: &ListPartsResult) -> bool {
        match page.next_part_number_marker {
            Some(next) if page.is_truncated && self.part_number_marker != Some(next) => {
                self.part_number_marker = Some(next);
                true
            }
            _ => false,
        }
    }
}

/// An uploaded part.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PartInfo {
    #[serde(default)]
    pub part_number: u32,
    #[serde(rename = "ETag", default)]
    pub etag: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "HashCrc64ecma", default)]
    pub hash_crc64: Option<u64>,
    #[serde(default, deserialize_with = "de_opt_time")]
    pub last_modified: Option<DateTime<Utc>>,
}

/// Result of `ListParts`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListPartsResult {
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub upload_id: String,
    #[serde(default)]
    pub encoding_type: Option<EncodingType>,
    #[serde(default)]
    pub part_number_marker: Option<u32>,
    #[serde(default)]
    pub next_part_number_marker: Option<u32>,
    #[serde(default)]
    pub max_parts: Option<u32>,
    #[serde(default)]
    pub is_truncated: bool,
    #[serde(default)]
    pub storage_class: Option<StorageClass>,
    #[serde(rename = "Part", default)]
    pub parts: Vec<PartInfo>,
    #[serde(skip)]
    pub common: ResultCommon,
}

impl FromOperationOutput for ListPartsResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        let mut result: Self = output.xml()?;
        let encoded = result.encoding_type == Some(EncodingType::Url);
        decode_if(encoded, &mut result.key)?;
        result.common = output.common();
        Ok(result)
    }
}

client_methods! {
    initiate_multipart_upload(InitiateMultipartUploadRequest) -> InitiateMultipartUploadResult;
    upload_part(UploadPartRequest) -> UploadPartResult;
    upload_part_copy(UploadPartCopyRequest) -> UploadPartCopyResult;
    complete_multipart_upload(
        CompleteMultipartUploadRequest
    ) -> CompleteMultipartUploadResult;
    abort_multipart_upload(AbortMultipartUploadRequest) -> AbortMultipartUploadResult;
    list_multipart_uploads(ListMultipartUploadsRequest) -> ListMultipartUploadsResult;
    list_parts(ListPartsRequest) -> ListPartsResult;
}
