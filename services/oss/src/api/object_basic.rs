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
//! Reading, writing and managing single objects.

use super::{de_opt_time, parse_http_date_opt};
use crate::constants::*;
use crate::operation::{
    required, url_decode, CrcCheck, FromOperationOutput, Operation, OperationInput,
    OperationOutput, ResultCommon,
};
use crate::sign::path_encode;
use crate::types::{
    AccessControlPolicy, Acl, EncodingType, MetadataDirective, ObjectType, Owner,
    ServerSideEncryption, StorageClass, Tagging, TaggingDirective,
};
use alioss_core::{Error, Result};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::{
    CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_RANGE,
    CONTENT_TYPE, ETAG, EXPIRES, IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH,
    IF_UNMODIFIED_SINCE, LAST_MODIFIED, RANGE,
};
use http::Method;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Headers describing a new object, shared by the operations that create one.
#[derive(Debug, Clone, Default)]
pub struct ObjectOptions {
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    pub content_disposition: Option<String>,
    pub content_encoding: Option<String>,
    pub expires: Option<String>,
    pub acl: Option<Acl>,
    pub storage_class: Option<StorageClass>,
    pub server_side_encryption: Option<ServerSideEncryption>,
    pub server_side_encryption_key_id: Option<String>,
    pub forbid_overwrite: Option<bool>,
    pub tagging: Option<Tagging>,
    pub metadata: HashMap<String, String>,
}

impl ObjectOptions {
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_cache_control(mut self, cache_control: impl Into<String>) -> Self {
        self.cache_control = Some(cache_control.into());
        self
    }

    pub fn with_content_disposition(mut self, disposition: impl Into<String>) -> Self {
        self.content_disposition = Some(disposition.into());
        self
    }

    pub fn with_acl(mut self, acl: Acl) -> Self {
        self.acl = Some(acl);
        self
    }

    pub fn with_storage_class(mut self, storage_class: StorageClass) -> Self {
        self.storage_class = Some(storage_class);
        self
    }

    pub fn with_server_side_encryption(mut self, sse: ServerSideEncryption) -> Self {
        self.server_side_encryption = Some(sse);
        self
    }

    pub fn with_forbid_overwrite(mut self, forbid: bool) -> Self {
        self.forbid_overwrite = Some(forbid);
        self
    }

    pub fn with_tagging(mut self, tagging: Tagging) -> Self {
        self.tagging = Some(tagging);
        self
    }

    /// Add a user metadata entry, sent as `x-oss-meta-{key}`.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub(crate) fn apply(self, input: OperationInput) -> Result<OperationInput> {
        input
            .with_header_opt(CONTENT_TYPE, self.content_type)?
            .with_header_opt(CACHE_CONTROL, self.cache_control)?
            .with_header_opt(CONTENT_DISPOSITION, self.content_disposition)?
            .with_header_opt(CONTENT_ENCODING, self.content_encoding)?
            .with_header_opt(EXPIRES, self.expires)?
            .with_header_opt(X_OSS_OBJECT_ACL, self.acl)?
            .with_header_opt(X_OSS_STORAGE_CLASS, self.storage_class)?
            .with_header_opt(X_OSS_SERVER_SIDE_ENCRYPTION, self.server_side_encryption)?
            .with_header_opt(
                X_OSS_SERVER_SIDE_ENCRYPTION_KEY_ID,
                self.server_side_encryption_key_id,
            )?
            .with_header_opt(X_OSS_FORBID_OVERWRITE, self.forbid_overwrite)?
            .with_header_opt(X_OSS_TAGGING, self.tagging.map(|t| t.to_header_value()))?
            .with_metadata(&self.metadata)
    }
}

/// Conditions on the current state of an object.
#[derive(Debug, Clone, Default)]
pub struct Conditions {
    pub if_match: Option<String>,
    pub if_none_match: Option<String>,
    /// Http date, such as `Fri, 13 Nov 2015 14:47:53 GMT`.
    pub if_modified_since: Option<String>,
    pub if_unmodified_since: Option<String>,
}

impl Conditions {
    fn apply(self, input: OperationInput) -> Result<OperationInput> {
        input
            .with_header_opt(IF_MATCH, self.if_match)?
            .with_header_opt(IF_NONE_MATCH, self.if_none_match)?
            .with_header_opt(IF_MODIFIED_SINCE, self.if_modified_since)?
            .with_header_opt(IF_UNMODIFIED_SINCE, self.if_unmodified_since)
    }
}

/// Upload an object in a single request.
#[derive(Debug, Clone, Default)]
pub struct PutObjectRequest {
    pub bucket: String,
    pub key: String,
    pub body: Bytes,
    pub options: ObjectOptions,
    /// Base64 encoded md5 of the body, the service rejects a mismatch.
    pub content_md5: Option<String>,
    /// Bandwidth limit in bit/s.
    pub traffic_limit: Option<u64>,
}

impl PutObjectRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.options.content_type = Some(content_type.into());
        self
    }

    pub fn with_options(mut self, options: ObjectOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_content_md5(mut self, md5: impl Into<String>) -> Self {
        self.content_md5 = Some(md5.into());
        self
    }

    pub fn with_traffic_limit(mut self, limit: u64) -> Self {
        self.traffic_limit = Some(limit);
        self
    }
}

impl Operation for PutObjectRequest {
    type Output = PutObjectResult;

    fn into_input(self) -> Result<OperationInput> {
        let input = OperationInput::new("PutObject", Method::PUT)
            .with_bucket(self.bucket)
            .with_key(self.key)
            .with_body(self.body)
            .with_crc_check(CrcCheck::Upload)
            .with_header_opt(CONTENT_MD5, self.content_md5)?
            .with_header_opt(X_OSS_TRAFFIC_LIMIT, self.traffic_limit)?;
        self.options.apply(input)
    }
}

/// Result of `PutObject`.
#[derive(Debug, Clone, Default)]
pub struct PutObjectResult {
    pub etag: Option<String>,
    pub version_id: Option<String>,
    pub hash_crc64: Option<u64>,
    pub content_md5: Option<String>,
    pub common: ResultCommon,
}

impl FromOperationOutput for PutObjectResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        Ok(Self {
            etag: output.header(ETAG),
            version_id: output.header(X_OSS_VERSION_ID),
            hash_crc64: output.header_parse(X_OSS_HASH_CRC64ECMA)?,
            content_md5: output.header(CONTENT_MD5),
            common: output.common(),
        })
    }
}

/// Download an object.
#[derive(Debug, Clone, Default)]
pub struct GetObjectRequest {
    pub bucket: String,
    pub key: String,
    pub version_id: Option<String>,
    /// Such as `bytes=0-9`.
    pub range: Option<String>,
    /// `standard` rejects ranges outside the object instead of returning it whole.
    pub range_behavior: Option<String>,
    pub conditions: Conditions,
    pub response_content_type: Option<String>,
    pub response_content_disposition: Option<String>,
    /// Image processing such as `image/resize,w_100`.
    pub process: Option<String>,
    pub traffic_limit: Option<u64>,
}

impl GetObjectRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn with_version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }

    /// Read `start..=end`, or from `start` to the end.
    pub fn with_range(mut self, start: u64, end: Option<u64>) -> Self {
        self.range = Some(match end {
            Some(end) => format!("bytes={start}-{end}"),
            None => format!("bytes={start}-"),
        });
        self.range_behavior = Some("standard".to_string());
        self
    }

    pub fn with_if_match(mut self, etag: impl Into<String>) -> Self {
        self.conditions.if_match = Some(etag.into());
        self
    }

    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_process(mut self, process: impl Into<String>) -> Self {
        self.process = Some(process.into());
        self
    }
}

impl Operation for GetObjectRequest {
    type Output = GetObjectResult;

    fn into_input(self) -> Result<OperationInput> {
        let input = OperationInput::new("GetObject", Method::GET)
            .with_bucket(self.bucket)
            .with_key(self.key)
            .with_crc_check(CrcCheck::Download)
            .with_param_opt("versionId", self.version_id)
            .with_param_opt("response-content-type", self.response_content_type)
            .with_param_opt(
                "response-content-disposition",
                self.response_content_disposition,
            )
            .with_param_opt("x-oss-process", self.process)
            .with_header_opt(RANGE, self.range)?
            .with_header_opt(X_OSS_RANGE_BEHAVIOR, self.range_behavior)?
            .with_header_opt(X_OSS_TRAFFIC_LIMIT, self.traffic_limit)?;
        self.conditions.apply(input)
    }
}

/// Result of `GetObject`.
#[derive(Debug, Clone, Default)]
pub struct GetObjectResult {
    pub body: Bytes,
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
    pub content_range: Option<String>,
    pub etag: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub object_type: Option<ObjectType>,
    pub storage_class: Option<StorageClass>,
    pub version_id: Option<String>,
    pub hash_crc64: Option<u64>,
    pub tagging_count: Option<u32>,
    pub metadata: HashMap<String, String>,
    pub common: ResultCommon,
}

impl FromOperationOutput for GetObjectResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        Ok(Self {
            content_length: output.header_parse(CONTENT_LENGTH)?,
            content_type: output.header(CONTENT_TYPE),
            content_range: output.header(CONTENT_RANGE),
            etag: output.header(ETAG),
            last_modified: parse_http_date_opt(output.header(LAST_MODIFIED)),
            object_type: output.header(X_OSS_OBJECT_TYPE).map(|v| ObjectType::from(v.as_str())),
            storage_class: output
                .header(X_OSS_STORAGE_CLASS)
                .map(|v| StorageClass::from(v.as_str())),
            version_id: output.header(X_OSS_VERSION_ID),
            hash_crc64: output.header_parse(X_OSS_HASH_CRC64ECMA)?,
            tagging_count: output.header_parse(X_OSS_TAGGING_COUNT)?,
            metadata: output.metadata(),
            common: output.common(),
            body: output.body,
        })
    }
}

/// Get all metadata of an object without its content.
#[derive(Debug, Clone, Default)]
pub struct HeadObjectRequest {
    pub bucket: String,
    pub key: String,
    pub version_id: Option<String>,
    pub conditions: Conditions,
}

impl HeadObjectRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn with_version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }

    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = conditions;
        self
    }
}

impl Operation for HeadObjectRequest {
    type Output = HeadObjectResult;

    fn into_input(self) -> Result<OperationInput> {
        let input = OperationInput::new("HeadObject", Method::HEAD)
            .with_bucket(self.bucket)
            .with_key(self.key)
            .with_param_opt("versionId", self.version_id);
        self.conditions.apply(input)
    }
}

/// Result of `HeadObject`.
#[derive(Debug, Clone, Default)]
pub struct HeadObjectResult {
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub object_type: Option<ObjectType>,
    pub storage_class: Option<StorageClass>,
    pub version_id: Option<String>,
    pub hash_crc64: Option<u64>,
    pub next_append_position: Option<u64>,
    /// Restore state of an archived object, such as `ongoing-request="true"`.
    pub restore: Option<String>,
    pub server_side_encryption: Option<ServerSideEncryption>,
    pub tagging_count: Option<u32>,
    pub metadata: HashMap<String, String>,
    pub common: ResultCommon,
}

impl FromOperationOutput for HeadObjectResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        Ok(Self {
            content_length: output.header_parse(CONTENT_LENGTH)?,
            content_type: output.header(CONTENT_TYPE),
            etag: output.header(ETAG),
            last_modified: parse_http_date_opt(output.header(LAST_MODIFIED)),
            object_type: output.header(X_OSS_OBJECT_TYPE).map(|v| ObjectType::from(v.as_str())),
            storage_class: output
                .header(X_OSS_STORAGE_CLASS)
                .map(|v| StorageClass::from(v.as_str())),
            version_id: output.header(X_OSS_VERSION_ID),
            hash_crc64: output.header_parse(X_OSS_HASH_CRC64ECMA)?,
            next_append_position: output.header_parse(X_OSS_NEXT_APPEND_POSITION)?,
            restore: output.header(X_OSS_RESTORE),
            server_side_encryption: output
                .header(X_OSS_SERVER_SIDE_ENCRYPTION)
                .map(|v| ServerSideEncryption::from(v.as_str())),
            tagging_count: output.header_parse(X_OSS_TAGGING_COUNT)?,
            metadata: output.metadata(),
            common: output.common(),
        })
    }
}

/// Get the basic metadata of an object.
#[derive(Debug, Clone, Default)]
pub struct GetObjectMetaRequest {
    pub bucket: String,
    pub key: String,
    pub version_id: Option<String>,
}

impl GetObjectMetaRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            version_id: None,
        }
    }
}

impl Operation for GetObjectMetaRequest {
    type Output = GetObjectMetaResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(OperationInput::new("GetObjectMeta", Method::HEAD)
            .with_bucket(self.bucket)
            .with_key(self.key)
            .with_sub_resource("objectMeta")
            .with_param_opt("versionId", self.version_id))
    }
}

/// Result of `GetObjectMeta`.
#[derive(Debug, Clone, Default)]
pub struct GetObjectMetaResult {
    pub content_length: Option<u64>,
    pub etag: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub last_access_time: Option<DateTime<Utc>>,
    pub version_id: Option<String>,
    pub hash_crc64: Option<u64>,
    pub common: ResultCommon,
}

impl FromOperationOutput for GetObjectMetaResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        Ok(Self {
            content_length: output.header_parse(CONTENT_LENGTH)?,
            etag: output.header(ETAG),
            last_modified: parse_http_date_opt(output.header(LAST_MODIFIED)),
            last_access_time: parse_http_date_opt(output.header(X_OSS_LAST_ACCESS_TIME)),
            version_id: output.header(X_OSS_VERSION_ID),
            hash_crc64: output.header_parse(X_OSS_HASH_CRC64ECMA)?,
            common: output.common(),
        })
    }
}

/// Encode `x-oss-copy-source`: `/bucket/key?versionId=id`.
pub(crate) fn copy_source(bucket: &str, key: &str, version_id: Option<&str>) -> String {
    let mut source = format!("/{bucket}/{}", path_encode(key));
    if let Some(version_id) = version_id {
        source.push_str("?versionId=");
        source.push_str(version_id);
    }
    source
}

/// Copy an object within a region.
#[derive(Debug, Clone, Default)]
pub struct CopyObjectRequest {
    pub bucket: String,
    pub key: String,
    /// Defaults to `bucket`.
    pub source_bucket: Option<String>,
    pub source_key: String,
    pub source_version_id: Option<String>,
    pub source_if_match: Option<String>,
    pub source_if_none_match: Option<String>,
    pub metadata_directive: Option<MetadataDirective>,
    pub tagging_directive: Option<TaggingDirective>,
    pub options: ObjectOptions,
}

impl CopyObjectRequest {
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        source_key: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            source_key: source_key.into(),
            ..Default::default()
        }
    }

    pub fn with_source_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.source_bucket = Some(bucket.into());
        self
    }

    pub fn with_source_version_id(mut self, version_id: impl Into<String>) -> Self {
        self.source_version_id = Some(version_id.into());
        self
    }

    pub fn with_metadata_directive(mut self, directive: MetadataDirective) -> Self {
        self.metadata_directive = Some(directive);
        self
    }

    pub fn with_options(mut self, options: ObjectOptions) -> Self {
        self.options = options;
        self
    }
}

impl Operation for CopyObjectRequest {
    type Output = CopyObjectResult;

    fn into_input(self) -> Result<OperationInput> {
        let source_bucket = self.source_bucket.as_deref().unwrap_or(&self.bucket);
        let source = copy_source(
            source_bucket,
            &self.source_key,
            self.source_version_id.as_deref(),
        );
        let input = OperationInput::new("CopyObject", Method::PUT)
            .with_bucket(self.bucket.clone())
            .with_key(self.key)
            .with_header(X_OSS_COPY_SOURCE, source)?
            .with_header_opt(X_OSS_COPY_SOURCE_IF_MATCH, self.source_if_match)?
            .with_header_opt(X_OSS_COPY_SOURCE_IF_NONE_MATCH, self.source_if_none_match)?
            .with_header_opt(X_OSS_METADATA_DIRECTIVE, self.metadata_directive)?
            .with_header_opt(X_OSS_TAGGING_DIRECTIVE, self.tagging_directive)?;
        self.options.apply(input)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CopyObjectBody {
    #[serde(rename = "ETag", default)]
    etag: Option<String>,
    #[serde(default, deserialize_with = "de_opt_time")]
    last_modified: Option<DateTime<Utc>>,
}

/// Result of `CopyObject`.
#[derive(Debug, Clone, Default)]
pub struct CopyObjectResult {
    pub etag: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub version_id: Option<String>,
    pub source_version_id: Option<String>,
    pub hash_crc64: Option<u64>,
    pub common: ResultCommon,
}

impl FromOperationOutput for CopyObjectResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        let body: CopyObjectBody = output.xml()?;
        Ok(Self {
            etag: body.etag,
            last_modified: body.last_modified,
            version_id: output.header(X_OSS_VERSION_ID),
            source_version_id: output.header(X_OSS_COPY_SOURCE_VERSION_ID),
            hash_crc64: output.header_parse(X_OSS_HASH_CRC64ECMA)?,
            common: output.common(),
        })
    }
}

/// Append data to an appendable object, creating it at position 0.
#[derive(Debug, Clone, Default)]
pub struct AppendObjectRequest {
    pub bucket: String,
    pub key: String,
    pub position: u64,
    pub body: Bytes,
    /// CRC64 of the existing data, needed to verify appends after the first.
    pub init_hash_crc64: Option<u64>,
    pub options: ObjectOptions,
}

impl AppendObjectRequest {
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        position: u64,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            position,
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn with_init_hash_crc64(mut self, crc: u64) -> Self {
        self.init_hash_crc64 = Some(crc);
        self
    }

    pub fn with_options(mut self, options: ObjectOptions) -> Self {
        self.options = options;
        self
    }
}

impl Operation for AppendObjectRequest {
    type Output = AppendObjectResult;

    fn into_input(self) -> Result<OperationInput> {
        let crc_check = match self.init_hash_crc64 {
            Some(crc) => CrcCheck::Append(crc),
            None if self.position == 0 => CrcCheck::Append(0),
            None => CrcCheck::None,
        };
        let input = OperationInput::new("AppendObject", Method::POST)
            .with_bucket(self.bucket)
            .with_key(self.key)
            .with_sub_resource("append")
            .with_param("position", self.position)
            .with_body(self.body)
            .with_crc_check(crc_check);
        self.options.apply(input)
    }
}

/// Result of `AppendObject`.
#[derive(Debug, Clone, Default)]
pub struct AppendObjectResult {
    /// Position of the next append.
    pub next_position: Option<u64>,
    /// CRC64 of the whole object after the append.
    pub hash_crc64: Option<u64>,
    pub version_id: Option<String>,
    pub common: ResultCommon,
}

impl FromOperationOutput for AppendObjectResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        Ok(Self {
            next_position: output.header_parse(X_OSS_NEXT_APPEND_POSITION)?,
            hash_crc64: output.header_parse(X_OSS_HASH_CRC64ECMA)?,
            version_id: output.header(X_OSS_VERSION_ID),
            common: output.common(),
        })
    }
}

/// Delete an object or one of its versions.
#[derive(Debug, Clone, Default)]
pub struct DeleteObjectRequest {
    pub bucket: String,
    pub key: String,
    pub version_id: Option<String>,
}

impl DeleteObjectRequest {
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

impl Operation for DeleteObjectRequest {
    type Output = DeleteObjectResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(OperationInput::new("DeleteObject", Method::DELETE)
            .with_bucket(self.bucket)
            .with_key(self.key)
            .with_param_opt("versionId", self.version_id))
    }
}

/// Result of `DeleteObject`.
#[derive(Debug, Clone, Default)]
pub struct DeleteObjectResult {
    pub version_id: Option<String>,
    /// The delete created or removed a delete marker.
    pub delete_marker: bool,
    pub common: ResultCommon,
}

impl FromOperationOutput for DeleteObjectResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        Ok(Self {
            version_id: output.header(X_OSS_VERSION_ID),
            delete_marker: output.header_parse(X_OSS_DELETE_MARKER)?.unwrap_or(false),
            common: output.common(),
        })
    }
}

/// An object to delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectIdentifier {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

impl ObjectIdentifier {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version_id: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DeleteBody {
    quiet: bool,
    #[serde(rename = "Object")]
    objects: Vec<ObjectIdentifier>,
}

/// Delete up to 1000 objects in a single request.
#[derive(Debug, Clone, Default)]
pub struct DeleteMultipleObjectsRequest {
    pub bucket: String,
    pub objects: Vec<ObjectIdentifier>,
    /// Only report failures.
    pub quiet: bool,
}

impl DeleteMultipleObjectsRequest {
    pub fn new(bucket: impl Into<String>, objects: Vec<ObjectIdentifier>) -> Self {
        Self {
            bucket: bucket.into(),
            objects,
            quiet: false,
        }
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

impl Operation for DeleteMultipleObjectsRequest {
    type Output = DeleteMultipleObjectsResult;

    fn into_input(self) -> Result<OperationInput> {
        if self.objects.is_empty() {
            return Err(Error::request_invalid(
                "DeleteMultipleObjects: at least one object is required",
            ));
        }
        OperationInput::new("DeleteMultipleObjects", Method::POST)
            .with_bucket(self.bucket)
            .with_sub_resource("delete")
            .with_param("encoding-type", EncodingType::Url)
            .with_xml_body(
                "Delete",
                &DeleteBody {
                    quiet: self.quiet,
                    objects: self.objects,
                },
            )
    }
}

/// An object removed by `DeleteMultipleObjects`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeletedInfo {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub version_id: Option<String>,
    #[serde(default)]
    pub delete_marker: bool,
    #[serde(default)]
    pub delete_marker_version_id: Option<String>,
}

/// Result of `DeleteMultipleObjects`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteMultipleObjectsResult {
    #[serde(rename = "Deleted", default)]
    pub deleted: Vec<DeletedInfo>,
    #[serde(default)]
    pub encoding_type: Option<EncodingType>,
    #[serde(skip)]
    pub common: ResultCommon,
}

impl FromOperationOutput for DeleteMultipleObjectsResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        let mut result: Self = if output.body.is_empty() {
            Self::default()
        } else {
            output.xml()?
        };
        if result.encoding_type == Some(EncodingType::Url) {
            for deleted in &mut result.deleted {
                deleted.key = url_decode(&deleted.key)?;
            }
        }
        result.common = output.common();
        Ok(result)
    }
}

/// Set the ACL of an object.
#[derive(Debug, Clone)]
pub struct PutObjectAclRequest {
    pub bucket: String,
    pub key: String,
    pub acl: Acl,
    pub version_id: Option<String>,
}

impl PutObjectAclRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, acl: Acl) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            acl,
            version_id: None,
        }
    }
}

impl Operation for PutObjectAclRequest {
    type Output = PutObjectAclResult;

    fn into_input(self) -> Result<OperationInput> {
        OperationInput::new("PutObjectAcl", Method::PUT)
            .with_bucket(self.bucket)
            .with_key(self.key)
            .with_sub_resource("acl")
            .with_param_opt("versionId", self.version_id)
            .with_header(X_OSS_OBJECT_ACL, self.acl)
    }
}

empty_result!(
    /// Result of `PutObjectAcl`.
    PutObjectAclResult
);

/// Get the ACL of an object.
#[derive(Debug, Clone, Default)]
pub struct GetObjectAclRequest {
    pub bucket: String,
    pub key: String,
    pub version_id: Option<String>,
}

impl GetObjectAclRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            version_id: None,
        }
    }
}

impl Operation for GetObjectAclRequest {
    type Output = GetObjectAclResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(OperationInput::new("GetObjectAcl", Method::GET)
            .with_bucket(self.bucket)
            .with_key(self.key)
            .with_sub_resource("acl")
            .with_param_opt("versionId", self.version_id))
    }
}

/// Result of `GetObjectAcl`.
#[derive(Debug, Clone, Default)]
pub struct GetObjectAclResult {
    pub owner: Owner,
    pub acl: Option<Acl>,
    pub common: ResultCommon,
}

impl FromOperationOutput for GetObjectAclResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        let policy: AccessControlPolicy = output.xml()?;
        Ok(Self {
            owner: policy.owner,
            acl: policy.access_control_list.grant,
            common: output.common(),
        })
    }
}

/// Create a symbolic link to another object.
#[derive(Debug, Clone, Default)]
pub struct PutSymlinkRequest {
    pub bucket: String,
    pub key: String,
    pub target: String,
    pub acl: Option<Acl>,
    pub storage_class: Option<StorageClass>,
    pub forbid_overwrite: Option<bool>,
    pub metadata: HashMap<String, String>,
}

impl PutSymlinkRequest {
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            target: target.into(),
            ..Default::default()
        }
    }
}

impl Operation for PutSymlinkRequest {
    type Output = PutSymlinkResult;

    fn into_input(self) -> Result<OperationInput> {
        OperationInput::new("PutSymlink", Method::PUT)
            .with_bucket(self.bucket)
            .with_key(self.key)
            .with_sub_resource("symlink")
            .with_header(X_OSS_SYMLINK_TARGET, path_encode(&self.target))?
            .with_header_opt(X_OSS_OBJECT_ACL, self.acl)?
            .with_header_opt(X_OSS_STORAGE_CLASS, self.storage_class)?
            .with_header_opt(X_OSS_FORBID_OVERWRITE, self.forbid_overwrite)?
            .with_metadata(&self.metadata)
    }
}

/// Result of `PutSymlink`.
#[derive(Debug, Clone, Default)]
pub struct PutSymlinkResult {
    pub version_id: Option<String>,
    pub common: ResultCommon,
}

impl FromOperationOutput for PutSymlinkResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        Ok(Self {
            version_id: output.header(X_OSS_VERSION_ID),
            common: output.common(),
        })
    }
}

/// Get the target of a symbolic link.
#[derive(Debug, Clone, Default)]
pub struct GetSymlinkRequest {
    pub bucket: String,
    pub key: String,
    pub version_id: Option<String>,
}

impl GetSymlinkRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            version_id: None,
        }
    }
}

impl Operation for GetSymlinkRequest {
    type Output = GetSymlinkResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(OperationInput::new("GetSymlink", Method::GET)
            .with_bucket(self.bucket)
            .with_key(self.key)
            .with_sub_resource("symlink")
            .with_param_opt("versionId", self.version_id))
    }
}

/// Result of `GetSymlink`.
#[derive(Debug, Clone, Default)]
pub struct GetSymlinkResult {
    pub target: String,
    pub etag: Option<String>,
    pub version_id: Option<String>,
    pub metadata: HashMap<String, String>,
    pub common: ResultCommon,
}

impl FromOperationOutput for GetSymlinkResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        let target = required(
            output.header(X_OSS_SYMLINK_TARGET),
            output.op_name,
            X_OSS_SYMLINK_TARGET,
        )
        .map_err(|e| Error::response_invalid(e.message()))?;
        Ok(Self {
            target: url_decode(&target)?,
            etag: output.header(ETAG),
            version_id: output.header(X_OSS_VERSION_ID),
            metadata: output.metadata(),
            common: output.common(),
        })
    }
}

/// Restore priority of an archived object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobParameters {
    /// `Expedited`, `Standard` or `Bulk`.
    pub tier: String,
}

/// Options of a restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RestoreRequest {
    /// Days the restored copy stays readable.
    pub days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_parameters: Option<JobParameters>,
}

/// Restore an archived object so it can be read.
#[derive(Debug, Clone, Default)]
pub struct RestoreObjectRequest {
    pub bucket: String,
    pub key: String,
    pub version_id: Option<String>,
    pub restore_request: Option<RestoreRequest>,
}

impl RestoreObjectRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn with_days(mut self, days: u32, tier: Option<&str>) -> Self {
        self.restore_request = Some(RestoreRequest {
            days,
            job_parameters: tier.map(|tier| JobParameters {
                tier: tier.to_string(),
            }),
        });
        self
    }
}

impl Operation for RestoreObjectRequest {
    type Output = RestoreObjectResult;

    fn into_input(self) -> Result<OperationInput> {
        let input = OperationInput::new("RestoreObject", Method::POST)
            .with_bucket(self.bucket)
            .with_key(self.key)
            .with_sub_resource("restore")
            .with_param_opt("versionId", self.version_id);
        match self.restore_request {
            Some(request) => input.with_xml_body("RestoreRequest", &request),
            None => Ok(input),
        }
    }
}

/// Result of `RestoreObject`.
#[derive(Debug, Clone, Default)]
pub struct RestoreObjectResult {
    pub version_id: Option<String>,
    pub common: ResultCommon,
}

impl FromOperationOutput for RestoreObjectResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        Ok(Self {
            version_id: output.header(X_OSS_VERSION_ID),
            common: output.common(),
        })
    }
}

client_methods! {
    /// Upload an object, the CRC64 of the body is verified unless disabled.
    put_object(PutObjectRequest) -> PutObjectResult;
    /// Download an object into memory.
    ///
    /// ```no_run
    /// use alioss::{Client, GetObjectRequest};
    ///
    /// # async fn example(client: Client) -> alioss_core::Result<()> {
    /// let object = client
    ///     .get_object(GetObjectRequest::new("examplebucket", "exampleobject.txt"))
    ///     .await?;
    /// println!("{} bytes", object.body.len());
    /// # Ok(())
    /// # }
    /// ```
    get_object(GetObjectRequest) -> GetObjectResult;
    head_object(HeadObjectRequest) -> HeadObjectResult;
    get_object_meta(GetObjectMetaRequest) -> GetObjectMetaResult;
    copy_object(CopyObjectRequest) -> CopyObjectResult;
    append_object(AppendObjectRequest) -> AppendObjectResult;
    delete_object(DeleteObjectRequest) -> DeleteObjectResult;
    delete_multiple_objects(DeleteMultipleObjectsRequest) -> DeleteMultipleObjectsResult;
    put_object_acl(PutObjectAclRequest) -> PutObjectAclResult;
    get_object_acl(GetObjectAclRequest) -> GetObjectAclResult;
    put_symlink(PutSymlinkRequest) -> PutSymlinkResult;
    get_symlink(GetSymlinkRequest) -> GetSymlinkResult;
    restore_object(RestoreObjectRequest) -> RestoreObjectResult;
}
