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
//! Bucket creation, inspection, listing and versioning.

use super::de_opt_time;
use crate::constants::{X_OSS_ACL, X_OSS_RESOURCE_GROUP_ID};
use crate::operation::{
    url_decode, FromOperationOutput, Operation, OperationInput, OperationOutput, ResultCommon,
};
use crate::paginator::{next_token, PaginatedRequest};
use crate::types::{
    AccessControlList, Acl, DataRedundancyType, EncodingType, ObjectType, Owner,
    StorageClass, VersioningStatus,
};
use alioss_core::Result;
use chrono::{DateTime, Utc};
use http::Method;
use serde::{Deserialize, Serialize};

/// Decode a field returned with `encoding-type=url`.
fn decode_in_place(value: &mut Option<String>) -> Result<()> {
    if let Some(v) = value.as_mut() {
        *v = url_decode(v)?;
    }
    Ok(())
}

fn is_url_encoded(encoding_type: &Option<EncodingType>) -> bool {
    *encoding_type == Some(EncodingType::Url)
}

/// Storage options of a new bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateBucketConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<StorageClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_redundancy_type: Option<DataRedundancyType>,
}

/// Create a bucket.
#[derive(Debug, Clone, Default)]
pub struct PutBucketRequest {
    pub bucket: String,
    pub acl: Option<Acl>,
    pub resource_group_id: Option<String>,
    pub configuration: Option<CreateBucketConfiguration>,
}

impl PutBucketRequest {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    pub fn with_acl(mut self, acl: Acl) -> Self {
        self.acl = Some(acl);
        self
    }

    pub fn with_resource_group_id(mut self, id: impl Into<String>) -> Self {
        self.resource_group_id = Some(id.into());
        self
    }

    pub fn with_storage_class(mut self, storage_class: StorageClass) -> Self {
        self.configuration
            .get_or_insert_with(Default::default)
            .storage_class = Some(storage_class);
        self
    }

    pub fn with_data_redundancy_type(mut self, redundancy: DataRedundancyType) -> Self {
        self.configuration
            .get_or_insert_with(Default::default)
            .data_redundancy_type = Some(redundancy);
        self
    }
}

impl Operation for PutBucketRequest {
    type Output = PutBucketResult;

    fn into_input(self) -> Result<OperationInput> {
        let input = OperationInput::new("PutBucket", Method::PUT)
            .with_bucket(self.bucket)
            .with_header_opt(X_OSS_ACL, self.acl)?
            .with_header_opt(X_OSS_RESOURCE_GROUP_ID, self.resource_group_id)?;
        match self.configuration {
            Some(config) => input.with_xml_body("CreateBucketConfiguration", &config),
            None => Ok(input),
        }
    }
}

empty_result!(
    /// Result of `PutBucket`.
    PutBucketResult
);

/// Delete an empty bucket.
#[derive(Debug, Clone, Default)]
pub struct DeleteBucketRequest {
    pub bucket: String,
}

impl DeleteBucketRequest {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }
}

impl Operation for DeleteBucketRequest {
    type Output = DeleteBucketResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(OperationInput::new("DeleteBucket", Method::DELETE).with_bucket(self.bucket))
    }
}

empty_result!(
    /// Result of `DeleteBucket`.
    DeleteBucketResult
);

/// Get the properties of a bucket.
#[derive(Debug, Clone, Default)]
pub struct GetBucketInfoRequest {
    pub bucket: String,
}

impl GetBucketInfoRequest {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }
}

impl Operation for GetBucketInfoRequest {
    type Output = GetBucketInfoResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(OperationInput::new("GetBucketInfo", Method::GET)
            .with_bucket(self.bucket)
            .with_sub_resource("bucketInfo"))
    }
}

/// Default server side encryption of a bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServerSideEncryptionRule {
    #[serde(rename = "SSEAlgorithm", default)]
    pub sse_algorithm: Option<String>,
    #[serde(rename = "KMSMasterKeyID", default)]
    pub kms_master_key_id: Option<String>,
    #[serde(rename = "KMSDataEncryption", default)]
    pub kms_data_encryption: Option<String>,
}

/// Logging target of a bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketPolicy {
    #[serde(default)]
    pub log_bucket: Option<String>,
    #[serde(default)]
    pub log_prefix: Option<String>,
}

/// Properties of a bucket.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub access_monitor: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "de_opt_time")]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub extranet_endpoint: Option<String>,
    #[serde(default)]
    pub intranet_endpoint: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub storage_class: Option<StorageClass>,
    #[serde(default)]
    pub data_redundancy_type: Option<DataRedundancyType>,
    #[serde(default)]
    pub versioning: Option<VersioningStatus>,
    #[serde(default)]
    pub transfer_acceleration: Option<String>,
    #[serde(default)]
    pub cross_region_replication: Option<String>,
    #[serde(default)]
    pub resource_group_id: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub block_public_access: Option<bool>,
    #[serde(default)]
    pub owner: Option<Owner>,
    #[serde(default)]
    pub access_control_list: Option<AccessControlList>,
    #[serde(default)]
    pub server_side_encryption_rule: Option<ServerSideEncryptionRule>,
    #[serde(default)]
    pub bucket_policy: Option<BucketPolicy>,
}

/// Result of `GetBucketInfo`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetBucketInfoResult {
    #[serde(rename = "Bucket", default)]
    pub bucket_info: BucketInfo,
    #[serde(skip)]
    pub common: ResultCommon,
}

xml_result!(GetBucketInfoResult);

/// Get the region a bucket lives in.
#[derive(Debug, Clone, Default)]
pub struct GetBucketLocationRequest {
    pub bucket: String,
}

impl GetBucketLocationRequest {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }
}

impl Operation for GetBucketLocationRequest {
    type Output = GetBucketLocationResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(OperationInput::new("GetBucketLocation", Method::GET)
            .with_bucket(self.bucket)
            .with_sub_resource("location"))
    }
}

/// Result of `GetBucketLocation`, such as `oss-cn-hangzhou`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetBucketLocationResult {
    #[serde(rename = "$text", default)]
    pub location: String,
    #[serde(skip)]
    pub common: ResultCommon,
}

xml_result!(GetBucketLocationResult);

/// Get storage statistics of a bucket.
#[derive(Debug, Clone, Default)]
pub struct GetBucketStatRequest {
    pub bucket: String,
}

impl GetBucketStatRequest {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }
}

impl Operation for GetBucketStatRequest {
    type Output = GetBucketStatResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(OperationInput::new("GetBucketStat", Method::GET)
            .with_bucket(self.bucket)
            .with_sub_resource("stat"))
    }
}

/// Result of `GetBucketStat`. Sizes are in bytes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GetBucketStatResult {
    pub storage: i64,
    pub object_count: i64,
    pub multipart_upload_count: i64,
    pub multipart_part_count: i64,
    pub live_channel_count: i64,
    pub delete_marker_count: i64,
    pub last_modified_time: i64,
    pub standard_storage: i64,
    pub standard_object_count: i64,
    pub infrequent_access_storage: i64,
    pub infrequent_access_real_storage: i64,
    pub infrequent_access_object_count: i64,
    pub archive_storage: i64,
    pub archive_real_storage: i64,
    pub archive_object_count: i64,
    pub cold_archive_storage: i64,
    pub cold_archive_real_storage: i64,
    pub cold_archive_object_count: i64,
    pub deep_cold_archive_storage: i64,
    pub deep_cold_archive_real_storage: i64,
    pub deep_cold_archive_object_count: i64,
    #[serde(skip)]
    pub common: ResultCommon,
}

xml_result!(GetBucketStatResult);

/// An object in a listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectProperties {
    #[serde(default)]
    pub key: String,
    #[serde(rename = "Type", default)]
    pub object_type: Option<ObjectType>,
    #[serde(default)]
    pub size: i64,
    #[serde(rename = "ETag", default)]
    pub etag: Option<String>,
    #[serde(default, deserialize_with = "de_opt_time")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub storage_class: Option<StorageClass>,
    #[serde(default)]
    pub owner: Option<Owner>,
    #[serde(default)]
    pub restore_info: Option<String>,
    #[serde(default, deserialize_with = "de_opt_time")]
    pub transition_time: Option<DateTime<Utc>>,
}

/// A group of keys sharing a prefix up to the delimiter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CommonPrefix {
    #[serde(default)]
    pub prefix: String,
}

fn decode_listing(
    contents: &mut [ObjectProperties],
    common_prefixes: &mut [CommonPrefix],
) -> Result<()> {
    for object in contents {
        object.key = url_decode(&object.key)?;
    }
    for prefix in common_prefixes {
        prefix.prefix = url_decode(&prefix.prefix)?;
    }
    Ok(())
}

/// List objects with marker based paging.
#[derive(Debug, Clone, Default)]
pub struct ListObjectsRequest {
    pub bucket: String,
    pub prefix: Option<String>,
    pub delimiter: Option<String>,
    pub marker: Option<String>,
    pub max_keys: Option<u32>,
}

impl ListObjectsRequest {
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

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    pub fn with_max_keys(mut self, max_keys: u32) -> Self {
        self.max_keys = Some(max_keys);
        self
    }
}

impl Operation for ListObjectsRequest {
    type Output = ListObjectsResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(OperationInput::new("ListObjects", Method::GET)
            .with_bucket(self.bucket)
            .with_param("encoding-type", EncodingType::Url)
            .with_param_opt("prefix", self.prefix)
            .with_param_opt("delimiter", self.delimiter)
            .with_param_opt("marker", self.marker)
            .with_param_opt("max-keys", self.max_keys))
    }
}

impl PaginatedRequest for ListObjectsRequest {
    fn advance(&mut self, page: &ListObjectsResult) -> bool {
        match next_token(page.is_truncated, &self.marker, &page.next_marker) {
            Some(marker) => {
                self.marker = Some(marker);
                true
            }
            None => false,
        }
    }
}

/// Result of `ListObjects`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListObjectsResult {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub marker: Option<String>,
    #[serde(default)]
    pub max_keys: Option<u32>,
    #[serde(default)]
    pub delimiter: Option<String>,
    #[serde(default)]
    pub is_truncated: bool,
    #[serde(default)]
    pub next_marker: Option<String>,
    #[serde(default)]
    pub encoding_type: Option<EncodingType>,
    #[serde(rename = "Contents", default)]
    pub contents: Vec<ObjectProperties>,
    #[serde(default)]
    pub common_prefixes: Vec<CommonPrefix>,
    #[serde(skip)]
    pub common: ResultCommon,
}

impl FromOperationOutput for ListObjectsResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        let mut result: Self = output.xml()?;
        if is_url_encoded(&result.encoding_type) {
            decode_in_place(&mut result.prefix)?;
            decode_in_place(&mut result.marker)?;
            decode_in_place(&mut result.delimiter)?;
            decode_in_place(&mut result.next_marker)?;
            decode_listing(&mut result.contents, &mut result.common_prefixes)?;
        }
        result.common = output.common();
        Ok(result)
    }
}

/// List objects with continuation token based paging.
#[derive(Debug, Clone, Default)]
pub struct ListObjectsV2Request {
    pub bucket: String,
    pub prefix: Option<String>,
    pub delimiter: Option<String>,
    pub start_after: Option<String>,
    pub continuation_token: Option<String>,
    pub max_keys: Option<u32>,
    pub fetch_owner: Option<bool>,
}

impl ListObjectsV2Request {
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

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    pub fn with_start_after(mut self, start_after: impl Into<String>) -> Self {
        self.start_after = Some(start_after.into());
        self
    }

    pub fn with_continuation_token(mut self, token: impl Into<String>) -> Self {
        self.continuation_token = Some(token.into());
        self
    }

    pub fn with_max_keys(mut self, max_keys: u32) -> Self {
        self.max_keys = Some(max_keys);
        self
    }

    pub fn with_fetch_owner(mut self, fetch_owner: bool) -> Self {
        self.fetch_owner = Some(fetch_owner);
        self
    }
}

impl Operation for ListObjectsV2Request {
    type Output = ListObjectsV2Result;

    fn into_input(self) -> Result<OperationInput> {
        Ok(OperationInput::new("ListObjectsV2", Method::GET)
            .with_bucket(self.bucket)
            .with_param("list-type", 2)
            .with_param("encoding-type", EncodingType::Url)
            .with_param_opt("prefix", self.prefix)
            .with_param_opt("delimiter", self.delimiter)
            .with_param_opt("start-after", self.start_after)
            .with_param_opt("continuation-token", self.continuation_token)
            .with_param_opt("max-keys", self.max_keys)
            .with_param_opt("fetch-owner", self.fetch_owner))
    }
}

impl PaginatedRequest for ListObjectsV2Request {
    fn advance(&mut self, page: &ListObjectsV2Result) -> bool {
        let next = next_token(
            page.is_truncated,
            &self.continuation_token,
            &page.next_continuation_token,
        );
        match next {
            Some(token) => {
                self.continuation_token = Some(token);
                true
            }
            None => false,
        }
    }
}

/// Result of `ListObjectsV2`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListObjectsV2Result {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub start_after: Option<String>,
    #[serde(default)]
    pub continuation_token: Option<String>,
    #[serde(default)]
    pub next_continuation_token: Option<String>,
    #[serde(default)]
    pub max_keys: Option<u32>,
    #[serde(default)]
    pub key_count: Option<u32>,
    #[serde(default)]
    pub delimiter: Option<String>,
    #[serde(default)]
    pub is_truncated: bool,
    #[serde(default)]
    pub encoding_type: Option<EncodingType>,
    #[serde(rename = "Contents", default)]
    pub contents: Vec<ObjectProperties>,
    #[serde(default)]
    pub common_prefixes: Vec<CommonPrefix>,
    #[serde(skip)]
    pub common: ResultCommon,
}

impl FromOperationOutput for ListObjectsV2Result {
    fn from_output(output: OperationOutput) -> Result<Self> {
        let mut result: Self = output.xml()?;
        if is_url_encoded(&result.encoding_type) {
            decode_in_place(&mut result.prefix)?;
            decode_in_place(&mut result.start_after)?;
            decode_in_place(&mut result.delimiter)?;
            decode_listing(&mut result.contents, &mut result.common_prefixes)?;
        }
        result.common = output.common();
        Ok(result)
    }
}

/// Versioning configuration of a bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersioningConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VersioningStatus>,
}

/// Enable or suspend versioning.
#[derive(Debug, Clone)]
pub struct PutBucketVersioningRequest {
    pub bucket: String,
    pub status: VersioningStatus,
}

impl PutBucketVersioningRequest {
    pub fn new(bucket: impl Into<String>, status: VersioningStatus) -> Self {
        Self {
            bucket: bucket.into(),
            status,
        }
    }
}

impl Operation for PutBucketVersioningRequest {
    type Output = PutBucketVersioningResult;

    fn into_input(self) -> Result<OperationInput> {
        OperationInput::new("PutBucketVersioning", Method::PUT)
            .with_bucket(self.bucket)
            .with_sub_resource("versioning")
            .with_xml_body(
                "VersioningConfiguration",
                &VersioningConfiguration {
                    status: Some(self.status),
                },
            )
    }
}

empty_result!(
    /// Result of `PutBucketVersioning`.
    PutBucketVersioningResult
);

/// Get the versioning state of a bucket.
#[derive(Debug, Clone, Default)]
pub struct GetBucketVersioningRequest {
    pub bucket: String,
}

impl GetBucketVersioningRequest {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }
}

impl Operation for GetBucketVersioningRequest {
    type Output = GetBucketVersioningResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(OperationInput::new("GetBucketVersioning", Method::GET)
            .with_bucket(self.bucket)
            .with_sub_resource("versioning"))
    }
}

/// Result of `GetBucketVersioning`, `status` is empty if versioning was never enabled.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetBucketVersioningResult {
    #[serde(default)]
    pub status: Option<VersioningStatus>,
    #[serde(skip)]
    pub common: ResultCommon,
}

xml_result!(GetBucketVersioningResult);

/// List all versions of the objects in a bucket.
#[derive(Debug, Clone, Default)]
pub struct ListObjectVersionsRequest {
    pub bucket: String,
    pub prefix: Option<String>,
    pub delimiter: Option<String>,
    pub key_marker: Option<String>,
    pub version_id_marker: Option<String>,
    pub max_keys: Option<u32>,
}

impl ListObjectVersionsRequest {
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

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    pub fn with_key_marker(mut self, marker: impl Into<String>) -> Self {
        self.key_marker = Some(marker.into());
        self
    }

    pub fn with_version_id_marker(mut self, marker: impl Into<String>) -> Self {
        self.version_id_marker = Some(marker.into());
        self
    }

    pub fn with_max_keys(mut self, max_keys: u32) -> Self {
        self.max_keys = Some(max_keys);
        self
    }
}

impl Operation for ListObjectVersionsRequest {
    type Output = ListObjectVersionsResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(OperationInput::new("ListObjectVersions", Method::GET)
            .with_bucket(self.bucket)
            .with_sub_resource("versions")
            .with_param("encoding-type", EncodingType::Url)
            .with_param_opt("prefix", self.prefix)
            .with_param_opt("delimiter", self.delimiter)
            .with_param_opt("key-marker", self.key_marker)
            .with_param_opt("version-id-marker", self.version_id_marker)
            .with_param_opt("max-keys", self.max_keys))
    }
}

impl PaginatedRequest for ListObjectVersionsRequest {
    fn advance(&mut self, page: &ListObjectVersionsResult) -> bool {
        if !page.is_truncated {
            return false;
        }
        let Some(key_marker) = page.next_key_marker.clone().filter(|v| !v.is_empty()) else {
            return false;
        };
        let version_id_marker = page.next_version_id_marker.clone();
        if self.key_marker.as_ref() == Some(&key_marker)
            && self.version_id_marker == version_id_marker
        {
            return false;
        }
        self.key_marker = Some(key_marker);
        self.version_id_marker = version_id_marker;
        true
    }
}

/// A version of an object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectVersionProperties {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub version_id: Option<String>,
    #[serde(default)]
    pub is_latest: bool,
    #[serde(default, deserialize_with = "de_opt_time")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(rename = "ETag", default)]
    pub etag: Option<String>,
    #[serde(rename = "Type", default)]
    pub object_type: Option<ObjectType>,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub storage_class: Option<StorageClass>,
    #[serde(default)]
    pub owner: Option<Owner>,
    #[serde(default)]
    pub restore_info: Option<String>,
}

/// A delete marker of an object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteMarkerProperties {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub version_id: Option<String>,
    #[serde(default)]
    pub is_latest: bool,
    #[serde(default, deserialize_with = "de_opt_time")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub owner: Option<Owner>,
}

/// Result of `ListObjectVersions`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListObjectVersionsResult {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub key_marker: Option<String>,
    #[serde(default)]
    pub version_id_marker: Option<String>,
    #[serde(default)]
    pub next_key_marker: Option<String>,
    #[serde(default)]
    pub next_version_id_marker: Option<String>,
    #[serde(default)]
    pub max_keys: Option<u32>,
    #[serde(default)]
    pub delimiter: Option<String>,
    #[serde(default)]
    pub is_truncated: bool,
    #[serde(default)]
    pub encoding_type: Option<EncodingType>,
    #[serde(rename = "Version", default)]
    pub versions: Vec<ObjectVersionProperties>,
    #[serde(rename = "DeleteMarker", default)]
    pub delete_markers: Vec<DeleteMarkerProperties>,
    #[serde(default)]
    pub common_prefixes: Vec<CommonPrefix>,
    #[serde(skip)]
    pub common: ResultCommon,
}

impl FromOperationOutput for ListObjectVersionsResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        let mut result: Self = output.xml()?;
        if is_url_encoded(&result.encoding_type) {
            decode_in_place(&mut result.prefix)?;
            decode_in_place(&mut result.delimiter)?;
            decode_in_place(&mut result.key_marker)?;
            decode_in_place(&mut result.next_key_marker)?;
            for version in &mut result.versions {
                version.key = url_decode(&version.key)?;
            }
            for marker in &mut result.delete_markers {
                marker.key = url_decode(&marker.key)?;
            }
            decode_listing(&mut [], &mut result.common_prefixes)?;
        }
        result.common = output.common();
        Ok(result)
    }
}

client_methods! {
    /// Create a bucket.
    put_bucket(PutBucketRequest) -> PutBucketResult;
    /// Delete an empty bucket.
    delete_bucket(DeleteBucketRequest) -> DeleteBucketResult;
    get_bucket_info(GetBucketInfoRequest) -> GetBucketInfoResult;
    get_bucket_location(GetBucketLocationRequest) -> GetBucketLocationResult;
    get_bucket_stat(GetBucketStatRequest) -> GetBucketStatResult;
    list_objects(ListObjectsRequest) -> ListObjectsResult;
    /// List objects, see [`Client::paginate`] to walk all pages.
    list_objects_v2(ListObjectsV2Request) -> ListObjectsV2Result;
    put_bucket_versioning(PutBucketVersioningRequest) -> PutBucketVersioningResult;
    get_bucket_versioning(GetBucketVersioningRequest) -> GetBucketVersioningResult;
    list_object_versions(ListObjectVersionsRequest) -> ListObjectVersionsResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{HeaderMap, StatusCode};
    use pretty_assertions::assert_eq;

    fn output(op_name: &'static str, body: &str) -> OperationOutput {
        OperationOutput {
            op_name,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    #[test]
    fn test_put_bucket_input() {
        let input = PutBucketRequest::new("examplebucket")
            .with_acl(Acl::Private)
            .with_storage_class(StorageClass::IA)
            .with_data_redundancy_type(DataRedundancyType::LRS)
            .into_input()
            .unwrap();
        assert_eq!(input.method, Method::PUT);
        assert_eq!(input.bucket.as_deref(), Some("examplebucket"));
        assert_eq!(input.headers[X_OSS_ACL], "private");
        assert_eq!(
            input.body,
            "<CreateBucketConfiguration><StorageClass>IA</StorageClass>\
             <DataRedundancyType>LRS</DataRedundancyType></CreateBucketConfiguration>"
        );

        let input = PutBucketRequest::new("examplebucket").into_input().unwrap();
        assert!(input.body.is_empty());
    }

    #[test]
    fn test_get_bucket_info_result() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<BucketInfo>
  <Bucket>
    <AccessMonitor>Enabled</AccessMonitor>
    <CreationDate>2013-07-31T10:56:21.000Z</CreationDate>
    <ExtranetEndpoint>oss-cn-hangzhou.aliyuncs.com</ExtranetEndpoint>
    <IntranetEndpoint>oss-cn-hangzhou-internal.aliyuncs.com</IntranetEndpoint>
    <Location>oss-cn-hangzhou</Location>
    <StorageClass>Standard</StorageClass>
    <DataRedundancyType>LRS</DataRedundancyType>
    <Name>oss-example</Name>
    <ResourceGroupId>rg-aek27tc********</ResourceGroupId>
    <Versioning>Enabled</Versioning>
    <Owner>
      <DisplayName>username</DisplayName>
      <ID>27183473914****</ID>
    </Owner>
    <AccessControlList>
      <Grant>private</Grant>
    </AccessControlList>
    <ServerSideEncryptionRule>
      <SSEAlgorithm>KMS</SSEAlgorithm>
      <KMSMasterKeyID>key-id</KMSMasterKeyID>
    </ServerSideEncryptionRule>
    <BucketPolicy>
      <LogBucket>examplebucket</LogBucket>
      <LogPrefix>log/</LogPrefix>
    </BucketPolicy>
  </Bucket>
</BucketInfo>"#;
        let result = GetBucketInfoResult::from_output(output("GetBucketInfo", body)).unwrap();
        let info = result.bucket_info;
        assert_eq!(info.name, "oss-example");
        assert_eq!(info.storage_class, Some(StorageClass::Standard));
        assert_eq!(info.versioning, Some(VersioningStatus::Enabled));
        assert_eq!(info.access_control_list.unwrap().grant, Some(Acl::Private));
        assert_eq!(
            info.server_side_encryption_rule.unwrap().sse_algorithm.as_deref(),
            Some("KMS")
        );
        assert_eq!(info.bucket_policy.unwrap().log_prefix.as_deref(), Some("log/"));
        assert_eq!(info.creation_date.unwrap().timestamp(), 1375268181);
    }

    #[test]
    fn test_get_bucket_location_result() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<LocationConstraint>oss-cn-hangzhou</LocationConstraint>"#;
        let result =
            GetBucketLocationResult::from_output(output("GetBucketLocation", body)).unwrap();
        assert_eq!(result.location, "oss-cn-hangzhou");
    }

    #[test]
    fn test_get_bucket_stat_result() {
        let body = r#"<BucketStat>
  <Storage>1600</Storage>
  <ObjectCount>230</ObjectCount>
  <MultipartUploadCount>40</MultipartUploadCount>
  <LiveChannelCount>4</LiveChannelCount>
  <LastModifiedTime>1643341269</LastModifiedTime>
  <StandardStorage>430</StandardStorage>
  <StandardObjectCount>66</StandardObjectCount>
  <InfrequentAccessStorage>2359296</InfrequentAccessStorage>
  <InfrequentAccessRealStorage>360</InfrequentAccessRealStorage>
  <InfrequentAccessObjectCount>54</InfrequentAccessObjectCount>
</BucketStat>"#;
        let result = GetBucketStatResult::from_output(output("GetBucketStat", body)).unwrap();
        assert_eq!(result.storage, 1600);
        assert_eq!(result.object_count, 230);
        assert_eq!(result.last_modified_time, 1643341269);
        assert_eq!(result.infrequent_access_storage, 2359296);
        assert_eq!(result.archive_storage, 0);
    }

    #[test]
    fn test_list_objects_input() {
        let input = ListObjectsRequest::new("examplebucket")
            .with_prefix("fun/")
            .with_delimiter("/")
            .with_max_keys(100)
            .into_input()
            .unwrap();
        assert_eq!(
            input.query_string(),
            "delimiter=%2F&encoding-type=url&max-keys=100&prefix=fun%2F"
        );
    }

    #[test]
    fn test_list_objects_result_is_decoded() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult>
  <Name>examplebucket</Name>
  <Prefix>fun%2F</Prefix>
  <Marker></Marker>
  <MaxKeys>100</MaxKeys>
  <Delimiter>%2F</Delimiter>
  <IsTruncated>true</IsTruncated>
  <NextMarker>fun%2Fmovie%2F007.avi</NextMarker>
  <EncodingType>url</EncodingType>
  <Contents>
    <Key>fun%2Fmovie%2F001.avi</Key>
    <LastModified>2012-02-24T08:43:07.000Z</LastModified>
    <ETag>"5B3C1A2E053D763E1B002CC607C5A0FE1****"</ETag>
    <Type>Normal</Type>
    <Size>344606</Size>
    <StorageClass>Standard</StorageClass>
    <Owner>
      <ID>0022012****</ID>
      <DisplayName>user-example</DisplayName>
    </Owner>
  </Contents>
  <Contents>
    <Key>fun%2Fmovie%2F007.avi</Key>
    <Size>5</Size>
  </Contents>
  <CommonPrefixes>
    <Prefix>fun%2Ftest%2F</Prefix>
  </CommonPrefixes>
</ListBucketResult>"#;
        let result = ListObjectsResult::from_output(output("ListObjects", body)).unwrap();
        assert_eq!(result.prefix.as_deref(), Some("fun/"));
        assert_eq!(result.delimiter.as_deref(), Some("/"));
        assert_eq!(result.next_marker.as_deref(), Some("fun/movie/007.avi"));
        assert_eq!(result.contents.len(), 2);
        assert_eq!(result.contents[0].key, "fun/movie/001.avi");
        assert_eq!(result.contents[0].object_type, Some(ObjectType::Normal));
        assert_eq!(result.contents[0].size, 344606);
        assert_eq!(
            result.contents[0].etag.as_deref(),
            Some("\"5B3C1A2E053D763E1B002CC607C5A0FE1****\"")
        );
        assert_eq!(result.common_prefixes[0].prefix, "fun/test/");

        let mut request = ListObjectsRequest::new("examplebucket");
        assert!(request.advance(&result));
        assert_eq!(request.marker.as_deref(), Some("fun/movie/007.avi"));
    }

    #[test]
    fn test_list_objects_v2_input() {
        let input = ListObjectsV2Request::new("examplebucket")
            .with_start_after("b")
            .with_continuation_token("ChR")
            .with_fetch_owner(true)
            .into_input()
            .unwrap();
        assert_eq!(
            input.query_string(),
            "continuation-token=ChR&encoding-type=url&fetch-owner=true&list-type=2&start-after=b"
        );
    }

    #[test]
    fn test_list_objects_v2_result_keeps_raw_keys_without_encoding() {
        let body = r#"<ListBucketResult>
  <Name>examplebucket</Name>
  <MaxKeys>3</MaxKeys>
  <KeyCount>1</KeyCount>
  <IsTruncated>false</IsTruncated>
  <Contents>
    <Key>a%2Fb</Key>
    <Size>1</Size>
  </Contents>
</ListBucketResult>"#;
        let result = ListObjectsV2Result::from_output(output("ListObjectsV2", body)).unwrap();
        assert_eq!(result.contents[0].key, "a%2Fb");
        assert_eq!(result.key_count, Some(1));

        let mut request = ListObjectsV2Request::new("examplebucket");
        assert!(!request.advance(&result));
    }

    #[test]
    fn test_list_objects_v2_result_decodes_url_encoding() {
        let body = r#"<ListBucketResult>
  <Name>examplebucket</Name>
  <Prefix>dir%2F</Prefix>
  <StartAfter>dir%2Fa%20b</StartAfter>
  <Delimiter>%2F</Delimiter>
  <EncodingType>url</EncodingType>
  <IsTruncated>false</IsTruncated>
  <Contents>
    <Key>a%2Fb</Key>
    <Size>1</Size>
  </Contents>
  <CommonPrefixes>
    <Prefix>dir%2Fsub%2F</Prefix>
  </CommonPrefixes>
</ListBucketResult>"#;
        let result = ListObjectsV2Result::from_output(output("ListObjectsV2", body)).unwrap();
        assert_eq!(result.encoding_type, Some(EncodingType::Url));
        assert_eq!(result.prefix.as_deref(), Some("dir/"));
        assert_eq!(result.start_after.as_deref(), Some("dir/a b"));
        assert_eq!(result.delimiter.as_deref(), Some("/"));
        assert_eq!(result.contents[0].key, "a/b");
        assert_eq!(result.common_prefixes[0].prefix, "dir/sub/");
    }

    #[test]
    fn test_put_bucket_versioning_input() {
        let input = PutBucketVersioningRequest::new("examplebucket", VersioningStatus::Enabled)
            .into_input()
            .unwrap();
        assert_eq!(input.query_string(), "versioning");
        assert_eq!(
            input.body,
            "<VersioningConfiguration><Status>Enabled</Status></VersioningConfiguration>"
        );
    }

    #[test]
    fn test_get_bucket_versioning_result() {
        let result = GetBucketVersioningResult::from_output(output(
            "GetBucketVersioning",
            "<VersioningConfiguration></VersioningConfiguration>",
        ))
        .unwrap();
        assert_eq!(result.status, None);

        let result = GetBucketVersioningResult::from_output(output(
            "GetBucketVersioning",
            "<VersioningConfiguration><Status>Suspended</Status></VersioningConfiguration>",
        ))
        .unwrap();
        assert_eq!(result.status, Some(VersioningStatus::Suspended));
    }

    #[test]
    fn test_list_object_versions_result() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListVersionsResult>
  <Name>examplebucket</Name>
  <Prefix></Prefix>
  <KeyMarker>example</KeyMarker>
  <VersionIdMarker>CAEQMxiBgICbof2D0BYiIGRhZjgwMzJiMjA3MjQ0ODE5MWYx****</VersionIdMarker>
  <MaxKeys>100</MaxKeys>
  <Delimiter></Delimiter>
  <IsTruncated>true</IsTruncated>
  <NextKeyMarker>example%2Fnext</NextKeyMarker>
  <NextVersionIdMarker>v-next</NextVersionIdMarker>
  <EncodingType>url</EncodingType>
  <DeleteMarker>
    <Key>example%2Fa</Key>
    <VersionId>v-1</VersionId>
    <IsLatest>false</IsLatest>
    <LastModified>2019-04-09T07:27:28.000Z</LastModified>
  </DeleteMarker>
  <Version>
    <Key>example%2Fa</Key>
    <VersionId>v-2</VersionId>
    <IsLatest>true</IsLatest>
    <ETag>"250F8A0AE989679A22926A875F0A2****"</ETag>
    <Type>Normal</Type>
    <Size>93731</Size>
    <StorageClass>Standard</StorageClass>
  </Version>
  <DeleteMarker>
    <Key>example%2Fb</Key>
    <VersionId>v-3</VersionId>
    <IsLatest>true</IsLatest>
  </DeleteMarker>
</ListVersionsResult>"#;
        let result =
            ListObjectVersionsResult::from_output(output("ListObjectVersions", body)).unwrap();
        assert_eq!(result.versions.len(), 1);
        assert_eq!(result.delete_markers.len(), 2);
        assert_eq!(result.versions[0].key, "example/a");
        assert!(result.versions[0].is_latest);
        assert_eq!(result.delete_markers[1].key, "example/b");
        assert_eq!(result.next_key_marker.as_deref(), Some("example/next"));

        let mut request = ListObjectVersionsRequest::new("examplebucket");
        assert!(request.advance(&result));
        assert_eq!(request.key_marker.as_deref(), Some("example/next"));
        assert_eq!(request.version_id_marker.as_deref(), Some("v-next"));
        assert!(!request.advance(&result));
    }
}
