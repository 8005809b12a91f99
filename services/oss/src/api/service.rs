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
//! Service level operations.

use super::de_opt_time;
use crate::constants::X_OSS_RESOURCE_GROUP_ID;
use crate::operation::{Operation, OperationInput, ResultCommon};
use crate::paginator::{next_token, PaginatedRequest};
use crate::types::{DataRedundancyType, Owner, StorageClass};
use alioss_core::Result;
use chrono::{DateTime, Utc};
use http::Method;
use serde::Deserialize;

xml_list!(de_buckets, "Bucket");

/// List the buckets owned by the requester.
#[derive(Debug, Clone, Default)]
pub struct ListBucketsRequest {
    pub prefix: Option<String>,
    pub marker: Option<String>,
    pub max_keys: Option<u32>,
    pub resource_group_id: Option<String>,
}

impl ListBucketsRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
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

    pub fn with_resource_group_id(mut self, id: impl Into<String>) -> Self {
        self.resource_group_id = Some(id.into());
        self
    }
}

impl Operation for ListBucketsRequest {
    type Output = ListBucketsResult;

    fn into_input(self) -> Result<OperationInput> {
        OperationInput::new("ListBuckets", Method::GET)
            .with_param_opt("prefix", self.prefix)
            .with_param_opt("marker", self.marker)
            .with_param_opt("max-keys", self.max_keys)
            .with_header_opt(X_OSS_RESOURCE_GROUP_ID, self.resource_group_id)
    }
}

impl PaginatedRequest for ListBucketsRequest {
    fn advance(&mut self, page: &ListBucketsResult) -> bool {
        match next_token(page.is_truncated, &self.marker, &page.next_marker) {
            Some(marker) => {
                self.marker = Some(marker);
                true
            }
            None => false,
        }
    }
}

/// A bucket in a `ListBuckets` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketSummary {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "de_opt_time")]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub storage_class: Option<StorageClass>,
    #[serde(default)]
    pub data_redundancy_type: Option<DataRedundancyType>,
    #[serde(default)]
    pub extranet_endpoint: Option<String>,
    #[serde(default)]
    pub intranet_endpoint: Option<String>,
    #[serde(default)]
    pub resource_group_id: Option<String>,
}

/// Result of `ListBuckets`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename = "ListAllMyBucketsResult", rename_all = "PascalCase")]
pub struct ListBucketsResult {
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub marker: Option<String>,
    #[serde(default)]
    pub max_keys: Option<u32>,
    #[serde(default)]
    pub is_truncated: bool,
    #[serde(default)]
    pub next_marker: Option<String>,
    #[serde(default)]
    pub owner: Option<Owner>,
    #[serde(default, deserialize_with = "de_buckets")]
    pub buckets: Vec<BucketSummary>,
    #[serde(skip)]
    pub common: ResultCommon,
}

xml_result!(ListBucketsResult);

client_methods! {
    /// List buckets, see [`Client::paginate`] to walk all pages.
    list_buckets(ListBucketsRequest) -> ListBucketsResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{FromOperationOutput, OperationOutput};
    use bytes::Bytes;
    use http::{HeaderMap, StatusCode};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_list_buckets_input() {
        let input = ListBucketsRequest::new()
            .with_prefix("my")
            .with_max_keys(10)
            .with_resource_group_id("rg-1")
            .into_input()
            .unwrap();
        assert_eq!(input.method, Method::GET);
        assert!(input.bucket.is_none());
        assert_eq!(input.query_string(), "max-keys=10&prefix=my");
        assert_eq!(input.headers[X_OSS_RESOURCE_GROUP_ID], "rg-1");
    }

    #[test]
    fn test_list_buckets_result() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListAllMyBucketsResult>
  <Prefix>my</Prefix>
  <Marker>mybucket</Marker>
  <MaxKeys>10</MaxKeys>
  <IsTruncated>true</IsTruncated>
  <NextMarker>mybucket10</NextMarker>
  <Owner>
    <ID>512**</ID>
    <DisplayName>51264</DisplayName>
  </Owner>
  <Buckets>
    <Bucket>
      <CreationDate>2014-02-07T18:12:43.000Z</CreationDate>
      <ExtranetEndpoint>oss-cn-shanghai.aliyuncs.com</ExtranetEndpoint>
      <IntranetEndpoint>oss-cn-shanghai-internal.aliyuncs.com</IntranetEndpoint>
      <Location>oss-cn-shanghai</Location>
      <Name>app-base-oss</Name>
      <Region>cn-shanghai</Region>
      <StorageClass>Standard</StorageClass>
    </Bucket>
    <Bucket>
      <CreationDate>2014-02-25T11:21:04.000Z</CreationDate>
      <Location>oss-cn-hangzhou</Location>
      <Name>mybucket</Name>
      <StorageClass>IA</StorageClass>
    </Bucket>
  </Buckets>
</ListAllMyBucketsResult>"#;
        let result = ListBucketsResult::from_output(OperationOutput {
            op_name: "ListBuckets",
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::from(body),
        })
        .unwrap();

        assert!(result.is_truncated);
        assert_eq!(result.next_marker.as_deref(), Some("mybucket10"));
        assert_eq!(result.owner.as_ref().unwrap().id, "512**");
        assert_eq!(result.buckets.len(), 2);
        assert_eq!(result.buckets[0].name, "app-base-oss");
        assert_eq!(result.buckets[0].region.as_deref(), Some("cn-shanghai"));
        assert_eq!(result.buckets[1].storage_class, Some(StorageClass::IA));
        assert_eq!(result.common.status_code, 200);

        let mut request = ListBucketsRequest::new();
        assert!(request.advance(&result));
        assert_eq!(request.marker.as_deref(), Some("mybucket10"));
    }
}
