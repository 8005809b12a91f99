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
//! Vector buckets.
//!
//! Vector buckets are served by the `oss-vectors` endpoint of a region and
//! addressed as `{bucket}-{account_id}`, so [`Config::account_id`] must be
//! set. Requests and responses are json, requests are always signed with V4.
//!
//! [`Config::account_id`]: crate::Config::account_id

use super::de_opt_time;
use crate::constants::X_OSS_RESOURCE_GROUP_ID;
use crate::operation::{Operation, OperationInput, Product, ResultCommon};
use crate::paginator::{next_token, PaginatedRequest};
use crate::types::{DistanceMetric, VectorDataType};
use alioss_core::{Error, Result};
use chrono::{DateTime, Utc};
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata attached to a vector.
pub type VectorMetadata = Map<String, Value>;

fn bucket_input(op_name: &'static str, method: Method, bucket: String) -> OperationInput {
    OperationInput::new(op_name, method)
        .with_product(Product::Vectors)
        .with_bucket(bucket)
}

/// Build a `POST /?{action}` input with `body` as json.
fn action_input<T: Serialize>(
    op_name: &'static str,
    bucket: String,
    action: &str,
    index_name: &str,
    body: &T,
) -> Result<OperationInput> {
    if index_name.is_empty() {
        return Err(Error::request_invalid(format!(
            "{op_name}: missing required field index_name"
        )));
    }
    bucket_input(op_name, Method::POST, bucket)
        .with_sub_resource(action)
        .with_json_body(body)
}

/// Create a vector bucket.
#[derive(Debug, Clone, Default)]
pub struct PutVectorBucketRequest {
    pub bucket: String,
    pub resource_group_id: Option<String>,
}

impl PutVectorBucketRequest {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            resource_group_id: None,
        }
    }
}

impl Operation for PutVectorBucketRequest {
    type Output = PutVectorBucketResult;

    fn into_input(self) -> Result<OperationInput> {
        bucket_input("PutVectorBucket", Method::PUT, self.bucket)
            .with_header_opt(X_OSS_RESOURCE_GROUP_ID, self.resource_group_id)
    }
}

empty_result!(
    /// Result of `PutVectorBucket`.
    PutVectorBucketResult
);

#[derive(Debug, Clone)]
pub struct GetVectorBucketRequest {
    pub bucket: String,
}

impl GetVectorBucketRequest {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }
}

impl Operation for GetVectorBucketRequest {
    type Output = GetVectorBucketResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(bucket_input("GetVectorBucket", Method::GET, self.bucket)
            .with_sub_resource("bucketInfo"))
    }
}

/// Summary of a vector bucket.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VectorBucketInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "de_opt_time")]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub extranet_endpoint: Option<String>,
    #[serde(default)]
    pub intranet_endpoint: Option<String>,
    #[serde(default)]
    pub resource_group_id: Option<String>,
}

/// Result of `GetVectorBucket`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetVectorBucketResult {
    #[serde(rename = "BucketInfo", default)]
    pub bucket_info: VectorBucketInfo,
    #[serde(skip)]
    pub common: ResultCommon,
}

json_result!(GetVectorBucketResult);

/// Delete an empty vector bucket.
#[derive(Debug, Clone)]
pub struct DeleteVectorBucketRequest {
    pub bucket: String,
}

impl DeleteVectorBucketRequest {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }
}

impl Operation for DeleteVectorBucketRequest {
    type Output = DeleteVectorBucketResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(bucket_input("DeleteVectorBucket", Method::DELETE, self.bucket))
    }
}

empty_result!(
    /// Result of `DeleteVectorBucket`.
    DeleteVectorBucketResult
);

/// List the vector buckets of the account in the region.
#[derive(Debug, Clone, Default)]
pub struct ListVectorBucketsRequest {
    pub prefix: Option<String>,
    pub marker: Option<String>,
    pub max_keys: Option<u32>,
    pub resource_group_id: Option<String>,
}

impl ListVectorBucketsRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_max_keys(mut self, max_keys: u32) -> Self {
        self.max_keys = Some(max_keys);
        self
    }
}

impl Operation for ListVectorBucketsRequest {
    type Output = ListVectorBucketsResult;

    fn into_input(self) -> Result<OperationInput> {
        OperationInput::new("ListVectorBuckets", Method::GET)
            .with_product(Product::Vectors)
            .with_param_opt("prefix", self.prefix)
            .with_param_opt("marker", self.marker)
            .with_param_opt("max-keys", self.max_keys)
            .with_header_opt(X_OSS_RESOURCE_GROUP_ID, self.resource_group_id)
    }
}

impl PaginatedRequest for ListVectorBucketsRequest {
    fn advance(&mut self, page: &ListVectorBucketsResult) -> bool {
        match next_token(page.is_truncated, &self.marker, &page.next_marker) {
            Some(marker) => {
                self.marker = Some(marker);
                true
            }
            None => false,
        }
    }
}

/// Result of `ListVectorBuckets`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListVectorBucketsResult {
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
    pub buckets: Vec<VectorBucketInfo>,
    #[serde(skip)]
    pub common: ResultCommon,
}

json_result!(ListVectorBucketsResult);

/// Metadata handling of an index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorIndexMetadata {
    /// Metadata keys stored but not usable in query filters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_filterable_metadata_keys: Vec<String>,
}

/// Create an index in a vector bucket.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PutVectorIndexRequest {
    #[serde(skip)]
    pub bucket: String,
    pub index_name: String,
    pub data_type: VectorDataType,
    pub dimension: u32,
    pub distance_metric: DistanceMetric,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<VectorIndexMetadata>,
}

impl PutVectorIndexRequest {
    pub fn new(
        bucket: impl Into<String>,
        index_name: impl Into<String>,
        dimension: u32,
        distance_metric: DistanceMetric,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            index_name: index_name.into(),
            data_type: VectorDataType::Float32,
            dimension,
            distance_metric,
            metadata: None,
        }
    }

    pub fn with_non_filterable_metadata_keys(mut self, keys: Vec<String>) -> Self {
        self.metadata = Some(VectorIndexMetadata {
            non_filterable_metadata_keys: keys,
        });
        self
    }
}

impl Operation for PutVectorIndexRequest {
    type Output = PutVectorIndexResult;

    fn into_input(self) -> Result<OperationInput> {
        if self.dimension == 0 {
            return Err(Error::request_invalid("PutVectorIndex: dimension must be positive"));
        }
        action_input(
            "PutVectorIndex",
            self.bucket.clone(),
            "putVectorIndex",
            &self.index_name,
            &self,
        )
    }
}

empty_result!(
    /// Result of `PutVectorIndex`.
    PutVectorIndexResult
);

/// A request naming only an index.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexBody<'a> {
    index_name: &'a str,
}

#[derive(Debug, Clone)]
pub struct GetVectorIndexRequest {
    pub bucket: String,
    pub index_name: String,
}

impl GetVectorIndexRequest {
    pub fn new(bucket: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            index_name: index_name.into(),
        }
    }
}

impl Operation for GetVectorIndexRequest {
    type Output = GetVectorIndexResult;

    fn into_input(self) -> Result<OperationInput> {
        let body = IndexBody {
            index_name: &self.index_name,
        };
        action_input(
            "GetVectorIndex",
            self.bucket.clone(),
            "getVectorIndex",
            &self.index_name,
            &body,
        )
    }
}

/// Description of a vector index.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorIndex {
    #[serde(default)]
    pub index_name: String,
    #[serde(default)]
    pub data_type: Option<VectorDataType>,
    #[serde(default)]
    pub dimension: Option<u32>,
    #[serde(default)]
    pub distance_metric: Option<DistanceMetric>,
    #[serde(default)]
    pub metadata: Option<VectorIndexMetadata>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "de_opt_time")]
    pub create_time: Option<DateTime<Utc>>,
}

/// Result of `GetVectorIndex`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetVectorIndexResult {
    #[serde(default)]
    pub index: VectorIndex,
    #[serde(skip)]
    pub common: ResultCommon,
}

json_result!(GetVectorIndexResult);

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListVectorIndexesRequest {
    #[serde(skip)]
    pub bucket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl ListVectorIndexesRequest {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }
}

impl Operation for ListVectorIndexesRequest {
    type Output = ListVectorIndexesResult;

    fn into_input(self) -> Result<OperationInput> {
        bucket_input("ListVectorIndexes", Method::POST, self.bucket.clone())
            .with_sub_resource("listVectorIndexes")
            .with_json_body(&self)
    }
}

impl PaginatedRequest for ListVectorIndexesRequest {
    fn advance(&mut self, page: &ListVectorIndexesResult) -> bool {
        match next_token(true, &self.next_token, &page.next_token) {
            Some(token) => {
                self.next_token = Some(token);
                true
            }
            None => false,
        }
    }
}

/// Result of `ListVectorIndexes`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListVectorIndexesResult {
    #[serde(default)]
    pub indexes: Vec<VectorIndex>,
    #[serde(default)]
    pub next_token: Option<String>,
    #[serde(skip)]
    pub common: ResultCommon,
}

json_result!(ListVectorIndexesResult);

#[derive(Debug, Clone)]
pub struct DeleteVectorIndexRequest {
    pub bucket: String,
    pub index_name: String,
}

impl DeleteVectorIndexRequest {
    pub fn new(bucket: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            index_name: index_name.into(),
        }
    }
}

impl Operation for DeleteVectorIndexRequest {
    type Output = DeleteVectorIndexResult;

    fn into_input(self) -> Result<OperationInput> {
        let body = IndexBody {
            index_name: &self.index_name,
        };
        action_input(
            "DeleteVectorIndex",
            self.bucket.clone(),
            "deleteVectorIndex",
            &self.index_name,
            &body,
        )
    }
}

empty_result!(
    /// Result of `DeleteVectorIndex`.
    DeleteVectorIndexResult
);

/// Vector components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorData {
    #[serde(default)]
    pub float32: Vec<f32>,
}

impl From<Vec<f32>> for VectorData {
    fn from(float32: Vec<f32>) -> Self {
        Self { float32 }
    }
}

/// A vector stored in an index, or returned by a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    #[serde(default)]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<VectorData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<VectorMetadata>,
    /// Only set in query results.
    #[serde(default, skip_serializing)]
    pub distance: Option<f32>,
}

impl Vector {
    pub fn new(key: impl Into<String>, data: impl Into<VectorData>) -> Self {
        Self {
            key: key.into(),
            data: Some(data.into()),
            ..Default::default()
        }
    }

    pub fn with_metadata(mut self, metadata: VectorMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Insert or overwrite vectors.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PutVectorsRequest {
    #[serde(skip)]
    pub bucket: String,
    pub index_name: String,
    pub vectors: Vec<Vector>,
}

impl PutVectorsRequest {
    pub fn new(
        bucket: impl Into<String>,
        index_name: impl Into<String>,
        vectors: Vec<Vector>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            index_name: index_name.into(),
            vectors,
        }
    }
}

impl Operation for PutVectorsRequest {
    type Output = PutVectorsResult;

    fn into_input(self) -> Result<OperationInput> {
        if self.vectors.is_empty() {
            return Err(Error::request_invalid("PutVectors: vectors is empty"));
        }
        action_input(
            "PutVectors",
            self.bucket.clone(),
            "putVectors",
            &self.index_name,
            &self,
        )
    }
}

empty_result!(
    /// Result of `PutVectors`.
    PutVectorsResult
);

/// Fetch vectors by key.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetVectorsRequest {
    #[serde(skip)]
    pub bucket: String,
    pub index_name: String,
    pub keys: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_data: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_metadata: Option<bool>,
}

impl GetVectorsRequest {
    pub fn new(
        bucket: impl Into<String>,
        index_name: impl Into<String>,
        keys: Vec<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            index_name: index_name.into(),
            keys,
            ..Default::default()
        }
    }

    pub fn with_return_data(mut self, return_data: bool) -> Self {
        self.return_data = Some(return_data);
        self
    }

    pub fn with_return_metadata(mut self, return_metadata: bool) -> Self {
        self.return_metadata = Some(return_metadata);
        self
    }
}

impl Operation for GetVectorsRequest {
    type Output = GetVectorsResult;

    fn into_input(self) -> Result<OperationInput> {
        action_input(
            "GetVectors",
            self.bucket.clone(),
            "getVectors",
            &self.index_name,
            &self,
        )
    }
}

/// Vectors returned by `GetVectors`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetVectorsResult {
    #[serde(default)]
    pub vectors: Vec<Vector>,
    #[serde(skip)]
    pub common: ResultCommon,
}

json_result!(GetVectorsResult);

/// Scan the vectors of an index.
///
/// Large indexes can be scanned in parallel by giving each worker a distinct
/// `segment_index` out of `segment_count`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListVectorsRequest {
    #[serde(skip)]
    pub bucket: String,
    pub index_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_data: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_metadata: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_index: Option<u32>,
}

impl ListVectorsRequest {
    pub fn new(bucket: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            index_name: index_name.into(),
            ..Default::default()
        }
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn with_segment(mut self, segment_index: u32, segment_count: u32) -> Self {
        self.segment_index = Some(segment_index);
        self.segment_count = Some(segment_count);
        self
    }
}

impl Operation for ListVectorsRequest {
    type Output = ListVectorsResult;

    fn into_input(self) -> Result<OperationInput> {
        if let (Some(index), Some(count)) = (self.segment_index, self.segment_count) {
            if index >= count {
                return Err(Error::request_invalid(format!(
                    "ListVectors: segment index {index} is out of {count} segments"
                )));
            }
        }
        action_input(
            "ListVectors",
            self.bucket.clone(),
            "listVectors",
            &self.index_name,
            &self,
        )
    }
}

impl PaginatedRequest for ListVectorsRequest {
    fn advance(&mut self, page: &ListVectorsResult) -> bool {
        match next_token(true, &self.next_token, &page.next_token) {
            Some(token) => {
                self.next_token = Some(token);
                true
            }
            None => false,
        }
    }
}

/// Result of `ListVectors`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListVectorsResult {
    #[serde(default)]
    pub vectors: Vec<Vector>,
    #[serde(default)]
    pub next_token: Option<String>,
    #[serde(skip)]
    pub common: ResultCommon,
}

json_result!(ListVectorsResult);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteVectorsRequest {
    #[serde(skip)]
    pub bucket: String,
    pub index_name: String,
    pub keys: Vec<String>,
}

impl DeleteVectorsRequest {
    pub fn new(
        bucket: impl Into<String>,
        index_name: impl Into<String>,
        keys: Vec<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            index_name: index_name.into(),
            keys,
        }
    }
}

impl Operation for DeleteVectorsRequest {
    type Output = DeleteVectorsResult;

    fn into_input(self) -> Result<OperationInput> {
        if self.keys.is_empty() {
            return Err(Error::request_invalid("DeleteVectors: keys is empty"));
        }
        action_input(
            "DeleteVectors",
            self.bucket.clone(),
            "deleteVectors",
            &self.index_name,
            &self,
        )
    }
}

empty_result!(
    /// Result of `DeleteVectors`.
    DeleteVectorsResult
);

/// Find the vectors nearest to `query_vector`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryVectorsRequest {
    #[serde(skip)]
    pub bucket: String,
    pub index_name: String,
    pub query_vector: VectorData,
    pub top_k: u32,
    /// Metadata filter such as `{"$and": [{"type": {"$in": ["comedy"]}}]}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_distance: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_metadata: Option<bool>,
}

impl QueryVectorsRequest {
    pub fn new(
        bucket: impl Into<String>,
        index_name: impl Into<String>,
        query_vector: impl Into<VectorData>,
        top_k: u32,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            index_name: index_name.into(),
            query_vector: query_vector.into(),
            top_k,
            filter: None,
            return_distance: None,
            return_metadata: None,
        }
    }

    pub fn with_filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_return_distance(mut self, return_distance: bool) -> Self {
        self.return_distance = Some(return_distance);
        self
    }

    pub fn with_return_metadata(mut self, return_metadata: bool) -> Self {
        self.return_metadata = Some(return_metadata);
        self
    }
}

impl Operation for QueryVectorsRequest {
    type Output = QueryVectorsResult;

    fn into_input(self) -> Result<OperationInput> {
        if self.top_k == 0 {
            return Err(Error::request_invalid("QueryVectors: top_k must be positive"));
        }
        if self.query_vector.float32.is_empty() {
            return Err(Error::request_invalid("QueryVectors: query vector is empty"));
        }
        action_input(
            "QueryVectors",
            self.bucket.clone(),
            "queryVectors",
            &self.index_name,
            &self,
        )
    }
}

/// Nearest vectors, closest first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryVectorsResult {
    #[serde(default)]
    pub vectors: Vec<Vector>,
    #[serde(skip)]
    pub common: ResultCommon,
}

json_result!(QueryVectorsResult);

client_methods! {
    put_vector_bucket(PutVectorBucketRequest) -> PutVectorBucketResult;
    get_vector_bucket(GetVectorBucketRequest) -> GetVectorBucketResult;
    delete_vector_bucket(DeleteVectorBucketRequest) -> DeleteVectorBucketResult;
    list_vector_buckets(ListVectorBucketsRequest) -> ListVectorBucketsResult;
    put_vector_index(PutVectorIndexRequest) -> PutVectorIndexResult;
    get_vector_index(GetVectorIndexRequest) -> GetVectorIndexResult;
    list_vector_indexes(ListVectorIndexesRequest) -> ListVectorIndexesResult;
    delete_vector_index(DeleteVectorIndexRequest) -> DeleteVectorIndexResult;
    put_vectors(PutVectorsRequest) -> PutVectorsResult;
    get_vectors(GetVectorsRequest) -> GetVectorsResult;
    list_vectors(ListVectorsRequest) -> ListVectorsResult;
    delete_vectors(DeleteVectorsRequest) -> DeleteVectorsResult;
    /// Run a similarity search.
    query_vectors(QueryVectorsRequest) -> QueryVectorsResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{FromOperationOutput, OperationOutput};
    use crate::provide_credential::StaticCredentialProvider;
    use crate::testing::MockHttpSend;
    use crate::{Client, Config};
    use alioss_core::{Context, ErrorKind};
    use bytes::Bytes;
    use http::header::{AUTHORIZATION, CONTENT_TYPE};
    use http::{HeaderMap, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn output(op_name: &'static str, body: &str) -> OperationOutput {
        OperationOutput {
            op_name,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn body_json(input: &OperationInput) -> Value {
        serde_json::from_slice(&input.body).unwrap()
    }

    fn client(http: MockHttpSend) -> Client {
        let config = Config {
            account_id: Some("1234567890".to_string()),
            ..Config::new("cn-hangzhou")
        };
        Client::new(Context::new().with_http_send(http), config)
            .unwrap()
            .with_credential_provider(StaticCredentialProvider::new("ak", "sk"))
            .unwrap()
    }

    #[test]
    fn test_put_vector_index_input() {
        let input = PutVectorIndexRequest::new("vbk", "index1", 3, DistanceMetric::Cosine)
            .with_non_filterable_metadata_keys(vec!["raw".to_string()])
            .into_input()
            .unwrap();
        assert_eq!(input.method, Method::POST);
        assert_eq!(input.product, Product::Vectors);
        assert_eq!(input.query_string(), "putVectorIndex");
        assert_eq!(input.headers[CONTENT_TYPE], "application/json");
        assert_eq!(
            body_json(&input),
            json!({
                "indexName": "index1",
                "dataType": "float32",
                "dimension": 3,
                "distanceMetric": "cosine",
                "metadata": {"nonFilterableMetadataKeys": ["raw"]},
            })
        );

        let err = PutVectorIndexRequest::new("vbk", "", 3, DistanceMetric::Cosine)
            .into_input()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_put_vectors_input() {
        let mut metadata = VectorMetadata::new();
        metadata.insert("genre".to_string(), json!("comedy"));
        let input = PutVectorsRequest::new(
            "vbk",
            "index1",
            vec![Vector::new("doc-1", vec![0.5, 1.0]).with_metadata(metadata)],
        )
        .into_input()
        .unwrap();
        assert_eq!(
            body_json(&input),
            json!({
                "indexName": "index1",
                "vectors": [{
                    "key": "doc-1",
                    "data": {"float32": [0.5, 1.0]},
                    "metadata": {"genre": "comedy"},
                }],
            })
        );

        let err = PutVectorsRequest::new("vbk", "index1", vec![])
            .into_input()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_query_vectors() {
        let input = QueryVectorsRequest::new("vbk", "index1", vec![0.25, 0.5], 2)
            .with_filter(json!({"genre": {"$eq": "comedy"}}))
            .with_return_distance(true)
            .into_input()
            .unwrap();
        assert_eq!(input.query_string(), "queryVectors");
        assert_eq!(
            body_json(&input),
            json!({
                "indexName": "index1",
                "queryVector": {"float32": [0.25, 0.5]},
                "topK": 2,
                "filter": {"genre": {"$eq": "comedy"}},
                "returnDistance": true,
            })
        );

        let body = r#"{"vectors":[
            {"key":"doc-1","distance":0.125},
            {"key":"doc-2","distance":0.5}
        ]}"#;
        let result = QueryVectorsResult::from_output(output("QueryVectors", body)).unwrap();
        assert_eq!(result.vectors.len(), 2);
        assert_eq!(result.vectors[0].key, "doc-1");
        assert_eq!(result.vectors[0].distance, Some(0.125));
        assert!(result.vectors[0].data.is_none());

        let err = QueryVectorsRequest::new("vbk", "index1", vec![0.25], 0)
            .into_input()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_list_vectors_paging() {
        let err = ListVectorsRequest::new("vbk", "index1")
            .with_segment(4, 4)
            .into_input()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);

        let body = r#"{"vectors":[{"key":"a","data":{"float32":[1.0]}}],"nextToken":"t2"}"#;
        let page = ListVectorsResult::from_output(output("ListVectors", body)).unwrap();
        assert_eq!(page.vectors[0].data, Some(VectorData::from(vec![1.0])));

        let mut request = ListVectorsRequest::new("vbk", "index1").with_max_results(1);
        assert!(request.advance(&page));
        assert_eq!(request.next_token.as_deref(), Some("t2"));
        assert!(!request.advance(&page));
        assert_eq!(
            body_json(&request.into_input().unwrap()),
            json!({"indexName": "index1", "maxResults": 1, "nextToken": "t2"})
        );
    }

    #[test]
    fn test_vector_bucket_results() {
        let body = r#"{"BucketInfo":{"Name":"vbk","Location":"oss-cn-hangzhou",
            "Region":"cn-hangzhou","CreationDate":"2025-07-01T08:00:00.000Z"}}"#;
        let result = GetVectorBucketResult::from_output(output("GetVectorBucket", body)).unwrap();
        assert_eq!(result.bucket_info.name, "vbk");
        assert_eq!(result.bucket_info.region.as_deref(), Some("cn-hangzhou"));
        assert!(result.bucket_info.creation_date.is_some());

        let body = r#"{"Prefix":"v","MaxKeys":1,"IsTruncated":true,"NextMarker":"vbk",
            "Buckets":[{"Name":"vbk","Region":"cn-hangzhou"}]}"#;
        let page = ListVectorBucketsResult::from_output(output("ListVectorBuckets", body)).unwrap();
        assert_eq!(page.buckets.len(), 1);
        let mut request = ListVectorBucketsRequest::new().with_prefix("v").with_max_keys(1);
        assert!(request.advance(&page));
        assert_eq!(request.marker.as_deref(), Some("vbk"));

        let result = DeleteVectorIndexResult::from_output(output("DeleteVectorIndex", "")).unwrap();
        assert!(result.common.request_id().is_none());
    }

    #[test]
    fn test_get_vector_index_result() {
        let body = r#"{"index":{"indexName":"index1","dataType":"float32","dimension":3,
            "distanceMetric":"euclidean","status":"enable"}}"#;
        let result = GetVectorIndexResult::from_output(output("GetVectorIndex", body)).unwrap();
        assert_eq!(result.index.index_name, "index1");
        assert_eq!(result.index.dimension, Some(3));
        assert_eq!(result.index.distance_metric, Some(DistanceMetric::Euclidean));
    }

    #[tokio::test]
    async fn test_vectors_pipeline() {
        let http = MockHttpSend::new().with_response(200, r#"{"vectors":[]}"#);
        let client = client(http.clone());

        let result = client
            .get_vectors(GetVectorsRequest::new("vbk", "index1", vec!["doc-1".to_string()]))
            .await
            .unwrap();
        assert!(result.vectors.is_empty());

        let reqs = http.requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(
            reqs[0].uri().to_string(),
            "https://vbk-1234567890.cn-hangzhou.oss-vectors.aliyuncs.com/?getVectors"
        );
        let auth = reqs[0].headers()[AUTHORIZATION].to_str().unwrap();
        assert!(auth.starts_with("OSS4-HMAC-SHA256 Credential=ak/"));
        assert!(auth.contains("/cn-hangzhou/oss-vectors/aliyun_v4_request"));
    }

    #[tokio::test]
    async fn test_vectors_bucket_name_validated() {
        let http = MockHttpSend::new().with_response(200, r#"{"vectors":[]}"#);
        let err = client(http.clone())
            .get_vectors(GetVectorsRequest::new("vb", "index1", vec!["doc-1".to_string()]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
        assert!(http.requests().is_empty());
    }

    #[tokio::test]
    async fn test_vectors_json_error() {
        let body = r#"{"Error":{"Code":"NoSuchVectorIndex","Message":"not found",
            "RequestId":"5C3D9175B6FC201293AD****"}}"#;
        let http = MockHttpSend::new().with_response(404, body);
        let client = client(http);

        let err = client
            .delete_vector_index(DeleteVectorIndexRequest::new("vbk", "missing"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServiceError);
        let service = crate::ServiceError::downcast(&err).unwrap();
        assert_eq!(service.code, "NoSuchVectorIndex");
    }
}
