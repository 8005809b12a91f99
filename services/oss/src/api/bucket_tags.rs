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
//! Bucket tags.

use crate::operation::{
    FromOperationOutput, Operation, OperationInput, OperationOutput, ResultCommon,
};
use crate::types::{Tag, Tagging};
use alioss_core::Result;
use http::Method;

/// Replace the tags of a bucket.
#[derive(Debug, Clone, Default)]
pub struct PutBucketTagsRequest {
    pub bucket: String,
    pub tagging: Tagging,
}

impl PutBucketTagsRequest {
    pub fn new(bucket: impl Into<String>, tagging: Tagging) -> Self {
        Self {
            bucket: bucket.into(),
            tagging,
        }
    }
}

impl Operation for PutBucketTagsRequest {
    type Output = PutBucketTagsResult;

    fn into_input(self) -> Result<OperationInput> {
        OperationInput::new("PutBucketTags", Method::PUT)
            .with_bucket(self.bucket)
            .with_sub_resource("tagging")
            .with_xml_body("Tagging", &self.tagging)
    }
}

empty_result!(
    /// Result of `PutBucketTags`.
    PutBucketTagsResult
);

/// Get the tags of a bucket.
#[derive(Debug, Clone, Default)]
pub struct GetBucketTagsRequest {
    pub bucket: String,
}

impl GetBucketTagsRequest {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }
}

impl Operation for GetBucketTagsRequest {
    type Output = GetBucketTagsResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(OperationInput::new("GetBucketTags", Method::GET)
            .with_bucket(self.bucket)
            .with_sub_resource("tagging"))
    }
}

/// Result of `GetBucketTags`.
#[derive(Debug, Clone, Default)]
pub struct GetBucketTagsResult {
    pub tags: Vec<Tag>,
    pub common: ResultCommon,
}

impl FromOperationOutput for GetBucketTagsResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        let tagging: Tagging = output.xml()?;
        Ok(Self {
            tags: tagging.tag_set.tags,
            common: output.common(),
        })
    }
}

/// Delete all tags of a bucket, or only the listed keys.
#[derive(Debug, Clone, Default)]
pub struct DeleteBucketTagsRequest {
    pub bucket: String,
    pub keys: Vec<String>,
}

impl DeleteBucketTagsRequest {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            keys: Vec::new(),
        }
    }

    pub fn with_keys<S: Into<String>>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
        self.keys = keys.into_iter().map(Into::into).collect();
        self
    }
}

impl Operation for DeleteBucketTagsRequest {
    type Output = DeleteBucketTagsResult;

    fn into_input(self) -> Result<OperationInput> {
        let input =
            OperationInput::new("DeleteBucketTags", Method::DELETE).with_bucket(self.bucket);
        if self.keys.is_empty() {
            Ok(input.with_sub_resource("tagging"))
        } else {
            Ok(input.with_param("tagging", self.keys.join(",")))
        }
    }
}

empty_result!(
    /// Result of `DeleteBucketTags`.
    DeleteBucketTagsResult
);

client_methods! {
    put_bucket_tags(PutBucketTagsRequest) -> PutBucketTagsResult;
    get_bucket_tags(GetBucketTagsRequest) -> GetBucketTagsResult;
    delete_bucket_tags(DeleteBucketTagsRequest) -> DeleteBucketTagsResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CONTENT_MD5;
    use alioss_core::hash::base64_md5;
    use bytes::Bytes;
    use http::{HeaderMap, StatusCode};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_put_bucket_tags_input() {
        let input = PutBucketTagsRequest::new(
            "examplebucket",
            Tagging::new([("testa", "value1-test"), ("testb", "value2-test")]),
        )
        .into_input()
        .unwrap();
        assert_eq!(input.method, Method::PUT);
        assert_eq!(input.query_string(), "tagging");
        assert_eq!(
            input.body,
            "<Tagging><TagSet><Tag><Key>testa</Key><Value>value1-test</Value></Tag>\
             <Tag><Key>testb</Key><Value>value2-test</Value></Tag></TagSet></Tagging>"
        );
        assert_eq!(input.headers[CONTENT_MD5], base64_md5(&input.body).as_str());
    }

    #[test]
    fn test_get_bucket_tags_result() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<Tagging>
  <TagSet>
    <Tag>
      <Key>testa</Key>
      <Value>value1-test</Value>
    </Tag>
    <Tag>
      <Key>testb</Key>
      <Value>value2-test</Value>
    </Tag>
  </TagSet>
</Tagging>"#;
        let result = GetBucketTagsResult::from_output(OperationOutput {
            op_name: "GetBucketTags",
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::from(body),
        })
        .unwrap();
        assert_eq!(
            result.tags,
            vec![Tag::new("testa", "value1-test"), Tag::new("testb", "value2-test")]
        );
    }

    #[test]
    fn test_delete_bucket_tags_input() {
        let input = DeleteBucketTagsRequest::new("examplebucket").into_input().unwrap();
        assert_eq!(input.query_string(), "tagging");

        let input = DeleteBucketTagsRequest::new("examplebucket")
            .with_keys(["k1", "k2"])
            .into_input()
            .unwrap();
        assert_eq!(input.method, Method::DELETE);
        assert_eq!(input.query_string(), "tagging=k1%2Ck2");
    }
}
