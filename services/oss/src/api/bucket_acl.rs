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
//! Bucket access control.

use crate::constants::X_OSS_ACL;
use crate::operation::{
    FromOperationOutput, Operation, OperationInput, OperationOutput, ResultCommon,
};
use crate::types::{AccessControlPolicy, Acl, Owner};
use alioss_core::Result;
use http::Method;

/// Set the ACL of a bucket.
#[derive(Debug, Clone)]
pub struct PutBucketAclRequest {
    pub bucket: String,
    pub acl: Acl,
}

impl PutBucketAclRequest {
    pub fn new(bucket: impl Into<String>, acl: Acl) -> Self {
        Self {
            bucket: bucket.into(),
            acl,
        }
    }
}

impl Operation for PutBucketAclRequest {
    type Output = PutBucketAclResult;

    fn into_input(self) -> Result<OperationInput> {
        OperationInput::new("PutBucketAcl", Method::PUT)
            .with_bucket(self.bucket)
            .with_sub_resource("acl")
            .with_header(X_OSS_ACL, self.acl)
    }
}

empty_result!(
    /// Result of `PutBucketAcl`.
    PutBucketAclResult
);

/// Get the ACL of a bucket.
#[derive(Debug, Clone, Default)]
pub struct GetBucketAclRequest {
    pub bucket: String,
}

impl GetBucketAclRequest {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }
}

impl Operation for GetBucketAclRequest {
    type Output = GetBucketAclResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(OperationInput::new("GetBucketAcl", Method::GET)
            .with_bucket(self.bucket)
            .with_sub_resource("acl"))
    }
}

/// Result of `GetBucketAcl`.
#[derive(Debug, Clone, Default)]
pub struct GetBucketAclResult {
    pub owner: Owner,
    pub acl: Option<Acl>,
    pub common: ResultCommon,
}

impl FromOperationOutput for GetBucketAclResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        let policy: AccessControlPolicy = output.xml()?;
        Ok(Self {
            owner: policy.owner,
            acl: policy.access_control_list.grant,
            common: output.common(),
        })
    }
}

client_methods! {
    put_bucket_acl(PutBucketAclRequest) -> PutBucketAclResult;
    get_bucket_acl(GetBucketAclRequest) -> GetBucketAclResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{HeaderMap, StatusCode};

    #[test]
    fn test_put_bucket_acl_input() {
        let input = PutBucketAclRequest::new("examplebucket", Acl::PublicRead)
            .into_input()
            .unwrap();
        assert_eq!(input.method, Method::PUT);
        assert_eq!(input.query_string(), "acl");
        assert_eq!(input.headers[X_OSS_ACL], "public-read");
        assert!(input.body.is_empty());
    }

    #[test]
    fn test_get_bucket_acl_result() {
        let body = r#"<?xml version="1.0" ?>
<AccessControlPolicy>
    <Owner>
        <ID>0022012****</ID>
        <DisplayName>user_example</DisplayName>
    </Owner>
    <AccessControlList>
        <Grant>public-read-write</Grant>
    </AccessControlList>
</AccessControlPolicy>"#;
        let result = GetBucketAclResult::from_output(OperationOutput {
            op_name: "GetBucketAcl",
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::from(body),
        })
        .unwrap();
        assert_eq!(result.owner.display_name, "user_example");
        assert_eq!(result.acl, Some(Acl::PublicReadWrite));
    }
}
