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
//! Object tags.

use crate::constants::X_OSS_VERSION_ID;
use crate::operation::{
    FromOperationOutput, Operation, OperationInput, OperationOutput, ResultCommon,
};
use crate::types::{Tag, Tagging};
use alioss_core::Result;
use http::Method;

fn tagging_input(
    op_name: &'static str,
    method: Method,
    bucket: String,
    key: String,
    version_id: Option<String>,
) -> OperationInput {
    OperationInput::new(op_name, method)
        .with_bucket(bucket)
        .with_key(key)
        .with_sub_resource("tagging")
        .with_param_opt("versionId", version_id)
}

/// Version id reported by the tagging operations.
#[derive(Debug, Clone, Default)]
pub struct ObjectTaggingResult {
    pub version_id: Option<String>,
    pub common: ResultCommon,
}

impl FromOperationOutput for ObjectTaggingResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        Ok(Self {
            version_id: output.header(X_OSS_VERSION_ID),
            common: output.common(),
        })
    }
}

/// Replace the tags of an object.
#[derive(Debug, Clone, Default)]
pub struct PutObjectTaggingRequest {
    pub bucket: String,
    pub key: String,
    pub version_id: Option<String>,
    pub tagging: Tagging,
}

impl PutObjectTaggingRequest {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>, tagging: Tagging) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            version_id: None,
            tagging,
        }
    }

    pub fn with_version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }
}

impl Operation for PutObjectTaggingRequest {
    type Output = ObjectTaggingResult;

    fn into_input(self) -> Result<OperationInput> {
        tagging_input(
            "PutObjectTagging",
            Method::PUT,
            self.bucket,
            self.key,
            self.version_id,
        )
        .with_xml_body("Tagging", &self.tagging)
    }
}

/// Get the tags of an object.
#[derive(Debug, Clone, Default)]
pub struct GetObjectTaggingRequest {
    pub bucket: String,
    pub key: String,
    pub version_id: Option<String>,
}

impl GetObjectTaggingRequest {
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

impl Operation for GetObjectTaggingRequest {
    type Output = GetObjectTaggingResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(tagging_input(
            "GetObjectTagging",
            Method::GET,
            self.bucket,
            self.key,
            self.version_id,
        ))
    }
}

/// Result of `GetObjectTagging`.
#[derive(Debug, Clone, Default)]
pub struct GetObjectTaggingResult {
    pub tags: Vec<Tag>,
    pub version_id: Option<String>,
    pub common: ResultCommon,
}

impl FromOperationOutput for GetObjectTaggingResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        let tagging: Tagging = output.xml()?;
        Ok(Self {
            tags: tagging.tag_set.tags,
            version_id: output.header(X_OSS_VERSION_ID),
            common: output.common(),
        })
    }
}

/// Remove all tags of an object.
#[derive(Debug, Clone, Default)]
pub struct DeleteObjectTaggingRequest {
    pub bucket: String,
    pub key: String,
    pub version_id: Option<String>,
}

impl DeleteObjectTaggingRequest {
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

impl Operation for DeleteObjectTaggingRequest {
    type Output = ObjectTaggingResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(tagging_input(
            "DeleteObjectTagging",
            Method::DELETE,
            self.bucket,
            self.key,
            self.version_id,
        ))
    }
}

client_methods! {
    put_object_tagging(PutObjectTaggingRequest) -> ObjectTaggingResult;
    get_object_tagging(GetObjectTaggingRequest) -> GetObjectTaggingResult;
    delete_object_tagging(DeleteObjectTaggingRequest) -> ObjectTaggingResult;
}
