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
//! Alibaba Cloud Object Storage Service (OSS) client.
//!
//! This crate sends OSS operations through a pluggable [`alioss_core::Context`]:
//! requests are addressed with an [`Endpoint`], signed with V1 or V4
//! signatures, retried by a [`Retryer`] and decoded into typed results.
//!
//! ## Quick Start
//!
//! ```no_run
//! use alioss::{Client, Config, ListObjectsV2Request, PutObjectRequest};
//! use alioss_core::{Context, OsEnv, Result};
//! use alioss_file_read_tokio::TokioFileRead;
//! use alioss_http_send_reqwest::ReqwestHttpSend;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new()
//!         .with_file_read(TokioFileRead)
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     // Credentials are loaded from env, OIDC or the ECS RAM role.
//!     let config = Config::new("cn-hangzhou").from_env(&ctx);
//!     let client = Client::new(ctx, config)?;
//!
//!     client
//!         .put_object(PutObjectRequest::new("examplebucket", "hello.txt", "Hello, OSS!"))
//!         .await?;
//!
//!     let mut pages = client.paginate(ListObjectsV2Request::new("examplebucket"));
//!     while let Some(page) = pages.next_page().await? {
//!         for object in page.contents {
//!             println!("{} {}", object.key, object.size);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Credential Sources
//!
//! [`DefaultCredentialProvider`] tries, in order:
//!
//! - static credentials in [`Config`]
//! - `OSS_ACCESS_KEY_ID`/`OSS_ACCESS_KEY_SECRET` or the `ALIBABA_CLOUD_*`
//!   environment variables
//! - `AssumeRoleWithOIDC` when a role, an OIDC provider and a token file are set
//! - the ECS RAM role of the instance, when enabled
//!
//! ## Large Objects
//!
//! [`Uploader`] and [`Downloader`] transfer objects in concurrent parts and
//! verify the CRC64 of the whole object.

mod constants;

pub mod api;
pub use api::bucket_acl::*;
pub use api::bucket_basic::*;
pub use api::bucket_cname::*;
pub use api::bucket_replication::*;
pub use api::bucket_tags::*;
pub use api::multipart::*;
pub use api::object_basic::*;
pub use api::object_tagging::*;
pub use api::select_object::*;
pub use api::service::*;
pub use api::vectors::*;

mod client;
pub use client::Client;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod endpoint;
pub use endpoint::{is_valid_bucket_name, is_valid_object_key, AddressStyle, Endpoint};

mod error;
pub use error::ServiceError;

mod operation;
pub use operation::{
    CrcCheck, FromOperationOutput, Operation, OperationInput, OperationOutput, Product,
    ResultCommon,
};

mod paginator;
pub use paginator::{PaginatedRequest, Paginator};

mod presign;
pub use presign::PresignResult;

mod provide_credential;
pub use provide_credential::*;

mod retry;
pub use retry::{NopRetryer, Retryer, StandardRetryer};

mod sign;
pub use sign::{
    RequestSigner, RequestSignerV1, RequestSignerV4, SignatureVersion, SigningResource,
};

pub mod transfer;
pub use transfer::{
    DownloadRequest, DownloadResult, Downloader, UploadRequest, UploadResult, Uploader,
};

pub mod types;

#[cfg(test)]
mod testing;
