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
use crate::{constants::*, Credential};
use alioss_core::time::parse_rfc3339;
use alioss_core::{Context, Error, ProvideCredential, Result};
use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use serde::Deserialize;

const METADATA_TOKEN_TTL_SECONDS: &str = "21600";

/// EcsRamRoleCredentialProvider loads credentials of the RAM role attached to an ECS instance.
///
/// The provider only runs when a role name is configured, either with
/// [`EcsRamRoleCredentialProvider::with_role_name`] or through
/// `ALIBABA_CLOUD_ECS_METADATA`. Talking to the metadata service on machines
/// outside ECS would only stall the credential chain.
#[derive(Debug, Default, Clone)]
pub struct EcsRamRoleCredentialProvider {
    role_name: Option<String>,
    endpoint: Option<String>,
}

impl EcsRamRoleCredentialProvider {
    /// Create a new `EcsRamRoleCredentialProvider` instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the role name.
    pub fn with_role_name(mut self, role_name: impl Into<String>) -> Self {
        self.role_name = Some(role_name.into());
        self
    }

    /// Set the endpoint of the metadata service.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    fn endpoint(&self, ctx: &Context) -> String {
        self.endpoint
            .clone()
            .or_else(|| ctx.env_var(ALIBABA_CLOUD_ECS_METADATA_ENDPOINT))
            .unwrap_or_else(|| DEFAULT_ECS_METADATA_ENDPOINT.to_string())
    }

    async fn load_metadata_token(&self, ctx: &Context, endpoint: &str) -> Option<String> {
        let req = http::Request::builder()
            .method(Method::PUT)
            .uri(format!("{endpoint}/latest/api/token"))
            .header("X-aliyun-ecs-metadata-token-ttl-seconds", METADATA_TOKEN_TTL_SECONDS)
            .body(Bytes::new())
            .ok()?;

        match ctx.http_send_as_string(req).await {
            Ok(resp) if resp.status() == http::StatusCode::OK => Some(resp.into_body()),
            Ok(resp) => {
                log::debug!(
                    "metadata token request returned {}, continue without token",
                    resp.status()
                );
                None
            }
            Err(err) => {
                log::debug!("metadata token request failed, continue without token: {err}");
                None
            }
        }
    }
}

#[async_trait]
impl ProvideCredential for EcsRamRoleCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let Some(role_name) = self
            .role_name
            .clone()
            .or_else(|| ctx.env_var(ALIBABA_CLOUD_ECS_METADATA))
            .filter(|v| !v.is_empty())
        else {
            return Ok(None);
        };

        let endpoint = self.endpoint(ctx);
        let token = self.load_metadata_token(ctx, &endpoint).await;

        let mut req = http::Request::builder()
            .method(Method::GET)
            .uri(format!(
                "{endpoint}/latest/meta-data/ram/security-credentials/{role_name}"
            ));
        if let Some(token) = &token {
            req = req.header("X-aliyun-ecs-metadata-token", token);
        }
        let req = req.body(Bytes::new())?;

        let resp = ctx.http_send(req).await?;
        if resp.status() != http::StatusCode::OK {
            let content = String::from_utf8_lossy(resp.body());
            return Err(Error::credential_denied(format!(
                "request to ECS metadata service failed: {content}"
            )));
        }

        let resp: EcsRamRoleResponse = serde_json::from_slice(resp.body()).map_err(|e| {
            Error::unexpected("failed to parse ECS metadata response").with_source(e)
        })?;
        if resp.code != "Success" {
            return Err(Error::credential_denied(format!(
                "ECS metadata service returned code {}",
                resp.code
            )));
        }

        Ok(Some(Credential {
            access_key_id: resp.access_key_id,
            access_key_secret: resp.access_key_secret,
            security_token: Some(resp.security_token),
            expires_in: Some(parse_rfc3339(&resp.expiration)?),
        }))
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct EcsRamRoleResponse {
    code: String,
    access_key_id: String,
    access_key_secret: String,
    security_token: String,
    expiration: String,
}
