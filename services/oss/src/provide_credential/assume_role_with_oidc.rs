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
use crate::{constants::*, Config, Credential};
use alioss_core::time::{format_rfc3339, now, parse_rfc3339};
use alioss_core::{Context, Error, ProvideCredential, Result};
use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use std::sync::Arc;

/// AssumeRoleWithOidcCredentialProvider loads credential via assume role with OIDC.
///
/// Values set on [`Config`] win; missing ones are read from the environment at runtime:
///
/// - `ALIBABA_CLOUD_ROLE_ARN`: The ARN of the role to assume
/// - `ALIBABA_CLOUD_OIDC_PROVIDER_ARN`: The ARN of the OIDC provider
/// - `ALIBABA_CLOUD_OIDC_TOKEN_FILE`: Path to the OIDC token file
/// - `ALIBABA_CLOUD_STS_ENDPOINT`: Optional custom STS endpoint
/// - `ALIBABA_CLOUD_ROLE_SESSION_NAME`: Optional session name
#[derive(Debug, Default, Clone)]
pub struct AssumeRoleWithOidcCredentialProvider {
    config: Arc<Config>,
}

impl AssumeRoleWithOidcCredentialProvider {
    /// Create a new `AssumeRoleWithOidcCredentialProvider` instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider that prefers values from the given config.
    pub fn with_config(config: Arc<Config>) -> Self {
        Self { config }
    }

    fn sts_endpoint(&self, ctx: &Context) -> String {
        let endpoint = self
            .config
            .sts_endpoint
            .clone()
            .or_else(|| ctx.env_var(ALIBABA_CLOUD_STS_ENDPOINT));

        match endpoint {
            Some(v) if v.starts_with("http://") || v.starts_with("https://") => v,
            Some(v) => format!("https://{v}"),
            None => DEFAULT_STS_ENDPOINT.to_string(),
        }
    }
}

#[async_trait]
impl ProvideCredential for AssumeRoleWithOidcCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let pick = |v: &Option<String>, key: &str| v.clone().or_else(|| ctx.env_var(key));

        let token_file = pick(&self.config.oidc_token_file, ALIBABA_CLOUD_OIDC_TOKEN_FILE);
        let role_arn = pick(&self.config.role_arn, ALIBABA_CLOUD_ROLE_ARN);
        let provider_arn = pick(
            &self.config.oidc_provider_arn,
            ALIBABA_CLOUD_OIDC_PROVIDER_ARN,
        );

        let (Some(token_file), Some(role_arn), Some(provider_arn)) =
            (token_file, role_arn, provider_arn)
        else {
            return Ok(None);
        };

        let token_file = ctx.expand_home_dir(&token_file).unwrap_or(token_file);
        let token = ctx.file_read_as_string(&token_file).await?;
        let role_session_name = ctx
            .env_var(ALIBABA_CLOUD_ROLE_SESSION_NAME)
            .unwrap_or_else(|| self.config.role_session_name.clone());

        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("Action", "AssumeRoleWithOIDC")
            .append_pair("OIDCProviderArn", &provider_arn)
            .append_pair("RoleArn", &role_arn)
            .append_pair("RoleSessionName", &role_session_name)
            .append_pair("Format", "JSON")
            .append_pair("Version", "2015-04-01")
            .append_pair("Timestamp", &format_rfc3339(now()))
            .append_pair("OIDCToken", token.trim())
            .finish();
        let url = format!("{}/?{}", self.sts_endpoint(ctx), query);

        let req = http::Request::builder()
            .method(http::Method::GET)
            .uri(&url)
            .header(
                http::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(Bytes::new())?;

        let resp = ctx.http_send(req).await?;

        if resp.status() != http::StatusCode::OK {
            let content = String::from_utf8_lossy(resp.body());
            return Err(Error::credential_denied(format!(
                "request to STS service failed: {content}"
            )));
        }

        let resp: AssumeRoleWithOidcResponse = serde_json::from_slice(resp.body())
            .map_err(|e| Error::unexpected("failed to parse STS response").with_source(e))?;
        let resp_cred = resp.credentials;

        Ok(Some(Credential {
            access_key_id: resp_cred.access_key_id,
            access_key_secret: resp_cred.access_key_secret,
            security_token: Some(resp_cred.security_token),
            expires_in: Some(parse_rfc3339(&resp_cred.expiration)?),
        }))
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default)]
struct AssumeRoleWithOidcResponse {
    #[serde(rename = "Credentials")]
    credentials: AssumeRoleWithOidcCredentials,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct AssumeRoleWithOidcCredentials {
    access_key_id: String,
    access_key_secret: String,
    security_token: String,
    expiration: String,
}
