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
use crate::constants::*;
use crate::sign::SignatureVersion;
use alioss_core::Context;
use std::time::Duration;

/// Config carries all the configuration for the OSS client.
#[derive(Clone, Debug)]
pub struct Config {
    /// `region` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`OSS_REGION`]
    ///
    /// The region is used to build the default endpoint and the V4 signing scope,
    /// for example `cn-hangzhou`.
    pub region: Option<String>,
    /// `endpoint` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`OSS_ENDPOINT`]
    ///
    /// Accepts a bare host (`oss-cn-hangzhou.aliyuncs.com`) or a full url.
    pub endpoint: Option<String>,
    /// Signature version, default to V4.
    pub signature_version: SignatureVersion,
    /// Product used in the V4 signing scope, default to `oss`.
    pub product: String,
    /// Use the internal (VPC) endpoint of the region.
    pub use_internal_endpoint: bool,
    /// Use the global transfer acceleration endpoint.
    pub use_accelerate_endpoint: bool,
    /// Use the dual stack (IPv4 and IPv6) endpoint of the region.
    pub use_dualstack_endpoint: bool,
    /// The endpoint is a custom domain bound to the bucket.
    pub use_cname: bool,
    /// Address buckets as the first path segment instead of a sub domain.
    pub use_path_style: bool,
    /// Use plain http.
    pub disable_ssl: bool,
    /// Total attempts for one operation, including the first one.
    pub retry_max_attempts: usize,
    /// Base delay of the exponential backoff.
    pub retry_base_delay: Duration,
    /// Upper bound of a single backoff delay.
    pub retry_max_backoff: Duration,
    /// Timeout for a single attempt.
    pub timeout: Option<Duration>,
    /// Skip the CRC64 comparison after uploads.
    pub disable_upload_crc64_check: bool,
    /// Skip the CRC64 comparison after full downloads.
    pub disable_download_crc64_check: bool,
    /// Extra headers that take part in the V4 signature, lowercase names.
    pub additional_headers: Vec<String>,
    /// Suffix appended to the default `User-Agent`.
    pub user_agent: Option<String>,
    /// Account id, required by vector bucket operations.
    pub account_id: Option<String>,

    /// `access_key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`OSS_ACCESS_KEY_ID`]
    /// - env value: [`ALIBABA_CLOUD_ACCESS_KEY_ID`]
    pub access_key_id: Option<String>,
    /// `access_key_secret` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`OSS_ACCESS_KEY_SECRET`]
    /// - env value: [`ALIBABA_CLOUD_ACCESS_KEY_SECRET`]
    pub access_key_secret: Option<String>,
    /// `security_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`OSS_SESSION_TOKEN`]
    /// - env value: [`ALIBABA_CLOUD_SECURITY_TOKEN`]
    pub security_token: Option<String>,
    /// `role_arn` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ALIBABA_CLOUD_ROLE_ARN`]
    pub role_arn: Option<String>,
    /// `role_session_name` will be loaded from
    ///
    /// - env value: [`ALIBABA_CLOUD_ROLE_SESSION_NAME`]
    /// - default to `alioss`
    pub role_session_name: String,
    /// `oidc_provider_arn` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ALIBABA_CLOUD_OIDC_PROVIDER_ARN`]
    pub oidc_provider_arn: Option<String>,
    /// `oidc_token_file` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ALIBABA_CLOUD_OIDC_TOKEN_FILE`]
    pub oidc_token_file: Option<String>,
    /// `sts_endpoint` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`ALIBABA_CLOUD_STS_ENDPOINT`]
    pub sts_endpoint: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: None,
            endpoint: None,
            signature_version: SignatureVersion::V4,
            product: DEFAULT_PRODUCT.to_string(),
            use_internal_endpoint: false,
            use_accelerate_endpoint: false,
            use_dualstack_endpoint: false,
            use_cname: false,
            use_path_style: false,
            disable_ssl: false,
            retry_max_attempts: 3,
            retry_base_delay: Duration::from_millis(200),
            retry_max_backoff: Duration::from_secs(20),
            timeout: None,
            disable_upload_crc64_check: false,
            disable_download_crc64_check: false,
            additional_headers: Vec::new(),
            user_agent: None,
            account_id: None,

            access_key_id: None,
            access_key_secret: None,
            security_token: None,
            role_arn: None,
            role_session_name: DEFAULT_ROLE_SESSION_NAME.to_string(),
            oidc_provider_arn: None,
            oidc_token_file: None,
            sts_endpoint: None,
        }
    }
}

impl Config {
    /// Create a config for the given region.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: Some(region.into()),
            ..Default::default()
        }
    }

    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let first = |keys: &[&str]| keys.iter().find_map(|k| ctx.env_var(k));

        if let Some(v) = ctx.env_var(OSS_REGION) {
            self.region.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(OSS_ENDPOINT) {
            self.endpoint.get_or_insert(v);
        }
        if let Some(v) = first(&[OSS_ACCESS_KEY_ID, ALIBABA_CLOUD_ACCESS_KEY_ID]) {
            self.access_key_id.get_or_insert(v);
        }
        if let Some(v) = first(&[OSS_ACCESS_KEY_SECRET, ALIBABA_CLOUD_ACCESS_KEY_SECRET]) {
            self.access_key_secret.get_or_insert(v);
        }
        if let Some(v) = first(&[OSS_SESSION_TOKEN, ALIBABA_CLOUD_SECURITY_TOKEN]) {
            self.security_token.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(ALIBABA_CLOUD_ROLE_ARN) {
            self.role_arn.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(ALIBABA_CLOUD_ROLE_SESSION_NAME) {
            self.role_session_name = v;
        }
        if let Some(v) = ctx.env_var(ALIBABA_CLOUD_OIDC_PROVIDER_ARN) {
            self.oidc_provider_arn.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(ALIBABA_CLOUD_OIDC_TOKEN_FILE) {
            self.oidc_token_file.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(ALIBABA_CLOUD_STS_ENDPOINT) {
            self.sts_endpoint.get_or_insert(v);
        }

        self
    }

    /// Signing region, derived from the endpoint when not configured.
    ///
    /// `oss-cn-hangzhou.aliyuncs.com` and `oss-cn-hangzhou-internal.aliyuncs.com`
    /// both yield `cn-hangzhou`.
    pub fn signing_region(&self) -> Option<String> {
        if let Some(region) = &self.region {
            return Some(region.clone());
        }

        let endpoint = self.endpoint.as_deref()?;
        let host = endpoint
            .split_once("://")
            .map(|(_, v)| v)
            .unwrap_or(endpoint);
        let label = host.split('.').next()?;
        let region = label.strip_prefix("oss-")?;
        let region = region.strip_suffix("-internal").unwrap_or(region);
        if region.is_empty() || region == "accelerate" || region == "accelerate-overseas" {
            return None;
        }
        Some(region.to_string())
    }
}
