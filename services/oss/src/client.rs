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
use crate::constants::{SDK_NAME, SDK_VERSION, VECTORS_PRODUCT, X_OSS_HASH_CRC64ECMA};
use crate::endpoint::{is_valid_bucket_name, is_valid_object_key, Endpoint};
use crate::error::ServiceError;
use crate::operation::{
    CrcCheck, FromOperationOutput, Operation, OperationInput, OperationOutput, Product,
};
use crate::provide_credential::DefaultCredentialProvider;
use crate::retry::{Retryer, StandardRetryer};
use crate::sign::{RequestSigner, RequestSignerV4, SigningResource};
use crate::{Config, Credential};
use alioss_core::crc64::{crc64, crc64_combine};
use alioss_core::time::{format_http_date, now};
use alioss_core::{Context, Error, ProvideCredential, Result, Signer};
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, DATE, HOST, RANGE, USER_AGENT};
use http::HeaderValue;
use log::{debug, warn};
use std::fmt::{self, Debug};
use std::sync::Arc;

/// Client executes OSS operations.
///
/// Every operation goes through the same pipeline: the request is validated
/// and addressed, signed with the configured signature version, sent through
/// the [`Context`] and retried by the [`Retryer`]. Failed responses become
/// [`ServiceError`]s and CRC64 checksums are verified when enabled.
///
/// ```no_run
/// use alioss::{Client, Config, GetObjectRequest};
/// use alioss_core::{Context, OsEnv};
/// use alioss_http_send_reqwest::ReqwestHttpSend;
///
/// # async fn example() -> alioss_core::Result<()> {
/// let ctx = Context::new()
///     .with_http_send(ReqwestHttpSend::default())
///     .with_env(OsEnv);
/// let config = Config::new("cn-hangzhou").from_env(&ctx);
/// let client = Client::new(ctx, config)?;
///
/// let result = client
///     .get_object(GetObjectRequest::new("examplebucket", "exampleobject.txt"))
///     .await?;
/// println!("{} bytes", result.body.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    pub(crate) ctx: Context,
    pub(crate) config: Arc<Config>,
    endpoint: Endpoint,
    vectors_endpoint: Option<Endpoint>,
    pub(crate) signer: Signer<Credential>,
    vectors_signer: Option<Signer<Credential>>,
    retryer: Arc<dyn Retryer>,
    user_agent: String,
}

impl Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.endpoint)
            .field("signature_version", &self.config.signature_version)
            .field("retryer", &self.retryer)
            .finish()
    }
}

impl Client {
    /// Create a client, credentials are loaded by [`DefaultCredentialProvider`].
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        let config = Arc::new(config);
        let provider = DefaultCredentialProvider::with_config(config.clone());

        let endpoint = Endpoint::from_config(&config)?;
        let vectors_endpoint = Endpoint::vectors_from_config(&config).ok();
        let (signer, vectors_signer) = build_signers(&ctx, &config, Arc::new(provider))?;

        let mut user_agent = format!("{SDK_NAME}/{SDK_VERSION}");
        if let Some(suffix) = &config.user_agent {
            user_agent.push('/');
            user_agent.push_str(suffix);
        }

        Ok(Self {
            retryer: Arc::new(StandardRetryer::from_config(&config)),
            ctx,
            config,
            endpoint,
            vectors_endpoint,
            signer,
            vectors_signer,
            user_agent,
        })
    }

    /// Replace the credential provider.
    pub fn with_credential_provider(
        mut self,
        provider: impl ProvideCredential<Credential = Credential>,
    ) -> Result<Self> {
        let (signer, vectors_signer) = build_signers(&self.ctx, &self.config, Arc::new(provider))?;
        self.signer = signer;
        self.vectors_signer = vectors_signer;
        Ok(self)
    }

    /// Replace the retryer.
    pub fn with_retryer(mut self, retryer: impl Retryer) -> Self {
        self.retryer = Arc::new(retryer);
        self
    }

    /// The config this client was built from.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Execute a typed operation.
    pub async fn execute<O: Operation>(&self, op: O) -> Result<O::Output> {
        let input = op.into_input()?;
        let output = self.invoke(input).await?;
        O::Output::from_output(output)
    }

    /// Send an operation input through the pipeline and return the raw output.
    pub async fn invoke(&self, input: OperationInput) -> Result<OperationOutput> {
        validate(&input)?;

        let max_attempts = self.retryer.max_attempts().max(1);
        let mut attempt = 1;
        loop {
            debug!("{}: attempt {attempt}/{max_attempts}", input.op_name);
            match self.attempt(&input).await {
                Ok(output) => return Ok(output),
                Err(err) if attempt < max_attempts && self.retryer.is_retryable(&err) => {
                    let delay = self.retryer.retry_delay(attempt, &err);
                    warn!(
                        "{}: attempt {attempt} failed, retry in {delay:?}: {err}",
                        input.op_name
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!("{}: failed after {attempt} attempts: {err}", input.op_name);
                    return Err(err);
                }
            }
        }
    }

    async fn attempt(&self, input: &OperationInput) -> Result<OperationOutput> {
        let req = self.build_request(input, false)?;
        let (mut parts, body) = req.into_parts();
        self.signer_for(input.product)?.sign(&mut parts, None).await?;
        let req = http::Request::from_parts(parts, body);
        let request_target = format!("{} {}", req.method(), req.uri());

        let send = self.ctx.http_send(req);
        let resp = match self.config.timeout {
            Some(timeout) => tokio::time::timeout(timeout, send).await.map_err(|e| {
                Error::transport(format!("{}: request timed out after {timeout:?}", input.op_name))
                    .with_source(e)
            })??,
            None => send.await?,
        };

        let (parts, body) = resp.into_parts();
        if !parts.status.is_success() {
            let err =
                ServiceError::from_response(parts.status, parts.headers, &body, request_target);
            return Err(err.into());
        }

        let output = OperationOutput {
            op_name: input.op_name,
            status: parts.status,
            headers: parts.headers,
            body,
        };
        self.check_crc(input, &output)?;
        Ok(output)
    }

    /// Build the unsigned request for an input.
    ///
    /// Presigned requests only carry the headers of the input, they are sent by
    /// other clients later.
    pub(crate) fn build_request(
        &self,
        input: &OperationInput,
        presign: bool,
    ) -> Result<http::Request<Bytes>> {
        let endpoint = self.endpoint_for(input.product)?;
        let url = endpoint.url(
            input.bucket.as_deref(),
            input.key.as_deref(),
            &input.query_string(),
        )?;

        let mut req = http::Request::builder()
            .method(input.method.clone())
            .uri(&url)
            .body(input.body.clone())?;
        *req.headers_mut() = input.headers.clone();

        if !presign {
            let headers = req.headers_mut();
            headers.insert(USER_AGENT, HeaderValue::from_str(&self.user_agent)?);
            headers.insert(DATE, HeaderValue::from_str(&format_http_date(now()))?);
            let host = endpoint.bucket_host(input.bucket.as_deref())?;
            headers.insert(HOST, HeaderValue::from_str(&host)?);
            headers.insert(CONTENT_LENGTH, HeaderValue::from(input.body.len()));
        }

        req.extensions_mut().insert(SigningResource::new(
            input.bucket.as_deref(),
            input.key.as_deref(),
        ));
        Ok(req)
    }

    fn endpoint_for(&self, product: Product) -> Result<&Endpoint> {
        match product {
            Product::Oss => Ok(&self.endpoint),
            Product::Vectors => self.vectors_endpoint.as_ref().ok_or_else(|| {
                Error::config_invalid("region is required for vector bucket operations")
            }),
        }
    }

    pub(crate) fn signer_for(&self, product: Product) -> Result<&Signer<Credential>> {
        match product {
            Product::Oss => Ok(&self.signer),
            Product::Vectors => self.vectors_signer.as_ref().ok_or_else(|| {
                Error::config_invalid("region is required for vector bucket operations")
            }),
        }
    }

    fn check_crc(&self, input: &OperationInput, output: &OperationOutput) -> Result<()> {
        let expected = match input.crc_check {
            CrcCheck::None => return Ok(()),
            CrcCheck::Upload | CrcCheck::Append(_) if self.config.disable_upload_crc64_check => {
                return Ok(())
            }
            CrcCheck::Download if self.config.disable_download_crc64_check => return Ok(()),
            CrcCheck::Upload => crc64(&input.body),
            CrcCheck::Append(init) => {
                crc64_combine(init, crc64(&input.body), input.body.len() as u64)
            }
            CrcCheck::Download => {
                if input.headers.contains_key(RANGE) || output.status != http::StatusCode::OK {
                    return Ok(());
                }
                crc64(&output.body)
            }
        };

        let Some(server) = output.header_parse::<u64>(X_OSS_HASH_CRC64ECMA)? else {
            return Ok(());
        };
        if server != expected {
            return Err(Error::checksum_mismatch(format!(
                "{}: crc64 mismatch, client {expected}, server {server}",
                input.op_name
            )));
        }
        Ok(())
    }
}

fn build_signers(
    ctx: &Context,
    config: &Config,
    provider: Arc<dyn ProvideCredential<Credential = Credential>>,
) -> Result<(Signer<Credential>, Option<Signer<Credential>>)> {
    let signer = Signer::new(ctx.clone(), provider.clone(), RequestSigner::from_config(config)?);
    let vectors_signer = config.signing_region().map(|region| {
        let builder = RequestSignerV4::new(&region)
            .with_product(VECTORS_PRODUCT)
            .with_additional_headers(config.additional_headers.clone());
        Signer::new(ctx.clone(), provider, builder)
    });
    Ok((signer, vectors_signer))
}

pub(crate) fn validate(input: &OperationInput) -> Result<()> {
    if let Some(bucket) = &input.bucket {
        if !is_valid_bucket_name(bucket) {
            return Err(Error::request_invalid(format!(
                "{}: bucket name {bucket:?} is invalid",
                input.op_name
            )));
        }
    }
    if let Some(key) = &input.key {
        if input.bucket.is_none() {
            return Err(Error::request_invalid(format!(
                "{}: object key requires a bucket",
                input.op_name
            )));
        }
        if !is_valid_object_key(key) {
            return Err(Error::request_invalid(format!(
                "{}: object key must be 1 to 1023 bytes",
                input.op_name
            )));
        }
    }
    Ok(())
}
