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
//! Request signing for OSS.
//!
//! Two signature versions are supported:
//!
//! - [`RequestSignerV1`]: HMAC-SHA1 over the legacy string to sign.
//! - [`RequestSignerV4`]: `OSS4-HMAC-SHA256` with a scoped signing key.
//!
//! The bucket and key addressed by a request are passed to the signers through
//! a [`SigningResource`] stored in the request extensions, so the canonical
//! resource does not depend on the address style of the url.

use crate::credential::Credential;
use crate::Config;
use alioss_core::{Context, Error, Result, SignRequest};
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

mod v1;
pub use v1::RequestSignerV1;

mod v4;
pub use v4::RequestSignerV4;

/// Encode everything except unreserved characters.
pub(crate) const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Same as [`URI_ENCODE_SET`] but keeps `/`, used for object keys in paths.
pub(crate) const PATH_ENCODE_SET: &AsciiSet = &URI_ENCODE_SET.remove(b'/');

/// Percent encode a query component.
pub(crate) fn uri_encode(s: &str) -> String {
    utf8_percent_encode(s, URI_ENCODE_SET).to_string()
}

/// Percent encode an object key, keeping `/`.
pub(crate) fn path_encode(s: &str) -> String {
    utf8_percent_encode(s, PATH_ENCODE_SET).to_string()
}

/// The signature version used to sign requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureVersion {
    /// HMAC-SHA1 signature.
    V1,
    /// OSS4-HMAC-SHA256 signature.
    #[default]
    V4,
}

impl fmt::Display for SignatureVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureVersion::V1 => f.write_str("v1"),
            SignatureVersion::V4 => f.write_str("v4"),
        }
    }
}

impl FromStr for SignatureVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "v1" => Ok(SignatureVersion::V1),
            "v4" => Ok(SignatureVersion::V4),
            v => Err(Error::config_invalid(format!(
                "unknown signature version: {v}"
            ))),
        }
    }
}

/// The bucket and object addressed by a request.
///
/// The client inserts this into the request extensions before signing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SigningResource {
    /// Bucket name.
    pub bucket: Option<String>,
    /// Object key, not encoded.
    pub key: Option<String>,
}

impl SigningResource {
    /// Create a resource for the given bucket and key.
    pub fn new(bucket: Option<&str>, key: Option<&str>) -> Self {
        Self {
            bucket: bucket.map(|v| v.to_string()),
            key: key.map(|v| v.to_string()),
        }
    }
}

/// RequestSigner signs with the signature version picked from [`Config`].
#[derive(Debug)]
pub enum RequestSigner {
    /// Signs with [`RequestSignerV1`].
    V1(RequestSignerV1),
    /// Signs with [`RequestSignerV4`].
    V4(RequestSignerV4),
}

impl RequestSigner {
    /// Build the signer described by the config.
    ///
    /// V4 needs a region, either configured or derived from the endpoint.
    pub fn from_config(config: &Config) -> Result<Self> {
        match config.signature_version {
            SignatureVersion::V1 => Ok(RequestSigner::V1(RequestSignerV1::new())),
            SignatureVersion::V4 => {
                let region = config.signing_region().ok_or_else(|| {
                    Error::config_invalid("region is required for signature version 4")
                })?;
                Ok(RequestSigner::V4(
                    RequestSignerV4::new(&region)
                        .with_product(&config.product)
                        .with_additional_headers(config.additional_headers.clone()),
                ))
            }
        }
    }

    /// Signature version of this signer.
    pub fn version(&self) -> SignatureVersion {
        match self {
            RequestSigner::V1(_) => SignatureVersion::V1,
            RequestSigner::V4(_) => SignatureVersion::V4,
        }
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        ctx: &Context,
        req: &mut http::request::Parts,
        credential: Option<&Self::Credential>,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        match self {
            RequestSigner::V1(s) => s.sign_request(ctx, req, credential, expires_in).await,
            RequestSigner::V4(s) => s.sign_request(ctx, req, credential, expires_in).await,
        }
    }
}
