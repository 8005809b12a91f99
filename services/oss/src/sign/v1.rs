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
use super::{uri_encode, SigningResource};
use crate::constants::{self, X_OSS_SECURITY_TOKEN};
use crate::credential::Credential;
use alioss_core::hash::base64_hmac_sha1;
use alioss_core::time::{format_http_date, now, DateTime};
use alioss_core::{Context, Error, Result, SignRequest, SigningMethod, SigningRequest};
use async_trait::async_trait;
use http::header::{AUTHORIZATION, CONTENT_TYPE, DATE};
use http::{HeaderName, HeaderValue};
use log::debug;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::fmt::Write;
use std::time::Duration;

static CONTENT_MD5: HeaderName = HeaderName::from_static(constants::CONTENT_MD5);

/// RequestSignerV1 implements the OSS HMAC-SHA1 signature.
///
/// - [Header signing](https://www.alibabacloud.com/help/en/oss/developer-reference/include-signatures-in-the-authorization-header)
/// - [Query signing](https://www.alibabacloud.com/help/en/oss/developer-reference/add-signatures-to-urls)
///
/// Without a [`SigningResource`] in the request extensions, the decoded url
/// path is used as canonical resource, which matches path style addressing.
#[derive(Debug, Default)]
pub struct RequestSignerV1 {
    time: Option<DateTime>,
}

impl RequestSignerV1 {
    /// Create a new V1 signer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }
}

#[async_trait]
impl SignRequest for RequestSignerV1 {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut http::request::Parts,
        credential: Option<&Self::Credential>,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Ok(());
        };

        let signing_time = self.time.unwrap_or_else(now);
        let resource = req.extensions.get::<SigningResource>().cloned();
        let mut signed_req = SigningRequest::build(req)?;
        for (_, value) in signed_req.headers.iter_mut() {
            SigningRequest::header_value_normalize(value);
        }

        match SigningMethod::from_expires_in(expires_in) {
            SigningMethod::Header => {
                let date = format_http_date(signing_time);
                signed_req.headers.insert(DATE, date.parse()?);
                if let Some(token) = &cred.security_token {
                    let mut value: HeaderValue = token.parse()?;
                    value.set_sensitive(true);
                    signed_req.headers.insert(X_OSS_SECURITY_TOKEN, value);
                }

                let string_to_sign = string_to_sign(&signed_req, resource.as_ref(), &date)?;
                debug!("calculated string to sign: {string_to_sign:?}");
                let signature =
                    base64_hmac_sha1(cred.access_key_secret.as_bytes(), string_to_sign.as_bytes());

                let mut value: HeaderValue =
                    format!("OSS {}:{}", cred.access_key_id, signature).parse()?;
                value.set_sensitive(true);
                signed_req.headers.insert(AUTHORIZATION, value);
            }
            SigningMethod::Query(expires) => {
                let expires_at = signing_time
                    + chrono::TimeDelta::from_std(expires).map_err(|e| {
                        Error::request_invalid("invalid expiration duration").with_source(e)
                    })?;
                let expires_at = expires_at.timestamp().to_string();
                if let Some(token) = &cred.security_token {
                    signed_req.query_push("security-token", token);
                }

                let string_to_sign = string_to_sign(&signed_req, resource.as_ref(), &expires_at)?;
                debug!("calculated string to sign: {string_to_sign:?}");
                let signature =
                    base64_hmac_sha1(cred.access_key_secret.as_bytes(), string_to_sign.as_bytes());

                signed_req.query_push("OSSAccessKeyId", &cred.access_key_id);
                signed_req.query_push("Expires", expires_at);
                signed_req.query_push("Signature", signature);
            }
        }

        signed_req.query = signed_req
            .query
            .iter()
            .map(|(k, v)| (uri_encode(k), uri_encode(v)))
            .collect();
        signed_req.apply(req)
    }
}

/// Build the V1 string to sign.
///
/// ```text
/// VERB + "\n"
/// + Content-MD5 + "\n"
/// + Content-Type + "\n"
/// + Date | Expires + "\n"
/// + CanonicalizedOSSHeaders
/// + CanonicalizedResource
/// ```
fn string_to_sign(
    req: &SigningRequest,
    resource: Option<&SigningResource>,
    date: &str,
) -> Result<String> {
    let mut s = String::with_capacity(128);
    writeln!(s, "{}", req.method.as_str())?;
    writeln!(s, "{}", req.header_get_or_default(&CONTENT_MD5)?)?;
    writeln!(s, "{}", req.header_get_or_default(&CONTENT_TYPE)?)?;
    writeln!(s, "{date}")?;

    let oss_headers = req.header_to_vec_with_prefix("x-oss-")?;
    if !oss_headers.is_empty() {
        writeln!(s, "{}", SigningRequest::header_to_string(oss_headers, ":", "\n"))?;
    }

    write!(s, "{}", canonical_resource(req, resource))?;
    Ok(s)
}

fn canonical_resource(req: &SigningRequest, resource: Option<&SigningResource>) -> String {
    let mut s = match resource {
        Some(SigningResource {
            bucket: Some(bucket),
            key: Some(key),
        }) => format!("/{bucket}/{key}"),
        Some(SigningResource {
            bucket: Some(bucket),
            key: None,
        }) => format!("/{bucket}/"),
        Some(_) => "/".to_string(),
        None => req.path_percent_decoded().to_string(),
    };

    let sub_resources = req.query_to_vec_with_filter(is_sub_resource);
    if !sub_resources.is_empty() {
        s.push('?');
        s.push_str(&SigningRequest::query_to_string(sub_resources, "=", "&"));
    }

    s
}

fn is_sub_resource(key: &str) -> bool {
    SUB_RESOURCES.contains(key)
}

/// Query parameters that are part of the V1 canonical resource.
static SUB_RESOURCES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "acl",
        "append",
        "asyncFetch",
        "bucketInfo",
        "callback",
        "callback-var",
        "cname",
        "comp",
        "continuation-token",
        "cors",
        "delete",
        "encryption",
        "endTime",
        "img",
        "inventory",
        "inventoryId",
        "lifecycle",
        "live",
        "location",
        "logging",
        "metaQuery",
        "objectMeta",
        "partNumber",
        "policy",
        "position",
        "qos",
        "qosInfo",
        "referer",
        "regionList",
        "replication",
        "replicationLocation",
        "replicationProgress",
        "requestPayment",
        "resourceGroup",
        "response-cache-control",
        "response-content-disposition",
        "response-content-encoding",
        "response-content-language",
        "response-content-type",
        "response-expires",
        "restore",
        "rtc",
        "security-token",
        "sequential",
        "startTime",
        "stat",
        "status",
        "style",
        "styleName",
        "symlink",
        "tagging",
        "transferAcceleration",
        "udf",
        "udfApplication",
        "udfApplicationLog",
        "udfId",
        "udfImage",
        "udfImageDesc",
        "udfName",
        "uploadId",
        "uploads",
        "versionId",
        "versioning",
        "versions",
        "vod",
        "website",
        "worm",
        "wormExtend",
        "wormId",
        "x-oss-ac-forward-allow",
        "x-oss-ac-source-ip",
        "x-oss-ac-subnet-mask",
        "x-oss-ac-vpc-id",
        "x-oss-enable-md5",
        "x-oss-enable-sha1",
        "x-oss-enable-sha256",
        "x-oss-hash-ctx",
        "x-oss-md5-ctx",
        "x-oss-process",
        "x-oss-request-payer",
        "x-oss-traffic-limit",
        "withHashContext",
    ])
});
