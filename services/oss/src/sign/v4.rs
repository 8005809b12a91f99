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
use super::{path_encode, uri_encode, SigningResource};
use crate::constants::{
    CONTENT_MD5, DEFAULT_PRODUCT, UNSIGNED_PAYLOAD, X_OSS_CONTENT_SHA256, X_OSS_DATE,
    X_OSS_SECURITY_TOKEN,
};
use crate::credential::Credential;
use alioss_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use alioss_core::time::{format_date, format_iso8601, now, DateTime};
use alioss_core::{Context, Result, SignRequest, SigningRequest};
use async_trait::async_trait;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::HeaderValue;
use log::debug;
use std::fmt::Write;
use std::time::Duration;

const ALGORITHM: &str = "OSS4-HMAC-SHA256";

/// RequestSignerV4 implements the OSS4-HMAC-SHA256 signature.
///
/// - [Signature version 4](https://www.alibabacloud.com/help/en/oss/developer-reference/recommend-to-use-signature-version-4)
#[derive(Debug)]
pub struct RequestSignerV4 {
    region: String,
    product: String,
    additional_headers: Vec<String>,

    time: Option<DateTime>,
}

impl RequestSignerV4 {
    /// Create a new V4 signer for the given region, for example `cn-hangzhou`.
    pub fn new(region: &str) -> Self {
        Self {
            region: region.to_string(),
            product: DEFAULT_PRODUCT.to_string(),
            additional_headers: Vec::new(),

            time: None,
        }
    }

    /// Set the product of the signing scope, `oss` by default.
    pub fn with_product(mut self, product: &str) -> Self {
        self.product = product.to_string();
        self
    }

    /// Headers that should be signed besides the default ones.
    ///
    /// Only the names present on a request are signed.
    pub fn with_additional_headers(mut self, headers: Vec<String>) -> Self {
        self.additional_headers = headers
            .into_iter()
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| !v.is_empty())
            .collect();
        self
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

    fn scope(&self, time: DateTime) -> String {
        format!(
            "{}/{}/{}/aliyun_v4_request",
            format_date(time),
            self.region,
            self.product
        )
    }
}

#[async_trait]
impl SignRequest for RequestSignerV4 {
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

        let now = self.time.unwrap_or_else(now);
        let resource = req.extensions.get::<SigningResource>().cloned();
        let mut signed_req = SigningRequest::build(req)?;

        let present = canonicalize_header(&mut signed_req, cred, expires_in, now)?;
        let mut additional_headers = self
            .additional_headers
            .iter()
            .filter(|name| present.contains(name))
            .cloned()
            .collect::<Vec<_>>();
        additional_headers.sort();
        additional_headers.dedup();

        let scope = self.scope(now);
        debug!("calculated scope: {scope}");
        canonicalize_query(
            &mut signed_req,
            cred,
            expires_in,
            now,
            &scope,
            &additional_headers,
        );

        let creq = canonical_request_string(&signed_req, resource.as_ref(), &additional_headers)?;
        debug!("calculated canonical request: {creq:?}");

        // OSS4-HMAC-SHA256
        // 20220301T081234Z
        // 20220301/<region>/oss/aliyun_v4_request
        // <hashed_canonical_request>
        let string_to_sign = {
            let mut f = String::new();
            writeln!(f, "{ALGORITHM}")?;
            writeln!(f, "{}", format_iso8601(now))?;
            writeln!(f, "{scope}")?;
            write!(f, "{}", hex_sha256(creq.as_bytes()))?;
            f
        };
        debug!("calculated string to sign: {string_to_sign:?}");

        let signing_key = generate_signing_key(
            &cred.access_key_secret,
            now,
            &self.region,
            &self.product,
        );
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        if expires_in.is_some() {
            signed_req.query_push("x-oss-signature", signature);
        } else {
            let mut authorization =
                format!("{ALGORITHM} Credential={}/{scope}", cred.access_key_id);
            if !additional_headers.is_empty() {
                write!(
                    authorization,
                    ",AdditionalHeaders={}",
                    additional_headers.join(";")
                )?;
            }
            write!(authorization, ",Signature={signature}")?;

            let mut value: HeaderValue = authorization.parse()?;
            value.set_sensitive(true);
            signed_req.headers.insert(AUTHORIZATION, value);
        }

        signed_req.apply(req)
    }
}

fn is_default_signed(name: &str) -> bool {
    name == CONTENT_TYPE.as_str() || name == CONTENT_MD5 || name.starts_with("x-oss-")
}

/// Normalize headers and insert the ones required by header signing.
///
/// Returns the names of all headers present on the request that are not signed
/// by default.
fn canonicalize_header(
    ctx: &mut SigningRequest,
    cred: &Credential,
    expires_in: Option<Duration>,
    now: DateTime,
) -> Result<Vec<String>> {
    for (_, value) in ctx.headers.iter_mut() {
        SigningRequest::header_value_normalize(value)
    }

    if expires_in.is_none() {
        ctx.headers
            .insert(X_OSS_DATE, HeaderValue::try_from(format_iso8601(now))?);

        if ctx.headers.get(X_OSS_CONTENT_SHA256).is_none() {
            ctx.headers.insert(
                X_OSS_CONTENT_SHA256,
                HeaderValue::from_static(UNSIGNED_PAYLOAD),
            );
        }

        if let Some(token) = &cred.security_token {
            let mut value = HeaderValue::from_str(token)?;
            value.set_sensitive(true);
            ctx.headers.insert(X_OSS_SECURITY_TOKEN, value);
        }
    }

    Ok(ctx
        .headers
        .keys()
        .map(|k| k.as_str())
        .filter(|k| !is_default_signed(k))
        .map(|k| k.to_string())
        .collect())
}

/// Add the presign parameters and percent encode all query pairs, sorted.
fn canonicalize_query(
    ctx: &mut SigningRequest,
    cred: &Credential,
    expires_in: Option<Duration>,
    now: DateTime,
    scope: &str,
    additional_headers: &[String],
) {
    if let Some(expire) = expires_in {
        ctx.query_push("x-oss-signature-version", ALGORITHM);
        ctx.query_push(
            "x-oss-credential",
            format!("{}/{scope}", cred.access_key_id),
        );
        ctx.query_push("x-oss-date", format_iso8601(now));
        ctx.query_push("x-oss-expires", expire.as_secs().to_string());
        if !additional_headers.is_empty() {
            ctx.query_push("x-oss-additional-headers", additional_headers.join(";"));
        }
        if let Some(token) = &cred.security_token {
            ctx.query_push("x-oss-security-token", token);
        }
    }

    ctx.query = ctx
        .query
        .iter()
        .map(|(k, v)| (uri_encode(k), uri_encode(v)))
        .collect();
    ctx.query.sort();
}

fn canonical_uri(ctx: &SigningRequest, resource: Option<&SigningResource>) -> String {
    match resource {
        Some(SigningResource {
            bucket: Some(bucket),
            key: Some(key),
        }) => format!("/{bucket}/{}", path_encode(key)),
        Some(SigningResource {
            bucket: Some(bucket),
            key: None,
        }) => format!("/{bucket}/"),
        Some(_) => "/".to_string(),
        None => path_encode(&ctx.path_percent_decoded()),
    }
}

fn canonical_request_string(
    ctx: &SigningRequest,
    resource: Option<&SigningResource>,
    additional_headers: &[String],
) -> Result<String> {
    let mut f = String::with_capacity(256);

    writeln!(f, "{}", ctx.method)?;
    writeln!(f, "{}", canonical_uri(ctx, resource))?;
    writeln!(
        f,
        "{}",
        ctx.query
            .iter()
            .map(|(k, v)| if v.is_empty() {
                k.to_string()
            } else {
                format!("{k}={v}")
            })
            .collect::<Vec<_>>()
            .join("&")
    )?;

    let mut headers = Vec::new();
    for (name, value) in ctx.headers.iter() {
        let name = name.as_str();
        if is_default_signed(name) || additional_headers.iter().any(|v| v == name) {
            headers.push((name.to_string(), value.to_str()?.to_string()));
        }
    }
    headers.sort();
    for (name, value) in headers {
        writeln!(f, "{name}:{value}")?;
    }
    writeln!(f)?;
    writeln!(f, "{}", additional_headers.join(";"))?;

    match ctx.headers.get(X_OSS_CONTENT_SHA256) {
        Some(v) => write!(f, "{}", v.to_str()?)?,
        None => write!(f, "{UNSIGNED_PAYLOAD}")?,
    }

    Ok(f)
}

fn generate_signing_key(secret: &str, time: DateTime, region: &str, product: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("aliyun_v4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), format_date(time).as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign product
    let sign_product = hmac_sha256(sign_region.as_slice(), product.as_bytes());
    // Sign request
    hmac_sha256(sign_product.as_slice(), "aliyun_v4_request".as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn signing_time() -> DateTime {
        chrono::Utc
            .with_ymd_and_hms(2022, 3, 1, 8, 12, 34)
            .unwrap()
    }

    fn signer() -> RequestSignerV4 {
        RequestSignerV4::new("cn-hangzhou").with_time(signing_time())
    }

    fn put_request() -> http::request::Parts {
        let (mut parts, _) = http::Request::put("https://examplebucket.oss-cn-hangzhou.aliyuncs.com/exampledir/exampleobject.txt?acl")
            .header("content-type", "text/plain")
            .header("content-md5", "eB5eJF1ptWaXm4bijSPyxw==")
            .header("x-oss-meta-author", " alice ")
            .header("host", "examplebucket.oss-cn-hangzhou.aliyuncs.com")
            .body(())
            .unwrap()
            .into_parts();
        parts.extensions.insert(SigningResource::new(
            Some("examplebucket"),
            Some("exampledir/exampleobject.txt"),
        ));
        parts
    }

    #[test]
    fn test_signing_key() {
        let key = generate_signing_key("sk", signing_time(), "cn-hangzhou", "oss");
        assert_eq!(hex::encode(key), "53586cc9cc1cc35a9facdc73e0aa578698d179d6b6d6e43fff0b2cc03a07cb26");
    }

    #[test]
    fn test_canonical_uri() {
        let (mut parts, _) = http::Request::get("https://oss-cn-hangzhou.aliyuncs.com/b/a%20b.txt")
            .body(())
            .unwrap()
            .into_parts();
        let req = SigningRequest::build(&mut parts).unwrap();

        assert_eq!(
            canonical_uri(&req, Some(&SigningResource::new(Some("b"), Some("dir/a b+c.txt")))),
            "/b/dir/a%20b%2Bc.txt"
        );
        assert_eq!(canonical_uri(&req, Some(&SigningResource::new(Some("b"), None))), "/b/");
        assert_eq!(canonical_uri(&req, Some(&SigningResource::default())), "/");
        assert_eq!(canonical_uri(&req, None), "/b/a%20b.txt");
    }

    #[tokio::test]
    async fn test_sign_header() {
        let mut parts = put_request();
        let mut cred = Credential::new("ak", "sk");
        cred.security_token = Some("token".to_string());

        signer()
            .with_additional_headers(vec![
                "Host".to_string(),
                "x-oss-meta-author".to_string(),
                "range".to_string(),
            ])
            .sign_request(&Context::new(), &mut parts, Some(&cred), None)
            .await
            .unwrap();

        assert_eq!(parts.headers[X_OSS_DATE], "20220301T081234Z");
        assert_eq!(parts.headers[X_OSS_CONTENT_SHA256], UNSIGNED_PAYLOAD);
        assert_eq!(parts.headers[X_OSS_SECURITY_TOKEN], "token");
        assert_eq!(
            parts.headers[AUTHORIZATION],
            "OSS4-HMAC-SHA256 Credential=ak/20220301/cn-hangzhou/oss/aliyun_v4_request,AdditionalHeaders=host,Signature=69bb3806d7b3c449dcb6cd12f5575ba4091d7ba89ec68f844aec4b78e1b4c5b0"
        );
    }

    #[tokio::test]
    async fn test_sign_header_without_additional_headers() {
        let (mut parts, _) = http::Request::get("https://examplebucket.oss-cn-hangzhou.aliyuncs.com/?prefix=a%2Fb&max-keys=10")
            .body(())
            .unwrap()
            .into_parts();
        parts
            .extensions
            .insert(SigningResource::new(Some("examplebucket"), None));

        signer()
            .sign_request(&Context::new(), &mut parts, Some(&Credential::new("ak", "sk")), None)
            .await
            .unwrap();

        assert_eq!(
            parts.headers[AUTHORIZATION],
            "OSS4-HMAC-SHA256 Credential=ak/20220301/cn-hangzhou/oss/aliyun_v4_request,Signature=6f5cb495f307f62f76379624377201a9503b11daeebddee9b5c0561b225e1a96"
        );
        assert_eq!(parts.uri.query(), Some("max-keys=10&prefix=a%2Fb"));
    }

    #[tokio::test]
    async fn test_sign_query() {
        let (mut parts, _) = http::Request::get("https://examplebucket.oss-cn-hangzhou.aliyuncs.com/exampleobject.txt?versionId=v%2B1")
            .header("host", "examplebucket.oss-cn-hangzhou.aliyuncs.com")
            .body(())
            .unwrap()
            .into_parts();
        parts.extensions.insert(SigningResource::new(
            Some("examplebucket"),
            Some("exampleobject.txt"),
        ));
        let mut cred = Credential::new("ak", "sk");
        cred.security_token = Some("token/1".to_string());

        signer()
            .with_additional_headers(vec!["host".to_string()])
            .sign_request(
                &Context::new(),
                &mut parts,
                Some(&cred),
                Some(Duration::from_secs(3600)),
            )
            .await
            .unwrap();

        assert_eq!(parts.uri.query(), Some("versionId=v%2B1&x-oss-additional-headers=host&x-oss-credential=ak%2F20220301%2Fcn-hangzhou%2Foss%2Faliyun_v4_request&x-oss-date=20220301T081234Z&x-oss-expires=3600&x-oss-security-token=token%2F1&x-oss-signature-version=OSS4-HMAC-SHA256&x-oss-signature=2e9cdb3e4debd32d34a08b24f49ae0b3f64cb13a2c3cbc0327b95fd0bb8fe165"));
        assert!(parts.headers.get(AUTHORIZATION).is_none());
        assert!(parts.headers.get(X_OSS_DATE).is_none());
    }

    #[tokio::test]
    async fn test_anonymous_is_untouched() {
        let (mut parts, _) = http::Request::get("https://bucket.oss-cn-hangzhou.aliyuncs.com/a?acl")
            .body(())
            .unwrap()
            .into_parts();

        signer()
            .sign_request(&Context::new(), &mut parts, None, None)
            .await
            .unwrap();
        assert_eq!(parts.uri.to_string(), "https://bucket.oss-cn-hangzhou.aliyuncs.com/a?acl");
        assert!(parts.headers.is_empty());
    }
}
