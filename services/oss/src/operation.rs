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
//! The envelopes exchanged between typed operations and the client pipeline.
//!
//! Every typed request converts itself into an [`OperationInput`] and every
//! typed result is decoded from an [`OperationOutput`]. The client only deals
//! with these two types.

use crate::constants::{CONTENT_MD5, X_OSS_META_PREFIX, X_OSS_REQUEST_ID};
use crate::error::{parse_json_error, parse_xml_error};
use alioss_core::hash::base64_md5;
use alioss_core::{Error, Result};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::header::{AsHeaderName, IntoHeaderName};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::str::FromStr;

/// The service family an operation talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Product {
    /// Object storage.
    #[default]
    Oss,
    /// Vector buckets.
    Vectors,
}

/// Checksum verification applied to an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrcCheck {
    /// No verification.
    #[default]
    None,
    /// Compare the CRC64 of the request body with `x-oss-hash-crc64ecma`.
    Upload,
    /// Like [`CrcCheck::Upload`] for appends, the server reports the CRC64
    /// of the whole object so the CRC64 of the existing data is required.
    Append(u64),
    /// Compare the CRC64 of a complete response body with `x-oss-hash-crc64ecma`.
    Download,
}

/// A request on its way to the client pipeline.
#[derive(Debug, Clone)]
pub struct OperationInput {
    /// Operation name, used in logs and errors.
    pub op_name: &'static str,
    /// HTTP method.
    pub method: Method,
    /// Target bucket.
    pub bucket: Option<String>,
    /// Target object key, not encoded.
    pub key: Option<String>,
    /// Request headers.
    pub headers: HeaderMap,
    /// Query parameters, sub-resources use an empty value.
    pub parameters: BTreeMap<String, String>,
    /// Request body.
    pub body: Bytes,
    /// Checksum verification.
    pub crc_check: CrcCheck,
    /// Service family.
    pub product: Product,
}

impl OperationInput {
    /// Create an input for the given operation.
    pub fn new(op_name: &'static str, method: Method) -> Self {
        Self {
            op_name,
            method,
            bucket: None,
            key: None,
            headers: HeaderMap::new(),
            parameters: BTreeMap::new(),
            body: Bytes::new(),
            crc_check: CrcCheck::None,
            product: Product::Oss,
        }
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_product(mut self, product: Product) -> Self {
        self.product = product;
        self
    }

    /// Add a sub-resource such as `acl` or `uploads`.
    pub fn with_sub_resource(mut self, name: &str) -> Self {
        self.parameters.insert(name.to_string(), String::new());
        self
    }

    pub fn with_param(mut self, name: &str, value: impl Display) -> Self {
        self.parameters.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_param_opt<T: Display>(self, name: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.with_param(name, v),
            None => self,
        }
    }

    pub fn with_header(mut self, name: impl IntoHeaderName, value: impl Display) -> Result<Self> {
        let value = HeaderValue::from_str(&value.to_string())?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn with_header_opt<T: Display>(
        self,
        name: impl IntoHeaderName,
        value: Option<T>,
    ) -> Result<Self> {
        match value {
            Some(v) => self.with_header(name, v),
            None => Ok(self),
        }
    }

    /// Add user metadata as `x-oss-meta-*` headers.
    pub fn with_metadata(mut self, metadata: &HashMap<String, String>) -> Result<Self> {
        for (k, v) in metadata {
            let name = HeaderName::from_str(&format!(
                "{X_OSS_META_PREFIX}{}",
                k.to_ascii_lowercase()
            ))?;
            self.headers.insert(name, HeaderValue::from_str(v)?);
        }
        Ok(self)
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set `Content-MD5` of the current body.
    pub fn with_content_md5(mut self) -> Result<Self> {
        let md5 = base64_md5(&self.body);
        self.headers.insert(CONTENT_MD5, HeaderValue::from_str(&md5)?);
        Ok(self)
    }

    /// Serialize `value` as xml body under the given root element.
    ///
    /// OSS requires `Content-MD5` on most configuration uploads, it is always set.
    pub fn with_xml_body<T: Serialize>(mut self, root: &str, value: &T) -> Result<Self> {
        let xml = quick_xml::se::to_string_with_root(root, value).map_err(|e| {
            Error::request_invalid(format!("failed to encode {} body as xml", self.op_name))
                .with_source(e)
        })?;
        self.body = Bytes::from(xml);
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/xml"));
        self.with_content_md5()
    }

    /// Serialize `value` as json body.
    pub fn with_json_body<T: Serialize>(mut self, value: &T) -> Result<Self> {
        let json = serde_json::to_vec(value).map_err(|e| {
            Error::request_invalid(format!("failed to encode {} body as json", self.op_name))
                .with_source(e)
        })?;
        self.body = Bytes::from(json);
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.with_content_md5()
    }

    pub fn with_crc_check(mut self, check: CrcCheck) -> Self {
        self.crc_check = check;
        self
    }

    /// Encode the parameters as query string, sorted by name.
    pub fn query_string(&self) -> String {
        self.parameters
            .iter()
            .map(|(k, v)| {
                let k = crate::sign::uri_encode(k);
                if v.is_empty() {
                    k
                } else {
                    format!("{k}={}", crate::sign::uri_encode(v))
                }
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// A response returned by the client pipeline.
#[derive(Debug, Clone)]
pub struct OperationOutput {
    /// Operation name.
    pub op_name: &'static str,
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

impl OperationOutput {
    /// Get a header value as string.
    pub fn header(&self, name: impl AsHeaderName) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    }

    /// Parse a header value.
    pub fn header_parse<T>(&self, name: impl AsHeaderName + Display) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        let name_str = name.to_string();
        let Some(v) = self.header(name) else {
            return Ok(None);
        };
        v.parse::<T>().map(Some).map_err(|e| {
            Error::response_invalid(format!(
                "{}: header {name_str} has invalid value {v}: {e}",
                self.op_name
            ))
        })
    }

    /// User metadata with the `x-oss-meta-` prefix removed.
    pub fn metadata(&self) -> HashMap<String, String> {
        self.headers
            .iter()
            .filter_map(|(k, v)| {
                let name = k.as_str().strip_prefix(X_OSS_META_PREFIX)?;
                Some((name.to_string(), v.to_str().ok()?.to_string()))
            })
            .collect()
    }

    /// Decode the xml body.
    pub fn xml<T: DeserializeOwned>(&self) -> Result<T> {
        let text = std::str::from_utf8(&self.body).map_err(|e| {
            Error::response_invalid(format!("{} response is not utf-8", self.op_name))
                .with_source(e)
        })?;
        quick_xml::de::from_str(text).map_err(|e| parse_xml_error(self.op_name, e))
    }

    /// Decode the json body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| parse_json_error(self.op_name, e))
    }

    /// The fields shared by all results.
    pub fn common(&self) -> ResultCommon {
        ResultCommon {
            status_code: self.status.as_u16(),
            headers: self.headers.clone(),
        }
    }
}

/// Fields shared by all results.
#[derive(Debug, Clone, Default)]
pub struct ResultCommon {
    /// HTTP status code.
    pub status_code: u16,
    /// Response headers.
    pub headers: HeaderMap,
}

impl ResultCommon {
    /// Request id assigned by the service.
    pub fn request_id(&self) -> Option<&str> {
        self.headers
            .get(X_OSS_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
    }
}

/// A typed request that can be executed by [`crate::Client`].
pub trait Operation: Send {
    /// Result decoded from the response.
    type Output: FromOperationOutput;

    /// Convert into the wire envelope.
    fn into_input(self) -> Result<OperationInput>;
}

/// A typed result decoded from a response.
pub trait FromOperationOutput: Sized + Send {
    /// Decode from the wire envelope.
    fn from_output(output: OperationOutput) -> Result<Self>;
}

impl FromOperationOutput for OperationOutput {
    fn from_output(output: OperationOutput) -> Result<Self> {
        Ok(output)
    }
}

impl Operation for OperationInput {
    type Output = OperationOutput;

    fn into_input(self) -> Result<OperationInput> {
        Ok(self)
    }
}

/// Require a field to be set, as a request validation error.
pub(crate) fn required<T>(value: Option<T>, op: &str, field: &str) -> Result<T> {
    value.ok_or_else(|| Error::request_invalid(format!("{op}: missing required field {field}")))
}

/// Percent decode a value returned with `encoding-type=url`.
pub(crate) fn url_decode(value: &str) -> Result<String> {
    percent_encoding::percent_decode_str(value)
        .decode_utf8()
        .map(|v| v.into_owned())
        .map_err(|e| Error::response_invalid("invalid url encoded value").with_source(e))
}
