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
//! Mapping of OSS error responses.

use crate::constants::{X_OSS_EC, X_OSS_ERR, X_OSS_REQUEST_ID};
use alioss_core::hash::base64_decode;
use alioss_core::Error;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::Deserialize;
use std::fmt;

/// The error returned by OSS for a failed request.
///
/// It is kept as the source of an [`alioss_core::Error`] with kind
/// [`alioss_core::ErrorKind::ServiceError`], use [`ServiceError::downcast`] to get it back.
#[derive(Debug, Clone, Default)]
pub struct ServiceError {
    /// HTTP status code of the response.
    pub status_code: u16,
    /// Error code, for example `NoSuchKey`.
    pub code: String,
    /// Human readable message.
    pub message: String,
    /// Request id, from the body or the `x-oss-request-id` header.
    pub request_id: String,
    /// Host id.
    pub host_id: String,
    /// Detailed error code, from the body or the `x-oss-ec` header.
    pub ec: String,
    /// `METHOD url` of the failed request.
    pub request_target: String,
    /// Response headers.
    pub headers: HeaderMap,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ErrorBody {
    code: String,
    message: String,
    request_id: String,
    host_id: String,
    #[serde(rename = "EC")]
    ec: String,
}

#[derive(Debug, Deserialize)]
struct JsonErrorEnvelope {
    #[serde(rename = "Error")]
    error: ErrorBody,
}

impl ServiceError {
    /// Build the error from a failed response.
    ///
    /// XML and JSON error bodies are decoded. `HEAD` responses carry no body,
    /// the error is read from the base64 encoded `x-oss-err` header instead.
    /// Bodies that can't be decoded are kept verbatim as message.
    pub fn from_response(
        status: StatusCode,
        headers: HeaderMap,
        body: &Bytes,
        request_target: impl Into<String>,
    ) -> Self {
        let mut err = ServiceError {
            status_code: status.as_u16(),
            request_target: request_target.into(),
            ..Default::default()
        };

        let header_body = if body.is_empty() {
            headers
                .get(X_OSS_ERR)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| base64_decode(v).ok())
                .map(Bytes::from)
        } else {
            None
        };
        let body = header_body.as_ref().unwrap_or(body);

        match parse_error_body(body) {
            Some(parsed) => {
                err.code = parsed.code;
                err.message = parsed.message;
                err.request_id = parsed.request_id;
                err.host_id = parsed.host_id;
                err.ec = parsed.ec;
            }
            None if body.is_empty() => {
                err.code = status
                    .canonical_reason()
                    .unwrap_or("Unknown")
                    .replace(' ', "");
                err.message = "empty response body".to_string();
            }
            None => {
                err.code = "BadErrorResponse".to_string();
                err.message = String::from_utf8_lossy(body).trim().to_string();
            }
        }

        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        };
        if err.request_id.is_empty() {
            err.request_id = header(X_OSS_REQUEST_ID).unwrap_or_default();
        }
        if err.ec.is_empty() {
            err.ec = header(X_OSS_EC).unwrap_or_default();
        }

        err.headers = headers;
        err
    }

    /// Get the service error behind an [`Error`], if any.
    pub fn downcast(err: &Error) -> Option<&ServiceError> {
        err.cause()?.downcast_ref::<ServiceError>()
    }
}

fn parse_error_body(body: &[u8]) -> Option<ErrorBody> {
    let text = std::str::from_utf8(body).ok()?.trim();
    if text.starts_with('<') {
        if !text.contains("<Error>") {
            return None;
        }
        return quick_xml::de::from_str::<ErrorBody>(text).ok();
    }
    if text.starts_with('{') {
        if let Ok(v) = serde_json::from_str::<JsonErrorEnvelope>(text) {
            return Some(v.error);
        }
        return serde_json::from_str::<ErrorBody>(text)
            .ok()
            .filter(|v| !v.code.is_empty());
    }
    None
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error returned by Service. Http Status Code: {}. Error Code: {}. Request Id: {}. Message: {}.",
            self.status_code, self.code, self.request_id, self.message
        )?;
        if !self.ec.is_empty() {
            write!(f, " EC: {}.", self.ec)?;
        }
        if !self.request_target.is_empty() {
            write!(f, " Request Endpoint: {}.", self.request_target)?;
        }
        Ok(())
    }
}

impl std::error::Error for ServiceError {}

impl From<ServiceError> for Error {
    fn from(err: ServiceError) -> Self {
        Error::service_error(format!("{}: {}", err.code, err.message)).with_source(err)
    }
}

/// Map a quick-xml decode failure.
pub(crate) fn parse_xml_error(op: &str, err: quick_xml::DeError) -> Error {
    Error::response_invalid(format!("failed to decode {op} response as xml")).with_source(err)
}

/// Map a serde_json decode failure.
pub(crate) fn parse_json_error(op: &str, err: serde_json::Error) -> Error {
    Error::response_invalid(format!("failed to decode {op} response as json")).with_source(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alioss_core::ErrorKind;
    use pretty_assertions::assert_eq;

    const XML_ERROR: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error>
  <Code>NoSuchKey</Code>
  <Message>The specified key does not exist.</Message>
  <RequestId>5C3D9175B6FC201293AD****</RequestId>
  <HostId>bucket.oss-cn-hangzhou.aliyuncs.com</HostId>
  <Key>missing.txt</Key>
  <EC>0026-00000001</EC>
</Error>"#;

    #[test]
    fn test_xml_error() {
        let err = ServiceError::from_response(
            StatusCode::NOT_FOUND,
            HeaderMap::new(),
            &Bytes::from_static(XML_ERROR.as_bytes()),
            "GET https://bucket.oss-cn-hangzhou.aliyuncs.com/missing.txt",
        );

        assert_eq!(err.status_code, 404);
        assert_eq!(err.code, "NoSuchKey");
        assert_eq!(err.message, "The specified key does not exist.");
        assert_eq!(err.request_id, "5C3D9175B6FC201293AD****");
        assert_eq!(err.host_id, "bucket.oss-cn-hangzhou.aliyuncs.com");
        assert_eq!(err.ec, "0026-00000001");
    }

    #[test]
    fn test_raw_body_and_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(X_OSS_REQUEST_ID, "req-1".parse().unwrap());
        headers.insert(X_OSS_EC, "0002-00000902".parse().unwrap());

        let err = ServiceError::from_response(
            StatusCode::BAD_GATEWAY,
            headers,
            &Bytes::from_static(b"upstream connect error"),
            "",
        );

        assert_eq!(err.code, "BadErrorResponse");
        assert_eq!(err.message, "upstream connect error");
        assert_eq!(err.request_id, "req-1");
        assert_eq!(err.ec, "0002-00000902");
    }

    #[test]
    fn test_head_error_from_header() {
        let mut headers = HeaderMap::new();
        let encoded = alioss_core::hash::base64_encode(XML_ERROR.as_bytes());
        headers.insert(X_OSS_ERR, encoded.parse().unwrap());

        let err = ServiceError::from_response(StatusCode::NOT_FOUND, headers, &Bytes::new(), "");
        assert_eq!(err.code, "NoSuchKey");
        assert_eq!(err.ec, "0026-00000001");
    }

    #[test]
    fn test_empty_body() {
        let err = ServiceError::from_response(
            StatusCode::NOT_FOUND,
            HeaderMap::new(),
            &Bytes::new(),
            "",
        );
        assert_eq!(err.code, "NotFound");
    }

    #[test]
    fn test_json_error() {
        let body = r#"{"Error":{"Code":"VectorBucketNotFound","Message":"not found","RequestId":"req-2"}}"#;
        let err = ServiceError::from_response(
            StatusCode::NOT_FOUND,
            HeaderMap::new(),
            &Bytes::from(body),
            "",
        );
        assert_eq!(err.code, "VectorBucketNotFound");
        assert_eq!(err.request_id, "req-2");
    }

    #[test]
    fn test_into_error_and_downcast() {
        let err: Error = ServiceError {
            status_code: 403,
            code: "AccessDenied".to_string(),
            message: "denied".to_string(),
            ..Default::default()
        }
        .into();

        assert_eq!(err.kind(), ErrorKind::ServiceError);
        assert_eq!(err.message(), "AccessDenied: denied");
        let se = ServiceError::downcast(&err).unwrap();
        assert_eq!(se.status_code, 403);
        assert!(se.to_string().contains("Error Code: AccessDenied"));
    }
}
