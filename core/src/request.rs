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

use std::borrow::Cow;
use std::mem;
use std::str::FromStr;
use std::time::Duration;

use crate::Error;
use crate::Result;
use http::header::HeaderName;
use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::HeaderValue;
use http::Method;
use http::Uri;

/// A request taken apart for signing.
///
/// [`SigningRequest::build`] moves the uri and headers out of the request parts,
/// signers edit the query and headers in place, and [`SigningRequest::apply`]
/// puts everything back.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// Raw (still percent encoded) path.
    pub path: String,
    /// Query pairs, percent decoded, in request order.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Take the uri and headers out of `parts`.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let uri = mem::take(&mut parts.uri).into_parts();
        let authority = uri.authority.ok_or_else(|| {
            Error::request_invalid("request without authority is invalid for signing")
        })?;
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));
        let query = paq
            .query()
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme.unwrap_or(Scheme::HTTP),
            authority,
            path: paq.path().to_string(),
            query,
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Write the (signed) request back into `parts`.
    ///
    /// Query pairs are written as they are, signers must encode values themselves.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        let mut paq = mem::take(&mut self.path);
        if !self.query.is_empty() {
            paq.reserve(self.query_size() + self.query.len() * 2);
            paq.push('?');
            paq.push_str(&join_pairs(self.query.iter(), "=", "&", true));
        }

        let mut uri_parts = mem::take(&mut parts.uri).into_parts();
        uri_parts.scheme = Some(self.scheme);
        uri_parts.authority = Some(self.authority);
        uri_parts.path_and_query = Some(PathAndQuery::from_str(&paq)?);

        parts.uri = Uri::from_parts(uri_parts)?;
        parts.method = self.method;
        parts.headers = self.headers;
        Ok(())
    }

    /// Path with percent escapes decoded.
    pub fn path_percent_decoded(&self) -> Cow<'_, str> {
        percent_encoding::percent_decode_str(&self.path).decode_utf8_lossy()
    }

    /// Total bytes of all query keys and values.
    #[inline]
    pub fn query_size(&self) -> usize {
        self.query.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    /// Append a query pair.
    #[inline]
    pub fn query_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }

    /// Owned copies of the query pairs whose key passes `filter`.
    pub fn query_to_vec_with_filter(&self, filter: impl Fn(&str) -> bool) -> Vec<(String, String)> {
        self.query
            .iter()
            .filter(|(k, _)| filter(k))
            .cloned()
            .collect()
    }

    /// Sort the pairs and join them, a pair with an empty value is written as its key.
    ///
    /// ```shell
    /// [(versionId, v1), (acl, "")] => "acl&versionId=v1"
    /// ```
    pub fn query_to_string(mut query: Vec<(String, String)>, sep: &str, join: &str) -> String {
        query.sort();
        join_pairs(query.iter(), sep, join, true)
    }

    /// Header value as str, empty when absent.
    #[inline]
    pub fn header_get_or_default(&self, key: &HeaderName) -> Result<&str> {
        match self.headers.get(key) {
            Some(v) => Ok(v.to_str()?),
            None => Ok(""),
        }
    }

    /// Trim leading and trailing spaces of a header value.
    pub fn header_value_normalize(v: &mut HeaderValue) {
        let bs = v.as_bytes();
        let start = bs.iter().position(|b| *b != b' ').unwrap_or(bs.len());
        let end = bs.iter().rposition(|b| *b != b' ').map_or(start, |i| i + 1);
        if start == 0 && end == bs.len() {
            return;
        }
        if let Ok(trimmed) = HeaderValue::from_bytes(&bs[start..end]) {
            *v = trimmed;
        }
    }

    /// Headers whose lowercase name starts with `prefix`.
    ///
    /// Values that are not visible ASCII are rejected.
    pub fn header_to_vec_with_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        self.headers
            .iter()
            .filter(|(k, _)| k.as_str().starts_with(prefix))
            .map(|(k, v)| Ok((k.as_str().to_lowercase(), v.to_str()?.to_string())))
            .collect()
    }

    /// Sort the headers and join them, every pair keeps its separator.
    ///
    /// ```shell
    /// [(x-oss-b, 2), (x-oss-a, 1)] => "x-oss-a:1\nx-oss-b:2"
    /// ```
    pub fn header_to_string(mut headers: Vec<(String, String)>, sep: &str, join: &str) -> String {
        headers.sort();
        join_pairs(headers.iter(), sep, join, false)
    }
}

fn join_pairs<'a>(
    pairs: impl Iterator<Item = &'a (String, String)>,
    sep: &str,
    join: &str,
    skip_empty_value: bool,
) -> String {
    let mut s = String::with_capacity(16);
    for (idx, (k, v)) in pairs.enumerate() {
        if idx != 0 {
            s.push_str(join);
        }
        s.push_str(k);
        if !(skip_empty_value && v.is_empty()) {
            s.push_str(sep);
            s.push_str(v);
        }
    }
    s
}

/// Where the signature ends up.
#[derive(Copy, Clone, PartialEq, Eq)]
pub enum SigningMethod {
    /// In the `Authorization` header.
    Header,
    /// In the query, valid for the given duration.
    Query(Duration),
}

impl SigningMethod {
    /// Build the method from the optional expiry passed to `SignRequest`.
    pub fn from_expires_in(expires_in: Option<Duration>) -> Self {
        match expires_in {
            Some(d) => SigningMethod::Query(d),
            None => SigningMethod::Header,
        }
    }
}
