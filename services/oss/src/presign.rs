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
//! Presigned urls.

use crate::constants::MAX_PRESIGN_EXPIRES_V4_SECS;
use crate::operation::Operation;
use crate::sign::SignatureVersion;
use crate::client::validate;
use crate::Client;
use alioss_core::time::{now, DateTime};
use alioss_core::{Error, Result};
use std::collections::HashMap;
use std::time::Duration;

/// A presigned request that can be sent by anyone before it expires.
#[derive(Debug, Clone)]
pub struct PresignResult {
    /// HTTP method.
    pub method: String,
    /// Url carrying the signature in its query.
    pub url: String,
    /// When the signature expires.
    pub expiration: DateTime,
    /// Headers that must be sent along with the url.
    pub signed_headers: HashMap<String, String>,
}

impl Client {
    /// Presign an operation, the signature is carried by the url query.
    ///
    /// V4 signatures can't outlive 7 days.
    pub async fn presign<O: Operation>(&self, op: O, expires: Duration) -> Result<PresignResult> {
        let input = op.into_input()?;
        validate(&input)?;
        if self.config.signature_version == SignatureVersion::V4
            && expires > Duration::from_secs(MAX_PRESIGN_EXPIRES_V4_SECS)
        {
            return Err(Error::request_invalid(format!(
                "{}: expires {expires:?} exceeds the 7 days limit of signature version 4",
                input.op_name
            )));
        }

        let signer = self.signer_for(input.product)?;
        if signer.credential().await?.is_none() {
            return Err(Error::credential_invalid(
                "presign requires credentials, none were found",
            ));
        }

        let expiration = now()
            + chrono::TimeDelta::from_std(expires).map_err(|e| {
                Error::request_invalid("invalid expiration duration").with_source(e)
            })?;

        let req = self.build_request(&input, true)?;
        let (mut parts, _) = req.into_parts();
        signer.sign(&mut parts, Some(expires)).await?;

        let signed_headers = parts
            .headers
            .iter()
            .filter_map(|(k, v)| Some((k.to_string(), v.to_str().ok()?.to_string())))
            .collect();

        Ok(PresignResult {
            method: parts.method.to_string(),
            url: parts.uri.to_string(),
            expiration,
            signed_headers,
        })
    }
}
