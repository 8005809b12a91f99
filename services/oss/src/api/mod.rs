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
//! Typed requests and results of the OSS operations.
//!
//! Each request converts into an [`OperationInput`](crate::OperationInput)
//! and each result decodes from an [`OperationOutput`](crate::OperationOutput).
//! [`Client`](crate::Client) gets one async method per operation.

use alioss_core::time::parse_rfc3339;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Declare a result that only carries the common fields.
macro_rules! empty_result {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $name {
            /// Status and headers of the response.
            pub common: crate::operation::ResultCommon,
        }

        impl crate::operation::FromOperationOutput for $name {
            fn from_output(
                output: crate::operation::OperationOutput,
            ) -> alioss_core::Result<Self> {
                Ok(Self {
                    common: output.common(),
                })
            }
        }
    };
}

/// Declare a result decoded from an xml body, the body struct must carry a
/// `#[serde(skip)] common` field.
macro_rules! xml_result {
    ($name:ident) => {
        impl crate::operation::FromOperationOutput for $name {
            fn from_output(
                output: crate::operation::OperationOutput,
            ) -> alioss_core::Result<Self> {
                let mut result: Self = output.xml()?;
                result.common = output.common();
                Ok(result)
            }
        }
    };
}

/// Declare a result decoded from a json body, see [`xml_result`].
macro_rules! json_result {
    ($name:ident) => {
        impl crate::operation::FromOperationOutput for $name {
            fn from_output(
                output: crate::operation::OperationOutput,
            ) -> alioss_core::Result<Self> {
                let mut result: Self = if output.body.is_empty() {
                    Self::default()
                } else {
                    output.json()?
                };
                result.common = output.common();
                Ok(result)
            }
        }
    };
}

/// Add one `Client` method per operation.
macro_rules! client_methods {
    ($($(#[$meta:meta])* $method:ident($req:ty) -> $res:ty;)+) => {
        impl crate::Client {
            $(
                $(#[$meta])*
                pub async fn $method(&self, request: $req) -> alioss_core::Result<$res> {
                    self.execute(request).await
                }
            )+
        }
    };
}

/// Declare a deserializer that unwraps `<Wrapper><Item/><Item/></Wrapper>`.
macro_rules! xml_list {
    ($fn_name:ident, $item:literal) => {
        pub(crate) fn $fn_name<'de, D, T>(
            deserializer: D,
        ) -> std::result::Result<Vec<T>, D::Error>
        where
            D: serde::Deserializer<'de>,
            T: serde::Deserialize<'de>,
        {
            #[derive(serde::Deserialize)]
            struct Wrapper<T> {
                #[serde(rename = $item, default = "Vec::new")]
                items: Vec<T>,
            }

            Ok(<Wrapper<T> as serde::Deserialize>::deserialize(deserializer)?.items)
        }
    };
}

pub mod bucket_acl;
pub mod bucket_basic;
pub mod bucket_cname;
pub mod bucket_replication;
pub mod bucket_tags;
pub mod multipart;
pub mod object_basic;
pub mod object_tagging;
pub mod select_object;
pub mod service;
pub mod vectors;

/// Deserialize an optional ISO8601 timestamp such as `2012-02-24T08:42:32.000Z`.
pub(crate) fn de_opt_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(v) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let v = v.trim();
    if v.is_empty() {
        return Ok(None);
    }
    parse_rfc3339(v).map(Some).map_err(serde::de::Error::custom)
}

/// Parse an optional http date header such as `Last-Modified`.
pub(crate) fn parse_http_date_opt(value: Option<String>) -> Option<DateTime<Utc>> {
    value.and_then(|v| alioss_core::time::parse_http_date(&v).ok())
}
