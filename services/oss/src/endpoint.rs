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
//! Endpoint resolution and request addressing.

use crate::constants::MAX_OBJECT_KEY_LEN;
use crate::sign::path_encode;
use crate::Config;
use alioss_core::{Error, Result};
use std::net::IpAddr;

/// How buckets are addressed in request urls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressStyle {
    /// `https://bucket.endpoint/key`
    VirtualHosted,
    /// `https://endpoint/bucket/key`
    Path,
    /// `https://custom-domain/key`, the domain is bound to a single bucket.
    Cname,
}

/// A resolved service endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    scheme: String,
    host: String,
    style: AddressStyle,
    bucket_suffix: Option<String>,
}

impl Endpoint {
    /// Resolve the OSS endpoint described by config.
    ///
    /// An explicit endpoint wins over the region. Without an explicit
    /// scheme, `https` is used unless ssl is disabled.
    pub fn from_config(config: &Config) -> Result<Self> {
        let default_scheme = if config.disable_ssl { "http" } else { "https" };

        let (scheme, host) = match &config.endpoint {
            Some(endpoint) => split_scheme(endpoint, default_scheme)?,
            None => {
                let region = config.region.as_deref().ok_or_else(|| {
                    Error::config_invalid("either endpoint or region must be set")
                })?;
                let host = if config.use_accelerate_endpoint {
                    "oss-accelerate.aliyuncs.com".to_string()
                } else if config.use_internal_endpoint {
                    format!("oss-{region}-internal.aliyuncs.com")
                } else if config.use_dualstack_endpoint {
                    format!("{region}.oss.aliyuncs.com")
                } else {
                    format!("oss-{region}.aliyuncs.com")
                };
                (default_scheme.to_string(), host)
            }
        };

        let style = if config.use_cname {
            AddressStyle::Cname
        } else if config.use_path_style || is_ip_host(&host) {
            AddressStyle::Path
        } else {
            AddressStyle::VirtualHosted
        };

        Ok(Self {
            scheme,
            host,
            style,
            bucket_suffix: None,
        })
    }

    /// Resolve the endpoint of vector buckets.
    ///
    /// Vector buckets live under `{region}.oss-vectors.aliyuncs.com` and are
    /// always addressed as `{bucket}-{account_id}` sub domains.
    pub fn vectors_from_config(config: &Config) -> Result<Self> {
        let default_scheme = if config.disable_ssl { "http" } else { "https" };
        let region = config.signing_region().ok_or_else(|| {
            Error::config_invalid("region is required for vector bucket operations")
        })?;
        let host = if config.use_internal_endpoint {
            format!("{region}-internal.oss-vectors.aliyuncs.com")
        } else {
            format!("{region}.oss-vectors.aliyuncs.com")
        };

        Ok(Self {
            scheme: default_scheme.to_string(),
            host,
            style: AddressStyle::VirtualHosted,
            bucket_suffix: config.account_id.as_ref().map(|v| format!("-{v}")),
        })
    }

    /// Url scheme, `http` or `https`.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Host of the endpoint, may include a port.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Address style used for buckets.
    pub fn style(&self) -> AddressStyle {
        self.style
    }

    /// Host that serves the given bucket.
    pub fn bucket_host(&self, bucket: Option<&str>) -> Result<String> {
        match (bucket, self.style) {
            (Some(bucket), AddressStyle::VirtualHosted) => match &self.bucket_suffix {
                Some(suffix) => Ok(format!("{bucket}{suffix}.{}", self.host)),
                None if self.host.contains("oss-vectors") => Err(Error::config_invalid(
                    "account id is required for vector bucket operations",
                )),
                None => Ok(format!("{bucket}.{}", self.host)),
            },
            _ => Ok(self.host.clone()),
        }
    }

    /// Build the url for the given bucket, key and encoded query.
    pub fn url(&self, bucket: Option<&str>, key: Option<&str>, query: &str) -> Result<String> {
        let host = self.bucket_host(bucket)?;
        let mut path = String::from("/");
        if let (Some(bucket), AddressStyle::Path) = (bucket, self.style) {
            path.push_str(bucket);
            path.push('/');
        }
        if let Some(key) = key {
            path.push_str(&path_encode(key));
        }

        let mut url = format!("{}://{host}{path}", self.scheme);
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
        Ok(url)
    }
}

fn split_scheme(endpoint: &str, default_scheme: &str) -> Result<(String, String)> {
    let endpoint = endpoint.trim().trim_end_matches('/');
    let (scheme, host) = match endpoint.split_once("://") {
        Some((scheme, host)) => (scheme.to_ascii_lowercase(), host),
        None => (default_scheme.to_string(), endpoint),
    };

    if scheme != "http" && scheme != "https" {
        return Err(Error::config_invalid(format!(
            "endpoint scheme {scheme} is not supported"
        )));
    }
    if host.is_empty() || host.contains('/') {
        return Err(Error::config_invalid(format!(
            "endpoint {endpoint} is not a valid host"
        )));
    }
    Ok((scheme, host.to_string()))
}

fn is_ip_host(host: &str) -> bool {
    if let Some(v) = host.strip_prefix('[') {
        return v.split(']').next().is_some_and(|v| v.parse::<IpAddr>().is_ok());
    }
    let host = host.rsplit_once(':').map(|(h, _)| h).unwrap_or(host);
    host.parse::<IpAddr>().is_ok()
}

/// Check a bucket name: 3 to 63 characters of lowercase letters, digits and
/// `-`, neither starting nor ending with `-`.
pub fn is_valid_bucket_name(name: &str) -> bool {
    (3..=63).contains(&name.len())
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        && !name.starts_with('-')
        && !name.ends_with('-')
}

/// Check an object key: not empty and at most 1023 bytes.
pub fn is_valid_object_key(key: &str) -> bool {
    !key.is_empty() && key.len() <= MAX_OBJECT_KEY_LEN
}
