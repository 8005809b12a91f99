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
//! Custom domain names bound to a bucket.

use super::de_opt_time;
use crate::operation::{Operation, OperationInput, ResultCommon};
use alioss_core::Result;
use chrono::{DateTime, Utc};
use http::Method;
use serde::{Deserialize, Serialize};

/// Certificate attached to a custom domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CertificateConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_cert_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_certificate: Option<bool>,
}

/// A custom domain in a cname request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Cname {
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_configuration: Option<CertificateConfiguration>,
}

impl Cname {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            certificate_configuration: None,
        }
    }

    pub fn with_certificate(mut self, certificate: CertificateConfiguration) -> Self {
        self.certificate_configuration = Some(certificate);
        self
    }
}

/// Body of the cname requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketCnameConfiguration {
    pub cname: Cname,
}

fn cname_input(
    op_name: &'static str,
    bucket: String,
    comp: &str,
    cname: Cname,
) -> Result<OperationInput> {
    OperationInput::new(op_name, Method::POST)
        .with_bucket(bucket)
        .with_sub_resource("cname")
        .with_param("comp", comp)
        .with_xml_body("BucketCnameConfiguration", &BucketCnameConfiguration { cname })
}

/// Bind a custom domain to a bucket.
#[derive(Debug, Clone, Default)]
pub struct PutCnameRequest {
    pub bucket: String,
    pub cname: Cname,
}

impl PutCnameRequest {
    pub fn new(bucket: impl Into<String>, cname: Cname) -> Self {
        Self {
            bucket: bucket.into(),
            cname,
        }
    }
}

impl Operation for PutCnameRequest {
    type Output = PutCnameResult;

    fn into_input(self) -> Result<OperationInput> {
        cname_input("PutCname", self.bucket, "add", self.cname)
    }
}

empty_result!(
    /// Result of `PutCname`.
    PutCnameResult
);

/// List the custom domains of a bucket.
#[derive(Debug, Clone, Default)]
pub struct ListCnameRequest {
    pub bucket: String,
}

impl ListCnameRequest {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }
}

impl Operation for ListCnameRequest {
    type Output = ListCnameResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(OperationInput::new("ListCname", Method::GET)
            .with_bucket(self.bucket)
            .with_sub_resource("cname"))
    }
}

/// Certificate bound to a custom domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CnameCertificate {
    #[serde(rename = "Type")]
    pub cert_type: Option<String>,
    pub cert_id: Option<String>,
    pub status: Option<String>,
    pub creation_date: Option<String>,
    pub fingerprint: Option<String>,
    pub valid_start_date: Option<String>,
    pub valid_end_date: Option<String>,
}

/// A custom domain of a bucket.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CnameInfo {
    #[serde(default)]
    pub domain: String,
    #[serde(default, deserialize_with = "de_opt_time")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub certificate: Option<CnameCertificate>,
}

/// Result of `ListCname`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListCnameResult {
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(rename = "Cname", default)]
    pub cnames: Vec<CnameInfo>,
    #[serde(skip)]
    pub common: ResultCommon,
}

xml_result!(ListCnameResult);

/// Unbind a custom domain.
#[derive(Debug, Clone, Default)]
pub struct DeleteCnameRequest {
    pub bucket: String,
    pub domain: String,
}

impl DeleteCnameRequest {
    pub fn new(bucket: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            domain: domain.into(),
        }
    }
}

impl Operation for DeleteCnameRequest {
    type Output = DeleteCnameResult;

    fn into_input(self) -> Result<OperationInput> {
        cname_input("DeleteCname", self.bucket, "delete", Cname::new(self.domain))
    }
}

empty_result!(
    /// Result of `DeleteCname`.
    DeleteCnameResult
);

/// A token proving ownership of a domain, returned by `GetCnameToken` and
/// `CreateCnameToken`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CnameTokenResult {
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub cname: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub expire_time: Option<String>,
    #[serde(skip)]
    pub common: ResultCommon,
}

xml_result!(CnameTokenResult);

/// Get the token created for a domain.
#[derive(Debug, Clone, Default)]
pub struct GetCnameTokenRequest {
    pub bucket: String,
    pub domain: String,
}

impl GetCnameTokenRequest {
    pub fn new(bucket: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            domain: domain.into(),
        }
    }
}

impl Operation for GetCnameTokenRequest {
    type Output = CnameTokenResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(OperationInput::new("GetCnameToken", Method::GET)
            .with_bucket(self.bucket)
            .with_param("comp", "token")
            .with_param("cname", self.domain))
    }
}

/// Create a token to prove ownership of a domain.
#[derive(Debug, Clone, Default)]
pub struct CreateCnameTokenRequest {
    pub bucket: String,
    pub domain: String,
}

impl CreateCnameTokenRequest {
    pub fn new(bucket: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            domain: domain.into(),
        }
    }
}

impl Operation for CreateCnameTokenRequest {
    type Output = CnameTokenResult;

    fn into_input(self) -> Result<OperationInput> {
        cname_input("CreateCnameToken", self.bucket, "token", Cname::new(self.domain))
    }
}

client_methods! {
    put_cname(PutCnameRequest) -> PutCnameResult;
    list_cname(ListCnameRequest) -> ListCnameResult;
    delete_cname(DeleteCnameRequest) -> DeleteCnameResult;
    get_cname_token(GetCnameTokenRequest) -> CnameTokenResult;
    create_cname_token(CreateCnameTokenRequest) -> CnameTokenResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{FromOperationOutput, OperationOutput};
    use bytes::Bytes;
    use http::{HeaderMap, StatusCode};
    use pretty_assertions::assert_eq;

    fn output(op_name: &'static str, body: &str) -> OperationOutput {
        OperationOutput {
            op_name,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    #[test]
    fn test_put_cname_input() {
        let cname = Cname::new("example.com").with_certificate(CertificateConfiguration {
            cert_id: Some("493****-cn-hangzhou".to_string()),
            force: Some(true),
            ..Default::default()
        });
        let input = PutCnameRequest::new("examplebucket", cname).into_input().unwrap();
        assert_eq!(input.method, Method::POST);
        assert_eq!(input.query_string(), "cname&comp=add");
        assert_eq!(
            input.body,
            "<BucketCnameConfiguration><Cname><Domain>example.com</Domain>\
             <CertificateConfiguration><CertId>493****-cn-hangzhou</CertId>\
             <Force>true</Force></CertificateConfiguration></Cname></BucketCnameConfiguration>"
        );
    }

    #[test]
    fn test_delete_cname_input() {
        let input = DeleteCnameRequest::new("examplebucket", "example.com")
            .into_input()
            .unwrap();
        assert_eq!(input.query_string(), "cname&comp=delete");
        assert_eq!(
            input.body,
            "<BucketCnameConfiguration><Cname><Domain>example.com</Domain></Cname>\
             </BucketCnameConfiguration>"
        );
    }

    #[test]
    fn test_list_cname_result() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListCnameResult>
  <Bucket>targetbucket</Bucket>
  <Owner>testowner</Owner>
  <Cname>
    <Domain>example.com</Domain>
    <LastModified>2021-09-15T02:35:07.000Z</LastModified>
    <Status>Enabled</Status>
    <Certificate>
      <Type>CAS</Type>
      <CertId>493****-cn-hangzhou</CertId>
      <Status>Enabled</Status>
      <CreationDate>Wed, 15 Sep 2021 02:35:06 GMT</CreationDate>
      <Fingerprint>DE:01:CF:EC:7C:A7:98:CB:D8:6E:FB:1D:97:EB:A9:64:1D:4E:**:**</Fingerprint>
      <ValidStartDate>Wed, 12 Apr 2023 10:14:51 GMT</ValidStartDate>
      <ValidEndDate>Mon, 4 May 2048 10:14:51 GMT</ValidEndDate>
    </Certificate>
  </Cname>
  <Cname>
    <Domain>example.org</Domain>
    <Status>Disabled</Status>
  </Cname>
</ListCnameResult>"#;
        let result = ListCnameResult::from_output(output("ListCname", body)).unwrap();
        assert_eq!(result.bucket, "targetbucket");
        assert_eq!(result.owner.as_deref(), Some("testowner"));
        assert_eq!(result.cnames.len(), 2);
        let cert = result.cnames[0].certificate.clone().unwrap();
        assert_eq!(cert.cert_type.as_deref(), Some("CAS"));
        assert_eq!(cert.cert_id.as_deref(), Some("493****-cn-hangzhou"));
        assert_eq!(result.cnames[1].domain, "example.org");
        assert!(result.cnames[1].certificate.is_none());
    }

    #[test]
    fn test_cname_token() {
        let input = GetCnameTokenRequest::new("examplebucket", "example.com")
            .into_input()
            .unwrap();
        assert_eq!(input.method, Method::GET);
        assert_eq!(input.query_string(), "cname=example.com&comp=token");

        let input = CreateCnameTokenRequest::new("examplebucket", "example.com")
            .into_input()
            .unwrap();
        assert_eq!(input.method, Method::POST);
        assert_eq!(input.query_string(), "cname&comp=token");

        let body = r#"<CnameToken>
  <Bucket>examplebucket</Bucket>
  <Cname>example.com</Cname>
  <Token>be1d49d863dea9ffeff3df7d6455****</Token>
  <ExpireTime>Wed, 23 Feb 2022 21:16:37 GMT</ExpireTime>
</CnameToken>"#;
        let result = CnameTokenResult::from_output(output("GetCnameToken", body)).unwrap();
        assert_eq!(result.cname, "example.com");
        assert_eq!(result.token, "be1d49d863dea9ffeff3df7d6455****");
        assert_eq!(
            result.expire_time.as_deref(),
            Some("Wed, 23 Feb 2022 21:16:37 GMT")
        );
    }
}
