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
mod common;

use alioss::{
    Config, GetObjectRequest, ListObjectsV2Request, NopRetryer, PutObjectRequest, ServiceError,
    SignatureVersion, StandardRetryer,
};
use alioss_core::crc64::crc64;
use alioss_core::ErrorKind;
use common::{client, ReplayHttpSend};
use futures::TryStreamExt;
use pretty_assertions::assert_eq;
use std::time::Duration;

#[tokio::test]
async fn put_object_is_signed_with_v4() {
    let crc = crc64(b"hello").to_string();
    let http = ReplayHttpSend::new().reply(
        200,
        &[("etag", "\"abc\""), ("x-oss-hash-crc64ecma", crc.as_str())],
        "",
    );
    let result = client(http.clone(), Config::new("cn-hangzhou"))
        .put_object(PutObjectRequest::new("bucket", "a.txt", "hello"))
        .await
        .unwrap();
    assert_eq!(result.etag.as_deref(), Some("\"abc\""));
    assert_eq!(result.hash_crc64, Some(crc64(b"hello")));

    let seen = http.seen();
    let (method, uri, headers, body) = &seen[0];
    assert_eq!(method, "PUT");
    assert_eq!(uri, "https://bucket.oss-cn-hangzhou.aliyuncs.com/a.txt");
    assert_eq!(body.as_ref(), b"hello");
    let auth = headers["authorization"].to_str().unwrap();
    assert!(auth.starts_with("OSS4-HMAC-SHA256 Credential=ak/"), "{auth}");
    assert!(auth.contains("/cn-hangzhou/oss/aliyun_v4_request"), "{auth}");
    assert_eq!(headers["x-oss-content-sha256"], "UNSIGNED-PAYLOAD");
    assert!(headers.contains_key("x-oss-date"));
}

#[tokio::test]
async fn get_object_is_signed_with_v1_in_path_style() {
    let http = ReplayHttpSend::new().reply(200, &[], "hello");
    let config = Config {
        signature_version: SignatureVersion::V1,
        use_path_style: true,
        ..Config::new("cn-hangzhou")
    };
    let result = client(http.clone(), config)
        .get_object(GetObjectRequest::new("bucket", "dir/a.txt"))
        .await
        .unwrap();
    assert_eq!(result.body, "hello");

    let seen = http.seen();
    let (_, uri, headers, _) = &seen[0];
    assert_eq!(uri, "https://oss-cn-hangzhou.aliyuncs.com/bucket/dir/a.txt");
    assert!(headers["authorization"]
        .to_str()
        .unwrap()
        .starts_with("OSS ak:"));
    assert!(headers.contains_key("date"));
}

#[tokio::test]
async fn server_errors_are_retried() {
    let http = ReplayHttpSend::new()
        .reply(503, &[], "<Error><Code>ServiceUnavailable</Code></Error>")
        .reply(500, &[], "<Error><Code>InternalError</Code></Error>")
        .reply(200, &[], "ok");
    let client = client(http.clone(), Config::new("cn-hangzhou")).with_retryer(
        StandardRetryer::new()
            .with_max_attempts(3)
            .with_base_delay(Duration::from_millis(1)),
    );
    let result = client
        .get_object(GetObjectRequest::new("bucket", "a.txt"))
        .await
        .unwrap();
    assert_eq!(result.body, "ok");
    assert_eq!(http.seen().len(), 3);
}

#[tokio::test]
async fn service_error_carries_details() {
    let http = ReplayHttpSend::new().reply(
        404,
        &[("x-oss-request-id", "5C3D9175B6FC201293AD****")],
        "<Error>\
           <Code>NoSuchKey</Code>\
           <Message>The specified key does not exist.</Message>\
           <HostId>bucket.oss-cn-hangzhou.aliyuncs.com</HostId>\
           <EC>0026-00000001</EC>\
         </Error>",
    );
    let err = client(http.clone(), Config::new("cn-hangzhou"))
        .get_object(GetObjectRequest::new("bucket", "missing.txt"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServiceError);

    let se = ServiceError::downcast(&err).unwrap();
    assert_eq!(se.status_code, 404);
    assert_eq!(se.code, "NoSuchKey");
    assert_eq!(se.message, "The specified key does not exist.");
    assert_eq!(se.request_id, "5C3D9175B6FC201293AD****");
    assert_eq!(se.ec, "0026-00000001");
    assert_eq!(http.seen().len(), 1);
}

#[tokio::test]
async fn upload_crc_mismatch_is_reported() {
    let http = ReplayHttpSend::new().reply(200, &[("x-oss-hash-crc64ecma", "1")], "");
    let err = client(http, Config::new("cn-hangzhou"))
        .with_retryer(NopRetryer)
        .put_object(PutObjectRequest::new("bucket", "a.txt", "hello"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ChecksumMismatch);
}

#[tokio::test]
async fn upload_crc_check_can_be_disabled() {
    let http = ReplayHttpSend::new().reply(200, &[("x-oss-hash-crc64ecma", "1")], "");
    let config = Config {
        disable_upload_crc64_check: true,
        ..Config::new("cn-hangzhou")
    };
    let result = client(http, config)
        .put_object(PutObjectRequest::new("bucket", "a.txt", "hello"))
        .await
        .unwrap();
    assert_eq!(result.hash_crc64, Some(1));
}

#[tokio::test]
async fn list_objects_pages_until_exhausted() {
    let http = ReplayHttpSend::new()
        .reply(
            200,
            &[],
            "<ListBucketResult>\
               <Name>bucket</Name>\
               <IsTruncated>true</IsTruncated>\
               <NextContinuationToken>page-2</NextContinuationToken>\
               <Contents><Key>a.txt</Key><Size>1</Size></Contents>\
             </ListBucketResult>",
        )
        .reply(
            200,
            &[],
            "<ListBucketResult>\
               <Name>bucket</Name>\
               <IsTruncated>false</IsTruncated>\
               <Contents><Key>b.txt</Key><Size>2</Size></Contents>\
             </ListBucketResult>",
        );
    let client = client(http.clone(), Config::new("cn-hangzhou"));
    let pages: Vec<_> = client
        .paginate(ListObjectsV2Request::new("bucket"))
        .into_stream()
        .try_collect()
        .await
        .unwrap();

    let keys: Vec<_> = pages
        .iter()
        .flat_map(|page| page.contents.iter().map(|o| o.key.as_str()))
        .collect();
    assert_eq!(keys, vec!["a.txt", "b.txt"]);

    let seen = http.seen();
    assert_eq!(seen.len(), 2);
    assert!(!seen[0].1.contains("continuation-token"));
    assert!(seen[1].1.contains("continuation-token=page-2"), "{}", seen[1].1);
}

#[tokio::test]
async fn presigned_url_is_not_sent() {
    let http = ReplayHttpSend::new();
    let result = client(http.clone(), Config::new("cn-hangzhou"))
        .presign(
            GetObjectRequest::new("bucket", "a.txt"),
            Duration::from_secs(3600),
        )
        .await
        .unwrap();
    assert_eq!(result.method, "GET");
    assert!(result.url.contains("x-oss-signature-version=OSS4-HMAC-SHA256"));
    assert!(result.url.contains("x-oss-expires=3600"));
    assert!(http.seen().is_empty());
}

#[tokio::test]
async fn credentials_from_config_are_used() {
    common::init();
    let http = ReplayHttpSend::new().reply(200, &[], "hello");
    let config = Config {
        access_key_id: Some("config-ak".to_string()),
        access_key_secret: Some("config-sk".to_string()),
        ..Config::new("cn-hangzhou")
    };
    let client = alioss::Client::new(
        alioss_core::Context::new().with_http_send(http.clone()),
        config,
    )
    .unwrap();
    client
        .get_object(GetObjectRequest::new("bucket", "a.txt"))
        .await
        .unwrap();

    let seen = http.seen();
    assert!(seen[0].2["authorization"]
        .to_str()
        .unwrap()
        .starts_with("OSS4-HMAC-SHA256 Credential=config-ak/"));
}
