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
// Env values used by the credential providers and config.
pub const OSS_REGION: &str = "OSS_REGION";
pub const OSS_ENDPOINT: &str = "OSS_ENDPOINT";
pub const OSS_ACCESS_KEY_ID: &str = "OSS_ACCESS_KEY_ID";
pub const OSS_ACCESS_KEY_SECRET: &str = "OSS_ACCESS_KEY_SECRET";
pub const OSS_SESSION_TOKEN: &str = "OSS_SESSION_TOKEN";
pub const ALIBABA_CLOUD_ACCESS_KEY_ID: &str = "ALIBABA_CLOUD_ACCESS_KEY_ID";
pub const ALIBABA_CLOUD_ACCESS_KEY_SECRET: &str = "ALIBABA_CLOUD_ACCESS_KEY_SECRET";
pub const ALIBABA_CLOUD_SECURITY_TOKEN: &str = "ALIBABA_CLOUD_SECURITY_TOKEN";
pub const ALIBABA_CLOUD_ROLE_ARN: &str = "ALIBABA_CLOUD_ROLE_ARN";
pub const ALIBABA_CLOUD_ROLE_SESSION_NAME: &str = "ALIBABA_CLOUD_ROLE_SESSION_NAME";
pub const ALIBABA_CLOUD_OIDC_PROVIDER_ARN: &str = "ALIBABA_CLOUD_OIDC_PROVIDER_ARN";
pub const ALIBABA_CLOUD_OIDC_TOKEN_FILE: &str = "ALIBABA_CLOUD_OIDC_TOKEN_FILE";
pub const ALIBABA_CLOUD_STS_ENDPOINT: &str = "ALIBABA_CLOUD_STS_ENDPOINT";
pub const ALIBABA_CLOUD_ECS_METADATA: &str = "ALIBABA_CLOUD_ECS_METADATA";
pub const ALIBABA_CLOUD_ECS_METADATA_ENDPOINT: &str = "ALIBABA_CLOUD_ECS_METADATA_ENDPOINT";

// Headers used in OSS requests and responses.
pub const CONTENT_MD5: &str = "content-md5";
pub const X_OSS_DATE: &str = "x-oss-date";
pub const X_OSS_CONTENT_SHA256: &str = "x-oss-content-sha256";
pub const X_OSS_SECURITY_TOKEN: &str = "x-oss-security-token";
pub const X_OSS_REQUEST_ID: &str = "x-oss-request-id";
pub const X_OSS_EC: &str = "x-oss-ec";
pub const X_OSS_ERR: &str = "x-oss-err";
pub const X_OSS_HASH_CRC64ECMA: &str = "x-oss-hash-crc64ecma";
pub const X_OSS_META_PREFIX: &str = "x-oss-meta-";
pub const X_OSS_ACL: &str = "x-oss-acl";
pub const X_OSS_OBJECT_ACL: &str = "x-oss-object-acl";
pub const X_OSS_STORAGE_CLASS: &str = "x-oss-storage-class";
pub const X_OSS_RESOURCE_GROUP_ID: &str = "x-oss-resource-group-id";
pub const X_OSS_TAGGING: &str = "x-oss-tagging";
pub const X_OSS_TAGGING_DIRECTIVE: &str = "x-oss-tagging-directive";
pub const X_OSS_METADATA_DIRECTIVE: &str = "x-oss-metadata-directive";
pub const X_OSS_COPY_SOURCE: &str = "x-oss-copy-source";
pub const X_OSS_COPY_SOURCE_RANGE: &str = "x-oss-copy-source-range";
pub const X_OSS_COPY_SOURCE_IF_MATCH: &str = "x-oss-copy-source-if-match";
pub const X_OSS_COPY_SOURCE_IF_NONE_MATCH: &str = "x-oss-copy-source-if-none-match";
pub const X_OSS_COPY_SOURCE_VERSION_ID: &str = "x-oss-copy-source-version-id";
pub const X_OSS_SERVER_SIDE_ENCRYPTION: &str = "x-oss-server-side-encryption";
pub const X_OSS_SERVER_SIDE_ENCRYPTION_KEY_ID: &str = "x-oss-server-side-encryption-key-id";
pub const X_OSS_FORBID_OVERWRITE: &str = "x-oss-forbid-overwrite";
pub const X_OSS_TRAFFIC_LIMIT: &str = "x-oss-traffic-limit";
pub const X_OSS_VERSION_ID: &str = "x-oss-version-id";
pub const X_OSS_DELETE_MARKER: &str = "x-oss-delete-marker";
pub const X_OSS_OBJECT_TYPE: &str = "x-oss-object-type";
pub const X_OSS_NEXT_APPEND_POSITION: &str = "x-oss-next-append-position";
pub const X_OSS_SYMLINK_TARGET: &str = "x-oss-symlink-target";
pub const X_OSS_RESTORE: &str = "x-oss-restore";
pub const X_OSS_TAGGING_COUNT: &str = "x-oss-tagging-count";
pub const X_OSS_RANGE_BEHAVIOR: &str = "x-oss-range-behavior";
pub const X_OSS_PROCESS: &str = "x-oss-process";
pub const X_OSS_LAST_ACCESS_TIME: &str = "x-oss-last-access-time";
pub const X_OSS_COMPLETE_ALL: &str = "x-oss-complete-all";
pub const X_OSS_SELECT_OUTPUT_RAW: &str = "x-oss-select-output-raw";

// Sub resources and query parameters.

// Defaults.
pub const DEFAULT_PRODUCT: &str = "oss";
pub const VECTORS_PRODUCT: &str = "oss-vectors";
pub const DEFAULT_STS_ENDPOINT: &str = "https://sts.aliyuncs.com";
pub const DEFAULT_ECS_METADATA_ENDPOINT: &str = "http://100.100.100.200";
pub const DEFAULT_ROLE_SESSION_NAME: &str = "alioss";
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";
pub const SDK_NAME: &str = "alioss-rust";
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Longest validity a V4 presigned URL may carry.
pub const MAX_PRESIGN_EXPIRES_V4_SECS: u64 = 7 * 24 * 3600;

/// Object keys may not be longer than this many bytes.
pub const MAX_OBJECT_KEY_LEN: usize = 1023;
