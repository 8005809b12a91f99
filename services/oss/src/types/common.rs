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
use crate::sign::uri_encode;
use serde::{Deserialize, Serialize};

string_enum! {
    /// Access control of a bucket or an object.
    Acl {
        /// Only the owner has access.
        Private => "private",
        /// Anyone can read.
        PublicRead => "public-read",
        /// Anyone can read and write.
        PublicReadWrite => "public-read-write",
        /// Objects inherit the ACL of their bucket.
        Default => "default",
    }
}

string_enum! {
    /// Storage class of a bucket or an object.
    StorageClass {
        Standard => "Standard",
        /// Infrequent access.
        IA => "IA",
        Archive => "Archive",
        ColdArchive => "ColdArchive",
        DeepColdArchive => "DeepColdArchive",
    }
}

string_enum! {
    /// Redundancy type of a bucket.
    DataRedundancyType {
        /// Locally redundant storage.
        LRS => "LRS",
        /// Zone redundant storage.
        ZRS => "ZRS",
    }
}

string_enum! {
    /// Versioning state of a bucket.
    VersioningStatus {
        Enabled => "Enabled",
        Suspended => "Suspended",
    }
}

string_enum! {
    /// How an object was created.
    ObjectType {
        Normal => "Normal",
        Multipart => "Multipart",
        Appendable => "Appendable",
        Symlink => "Symlink",
    }
}

string_enum! {
    /// How metadata is handled by `CopyObject`.
    MetadataDirective {
        Copy => "COPY",
        Replace => "REPLACE",
    }
}

string_enum! {
    /// How tags are handled by `CopyObject`.
    TaggingDirective {
        Copy => "Copy",
        Replace => "Replace",
    }
}

string_enum! {
    /// Server side encryption algorithm.
    ServerSideEncryption {
        Aes256 => "AES256",
        Kms => "KMS",
        Sm4 => "SM4",
    }
}

string_enum! {
    /// Encoding applied to keys in list responses.
    EncodingType {
        Url => "url",
    }
}

string_enum! {
    /// How the first line of a CSV object is treated by select.
    FileHeaderInfo {
        /// The first line names the columns.
        Use => "Use",
        /// Skip the first line.
        Ignore => "Ignore",
        None => "None",
    }
}

string_enum! {
    /// Layout of a JSON object read by select.
    JsonType {
        /// A single JSON document.
        Document => "DOCUMENT",
        /// One JSON document per line.
        Lines => "LINES",
    }
}

string_enum! {
    CompressionType {
        None => "None",
        Gzip => "GZIP",
    }
}

string_enum! {
    /// Element type of the vectors in an index.
    VectorDataType {
        Float32 => "float32",
    }
}

string_enum! {
    /// Distance used to rank query results.
    DistanceMetric {
        Euclidean => "euclidean",
        Cosine => "cosine",
    }
}

/// Owner of a bucket or an object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "DisplayName", default)]
    pub display_name: String,
}

/// A key value tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl Tag {
    /// Create a tag.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A list of tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSet {
    #[serde(rename = "Tag", default)]
    pub tags: Vec<Tag>,
}

/// Tags of a bucket or an object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tagging {
    #[serde(rename = "TagSet", default)]
    pub tag_set: TagSet,
}

impl Tagging {
    /// Build tagging from key value pairs.
    pub fn new<K: Into<String>, V: Into<String>>(tags: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            tag_set: TagSet {
                tags: tags.into_iter().map(|(k, v)| Tag::new(k, v)).collect(),
            },
        }
    }

    /// Encode as the value of the `x-oss-tagging` header: `k1=v1&k2=v2`.
    pub fn to_header_value(&self) -> String {
        self.tag_set
            .tags
            .iter()
            .map(|t| format!("{}={}", uri_encode(&t.key), uri_encode(&t.value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// ACL grant wrapper used by `GetBucketAcl` and `GetObjectAcl`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControlList {
    #[serde(rename = "Grant")]
    pub grant: Option<Acl>,
}

/// Owner and ACL of a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControlPolicy {
    #[serde(rename = "Owner", default)]
    pub owner: Owner,
    #[serde(rename = "AccessControlList", default)]
    pub access_control_list: AccessControlList,
}
