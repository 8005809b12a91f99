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
//! Cross region and same region replication.

use crate::operation::{
    FromOperationOutput, Operation, OperationInput, OperationOutput, ResultCommon,
};
use alioss_core::Result;
use http::Method;
use serde::{Deserialize, Serialize};

const X_OSS_REPLICATION_RULE_ID: &str = "x-oss-replication-rule-id";

xml_list!(de_types, "Type");
xml_list!(de_locations, "Location");
xml_list!(de_transfer_types, "LocationTransferType");

/// Prefixes of the objects a rule replicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixSet {
    #[serde(rename = "Prefix", default)]
    pub prefixes: Vec<String>,
}

/// Where replicated objects go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReplicationDestination {
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub location: String,
    /// `internal` or `oss_acc`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_type: Option<String>,
}

/// Replicate objects encrypted with KMS when `Enabled`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SseKmsEncryptedObjects {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceSelectionCriteria {
    #[serde(default)]
    pub sse_kms_encrypted_objects: SseKmsEncryptedObjects,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationEncryptionConfiguration {
    #[serde(rename = "ReplicaKmsKeyID", default)]
    pub replica_kms_key_id: String,
}

/// Replication time control, `enabled` or `disabled`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Rtc {
    #[serde(default)]
    pub status: String,
}

/// A replication rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReplicationRule {
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_set: Option<PrefixSet>,
    /// Operations to replicate, such as `ALL` or `PUT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default)]
    pub destination: ReplicationDestination,
    /// State reported by the service, such as `starting` or `doing`.
    #[serde(default, skip_serializing)]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical_object_replication: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_selection_criteria: Option<SourceSelectionCriteria>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_configuration: Option<ReplicationEncryptionConfiguration>,
    #[serde(rename = "RTC", default, skip_serializing_if = "Option::is_none")]
    pub rtc: Option<Rtc>,
}

impl ReplicationRule {
    /// Replicate to `bucket` in `location`, such as `oss-cn-beijing`.
    pub fn new(bucket: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            destination: ReplicationDestination {
                bucket: bucket.into(),
                location: location.into(),
                transfer_type: None,
            },
            ..Default::default()
        }
    }
}

/// Replication rules of a bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationConfiguration {
    #[serde(rename = "Rule", default)]
    pub rules: Vec<ReplicationRule>,
}

/// Add a replication rule.
#[derive(Debug, Clone, Default)]
pub struct PutBucketReplicationRequest {
    pub bucket: String,
    pub rule: ReplicationRule,
}

impl PutBucketReplicationRequest {
    pub fn new(bucket: impl Into<String>, rule: ReplicationRule) -> Self {
        Self {
            bucket: bucket.into(),
            rule,
        }
    }
}

impl Operation for PutBucketReplicationRequest {
    type Output = PutBucketReplicationResult;

    fn into_input(self) -> Result<OperationInput> {
        OperationInput::new("PutBucketReplication", Method::POST)
            .with_bucket(self.bucket)
            .with_sub_resource("replication")
            .with_param("comp", "add")
            .with_xml_body(
                "ReplicationConfiguration",
                &ReplicationConfiguration {
                    rules: vec![self.rule],
                },
            )
    }
}

/// Result of `PutBucketReplication`.
#[derive(Debug, Clone, Default)]
pub struct PutBucketReplicationResult {
    /// Id assigned to the new rule.
    pub rule_id: Option<String>,
    pub common: ResultCommon,
}

impl FromOperationOutput for PutBucketReplicationResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        Ok(Self {
            rule_id: output.header(X_OSS_REPLICATION_RULE_ID),
            common: output.common(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct RtcConfiguration {
    #[serde(rename = "RTC")]
    rtc: Rtc,
    #[serde(rename = "ID")]
    id: String,
}

/// Enable or disable replication time control of a rule.
#[derive(Debug, Clone, Default)]
pub struct PutBucketRtcRequest {
    pub bucket: String,
    pub rule_id: String,
    /// `enabled` or `disabled`.
    pub status: String,
}

impl PutBucketRtcRequest {
    pub fn new(
        bucket: impl Into<String>,
        rule_id: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            rule_id: rule_id.into(),
            status: status.into(),
        }
    }
}

impl Operation for PutBucketRtcRequest {
    type Output = PutBucketRtcResult;

    fn into_input(self) -> Result<OperationInput> {
        OperationInput::new("PutBucketRtc", Method::PUT)
            .with_bucket(self.bucket)
            .with_sub_resource("rtc")
            .with_xml_body(
                "ReplicationRule",
                &RtcConfiguration {
                    rtc: Rtc {
                        status: self.status,
                    },
                    id: self.rule_id,
                },
            )
    }
}

empty_result!(
    /// Result of `PutBucketRtc`.
    PutBucketRtcResult
);

/// Get the replication rules of a bucket.
#[derive(Debug, Clone, Default)]
pub struct GetBucketReplicationRequest {
    pub bucket: String,
}

impl GetBucketReplicationRequest {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }
}

impl Operation for GetBucketReplicationRequest {
    type Output = GetBucketReplicationResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(OperationInput::new("GetBucketReplication", Method::GET)
            .with_bucket(self.bucket)
            .with_sub_resource("replication"))
    }
}

/// Result of `GetBucketReplication`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetBucketReplicationResult {
    #[serde(rename = "Rule", default)]
    pub rules: Vec<ReplicationRule>,
    #[serde(skip)]
    pub common: ResultCommon,
}

xml_result!(GetBucketReplicationResult);

/// Get the regions a bucket can replicate to.
#[derive(Debug, Clone, Default)]
pub struct GetBucketReplicationLocationRequest {
    pub bucket: String,
}

impl GetBucketReplicationLocationRequest {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }
}

impl Operation for GetBucketReplicationLocationRequest {
    type Output = GetBucketReplicationLocationResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(
            OperationInput::new("GetBucketReplicationLocation", Method::GET)
                .with_bucket(self.bucket)
                .with_sub_resource("replicationLocation"),
        )
    }
}

/// Transfer types available towards a region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocationTransferType {
    #[serde(default)]
    pub location: String,
    #[serde(default, deserialize_with = "de_types")]
    pub transfer_types: Vec<String>,
}

/// Result of `GetBucketReplicationLocation`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetBucketReplicationLocationResult {
    #[serde(rename = "Location", default)]
    pub locations: Vec<String>,
    #[serde(
        rename = "LocationTransferTypeConstraint",
        default,
        deserialize_with = "de_transfer_types"
    )]
    pub location_transfer_types: Vec<LocationTransferType>,
    /// Regions that support replication time control.
    #[serde(rename = "LocationRTCConstraint", default, deserialize_with = "de_locations")]
    pub rtc_locations: Vec<String>,
    #[serde(skip)]
    pub common: ResultCommon,
}

xml_result!(GetBucketReplicationLocationResult);

/// Get the progress of a replication rule.
#[derive(Debug, Clone, Default)]
pub struct GetBucketReplicationProgressRequest {
    pub bucket: String,
    pub rule_id: String,
}

impl GetBucketReplicationProgressRequest {
    pub fn new(bucket: impl Into<String>, rule_id: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            rule_id: rule_id.into(),
        }
    }
}

impl Operation for GetBucketReplicationProgressRequest {
    type Output = GetBucketReplicationProgressResult;

    fn into_input(self) -> Result<OperationInput> {
        Ok(
            OperationInput::new("GetBucketReplicationProgress", Method::GET)
                .with_bucket(self.bucket)
                .with_sub_resource("replicationProgress")
                .with_param("rule-id", self.rule_id),
        )
    }
}

/// How far a rule got.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReplicationProgressInfo {
    /// Share of historical data replicated, from 0 to 1.
    #[serde(default)]
    pub historical_object: Option<f64>,
    /// Objects written before this time are replicated.
    #[serde(default)]
    pub new_object: Option<String>,
}

/// Progress of a replication rule.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReplicationProgressRule {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(default)]
    pub prefix_set: Option<PrefixSet>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub destination: ReplicationDestination,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub historical_object_replication: Option<String>,
    #[serde(default)]
    pub progress: Option<ReplicationProgressInfo>,
}

/// Result of `GetBucketReplicationProgress`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetBucketReplicationProgressResult {
    #[serde(rename = "Rule", default)]
    pub rules: Vec<ReplicationProgressRule>,
    #[serde(skip)]
    pub common: ResultCommon,
}

xml_result!(GetBucketReplicationProgressResult);

#[derive(Debug, Clone, Serialize)]
struct ReplicationRules {
    #[serde(rename = "ID")]
    id: String,
}

/// Stop a replication rule.
#[derive(Debug, Clone, Default)]
pub struct DeleteBucketReplicationRequest {
    pub bucket: String,
    pub rule_id: String,
}

impl DeleteBucketReplicationRequest {
    pub fn new(bucket: impl Into<String>, rule_id: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            rule_id: rule_id.into(),
        }
    }
}

impl Operation for DeleteBucketReplicationRequest {
    type Output = DeleteBucketReplicationResult;

    fn into_input(self) -> Result<OperationInput> {
        OperationInput::new("DeleteBucketReplication", Method::POST)
            .with_bucket(self.bucket)
            .with_sub_resource("replication")
            .with_param("comp", "delete")
            .with_xml_body("ReplicationRules", &ReplicationRules { id: self.rule_id })
    }
}

empty_result!(
    /// Result of `DeleteBucketReplication`.
    DeleteBucketReplicationResult
);

client_methods! {
    put_bucket_replication(PutBucketReplicationRequest) -> PutBucketReplicationResult;
    put_bucket_rtc(PutBucketRtcRequest) -> PutBucketRtcResult;
    get_bucket_replication(GetBucketReplicationRequest) -> GetBucketReplicationResult;
    get_bucket_replication_location(
        GetBucketReplicationLocationRequest
    ) -> GetBucketReplicationLocationResult;
    get_bucket_replication_progress(
        GetBucketReplicationProgressRequest
    ) -> GetBucketReplicationProgressResult;
    delete_bucket_replication(DeleteBucketReplicationRequest) -> DeleteBucketReplicationResult;
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn test_put_bucket_replication_input() {
        let rule = ReplicationRule {
            prefix_set: Some(PrefixSet {
                prefixes: vec!["source1".to_string(), "video".to_string()],
            }),
            action: Some("PUT".to_string()),
            historical_object_replication: Some("enabled".to_string()),
            sync_role: Some("aliyunramrole".to_string()),
            rtc: Some(Rtc {
                status: "enabled".to_string(),
            }),
            ..ReplicationRule::new("destbucket", "oss-cn-beijing")
        };
        let input = PutBucketReplicationRequest::new("examplebucket", rule)
            .into_input()
            .unwrap();
        assert_eq!(input.method, Method::POST);
        assert_eq!(input.query_string(), "comp=add&replication");
        assert_eq!(
            input.body,
            "<ReplicationConfiguration><Rule>\
             <PrefixSet><Prefix>source1</Prefix><Prefix>video</Prefix></PrefixSet>\
             <Action>PUT</Action>\
             <Destination><Bucket>destbucket</Bucket>\
             <Location>oss-cn-beijing</Location></Destination>\
             <HistoricalObjectReplication>enabled</HistoricalObjectReplication>\
             <SyncRole>aliyunramrole</SyncRole>\
             <RTC><Status>enabled</Status></RTC>\
             </Rule></ReplicationConfiguration>"
        );

        let mut headers = HeaderMap::new();
        headers.insert(X_OSS_REPLICATION_RULE_ID, "rule-1".parse().unwrap());
        let result = PutBucketReplicationResult::from_output(OperationOutput {
            op_name: "PutBucketReplication",
            status: StatusCode::OK,
            headers,
            body: Bytes::new(),
        })
        .unwrap();
        assert_eq!(result.rule_id.as_deref(), Some("rule-1"));
    }

    #[test]
    fn test_put_bucket_rtc_input() {
        let input = PutBucketRtcRequest::new("examplebucket", "rule-1", "enabled")
            .into_input()
            .unwrap();
        assert_eq!(input.method, Method::PUT);
        assert_eq!(input.query_string(), "rtc");
        assert_eq!(
            input.body,
            "<ReplicationRule><RTC><Status>enabled</Status></RTC><ID>rule-1</ID></ReplicationRule>"
        );
    }

    #[test]
    fn test_get_bucket_replication_result() {
        let body = r#"<?xml version="1.0" ?>
<ReplicationConfiguration>
  <Rule>
    <ID>test_replication_1</ID>
    <PrefixSet>
      <Prefix>source_image</Prefix>
      <Prefix>video</Prefix>
    </PrefixSet>
    <Action>PUT</Action>
    <Destination>
      <Bucket>destbucket</Bucket>
      <Location>oss-cn-beijing</Location>
      <TransferType>oss_acc</TransferType>
    </Destination>
    <Status>doing</Status>
    <HistoricalObjectReplication>enabled</HistoricalObjectReplication>
    <SyncRole>aliyunramrole</SyncRole>
    <SourceSelectionCriteria>
      <SseKmsEncryptedObjects>
        <Status>Enabled</Status>
      </SseKmsEncryptedObjects>
    </SourceSelectionCriteria>
    <EncryptionConfiguration>
      <ReplicaKmsKeyID>c4d49f85-ee30-426b-a5ed-95e9139d****</ReplicaKmsKeyID>
    </EncryptionConfiguration>
    <RTC>
      <Status>enabled</Status>
    </RTC>
  </Rule>
</ReplicationConfiguration>"#;
        let result =
            GetBucketReplicationResult::from_output(output("GetBucketReplication", body)).unwrap();
        assert_eq!(result.rules.len(), 1);
        let rule = &result.rules[0];
        assert_eq!(rule.id.as_deref(), Some("test_replication_1"));
        assert_eq!(rule.prefix_set.as_ref().unwrap().prefixes, vec!["source_image", "video"]);
        assert_eq!(rule.destination.transfer_type.as_deref(), Some("oss_acc"));
        assert_eq!(rule.status.as_deref(), Some("doing"));
        assert_eq!(
            rule.source_selection_criteria
                .as_ref()
                .unwrap()
                .sse_kms_encrypted_objects
                .status,
            "Enabled"
        );
        assert_eq!(
            rule.encryption_configuration.as_ref().unwrap().replica_kms_key_id,
            "c4d49f85-ee30-426b-a5ed-95e9139d****"
        );
        assert_eq!(rule.rtc.as_ref().unwrap().status, "enabled");
    }

    #[test]
    fn test_get_bucket_replication_location_result() {
        let body = r#"<?xml version="1.0" ?>
<ReplicationLocation>
  <Location>oss-cn-beijing</Location>
  <Location>oss-cn-qingdao</Location>
  <Location>oss-cn-shenzhen</Location>
  <LocationTransferTypeConstraint>
    <LocationTransferType>
      <Location>oss-cn-hongkong</Location>
      <TransferTypes>
        <Type>oss_acc</Type>
      </TransferTypes>
    </LocationTransferType>
    <LocationTransferType>
      <Location>oss-us-west-1</Location>
      <TransferTypes>
        <Type>oss_acc</Type>
      </TransferTypes>
    </LocationTransferType>
  </LocationTransferTypeConstraint>
  <LocationRTCConstraint>
    <Location>oss-cn-beijing</Location>
    <Location>oss-cn-qingdao</Location>
  </LocationRTCConstraint>
</ReplicationLocation>"#;
        let result = GetBucketReplicationLocationResult::from_output(output(
            "GetBucketReplicationLocation",
            body,
        ))
        .unwrap();
        assert_eq!(
            result.locations,
            vec!["oss-cn-beijing", "oss-cn-qingdao", "oss-cn-shenzhen"]
        );
        assert_eq!(result.location_transfer_types.len(), 2);
        assert_eq!(result.location_transfer_types[1].location, "oss-us-west-1");
        assert_eq!(result.location_transfer_types[1].transfer_types, vec!["oss_acc"]);
        assert_eq!(result.rtc_locations, vec!["oss-cn-beijing", "oss-cn-qingdao"]);
    }

    #[test]
    fn test_get_bucket_replication_progress() {
        let input = GetBucketReplicationProgressRequest::new("examplebucket", "rule-1")
            .into_input()
            .unwrap();
        assert_eq!(input.query_string(), "replicationProgress&rule-id=rule-1");

        let body = r#"<?xml version="1.0" ?>
<ReplicationProgress>
  <Rule>
    <ID>test_replication_1</ID>
    <PrefixSet>
      <Prefix>source_image</Prefix>
    </PrefixSet>
    <Action>PUT</Action>
    <Destination>
      <Bucket>destbucket</Bucket>
      <Location>oss-cn-beijing</Location>
      <TransferType>oss_acc</TransferType>
    </Destination>
    <Status>doing</Status>
    <HistoricalObjectReplication>enabled</HistoricalObjectReplication>
    <Progress>
      <HistoricalObject>0.85</HistoricalObject>
      <NewObject>2015-09-24T15:28:14.000Z</NewObject>
    </Progress>
  </Rule>
</ReplicationProgress>"#;
        let result = GetBucketReplicationProgressResult::from_output(output(
            "GetBucketReplicationProgress",
            body,
        ))
        .unwrap();
        let progress = result.rules[0].progress.clone().unwrap();
        assert_eq!(progress.historical_object, Some(0.85));
        assert_eq!(progress.new_object.as_deref(), Some("2015-09-24T15:28:14.000Z"));
    }

    #[test]
    fn test_delete_bucket_replication_input() {
        let input = DeleteBucketReplicationRequest::new("examplebucket", "rule-1")
            .into_input()
            .unwrap();
        assert_eq!(input.method, Method::POST);
        assert_eq!(input.query_string(), "comp=delete&replication");
        assert_eq!(input.body, "<ReplicationRules><ID>rule-1</ID></ReplicationRules>");
    }
}
