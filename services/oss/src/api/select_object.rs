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
//! Run SQL over CSV and JSON objects.
//!
//! Select responses are a sequence of binary frames:
//!
//! ```text
//! | version (1) | frame type (3) | payload length (4) | header checksum (4) |
//! | payload (payload length) | payload checksum (4) |
//! ```
//!
//! All integers are big endian. The payload checksum is a CRC-32 of the
//! payload, it is zero unless `EnablePayloadCrc` was requested.

use crate::constants::{X_OSS_PROCESS, X_OSS_SELECT_OUTPUT_RAW};
use crate::operation::{
    FromOperationOutput, Operation, OperationInput, OperationOutput, ResultCommon,
};
use crate::types::{CompressionType, FileHeaderInfo, JsonType};
use alioss_core::crc32::crc32;
use alioss_core::hash::base64_encode;
use alioss_core::{Error, Result};
use bytes::{Buf, Bytes, BytesMut};
use http::Method;
use serde::Serialize;

const FRAME_VERSION: u8 = 1;
const FRAME_HEADER_LEN: usize = 12;
const FRAME_CHECKSUM_LEN: usize = 4;

const DATA_FRAME: u32 = 0x80_0001;
const CONTINUOUS_FRAME: u32 = 0x80_0004;
const END_FRAME: u32 = 0x80_0005;
const META_END_CSV_FRAME: u32 = 0x80_0006;
const META_END_JSON_FRAME: u32 = 0x80_0007;

fn encode_opt(value: &Option<String>) -> Option<String> {
    value.as_deref().map(|v| base64_encode(v.as_bytes()))
}

/// How a CSV object is parsed.
///
/// Delimiters and characters are given in plain text and encoded on the
/// wire.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsvInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_header_info: Option<FileHeaderInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_delimiter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_delimiter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_character: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_character: Option<String>,
    /// `line-range=start-end` or `split-range=start-end`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_quoted_record_delimiter: Option<bool>,
}

impl CsvInput {
    pub fn with_file_header_info(mut self, info: FileHeaderInfo) -> Self {
        self.file_header_info = Some(info);
        self
    }

    pub fn with_record_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.record_delimiter = Some(delimiter.into());
        self
    }

    pub fn with_field_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.field_delimiter = Some(delimiter.into());
        self
    }

    pub fn with_quote_character(mut self, quote: impl Into<String>) -> Self {
        self.quote_character = Some(quote.into());
        self
    }

    /// Only read lines `start..=end`, requires a select meta.
    pub fn with_line_range(mut self, start: u64, end: u64) -> Self {
        self.range = Some(format!("line-range={start}-{end}"));
        self
    }

    /// Only read splits `start..=end`, requires a select meta.
    pub fn with_split_range(mut self, start: u64, end: u64) -> Self {
        self.range = Some(format!("split-range={start}-{end}"));
        self
    }

    fn encoded(&self) -> Self {
        Self {
            file_header_info: self.file_header_info.clone(),
            record_delimiter: encode_opt(&self.record_delimiter),
            field_delimiter: encode_opt(&self.field_delimiter),
            quote_character: encode_opt(&self.quote_character),
            comment_character: encode_opt(&self.comment_character),
            range: self.range.clone(),
            allow_quoted_record_delimiter: self.allow_quoted_record_delimiter,
        }
    }
}

/// How a JSON object is parsed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JsonInput {
    #[serde(rename = "Type", skip_serializing_if = "Option::is_none")]
    pub json_type: Option<JsonType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_json_number_as_string: Option<bool>,
}

impl JsonInput {
    pub fn new(json_type: JsonType) -> Self {
        Self {
            json_type: Some(json_type),
            ..Default::default()
        }
    }
}

/// Input format of a select, exactly one of `csv` and `json` should be set.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InputSerialization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_type: Option<CompressionType>,
    #[serde(rename = "CSV", skip_serializing_if = "Option::is_none")]
    pub csv: Option<CsvInput>,
    #[serde(rename = "JSON", skip_serializing_if = "Option::is_none")]
    pub json: Option<JsonInput>,
}

impl InputSerialization {
    pub fn csv(csv: CsvInput) -> Self {
        Self {
            csv: Some(csv),
            ..Default::default()
        }
    }

    pub fn json(json: JsonInput) -> Self {
        Self {
            json: Some(json),
            ..Default::default()
        }
    }

    fn is_json(&self) -> bool {
        self.json.is_some()
    }

    fn encoded(&self) -> Self {
        Self {
            compression_type: self.compression_type.clone(),
            csv: self.csv.as_ref().map(CsvInput::encoded),
            json: self.json.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CsvOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_delimiter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_delimiter: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JsonOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_delimiter: Option<String>,
}

/// Output format of a select.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputSerialization {
    #[serde(rename = "CSV", skip_serializing_if = "Option::is_none")]
    pub csv: Option<CsvOutput>,
    #[serde(rename = "JSON", skip_serializing_if = "Option::is_none")]
    pub json: Option<JsonOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_all_columns: Option<bool>,
    /// Return the selected rows without framing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_raw_data: Option<bool>,
    /// Ask for a CRC-32 on every frame payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_payload_crc: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_header: Option<bool>,
}

impl OutputSerialization {
    pub fn with_payload_crc(mut self, enabled: bool) -> Self {
        self.enable_payload_crc = Some(enabled);
        self
    }

    pub fn with_raw_data(mut self, raw: bool) -> Self {
        self.output_raw_data = Some(raw);
        self
    }

    fn encoded(&self) -> Self {
        Self {
            csv: self.csv.as_ref().map(|csv| CsvOutput {
                record_delimiter: encode_opt(&csv.record_delimiter),
                field_delimiter: encode_opt(&csv.field_delimiter),
            }),
            json: self.json.as_ref().map(|json| JsonOutput {
                record_delimiter: encode_opt(&json.record_delimiter),
            }),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SelectOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_partial_data_record: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_skipped_records_allowed: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SelectBody {
    expression: String,
    input_serialization: InputSerialization,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_serialization: Option<OutputSerialization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<SelectOptions>,
}

/// Query an object with SQL.
#[derive(Debug, Clone, Default)]
pub struct SelectObjectRequest {
    pub bucket: String,
    pub key: String,
    /// SQL such as `select * from ossobject`.
    pub expression: String,
    pub input: InputSerialization,
    pub output: Option<OutputSerialization>,
    pub options: Option<SelectOptions>,
}

impl SelectObjectRequest {
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        expression: impl Into<String>,
        input: InputSerialization,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            expression: expression.into(),
            input,
            ..Default::default()
        }
    }

    pub fn with_output(mut self, output: OutputSerialization) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_options(mut self, options: SelectOptions) -> Self {
        self.options = Some(options);
        self
    }
}

impl Operation for SelectObjectRequest {
    type Output = SelectObjectResult;

    fn into_input(self) -> Result<OperationInput> {
        if self.expression.is_empty() {
            return Err(Error::request_invalid("select expression is empty"));
        }
        let process = if self.input.is_json() {
            "json/select"
        } else {
            "csv/select"
        };
        let body = SelectBody {
            expression: base64_encode(self.expression.as_bytes()),
            input_serialization: self.input.encoded(),
            output_serialization: self.output.as_ref().map(OutputSerialization::encoded),
            options: self.options,
        };
        OperationInput::new("SelectObject", Method::POST)
            .with_bucket(self.bucket)
            .with_key(self.key)
            .with_param(X_OSS_PROCESS, process)
            .with_xml_body("SelectRequest", &body)
    }
}

/// Summary carried by the end frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectEnd {
    pub offset: u64,
    pub total_scanned: u64,
    pub status: u32,
    pub error_message: String,
}

/// Summary carried by the meta end frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectMetaEnd {
    pub offset: u64,
    pub total_scanned: u64,
    pub status: u32,
    pub splits: u32,
    pub rows: u64,
    /// Only reported for CSV objects.
    pub columns: Option<u32>,
    pub error_message: String,
}

/// A decoded select response frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectFrame {
    /// Selected rows.
    Data { offset: u64, data: Bytes },
    /// Keep alive while the server scans.
    Continuous { offset: u64 },
    End(SelectEnd),
    MetaEnd(SelectMetaEnd),
}

/// Incremental decoder of select response frames.
///
/// ```
/// use alioss::SelectFrameDecoder;
///
/// let mut decoder = SelectFrameDecoder::new();
/// decoder.push(&[1, 0x80, 0, 1]);
/// // Not enough bytes for a frame yet.
/// assert!(decoder.next_frame().unwrap().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct SelectFrameDecoder {
    buffer: BytesMut,
    verify_crc: bool,
}

impl Default for SelectFrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectFrameDecoder {
    /// Create a decoder that verifies nonzero payload checksums.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
            verify_crc: true,
        }
    }

    /// Turn payload checksum verification on or off.
    pub fn with_payload_crc(mut self, verify: bool) -> Self {
        self.verify_crc = verify;
        self
    }

    /// Append received bytes.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Whether no undecoded bytes are left.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Decode the next complete frame, `None` if more bytes are needed.
    pub fn next_frame(&mut self) -> Result<Option<SelectFrame>> {
        if self.buffer.len() < FRAME_HEADER_LEN {
            return Ok(None);
        }

        let mut header = &self.buffer[..FRAME_HEADER_LEN];
        let version = header.get_u8();
        let frame_type = header.get_uint(3) as u32;
        let payload_len = header.get_u32() as usize;
        if version != FRAME_VERSION {
            return Err(Error::response_invalid(format!(
                "unsupported select frame version {version}"
            )));
        }

        let frame_len = FRAME_HEADER_LEN + payload_len + FRAME_CHECKSUM_LEN;
        if self.buffer.len() < frame_len {
            return Ok(None);
        }

        let mut frame = self.buffer.split_to(frame_len).freeze();
        frame.advance(FRAME_HEADER_LEN);
        let payload = frame.split_to(payload_len);
        let checksum = frame.get_u32();
        if self.verify_crc && checksum != 0 {
            let actual = crc32(&payload);
            if actual != checksum {
                return Err(Error::checksum_mismatch(format!(
                    "select frame payload crc32 mismatch, expected {checksum}, got {actual}"
                )));
            }
        }

        decode_payload(frame_type, payload).map(Some)
    }
}

fn ensure_len(payload: &Bytes, len: usize, frame_type: u32) -> Result<()> {
    if payload.len() < len {
        return Err(Error::response_invalid(format!(
            "select frame {frame_type:#x} payload is too short: {} bytes",
            payload.len()
        )));
    }
    Ok(())
}

fn decode_payload(frame_type: u32, mut payload: Bytes) -> Result<SelectFrame> {
    match frame_type {
        DATA_FRAME => {
            ensure_len(&payload, 8, frame_type)?;
            let offset = payload.get_u64();
            Ok(SelectFrame::Data {
                offset,
                data: payload,
            })
        }
        CONTINUOUS_FRAME => {
            ensure_len(&payload, 8, frame_type)?;
            Ok(SelectFrame::Continuous {
                offset: payload.get_u64(),
            })
        }
        END_FRAME => {
            ensure_len(&payload, 20, frame_type)?;
            Ok(SelectFrame::End(SelectEnd {
                offset: payload.get_u64(),
                total_scanned: payload.get_u64(),
                status: payload.get_u32(),
                error_message: String::from_utf8_lossy(&payload).into_owned(),
            }))
        }
        META_END_CSV_FRAME | META_END_JSON_FRAME => {
            let csv = frame_type == META_END_CSV_FRAME;
            ensure_len(&payload, if csv { 36 } else { 32 }, frame_type)?;
            let offset = payload.get_u64();
            let total_scanned = payload.get_u64();
            let status = payload.get_u32();
            let splits = payload.get_u32();
            let rows = payload.get_u64();
            let columns = csv.then(|| payload.get_u32());
            Ok(SelectFrame::MetaEnd(SelectMetaEnd {
                offset,
                total_scanned,
                status,
                splits,
                rows,
                columns,
                error_message: String::from_utf8_lossy(&payload).into_owned(),
            }))
        }
        other => Err(Error::response_invalid(format!(
            "unknown select frame type {other:#x}"
        ))),
    }
}

fn check_status(status: u32, message: &str) -> Result<()> {
    if status >= 400 {
        return Err(Error::service_error(format!(
            "select failed with status {status}: {message}"
        )));
    }
    Ok(())
}

fn decode_frames(body: &[u8]) -> Result<Vec<SelectFrame>> {
    let mut decoder = SelectFrameDecoder::new();
    decoder.push(body);
    let mut frames = Vec::new();
    while let Some(frame) = decoder.next_frame()? {
        frames.push(frame);
    }
    if !decoder.is_empty() {
        return Err(Error::response_invalid("select response ends with a partial frame"));
    }
    Ok(frames)
}

/// Result of `SelectObject`.
#[derive(Debug, Clone, Default)]
pub struct SelectObjectResult {
    /// Selected rows, joined across data frames.
    pub data: Bytes,
    /// Absent for raw output.
    pub end: Option<SelectEnd>,
    pub common: ResultCommon,
}

impl FromOperationOutput for SelectObjectResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        if output.header(X_OSS_SELECT_OUTPUT_RAW).as_deref() == Some("true") {
            return Ok(Self {
                data: output.body.clone(),
                end: None,
                common: output.common(),
            });
        }

        let mut data = BytesMut::new();
        let mut end = None;
        for frame in decode_frames(&output.body)? {
            match frame {
                SelectFrame::Data { data: rows, .. } => data.extend_from_slice(&rows),
                SelectFrame::End(frame) => {
                    check_status(frame.status, &frame.error_message)?;
                    end = Some(frame);
                }
                SelectFrame::Continuous { .. } | SelectFrame::MetaEnd(_) => {}
            }
        }
        Ok(Self {
            data: data.freeze(),
            end,
            common: output.common(),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct MetaBody {
    input_serialization: InputSerialization,
    #[serde(skip_serializing_if = "Option::is_none")]
    overwrite_if_exists: Option<bool>,
}

/// Scan an object and store the split and row counts used by ranged selects.
#[derive(Debug, Clone, Default)]
pub struct CreateSelectObjectMetaRequest {
    pub bucket: String,
    pub key: String,
    pub input: InputSerialization,
    pub overwrite_if_exists: Option<bool>,
}

impl CreateSelectObjectMetaRequest {
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        input: InputSerialization,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            input,
            overwrite_if_exists: None,
        }
    }

    pub fn with_overwrite_if_exists(mut self, overwrite: bool) -> Self {
        self.overwrite_if_exists = Some(overwrite);
        self
    }
}

impl Operation for CreateSelectObjectMetaRequest {
    type Output = CreateSelectObjectMetaResult;

    fn into_input(self) -> Result<OperationInput> {
        let (process, root) = if self.input.is_json() {
            ("json/meta", "JsonMetaRequest")
        } else {
            ("csv/meta", "CsvMetaRequest")
        };
        let body = MetaBody {
            input_serialization: self.input.encoded(),
            overwrite_if_exists: self.overwrite_if_exists,
        };
        OperationInput::new("CreateSelectObjectMeta", Method::POST)
            .with_bucket(self.bucket)
            .with_key(self.key)
            .with_param(X_OSS_PROCESS, process)
            .with_xml_body(root, &body)
    }
}

/// Result of `CreateSelectObjectMeta`.
#[derive(Debug, Clone, Default)]
pub struct CreateSelectObjectMetaResult {
    pub meta: SelectMetaEnd,
    pub common: ResultCommon,
}

impl FromOperationOutput for CreateSelectObjectMetaResult {
    fn from_output(output: OperationOutput) -> Result<Self> {
        let meta = decode_frames(&output.body)?
            .into_iter()
            .find_map(|frame| match frame {
                SelectFrame::MetaEnd(meta) => Some(meta),
                _ => None,
            })
            .ok_or_else(|| Error::response_invalid("select meta response has no meta end frame"))?;
        check_status(meta.status, &meta.error_message)?;
        Ok(Self {
            meta,
            common: output.common(),
        })
    }
}

client_methods! {
    select_object(SelectObjectRequest) -> SelectObjectResult;
    create_select_object_meta(CreateSelectObjectMetaRequest) -> CreateSelectObjectMetaResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use alioss_core::ErrorKind;
    use bytes::BufMut;
    use http::{HeaderMap, StatusCode};
    use pretty_assertions::assert_eq;

    fn frame(frame_type: u32, payload: &[u8], with_crc: bool) -> Vec<u8> {
        let mut buf = BytesMut::new();
        buf.put_u8(FRAME_VERSION);
        buf.put_uint(frame_type as u64, 3);
        buf.put_u32(payload.len() as u32);
        buf.put_u32(0);
        buf.put_slice(payload);
        buf.put_u32(if with_crc { crc32(payload) } else { 0 });
        buf.to_vec()
    }

    fn data_frame(offset: u64, data: &[u8]) -> Vec<u8> {
        let mut payload = offset.to_be_bytes().to_vec();
        payload.extend_from_slice(data);
        frame(DATA_FRAME, &payload, true)
    }

    fn end_frame(scanned: u64, status: u32, message: &str) -> Vec<u8> {
        let mut payload = BytesMut::new();
        payload.put_u64(scanned);
        payload.put_u64(scanned);
        payload.put_u32(status);
        payload.put_slice(message.as_bytes());
        frame(END_FRAME, &payload, false)
    }

    fn output(op_name: &'static str, body: Vec<u8>) -> OperationOutput {
        OperationOutput {
            op_name,
            status: StatusCode::PARTIAL_CONTENT,
            headers: HeaderMap::new(),
            body: Bytes::from(body),
        }
    }

    #[test]
    fn test_select_object_input() {
        let input = SelectObjectRequest::new(
            "examplebucket",
            "people.csv",
            "select * from ossobject where _1 > 10",
            InputSerialization::csv(
                CsvInput::default()
                    .with_file_header_info(FileHeaderInfo::Use)
                    .with_field_delimiter(","),
            ),
        )
        .with_output(OutputSerialization::default().with_payload_crc(true))
        .into_input()
        .unwrap();

        assert_eq!(input.method, Method::POST);
        assert_eq!(input.query_string(), "x-oss-process=csv%2Fselect");
        assert_eq!(
            input.body,
            "<SelectRequest>\
             <Expression>c2VsZWN0ICogZnJvbSBvc3NvYmplY3Qgd2hlcmUgXzEgPiAxMA==</Expression>\
             <InputSerialization><CSV>\
             <FileHeaderInfo>Use</FileHeaderInfo><FieldDelimiter>LA==</FieldDelimiter>\
             </CSV></InputSerialization>\
             <OutputSerialization><EnablePayloadCrc>true</EnablePayloadCrc></OutputSerialization>\
             </SelectRequest>"
        );
    }

    #[test]
    fn test_select_json_and_meta_input() {
        let input = SelectObjectRequest::new(
            "examplebucket",
            "people.json",
            "select * from ossobject",
            InputSerialization::json(JsonInput::new(JsonType::Lines)),
        )
        .into_input()
        .unwrap();
        assert_eq!(input.query_string(), "x-oss-process=json%2Fselect");

        let input = CreateSelectObjectMetaRequest::new(
            "examplebucket",
            "people.csv",
            InputSerialization::csv(CsvInput::default().with_record_delimiter("\n")),
        )
        .with_overwrite_if_exists(true)
        .into_input()
        .unwrap();
        assert_eq!(input.query_string(), "x-oss-process=csv%2Fmeta");
        assert_eq!(
            input.body,
            "<CsvMetaRequest><InputSerialization><CSV>\
             <RecordDelimiter>Cg==</RecordDelimiter>\
             </CSV></InputSerialization>\
             <OverwriteIfExists>true</OverwriteIfExists></CsvMetaRequest>"
        );
    }

    #[test]
    fn test_empty_expression() {
        let err = SelectObjectRequest::new("b", "k", "", InputSerialization::default())
            .into_input()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_decoder_waits_for_whole_frame() {
        let bytes = data_frame(0, b"a,b\n");
        let mut decoder = SelectFrameDecoder::new();
        decoder.push(&bytes[..10]);
        assert_eq!(decoder.next_frame().unwrap(), None);
        decoder.push(&bytes[10..bytes.len() - 1]);
        assert_eq!(decoder.next_frame().unwrap(), None);
        decoder.push(&bytes[bytes.len() - 1..]);
        assert_eq!(
            decoder.next_frame().unwrap(),
            Some(SelectFrame::Data {
                offset: 0,
                data: Bytes::from_static(b"a,b\n"),
            })
        );
        assert!(decoder.is_empty());
    }

    #[test]
    fn test_decoder_crc_mismatch() {
        let mut bytes = data_frame(0, b"a,b\n");
        let last_data = bytes.len() - 5;
        bytes[last_data] = b'x';

        let mut decoder = SelectFrameDecoder::new();
        decoder.push(&bytes);
        let err = decoder.next_frame().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ChecksumMismatch);

        let mut decoder = SelectFrameDecoder::new().with_payload_crc(false);
        decoder.push(&bytes);
        assert!(decoder.next_frame().unwrap().is_some());
    }

    #[test]
    fn test_decoder_rejects_unknown_frames() {
        let mut decoder = SelectFrameDecoder::new();
        decoder.push(&frame(0x80_0009, &[0; 8], false));
        let err = decoder.next_frame().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseInvalid);

        let mut decoder = SelectFrameDecoder::new();
        decoder.push(&frame(END_FRAME, &[0; 8], false));
        assert!(decoder.next_frame().is_err());
    }

    #[test]
    fn test_select_object_result() {
        let mut body = data_frame(0, b"1,alice\n");
        body.extend(frame(CONTINUOUS_FRAME, &9u64.to_be_bytes(), true));
        body.extend(data_frame(9, b"2,bob\n"));
        body.extend(end_frame(64, 206, ""));

        let result = SelectObjectResult::from_output(output("SelectObject", body)).unwrap();
        assert_eq!(result.data, "1,alice\n2,bob\n");
        let end = result.end.unwrap();
        assert_eq!(end.total_scanned, 64);
        assert_eq!(end.status, 206);
    }

    #[test]
    fn test_select_object_result_errors() {
        let body = end_frame(0, 400, "InvalidSqlStatement");
        let err = SelectObjectResult::from_output(output("SelectObject", body)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServiceError);
        assert!(err.message().contains("InvalidSqlStatement"));

        let mut body = data_frame(0, b"1,alice\n");
        body.truncate(body.len() - 2);
        let err = SelectObjectResult::from_output(output("SelectObject", body)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseInvalid);
    }

    #[test]
    fn test_select_object_raw_result() {
        let mut out = output("SelectObject", b"1,alice\n".to_vec());
        out.headers
            .insert(X_OSS_SELECT_OUTPUT_RAW, "true".parse().unwrap());
        let result = SelectObjectResult::from_output(out).unwrap();
        assert_eq!(result.data, "1,alice\n");
        assert!(result.end.is_none());
    }

    #[test]
    fn test_create_select_object_meta_result() {
        let mut payload = BytesMut::new();
        payload.put_u64(0);
        payload.put_u64(1024);
        payload.put_u32(200);
        payload.put_u32(3);
        payload.put_u64(100);
        payload.put_u32(5);
        let body = frame(META_END_CSV_FRAME, &payload, true);

        let result =
            CreateSelectObjectMetaResult::from_output(output("CreateSelectObjectMeta", body))
                .unwrap();
        assert_eq!(
            result.meta,
            SelectMetaEnd {
                offset: 0,
                total_scanned: 1024,
                status: 200,
                splits: 3,
                rows: 100,
                columns: Some(5),
                error_message: String::new(),
            }
        );

        let err = CreateSelectObjectMetaResult::from_output(output(
            "CreateSelectObjectMeta",
            end_frame(0, 200, ""),
        ))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseInvalid);
    }
}
