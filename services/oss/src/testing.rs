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
//! Test doubles for the context components.

use alioss_core::{Error, FileRead, HttpSend, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays canned responses and records every request it sees.
///
/// Once the canned responses run out every request fails with a transport error.
#[derive(Debug, Clone, Default)]
pub struct MockHttpSend {
    responses: Arc<Mutex<VecDeque<Result<http::Response<Bytes>>>>>,
    requests: Arc<Mutex<Vec<http::Request<Bytes>>>>,
}

impl MockHttpSend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, status: u16, body: impl Into<Bytes>) -> Self {
        self.with_response_headers(status, &[], body)
    }

    pub fn with_response_headers(
        self,
        status: u16,
        headers: &[(&str, &str)],
        body: impl Into<Bytes>,
    ) -> Self {
        let mut builder = http::Response::builder().status(status);
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        let resp = builder.body(body.into()).expect("response must be valid");
        self.responses.lock().unwrap().push_back(Ok(resp));
        self
    }

    pub fn with_error(self, err: Error) -> Self {
        self.responses.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn requests(&self) -> Vec<http::Request<Bytes>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|req| {
                let mut builder = http::Request::builder()
                    .method(req.method().clone())
                    .uri(req.uri().clone());
                for (k, v) in req.headers() {
                    builder = builder.header(k, v);
                }
                builder.body(req.body().clone()).unwrap()
            })
            .collect()
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.requests.lock().unwrap().push(req);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::transport("no more canned responses")))
    }
}

/// Serves a single file from memory.
#[derive(Debug, Clone)]
pub struct MockFileRead {
    path: String,
    content: Vec<u8>,
}

impl MockFileRead {
    pub fn new(path: &str, content: &str) -> Self {
        Self {
            path: path.to_string(),
            content: content.as_bytes().to_vec(),
        }
    }
}

#[async_trait]
impl FileRead for MockFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        if path == self.path {
            Ok(self.content.clone())
        } else {
            Err(Error::unexpected(format!("file {path} not found")))
        }
    }
}
