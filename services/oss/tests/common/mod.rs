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
use alioss::{Client, Config, StaticCredentialProvider};
use alioss_core::{Context, Error, HttpSend, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Canned transport shared by the pipeline tests.
#[derive(Debug, Clone, Default)]
pub struct ReplayHttpSend {
    responses: Arc<Mutex<VecDeque<http::Response<Bytes>>>>,
    seen: Arc<Mutex<Vec<(String, String, http::HeaderMap, Bytes)>>>,
}

impl ReplayHttpSend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, status: u16, headers: &[(&str, &str)], body: &str) -> Self {
        let mut builder = http::Response::builder().status(status);
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        let resp = builder.body(Bytes::from(body.to_string())).unwrap();
        self.responses.lock().unwrap().push_back(resp);
        self
    }

    /// Method, uri, headers and body of every request sent so far.
    pub fn seen(&self) -> Vec<(String, String, http::HeaderMap, Bytes)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpSend for ReplayHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let (parts, body) = req.into_parts();
        self.seen.lock().unwrap().push((
            parts.method.to_string(),
            parts.uri.to_string(),
            parts.headers,
            body,
        ));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::transport("no reply left"))
    }
}

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn client(http: ReplayHttpSend, config: Config) -> Client {
    init();
    Client::new(Context::new().with_http_send(http), config)
        .unwrap()
        .with_credential_provider(StaticCredentialProvider::new("ak", "sk"))
        .unwrap()
}
