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

//! In-memory transports used to observe what the client sends.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use volar_cms::{Client, ObjectStorage, PutObject, UploadTicket};
use volar_core::{Context, Error, HttpSend, Result};

/// A request as seen by the transport.
#[derive(Debug, Clone)]
pub struct Sent {
    pub method: http::Method,
    pub uri: http::Uri,
    pub body: Bytes,
}

impl Sent {
    /// Query parameters in wire order, decoded.
    pub fn query(&self) -> Vec<(String, String)> {
        form_urlencoded::parse(self.uri.query().unwrap_or_default().as_bytes())
            .into_owned()
            .collect()
    }

    pub fn query_get(&self, key: &str) -> Option<String> {
        self.query()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

/// Records every request and answers with queued responses, falling back
/// to `{"success":true}`.
#[derive(Debug, Clone, Default)]
pub struct MockHttpSend {
    requests: Arc<Mutex<Vec<Sent>>>,
    responses: Arc<Mutex<VecDeque<(u16, String)>>>,
}

impl MockHttpSend {
    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back((status, body.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<Sent> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let (parts, body) = req.into_parts();
        self.requests.lock().unwrap().push(Sent {
            method: parts.method,
            uri: parts.uri,
            body,
        });

        let (status, body) = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| (200, r#"{"success":true}"#.to_string()));
        Ok(http::Response::builder()
            .status(status)
            .body(Bytes::from(body))?)
    }
}

/// Records objects instead of writing them.
#[derive(Debug, Clone, Default)]
pub struct MockStorage {
    puts: Arc<Mutex<Vec<(UploadTicket, PutObject)>>>,
    fail_with: Option<fn() -> Error>,
}

impl MockStorage {
    pub fn failing(fail_with: fn() -> Error) -> Self {
        Self {
            fail_with: Some(fail_with),
            ..Default::default()
        }
    }

    pub fn puts(&self) -> Vec<(UploadTicket, PutObject)> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for MockStorage {
    async fn put_object(
        &self,
        _: &Context,
        ticket: &UploadTicket,
        object: PutObject,
    ) -> Result<()> {
        if let Some(fail_with) = self.fail_with {
            return Err(fail_with());
        }
        self.puts.lock().unwrap().push((ticket.clone(), object));
        Ok(())
    }
}

/// A client with api key `k` and secret `s` on the default host.
pub fn mock_client() -> (Client, MockHttpSend, MockStorage) {
    let http = MockHttpSend::default();
    let storage = MockStorage::default();
    let ctx = Context::new()
        .with_file_read(volar_file_read_tokio::TokioFileRead)
        .with_http_send(http.clone());
    let client = Client::new(ctx, "k", "s").with_storage(storage.clone());
    (client, http, storage)
}

pub const HANDSHAKE_RESPONSE: &str = r#"{
    "id": 991,
    "key": "tmp/5f2a/poster.jpg",
    "bucket": "volar-uploads",
    "access_key": "ASIATEMP",
    "secret": "temporary-secret",
    "token": "temporary-token"
}"#;
