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

use anyhow::Result;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;
use volar_core::Context;
use volar_http_send_reqwest::ReqwestHttpSend;

#[tokio::main]
async fn main() -> Result<()> {
    // The CMS has no deadline contract of its own, so callers that need one
    // configure it on the transport.
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent("volar-example/1.0")
        .build()?;

    let ctx = Context::new().with_http_send(ReqwestHttpSend::new(client));

    // Unsigned on purpose: the service answers with a JSON error document.
    let req = http::Request::builder()
        .method("GET")
        .uri("http://vcloud.volarvideo.com/api/client/info")
        .body(Bytes::new())?;

    match ctx.http_send_as_string(req).await {
        Ok(resp) => {
            println!("status: {}", resp.status());
            println!("body: {}", resp.body());
        }
        Err(e) => eprintln!("request failed: {e}"),
    }

    Ok(())
}
