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

//! List the sites and upcoming broadcasts of an api user.
//!
//! ```shell
//! VOLAR_API_KEY=... VOLAR_SECRET=... cargo run --example list_sites -- demo
//! ```

use anyhow::Result;
use serde_json::json;
use volar_cms::{params, Client, Config};
use volar_core::{Context, OsEnv};
use volar_file_read_tokio::TokioFileRead;
use volar_http_send_reqwest::ReqwestHttpSend;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = env_logger::try_init();

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let config = Config::from_env(&ctx)?;
    let client = Client::from_config(ctx, config)?;

    let sites = client.sites(&params(json!({}))).await?;
    println!("{}", serde_json::to_string_pretty(&sites)?);

    if let Some(site) = std::env::args().nth(1) {
        let broadcasts = client
            .broadcasts(&params(json!({"site": site, "list": "upcoming"})))
            .await?;
        println!("{}", serde_json::to_string_pretty(&broadcasts)?);
    }

    Ok(())
}
