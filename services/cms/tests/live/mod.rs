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
use log::{debug, warn};
use serde_json::json;
use std::env;
use volar_cms::{params, Client, Config};
use volar_core::{Context, OsEnv};
use volar_file_read_tokio::TokioFileRead;
use volar_http_send_reqwest::ReqwestHttpSend;

fn init_live_client() -> Option<Client> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("VOLAR_CMS_TEST").is_err() || env::var("VOLAR_CMS_TEST").unwrap() != "on" {
        return None;
    }

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let config = Config::from_env(&ctx).expect("volar config must be valid");
    assert!(config.api_key.is_some(), "env VOLAR_API_KEY must set");
    assert!(config.secret.is_some(), "env VOLAR_SECRET must set");

    Some(Client::from_config(ctx, config).expect("client must build"))
}

#[tokio::test]
async fn test_live_sites() -> Result<()> {
    let Some(client) = init_live_client() else {
        warn!("VOLAR_CMS_TEST is not set, skipped");
        return Ok(());
    };

    let resp = client.sites(&params(json!({}))).await?;
    debug!("got response: {resp}");
    assert!(resp.get("sites").is_some(), "unexpected response: {resp}");
    Ok(())
}

#[tokio::test]
async fn test_live_broadcasts() -> Result<()> {
    let Some(client) = init_live_client() else {
        warn!("VOLAR_CMS_TEST is not set, skipped");
        return Ok(());
    };
    let site = env::var("VOLAR_CMS_TEST_SITE").expect("env VOLAR_CMS_TEST_SITE must set");

    let resp = client
        .broadcasts(&params(json!({"site": site, "list": "all", "per_page": 5})))
        .await?;
    debug!("got response: {resp}");
    assert!(resp.is_object(), "unexpected response: {resp}");
    Ok(())
}
