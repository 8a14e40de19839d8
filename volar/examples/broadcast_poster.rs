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

//! Create a broadcast and attach a poster to it.
//!
//! ```shell
//! VOLAR_API_KEY=... VOLAR_SECRET=... cargo run --example broadcast_poster -- demo poster.jpg
//! ```

use anyhow::{anyhow, Result};
use serde_json::json;
use volar::cms::{client_from_env, params};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = env_logger::try_init();

    let mut args = std::env::args().skip(1);
    let site = args.next().ok_or_else(|| anyhow!("usage: broadcast_poster <site> <file>"))?;
    let file = args.next().ok_or_else(|| anyhow!("usage: broadcast_poster <site> <file>"))?;

    let client = client_from_env()?;

    let created = client
        .broadcast_create(&params(json!({
            "site": site,
            "title": "Poster upload example",
            "date": "2026-12-01 18:00:00",
        })))
        .await?;
    println!("created: {created}");

    let Some(id) = created["broadcast"]["id"].as_u64() else {
        return Err(anyhow!("broadcast was not created: {created}"));
    };

    let poster = client
        .broadcast_poster(&params(json!({"site": site, "id": id})), Some(&file))
        .await?;
    println!("poster: {poster}");

    Ok(())
}
