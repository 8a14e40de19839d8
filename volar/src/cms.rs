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

//! Volar CMS support with convenience constructors.

pub use volar_cms::*;

#[cfg(feature = "default-context")]
use crate::{default_context, Result};

/// Create a client for `vcloud.volarvideo.com` with a fixed api key and
/// secret, using the default context.
///
/// ```no_run
/// # async fn example() -> volar::Result<()> {
/// use volar::cms::{default_client, params};
///
/// let client = default_client("your-api-key", "your-secret").with_secure(true);
/// let playlists = client
///     .playlists(&params(serde_json::json!({"site": "demo"})))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "default-context")]
pub fn default_client(api_key: &str, secret: &str) -> Client {
    Client::new(default_context(), api_key, secret)
}

/// Create a client configured by `VOLAR_API_KEY`, `VOLAR_SECRET`,
/// `VOLAR_BASE_URL` and `VOLAR_SECURE`.
#[cfg(feature = "default-context")]
pub fn client_from_env() -> Result<Client> {
    let ctx = default_context();
    let config = Config::from_env(&ctx)?;
    Client::from_config(ctx, config)
}
