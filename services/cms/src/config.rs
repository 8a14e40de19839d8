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

use crate::constants::*;
use std::fmt::{Debug, Formatter};
use volar_core::utils::Redact;
use volar_core::{Context, Error, Result};

/// Config for the volar CMS client.
#[derive(Clone)]
pub struct Config {
    /// Api key assigned to the api user.
    pub api_key: Option<String>,
    /// Secret assigned to the api user.
    pub secret: Option<String>,
    /// Domain the api user lives on, without scheme.
    ///
    /// Defaults to `vcloud.volarvideo.com`.
    pub base_url: String,
    /// Send requests over https instead of http.
    pub secure: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            secret: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            secure: false,
        }
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &Redact::from(&self.api_key))
            .field("secret", &Redact::from(&self.secret))
            .field("base_url", &self.base_url)
            .field("secure", &self.secure)
            .finish()
    }
}

impl Config {
    /// Load config from environment variables.
    ///
    /// - `VOLAR_API_KEY`
    /// - `VOLAR_SECRET`
    /// - `VOLAR_BASE_URL`
    /// - `VOLAR_SECURE`: one of `true`, `false`, `1`, `0`, `on`, `off`
    ///
    /// Unset variables keep their default value.
    pub fn from_env(ctx: &Context) -> Result<Self> {
        let mut config = Self {
            api_key: ctx.env_var(VOLAR_API_KEY),
            secret: ctx.env_var(VOLAR_SECRET),
            ..Default::default()
        };

        if let Some(base_url) = ctx.env_var(VOLAR_BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(secure) = ctx.env_var(VOLAR_SECURE) {
            config.secure = parse_bool(&secure).ok_or_else(|| {
                Error::config_invalid(format!("{VOLAR_SECURE} has invalid value: {secure}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the endpoint can be turned into a url.
    pub fn validate(&self) -> Result<()> {
        let base_url = self.base_url.trim_end_matches('/');
        if base_url.is_empty() {
            return Err(Error::config_invalid("base_url must not be empty"));
        }
        if base_url.contains("://") {
            return Err(Error::config_invalid(format!(
                "base_url must be a bare host, got {base_url}; use `secure` to select https"
            )));
        }

        Ok(())
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" | "" => Some(false),
        _ => None,
    }
}
