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

use crate::provide_credential::{ConfigCredentialProvider, EnvCredentialProvider};
use crate::{Config, Credential};
use async_trait::async_trait;
use std::sync::Arc;
use volar_core::{Context, ProvideCredential, ProvideCredentialChain, Result};

/// DefaultCredentialProvider tries, in order:
///
/// 1. the api key and secret of an explicit [`Config`], if one was given
/// 2. `VOLAR_API_KEY` / `VOLAR_SECRET` from the environment
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultCredentialProvider {
    /// Create a provider that only looks at the environment.
    pub fn new() -> Self {
        Self {
            chain: ProvideCredentialChain::new().push(EnvCredentialProvider::new()),
        }
    }

    /// Create a provider that prefers the credential of `config`.
    pub fn with_config(config: Arc<Config>) -> Self {
        Self {
            chain: ProvideCredentialChain::new()
                .push(ConfigCredentialProvider::new(config))
                .push(EnvCredentialProvider::new()),
        }
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}
