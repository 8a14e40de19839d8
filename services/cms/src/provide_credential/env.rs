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

use crate::{constants::*, Credential};
use async_trait::async_trait;
use volar_core::{Context, ProvideCredential, Result};

/// EnvCredentialProvider loads the credential from environment variables.
///
/// - `VOLAR_API_KEY`: the api key
/// - `VOLAR_SECRET`: the shared secret
///
/// Both must be present, otherwise no credential is returned.
#[derive(Debug, Default, Clone)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        match (ctx.env_var(VOLAR_API_KEY), ctx.env_var(VOLAR_SECRET)) {
            (Some(api_key), Some(secret)) => Ok(Some(Credential { api_key, secret })),
            _ => Ok(None),
        }
    }
}
