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

use crate::canonical::{Canonicalizer, NestedKeyStyle, Params};
use crate::constants::DEFAULT_BASE_URL;
use crate::{Credential, SigningRoute};
use bytes::Bytes;
use http::Method;
use log::debug;
use serde_json::Value;
use volar_core::{trim_route, Context, Error, Result, Signer, SigningRequest};

/// Dispatcher sends signed requests to the CMS and decodes the JSON reply.
///
/// Every call is one attempt. Failures are returned to the caller, nothing is
/// retried and no error state is kept between calls.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    signer: Signer<Credential>,
    base_url: String,
    secure: bool,
    canonicalizer: Canonicalizer,
}

impl Dispatcher {
    /// Create a dispatcher talking to `vcloud.volarvideo.com` over http.
    pub fn new(signer: Signer<Credential>) -> Self {
        Self {
            signer,
            base_url: DEFAULT_BASE_URL.to_string(),
            secure: false,
            canonicalizer: Canonicalizer::new(),
        }
    }

    /// Set the host requests are sent to.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Use https instead of http.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set the key style used for nested parameters.
    pub fn with_nested_key_style(mut self, style: NestedKeyStyle) -> Self {
        self.canonicalizer = self.canonicalizer.with_nested_key_style(style);
        self
    }

    /// The context used to send requests.
    pub fn context(&self) -> &Context {
        self.signer.context()
    }

    /// The configured host.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether requests use https.
    pub fn secure(&self) -> bool {
        self.secure
    }

    /// Full url of `route`, without query.
    pub fn endpoint(&self, route: &str) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{}/{}", self.base_url, trim_route(route))
    }

    /// Send a signed request and return the decoded JSON response.
    ///
    /// - An empty `method` means `GET`.
    /// - `params` are canonicalized and sent as query parameters together
    ///   with `api_key` and `signature`.
    /// - `body` is sent as raw payload and bound into the signature. `GET`
    ///   requests cannot carry a body.
    /// - The JSON body is returned whatever the HTTP status is, since the
    ///   service reports failures in the document itself.
    pub async fn send(
        &self,
        route: &str,
        method: &str,
        params: &Params,
        body: Option<&str>,
    ) -> Result<Value> {
        let method = if method.is_empty() {
            Method::GET
        } else {
            Method::from_bytes(method.to_ascii_uppercase().as_bytes())?
        };
        let body = body.unwrap_or_default();
        if method == Method::GET && !body.is_empty() {
            return Err(Error::request_invalid(format!(
                "GET {route} cannot carry a request body"
            )));
        }

        let canonical = self.canonicalizer.canonicalize(params)?;

        let mut uri = self.endpoint(route);
        if !canonical.is_empty() {
            uri.push('?');
            uri.push_str(&SigningRequest::query_encode(
                &canonical.into_iter().collect::<Vec<_>>(),
            ));
        }

        let req = http::Request::builder()
            .method(method.clone())
            .uri(uri)
            .body(Bytes::copy_from_slice(body.as_bytes()))?;
        let (mut parts, body) = req.into_parts();
        parts.extensions.insert(SigningRoute(route.to_string()));
        self.signer.sign(&mut parts, &body).await?;
        let req = http::Request::from_parts(parts, body);

        debug!("sending {method} {route} to {}", self.base_url);
        let resp = self.context().http_send(req).await?;
        let status = resp.status();
        debug!("{method} {route} responded with {status}");

        serde_json::from_slice(resp.body()).map_err(|e| {
            Error::response_invalid(format!(
                "{method} {route} responded with {status} and a body that is not json"
            ))
            .with_source(e)
        })
    }
}
