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

use crate::constants::{API_KEY, SIGNATURE};
use crate::Credential;
use async_trait::async_trait;
use http::request::Parts;
use log::debug;
use volar_core::hash::base64_sha256;
use volar_core::utils::{ensure_ascii, Redact};
use volar_core::{
    trim_route, Context, Error, Result, SignRequest, SigningCredential, SigningRequest,
};

/// Length of the base64 prefix kept as signature.
const SIGNATURE_LEN: usize = 43;

/// Compute the volar request signature.
///
/// The signing input is `secret + METHOD + route + k1=v1k2=v2... + body`
/// where the route has one trailing and one leading `/` removed, the pairs
/// are sorted by key byte-wise, and the body is only appended when it is not
/// empty. The result is the first 43 characters of the base64 encoded
/// SHA-256 digest, without `=` padding.
///
/// Every part must be ascii; anything else is rejected before hashing.
///
/// ```
/// use volar_cms::sign;
///
/// let signature = sign("s", "GET", "api/client/info", [("api_key", "k")], None).unwrap();
/// assert_eq!(signature, "drxCe5cmnTUuGXX6rfCQEhDBZDYDR5vEnPzVy00RRLo");
/// ```
pub fn sign<K, V>(
    secret: &str,
    method: &str,
    route: &str,
    params: impl IntoIterator<Item = (K, V)>,
    body: Option<&str>,
) -> Result<String>
where
    K: Into<String>,
    V: Into<String>,
{
    ensure_ascii("secret", secret)?;
    ensure_ascii("method", method)?;
    ensure_ascii("route", route)?;

    let method = if method.is_empty() {
        "GET".to_string()
    } else {
        method.to_ascii_uppercase()
    };
    let route = trim_route(route);

    let params = params
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect::<Vec<(String, String)>>();
    for (k, v) in &params {
        ensure_ascii(&format!("parameter name `{k}`"), k)?;
        ensure_ascii(&format!("parameter `{k}`"), v)?;
    }
    let params = SigningRequest::query_to_sorted_string(params, "=", "");

    let body = body.unwrap_or_default();
    ensure_ascii("body", body)?;

    let mut input =
        String::with_capacity(secret.len() + method.len() + route.len() + params.len() + body.len());
    input.push_str(secret);
    input.push_str(&method);
    input.push_str(route);
    input.push_str(&params);
    input.push_str(body);

    let mut signature = base64_sha256(input.as_bytes());
    signature.truncate(SIGNATURE_LEN);
    let trimmed = signature.trim_end_matches('=').len();
    signature.truncate(trimmed);

    Ok(signature)
}

/// Route to sign, attached to the request extensions.
///
/// Set it when the request path carries more than the api route, for example
/// a host with a path prefix. Without it the whole request path is signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningRoute(pub String);

/// RequestSigner that implements volar request signing.
///
/// It takes the route from [`SigningRoute`] or else the request path, and the
/// parameters from the query string. It appends `api_key`, then the computed
/// `signature`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestSigner;

impl RequestSigner {
    /// Create a new request signer.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut Parts,
        body: &[u8],
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let Some(cred) = credential.filter(|c| c.is_valid()) else {
            return Err(Error::credential_invalid(
                "no valid credential: api_key and secret must both be set",
            ));
        };

        let mut signed_req = SigningRequest::build(req)?;
        for reserved in [API_KEY, SIGNATURE] {
            if signed_req.query_get(reserved).is_some() {
                return Err(Error::request_invalid(format!(
                    "request already carries `{reserved}`"
                )));
            }
        }

        let body = std::str::from_utf8(body)
            .ok()
            .filter(|b| b.is_ascii())
            .ok_or_else(|| {
                Error::request_invalid("body contains non-ascii characters and cannot be signed")
            })?;

        signed_req.query_push(API_KEY, cred.api_key.as_str());

        let route = match req.extensions.get::<SigningRoute>() {
            Some(SigningRoute(route)) => trim_route(route).to_string(),
            None => signed_req.route(),
        };
        let signature = sign(
            &cred.secret,
            signed_req.method.as_str(),
            &route,
            signed_req
                .query
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
            Some(body),
        )?;
        debug!(
            "calculated signature for {} {route}: {:?}",
            signed_req.method,
            Redact::from(&signature)
        );

        signed_req.query_push(SIGNATURE, signature);
        signed_req.apply(req)
    }
}
