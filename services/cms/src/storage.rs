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

use crate::constants::{
    AWS_URI_ENCODE_SET, DEFAULT_STORAGE_REGION, X_AMZ_ACL, X_AMZ_CONTENT_SHA_256, X_AMZ_DATE,
    X_AMZ_SECURITY_TOKEN,
};
use crate::UploadTicket;
use async_trait::async_trait;
use bytes::Bytes;
use http::{header, HeaderValue, Method, StatusCode};
use log::debug;
use percent_encoding::{percent_decode_str, utf8_percent_encode};
use std::fmt::{Debug, Write};
use volar_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use volar_core::time::{format_date, format_iso8601, now, DateTime};
use volar_core::{Context, Error, Result, SigningRequest};

/// An object to be written to storage.
#[derive(Debug, Clone)]
pub struct PutObject {
    /// Raw object content.
    pub body: Bytes,
    /// Value of the `content-disposition` header stored with the object.
    pub content_disposition: String,
}

/// ObjectStorage writes uploaded files with the temporary credentials handed
/// out by the upload handshake.
#[async_trait]
pub trait ObjectStorage: Debug + Send + Sync + 'static {
    /// Write `object` under `ticket.key` in `ticket.bucket`, publicly readable.
    async fn put_object(&self, ctx: &Context, ticket: &UploadTicket, object: PutObject)
        -> Result<()>;
}

/// S3 storage signed with AWS signature v4.
#[derive(Debug, Clone)]
pub struct S3ObjectStorage {
    region: String,
    endpoint: String,

    time: Option<DateTime>,
}

impl Default for S3ObjectStorage {
    fn default() -> Self {
        Self {
            region: DEFAULT_STORAGE_REGION.to_string(),
            endpoint: "https://{bucket}.s3.amazonaws.com".to_string(),
            time: None,
        }
    }
}

impl S3ObjectStorage {
    /// Create storage for `us-east-1` with virtual hosted buckets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the region used in the signing scope.
    pub fn with_region(mut self, region: &str) -> Self {
        self.region = region.to_string();
        self
    }

    /// Set the endpoint. `{bucket}` is replaced with the ticket bucket.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    fn object_url(&self, ticket: &UploadTicket) -> String {
        let key = ticket.key.trim_start_matches('/');
        format!(
            "{}/{}",
            self.endpoint.replace("{bucket}", &ticket.bucket),
            utf8_percent_encode(key, &AWS_URI_ENCODE_SET)
        )
    }

    fn sign(&self, req: &mut http::request::Parts, ticket: &UploadTicket, payload_hash: &str) -> Result<()> {
        let now = self.time.unwrap_or_else(now);
        let mut signed_req = SigningRequest::build(req)?;

        for (_, value) in signed_req.headers.iter_mut() {
            SigningRequest::header_value_normalize(value)
        }
        let host = HeaderValue::from_str(signed_req.authority.as_str())?;
        signed_req.headers.insert(header::HOST, host);
        signed_req
            .headers
            .insert(X_AMZ_DATE, HeaderValue::try_from(format_iso8601(now))?);
        signed_req
            .headers
            .insert(X_AMZ_CONTENT_SHA_256, HeaderValue::from_str(payload_hash)?);
        if !ticket.token.is_empty() {
            let mut value = HeaderValue::from_str(&ticket.token)?;
            value.set_sensitive(true);
            signed_req.headers.insert(X_AMZ_SECURITY_TOKEN, value);
        }

        let creq = canonical_request_string(&signed_req, payload_hash)?;

        // Scope: "20220313/<region>/s3/aws4_request"
        let scope = format!("{}/{}/s3/aws4_request", format_date(now), self.region);
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{scope}\n{}",
            format_iso8601(now),
            hex_sha256(creq.as_bytes())
        );
        debug!("calculated storage string to sign: {string_to_sign}");

        let signing_key = generate_signing_key(&ticket.secret, now, &self.region);
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        let mut authorization = HeaderValue::from_str(&format!(
            "AWS4-HMAC-SHA256 Credential={}/{scope}, SignedHeaders={}, Signature={signature}",
            ticket.access_key,
            signed_req.header_name_to_vec_sorted().join(";"),
        ))?;
        authorization.set_sensitive(true);
        signed_req
            .headers
            .insert(header::AUTHORIZATION, authorization);

        signed_req.apply(req)
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn put_object(
        &self,
        ctx: &Context,
        ticket: &UploadTicket,
        object: PutObject,
    ) -> Result<()> {
        let url = self.object_url(ticket);
        let payload_hash = hex_sha256(&object.body);

        let req = http::Request::builder()
            .method(Method::PUT)
            .uri(&url)
            .header(X_AMZ_ACL, "public-read")
            .header(
                header::CONTENT_DISPOSITION,
                HeaderValue::from_bytes(object.content_disposition.as_bytes())?,
            )
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(object.body)?;
        let (mut parts, body) = req.into_parts();
        self.sign(&mut parts, ticket, &payload_hash)?;

        debug!("uploading {} bytes to {url}", body.len());
        let resp = ctx
            .http_send(http::Request::from_parts(parts, body))
            .await
            .map_err(|e| Error::upload(format!("failed to upload to {url}: {e}")).with_source(e))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let message = String::from_utf8_lossy(resp.body());
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::credential_denied(
                format!("storage rejected upload credentials with {status}: {message}"),
            )),
            _ => Err(Error::upload(format!(
                "storage responded with {status}: {message}"
            ))),
        }
    }
}

fn canonical_request_string(req: &SigningRequest, payload_hash: &str) -> Result<String> {
    let mut f = String::with_capacity(256);

    writeln!(f, "{}", req.method)?;
    let path = percent_decode_str(&req.path)
        .decode_utf8()
        .map_err(|e| Error::request_invalid("object key is not valid utf-8").with_source(e))?;
    writeln!(f, "{}", utf8_percent_encode(&path, &AWS_URI_ENCODE_SET))?;
    // No query.
    writeln!(f)?;

    let signed_headers = req.header_name_to_vec_sorted();
    for name in signed_headers.iter() {
        let value = req.headers[*name].to_str().map_err(|e| {
            Error::request_invalid(format!("header {name} cannot be signed")).with_source(e)
        })?;
        writeln!(f, "{name}:{value}")?;
    }
    writeln!(f)?;
    writeln!(f, "{}", signed_headers.join(";"))?;
    write!(f, "{payload_hash}")?;

    Ok(f)
}

fn generate_signing_key(secret: &str, time: DateTime, region: &str) -> Vec<u8> {
    let sign_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), format_date(time).as_bytes());
    let sign_region = hmac_sha256(&sign_date, region.as_bytes());
    let sign_service = hmac_sha256(&sign_region, b"s3");
    hmac_sha256(&sign_service, b"aws4_request")
}
