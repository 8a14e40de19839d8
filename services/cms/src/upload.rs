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

use crate::canonical::Params;
use crate::constants::{FILENAME, ROUTE_S3_HANDSHAKE, TMP_FILE_ID, TMP_FILE_NAME};
use crate::{Dispatcher, ObjectStorage, PutObject, S3ObjectStorage};
use bytes::Bytes;
use log::debug;
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use volar_core::utils::Redact;
use volar_core::{Error, Result};

/// Temporary storage credentials returned by the upload handshake.
///
/// Fields may be sent as strings or numbers.
#[derive(Clone, Default, Deserialize)]
pub struct UploadTicket {
    /// Id of the temporary file, sent back as `tmp_file_id`.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Object key, sent back as `tmp_file_name`.
    #[serde(deserialize_with = "string_or_number")]
    pub key: String,
    /// Bucket the object is written to.
    #[serde(deserialize_with = "string_or_number")]
    pub bucket: String,
    /// Temporary access key.
    #[serde(deserialize_with = "string_or_number")]
    pub access_key: String,
    /// Temporary secret key.
    #[serde(deserialize_with = "string_or_number")]
    pub secret: String,
    /// Temporary session token.
    #[serde(deserialize_with = "string_or_number")]
    pub token: String,
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        v => Err(de::Error::custom(format!(
            "expected string or number, got {v}"
        ))),
    }
}

impl Debug for UploadTicket {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadTicket")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("bucket", &self.bucket)
            .field("access_key", &Redact::from(&self.access_key))
            .field("secret", &Redact::from(&self.secret))
            .field("token", &Redact::from(&self.token))
            .finish()
    }
}

impl UploadTicket {
    /// Parse a ticket out of the handshake response.
    ///
    /// A response that is not a ticket is an upload error that carries the
    /// service's `errors`, if any.
    pub fn from_response(resp: &Value) -> Result<Self> {
        Self::deserialize(resp).map_err(|e| {
            let mut message = format!("handshake response is not an upload ticket: {e}");
            if let Some(errors) = resp.get("errors") {
                message.push_str(&format!(", errors: {errors}"));
            }
            Error::upload(message).with_source(e)
        })
    }
}

/// Reference to an uploaded file, to be merged into the request that
/// attaches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadParams {
    /// Id of the temporary file.
    pub tmp_file_id: String,
    /// Object key of the temporary file.
    pub tmp_file_name: String,
}

impl UploadParams {
    /// Insert `tmp_file_id` and `tmp_file_name` into `params`.
    pub fn merge_into(self, params: &mut Params) {
        params.insert(TMP_FILE_ID.to_string(), Value::String(self.tmp_file_id));
        params.insert(TMP_FILE_NAME.to_string(), Value::String(self.tmp_file_name));
    }

    /// Convert into params.
    pub fn into_params(self) -> Params {
        let mut params = Params::new();
        self.merge_into(&mut params);
        params
    }
}

impl From<&UploadTicket> for UploadParams {
    fn from(ticket: &UploadTicket) -> Self {
        Self {
            tmp_file_id: ticket.id.clone(),
            tmp_file_name: ticket.key.clone(),
        }
    }
}

/// UploadHandshakeClient obtains temporary storage credentials from the
/// CMS and writes a local file with them.
#[derive(Debug, Clone)]
pub struct UploadHandshakeClient {
    dispatcher: Dispatcher,
    storage: Arc<dyn ObjectStorage>,
}

impl UploadHandshakeClient {
    /// Create a client that writes to S3.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            storage: Arc::new(S3ObjectStorage::new()),
        }
    }

    pub(crate) fn from_parts(dispatcher: Dispatcher, storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            dispatcher,
            storage,
        }
    }

    /// Replace the storage files are written to.
    pub fn with_storage(mut self, storage: impl ObjectStorage) -> Self {
        self.storage = Arc::new(storage);
        self
    }

    /// Ask the CMS for a ticket to upload `file_name`.
    pub async fn handshake(&self, file_name: &str) -> Result<UploadTicket> {
        let mut params = Params::new();
        params.insert(FILENAME.to_string(), Value::String(file_name.to_string()));

        let resp = self
            .dispatcher
            .send(ROUTE_S3_HANDSHAKE, "GET", &params, None)
            .await
            .map_err(|e| {
                Error::upload(format!("could not initiate file upload: {e}")).with_source(e)
            })?;

        UploadTicket::from_response(&resp).map_err(|e| {
            Error::upload(format!("could not initiate file upload: {e}")).with_source(e)
        })
    }

    /// Upload the file at `path` and return the params that reference it.
    ///
    /// Nothing is sent when `path` is not an existing regular file.
    pub async fn prepare_upload(&self, path: &str) -> Result<UploadParams> {
        let ctx = self.dispatcher.context();
        if !ctx.is_file(path).await {
            return Err(Error::file_not_found(format!(
                "{path} does not appear to exist"
            )));
        }

        let file_name = file_base_name(path);
        let ticket = self.handshake(file_name).await?;
        debug!("received upload ticket {ticket:?} for {file_name}");

        let content = ctx
            .file_read(path)
            .await
            .map_err(|e| Error::upload(format!("failed to read {path}: {e}")).with_source(e))?;

        let object = PutObject {
            body: Bytes::from(content),
            content_disposition: format!(
                r#"attachment; filename="{}""#,
                file_name.replace('"', "")
            ),
        };
        self.storage.put_object(ctx, &ticket, object).await?;

        Ok(UploadParams::from(&ticket))
    }
}

/// Last path segment of `path`, treating `\` as a separator.
pub fn file_base_name(path: &str) -> &str {
    let path = path.trim_end_matches(['/', '\\']);
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
