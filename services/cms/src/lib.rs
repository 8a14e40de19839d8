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

//! Volar CMS client.
//!
//! This crate signs requests for the volar video CMS api and wraps its
//! resources (broadcasts, video clips, templates, sections, playlists) in a
//! [`Client`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use volar_cms::{params, Client};
//! use volar_core::{Context, OsEnv, Result};
//! use volar_file_read_tokio::TokioFileRead;
//! use volar_http_send_reqwest::ReqwestHttpSend;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new()
//!         .with_file_read(TokioFileRead)
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     let client = Client::new(ctx, "your-api-key", "your-secret").with_secure(true);
//!
//!     let resp = client
//!         .broadcast_create(&params(serde_json::json!({
//!             "site": "demo",
//!             "title": "Launch",
//!         })))
//!         .await?;
//!     println!("{resp}");
//!     Ok(())
//! }
//! ```
//!
//! ## Signature
//!
//! Every request carries `api_key` and `signature` query parameters. The
//! signature is the base64 SHA-256 digest of the secret, the uppercased
//! method, the route, every query parameter sorted by key as `key=value`
//! and the raw body, cut to 43 characters with `=` padding removed. See
//! [`sign`].
//!
//! ## Credential Sources
//!
//! ```bash
//! export VOLAR_API_KEY=your-api-key
//! export VOLAR_SECRET=your-secret
//! export VOLAR_BASE_URL=vcloud.volarvideo.com
//! export VOLAR_SECURE=true
//! ```
//!
//! [`Config::from_env`] reads the variables above and
//! [`Client::from_config`] falls back to them for missing credentials.

mod constants;

mod canonical;
pub use canonical::{canonicalize, params, CanonicalParams, Canonicalizer, NestedKeyStyle, Params};

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::*;

mod sign_request;
pub use sign_request::{sign, RequestSigner, SigningRoute};

mod dispatch;
pub use dispatch::Dispatcher;

mod storage;
pub use storage::{ObjectStorage, PutObject, S3ObjectStorage};

mod upload;
pub use upload::{file_base_name, UploadHandshakeClient, UploadParams, UploadTicket};

mod client;
pub use client::{to_ascii_json, Client, Resource};
