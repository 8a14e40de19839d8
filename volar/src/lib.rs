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

//! Signed client for the volar video CMS.
//!
//! This crate re-exports [`volar_core`] and the CMS service crate, and with
//! the `default-context` feature (enabled by default) wires a runtime
//! context so a client can be built in one call.
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> volar::Result<()> {
//! use volar::cms::params;
//!
//! let client = volar::cms::default_client("your-api-key", "your-secret");
//! let sites = client.sites(&params(serde_json::json!({}))).await?;
//! println!("{sites}");
//! # Ok(())
//! # }
//! ```

pub use volar_core::*;

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::default_context;

pub mod cms;
