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

//! Utility functions and types.

use crate::{Error, Result};
use std::fmt::Debug;

/// Redacts a string so that secrets, signatures and session tokens can be logged.
///
/// - Inputs shorter than 12 characters are fully redacted.
/// - Longer inputs keep their first and last three characters, which is enough
///   to tell two values apart without leaking them.
pub struct Redact<'a>(&'a str);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(value.as_str())
    }
}

impl<'a> From<&'a Option<String>> for Redact<'a> {
    fn from(value: &'a Option<String>) -> Self {
        Redact(value.as_deref().unwrap_or_default())
    }
}

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.len() {
            0 => f.write_str("EMPTY"),
            n if n < 12 => f.write_str("***"),
            n => write!(f, "{}***{}", &self.0[..3], &self.0[n - 3..]),
        }
    }
}

/// Reject values that cannot be represented as 7-bit ASCII.
///
/// `field` names the offending input in the error message; the value itself
/// is never echoed since it may be a secret.
pub fn ensure_ascii(field: &str, value: &str) -> Result<()> {
    if value.is_ascii() {
        return Ok(());
    }

    Err(Error::request_invalid(format!(
        "{field} contains non-ascii characters and cannot be signed"
    )))
}
