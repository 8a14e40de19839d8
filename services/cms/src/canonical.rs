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

//! Flattening of request parameters into signable string pairs.

use crate::constants::{API_KEY, SIGNATURE};
use serde_json::Value;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use volar_core::{Error, Result};

/// Parameters of a request as handed in by callers.
///
/// Values may be scalars or nested objects and arrays.
pub type Params = serde_json::Map<String, Value>;

/// Flat, string valued parameters used both for signing and for the query
/// string. Keys are ordered byte-wise.
pub type CanonicalParams = BTreeMap<String, String>;

/// How the key of a nested field is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NestedKeyStyle {
    /// `parent[child]`
    #[default]
    Bracketed,
    /// `parent[child[`, the shape emitted by earlier volar clients.
    ///
    /// Only useful against deployments that verify signatures over this
    /// exact key shape.
    Legacy,
}

impl NestedKeyStyle {
    fn join(self, parent: &str, child: &str) -> String {
        match self {
            NestedKeyStyle::Bracketed => format!("{parent}[{child}]"),
            NestedKeyStyle::Legacy => format!("{parent}[{child}["),
        }
    }
}

/// Canonicalizer turns [`Params`] into [`CanonicalParams`].
///
/// - Nested objects produce one key per terminal scalar, recursively.
/// - Array elements use their index as child key.
/// - Top-level booleans are sent as `true` / `false`. Booleans inside nested
///   containers become `1` / `0`.
/// - Null becomes the empty string, numbers and strings keep their natural
///   text form.
/// - `api_key` and `signature` are reserved for the signer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Canonicalizer {
    style: NestedKeyStyle,
}

impl Canonicalizer {
    /// Create a canonicalizer using bracketed nested keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the nested key style.
    pub fn with_nested_key_style(mut self, style: NestedKeyStyle) -> Self {
        self.style = style;
        self
    }

    /// Flatten `params`.
    pub fn canonicalize(&self, params: &Params) -> Result<CanonicalParams> {
        let mut out = CanonicalParams::new();

        for (key, value) in params {
            if key == API_KEY || key == SIGNATURE {
                return Err(Error::request_invalid(format!(
                    "`{key}` is reserved and must not be passed as a parameter"
                )));
            }
            self.flatten(key.clone(), value, false, &mut out)?;
        }

        Ok(out)
    }

    fn flatten(
        &self,
        key: String,
        value: &Value,
        nested: bool,
        out: &mut CanonicalParams,
    ) -> Result<()> {
        match value {
            Value::Object(map) => {
                for (child, v) in map {
                    self.flatten(self.style.join(&key, child), v, true, out)?;
                }
            }
            Value::Array(items) => {
                for (idx, v) in items.iter().enumerate() {
                    self.flatten(self.style.join(&key, &idx.to_string()), v, true, out)?;
                }
            }
            scalar => match out.entry(key) {
                Entry::Vacant(e) => {
                    e.insert(scalar_to_string(scalar, nested));
                }
                Entry::Occupied(e) => {
                    return Err(Error::request_invalid(format!(
                        "parameter `{}` is given more than once after flattening",
                        e.key()
                    )));
                }
            },
        }

        Ok(())
    }
}

/// Flatten `params` with the default [`Canonicalizer`].
pub fn canonicalize(params: &Params) -> Result<CanonicalParams> {
    Canonicalizer::new().canonicalize(params)
}

fn scalar_to_string(v: &Value, nested: bool) -> String {
    match v {
        Value::Bool(b) if !nested => b.to_string(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        // Containers are flattened before reaching here.
        Value::Array(_) | Value::Object(_) => v.to_string(),
    }
}

/// Build [`Params`] from a JSON object literal.
///
/// Non-object values produce empty params.
///
/// ```
/// use volar_cms::params;
///
/// let p = params(serde_json::json!({"site": "demo", "page": 2}));
/// assert_eq!(p.len(), 2);
/// ```
pub fn params(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}
