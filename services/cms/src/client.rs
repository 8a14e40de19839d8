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

//! High level operations on the CMS resources.

use crate::canonical::{NestedKeyStyle, Params};
use crate::constants::{ID, SITE, SITES};
use crate::{
    Config, DefaultCredentialProvider, Dispatcher, ObjectStorage, RequestSigner,
    S3ObjectStorage, StaticCredentialProvider, UploadHandshakeClient, UploadParams,
};
use log::debug;
use serde_json::Value;
use std::fmt::Write;
use std::sync::Arc;
use volar_core::{Context, Error, Result, Signer};

/// Resources the CMS exposes under `api/client`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Live and scheduled broadcasts.
    Broadcast,
    /// On-demand video clips.
    VideoClip,
    /// Meta-data templates.
    Template,
    /// Site sections.
    Section,
    /// Playlists.
    Playlist,
}

impl Resource {
    /// Route of the resource listing.
    pub fn route(self) -> &'static str {
        match self {
            Resource::Broadcast => "api/client/broadcast",
            Resource::VideoClip => "api/client/videoclip",
            Resource::Template => "api/client/template",
            Resource::Section => "api/client/section",
            Resource::Playlist => "api/client/playlist",
        }
    }

    fn action(self, action: &str) -> String {
        format!("{}/{action}", self.route())
    }
}

/// Client for the volar CMS api.
///
/// Every operation performs at most one api request (plus the upload
/// handshake and storage write when a file is attached) and returns the
/// decoded JSON document. Documents with `success: false` are returned as
/// they are; inspect `errors` for the reason.
///
/// ```no_run
/// use volar_cms::{params, Client};
/// use volar_core::Context;
///
/// # async fn example(ctx: Context) -> volar_core::Result<()> {
/// let client = Client::new(ctx, "api-key", "secret");
/// let sites = client.sites(&params(serde_json::json!({}))).await?;
/// let broadcasts = client
///     .broadcasts(&params(serde_json::json!({"site": "demo", "list": "upcoming"})))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    dispatcher: Dispatcher,
    storage: Arc<dyn ObjectStorage>,
}

impl Client {
    /// Create a client with a fixed api key and secret.
    pub fn new(ctx: Context, api_key: &str, secret: &str) -> Self {
        let signer = Signer::new(
            ctx,
            StaticCredentialProvider::new(api_key, secret),
            RequestSigner::new(),
        );
        Self::with_signer(signer)
    }

    /// Create a client from config.
    ///
    /// Credentials missing from `config` are looked up in the environment
    /// when the first request is signed.
    pub fn from_config(ctx: Context, config: Config) -> Result<Self> {
        config.validate()?;

        let base_url = config.base_url.clone();
        let secure = config.secure;
        let signer = Signer::new(
            ctx,
            DefaultCredentialProvider::with_config(Arc::new(config)),
            RequestSigner::new(),
        );
        Ok(Self::with_signer(signer)
            .with_base_url(&base_url)
            .with_secure(secure))
    }

    /// Create a client that signs with `signer`.
    pub fn with_signer(signer: Signer<crate::Credential>) -> Self {
        Self {
            dispatcher: Dispatcher::new(signer),
            storage: Arc::new(S3ObjectStorage::new()),
        }
    }

    /// Set the host, `vcloud.volarvideo.com` by default.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.dispatcher = self.dispatcher.with_base_url(base_url);
        self
    }

    /// Use https, off by default.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.dispatcher = self.dispatcher.with_secure(secure);
        self
    }

    /// Replace the storage uploaded files are written to.
    pub fn with_storage(mut self, storage: impl ObjectStorage) -> Self {
        self.storage = Arc::new(storage);
        self
    }

    /// Set the key style used for nested parameters.
    pub fn with_nested_key_style(mut self, style: NestedKeyStyle) -> Self {
        self.dispatcher = self.dispatcher.with_nested_key_style(style);
        self
    }

    /// The dispatcher used by this client.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Send a signed request to any route.
    pub async fn request(
        &self,
        route: &str,
        method: &str,
        params: &Params,
        body: Option<&str>,
    ) -> Result<Value> {
        self.dispatcher.send(route, method, params, body).await
    }

    /// Upload a local file, returning the params that reference it.
    pub async fn prepare_upload(&self, path: &str) -> Result<UploadParams> {
        self.uploader().prepare_upload(path).await
    }

    fn uploader(&self) -> UploadHandshakeClient {
        UploadHandshakeClient::from_parts(self.dispatcher.clone(), self.storage.clone())
    }

    /// List the sites the api user can access.
    pub async fn sites(&self, params: &Params) -> Result<Value> {
        self.request("api/client/info", "GET", params, None).await
    }

    /// List a resource. Templates require `site`, the others accept `site`
    /// or `sites`.
    pub async fn list(&self, resource: Resource, params: &Params) -> Result<Value> {
        match resource {
            Resource::Template if !has_param(params, SITE) => {
                return Err(Error::request_invalid(r#""site" parameter is required"#));
            }
            _ if !has_param(params, SITE) && !has_param(params, SITES) => {
                return Err(Error::request_invalid(
                    r#""site" or "sites" parameter is required."#,
                ));
            }
            _ => {}
        }

        self.request(resource.route(), "", params, None).await
    }

    async fn mutate(&self, resource: Resource, action: &str, params: &Params) -> Result<Value> {
        let mut body = params.clone();
        let site = match body.remove(SITE) {
            Some(site) if !site.is_null() => site,
            _ => return Err(Error::request_invalid("site is required")),
        };

        let mut query = Params::new();
        query.insert(SITE.to_string(), site);
        let body = to_ascii_json(&Value::Object(body))?;

        self.request(&resource.action(action), "POST", &query, Some(&body))
            .await
    }

    /// Mutation on an existing record: `id` is required next to `site`.
    async fn modify(&self, resource: Resource, action: &str, params: &Params) -> Result<Value> {
        ensure_site(params)?;
        ensure_id(params)?;
        self.mutate(resource, action, params).await
    }

    async fn on_site(&self, resource: Resource, action: &str, params: &Params) -> Result<Value> {
        ensure_site(params)?;
        ensure_id(params)?;
        self.request(&resource.action(action), "GET", params, None)
            .await
    }

    async fn attach(
        &self,
        resource: Resource,
        action: &str,
        params: &Params,
        file_path: Option<&str>,
    ) -> Result<Value> {
        ensure_site(params)?;
        ensure_id(params)?;

        let Some(path) = file_path.filter(|p| !p.is_empty()) else {
            return self.on_site(resource, action, params).await;
        };

        let upload = self.prepare_upload(path).await?;
        debug!("attaching {upload:?} to {}", resource.action(action));
        let mut params = params.clone();
        upload.merge_into(&mut params);
        self.on_site(resource, action, &params).await
    }

    /// List broadcasts. Requires `site` or `sites`.
    pub async fn broadcasts(&self, params: &Params) -> Result<Value> {
        self.list(Resource::Broadcast, params).await
    }

    /// Create a broadcast. Requires `site`.
    pub async fn broadcast_create(&self, params: &Params) -> Result<Value> {
        self.mutate(Resource::Broadcast, "create", params).await
    }

    /// Update a broadcast. Requires `site` and `id`.
    pub async fn broadcast_update(&self, params: &Params) -> Result<Value> {
        self.modify(Resource::Broadcast, "update", params).await
    }

    /// Delete a broadcast. Requires `site` and `id`.
    pub async fn broadcast_delete(&self, params: &Params) -> Result<Value> {
        self.modify(Resource::Broadcast, "delete", params).await
    }

    /// Assign a broadcast (`id`) to a playlist (`playlist_id`).
    pub async fn broadcast_assign_playlist(&self, params: &Params) -> Result<Value> {
        self.on_site(Resource::Broadcast, "assignplaylist", params)
            .await
    }

    /// Remove a broadcast (`id`) from a playlist (`playlist_id`).
    pub async fn broadcast_remove_playlist(&self, params: &Params) -> Result<Value> {
        self.on_site(Resource::Broadcast, "removeplaylist", params)
            .await
    }

    /// Set the poster of a broadcast, uploading `file_path` first if given.
    /// Requires `site` and `id`, checked before any upload.
    pub async fn broadcast_poster(&self, params: &Params, file_path: Option<&str>) -> Result<Value> {
        self.attach(Resource::Broadcast, "poster", params, file_path)
            .await
    }

    /// Archive a broadcast, uploading `file_path` first if given. Requires
    /// `site` and `id`.
    pub async fn broadcast_archive(
        &self,
        params: &Params,
        file_path: Option<&str>,
    ) -> Result<Value> {
        self.attach(Resource::Broadcast, "archive", params, file_path)
            .await
    }

    /// List video clips. Requires `site` or `sites`.
    pub async fn videoclips(&self, params: &Params) -> Result<Value> {
        self.list(Resource::VideoClip, params).await
    }

    /// Create a video clip. Requires `site`.
    pub async fn videoclip_create(&self, params: &Params) -> Result<Value> {
        self.mutate(Resource::VideoClip, "create", params).await
    }

    /// Update a video clip. Requires `site` and `id`.
    pub async fn videoclip_update(&self, params: &Params) -> Result<Value> {
        self.modify(Resource::VideoClip, "update", params).await
    }

    /// Delete a video clip. Requires `site` and `id`.
    pub async fn videoclip_delete(&self, params: &Params) -> Result<Value> {
        self.modify(Resource::VideoClip, "delete", params).await
    }

    /// Assign a video clip (`id`) to a playlist (`playlist_id`).
    pub async fn videoclip_assign_playlist(&self, params: &Params) -> Result<Value> {
        self.on_site(Resource::VideoClip, "assignplaylist", params)
            .await
    }

    /// Remove a video clip (`id`) from a playlist (`playlist_id`).
    pub async fn videoclip_remove_playlist(&self, params: &Params) -> Result<Value> {
        self.on_site(Resource::VideoClip, "removeplaylist", params)
            .await
    }

    /// Set the poster of a video clip, uploading `file_path` first if given.
    pub async fn videoclip_poster(&self, params: &Params, file_path: Option<&str>) -> Result<Value> {
        self.attach(Resource::VideoClip, "poster", params, file_path)
            .await
    }

    /// Archive a video clip, uploading `file_path` first if given.
    pub async fn videoclip_archive(
        &self,
        params: &Params,
        file_path: Option<&str>,
    ) -> Result<Value> {
        self.attach(Resource::VideoClip, "archive", params, file_path)
            .await
    }

    /// List meta-data templates. Requires `site`.
    pub async fn templates(&self, params: &Params) -> Result<Value> {
        self.list(Resource::Template, params).await
    }

    /// Create a meta-data template. Requires `site`.
    pub async fn template_create(&self, params: &Params) -> Result<Value> {
        self.mutate(Resource::Template, "create", params).await
    }

    /// Update a meta-data template. Requires `site` and `id`.
    pub async fn template_update(&self, params: &Params) -> Result<Value> {
        self.modify(Resource::Template, "update", params).await
    }

    /// Delete a meta-data template. Requires `site` and `id`.
    pub async fn template_delete(&self, params: &Params) -> Result<Value> {
        self.modify(Resource::Template, "delete", params).await
    }

    /// List sections. Requires `site` or `sites`.
    pub async fn sections(&self, params: &Params) -> Result<Value> {
        self.list(Resource::Section, params).await
    }

    /// List playlists. Requires `site` or `sites`.
    pub async fn playlists(&self, params: &Params) -> Result<Value> {
        self.list(Resource::Playlist, params).await
    }

    /// Create a playlist. Requires `site`.
    pub async fn playlist_create(&self, params: &Params) -> Result<Value> {
        self.mutate(Resource::Playlist, "create", params).await
    }

    /// Update a playlist. Requires `site` and `id`.
    pub async fn playlist_update(&self, params: &Params) -> Result<Value> {
        self.modify(Resource::Playlist, "update", params).await
    }

    /// Delete a playlist. Requires `site` and `id`.
    pub async fn playlist_delete(&self, params: &Params) -> Result<Value> {
        self.modify(Resource::Playlist, "delete", params).await
    }
}

fn has_param(params: &Params, key: &str) -> bool {
    params.get(key).is_some_and(|v| !v.is_null())
}

fn ensure_site(params: &Params) -> Result<()> {
    if has_param(params, SITE) {
        Ok(())
    } else {
        Err(Error::request_invalid("site is required"))
    }
}

fn ensure_id(params: &Params) -> Result<()> {
    if has_param(params, ID) {
        Ok(())
    } else {
        Err(Error::request_invalid("id is required"))
    }
}

/// Serialize `value` as JSON with every non-ascii character escaped as
/// `\uXXXX`, so the payload can be signed.
pub fn to_ascii_json(value: &Value) -> Result<String> {
    let raw = serde_json::to_string(value)?;
    if raw.is_ascii() {
        return Ok(raw);
    }

    let mut out = String::with_capacity(raw.len() + 16);
    for c in raw.chars() {
        if c.is_ascii() {
            out.push(c);
            continue;
        }
        let mut units = [0u16; 2];
        for unit in c.encode_utf16(&mut units) {
            write!(out, "\\u{unit:04x}")?;
        }
    }
    Ok(out)
}
