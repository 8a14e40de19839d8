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

use crate::mock::{mock_client, MockHttpSend, Sent};
use anyhow::Result;
use http::Method;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashMap;
use volar_cms::{params, sign, Client, Config, NestedKeyStyle, Params};
use volar_core::{Context, ErrorKind, StaticEnv};

/// Recompute the signature of a sent request from what went over the wire.
fn assert_signed(sent: &Sent, secret: &str) {
    let mut query = sent.query();
    let pos = query
        .iter()
        .position(|(k, _)| k == "signature")
        .expect("signature must be sent");
    let (_, signature) = query.remove(pos);

    let body = std::str::from_utf8(&sent.body).unwrap();
    let expected = sign(
        secret,
        sent.method.as_str(),
        sent.uri.path(),
        query,
        Some(body),
    )
    .unwrap();
    assert_eq!(signature, expected, "request: {sent:?}");
}

#[tokio::test]
async fn test_sites() -> Result<()> {
    let (client, http, _) = mock_client();
    http.respond(200, r#"{"success":true,"sites":[{"slug":"demo"}]}"#);

    let resp = client.sites(&Params::new()).await?;
    assert_eq!(resp["sites"][0]["slug"], "demo");

    let sent = http.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, Method::GET);
    assert_eq!(
        sent[0].uri.to_string(),
        "http://vcloud.volarvideo.com/api/client/info?api_key=k&signature=drxCe5cmnTUuGXX6rfCQEhDBZDYDR5vEnPzVy00RRLo"
    );
    assert!(sent[0].body.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_broadcast_create() -> Result<()> {
    let (client, http, _) = mock_client();

    client
        .broadcast_create(&params(json!({"site": "demo", "title": "Launch"})))
        .await?;

    let sent = http.requests();
    assert_eq!(sent[0].method, Method::POST);
    assert_eq!(sent[0].uri.path(), "/api/client/broadcast/create");
    assert_eq!(
        sent[0].query(),
        vec![
            ("site".to_string(), "demo".to_string()),
            ("api_key".to_string(), "k".to_string()),
            (
                "signature".to_string(),
                "QkD2NkgGj5VI1Hg+ip/a56ouufNTV3shsuCdTbigNmc".to_string()
            ),
        ]
    );
    assert_eq!(sent[0].body.as_ref(), br#"{"title":"Launch"}"#);
    Ok(())
}

#[tokio::test]
async fn test_mutation_body_is_ascii() -> Result<()> {
    let (client, http, _) = mock_client();

    client
        .videoclip_update(&params(json!({"site": "demo", "id": 4, "title": "Café"})))
        .await?;

    let sent = &http.requests()[0];
    assert_eq!(sent.body.as_ref(), br#"{"id":4,"title":"Caf\u00e9"}"#);
    assert_signed(sent, "s");
    Ok(())
}

#[tokio::test]
async fn test_listing_requires_site() {
    let (client, http, _) = mock_client();
    let p = params(json!({"page": 1}));

    for result in [
        client.broadcasts(&p).await,
        client.videoclips(&p).await,
        client.sections(&p).await,
        client.playlists(&p).await,
    ] {
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
        assert_eq!(
            err.to_string(),
            r#""site" or "sites" parameter is required."#
        );
    }
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn test_listing_accepts_sites() -> Result<()> {
    let (client, http, _) = mock_client();

    client
        .playlists(&params(json!({"sites": "demo,other", "per_page": 10})))
        .await?;

    let sent = &http.requests()[0];
    assert_eq!(sent.uri.path(), "/api/client/playlist");
    assert_eq!(sent.query_get("sites").as_deref(), Some("demo,other"));
    assert_eq!(sent.query_get("per_page").as_deref(), Some("10"));
    assert_signed(sent, "s");
    Ok(())
}

#[tokio::test]
async fn test_templates_require_site() {
    let (client, http, _) = mock_client();

    let err = client
        .templates(&params(json!({"sites": "demo"})))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    assert!(err.to_string().contains(r#""site" parameter is required"#));
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn test_operation_requires_site() {
    let (client, http, _) = mock_client();
    let p = params(json!({"id": 3, "site": null}));
    // The file is never looked at.
    let file = Some("/does/not/exist.jpg");

    for result in [
        client.broadcast_create(&p).await,
        client.broadcast_update(&p).await,
        client.broadcast_delete(&p).await,
        client.videoclip_create(&p).await,
        client.template_update(&p).await,
        client.playlist_delete(&p).await,
        client.broadcast_assign_playlist(&p).await,
        client.videoclip_remove_playlist(&p).await,
        client.broadcast_poster(&p, file).await,
        client.videoclip_archive(&p, file).await,
    ] {
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
        assert!(err.is_local());
        assert_eq!(err.to_string(), "site is required");
    }
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn test_operation_requires_id() -> Result<()> {
    let (client, http, storage) = mock_client();
    let p = params(json!({"site": "demo", "title": "Launch", "id": null}));
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("poster.jpg");
    std::fs::write(&path, b"jpeg")?;
    let file = path.to_str();

    for result in [
        client.broadcast_update(&p).await,
        client.broadcast_delete(&p).await,
        client.broadcast_assign_playlist(&p).await,
        client.broadcast_remove_playlist(&p).await,
        client.broadcast_poster(&p, file).await,
        client.broadcast_archive(&p, None).await,
        client.videoclip_update(&p).await,
        client.videoclip_delete(&p).await,
        client.videoclip_assign_playlist(&p).await,
        client.videoclip_remove_playlist(&p).await,
        client.videoclip_poster(&p, None).await,
        client.videoclip_archive(&p, file).await,
        client.template_update(&p).await,
        client.template_delete(&p).await,
        client.playlist_update(&p).await,
        client.playlist_delete(&p).await,
    ] {
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
        assert!(err.is_local());
        assert_eq!(err.to_string(), "id is required");
    }
    // Neither the handshake nor the storage write happened.
    assert!(http.requests().is_empty());
    assert!(storage.puts().is_empty());

    // Create does not take an id.
    client.playlist_create(&p).await?;
    assert_eq!(http.requests().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_top_level_booleans_on_the_wire() -> Result<()> {
    let (client, http, _) = mock_client();

    client
        .broadcasts(&params(json!({
            "site": "demo",
            "autoplay": true,
            "archived": false,
            "filter": {"live": true, "tags": [false]},
        })))
        .await?;

    let sent = &http.requests()[0];
    assert_eq!(sent.query_get("autoplay").as_deref(), Some("true"));
    assert_eq!(sent.query_get("archived").as_deref(), Some("false"));
    assert_eq!(sent.query_get("filter[live]").as_deref(), Some("1"));
    assert_eq!(sent.query_get("filter[tags][0]").as_deref(), Some("0"));
    assert_signed(sent, "s");
    Ok(())
}

#[tokio::test]
async fn test_assign_playlist_is_signed_get() -> Result<()> {
    let (client, http, _) = mock_client();

    client
        .broadcast_assign_playlist(&params(json!({"site": "demo", "id": 3, "playlist_id": 8})))
        .await?;

    let sent = &http.requests()[0];
    assert_eq!(sent.method, Method::GET);
    assert_eq!(sent.uri.path(), "/api/client/broadcast/assignplaylist");
    assert_eq!(sent.query_get("playlist_id").as_deref(), Some("8"));
    assert_signed(sent, "s");
    Ok(())
}

#[tokio::test]
async fn test_poster_without_file() -> Result<()> {
    let (client, http, storage) = mock_client();

    client
        .broadcast_poster(&params(json!({"site": "demo", "id": 3})), None)
        .await?;

    let sent = http.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].uri.path(), "/api/client/broadcast/poster");
    assert!(storage.puts().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_nested_params() -> Result<()> {
    let (client, http, _) = mock_client();

    client
        .broadcasts(&params(json!({
            "site": "demo",
            "filter": {"title": "a b", "live": true},
            "ids": [4, 5],
        })))
        .await?;

    let sent = &http.requests()[0];
    assert_eq!(sent.query_get("filter[title]").as_deref(), Some("a b"));
    assert_eq!(sent.query_get("filter[live]").as_deref(), Some("1"));
    assert_eq!(sent.query_get("ids[1]").as_deref(), Some("5"));
    assert_signed(sent, "s");
    Ok(())
}

#[tokio::test]
async fn test_legacy_nested_keys() -> Result<()> {
    let (client, http, _) = mock_client();
    let client = client.with_nested_key_style(NestedKeyStyle::Legacy);

    client
        .broadcasts(&params(json!({"site": "demo", "filter": {"title": "x"}})))
        .await?;

    let sent = &http.requests()[0];
    assert_eq!(sent.query_get("filter[title[").as_deref(), Some("x"));
    assert_signed(sent, "s");
    Ok(())
}

#[tokio::test]
async fn test_failure_document_is_returned() -> Result<()> {
    let (client, http, _) = mock_client();
    http.respond(401, r#"{"success":false,"errors":["invalid signature"]}"#);

    let resp = client.broadcasts(&params(json!({"site": "demo"}))).await?;
    assert_eq!(resp["success"], false);
    assert_eq!(resp["errors"][0], "invalid signature");
    Ok(())
}

#[tokio::test]
async fn test_non_json_response() {
    let (client, http, _) = mock_client();
    http.respond(500, "Internal Server Error");

    let err = client
        .broadcasts(&params(json!({"site": "demo"})))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResponseInvalid);
}

#[tokio::test]
async fn test_secure_custom_host() -> Result<()> {
    let http = MockHttpSend::default();
    let client = Client::new(Context::new().with_http_send(http.clone()), "k", "s")
        .with_base_url("staging.volarvideo.com")
        .with_secure(true);

    client.sites(&Params::new()).await?;

    assert_eq!(
        http.requests()[0].uri.to_string(),
        "https://staging.volarvideo.com/api/client/info?api_key=k&signature=drxCe5cmnTUuGXX6rfCQEhDBZDYDR5vEnPzVy00RRLo"
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_credential_sends_nothing() {
    let http = MockHttpSend::default();
    let client = Client::new(Context::new().with_http_send(http.clone()), "k", "");

    let err = client.sites(&Params::new()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    assert!(err.is_credential_error());
    assert!(err.is_local());
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn test_from_config_falls_back_to_env() -> Result<()> {
    let http = MockHttpSend::default();
    let ctx = Context::new()
        .with_http_send(http.clone())
        .with_env(StaticEnv {
            envs: HashMap::from([
                ("VOLAR_API_KEY".to_string(), "k".to_string()),
                ("VOLAR_SECRET".to_string(), "s".to_string()),
            ]),
        });

    let client = Client::from_config(
        ctx,
        Config {
            base_url: "staging.volarvideo.com".to_string(),
            secure: true,
            ..Default::default()
        },
    )?;
    client.sites(&Params::new()).await?;

    let sent = &http.requests()[0];
    assert_eq!(sent.uri.host(), Some("staging.volarvideo.com"));
    assert_eq!(sent.uri.scheme_str(), Some("https"));
    assert_eq!(sent.query_get("api_key").as_deref(), Some("k"));
    assert_signed(sent, "s");
    Ok(())
}

#[test]
fn test_from_config_rejects_url_with_scheme() {
    let err = Client::from_config(
        Context::new(),
        Config {
            base_url: "https://vcloud.volarvideo.com".to_string(),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
}

#[tokio::test]
async fn test_raw_request() -> Result<()> {
    let (client, http, _) = mock_client();

    client
        .request("/api/client/section/", "", &params(json!({"site": "demo"})), None)
        .await?;

    let sent = &http.requests()[0];
    assert_eq!(sent.method, Method::GET);
    assert_eq!(sent.uri.path(), "/api/client/section");
    assert_signed(sent, "s");
    Ok(())
}
