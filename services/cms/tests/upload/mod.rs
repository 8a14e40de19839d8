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

use crate::mock::{mock_client, MockHttpSend, MockStorage, HANDSHAKE_RESPONSE};
use anyhow::Result;
use http::Method;
use pretty_assertions::assert_eq;
use serde_json::json;
use volar_cms::{params, sign, Client, UploadParams};
use volar_core::{Context, Error, ErrorKind};
use volar_file_read_tokio::TokioFileRead;

fn poster_file() -> Result<(tempfile::TempDir, String)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("poster.jpg");
    std::fs::write(&path, b"\xff\xd8\xff\xe0fake jpeg")?;
    Ok((dir, path.to_string_lossy().to_string()))
}

#[tokio::test]
async fn test_prepare_upload() -> Result<()> {
    let (client, http, storage) = mock_client();
    http.respond(200, HANDSHAKE_RESPONSE);
    let (_dir, path) = poster_file()?;

    let upload = client.prepare_upload(&path).await?;
    assert_eq!(
        upload,
        UploadParams {
            tmp_file_id: "991".to_string(),
            tmp_file_name: "tmp/5f2a/poster.jpg".to_string(),
        }
    );

    let sent = http.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, Method::GET);
    assert_eq!(sent[0].uri.path(), "/api/client/broadcast/s3handshake");
    assert_eq!(
        sent[0].uri.query(),
        Some("filename=poster.jpg&api_key=k&signature=3dU07oilA7BjoiZxyPCgHOuzLXD%2Fc0FXhytDzzxtxnc")
    );

    let puts = storage.puts();
    assert_eq!(puts.len(), 1);
    let (ticket, object) = &puts[0];
    assert_eq!(ticket.bucket, "volar-uploads");
    assert_eq!(ticket.access_key, "ASIATEMP");
    assert_eq!(ticket.token, "temporary-token");
    assert_eq!(object.body.as_ref(), b"\xff\xd8\xff\xe0fake jpeg");
    assert_eq!(
        object.content_disposition,
        r#"attachment; filename="poster.jpg""#
    );
    Ok(())
}

#[tokio::test]
async fn test_prepare_upload_strips_quotes_from_disposition() -> Result<()> {
    let (client, http, storage) = mock_client();
    http.respond(200, HANDSHAKE_RESPONSE);

    let dir = tempfile::tempdir()?;
    let path = dir.path().join(r#"my "best" clip.mp4"#);
    std::fs::write(&path, b"content")?;

    client.prepare_upload(&path.to_string_lossy()).await?;

    assert_eq!(
        http.requests()[0].query_get("filename").as_deref(),
        Some(r#"my "best" clip.mp4"#)
    );
    assert_eq!(
        storage.puts()[0].1.content_disposition,
        r#"attachment; filename="my best clip.mp4""#
    );
    Ok(())
}

#[tokio::test]
async fn test_prepare_upload_missing_file() {
    let (client, http, storage) = mock_client();

    let err = client
        .prepare_upload("/definitely/not/here/poster.jpg")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FileNotFound);
    assert!(err.is_local());
    assert!(err.to_string().contains("/definitely/not/here/poster.jpg"));
    assert!(http.requests().is_empty());
    assert!(storage.puts().is_empty());
}

#[tokio::test]
async fn test_prepare_upload_directory_is_not_a_file() -> Result<()> {
    let (client, http, _) = mock_client();
    let dir = tempfile::tempdir()?;

    let err = client
        .prepare_upload(&dir.path().to_string_lossy())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileNotFound);
    assert!(http.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_handshake_rejected() -> Result<()> {
    let (client, http, storage) = mock_client();
    http.respond(200, r#"{"success":false,"errors":["uploads disabled"]}"#);
    let (_dir, path) = poster_file()?;

    let err = client.prepare_upload(&path).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Upload);
    assert!(err.to_string().contains("could not initiate file upload"));
    assert!(err.to_string().contains("uploads disabled"));
    assert!(storage.puts().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_handshake_transport_failure() -> Result<()> {
    let ctx = Context::new().with_file_read(TokioFileRead);
    let client = Client::new(ctx, "k", "s").with_storage(MockStorage::default());
    let (_dir, path) = poster_file()?;

    let err = client.prepare_upload(&path).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Upload);
    assert!(err.to_string().starts_with("could not initiate file upload"));
    Ok(())
}

#[tokio::test]
async fn test_storage_denied() -> Result<()> {
    let http = MockHttpSend::default();
    http.respond(200, HANDSHAKE_RESPONSE);
    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(http.clone());
    let client = Client::new(ctx, "k", "s").with_storage(MockStorage::failing(|| {
        Error::credential_denied("AccessDenied")
    }));
    let (_dir, path) = poster_file()?;

    let err = client
        .broadcast_poster(&params(json!({"site": "demo", "id": 1})), Some(&path))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CredentialDenied);
    assert!(err.is_credential_error());
    assert!(!err.is_local());
    // Only the handshake went out.
    assert_eq!(http.requests().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_broadcast_archive_with_file() -> Result<()> {
    let (client, http, storage) = mock_client();
    http.respond(200, HANDSHAKE_RESPONSE);
    http.respond(200, r#"{"success":true,"fileinfo":{"id":991}}"#);
    let (_dir, path) = poster_file()?;

    let resp = client
        .broadcast_archive(&params(json!({"site": "demo", "id": 12})), Some(&path))
        .await?;
    assert_eq!(resp["fileinfo"]["id"], 991);
    assert_eq!(storage.puts().len(), 1);

    let sent = http.requests();
    assert_eq!(sent.len(), 2);
    let archive = &sent[1];
    assert_eq!(archive.method, Method::GET);
    assert_eq!(archive.uri.path(), "/api/client/broadcast/archive");
    assert_eq!(archive.query_get("tmp_file_id").as_deref(), Some("991"));
    assert_eq!(
        archive.query_get("tmp_file_name").as_deref(),
        Some("tmp/5f2a/poster.jpg")
    );
    assert_eq!(archive.query_get("id").as_deref(), Some("12"));

    let mut query = archive.query();
    let (_, signature) = query.pop().unwrap();
    assert_eq!(
        signature,
        sign("s", "GET", "api/client/broadcast/archive", query, None)?
    );
    Ok(())
}

#[tokio::test]
async fn test_non_ascii_file_name_is_rejected() -> Result<()> {
    let (client, http, _) = mock_client();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("affiche-été.jpg");
    std::fs::write(&path, b"content")?;

    let err = client
        .prepare_upload(&path.to_string_lossy())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Upload);
    assert!(http.requests().is_empty());
    Ok(())
}
