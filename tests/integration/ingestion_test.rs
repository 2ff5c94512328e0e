mod common;

use anyhow::Result;
use axum::http::StatusCode;
use chrono::Utc;
use serde_json::json;
use tower::ServiceExt;

use common::{SECRET, memory_app, receive_request, send, sqlite_app};
use zt_event_logger::events::sign_payload;
use zt_event_logger::middleware::REQUEST_ID_HEADER;

fn network_join() -> serde_json::Value {
    json!({
        "hook_id": "abc123",
        "org_id": "org456",
        "hook_type": "NETWORK_JOIN",
        "network_id": "net789",
        "member_id": "mem012"
    })
}

#[tokio::test]
async fn test_receive_network_join_without_key() -> Result<()> {
    let (app, store) = memory_app(None);

    let (status, body) = send(&app, receive_request(&network_join(), None)).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Event received and logged successfully");
    assert_eq!(body["hook_id"], "abc123");
    assert_eq!(body["org_id"], "org456");
    assert_eq!(body["hook_type"], "NETWORK_JOIN");

    let stored = store.snapshot().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].network_id, "net789");
    assert_eq!(stored[0].member_id.as_deref(), Some("mem012"));
    assert!(stored[0].user_id.is_none());
    Ok(())
}

#[tokio::test]
async fn test_unknown_event_is_rejected() -> Result<()> {
    let (app, store) = memory_app(None);
    let mut payload = network_join();
    payload["hook_type"] = json!("UNKNOWN_EVENT");

    let (status, body) = send(&app, receive_request(&payload, None)).await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "unhandled event type: UNKNOWN_EVENT");
    assert!(store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn test_malformed_body_is_rejected() -> Result<()> {
    let (app, store) = memory_app(None);
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/events/receive")
        .body(axum::body::Body::from("{not json"))?;

    let (status, body) = send(&app, request).await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("hook type"));
    assert!(store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn test_array_body_is_rejected() -> Result<()> {
    let (app, store) = memory_app(None);

    for payload in [json!(["NETWORK_JOIN"]), json!(["UNKNOWN_EVENT"])] {
        let (status, body) = send(&app, receive_request(&payload, None)).await?;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("hook type"));
    }
    assert!(store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn test_oversized_body_is_rejected_as_json() -> Result<()> {
    let (app, store) = memory_app(None);
    let mut payload = network_join();
    payload["padding"] = json!("x".repeat(3 * 1024 * 1024));

    let (status, body) = send(&app, receive_request(&payload, None)).await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().starts_with("error reading request"));
    assert!(store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn test_rejection_carries_request_id() -> Result<()> {
    let (app, _) = memory_app(None);
    let response = app
        .oneshot(receive_request(&json!({"hook_id": "h"}), None))
        .await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    Ok(())
}

#[tokio::test]
async fn test_signed_delivery_is_accepted() -> Result<()> {
    let (app, store) = memory_app(Some(SECRET));
    let payload = network_join();
    let signature = sign_payload(payload.to_string().as_bytes(), SECRET, Utc::now().timestamp())?;

    let (status, _) = send(&app, receive_request(&payload, Some(&signature))).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.len().await, 1);
    Ok(())
}

#[tokio::test]
async fn test_tampered_delivery_is_rejected() -> Result<()> {
    let (app, store) = memory_app(Some(SECRET));
    let payload = network_join();
    let signature = sign_payload(payload.to_string().as_bytes(), SECRET, Utc::now().timestamp())?;

    let mut tampered = payload.clone();
    tampered["member_id"] = json!("someone-else");

    let (status, body) = send(&app, receive_request(&tampered, Some(&signature))).await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("signature verification failed")
    );
    assert!(store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn test_stale_signature_is_rejected() -> Result<()> {
    let (app, store) = memory_app(Some(SECRET));
    let payload = network_join();
    let an_hour_ago = Utc::now().timestamp() - 3600;
    let signature = sign_payload(payload.to_string().as_bytes(), SECRET, an_hour_ago)?;

    let (status, _) = send(&app, receive_request(&payload, Some(&signature))).await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn test_missing_header_with_key_configured_is_accepted() -> Result<()> {
    let (app, store) = memory_app(Some(SECRET));

    let (status, _) = send(&app, receive_request(&network_join(), None)).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.len().await, 1);
    Ok(())
}

#[tokio::test]
async fn test_network_config_changed_persists_to_sqlite() -> Result<()> {
    let (app, store) = sqlite_app().await?;
    let payload = json!({
        "hook_id": "h-cfg",
        "org_id": "org1",
        "hook_type": "NETWORK_CONFIG_CHANGED",
        "network_id": "net1",
        "user_id": "user1",
        "user_email": "user1@example.com",
        "old_config": {"name": "before", "private": true},
        "new_config": {"name": "after", "private": false},
        "network_metadata": {"authorizedMemberCount": 3}
    });

    let (status, body) = send(&app, receive_request(&payload, None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hook_type"], "NETWORK_CONFIG_CHANGED");

    let stored = store
        .search(&zt_event_logger::models::SearchCriteria::new())
        .await?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, Some(1));
    assert_eq!(stored[0].old_config.as_ref().unwrap()["name"], "before");
    assert_eq!(stored[0].new_config.as_ref().unwrap()["private"], false);
    assert_eq!(stored[0].metadata.as_ref().unwrap()["authorizedMemberCount"], 3);
    assert!(stored[0].network_config.is_none());
    Ok(())
}

#[tokio::test]
async fn test_health_reports_store() -> Result<()> {
    let (app, _) = sqlite_app().await?;
    let request = axum::http::Request::builder()
        .uri("/health")
        .body(axum::body::Body::empty())?;

    let (status, body) = send(&app, request).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "test");
    assert_eq!(body["dependencies"][0]["name"], "event_store");
    Ok(())
}
