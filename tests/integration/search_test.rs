mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{Value, json};

use common::{receive_request, search, send, sqlite_app};

async fn seed(app: &axum::Router) -> Result<()> {
    let payloads = [
        json!({
            "hook_id": "h1", "org_id": "o", "hook_type": "NETWORK_JOIN",
            "network_id": "net-a", "member_id": "mem-1"
        }),
        json!({
            "hook_id": "h2", "org_id": "o", "hook_type": "NETWORK_JOIN",
            "network_id": "net-b", "member_id": "mem-1"
        }),
        json!({
            "hook_id": "h3", "org_id": "o", "hook_type": "NETWORK_CREATED",
            "network_id": "net-a", "user_id": "user-9", "user_email": "u9@example.com",
            "network_config": {"name": "a"}
        }),
    ];

    for payload in &payloads {
        let (status, _) = send(app, receive_request(payload, None)).await?;
        assert_eq!(status, StatusCode::OK);
    }
    Ok(())
}

fn hook_ids(body: &Value) -> Vec<&str> {
    body["events"]
        .as_array()
        .expect("events array")
        .iter()
        .map(|e| e["hook_id"].as_str().unwrap_or_default())
        .collect()
}

#[tokio::test]
async fn test_search_without_criteria_returns_everything() -> Result<()> {
    let (app, _) = sqlite_app().await?;
    seed(&app).await?;

    let (status, body) = search(&app, "").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(hook_ids(&body), vec!["h1", "h2", "h3"]);
    Ok(())
}

#[tokio::test]
async fn test_empty_parameters_are_ignored() -> Result<()> {
    let (app, _) = sqlite_app().await?;
    seed(&app).await?;

    let (_, body) = search(&app, "?network_id=&user_id=&member_id=").await?;

    assert_eq!(hook_ids(&body).len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_search_by_network_id() -> Result<()> {
    let (app, _) = sqlite_app().await?;
    seed(&app).await?;

    let (_, body) = search(&app, "?network_id=net-a").await?;

    assert_eq!(hook_ids(&body), vec!["h1", "h3"]);
    assert_eq!(body["events"][1]["network_config"]["name"], "a");
    Ok(())
}

#[tokio::test]
async fn test_search_combines_criteria() -> Result<()> {
    let (app, _) = sqlite_app().await?;
    seed(&app).await?;

    let (_, body) = search(&app, "?network_id=net-b&member_id=mem-1").await?;

    assert_eq!(hook_ids(&body), vec!["h2"]);
    Ok(())
}

#[tokio::test]
async fn test_user_id_parameter_matches_member_id() -> Result<()> {
    let (app, _) = sqlite_app().await?;
    seed(&app).await?;

    // the parameter is compared against member ids
    let (_, by_member) = search(&app, "?user_id=mem-1").await?;
    assert_eq!(hook_ids(&by_member), vec!["h1", "h2"]);

    // so a real user id finds nothing
    let (status, by_user) = search(&app, "?user_id=user-9").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(hook_ids(&by_user).is_empty());
    Ok(())
}

#[tokio::test]
async fn test_search_with_no_match_returns_empty_list() -> Result<()> {
    let (app, _) = sqlite_app().await?;

    let (status, body) = search(&app, "?network_id=missing").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"events": []}));
    Ok(())
}

#[tokio::test]
async fn test_repeated_parameter_is_rejected_as_json() -> Result<()> {
    let (app, _) = sqlite_app().await?;

    let (status, body) = search(&app, "?network_id=a&network_id=b").await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().starts_with("error reading request"));
    Ok(())
}
