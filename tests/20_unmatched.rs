mod common;

use std::time::Duration;

use anyhow::Result;
use greeter_api::dispatch::{DispatchOptions, UnmatchedPolicy};
use reqwest::StatusCode;

#[tokio::test]
async fn unmatched_path_gets_not_found_by_default() -> Result<()> {
    let server = common::spawn_server(DispatchOptions::default()).await?;

    let res = reqwest::get(server.url("/unmatched")).await?;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await?, "Cannot GET /unmatched");
    assert_eq!(server.sink.lines(), vec!["GET /unmatched"]);
    Ok(())
}

#[tokio::test]
async fn hang_policy_leaves_request_open() -> Result<()> {
    let server = common::spawn_server(DispatchOptions {
        timeout: None,
        unmatched: UnmatchedPolicy::Hang,
    })
    .await?;
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(300))
        .build()?;

    let err = client
        .get(server.url("/unmatched"))
        .send()
        .await
        .expect_err("request should not complete");

    assert!(err.is_timeout(), "unexpected error: {err}");
    assert_eq!(server.sink.lines(), vec!["GET /unmatched"]);
    Ok(())
}

#[tokio::test]
async fn dispatch_timeout_ends_hanging_request() -> Result<()> {
    let server = common::spawn_server(DispatchOptions {
        timeout: Some(Duration::from_millis(100)),
        unmatched: UnmatchedPolicy::Hang,
    })
    .await?;

    let res = reqwest::get(server.url("/unmatched")).await?;

    assert_eq!(res.status(), StatusCode::REQUEST_TIMEOUT);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "REQUEST_TIMEOUT");
    Ok(())
}

#[tokio::test]
async fn hang_policy_still_serves_terminal_routes() -> Result<()> {
    let server = common::spawn_server(DispatchOptions {
        timeout: None,
        unmatched: UnmatchedPolicy::Hang,
    })
    .await?;

    let res = reqwest::get(server.url("/hello")).await?;
    assert_eq!(res.text().await?, "Hello World");
    Ok(())
}
