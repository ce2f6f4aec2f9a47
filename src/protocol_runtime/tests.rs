#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use super::process_protocol_line;
use crate::app::App;
use crate::config::{Config, ProviderChoice};
use chainpost::code;
use serde_json::{json, Value};

async fn given_app(config: Config) -> App {
    App::start(&config).await.expect("app starts")
}

async fn when_line(app: &mut App, line: &str) -> Value {
    let envelope = process_protocol_line(app, line).await;
    serde_json::to_value(&envelope).expect("envelope serializes")
}

#[tokio::test]
async fn given_dev_provider_when_status_then_session_is_ready() {
    let mut app = given_app(Config::default()).await;

    let out = when_line(&mut app, r#"{"cmd":"status","rid":"s-1"}"#).await;

    assert_eq!(out["ok"], json!(true));
    assert_eq!(out["rid"], json!("s-1"));
    assert_eq!(out["d"]["status"], json!("ready"));
    assert_eq!(out["state"]["network_id"], json!(1337));
    assert!(out["ms"].is_i64());
}

#[tokio::test]
async fn when_post_is_created_then_later_line_reads_it_back() {
    let mut app = given_app(Config::default()).await;

    let created = when_line(&mut app, r#"{"cmd":"create-post","content":"hello"}"#).await;
    let read = when_line(&mut app, r#"{"cmd":"get-post","post_id":1}"#).await;

    assert_eq!(created["ok"], json!(true));
    assert_eq!(created["d"]["method"], json!("createPost"));
    assert_eq!(created["d"]["value"], json!("10000000000000000"));
    assert_eq!(read["d"]["post"]["content"], json!("hello"));
}

#[tokio::test]
async fn when_request_has_no_rid_then_one_is_generated() {
    let mut app = given_app(Config::default()).await;

    let out = when_line(&mut app, r#"{"cmd":"help"}"#).await;

    let rid = out["rid"].as_str().expect("rid");
    assert!(uuid::Uuid::parse_str(rid).is_ok());
    assert!(out["d"]["commands"]["create-post"].is_string());
}

#[tokio::test]
async fn given_no_provider_when_contract_command_then_provider_missing() {
    let mut app = given_app(Config {
        provider: ProviderChoice::None,
        ..Config::default()
    })
    .await;

    let out = when_line(&mut app, r#"{"cmd":"feed"}"#).await;

    assert_eq!(out["ok"], json!(false));
    assert_eq!(out["err"]["code"], json!(code::NO_PROVIDER));
    assert_eq!(out["err"]["msg"], json!("No web3 provider detected"));
    assert_eq!(out["state"]["status"], json!("provider_missing"));
}

#[tokio::test]
async fn when_required_field_is_missing_then_invalid() {
    let mut app = given_app(Config::default()).await;

    let out = when_line(&mut app, r#"{"cmd":"comment","post_id":1}"#).await;

    assert_eq!(out["err"]["code"], json!(code::INVALID));
    assert!(out["err"]["msg"]
        .as_str()
        .is_some_and(|m| m.contains("content")));
}

#[tokio::test]
async fn when_command_is_misspelled_then_suggestion_is_offered() {
    let mut app = given_app(Config::default()).await;

    let out = when_line(&mut app, r#"{"cmd":"get-psot"}"#).await;

    assert_eq!(out["ok"], json!(false));
    assert!(out["err"]["msg"]
        .as_str()
        .is_some_and(|m| m.contains("did you mean 'get-post'")));
    assert_eq!(out["err"]["ctx"]["cmd"], json!("get-psot"));
}

#[tokio::test]
async fn when_feed_limit_is_too_large_then_invalid_without_reads() {
    let mut app = given_app(Config::default()).await;
    let before = app.chain().expect("dev chain").request_count();

    let out = when_line(&mut app, r#"{"cmd":"feed","limit":1000000}"#).await;

    assert_eq!(out["ok"], json!(false));
    assert_eq!(out["err"]["code"], json!(code::INVALID));
    assert_eq!(app.chain().expect("dev chain").request_count(), before);
}

#[tokio::test]
async fn when_line_is_not_json_then_invalid_with_fix() {
    let mut app = given_app(Config::default()).await;

    let out = when_line(&mut app, "status please").await;

    assert_eq!(out["err"]["code"], json!(code::INVALID));
    assert!(out["fix"].is_string());
}

#[tokio::test]
async fn when_wallet_switches_to_unknown_network_then_session_reloads_unresolved() {
    let mut app = given_app(Config::default()).await;

    let switched = when_line(&mut app, r#"{"cmd":"switch-network","network_id":"42"}"#).await;
    let feed = when_line(&mut app, r#"{"cmd":"feed"}"#).await;

    assert_eq!(switched["d"]["status"], json!("contract_unresolved"));
    assert_eq!(feed["err"]["code"], json!(code::UNRESOLVED));
}

#[tokio::test]
async fn when_wallet_switches_to_second_registered_network_then_contract_is_usable() {
    let mut app = given_app(Config::default()).await;
    when_line(&mut app, r#"{"cmd":"create-post","content":"on 1337"}"#).await;

    let switched = when_line(&mut app, r#"{"cmd":"switch-network","network_id":"5777"}"#).await;
    let created = when_line(&mut app, r#"{"cmd":"create-post","content":"on 5777"}"#).await;
    let read = when_line(&mut app, r#"{"cmd":"get-post","post_id":1}"#).await;
    let gap = when_line(&mut app, r#"{"cmd":"get-post","post_id":2}"#).await;

    assert_eq!(switched["d"]["status"], json!("ready"));
    assert_eq!(switched["state"]["network_id"], json!(5777));
    assert_eq!(created["ok"], json!(true));
    assert_eq!(read["d"]["post"]["content"], json!("on 5777"));
    assert_eq!(gap["d"]["post"]["content"], json!(""));
}

#[tokio::test]
async fn given_accounts_not_approved_when_profile_then_denied() {
    let mut app = given_app(Config {
        approve_accounts: false,
        ..Config::default()
    })
    .await;

    let out = when_line(&mut app, r#"{"cmd":"profile"}"#).await;

    assert_eq!(out["err"]["code"], json!(code::DENIED));
}

#[tokio::test]
async fn when_profile_is_updated_then_profile_shows_it() {
    let mut app = given_app(Config::default()).await;

    when_line(
        &mut app,
        r#"{"cmd":"update-profile","username":"ada","bio":"writes code"}"#,
    )
    .await;
    let out = when_line(&mut app, r#"{"cmd":"profile"}"#).await;

    assert_eq!(out["d"]["profile"]["username"], json!("ada"));
    assert_eq!(out["d"]["profile"]["bio"], json!("writes code"));
}
