#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use super::{ContractSession, SendOptions};
use crate::provider::dev_chain::dev_account;
use crate::provider::{DevChain, ProviderEvent, StaticHost};
use crate::registry::{Deployment, DeploymentRegistry};
use crate::social::{methods, FeeSchedule};
use crate::types::{NetworkId, Post, Profile, ProviderKind, SessionStatus, Wei};
use crate::SessionError;
use serde_json::json;
use std::sync::Arc;

const MAINNET: NetworkId = NetworkId::new(1);

fn registry_for(chain: &DevChain, network_id: NetworkId) -> DeploymentRegistry {
    let bundled = DeploymentRegistry::bundled().expect("bundled artifact");
    let interface = bundled
        .networks()
        .next()
        .and_then(|id| bundled.resolve(id))
        .map(|deployment| Arc::clone(deployment.interface()))
        .expect("interface");
    DeploymentRegistry::new().with_deployment(network_id, Deployment::new(chain.contract(), interface))
}

fn given_chain_on(network_id: NetworkId) -> DevChain {
    DevChain::builder(network_id).build()
}

async fn given_ready_session(chain: &DevChain) -> ContractSession<DevChain> {
    let session = ContractSession::connect(
        &StaticHost::injected(chain.clone()),
        registry_for(chain, MAINNET),
    )
    .await;
    assert_eq!(session.status(), SessionStatus::Ready);
    session
}

#[tokio::test]
async fn when_no_provider_is_present_then_status_is_provider_missing() {
    let host: StaticHost<DevChain> = StaticHost::empty();
    let mut session = ContractSession::new(DeploymentRegistry::new());

    assert_eq!(session.status(), SessionStatus::Uninitialized);
    let status = session.initialize(&host).await;

    assert_eq!(status, SessionStatus::ProviderMissing);
    assert!(session.session().binding().is_none());
    assert!(matches!(
        session.call(methods::GET_POST, vec![json!(1)]).await,
        Err(SessionError::NotReady(SessionStatus::ProviderMissing))
    ));
    assert!(matches!(
        session
            .send(methods::CREATE_POST, vec![json!("x")], SendOptions::default())
            .await,
        Err(SessionError::NotReady(SessionStatus::ProviderMissing))
    ));
}

#[tokio::test]
async fn when_user_rejects_access_then_account_denied_and_no_further_requests() {
    let chain = DevChain::builder(MAINNET).approve_accounts(false).build();
    let session = ContractSession::connect(
        &StaticHost::injected(chain.clone()),
        registry_for(&chain, MAINNET),
    )
    .await;

    assert_eq!(session.status(), SessionStatus::AccountDenied);
    assert_eq!(chain.request_count(), 1);

    let _ = session.call(methods::GET_POST, vec![json!(1)]).await;
    assert_eq!(chain.request_count(), 1);
}

#[tokio::test]
async fn when_network_has_no_registry_entry_then_contract_unresolved() {
    let chain = given_chain_on(NetworkId::new(42));
    let session = ContractSession::connect(
        &StaticHost::injected(chain.clone()),
        registry_for(&chain, MAINNET),
    )
    .await;

    assert_eq!(session.status(), SessionStatus::ContractUnresolved);
    assert_eq!(session.session().network_id(), Some(NetworkId::new(42)));
    assert!(session.session().binding().is_none());
}

#[tokio::test]
async fn when_network_query_fails_then_network_unsupported() {
    let chain = given_chain_on(MAINNET);
    chain.set_network_query_failure(true).await;

    let session = ContractSession::connect(
        &StaticHost::injected(chain.clone()),
        registry_for(&chain, MAINNET),
    )
    .await;

    assert_eq!(session.status(), SessionStatus::NetworkUnsupported);
}

#[tokio::test]
async fn when_registry_has_entry_for_network_one_then_ready_and_profiles_readable() {
    let chain = given_chain_on(MAINNET);
    let session = given_ready_session(&chain).await;
    let account = session.active_account().expect("active account");

    let raw = session
        .call(methods::PROFILES, vec![json!(account.to_string())])
        .await
        .expect("profiles call");
    let profile: Profile = serde_json::from_value(raw).expect("profile shape");

    assert_eq!(account, dev_account(0));
    assert_eq!(session.session().provider_kind(), Some(ProviderKind::Injected));
    assert!(profile.is_blank());
}

#[tokio::test]
async fn when_post_is_created_then_get_post_reflects_content() {
    let chain = given_chain_on(MAINNET);
    let session = given_ready_session(&chain).await;

    let submission = session
        .send(
            methods::CREATE_POST,
            vec![json!("hello")],
            SendOptions::paying(Wei::from_decimal("0.01").expect("amount")),
        )
        .await
        .expect("createPost submitted");
    assert_eq!(submission.from, dev_account(0));

    let raw = session
        .call(methods::GET_POST, vec![json!(1)])
        .await
        .expect("getPost");
    let post: Post = serde_json::from_value(raw).expect("post shape");

    assert_eq!(post.content, "hello");
    assert_eq!(post.creator, dev_account(0));
}

#[tokio::test]
async fn repeated_reads_without_sends_are_equal() {
    let chain = given_chain_on(MAINNET);
    let session = given_ready_session(&chain).await;
    session
        .send(
            methods::CREATE_POST,
            vec![json!("stable")],
            SendOptions::paying(Wei::from_decimal("0.01").expect("amount")),
        )
        .await
        .expect("createPost");

    let first = session.call(methods::GET_POST, vec![json!(1)]).await.expect("first");
    let second = session.call(methods::GET_POST, vec![json!(1)]).await.expect("second");

    assert_eq!(first, second);
}

#[tokio::test]
async fn when_initialize_runs_twice_then_provider_is_not_asked_again() {
    let chain = given_chain_on(MAINNET);
    let host = StaticHost::injected(chain.clone());
    let mut session = ContractSession::new(registry_for(&chain, MAINNET));

    session.initialize(&host).await;
    let requests = chain.request_count();
    let status = session.initialize(&host).await;

    assert_eq!(status, SessionStatus::Ready);
    assert_eq!(chain.request_count(), requests);
}

#[tokio::test]
async fn when_uninitialized_then_operations_fail_without_round_trip() {
    let chain = given_chain_on(MAINNET);
    let session: ContractSession<DevChain> = ContractSession::new(registry_for(&chain, MAINNET));

    let call = session.call(methods::GET_POST, vec![json!(1)]).await;
    let accounts = session.accounts().await;

    assert!(matches!(
        call,
        Err(SessionError::NotReady(SessionStatus::Uninitialized))
    ));
    assert!(matches!(accounts, Err(SessionError::NotReady(_))));
    assert_eq!(chain.request_count(), 0);
}

#[tokio::test]
async fn when_transaction_is_rejected_then_failure_is_reported_and_session_stays_ready() {
    let chain = given_chain_on(MAINNET);
    let session = given_ready_session(&chain).await;
    chain.set_reject_transactions(true).await;

    let result = session
        .send(
            methods::UPDATE_USER_PROFILE,
            vec![json!("ada"), json!("bio")],
            SendOptions::default(),
        )
        .await;

    match result {
        Err(SessionError::TransactionFailed(reason)) => {
            assert!(reason.contains("rejected"), "{reason}");
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert_eq!(session.status(), SessionStatus::Ready);
}

#[tokio::test]
async fn when_contract_address_has_no_code_then_query_failed() {
    let chain = given_chain_on(MAINNET);
    let other = DevChain::builder(MAINNET)
        .contract(dev_account(9))
        .build();
    let session = ContractSession::connect(
        &StaticHost::injected(chain.clone()),
        registry_for(&other, MAINNET),
    )
    .await;

    let result = session.call(methods::GET_POST, vec![json!(1)]).await;

    assert!(matches!(result, Err(SessionError::QueryFailed(_))));
    assert_eq!(session.status(), SessionStatus::Ready);
}

#[tokio::test]
async fn when_invocation_is_malformed_then_provider_is_not_contacted() {
    let chain = given_chain_on(MAINNET);
    let session = given_ready_session(&chain).await;
    let before = chain.request_count();

    let unknown = session.call("getPosts", vec![]).await;
    let unpaid_view = session
        .send(
            methods::GET_POST,
            vec![json!(1)],
            SendOptions::paying(Wei::new(1)),
        )
        .await;

    assert!(matches!(unknown, Err(SessionError::InvalidInvocation(_))));
    assert!(matches!(unpaid_view, Err(SessionError::InvalidInvocation(_))));
    assert_eq!(chain.request_count(), before);
}

#[tokio::test]
async fn concurrent_sends_are_both_submitted() {
    let chain = given_chain_on(MAINNET);
    let session = given_ready_session(&chain).await;
    let fee = SendOptions::paying(Wei::from_decimal("0.01").expect("amount"));

    let (a, b) = futures_util::future::join(
        session.send(methods::CREATE_POST, vec![json!("a")], fee),
        session.send(methods::CREATE_POST, vec![json!("b")], fee),
    )
    .await;

    assert!(a.is_ok() && b.is_ok());
    assert_ne!(a.map(|s| s.hash).ok(), b.map(|s| s.hash).ok());
    assert_eq!(chain.post_count().await, 2);
}

#[tokio::test]
async fn legacy_provider_skips_the_access_request() {
    let chain = DevChain::builder(MAINNET)
        .approve_accounts(false)
        .legacy()
        .build();
    let session = ContractSession::connect(
        &StaticHost::legacy(chain.clone()),
        registry_for(&chain, MAINNET),
    )
    .await;

    assert_eq!(session.status(), SessionStatus::Ready);
    assert_eq!(session.session().provider_kind(), Some(ProviderKind::Legacy));
}

#[tokio::test]
async fn when_account_switches_then_sends_use_the_new_account() {
    let chain = given_chain_on(MAINNET);
    let host = StaticHost::injected(chain.clone());
    let mut session = ContractSession::connect(&host, registry_for(&chain, MAINNET)).await;

    let event = chain
        .select_account(dev_account(1))
        .await
        .expect("known account");
    let status = session.handle_event(event, &host).await;

    let submission = session
        .send(
            methods::UPDATE_USER_PROFILE,
            vec![json!("bob"), json!("")],
            SendOptions::default(),
        )
        .await
        .expect("update");

    assert_eq!(status, SessionStatus::Ready);
    assert_eq!(submission.from, dev_account(1));
}

#[tokio::test]
async fn when_chain_switches_to_unknown_network_then_session_reloads_unresolved() {
    let chain = given_chain_on(MAINNET);
    let host = StaticHost::injected(chain.clone());
    let mut session = ContractSession::connect(&host, registry_for(&chain, MAINNET)).await;

    let event = chain.set_network_id(NetworkId::new(5)).await;
    let status = session.handle_event(event, &host).await;

    assert_eq!(status, SessionStatus::ContractUnresolved);
    assert_eq!(session.session().network_id(), Some(NetworkId::new(5)));
}

#[tokio::test]
async fn when_chain_switches_to_another_registered_network_then_its_deployment_is_used() {
    let registry = DeploymentRegistry::bundled().expect("bundled artifact");
    let dev = NetworkId::new(1337);
    let ganache = NetworkId::new(5777);
    let dev_address = registry.resolve(dev).map(Deployment::address).expect("1337");
    let ganache_address = registry.resolve(ganache).map(Deployment::address).expect("5777");
    let chain = DevChain::builder(dev)
        .contract(dev_address)
        .deploy(ganache, ganache_address)
        .build();
    let host = StaticHost::injected(chain.clone());
    let mut session = ContractSession::connect(&host, registry).await;

    let event = chain.set_network_id(ganache).await;
    let status = session.handle_event(event, &host).await;

    assert_eq!(status, SessionStatus::Ready);
    assert_eq!(
        session.session().binding().map(Deployment::address),
        Some(ganache_address)
    );
    session
        .send(
            methods::CREATE_POST,
            vec![json!("gm")],
            SendOptions::paying(FeeSchedule::default().create_post),
        )
        .await
        .expect("post on 5777");
    let raw = session
        .call(methods::GET_POST, vec![json!(1)])
        .await
        .expect("read on 5777");
    let post: Post = serde_json::from_value(raw).expect("post");
    assert_eq!(post.content, "gm");
    assert_eq!(chain.balance_of(ganache_address).await, FeeSchedule::default().create_post);
}

#[tokio::test]
async fn when_accounts_are_revoked_then_reload_ends_denied() {
    let chain = given_chain_on(MAINNET);
    let host = StaticHost::injected(chain.clone());
    let mut session = ContractSession::connect(&host, registry_for(&chain, MAINNET)).await;

    chain.set_approve_accounts(false).await;
    let status = session
        .handle_event(ProviderEvent::AccountsChanged { accounts: vec![] }, &host)
        .await;

    assert_eq!(status, SessionStatus::AccountDenied);
}

#[tokio::test]
async fn events_are_ignored_until_ready() {
    let host: StaticHost<DevChain> = StaticHost::empty();
    let mut session = ContractSession::connect(&host, DeploymentRegistry::new()).await;

    let status = session
        .handle_event(
            ProviderEvent::ChainChanged {
                network_id: MAINNET,
            },
            &host,
        )
        .await;

    assert_eq!(status, SessionStatus::ProviderMissing);
}

#[tokio::test]
async fn snapshot_exposes_binding_address() {
    let chain = given_chain_on(MAINNET);
    let session = given_ready_session(&chain).await;
    let snapshot = session.session().snapshot();

    assert_eq!(snapshot.status, SessionStatus::Ready);
    assert_eq!(snapshot.contract, Some(chain.contract()));
    assert_eq!(snapshot.network_id, Some(MAINNET));
}
