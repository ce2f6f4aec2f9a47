//! End-to-end session scenarios through the public library surface.

use anyhow::{ensure, Context, Result};
use chainpost::provider::dev_chain::dev_account;
use chainpost::{
    ContractSession, DeploymentRegistry, DevChain, FeeSchedule, NetworkId, PostId, SessionError,
    SessionStatus, SocialClient, StaticHost,
};

const DEV_NETWORK: NetworkId = NetworkId::new(1337);

fn bundled_address(registry: &DeploymentRegistry, network_id: NetworkId) -> Result<chainpost::Address> {
    registry
        .resolve(network_id)
        .map(chainpost::Deployment::address)
        .context("bundled artifact has no deployment for the dev network")
}

async fn given_ready_dev_session() -> Result<(DevChain, ContractSession<DevChain>)> {
    let registry = DeploymentRegistry::bundled()?;
    let chain = DevChain::builder(DEV_NETWORK)
        .contract(bundled_address(&registry, DEV_NETWORK)?)
        .build();
    let session = ContractSession::connect(&StaticHost::injected(chain.clone()), registry).await;
    ensure!(
        session.status() == SessionStatus::Ready,
        "expected ready session, got {}",
        session.status()
    );
    Ok((chain, session))
}

#[tokio::test]
async fn bundled_artifact_binds_on_dev_network() -> Result<()> {
    let (chain, session) = given_ready_dev_session().await?;

    let snapshot = session.session().snapshot();
    assert_eq!(snapshot.contract, Some(chain.contract()));
    assert_eq!(snapshot.active_account, Some(dev_account(0)));
    Ok(())
}

#[tokio::test]
async fn posting_liking_and_commenting_moves_fees_to_contract() -> Result<()> {
    let (chain, session) = given_ready_dev_session().await?;
    let fees = FeeSchedule::default();
    let social = SocialClient::new(&session, fees);

    social.create_post("gm").await?;
    social.like_post(PostId::new(1)).await?;
    social.comment_on_post(PostId::new(1), "gm gm").await?;

    let expected = fees
        .create_post
        .saturating_add(fees.like_post)
        .saturating_add(fees.comment_on_post);
    assert_eq!(chain.balance_of(chain.contract()).await, expected);
    assert_eq!(expected.to_string(), "0.02");

    let post = social.get_post(PostId::new(1)).await?;
    assert_eq!(post.like_count, 1);
    assert_eq!(post.comments, vec!["gm gm".to_string()]);
    Ok(())
}

#[tokio::test]
async fn unknown_network_leaves_session_unresolved() -> Result<()> {
    let registry = DeploymentRegistry::bundled()?;
    let chain = DevChain::builder(NetworkId::new(3)).build();

    let session = ContractSession::connect(&StaticHost::injected(chain), registry).await;

    assert_eq!(session.status(), SessionStatus::ContractUnresolved);
    let social = SocialClient::new(&session, FeeSchedule::default());
    let result = social.feed(3).await;
    ensure!(
        matches!(
            result,
            Err(SessionError::NotReady(SessionStatus::ContractUnresolved))
        ),
        "unexpected feed result {result:?}"
    );
    Ok(())
}

#[tokio::test]
async fn second_network_in_artifact_is_resolvable() -> Result<()> {
    let registry = DeploymentRegistry::bundled()?;
    let networks: Vec<_> = registry.networks().collect();

    assert!(networks.contains(&NetworkId::new(1337)));
    assert!(networks.contains(&NetworkId::new(5777)));
    assert_eq!(registry.contract_name(), Some("SocialMediaPlatform"));
    Ok(())
}

#[tokio::test]
async fn artifact_loaded_from_disk_matches_bundled() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("SocialMediaPlatform.json");
    std::fs::write(&path, chainpost::registry::BUNDLED_ARTIFACT)?;

    let loaded = DeploymentRegistry::load(&path).await?;
    let bundled = DeploymentRegistry::bundled()?;

    assert_eq!(
        bundled_address(&loaded, DEV_NETWORK)?,
        bundled_address(&bundled, DEV_NETWORK)?
    );
    Ok(())
}
