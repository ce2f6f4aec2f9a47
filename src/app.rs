#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use crate::config::{Config, ProviderChoice};
use chainpost::{
    ContractSession, DeploymentRegistry, DevChain, FeeSchedule, Result, SessionError,
    SessionStatus, SocialClient, StaticHost,
};
use tracing::{debug, info};

/// One process is one page load: a host, the session bound through it, and
/// the fees the user agreed to pay.
pub struct App {
    session: ContractSession<DevChain>,
    host: StaticHost<DevChain>,
    chain: Option<DevChain>,
    fees: FeeSchedule,
}

impl App {
    /// Loads the registry, builds the host the config describes and runs
    /// session initialization once.
    ///
    /// # Errors
    /// Returns `ConfigError`/`IoError` if the deployment artifact cannot be
    /// loaded. Initialization failures are not errors; they show up in the
    /// session status.
    pub async fn start(config: &Config) -> Result<Self> {
        let registry = match &config.artifact {
            Some(path) => {
                debug!("Loading deployment artifact from {}", path.display());
                DeploymentRegistry::load(path).await?
            }
            None => DeploymentRegistry::bundled()?,
        };

        let chain = match config.provider {
            ProviderChoice::None => None,
            ProviderChoice::Dev | ProviderChoice::Legacy => Some(dev_chain(config, &registry)),
        };
        let host = match (config.provider, chain.clone()) {
            (ProviderChoice::Legacy, Some(chain)) => StaticHost::legacy(chain),
            (_, Some(chain)) => StaticHost::injected(chain),
            (_, None) => StaticHost::empty(),
        };

        let session = ContractSession::connect(&host, registry).await;
        info!("Session settled as {}", session.status());

        Ok(Self {
            session,
            host,
            chain,
            fees: config.fees,
        })
    }

    #[must_use]
    pub const fn session(&self) -> &ContractSession<DevChain> {
        &self.session
    }

    #[must_use]
    pub const fn social(&self) -> SocialClient<'_, DevChain> {
        SocialClient::new(&self.session, self.fees)
    }

    /// Contract commands need a ready session; otherwise the failure that
    /// stopped initialization is reported instead of a bare precondition.
    ///
    /// # Errors
    /// The error matching the session's terminal status.
    pub fn require_ready(&self) -> Result<()> {
        let session = self.session.session();
        match session.status() {
            SessionStatus::Ready => Ok(()),
            status => Err(SessionError::from_status(status, session.network_id())),
        }
    }

    /// # Errors
    /// Returns `ProviderMissing` when the host has no provider to drive.
    pub fn chain(&self) -> Result<&DevChain> {
        self.chain.as_ref().ok_or(SessionError::ProviderMissing)
    }

    /// Feeds a provider-originated event into the session.
    pub async fn apply_event(&mut self, event: chainpost::ProviderEvent) -> SessionStatus {
        self.session.handle_event(event, &self.host).await
    }
}

fn dev_chain(config: &Config, registry: &DeploymentRegistry) -> DevChain {
    let builder = DevChain::builder(config.network_id).approve_accounts(config.approve_accounts);
    let builder = match config.provider {
        ProviderChoice::Legacy => builder.legacy(),
        ProviderChoice::Dev | ProviderChoice::None => builder,
    };
    // Every registered network gets its deployment so a wallet network
    // switch lands on a contract with code.
    registry
        .networks()
        .filter_map(|network_id| {
            registry
                .resolve(network_id)
                .map(|deployment| (network_id, deployment.address()))
        })
        .fold(builder, |builder, (network_id, address)| {
            builder.deploy(network_id, address)
        })
        .build()
}
