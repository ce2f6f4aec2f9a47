#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! Provider connection and contract binding for one page load.

use crate::provider::{CallRequest, Provider, ProviderEvent, ProviderHost, TransactionRequest};
use crate::registry::{Deployment, DeploymentRegistry};
use crate::types::{Address, NetworkId, ProviderKind, SessionStatus, TxHash, Wei};
use crate::{Result, SessionError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Session state. Fields only change through [`ContractSession`].
#[derive(Debug, Clone)]
pub struct Session {
    status: SessionStatus,
    provider_kind: Option<ProviderKind>,
    active_account: Option<Address>,
    network_id: Option<NetworkId>,
    binding: Option<Deployment>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            status: SessionStatus::Uninitialized,
            provider_kind: None,
            active_account: None,
            network_id: None,
            binding: None,
        }
    }
}

impl Session {
    fn ready(
        kind: ProviderKind,
        account: Address,
        network_id: NetworkId,
        binding: Deployment,
    ) -> Self {
        Self {
            status: SessionStatus::Ready,
            provider_kind: Some(kind),
            active_account: Some(account),
            network_id: Some(network_id),
            binding: Some(binding),
        }
    }

    fn failed(
        status: SessionStatus,
        kind: Option<ProviderKind>,
        network_id: Option<NetworkId>,
    ) -> Self {
        Self {
            status,
            provider_kind: kind,
            active_account: None,
            network_id,
            binding: None,
        }
    }

    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub const fn provider_kind(&self) -> Option<ProviderKind> {
        self.provider_kind
    }

    #[must_use]
    pub const fn active_account(&self) -> Option<Address> {
        self.active_account
    }

    #[must_use]
    pub const fn network_id(&self) -> Option<NetworkId> {
        self.network_id
    }

    #[must_use]
    pub const fn binding(&self) -> Option<&Deployment> {
        self.binding.as_ref()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            provider: self.provider_kind,
            active_account: self.active_account,
            network_id: self.network_id,
            contract: self.binding.as_ref().map(Deployment::address),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub provider: Option<ProviderKind>,
    pub active_account: Option<Address>,
    pub network_id: Option<NetworkId>,
    pub contract: Option<Address>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub value: Option<Wei>,
}

impl SendOptions {
    #[must_use]
    pub const fn paying(value: Wei) -> Self {
        Self { value: Some(value) }
    }
}

/// Acknowledgement that the provider accepted a transaction for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSubmission {
    pub hash: TxHash,
    pub from: Address,
    pub to: Address,
    pub method: String,
    pub value: Wei,
}

struct Connected {
    account: Address,
    network_id: NetworkId,
    deployment: Deployment,
}

struct Failed {
    status: SessionStatus,
    network_id: Option<NetworkId>,
}

impl Failed {
    const fn at(status: SessionStatus) -> Self {
        Self {
            status,
            network_id: None,
        }
    }
}

pub struct ContractSession<P> {
    registry: DeploymentRegistry,
    provider: Option<P>,
    session: Session,
}

impl<P> ContractSession<P>
where
    P: Provider + Send + Sync,
{
    #[must_use]
    pub fn new(registry: DeploymentRegistry) -> Self {
        Self {
            registry,
            provider: None,
            session: Session::default(),
        }
    }

    /// Creates a session and runs initialization against `host`.
    pub async fn connect<H>(host: &H, registry: DeploymentRegistry) -> Self
    where
        H: ProviderHost<Provider = P>,
    {
        let mut session = Self::new(registry);
        session.initialize(host).await;
        session
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.session.status
    }

    #[must_use]
    pub const fn active_account(&self) -> Option<Address> {
        self.session.active_account
    }

    #[must_use]
    pub const fn registry(&self) -> &DeploymentRegistry {
        &self.registry
    }

    /// Brings the session from `Uninitialized` to `Ready` or to the first
    /// failing step's status. Runs at most once; later calls return the
    /// settled status without touching the provider.
    pub async fn initialize<H>(&mut self, host: &H) -> SessionStatus
    where
        H: ProviderHost<Provider = P>,
    {
        if self.session.status.is_terminal() {
            warn!(
                "Session already initialized with status {}",
                self.session.status
            );
            return self.session.status;
        }

        let Some(detected) = host.detect() else {
            info!("No web3 provider detected");
            self.session = Session::failed(SessionStatus::ProviderMissing, None, None);
            return self.session.status;
        };

        let kind = detected.kind;
        debug!("Detected {kind} provider");
        match establish(&detected.provider, kind, &self.registry).await {
            Ok(connected) => {
                info!(
                    "Session ready: account {} on network {} bound to {}",
                    connected.account,
                    connected.network_id,
                    connected.deployment.address()
                );
                self.session = Session::ready(
                    kind,
                    connected.account,
                    connected.network_id,
                    connected.deployment,
                );
                self.provider = Some(detected.provider);
            }
            Err(failed) => {
                warn!("Session initialization stopped at {}", failed.status);
                self.session = Session::failed(failed.status, Some(kind), failed.network_id);
            }
        }

        self.session.status
    }

    /// Drops the provider and binding, as leaving the page would.
    pub fn teardown(&mut self) {
        if self.session.status.is_terminal() {
            debug!("Tearing down session in status {}", self.session.status);
        }
        self.provider = None;
        self.session = Session::default();
    }

    /// Reacts to a change reported by the provider. Only a ready session
    /// listens; in-flight operations are not affected.
    pub async fn handle_event<H>(&mut self, event: ProviderEvent, host: &H) -> SessionStatus
    where
        H: ProviderHost<Provider = P>,
    {
        if !self.session.status.is_ready() {
            debug!("Ignoring provider event while {}", self.session.status);
            return self.session.status;
        }

        match event {
            ProviderEvent::AccountsChanged { accounts } => {
                if let Some(account) = accounts.first() {
                    info!("Active account switched to {account}");
                    self.session.active_account = Some(*account);
                    self.session.status
                } else {
                    info!("Provider revoked account access, reloading session");
                    self.reload(host).await
                }
            }
            ProviderEvent::ChainChanged { network_id } => {
                info!("Provider switched to network {network_id}, reloading session");
                self.reload(host).await
            }
        }
    }

    async fn reload<H>(&mut self, host: &H) -> SessionStatus
    where
        H: ProviderHost<Provider = P>,
    {
        self.teardown();
        self.initialize(host).await
    }

    /// Read-only contract invocation.
    ///
    /// # Errors
    /// `NotReady` before the session is ready, `InvalidInvocation` for
    /// methods or arguments the interface rejects, `QueryFailed` for any
    /// provider or contract failure.
    pub async fn call(&self, method: &str, args: Vec<Value>) -> Result<Value> {
        let (provider, deployment, account) = self.ready()?;
        deployment.interface().prepare_call(method, &args)?;

        let request = CallRequest {
            to: deployment.address(),
            method: method.to_string(),
            args,
            from: Some(account),
        };
        provider.call(&request).await.map_err(|e| {
            debug!("Call {method} failed: {e}");
            SessionError::QueryFailed(format!("{method}: {e}"))
        })
    }

    /// State-changing contract invocation from the active account.
    ///
    /// # Errors
    /// `NotReady` before the session is ready, `InvalidInvocation` for
    /// methods, payments or arguments the interface rejects, and
    /// `TransactionFailed` for every provider-side failure.
    pub async fn send(
        &self,
        method: &str,
        args: Vec<Value>,
        options: SendOptions,
    ) -> Result<TransactionSubmission> {
        let (provider, deployment, account) = self.ready()?;
        deployment
            .interface()
            .prepare_send(method, &args, options.value)?;

        let request = TransactionRequest {
            from: account,
            to: deployment.address(),
            method: method.to_string(),
            args,
            value: options.value.unwrap_or(Wei::ZERO),
        };
        let hash = provider.send_transaction(&request).await.map_err(|e| {
            warn!("Transaction {method} from {account} failed: {e}");
            SessionError::TransactionFailed(format!("{method}: {e}"))
        })?;

        info!("Submitted {method} from {account} as {hash}");
        Ok(TransactionSubmission {
            hash,
            from: request.from,
            to: request.to,
            method: request.method,
            value: request.value,
        })
    }

    /// Re-reads the accounts the provider currently exposes.
    ///
    /// # Errors
    /// `NotReady` before the session is ready, `QueryFailed` on provider error.
    pub async fn accounts(&self) -> Result<Vec<Address>> {
        let (provider, _, _) = self.ready()?;
        provider
            .accounts()
            .await
            .map_err(|e| SessionError::QueryFailed(format!("accounts: {e}")))
    }

    fn ready(&self) -> Result<(&P, &Deployment, Address)> {
        match (
            self.session.status,
            self.provider.as_ref(),
            self.session.binding.as_ref(),
            self.session.active_account,
        ) {
            (SessionStatus::Ready, Some(provider), Some(deployment), Some(account)) => {
                Ok((provider, deployment, account))
            }
            (status, ..) => Err(SessionError::NotReady(status)),
        }
    }
}

/// Steps 2 to 5 of initialization. The first failure ends the sequence.
async fn establish<P>(
    provider: &P,
    kind: ProviderKind,
    registry: &DeploymentRegistry,
) -> std::result::Result<Connected, Failed>
where
    P: Provider + Send + Sync,
{
    let accounts = match kind {
        ProviderKind::Injected => provider.request_accounts().await,
        ProviderKind::Legacy => provider.accounts().await,
    }
    .map_err(|e| {
        warn!("User denied account access: {e}");
        Failed::at(SessionStatus::AccountDenied)
    })?;

    let account = accounts.first().copied().ok_or_else(|| {
        warn!("Provider exposed no accounts");
        Failed::at(SessionStatus::AccountDenied)
    })?;

    let network_id = provider.network_id().await.map_err(|e| {
        warn!("Could not determine network: {e}");
        Failed::at(SessionStatus::NetworkUnsupported)
    })?;

    let deployment = registry.resolve(network_id).cloned().ok_or_else(|| {
        warn!("No deployment registered for network {network_id}");
        Failed {
            status: SessionStatus::ContractUnresolved,
            network_id: Some(network_id),
        }
    })?;

    Ok(Connected {
        account,
        network_id,
        deployment,
    })
}

#[cfg(test)]
mod tests;
