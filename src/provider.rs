#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! Ports to the host-supplied wallet provider.

pub mod dev_chain;

pub use dev_chain::{DevChain, DevChainBuilder};

use crate::types::{Address, NetworkId, ProviderKind, TxHash, Wei};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

pub type PortFuture<'a, T> =
    Pin<Box<dyn Future<Output = std::result::Result<T, ProviderError>> + Send + 'a>>;

/// Failures as the provider reports them, before the session collapses
/// them into its own error kinds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("User rejected the request")]
    UserRejected,

    #[error("insufficient funds for transfer")]
    InsufficientFunds,

    #[error("execution reverted: {0}")]
    Reverted(String),

    #[error("RPC error: {0}")]
    Rpc(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    pub to: Address,
    pub method: String,
    pub args: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub method: String,
    pub args: Vec<Value>,
    pub value: Wei,
}

pub trait Provider {
    /// Asks the user to expose accounts to this page.
    fn request_accounts(&self) -> PortFuture<'_, Vec<Address>>;

    /// Accounts already exposed, without prompting.
    fn accounts(&self) -> PortFuture<'_, Vec<Address>>;

    fn network_id(&self) -> PortFuture<'_, NetworkId>;

    fn call<'a>(&'a self, request: &'a CallRequest) -> PortFuture<'a, Value>;

    /// Resolves once the transaction is submitted, not when it is mined.
    fn send_transaction<'a>(&'a self, request: &'a TransactionRequest) -> PortFuture<'a, TxHash>;
}

#[derive(Debug, Clone)]
pub struct DetectedProvider<P> {
    pub kind: ProviderKind,
    pub provider: P,
}

/// The environment a session runs in; finds the provider, if any.
pub trait ProviderHost {
    type Provider: Provider + Send + Sync;

    fn detect(&self) -> Option<DetectedProvider<Self::Provider>>;
}

/// Host with fixed provider slots. An injected provider wins over a
/// legacy one when both are present.
#[derive(Debug, Clone)]
pub struct StaticHost<P> {
    injected: Option<P>,
    legacy: Option<P>,
}

impl<P> StaticHost<P> {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            injected: None,
            legacy: None,
        }
    }

    #[must_use]
    pub const fn injected(provider: P) -> Self {
        Self {
            injected: Some(provider),
            legacy: None,
        }
    }

    #[must_use]
    pub const fn legacy(provider: P) -> Self {
        Self {
            injected: None,
            legacy: Some(provider),
        }
    }

    #[must_use]
    pub fn with_legacy(mut self, provider: P) -> Self {
        self.legacy = Some(provider);
        self
    }
}

impl<P> ProviderHost for StaticHost<P>
where
    P: Provider + Clone + Send + Sync,
{
    type Provider = P;

    fn detect(&self) -> Option<DetectedProvider<P>> {
        self.injected
            .as_ref()
            .map(|provider| DetectedProvider {
                kind: ProviderKind::Injected,
                provider: provider.clone(),
            })
            .or_else(|| {
                self.legacy.as_ref().map(|provider| DetectedProvider {
                    kind: ProviderKind::Legacy,
                    provider: provider.clone(),
                })
            })
    }
}

/// Changes the provider reports on its own initiative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProviderEvent {
    AccountsChanged { accounts: Vec<Address> },
    ChainChanged { network_id: NetworkId },
}
