#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use crate::interface::ContractInterface;
use crate::types::{Address, NetworkId};
use crate::{Result, SessionError};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Deployment artifact bundled with the crate, used when no artifact path
/// is configured.
pub const BUNDLED_ARTIFACT: &str = include_str!("../assets/SocialMediaPlatform.json");

/// Where the contract lives on one network and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    address: Address,
    interface: Arc<ContractInterface>,
}

impl Deployment {
    #[must_use]
    pub const fn new(address: Address, interface: Arc<ContractInterface>) -> Self {
        Self { address, interface }
    }

    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub fn interface(&self) -> &Arc<ContractInterface> {
        &self.interface
    }
}

#[derive(Debug, Deserialize)]
struct ArtifactFile {
    #[serde(rename = "contractName", default)]
    contract_name: Option<String>,
    abi: Value,
    #[serde(default)]
    networks: BTreeMap<String, ArtifactNetwork>,
}

#[derive(Debug, Deserialize)]
struct ArtifactNetwork {
    address: Option<String>,
}

/// Static address book keyed by network id.
#[derive(Debug, Clone, Default)]
pub struct DeploymentRegistry {
    contract_name: Option<String>,
    deployments: BTreeMap<NetworkId, Deployment>,
}

impl DeploymentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_deployment(mut self, network_id: NetworkId, deployment: Deployment) -> Self {
        self.deployments.insert(network_id, deployment);
        self
    }

    /// Parses a Truffle-style build artifact: one `abi` shared by every
    /// entry of the `networks` map. Network entries without an address are
    /// skipped, matching a contract compiled but never migrated there.
    ///
    /// # Errors
    /// Returns `ConfigError` for malformed JSON, a malformed ABI, an
    /// invalid network key or an invalid address.
    pub fn from_artifact_json(json: &str) -> Result<Self> {
        let artifact: ArtifactFile = serde_json::from_str(json)
            .map_err(|e| SessionError::ConfigError(format!("malformed deployment artifact: {e}")))?;
        let interface = Arc::new(ContractInterface::from_abi(&artifact.abi)?);

        let deployments = artifact
            .networks
            .into_iter()
            .filter_map(|(key, network)| network.address.map(|address| (key, address)))
            .map(|(key, address)| {
                let network_id = key.parse::<NetworkId>().map_err(SessionError::ConfigError)?;
                let address = address.parse::<Address>().map_err(|e| {
                    SessionError::ConfigError(format!("network {key}: {e}"))
                })?;
                Ok((network_id, Deployment::new(address, Arc::clone(&interface))))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(Self {
            contract_name: artifact.contract_name,
            deployments,
        })
    }

    /// # Errors
    /// Returns `ConfigError` when the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            SessionError::ConfigError(format!(
                "Failed to read deployment artifact {}: {e}",
                path.display()
            ))
        })?;
        Self::from_artifact_json(&content)
    }

    /// # Errors
    /// Returns `ConfigError` if the bundled artifact is malformed.
    pub fn bundled() -> Result<Self> {
        Self::from_artifact_json(BUNDLED_ARTIFACT)
    }

    #[must_use]
    pub fn resolve(&self, network_id: NetworkId) -> Option<&Deployment> {
        self.deployments.get(&network_id)
    }

    #[must_use]
    pub fn contract_name(&self) -> Option<&str> {
        self.contract_name.as_deref()
    }

    pub fn networks(&self) -> impl Iterator<Item = NetworkId> + '_ {
        self.deployments.keys().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deployments.is_empty()
    }
}
