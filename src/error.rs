#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use crate::types::{NetworkId, SessionStatus};
use thiserror::Error;

/// Error code constants for type-safe error handling
pub mod code {
    pub const CLI_ERROR: &str = "CLI_ERROR";
    pub const NO_PROVIDER: &str = "NO_PROVIDER";
    pub const DENIED: &str = "DENIED";
    pub const NETWORK: &str = "NETWORK";
    pub const UNRESOLVED: &str = "UNRESOLVED";
    pub const NOT_READY: &str = "NOT_READY";
    pub const INVALID: &str = "INVALID";
    pub const QUERY: &str = "QUERY";
    pub const TX: &str = "TX";
    pub const CONFIG: &str = "CONFIG";
    pub const INTERNAL: &str = "INTERNAL";
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No web3 provider detected")]
    ProviderMissing,

    #[error("User denied account access: {0}")]
    AccountDenied(String),

    #[error("Network unsupported: {0}")]
    NetworkUnsupported(String),

    #[error("Contract is not deployed on network {0}")]
    ContractUnresolved(NetworkId),

    #[error("Session is not ready (status: {0})")]
    NotReady(SessionStatus),

    #[error("Invalid contract invocation: {0}")]
    InvalidInvocation(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SessionError {
    /// Returns the protocol error code for this error
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ProviderMissing => code::NO_PROVIDER,
            Self::AccountDenied(_) => code::DENIED,
            Self::NetworkUnsupported(_) => code::NETWORK,
            Self::ContractUnresolved(_) => code::UNRESOLVED,
            Self::NotReady(_) => code::NOT_READY,
            Self::InvalidInvocation(_) | Self::SerializationError(_) => code::INVALID,
            Self::QueryFailed(_) => code::QUERY,
            Self::TransactionFailed(_) => code::TX,
            Self::ConfigError(_) | Self::IoError(_) => code::CONFIG,
            Self::Internal(_) => code::INTERNAL,
        }
    }

    /// Returns the exit code for this error
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigError(_) => 2,
            Self::ProviderMissing => 3,
            Self::AccountDenied(_) => 4,
            Self::NetworkUnsupported(_) | Self::ContractUnresolved(_) => 5,
            Self::NotReady(_) => 6,
            Self::InvalidInvocation(_) => 7,
            Self::QueryFailed(_) => 8,
            Self::TransactionFailed(_) => 9,
            Self::IoError(_) => 10,
            Self::SerializationError(_) => 11,
            Self::Internal(_) => 12,
        }
    }

    /// Maps a terminal initialization status onto the error a caller sees
    /// when it tries to use the session anyway.
    #[must_use]
    pub fn from_status(status: SessionStatus, network_id: Option<NetworkId>) -> Self {
        match (status, network_id) {
            (SessionStatus::ProviderMissing, _) => Self::ProviderMissing,
            (SessionStatus::AccountDenied, _) => {
                Self::AccountDenied("account access was not granted".to_string())
            }
            (SessionStatus::NetworkUnsupported, _) => {
                Self::NetworkUnsupported("network id could not be determined".to_string())
            }
            (SessionStatus::ContractUnresolved, Some(id)) => Self::ContractUnresolved(id),
            (other, _) => Self::NotReady(other),
        }
    }
}

/// Protocol error codes with a description and a suggested fix
pub const ERROR_CODES: &[(&str, &str, &str)] = &[
    (
        code::CLI_ERROR,
        "Invalid CLI usage",
        "Run 'chainpost help' for valid commands",
    ),
    (
        code::NO_PROVIDER,
        "No web3 provider detected",
        "Install a wallet extension or set provider = \"dev\" in the config",
    ),
    (
        code::DENIED,
        "Account access was denied",
        "Approve the connection request in your wallet",
    ),
    (
        code::NETWORK,
        "Active network could not be determined",
        "Check the wallet's network selection and retry",
    ),
    (
        code::UNRESOLVED,
        "Contract is not deployed on the selected network",
        "Switch the wallet to a network listed in the deployment artifact",
    ),
    (
        code::NOT_READY,
        "Session is not ready",
        "Run 'chainpost status' to inspect the session",
    ),
    (
        code::INVALID,
        "Invalid contract invocation",
        "Check the method name, argument count and argument types",
    ),
    (
        code::QUERY,
        "Contract query failed",
        "Verify the contract address and retry",
    ),
    (
        code::TX,
        "Transaction failed",
        "Check the wallet balance, the attached payment and the wallet prompt",
    ),
    (
        code::CONFIG,
        "Configuration could not be loaded",
        "Validate .chainpost/config.toml and the deployment artifact path",
    ),
    (
        code::INTERNAL,
        "Unexpected internal failure",
        "Inspect logs and retry command",
    ),
];

/// Get error code details (description and fix) for a given error code
#[must_use]
pub fn get_error_info(error_code: &str) -> Option<(&'static str, &'static str)> {
    ERROR_CODES
        .iter()
        .find(|(code, _, _)| *code == error_code)
        .map(|(_, desc, fix)| (*desc, *fix))
}

pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::{code, get_error_info, SessionError, ERROR_CODES};
    use crate::types::{NetworkId, SessionStatus};

    #[test]
    fn every_error_code_has_a_fix_hint() {
        let errors = [
            SessionError::ProviderMissing,
            SessionError::AccountDenied("x".to_string()),
            SessionError::NetworkUnsupported("x".to_string()),
            SessionError::ContractUnresolved(NetworkId::new(5)),
            SessionError::NotReady(SessionStatus::Uninitialized),
            SessionError::InvalidInvocation("x".to_string()),
            SessionError::QueryFailed("x".to_string()),
            SessionError::TransactionFailed("x".to_string()),
            SessionError::ConfigError("x".to_string()),
            SessionError::Internal("x".to_string()),
        ];

        for error in &errors {
            assert!(
                get_error_info(error.code()).is_some(),
                "missing info for {}",
                error.code()
            );
        }
        assert!(ERROR_CODES.iter().any(|(c, _, _)| *c == code::CLI_ERROR));
    }

    #[test]
    fn provider_missing_message_is_user_facing() {
        assert_eq!(
            SessionError::ProviderMissing.to_string(),
            "No web3 provider detected"
        );
    }

    #[test]
    fn terminal_statuses_map_to_their_error_kinds() {
        assert!(matches!(
            SessionError::from_status(SessionStatus::ProviderMissing, None),
            SessionError::ProviderMissing
        ));
        assert!(matches!(
            SessionError::from_status(SessionStatus::ContractUnresolved, Some(NetworkId::new(7))),
            SessionError::ContractUnresolved(id) if id == NetworkId::new(7)
        ));
        assert!(matches!(
            SessionError::from_status(SessionStatus::Uninitialized, None),
            SessionError::NotReady(SessionStatus::Uninitialized)
        ));
    }

    #[test]
    fn exit_codes_are_distinct_per_failure_family() {
        assert_eq!(SessionError::ConfigError("x".to_string()).exit_code(), 2);
        assert_eq!(SessionError::ProviderMissing.exit_code(), 3);
        assert_eq!(SessionError::TransactionFailed("x".to_string()).exit_code(), 9);
    }
}
