use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Uninitialized,
    ProviderMissing,
    AccountDenied,
    NetworkUnsupported,
    ContractUnresolved,
    Ready,
}

impl SessionStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::ProviderMissing => "provider_missing",
            Self::AccountDenied => "account_denied",
            Self::NetworkUnsupported => "network_unsupported",
            Self::ContractUnresolved => "contract_unresolved",
            Self::Ready => "ready",
        }
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Initialization has finished, successfully or not.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Uninitialized)
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        !matches!(self, Self::Uninitialized | Self::Ready)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for SessionStatus {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "uninitialized" => Ok(Self::Uninitialized),
            "provider_missing" => Ok(Self::ProviderMissing),
            "account_denied" => Ok(Self::AccountDenied),
            "network_unsupported" => Ok(Self::NetworkUnsupported),
            "contract_unresolved" => Ok(Self::ContractUnresolved),
            "ready" => Ok(Self::Ready),
            _ => Err(format!("Unknown session status: {s}")),
        }
    }
}

/// Which flavour of host provider was found.
///
/// `Injected` providers gate accounts behind an explicit access request;
/// `Legacy` providers expose their accounts directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Injected,
    Legacy,
}

impl ProviderKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Injected => "injected",
            Self::Legacy => "legacy",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::SessionStatus;

    #[test]
    fn status_strings_round_trip() {
        for status in [
            SessionStatus::Uninitialized,
            SessionStatus::ProviderMissing,
            SessionStatus::AccountDenied,
            SessionStatus::NetworkUnsupported,
            SessionStatus::ContractUnresolved,
            SessionStatus::Ready,
        ] {
            assert_eq!(SessionStatus::try_from(status.as_str()), Ok(status));
        }
    }

    #[test]
    fn only_ready_is_usable_and_only_uninitialized_is_pending() {
        assert!(SessionStatus::Ready.is_ready());
        assert!(!SessionStatus::ContractUnresolved.is_ready());
        assert!(!SessionStatus::Uninitialized.is_terminal());
        assert!(SessionStatus::AccountDenied.is_failure());
        assert!(!SessionStatus::Ready.is_failure());
    }
}
