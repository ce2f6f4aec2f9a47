use alloy_primitives::utils::{format_units, parse_units};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DECIMALS: u8 = 18;

/// An amount of the network's base currency in its smallest unit.
///
/// Parsed from and displayed as a decimal in whole currency units
/// (`"0.01"`), serialized as an integer string of base units so that
/// amounts above `u64::MAX` survive JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Wei(U256);

impl Wei {
    pub const ZERO: Self = Self(U256::ZERO);

    #[must_use]
    pub fn new(base_units: u128) -> Self {
        Self(U256::from(base_units))
    }

    #[must_use]
    pub const fn base_units(&self) -> U256 {
        self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Parses a decimal amount in whole units, e.g. `"0.005"`.
    ///
    /// # Errors
    /// Returns an error for empty input, non-digit characters, more than
    /// 18 fractional digits or overflow.
    pub fn from_decimal(input: &str) -> Result<Self, String> {
        let trimmed = input.trim();
        let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));

        if whole.is_empty() && fraction.is_empty() {
            return Err(format!("invalid amount '{input}'"));
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(format!("invalid amount '{input}': only digits and one '.' allowed"));
        }
        if fraction.len() > usize::from(DECIMALS) {
            return Err(format!(
                "invalid amount '{input}': at most {DECIMALS} decimal places"
            ));
        }

        let whole = if whole.is_empty() { "0" } else { whole };
        let normalized = if fraction.is_empty() {
            whole.to_string()
        } else {
            format!("{whole}.{fraction}")
        };
        parse_units(&normalized, DECIMALS)
            .map(|units| Self(units.get_absolute()))
            .map_err(|e| format!("invalid amount '{input}': {e}"))
    }

    /// Renders the amount in whole units without trailing zeros.
    #[must_use]
    pub fn to_decimal(&self) -> String {
        match format_units(self.0, DECIMALS) {
            Ok(formatted) if formatted.contains('.') => formatted
                .trim_end_matches('0')
                .trim_end_matches('.')
                .to_string(),
            Ok(formatted) => formatted,
            Err(_) => self.0.to_string(),
        }
    }
}

impl FromStr for Wei {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal(s)
    }
}

impl TryFrom<String> for Wei {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        U256::from_str_radix(value.trim(), 10)
            .map(Self)
            .map_err(|e| format!("invalid base-unit amount '{value}': {e}"))
    }
}

impl From<Wei> for String {
    fn from(value: Wei) -> Self {
        value.0.to_string()
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}
