#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use chainpost::{FeeSchedule, NetworkId, Result, SessionError, Wei};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_CONFIG_PATH: &str = ".chainpost/config.toml";
const DEFAULT_NETWORK_ID: u64 = 1337;

/// Which provider the host exposes to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderChoice {
    /// In-process development chain, injected.
    Dev,
    /// Same chain exposed through the legacy slot.
    Legacy,
    /// No provider at all.
    None,
}

impl FromStr for ProviderChoice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Self::Dev),
            "legacy" => Ok(Self::Legacy),
            "none" => Ok(Self::None),
            other => Err(format!(
                "unknown provider '{other}' (expected dev, legacy or none)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub artifact: Option<PathBuf>,
    pub provider: ProviderChoice,
    pub network_id: NetworkId,
    pub approve_accounts: bool,
    pub fees: FeeSchedule,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            artifact: None,
            provider: ProviderChoice::Dev,
            network_id: NetworkId::new(DEFAULT_NETWORK_ID),
            approve_accounts: true,
            fees: FeeSchedule::default(),
        }
    }
}

/// # Errors
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub async fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    if !config_path.exists() {
        return Ok(Config::default());
    }

    let content = tokio::fs::read_to_string(&config_path)
        .await
        .map_err(|e| SessionError::ConfigError(format!("Failed to read config: {e}")))?;

    parse_config_content(&content)
}

/// # Errors
/// Returns `ConfigError` naming the first key whose value does not parse.
pub fn parse_config_content(content: &str) -> Result<Config> {
    let mut config = Config::default();

    for line in content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
    {
        if let Some(value) = parse_key_value(line, "artifact") {
            let expanded = expand_env_vars(value);
            config.artifact = (!expanded.is_empty()).then(|| PathBuf::from(expanded));
        }
        if let Some(value) = parse_key_value(line, "provider") {
            config.provider = parse_value("provider", &expand_env_vars(value))?;
        }
        if let Some(value) = parse_key_value(line, "network_id") {
            config.network_id = parse_value("network_id", &expand_env_vars(value))?;
        }
        if let Some(value) = parse_key_value(line, "approve_accounts") {
            config.approve_accounts = parse_value("approve_accounts", &expand_env_vars(value))?;
        }
        if let Some(value) = parse_key_value(line, "post_fee") {
            config.fees.create_post =
                parse_value::<Wei>("post_fee", &expand_env_vars(value))?;
        }
        if let Some(value) = parse_key_value(line, "like_fee") {
            config.fees.like_post =
                parse_value::<Wei>("like_fee", &expand_env_vars(value))?;
        }
        if let Some(value) = parse_key_value(line, "comment_fee") {
            config.fees.comment_on_post =
                parse_value::<Wei>("comment_fee", &expand_env_vars(value))?;
        }
    }

    Ok(config)
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| SessionError::ConfigError(format!("Invalid value for {key}: {e}")))
}

fn expand_env_vars(input: &str) -> String {
    let mut result = input.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_part = &result[start + 2..start + end];
            let (var_name, default) = var_part.split_once(":-").unwrap_or((var_part, ""));
            let value = std::env::var(var_name).unwrap_or_else(|_| default.to_string());
            result.replace_range(start..=(start + end), &value);
        } else {
            break;
        }
    }
    result
}

pub fn parse_key_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    line.split_once('=')
        .and_then(|(lhs, rhs)| (lhs.trim() == key).then_some(rhs.trim().trim_matches('"')))
}
