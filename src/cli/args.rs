#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use super::parser::CliError;
use std::path::PathBuf;

pub const VALID_COMMANDS: &[&str] = &[
    "help",
    "status",
    "profile",
    "update-profile",
    "create-post",
    "like-post",
    "comment",
    "get-post",
    "feed",
    "switch-account",
    "switch-network",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Flags accepted in front of or after any command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub output: OutputFormat,
}

/// Splits `--config PATH` (or `--config=PATH`) and `--json` out of `args`,
/// returning the rest in order.
///
/// # Errors
/// Returns `CliError::MissingRequiredArg` if `--config` has no value.
pub fn split_global_options(args: &[String]) -> Result<(GlobalOptions, Vec<String>), CliError> {
    let mut options = GlobalOptions::default();
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => options.output = OutputFormat::Json,
            "--config" => {
                let path = iter
                    .next()
                    .filter(|value| !value.starts_with("--"))
                    .ok_or_else(|| CliError::MissingRequiredArg {
                        arg: "config".to_string(),
                    })?;
                options.config = Some(PathBuf::from(path));
            }
            other => match other.strip_prefix("--config=") {
                Some(path) if !path.is_empty() => options.config = Some(PathBuf::from(path)),
                Some(_) => {
                    return Err(CliError::MissingRequiredArg {
                        arg: "config".to_string(),
                    })
                }
                None => rest.push(arg.clone()),
            },
        }
    }

    Ok((options, rest))
}

/// # Errors
/// Returns `CliError::UnknownCommand` if an unknown flag is found.
pub fn ensure_no_unknown_flags(args: &[String], allowed_flags: &[&str]) -> Result<(), CliError> {
    let invalid = args
        .iter()
        .skip(1)
        .find(|arg| {
            let flag = arg.split_once('=').map_or(arg.as_str(), |(flag, _)| flag);
            arg.starts_with("--")
                && !matches!(flag, "--help" | "-h")
                && !allowed_flags.iter().any(|allowed| *allowed == flag)
        })
        .cloned();

    invalid.map_or(Ok(()), |flag| Err(CliError::UnknownCommand { cmd: flag }))
}

#[must_use]
pub fn suggest_commands(typo: &str) -> Vec<String> {
    VALID_COMMANDS
        .iter()
        .map(|cmd| (cmd, strsim::levenshtein(typo, cmd)))
        .filter(|(_, dist)| *dist <= 3)
        .min_by_key(|(_, dist)| *dist)
        .map(|(cmd, _)| vec![cmd.to_string()])
        .unwrap_or_default()
}
