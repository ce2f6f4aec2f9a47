#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use super::action::CliAction;
use super::args::ensure_no_unknown_flags;
use super::commands::CliCommand;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CliError {
    #[error("Missing required argument: {}", arg)]
    MissingRequiredArg { arg: String },
    #[error("Unknown command: {}", cmd)]
    UnknownCommand { cmd: String },
    #[error("Invalid type for {}", arg)]
    InvalidArgType { arg: String },
    #[error("Invalid argument value for {}: {}", arg, error)]
    InvalidArgValue { arg: String, error: String },
}

/// Parses arguments with global options already removed.
///
/// # Errors
/// Returns a `CliError` for unknown commands or flags and for missing or
/// malformed arguments.
pub fn parse_cli_args(args: &[String]) -> Result<CliAction, CliError> {
    if args
        .get(1)
        .is_some_and(|arg| matches!(arg.as_str(), "-h" | "--help"))
    {
        return Ok(CliAction::ShowHelp);
    }

    match args.first().map(String::as_str) {
        None | Some("--") => Ok(CliAction::RunProtocol),
        Some("-h" | "--help") => Ok(CliAction::ShowHelp),
        Some("-v" | "--version") => Ok(CliAction::ShowVersion),
        Some("?" | "help") => Ok(CliAction::Command(CliCommand::Help)),
        Some("status") => {
            ensure_no_unknown_flags(args, &[])?;
            Ok(CliAction::Command(CliCommand::Status))
        }
        Some("profile") => {
            ensure_no_unknown_flags(args, &["--address"])?;
            let address = parse_optional_arg(args, "address")?;
            Ok(CliAction::Command(CliCommand::Profile { address }))
        }
        Some("update-profile") => {
            ensure_no_unknown_flags(args, &["--username", "--bio"])?;
            let username = parse_required_arg(args, "username")?;
            let bio = parse_optional_arg(args, "bio")?.unwrap_or_default();
            Ok(CliAction::Command(CliCommand::UpdateProfile { username, bio }))
        }
        Some("create-post") => {
            ensure_no_unknown_flags(args, &["--content"])?;
            let content = parse_required_arg(args, "content")?;
            Ok(CliAction::Command(CliCommand::CreatePost { content }))
        }
        Some("like-post") => {
            ensure_no_unknown_flags(args, &["--post-id"])?;
            let post_id = parse_required_arg(args, "post_id")?;
            Ok(CliAction::Command(CliCommand::LikePost { post_id }))
        }
        Some("comment") => {
            ensure_no_unknown_flags(args, &["--post-id", "--content"])?;
            let post_id = parse_required_arg(args, "post_id")?;
            let content = parse_required_arg(args, "content")?;
            Ok(CliAction::Command(CliCommand::Comment { post_id, content }))
        }
        Some("get-post") => {
            ensure_no_unknown_flags(args, &["--post-id"])?;
            let post_id = parse_required_arg(args, "post_id")?;
            Ok(CliAction::Command(CliCommand::GetPost { post_id }))
        }
        Some("feed") => {
            ensure_no_unknown_flags(args, &["--limit"])?;
            let limit = parse_optional_arg(args, "limit")?;
            Ok(CliAction::Command(CliCommand::Feed { limit }))
        }
        Some("switch-account") => {
            ensure_no_unknown_flags(args, &["--address"])?;
            let address = parse_required_arg(args, "address")?;
            Ok(CliAction::Command(CliCommand::SwitchAccount { address }))
        }
        Some("switch-network") => {
            ensure_no_unknown_flags(args, &["--network-id"])?;
            let network_id = parse_required_arg(args, "network_id")?;
            Ok(CliAction::Command(CliCommand::SwitchNetwork { network_id }))
        }
        Some(cmd) => Err(CliError::UnknownCommand {
            cmd: cmd.to_string(),
        }),
    }
}

fn parse_required_arg<T>(args: &[String], name: &str) -> Result<T, CliError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw_value = flag_value(args, name)
        .flatten()
        .ok_or_else(|| CliError::MissingRequiredArg {
            arg: name.to_string(),
        })?;

    raw_value
        .parse::<T>()
        .map_err(|_| CliError::InvalidArgType {
            arg: name.to_string(),
        })
}

fn parse_optional_arg<T>(args: &[String], name: &str) -> Result<Option<T>, CliError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match flag_value(args, name) {
        None => Ok(None),
        Some(None) => Err(CliError::MissingRequiredArg {
            arg: name.to_string(),
        }),
        Some(Some(raw_value)) => raw_value
            .parse::<T>()
            .map(Some)
            .map_err(|e| CliError::InvalidArgValue {
                arg: name.to_string(),
                error: format!("{e}"),
            }),
    }
}

/// Finds `--name value` or `--name=value`. The outer `None` means the flag
/// is absent; the inner one means it has no value. A separate value that
/// starts with `--` is taken for the next flag, so such values need the
/// `=` form.
fn flag_value<'a>(args: &'a [String], name: &str) -> Option<Option<&'a str>> {
    let flag = format!("--{}", name.replace('_', "-"));
    let inline = format!("{flag}=");

    args.iter().enumerate().find_map(|(position, arg)| {
        if let Some(value) = arg.strip_prefix(inline.as_str()) {
            Some(Some(value))
        } else if *arg == flag {
            Some(
                args.get(position + 1)
                    .map(String::as_str)
                    .filter(|value| !value.starts_with("--")),
            )
        } else {
            None
        }
    })
}
