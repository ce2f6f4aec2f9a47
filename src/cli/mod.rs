#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

mod action;
mod args;
mod commands;
mod parser;

pub use action::CliAction;
pub use args::{split_global_options, suggest_commands, OutputFormat, VALID_COMMANDS};
pub use commands::{cli_command_to_request, CliCommand};
pub use parser::{parse_cli_args, CliError};
