#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use crate::cli::{CliError, OutputFormat};
use crate::protocol_runtime::CommandSuccess;
use chainpost::protocol_envelope::ProtocolEnvelope;
use chainpost::{code, get_error_info, SessionError, SessionSnapshot};
use serde_json::json;

pub const CLI_ERROR_EXIT_CODE: i32 = 2;

/// Prints a single-command outcome and returns the process exit code.
pub fn emit_outcome(
    output: OutputFormat,
    outcome: &Result<CommandSuccess, SessionError>,
    state: SessionSnapshot,
) -> i32 {
    match (output, outcome) {
        (OutputFormat::Text, Ok(success)) => {
            println!("{}", success.text);
            0
        }
        (OutputFormat::Text, Err(error)) => {
            eprintln!("Error: {error}");
            if let Some((_, fix)) = get_error_info(error.code()) {
                eprintln!("Hint: {fix}");
            }
            error.exit_code()
        }
        (OutputFormat::Json, Ok(success)) => {
            print_envelope(&ProtocolEnvelope::success(None, success.data.clone()).with_state(state));
            0
        }
        (OutputFormat::Json, Err(error)) => {
            print_envelope(&ProtocolEnvelope::from_error(None, error).with_state(state));
            error.exit_code()
        }
    }
}

pub fn emit_cli_error(output: OutputFormat, error: &CliError, suggestions: &[String]) -> i32 {
    match output {
        OutputFormat::Text => {
            eprintln!("Error: {error}");
            if let Some(suggestion) = suggestions.first() {
                eprintln!("Did you mean '{suggestion}'?");
            }
            eprintln!("Run 'chainpost help' for valid commands");
        }
        OutputFormat::Json => {
            print_envelope(
                &ProtocolEnvelope::error(None, code::CLI_ERROR, error.to_string())
                    .with_fix_for(code::CLI_ERROR)
                    .with_ctx(json!({"suggestions": suggestions})),
            );
        }
    }
    CLI_ERROR_EXIT_CODE
}

fn print_envelope(envelope: &ProtocolEnvelope) {
    match serde_json::to_string(envelope) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("Error: failed to serialize response: {e}"),
    }
}
