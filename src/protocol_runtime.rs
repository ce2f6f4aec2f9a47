#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

mod dispatcher;

pub use dispatcher::{dispatch, CommandSuccess};

use crate::app::App;
use chainpost::protocol_envelope::ProtocolEnvelope;
use chainpost::{code, SessionError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProtocolRequest {
    pub cmd: String,
    pub rid: Option<String>,
    #[serde(flatten)]
    pub args: Map<String, Value>,
}

/// Answers every non-empty stdin line with one envelope line, all against
/// the same session.
///
/// # Errors
/// Returns an error if stdin reading or stdout writing fails.
pub async fn run_protocol_loop(app: &mut App) -> std::result::Result<(), SessionError> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut processed_non_empty_line = false;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        processed_non_empty_line = true;
        let envelope = process_protocol_line(app, &line).await;
        write_envelope(&envelope).await?;
    }

    if !processed_non_empty_line {
        write_envelope(&no_input_envelope()).await?;
    }

    Ok(())
}

/// Executes one request line. Failures, including unparseable input, are
/// reported inside the envelope.
pub async fn process_protocol_line(app: &mut App, line: &str) -> ProtocolEnvelope {
    let started = Instant::now();
    let envelope = match serde_json::from_str::<ProtocolRequest>(line) {
        Ok(request) => execute_request(app, request).await,
        Err(err) => {
            ProtocolEnvelope::error(None, code::INVALID, format!("Invalid request JSON: {err}"))
                .with_fix(
                    "Send one JSON object per line with a 'cmd' field. Example: {\"cmd\":\"status\"}",
                )
                .with_ctx(json!({"line": line}))
        }
    };

    envelope
        .with_state(app.session().session().snapshot())
        .with_ms(elapsed_ms(started))
}

/// Runs a request and wraps the outcome. Requests without a `rid` get a
/// fresh one so every answer can be correlated.
pub async fn execute_request(app: &mut App, request: ProtocolRequest) -> ProtocolEnvelope {
    let rid = request
        .rid
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    debug!("Executing {} as {rid}", request.cmd);

    match dispatch(app, &request).await {
        Ok(success) => ProtocolEnvelope::success(Some(rid), success.data),
        Err(error) => {
            ProtocolEnvelope::from_error(Some(rid), &error).with_ctx(json!({"cmd": request.cmd}))
        }
    }
}

async fn write_envelope(envelope: &ProtocolEnvelope) -> std::result::Result<(), SessionError> {
    let mut stdout = tokio::io::stdout();
    let response_text = serde_json::to_string(envelope)?;
    stdout.write_all(response_text.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}

fn no_input_envelope() -> ProtocolEnvelope {
    ProtocolEnvelope::error(None, code::INVALID, "No input received on stdin")
        .with_fix(
            "Provide one JSON command per line. Example: echo '{\"cmd\":\"status\"}' | chainpost",
        )
        .with_ctx(json!({"stdin": "empty"}))
        .with_ms(0)
}

fn elapsed_ms(start: Instant) -> i64 {
    i64::try_from(start.elapsed().as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests;
