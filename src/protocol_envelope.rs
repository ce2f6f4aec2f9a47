#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use crate::error::{get_error_info, SessionError};
use crate::session::SessionSnapshot;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

/// One response line: `{ok, rid, t, ms, d, err, fix, state}`. Absent
/// fields are omitted from the JSON.
#[derive(Debug, Serialize)]
pub struct ProtocolEnvelope {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rid: Option<String>,
    pub t: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<Box<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub err: Option<Box<ProtocolError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Box<SessionSnapshot>>,
}

#[derive(Debug, Serialize)]
pub struct ProtocolError {
    pub code: String,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctx: Option<Box<Value>>,
}

impl ProtocolEnvelope {
    fn stamped(ok: bool, rid: Option<String>) -> Self {
        Self {
            ok,
            rid,
            t: Utc::now().timestamp_millis(),
            ms: None,
            d: None,
            err: None,
            fix: None,
            state: None,
        }
    }

    #[must_use]
    pub fn success(rid: Option<String>, data: Value) -> Self {
        Self {
            d: Some(Box::new(data)),
            ..Self::stamped(true, rid)
        }
    }

    #[must_use]
    pub fn error(rid: Option<String>, code: impl Into<String>, msg: impl Into<String>) -> Self {
        let err = ProtocolError {
            code: code.into(),
            msg: msg.into(),
            ctx: None,
        };
        Self {
            err: Some(Box::new(err)),
            ..Self::stamped(false, rid)
        }
    }

    /// Error envelope for a session failure, with its code's fix hint.
    #[must_use]
    pub fn from_error(rid: Option<String>, error: &SessionError) -> Self {
        let code = error.code();
        Self::error(rid, code, error.to_string()).with_fix_for(code)
    }

    /// Attaches the fix registered for `code`, if there is one.
    #[must_use]
    pub fn with_fix_for(self, code: &str) -> Self {
        match get_error_info(code) {
            Some((_, fix)) => self.with_fix(fix),
            None => self,
        }
    }

    #[must_use]
    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }

    #[must_use]
    pub const fn with_ms(mut self, ms: i64) -> Self {
        self.ms = Some(ms);
        self
    }

    #[must_use]
    pub fn with_state(mut self, state: SessionSnapshot) -> Self {
        self.state = Some(Box::new(state));
        self
    }

    /// Context only applies to error envelopes; success envelopes ignore it.
    #[must_use]
    pub fn with_ctx(mut self, ctx: Value) -> Self {
        if let Some(err) = self.err.as_mut() {
            err.ctx = Some(Box::new(ctx));
        }
        self
    }
}
