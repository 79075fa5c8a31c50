//! Dispatch policy: maps a raw request to an action.
//!
//! The request is the whole buffer read from the client, decoded as UTF-8
//! and matched by exact equality against the whitelist. There is no
//! trimming, no case folding, and no argument parsing.

use std::collections::HashSet;
use tracing::warn;

/// Fixed rejection payload sent for any denied request.
pub const DENIED_RESPONSE: &[u8] = b"command not allowed\n";

/// Decision for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Execute the named program with no arguments and return its stdout.
    Execute(String),
    /// Send the fixed rejection payload.
    Deny,
}

/// Immutable set of allowed command names, built once at startup.
#[derive(Debug, Clone)]
pub struct Whitelist {
    allowed: HashSet<String>,
}

impl Whitelist {
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Whitelist {
            allowed: commands.into_iter().map(Into::into).collect(),
        }
    }

    /// Decide what to do with a raw request.
    ///
    /// Requests that are not valid UTF-8 are denied rather than aborting
    /// the exchange; an empty request is denied like any other unknown
    /// command.
    pub fn decide(&self, request: &[u8]) -> Action {
        let command = match std::str::from_utf8(request) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Request is not valid UTF-8, denying");
                return Action::Deny;
            }
        };

        if self.allowed.contains(command) {
            Action::Execute(command.to_string())
        } else {
            Action::Deny
        }
    }
}
