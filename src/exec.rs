//! External program execution.
//!
//! The program is run by exact name with no arguments, its stdout is
//! captured in full, and the exchange blocks until the process exits.
//! Launch failures and nonzero exits are not surfaced to the client:
//! whatever stdout was captured (possibly nothing) is the response.

use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Run `program` with no arguments and capture its complete stdout.
pub async fn capture_stdout(program: &str) -> Vec<u8> {
    match Command::new(program)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await
    {
        Ok(output) => {
            if !output.status.success() {
                warn!(program, status = %output.status, "Program exited with failure");
            }
            debug!(program, bytes = output.stdout.len(), "Captured program output");
            output.stdout
        }
        Err(e) => {
            warn!(program, error = %e, "Failed to launch program");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_stdout() {
        // `echo` with no arguments prints a single newline.
        let out = capture_stdout("echo").await;
        assert_eq!(out, b"\n");
    }

    #[tokio::test]
    async fn test_missing_program_yields_empty_output() {
        let out = capture_stdout("definitely-not-a-real-program").await;
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_nonzero_exit_still_returns_stdout() {
        let out = capture_stdout("false").await;
        assert!(out.is_empty());
    }
}
