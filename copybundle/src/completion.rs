//! Production completion provider: shells out to an external
//! text-completion command with a hard timeout.
//!
//! The prompt is written to the child's stdin and the trimmed stdout is the
//! completion. The timeout is owned here, so core prompt generation only
//! sees the distinct [`CompletionError`] kinds.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use copybundle_core::contract::{CompletionError, CompletionProvider};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, info};

/// Default timeout for one completion call, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runs an external command (e.g. `llm`) for each completion request.
pub struct ShellCompletionProvider {
    command: String,
    timeout: Duration,
}

impl ShellCompletionProvider {
    pub fn new(command: impl Into<String>) -> Self {
        ShellCompletionProvider {
            command: command.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn invoke(&self, prompt: &str) -> Result<String, CompletionError> {
        debug!(command = %self.command, prompt_len = prompt.len(), "invoking completion command");
        let mut child = Command::new(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                error!(error = %e, command = %self.command, "failed to launch completion command");
                CompletionError::Launch(format!("{}: {e}", self.command))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .await
                .map_err(|e| CompletionError::Launch(format!("writing prompt to stdin: {e}")))?;
            // Drop closes the pipe so the child sees EOF.
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| CompletionError::Launch(format!("waiting for completion command: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(status = ?output.status, stderr = %stderr, "completion command failed");
            return Err(CompletionError::Launch(format!(
                "completion command exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(CompletionError::EmptyResponse);
        }
        info!(response_len = text.len(), "completion received");
        Ok(text)
    }
}

#[async_trait]
impl CompletionProvider for ShellCompletionProvider {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        match tokio::time::timeout(self.timeout, self.invoke(prompt)).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    timeout_secs = self.timeout.as_secs(),
                    command = %self.command,
                    "completion command timed out"
                );
                Err(CompletionError::Timeout(self.timeout.as_secs()))
            }
        }
    }
}
