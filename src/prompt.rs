use async_trait::async_trait;
use dialoguer::Confirm;
use foodie_core::ConfirmPrompt;
use owo_colors::OwoColorize;

/// Asks on the terminal. Anything but an explicit yes counts as no.
pub struct TerminalPrompt;

#[async_trait]
impl ConfirmPrompt for TerminalPrompt {
    async fn confirm(&self, title: &str, message: &str) -> bool {
        let prompt = format!("{} {}", title.bold(), message);

        let answer = tokio::task::spawn_blocking(move || {
            Confirm::new().with_prompt(prompt).default(false).interact()
        })
        .await;

        match answer {
            Ok(Ok(confirmed)) => confirmed,
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "prompt dismissed");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "prompt task failed");
                false
            }
        }
    }
}

/// Answers yes without asking, for `--force`.
pub struct AssumeYes;

#[async_trait]
impl ConfirmPrompt for AssumeYes {
    async fn confirm(&self, _title: &str, _message: &str) -> bool {
        true
    }
}
