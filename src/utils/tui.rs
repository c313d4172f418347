use std::future::Future;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "];

/// Run `work` with a "Loading <what>…" spinner on stderr, cleared once it
/// finishes. Nothing is drawn when stderr is not a terminal.
pub async fn while_loading<F: Future>(what: &str, work: F) -> F::Output {
    let spinner = ProgressBar::new_spinner().with_message(format!("Loading {what}…"));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg:.dim}") {
        spinner.set_style(style.tick_strings(FRAMES));
    }
    spinner.enable_steady_tick(Duration::from_millis(100));

    let output = work.await;
    spinner.finish_and_clear();
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_what_the_work_produced() {
        let loaded = while_loading("meet-ups", async { vec!["Pho House"] }).await;
        assert_eq!(loaded, vec!["Pho House"]);
    }
}
