use std::sync::Arc;

use anyhow::Result;
use foodie_core::{ConfirmPrompt, DeleteOutcome};
use owo_colors::OwoColorize;

use crate::app::App;
use crate::prompt::{AssumeYes, TerminalPrompt};
use crate::render::Render;

pub async fn run(app: &App, id: &str, force: bool) -> Result<()> {
    let record = app.find(id).await?;
    let Some(id) = record.id() else {
        anyhow::bail!("Meet-up has no id");
    };

    let prompt: Arc<dyn ConfirmPrompt> = if force {
        Arc::new(AssumeYes)
    } else {
        println!("  {}", record.render());
        Arc::new(TerminalPrompt)
    };
    let controller = app.controller(prompt);

    match controller.request_delete(id).await {
        Ok(DeleteOutcome::Deleted) => {
            println!("{}", format!("  Deleted: {}", record.restaurant_name).red());
        }
        Ok(DeleteOutcome::Kept) => {}
        Err(e) => anyhow::bail!("Could not delete the meet-up. Please try again. ({e})"),
    }

    Ok(())
}
