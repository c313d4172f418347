use std::sync::Arc;

use anyhow::Result;
use foodie_core::error::SaveError;
use foodie_core::temporal;
use foodie_core::{EditMode, MeetUpDraft};
use owo_colors::OwoColorize;

use super::new::clear_invalid;
use super::{FieldArgs, save_and_report};
use crate::app::App;
use crate::input::{parse_date, parse_time, prompt_text, prompt_with_retry};
use crate::prompt::TerminalPrompt;
use crate::render::Render;

pub async fn run(app: &App, id: &str, args: FieldArgs) -> Result<()> {
    let record = app.find(id).await?;
    let controller = app.controller(Arc::new(TerminalPrompt));
    let mode = controller.edit_mode(Some(&record));

    println!("{}", mode.title().bold());
    println!("  {}", record.render());

    if mode == EditMode::ViewPast {
        println!("{}", "  This meet-up has already happened.".dimmed());
        return Ok(());
    }

    let today = app.clock.now().date();
    let interactive = args.is_empty();
    let mut draft = MeetUpDraft::from_record(&record);
    args.apply_to(&mut draft, today)?;

    loop {
        if interactive {
            prompt_all(&mut draft, today)?;
        }

        match save_and_report(&controller, &draft).await {
            Ok(_) => return Ok(()),
            Err(SaveError::Validation(e)) if interactive => {
                eprintln!("  {}", e.to_string().red());
                if !controller.request_cancel().await {
                    clear_invalid(&mut draft, e);
                    continue;
                }
                return Ok(());
            }
            Err(e) => anyhow::bail!(e.user_message()),
        }
    }
}

/// Ask for every field, offering the current value as the default.
fn prompt_all(draft: &mut MeetUpDraft, today: chrono::NaiveDate) -> Result<()> {
    let current_name = Some(draft.restaurant_name.clone()).filter(|s| !s.is_empty());
    draft.restaurant_name = prompt_with_retry("  Restaurant", current_name, |s| {
        if s.trim().is_empty() {
            anyhow::bail!("Restaurant cannot be empty.");
        }
        Ok(s.trim().to_string())
    })?;

    let current_date = draft.date.map(temporal::format_date);
    draft.date = Some(prompt_with_retry("  Date", current_date, |s| {
        parse_date(s, today)
    })?);

    let current_time = draft.time.map(|t| t.to_string());
    draft.time = Some(prompt_with_retry("  Time", current_time, parse_time)?);

    draft.details = prompt_text("  Details", Some(draft.details.clone()))?;
    Ok(())
}
