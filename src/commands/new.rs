use std::sync::Arc;

use anyhow::Result;
use foodie_core::MeetUpDraft;
use foodie_core::error::SaveError;
use owo_colors::OwoColorize;

use super::{FieldArgs, save_and_report};
use crate::app::App;
use crate::input::{parse_date, parse_time, prompt_text, prompt_with_retry};
use crate::prompt::TerminalPrompt;

pub async fn run(app: &App, args: FieldArgs) -> Result<()> {
    let interactive = args.restaurant.is_none() || args.date.is_none() || args.time.is_none();
    let controller = app.controller(Arc::new(TerminalPrompt));
    let today = app.clock.now().date();

    // Flags are taken as given; anything missing is asked for.
    let mut draft = MeetUpDraft::default();
    args.apply_to(&mut draft, today)?;

    loop {
        if interactive {
            prompt_missing(&mut draft, today)?;
        }

        match save_and_report(&controller, &draft).await {
            Ok(_) => return Ok(()),
            Err(SaveError::Validation(e)) if interactive => {
                eprintln!("  {}", e.to_string().red());
                clear_invalid(&mut draft, e);
            }
            Err(e) => anyhow::bail!(e.user_message()),
        }
    }
}

fn prompt_missing(draft: &mut MeetUpDraft, today: chrono::NaiveDate) -> Result<()> {
    if draft.restaurant_name.trim().is_empty() {
        draft.restaurant_name = prompt_with_retry("  Restaurant", None, |s| {
            if s.trim().is_empty() {
                anyhow::bail!("Restaurant cannot be empty.");
            }
            Ok(s.trim().to_string())
        })?;
    }
    if draft.date.is_none() {
        draft.date = Some(prompt_with_retry(
            "  Date (YYYY-MM-DD, today, tomorrow)",
            None,
            |s| parse_date(s, today),
        )?);
    }
    if draft.time.is_none() {
        draft.time = Some(prompt_with_retry("  Time (hh:mm AM/PM)", None, parse_time)?);
    }
    if draft.details.is_empty() {
        draft.details = prompt_text("  Details (skip)", None)?;
    }
    Ok(())
}

/// Forget the fields a validation error points at so they are asked again.
pub fn clear_invalid(draft: &mut MeetUpDraft, error: foodie_core::error::ValidationError) {
    use foodie_core::error::ValidationError::*;

    match error {
        MissingRestaurant => draft.restaurant_name.clear(),
        MissingTime => draft.time = None,
        MissingDate => draft.date = None,
        PastDateTime => {
            draft.date = None;
            draft.time = None;
        }
    }
}
