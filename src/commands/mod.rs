pub mod config;
pub mod delete;
pub mod edit;
pub mod list;
pub mod new;
pub mod watch;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use foodie_core::{MeetUpController, MeetUpDraft, SaveOutcome};
use owo_colors::OwoColorize;

use crate::input::{parse_date, parse_time};
use crate::render::Render;

/// Meet-up fields that can be given as flags instead of answered at a prompt.
#[derive(Args, Debug, Default, Clone)]
pub struct FieldArgs {
    /// Restaurant name
    #[arg(short, long)]
    pub restaurant: Option<String>,

    /// Date (YYYY-MM-DD, "today" or "tomorrow")
    #[arg(short, long)]
    pub date: Option<String>,

    /// Time of day (e.g. "06:30 PM")
    #[arg(short, long)]
    pub time: Option<String>,

    /// Free-text details
    #[arg(long)]
    pub details: Option<String>,
}

impl FieldArgs {
    pub fn is_empty(&self) -> bool {
        self.restaurant.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.details.is_none()
    }

    /// Overwrite the draft fields that were given as flags.
    pub fn apply_to(self, draft: &mut MeetUpDraft, today: NaiveDate) -> Result<()> {
        if let Some(restaurant) = self.restaurant {
            draft.restaurant_name = restaurant;
        }
        if let Some(date) = self.date {
            draft.date = Some(parse_date(&date, today)?);
        }
        if let Some(time) = self.time {
            draft.time = Some(parse_time(&time)?);
        }
        if let Some(details) = self.details {
            draft.details = details;
        }
        Ok(())
    }
}

/// Save `draft`, printing the outcome. Validation failures are returned so
/// interactive callers can ask again.
pub async fn save_and_report(
    controller: &MeetUpController,
    draft: &MeetUpDraft,
) -> Result<SaveOutcome, foodie_core::error::SaveError> {
    let outcome = controller.save(draft).await?;

    println!("{}", format!("  {}", outcome.user_message()).green());
    println!("  {}", outcome.record().render());
    if let Some(warning) = outcome.warning() {
        eprintln!("  {}", warning.yellow());
    }

    Ok(outcome)
}
