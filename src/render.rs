//! TUI rendering traits for foodie types.
//!
//! Extension traits that add colored terminal rendering to foodie-core types
//! using owo_colors.

use foodie_core::temporal;
use foodie_core::{Classification, MeetUpRecord};
use owo_colors::OwoColorize;

/// Length of the id prefix shown in listings; enough to pass to `edit`/`delete`.
pub const SHORT_ID_LEN: usize = 8;

pub trait Render {
    fn render(&self) -> String;
}

pub fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

impl Render for MeetUpRecord {
    fn render(&self) -> String {
        let when = format!("{} {}", temporal::format_date(self.date), self.time);
        let id = self.id().map(short_id).unwrap_or("-");

        let mut line = format!(
            "{} {} {}",
            self.restaurant_name.bold(),
            when.cyan(),
            id.dimmed()
        );
        if !self.details.is_empty() {
            line.push_str(&format!("\n     {}", self.details.dimmed()));
        }
        line
    }
}

impl Render for Classification {
    fn render(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("{} ({})", "Upcoming".green().bold(), self.upcoming.len()));
        render_section(&self.upcoming, &mut lines);

        lines.push(String::new());
        lines.push(format!("{} ({})", "Past".dimmed().bold(), self.past.len()));
        render_section(&self.past, &mut lines);

        lines.join("\n")
    }
}

fn render_section(records: &[MeetUpRecord], lines: &mut Vec<String>) {
    if records.is_empty() {
        lines.push(format!("   {}", "No meet-ups".dimmed()));
        return;
    }
    for record in records {
        lines.push(format!("   • {}", record.render()));
    }
}
