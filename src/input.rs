//! Parsing and prompting for meet-up fields typed on the command line.

use anyhow::Result;
use chrono::{Days, NaiveDate};
use dialoguer::Input;
use foodie_core::TimeOfDay;
use foodie_core::temporal;
use owo_colors::OwoColorize;

/// `YYYY-MM-DD`, `today` or `tomorrow`.
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim();
    match input.to_lowercase().as_str() {
        "today" => Ok(today),
        "tomorrow" => today
            .checked_add_days(Days::new(1))
            .ok_or_else(|| anyhow::anyhow!("Date out of range")),
        _ => Ok(temporal::parse_date(input)?),
    }
}

/// `hh:mm AM/PM`, case-insensitive.
pub fn parse_time(input: &str) -> Result<TimeOfDay> {
    Ok(TimeOfDay::parse(&input.trim().to_uppercase())?)
}

/// Prompt until `parse` accepts the answer. An empty answer takes `default`.
pub fn prompt_with_retry<T, F>(prompt: &str, default: Option<String>, parse: F) -> Result<T>
where
    F: Fn(&str) -> Result<T>,
{
    loop {
        let mut input = Input::<String>::new().with_prompt(prompt);
        if let Some(default) = &default {
            input = input.default(default.clone());
        }
        let answer = input.interact_text()?;
        match parse(&answer) {
            Ok(result) => return Ok(result),
            Err(e) => {
                eprintln!("  {}", e.to_string().red());
            }
        }
    }
}

pub fn prompt_text(prompt: &str, default: Option<String>) -> Result<String> {
    let input = Input::<String>::new()
        .with_prompt(prompt)
        .default(default.unwrap_or_default())
        .show_default(false)
        .allow_empty(true);
    Ok(input.interact_text()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 20).unwrap()
    }

    #[test]
    fn relative_dates() {
        assert_eq!(parse_date("today", today()).unwrap(), today());
        assert_eq!(
            parse_date(" Tomorrow ", today()).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 21).unwrap()
        );
    }

    #[test]
    fn iso_dates() {
        assert_eq!(
            parse_date("2025-12-31", today()).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );
        assert!(parse_date("31/12/2025", today()).is_err());
    }

    #[test]
    fn times_ignore_case() {
        assert_eq!(parse_time("06:30 pm").unwrap().to_string(), "06:30 PM");
        assert!(parse_time("18:30").is_err());
    }
}
