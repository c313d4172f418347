//! The meet-up record and draft validation.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::temporal::{self, TimeOfDay};

/// A persisted (or about to be persisted) meet-up.
///
/// Serializes to the document fields used by the remote collection:
/// `restaurant`, `date` (`YYYY-MM-DD`), `time` (`hh:mm AM/PM`), `details` and
/// `userId`. The id lives beside the fields, never inside them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetUpRecord {
    /// Assigned by the store on first write.
    #[serde(skip)]
    pub id: Option<String>,
    #[serde(rename = "restaurant")]
    pub restaurant_name: String,
    pub date: NaiveDate,
    pub time: TimeOfDay,
    #[serde(default)]
    pub details: String,
    #[serde(rename = "userId", default)]
    pub owner_id: String,
}

impl MeetUpRecord {
    /// The single instant this meet-up happens at. Only used for comparison.
    pub fn starts_at(&self) -> NaiveDateTime {
        temporal::compose(self.date, self.time)
    }

    pub fn is_past(&self, now: NaiveDateTime) -> bool {
        temporal::is_before(self.starts_at(), now)
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// User input for creating (no `id`) or editing (`id` set) a meet-up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeetUpDraft {
    pub id: Option<String>,
    pub restaurant_name: String,
    pub date: Option<NaiveDate>,
    pub time: Option<TimeOfDay>,
    pub details: String,
}

impl MeetUpDraft {
    pub fn new(restaurant_name: impl Into<String>) -> Self {
        MeetUpDraft {
            restaurant_name: restaurant_name.into(),
            ..Default::default()
        }
    }

    /// Start an edit session from a stored record.
    pub fn from_record(record: &MeetUpRecord) -> Self {
        MeetUpDraft {
            id: record.id.clone(),
            restaurant_name: record.restaurant_name.clone(),
            date: Some(record.date),
            time: Some(record.time),
            details: record.details.clone(),
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn at(mut self, time: TimeOfDay) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }
}

/// Check a draft against `now` and turn it into a record owned by `owner_id`.
///
/// Checks run in a fixed order and stop at the first failure: restaurant,
/// time, date, then whether the meet-up is already in the past. A meet-up
/// starting exactly at `now` is accepted.
pub fn validate(
    draft: &MeetUpDraft,
    now: NaiveDateTime,
    owner_id: &str,
) -> Result<MeetUpRecord, ValidationError> {
    let restaurant_name = draft.restaurant_name.trim();
    if restaurant_name.is_empty() {
        return Err(ValidationError::MissingRestaurant);
    }

    let time = draft.time.ok_or(ValidationError::MissingTime)?;
    let date = draft.date.ok_or(ValidationError::MissingDate)?;

    if temporal::is_before(temporal::compose(date, time), now) {
        return Err(ValidationError::PastDateTime);
    }

    Ok(MeetUpRecord {
        id: draft.id.clone(),
        restaurant_name: restaurant_name.to_string(),
        date,
        time,
        details: draft.details.clone(),
        owner_id: owner_id.to_string(),
    })
}
