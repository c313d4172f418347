//! Reminder scheduling against the device's local notification service.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::{NotifierError, SchedulingError};
use crate::meetup::MeetUpRecord;
use crate::temporal;

pub const DEFAULT_REMINDER_TITLE: &str = "Meet-Up Reminder";

/// What the user sees when the reminder fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub sound: bool,
}

/// Opaque id of a scheduled reminder, issued by the notifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationHandle(pub String);

impl fmt::Display for NotificationHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Delivers a one-shot local notification at a given instant.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn schedule_notification(
        &self,
        content: NotificationContent,
        trigger: NaiveDateTime,
    ) -> Result<NotificationHandle, NotifierError>;
}

/// Turns saved meet-ups into reminders that fire when the meet-up starts.
///
/// Every call schedules a new reminder; an earlier reminder for the same
/// meet-up is left in place.
#[derive(Clone)]
pub struct NotificationScheduler {
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    title: String,
}

impl NotificationScheduler {
    pub fn new(notifier: Arc<dyn Notifier>, clock: Arc<dyn Clock>) -> Self {
        NotificationScheduler {
            notifier,
            clock,
            title: DEFAULT_REMINDER_TITLE.to_string(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn content_for(&self, record: &MeetUpRecord) -> NotificationContent {
        NotificationContent {
            title: self.title.clone(),
            body: format!(
                "Your meet-up at {} starts at {}.",
                record.restaurant_name, record.time
            ),
            sound: true,
        }
    }

    pub async fn schedule(
        &self,
        record: &MeetUpRecord,
    ) -> Result<NotificationHandle, SchedulingError> {
        let trigger = record.starts_at();
        let now = self.clock.now();

        if !temporal::is_before(now, trigger) {
            return Err(SchedulingError::NotInFuture(trigger));
        }

        let handle = self
            .notifier
            .schedule_notification(self.content_for(record), trigger)
            .await?;

        tracing::info!(
            meetup = record.id().unwrap_or("-"),
            %trigger,
            %handle,
            "scheduled reminder"
        );

        Ok(handle)
    }
}
