//! Pending reminders, kept on disk until `foodie watch` delivers them.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use foodie_core::error::NotifierError;
use foodie_core::{NotificationContent, NotificationHandle, Notifier};
use serde::{Deserialize, Serialize};

use crate::utils::fs::{FileLock, lock_exclusive, write_atomic};

/// Failed deliveries after which a reminder is dropped.
pub const MAX_DELIVERY_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReminder {
    pub handle: NotificationHandle,
    pub content: NotificationContent,
    pub trigger: NaiveDateTime,
    #[serde(default)]
    pub failed_attempts: u32,
}

/// A JSON file of reminders waiting for their trigger time. Any number of
/// `foodie` processes may share the file.
pub struct ReminderQueue {
    path: PathBuf,
}

impl ReminderQueue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ReminderQueue { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pending(&self) -> Result<Vec<PendingReminder>, NotifierError> {
        let _lock = self.lock()?;
        self.read()
    }

    /// Remove and return every reminder whose trigger is at or before `now`,
    /// earliest first.
    pub fn take_due(&self, now: NaiveDateTime) -> Result<Vec<PendingReminder>, NotifierError> {
        let _lock = self.lock()?;

        let (mut due, waiting): (Vec<_>, Vec<_>) =
            self.read()?.into_iter().partition(|r| r.trigger <= now);
        if due.is_empty() {
            return Ok(due);
        }

        self.write(&waiting)?;
        due.sort_by_key(|r| r.trigger);
        Ok(due)
    }

    /// Put back reminders that could not be shown so a later check retries
    /// them. Those that have now failed [`MAX_DELIVERY_ATTEMPTS`] times are
    /// returned instead of queued.
    pub fn requeue(
        &self,
        failed: Vec<PendingReminder>,
    ) -> Result<Vec<PendingReminder>, NotifierError> {
        if failed.is_empty() {
            return Ok(failed);
        }
        let _lock = self.lock()?;

        let (retry, given_up): (Vec<_>, Vec<_>) = failed
            .into_iter()
            .map(|mut reminder| {
                reminder.failed_attempts += 1;
                reminder
            })
            .partition(|r| r.failed_attempts < MAX_DELIVERY_ATTEMPTS);

        if !retry.is_empty() {
            let mut reminders = self.read()?;
            reminders.extend(retry);
            self.write(&reminders)?;
        }
        Ok(given_up)
    }

    fn lock(&self) -> Result<FileLock, NotifierError> {
        lock_exclusive(&self.path)
            .map_err(|e| NotifierError::Unavailable(format!("{}: {e}", self.path.display())))
    }

    fn read(&self) -> Result<Vec<PendingReminder>, NotifierError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| NotifierError::Unavailable(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| {
            NotifierError::Unavailable(format!("{}: {e}", self.path.display()))
        })
    }

    fn write(&self, reminders: &[PendingReminder]) -> Result<(), NotifierError> {
        let content = serde_json::to_string_pretty(reminders)
            .map_err(|e| NotifierError::Unavailable(e.to_string()))?;
        write_atomic(&self.path, content.as_bytes())
            .map_err(|e| NotifierError::Unavailable(format!("{}: {e}", self.path.display())))
    }
}

#[async_trait]
impl Notifier for ReminderQueue {
    async fn schedule_notification(
        &self,
        content: NotificationContent,
        trigger: NaiveDateTime,
    ) -> Result<NotificationHandle, NotifierError> {
        let _lock = self.lock()?;

        let handle = NotificationHandle(uuid::Uuid::new_v4().simple().to_string());
        let mut reminders = self.read()?;
        reminders.push(PendingReminder {
            handle: handle.clone(),
            content,
            trigger,
            failed_attempts: 0,
        });
        self.write(&reminders)?;

        Ok(handle)
    }
}

/// Show a reminder as a desktop notification.
pub fn deliver(reminder: &PendingReminder) -> anyhow::Result<()> {
    let mut notification = notify_rust::Notification::new();
    notification
        .appname("foodie")
        .summary(&reminder.content.title)
        .body(&reminder.content.body);
    if reminder.content.sound {
        notification.sound_name("message-new-instant");
    }
    notification.show()?;
    tracing::info!(handle = %reminder.handle, "delivered reminder");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 20)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn content(body: &str) -> NotificationContent {
        NotificationContent {
            title: "Meet-Up Reminder".into(),
            body: body.into(),
            sound: true,
        }
    }

    #[tokio::test]
    async fn scheduled_reminders_are_persisted() {
        let dir = TempDir::new().unwrap();
        let queue = ReminderQueue::new(dir.path().join("reminders.json"));

        let handle = queue
            .schedule_notification(content("Pho"), at(18))
            .await
            .unwrap();

        let reopened = ReminderQueue::new(dir.path().join("reminders.json"));
        let pending = reopened.pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].handle, handle);
        assert_eq!(pending[0].trigger, at(18));
    }

    #[tokio::test]
    async fn take_due_removes_only_due_reminders() {
        let dir = TempDir::new().unwrap();
        let queue = ReminderQueue::new(dir.path().join("reminders.json"));
        queue
            .schedule_notification(content("late"), at(20))
            .await
            .unwrap();
        queue
            .schedule_notification(content("second"), at(18))
            .await
            .unwrap();
        queue
            .schedule_notification(content("first"), at(17))
            .await
            .unwrap();

        let due = queue.take_due(at(18)).unwrap();

        let bodies: Vec<_> = due.iter().map(|r| r.content.body.as_str()).collect();
        assert_eq!(bodies, vec!["first", "second"]);
        assert_eq!(queue.pending().unwrap().len(), 1);
        assert!(queue.take_due(at(18)).unwrap().is_empty());
    }

    #[test]
    fn missing_file_has_nothing_pending() {
        let dir = TempDir::new().unwrap();
        let queue = ReminderQueue::new(dir.path().join("reminders.json"));
        assert!(queue.pending().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_deliveries_go_back_until_out_of_attempts() {
        let dir = TempDir::new().unwrap();
        let queue = ReminderQueue::new(dir.path().join("reminders.json"));
        queue
            .schedule_notification(content("Pho"), at(17))
            .await
            .unwrap();

        for attempt in 1..MAX_DELIVERY_ATTEMPTS {
            let due = queue.take_due(at(18)).unwrap();
            assert_eq!(due.len(), 1);
            assert!(queue.requeue(due).unwrap().is_empty());

            let pending = queue.pending().unwrap();
            assert_eq!(pending.len(), 1);
            assert_eq!(pending[0].failed_attempts, attempt);
            assert_eq!(pending[0].content.body, "Pho");
        }

        let due = queue.take_due(at(18)).unwrap();
        let given_up = queue.requeue(due).unwrap();
        assert_eq!(given_up.len(), 1);
        assert!(queue.pending().unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn queues_sharing_a_file_keep_every_reminder() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reminders.json");

        let writers: Vec<_> = (0..4)
            .map(|writer| {
                let queue = ReminderQueue::new(path.clone());
                tokio::spawn(async move {
                    for n in 0..10 {
                        queue
                            .schedule_notification(content(&format!("{writer}-{n}")), at(18))
                            .await
                            .unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap();
        }

        assert_eq!(ReminderQueue::new(path).pending().unwrap().len(), 40);
    }
}
