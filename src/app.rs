//! Wiring of the core engine to the local file store and reminder queue.

use std::sync::Arc;

use anyhow::Result;
use foodie_core::{
    Clock, ConfirmPrompt, FoodieConfig, MeetUpController, MeetUpRecord, MeetUpStore,
    NotificationScheduler, SystemClock,
};
use futures::StreamExt;

use crate::local_store::JsonFileCollection;
use crate::reminders::ReminderQueue;

pub struct App {
    pub config: FoodieConfig,
    pub store: MeetUpStore,
    pub reminders: Arc<ReminderQueue>,
    pub clock: Arc<dyn Clock>,
}

impl App {
    pub fn load() -> Result<Self> {
        let config = FoodieConfig::load()?;
        let data_path = config.data_path();

        let collection = JsonFileCollection::new(&data_path, config.poll()?);
        let store = MeetUpStore::new(Arc::new(collection), config.collection.clone());
        let reminders = Arc::new(ReminderQueue::new(data_path.join("reminders.json")));

        tracing::debug!(data = %data_path.display(), collection = %config.collection, "loaded");

        Ok(App {
            config,
            store,
            reminders,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn controller(&self, prompt: Arc<dyn ConfirmPrompt>) -> MeetUpController {
        let scheduler = NotificationScheduler::new(self.reminders.clone(), self.clock.clone())
            .with_title(self.config.reminder_title.clone());

        MeetUpController::new(
            self.store.clone(),
            scheduler,
            prompt,
            self.clock.clone(),
            self.config.user_id.clone(),
        )
    }

    /// The meet-ups as they are right now.
    pub async fn records(&self) -> Vec<MeetUpRecord> {
        self.store.records().next().await.unwrap_or_default()
    }

    /// Look up a meet-up by full id or unique id prefix.
    pub async fn find(&self, query: &str) -> Result<MeetUpRecord> {
        let records = self.records().await;
        resolve(&records, query).cloned()
    }
}

pub fn resolve<'a>(records: &'a [MeetUpRecord], query: &str) -> Result<&'a MeetUpRecord> {
    if let Some(exact) = records.iter().find(|r| r.id() == Some(query)) {
        return Ok(exact);
    }

    let matches: Vec<_> = records
        .iter()
        .filter(|r| r.id().is_some_and(|id| id.starts_with(query)))
        .collect();

    match matches.as_slice() {
        [only] => Ok(*only),
        [] => anyhow::bail!("No meet-up with id '{query}'"),
        _ => anyhow::bail!(
            "'{query}' matches {} meet-ups. Use more of the id.",
            matches.len()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use foodie_core::TimeOfDay;

    fn record(id: &str) -> MeetUpRecord {
        MeetUpRecord {
            id: Some(id.into()),
            restaurant_name: format!("Restaurant {id}"),
            date: NaiveDate::from_ymd_opt(2025, 3, 21).unwrap(),
            time: TimeOfDay::from_hm(18, 0).unwrap(),
            details: String::new(),
            owner_id: "user-1".into(),
        }
    }

    #[test]
    fn resolves_exact_and_unique_prefix() {
        let records = vec![record("abc123"), record("abd456"), record("ab")];

        assert_eq!(resolve(&records, "abc").unwrap().id(), Some("abc123"));
        assert_eq!(resolve(&records, "ab").unwrap().id(), Some("ab"));
    }

    #[test]
    fn ambiguous_or_unknown_prefix_fails() {
        let records = vec![record("abc123"), record("abd456")];

        assert!(
            resolve(&records, "a")
                .unwrap_err()
                .to_string()
                .contains("matches 2")
        );
        assert!(resolve(&records, "zzz").is_err());
    }
}
