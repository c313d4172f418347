//! The façade presentation code talks to: save, delete, cancel.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::clock::Clock;
use crate::error::{PersistenceError, SaveError, SchedulingError, ValidationError};
use crate::meetup::{self, MeetUpDraft, MeetUpRecord};
use crate::notify::{NotificationHandle, NotificationScheduler};
use crate::store::MeetUpStore;

/// Asks the user a yes/no question. A dismissed prompt answers no.
#[async_trait]
pub trait ConfirmPrompt: Send + Sync {
    async fn confirm(&self, title: &str, message: &str) -> bool;
}

/// Where an edit session stands after the last `save`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Editing,
    Validating,
    /// The draft was rejected; the user keeps editing.
    Invalid,
    Persisting,
    PersistFailed,
    Persisted,
    Scheduling,
    /// Saved, but without a reminder.
    ScheduleFailed,
    Scheduled,
}

impl EditState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EditState::Invalid
                | EditState::PersistFailed
                | EditState::ScheduleFailed
                | EditState::Scheduled
        )
    }
}

/// How an existing (or new) meet-up is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Create,
    Edit,
    /// Past meet-ups are shown read-only.
    ViewPast,
}

impl EditMode {
    pub fn title(&self) -> &'static str {
        match self {
            EditMode::Create => "Create a Meet-Up",
            EditMode::Edit => "Edit Meet-Up",
            EditMode::ViewPast => "View Past Meet-Up",
        }
    }

    pub fn is_read_only(&self) -> bool {
        *self == EditMode::ViewPast
    }
}

/// A save that reached the store.
#[derive(Debug)]
pub enum SaveOutcome {
    Scheduled {
        record: MeetUpRecord,
        created: bool,
        handle: NotificationHandle,
    },
    /// The meet-up is saved; only the reminder is missing.
    ScheduleFailed {
        record: MeetUpRecord,
        created: bool,
        error: SchedulingError,
    },
}

impl SaveOutcome {
    pub fn record(&self) -> &MeetUpRecord {
        match self {
            SaveOutcome::Scheduled { record, .. } | SaveOutcome::ScheduleFailed { record, .. } => {
                record
            }
        }
    }

    pub fn is_created(&self) -> bool {
        match self {
            SaveOutcome::Scheduled { created, .. } | SaveOutcome::ScheduleFailed { created, .. } => {
                *created
            }
        }
    }

    pub fn user_message(&self) -> &'static str {
        if self.is_created() {
            "Meet-up created successfully!"
        } else {
            "Meet-up updated successfully!"
        }
    }

    /// Non-fatal warning to show next to the success message.
    pub fn warning(&self) -> Option<String> {
        match self {
            SaveOutcome::Scheduled { .. } => None,
            SaveOutcome::ScheduleFailed { error, .. } => Some(format!(
                "The meet-up was saved, but its reminder could not be scheduled: {error}"
            )),
        }
    }
}

impl SaveError {
    pub fn user_message(&self) -> String {
        match self {
            SaveError::Validation(e) => e.to_string(),
            SaveError::Persistence(e) => {
                format!("Could not save the meet-up. Please try again. ({e})")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user answered no.
    Kept,
}

/// Runs validation, persistence, reminder scheduling and confirmation gates
/// for one user. Expects one `save` at a time.
pub struct MeetUpController {
    store: MeetUpStore,
    scheduler: NotificationScheduler,
    prompt: Arc<dyn ConfirmPrompt>,
    clock: Arc<dyn Clock>,
    owner_id: String,
    state: Mutex<EditState>,
}

impl MeetUpController {
    pub fn new(
        store: MeetUpStore,
        scheduler: NotificationScheduler,
        prompt: Arc<dyn ConfirmPrompt>,
        clock: Arc<dyn Clock>,
        owner_id: impl Into<String>,
    ) -> Self {
        MeetUpController {
            store,
            scheduler,
            prompt,
            clock,
            owner_id: owner_id.into(),
            state: Mutex::new(EditState::Editing),
        }
    }

    pub fn store(&self) -> &MeetUpStore {
        &self.store
    }

    pub fn state(&self) -> EditState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enter(&self, next: EditState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(from = ?*state, to = ?next, "edit state");
        *state = next;
    }

    pub fn edit_mode(&self, record: Option<&MeetUpRecord>) -> EditMode {
        match record {
            None => EditMode::Create,
            Some(r) if r.is_past(self.clock.now()) => EditMode::ViewPast,
            Some(_) => EditMode::Edit,
        }
    }

    pub fn validate(&self, draft: &MeetUpDraft) -> Result<MeetUpRecord, ValidationError> {
        meetup::validate(draft, self.clock.now(), &self.owner_id)
    }

    /// Validate, write, then schedule a reminder for the written meet-up.
    ///
    /// A draft with an `id` updates that meet-up; without one it creates a
    /// new one. The reminder is only attempted after the write succeeded, and
    /// failing to schedule it does not undo the write.
    pub async fn save(&self, draft: &MeetUpDraft) -> Result<SaveOutcome, SaveError> {
        self.enter(EditState::Validating);
        let mut record = match self.validate(draft) {
            Ok(record) => record,
            Err(e) => {
                self.enter(EditState::Invalid);
                return Err(e.into());
            }
        };

        self.enter(EditState::Persisting);
        let written = match &draft.id {
            Some(id) => self.store.update(id, &record).await.map(|()| false),
            None => self.store.create(&record).await.map(|id| {
                record.id = Some(id);
                true
            }),
        };
        let created = match written {
            Ok(created) => created,
            Err(e) => {
                self.enter(EditState::PersistFailed);
                tracing::warn!(error = %e, "could not save meet-up");
                return Err(e.into());
            }
        };
        self.enter(EditState::Persisted);

        self.enter(EditState::Scheduling);
        match self.scheduler.schedule(&record).await {
            Ok(handle) => {
                self.enter(EditState::Scheduled);
                Ok(SaveOutcome::Scheduled {
                    record,
                    created,
                    handle,
                })
            }
            Err(error) => {
                self.enter(EditState::ScheduleFailed);
                tracing::warn!(%error, "meet-up saved without a reminder");
                Ok(SaveOutcome::ScheduleFailed {
                    record,
                    created,
                    error,
                })
            }
        }
    }

    /// Delete after the user confirms. Answering no changes nothing.
    pub async fn request_delete(&self, id: &str) -> Result<DeleteOutcome, PersistenceError> {
        let confirmed = self
            .prompt
            .confirm(
                "Confirm Delete",
                "Are you sure you want to delete this meet-up?",
            )
            .await;

        if !confirmed {
            return Ok(DeleteOutcome::Kept);
        }

        self.store.delete(id).await?;
        Ok(DeleteOutcome::Deleted)
    }

    /// Ask whether to abandon the current edit. Returns true to leave.
    pub async fn request_cancel(&self) -> bool {
        let leave = self
            .prompt
            .confirm("Confirm Cancel", "Are you sure you want to cancel?")
            .await;

        if leave {
            self.enter(EditState::Editing);
        }
        leave
    }
}
