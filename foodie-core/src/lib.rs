//! Core of the foodie meet-up planner.
//!
//! This crate owns the meet-up lifecycle, independent of any UI:
//! - `meetup` and `temporal` for the record, its date/time fields and validation
//! - `store` for the live, remotely synced collection of meet-ups
//! - `classify` for the always-current upcoming/past split
//! - `notify` for reminders at a meet-up's start time
//! - `controller` for the create/edit/delete flows presentation code drives

pub mod classify;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod meetup;
pub mod notify;
pub mod store;
pub mod temporal;

pub use classify::{Classification, LifecycleClassifier, MountedClassifier};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::FoodieConfig;
pub use controller::{
    ConfirmPrompt, DeleteOutcome, EditMode, EditState, MeetUpController, SaveOutcome,
};
pub use meetup::{MeetUpDraft, MeetUpRecord};
pub use notify::{NotificationContent, NotificationHandle, NotificationScheduler, Notifier};
pub use store::{DocumentCollection, MeetUpStore, MemoryCollection, Subscription};
pub use temporal::TimeOfDay;
