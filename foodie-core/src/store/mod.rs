//! Bridge between meet-up records and the remote real-time document collection.

pub mod memory;

use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::ser::Error as _;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::error::{CollectionError, PersistenceError, PersistenceResult};
use crate::meetup::MeetUpRecord;

pub use memory::MemoryCollection;

/// Field name of the owner; left out of updates so the author never changes.
const OWNER_FIELD: &str = "userId";

/// Document fields as stored remotely.
pub type Fields = serde_json::Map<String, Value>;

/// One document of a collection snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

/// Full collection snapshots: the current one first, then one per change.
/// Dropping the stream stops observation.
pub type SnapshotStream = Pin<Box<dyn Stream<Item = Vec<Document>> + Send>>;

/// Decoded meet-ups, one list per snapshot.
pub type RecordStream = Pin<Box<dyn Stream<Item = Vec<MeetUpRecord>> + Send>>;

/// A remote collection of documents that pushes changes to observers.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    /// Write a new document and return the id the backend assigned.
    async fn add_document(&self, collection: &str, fields: Fields)
    -> Result<String, CollectionError>;

    /// Overwrite the given fields of an existing document.
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), CollectionError>;

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), CollectionError>;

    fn observe(&self, collection: &str) -> SnapshotStream;
}

/// Meet-up records in one named collection.
#[derive(Clone)]
pub struct MeetUpStore {
    backend: Arc<dyn DocumentCollection>,
    collection: String,
}

impl MeetUpStore {
    pub const DEFAULT_COLLECTION: &'static str = "meetups";

    pub fn new(backend: Arc<dyn DocumentCollection>, collection: impl Into<String>) -> Self {
        MeetUpStore {
            backend,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub async fn create(&self, record: &MeetUpRecord) -> PersistenceResult<String> {
        let fields = encode(record)?;
        let id = self.backend.add_document(&self.collection, fields).await?;
        tracing::debug!(collection = %self.collection, %id, "created meet-up");
        Ok(id)
    }

    /// Replace the restaurant, date, time and details of an existing meet-up.
    /// A missing `id` is whatever error the backend reports for it.
    pub async fn update(&self, id: &str, record: &MeetUpRecord) -> PersistenceResult<()> {
        let mut fields = encode(record)?;
        fields.remove(OWNER_FIELD);
        self.backend
            .update_document(&self.collection, id, fields)
            .await?;
        tracing::debug!(collection = %self.collection, %id, "updated meet-up");
        Ok(())
    }

    /// Delete a meet-up. Deleting one that is already gone succeeds.
    pub async fn delete(&self, id: &str) -> PersistenceResult<()> {
        match self.backend.delete_document(&self.collection, id).await {
            Ok(()) => {
                tracing::debug!(collection = %self.collection, %id, "deleted meet-up");
                Ok(())
            }
            Err(CollectionError::NotFound(_)) => {
                tracing::debug!(collection = %self.collection, %id, "meet-up already deleted");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Live stream of decoded snapshots. Documents that fail to decode are
    /// logged and left out.
    pub fn records(&self) -> RecordStream {
        let collection = self.collection.clone();
        let snapshots = self.backend.observe(&self.collection);

        Box::pin(snapshots.map(move |documents| {
            documents
                .into_iter()
                .filter_map(|doc| match decode(doc) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        tracing::warn!(%collection, error = %e, "skipping unreadable meet-up");
                        None
                    }
                })
                .collect()
        }))
    }

    /// Call `on_change` with the current meet-ups now and after every change.
    ///
    /// Delivery runs on a background task, so this must be called from within
    /// a tokio runtime. Each call registers another listener; keep at most
    /// one [`Subscription`] alive per consumer.
    pub fn subscribe<F>(&self, on_change: F) -> Subscription
    where
        F: FnMut(Vec<MeetUpRecord>) + Send + 'static,
    {
        let active = Arc::new(Mutex::new(true));
        let gate = active.clone();
        let mut records = self.records();
        let mut on_change = on_change;

        let task = tokio::spawn(async move {
            while let Some(snapshot) = records.next().await {
                if !deliver(&gate, snapshot, &mut on_change) {
                    break;
                }
            }
        });

        Subscription {
            active,
            task: Some(task),
        }
    }
}

/// Hands a snapshot to the listener unless it was detached. The gate is held
/// for the whole call so `unsubscribe` waits for an in-flight delivery.
fn deliver<F>(gate: &Mutex<bool>, snapshot: Vec<MeetUpRecord>, on_change: &mut F) -> bool
where
    F: FnMut(Vec<MeetUpRecord>),
{
    let active = gate.lock().unwrap_or_else(PoisonError::into_inner);
    if !*active {
        return false;
    }
    on_change(snapshot);
    true
}

/// A live listener registered with [`MeetUpStore::subscribe`].
///
/// Dropping it (or calling [`Subscription::unsubscribe`]) detaches the
/// listener; no callback runs after that returns.
#[must_use = "dropping a Subscription immediately detaches it"]
pub struct Subscription {
    active: Arc<Mutex<bool>>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}

    pub fn is_active(&self) -> bool {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = false;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn encode(record: &MeetUpRecord) -> PersistenceResult<Fields> {
    match serde_json::to_value(record).map_err(PersistenceError::Encode)? {
        Value::Object(fields) => Ok(fields),
        other => Err(PersistenceError::Encode(serde_json::Error::custom(format!(
            "expected an object, got {other}"
        )))),
    }
}

fn decode(doc: Document) -> PersistenceResult<MeetUpRecord> {
    let mut record: MeetUpRecord =
        serde_json::from_value(Value::Object(doc.fields)).map_err(|source| {
            PersistenceError::Decode {
                id: doc.id.clone(),
                source,
            }
        })?;
    record.id = Some(doc.id);
    Ok(record)
}
