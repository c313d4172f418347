//! In-process document collection backed by tokio broadcast channels.
//!
//! Useful for tests and for embedding the engine without a remote backend.
//! Every write publishes a full snapshot of the affected collection to all of
//! its observers, in write order.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use super::{Document, DocumentCollection, Fields, SnapshotStream};
use crate::error::CollectionError;

const CHANNEL_CAPACITY: usize = 64;

struct CollectionState {
    documents: IndexMap<String, Fields>,
    changes: broadcast::Sender<Vec<Document>>,
}

impl CollectionState {
    fn new() -> Self {
        CollectionState {
            documents: IndexMap::new(),
            changes: broadcast::channel(CHANNEL_CAPACITY).0,
        }
    }

    fn snapshot(&self) -> Vec<Document> {
        self.documents
            .iter()
            .map(|(id, fields)| Document {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect()
    }

    fn publish(&self) {
        // No observers is fine.
        let _ = self.changes.send(self.snapshot());
    }
}

/// Documents kept in memory, in insertion order.
pub struct MemoryCollection {
    collections: Mutex<HashMap<String, CollectionState>>,
    offline: AtomicBool,
}

impl MemoryCollection {
    pub fn new() -> Self {
        MemoryCollection {
            collections: Mutex::new(HashMap::new()),
            offline: AtomicBool::new(false),
        }
    }

    /// While offline every write fails with a transport error. Observers
    /// stay attached.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Current contents of a collection.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        let collections = self.lock();
        collections
            .get(collection)
            .map(CollectionState::snapshot)
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CollectionState>> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn check_online(&self) -> Result<(), CollectionError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CollectionError::Transport("collection is offline".into()));
        }
        Ok(())
    }
}

impl Default for MemoryCollection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    async fn add_document(
        &self,
        collection: &str,
        fields: Fields,
    ) -> Result<String, CollectionError> {
        self.check_online()?;

        let id = uuid::Uuid::new_v4().simple().to_string();
        let mut collections = self.lock();
        let state = collections
            .entry(collection.to_string())
            .or_insert_with(CollectionState::new);
        state.documents.insert(id.clone(), fields);
        state.publish();

        Ok(id)
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), CollectionError> {
        self.check_online()?;

        let mut collections = self.lock();
        let state = collections
            .get_mut(collection)
            .ok_or_else(|| CollectionError::NotFound(id.to_string()))?;
        let existing = state
            .documents
            .get_mut(id)
            .ok_or_else(|| CollectionError::NotFound(id.to_string()))?;
        existing.extend(fields);
        state.publish();

        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), CollectionError> {
        self.check_online()?;

        let mut collections = self.lock();
        if let Some(state) = collections.get_mut(collection) {
            if state.documents.shift_remove(id).is_some() {
                state.publish();
            }
        }

        Ok(())
    }

    fn observe(&self, collection: &str) -> SnapshotStream {
        let mut collections = self.lock();
        let state = collections
            .entry(collection.to_string())
            .or_insert_with(CollectionState::new);

        // Subscribe and snapshot under the same lock so no write slips between.
        let changes = BroadcastStream::new(state.changes.subscribe());
        let current = state.snapshot();

        // A lagging observer skips ahead; every snapshot is complete anyway.
        let stream = tokio_stream::once(current).chain(changes.filter_map(Result::ok));

        Box::pin(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::timeout;

    fn fields(restaurant: &str) -> Fields {
        json!({ "restaurant": restaurant }).as_object().cloned().unwrap()
    }

    async fn next(stream: &mut SnapshotStream) -> Vec<Document> {
        timeout(Duration::from_millis(100), stream.next())
            .await
            .expect("timeout")
            .expect("stream ended")
    }

    #[tokio::test]
    async fn observe_starts_with_current_snapshot() {
        let collection = MemoryCollection::new();
        collection.add_document("meetups", fields("A")).await.unwrap();

        let mut stream = collection.observe("meetups");
        let first = next(&mut stream).await;

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].fields["restaurant"], "A");
    }

    #[tokio::test]
    async fn keeps_insertion_order_across_deletes() {
        let collection = MemoryCollection::new();
        let a = collection.add_document("meetups", fields("A")).await.unwrap();
        collection.add_document("meetups", fields("B")).await.unwrap();
        collection.add_document("meetups", fields("C")).await.unwrap();

        collection.delete_document("meetups", &a).await.unwrap();

        let names: Vec<_> = collection
            .documents("meetups")
            .into_iter()
            .map(|d| d.fields["restaurant"].clone())
            .collect();
        assert_eq!(names, vec![json!("B"), json!("C")]);
    }

    #[tokio::test]
    async fn every_write_is_pushed_in_order() {
        let collection = MemoryCollection::new();
        let mut stream = collection.observe("meetups");
        assert!(next(&mut stream).await.is_empty());

        let id = collection.add_document("meetups", fields("A")).await.unwrap();
        collection
            .update_document("meetups", &id, fields("B"))
            .await
            .unwrap();
        collection.delete_document("meetups", &id).await.unwrap();

        assert_eq!(next(&mut stream).await[0].fields["restaurant"], "A");
        assert_eq!(next(&mut stream).await[0].fields["restaurant"], "B");
        assert!(next(&mut stream).await.is_empty());
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let collection = MemoryCollection::new();
        let mut meetups = collection.observe("meetups");
        next(&mut meetups).await;

        collection.add_document("reviews", fields("A")).await.unwrap();

        let result = timeout(Duration::from_millis(50), meetups.next()).await;
        assert!(result.is_err(), "write to another collection was pushed");
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let collection = MemoryCollection::new();
        let mut initial = fields("A");
        initial.insert("userId".into(), json!("user-1"));
        let id = collection.add_document("meetups", initial).await.unwrap();

        collection
            .update_document("meetups", &id, fields("B"))
            .await
            .unwrap();

        let doc = &collection.documents("meetups")[0];
        assert_eq!(doc.fields["restaurant"], "B");
        assert_eq!(doc.fields["userId"], "user-1");
    }

    #[tokio::test]
    async fn update_of_missing_document_is_not_found() {
        let collection = MemoryCollection::new();
        let err = collection
            .update_document("meetups", "missing", fields("A"))
            .await
            .unwrap_err();
        assert_eq!(err, CollectionError::NotFound("missing".into()));
    }

    #[tokio::test]
    async fn delete_of_missing_document_succeeds() {
        let collection = MemoryCollection::new();
        collection.delete_document("meetups", "missing").await.unwrap();
    }

    #[tokio::test]
    async fn offline_rejects_writes() {
        let collection = MemoryCollection::new();
        collection.set_offline(true);

        let err = collection
            .add_document("meetups", fields("A"))
            .await
            .unwrap_err();
        assert!(matches!(err, CollectionError::Transport(_)));

        collection.set_offline(false);
        assert!(collection.add_document("meetups", fields("A")).await.is_ok());
    }
}
