//! Meet-up collections stored as JSON files in the data directory.
//!
//! Each collection is one `<collection>.json` file mapping document ids to
//! fields. Observation polls the file, so changes made by another `foodie`
//! process show up in a running `foodie watch`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use foodie_core::error::CollectionError;
use foodie_core::store::{Document, DocumentCollection, Fields, SnapshotStream};
use indexmap::IndexMap;

use crate::utils::fs::{lock_exclusive, write_atomic};

type Documents = IndexMap<String, serde_json::Value>;

pub struct JsonFileCollection {
    dir: PathBuf,
    poll: Duration,
}

impl JsonFileCollection {
    pub fn new(dir: impl Into<PathBuf>, poll: Duration) -> Self {
        JsonFileCollection {
            dir: dir.into(),
            poll,
        }
    }

    fn path_for(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.json"))
    }

    /// Read-modify-write one collection file while holding its lock, so
    /// writes from other processes are never lost. `apply` returns whether it
    /// changed anything worth writing.
    fn modify<T>(
        &self,
        collection: &str,
        apply: impl FnOnce(&mut Documents) -> Result<(T, bool), CollectionError>,
    ) -> Result<T, CollectionError> {
        let path = self.path_for(collection);
        let _lock = lock_exclusive(&path).map_err(|e| io_error(&path, e))?;

        let mut documents = read_documents(&path)?;
        let (result, changed) = apply(&mut documents)?;
        if changed {
            write_documents(&path, &documents)?;
        }
        Ok(result)
    }
}

fn io_error(path: &Path, e: impl std::fmt::Display) -> CollectionError {
    CollectionError::Transport(format!("{}: {e}", path.display()))
}

fn read_documents(path: &Path) -> Result<Documents, CollectionError> {
    if !path.exists() {
        return Ok(Documents::new());
    }

    let content = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    if content.trim().is_empty() {
        return Ok(Documents::new());
    }
    serde_json::from_str(&content).map_err(|e| io_error(path, e))
}

fn write_documents(path: &Path, documents: &Documents) -> Result<(), CollectionError> {
    let content = serde_json::to_string_pretty(documents).map_err(|e| io_error(path, e))?;
    write_atomic(path, content.as_bytes()).map_err(|e| io_error(path, e))
}

fn snapshot(documents: Documents) -> Vec<Document> {
    documents
        .into_iter()
        .filter_map(|(id, value)| match value {
            serde_json::Value::Object(fields) => Some(Document { id, fields }),
            _ => {
                tracing::warn!(%id, "ignoring non-object document");
                None
            }
        })
        .collect()
}

#[async_trait]
impl DocumentCollection for JsonFileCollection {
    async fn add_document(
        &self,
        collection: &str,
        fields: Fields,
    ) -> Result<String, CollectionError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        self.modify(collection, |documents| {
            documents.insert(id.clone(), serde_json::Value::Object(fields));
            Ok(((), true))
        })?;
        Ok(id)
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), CollectionError> {
        self.modify(collection, |documents| {
            let Some(serde_json::Value::Object(existing)) = documents.get_mut(id) else {
                return Err(CollectionError::NotFound(id.to_string()));
            };
            existing.extend(fields);
            Ok(((), true))
        })
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), CollectionError> {
        self.modify(collection, |documents| {
            let removed = documents.shift_remove(id).is_some();
            Ok(((), removed))
        })
    }

    fn observe(&self, collection: &str) -> SnapshotStream {
        let path = self.path_for(collection);
        let poll = self.poll;
        let initial: Option<Vec<Document>> = None;

        let stream = futures::stream::unfold((path, initial), move |(path, last)| async move {
            if last.is_some() {
                tokio::time::sleep(poll).await;
            }
            let mut last = last;
            loop {
                match read_documents(&path) {
                    Ok(documents) => {
                        let current = snapshot(documents);
                        if last.as_ref() != Some(&current) {
                            return Some((current.clone(), (path, Some(current))));
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "could not read meet-ups"),
                }
                if last.is_none() {
                    // Unreadable on first read; report an empty collection.
                    last = Some(Vec::new());
                    return Some((Vec::new(), (path, last)));
                }
                tokio::time::sleep(poll).await;
            }
        });

        Box::pin(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::json;
    use tempfile::TempDir;

    fn fields(restaurant: &str) -> Fields {
        json!({ "restaurant": restaurant }).as_object().cloned().unwrap()
    }

    fn collection(dir: &TempDir) -> JsonFileCollection {
        JsonFileCollection::new(dir.path(), Duration::from_millis(10))
    }

    #[tokio::test]
    async fn writes_survive_a_new_instance() {
        let dir = TempDir::new().unwrap();
        let id = collection(&dir)
            .add_document("meetups", fields("Pho House"))
            .await
            .unwrap();

        let content = std::fs::read_to_string(dir.path().join("meetups.json")).unwrap();
        let stored: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(stored[id.as_str()]["restaurant"], "Pho House");
    }

    #[tokio::test]
    async fn update_merges_and_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = collection(&dir);
        let mut initial = fields("A");
        initial.insert("userId".into(), json!("user-1"));
        let id = store.add_document("meetups", initial).await.unwrap();

        store
            .update_document("meetups", &id, fields("B"))
            .await
            .unwrap();
        let err = store
            .update_document("meetups", "missing", fields("C"))
            .await
            .unwrap_err();

        assert_eq!(err, CollectionError::NotFound("missing".into()));
        let mut snapshots = store.observe("meetups");
        let docs = snapshots.next().await.unwrap();
        assert_eq!(docs[0].fields["restaurant"], "B");
        assert_eq!(docs[0].fields["userId"], "user-1");
    }

    #[tokio::test]
    async fn delete_of_missing_document_succeeds() {
        let dir = TempDir::new().unwrap();
        let store = collection(&dir);
        store.delete_document("meetups", "missing").await.unwrap();
        assert!(!dir.path().join("meetups.json").exists());
    }

    #[tokio::test]
    async fn observe_reports_current_then_changes() {
        let dir = TempDir::new().unwrap();
        let store = collection(&dir);
        let mut snapshots = store.observe("meetups");

        assert!(snapshots.next().await.unwrap().is_empty());

        // A second instance stands in for another process.
        let other = collection(&dir);
        let id = other
            .add_document("meetups", fields("Pho House"))
            .await
            .unwrap();

        let changed = tokio::time::timeout(Duration::from_secs(2), snapshots.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].id, id);
    }

    #[tokio::test]
    async fn corrupt_file_is_a_transport_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("meetups.json"), "not json").unwrap();

        let err = collection(&dir)
            .add_document("meetups", fields("A"))
            .await
            .unwrap_err();
        assert!(matches!(err, CollectionError::Transport(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_lose_nothing() {
        let dir = TempDir::new().unwrap();

        let writers: Vec<_> = (0..4)
            .map(|writer| {
                let store = collection(&dir);
                tokio::spawn(async move {
                    for n in 0..10 {
                        store
                            .add_document("meetups", fields(&format!("{writer}-{n}")))
                            .await
                            .unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap();
        }

        let docs = collection(&dir).observe("meetups").next().await.unwrap();
        assert_eq!(docs.len(), 40);
    }
}
