//! Live in-process document store.
//!
//! Documents are JSON values grouped into named collections and addressed
//! by id, mirroring the hosted-store layout (`users`, `users/{uid}/friends`,
//! `friendRequests`, `events`). Consumers either read point-in-time state
//! (`get`/`query`) or subscribe to a collection and receive the full
//! matching document set again after every commit - snapshots are
//! authoritative replacements, never diffs.
//!
//! Single-document writes go through [`LiveStore::set`] and friends;
//! logical operations spanning several documents (friend-edge pairs and the
//! request they retire) use a [`WriteBatch`], which commits atomically:
//! subscribers observe either none or all of its writes.

mod batch;
mod merge;
pub mod paths;
mod subscribe;

pub use batch::WriteBatch;
pub use subscribe::Subscription;

use batch::WriteOp;
use huddle_core::{HuddleError, HuddleResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

/// One stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    pub fn parse<T: DeserializeOwned>(&self) -> HuddleResult<T> {
        serde_json::from_value(self.data.clone())
            .map_err(|e| HuddleError::Serialization(e.to_string()))
    }
}

/// The full matching document set at one point in time.
pub type Snapshot = Vec<Document>;

/// Serialize a typed record into its document form.
pub fn to_doc<T: Serialize>(value: &T) -> HuddleResult<Value> {
    serde_json::to_value(value).map_err(|e| HuddleError::Serialization(e.to_string()))
}

/// Document filter applied by queries and subscriptions.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every document in the collection.
    All,
    /// Top-level field equals the value.
    Eq(String, Value),
    /// Array-valued field contains at least one of the values.
    ContainsAny(String, Vec<Value>),
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Filter::Eq(field.to_string(), value.into())
    }

    pub fn contains_any<I, V>(field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::ContainsAny(
            field.to_string(),
            values.into_iter().map(Into::into).collect(),
        )
    }

    fn matches(&self, data: &Value) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(field, value) => data.get(field) == Some(value),
            Filter::ContainsAny(field, values) => data
                .get(field)
                .and_then(Value::as_array)
                .is_some_and(|array| array.iter().any(|item| values.contains(item))),
        }
    }
}

/// State of a document as the batch staged so far would leave it.
fn staged(
    pending: &[(String, String, Option<Value>)],
    inner: &StoreInner,
    collection: &str,
    id: &str,
) -> Option<Value> {
    pending
        .iter()
        .rev()
        .find(|(c, i, _)| c == collection && i == id)
        .map(|(_, _, data)| data.clone())
        .unwrap_or_else(|| inner.doc(collection, id).cloned())
}

struct Subscriber {
    collection: String,
    filter: Filter,
    tx: mpsc::UnboundedSender<Snapshot>,
}

#[derive(Default)]
struct StoreInner {
    collections: HashMap<String, BTreeMap<String, Value>>,
    subscribers: Vec<Subscriber>,
}

impl StoreInner {
    fn doc(&self, collection: &str, id: &str) -> Option<&Value> {
        self.collections.get(collection)?.get(id)
    }

    fn snapshot(&self, collection: &str, filter: &Filter) -> Snapshot {
        let Some(docs) = self.collections.get(collection) else {
            return Vec::new();
        };
        docs.iter()
            .filter(|(_, data)| filter.matches(data))
            .map(|(id, data)| Document {
                id: id.clone(),
                data: data.clone(),
            })
            .collect()
    }

    /// Re-deliver snapshots to every subscriber of a touched collection,
    /// dropping subscribers whose receiving end is gone.
    fn notify(&mut self, touched: &HashSet<String>) {
        let mut live = Vec::with_capacity(self.subscribers.len());
        for subscriber in std::mem::take(&mut self.subscribers) {
            if !touched.contains(&subscriber.collection) {
                live.push(subscriber);
                continue;
            }
            let snapshot = self.snapshot(&subscriber.collection, &subscriber.filter);
            if subscriber.tx.send(snapshot).is_ok() {
                live.push(subscriber);
            }
        }
        self.subscribers = live;
    }
}

/// Handle to the shared store. Cheap to clone.
#[derive(Clone, Default)]
pub struct LiveStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl LiveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a single document.
    pub async fn get(&self, collection: &str, id: &str) -> Option<Document> {
        let inner = self.inner.lock().await;
        inner.doc(collection, id).map(|data| Document {
            id: id.to_string(),
            data: data.clone(),
        })
    }

    /// Read every document matching the filter.
    pub async fn query(&self, collection: &str, filter: &Filter) -> Snapshot {
        let inner = self.inner.lock().await;
        inner.snapshot(collection, filter)
    }

    /// Write a document, replacing any existing content.
    pub async fn set(&self, collection: &str, id: &str, data: Value) -> HuddleResult<()> {
        self.apply(WriteBatch::new().set(collection, id, data)).await
    }

    /// Write a document only if it does not exist yet.
    pub async fn create(&self, collection: &str, id: &str, data: Value) -> HuddleResult<()> {
        self.apply(WriteBatch::new().create(collection, id, data))
            .await
    }

    /// Merge fields into an existing document. Field names may use dotted
    /// paths (`attendees.u1`) to address nested values.
    pub async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: serde_json::Map<String, Value>,
    ) -> HuddleResult<()> {
        self.apply(WriteBatch::new().update(collection, id, fields))
            .await
    }

    /// Delete a document. Deleting a missing document is a no-op.
    pub async fn delete(&self, collection: &str, id: &str) -> HuddleResult<()> {
        self.apply(WriteBatch::new().delete(collection, id)).await
    }

    /// Insert a document under a generated id and return the id.
    pub async fn add(&self, collection: &str, data: Value) -> HuddleResult<String> {
        let id = Uuid::new_v4().to_string();
        self.set(collection, &id, data).await?;
        Ok(id)
    }

    /// Subscribe to a collection. The current snapshot is delivered
    /// immediately, then again after every commit touching the collection.
    /// Dropping the subscription releases the listener.
    pub async fn subscribe(&self, collection: &str, filter: Filter) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().await;

        let initial = inner.snapshot(collection, &filter);
        // Send cannot fail here: we still hold the receiver.
        let _ = tx.send(initial);

        inner.subscribers.push(Subscriber {
            collection: collection.to_string(),
            filter,
            tx,
        });

        Subscription::new(rx)
    }

    /// Commit a batch atomically: the whole batch is validated against
    /// current state first, and subscribers observe either none or all of
    /// its writes.
    pub async fn apply(&self, batch: WriteBatch) -> HuddleResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut inner = self.inner.lock().await;

        // Stage every op against an overlay of pending state so a failing
        // op aborts the batch before anything is visible.
        let mut pending: Vec<(String, String, Option<Value>)> = Vec::new();

        for op in &batch.ops {
            match op {
                WriteOp::Set { collection, id, data } => {
                    pending.push((collection.clone(), id.clone(), Some(data.clone())));
                }
                WriteOp::Create { collection, id, data } => {
                    if staged(&pending, &inner, collection, id).is_some() {
                        return Err(HuddleError::AlreadyExists(format!("{collection}/{id}")));
                    }
                    pending.push((collection.clone(), id.clone(), Some(data.clone())));
                }
                WriteOp::Update { collection, id, fields } => {
                    let Some(mut data) = staged(&pending, &inner, collection, id) else {
                        return Err(HuddleError::NotFound(format!("{collection}/{id}")));
                    };
                    merge::apply_fields(&mut data, fields)?;
                    pending.push((collection.clone(), id.clone(), Some(data)));
                }
                WriteOp::Delete { collection, id } => {
                    pending.push((collection.clone(), id.clone(), None));
                }
            }
        }

        // Commit and notify in one critical section so every subscriber
        // sees the batch as a single transition.
        let mut touched = HashSet::new();
        for (collection, id, data) in pending {
            let docs = inner.collections.entry(collection.clone()).or_default();
            match data {
                Some(data) => {
                    docs.insert(id, data);
                }
                None => {
                    docs.remove(&id);
                }
            }
            touched.insert(collection);
        }
        tracing::debug!(collections = ?touched, "store commit");
        inner.notify(&touched);

        Ok(())
    }
}
