//! Domain collections — per-entity caches kept in step with the backend.
//!
//! A [`Collection`] mutates its cache only after the backend confirms a call.
//! There is no optimistic update, no rollback and no automatic retry.
//!
//! Two rules tighten the raw "last response wins" behaviour:
//! - overlapping `update`/`remove` calls on the same id are rejected with
//!   [`ClientError::MutationInFlight`] before anything is sent;
//! - a call that resolves after the session changed is discarded and reports
//!   [`ClientError::SessionEnded`].

pub mod documents;
pub mod profile;

use std::collections::HashSet;

use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::api_client::ApiClient;
use crate::errors::ClientError;
use crate::models::{RecordId, Validate};

pub use profile::ProfileCollections;

/// A backend entity that lives in a [`Collection`].
pub trait Record: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// Payload sent to create a record.
    type Draft: Serialize + Validate + Send + Sync;
    /// Payload sent to update a record.
    type Patch: Serialize + Validate + Send + Sync;

    /// Collection path under the API prefix, e.g. `/profile/experiences`.
    const ENDPOINT: &'static str;
    /// Singular name used in log lines and error messages.
    const NOUN: &'static str;

    fn id(&self) -> &RecordId;
}

struct CacheState<R> {
    items: Vec<R>,
    /// Session epoch the items belong to.
    epoch: u64,
    loading: usize,
    last_error: Option<String>,
    in_flight: HashSet<RecordId>,
}

impl<R> Default for CacheState<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            epoch: 0,
            loading: 0,
            last_error: None,
            in_flight: HashSet::new(),
        }
    }
}

/// Marks one call as in flight. Dropping it lowers the loading count and
/// releases the id reservation, on success, failure, or a dropped future.
/// Reservations belong to the session they were taken in.
struct Ticket<'a, R: Record> {
    collection: &'a Collection<R>,
    epoch: u64,
    id: Option<RecordId>,
}

impl<R: Record> Drop for Ticket<'_, R> {
    fn drop(&mut self) {
        let mut state = self.collection.state.lock();
        state.loading = state.loading.saturating_sub(1);
        // a newer session may have reserved the same id since
        if let Some(id) = self.id.as_ref().filter(|_| state.epoch == self.epoch) {
            state.in_flight.remove(id);
        }
    }
}

pub struct Collection<R: Record> {
    client: ApiClient,
    state: Mutex<CacheState<R>>,
}

impl<R: Record> Collection<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: Mutex::new(CacheState::default()),
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Operations
    // ────────────────────────────────────────────────────────────────────────

    /// Replaces the cache with the backend's current list.
    /// On failure the previous cache stays as it was.
    pub async fn load(&self) -> Result<(), ClientError> {
        let ticket = self.begin(None)?;
        let result = self
            .client
            .get::<Vec<R>>(R::ENDPOINT)
            .await
            .and_then(ensure_unique_ids);

        self.settle(ticket, result, "load", |items, fetched: Vec<R>| {
            debug!("Loaded {} {} record(s)", fetched.len(), R::NOUN);
            *items = fetched;
        })
    }

    /// Persists `draft` and appends the server-returned record.
    pub async fn create(&self, draft: &R::Draft) -> Result<R, ClientError> {
        self.validate(draft, "add")?;
        let ticket = self.begin(None)?;
        let result = self.client.post::<_, R>(R::ENDPOINT, draft).await;
        self.settle(ticket, result, "add", append)
    }

    /// Persists `patch` and replaces the cached entry with the server's copy.
    ///
    /// When `id` is not cached the cache is left untouched; a later `load`
    /// reconciles it.
    pub async fn update(&self, id: &RecordId, patch: &R::Patch) -> Result<R, ClientError> {
        self.validate(patch, "update")?;
        let ticket = self.begin(Some(id))?;
        let result = self
            .client
            .put::<_, R>(&self.record_path(id), patch)
            .await
            .and_then(|record| ensure_same_id(id, record));

        self.settle(ticket, result, "update", |items, record: R| {
            match items.iter_mut().find(|r| r.id() == record.id()) {
                Some(slot) => *slot = record.clone(),
                None => warn!(
                    "Updated {} {} is not cached; cache left as is until the next load",
                    R::NOUN,
                    record.id()
                ),
            }
            record
        })
    }

    /// Deletes the record and drops it from the cache once the backend confirms.
    pub async fn remove(&self, id: &RecordId) -> Result<(), ClientError> {
        let ticket = self.begin(Some(id))?;
        let result = self.client.delete(&self.record_path(id)).await;
        self.settle(ticket, result, "delete", |items, ()| {
            items.retain(|r| r.id() != id);
        })
    }

    /// Fetches one record from the backend. The cache is not touched.
    pub async fn get(&self, id: &RecordId) -> Result<R, ClientError> {
        self.client
            .get::<R>(&self.record_path(id))
            .await
            .and_then(|record| ensure_same_id(id, record))
    }

    // ────────────────────────────────────────────────────────────────────────
    // Cache accessors
    // ────────────────────────────────────────────────────────────────────────

    /// Snapshot of the cached records, in backend order.
    pub fn items(&self) -> Vec<R> {
        self.current().items.clone()
    }

    pub fn find(&self, id: &RecordId) -> Option<R> {
        self.current().items.iter().find(|r| r.id() == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.current().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading > 0
    }

    pub fn last_error(&self) -> Option<String> {
        self.current().last_error.clone()
    }

    /// Drops every cached record and the last error.
    pub fn clear(&self) {
        let mut state = self.current();
        state.items.clear();
        state.last_error = None;
    }

    // ────────────────────────────────────────────────────────────────────────
    // Internals
    // ────────────────────────────────────────────────────────────────────────

    fn failure_message(verb: &str) -> String {
        format!("Failed to {verb} {}", R::NOUN)
    }

    fn record_path(&self, id: &RecordId) -> String {
        format!("{}/{}", R::ENDPOINT, id)
    }

    /// Locks the state, first discarding a cache left over from another session.
    fn current(&self) -> parking_lot::MutexGuard<'_, CacheState<R>> {
        let mut state = self.state.lock();
        self.sync_epoch(&mut state);
        state
    }

    fn sync_epoch(&self, state: &mut CacheState<R>) {
        let epoch = self.client.session().epoch();
        if state.epoch != epoch {
            if !state.items.is_empty() {
                debug!(
                    "Dropping {} cached {} record(s) from a previous session",
                    state.items.len(),
                    R::NOUN
                );
            }
            state.items.clear();
            state.last_error = None;
            state.in_flight.clear();
            state.epoch = epoch;
        }
    }

    fn validate<V: Validate>(&self, payload: &V, verb: &str) -> Result<(), ClientError> {
        payload.validate().map_err(|e| {
            self.current().last_error = Some(e.user_message(&Self::failure_message(verb)));
            e
        })
    }

    fn begin(&self, id: Option<&RecordId>) -> Result<Ticket<'_, R>, ClientError> {
        let mut state = self.current();
        if let Some(id) = id {
            if !state.in_flight.insert(id.clone()) {
                warn!("Rejected overlapping mutation of {} {id}", R::NOUN);
                return Err(ClientError::MutationInFlight(id.clone()));
            }
        }
        state.loading += 1;
        let epoch = state.epoch;
        drop(state);

        Ok(Ticket {
            collection: self,
            epoch,
            id: id.cloned(),
        })
    }

    /// Applies a finished call to the cache.
    ///
    /// The cache changes iff the call succeeded under the session it was
    /// dispatched in.
    fn settle<T, U>(
        &self,
        ticket: Ticket<'_, R>,
        result: Result<T, ClientError>,
        verb: &str,
        apply: impl FnOnce(&mut Vec<R>, T) -> U,
    ) -> Result<U, ClientError> {
        let outcome = {
            let mut state = self.current();
            match result {
                Err(e) => {
                    state.last_error = Some(e.user_message(&Self::failure_message(verb)));
                    Err(e)
                }
                Ok(_) if state.epoch != ticket.epoch => {
                    warn!(
                        "Discarding {verb} result for {}: session changed while in flight",
                        R::NOUN
                    );
                    Err(ClientError::SessionEnded)
                }
                Ok(value) => {
                    state.last_error = None;
                    Ok(apply(&mut state.items, value))
                }
            }
        };
        drop(ticket);
        outcome
    }
}

fn append<R: Record>(items: &mut Vec<R>, record: R) -> R {
    match items.iter_mut().find(|r| r.id() == record.id()) {
        Some(slot) => {
            warn!("Backend returned already-cached {} {}; replacing", R::NOUN, record.id());
            *slot = record.clone();
        }
        None => items.push(record.clone()),
    }
    record
}

fn ensure_unique_ids<R: Record>(records: Vec<R>) -> Result<Vec<R>, ClientError> {
    {
        let mut seen = HashSet::with_capacity(records.len());
        if let Some(dup) = records.iter().find(|r| !seen.insert(r.id())) {
            return Err(ClientError::Decode(format!(
                "duplicate {} id {} in list response",
                R::NOUN,
                dup.id()
            )));
        }
    }
    Ok(records)
}

fn ensure_same_id<R: Record>(requested: &RecordId, record: R) -> Result<R, ClientError> {
    if record.id() != requested {
        return Err(ClientError::Decode(format!(
            "asked for {} {requested} but the backend returned {}",
            R::NOUN,
            record.id()
        )));
    }
    Ok(record)
}
