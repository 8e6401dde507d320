use super::VoteLedger;
use crate::domain::{Joke, JokeId, JokeStore, VoteDirection};
use jokes_errors::AppError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

struct Snapshot {
    jokes: Arc<Vec<Joke>>,
    refreshed_at: Option<Instant>,
}

/// Read-through cache in front of a [`JokeStore`].
///
/// Readers get an `Arc` of the snapshot as it was when they asked; writers
/// swap in an updated copy. Listings may lag other processes' writes by up to
/// the time-to-live, but writes made through this cache are visible at once.
pub struct JokeCache {
    store: Arc<dyn JokeStore>,
    ledger: VoteLedger,
    snapshot: RwLock<Snapshot>,
    insert_lock: Mutex<()>,
    ttl: Duration,
}

impl JokeCache {
    pub fn new(store: Arc<dyn JokeStore>, ttl: Duration) -> Self {
        Self {
            store,
            ledger: VoteLedger::new(),
            snapshot: RwLock::new(Snapshot {
                jokes: Arc::new(Vec::new()),
                refreshed_at: None,
            }),
            insert_lock: Mutex::new(()),
            ttl,
        }
    }

    pub async fn list(&self) -> Result<Arc<Vec<Joke>>, AppError> {
        {
            let snapshot = self.snapshot.read().await;
            if !self.is_stale(&snapshot) {
                return Ok(snapshot.jokes.clone());
            }
        }

        let mut snapshot = self.snapshot.write().await;
        // Another caller may have reloaded while we waited for the write lock.
        if self.is_stale(&snapshot) {
            let jokes = self.store.load_all().await.inspect_err(|e| {
                tracing::error!("Failed to reload joke cache: {}", e);
            })?;
            tracing::info!("Joke cache reloaded with {} jokes", jokes.len());
            snapshot.jokes = Arc::new(jokes);
            snapshot.refreshed_at = Some(Instant::now());
        }

        Ok(snapshot.jokes.clone())
    }

    /// Stores a new joke under the next free id and appends it to the snapshot.
    pub async fn insert(
        &self,
        text: String,
        author: String,
        author_id: String,
    ) -> Result<Joke, AppError> {
        // Two concurrent inserts must not both read the same next id.
        let _guard = self.insert_lock.lock().await;

        let id = self.store.next_id().await.inspect_err(|e| {
            tracing::error!("Failed to allocate joke id: {}", e);
        })?;
        let joke = Joke::submitted(id, text, author, author_id);
        self.store.insert_one(&joke).await.inspect_err(|e| {
            tracing::error!("Failed to insert joke {}: {}", id, e);
        })?;

        let mut snapshot = self.snapshot.write().await;
        let jokes = Arc::make_mut(&mut snapshot.jokes);
        // A reload racing with this insert may already have picked the row up.
        match jokes.iter_mut().find(|j| j.id == id) {
            Some(slot) => *slot = joke.clone(),
            None => jokes.push(joke.clone()),
        }

        tracing::info!("Joke {} submitted by {}", id, joke.author);
        Ok(joke)
    }

    pub async fn vote(
        &self,
        joke_id: JokeId,
        user_id: &str,
        direction: VoteDirection,
    ) -> Result<Joke, AppError> {
        let updated = self
            .ledger
            .apply_vote(self.store.as_ref(), joke_id, user_id, direction)
            .await
            .inspect_err(|e| {
                if e.is_transient() {
                    tracing::error!("Failed to record vote on joke {}: {}", joke_id, e);
                }
            })?;

        let mut snapshot = self.snapshot.write().await;
        if let Some(index) = snapshot.jokes.iter().position(|j| j.id == joke_id) {
            Arc::make_mut(&mut snapshot.jokes)[index] = updated.clone();
        }

        Ok(updated)
    }

    /// Marks the snapshot stale so the next [`list`](Self::list) reloads from the store.
    pub async fn invalidate(&self) {
        self.snapshot.write().await.refreshed_at = None;
    }

    fn is_stale(&self, snapshot: &Snapshot) -> bool {
        snapshot.jokes.is_empty()
            || snapshot
                .refreshed_at
                .map_or(true, |at| at.elapsed() > self.ttl)
    }
}
