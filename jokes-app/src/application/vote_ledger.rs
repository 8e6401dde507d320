use crate::domain::{Joke, JokeId, JokeStore, VoteDirection};
use dashmap::DashMap;
use jokes_errors::AppError;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Serializes vote read-modify-write cycles per joke.
///
/// Votes on the same joke queue behind one mutex; votes on different jokes run in parallel.
#[derive(Default)]
pub struct VoteLedger {
    locks: DashMap<JokeId, Arc<Mutex<()>>>,
}

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn apply_vote<S: JokeStore + ?Sized>(
        &self,
        store: &S,
        joke_id: JokeId,
        user_id: &str,
        direction: VoteDirection,
    ) -> Result<Joke, AppError> {
        let lock = self.lock_for(joke_id);
        let guard = lock.lock().await;

        let Some(mut joke) = store.find_one(joke_id).await? else {
            drop(guard);
            self.release(joke_id, &lock);
            return Err(AppError::NotFound(joke_id));
        };

        let before = joke.vote_of(user_id);
        let after = joke.apply_vote(user_id, direction);

        let updated = store
            .find_and_update_counters(joke_id, joke.tally())
            .await?
            .ok_or(AppError::NotFound(joke_id))?;

        tracing::debug!(
            "Vote on joke {} by {}: {:?} -> {:?} (score {})",
            joke_id,
            user_id,
            before,
            after,
            updated.score()
        );

        Ok(updated)
    }

    fn lock_for(&self, joke_id: JokeId) -> Arc<Mutex<()>> {
        self.locks.entry(joke_id).or_default().clone()
    }

    /// Drops the lock entry for an id that turned out not to exist, unless someone else is waiting on it.
    fn release(&self, joke_id: JokeId, lock: &Arc<Mutex<()>>) {
        self.locks
            .remove_if(&joke_id, |_, held| Arc::ptr_eq(held, lock) && Arc::strong_count(held) == 2);
    }
}
