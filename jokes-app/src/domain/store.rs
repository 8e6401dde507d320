use super::{Joke, JokeId, VoteTally};
use async_trait::async_trait;
use jokes_errors::AppError;

/// Persistence contract the joke engine relies on.
///
/// Any failure is reported as [`AppError::StorageUnavailable`]; implementations
/// never substitute an empty result for an error.
#[async_trait]
pub trait JokeStore: Send + Sync {
    /// Every joke, in a stable order (ascending id).
    async fn load_all(&self) -> Result<Vec<Joke>, AppError>;

    async fn find_one(&self, id: JokeId) -> Result<Option<Joke>, AppError>;

    /// `max(id) + 1`, or `1` when the store is empty.
    async fn next_id(&self) -> Result<JokeId, AppError>;

    async fn insert_one(&self, joke: &Joke) -> Result<(), AppError>;

    /// Overwrites the joke's counters, voters and score in one step.
    /// Returns `None` when no joke has this id.
    async fn find_and_update_counters(
        &self,
        id: JokeId,
        tally: &VoteTally,
    ) -> Result<Option<Joke>, AppError>;
}
