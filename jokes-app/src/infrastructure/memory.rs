use crate::domain::{Joke, JokeId, JokeStore, VoteTally};
use async_trait::async_trait;
use jokes_errors::AppError;
use tokio::sync::RwLock;

/// Process-local store; contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    jokes: RwLock<Vec<Joke>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jokes(jokes: Vec<Joke>) -> Self {
        let mut jokes = jokes;
        jokes.sort_by_key(|j| j.id);
        Self {
            jokes: RwLock::new(jokes),
        }
    }
}

#[async_trait]
impl JokeStore for MemoryStore {
    async fn load_all(&self) -> Result<Vec<Joke>, AppError> {
        Ok(self.jokes.read().await.clone())
    }

    async fn find_one(&self, id: JokeId) -> Result<Option<Joke>, AppError> {
        Ok(self.jokes.read().await.iter().find(|j| j.id == id).cloned())
    }

    async fn next_id(&self) -> Result<JokeId, AppError> {
        let jokes = self.jokes.read().await;
        Ok(jokes.iter().map(|j| j.id).max().map_or(1, |max| max + 1))
    }

    async fn insert_one(&self, joke: &Joke) -> Result<(), AppError> {
        let mut jokes = self.jokes.write().await;
        if jokes.iter().any(|j| j.id == joke.id) {
            return Err(AppError::storage(format!("duplicate joke id {}", joke.id)));
        }
        jokes.push(joke.clone());
        Ok(())
    }

    async fn find_and_update_counters(
        &self,
        id: JokeId,
        tally: &VoteTally,
    ) -> Result<Option<Joke>, AppError> {
        let mut jokes = self.jokes.write().await;
        let Some(slot) = jokes.iter_mut().find(|j| j.id == id) else {
            return Ok(None);
        };
        let current = slot.clone();
        *slot = Joke::restore(
            current.id,
            current.text,
            current.author,
            current.author_id,
            current.created_at,
            tally.clone(),
        );
        Ok(Some(slot.clone()))
    }
}
