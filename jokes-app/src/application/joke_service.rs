use super::{JokeCache, WeightedSampler};
use crate::domain::{Joke, JokeId, JokeStore, VoteDirection};
use crate::infrastructure::security::InputSanitizer;
use jokes_errors::AppError;
use std::sync::Arc;
use std::time::Duration;

/// Entry point for front ends: listing, submission, voting and sampling.
pub struct JokeService {
    cache: JokeCache,
    sampler: WeightedSampler,
    max_len: usize,
}

impl JokeService {
    pub fn new(
        store: Arc<dyn JokeStore>,
        cache_ttl: Duration,
        recent_window: usize,
        max_len: usize,
    ) -> Self {
        Self {
            cache: JokeCache::new(store, cache_ttl),
            sampler: WeightedSampler::new(recent_window),
            max_len,
        }
    }

    pub async fn list_items(&self) -> Result<Arc<Vec<Joke>>, AppError> {
        self.cache.list().await
    }

    pub async fn find_item(&self, id: JokeId) -> Result<Joke, AppError> {
        self.cache
            .list()
            .await?
            .iter()
            .find(|j| j.id == id)
            .cloned()
            .ok_or(AppError::NotFound(id))
    }

    pub async fn submit_item(
        &self,
        text: &str,
        author: &str,
        author_id: &str,
    ) -> Result<Joke, AppError> {
        let text = InputSanitizer::validate_joke(text, self.max_len)?;
        let author = InputSanitizer::validate_identity(author, "author")?;
        let author_id = InputSanitizer::validate_identity(author_id, "author id")?;
        self.cache.insert(text, author, author_id).await
    }

    pub async fn sample_for_requester(&self, requester_id: &str) -> Result<Joke, AppError> {
        let jokes = self.cache.list().await?;
        self.sampler.sample(&jokes, requester_id)
    }

    pub async fn cast_vote(
        &self,
        joke_id: JokeId,
        requester_id: &str,
        is_upvote: bool,
    ) -> Result<Joke, AppError> {
        let requester_id = InputSanitizer::validate_identity(requester_id, "voter id")?;
        self.cache
            .vote(joke_id, &requester_id, VoteDirection::from_upvote(is_upvote))
            .await
    }

    /// Jokes held back from `requester_id`'s next sample, oldest first.
    pub fn recently_shown(&self, requester_id: &str) -> Vec<JokeId> {
        self.sampler.recent_for(requester_id)
    }
}
