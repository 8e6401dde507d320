use super::vote::{VoteDirection, VoteMarker, VoteState, VoteTally};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

pub type JokeId = i64;

/// Author id reserved for jokes seeded by the system itself.
pub const SYSTEM_AUTHOR_ID: &str = "system";
pub const SYSTEM_AUTHOR_NAME: &str = "System";

/// Jokes at or above this score are shown with a star.
pub const HALL_OF_FAME_SCORE: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Joke {
    pub id: JokeId,
    pub text: String,
    pub author: String,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    tally: VoteTally,
    score: i64,
}

impl Joke {
    /// A freshly submitted joke: zero counters, no voters.
    pub fn submitted(id: JokeId, text: String, author: String, author_id: String) -> Self {
        Self::restore(id, text, author, author_id, Utc::now(), VoteTally::default())
    }

    pub fn system(id: JokeId, text: &str) -> Self {
        Self::submitted(
            id,
            text.to_string(),
            SYSTEM_AUTHOR_NAME.to_string(),
            SYSTEM_AUTHOR_ID.to_string(),
        )
    }

    /// Rebuilds a joke read back from storage. The score is always derived from the counters.
    pub fn restore(
        id: JokeId,
        text: String,
        author: String,
        author_id: String,
        created_at: DateTime<Utc>,
        tally: VoteTally,
    ) -> Self {
        let score = tally.score();
        Self {
            id,
            text,
            author,
            author_id,
            created_at,
            tally,
            score,
        }
    }

    pub fn apply_vote(&mut self, user_id: &str, direction: VoteDirection) -> VoteState {
        let state = self.tally.apply(user_id, direction);
        self.score = self.tally.score();
        state
    }

    pub fn tally(&self) -> &VoteTally {
        &self.tally
    }

    pub fn upvotes(&self) -> u32 {
        self.tally.upvotes
    }

    pub fn downvotes(&self) -> u32 {
        self.tally.downvotes
    }

    pub fn voters(&self) -> &BTreeSet<VoteMarker> {
        &self.tally.voters
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn vote_of(&self, user_id: &str) -> VoteState {
        self.tally.state_of(user_id)
    }

    pub fn is_hall_of_fame(&self) -> bool {
        self.score >= HALL_OF_FAME_SCORE
    }

    pub fn is_system(&self) -> bool {
        self.author_id == SYSTEM_AUTHOR_ID
    }

    pub fn summary(&self) -> String {
        let star = if self.is_hall_of_fame() { " ⭐" } else { "" };
        format!(
            "#{} {}{}\n  by {} | score {:+} (up {} / down {})",
            self.id,
            self.text,
            star,
            self.author,
            self.score,
            self.tally.upvotes,
            self.tally.downvotes,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submitted_joke_starts_at_zero() {
        let joke = Joke::submitted(7, "knock knock".into(), "alice".into(), "42".into());
        assert_eq!((joke.upvotes(), joke.downvotes(), joke.score()), (0, 0, 0));
        assert!(joke.voters().is_empty());
        assert!(!joke.is_system());
    }

    #[test]
    fn test_restore_recomputes_score() {
        let tally = VoteTally {
            upvotes: 12,
            downvotes: 1,
            voters: BTreeSet::new(),
        };
        let joke = Joke::restore(1, "x".into(), "a".into(), "1".into(), Utc::now(), tally);
        assert_eq!(joke.score(), 11);
        assert!(joke.is_hall_of_fame());
        assert!(joke.summary().contains("⭐"));
        assert!(joke.summary().contains("score +11"));
    }

    #[test]
    fn test_apply_vote_keeps_score_in_sync() {
        let mut joke = Joke::system(1, "why did the crab cross the road?");
        assert!(joke.is_system());
        joke.apply_vote("u1", VoteDirection::Down);
        assert_eq!(joke.score(), -1);
        assert_eq!(joke.vote_of("u1"), VoteState::Down);
        assert!(joke.summary().contains("score -1"));
        joke.apply_vote("u1", VoteDirection::Up);
        assert_eq!(joke.score(), 1);
        assert_eq!(joke.vote_of("u1"), VoteState::Up);
    }
}
