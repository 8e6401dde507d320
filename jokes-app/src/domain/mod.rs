mod joke;
mod store;
mod vote;

pub use joke::{Joke, JokeId, HALL_OF_FAME_SCORE, SYSTEM_AUTHOR_ID, SYSTEM_AUTHOR_NAME};
pub use store::JokeStore;
pub use vote::{VoteDirection, VoteMarker, VoteState, VoteTally};
