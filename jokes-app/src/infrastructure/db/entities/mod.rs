pub mod joke;
pub mod joke_vote;

pub use joke::Entity as Joke;
pub use joke_vote::Entity as JokeVote;
