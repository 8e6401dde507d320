mod joke_cache;
mod joke_service;
mod vote_ledger;
mod weighted_sampler;

pub use joke_cache::{JokeCache, DEFAULT_CACHE_TTL};
pub use joke_service::JokeService;
pub use vote_ledger::VoteLedger;
pub use weighted_sampler::{weight_for, WeightedSampler, DEFAULT_RECENT_WINDOW};
