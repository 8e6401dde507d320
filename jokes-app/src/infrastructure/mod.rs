mod memory;
mod seed;
pub mod security;

#[cfg(feature = "db")]
pub mod db;

pub use memory::MemoryStore;
pub use seed::seed_default_jokes;
