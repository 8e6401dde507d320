use crate::application::JokeService;
use crate::domain::JokeStore;
use crate::infrastructure::{seed_default_jokes, MemoryStore};
use crate::Config;
use jokes_errors::AppError;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppContext {
    pub jokes: Arc<JokeService>,
}

impl AppContext {
    pub fn new(store: Arc<dyn JokeStore>, config: &Config) -> Self {
        Self {
            jokes: Arc::new(JokeService::new(
                store,
                config.cache_ttl,
                config.recent_window,
                config.max_joke_len,
            )),
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        let store = Self::open_store(config).await?;
        if config.seed_defaults {
            seed_default_jokes(store.as_ref()).await?;
        }
        Ok(Self::new(store, config))
    }

    pub async fn from_env() -> Result<Self, AppError> {
        let config = Config::load()?;
        Self::from_config(&config).await
    }

    async fn open_store(config: &Config) -> Result<Arc<dyn JokeStore>, AppError> {
        match &config.database_url {
            #[cfg(feature = "db")]
            Some(url) => {
                use crate::infrastructure::db::{create_connection, run_migrations, JokeRepository};

                let db = create_connection(url).await.map_err(AppError::storage)?;
                run_migrations(&db).await.map_err(AppError::storage)?;
                tracing::info!("Connected to Postgres joke store");
                Ok(Arc::new(JokeRepository::new(db)))
            }
            #[cfg(not(feature = "db"))]
            Some(_) => Err(AppError::Config(
                "DATABASE_URL is set but this build has no database support (enable the `db` feature)"
                    .to_string(),
            )),
            None => {
                tracing::info!("DATABASE_URL not set, using in-memory joke store");
                Ok(Arc::new(MemoryStore::new()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_context_is_seeded() {
        let ctx = AppContext::from_config(&Config::default()).await.unwrap();
        let jokes = ctx.jokes.list_items().await.unwrap();
        assert!(!jokes.is_empty());
        assert!(jokes.iter().all(|j| j.is_system()));
    }

    #[tokio::test]
    async fn test_seeding_can_be_disabled() {
        let config = Config {
            seed_defaults: false,
            ..Config::default()
        };
        let ctx = AppContext::from_config(&config).await.unwrap();
        assert!(ctx.jokes.list_items().await.unwrap().is_empty());
        assert_eq!(
            ctx.jokes.sample_for_requester("u1").await.unwrap_err(),
            AppError::EmptyPool
        );
    }
}
