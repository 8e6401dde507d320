use crate::domain::{Joke, JokeStore};
use jokes_errors::AppError;

const DEFAULT_JOKES: &[&str] = &[
    "Why do programmers prefer dark mode?....... because light attracts bugs",
    "Why did the bicycle fall over?....... it was two tired",
    "Why was the math book sad?....... it had too many problems",
    "What do you call a fake noodle?....... an impasta",
    "Why don't skeletons fight each other?....... they don't have the guts",
    "Why did the scarecrow win an award?....... he was outstanding in his field",
    "A guy bought a green pen..... and went looking for its pod",
    "What do you call a bear with no teeth?....... a gummy bear",
    "What did the ocean say to the beach?....... nothing, it just waved",
];

/// Fills an empty store with the system jokes. Returns how many were inserted.
pub async fn seed_default_jokes<S: JokeStore + ?Sized>(store: &S) -> Result<usize, AppError> {
    if !store.load_all().await?.is_empty() {
        return Ok(0);
    }

    tracing::info!("Initializing store with default jokes...");
    for (id, text) in (1..).zip(DEFAULT_JOKES) {
        store.insert_one(&Joke::system(id, text)).await?;
    }
    tracing::info!("Inserted {} default jokes", DEFAULT_JOKES.len());

    Ok(DEFAULT_JOKES.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryStore;

    #[tokio::test]
    async fn test_seeds_empty_store_once() {
        let store = MemoryStore::new();
        let inserted = seed_default_jokes(&store).await.unwrap();
        assert_eq!(inserted, DEFAULT_JOKES.len());

        let jokes = store.load_all().await.unwrap();
        assert!(jokes.iter().all(|j| j.is_system() && j.score() == 0));
        let ids: Vec<_> = jokes.iter().map(|j| j.id).collect();
        assert_eq!(ids, (1..=DEFAULT_JOKES.len() as i64).collect::<Vec<_>>());

        assert_eq!(seed_default_jokes(&store).await.unwrap(), 0);
        assert_eq!(store.load_all().await.unwrap().len(), DEFAULT_JOKES.len());
    }

    #[tokio::test]
    async fn test_leaves_populated_store_alone() {
        let store = MemoryStore::with_jokes(vec![Joke::submitted(
            1,
            "mine".into(),
            "bob".into(),
            "7".into(),
        )]);
        assert_eq!(seed_default_jokes(&store).await.unwrap(), 0);
        assert_eq!(store.load_all().await.unwrap().len(), 1);
    }
}
