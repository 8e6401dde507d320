use crate::domain::{Joke, JokeId};
use dashmap::DashMap;
use jokes_errors::AppError;
use rand::Rng;
use std::collections::VecDeque;

/// How many recently shown jokes are held back from each requester.
pub const DEFAULT_RECENT_WINDOW: usize = 3;

/// Selection weight for a joke with the given score.
///
/// | score     | weight |
/// |-----------|--------|
/// | >= 10     | 5      |
/// | 5..=9     | 3      |
/// | 1..=4     | 2      |
/// | <= -3     | 0.2    |
/// | -2..=0    | 1      |
pub fn weight_for(score: i64) -> f64 {
    if score >= 10 {
        5.0
    } else if score >= 5 {
        3.0
    } else if score >= 1 {
        2.0
    } else if score <= -3 {
        0.2
    } else {
        1.0
    }
}

/// Score-weighted random picks that avoid repeating a requester's last few jokes.
pub struct WeightedSampler {
    recent: DashMap<String, VecDeque<JokeId>>,
    window: usize,
}

impl WeightedSampler {
    pub fn new(window: usize) -> Self {
        Self {
            recent: DashMap::new(),
            window,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn sample(&self, jokes: &[Joke], requester: &str) -> Result<Joke, AppError> {
        self.sample_with(jokes, requester, &mut rand::thread_rng())
    }

    pub fn sample_with<R: Rng>(
        &self,
        jokes: &[Joke],
        requester: &str,
        rng: &mut R,
    ) -> Result<Joke, AppError> {
        if jokes.is_empty() {
            return Err(AppError::EmptyPool);
        }

        let mut recent = self.recent.entry(requester.to_string()).or_default();

        let mut candidates: Vec<&Joke> = jokes
            .iter()
            .filter(|joke| !recent.contains(&joke.id))
            .collect();
        if candidates.is_empty() {
            tracing::debug!(
                "All {} jokes recently shown to {}, resetting window",
                jokes.len(),
                requester
            );
            recent.clear();
            candidates = jokes.iter().collect();
        }

        let weights: Vec<f64> = candidates.iter().map(|j| weight_for(j.score())).collect();
        let total: f64 = weights.iter().sum();
        let draw = rng.gen_range(0.0..total);
        let selected = candidates[pick_index(&weights, draw)];

        recent.push_back(selected.id);
        while recent.len() > self.window {
            recent.pop_front();
        }

        tracing::debug!(
            "Sampled joke {} for {} (score {}, {} candidates)",
            selected.id,
            requester,
            selected.score(),
            candidates.len()
        );

        Ok(selected.clone())
    }

    /// Ids currently held back for `requester`, oldest first.
    pub fn recent_for(&self, requester: &str) -> Vec<JokeId> {
        self.recent
            .get(requester)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn forget(&self, requester: &str) {
        self.recent.remove(requester);
    }
}

impl Default for WeightedSampler {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_WINDOW)
    }
}

/// Cumulative-weight walk: the first index whose running weight reaches `draw`.
/// Falls back to the last index when rounding leaves a sliver of remainder.
fn pick_index(weights: &[f64], draw: f64) -> usize {
    let mut remaining = draw;
    for (i, weight) in weights.iter().enumerate() {
        remaining -= weight;
        if remaining <= 0.0 {
            return i;
        }
    }
    weights.len().saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VoteTally;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{BTreeSet, HashSet};

    fn joke_with_score(id: JokeId, score: i64) -> Joke {
        let tally = if score >= 0 {
            VoteTally {
                upvotes: score as u32,
                downvotes: 0,
                voters: BTreeSet::new(),
            }
        } else {
            VoteTally {
                upvotes: 0,
                downvotes: (-score) as u32,
                voters: BTreeSet::new(),
            }
        };
        Joke::restore(id, format!("joke {}", id), "a".into(), "1".into(), Utc::now(), tally)
    }

    #[test]
    fn test_weight_tiers() {
        assert_eq!(weight_for(42), 5.0);
        assert_eq!(weight_for(10), 5.0);
        assert_eq!(weight_for(9), 3.0);
        assert_eq!(weight_for(5), 3.0);
        assert_eq!(weight_for(4), 2.0);
        assert_eq!(weight_for(1), 2.0);
        assert_eq!(weight_for(0), 1.0);
        assert_eq!(weight_for(-2), 1.0);
        assert_eq!(weight_for(-3), 0.2);
        assert_eq!(weight_for(-100), 0.2);
    }

    #[test]
    fn test_pick_index_walks_cumulative_weights() {
        let weights = [1.0, 2.0, 5.0];
        assert_eq!(pick_index(&weights, 0.0), 0);
        assert_eq!(pick_index(&weights, 1.0), 0);
        assert_eq!(pick_index(&weights, 1.5), 1);
        assert_eq!(pick_index(&weights, 3.0), 1);
        assert_eq!(pick_index(&weights, 7.9), 2);
        assert_eq!(pick_index(&weights, 8.0 + 1e-9), 2);
    }

    #[test]
    fn test_empty_pool() {
        let sampler = WeightedSampler::default();
        assert_eq!(sampler.sample(&[], "u1").unwrap_err(), AppError::EmptyPool);
        assert!(sampler.recent_for("u1").is_empty());
    }

    #[test]
    fn test_no_immediate_repeat() {
        let jokes: Vec<Joke> = (1..=6).map(|id| joke_with_score(id, 0)).collect();
        let sampler = WeightedSampler::default();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            sampler.forget("u1");
            let picked: HashSet<JokeId> = (0..3)
                .map(|_| sampler.sample_with(&jokes, "u1", &mut rng).unwrap().id)
                .collect();
            assert_eq!(picked.len(), 3);
        }
    }

    #[test]
    fn test_window_keeps_last_three() {
        let jokes: Vec<Joke> = (1..=10).map(|id| joke_with_score(id, 0)).collect();
        let sampler = WeightedSampler::default();
        let mut rng = StdRng::seed_from_u64(11);

        let mut shown = Vec::new();
        for _ in 0..5 {
            shown.push(sampler.sample_with(&jokes, "u1", &mut rng).unwrap().id);
        }
        assert_eq!(sampler.recent_for("u1"), shown[2..].to_vec());
    }

    #[test]
    fn test_exhausted_window_resets() {
        let jokes = vec![joke_with_score(1, 0), joke_with_score(2, 0)];
        let sampler = WeightedSampler::default();
        sampler
            .recent
            .insert("u1".to_string(), VecDeque::from(vec![1, 2]));

        let picked = sampler.sample(&jokes, "u1").unwrap();
        assert_eq!(sampler.recent_for("u1"), vec![picked.id]);
    }

    #[test]
    fn test_requesters_have_separate_windows() {
        let jokes = vec![joke_with_score(1, 0)];
        let sampler = WeightedSampler::default();
        assert_eq!(sampler.sample(&jokes, "u1").unwrap().id, 1);
        assert_eq!(sampler.sample(&jokes, "u2").unwrap().id, 1);
        assert_eq!(sampler.recent_for("u1"), vec![1]);
        assert_eq!(sampler.recent_for("u2"), vec![1]);
    }

    #[test]
    fn test_higher_scores_win_more_often() {
        let jokes = vec![joke_with_score(1, 12), joke_with_score(2, -5)];
        let sampler = WeightedSampler::new(0);
        let mut rng = StdRng::seed_from_u64(2024);

        let mut high = 0u32;
        let mut low = 0u32;
        for _ in 0..10_000 {
            match sampler.sample_with(&jokes, "u1", &mut rng).unwrap().id {
                1 => high += 1,
                _ => low += 1,
            }
        }

        // Expected share for the low joke is 0.2 / 5.2, about 385 of 10k.
        assert!(high > low);
        assert!((250..=550).contains(&low), "low-score joke picked {} times", low);
        assert!(sampler.recent_for("u1").is_empty());
    }
}
