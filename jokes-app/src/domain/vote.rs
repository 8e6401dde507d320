use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn from_upvote(is_upvote: bool) -> Self {
        if is_upvote {
            Self::Up
        } else {
            Self::Down
        }
    }

    pub fn is_up(self) -> bool {
        self == Self::Up
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

/// One user's vote on a joke.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VoteMarker {
    pub user_id: String,
    pub direction: VoteDirection,
}

impl VoteMarker {
    pub fn new(user_id: impl Into<String>, direction: VoteDirection) -> Self {
        Self {
            user_id: user_id.into(),
            direction,
        }
    }
}

/// Where a single user stands on a single joke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteState {
    None,
    Up,
    Down,
}

/// Vote counters plus the markers that explain them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub upvotes: u32,
    pub downvotes: u32,
    pub voters: BTreeSet<VoteMarker>,
}

impl VoteTally {
    pub fn score(&self) -> i64 {
        i64::from(self.upvotes) - i64::from(self.downvotes)
    }

    pub fn state_of(&self, user_id: &str) -> VoteState {
        let has = |direction| self.voters.contains(&VoteMarker::new(user_id, direction));
        match (has(VoteDirection::Up), has(VoteDirection::Down)) {
            (true, false) => VoteState::Up,
            (false, true) => VoteState::Down,
            // Both markers only exist in a corrupted record; the next vote repairs it.
            (true, true) | (false, false) => VoteState::None,
        }
    }

    /// Casts `direction` for `user_id` and returns the user's resulting state.
    ///
    /// Casting against an existing opposite vote cancels it and records the new
    /// one. Casting the same direction twice retracts the vote. Counters never
    /// drop below zero, even when the markers and counters disagree.
    pub fn apply(&mut self, user_id: &str, direction: VoteDirection) -> VoteState {
        let opposite = VoteMarker::new(user_id, direction.opposite());
        if self.voters.remove(&opposite) {
            let counter = self.counter_mut(direction.opposite());
            *counter = counter.saturating_sub(1);
        }

        let marker = VoteMarker::new(user_id, direction);
        if self.voters.remove(&marker) {
            let counter = self.counter_mut(direction);
            *counter = counter.saturating_sub(1);
            VoteState::None
        } else {
            self.voters.insert(marker);
            let counter = self.counter_mut(direction);
            *counter = counter.saturating_add(1);
            match direction {
                VoteDirection::Up => VoteState::Up,
                VoteDirection::Down => VoteState::Down,
            }
        }
    }

    fn counter_mut(&mut self, direction: VoteDirection) -> &mut u32 {
        match direction {
            VoteDirection::Up => &mut self.upvotes,
            VoteDirection::Down => &mut self.downvotes,
        }
    }
}
