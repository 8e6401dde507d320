use super::entities::{joke, joke_vote, Joke as JokeEntity, JokeVote};
use crate::domain::{Joke, JokeId, JokeStore, VoteDirection, VoteMarker, VoteTally};
use async_trait::async_trait;
use jokes_errors::AppError;
use sea_orm::{
    entity::*, query::*, ConnectionTrait, DatabaseConnection, DbErr, TransactionTrait,
};
use std::collections::{BTreeSet, HashMap};

#[derive(Clone)]
pub struct JokeRepository {
    db: DatabaseConnection,
}

impl JokeRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_all(&self) -> Result<Vec<Joke>, DbErr> {
        let jokes = JokeEntity::find()
            .order_by_asc(joke::Column::Id)
            .all(&self.db)
            .await?;

        let mut voters: HashMap<JokeId, BTreeSet<VoteMarker>> = HashMap::new();
        for vote in JokeVote::find().all(&self.db).await? {
            voters.entry(vote.joke_id).or_default().insert(to_marker(vote));
        }

        Ok(jokes
            .into_iter()
            .map(|model| {
                let markers = voters.remove(&model.id).unwrap_or_default();
                to_domain(model, markers)
            })
            .collect())
    }

    pub async fn find_by_id(&self, id: JokeId) -> Result<Option<Joke>, DbErr> {
        let Some(model) = JokeEntity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let markers = voters_of(&self.db, id).await?;
        Ok(Some(to_domain(model, markers)))
    }

    pub async fn next_free_id(&self) -> Result<JokeId, DbErr> {
        let last = JokeEntity::find()
            .order_by_desc(joke::Column::Id)
            .one(&self.db)
            .await?;
        Ok(last.map_or(1, |j| j.id + 1))
    }

    pub async fn create(&self, joke_data: &Joke) -> Result<joke::Model, DbErr> {
        let txn = self.db.begin().await?;

        let active = joke::ActiveModel {
            id: Set(joke_data.id),
            text: Set(joke_data.text.clone()),
            author: Set(joke_data.author.clone()),
            author_id: Set(joke_data.author_id.clone()),
            created_at: Set(joke_data.created_at),
            upvotes: Set(to_column(joke_data.upvotes())),
            downvotes: Set(to_column(joke_data.downvotes())),
            score: Set(joke_data.score()),
        };
        let model = active.insert(&txn).await?;
        insert_voters(&txn, joke_data.id, joke_data.voters()).await?;

        txn.commit().await?;
        Ok(model)
    }

    /// Writes new counters and replaces the voter rows under a row lock.
    pub async fn update_counters(
        &self,
        id: JokeId,
        tally: &VoteTally,
    ) -> Result<Option<Joke>, DbErr> {
        let txn = self.db.begin().await?;

        let Some(existing) = JokeEntity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
        else {
            return Ok(None);
        };

        let mut active: joke::ActiveModel = existing.into();
        active.upvotes = Set(to_column(tally.upvotes));
        active.downvotes = Set(to_column(tally.downvotes));
        active.score = Set(tally.score());
        let updated = active.update(&txn).await?;

        JokeVote::delete_many()
            .filter(joke_vote::Column::JokeId.eq(id))
            .exec(&txn)
            .await?;
        insert_voters(&txn, id, &tally.voters).await?;

        txn.commit().await?;
        Ok(Some(to_domain(updated, tally.voters.clone())))
    }
}

#[async_trait]
impl JokeStore for JokeRepository {
    async fn load_all(&self) -> Result<Vec<Joke>, AppError> {
        self.find_all().await.map_err(AppError::storage)
    }

    async fn find_one(&self, id: JokeId) -> Result<Option<Joke>, AppError> {
        self.find_by_id(id).await.map_err(AppError::storage)
    }

    async fn next_id(&self) -> Result<JokeId, AppError> {
        self.next_free_id().await.map_err(AppError::storage)
    }

    async fn insert_one(&self, joke: &Joke) -> Result<(), AppError> {
        self.create(joke).await.map(|_| ()).map_err(AppError::storage)
    }

    async fn find_and_update_counters(
        &self,
        id: JokeId,
        tally: &VoteTally,
    ) -> Result<Option<Joke>, AppError> {
        self.update_counters(id, tally)
            .await
            .map_err(AppError::storage)
    }
}

async fn voters_of<C: ConnectionTrait>(
    conn: &C,
    id: JokeId,
) -> Result<BTreeSet<VoteMarker>, DbErr> {
    Ok(JokeVote::find()
        .filter(joke_vote::Column::JokeId.eq(id))
        .all(conn)
        .await?
        .into_iter()
        .map(to_marker)
        .collect())
}

async fn insert_voters<C: ConnectionTrait>(
    conn: &C,
    id: JokeId,
    voters: &BTreeSet<VoteMarker>,
) -> Result<(), DbErr> {
    // insert_many rejects an empty batch
    if voters.is_empty() {
        return Ok(());
    }
    let rows = voters.iter().map(|m| joke_vote::ActiveModel {
        joke_id: Set(id),
        user_id: Set(m.user_id.clone()),
        is_upvote: Set(m.direction.is_up()),
    });
    JokeVote::insert_many(rows).exec(conn).await?;
    Ok(())
}

fn to_domain(model: joke::Model, voters: BTreeSet<VoteMarker>) -> Joke {
    let tally = VoteTally {
        upvotes: from_column(model.upvotes),
        downvotes: from_column(model.downvotes),
        voters,
    };
    Joke::restore(
        model.id,
        model.text,
        model.author,
        model.author_id,
        model.created_at,
        tally,
    )
}

fn to_marker(vote: joke_vote::Model) -> VoteMarker {
    VoteMarker::new(vote.user_id, VoteDirection::from_upvote(vote.is_upvote))
}

fn from_column(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

fn to_column(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
