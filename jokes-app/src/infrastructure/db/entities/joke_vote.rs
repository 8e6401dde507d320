use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "joke_votes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub joke_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub is_upvote: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::joke::Entity",
        from = "Column::JokeId",
        to = "super::joke::Column::Id",
        on_delete = "Cascade"
    )]
    Joke,
}

impl Related<super::joke::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Joke.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
