//! Post vote entity - one user's up-vote on one post.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Post vote database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post_votes")]
pub struct Model {
    /// Unique identifier for the vote
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Voted post
    pub post_id: i64,
    /// Voting user
    pub user_id: i64,
}

/// Defines relationships between post votes and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each vote belongs to one post
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id"
    )]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
