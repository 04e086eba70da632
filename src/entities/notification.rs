//! Notification entity - append-only activity notices for a user.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    /// Unique identifier for the notification
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Receiving user
    pub user_id: i64,
    /// Kind of event: `"like"`, `"comment"`, `"fan"`, or `"guidee"`
    pub kind: String,
    /// User who triggered the notification
    pub from_user_id: i64,
    /// Related post, when the event concerns one
    pub post_id: Option<i64>,
    /// Pre-rendered notification text
    pub message: String,
    /// Whether the user has seen the notification
    pub read: bool,
    /// When the notification was created
    pub created_at: DateTimeUtc,
}

/// No navigable relations; notifications are queried by `user_id`.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
