//! User entity - platform account with loyalty points and guide standing.
//!
//! `star_rating` and `is_guide` are derived from the point totals and
//! persisted whenever points change; they are never edited directly.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Loyalty points earned through activity
    pub points: i64,
    /// Admin-granted points, added to `points` for rating purposes
    pub inherent_points: i64,
    /// Derived star level (0-5)
    pub star_rating: i32,
    /// Derived guide flag (`star_rating >= 1`)
    pub is_guide: bool,
    /// Accumulated commission payouts owed
    pub commission_balance: f64,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between users and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many delivery addresses
    #[sea_orm(has_many = "super::address::Entity")]
    Addresses,
    /// One user has many posts
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,
}

impl Related<super::address::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Addresses.def()
    }
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
