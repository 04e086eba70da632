//! Meal plan entity - a guidee's standing request for a guide to plan and
//! order meals for them. Orders placed against an accepted plan attribute
//! commission to the plan's guide.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Meal plan database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meal_plans")]
pub struct Model {
    /// Unique identifier for the plan
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Requesting guidee
    pub guidee_id: i64,
    /// Guide asked to run the plan
    pub guide_id: i64,
    /// Short description of the plan
    pub title: String,
    /// Lifecycle status: `"requested"`, `"accepted"`, or `"declined"`
    pub status: String,
    /// When the plan was requested
    pub created_at: DateTimeUtc,
}

/// No navigable relations; plans are queried by guide or guidee columns.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
