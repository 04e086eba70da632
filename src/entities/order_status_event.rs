//! Order status event entity - the accumulating status→timestamp log.
//! Events are only ever appended; undoing a transition appends another event
//! rather than erasing history.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order status event database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_status_events")]
pub struct Model {
    /// Unique identifier for the event
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Order the event belongs to
    pub order_id: i64,
    /// Status that was entered
    pub status: String,
    /// When the status was entered (local clock)
    pub at: DateTime,
}

/// Defines relationships between status events and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each event belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
