//! Delivery credit entity - the immutable record of one wallet credit for a
//! completed delivery. Undoing a delivery deletes the matching rows and
//! claws the amount back from the wallet.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Delivery credit database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "delivery_credits")]
pub struct Model {
    /// Unique identifier for the credit
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Credited agent
    pub agent_id: i64,
    /// Delivered order
    pub order_id: i64,
    /// Amount credited
    pub amount: f64,
    /// When the credit was written (local clock)
    pub created_at: DateTime,
}

/// Defines relationships between delivery credits and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each credit belongs to one agent
    #[sea_orm(
        belongs_to = "super::delivery_agent::Entity",
        from = "Column::AgentId",
        to = "super::delivery_agent::Column::Id"
    )]
    Agent,
}

impl Related<super::delivery_agent::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Agent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
