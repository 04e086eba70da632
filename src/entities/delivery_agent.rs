//! Delivery agent entity - a courier with a per-delivery wage and a wallet.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Delivery agent database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "delivery_agents")]
pub struct Model {
    /// Unique identifier for the agent
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Agent name
    pub name: String,
    /// Contact phone
    pub phone: String,
    /// Availability: `"available"` or `"busy"`
    pub status: String,
    /// Wage credited to the wallet per completed delivery
    pub payment_per_delivery: f64,
    /// Accumulated wallet balance, never negative
    pub wallet_balance: f64,
}

/// Defines relationships between agents and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One agent accumulates many delivery credits
    #[sea_orm(has_many = "super::delivery_credit::Entity")]
    Credits,
}

impl Related<super::delivery_credit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Credits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
