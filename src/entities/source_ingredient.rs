//! Source ingredient entity - a raw material bought from suppliers.
//!
//! Prices for a source ingredient are never stored on the ingredient itself;
//! they are derived from its purchase ledger (see [`super::purchase`]).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Source ingredient database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "source_ingredients")]
pub struct Model {
    /// Unique identifier for the source ingredient
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name (e.g. "Flour", "Tomatoes")
    pub name: String,
    /// Unit the ingredient is bought in (e.g. "kg", "l", "piece")
    pub unit: String,
    /// When the ingredient was first registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between source ingredients and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One source ingredient has many ledger purchases
    #[sea_orm(has_many = "super::purchase::Entity")]
    Purchases,
}

impl Related<super::purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
