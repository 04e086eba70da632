//! Purchase entity - one ledger row for a source-ingredient purchase.
//!
//! `unit_price` is always derived as `total_price / quantity` at insert time
//! and is never edited independently of its purchase. The ledger is
//! append-only: rows are added or removed, never updated in place.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Purchase database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    /// Unique identifier for the purchase
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Source ingredient this purchase belongs to
    pub source_id: i64,
    /// Quantity bought, in the ingredient's unit
    pub quantity: f64,
    /// Total amount paid for the purchase
    pub total_price: f64,
    /// Derived per-unit price (`total_price / quantity`)
    pub unit_price: f64,
    /// When the purchase was recorded
    pub purchased_at: DateTimeUtc,
}

/// Defines relationships between purchases and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each purchase belongs to one source ingredient
    #[sea_orm(
        belongs_to = "super::source_ingredient::Entity",
        from = "Column::SourceId",
        to = "super::source_ingredient::Column::Id"
    )]
    SourceIngredient,
}

impl Related<super::source_ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SourceIngredient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
