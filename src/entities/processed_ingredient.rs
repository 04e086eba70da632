//! Processed ingredient entity - a kitchen-ready ingredient derived from
//! source ingredients plus fixed per-unit margins.
//!
//! The price of a processed ingredient is never persisted; it is recomputed
//! from the current source-ingredient ledger on every read. The five margin
//! fields are flat currency amounts, not percentages.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Processed ingredient database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "processed_ingredients")]
pub struct Model {
    /// Unique identifier for the processed ingredient
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name (e.g. "Pizza dough")
    pub name: String,
    /// Unit the ingredient is measured in downstream (e.g. "g", "portion")
    pub unit: String,
    /// Flat margin covering the product itself
    pub margin_product: f64,
    /// Flat margin covering operations
    pub margin_operations: f64,
    /// Flat margin covering branding
    pub margin_branding: f64,
    /// Flat margin covering rest
    pub margin_rest: f64,
    /// Flat margin covering miscellaneous costs
    pub margin_miscellaneous: f64,
    /// When the ingredient was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between processed ingredients and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One processed ingredient is composed of many source references
    #[sea_orm(has_many = "super::source_reference::Entity")]
    SourceReferences,
    /// One processed ingredient carries many nutrition entries
    #[sea_orm(has_many = "super::nutrition_entry::Entity")]
    NutritionEntries,
}

impl Related<super::source_reference::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SourceReferences.def()
    }
}

impl Related<super::nutrition_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NutritionEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
