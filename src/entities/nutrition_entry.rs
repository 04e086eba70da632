//! Nutrition entry entity - one named nutrient value per unit of a processed
//! ingredient (e.g. protein 12 g).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Nutrition entry database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "nutrition_entries")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Processed ingredient this entry belongs to
    pub processed_id: i64,
    /// Nutrient name (e.g. "protein", "calories")
    pub name: String,
    /// Nutrient amount per unit of the processed ingredient
    pub value_per_unit: f64,
    /// Unit the value is expressed in (e.g. "g", "kcal")
    pub unit: String,
}

/// Defines relationships between nutrition entries and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one processed ingredient
    #[sea_orm(
        belongs_to = "super::processed_ingredient::Entity",
        from = "Column::ProcessedId",
        to = "super::processed_ingredient::Column::Id"
    )]
    ProcessedIngredient,
}

impl Related<super::processed_ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProcessedIngredient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
