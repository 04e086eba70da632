//! Recipe entity - a dish assembled from processed ingredients.
//!
//! A recipe's price and nutrition are always derived from its ingredient
//! references at read time; nothing is cached on the recipe row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recipe database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipes")]
pub struct Model {
    /// Unique identifier for the recipe
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name (e.g. "Margherita pizza")
    pub name: String,
    /// When the recipe was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between recipes and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One recipe is composed of many ingredient references
    #[sea_orm(has_many = "super::recipe_ingredient::Entity")]
    RecipeIngredients,
}

impl Related<super::recipe_ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecipeIngredients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
