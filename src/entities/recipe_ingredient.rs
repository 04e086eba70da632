//! Recipe ingredient entity - links a recipe to a quantity of a processed
//! ingredient.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recipe ingredient database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipe_ingredients")]
pub struct Model {
    /// Unique identifier for the reference
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Recipe this reference belongs to
    pub recipe_id: i64,
    /// Referenced processed ingredient
    pub ingredient_id: i64,
    /// Quantity of the ingredient going into the recipe
    pub quantity: f64,
    /// Unit the quantity is expressed in
    pub unit: String,
    /// Optional portioning step override for customization UIs
    pub step_size: Option<f64>,
}

/// Defines relationships between recipe ingredients and other entities.
/// The ingredient side is deliberately a plain column, not a foreign key:
/// deleting an ingredient leaves the line dangling and the roll-up skips it.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each reference belongs to one recipe
    #[sea_orm(
        belongs_to = "super::recipe::Entity",
        from = "Column::RecipeId",
        to = "super::recipe::Column::Id"
    )]
    Recipe,
}

impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipe.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
