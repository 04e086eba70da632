//! Meal recipe entity - links a meal to a recipe with a quantity multiplier.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Meal recipe database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meal_recipes")]
pub struct Model {
    /// Unique identifier for the reference
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Meal this reference belongs to
    pub meal_id: i64,
    /// Referenced recipe
    pub recipe_id: i64,
    /// How many servings of the recipe go into the meal
    pub quantity_multiplier: f64,
    /// Optional portioning step override for customization UIs
    pub step_size: Option<f64>,
}

/// Defines relationships between meal recipes and other entities.
/// The recipe side is deliberately a plain column, not a foreign key:
/// deleting a recipe leaves the line dangling and the roll-up skips it.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each reference belongs to one meal
    #[sea_orm(
        belongs_to = "super::meal::Entity",
        from = "Column::MealId",
        to = "super::meal::Column::Id"
    )]
    Meal,
}

impl Related<super::meal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
