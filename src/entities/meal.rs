//! Meal entity - a combo of recipes sold as one orderable item.
//!
//! Preset meals (`is_preset = true`) are admin-authored and visible to
//! everyone; non-presets are user-authored and visible only to their creator.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Meal database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meals")]
pub struct Model {
    /// Unique identifier for the meal
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name (e.g. "Protein Power Bowl")
    pub name: String,
    /// Whether this meal is an admin-authored preset
    pub is_preset: bool,
    /// Creating user for non-preset meals, None for admin-authored
    pub created_by: Option<i64>,
    /// When the meal was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between meals and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One meal is composed of many recipe references
    #[sea_orm(has_many = "super::meal_recipe::Entity")]
    MealRecipes,
}

impl Related<super::meal_recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MealRecipes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
