//! Cart item entity - one line in a user's cart.
//!
//! `unit_price` is snapshotted from the meal's rolled-up price at the moment
//! the item is added; the cart is not re-priced when the catalog changes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cart item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cart_items")]
pub struct Model {
    /// Unique identifier for the cart line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Referenced meal, when the line came from the catalog
    pub meal_id: Option<i64>,
    /// Display name snapshot
    pub meal_name: String,
    /// Price per unit at the time the item was added
    pub unit_price: f64,
    /// Ordered quantity (at least 1)
    pub quantity: i64,
}

/// No navigable relations; cart lines are queried by `user_id`.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
