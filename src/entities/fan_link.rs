//! Fan link entity - one idol/fan relationship edge.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fan link database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fan_links")]
pub struct Model {
    /// Unique identifier for the link
    #[sea_orm(primary_key)]
    pub id: i64,
    /// The followed user
    pub idol_id: i64,
    /// The following user
    pub fan_id: i64,
}

/// No navigable relations; both ends are users and are queried by column.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
