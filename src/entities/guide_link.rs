//! Guide link entity - one guide/guidee relationship edge.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Guide link database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "guide_links")]
pub struct Model {
    /// Unique identifier for the link
    #[sea_orm(primary_key)]
    pub id: i64,
    /// The guiding user (must have `is_guide`)
    pub guide_id: i64,
    /// The guided user
    pub guidee_id: i64,
}

/// No navigable relations; both ends are users and are queried by column.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
