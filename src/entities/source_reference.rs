//! Source reference entity - links a processed ingredient to the quantity of
//! a source ingredient that goes into one unit of it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Source reference database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "source_references")]
pub struct Model {
    /// Unique identifier for the reference
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Processed ingredient this reference belongs to
    pub processed_id: i64,
    /// Referenced source ingredient
    pub source_id: i64,
    /// Quantity of the source ingredient per unit of the processed one
    pub source_quantity: f64,
}

/// Defines relationships between source references and other entities.
/// The source side is deliberately a plain column, not a foreign key: the
/// price roll-up tolerates (and reports) references whose source is gone.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each reference belongs to one processed ingredient
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
