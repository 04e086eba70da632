//! Config record entity - the key-value store for business configuration.
//!
//! Each row holds one whole JSON document (star thresholds, commission
//! rates, delivery settings, point values). Saving a document replaces the
//! entire value; there is no partial-field update.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Config record database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "config_records")]
pub struct Model {
    /// Document key (e.g. `"star_rating"`, `"commission_rates"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// JSON-serialized document
    pub value: String,
    /// When the document was last replaced
    pub updated_at: DateTimeUtc,
}

/// No navigable relations; records are fetched by key.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
