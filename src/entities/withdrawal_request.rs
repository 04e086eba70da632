//! Withdrawal request entity - a guide asking to cash out commission.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Withdrawal request database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "withdrawal_requests")]
pub struct Model {
    /// Unique identifier for the request
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Requesting guide
    pub guide_id: i64,
    /// Requested payout amount
    pub amount: f64,
    /// Lifecycle status: `"pending"`, `"approved"`, or `"rejected"`
    pub status: String,
    /// When the request was submitted
    pub created_at: DateTimeUtc,
    /// When the request was approved or rejected
    pub processed_at: Option<DateTimeUtc>,
}

/// No navigable relations; requests are queried by `guide_id`.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
