//! Coupon entity - an admin-issued discount code.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Coupon database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    /// Unique identifier for the coupon
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Redemption code, stored upper-cased
    #[sea_orm(unique)]
    pub code: String,
    /// Discount kind: `"flat"` or `"percentage"`
    pub discount_type: String,
    /// Flat amount or percentage points, depending on `discount_type`
    pub discount_value: f64,
    /// Minimum order value required to redeem
    pub min_order_value: f64,
    /// `"one_time"` or `"recurring"`
    pub usage_limit_type: String,
    /// When the coupon stops being redeemable
    pub expiry_date: DateTimeUtc,
    /// Whether the coupon is currently enabled
    pub active: bool,
    /// When the coupon was created
    pub created_at: DateTimeUtc,
}

/// No navigable relations; coupons are looked up by code.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
