//! Coupon administration and quoting.
//!
//! Codes are stored upper-cased and unique. Quoting is a pure check against
//! the stored coupon: it validates activity, expiry, and the minimum order
//! value, then computes the discounted price without mutating anything.

use crate::{
    entities::{Coupon, coupon},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, QueryOrder, Set, prelude::*};

/// Input for a new coupon.
#[derive(Debug, Clone)]
pub struct CouponInput {
    /// Redemption code (stored upper-cased)
    pub code: String,
    /// `"flat"` or `"percentage"`
    pub discount_type: String,
    /// Flat amount or percentage points
    pub discount_value: f64,
    /// Minimum order value required to redeem
    pub min_order_value: f64,
    /// `"one_time"` or `"recurring"`
    pub usage_limit_type: String,
    /// When the coupon expires
    pub expiry_date: DateTime<Utc>,
    /// Whether the coupon starts out enabled
    pub active: bool,
}

/// The result of applying a coupon to an order value.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponQuote {
    /// Normalized coupon code
    pub code: String,
    /// `"flat"` or `"percentage"`
    pub discount_type: String,
    /// Discount amount in currency
    pub discount_amount: f64,
    /// Order value after the discount, floored at 0
    pub final_price: f64,
}

/// Creates a coupon. Duplicate codes conflict; unknown discount types are
/// rejected.
pub async fn create_coupon(db: &DatabaseConnection, input: CouponInput) -> Result<coupon::Model> {
    let code = input.code.trim().to_uppercase();
    if code.is_empty() {
        return Err(Error::invalid("coupon code cannot be empty"));
    }
    if input.discount_type != "flat" && input.discount_type != "percentage" {
        return Err(Error::invalid(format!(
            "discount type must be \"flat\" or \"percentage\", got \"{}\"",
            input.discount_type
        )));
    }
    if !input.discount_value.is_finite() || input.discount_value < 0.0 {
        return Err(Error::invalid(format!(
            "discount value must be non-negative, got {}",
            input.discount_value
        )));
    }

    let existing = Coupon::find()
        .filter(coupon::Column::Code.eq(code.clone()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::conflict(format!("coupon code {code} already exists")));
    }

    let row = coupon::ActiveModel {
        code: Set(code),
        discount_type: Set(input.discount_type),
        discount_value: Set(input.discount_value),
        min_order_value: Set(input.min_order_value),
        usage_limit_type: Set(input.usage_limit_type),
        expiry_date: Set(input.expiry_date),
        active: Set(input.active),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    row.insert(db).await.map_err(Into::into)
}

/// Lists all coupons, newest first.
pub async fn list_coupons(db: &DatabaseConnection) -> Result<Vec<coupon::Model>> {
    Coupon::find()
        .order_by_desc(coupon::Column::CreatedAt)
        .order_by_desc(coupon::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a coupon by id.
pub async fn delete_coupon(db: &DatabaseConnection, coupon_id: i64) -> Result<()> {
    let result = Coupon::delete_by_id(coupon_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("coupon", coupon_id));
    }
    Ok(())
}

/// Applies a coupon code to an order value at a given instant.
///
/// Unknown or disabled codes are not found; expired codes and order values
/// below the coupon's minimum are rejected. The final price never goes
/// negative.
pub async fn quote_coupon<C>(
    db: &C,
    code: &str,
    order_value: f64,
    now: DateTime<Utc>,
) -> Result<CouponQuote>
where
    C: ConnectionTrait,
{
    let code = code.trim().to_uppercase();
    let coupon = Coupon::find()
        .filter(coupon::Column::Code.eq(code.clone()))
        .filter(coupon::Column::Active.eq(true))
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "coupon",
            id: code.clone(),
        })?;

    if coupon.expiry_date < now {
        return Err(Error::invalid(format!("coupon {code} has expired")));
    }
    if order_value < coupon.min_order_value {
        return Err(Error::invalid(format!(
            "minimum order value of {} required for coupon {code}",
            coupon.min_order_value
        )));
    }

    let discount_amount = if coupon.discount_type == "flat" {
        coupon.discount_value
    } else {
        order_value * coupon.discount_value / 100.0
    };

    Ok(CouponQuote {
        code,
        discount_type: coupon.discount_type,
        discount_amount,
        final_price: (order_value - discount_amount).max(0.0),
    })
}
