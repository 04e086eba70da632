//! Order lifecycle: creation, the status machine, and delivery timing.
//!
//! An order is a frozen snapshot of a checkout. Creation computes the
//! subtotal server-side, applies an optional coupon and the delivery fee,
//! attributes guide commission (locked in at creation, never re-derived),
//! and clears the buyer's cart. Afterwards the order only moves through the
//! status machine:
//!
//! `arrived → accepted → preparing → ready → out_for_delivery → delivered`
//!
//! Forward jumps over intermediate states are allowed (the admin panel sets
//! statuses directly); backward moves are not. `cancelled` is reachable from
//! `arrived` only. `delivered` is terminal except for the assigned agent's
//! undo, which returns the order to `out_for_delivery` and reverses the
//! wallet credit exactly. Every transition appends to the status event log.
//! All timestamps here are naive values on the platform clock (UTC+5:30).

use crate::{
    core::{cart, clock, coupon, delivery, rating, settings},
    entities::{
        MealPlan, Order, OrderItem, OrderStatusEvent, User, order, order_item,
        order_status_event, user,
    },
    errors::{Error, Result},
};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use sea_orm::{
    ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr,
};
use tracing::info;

/// Lifecycle states of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    /// Order has been placed and is waiting for the kitchen
    Arrived,
    /// Kitchen accepted the order; the delivery-time budget starts here
    Accepted,
    /// Kitchen is preparing the order
    Preparing,
    /// Order is ready for pickup by an agent
    Ready,
    /// Order is on the road
    OutForDelivery,
    /// Order was handed to the customer
    Delivered,
    /// Order was cancelled before the kitchen accepted it
    Cancelled,
}

impl OrderStatus {
    /// The canonical string stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arrived => "arrived",
            Self::Accepted => "accepted",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a stored or requested status string.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "arrived" => Ok(Self::Arrived),
            "accepted" => Ok(Self::Accepted),
            "preparing" => Ok(Self::Preparing),
            "ready" => Ok(Self::Ready),
            "out_for_delivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(Error::invalid(format!("unknown order status \"{other}\""))),
        }
    }

    /// Position along the forward chain; `cancelled` has no position.
    const fn rank(self) -> Option<u8> {
        match self {
            Self::Arrived => Some(0),
            Self::Accepted => Some(1),
            Self::Preparing => Some(2),
            Self::Ready => Some(3),
            Self::OutForDelivery => Some(4),
            Self::Delivered => Some(5),
            Self::Cancelled => None,
        }
    }
}

/// One line of a new order.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    /// Referenced meal, when the line came from the catalog
    pub meal_id: Option<i64>,
    /// Display name snapshot
    pub meal_name: String,
    /// Price per unit at order time
    pub unit_price: f64,
    /// Ordered quantity (at least 1)
    pub quantity: i64,
}

/// Input for creating an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Authenticated user placing the order (a guide when ordering for a
    /// guidee); their cart is cleared on success
    pub placed_by: i64,
    /// Frozen line items
    pub items: Vec<NewOrderItem>,
    /// Optional coupon code to redeem
    pub coupon_code: Option<String>,
    /// Whether this order targets a future delivery slot
    pub is_preorder: bool,
    /// Requested delivery date (`YYYY-MM-DD`) for preorders
    pub preorder_date: Option<String>,
    /// Requested delivery time (`HH:MM`) for preorders
    pub preorder_time: Option<String>,
    /// Guide placing the order on a guidee's behalf
    pub ordered_by_guide_id: Option<i64>,
    /// Guidee the order is placed for
    pub ordered_for_guidee_id: Option<i64>,
    /// Meal plan this order fulfills
    pub meal_plan_id: Option<i64>,
}

/// Builds order lines from the user's current cart.
pub async fn items_from_cart(db: &DatabaseConnection, user_id: i64) -> Result<Vec<NewOrderItem>> {
    let items = cart::list_cart(db, user_id).await?;
    Ok(items
        .into_iter()
        .map(|item| NewOrderItem {
            meal_id: item.meal_id,
            meal_name: item.meal_name,
            unit_price: item.unit_price,
            quantity: item.quantity,
        })
        .collect())
}

/// Resolves which guide, if any, earns commission on this order.
///
/// Direct attribution (guide ordering for a guidee) wins over the indirect
/// meal-plan path. Attribution is best-effort: a missing plan or guide, or a
/// user who has lost guide standing, simply earns nothing.
async fn attributed_guide<C>(db: &C, input: &NewOrder) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    let guide_id = if input.ordered_by_guide_id.is_some() && input.ordered_for_guidee_id.is_some() {
        input.ordered_by_guide_id
    } else if let Some(plan_id) = input.meal_plan_id {
        MealPlan::find_by_id(plan_id)
            .one(db)
            .await?
            .map(|plan| plan.guide_id)
    } else {
        None
    };

    let Some(guide_id) = guide_id else {
        return Ok(None);
    };
    let guide = User::find_by_id(guide_id).one(db).await?;
    Ok(guide.filter(|g| g.is_guide))
}

/// Creates an order from frozen line items.
///
/// The subtotal is computed server-side; the coupon (if any) and the
/// delivery fee from the delivery config shape the final price; guide
/// commission is credited and snapshotted at creation; the buyer's cart is
/// cleared. The order starts in `arrived` with its first status event.
pub async fn create_order(db: &DatabaseConnection, input: NewOrder) -> Result<order::Model> {
    if input.items.is_empty() {
        return Err(Error::invalid("order must contain at least one item"));
    }
    for item in &input.items {
        if item.quantity < 1 {
            return Err(Error::invalid(format!(
                "item quantity must be at least 1, got {}",
                item.quantity
            )));
        }
        if !item.unit_price.is_finite() || item.unit_price < 0.0 {
            return Err(Error::invalid(format!(
                "item price must be non-negative, got {}",
                item.unit_price
            )));
        }
    }

    // Cast safety: quantities are small positive counts.
    #[allow(clippy::cast_precision_loss)]
    let subtotal: f64 = input
        .items
        .iter()
        .map(|item| item.unit_price * item.quantity as f64)
        .sum();

    let (discount_amount, coupon_code) = match &input.coupon_code {
        Some(code) => {
            let quote = coupon::quote_coupon(db, code, subtotal, chrono::Utc::now()).await?;
            (quote.discount_amount, Some(quote.code))
        }
        None => (0.0, None),
    };

    let delivery_config = settings::load_delivery_config(db).await?;
    let delivery_fee = if subtotal >= delivery_config.min_order_for_free_delivery {
        0.0
    } else {
        delivery_config.delivery_price
    };
    let final_price = (subtotal - discount_amount).max(0.0) + delivery_fee;

    let guide = attributed_guide(db, &input).await?;
    let (commission_rate, commission_earned, guide_id) = match &guide {
        Some(guide) => {
            let rates = settings::load_commission_rates(db).await?;
            // Stored ratings are always written from a u8.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let rate = rating::commission_rate(guide.star_rating as u8, &rates);
            (rate, final_price * rate / 100.0, Some(guide.id))
        }
        None => (0.0, 0.0, None),
    };

    let owner = input.ordered_for_guidee_id.unwrap_or(input.placed_by);
    let now = clock::now_local();

    let txn = db.begin().await?;

    let row = order::ActiveModel {
        user_id: Set(owner),
        total_price: Set(subtotal),
        discount_amount: Set(discount_amount),
        coupon_code: Set(coupon_code),
        delivery_fee: Set(delivery_fee),
        final_price: Set(final_price),
        status: Set(OrderStatus::Arrived.as_str().to_string()),
        is_preorder: Set(input.is_preorder),
        preorder_date: Set(input.preorder_date.clone()),
        preorder_time: Set(input.preorder_time.clone()),
        accepted_at: Set(None),
        delivered_at: Set(None),
        agent_assigned_at: Set(None),
        ttd_minutes_snapshot: Set(None),
        assigned_agent_id: Set(None),
        ordered_by_guide_id: Set(input.ordered_by_guide_id),
        ordered_for_guidee_id: Set(input.ordered_for_guidee_id),
        commission_rate: Set(commission_rate),
        commission_earned: Set(commission_earned),
        meal_plan_id: Set(input.meal_plan_id),
        created_at: Set(now),
        ..Default::default()
    };
    let created = row.insert(&txn).await?;

    for item in input.items {
        let line = order_item::ActiveModel {
            order_id: Set(created.id),
            meal_id: Set(item.meal_id),
            meal_name: Set(item.meal_name),
            unit_price: Set(item.unit_price),
            quantity: Set(item.quantity),
            ..Default::default()
        };
        line.insert(&txn).await?;
    }

    append_status_event(&txn, created.id, OrderStatus::Arrived, now).await?;

    if commission_earned > 0.0 {
        if let Some(guide_id) = guide_id {
            User::update_many()
                .col_expr(
                    user::Column::CommissionBalance,
                    Expr::col(user::Column::CommissionBalance).add(commission_earned),
                )
                .filter(user::Column::Id.eq(guide_id))
                .exec(&txn)
                .await?;
        }
    }

    cart::clear_cart(&txn, input.placed_by).await?;
    txn.commit().await?;

    info!(
        order_id = created.id,
        final_price, commission_earned, "order created"
    );
    Ok(created)
}

/// Appends one row to the order's status event log.
async fn append_status_event<C>(
    db: &C,
    order_id: i64,
    status: OrderStatus,
    at: NaiveDateTime,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let event = order_status_event::ActiveModel {
        order_id: Set(order_id),
        status: Set(status.as_str().to_string()),
        at: Set(at),
        ..Default::default()
    };
    event.insert(db).await?;
    Ok(())
}

/// Minutes of delivery-time budget left when a regular order is handed over.
/// Negative means the delivery ran late by that many minutes.
#[must_use]
pub fn regular_ttd_snapshot(
    accepted_at: NaiveDateTime,
    ttd_minutes: i64,
    delivered_at: NaiveDateTime,
) -> i64 {
    let expected = accepted_at + Duration::minutes(ttd_minutes);
    (expected - delivered_at).num_minutes()
}

/// Minutes of budget left when a preorder is handed over, measured against
/// the requested delivery slot. Any parse failure yields 0 rather than an
/// error - a malformed slot must not block the hand-over.
#[must_use]
pub fn preorder_ttd_snapshot(
    preorder_date: Option<&str>,
    preorder_time: Option<&str>,
    delivered_at: NaiveDateTime,
) -> i64 {
    let (Some(date), Some(time)) = (preorder_date, preorder_time) else {
        return 0;
    };
    let Ok(date) = NaiveDate::parse_from_str(date, "%Y-%m-%d") else {
        return 0;
    };
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"));
    let Ok(time) = time else {
        return 0;
    };

    let expected = date.and_time(time);
    (expected - delivered_at).num_minutes()
}

/// Retrieves an order by id.
pub async fn get_order(db: &DatabaseConnection, order_id: i64) -> Result<order::Model> {
    Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("order", order_id))
}

/// Lists a user's orders, newest first.
pub async fn list_orders(db: &DatabaseConnection, user_id: i64) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists an order's line items.
pub async fn list_order_items(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Vec<order_item::Model>> {
    OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns the order's accumulated status event log in append order.
pub async fn status_history(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Vec<order_status_event::Model>> {
    OrderStatusEvent::find()
        .filter(order_status_event::Column::OrderId.eq(order_id))
        .order_by_asc(order_status_event::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Moves an order forward along the status chain.
///
/// Jumping over intermediate states is allowed; moving backward, re-entering
/// the current state, or moving a `delivered`/`cancelled` order conflicts.
/// Entering `accepted` stamps the TTD baseline; entering `delivered` stamps
/// the hand-over, computes the TTD snapshot, credits the assigned agent, and
/// frees them.
pub async fn advance_status(
    db: &DatabaseConnection,
    order_id: i64,
    new_status: OrderStatus,
) -> Result<order::Model> {
    let order = get_order(db, order_id).await?;
    let current = OrderStatus::parse(&order.status)?;

    let Some(new_rank) = new_status.rank() else {
        return Err(Error::invalid(
            "orders are cancelled through the cancel operation, not a status update",
        ));
    };
    let Some(current_rank) = current.rank() else {
        return Err(Error::conflict("order is cancelled"));
    };
    if current == OrderStatus::Delivered {
        return Err(Error::conflict("order is already delivered"));
    }
    if new_rank <= current_rank {
        return Err(Error::conflict(format!(
            "cannot move order from {} back to {}",
            current.as_str(),
            new_status.as_str()
        )));
    }

    let now = clock::now_local();
    let txn = db.begin().await?;

    let mut active_model: order::ActiveModel = order.clone().into();
    active_model.status = Set(new_status.as_str().to_string());

    if new_status == OrderStatus::Accepted {
        active_model.accepted_at = Set(Some(now));
    }

    if new_status == OrderStatus::Delivered {
        active_model.delivered_at = Set(Some(now));

        let snapshot = if order.is_preorder {
            Some(preorder_ttd_snapshot(
                order.preorder_date.as_deref(),
                order.preorder_time.as_deref(),
                now,
            ))
        } else {
            let config = settings::load_delivery_config(&txn).await?;
            // No baseline, no snapshot: an order delivered without ever
            // being accepted keeps a null TTD.
            order
                .accepted_at
                .map(|accepted| regular_ttd_snapshot(accepted, config.regular_order_ttd_minutes, now))
        };
        active_model.ttd_minutes_snapshot = Set(snapshot);

        if let Some(agent_id) = order.assigned_agent_id {
            delivery::credit_for_delivery(&txn, agent_id, order.id).await?;
            delivery::set_agent_status(&txn, agent_id, delivery::AGENT_AVAILABLE).await?;
        }
    }

    let updated = active_model.update(&txn).await?;
    append_status_event(&txn, order_id, new_status, now).await?;
    txn.commit().await?;

    info!(order_id, status = new_status.as_str(), "order status advanced");
    Ok(updated)
}

/// Cancels an order. Only orders still in `arrived` can be cancelled.
pub async fn cancel_order(db: &DatabaseConnection, order_id: i64) -> Result<order::Model> {
    let order = get_order(db, order_id).await?;
    let current = OrderStatus::parse(&order.status)?;

    if current != OrderStatus::Arrived {
        return Err(Error::conflict(format!(
            "only arrived orders can be cancelled, this one is {}",
            current.as_str()
        )));
    }

    let now = clock::now_local();
    let txn = db.begin().await?;
    let mut active_model: order::ActiveModel = order.into();
    active_model.status = Set(OrderStatus::Cancelled.as_str().to_string());
    let updated = active_model.update(&txn).await?;
    append_status_event(&txn, order_id, OrderStatus::Cancelled, now).await?;
    txn.commit().await?;

    Ok(updated)
}

/// Assigns a delivery agent to an order.
///
/// Forces the order onto the road (`out_for_delivery`), stamps the
/// assignment, and marks the agent busy. Delivered and cancelled orders
/// refuse assignment.
pub async fn assign_agent(
    db: &DatabaseConnection,
    order_id: i64,
    agent_id: i64,
) -> Result<order::Model> {
    let order = get_order(db, order_id).await?;
    let current = OrderStatus::parse(&order.status)?;
    if matches!(current, OrderStatus::Delivered | OrderStatus::Cancelled) {
        return Err(Error::conflict(format!(
            "cannot assign an agent to a {} order",
            current.as_str()
        )));
    }
    delivery::get_agent(db, agent_id)
        .await?
        .ok_or_else(|| Error::not_found("delivery agent", agent_id))?;

    let now = clock::now_local();
    let txn = db.begin().await?;

    let mut active_model: order::ActiveModel = order.into();
    active_model.assigned_agent_id = Set(Some(agent_id));
    active_model.agent_assigned_at = Set(Some(now));
    active_model.status = Set(OrderStatus::OutForDelivery.as_str().to_string());
    let updated = active_model.update(&txn).await?;

    append_status_event(&txn, order_id, OrderStatus::OutForDelivery, now).await?;
    delivery::set_agent_status(&txn, agent_id, delivery::AGENT_BUSY).await?;
    txn.commit().await?;

    info!(order_id, agent_id, "agent assigned");
    Ok(updated)
}

/// Reverts a delivered order to `out_for_delivery`.
///
/// Restricted to the assigned agent. Clears the hand-over timestamp and TTD
/// snapshot, deletes the delivery credit rows, and claws the payment back
/// from the agent's wallet (floored at zero) - the exact inverse of the
/// delivered transition's side effects.
pub async fn undo_delivery(
    db: &DatabaseConnection,
    order_id: i64,
    agent_id: i64,
) -> Result<order::Model> {
    let order = get_order(db, order_id).await?;
    let current = OrderStatus::parse(&order.status)?;

    if current != OrderStatus::Delivered {
        return Err(Error::conflict(format!(
            "only delivered orders can be undone, this one is {}",
            current.as_str()
        )));
    }
    if order.assigned_agent_id != Some(agent_id) {
        return Err(Error::forbidden(
            "only the assigned delivery agent may undo a delivery",
        ));
    }

    let now = clock::now_local();
    let txn = db.begin().await?;

    let mut active_model: order::ActiveModel = order.into();
    active_model.status = Set(OrderStatus::OutForDelivery.as_str().to_string());
    active_model.delivered_at = Set(None);
    active_model.ttd_minutes_snapshot = Set(None);
    let updated = active_model.update(&txn).await?;

    append_status_event(&txn, order_id, OrderStatus::OutForDelivery, now).await?;
    delivery::revoke_delivery_credits(&txn, agent_id, order_id).await?;
    delivery::set_agent_status(&txn, agent_id, delivery::AGENT_BUSY).await?;
    txn.commit().await?;

    info!(order_id, agent_id, "delivery undone");
    Ok(updated)
}
