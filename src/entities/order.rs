//! Order entity - an immutable snapshot of a checkout.
//!
//! Line items and prices are frozen at creation; after that only the status
//! fields, agent assignment, and delivery timestamps change. Timestamps in
//! the delivery flow are naive values on the platform's fixed local clock
//! (UTC+5:30), matching what couriers and the kitchen see.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User the order belongs to (the guidee when ordered on their behalf)
    pub user_id: i64,
    /// Sum of line items before discounts and fees
    pub total_price: f64,
    /// Discount applied at creation
    pub discount_amount: f64,
    /// Redeemed coupon code, if any
    pub coupon_code: Option<String>,
    /// Delivery fee charged at creation
    pub delivery_fee: f64,
    /// Amount actually charged
    pub final_price: f64,
    /// Current lifecycle status (see `core::order::OrderStatus`)
    pub status: String,
    /// Whether this order was placed for a future slot
    pub is_preorder: bool,
    /// Requested delivery date (`YYYY-MM-DD`) for preorders
    pub preorder_date: Option<String>,
    /// Requested delivery time (`HH:MM`) for preorders
    pub preorder_time: Option<String>,
    /// When the kitchen accepted the order (TTD baseline for regular orders)
    pub accepted_at: Option<DateTime>,
    /// When the order was handed to the customer
    pub delivered_at: Option<DateTime>,
    /// When a delivery agent was assigned
    pub agent_assigned_at: Option<DateTime>,
    /// Minutes of delivery-time budget left at hand-over; negative = late
    pub ttd_minutes_snapshot: Option<i64>,
    /// Assigned delivery agent, if any
    pub assigned_agent_id: Option<i64>,
    /// Guide who placed the order on a guidee's behalf
    pub ordered_by_guide_id: Option<i64>,
    /// Guidee the order was placed for
    pub ordered_for_guidee_id: Option<i64>,
    /// Commission percentage locked in at creation
    pub commission_rate: f64,
    /// Commission amount credited to the guide at creation
    pub commission_earned: f64,
    /// Meal plan this order fulfills, if any
    pub meal_plan_id: Option<i64>,
    /// When the order was created (local clock)
    pub created_at: DateTime,
}

/// Defines relationships between orders and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One order has many line items
    #[sea_orm(has_many = "super::order_item::Entity")]
    Items,
    /// One order accumulates many status events
    #[sea_orm(has_many = "super::order_status_event::Entity")]
    StatusEvents,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::order_status_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
