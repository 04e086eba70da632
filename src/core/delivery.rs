//! Delivery agents, wallets, and delivery credits.
//!
//! Every completed delivery credits the agent's wallet with their
//! per-delivery wage and writes an immutable credit row. Undoing a delivery
//! deletes the matching credit rows and claws the amount back, never taking
//! the wallet below zero. Wallet increments are single-statement
//! column-expression updates; the floor-at-zero debit reads and writes
//! inside the caller's transaction.

use crate::{
    core::clock,
    entities::{DeliveryAgent, DeliveryCredit, delivery_agent, delivery_credit},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, QueryOrder, Set, prelude::*, sea_query::Expr};
use tracing::info;

/// Agent availability values.
pub const AGENT_AVAILABLE: &str = "available";
/// Agent busy marker, set while an order is on the road.
pub const AGENT_BUSY: &str = "busy";

/// Registers a delivery agent.
pub async fn create_agent(
    db: &DatabaseConnection,
    name: String,
    phone: String,
    payment_per_delivery: f64,
) -> Result<delivery_agent::Model> {
    if name.trim().is_empty() {
        return Err(Error::invalid("agent name cannot be empty"));
    }
    if !payment_per_delivery.is_finite() || payment_per_delivery < 0.0 {
        return Err(Error::invalid(format!(
            "payment per delivery must be non-negative, got {payment_per_delivery}"
        )));
    }

    let agent = delivery_agent::ActiveModel {
        name: Set(name.trim().to_string()),
        phone: Set(phone),
        status: Set(AGENT_AVAILABLE.to_string()),
        payment_per_delivery: Set(payment_per_delivery),
        wallet_balance: Set(0.0),
        ..Default::default()
    };
    agent.insert(db).await.map_err(Into::into)
}

/// Retrieves an agent by id.
pub async fn get_agent<C>(db: &C, agent_id: i64) -> Result<Option<delivery_agent::Model>>
where
    C: ConnectionTrait,
{
    DeliveryAgent::find_by_id(agent_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists all agents, ordered alphabetically by name.
pub async fn list_agents(db: &DatabaseConnection) -> Result<Vec<delivery_agent::Model>> {
    DeliveryAgent::find()
        .order_by_asc(delivery_agent::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sets an agent's availability status.
pub async fn set_agent_status<C>(db: &C, agent_id: i64, status: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    DeliveryAgent::update_many()
        .col_expr(delivery_agent::Column::Status, Expr::value(status))
        .filter(delivery_agent::Column::Id.eq(agent_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Credits an agent's wallet for one completed delivery and records the
/// immutable credit row. Runs inside the caller's transaction.
pub async fn credit_for_delivery<C>(
    db: &C,
    agent_id: i64,
    order_id: i64,
) -> Result<delivery_credit::Model>
where
    C: ConnectionTrait,
{
    let agent = DeliveryAgent::find_by_id(agent_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("delivery agent", agent_id))?;

    DeliveryAgent::update_many()
        .col_expr(
            delivery_agent::Column::WalletBalance,
            Expr::col(delivery_agent::Column::WalletBalance).add(agent.payment_per_delivery),
        )
        .filter(delivery_agent::Column::Id.eq(agent_id))
        .exec(db)
        .await?;

    let credit = delivery_credit::ActiveModel {
        agent_id: Set(agent_id),
        order_id: Set(order_id),
        amount: Set(agent.payment_per_delivery),
        created_at: Set(clock::now_local()),
        ..Default::default()
    };
    let credit = credit.insert(db).await?;
    info!(agent_id, order_id, amount = credit.amount, "delivery credited");
    Ok(credit)
}

/// Reverses the delivery credits an order produced for an agent: deletes the
/// credit rows and subtracts their total from the wallet, floored at zero.
/// Runs inside the caller's transaction.
pub async fn revoke_delivery_credits<C>(db: &C, agent_id: i64, order_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let agent = DeliveryAgent::find_by_id(agent_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("delivery agent", agent_id))?;

    let credits = DeliveryCredit::find()
        .filter(delivery_credit::Column::AgentId.eq(agent_id))
        .filter(delivery_credit::Column::OrderId.eq(order_id))
        .all(db)
        .await?;

    let total: f64 = credits.iter().map(|c| c.amount).sum();

    DeliveryCredit::delete_many()
        .filter(delivery_credit::Column::AgentId.eq(agent_id))
        .filter(delivery_credit::Column::OrderId.eq(order_id))
        .exec(db)
        .await?;

    let new_balance = (agent.wallet_balance - total).max(0.0);
    DeliveryAgent::update_many()
        .col_expr(delivery_agent::Column::WalletBalance, Expr::value(new_balance))
        .filter(delivery_agent::Column::Id.eq(agent_id))
        .exec(db)
        .await?;

    Ok(())
}

/// Lists an agent's delivery credits, newest first.
pub async fn list_credits(
    db: &DatabaseConnection,
    agent_id: i64,
) -> Result<Vec<delivery_credit::Model>> {
    DeliveryCredit::find()
        .filter(delivery_credit::Column::AgentId.eq(agent_id))
        .order_by_desc(delivery_credit::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
