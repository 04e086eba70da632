//! Source ingredient purchase ledger.
//!
//! Raw materials are priced purely by their purchase history: the ledger is
//! append-only (rows are added or removed by position, never edited), and the
//! latest/lowest/highest unit prices are derived from the current rows on
//! every read. An ingredient that is still referenced by a processed
//! ingredient cannot be deleted.

use crate::{
    entities::{Purchase, SourceIngredient, SourceReference, purchase, source_ingredient, source_reference},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Derived unit-price statistics over an ingredient's purchase ledger.
/// All three are 0 for an ingredient with no purchases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitPriceStats {
    /// Unit price of the most recent purchase
    pub latest: f64,
    /// Lowest unit price across all purchases
    pub lowest: f64,
    /// Highest unit price across all purchases
    pub highest: f64,
}

/// Registers a new source ingredient with an empty ledger.
pub async fn create_source_ingredient(
    db: &DatabaseConnection,
    name: String,
    unit: String,
) -> Result<source_ingredient::Model> {
    if name.trim().is_empty() {
        return Err(Error::invalid("source ingredient name cannot be empty"));
    }

    let ingredient = source_ingredient::ActiveModel {
        name: Set(name.trim().to_string()),
        unit: Set(unit),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    ingredient.insert(db).await.map_err(Into::into)
}

/// Retrieves a source ingredient by id.
pub async fn get_source_ingredient(
    db: &DatabaseConnection,
    source_id: i64,
) -> Result<Option<source_ingredient::Model>> {
    SourceIngredient::find_by_id(source_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists all source ingredients, ordered alphabetically by name.
pub async fn list_source_ingredients(
    db: &DatabaseConnection,
) -> Result<Vec<source_ingredient::Model>> {
    SourceIngredient::find()
        .order_by_asc(source_ingredient::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Appends a purchase to an ingredient's ledger.
///
/// The unit price is derived as `total_price / quantity` at insert time;
/// a zero or negative quantity is rejected rather than letting the division
/// produce nonsense.
pub async fn add_purchase(
    db: &DatabaseConnection,
    source_id: i64,
    quantity: f64,
    total_price: f64,
) -> Result<purchase::Model> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(Error::invalid(format!(
            "purchase quantity must be positive, got {quantity}"
        )));
    }
    if !total_price.is_finite() || total_price < 0.0 {
        return Err(Error::invalid(format!(
            "purchase total must be non-negative, got {total_price}"
        )));
    }

    SourceIngredient::find_by_id(source_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("source ingredient", source_id))?;

    let unit_price = total_price / quantity;
    let row = purchase::ActiveModel {
        source_id: Set(source_id),
        quantity: Set(quantity),
        total_price: Set(total_price),
        unit_price: Set(unit_price),
        purchased_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let inserted = row.insert(db).await?;
    info!(source_id, quantity, total_price, unit_price, "purchase recorded");
    Ok(inserted)
}

/// Lists an ingredient's purchases in insertion order.
pub async fn list_purchases<C>(db: &C, source_id: i64) -> Result<Vec<purchase::Model>>
where
    C: ConnectionTrait,
{
    Purchase::find()
        .filter(purchase::Column::SourceId.eq(source_id))
        .order_by_asc(purchase::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Removes a purchase by its position in the insertion-ordered ledger.
pub async fn delete_purchase(db: &DatabaseConnection, source_id: i64, index: usize) -> Result<()> {
    SourceIngredient::find_by_id(source_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("source ingredient", source_id))?;

    let purchases = list_purchases(db, source_id).await?;
    let Some(row) = purchases.get(index) else {
        return Err(Error::invalid(format!(
            "purchase index {index} out of range (ledger has {} entries)",
            purchases.len()
        )));
    };

    Purchase::delete_by_id(row.id).exec(db).await?;
    Ok(())
}

/// Deletes a source ingredient and its ledger.
///
/// Refused while any processed ingredient still references it; the reference
/// count is checked first.
pub async fn delete_source_ingredient(db: &DatabaseConnection, source_id: i64) -> Result<()> {
    let ingredient = SourceIngredient::find_by_id(source_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("source ingredient", source_id))?;

    let references = SourceReference::find()
        .filter(source_reference::Column::SourceId.eq(source_id))
        .count(db)
        .await?;
    if references > 0 {
        return Err(Error::conflict(format!(
            "source ingredient {} is referenced by {references} processed ingredient(s)",
            ingredient.name
        )));
    }

    let txn = db.begin().await?;
    Purchase::delete_many()
        .filter(purchase::Column::SourceId.eq(source_id))
        .exec(&txn)
        .await?;
    SourceIngredient::delete_by_id(source_id).exec(&txn).await?;
    txn.commit().await?;

    Ok(())
}

/// Returns the unit price of the most recent purchase, or 0 with an empty
/// ledger. Used by the price roll-up.
pub async fn latest_unit_price<C>(db: &C, source_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    let latest = Purchase::find()
        .filter(purchase::Column::SourceId.eq(source_id))
        .order_by_desc(purchase::Column::Id)
        .one(db)
        .await?;
    Ok(latest.map_or(0.0, |p| p.unit_price))
}

/// Computes latest/lowest/highest unit prices over the current ledger.
pub async fn unit_price_stats(db: &DatabaseConnection, source_id: i64) -> Result<UnitPriceStats> {
    SourceIngredient::find_by_id(source_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("source ingredient", source_id))?;

    let purchases = list_purchases(db, source_id).await?;
    if purchases.is_empty() {
        return Ok(UnitPriceStats {
            latest: 0.0,
            lowest: 0.0,
            highest: 0.0,
        });
    }

    let latest = purchases[purchases.len() - 1].unit_price;
    let lowest = purchases.iter().map(|p| p.unit_price).fold(f64::INFINITY, f64::min);
    let highest = purchases
        .iter()
        .map(|p| p.unit_price)
        .fold(f64::NEG_INFINITY, f64::max);

    Ok(UnitPriceStats {
        latest,
        lowest,
        highest,
    })
}
