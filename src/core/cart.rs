//! Per-user shopping cart.
//!
//! Cart lines are individual rows, so adding and removing items are
//! single-row operations with no read-modify-write of a shared list.
//! Prices are snapshotted from the meal's current rolled-up price when the
//! item is added; the cart is not re-priced afterwards.

use crate::{
    core::pricing,
    entities::{CartItem, Meal, cart_item},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, QueryOrder, Set, prelude::*};

/// Adds a meal to the user's cart, snapshotting its current price.
pub async fn add_cart_item(
    db: &DatabaseConnection,
    user_id: i64,
    meal_id: i64,
    quantity: i64,
) -> Result<cart_item::Model> {
    if quantity < 1 {
        return Err(Error::invalid(format!(
            "cart quantity must be at least 1, got {quantity}"
        )));
    }
    let meal = Meal::find_by_id(meal_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("meal", meal_id))?;

    let quote = pricing::meal_price(db, meal_id).await?;

    let row = cart_item::ActiveModel {
        user_id: Set(user_id),
        meal_id: Set(Some(meal_id)),
        meal_name: Set(meal.name),
        unit_price: Set(quote.total),
        quantity: Set(quantity),
        ..Default::default()
    };
    row.insert(db).await.map_err(Into::into)
}

/// Lists the user's cart lines in insertion order.
pub async fn list_cart<C>(db: &C, user_id: i64) -> Result<Vec<cart_item::Model>>
where
    C: ConnectionTrait,
{
    CartItem::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .order_by_asc(cart_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Changes the quantity of the line at `index` in the insertion-ordered cart.
pub async fn update_cart_quantity(
    db: &DatabaseConnection,
    user_id: i64,
    index: usize,
    quantity: i64,
) -> Result<cart_item::Model> {
    if quantity < 1 {
        return Err(Error::invalid(format!(
            "cart quantity must be at least 1, got {quantity}"
        )));
    }

    let items = list_cart(db, user_id).await?;
    let Some(item) = items.into_iter().nth(index) else {
        return Err(Error::invalid(format!("cart index {index} out of range")));
    };

    let mut active_model: cart_item::ActiveModel = item.into();
    active_model.quantity = Set(quantity);
    active_model.update(db).await.map_err(Into::into)
}

/// Removes the line at `index` in the insertion-ordered cart.
pub async fn remove_cart_item(db: &DatabaseConnection, user_id: i64, index: usize) -> Result<()> {
    let items = list_cart(db, user_id).await?;
    let Some(item) = items.into_iter().nth(index) else {
        return Err(Error::invalid(format!("cart index {index} out of range")));
    };

    CartItem::delete_by_id(item.id).exec(db).await?;
    Ok(())
}

/// Empties the user's cart.
pub async fn clear_cart<C>(db: &C, user_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    CartItem::delete_many()
        .filter(cart_item::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Sums the cart's line totals.
pub async fn cart_subtotal(db: &DatabaseConnection, user_id: i64) -> Result<f64> {
    let items = list_cart(db, user_id).await?;
    // Cast safety: quantities are small positive counts.
    #[allow(clippy::cast_precision_loss)]
    let subtotal = items
        .iter()
        .map(|item| item.unit_price * item.quantity as f64)
        .sum();
    Ok(subtotal)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::catalog;
    use crate::test_utils::{create_test_user, setup_test_db};

    async fn make_meal(db: &DatabaseConnection, name: &str) -> Result<crate::entities::meal::Model> {
        catalog::create_meal(db, name.to_string(), true, None, vec![]).await
    }

    #[tokio::test]
    async fn test_add_and_list_cart() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Asha").await?;
        let meal = make_meal(&db, "Bowl").await?;

        add_cart_item(&db, user.id, meal.id, 2).await?;

        let items = list_cart(&db, user.id).await?;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].meal_name, "Bowl");
        assert_eq!(items[0].quantity, 2);
        // Empty meal rolls up to 0
        assert_eq!(items[0].unit_price, 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_quantity_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Asha").await?;
        let meal = make_meal(&db, "Bowl").await?;

        let result = add_cart_item(&db, user.id, meal.id, 0).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidArgument { .. }));

        add_cart_item(&db, user.id, meal.id, 1).await?;
        let result = update_cart_quantity(&db, user.id, 0, 0).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidArgument { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_positional_update_and_remove() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Asha").await?;
        let bowl = make_meal(&db, "Bowl").await?;
        let wrap = make_meal(&db, "Wrap").await?;

        add_cart_item(&db, user.id, bowl.id, 1).await?;
        add_cart_item(&db, user.id, wrap.id, 1).await?;

        let updated = update_cart_quantity(&db, user.id, 1, 3).await?;
        assert_eq!(updated.meal_name, "Wrap");
        assert_eq!(updated.quantity, 3);

        remove_cart_item(&db, user.id, 0).await?;
        let items = list_cart(&db, user.id).await?;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].meal_name, "Wrap");

        let result = remove_cart_item(&db, user.id, 5).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidArgument { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_clear_cart_only_touches_owner() -> Result<()> {
        let db = setup_test_db().await?;
        let asha = create_test_user(&db, "Asha").await?;
        let noor = create_test_user(&db, "Noor").await?;
        let meal = make_meal(&db, "Bowl").await?;

        add_cart_item(&db, asha.id, meal.id, 1).await?;
        add_cart_item(&db, noor.id, meal.id, 1).await?;

        clear_cart(&db, asha.id).await?;
        assert!(list_cart(&db, asha.id).await?.is_empty());
        assert_eq!(list_cart(&db, noor.id).await?.len(), 1);

        Ok(())
    }
}
