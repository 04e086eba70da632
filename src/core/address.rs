//! Delivery address book.
//!
//! Addresses are per-user rows in insertion order, addressed positionally by
//! the surface layer. The single-default invariant (at most one address per
//! user flagged default) is maintained inside a transaction whenever a
//! default is set.

use crate::{
    entities::{Address, address},
    errors::{Error, Result},
};
use sea_orm::{
    ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr,
};

/// Input for a new address-book entry.
#[derive(Debug, Clone)]
pub struct AddressInput {
    /// Short label ("Home", "Work", ...)
    pub label: String,
    /// Street line
    pub street: String,
    /// City
    pub city: String,
    /// State or region
    pub state: String,
    /// Postal code
    pub pincode: String,
    /// Contact phone for the address
    pub phone: String,
    /// Whether to make this the default delivery address
    pub is_default: bool,
}

/// Clears the default flag on all of a user's addresses.
async fn clear_defaults<C>(db: &C, user_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    Address::update_many()
        .col_expr(address::Column::IsDefault, Expr::value(false))
        .filter(address::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Appends an address to the user's address book.
///
/// When the new address is flagged default, the user's previous default is
/// cleared in the same transaction.
pub async fn add_address(
    db: &DatabaseConnection,
    user_id: i64,
    input: AddressInput,
) -> Result<address::Model> {
    let txn = db.begin().await?;

    if input.is_default {
        clear_defaults(&txn, user_id).await?;
    }

    let row = address::ActiveModel {
        user_id: Set(user_id),
        label: Set(input.label),
        street: Set(input.street),
        city: Set(input.city),
        state: Set(input.state),
        pincode: Set(input.pincode),
        phone: Set(input.phone),
        is_default: Set(input.is_default),
        ..Default::default()
    };
    let created = row.insert(&txn).await?;
    txn.commit().await?;

    Ok(created)
}

/// Lists the user's addresses in insertion order.
pub async fn list_addresses(db: &DatabaseConnection, user_id: i64) -> Result<Vec<address::Model>> {
    Address::find()
        .filter(address::Column::UserId.eq(user_id))
        .order_by_asc(address::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Removes the address at `index` in the insertion-ordered book.
pub async fn delete_address(db: &DatabaseConnection, user_id: i64, index: usize) -> Result<()> {
    let addresses = list_addresses(db, user_id).await?;
    let Some(row) = addresses.get(index) else {
        return Err(Error::invalid(format!("address index {index} out of range")));
    };

    Address::delete_by_id(row.id).exec(db).await?;
    Ok(())
}

/// Flags the address at `index` as the user's default, clearing any other
/// default in the same transaction.
pub async fn set_default_address(
    db: &DatabaseConnection,
    user_id: i64,
    index: usize,
) -> Result<address::Model> {
    let addresses = list_addresses(db, user_id).await?;
    let Some(row) = addresses.into_iter().nth(index) else {
        return Err(Error::invalid(format!("address index {index} out of range")));
    };

    let txn = db.begin().await?;
    clear_defaults(&txn, user_id).await?;
    let mut active_model: address::ActiveModel = row.into();
    active_model.is_default = Set(true);
    let updated = active_model.update(&txn).await?;
    txn.commit().await?;

    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{create_test_user, setup_test_db};

    fn sample(label: &str, is_default: bool) -> AddressInput {
        AddressInput {
            label: label.to_string(),
            street: "12 Lake Road".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            pincode: "411001".to_string(),
            phone: "9900112233".to_string(),
            is_default,
        }
    }

    #[tokio::test]
    async fn test_single_default_invariant_on_add() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Asha").await?;

        add_address(&db, user.id, sample("Home", true)).await?;
        add_address(&db, user.id, sample("Work", true)).await?;

        let addresses = list_addresses(&db, user.id).await?;
        let defaults: Vec<&str> = addresses
            .iter()
            .filter(|a| a.is_default)
            .map(|a| a.label.as_str())
            .collect();
        assert_eq!(defaults, vec!["Work"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_set_default_by_position() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Asha").await?;

        add_address(&db, user.id, sample("Home", true)).await?;
        add_address(&db, user.id, sample("Work", false)).await?;

        let updated = set_default_address(&db, user.id, 1).await?;
        assert_eq!(updated.label, "Work");

        let addresses = list_addresses(&db, user.id).await?;
        assert!(!addresses[0].is_default);
        assert!(addresses[1].is_default);

        let result = set_default_address(&db, user.id, 7).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidArgument { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_address_by_position() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Asha").await?;

        add_address(&db, user.id, sample("Home", false)).await?;
        add_address(&db, user.id, sample("Work", false)).await?;

        delete_address(&db, user.id, 0).await?;
        let addresses = list_addresses(&db, user.id).await?;
        assert_eq!(addresses.len(), 1);
        assert_eq!(addresses[0].label, "Work");

        let result = delete_address(&db, user.id, 3).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidArgument { .. }));

        Ok(())
    }
}
