//! Guide commission withdrawal lifecycle.
//!
//! A guide may request a payout up to their current commission balance. The
//! request sits in `pending` until an admin approves (deducting the balance
//! and stamping the processing time) or rejects it; either way it can only
//! be processed once.

use crate::{
    entities::{User, WithdrawalRequest, user, withdrawal_request},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::info;

/// `pending` - awaiting an admin decision
pub const STATUS_PENDING: &str = "pending";
/// `approved` - paid out, balance deducted
pub const STATUS_APPROVED: &str = "approved";
/// `rejected` - declined, balance untouched
pub const STATUS_REJECTED: &str = "rejected";

/// Submits a withdrawal request for a guide.
pub async fn request_withdrawal(
    db: &DatabaseConnection,
    guide_id: i64,
    amount: f64,
) -> Result<withdrawal_request::Model> {
    let guide = User::find_by_id(guide_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("user", guide_id))?;
    if !guide.is_guide {
        return Err(Error::forbidden("only guides can request withdrawals"));
    }
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::invalid(format!(
            "withdrawal amount must be positive, got {amount}"
        )));
    }
    if amount > guide.commission_balance {
        return Err(Error::invalid(format!(
            "withdrawal amount {amount} exceeds commission balance {}",
            guide.commission_balance
        )));
    }

    let row = withdrawal_request::ActiveModel {
        guide_id: Set(guide_id),
        amount: Set(amount),
        status: Set(STATUS_PENDING.to_string()),
        created_at: Set(Utc::now()),
        processed_at: Set(None),
        ..Default::default()
    };
    let created = row.insert(db).await?;
    info!(guide_id, amount, "withdrawal requested");
    Ok(created)
}

/// Lists a guide's withdrawal requests, newest first.
pub async fn list_withdrawals(
    db: &DatabaseConnection,
    guide_id: i64,
) -> Result<Vec<withdrawal_request::Model>> {
    WithdrawalRequest::find()
        .filter(withdrawal_request::Column::GuideId.eq(guide_id))
        .order_by_desc(withdrawal_request::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists all withdrawal requests, newest first (admin view).
pub async fn list_all_withdrawals(
    db: &DatabaseConnection,
) -> Result<Vec<withdrawal_request::Model>> {
    WithdrawalRequest::find()
        .order_by_desc(withdrawal_request::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Approves a pending withdrawal, deducting the amount from the guide's
/// commission balance.
pub async fn approve_withdrawal(
    db: &DatabaseConnection,
    withdrawal_id: i64,
) -> Result<withdrawal_request::Model> {
    let request = WithdrawalRequest::find_by_id(withdrawal_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("withdrawal request", withdrawal_id))?;
    if request.status != STATUS_PENDING {
        return Err(Error::conflict(format!(
            "withdrawal already processed (status {})",
            request.status
        )));
    }

    let txn = db.begin().await?;

    User::update_many()
        .col_expr(
            user::Column::CommissionBalance,
            Expr::col(user::Column::CommissionBalance).sub(request.amount),
        )
        .filter(user::Column::Id.eq(request.guide_id))
        .exec(&txn)
        .await?;

    let mut active_model: withdrawal_request::ActiveModel = request.into();
    active_model.status = Set(STATUS_APPROVED.to_string());
    active_model.processed_at = Set(Some(Utc::now()));
    let updated = active_model.update(&txn).await?;

    txn.commit().await?;
    info!(withdrawal_id, "withdrawal approved");
    Ok(updated)
}

/// Rejects a pending withdrawal; the guide's balance is untouched.
pub async fn reject_withdrawal(
    db: &DatabaseConnection,
    withdrawal_id: i64,
) -> Result<withdrawal_request::Model> {
    let request = WithdrawalRequest::find_by_id(withdrawal_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("withdrawal request", withdrawal_id))?;
    if request.status != STATUS_PENDING {
        return Err(Error::conflict(format!(
            "withdrawal already processed (status {})",
            request.status
        )));
    }

    let mut active_model: withdrawal_request::ActiveModel = request.into();
    active_model.status = Set(STATUS_REJECTED.to_string());
    active_model.processed_at = Set(Some(Utc::now()));
    active_model.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::social;
    use crate::test_utils::{create_test_guide_with_balance, create_test_user, setup_test_db};

    #[tokio::test]
    async fn test_only_guides_may_request() -> Result<()> {
        let db = setup_test_db().await?;
        let plain = create_test_user(&db, "Asha").await?;

        let result = request_withdrawal(&db, plain.id, 10.0).await;
        assert!(matches!(result.unwrap_err(), Error::Forbidden { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_request_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let guide = create_test_guide_with_balance(&db, "Guide", 100.0).await?;

        let result = request_withdrawal(&db, guide.id, 0.0).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidArgument { .. }));

        let result = request_withdrawal(&db, guide.id, 150.0).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidArgument { .. }));

        let request = request_withdrawal(&db, guide.id, 80.0).await?;
        assert_eq!(request.status, STATUS_PENDING);
        assert!(request.processed_at.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_approve_deducts_balance_once() -> Result<()> {
        let db = setup_test_db().await?;
        let guide = create_test_guide_with_balance(&db, "Guide", 100.0).await?;

        let request = request_withdrawal(&db, guide.id, 60.0).await?;
        let approved = approve_withdrawal(&db, request.id).await?;
        assert_eq!(approved.status, STATUS_APPROVED);
        assert!(approved.processed_at.is_some());

        let guide_after = social::get_user(&db, guide.id).await?.unwrap();
        assert_eq!(guide_after.commission_balance, 40.0);

        // Processing twice conflicts and does not double-deduct
        let result = approve_withdrawal(&db, request.id).await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));
        let guide_final = social::get_user(&db, guide.id).await?.unwrap();
        assert_eq!(guide_final.commission_balance, 40.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_reject_leaves_balance_untouched() -> Result<()> {
        let db = setup_test_db().await?;
        let guide = create_test_guide_with_balance(&db, "Guide", 100.0).await?;

        let request = request_withdrawal(&db, guide.id, 60.0).await?;
        let rejected = reject_withdrawal(&db, request.id).await?;
        assert_eq!(rejected.status, STATUS_REJECTED);

        let guide_after = social::get_user(&db, guide.id).await?.unwrap();
        assert_eq!(guide_after.commission_balance, 100.0);

        // A rejected request cannot be approved later
        let result = approve_withdrawal(&db, request.id).await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));

        Ok(())
    }
}
