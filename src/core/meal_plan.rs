//! Guide meal-plan lifecycle.
//!
//! A guidee asks a guide to plan their meals; the guide accepts or declines.
//! A plan can only be decided while it is still `requested`, and only by the
//! guide it was addressed to. Orders placed against a plan attribute
//! commission to the plan's guide (see [`crate::core::order`]).

use crate::{
    entities::{MealPlan, User, meal_plan},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};

/// `requested` - awaiting the guide's decision
pub const STATUS_REQUESTED: &str = "requested";
/// `accepted` - the guide runs the plan
pub const STATUS_ACCEPTED: &str = "accepted";
/// `declined` - the guide turned the plan down
pub const STATUS_DECLINED: &str = "declined";

/// Submits a meal-plan request from a guidee to a guide.
pub async fn request_meal_plan(
    db: &DatabaseConnection,
    guidee_id: i64,
    guide_id: i64,
    title: String,
) -> Result<meal_plan::Model> {
    User::find_by_id(guidee_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("user", guidee_id))?;
    let guide = User::find_by_id(guide_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("user", guide_id))?;
    if !guide.is_guide {
        return Err(Error::invalid("target user is not a guide"));
    }

    let row = meal_plan::ActiveModel {
        guidee_id: Set(guidee_id),
        guide_id: Set(guide_id),
        title: Set(title),
        status: Set(STATUS_REQUESTED.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    row.insert(db).await.map_err(Into::into)
}

async fn decide_plan(
    db: &DatabaseConnection,
    plan_id: i64,
    guide_id: i64,
    new_status: &str,
) -> Result<meal_plan::Model> {
    let plan = MealPlan::find_by_id(plan_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("meal plan", plan_id))?;
    if plan.guide_id != guide_id {
        return Err(Error::forbidden("only the plan's guide may decide it"));
    }
    if plan.status != STATUS_REQUESTED {
        return Err(Error::conflict(format!(
            "meal plan already decided (status {})",
            plan.status
        )));
    }

    let mut active_model: meal_plan::ActiveModel = plan.into();
    active_model.status = Set(new_status.to_string());
    active_model.update(db).await.map_err(Into::into)
}

/// Accepts a requested plan. Only the addressed guide, only once.
pub async fn accept_meal_plan(
    db: &DatabaseConnection,
    plan_id: i64,
    guide_id: i64,
) -> Result<meal_plan::Model> {
    decide_plan(db, plan_id, guide_id, STATUS_ACCEPTED).await
}

/// Declines a requested plan. Only the addressed guide, only once.
pub async fn decline_meal_plan(
    db: &DatabaseConnection,
    plan_id: i64,
    guide_id: i64,
) -> Result<meal_plan::Model> {
    decide_plan(db, plan_id, guide_id, STATUS_DECLINED).await
}

/// Lists the plans addressed to a guide, newest first.
pub async fn list_plans_for_guide(
    db: &DatabaseConnection,
    guide_id: i64,
) -> Result<Vec<meal_plan::Model>> {
    MealPlan::find()
        .filter(meal_plan::Column::GuideId.eq(guide_id))
        .order_by_desc(meal_plan::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists the plans a guidee has requested, newest first.
pub async fn list_plans_for_guidee(
    db: &DatabaseConnection,
    guidee_id: i64,
) -> Result<Vec<meal_plan::Model>> {
    MealPlan::find()
        .filter(meal_plan::Column::GuideeId.eq(guidee_id))
        .order_by_desc(meal_plan::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::social;
    use crate::test_utils::{create_test_user, setup_test_db};

    async fn guide_and_guidee(
        db: &DatabaseConnection,
    ) -> Result<(crate::entities::user::Model, crate::entities::user::Model)> {
        let guide = create_test_user(db, "Guide").await?;
        let guide = social::set_inherent_points(db, guide.id, 25).await?;
        let guidee = create_test_user(db, "Guidee").await?;
        Ok((guide, guidee))
    }

    #[tokio::test]
    async fn test_request_requires_guide_target() -> Result<()> {
        let db = setup_test_db().await?;
        let plain = create_test_user(&db, "Plain").await?;
        let guidee = create_test_user(&db, "Guidee").await?;

        let result =
            request_meal_plan(&db, guidee.id, plain.id, "Weekly plan".to_string()).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidArgument { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_accept_only_once_and_only_by_guide() -> Result<()> {
        let db = setup_test_db().await?;
        let (guide, guidee) = guide_and_guidee(&db).await?;
        let stranger = create_test_user(&db, "Stranger").await?;

        let plan =
            request_meal_plan(&db, guidee.id, guide.id, "Weekly plan".to_string()).await?;
        assert_eq!(plan.status, STATUS_REQUESTED);

        let result = accept_meal_plan(&db, plan.id, stranger.id).await;
        assert!(matches!(result.unwrap_err(), Error::Forbidden { .. }));

        let accepted = accept_meal_plan(&db, plan.id, guide.id).await?;
        assert_eq!(accepted.status, STATUS_ACCEPTED);

        // Deciding twice conflicts
        let result = accept_meal_plan(&db, plan.id, guide.id).await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));
        let result = decline_meal_plan(&db, plan.id, guide.id).await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_listing_by_both_sides() -> Result<()> {
        let db = setup_test_db().await?;
        let (guide, guidee) = guide_and_guidee(&db).await?;

        request_meal_plan(&db, guidee.id, guide.id, "Plan A".to_string()).await?;
        request_meal_plan(&db, guidee.id, guide.id, "Plan B".to_string()).await?;

        let for_guide = list_plans_for_guide(&db, guide.id).await?;
        assert_eq!(for_guide.len(), 2);
        assert_eq!(for_guide[0].title, "Plan B");

        let for_guidee = list_plans_for_guidee(&db, guidee.id).await?;
        assert_eq!(for_guidee.len(), 2);

        Ok(())
    }
}
