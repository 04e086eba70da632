//! Star rating and commission engine.
//!
//! A user's star level is a pure function of their total loyalty points
//! (earned plus admin-granted) and the configured thresholds; the commission
//! percentage is a table lookup on the star level. The derived `star_rating`
//! and `is_guide` fields are persisted on the user row every time the point
//! total changes, so reads never have to re-derive them.

use crate::{
    core::settings::{self, CommissionRates, StarThresholds},
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, Set, prelude::*};

/// Returns the star level (0-5) for a point total.
///
/// The result is the highest level whose threshold is met; totals below the
/// one-star threshold yield 0.
#[must_use]
pub fn star_rating(total_points: i64, thresholds: &StarThresholds) -> u8 {
    let mut rating = 0;
    for (level, threshold) in thresholds.as_levels().iter().enumerate() {
        if total_points >= *threshold {
            // Cast safety: level is 0..5.
            #[allow(clippy::cast_possible_truncation)]
            {
                rating = level as u8 + 1;
            }
        }
    }
    rating
}

/// Returns the commission percentage for a star level.
///
/// Level 0 (not a guide) and out-of-table levels yield 0.
#[must_use]
pub fn commission_rate(star_level: u8, rates: &CommissionRates) -> f64 {
    match star_level {
        1 => rates.star1,
        2 => rates.star2,
        3 => rates.star3,
        4 => rates.star4,
        5 => rates.star5,
        _ => 0.0,
    }
}

/// Re-derives and persists a user's star rating and guide flag from their
/// current point totals.
///
/// Thresholds are loaded from the config store at call time. Returns the
/// updated user.
pub async fn recompute_user_rating<C>(db: &C, user_id: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("user", user_id))?;

    let thresholds = settings::load_star_thresholds(db).await?;
    let total = user.points + user.inherent_points;
    let rating = star_rating(total, &thresholds);
    let is_guide = rating >= 1;

    let mut active_model: user::ActiveModel = user.into();
    active_model.star_rating = Set(i32::from(rating));
    active_model.is_guide = Set(is_guide);
    active_model.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::social;
    use crate::test_utils::{create_test_user, setup_test_db};

    #[test]
    fn test_star_rating_default_thresholds() {
        let thresholds = StarThresholds::default();

        assert_eq!(star_rating(0, &thresholds), 0);
        assert_eq!(star_rating(24, &thresholds), 0);
        assert_eq!(star_rating(25, &thresholds), 1);
        assert_eq!(star_rating(99, &thresholds), 1);
        assert_eq!(star_rating(100, &thresholds), 2);
        assert_eq!(star_rating(250, &thresholds), 3);
        assert_eq!(star_rating(500, &thresholds), 4);
        assert_eq!(star_rating(999, &thresholds), 4);
        assert_eq!(star_rating(1000, &thresholds), 5);
        assert_eq!(star_rating(1_000_000, &thresholds), 5);
    }

    #[test]
    fn test_star_rating_monotonic() {
        let thresholds = StarThresholds::default();

        let mut previous = 0;
        for points in 0..1100 {
            let rating = star_rating(points, &thresholds);
            assert!(rating >= previous, "rating dropped at {points} points");
            previous = rating;
        }
    }

    #[test]
    fn test_commission_rate_default_table() {
        let rates = CommissionRates::default();

        assert_eq!(commission_rate(0, &rates), 0.0);
        assert_eq!(commission_rate(1, &rates), 3.0);
        assert_eq!(commission_rate(2, &rates), 6.0);
        assert_eq!(commission_rate(3, &rates), 9.0);
        assert_eq!(commission_rate(4, &rates), 12.0);
        assert_eq!(commission_rate(5, &rates), 15.0);
        assert_eq!(commission_rate(6, &rates), 0.0);
    }

    #[test]
    fn test_rating_to_rate_composition_for_defaults() {
        let thresholds = StarThresholds::default();
        let rates = CommissionRates::default();

        // 0 pts -> 0%, 25 pts -> 3%, 1000 pts -> 15%
        assert_eq!(commission_rate(star_rating(0, &thresholds), &rates), 0.0);
        assert_eq!(commission_rate(star_rating(25, &thresholds), &rates), 3.0);
        assert_eq!(commission_rate(star_rating(1000, &thresholds), &rates), 15.0);
    }

    #[tokio::test]
    async fn test_recompute_persists_rating_and_guide_flag() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Asha").await?;

        assert_eq!(user.star_rating, 0);
        assert!(!user.is_guide);

        social::set_inherent_points(&db, user.id, 120).await?;

        let updated = User::find_by_id(user.id).one(&db).await?.unwrap();
        assert_eq!(updated.star_rating, 2);
        assert!(updated.is_guide);

        Ok(())
    }

    #[tokio::test]
    async fn test_recompute_honors_configured_thresholds() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "Bela").await?;

        settings::save_star_thresholds(
            &db,
            &StarThresholds {
                star1: 5,
                star2: 10,
                star3: 15,
                star4: 20,
                star5: 30,
            },
        )
        .await?;

        social::set_inherent_points(&db, user.id, 12).await?;

        let updated = User::find_by_id(user.id).one(&db).await?.unwrap();
        assert_eq!(updated.star_rating, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_recompute_unknown_user() -> Result<()> {
        let db = setup_test_db().await?;

        let result = recompute_user_rating(&db, 999).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { entity: "user", .. }
        ));

        Ok(())
    }
}
