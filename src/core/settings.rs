//! Business configuration documents.
//!
//! Star thresholds, commission rates, delivery settings, and point values are
//! admin-editable at runtime, so they live in the database rather than in
//! code or a file. Each document is one row in the key-value config store,
//! serialized as JSON; saving replaces the whole document. Loading a key that
//! was never saved yields the compiled-in defaults, so a fresh install works
//! without any admin action. Callers load a document per request and pass it
//! into the pure functions that need it - there is no ambient global config.

use crate::{
    entities::{ConfigRecord, config_record},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{ConnectionTrait, Set, prelude::*};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Config-store key for [`StarThresholds`]
pub const STAR_RATING_KEY: &str = "star_rating";
/// Config-store key for [`CommissionRates`]
pub const COMMISSION_RATES_KEY: &str = "commission_rates";
/// Config-store key for [`DeliveryConfig`]
pub const DELIVERY_KEY: &str = "delivery";
/// Config-store key for [`PointValues`]
pub const POINT_VALUES_KEY: &str = "point_values";

/// Ascending loyalty-point thresholds for the five star levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarThresholds {
    /// Points required for one star
    pub star1: i64,
    /// Points required for two stars
    pub star2: i64,
    /// Points required for three stars
    pub star3: i64,
    /// Points required for four stars
    pub star4: i64,
    /// Points required for five stars
    pub star5: i64,
}

impl Default for StarThresholds {
    fn default() -> Self {
        Self {
            star1: 25,
            star2: 100,
            star3: 250,
            star4: 500,
            star5: 1000,
        }
    }
}

impl StarThresholds {
    /// Thresholds in ascending star order, for level scans.
    #[must_use]
    pub const fn as_levels(&self) -> [i64; 5] {
        [self.star1, self.star2, self.star3, self.star4, self.star5]
    }
}

/// Commission percentage per star level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionRates {
    /// Commission percentage at one star
    pub star1: f64,
    /// Commission percentage at two stars
    pub star2: f64,
    /// Commission percentage at three stars
    pub star3: f64,
    /// Commission percentage at four stars
    pub star4: f64,
    /// Commission percentage at five stars
    pub star5: f64,
}

impl Default for CommissionRates {
    fn default() -> Self {
        Self {
            star1: 3.0,
            star2: 6.0,
            star3: 9.0,
            star4: 12.0,
            star5: 15.0,
        }
    }
}

/// Delivery pricing and timing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Flat delivery fee charged below the free-delivery threshold
    pub delivery_price: f64,
    /// Order subtotal at which delivery becomes free
    pub min_order_for_free_delivery: f64,
    /// Delivery-time budget for regular orders, in minutes from acceptance
    pub regular_order_ttd_minutes: i64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            delivery_price: 0.0,
            min_order_for_free_delivery: 0.0,
            regular_order_ttd_minutes: 45,
        }
    }
}

/// Loyalty points awarded per social event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointValues {
    /// Points for publishing a post
    pub post: i64,
    /// Points for receiving a vote on a post
    pub like: i64,
    /// Points for gaining a fan
    pub fan: i64,
    /// Points for gaining a guidee
    pub guidee: i64,
}

impl Default for PointValues {
    fn default() -> Self {
        Self {
            post: 5,
            like: 2,
            fan: 3,
            guidee: 5,
        }
    }
}

/// Loads one config document by key, falling back to `T::default()` when the
/// key has never been saved.
async fn load_document<C, T>(db: &C, key: &str) -> Result<T>
where
    C: ConnectionTrait,
    T: DeserializeOwned + Default,
{
    let record = ConfigRecord::find_by_id(key.to_string()).one(db).await?;
    match record {
        Some(r) => Ok(serde_json::from_str(&r.value)?),
        None => Ok(T::default()),
    }
}

/// Saves one config document by key, replacing the whole stored value.
async fn save_document<C, T>(db: &C, key: &str, document: &T) -> Result<()>
where
    C: ConnectionTrait,
    T: Serialize,
{
    let value = serde_json::to_string(document)?;
    let now = Utc::now();

    let existing = ConfigRecord::find_by_id(key.to_string()).one(db).await?;
    if let Some(record) = existing {
        let mut active_model: config_record::ActiveModel = record.into();
        active_model.value = Set(value);
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        let record = config_record::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value),
            updated_at: Set(now),
        };
        record.insert(db).await?;
    }

    Ok(())
}

/// Loads the star-rating thresholds (defaults when unset).
pub async fn load_star_thresholds<C: ConnectionTrait>(db: &C) -> Result<StarThresholds> {
    load_document(db, STAR_RATING_KEY).await
}

/// Replaces the star-rating thresholds document.
pub async fn save_star_thresholds<C: ConnectionTrait>(
    db: &C,
    thresholds: &StarThresholds,
) -> Result<()> {
    save_document(db, STAR_RATING_KEY, thresholds).await
}

/// Loads the commission-rate table (defaults when unset).
pub async fn load_commission_rates<C: ConnectionTrait>(db: &C) -> Result<CommissionRates> {
    load_document(db, COMMISSION_RATES_KEY).await
}

/// Replaces the commission-rate document.
pub async fn save_commission_rates<C: ConnectionTrait>(
    db: &C,
    rates: &CommissionRates,
) -> Result<()> {
    save_document(db, COMMISSION_RATES_KEY, rates).await
}

/// Loads the delivery settings (defaults when unset).
pub async fn load_delivery_config<C: ConnectionTrait>(db: &C) -> Result<DeliveryConfig> {
    load_document(db, DELIVERY_KEY).await
}

/// Replaces the delivery-settings document.
pub async fn save_delivery_config<C: ConnectionTrait>(db: &C, config: &DeliveryConfig) -> Result<()> {
    save_document(db, DELIVERY_KEY, config).await
}

/// Loads the point values (defaults when unset).
pub async fn load_point_values<C: ConnectionTrait>(db: &C) -> Result<PointValues> {
    load_document(db, POINT_VALUES_KEY).await
}

/// Replaces the point-values document.
pub async fn save_point_values<C: ConnectionTrait>(db: &C, values: &PointValues) -> Result<()> {
    save_document(db, POINT_VALUES_KEY, values).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::setup_test_db;
    use sea_orm::PaginatorTrait;

    #[tokio::test]
    async fn test_defaults_when_unset() -> Result<()> {
        let db = setup_test_db().await?;

        let thresholds = load_star_thresholds(&db).await?;
        assert_eq!(thresholds, StarThresholds::default());
        assert_eq!(thresholds.star1, 25);
        assert_eq!(thresholds.star5, 1000);

        let rates = load_commission_rates(&db).await?;
        assert_eq!(rates.star1, 3.0);
        assert_eq!(rates.star5, 15.0);

        let delivery = load_delivery_config(&db).await?;
        assert_eq!(delivery.regular_order_ttd_minutes, 45);

        let points = load_point_values(&db).await?;
        assert_eq!(points, PointValues::default());

        Ok(())
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrip() -> Result<()> {
        let db = setup_test_db().await?;

        let thresholds = StarThresholds {
            star1: 10,
            star2: 50,
            star3: 150,
            star4: 400,
            star5: 900,
        };
        save_star_thresholds(&db, &thresholds).await?;

        let loaded = load_star_thresholds(&db).await?;
        assert_eq!(loaded, thresholds);

        Ok(())
    }

    #[tokio::test]
    async fn test_save_replaces_whole_document() -> Result<()> {
        let db = setup_test_db().await?;

        save_delivery_config(
            &db,
            &DeliveryConfig {
                delivery_price: 40.0,
                min_order_for_free_delivery: 500.0,
                regular_order_ttd_minutes: 30,
            },
        )
        .await?;

        save_delivery_config(
            &db,
            &DeliveryConfig {
                delivery_price: 25.0,
                min_order_for_free_delivery: 300.0,
                regular_order_ttd_minutes: 60,
            },
        )
        .await?;

        let loaded = load_delivery_config(&db).await?;
        assert_eq!(loaded.delivery_price, 25.0);
        assert_eq!(loaded.min_order_for_free_delivery, 300.0);
        assert_eq!(loaded.regular_order_ttd_minutes, 60);

        // Still exactly one row for the key
        let count = ConfigRecord::find_by_id(DELIVERY_KEY.to_string())
            .count(&db)
            .await?;
        assert_eq!(count, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_documents_are_independent() -> Result<()> {
        let db = setup_test_db().await?;

        save_star_thresholds(
            &db,
            &StarThresholds {
                star1: 1,
                star2: 2,
                star3: 3,
                star4: 4,
                star5: 5,
            },
        )
        .await?;

        // Other documents keep their defaults
        let rates = load_commission_rates(&db).await?;
        assert_eq!(rates, CommissionRates::default());

        Ok(())
    }
}
