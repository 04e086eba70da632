//! Database initialization and seeding for `Mealflow`.
//!
//! Creates the schema, persists the default configuration documents, and
//! loads the starter catalog from `config.toml` into an empty database. The
//! serving surface runs elsewhere; this binary only prepares the store.

use mealflow::config::{database, seed};
use mealflow::core::settings;
use mealflow::entities::ConfigRecord;
use mealflow::errors::Result;
use sea_orm::EntityTrait;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    dotenvy::dotenv().ok();

    let db = database::create_connection().await?;
    database::create_tables(&db).await?;
    info!("database schema ready");

    ensure_default_configs(&db).await?;

    match seed::load_seed("config.toml") {
        Ok(catalog) => {
            if seed::seed_catalog(&db, &catalog).await? {
                info!("starter catalog seeded");
            }
        }
        Err(e) => warn!(error = %e, "no seed catalog loaded; continuing with an empty catalog"),
    }

    Ok(())
}

/// Writes the default configuration documents for any key that has never
/// been saved, leaving admin-edited documents alone.
async fn ensure_default_configs(db: &sea_orm::DatabaseConnection) -> Result<()> {
    if ConfigRecord::find_by_id(settings::STAR_RATING_KEY.to_string())
        .one(db)
        .await?
        .is_none()
    {
        settings::save_star_thresholds(db, &settings::StarThresholds::default()).await?;
    }
    if ConfigRecord::find_by_id(settings::COMMISSION_RATES_KEY.to_string())
        .one(db)
        .await?
        .is_none()
    {
        settings::save_commission_rates(db, &settings::CommissionRates::default()).await?;
    }
    if ConfigRecord::find_by_id(settings::DELIVERY_KEY.to_string())
        .one(db)
        .await?
        .is_none()
    {
        settings::save_delivery_config(db, &settings::DeliveryConfig::default()).await?;
    }
    if ConfigRecord::find_by_id(settings::POINT_VALUES_KEY.to_string())
        .one(db)
        .await?
        .is_none()
    {
        settings::save_point_values(db, &settings::PointValues::default()).await?;
    }

    Ok(())
}
