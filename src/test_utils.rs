//! Shared test utilities for `Mealflow`.
//!
//! This module provides common helper functions for setting up test
//! databases and creating test entities with sensible defaults.

use crate::{
    core::{ledger, social},
    entities,
    errors::Result,
};
use sea_orm::{DatabaseConnection, Set, prelude::*};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test user with a generated email and zero points.
pub async fn create_test_user(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::user::Model> {
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
    social::create_user(db, name.to_string(), email).await
}

/// Creates a test user promoted to guide standing (one star via inherent
/// points) with the given commission balance.
pub async fn create_test_guide_with_balance(
    db: &DatabaseConnection,
    name: &str,
    commission_balance: f64,
) -> Result<entities::user::Model> {
    let user = create_test_user(db, name).await?;
    let user = social::set_inherent_points(db, user.id, 25).await?;

    let mut active_model: entities::user::ActiveModel = user.into();
    active_model.commission_balance = Set(commission_balance);
    active_model.update(db).await.map_err(Into::into)
}

/// Creates a test source ingredient measured in kilograms.
pub async fn create_test_source_ingredient(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::source_ingredient::Model> {
    ledger::create_source_ingredient(db, name.to_string(), "kg".to_string()).await
}
