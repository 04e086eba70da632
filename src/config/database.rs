//! Database configuration module for `Mealflow`.
//!
//! This module handles `SQLite` database connection and table creation using
//! `SeaORM`. Tables are generated from the entity definitions via
//! `Schema::create_table_from_entity`, so the database schema always matches
//! the Rust struct definitions without hand-written SQL.

use crate::entities::{
    Address, CartItem, Comment, ConfigRecord, Coupon, DeliveryAgent, DeliveryCredit, FanLink,
    GuideLink, Meal, MealPlan, MealRecipe, Notification, NutritionEntry, Order, OrderItem,
    OrderStatusEvent, Post, PostVote, ProcessedIngredient, Purchase, Recipe, RecipeIngredient,
    SourceIngredient, SourceReference, User, WithdrawalRequest,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Establishes a connection to the `SQLite` database using the
/// `DATABASE_URL` environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is
/// set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/mealflow.sqlite".to_string());

    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all database tables from the entity definitions.
///
/// Uses `IF NOT EXISTS`, so the call is idempotent on an already
/// initialized database.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let statements = vec![
        schema.create_table_from_entity(SourceIngredient),
        schema.create_table_from_entity(Purchase),
        schema.create_table_from_entity(ProcessedIngredient),
        schema.create_table_from_entity(SourceReference),
        schema.create_table_from_entity(NutritionEntry),
        schema.create_table_from_entity(Recipe),
        schema.create_table_from_entity(RecipeIngredient),
        schema.create_table_from_entity(Meal),
        schema.create_table_from_entity(MealRecipe),
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Address),
        schema.create_table_from_entity(GuideLink),
        schema.create_table_from_entity(FanLink),
        schema.create_table_from_entity(Post),
        schema.create_table_from_entity(PostVote),
        schema.create_table_from_entity(Comment),
        schema.create_table_from_entity(Notification),
        schema.create_table_from_entity(CartItem),
        schema.create_table_from_entity(Coupon),
        schema.create_table_from_entity(Order),
        schema.create_table_from_entity(OrderItem),
        schema.create_table_from_entity(OrderStatusEvent),
        schema.create_table_from_entity(DeliveryAgent),
        schema.create_table_from_entity(DeliveryCredit),
        schema.create_table_from_entity(WithdrawalRequest),
        schema.create_table_from_entity(MealPlan),
        schema.create_table_from_entity(ConfigRecord),
    ];

    for mut statement in statements {
        statement.if_not_exists();
        db.execute(builder.build(&statement)).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        meal::Model as MealModel, order::Model as OrderModel,
        source_ingredient::Model as SourceIngredientModel, user::Model as UserModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Spot-check a few tables by querying them
        let _: Vec<SourceIngredientModel> = SourceIngredient::find().limit(1).all(&db).await?;
        let _: Vec<MealModel> = Meal::find().limit(1).all(&db).await?;
        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;
        let _: Vec<OrderModel> = Order::find().limit(1).all(&db).await?;

        Ok(())
    }
}
