//! Catalog management for processed ingredients, recipes, and meals.
//!
//! Composition rows (source references, recipe ingredients, meal recipes)
//! are inserted together with their parent inside one transaction. Deleting
//! a catalog entry removes its own composition rows but deliberately leaves
//! any inbound references from higher layers dangling - the price roll-up
//! skips them (see [`crate::core::pricing`]).

use crate::{
    entities::{
        Meal, MealRecipe, NutritionEntry, ProcessedIngredient, Recipe, RecipeIngredient, meal,
        meal_recipe, nutrition_entry, processed_ingredient, recipe, recipe_ingredient,
    },
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;

/// The five flat margin amounts added on top of a processed ingredient's
/// source costs. Any omitted margin is 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Margins {
    /// Margin covering the product itself
    #[serde(default)]
    pub product: f64,
    /// Margin covering operations
    #[serde(default)]
    pub operations: f64,
    /// Margin covering branding
    #[serde(default)]
    pub branding: f64,
    /// Margin covering rest
    #[serde(default)]
    pub rest: f64,
    /// Margin covering miscellaneous costs
    #[serde(default)]
    pub miscellaneous: f64,
}

impl Margins {
    /// Sum of all five margins.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.product + self.operations + self.branding + self.rest + self.miscellaneous
    }
}

/// One source-ingredient component of a new processed ingredient.
#[derive(Debug, Clone, Copy)]
pub struct SourceRefSpec {
    /// Referenced source ingredient
    pub source_id: i64,
    /// Quantity of the source per unit of the processed ingredient
    pub source_quantity: f64,
}

/// One nutrition entry of a new processed ingredient.
#[derive(Debug, Clone)]
pub struct NutritionSpec {
    /// Nutrient name
    pub name: String,
    /// Amount per unit of the processed ingredient
    pub value_per_unit: f64,
    /// Unit the value is expressed in
    pub unit: String,
}

/// One ingredient line of a new recipe.
#[derive(Debug, Clone)]
pub struct RecipeIngredientSpec {
    /// Referenced processed ingredient
    pub ingredient_id: i64,
    /// Quantity going into the recipe
    pub quantity: f64,
    /// Unit the quantity is expressed in
    pub unit: String,
    /// Optional portioning step override
    pub step_size: Option<f64>,
}

/// One recipe line of a new meal.
#[derive(Debug, Clone, Copy)]
pub struct MealRecipeSpec {
    /// Referenced recipe
    pub recipe_id: i64,
    /// Servings of the recipe going into the meal
    pub quantity_multiplier: f64,
    /// Optional portioning step override
    pub step_size: Option<f64>,
}

fn validate_name(name: &str, what: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::invalid(format!("{what} name cannot be empty")));
    }
    Ok(())
}

fn validate_quantity(quantity: f64, what: &str) -> Result<()> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(Error::invalid(format!(
            "{what} quantity must be positive, got {quantity}"
        )));
    }
    Ok(())
}

/// Creates a processed ingredient together with its source references and
/// nutrition entries.
pub async fn create_processed_ingredient(
    db: &DatabaseConnection,
    name: String,
    unit: String,
    margins: Margins,
    sources: Vec<SourceRefSpec>,
    nutrition: Vec<NutritionSpec>,
) -> Result<processed_ingredient::Model> {
    validate_name(&name, "processed ingredient")?;
    for source in &sources {
        validate_quantity(source.source_quantity, "source reference")?;
    }

    let txn = db.begin().await?;

    let ingredient = processed_ingredient::ActiveModel {
        name: Set(name.trim().to_string()),
        unit: Set(unit),
        margin_product: Set(margins.product),
        margin_operations: Set(margins.operations),
        margin_branding: Set(margins.branding),
        margin_rest: Set(margins.rest),
        margin_miscellaneous: Set(margins.miscellaneous),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let ingredient = ingredient.insert(&txn).await?;

    for source in sources {
        let reference = crate::entities::source_reference::ActiveModel {
            processed_id: Set(ingredient.id),
            source_id: Set(source.source_id),
            source_quantity: Set(source.source_quantity),
            ..Default::default()
        };
        reference.insert(&txn).await?;
    }

    for entry in nutrition {
        let row = nutrition_entry::ActiveModel {
            processed_id: Set(ingredient.id),
            name: Set(entry.name),
            value_per_unit: Set(entry.value_per_unit),
            unit: Set(entry.unit),
            ..Default::default()
        };
        row.insert(&txn).await?;
    }

    txn.commit().await?;
    Ok(ingredient)
}

/// Retrieves a processed ingredient by id.
pub async fn get_processed_ingredient(
    db: &DatabaseConnection,
    ingredient_id: i64,
) -> Result<Option<processed_ingredient::Model>> {
    ProcessedIngredient::find_by_id(ingredient_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists all processed ingredients, ordered alphabetically by name.
pub async fn list_processed_ingredients(
    db: &DatabaseConnection,
) -> Result<Vec<processed_ingredient::Model>> {
    ProcessedIngredient::find()
        .order_by_asc(processed_ingredient::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a processed ingredient with its composition rows.
///
/// Recipes referencing it keep their (now dangling) rows; the roll-up skips
/// them and reports the skip.
pub async fn delete_processed_ingredient(db: &DatabaseConnection, ingredient_id: i64) -> Result<()> {
    ProcessedIngredient::find_by_id(ingredient_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("processed ingredient", ingredient_id))?;

    let txn = db.begin().await?;
    crate::entities::SourceReference::delete_many()
        .filter(crate::entities::source_reference::Column::ProcessedId.eq(ingredient_id))
        .exec(&txn)
        .await?;
    NutritionEntry::delete_many()
        .filter(nutrition_entry::Column::ProcessedId.eq(ingredient_id))
        .exec(&txn)
        .await?;
    ProcessedIngredient::delete_by_id(ingredient_id)
        .exec(&txn)
        .await?;
    txn.commit().await?;

    Ok(())
}

/// Creates a recipe together with its ingredient lines.
pub async fn create_recipe(
    db: &DatabaseConnection,
    name: String,
    ingredients: Vec<RecipeIngredientSpec>,
) -> Result<recipe::Model> {
    validate_name(&name, "recipe")?;
    for line in &ingredients {
        validate_quantity(line.quantity, "recipe ingredient")?;
    }

    let txn = db.begin().await?;

    let recipe = recipe::ActiveModel {
        name: Set(name.trim().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let recipe = recipe.insert(&txn).await?;

    for line in ingredients {
        let row = recipe_ingredient::ActiveModel {
            recipe_id: Set(recipe.id),
            ingredient_id: Set(line.ingredient_id),
            quantity: Set(line.quantity),
            unit: Set(line.unit),
            step_size: Set(line.step_size),
            ..Default::default()
        };
        row.insert(&txn).await?;
    }

    txn.commit().await?;
    Ok(recipe)
}

/// Retrieves a recipe by id.
pub async fn get_recipe(db: &DatabaseConnection, recipe_id: i64) -> Result<Option<recipe::Model>> {
    Recipe::find_by_id(recipe_id).one(db).await.map_err(Into::into)
}

/// Lists all recipes, ordered alphabetically by name.
pub async fn list_recipes(db: &DatabaseConnection) -> Result<Vec<recipe::Model>> {
    Recipe::find()
        .order_by_asc(recipe::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a recipe with its ingredient lines. Meals referencing it keep
/// their dangling rows; the roll-up skips them.
pub async fn delete_recipe(db: &DatabaseConnection, recipe_id: i64) -> Result<()> {
    Recipe::find_by_id(recipe_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("recipe", recipe_id))?;

    let txn = db.begin().await?;
    RecipeIngredient::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .exec(&txn)
        .await?;
    Recipe::delete_by_id(recipe_id).exec(&txn).await?;
    txn.commit().await?;

    Ok(())
}

/// Creates a meal together with its recipe lines.
///
/// Admin-authored presets pass `is_preset = true` and no creator;
/// user-authored meals pass their creator and are visible only to them.
pub async fn create_meal(
    db: &DatabaseConnection,
    name: String,
    is_preset: bool,
    created_by: Option<i64>,
    recipes: Vec<MealRecipeSpec>,
) -> Result<meal::Model> {
    validate_name(&name, "meal")?;
    for line in &recipes {
        validate_quantity(line.quantity_multiplier, "meal recipe")?;
    }

    let txn = db.begin().await?;

    let meal = meal::ActiveModel {
        name: Set(name.trim().to_string()),
        is_preset: Set(is_preset),
        created_by: Set(created_by),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let meal = meal.insert(&txn).await?;

    for line in recipes {
        let row = meal_recipe::ActiveModel {
            meal_id: Set(meal.id),
            recipe_id: Set(line.recipe_id),
            quantity_multiplier: Set(line.quantity_multiplier),
            step_size: Set(line.step_size),
            ..Default::default()
        };
        row.insert(&txn).await?;
    }

    txn.commit().await?;
    Ok(meal)
}

/// Retrieves a meal by id.
pub async fn get_meal(db: &DatabaseConnection, meal_id: i64) -> Result<Option<meal::Model>> {
    Meal::find_by_id(meal_id).one(db).await.map_err(Into::into)
}

/// Lists the meals visible to a user: all presets, plus the user's own
/// non-presets when a user is given.
pub async fn list_meals(db: &DatabaseConnection, user_id: Option<i64>) -> Result<Vec<meal::Model>> {
    let mut condition = Condition::any().add(meal::Column::IsPreset.eq(true));
    if let Some(user_id) = user_id {
        condition = condition.add(meal::Column::CreatedBy.eq(user_id));
    }

    Meal::find()
        .filter(condition)
        .order_by_asc(meal::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a meal with its recipe lines.
pub async fn delete_meal(db: &DatabaseConnection, meal_id: i64) -> Result<()> {
    Meal::find_by_id(meal_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("meal", meal_id))?;

    let txn = db.begin().await?;
    MealRecipe::delete_many()
        .filter(meal_recipe::Column::MealId.eq(meal_id))
        .exec(&txn)
        .await?;
    Meal::delete_by_id(meal_id).exec(&txn).await?;
    txn.commit().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{create_test_user, setup_test_db};

    #[tokio::test]
    async fn test_create_processed_ingredient_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_processed_ingredient(
            &db,
            String::new(),
            "g".to_string(),
            Margins::default(),
            vec![],
            vec![],
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidArgument { .. }));

        let result = create_processed_ingredient(
            &db,
            "Dough".to_string(),
            "g".to_string(),
            Margins::default(),
            vec![SourceRefSpec {
                source_id: 1,
                source_quantity: 0.0,
            }],
            vec![],
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidArgument { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_meal_listing_presets_and_own() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "Alice").await?;
        let bob = create_test_user(&db, "Bob").await?;

        create_meal(&db, "House Bowl".to_string(), true, None, vec![]).await?;
        create_meal(&db, "Alice Special".to_string(), false, Some(alice.id), vec![]).await?;
        create_meal(&db, "Bob Special".to_string(), false, Some(bob.id), vec![]).await?;

        // Anonymous listing: presets only
        let anonymous = list_meals(&db, None).await?;
        assert_eq!(anonymous.len(), 1);
        assert_eq!(anonymous[0].name, "House Bowl");

        // Alice sees presets plus her own meal, not Bob's
        let for_alice = list_meals(&db, Some(alice.id)).await?;
        let names: Vec<&str> = for_alice.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Alice Special", "House Bowl"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_recipe_keeps_meal_rows_dangling() -> Result<()> {
        let db = setup_test_db().await?;

        let recipe = create_recipe(&db, "Margherita".to_string(), vec![]).await?;
        let meal = create_meal(
            &db,
            "Pizza Night".to_string(),
            true,
            None,
            vec![MealRecipeSpec {
                recipe_id: recipe.id,
                quantity_multiplier: 1.0,
                step_size: None,
            }],
        )
        .await?;

        delete_recipe(&db, recipe.id).await?;

        // The meal's composition row survives; pricing reports the skip
        let rows = MealRecipe::find()
            .filter(meal_recipe::Column::MealId.eq(meal.id))
            .all(&db)
            .await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].recipe_id, recipe.id);

        Ok(())
    }
}
