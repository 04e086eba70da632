//! Seed catalog loading from `config.toml`.
//!
//! The seed file describes a starter catalog - source ingredients with
//! opening purchases, processed ingredients, recipes, and preset meals - by
//! name. Seeding resolves the names to ids layer by layer and is a no-op on
//! a database that already has a catalog.

use crate::{
    core::catalog::{
        self, MealRecipeSpec, Margins, NutritionSpec, RecipeIngredientSpec, SourceRefSpec,
    },
    core::ledger,
    entities::SourceIngredient,
    errors::{Error, Result},
};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// The whole seed catalog parsed from `config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogSeed {
    /// Raw materials with their opening purchases
    #[serde(default)]
    pub source_ingredients: Vec<SourceIngredientSeed>,
    /// Kitchen-ready ingredients composed from the sources
    #[serde(default)]
    pub processed_ingredients: Vec<ProcessedIngredientSeed>,
    /// Dishes composed from the processed ingredients
    #[serde(default)]
    pub recipes: Vec<RecipeSeed>,
    /// Preset meals composed from the recipes
    #[serde(default)]
    pub meals: Vec<MealSeed>,
}

/// One source ingredient to seed.
#[derive(Debug, Deserialize)]
pub struct SourceIngredientSeed {
    /// Ingredient name (unique within the seed)
    pub name: String,
    /// Purchase unit
    pub unit: String,
    /// Opening ledger entries
    #[serde(default)]
    pub purchases: Vec<PurchaseSeed>,
}

/// One opening purchase.
#[derive(Debug, Deserialize)]
pub struct PurchaseSeed {
    /// Quantity bought
    pub quantity: f64,
    /// Total paid
    pub total_price: f64,
}

/// One processed ingredient to seed.
#[derive(Debug, Deserialize)]
pub struct ProcessedIngredientSeed {
    /// Ingredient name (unique within the seed)
    pub name: String,
    /// Measurement unit
    pub unit: String,
    /// Flat margins (omitted fields are 0)
    #[serde(default)]
    pub margins: Margins,
    /// Source components, referenced by source-ingredient name
    #[serde(default)]
    pub sources: Vec<SourceSeed>,
    /// Per-unit nutrition entries
    #[serde(default)]
    pub nutrition: Vec<NutritionSeed>,
}

/// One source component of a processed ingredient.
#[derive(Debug, Deserialize)]
pub struct SourceSeed {
    /// Name of the seeded source ingredient
    pub source: String,
    /// Quantity per unit of the processed ingredient
    pub quantity: f64,
}

/// One nutrition entry of a processed ingredient.
#[derive(Debug, Deserialize)]
pub struct NutritionSeed {
    /// Nutrient name
    pub name: String,
    /// Amount per unit
    pub value: f64,
    /// Unit of the amount
    pub unit: String,
}

/// One recipe to seed.
#[derive(Debug, Deserialize)]
pub struct RecipeSeed {
    /// Recipe name (unique within the seed)
    pub name: String,
    /// Ingredient lines, referenced by processed-ingredient name
    #[serde(default)]
    pub ingredients: Vec<RecipeLineSeed>,
}

/// One ingredient line of a recipe.
#[derive(Debug, Deserialize)]
pub struct RecipeLineSeed {
    /// Name of the seeded processed ingredient
    pub ingredient: String,
    /// Quantity going into the recipe
    pub quantity: f64,
    /// Unit of the quantity
    pub unit: String,
}

/// One preset meal to seed.
#[derive(Debug, Deserialize)]
pub struct MealSeed {
    /// Meal name
    pub name: String,
    /// Recipe lines, referenced by recipe name
    #[serde(default)]
    pub recipes: Vec<MealLineSeed>,
}

/// One recipe line of a meal.
#[derive(Debug, Deserialize)]
pub struct MealLineSeed {
    /// Name of the seeded recipe
    pub recipe: String,
    /// Servings of the recipe in the meal
    pub multiplier: f64,
}

/// Loads a seed catalog from a TOML file.
pub fn load_seed<P: AsRef<Path>>(path: P) -> Result<CatalogSeed> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("failed to read seed file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("failed to parse seed file: {e}"),
    })
}

fn resolve<'a>(map: &'a HashMap<String, i64>, name: &str, what: &str) -> Result<&'a i64> {
    map.get(name).ok_or_else(|| Error::Config {
        message: format!("seed references unknown {what} \"{name}\""),
    })
}

/// Inserts the seed catalog, bottom-up, resolving names to ids.
///
/// Skips entirely (returning `false`) when the database already has source
/// ingredients, so re-running the seeding binary is harmless.
pub async fn seed_catalog(db: &DatabaseConnection, seed: &CatalogSeed) -> Result<bool> {
    let existing = SourceIngredient::find().count(db).await?;
    if existing > 0 {
        info!("catalog already present, skipping seed");
        return Ok(false);
    }

    let mut source_ids = HashMap::new();
    for source in &seed.source_ingredients {
        let created =
            ledger::create_source_ingredient(db, source.name.clone(), source.unit.clone()).await?;
        for purchase in &source.purchases {
            ledger::add_purchase(db, created.id, purchase.quantity, purchase.total_price).await?;
        }
        source_ids.insert(source.name.clone(), created.id);
    }

    let mut ingredient_ids = HashMap::new();
    for ingredient in &seed.processed_ingredients {
        let mut sources = Vec::with_capacity(ingredient.sources.len());
        for component in &ingredient.sources {
            sources.push(SourceRefSpec {
                source_id: *resolve(&source_ids, &component.source, "source ingredient")?,
                source_quantity: component.quantity,
            });
        }
        let nutrition = ingredient
            .nutrition
            .iter()
            .map(|entry| NutritionSpec {
                name: entry.name.clone(),
                value_per_unit: entry.value,
                unit: entry.unit.clone(),
            })
            .collect();

        let created = catalog::create_processed_ingredient(
            db,
            ingredient.name.clone(),
            ingredient.unit.clone(),
            ingredient.margins,
            sources,
            nutrition,
        )
        .await?;
        ingredient_ids.insert(ingredient.name.clone(), created.id);
    }

    let mut recipe_ids = HashMap::new();
    for recipe in &seed.recipes {
        let mut lines = Vec::with_capacity(recipe.ingredients.len());
        for line in &recipe.ingredients {
            lines.push(RecipeIngredientSpec {
                ingredient_id: *resolve(&ingredient_ids, &line.ingredient, "processed ingredient")?,
                quantity: line.quantity,
                unit: line.unit.clone(),
                step_size: None,
            });
        }
        let created = catalog::create_recipe(db, recipe.name.clone(), lines).await?;
        recipe_ids.insert(recipe.name.clone(), created.id);
    }

    for meal in &seed.meals {
        let mut lines = Vec::with_capacity(meal.recipes.len());
        for line in &meal.recipes {
            lines.push(MealRecipeSpec {
                recipe_id: *resolve(&recipe_ids, &line.recipe, "recipe")?,
                quantity_multiplier: line.multiplier,
                step_size: None,
            });
        }
        catalog::create_meal(db, meal.name.clone(), true, None, lines).await?;
    }

    info!(
        sources = seed.source_ingredients.len(),
        ingredients = seed.processed_ingredients.len(),
        recipes = seed.recipes.len(),
        meals = seed.meals.len(),
        "catalog seeded"
    );
    Ok(true)
}
