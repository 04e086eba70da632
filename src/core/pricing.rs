//! Layered price and nutrition roll-up.
//!
//! Prices flow strictly upward: source-ingredient ledgers price processed
//! ingredients, processed ingredients price recipes, recipes price meals.
//! Nothing is cached - every call recomputes from the current ledger, so
//! catalog views always show current prices while orders keep the snapshot
//! taken at creation time.
//!
//! Dangling references (a recipe pointing at a deleted ingredient, a meal at
//! a deleted recipe) never fail the roll-up: the broken component is skipped
//! so catalog browsing stays available on partially inconsistent data, and
//! every skip is reported in the returned diagnostics so callers and tests
//! can see exactly what was left out.

use crate::{
    core::ledger,
    entities::{
        MealRecipe, NutritionEntry, ProcessedIngredient, Recipe, RecipeIngredient,
        SourceIngredient, meal_recipe, nutrition_entry, processed_ingredient, recipe_ingredient,
    },
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, QueryOrder, prelude::*};

/// One reference that was skipped during a roll-up because its target no
/// longer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkippedRef {
    /// A processed ingredient referenced a missing source ingredient
    Source {
        /// Referencing processed ingredient
        processed_id: i64,
        /// Missing source ingredient
        source_id: i64,
    },
    /// A recipe referenced a missing processed ingredient
    Ingredient {
        /// Referencing recipe
        recipe_id: i64,
        /// Missing processed ingredient
        ingredient_id: i64,
    },
    /// A meal referenced a missing recipe
    Recipe {
        /// Referencing meal
        meal_id: i64,
        /// Missing recipe
        recipe_id: i64,
    },
}

/// A computed price plus the references skipped while computing it.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    /// The rolled-up price
    pub total: f64,
    /// References skipped because their target is gone
    pub skipped: Vec<SkippedRef>,
}

/// One aggregated nutrient across an entity's components.
#[derive(Debug, Clone, PartialEq)]
pub struct NutrientTotal {
    /// Nutrient name
    pub name: String,
    /// Accumulated amount
    pub value: f64,
    /// Unit of the first entry seen under this name
    pub unit: String,
    /// True when entries under this name disagreed about the unit
    pub mixed_units: bool,
}

/// Aggregated nutrition plus roll-up diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct NutritionSummary {
    /// Per-nutrient totals, in first-seen order
    pub nutrients: Vec<NutrientTotal>,
    /// References skipped because their target is gone
    pub skipped: Vec<SkippedRef>,
}

/// Folds one scaled nutrient entry into the running totals.
///
/// Same-named nutrients accumulate into one entry; the unit of the first
/// entry wins and any later disagreement only sets the `mixed_units` flag.
fn accumulate_nutrient(totals: &mut Vec<NutrientTotal>, name: &str, value: f64, unit: &str) {
    if let Some(existing) = totals.iter_mut().find(|t| t.name == name) {
        existing.value += value;
        if existing.unit != unit {
            existing.mixed_units = true;
        }
    } else {
        totals.push(NutrientTotal {
            name: name.to_string(),
            value,
            unit: unit.to_string(),
            mixed_units: false,
        });
    }
}

/// Prices a processed ingredient from the current source ledgers.
///
/// `price = Σ(latest unit price × source quantity) + Σ(margins)`. Missing
/// source ingredients are skipped and reported.
pub async fn processed_ingredient_price<C>(db: &C, ingredient_id: i64) -> Result<PriceQuote>
where
    C: ConnectionTrait,
{
    let ingredient = ProcessedIngredient::find_by_id(ingredient_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("processed ingredient", ingredient_id))?;

    price_processed_model(db, &ingredient).await
}

async fn price_processed_model<C>(
    db: &C,
    ingredient: &processed_ingredient::Model,
) -> Result<PriceQuote>
where
    C: ConnectionTrait,
{
    let references = crate::entities::SourceReference::find()
        .filter(crate::entities::source_reference::Column::ProcessedId.eq(ingredient.id))
        .order_by_asc(crate::entities::source_reference::Column::Id)
        .all(db)
        .await?;

    let mut total = 0.0;
    let mut skipped = Vec::new();

    for reference in references {
        let source = SourceIngredient::find_by_id(reference.source_id).one(db).await?;
        if source.is_none() {
            skipped.push(SkippedRef::Source {
                processed_id: ingredient.id,
                source_id: reference.source_id,
            });
            continue;
        }
        let unit_price = ledger::latest_unit_price(db, reference.source_id).await?;
        total += unit_price * reference.source_quantity;
    }

    total += ingredient.margin_product
        + ingredient.margin_operations
        + ingredient.margin_branding
        + ingredient.margin_rest
        + ingredient.margin_miscellaneous;

    Ok(PriceQuote { total, skipped })
}

/// Prices a recipe: `Σ(ingredient price × quantity)` over its lines, with
/// missing ingredients skipped and reported (including any source-level
/// skips from the layer below).
pub async fn recipe_price<C>(db: &C, recipe_id: i64) -> Result<PriceQuote>
where
    C: ConnectionTrait,
{
    Recipe::find_by_id(recipe_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("recipe", recipe_id))?;

    price_recipe_lines(db, recipe_id).await
}

async fn price_recipe_lines<C>(db: &C, recipe_id: i64) -> Result<PriceQuote>
where
    C: ConnectionTrait,
{
    let lines = RecipeIngredient::find()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .order_by_asc(recipe_ingredient::Column::Id)
        .all(db)
        .await?;

    let mut total = 0.0;
    let mut skipped = Vec::new();

    for line in lines {
        let Some(ingredient) = ProcessedIngredient::find_by_id(line.ingredient_id)
            .one(db)
            .await?
        else {
            skipped.push(SkippedRef::Ingredient {
                recipe_id,
                ingredient_id: line.ingredient_id,
            });
            continue;
        };
        let quote = price_processed_model(db, &ingredient).await?;
        total += quote.total * line.quantity;
        skipped.extend(quote.skipped);
    }

    Ok(PriceQuote { total, skipped })
}

/// Prices a meal: `Σ(recipe price × quantity multiplier)` over its lines,
/// with missing recipes skipped and reported.
pub async fn meal_price<C>(db: &C, meal_id: i64) -> Result<PriceQuote>
where
    C: ConnectionTrait,
{
    crate::entities::Meal::find_by_id(meal_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("meal", meal_id))?;

    let lines = MealRecipe::find()
        .filter(meal_recipe::Column::MealId.eq(meal_id))
        .order_by_asc(meal_recipe::Column::Id)
        .all(db)
        .await?;

    let mut total = 0.0;
    let mut skipped = Vec::new();

    for line in lines {
        if Recipe::find_by_id(line.recipe_id).one(db).await?.is_none() {
            skipped.push(SkippedRef::Recipe {
                meal_id,
                recipe_id: line.recipe_id,
            });
            continue;
        }
        let quote = price_recipe_lines(db, line.recipe_id).await?;
        total += quote.total * line.quantity_multiplier;
        skipped.extend(quote.skipped);
    }

    Ok(PriceQuote { total, skipped })
}

/// Aggregates a recipe's nutrition: each ingredient's entries scaled by the
/// line quantity, accumulated per nutrient name.
pub async fn recipe_nutrition<C>(db: &C, recipe_id: i64) -> Result<NutritionSummary>
where
    C: ConnectionTrait,
{
    Recipe::find_by_id(recipe_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("recipe", recipe_id))?;

    let mut summary = NutritionSummary {
        nutrients: Vec::new(),
        skipped: Vec::new(),
    };
    aggregate_recipe_nutrition(db, recipe_id, 1.0, &mut summary).await?;
    Ok(summary)
}

async fn aggregate_recipe_nutrition<C>(
    db: &C,
    recipe_id: i64,
    scale: f64,
    summary: &mut NutritionSummary,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let lines = RecipeIngredient::find()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .order_by_asc(recipe_ingredient::Column::Id)
        .all(db)
        .await?;

    for line in lines {
        if ProcessedIngredient::find_by_id(line.ingredient_id)
            .one(db)
            .await?
            .is_none()
        {
            summary.skipped.push(SkippedRef::Ingredient {
                recipe_id,
                ingredient_id: line.ingredient_id,
            });
            continue;
        }
        let entries = NutritionEntry::find()
            .filter(nutrition_entry::Column::ProcessedId.eq(line.ingredient_id))
            .order_by_asc(nutrition_entry::Column::Id)
            .all(db)
            .await?;
        for entry in entries {
            accumulate_nutrient(
                &mut summary.nutrients,
                &entry.name,
                entry.value_per_unit * line.quantity * scale,
                &entry.unit,
            );
        }
    }

    Ok(())
}

/// Aggregates a meal's nutrition from its recipes, scaled by each line's
/// quantity multiplier.
pub async fn meal_nutrition<C>(db: &C, meal_id: i64) -> Result<NutritionSummary>
where
    C: ConnectionTrait,
{
    crate::entities::Meal::find_by_id(meal_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("meal", meal_id))?;

    let lines = MealRecipe::find()
        .filter(meal_recipe::Column::MealId.eq(meal_id))
        .order_by_asc(meal_recipe::Column::Id)
        .all(db)
        .await?;

    let mut summary = NutritionSummary {
        nutrients: Vec::new(),
        skipped: Vec::new(),
    };

    for line in lines {
        if Recipe::find_by_id(line.recipe_id).one(db).await?.is_none() {
            summary.skipped.push(SkippedRef::Recipe {
                meal_id,
                recipe_id: line.recipe_id,
            });
            continue;
        }
        aggregate_recipe_nutrition(db, line.recipe_id, line.quantity_multiplier, &mut summary)
            .await?;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::catalog::{
        self, MealRecipeSpec, Margins, NutritionSpec, RecipeIngredientSpec, SourceRefSpec,
    };
    use crate::core::ledger::{add_purchase, create_source_ingredient};
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_price_with_no_sources_and_zero_margins_is_zero() -> Result<()> {
        let db = setup_test_db().await?;

        let bare = catalog::create_processed_ingredient(
            &db,
            "Water".to_string(),
            "l".to_string(),
            Margins::default(),
            vec![],
            vec![],
        )
        .await?;

        let quote = processed_ingredient_price(&db, bare.id).await?;
        assert_eq!(quote.total, 0.0);
        assert!(quote.skipped.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_rollup_chain_flour_to_meal() -> Result<()> {
        let db = setup_test_db().await?;

        // Flour at 100 for 8 units -> latest unit price 12.5
        let flour = create_source_ingredient(&db, "Flour".to_string(), "kg".to_string()).await?;
        add_purchase(&db, flour.id, 8.0, 100.0).await?;

        // Processed ingredient: 2 x 12.5 = 25
        let dough = catalog::create_processed_ingredient(
            &db,
            "Dough".to_string(),
            "portion".to_string(),
            Margins::default(),
            vec![SourceRefSpec {
                source_id: flour.id,
                source_quantity: 2.0,
            }],
            vec![],
        )
        .await?;
        let quote = processed_ingredient_price(&db, dough.id).await?;
        assert_eq!(quote.total, 25.0);

        // Recipe: 3 x 25 = 75
        let pizza = catalog::create_recipe(
            &db,
            "Pizza".to_string(),
            vec![RecipeIngredientSpec {
                ingredient_id: dough.id,
                quantity: 3.0,
                unit: "portion".to_string(),
                step_size: None,
            }],
        )
        .await?;
        let quote = recipe_price(&db, pizza.id).await?;
        assert_eq!(quote.total, 75.0);

        // Meal: 1 x 75 = 75
        let meal = catalog::create_meal(
            &db,
            "Pizza Night".to_string(),
            true,
            None,
            vec![MealRecipeSpec {
                recipe_id: pizza.id,
                quantity_multiplier: 1.0,
                step_size: None,
            }],
        )
        .await?;
        let quote = meal_price(&db, meal.id).await?;
        assert_eq!(quote.total, 75.0);
        assert!(quote.skipped.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_margins_add_on_top_of_sources() -> Result<()> {
        let db = setup_test_db().await?;

        let flour = create_source_ingredient(&db, "Flour".to_string(), "kg".to_string()).await?;
        add_purchase(&db, flour.id, 10.0, 100.0).await?; // unit price 10

        let dough = catalog::create_processed_ingredient(
            &db,
            "Dough".to_string(),
            "portion".to_string(),
            Margins {
                product: 1.0,
                operations: 2.0,
                branding: 3.0,
                rest: 4.0,
                miscellaneous: 5.0,
            },
            vec![SourceRefSpec {
                source_id: flour.id,
                source_quantity: 2.0,
            }],
            vec![],
        )
        .await?;

        let quote = processed_ingredient_price(&db, dough.id).await?;
        assert_eq!(quote.total, 2.0 * 10.0 + 15.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_pricing_uses_latest_not_lowest_price() -> Result<()> {
        let db = setup_test_db().await?;

        let flour = create_source_ingredient(&db, "Flour".to_string(), "kg".to_string()).await?;
        add_purchase(&db, flour.id, 1.0, 5.0).await?; // 5.0 (lowest)
        add_purchase(&db, flour.id, 1.0, 20.0).await?; // 20.0 (highest)
        add_purchase(&db, flour.id, 1.0, 12.0).await?; // 12.0 (latest)

        let dough = catalog::create_processed_ingredient(
            &db,
            "Dough".to_string(),
            "portion".to_string(),
            Margins::default(),
            vec![SourceRefSpec {
                source_id: flour.id,
                source_quantity: 1.0,
            }],
            vec![],
        )
        .await?;

        let quote = processed_ingredient_price(&db, dough.id).await?;
        assert_eq!(quote.total, 12.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_dangling_ingredient_skipped_and_reported() -> Result<()> {
        let db = setup_test_db().await?;

        let flour = create_source_ingredient(&db, "Flour".to_string(), "kg".to_string()).await?;
        add_purchase(&db, flour.id, 1.0, 10.0).await?;

        let dough = catalog::create_processed_ingredient(
            &db,
            "Dough".to_string(),
            "portion".to_string(),
            Margins::default(),
            vec![SourceRefSpec {
                source_id: flour.id,
                source_quantity: 1.0,
            }],
            vec![],
        )
        .await?;
        let cheese = catalog::create_processed_ingredient(
            &db,
            "Cheese".to_string(),
            "g".to_string(),
            Margins {
                product: 4.0,
                ..Margins::default()
            },
            vec![],
            vec![],
        )
        .await?;

        let pizza = catalog::create_recipe(
            &db,
            "Pizza".to_string(),
            vec![
                RecipeIngredientSpec {
                    ingredient_id: dough.id,
                    quantity: 1.0,
                    unit: "portion".to_string(),
                    step_size: None,
                },
                RecipeIngredientSpec {
                    ingredient_id: cheese.id,
                    quantity: 2.0,
                    unit: "g".to_string(),
                    step_size: None,
                },
            ],
        )
        .await?;

        catalog::delete_processed_ingredient(&db, cheese.id).await?;

        // The broken line is excluded from the sum and named in diagnostics
        let quote = recipe_price(&db, pizza.id).await?;
        assert_eq!(quote.total, 10.0);
        assert_eq!(
            quote.skipped,
            vec![SkippedRef::Ingredient {
                recipe_id: pizza.id,
                ingredient_id: cheese.id,
            }]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_source_skipped_and_reported() -> Result<()> {
        let db = setup_test_db().await?;

        let flour = create_source_ingredient(&db, "Flour".to_string(), "kg".to_string()).await?;
        add_purchase(&db, flour.id, 1.0, 10.0).await?;

        let dough = catalog::create_processed_ingredient(
            &db,
            "Dough".to_string(),
            "portion".to_string(),
            Margins::default(),
            vec![
                SourceRefSpec {
                    source_id: flour.id,
                    source_quantity: 2.0,
                },
                SourceRefSpec {
                    source_id: 9999,
                    source_quantity: 1.0,
                },
            ],
            vec![],
        )
        .await?;

        let quote = processed_ingredient_price(&db, dough.id).await?;
        assert_eq!(quote.total, 20.0);
        assert_eq!(
            quote.skipped,
            vec![SkippedRef::Source {
                processed_id: dough.id,
                source_id: 9999,
            }]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_recipe_price_invariant_under_line_order() -> Result<()> {
        let db = setup_test_db().await?;

        let flour = create_source_ingredient(&db, "Flour".to_string(), "kg".to_string()).await?;
        add_purchase(&db, flour.id, 1.0, 10.0).await?;
        let sugar = create_source_ingredient(&db, "Sugar".to_string(), "kg".to_string()).await?;
        add_purchase(&db, sugar.id, 1.0, 4.0).await?;

        let a = catalog::create_processed_ingredient(
            &db,
            "A".to_string(),
            "g".to_string(),
            Margins::default(),
            vec![SourceRefSpec {
                source_id: flour.id,
                source_quantity: 1.0,
            }],
            vec![],
        )
        .await?;
        let b = catalog::create_processed_ingredient(
            &db,
            "B".to_string(),
            "g".to_string(),
            Margins::default(),
            vec![SourceRefSpec {
                source_id: sugar.id,
                source_quantity: 1.0,
            }],
            vec![],
        )
        .await?;

        let forward = catalog::create_recipe(
            &db,
            "Forward".to_string(),
            vec![
                RecipeIngredientSpec {
                    ingredient_id: a.id,
                    quantity: 2.0,
                    unit: "g".to_string(),
                    step_size: None,
                },
                RecipeIngredientSpec {
                    ingredient_id: b.id,
                    quantity: 3.0,
                    unit: "g".to_string(),
                    step_size: None,
                },
            ],
        )
        .await?;
        let reversed = catalog::create_recipe(
            &db,
            "Reversed".to_string(),
            vec![
                RecipeIngredientSpec {
                    ingredient_id: b.id,
                    quantity: 3.0,
                    unit: "g".to_string(),
                    step_size: None,
                },
                RecipeIngredientSpec {
                    ingredient_id: a.id,
                    quantity: 2.0,
                    unit: "g".to_string(),
                    step_size: None,
                },
            ],
        )
        .await?;

        let price_forward = recipe_price(&db, forward.id).await?.total;
        let price_reversed = recipe_price(&db, reversed.id).await?.total;
        assert_eq!(price_forward, price_reversed);

        Ok(())
    }

    #[tokio::test]
    async fn test_nutrition_accumulates_by_name() -> Result<()> {
        let db = setup_test_db().await?;

        let a = catalog::create_processed_ingredient(
            &db,
            "Chicken".to_string(),
            "g".to_string(),
            Margins::default(),
            vec![],
            vec![
                NutritionSpec {
                    name: "protein".to_string(),
                    value_per_unit: 30.0,
                    unit: "g".to_string(),
                },
                NutritionSpec {
                    name: "calories".to_string(),
                    value_per_unit: 165.0,
                    unit: "kcal".to_string(),
                },
            ],
        )
        .await?;
        let b = catalog::create_processed_ingredient(
            &db,
            "Quinoa".to_string(),
            "g".to_string(),
            Margins::default(),
            vec![],
            vec![NutritionSpec {
                name: "protein".to_string(),
                value_per_unit: 8.0,
                unit: "g".to_string(),
            }],
        )
        .await?;

        let bowl = catalog::create_recipe(
            &db,
            "Bowl".to_string(),
            vec![
                RecipeIngredientSpec {
                    ingredient_id: a.id,
                    quantity: 1.0,
                    unit: "g".to_string(),
                    step_size: None,
                },
                RecipeIngredientSpec {
                    ingredient_id: b.id,
                    quantity: 2.0,
                    unit: "g".to_string(),
                    step_size: None,
                },
            ],
        )
        .await?;

        let summary = recipe_nutrition(&db, bowl.id).await?;
        let protein = summary.nutrients.iter().find(|n| n.name == "protein").unwrap();
        assert_eq!(protein.value, 30.0 + 2.0 * 8.0);
        assert_eq!(protein.unit, "g");
        assert!(!protein.mixed_units);

        let calories = summary.nutrients.iter().find(|n| n.name == "calories").unwrap();
        assert_eq!(calories.value, 165.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_nutrition_flags_mixed_units() -> Result<()> {
        let db = setup_test_db().await?;

        let a = catalog::create_processed_ingredient(
            &db,
            "A".to_string(),
            "g".to_string(),
            Margins::default(),
            vec![],
            vec![NutritionSpec {
                name: "sodium".to_string(),
                value_per_unit: 1.0,
                unit: "g".to_string(),
            }],
        )
        .await?;
        let b = catalog::create_processed_ingredient(
            &db,
            "B".to_string(),
            "g".to_string(),
            Margins::default(),
            vec![],
            vec![NutritionSpec {
                name: "sodium".to_string(),
                value_per_unit: 200.0,
                unit: "mg".to_string(),
            }],
        )
        .await?;

        let recipe = catalog::create_recipe(
            &db,
            "Mix".to_string(),
            vec![
                RecipeIngredientSpec {
                    ingredient_id: a.id,
                    quantity: 1.0,
                    unit: "g".to_string(),
                    step_size: None,
                },
                RecipeIngredientSpec {
                    ingredient_id: b.id,
                    quantity: 1.0,
                    unit: "g".to_string(),
                    step_size: None,
                },
            ],
        )
        .await?;

        let summary = recipe_nutrition(&db, recipe.id).await?;
        let sodium = summary.nutrients.iter().find(|n| n.name == "sodium").unwrap();
        // First-seen unit wins, the disagreement is flagged instead of hidden
        assert_eq!(sodium.unit, "g");
        assert!(sodium.mixed_units);
        assert_eq!(sodium.value, 201.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_meal_nutrition_scales_by_multiplier() -> Result<()> {
        let db = setup_test_db().await?;

        let a = catalog::create_processed_ingredient(
            &db,
            "Rice".to_string(),
            "g".to_string(),
            Margins::default(),
            vec![],
            vec![NutritionSpec {
                name: "carbs".to_string(),
                value_per_unit: 45.0,
                unit: "g".to_string(),
            }],
        )
        .await?;

        let recipe = catalog::create_recipe(
            &db,
            "Rice Bowl".to_string(),
            vec![RecipeIngredientSpec {
                ingredient_id: a.id,
                quantity: 1.0,
                unit: "g".to_string(),
                step_size: None,
            }],
        )
        .await?;

        let meal = catalog::create_meal(
            &db,
            "Double Rice".to_string(),
            true,
            None,
            vec![MealRecipeSpec {
                recipe_id: recipe.id,
                quantity_multiplier: 2.0,
                step_size: None,
            }],
        )
        .await?;

        let summary = meal_nutrition(&db, meal.id).await?;
        assert_eq!(summary.nutrients.len(), 1);
        assert_eq!(summary.nutrients[0].value, 90.0);

        Ok(())
    }
}
