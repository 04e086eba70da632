//! Core business logic for `Mealflow`.
//!
//! Every module here is framework-agnostic: functions take a database
//! connection plus already-authorized inputs and return structured data or a
//! crate [`Error`](crate::errors::Error). Derived values (prices, nutrition,
//! star ratings, delivery-time snapshots) are recomputed from source data on
//! every call; nothing here caches.

/// Delivery address book operations
pub mod address;
/// Per-user shopping cart operations
pub mod cart;
/// Catalog CRUD for processed ingredients, recipes, and meals
pub mod catalog;
/// Fixed-offset local clock used by the order/delivery subsystem
pub mod clock;
/// Coupon administration and quoting
pub mod coupon;
/// Delivery agents, wallets, and delivery credits
pub mod delivery;
/// Source ingredient purchase ledger
pub mod ledger;
/// Guide meal-plan lifecycle
pub mod meal_plan;
/// Order creation, status machine, and delivery-time snapshots
pub mod order;
/// Layered price and nutrition roll-up
pub mod pricing;
/// Star rating and commission engine
pub mod rating;
/// Business configuration documents in the key-value store
pub mod settings;
/// Posts, votes, comments, notifications, and the social graph
pub mod social;
/// Guide commission withdrawal lifecycle
pub mod withdrawal;
