//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod address;
pub mod cart_item;
pub mod comment;
pub mod config_record;
pub mod coupon;
pub mod delivery_agent;
pub mod delivery_credit;
pub mod fan_link;
pub mod guide_link;
pub mod meal;
pub mod meal_plan;
pub mod meal_recipe;
pub mod notification;
pub mod nutrition_entry;
pub mod order;
pub mod order_item;
pub mod order_status_event;
pub mod post;
pub mod post_vote;
pub mod processed_ingredient;
pub mod purchase;
pub mod recipe;
pub mod recipe_ingredient;
pub mod source_ingredient;
pub mod source_reference;
pub mod user;
pub mod withdrawal_request;

// Re-export the Entity types under readable names so core code can write
// `SourceIngredient::find()` while still reaching columns via the module path.
pub use address::Entity as Address;
pub use cart_item::Entity as CartItem;
pub use comment::Entity as Comment;
pub use config_record::Entity as ConfigRecord;
pub use coupon::Entity as Coupon;
pub use delivery_agent::Entity as DeliveryAgent;
pub use delivery_credit::Entity as DeliveryCredit;
pub use fan_link::Entity as FanLink;
pub use guide_link::Entity as GuideLink;
pub use meal::Entity as Meal;
pub use meal_plan::Entity as MealPlan;
pub use meal_recipe::Entity as MealRecipe;
pub use notification::Entity as Notification;
pub use nutrition_entry::Entity as NutritionEntry;
pub use order::Entity as Order;
pub use order_item::Entity as OrderItem;
pub use order_status_event::Entity as OrderStatusEvent;
pub use post::Entity as Post;
pub use post_vote::Entity as PostVote;
pub use processed_ingredient::Entity as ProcessedIngredient;
pub use purchase::Entity as Purchase;
pub use recipe::Entity as Recipe;
pub use recipe_ingredient::Entity as RecipeIngredient;
pub use source_ingredient::Entity as SourceIngredient;
pub use source_reference::Entity as SourceReference;
pub use user::Entity as User;
pub use withdrawal_request::Entity as WithdrawalRequest;
