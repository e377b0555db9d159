//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities mirror the backend records the entitlement engine reads and mutates.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod meal;
pub mod meal_like;
pub mod payment;
pub mod principal;

// Re-export specific types to avoid conflicts
pub use meal::{Column as MealColumn, Entity as Meal, Model as MealModel};
pub use meal_like::{Column as MealLikeColumn, Entity as MealLike, Model as MealLikeModel};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel};
pub use principal::{Column as PrincipalColumn, Entity as Principal, Model as PrincipalModel};
