//! Meal like entity - One member of a meal's liked-by set.
//!
//! The pair (`meal_id`, `email`) is unique, enforced by an index created
//! alongside the tables.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Liked-by set row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meal_likes")]
pub struct Model {
    /// Unique identifier for the row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Liked meal
    pub meal_id: i64,
    /// Email of the principal who liked it
    pub email: String,
    /// When the like was added
    pub liked_at: DateTimeUtc,
}

/// Defines relationships between `MealLike` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each like belongs to one meal
    #[sea_orm(
        belongs_to = "super::meal::Entity",
        from = "Column::MealId",
        to = "super::meal::Column::Id"
    )]
    Meal,
}

impl Related<super::meal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
