//! Meal entity - A served or upcoming meal that members can like.
//!
//! `likes` is a cached copy of the number of `meal_likes` rows for the meal.
//! It is only ever written with a freshly counted value.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Meal database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meals")]
pub struct Model {
    /// Unique identifier for the meal
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Meal title
    pub title: String,
    /// Whether the meal is announced but not yet served
    pub is_upcoming: bool,
    /// Cardinality of the liked-by set
    pub likes: i64,
}

/// Defines relationships between Meal and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One meal has many likes
    #[sea_orm(has_many = "super::meal_like::Entity")]
    Likes,
}

impl Related<super::meal_like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Likes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
