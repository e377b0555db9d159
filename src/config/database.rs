//! Database configuration module for the entitlement engine.
//!
//! This module handles the backend database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. The one constraint the entities cannot
//! express, uniqueness of a (meal, principal) like, is added as an explicit index.

use crate::entities::{Meal, MealLike, Payment, Principal, meal_like};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info, instrument};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/hostel.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// A `.env` file is loaded first if present; a missing file is not an error since
/// the variable may be set externally.
#[instrument]
pub async fn create_connection() -> Result<DatabaseConnection> {
    dotenvy::dotenv().ok();
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);

    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all necessary tables and indexes.
///
/// Covers principals, payment history, meals and the liked-by set.
#[instrument(skip(db))]
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let principal_table = schema.create_table_from_entity(Principal);
    let payment_table = schema.create_table_from_entity(Payment);
    let meal_table = schema.create_table_from_entity(Meal);
    let meal_like_table = schema.create_table_from_entity(MealLike);

    db.execute(builder.build(&principal_table)).await?;
    db.execute(builder.build(&payment_table)).await?;
    db.execute(builder.build(&meal_table)).await?;
    db.execute(builder.build(&meal_like_table)).await?;

    let unique_like = Index::create()
        .name("idx_unique_meal_like")
        .table(MealLike)
        .col(meal_like::Column::MealId)
        .col(meal_like::Column::Email)
        .unique()
        .to_owned();
    db.execute(builder.build(&unique_like)).await?;

    info!("Database tables created");
    Ok(())
}
