//! Payment entity - Append-only history of confirmed membership upgrades.
//!
//! One row per confirmed payment. `transaction_id` is the payment reference
//! reported by the gateway and is unique, which is what makes confirmation
//! idempotent.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment history database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the history row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Email of the principal who paid
    pub email: String,
    /// Purchased tier name (e.g., "Gold")
    pub package_name: String,
    /// Amount charged, in the package table's units
    pub price: i64,
    /// Gateway payment reference
    #[sea_orm(unique)]
    pub transaction_id: String,
    /// When the confirmation was recorded
    pub paid_at: DateTimeUtc,
}

/// `Payment` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
