//! Principal entity - An account holder with a role and a membership badge.
//!
//! `role` and `badge` are stored as plain strings and parsed leniently by
//! [`crate::core::badge`]; a missing badge means the principal never upgraded.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Principal database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "principals")]
pub struct Model {
    /// Unique identifier for the principal
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Email address, the stable external identifier
    #[sea_orm(unique)]
    pub email: String,
    /// Display name from the identity provider
    pub name: Option<String>,
    /// Profile photo URL
    pub photo: Option<String>,
    /// `"user"` or `"admin"`
    pub role: String,
    /// Membership tier name, absent for records created before badges existed
    pub badge: Option<String>,
    /// When the principal first registered
    pub created_at: DateTimeUtc,
    /// Most recent sign-in
    pub last_log_in: DateTimeUtc,
}

/// Principals are referenced by email from payments and likes, without foreign keys
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
