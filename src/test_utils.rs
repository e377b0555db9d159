//! Shared test utilities for the entitlement engine.
//!
//! This module provides common helper functions for setting up test databases,
//! creating test principals and meals with sensible defaults, and a fake payment
//! collaborator.

use crate::{
    core::{
        principal::{NewPrincipal, register_principal},
        upgrade::{PaymentGateway, UpgradeRequest},
    },
    entities::{self, Principal},
    errors::{Error, Result},
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::EnvFilter;

/// Routes tracing output through the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Registers a principal with the defaults every new account gets.
///
/// # Defaults
/// * `role`: "user"
/// * `badge`: "Bronze"
pub async fn create_test_principal(
    db: &DatabaseConnection,
    email: &str,
) -> Result<entities::principal::Model> {
    register_principal(
        db,
        NewPrincipal {
            email: email.to_string(),
            name: Some("Test Member".to_string()),
            photo: None,
        },
    )
    .await
}

/// Registers a principal and writes the admin role directly.
pub async fn create_test_admin(
    db: &DatabaseConnection,
    email: &str,
) -> Result<entities::principal::Model> {
    let created = create_test_principal(db, email).await?;
    let mut active: entities::principal::ActiveModel = created.into();
    active.role = Set("admin".to_string());
    active.update(db).await.map_err(Into::into)
}

/// Overwrites a principal's stored badge, bypassing the upgrade gateway.
/// `None` simulates a record created before badges existed.
pub async fn set_test_badge(
    db: &DatabaseConnection,
    principal_id: i64,
    badge: Option<&str>,
) -> Result<entities::principal::Model> {
    let existing = Principal::find_by_id(principal_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::PrincipalNotFound {
            identifier: principal_id.to_string(),
        })?;
    let mut active: entities::principal::ActiveModel = existing.into();
    active.badge = Set(badge.map(ToString::to_string));
    active.update(db).await.map_err(Into::into)
}

/// Inserts a meal with no likes.
pub async fn create_test_meal(
    db: &DatabaseConnection,
    title: &str,
    is_upcoming: bool,
) -> Result<entities::meal::Model> {
    entities::meal::ActiveModel {
        title: Set(title.to_string()),
        is_upcoming: Set(is_upcoming),
        likes: Set(0),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Payment collaborator that hands out numbered session tokens.
#[derive(Debug, Default)]
pub struct FakePaymentGateway {
    opened: AtomicUsize,
    failure: Option<String>,
}

impl FakePaymentGateway {
    /// A gateway whose every session request fails with `reason`.
    pub fn failing(reason: &str) -> Self {
        Self {
            opened: AtomicUsize::new(0),
            failure: Some(reason.to_string()),
        }
    }

    /// Number of sessions successfully opened so far.
    pub fn sessions_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl PaymentGateway for FakePaymentGateway {
    async fn create_session(&self, request: &UpgradeRequest) -> Result<String> {
        if let Some(reason) = &self.failure {
            return Err(Error::Gateway {
                reason: reason.clone(),
            });
        }
        let n = self.opened.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("sess_{}_{}", request.target_badge, n))
    }
}
