//! Principal business logic - registration, lookup, role changes and payment history.
//!
//! The engine never reads the current user from ambient state. Callers fetch a
//! [`Principal`] through this module and pass it explicitly to the gate and the
//! upgrade gateway. Role and badge are separate axes: nothing here writes the
//! badge after registration, and the upgrade path never writes the role.

use crate::{
    core::badge::{Badge, Role},
    entities::{Payment, Principal as PrincipalEntity, payment, principal},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// An authenticated identity with its role and membership badge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Backend record id
    pub id: i64,
    /// Stable identifier
    pub email: String,
    /// Display name, if known
    pub name: Option<String>,
    /// Administrative role
    pub role: Role,
    /// Membership tier
    pub badge: Badge,
}

impl From<principal::Model> for Principal {
    fn from(model: principal::Model) -> Self {
        Self {
            id: model.id,
            badge: Badge::from_stored(model.badge.as_deref()),
            role: Role::from_stored(&model.role),
            email: model.email,
            name: model.name,
        }
    }
}

/// Identity details supplied by a sign-up or federated sign-in.
#[derive(Clone, Debug, Default)]
pub struct NewPrincipal {
    /// Email address
    pub email: String,
    /// Display name
    pub name: Option<String>,
    /// Profile photo URL
    pub photo: Option<String>,
}

/// Canonical form of an email used as a lookup key.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Records a successful registration or sign-in.
///
/// The first call for an email creates the principal as a `user` on the lowest
/// badge. Later calls, such as a repeated federated sign-in, only refresh
/// `last_log_in` and never reset role or badge.
#[instrument(skip(db, new), fields(email = %new.email))]
pub async fn register_principal(
    db: &DatabaseConnection,
    new: NewPrincipal,
) -> Result<principal::Model> {
    let email = normalize_email(&new.email);
    if email.is_empty() {
        return Err(Error::InvalidInput {
            message: "Principal email cannot be empty".to_string(),
        });
    }

    let now = chrono::Utc::now();
    if let Some(existing) = find_model(db, &email).await? {
        let mut active: principal::ActiveModel = existing.into();
        active.last_log_in = Set(now);
        return active.update(db).await.map_err(Into::into);
    }

    let model = principal::ActiveModel {
        email: Set(email.clone()),
        name: Set(new.name),
        photo: Set(new.photo),
        role: Set(Role::User.as_str().to_string()),
        badge: Set(Some(Badge::LOWEST.as_str().to_string())),
        created_at: Set(now),
        last_log_in: Set(now),
        ..Default::default()
    };
    let created = model.insert(db).await?;
    info!("Registered principal {}", email);
    Ok(created)
}

async fn find_model<C>(db: &C, email: &str) -> Result<Option<principal::Model>>
where
    C: ConnectionTrait,
{
    PrincipalEntity::find()
        .filter(principal::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Fetches the principal for `email`, or `None` if it never registered.
pub async fn get_principal<C>(db: &C, email: &str) -> Result<Option<Principal>>
where
    C: ConnectionTrait,
{
    Ok(find_model(db, email).await?.map(Principal::from))
}

/// Fetches the principal for `email`, failing with `PrincipalNotFound` if absent.
pub async fn require_principal<C>(db: &C, email: &str) -> Result<Principal>
where
    C: ConnectionTrait,
{
    get_principal(db, email)
        .await?
        .ok_or_else(|| Error::PrincipalNotFound {
            identifier: email.to_string(),
        })
}

/// Whether `email` belongs to an administrator. Unknown emails are not admins.
pub async fn is_admin(db: &DatabaseConnection, email: &str) -> Result<bool> {
    Ok(get_principal(db, email)
        .await?
        .is_some_and(|p| p.role == Role::Admin))
}

/// Grants or revokes the admin role on another principal.
///
/// The requester must be an existing administrator and may not change their own
/// role. The target's badge is left untouched.
#[instrument(skip(db))]
pub async fn change_role(
    db: &DatabaseConnection,
    principal_id: i64,
    make_admin: bool,
    requester_email: &str,
) -> Result<principal::Model> {
    if !is_admin(db, requester_email).await? {
        warn!("Role change rejected: {} is not an admin", requester_email);
        return Err(Error::Forbidden {
            message: "Only admins can change roles".to_string(),
        });
    }

    let target = PrincipalEntity::find_by_id(principal_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::PrincipalNotFound {
            identifier: principal_id.to_string(),
        })?;

    if normalize_email(&target.email) == normalize_email(requester_email) {
        warn!("Role change rejected: {} targeted themselves", requester_email);
        return Err(Error::Forbidden {
            message: "Admins cannot change their own role".to_string(),
        });
    }

    let role = if make_admin { Role::Admin } else { Role::User };
    let mut active: principal::ActiveModel = target.into();
    active.role = Set(role.as_str().to_string());
    let updated = active.update(db).await?;

    info!(
        "{} set role of principal {} to {}",
        requester_email, principal_id, role
    );
    Ok(updated)
}

/// Payment history rows for `email`, newest first.
pub async fn payment_history(db: &DatabaseConnection, email: &str) -> Result<Vec<payment::Model>> {
    Payment::find()
        .filter(payment::Column::Email.eq(normalize_email(email)))
        .order_by_desc(payment::Column::PaidAt)
        .order_by_desc(payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
