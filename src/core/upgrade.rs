//! Upgrade mutation gateway - turns a confirmed payment into a badge change.
//!
//! An upgrade runs in two steps. [`UpgradeGateway::initiate`] re-reads the
//! principal, runs the entitlement evaluator and only then asks the payment
//! collaborator for a session. [`UpgradeGateway::confirm`] runs after the payment
//! collaborator reports an outcome and writes the payment-history row and the new
//! badge in one database transaction.
//!
//! Confirmation is keyed on the gateway's payment reference. Replaying a
//! confirmation returns the result recorded the first time and writes nothing.
//! Nothing is stored between the two steps, so an abandoned checkout leaves no
//! trace.

use crate::{
    config::PackageTable,
    core::{
        badge::Badge,
        entitlement::evaluate_upgrade,
        principal::{normalize_email, require_principal},
    },
    entities::{Payment, Principal as PrincipalEntity, payment, principal},
    errors::{Error, Result},
};
use sea_orm::{Set, SqlErr, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{debug, error, info, instrument, warn};

/// A selected package, alive only between selection and confirmation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeRequest {
    /// Tier being bought
    pub target_badge: Badge,
    /// Price charged for the tier
    pub price: i64,
    /// Buyer
    pub principal_email: String,
}

/// Payment session handed out by the payment collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSession {
    /// Opaque token the checkout UI completes the payment with
    pub session_token: String,
    /// The purchase this session pays for
    pub request: UpgradeRequest,
}

/// Outcome reported by the payment collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentOutcome {
    /// Funds captured
    Succeeded,
    /// Card or account declined
    Declined {
        /// Gateway's explanation
        reason: String,
    },
    /// Network or gateway-side error
    Failed {
        /// Gateway's explanation
        reason: String,
    },
}

/// Confirmation callback from the payment collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    /// Session the payment was made against
    pub session_token: String,
    /// Gateway payment reference; the idempotency key
    pub payment_reference: String,
    /// What happened
    pub outcome: PaymentOutcome,
}

/// Result of a successful confirmation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeUpdated {
    /// Principal's badge after the confirmation
    pub badge: Badge,
    /// Payment-history row for this payment reference
    pub payment_history_id: i64,
    /// True when the reference had already been confirmed and nothing was written
    pub duplicate: bool,
}

/// External payment collaborator that opens checkout sessions.
pub trait PaymentGateway {
    /// Opens a session for `request` and returns its token.
    ///
    /// # Errors
    /// Implementations report declines and transport problems as `Error::Gateway`.
    fn create_session(
        &self,
        request: &UpgradeRequest,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Drives badge upgrades through a [`PaymentGateway`].
#[derive(Debug)]
pub struct UpgradeGateway<G> {
    gateway: G,
    packages: PackageTable,
}

impl<G: PaymentGateway> UpgradeGateway<G> {
    /// Creates a gateway selling the tiers in `packages`.
    #[must_use]
    pub const fn new(gateway: G, packages: PackageTable) -> Self {
        Self { gateway, packages }
    }

    /// Price table in use.
    #[must_use]
    pub const fn packages(&self) -> &PackageTable {
        &self.packages
    }

    /// Starts an upgrade of `email` to `target`.
    ///
    /// The principal is re-read from the backend so a badge bought earlier in the
    /// same session is taken into account. `confirmed` is whether the user accepted
    /// the upgrade prompt; it only matters for principals already on a paid tier.
    ///
    /// # Errors
    /// - `PolicyBlocked` for downgrades and repeat purchases
    /// - `ConfirmationRequired` when a prompt is needed and `confirmed` is false
    /// - `Config` if the tier has no price
    /// - `Gateway` if the payment collaborator cannot open a session
    #[instrument(skip(self, db))]
    pub async fn initiate(
        &self,
        db: &DatabaseConnection,
        email: &str,
        target: Badge,
        confirmed: bool,
    ) -> Result<PaymentSession> {
        let principal = require_principal(db, email).await?;

        evaluate_upgrade(principal.badge, target)
            .into_result(confirmed)
            .inspect_err(|e| warn!("Upgrade of {} to {} not started: {}", email, target, e))?;

        let price = self.packages.price_of(target).ok_or_else(|| Error::Config {
            message: format!("No package is offered for {target}"),
        })?;

        let request = UpgradeRequest {
            target_badge: target,
            price,
            principal_email: principal.email,
        };
        let session_token = self
            .gateway
            .create_session(&request)
            .await
            .inspect_err(|e| warn!("Payment session for {} failed: {}", email, e))?;

        info!(
            "Opened payment session for {} ({} at {})",
            request.principal_email, target, price
        );
        Ok(PaymentSession {
            session_token,
            request,
        })
    }

    /// Applies a payment confirmation.
    ///
    /// On success the payment-history row and the badge are written together.
    /// A badge already at or above the purchased tier is never lowered. Calling this
    /// again with the same payment reference returns the recorded result with
    /// `duplicate` set.
    ///
    /// # Errors
    /// - `Gateway` if the payment did not succeed or the confirmation belongs to
    ///   another session; the badge is unchanged
    /// - `InconsistentState` if an earlier confirmation left a history row without
    ///   the matching badge, or the reference belongs to another principal
    #[instrument(skip(self, db, session), fields(email = %session.request.principal_email))]
    pub async fn confirm(
        &self,
        db: &DatabaseConnection,
        session: &PaymentSession,
        confirmation: PaymentConfirmation,
    ) -> Result<BadgeUpdated> {
        if confirmation.session_token != session.session_token {
            warn!("Confirmation does not belong to this payment session");
            return Err(Error::Gateway {
                reason: "confirmation does not match the payment session".to_string(),
            });
        }

        match confirmation.outcome {
            PaymentOutcome::Succeeded => {}
            PaymentOutcome::Declined { reason } | PaymentOutcome::Failed { reason } => {
                warn!("Payment not completed: {}", reason);
                return Err(Error::Gateway { reason });
            }
        }

        let reference = confirmation.payment_reference.trim();
        if reference.is_empty() {
            return Err(Error::Gateway {
                reason: "payment reference is missing".to_string(),
            });
        }

        let applied = apply_payment(db, &session.request, reference).await;
        settle_concurrent_duplicate(db, &session.request, reference, applied).await
    }
}

/// Turns a unique-index rejection of `reference` into the result recorded by the
/// confirmation that inserted it first. Any other outcome passes through.
async fn settle_concurrent_duplicate(
    db: &DatabaseConnection,
    request: &UpgradeRequest,
    reference: &str,
    applied: Result<BadgeUpdated>,
) -> Result<BadgeUpdated> {
    match applied {
        Err(Error::Database(err))
            if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
        {
            debug!("Payment {} was applied concurrently", reference);
            find_applied(db, request, reference)
                .await?
                .ok_or(Error::Database(err))
        }
        other => other,
    }
}

async fn apply_payment(
    db: &DatabaseConnection,
    request: &UpgradeRequest,
    reference: &str,
) -> Result<BadgeUpdated> {
    let txn = db.begin().await?;

    if let Some(applied) = find_applied(&txn, request, reference).await? {
        debug!("Payment {} already applied", reference);
        return Ok(applied);
    }

    let updated = record_payment(&txn, request, reference).await?;
    txn.commit().await?;

    info!(
        "Applied payment {} for {}: badge now {}",
        reference, request.principal_email, updated.badge
    );
    Ok(updated)
}

/// Inserts the history row for `reference` and raises the buyer's badge.
/// Fails on the unique index if `reference` is already recorded.
async fn record_payment<C>(db: &C, request: &UpgradeRequest, reference: &str) -> Result<BadgeUpdated>
where
    C: ConnectionTrait,
{
    let email = normalize_email(&request.principal_email);
    let buyer = PrincipalEntity::find()
        .filter(principal::Column::Email.eq(email.as_str()))
        .one(db)
        .await?
        .ok_or_else(|| Error::PrincipalNotFound {
            identifier: email.clone(),
        })?;

    let history = payment::ActiveModel {
        email: Set(email.clone()),
        package_name: Set(request.target_badge.as_str().to_string()),
        price: Set(request.price),
        transaction_id: Set(reference.to_string()),
        paid_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let current = Badge::from_stored(buyer.badge.as_deref());
    let badge = if current < request.target_badge {
        let mut active: principal::ActiveModel = buyer.into();
        active.badge = Set(Some(request.target_badge.as_str().to_string()));
        active.update(db).await?;
        request.target_badge
    } else {
        warn!(
            "{} already holds {}, keeping it for {} payment",
            email, current, request.target_badge
        );
        current
    };

    Ok(BadgeUpdated {
        badge,
        payment_history_id: history.id,
        duplicate: false,
    })
}

/// Looks up an earlier confirmation of `reference` and checks it left a
/// consistent record behind.
async fn find_applied<C>(
    db: &C,
    request: &UpgradeRequest,
    reference: &str,
) -> Result<Option<BadgeUpdated>>
where
    C: ConnectionTrait,
{
    let Some(row) = Payment::find()
        .filter(payment::Column::TransactionId.eq(reference))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let email = normalize_email(&request.principal_email);
    if row.email != email {
        error!(
            "Payment {} is recorded for {}, not {}",
            reference, row.email, email
        );
        return Err(Error::InconsistentState {
            message: format!("payment reference {reference} belongs to another principal"),
        });
    }

    let principal = require_principal(db, &email).await?;
    let paid_for = Badge::from_stored(Some(&row.package_name));
    if principal.badge < paid_for {
        error!(
            "Payment {} recorded {} but {} holds {}",
            reference, paid_for, email, principal.badge
        );
        return Err(Error::InconsistentState {
            message: format!("payment {reference} recorded without its badge"),
        });
    }

    Ok(Some(BadgeUpdated {
        badge: principal.badge,
        payment_history_id: row.id,
        duplicate: true,
    }))
}
