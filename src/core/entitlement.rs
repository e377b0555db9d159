//! Entitlement evaluation - decides whether an upgrade or tier-restricted action may proceed.
//!
//! Both evaluators are pure functions of their inputs. Blocking is an expected
//! outcome, so they return [`Decision`] values instead of errors; callers that
//! need to stop a workflow convert a decision with [`Decision::into_result`].

use crate::core::badge::{Badge, RankComparison};
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an evaluation was blocked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockReason {
    /// Principal already holds a tier above the requested one
    HigherTierOwned,
    /// Principal already holds exactly the requested tier
    TierAlreadyOwned,
    /// Action needs at least `required`
    UpgradeRequired {
        /// Minimum tier for the action
        required: Badge,
    },
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HigherTierOwned => f.write_str("already has a higher tier"),
            Self::TierAlreadyOwned => f.write_str("already owns this tier"),
            Self::UpgradeRequired { .. } => f.write_str("upgrade required"),
        }
    }
}

/// Outcome of checking a principal against a tier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// Proceed
    Allowed,
    /// Do not proceed
    Blocked(BlockReason),
    /// Proceed only after the user accepts `prompt`
    NeedsConfirmation(String),
}

impl Decision {
    /// Whether the decision lets the caller proceed without further input.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Turns a decision into a workflow result.
    ///
    /// `confirmed` records whether the user already accepted the prompt of a
    /// `NeedsConfirmation` decision.
    pub fn into_result(self, confirmed: bool) -> Result<()> {
        match self {
            Self::Allowed => Ok(()),
            Self::NeedsConfirmation(_) if confirmed => Ok(()),
            Self::NeedsConfirmation(prompt) => Err(Error::ConfirmationRequired { prompt }),
            Self::Blocked(reason) => Err(Error::PolicyBlocked { reason }),
        }
    }
}

/// Decides whether a principal holding `current` may buy `target`.
///
/// Downgrades and repeat purchases are blocked before any payment step. A
/// principal still on the lowest tier goes straight to payment; anyone on a
/// paid tier has to confirm the upgrade first.
#[must_use]
pub fn evaluate_upgrade(current: Badge, target: Badge) -> Decision {
    match current.compare(target) {
        RankComparison::Higher => Decision::Blocked(BlockReason::HigherTierOwned),
        RankComparison::Equal => Decision::Blocked(BlockReason::TierAlreadyOwned),
        RankComparison::Lower if current == Badge::LOWEST => Decision::Allowed,
        RankComparison::Lower => {
            Decision::NeedsConfirmation(format!("upgrade from {current} to {target}?"))
        }
    }
}

/// Minimum-tier check for a gated action.
#[must_use]
pub const fn evaluate_action(principal_badge: Badge, required: Badge) -> Decision {
    if principal_badge.satisfies(required) {
        Decision::Allowed
    } else {
        Decision::Blocked(BlockReason::UpgradeRequired { required })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_same_tier_is_always_blocked() {
        for badge in Badge::ALL {
            assert_eq!(
                evaluate_upgrade(badge, badge),
                Decision::Blocked(BlockReason::TierAlreadyOwned)
            );
        }
    }

    #[test]
    fn test_first_purchase_is_allowed_without_prompt() {
        assert_eq!(evaluate_upgrade(Badge::Bronze, Badge::Silver), Decision::Allowed);
        assert_eq!(evaluate_upgrade(Badge::Bronze, Badge::Platinum), Decision::Allowed);
    }

    #[test]
    fn test_paid_tier_upgrade_needs_confirmation() {
        assert_eq!(
            evaluate_upgrade(Badge::Silver, Badge::Gold),
            Decision::NeedsConfirmation("upgrade from Silver to Gold?".to_string())
        );
        assert!(matches!(
            evaluate_upgrade(Badge::Gold, Badge::Platinum),
            Decision::NeedsConfirmation(_)
        ));
    }

    #[test]
    fn test_downgrade_is_blocked() {
        assert_eq!(
            evaluate_upgrade(Badge::Gold, Badge::Silver),
            Decision::Blocked(BlockReason::HigherTierOwned)
        );
        assert_eq!(
            evaluate_upgrade(Badge::Platinum, Badge::Bronze),
            Decision::Blocked(BlockReason::HigherTierOwned)
        );
    }

    #[test]
    fn test_block_reason_messages() {
        assert_eq!(
            BlockReason::HigherTierOwned.to_string(),
            "already has a higher tier"
        );
        assert_eq!(
            BlockReason::TierAlreadyOwned.to_string(),
            "already owns this tier"
        );
        assert_eq!(
            BlockReason::UpgradeRequired {
                required: Badge::Silver
            }
            .to_string(),
            "upgrade required"
        );
    }

    #[test]
    fn test_evaluate_action_minimum_tier() {
        assert_eq!(
            evaluate_action(Badge::Bronze, Badge::Silver),
            Decision::Blocked(BlockReason::UpgradeRequired {
                required: Badge::Silver
            })
        );
        assert!(evaluate_action(Badge::Silver, Badge::Silver).is_allowed());
        assert!(evaluate_action(Badge::Platinum, Badge::Silver).is_allowed());
        assert!(evaluate_action(Badge::Bronze, Badge::Bronze).is_allowed());
    }

    #[test]
    fn test_into_result() {
        assert!(Decision::Allowed.into_result(false).is_ok());
        assert!(
            Decision::NeedsConfirmation("x".to_string())
                .into_result(true)
                .is_ok()
        );
        assert!(matches!(
            Decision::NeedsConfirmation("x".to_string())
                .into_result(false)
                .unwrap_err(),
            Error::ConfirmationRequired { .. }
        ));
        assert!(matches!(
            Decision::Blocked(BlockReason::TierAlreadyOwned)
                .into_result(true)
                .unwrap_err(),
            Error::PolicyBlocked {
                reason: BlockReason::TierAlreadyOwned
            }
        ));
    }
}
