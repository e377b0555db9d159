//! Feature gate for tier-restricted member actions.
//!
//! The gate is advisory: it reads nothing but its arguments, performs no mutation
//! and no I/O. The backend has to enforce the same minimum tiers on its side.

use crate::core::{
    badge::Badge,
    entitlement::{BlockReason, Decision, evaluate_action},
    principal::Principal,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Member actions that pass through the gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GatedAction {
    /// Like or unlike an upcoming meal
    LikeUpcomingMeal,
    /// Request a meal
    RequestMeal,
    /// Post a review on an upcoming meal
    ReviewUpcomingMeal,
    /// Like or unlike a served meal
    LikeMeal,
}

impl GatedAction {
    /// Every gated action.
    pub const ALL: [Self; 4] = [
        Self::LikeUpcomingMeal,
        Self::RequestMeal,
        Self::ReviewUpcomingMeal,
        Self::LikeMeal,
    ];

    /// Stable action name (e.g., `"request-meal"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LikeUpcomingMeal => "like-upcoming-meal",
            Self::RequestMeal => "request-meal",
            Self::ReviewUpcomingMeal => "review-upcoming-meal",
            Self::LikeMeal => "like-meal",
        }
    }
}

impl fmt::Display for GatedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller should do with a gated action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateDecision {
    /// Invoke the underlying mutation
    Allowed,
    /// Do not invoke the mutation; offer the upgrade path
    Blocked(BlockReason),
    /// No principal; prompt sign-in rather than an upgrade
    Unauthenticated,
}

impl GateDecision {
    /// Whether the caller may invoke the underlying mutation.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Tier the caller should offer when the action is blocked.
    #[must_use]
    pub const fn upgrade_target(&self) -> Option<Badge> {
        match self {
            Self::Blocked(BlockReason::UpgradeRequired { required }) => Some(*required),
            _ => None,
        }
    }
}

/// Minimum badge per gated action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatePolicy {
    required: BTreeMap<GatedAction, Badge>,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            required: BTreeMap::from([
                (GatedAction::LikeUpcomingMeal, Badge::Silver),
                (GatedAction::RequestMeal, Badge::Silver),
                (GatedAction::ReviewUpcomingMeal, Badge::Bronze),
                (GatedAction::LikeMeal, Badge::Bronze),
            ]),
        }
    }
}

impl GatePolicy {
    /// Returns the policy with `action` requiring `badge`.
    #[must_use]
    pub fn with_requirement(mut self, action: GatedAction, badge: Badge) -> Self {
        self.required.insert(action, badge);
        self
    }

    /// Minimum badge for `action`. Actions without an entry only need a sign-in.
    #[must_use]
    pub fn required_badge(&self, action: GatedAction) -> Badge {
        self.required
            .get(&action)
            .copied()
            .unwrap_or(Badge::LOWEST)
    }

    /// Decides whether `principal` may perform `action`.
    #[must_use]
    pub fn can_perform(&self, action: GatedAction, principal: Option<&Principal>) -> GateDecision {
        let Some(principal) = principal else {
            return GateDecision::Unauthenticated;
        };
        match evaluate_action(principal.badge, self.required_badge(action)) {
            Decision::Blocked(reason) => GateDecision::Blocked(reason),
            Decision::Allowed | Decision::NeedsConfirmation(_) => GateDecision::Allowed,
        }
    }
}

/// [`GatePolicy::can_perform`] under the default policy.
#[must_use]
pub fn can_perform(action: GatedAction, principal: Option<&Principal>) -> GateDecision {
    GatePolicy::default().can_perform(action, principal)
}
