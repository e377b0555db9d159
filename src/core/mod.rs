//! Core business logic - the framework-agnostic access and entitlement engine.
//!
//! Badge ranking, entitlement evaluation and the feature gate are pure and take the
//! principal as an argument. The upgrade gateway, principal store and like toggle
//! talk to the backend through `SeaORM`.

/// Badge rank model and role
pub mod badge;
/// Upgrade and minimum-tier evaluation
pub mod entitlement;
/// Advisory gate for tier-restricted actions
pub mod gate;
/// Liked-by set toggling and optimistic counter reconciliation
pub mod likes;
/// Principal registration, lookup and role changes
pub mod principal;
/// Post-authentication redirect resolution
pub mod redirect;
/// Payment-driven badge upgrades
pub mod upgrade;

pub use badge::{Badge, RankComparison, Role};
pub use entitlement::{BlockReason, Decision, evaluate_action, evaluate_upgrade};
pub use gate::{GateDecision, GatePolicy, GatedAction, can_perform};
pub use likes::{LikeToggle, OptimisticLike, toggle_like};
pub use principal::{NewPrincipal, Principal};
pub use redirect::{AuthEvent, RedirectResolver, RedirectTarget};
pub use upgrade::{
    BadgeUpdated, PaymentConfirmation, PaymentGateway, PaymentOutcome, PaymentSession,
    UpgradeGateway, UpgradeRequest,
};
