//! Post-authentication redirect resolution.
//!
//! A user bounced to the sign-in page carries the path they were trying to reach.
//! After sign-in, registration or federated sign-in that stashed path is only
//! honoured if the route table still permits it for the principal's role.
//! Otherwise, or when nothing was stashed, the role's landing page is used.

use crate::{config::RouteTable, core::badge::Role};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Authentication event that triggered the redirect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEvent {
    /// Email and password sign-in
    SignIn,
    /// New account registration
    Registration,
    /// Sign-in through an external identity provider
    Federated,
}

/// Navigation target. Always replaces the sign-in page in history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectTarget {
    /// Path to navigate to
    pub path: String,
    /// Whether the navigation replaces the current history entry
    pub replace: bool,
}

impl RedirectTarget {
    fn to(path: &str) -> Self {
        Self {
            path: path.to_string(),
            replace: true,
        }
    }
}

/// Resolves where to send a freshly authenticated principal.
#[derive(Clone, Debug, Default)]
pub struct RedirectResolver {
    routes: RouteTable,
}

impl RedirectResolver {
    /// Creates a resolver over `routes`.
    #[must_use]
    pub const fn new(routes: RouteTable) -> Self {
        Self { routes }
    }

    /// Landing page for `role`.
    #[must_use]
    pub fn default_path(&self, role: Role) -> &str {
        self.routes.default_path(role)
    }

    /// Computes the navigation target after `event`.
    ///
    /// `intended_path` is ignored unless it is a local absolute path that the
    /// route table permits for `role`.
    #[must_use]
    pub fn resolve(
        &self,
        event: AuthEvent,
        role: Role,
        intended_path: Option<&str>,
    ) -> RedirectTarget {
        let fallback = self.default_path(role);
        let Some(intended) = intended_path.map(str::trim).filter(|p| !p.is_empty()) else {
            debug!(?event, %role, "No intended path, using {}", fallback);
            return RedirectTarget::to(fallback);
        };

        if !is_local_path(intended) {
            debug!(?event, %role, "Discarding non-local intended path {}", intended);
            return RedirectTarget::to(fallback);
        }

        if self.routes.is_path_permitted(intended, role) {
            debug!(?event, %role, "Returning to {}", intended);
            RedirectTarget::to(intended)
        } else {
            debug!(?event, %role, "{} not permitted, using {}", intended, fallback);
            RedirectTarget::to(fallback)
        }
    }
}

/// Absolute path on this site: starts with one `/`, no scheme or authority.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
}
