//! Route permission table used after authentication.
//!
//! Paths are split into an admin-only list and a user-only list. Anything not listed
//! is open to both roles. That open default means a new admin route stays reachable by
//! regular users until it is added to `admin_only`.

use crate::core::badge::Role;
use serde::Deserialize;

/// Role-specific landing pages and the two restricted path lists
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RouteTable {
    /// Landing page for administrators
    pub admin_home: String,
    /// Landing page for regular members
    pub user_home: String,
    /// Paths (and their sub-paths) only administrators may open
    pub admin_only: Vec<String>,
    /// Paths (and their sub-paths) only regular members may open
    pub user_only: Vec<String>,
}

impl Default for RouteTable {
    fn default() -> Self {
        let paths = |list: &[&str]| -> Vec<String> {
            list.iter().map(ToString::to_string).collect()
        };
        Self {
            admin_home: "/dashboard/admin-profile".to_string(),
            user_home: "/dashboard/my-profile".to_string(),
            admin_only: paths(&[
                "/dashboard/admin-profile",
                "/dashboard/manage-users",
                "/dashboard/add-meal",
                "/dashboard/all-meals",
                "/dashboard/all-reviews",
                "/dashboard/serve-meals",
                "/dashboard/upcoming-meals",
            ]),
            user_only: paths(&[
                "/dashboard/my-profile",
                "/dashboard/requested-meals",
                "/dashboard/my-reviews",
                "/dashboard/payment-history",
            ]),
        }
    }
}

impl RouteTable {
    /// Landing page for `role`.
    #[must_use]
    pub fn default_path(&self, role: Role) -> &str {
        match role {
            Role::Admin => &self.admin_home,
            Role::User => &self.user_home,
        }
    }

    /// Whether `role` may open `path`.
    ///
    /// Query string, fragment and trailing slash are ignored. A listed entry also
    /// covers every path below it.
    #[must_use]
    pub fn is_path_permitted(&self, path: &str, role: Role) -> bool {
        let path = normalize(path);
        let listed = |entries: &[String]| entries.iter().any(|entry| covers(entry, path));
        match role {
            Role::Admin => !listed(&self.user_only),
            Role::User => !listed(&self.admin_only),
        }
    }
}

fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = path.get(..end).unwrap_or(path);
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

fn covers(entry: &str, path: &str) -> bool {
    let entry = normalize(entry);
    path.strip_prefix(entry)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
