//! Badge rank model - the single ordering of membership tiers.
//!
//! Every comparison between tiers in the crate goes through [`Badge::rank`]
//! or the derived `Ord`, which are defined to agree. Role is a separate axis
//! and lives here only because both are stored as plain strings on the
//! principal record and parsed the same lenient way.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Membership tier, ordered lowest to highest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Badge {
    /// Default tier for every new principal
    Bronze,
    /// First paid tier
    Silver,
    /// Second paid tier
    Gold,
    /// Top tier
    Platinum,
}

/// Result of comparing two badges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RankComparison {
    /// Left-hand badge ranks below the right-hand one
    Lower,
    /// Both badges have the same rank
    Equal,
    /// Left-hand badge ranks above the right-hand one
    Higher,
}

impl Badge {
    /// All tiers in ascending rank order.
    pub const ALL: [Self; 4] = [Self::Bronze, Self::Silver, Self::Gold, Self::Platinum];

    /// The tier every principal starts with.
    pub const LOWEST: Self = Self::Bronze;

    /// Numeric rank: Bronze=0, Silver=1, Gold=2, Platinum=3.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Bronze => 0,
            Self::Silver => 1,
            Self::Gold => 2,
            Self::Platinum => 3,
        }
    }

    /// Compares `self` against `other` by rank.
    #[must_use]
    pub const fn compare(self, other: Self) -> RankComparison {
        let (a, b) = (self.rank(), other.rank());
        if a < b {
            RankComparison::Lower
        } else if a == b {
            RankComparison::Equal
        } else {
            RankComparison::Higher
        }
    }

    /// Whether this badge is at least as high as `required`.
    #[must_use]
    pub const fn satisfies(self, required: Self) -> bool {
        self.rank() >= required.rank()
    }

    /// Canonical display name, also the stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
            Self::Platinum => "Platinum",
        }
    }

    /// Parses a badge name case-insensitively. Returns `None` for unknown names.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|badge| badge.as_str().eq_ignore_ascii_case(name))
    }

    /// Reads a badge from a stored record field.
    ///
    /// An absent or unrecognised value is a principal that has never
    /// upgraded, so it maps to the lowest tier.
    #[must_use]
    pub fn from_stored(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or(Self::LOWEST)
    }
}

impl From<RankComparison> for Ordering {
    fn from(value: RankComparison) -> Self {
        match value {
            RankComparison::Lower => Self::Less,
            RankComparison::Equal => Self::Equal,
            RankComparison::Higher => Self::Greater,
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Administrative role. Independent of [`Badge`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular member
    #[default]
    User,
    /// Back-office administrator
    Admin,
}

impl Role {
    /// Stored representation (`"user"` / `"admin"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Reads a role from a stored record field; anything but `admin` is a user.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("admin") {
            Self::Admin
        } else {
            Self::User
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_values() {
        assert_eq!(Badge::Bronze.rank(), 0);
        assert_eq!(Badge::Silver.rank(), 1);
        assert_eq!(Badge::Gold.rank(), 2);
        assert_eq!(Badge::Platinum.rank(), 3);
    }

    #[test]
    fn test_compare_agrees_with_rank_for_all_pairs() {
        for a in Badge::ALL {
            for b in Badge::ALL {
                assert_eq!(
                    a.rank() < b.rank(),
                    a.compare(b) == RankComparison::Lower,
                    "{a} vs {b}"
                );
                assert_eq!(Ordering::from(a.compare(b)), a.cmp(&b), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_order_is_strict_and_transitive() {
        for a in Badge::ALL {
            assert_ne!(a.compare(a), RankComparison::Lower);
            for b in Badge::ALL {
                for c in Badge::ALL {
                    if a.compare(b) == RankComparison::Lower
                        && b.compare(c) == RankComparison::Lower
                    {
                        assert_eq!(a.compare(c), RankComparison::Lower);
                    }
                }
            }
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Badge::parse("silver"), Some(Badge::Silver));
        assert_eq!(Badge::parse(" PLATINUM "), Some(Badge::Platinum));
        assert_eq!(Badge::parse("Diamond"), None);
    }

    #[test]
    fn test_missing_or_unknown_badge_is_lowest() {
        assert_eq!(Badge::from_stored(None), Badge::Bronze);
        assert_eq!(Badge::from_stored(Some("")), Badge::Bronze);
        assert_eq!(Badge::from_stored(Some("mystery")), Badge::Bronze);
        assert_eq!(Badge::from_stored(Some("gold")), Badge::Gold);
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(Role::from_stored("admin"), Role::Admin);
        assert_eq!(Role::from_stored("Admin"), Role::Admin);
        assert_eq!(Role::from_stored("user"), Role::User);
        assert_eq!(Role::from_stored("student"), Role::User);
    }
}
