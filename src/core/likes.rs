//! Liked-by set business logic - toggling a principal's like on a meal.
//!
//! The set of `meal_likes` rows is the source of truth. A toggle flips one
//! principal's membership and then writes the freshly counted set size to the
//! meal's `likes` column inside the same transaction, so the two never drift.
//! The counter is never incremented or decremented on its own.

use crate::{
    core::{
        gate::{GateDecision, GatePolicy, GatedAction},
        principal::{get_principal, normalize_email},
    },
    entities::{Meal, MealLike, meal, meal_like},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Server-side like state for one principal on one meal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeToggle {
    /// Whether the principal is in the liked-by set
    pub liked: bool,
    /// Size of the liked-by set
    pub like_count: i64,
}

async fn count_likes<C>(db: &C, meal_id: i64) -> Result<i64>
where
    C: ConnectionTrait,
{
    let count = MealLike::find()
        .filter(meal_like::Column::MealId.eq(meal_id))
        .count(db)
        .await?;
    Ok(i64::try_from(count).unwrap_or(i64::MAX))
}

async fn find_like<C>(db: &C, meal_id: i64, email: &str) -> Result<Option<meal_like::Model>>
where
    C: ConnectionTrait,
{
    MealLike::find()
        .filter(meal_like::Column::MealId.eq(meal_id))
        .filter(meal_like::Column::Email.eq(email))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Reads whether `email` likes the meal and the current set size.
pub async fn get_like_state(
    db: &DatabaseConnection,
    meal_id: i64,
    email: &str,
) -> Result<LikeToggle> {
    Meal::find_by_id(meal_id)
        .one(db)
        .await?
        .ok_or(Error::MealNotFound { id: meal_id })?;

    let email = normalize_email(email);
    Ok(LikeToggle {
        liked: find_like(db, meal_id, &email).await?.is_some(),
        like_count: count_likes(db, meal_id).await?,
    })
}

/// Adds `email` to the meal's liked-by set if absent, removes it if present.
///
/// Returns the membership after the flip and the recounted set size, which the
/// caller should display in place of any optimistic value. No gate is applied;
/// use [`toggle_like_enforced`] for requests from members.
///
/// # Errors
/// - `InvalidInput` if `email` is blank
/// - `MealNotFound` if the meal does not exist
#[instrument(skip(db))]
pub async fn toggle_like(db: &DatabaseConnection, meal_id: i64, email: &str) -> Result<LikeToggle> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(Error::InvalidInput {
            message: "Like requires a principal email".to_string(),
        });
    }
    let txn = db.begin().await?;

    let meal = Meal::find_by_id(meal_id)
        .one(&txn)
        .await?
        .ok_or(Error::MealNotFound { id: meal_id })?;

    let liked = match find_like(&txn, meal_id, &email).await? {
        Some(existing) => {
            existing.delete(&txn).await?;
            false
        }
        None => {
            meal_like::ActiveModel {
                meal_id: Set(meal_id),
                email: Set(email.clone()),
                liked_at: Set(chrono::Utc::now()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            true
        }
    };

    let like_count = count_likes(&txn, meal_id).await?;
    let mut active: meal::ActiveModel = meal.into();
    active.likes = Set(like_count);
    active.update(&txn).await?;

    txn.commit().await?;

    info!(
        "{} {} meal {} ({} likes)",
        email,
        if liked { "liked" } else { "unliked" },
        meal_id,
        like_count
    );
    Ok(LikeToggle { liked, like_count })
}

/// Backend-side toggle that re-applies the feature gate before mutating.
///
/// Upcoming meals use [`GatedAction::LikeUpcomingMeal`], served meals
/// [`GatedAction::LikeMeal`].
///
/// # Errors
/// - `Unauthenticated` if `email` is not a registered principal
/// - `PolicyBlocked` if the principal's badge is below the action's minimum
/// - `MealNotFound` if the meal does not exist
#[instrument(skip(db, policy))]
pub async fn toggle_like_enforced(
    db: &DatabaseConnection,
    policy: &GatePolicy,
    meal_id: i64,
    email: &str,
) -> Result<LikeToggle> {
    let meal = Meal::find_by_id(meal_id)
        .one(db)
        .await?
        .ok_or(Error::MealNotFound { id: meal_id })?;

    let action = if meal.is_upcoming {
        GatedAction::LikeUpcomingMeal
    } else {
        GatedAction::LikeMeal
    };

    let principal = get_principal(db, email).await?;
    match policy.can_perform(action, principal.as_ref()) {
        GateDecision::Allowed => toggle_like(db, meal_id, email).await,
        GateDecision::Unauthenticated => Err(Error::Unauthenticated),
        GateDecision::Blocked(reason) => {
            warn!("{} may not {}: {}", email, action, reason);
            Err(Error::PolicyBlocked { reason })
        }
    }
}

/// UI-side like state, updated optimistically before the server answers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OptimisticLike {
    /// Displayed membership
    pub liked: bool,
    /// Displayed counter
    pub count: i64,
}

impl OptimisticLike {
    /// Starts from a server state.
    #[must_use]
    pub const fn from_server(state: LikeToggle) -> Self {
        Self {
            liked: state.liked,
            count: state.like_count,
        }
    }

    /// Flips the displayed state ahead of the server round-trip.
    pub fn toggle_optimistic(&mut self) {
        self.liked = !self.liked;
        self.count = if self.liked {
            self.count.saturating_add(1)
        } else {
            self.count.saturating_sub(1).max(0)
        };
    }

    /// Replaces the displayed state with the server's answer.
    pub fn reconcile(&mut self, server: LikeToggle) {
        self.liked = server.liked;
        self.count = server.like_count;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::entitlement::BlockReason;
    use crate::test_utils::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_toggle_adds_then_removes() -> Result<()> {
        let db = setup_test_db().await?;
        let meal = create_test_meal(&db, "Biryani", false).await?;

        let liked = toggle_like(&db, meal.id, "member@hostel.test").await?;
        assert_eq!(
            liked,
            LikeToggle {
                liked: true,
                like_count: 1
            }
        );

        let unliked = toggle_like(&db, meal.id, "member@hostel.test").await?;
        assert_eq!(
            unliked,
            LikeToggle {
                liked: false,
                like_count: 0
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_counter_matches_set_after_every_toggle() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;
        let meal = create_test_meal(&db, "Khichuri", true).await?;
        let members = ["a@hostel.test", "b@hostel.test", "c@hostel.test"];
        let sequence = [0, 1, 0, 2, 2, 1, 0, 0, 2, 1, 1];

        let mut expected: HashSet<&str> = HashSet::new();
        for index in sequence {
            let email = members[index];
            if !expected.remove(email) {
                expected.insert(email);
            }

            let result = toggle_like(&db, meal.id, email).await?;
            assert_eq!(result.liked, expected.contains(email));
            assert_eq!(result.like_count, expected.len() as i64);

            let stored = Meal::find_by_id(meal.id).one(&db).await?.unwrap();
            assert_eq!(stored.likes, expected.len() as i64);
            let rows = MealLike::find()
                .filter(meal_like::Column::MealId.eq(meal.id))
                .all(&db)
                .await?;
            assert_eq!(rows.len(), expected.len());
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_likes_are_per_meal() -> Result<()> {
        let db = setup_test_db().await?;
        let first = create_test_meal(&db, "Rice", false).await?;
        let second = create_test_meal(&db, "Dal", false).await?;

        toggle_like(&db, first.id, "member@hostel.test").await?;
        let state = get_like_state(&db, second.id, "member@hostel.test").await?;
        assert!(!state.liked);
        assert_eq!(state.like_count, 0);

        let state = get_like_state(&db, first.id, "MEMBER@hostel.test").await?;
        assert!(state.liked);
        assert_eq!(state.like_count, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_unknown_meal() -> Result<()> {
        let db = setup_test_db().await?;
        let result = toggle_like(&db, 404, "member@hostel.test").await;
        assert!(matches!(result, Err(Error::MealNotFound { id: 404 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_rejects_blank_email() -> Result<()> {
        let db = setup_test_db().await?;
        let meal = create_test_meal(&db, "Halim", false).await?;

        let result = toggle_like(&db, meal.id, "  ").await;
        assert!(matches!(result, Err(Error::InvalidInput { .. })));

        let stored = Meal::find_by_id(meal.id).one(&db).await?.unwrap();
        assert_eq!(stored.likes, 0);
        assert_eq!(MealLike::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_enforced_toggle_applies_gate() -> Result<()> {
        let db = setup_test_db().await?;
        let upcoming = create_test_meal(&db, "Pitha", true).await?;
        let served = create_test_meal(&db, "Polao", false).await?;
        let bronze = create_test_principal(&db, "bronze@hostel.test").await?;
        let policy = GatePolicy::default();

        let blocked = toggle_like_enforced(&db, &policy, upcoming.id, &bronze.email).await;
        assert!(matches!(
            blocked,
            Err(Error::PolicyBlocked {
                reason: BlockReason::UpgradeRequired { .. }
            })
        ));
        assert_eq!(get_like_state(&db, upcoming.id, &bronze.email).await?.like_count, 0);

        let allowed = toggle_like_enforced(&db, &policy, served.id, &bronze.email).await?;
        assert!(allowed.liked);

        let anonymous = toggle_like_enforced(&db, &policy, served.id, "ghost@hostel.test").await;
        assert!(matches!(anonymous, Err(Error::Unauthenticated)));

        set_test_badge(&db, bronze.id, Some("silver")).await?;
        let upgraded = toggle_like_enforced(&db, &policy, upcoming.id, &bronze.email).await?;
        assert_eq!(upgraded.like_count, 1);
        Ok(())
    }

    #[test]
    fn test_optimistic_counter_is_reconciled_from_server() {
        let mut ui = OptimisticLike::from_server(LikeToggle {
            liked: false,
            like_count: 4,
        });

        ui.toggle_optimistic();
        assert_eq!(ui, OptimisticLike { liked: true, count: 5 });

        // Another device liked meanwhile; the server count wins
        ui.reconcile(LikeToggle {
            liked: true,
            like_count: 6,
        });
        assert_eq!(ui, OptimisticLike { liked: true, count: 6 });

        ui.toggle_optimistic();
        assert_eq!(ui, OptimisticLike { liked: false, count: 5 });
    }

    #[test]
    fn test_optimistic_counter_never_negative() {
        let mut ui = OptimisticLike {
            liked: true,
            count: 0,
        };
        ui.toggle_optimistic();
        assert_eq!(ui.count, 0);
    }
}
