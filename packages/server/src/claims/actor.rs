use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};

use crate::entity::{role_permission, user};

use super::ClaimError;

/// Permission that lets a role approve, reject and resolve any claim.
pub const MODERATE_PERMISSION: &str = "claim:moderate";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActorRole {
    User,
    Admin,
}

/// The user on whose behalf a workflow operation runs.
///
/// Passed explicitly into every lifecycle call. Ownership is always checked
/// against the claim itself; the role only widens what an actor may moderate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i32,
    pub role: ActorRole,
}

impl Actor {
    pub fn user(user_id: i32) -> Self {
        Self {
            user_id,
            role: ActorRole::User,
        }
    }

    pub fn admin(user_id: i32) -> Self {
        Self {
            user_id,
            role: ActorRole::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::Admin
    }

    /// Build the actor for `user_id` from the current database state.
    ///
    /// Token role claims are not trusted here: the role is re-read so a
    /// demoted admin loses moderation rights immediately. A role without the
    /// moderation permission, or one that no longer exists, yields `User`.
    pub async fn resolve<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Self, ClaimError> {
        let user = user::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or(ClaimError::NotAuthorized)?;

        let can_moderate = role_permission::Entity::find()
            .filter(role_permission::Column::Role.eq(&user.role))
            .filter(role_permission::Column::Permission.eq(MODERATE_PERMISSION))
            .count(db)
            .await?
            > 0;

        Ok(Self {
            user_id,
            role: if can_moderate {
                ActorRole::Admin
            } else {
                ActorRole::User
            },
        })
    }
}
