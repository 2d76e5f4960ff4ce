use chrono::Utc;
use common::{ClaimStatus, ItemStatus, ItemType};
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, TransactionTrait};
use tracing::{info, instrument, warn};

use crate::config::ClaimsConfig;
use crate::entity::claim;
use crate::entity::claim_audit::AuditAction;
use crate::entity::user;
use crate::items::ItemStore;

use super::{Actor, ClaimError, ClaimFilter, ClaimStore, NewClaim};

const MAX_PER_PAGE: u64 = 100;

/// Input of [`ClaimLifecycle::submit`].
#[derive(Clone, Debug)]
pub struct SubmitClaim {
    pub item_type: ItemType,
    pub item_id: i32,
    pub claim_message: String,
    pub proof_image: Option<String>,
}

/// Which claims a listing covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListScope {
    /// Claims the actor filed.
    Mine,
    /// Claims against items the actor reported.
    MyItems,
    /// Claims against one item. Owner or admin.
    Item(ItemType, i32),
    /// Every claim. Admin only.
    All,
}

/// The claim state machine.
///
/// Each write runs in its own transaction that first locks the row it
/// decides on, then applies the change with a conditional update, so
/// concurrent callers cannot both win.
pub struct ClaimLifecycle<'a> {
    db: &'a DatabaseConnection,
    config: &'a ClaimsConfig,
}

impl<'a> ClaimLifecycle<'a> {
    pub fn new(db: &'a DatabaseConnection, config: &'a ClaimsConfig) -> Self {
        Self { db, config }
    }

    /// File a new `pending` claim against someone else's item.
    #[instrument(skip(self, input), fields(actor_id = actor.user_id, item_id = input.item_id, item_type = %input.item_type))]
    pub async fn submit(&self, actor: Actor, input: SubmitClaim) -> Result<claim::Model, ClaimError> {
        let txn = self.db.begin().await?;

        let items = ItemStore::new(&txn);
        if !items.lock_item(input.item_type, input.item_id).await? {
            return Err(ClaimError::NotFound("Item"));
        }
        let item = items
            .get_item(input.item_type, input.item_id)
            .await?
            .ok_or(ClaimError::NotFound("Item"))?;

        if item.owner_id == actor.user_id {
            return Err(ClaimError::SelfClaimNotAllowed);
        }

        let message = validate_message(self.config, &input.claim_message)?;

        let claimant = user::Entity::find_by_id(actor.user_id)
            .one(&txn)
            .await?
            .ok_or(ClaimError::NotAuthorized)?;

        let store = ClaimStore::new(&txn);
        if store
            .find_active(actor.user_id, item.item_type, item.id)
            .await?
            .is_some()
        {
            return Err(ClaimError::DuplicateClaim);
        }

        let created = store
            .insert(NewClaim {
                item_id: item.id,
                item_type: item.item_type,
                item_owner_id: item.owner_id,
                item_name: item.name,
                item_category: item.category,
                claimant_id: claimant.id,
                claimant_name: claimant.username,
                claimant_email: claimant.email,
                claim_message: message,
                proof_image: input
                    .proof_image
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
            })
            .await?;

        store
            .record_audit(
                created.id,
                actor.user_id,
                AuditAction::Submit,
                None,
                Some(ClaimStatus::Pending),
            )
            .await?;

        txn.commit().await?;

        info!(claim_id = created.id, "Claim submitted");
        Ok(created)
    }

    /// Approve a pending claim and mark its item resolved, atomically.
    ///
    /// A missing item does not block approval; it is logged and the claim
    /// still moves to `approved`. Any error while updating an existing item
    /// rolls the claim back to `pending`.
    #[instrument(skip(self), fields(actor_id = actor.user_id))]
    pub async fn approve(&self, actor: Actor, claim_id: i32) -> Result<claim::Model, ClaimError> {
        let txn = self.db.begin().await?;
        let store = ClaimStore::new(&txn);
        store.lock(claim_id).await?;
        let claim = load_for_review(&txn, actor, claim_id).await?;
        let from = claim.status;
        if !from.can_transition_to(ClaimStatus::Approved) {
            return Err(ClaimError::InvalidTransition { current: from });
        }

        if !store
            .transition(claim_id, ClaimStatus::Approved, actor.user_id, None)
            .await?
        {
            return Err(lost_race(&store, claim_id).await);
        }

        let item_found = ItemStore::new(&txn)
            .set_item_status(
                claim.item_type,
                claim.item_id,
                ItemStatus::Resolved,
                Some(Utc::now()),
            )
            .await?;
        if !item_found {
            warn!(
                claim_id,
                item_id = claim.item_id,
                item_type = %claim.item_type,
                "Approved claim whose item no longer exists"
            );
        }

        store
            .record_audit(
                claim_id,
                actor.user_id,
                AuditAction::Approve,
                Some(from),
                Some(ClaimStatus::Approved),
            )
            .await?;
        let updated = store
            .find(claim_id)
            .await?
            .ok_or(ClaimError::NotFound("Claim"))?;

        txn.commit().await?;

        info!(claim_id, from = %from, to = %updated.status, item_found, "Claim approved");
        Ok(updated)
    }

    /// Reject a pending claim. The item stays open for other claims.
    #[instrument(skip(self, reason), fields(actor_id = actor.user_id))]
    pub async fn reject(
        &self,
        actor: Actor,
        claim_id: i32,
        reason: Option<String>,
    ) -> Result<claim::Model, ClaimError> {
        let txn = self.db.begin().await?;
        let store = ClaimStore::new(&txn);
        store.lock(claim_id).await?;
        let claim = load_for_review(&txn, actor, claim_id).await?;
        let from = claim.status;
        if !from.can_transition_to(ClaimStatus::Rejected) {
            return Err(ClaimError::InvalidTransition { current: from });
        }

        if !store
            .transition(
                claim_id,
                ClaimStatus::Rejected,
                actor.user_id,
                non_blank(reason),
            )
            .await?
        {
            return Err(lost_race(&store, claim_id).await);
        }

        store
            .record_audit(
                claim_id,
                actor.user_id,
                AuditAction::Reject,
                Some(from),
                Some(ClaimStatus::Rejected),
            )
            .await?;
        let updated = store
            .find(claim_id)
            .await?
            .ok_or(ClaimError::NotFound("Claim"))?;

        txn.commit().await?;

        info!(claim_id, from = %from, to = %updated.status, "Claim rejected");
        Ok(updated)
    }

    /// Confirm handover of an approved claim. Admin only.
    #[instrument(skip(self, notes), fields(actor_id = actor.user_id))]
    pub async fn resolve(
        &self,
        actor: Actor,
        claim_id: i32,
        notes: Option<String>,
    ) -> Result<claim::Model, ClaimError> {
        if !actor.is_admin() {
            return Err(ClaimError::NotAuthorized);
        }

        let txn = self.db.begin().await?;
        let store = ClaimStore::new(&txn);
        store.lock(claim_id).await?;
        let claim = store
            .find(claim_id)
            .await?
            .ok_or(ClaimError::NotFound("Claim"))?;
        let from = claim.status;
        if !from.can_transition_to(ClaimStatus::Resolved) {
            return Err(ClaimError::InvalidTransition { current: from });
        }

        if !store
            .transition(
                claim_id,
                ClaimStatus::Resolved,
                actor.user_id,
                non_blank(notes),
            )
            .await?
        {
            return Err(lost_race(&store, claim_id).await);
        }

        store
            .record_audit(
                claim_id,
                actor.user_id,
                AuditAction::Resolve,
                Some(from),
                Some(ClaimStatus::Resolved),
            )
            .await?;
        let updated = store
            .find(claim_id)
            .await?
            .ok_or(ClaimError::NotFound("Claim"))?;

        txn.commit().await?;

        info!(claim_id, from = %from, to = %updated.status, "Claim resolved");
        Ok(updated)
    }

    /// Permanently remove a claim in any status. Admin only.
    ///
    /// Bypasses the state graph; recorded as its own audit action.
    #[instrument(skip(self), fields(actor_id = actor.user_id))]
    pub async fn admin_delete(&self, actor: Actor, claim_id: i32) -> Result<(), ClaimError> {
        if !actor.is_admin() {
            return Err(ClaimError::NotAuthorized);
        }

        let txn = self.db.begin().await?;
        let store = ClaimStore::new(&txn);
        if !store.lock(claim_id).await? {
            return Err(ClaimError::NotFound("Claim"));
        }
        let claim = store
            .find(claim_id)
            .await?
            .ok_or(ClaimError::NotFound("Claim"))?;

        if !store.delete(claim_id).await? {
            return Err(ClaimError::NotFound("Claim"));
        }
        store
            .record_audit(
                claim_id,
                actor.user_id,
                AuditAction::AdminDelete,
                Some(claim.status),
                None,
            )
            .await?;

        txn.commit().await?;

        info!(claim_id, status = %claim.status, "Claim deleted by admin");
        Ok(())
    }

    /// Fetch one claim. Visible to its claimant, the item owner and admins.
    pub async fn get(&self, actor: Actor, claim_id: i32) -> Result<claim::Model, ClaimError> {
        let claim = ClaimStore::new(self.db).find(claim_id).await?;
        match claim {
            Some(c) if actor.is_admin() || is_party(actor, &c) => Ok(c),
            Some(_) => Err(ClaimError::NotAuthorized),
            None if actor.is_admin() => Err(ClaimError::NotFound("Claim")),
            None => Err(ClaimError::NotAuthorized),
        }
    }

    /// List claims in `scope`, newest first. `page` is 1-based.
    pub async fn list(
        &self,
        actor: Actor,
        scope: ListScope,
        status: Option<ClaimStatus>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<claim::Model>, u64), ClaimError> {
        let mut filter = ClaimFilter {
            status,
            ..Default::default()
        };

        match scope {
            ListScope::Mine => filter.claimant_id = Some(actor.user_id),
            ListScope::MyItems => filter.item_owner_id = Some(actor.user_id),
            ListScope::Item(item_type, item_id) => {
                if !actor.is_admin() {
                    let item = ItemStore::new(self.db).get_item(item_type, item_id).await?;
                    match item {
                        Some(item) if item.owner_id == actor.user_id => {}
                        _ => return Err(ClaimError::NotAuthorized),
                    }
                    filter.item_owner_id = Some(actor.user_id);
                }
                filter.item = Some((item_type, item_id));
            }
            ListScope::All => {
                if !actor.is_admin() {
                    return Err(ClaimError::NotAuthorized);
                }
            }
        }

        let page = page.max(1);
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let result = ClaimStore::new(self.db)
            .list(&filter, page, per_page)
            .await?;
        Ok(result)
    }
}

/// Trim and length-check a claim message. Lengths count characters.
fn validate_message(config: &ClaimsConfig, raw: &str) -> Result<String, ClaimError> {
    let message = raw.trim();
    let len = message.chars().count();
    if len < config.min_message_chars {
        return Err(ClaimError::Validation(format!(
            "Claim message must be at least {} characters",
            config.min_message_chars
        )));
    }
    if len > config.max_message_chars {
        return Err(ClaimError::Validation(format!(
            "Claim message must be at most {} characters",
            config.max_message_chars
        )));
    }
    Ok(message.to_string())
}

fn is_party(actor: Actor, claim: &claim::Model) -> bool {
    claim.claimant_id == actor.user_id || claim.item_owner_id == actor.user_id
}

/// Load a claim the actor may approve or reject.
///
/// Non-reviewers get `NotAuthorized` whether or not the claim exists.
async fn load_for_review<C: ConnectionTrait>(
    conn: &C,
    actor: Actor,
    claim_id: i32,
) -> Result<claim::Model, ClaimError> {
    match ClaimStore::new(conn).find(claim_id).await? {
        Some(c) if actor.is_admin() || c.item_owner_id == actor.user_id => Ok(c),
        Some(_) => Err(ClaimError::NotAuthorized),
        None if actor.is_admin() => Err(ClaimError::NotFound("Claim")),
        None => Err(ClaimError::NotAuthorized),
    }
}

/// Error for a conditional update that matched no row.
async fn lost_race<C: ConnectionTrait>(store: &ClaimStore<'_, C>, claim_id: i32) -> ClaimError {
    match store.find(claim_id).await {
        Ok(Some(c)) => ClaimError::InvalidTransition { current: c.status },
        Ok(None) => ClaimError::NotFound("Claim"),
        Err(e) => e.into(),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
