use chrono::Utc;
use common::{ClaimStatus, ContactChannel, ItemType};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};

use crate::entity::claim;
use crate::entity::claim_audit::{self, AuditAction};

use super::ClaimError;

/// Fields of a claim captured at submission time.
#[derive(Clone, Debug)]
pub struct NewClaim {
    pub item_id: i32,
    pub item_type: ItemType,
    pub item_owner_id: i32,
    pub item_name: String,
    pub item_category: String,
    pub claimant_id: i32,
    pub claimant_name: String,
    pub claimant_email: String,
    pub claim_message: String,
    pub proof_image: Option<String>,
}

/// Row filter for claim listings. `None` fields do not constrain.
#[derive(Clone, Debug, Default)]
pub struct ClaimFilter {
    pub claimant_id: Option<i32>,
    pub item_owner_id: Option<i32>,
    pub item: Option<(ItemType, i32)>,
    /// `pending` also matches the legacy pending alias.
    pub status: Option<ClaimStatus>,
}

/// Persistence boundary for claim rows.
///
/// Generic over the connection so every method can run inside the caller's
/// transaction.
pub struct ClaimStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ClaimStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert a new `pending` claim.
    ///
    /// The partial unique index on active claims turns a lost submit race into
    /// `DuplicateClaim`.
    pub async fn insert(&self, new: NewClaim) -> Result<claim::Model, ClaimError> {
        let now = Utc::now();
        let model = claim::ActiveModel {
            item_id: Set(new.item_id),
            item_type: Set(new.item_type),
            item_owner_id: Set(new.item_owner_id),
            item_name: Set(new.item_name),
            item_category: Set(new.item_category),
            claimant_id: Set(new.claimant_id),
            claimant_name: Set(new.claimant_name),
            claimant_email: Set(new.claimant_email),
            claim_message: Set(new.claim_message),
            proof_image: Set(new.proof_image),
            status: Set(ClaimStatus::Pending),
            reviewed_by: Set(None),
            rejection_reason: Set(None),
            resolution_notes: Set(None),
            owner_contact_info: Set(None),
            owner_contact_type: Set(None),
            contact_shared_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            approved_at: Set(None),
            rejected_at: Set(None),
            resolved_at: Set(None),
            ..Default::default()
        };

        match model.insert(self.conn).await {
            Ok(inserted) => Ok(inserted),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                tracing::debug!("Duplicate claim caught by unique index on insert");
                Err(ClaimError::DuplicateClaim)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find(&self, id: i32) -> Result<Option<claim::Model>, DbErr> {
        claim::Entity::find_by_id(id).one(self.conn).await
    }

    /// The claimant's claim on an item that still blocks a new submission.
    pub async fn find_active(
        &self,
        claimant_id: i32,
        item_type: ItemType,
        item_id: i32,
    ) -> Result<Option<claim::Model>, DbErr> {
        claim::Entity::find()
            .filter(claim::Column::ClaimantId.eq(claimant_id))
            .filter(claim::Column::ItemType.eq(item_type))
            .filter(claim::Column::ItemId.eq(item_id))
            .filter(claim::Column::Status.is_in(ClaimStatus::ACTIVE.to_vec()))
            .one(self.conn)
            .await
    }

    /// List claims, newest first. Returns the page and the total match count.
    pub async fn list(
        &self,
        filter: &ClaimFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<claim::Model>, u64), DbErr> {
        let mut query = claim::Entity::find();

        if let Some(claimant_id) = filter.claimant_id {
            query = query.filter(claim::Column::ClaimantId.eq(claimant_id));
        }
        if let Some(owner_id) = filter.item_owner_id {
            query = query.filter(claim::Column::ItemOwnerId.eq(owner_id));
        }
        if let Some((item_type, item_id)) = filter.item {
            query = query
                .filter(claim::Column::ItemType.eq(item_type))
                .filter(claim::Column::ItemId.eq(item_id));
        }
        if let Some(status) = filter.status {
            query = if status.is_pending() {
                query.filter(claim::Column::Status.is_in(ClaimStatus::PENDING.to_vec()))
            } else {
                query.filter(claim::Column::Status.eq(status))
            };
        }

        let total = query.clone().count(self.conn).await?;

        let claims = query
            .order_by_desc(claim::Column::CreatedAt)
            .order_by_desc(claim::Column::Id)
            .offset(offset_of(page, per_page))
            .limit(per_page)
            .all(self.conn)
            .await?;

        Ok((claims, total))
    }

    /// Take the write lock on a claim row. Returns whether the row exists.
    ///
    /// Call it first in a transaction that reads the claim and then writes
    /// it: concurrent writers queue on the lock instead of failing their
    /// read-to-write upgrade, and each one reads the status its predecessor
    /// committed.
    pub async fn lock(&self, id: i32) -> Result<bool, DbErr> {
        let result = claim::Entity::update_many()
            .col_expr(claim::Column::UpdatedAt, Expr::col(claim::Column::UpdatedAt))
            .filter(claim::Column::Id.eq(id))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Move a claim to `to` if, and only if, it is currently in one of the
    /// statuses `to` may be entered from and the target's timestamp is unset.
    ///
    /// This is a single conditional `UPDATE`; returns whether a row changed.
    /// Two racing callers cannot both observe `true`.
    pub async fn transition(
        &self,
        id: i32,
        to: ClaimStatus,
        actor_id: i32,
        note: Option<String>,
    ) -> Result<bool, DbErr> {
        let now = Utc::now();
        let sources = ClaimStatus::sources_of(to);

        let update = claim::Entity::update_many()
            .col_expr(claim::Column::Status, Expr::value(to))
            .col_expr(claim::Column::UpdatedAt, Expr::value(now))
            .filter(claim::Column::Id.eq(id))
            .filter(claim::Column::Status.is_in(sources.to_vec()));

        let update = match to {
            ClaimStatus::Approved => update
                .col_expr(claim::Column::ApprovedAt, Expr::value(Some(now)))
                .col_expr(claim::Column::ReviewedBy, Expr::value(Some(actor_id)))
                .filter(claim::Column::ApprovedAt.is_null()),
            ClaimStatus::Rejected => update
                .col_expr(claim::Column::RejectedAt, Expr::value(Some(now)))
                .col_expr(claim::Column::ReviewedBy, Expr::value(Some(actor_id)))
                .col_expr(claim::Column::RejectionReason, Expr::value(note))
                .filter(claim::Column::RejectedAt.is_null()),
            ClaimStatus::Resolved => update
                .col_expr(claim::Column::ResolvedAt, Expr::value(Some(now)))
                .col_expr(claim::Column::ResolutionNotes, Expr::value(note))
                .filter(claim::Column::ResolvedAt.is_null()),
            ClaimStatus::Pending | ClaimStatus::PendingAdminReview => return Ok(false),
        };

        let result = update.exec(self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    /// Store the owner's normalized contact channel, only while `approved`.
    pub async fn set_owner_contact(&self, id: i32, channel: &ContactChannel) -> Result<bool, DbErr> {
        let now = Utc::now();
        let result = claim::Entity::update_many()
            .col_expr(
                claim::Column::OwnerContactInfo,
                Expr::value(Some(channel.value().to_string())),
            )
            .col_expr(
                claim::Column::OwnerContactType,
                Expr::value(Some(channel.contact_type())),
            )
            .col_expr(claim::Column::ContactSharedAt, Expr::value(Some(now)))
            .col_expr(claim::Column::UpdatedAt, Expr::value(now))
            .filter(claim::Column::Id.eq(id))
            .filter(claim::Column::Status.eq(ClaimStatus::Approved))
            .exec(self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Permanently remove a claim. Returns whether it existed.
    pub async fn delete(&self, id: i32) -> Result<bool, DbErr> {
        let result = claim::Entity::delete_by_id(id).exec(self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    /// Append an audit row for a claim write.
    pub async fn record_audit(
        &self,
        claim_id: i32,
        actor_id: i32,
        action: AuditAction,
        from_status: Option<ClaimStatus>,
        to_status: Option<ClaimStatus>,
    ) -> Result<(), DbErr> {
        claim_audit::ActiveModel {
            claim_id: Set(claim_id),
            actor_id: Set(actor_id),
            action: Set(action),
            from_status: Set(from_status),
            to_status: Set(to_status),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;
        Ok(())
    }

    /// Audit trail of a claim, oldest first.
    pub async fn audit_trail(&self, claim_id: i32) -> Result<Vec<claim_audit::Model>, DbErr> {
        claim_audit::Entity::find()
            .filter(claim_audit::Column::ClaimId.eq(claim_id))
            .order_by_asc(claim_audit::Column::Id)
            .all(self.conn)
            .await
    }
}

/// Row offset of a 1-based page, saturating at the largest offset the
/// database accepts.
fn offset_of(page: u64, per_page: u64) -> u64 {
    page.saturating_sub(1)
        .saturating_mul(per_page)
        .min(i64::MAX as u64)
}
