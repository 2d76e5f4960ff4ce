use chrono::{DateTime, Utc};
use common::{ClaimStatus, ContactType, ItemType};
use serde::{Deserialize, Serialize};

use crate::claims::{DisclosedContact, ListScope, MessageKind};
use crate::entity::claim;
use crate::error::AppError;

use super::shared::Pagination;

/// Request body for filing a claim.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateClaimRequest {
    pub item_type: ItemType,
    #[schema(example = 7)]
    pub item_id: i32,
    /// Why the item is yours (at least 20 characters after trimming).
    /// `proofText` and `message` are accepted as older names of this field.
    #[serde(alias = "proofText", alias = "message")]
    #[schema(example = "Found near the library entrance, has a blue cover")]
    pub claim_message: String,
    /// Reference to an already uploaded proof image.
    pub proof_image: Option<String>,
}

/// Request body for rejecting a claim.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct RejectClaimRequest {
    #[schema(example = "Description does not match the item")]
    pub reason: Option<String>,
}

/// Request body for resolving a claim.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct ResolveClaimRequest {
    #[schema(example = "Handed over at the front desk")]
    pub notes: Option<String>,
}

/// Request body for sharing the owner's contact channel.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ShareContactRequest {
    pub contact_type: ContactType,
    /// Phone number in any common format, or an email address.
    #[schema(example = "98765 43210")]
    pub contact_value: String,
}

/// Named claim listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClaimScope {
    /// Claims you filed.
    #[default]
    Mine,
    /// Claims against items you reported.
    MyItems,
    /// Every claim (admin only).
    All,
}

/// Query parameters for listing claims.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ClaimListQuery {
    /// Listing to return. Ignored when `item_type` and `item_id` are given.
    pub scope: Option<ClaimScope>,
    /// Filter by status. `pending` also matches `pending_admin_review`.
    pub status: Option<ClaimStatus>,
    /// Restrict to one item (owner or admin). Requires `item_id`.
    pub item_type: Option<ItemType>,
    #[param(example = 7)]
    pub item_id: Option<i32>,
    /// Page number (1-indexed).
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Items per page (1-100, default 20).
    #[param(example = 20)]
    pub per_page: Option<u64>,
}

impl ClaimListQuery {
    pub fn list_scope(&self) -> Result<ListScope, AppError> {
        match (self.item_type, self.item_id) {
            (Some(item_type), Some(item_id)) => Ok(ListScope::Item(item_type, item_id)),
            (None, None) => Ok(match self.scope.unwrap_or_default() {
                ClaimScope::Mine => ListScope::Mine,
                ClaimScope::MyItems => ListScope::MyItems,
                ClaimScope::All => ListScope::All,
            }),
            _ => Err(AppError::Validation(
                "item_type and item_id must be given together".into(),
            )),
        }
    }
}

/// Query parameters for building a notification link.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct NotificationLinkQuery {
    /// Template to fill.
    pub kind: MessageKind,
}

/// A claim as seen by one of its parties or an admin.
///
/// Owner contact fields are null unless the claim is currently `approved`
/// and the owner has shared a channel.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ClaimResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = 7)]
    pub item_id: i32,
    pub item_type: ItemType,
    pub item_owner_id: i32,
    #[schema(example = "Blue notebook")]
    pub item_name: String,
    #[schema(example = "Stationery")]
    pub item_category: String,
    pub claimant_id: i32,
    pub claimant_name: String,
    pub claimant_email: String,
    pub claim_message: String,
    pub proof_image: Option<String>,
    pub status: ClaimStatus,
    pub reviewed_by: Option<i32>,
    pub rejection_reason: Option<String>,
    pub resolution_notes: Option<String>,
    #[schema(example = "919876543210")]
    pub owner_contact_info: Option<String>,
    pub owner_contact_type: Option<ContactType>,
    pub contact_shared_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl From<claim::Model> for ClaimResponse {
    fn from(m: claim::Model) -> Self {
        let contact = DisclosedContact::of(&m);
        Self {
            id: m.id,
            item_id: m.item_id,
            item_type: m.item_type,
            item_owner_id: m.item_owner_id,
            item_name: m.item_name,
            item_category: m.item_category,
            claimant_id: m.claimant_id,
            claimant_name: m.claimant_name,
            claimant_email: m.claimant_email,
            claim_message: m.claim_message,
            proof_image: m.proof_image,
            status: m.status.normalized(),
            reviewed_by: m.reviewed_by,
            rejection_reason: m.rejection_reason,
            resolution_notes: m.resolution_notes,
            owner_contact_type: contact.as_ref().map(|c| c.contact_type),
            contact_shared_at: contact.as_ref().map(|c| c.shared_at),
            owner_contact_info: contact.map(|c| c.value),
            created_at: m.created_at,
            updated_at: m.updated_at,
            approved_at: m.approved_at,
            rejected_at: m.rejected_at,
            resolved_at: m.resolved_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ClaimListResponse {
    pub data: Vec<ClaimResponse>,
    pub pagination: Pagination,
}
