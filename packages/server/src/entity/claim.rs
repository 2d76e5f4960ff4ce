use common::{ClaimStatus, ContactType, ItemType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An ownership claim filed by one user against another user's item.
///
/// `item_owner_id`, `item_name` and `item_category` are copied from the item
/// when the claim is created and never rewritten, even if the item changes or
/// is deleted later.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "claim")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub item_id: i32,
    pub item_type: ItemType,
    #[sea_orm(indexed)]
    pub item_owner_id: i32,
    pub item_name: String,
    pub item_category: String,

    #[sea_orm(indexed)]
    pub claimant_id: i32,
    pub claimant_name: String,
    pub claimant_email: String,

    /// Free-text proof of ownership. Older clients sent this as `proofText`
    /// or `message`.
    #[sea_orm(column_type = "Text")]
    pub claim_message: String,
    pub proof_image: Option<String>,

    #[sea_orm(indexed)]
    pub status: ClaimStatus,

    /// Owner or admin who approved or rejected the claim.
    pub reviewed_by: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub rejection_reason: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub resolution_notes: Option<String>,

    /// Written only while `status` is `approved`.
    pub owner_contact_info: Option<String>,
    pub owner_contact_type: Option<ContactType>,
    pub contact_shared_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub approved_at: Option<DateTimeUtc>,
    pub rejected_at: Option<DateTimeUtc>,
    pub resolved_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
