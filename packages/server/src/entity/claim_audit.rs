use common::ClaimStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Operation recorded in the claim audit trail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    #[sea_orm(string_value = "submit")]
    Submit,
    #[sea_orm(string_value = "approve")]
    Approve,
    #[sea_orm(string_value = "reject")]
    Reject,
    #[sea_orm(string_value = "resolve")]
    Resolve,
    #[sea_orm(string_value = "share_contact")]
    ShareContact,
    /// Hard delete outside the lifecycle graph.
    #[sea_orm(string_value = "admin_delete")]
    AdminDelete,
}

/// Append-only trail of claim writes. Rows outlive the claim they describe.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "claim_audit")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub claim_id: i32,
    pub actor_id: i32,
    pub action: AuditAction,
    pub from_status: Option<ClaimStatus>,
    pub to_status: Option<ClaimStatus>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
