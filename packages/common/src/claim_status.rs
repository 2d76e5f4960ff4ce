#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a claim during the review lifecycle.
///
/// `pending` is the initial state. From there a claim is either `approved`
/// or `rejected`; `resolved` is only reachable from `approved`.
///
/// `pending_admin_review` is a legacy spelling written by older clients. It is
/// equivalent to `pending` for every authorization and filtering decision;
/// use [`ClaimStatus::is_pending`], [`ClaimStatus::PENDING`] or
/// [`ClaimStatus::normalized`] instead of matching on it directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Waiting for the item owner or an admin.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "pending"))]
    Pending,
    /// Legacy alias of `Pending`.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "pending_admin_review"))]
    PendingAdminReview,
    /// Accepted by the owner or an admin. Contact details may be shared.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "approved"))]
    Approved,
    /// Declined. Terminal.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "rejected"))]
    Rejected,
    /// Handover confirmed by an admin. Terminal.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "resolved"))]
    Resolved,
}

impl ClaimStatus {
    /// All possible status values.
    pub const ALL: &'static [ClaimStatus] = &[
        Self::Pending,
        Self::PendingAdminReview,
        Self::Approved,
        Self::Rejected,
        Self::Resolved,
    ];

    /// Statuses that count as "waiting for review".
    pub const PENDING: &'static [ClaimStatus] = &[Self::Pending, Self::PendingAdminReview];

    /// Statuses that block the same claimant from filing another claim on the
    /// same item. Only a rejected claim frees the slot.
    pub const ACTIVE: &'static [ClaimStatus] = &[
        Self::Pending,
        Self::PendingAdminReview,
        Self::Approved,
        Self::Resolved,
    ];

    /// Collapse aliases onto their canonical status.
    pub fn normalized(self) -> Self {
        match self {
            Self::PendingAdminReview => Self::Pending,
            other => other,
        }
    }

    pub fn is_pending(&self) -> bool {
        Self::PENDING.contains(self)
    }

    /// Statuses the given target may be entered from.
    pub fn sources_of(target: ClaimStatus) -> &'static [ClaimStatus] {
        match target.normalized() {
            Self::Approved | Self::Rejected => Self::PENDING,
            Self::Resolved => &[Self::Approved],
            Self::Pending | Self::PendingAdminReview => &[],
        }
    }

    /// Whether `self -> target` is an edge of the lifecycle graph.
    pub fn can_transition_to(&self, target: ClaimStatus) -> bool {
        Self::sources_of(target).contains(self)
    }

    /// Returns the string representation (snake_case).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PendingAdminReview => "pending_admin_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for ClaimStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Error when parsing an invalid status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseClaimStatusError {
    invalid: String,
}

impl fmt::Display for ParseClaimStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid claim status '{}'. Valid values: {}",
            self.invalid,
            ClaimStatus::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseClaimStatusError {}

impl FromStr for ClaimStatus {
    type Err = ParseClaimStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "pending_admin_review" => Ok(Self::PendingAdminReview),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "resolved" => Ok(Self::Resolved),
            _ => Err(ParseClaimStatusError {
                invalid: s.to_string(),
            }),
        }
    }
}
