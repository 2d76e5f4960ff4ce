#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which board an item was reported on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "lost"))]
    Lost,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "found"))]
    Found,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lost => "lost",
            Self::Found => "found",
        }
    }

    /// Status a freshly reported item starts in.
    pub fn initial_status(&self) -> ItemStatus {
        match self {
            Self::Lost => ItemStatus::Lost,
            Self::Found => ItemStatus::Available,
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lost" => Ok(Self::Lost),
            "found" => Ok(Self::Found),
            _ => Err(format!(
                "Invalid item type '{s}'. Valid values: lost, found"
            )),
        }
    }
}

/// Listing status of a reported item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Lost report, still missing.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "lost"))]
    Lost,
    /// Found report, waiting for its owner.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "available"))]
    Available,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "matched"))]
    Matched,
    /// A claim on this item was approved.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "resolved"))]
    Resolved,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lost => "lost",
            Self::Available => "available",
            Self::Matched => "matched",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
