use common::{ItemStatus, ItemType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A lost or found report.
///
/// Item CRUD lives outside the claims workflow; the only write the workflow
/// performs is moving `status` to `resolved` when a claim is approved.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub owner_id: i32,

    pub item_type: ItemType,
    pub name: String,
    pub category: String,
    pub location: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    #[sea_orm(indexed)]
    pub status: ItemStatus,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub resolved_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
