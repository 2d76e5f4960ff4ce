use chrono::{DateTime, Utc};
use common::{ItemStatus, ItemType};
use serde::{Deserialize, Serialize};

use crate::entity::item;
use crate::error::AppError;
use crate::items::NewItem;

use super::shared::trim_optional;

/// Request body for reporting a lost or found item.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateItemRequest {
    pub item_type: ItemType,
    #[schema(example = "Blue notebook")]
    pub name: String,
    #[schema(example = "Stationery")]
    pub category: String,
    #[schema(example = "Central library, ground floor")]
    pub location: String,
    pub description: Option<String>,
}

impl CreateItemRequest {
    pub fn validate(self) -> Result<NewItem, AppError> {
        let name = self.name.trim();
        if name.is_empty() || name.chars().count() > 128 {
            return Err(AppError::Validation("Name must be 1-128 characters".into()));
        }
        let category = self.category.trim();
        if category.is_empty() || category.chars().count() > 64 {
            return Err(AppError::Validation(
                "Category must be 1-64 characters".into(),
            ));
        }
        let location = self.location.trim();
        if location.is_empty() || location.chars().count() > 256 {
            return Err(AppError::Validation(
                "Location must be 1-256 characters".into(),
            ));
        }

        Ok(NewItem {
            item_type: self.item_type,
            name: name.to_string(),
            category: category.to_string(),
            location: location.to_string(),
            description: trim_optional(self.description),
        })
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ItemResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = 3)]
    pub owner_id: i32,
    pub item_type: ItemType,
    pub name: String,
    pub category: String,
    pub location: String,
    pub description: Option<String>,
    pub status: ItemStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl From<item::Model> for ItemResponse {
    fn from(m: item::Model) -> Self {
        Self {
            id: m.id,
            owner_id: m.owner_id,
            item_type: m.item_type,
            name: m.name,
            category: m.category,
            location: m.location,
            description: m.description,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
            resolved_at: m.resolved_at,
        }
    }
}
