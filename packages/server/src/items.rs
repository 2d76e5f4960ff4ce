//! Item store boundary used by the claim workflow.

use chrono::{DateTime, Utc};
use common::{ItemStatus, ItemType};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set};

use crate::entity::item;

/// Fields of a new lost or found report.
#[derive(Clone, Debug)]
pub struct NewItem {
    pub item_type: ItemType,
    pub name: String,
    pub category: String,
    pub location: String,
    pub description: Option<String>,
}

pub struct ItemStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ItemStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn create_item(&self, owner_id: i32, new: NewItem) -> Result<item::Model, DbErr> {
        let now = Utc::now();
        item::ActiveModel {
            owner_id: Set(owner_id),
            item_type: Set(new.item_type),
            name: Set(new.name),
            category: Set(new.category),
            location: Set(new.location),
            description: Set(new.description),
            status: Set(new.item_type.initial_status()),
            created_at: Set(now),
            updated_at: Set(now),
            resolved_at: Set(None),
            ..Default::default()
        }
        .insert(self.conn)
        .await
    }

    /// Look up an item on the given board.
    pub async fn get_item(
        &self,
        item_type: ItemType,
        item_id: i32,
    ) -> Result<Option<item::Model>, DbErr> {
        item::Entity::find_by_id(item_id)
            .filter(item::Column::ItemType.eq(item_type))
            .one(self.conn)
            .await
    }

    /// Take the write lock on an item row. Returns whether the item exists.
    pub async fn lock_item(&self, item_type: ItemType, item_id: i32) -> Result<bool, DbErr> {
        let result = item::Entity::update_many()
            .col_expr(item::Column::UpdatedAt, Expr::col(item::Column::UpdatedAt))
            .filter(item::Column::Id.eq(item_id))
            .filter(item::Column::ItemType.eq(item_type))
            .exec(self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Set an item's status. Returns `false` if the item does not exist.
    pub async fn set_item_status(
        &self,
        item_type: ItemType,
        item_id: i32,
        status: ItemStatus,
        resolved_at: Option<DateTime<Utc>>,
    ) -> Result<bool, DbErr> {
        let result = item::Entity::update_many()
            .col_expr(item::Column::Status, Expr::value(status))
            .col_expr(item::Column::ResolvedAt, Expr::value(resolved_at))
            .col_expr(item::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(item::Column::Id.eq(item_id))
            .filter(item::Column::ItemType.eq(item_type))
            .exec(self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
