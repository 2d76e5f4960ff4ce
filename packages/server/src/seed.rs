use sea_orm::*;
use tracing::info;

use crate::entity::{role, role_permission};

/// Default roles seeded on startup.
const DEFAULT_ROLES: &[&str] = &["admin", "user"];

/// Default role-permission mappings seeded on startup.
const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    // Admin: all permissions
    ("admin", "claim:submit"),
    ("admin", "claim:moderate"),
    ("admin", "claim:view_all"),
    ("admin", "claim:delete"),
    ("admin", "item:report"),
    // Regular user
    ("user", "claim:submit"),
    ("user", "item:report"),
];

/// Seed the `role` and `role_permission` tables with defaults.
pub async fn seed_role_permissions(db: &DatabaseConnection) -> Result<(), DbErr> {
    let mut roles_inserted = 0u32;
    for &name in DEFAULT_ROLES {
        let model = role::ActiveModel {
            name: Set(name.to_string()),
        };

        let result = role::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(role::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(n) => roles_inserted += n as u32,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if roles_inserted > 0 {
        info!("Seeded {} new roles", roles_inserted);
    }

    let mut perms_inserted = 0u32;
    for &(role, permission) in DEFAULT_MAPPINGS {
        let model = role_permission::ActiveModel {
            role: Set(role.to_string()),
            permission: Set(permission.to_string()),
        };

        let result = role_permission::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    role_permission::Column::Role,
                    role_permission::Column::Permission,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(n) => perms_inserted += n as u32,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if perms_inserted > 0 {
        info!("Seeded {} new role-permission mappings", perms_inserted);
    }

    Ok(())
}

/// Indexes schema-sync cannot express, created on startup.
///
/// `idx_claim_active_unique` backs the duplicate-claim check: two racing
/// submissions for the same claimant and item cannot both insert. The
/// status list must match `ClaimStatus::ACTIVE`.
const INDEXES: &[(&str, &str)] = &[
    (
        "idx_claim_active_unique",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_claim_active_unique \
         ON claim (claimant_id, item_id, item_type) \
         WHERE status IN ('pending', 'pending_admin_review', 'approved', 'resolved')",
    ),
    (
        "idx_claim_owner_created",
        "CREATE INDEX IF NOT EXISTS idx_claim_owner_created \
         ON claim (item_owner_id, created_at)",
    ),
    (
        "idx_item_type_id",
        "CREATE INDEX IF NOT EXISTS idx_item_type_id ON item (item_type, id)",
    ),
];

/// Ensure required database indexes exist.
///
/// Failing to create the unique claim index is fatal: without it concurrent
/// submissions could produce duplicate active claims.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    for &(name, sql) in INDEXES {
        match db.execute_unprepared(sql).await {
            Ok(_) => info!("Ensured index {} exists", name),
            Err(e) if name == "idx_claim_active_unique" => return Err(e),
            Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
        }
    }
    Ok(())
}
