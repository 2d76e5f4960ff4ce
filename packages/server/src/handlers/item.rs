use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::ItemType;
use tracing::{info, instrument};

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::items::ItemStore;
use crate::models::item::{CreateItemRequest, ItemResponse};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Items",
    operation_id = "createItem",
    summary = "Report a lost or found item",
    description = "Requires `item:report` permission. The reporter becomes the item owner.",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item reported", body = ItemResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_item(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("item:report")?;
    let new_item = payload.validate()?;

    let item = ItemStore::new(&state.db)
        .create_item(auth_user.user_id, new_item)
        .await?;

    info!(item_id = item.id, item_type = %item.item_type, "Item reported");
    Ok((StatusCode::CREATED, Json(ItemResponse::from(item))))
}

#[utoipa::path(
    get,
    path = "/{item_type}/{id}",
    tag = "Items",
    operation_id = "getItem",
    summary = "Get an item",
    params(
        ("item_type" = ItemType, Path, description = "`lost` or `found`"),
        ("id" = i32, Path, description = "Item ID"),
    ),
    responses(
        (status = 200, description = "Item details", body = ItemResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Item not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_item(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path((item_type, id)): Path<(ItemType, i32)>,
) -> Result<Json<ItemResponse>, AppError> {
    let item = ItemStore::new(&state.db)
        .get_item(item_type, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".into()))?;

    Ok(Json(ItemResponse::from(item)))
}
