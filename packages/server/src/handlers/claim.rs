use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;

use crate::claims::{
    ClaimLifecycle, ContactDisclosure, NotificationDispatch, NotificationLink, SubmitClaim,
};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::claim::{
    ClaimListQuery, ClaimListResponse, ClaimResponse, CreateClaimRequest, NotificationLinkQuery,
    RejectClaimRequest, ResolveClaimRequest, ShareContactRequest,
};
use crate::models::shared::Pagination;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Claims",
    operation_id = "createClaim",
    summary = "File a claim on someone else's item",
    description = "Requires `claim:submit` permission. Creates a `pending` claim. Fails if you reported the item, if the message is shorter than the configured minimum, or if you already have a pending, approved or resolved claim on the item.",
    request_body = CreateClaimRequest,
    responses(
        (status = 201, description = "Claim created", body = ClaimResponse),
        (status = 400, description = "Validation error or own item (VALIDATION_ERROR, SELF_CLAIM_NOT_ALLOWED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Item not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Open claim exists (DUPLICATE_CLAIM)", body = ErrorBody),
        (status = 503, description = "Store unavailable (STORE_UNAVAILABLE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, item_id = payload.item_id))]
pub async fn create_claim(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateClaimRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("claim:submit")?;
    let actor = auth_user.actor(&state).await?;

    let claim = ClaimLifecycle::new(&state.db, &state.config.claims)
        .submit(
            actor,
            SubmitClaim {
                item_type: payload.item_type,
                item_id: payload.item_id,
                claim_message: payload.claim_message,
                proof_image: payload.proof_image,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ClaimResponse::from(claim))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Claims",
    operation_id = "listClaims",
    summary = "List claims",
    description = "`scope=mine` (default) lists claims you filed, `scope=my_items` claims against items you reported, and `scope=all` every claim (admin only). Passing `item_type` and `item_id` lists the claims on one item instead (owner or admin).",
    params(ClaimListQuery),
    responses(
        (status = 200, description = "Claims, newest first", body = ClaimListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_claims(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ClaimListQuery>,
) -> Result<Json<ClaimListResponse>, AppError> {
    let scope = query.list_scope()?;
    let actor = auth_user.actor(&state).await?;

    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let (claims, total) = ClaimLifecycle::new(&state.db, &state.config.claims)
        .list(actor, scope, query.status, page, per_page)
        .await?;

    Ok(Json(ClaimListResponse {
        data: claims.into_iter().map(ClaimResponse::from).collect(),
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Claims",
    operation_id = "getClaim",
    summary = "Get a claim",
    description = "Visible to the claimant, the item owner and admins. Owner contact fields are null unless the claim is approved and the owner shared a channel.",
    params(("id" = i32, Path, description = "Claim ID")),
    responses(
        (status = 200, description = "Claim details", body = ClaimResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a party to the claim (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Claim not found, admins only (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_claim(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ClaimResponse>, AppError> {
    let actor = auth_user.actor(&state).await?;
    let claim = ClaimLifecycle::new(&state.db, &state.config.claims)
        .get(actor, id)
        .await?;
    Ok(Json(ClaimResponse::from(claim)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Claims",
    operation_id = "deleteClaim",
    summary = "Permanently delete a claim",
    description = "Admin override in any status. Requires `claim:delete` permission.",
    params(("id" = i32, Path, description = "Claim ID")),
    responses(
        (status = 204, description = "Claim deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Claim not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_claim(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    auth_user.require_permission("claim:delete")?;
    let actor = auth_user.actor(&state).await?;

    ClaimLifecycle::new(&state.db, &state.config.claims)
        .admin_delete(actor, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/approve",
    tag = "Claims",
    operation_id = "approveClaim",
    summary = "Approve a pending claim",
    description = "Item owner or admin. Moves the claim to `approved` and the item to `resolved` in one transaction. A second call fails with INVALID_TRANSITION.",
    params(("id" = i32, Path, description = "Claim ID")),
    responses(
        (status = 200, description = "Claim approved", body = ClaimResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the item owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Claim not found, admins only (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Claim already handled (INVALID_TRANSITION)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn approve_claim(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ClaimResponse>, AppError> {
    let actor = auth_user.actor(&state).await?;
    let claim = ClaimLifecycle::new(&state.db, &state.config.claims)
        .approve(actor, id)
        .await?;
    Ok(Json(ClaimResponse::from(claim)))
}

#[utoipa::path(
    post,
    path = "/{id}/reject",
    tag = "Claims",
    operation_id = "rejectClaim",
    summary = "Reject a pending claim",
    description = "Item owner or admin. The item stays open for other claims and the claimant may file again.",
    params(("id" = i32, Path, description = "Claim ID")),
    request_body = RejectClaimRequest,
    responses(
        (status = 200, description = "Claim rejected", body = ClaimResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the item owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Claim not found, admins only (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Claim already handled (INVALID_TRANSITION)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn reject_claim(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<RejectClaimRequest>,
) -> Result<Json<ClaimResponse>, AppError> {
    let actor = auth_user.actor(&state).await?;
    let claim = ClaimLifecycle::new(&state.db, &state.config.claims)
        .reject(actor, id, payload.reason)
        .await?;
    Ok(Json(ClaimResponse::from(claim)))
}

#[utoipa::path(
    post,
    path = "/{id}/resolve",
    tag = "Claims",
    operation_id = "resolveClaim",
    summary = "Confirm the handover of an approved claim",
    description = "Admin only.",
    params(("id" = i32, Path, description = "Claim ID")),
    request_body = ResolveClaimRequest,
    responses(
        (status = 200, description = "Claim resolved", body = ClaimResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Claim not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Claim is not approved (INVALID_TRANSITION)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn resolve_claim(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ResolveClaimRequest>,
) -> Result<Json<ClaimResponse>, AppError> {
    let actor = auth_user.actor(&state).await?;
    let claim = ClaimLifecycle::new(&state.db, &state.config.claims)
        .resolve(actor, id, payload.notes)
        .await?;
    Ok(Json(ClaimResponse::from(claim)))
}

#[utoipa::path(
    put,
    path = "/{id}/contact",
    tag = "Claims",
    operation_id = "shareOwnerContact",
    summary = "Share the item owner's contact channel",
    description = "Item owner only, while the claim is approved. Phone numbers are normalized to `91XXXXXXXXXX`. Sharing again replaces the channel.",
    params(("id" = i32, Path, description = "Claim ID")),
    request_body = ShareContactRequest,
    responses(
        (status = 200, description = "Contact shared", body = ClaimResponse),
        (status = 400, description = "Malformed phone or email (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the item owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Claim not approved (PREMATURE_DISCLOSURE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, contact_type = %payload.contact_type))]
pub async fn share_contact(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ShareContactRequest>,
) -> Result<Json<ClaimResponse>, AppError> {
    let actor = auth_user.actor(&state).await?;
    let claim = ContactDisclosure::new(&state.db)
        .share_owner_contact(actor, id, payload.contact_type, &payload.contact_value)
        .await?;
    Ok(Json(ClaimResponse::from(claim)))
}

#[utoipa::path(
    get,
    path = "/{id}/notification-link",
    tag = "Claims",
    operation_id = "getNotificationLink",
    summary = "Build a pre-filled outbound message link",
    description = "Returns a `mailto:` or WhatsApp link for a person to open. Nothing is sent; `delivered` is always false. Outcome kinds (`approved`, `rejected`, `resolved`) are for the item owner or an admin; `contact_owner` is for the claimant once the owner shared a channel.",
    params(("id" = i32, Path, description = "Claim ID"), NotificationLinkQuery),
    responses(
        (status = 200, description = "Link built", body = NotificationLink),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Wrong claim status (INVALID_TRANSITION, PREMATURE_DISCLOSURE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn notification_link(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<NotificationLinkQuery>,
) -> Result<Json<NotificationLink>, AppError> {
    let actor = auth_user.actor(&state).await?;
    let link = NotificationDispatch::new(&state.db)
        .dispatch_link(actor, id, query.kind)
        .await?;
    Ok(Json(link))
}
