use utoipa_axum::{router::OpenApiRouter, routes};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/items", item_routes())
        .nest("/claims", claim_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn item_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::item::create_item))
        .routes(routes!(handlers::item::get_item))
}

fn claim_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::claim::create_claim,
            handlers::claim::list_claims
        ))
        .routes(routes!(
            handlers::claim::get_claim,
            handlers::claim::delete_claim
        ))
        .routes(routes!(handlers::claim::approve_claim))
        .routes(routes!(handlers::claim::reject_claim))
        .routes(routes!(handlers::claim::resolve_claim))
        .routes(routes!(handlers::claim::share_contact))
        .routes(routes!(handlers::claim::notification_link))
}
