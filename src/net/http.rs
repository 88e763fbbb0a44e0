use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::Registry;
use crate::error::{AppResult, DomainError, InfraError};
use crate::models::types::{AccountId, DefinitionId, LobbyId};
use crate::services::{
    CreateDefinitionRequest, IssueRequest, ItemRequest, MergeRequest, MoveRequest, SetDurabilityRequest, SplitRequest,
    TransferRequest,
};

/// Header carrying the authenticated user id, set by the session layer in front of us.
pub const ACTOR_HEADER: &str = "x-actor-id";

#[derive(Clone)]
struct HttpAppCtx {
    registry: Arc<Registry>,
}

/// Run the HTTP API
pub async fn serve(addr: std::net::SocketAddr, registry: Arc<Registry>) -> AppResult<()> {
    let app = router(registry);

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(InfraError::from)?;
    axum::serve(listener, app).await.map_err(InfraError::from)?;
    Ok(())
}

pub fn router(registry: Arc<Registry>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/catalog", get(catalog))
        .route("/api/inventory/{user_id}", get(snapshot))
        .route("/api/lobby/{lobby_id}/inventory/{user_id}", get(lobby_snapshot))
        .route("/api/inventory/move", post(move_item))
        .route("/api/inventory/rotate", post(rotate_item))
        .route("/api/inventory/split", post(split_item))
        .route("/api/inventory/merge", post(merge_items))
        .route("/api/inventory/use", post(use_item))
        .route("/api/inventory/drop", post(drop_item))
        .route("/api/inventory/transfer", post(transfer_item))
        .route("/api/master/issue_by_id", post(issue))
        .route("/api/master/item_instance/set_durability", post(set_durability))
        .route("/api/master/item_template/create", post(create_definition))
        .route("/api/master/item_template/{id}/image", post(replace_image))
        .with_state(HttpAppCtx { registry })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
}

// ============================================================================
// ENVELOPES
// ============================================================================

#[derive(Serialize)]
struct Envelope<T: Serialize> {
    ok: bool,
    #[serde(flatten)]
    body: T,
}

fn ok<T: Serialize>(body: T) -> Json<Envelope<T>> {
    Json(Envelope { ok: true, body })
}

#[derive(Serialize)]
struct ErrorBody {
    ok: bool,
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            None
        } else {
            Some(self.to_string())
        };

        let body = ErrorBody {
            ok: false,
            error: self.code(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

fn bad_json(e: JsonRejection) -> DomainError {
    DomainError::Validation {
        field: "body",
        message: e.body_text(),
    }
}

fn bad_path(e: PathRejection) -> DomainError {
    DomainError::Validation {
        field: "path",
        message: e.body_text(),
    }
}

// ============================================================================
// ACTOR
// ============================================================================

/// The user a request acts on behalf of.
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub AccountId);

impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = DomainError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<AccountId>().ok())
            .map(Actor)
            .ok_or(DomainError::Unauthenticated)
    }
}

// ============================================================================
// QUERIES
// ============================================================================

async fn health() -> impl IntoResponse {
    ok(serde_json::json!({ "status": "up" }))
}

async fn catalog(State(ctx): State<HttpAppCtx>, Actor(_actor): Actor) -> AppResult<impl IntoResponse> {
    let definitions = ctx.registry.services.catalog.list().await?;
    Ok(ok(serde_json::json!({ "definitions": definitions })))
}

async fn snapshot(
    State(ctx): State<HttpAppCtx>,
    Actor(actor): Actor,
    path: Result<Path<AccountId>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(user_id) = path.map_err(bad_path)?;
    let snap = ctx.registry.services.inventory.snapshot(actor, user_id, None).await?;
    Ok(ok(snap))
}

async fn lobby_snapshot(
    State(ctx): State<HttpAppCtx>,
    Actor(actor): Actor,
    path: Result<Path<(LobbyId, AccountId)>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path((lobby_id, user_id)) = path.map_err(bad_path)?;
    let snap = ctx
        .registry
        .services
        .inventory
        .snapshot(actor, user_id, Some(lobby_id))
        .await?;
    Ok(ok(snap))
}

// ============================================================================
// OPERATIONS
// ============================================================================

async fn move_item(
    State(ctx): State<HttpAppCtx>,
    Actor(actor): Actor,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(req) = payload.map_err(bad_json)?;
    Ok(ok(ctx.registry.services.inventory.move_item(actor, req).await?))
}

async fn rotate_item(
    State(ctx): State<HttpAppCtx>,
    Actor(actor): Actor,
    payload: Result<Json<ItemRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(req) = payload.map_err(bad_json)?;
    Ok(ok(ctx.registry.services.inventory.rotate_item(actor, req).await?))
}

async fn split_item(
    State(ctx): State<HttpAppCtx>,
    Actor(actor): Actor,
    payload: Result<Json<SplitRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(req) = payload.map_err(bad_json)?;
    Ok(ok(ctx.registry.services.inventory.split_item(actor, req).await?))
}

async fn merge_items(
    State(ctx): State<HttpAppCtx>,
    Actor(actor): Actor,
    payload: Result<Json<MergeRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(req) = payload.map_err(bad_json)?;
    Ok(ok(ctx.registry.services.inventory.merge_items(actor, req).await?))
}

async fn use_item(
    State(ctx): State<HttpAppCtx>,
    Actor(actor): Actor,
    payload: Result<Json<ItemRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(req) = payload.map_err(bad_json)?;
    Ok(ok(ctx.registry.services.inventory.use_item(actor, req).await?))
}

async fn drop_item(
    State(ctx): State<HttpAppCtx>,
    Actor(actor): Actor,
    payload: Result<Json<ItemRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(req) = payload.map_err(bad_json)?;
    Ok(ok(ctx.registry.services.inventory.drop_item(actor, req).await?))
}

async fn transfer_item(
    State(ctx): State<HttpAppCtx>,
    Actor(actor): Actor,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(req) = payload.map_err(bad_json)?;
    Ok(ok(ctx.registry.services.inventory.transfer_item(actor, req).await?))
}

// ============================================================================
// MASTER
// ============================================================================

async fn issue(
    State(ctx): State<HttpAppCtx>,
    Actor(actor): Actor,
    payload: Result<Json<IssueRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(req) = payload.map_err(bad_json)?;
    Ok(ok(ctx.registry.services.inventory.issue(actor, req).await?))
}

async fn set_durability(
    State(ctx): State<HttpAppCtx>,
    Actor(actor): Actor,
    payload: Result<Json<SetDurabilityRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(req) = payload.map_err(bad_json)?;
    Ok(ok(ctx.registry.services.inventory.set_durability(actor, req).await?))
}

async fn create_definition(
    State(ctx): State<HttpAppCtx>,
    Actor(actor): Actor,
    payload: Result<Json<CreateDefinitionRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(req) = payload.map_err(bad_json)?;
    Ok(ok(ctx.registry.services.inventory.create_definition(actor, req).await?))
}

#[derive(Debug, Deserialize)]
struct ImageQuery {
    lobby_id: Option<LobbyId>,
}

async fn replace_image(
    State(ctx): State<HttpAppCtx>,
    Actor(actor): Actor,
    path: Result<Path<DefinitionId>, PathRejection>,
    Query(query): Query<ImageQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let Path(definition_id) = path.map_err(bad_path)?;
    let content_type = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok());

    let outcome = ctx
        .registry
        .services
        .inventory
        .replace_image(actor, query.lobby_id, definition_id, content_type, body)
        .await?;
    Ok(ok(outcome))
}
