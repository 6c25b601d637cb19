//! Order route handlers.
//!
//! Reads are scoped to the viewer: admins see every order, signed-in users
//! their own, anonymous visitors the orders placed under their session id.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use santas_workshop_core::OrderId;

use crate::{
    db::OrderRepository,
    error::AppError,
    middleware::auth::{RequireAdmin, ViewerContext},
    models::{Order, OrderForm, OrderOwner, OrderPatch, Viewer},
    services::{anonymous, query::{self, OrderQuery}},
    state::AppState,
};

/// Build the order router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(index).post(create))
        .route("/api/orders/refresh", post(refresh))
        .route("/api/orders/{id}", get(show).put(update).delete(destroy))
}

/// Orders visible to the viewer.
#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub loading: bool,
    pub error: Option<String>,
}

fn repository(state: &AppState) -> OrderRepository<'_> {
    OrderRepository::new(state.store()).with_unscoped(state.config().unscoped_orders)
}

/// List the viewer's orders, optionally filtered by status.
#[instrument(skip(state, viewer))]
pub async fn index(
    State(state): State<AppState>,
    ViewerContext(viewer): ViewerContext,
    Query(query): Query<OrderQuery>,
) -> Result<Json<OrderListResponse>, AppError> {
    let status = query
        .status_filter()
        .map_err(|value| AppError::BadRequest(format!("unknown order status: {value}")))?;
    let snapshot = state.cache().orders(&viewer.order_scope()).await?;

    Ok(Json(OrderListResponse {
        orders: query::filter_orders(snapshot.items, status),
        loading: snapshot.loading,
        error: snapshot.error,
    }))
}

/// Reload the viewer's orders from the store, then list them.
#[instrument(skip(state, viewer))]
pub async fn refresh(
    State(state): State<AppState>,
    ViewerContext(viewer): ViewerContext,
    Query(query): Query<OrderQuery>,
) -> Result<Json<OrderListResponse>, AppError> {
    let status = query
        .status_filter()
        .map_err(|value| AppError::BadRequest(format!("unknown order status: {value}")))?;
    let snapshot = state.cache().refresh_orders(&viewer.order_scope()).await?;

    Ok(Json(OrderListResponse {
        orders: query::filter_orders(snapshot.items, status),
        loading: snapshot.loading,
        error: snapshot.error,
    }))
}

/// Show one order, if the viewer may see it.
#[instrument(skip(state, viewer))]
pub async fn show(
    State(state): State<AppState>,
    ViewerContext(viewer): ViewerContext,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, AppError> {
    let order = repository(&state)
        .get_visible(&id, &viewer.order_scope())
        .await?;
    Ok(Json(order))
}

/// Place an order.
///
/// Anonymous visitors are issued a session id first, and the order is
/// tagged with it.
#[instrument(skip(state, session, viewer, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    ViewerContext(viewer): ViewerContext,
    Json(form): Json<OrderForm>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let new_order = form.validate()?;

    let viewer = match viewer.user {
        Some(_) => viewer,
        None => Viewer::anonymous(anonymous::get_or_create(&session).await?),
    };
    let owner = viewer
        .order_owner()
        .ok_or_else(|| AppError::Internal("order has no owner".to_string()))?;
    if let OrderOwner::Session(session_id) = &owner {
        tracing::debug!(%session_id, "Placing anonymous order");
    }

    let order = repository(&state).create(new_order, owner).await?;
    state.cache().orders_changed(&viewer.order_scope()).await;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Edit an order, including its status.
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(form): Json<OrderForm>,
) -> Result<Json<Order>, AppError> {
    let status = form.status;
    let order = form.validate()?;
    let patch = OrderPatch {
        child_name: Some(order.child_name),
        country: Some(order.country),
        toy_id: Some(order.toy_id),
        priority: Some(order.priority),
        status,
    };

    let order = repository(&state).update(&id, patch).await?;
    state.cache().invalidate_orders().await;
    Ok(Json(order))
}

/// Remove an order.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<StatusCode, AppError> {
    repository(&state).delete(&id).await?;
    state.cache().invalidate_orders().await;
    Ok(StatusCode::NO_CONTENT)
}
