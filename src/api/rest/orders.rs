use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::assignment;
use crate::engine::status;
use crate::error::AppError;
use crate::models::location::{GeoPoint, Place};
use crate::models::order::{Order, OrderStatus, PaymentStatus};
use crate::state::AppState;
use crate::store::UpdateOutcome;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/available", get(list_available))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/accept", post(accept_order))
        .route("/orders/:id/transition", post(transition_order))
        .route("/orders/:id/cancel", post(cancel_order))
        .route("/orders/:id/payment", patch(update_payment_status))
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    pub pickup: Place,
    pub dropoff: Place,
    pub price: f64,
}

#[derive(Deserialize)]
pub struct AcceptRequest {
    pub driver_id: Uuid,
    pub location: GeoPoint,
}

#[derive(Deserialize)]
pub struct TransitionRequest {
    pub driver_id: Uuid,
    pub target_status: OrderStatus,
    pub location: Option<GeoPoint>,
}

#[derive(Deserialize)]
pub struct CancelRequest {
    pub principal_id: Uuid,
}

#[derive(Deserialize)]
pub struct UpdatePaymentRequest {
    pub payment_status: PaymentStatus,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    if payload.pickup.address.trim().is_empty() || payload.dropoff.address.trim().is_empty() {
        return Err(AppError::BadRequest(
            "pickup and dropoff addresses cannot be empty".to_string(),
        ));
    }

    if payload.price <= 0.0 {
        return Err(AppError::BadRequest("price must be > 0".to_string()));
    }

    let order = Order::new(payload.customer_id, payload.pickup, payload.dropoff, payload.price);
    state.store.insert(order.clone());
    state.metrics.orders_created_total.inc();

    Ok(Json(order))
}

async fn list_orders(State(state): State<Arc<AppState>>) -> Json<Vec<Order>> {
    Json(state.store.list_all())
}

async fn list_available(State(state): State<Arc<AppState>>) -> Json<Vec<Order>> {
    Json(state.store.list_available())
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .store
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

    Ok(Json(order))
}

async fn accept_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AcceptRequest>,
) -> Result<Json<Order>, AppError> {
    let order = assignment::accept(&state, id, payload.driver_id, payload.location)?;
    Ok(Json(order))
}

async fn transition_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionRequest>,
) -> Result<Json<Order>, AppError> {
    let order = status::transition(
        &state,
        id,
        payload.driver_id,
        payload.target_status,
        payload.location,
    )?;
    Ok(Json(order))
}

async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelRequest>,
) -> Result<Json<Order>, AppError> {
    let order = status::cancel(&state, id, payload.principal_id)?;
    Ok(Json(order))
}

/// Payment settles through an external processor; its status is the only
/// field still writable once the delivery itself is terminal.
async fn update_payment_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentRequest>,
) -> Result<Json<Order>, AppError> {
    let outcome = state.store.conditional_update(
        id,
        |_| true,
        |order| {
            order.payment_status = payload.payment_status;
            order.updated_at = Utc::now();
        },
    );

    match outcome {
        UpdateOutcome::Updated(order) => Ok(Json(order)),
        UpdateOutcome::NotMatched(_) => Err(AppError::StaleState),
        UpdateOutcome::NotFound => Err(AppError::NotFound(format!("order {id} not found"))),
    }
}
