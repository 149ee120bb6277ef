use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::get;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/settings/commission",
        get(get_commission_rate).put(set_commission_rate),
    )
}

#[derive(Serialize, Deserialize)]
pub struct CommissionRate {
    pub rate: f64,
}

async fn get_commission_rate(State(state): State<Arc<AppState>>) -> Json<CommissionRate> {
    Json(CommissionRate {
        rate: state.commission.current_rate(),
    })
}

/// Changes the rate applied to future completions only; orders already
/// completed keep the rate snapshotted at their completion.
async fn set_commission_rate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CommissionRate>,
) -> Result<Json<CommissionRate>, AppError> {
    if !(0.0..=100.0).contains(&payload.rate) || !payload.rate.is_finite() {
        return Err(AppError::BadRequest(
            "commission rate must be within 0..=100".to_string(),
        ));
    }

    state.commission.set_rate(payload.rate);
    info!(rate = payload.rate, "commission rate updated");

    Ok(Json(CommissionRate { rate: payload.rate }))
}
