use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::engine::commission::compute_split;
use crate::error::AppError;
use crate::models::location::GeoPoint;
use crate::models::order::{Order, OrderStatus};
use crate::state::AppState;
use crate::store::UpdateOutcome;

/// Moves an order one step along the forward chain on behalf of its
/// assigned driver.
///
/// Preconditions are checked in a fixed order, each with its own failure
/// kind: the order exists, a location snapshot is present, the caller is the
/// assigned driver, and `target` is the unique legal successor of the
/// current status. The write itself re-checks status and driver under the
/// store's entry guard, so a request that passed validation but lost a race
/// surfaces as `StaleState` rather than overwriting the newer state.
pub fn transition(
    state: &AppState,
    order_id: Uuid,
    acting_driver_id: Uuid,
    target: OrderStatus,
    location: Option<GeoPoint>,
) -> Result<Order, AppError> {
    let current = state
        .store
        .get(order_id)
        .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

    let location = location.ok_or(AppError::LocationRequired)?;

    if current.driver_id != Some(acting_driver_id) {
        return Err(AppError::Unauthorized(format!(
            "driver {acting_driver_id} is not assigned to order {order_id}"
        )));
    }

    if current.status.successor() != Some(target) {
        return Err(classify_mismatch(current.status, target));
    }

    let now = Utc::now();
    let expected_status = current.status;
    let completion_rate = if target == OrderStatus::Completed {
        // Snapshot the admin-configured rate exactly once, here; later rate
        // changes must not alter this order's split.
        Some(state.commission.current_rate())
    } else {
        None
    };

    let outcome = state.store.conditional_update(
        order_id,
        |order| order.status == expected_status && order.driver_id == Some(acting_driver_id),
        |order| {
            order.status = target;
            order.driver_location = Some(location);
            order.updated_at = now;
            if let Some(rate) = completion_rate {
                let split = compute_split(order.price, rate);
                order.commission_rate = Some(rate);
                order.platform_commission = Some(split.platform_commission);
                order.driver_payout = Some(split.driver_payout);
                order.actual_delivery_time = Some(now);
            }
        },
    );

    match outcome {
        UpdateOutcome::Updated(order) => {
            state
                .metrics
                .transitions_total
                .with_label_values(&["applied"])
                .inc();
            if let Some(payout) = order.driver_payout.filter(|_| target == OrderStatus::Completed) {
                state.metrics.driver_payout_total.inc_by(payout);
            }
            state.publish_transition(expected_status, &order);
            info!(
                order_id = %order.id,
                driver_id = %acting_driver_id,
                from = ?expected_status,
                to = ?target,
                "order transitioned"
            );
            Ok(order)
        }
        UpdateOutcome::NotMatched(snapshot) => {
            state
                .metrics
                .transitions_total
                .with_label_values(&["stale"])
                .inc();
            debug!(
                order_id = %order_id,
                expected = ?expected_status,
                found = ?snapshot.status,
                "transition lost a race"
            );
            Err(AppError::StaleState)
        }
        UpdateOutcome::NotFound => Err(AppError::NotFound(format!("order {order_id} not found"))),
    }
}

/// Cancels an order while cancellation is still allowed (`Available` or
/// `PickedUp`). The owning customer may always cancel in that window; once
/// assigned, the assigned driver may as well. No location is required.
pub fn cancel(state: &AppState, order_id: Uuid, principal_id: Uuid) -> Result<Order, AppError> {
    let current = state
        .store
        .get(order_id)
        .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

    let is_customer = current.customer_id == principal_id;
    let is_assigned_driver = current.driver_id == Some(principal_id);
    if !is_customer && !is_assigned_driver {
        return Err(AppError::Unauthorized(format!(
            "principal {principal_id} may not cancel order {order_id}"
        )));
    }

    if !current.status.cancellable() {
        return Err(AppError::IllegalTransition(format!(
            "order {order_id} can no longer be cancelled from {:?}",
            current.status
        )));
    }

    let now = Utc::now();
    let expected_status = current.status;

    let outcome = state.store.conditional_update(
        order_id,
        |order| order.status == expected_status,
        |order| {
            order.status = OrderStatus::Cancelled;
            order.updated_at = now;
        },
    );

    match outcome {
        UpdateOutcome::Updated(order) => {
            state
                .metrics
                .transitions_total
                .with_label_values(&["cancelled"])
                .inc();
            state.publish_transition(expected_status, &order);
            info!(order_id = %order.id, principal_id = %principal_id, "order cancelled");
            Ok(order)
        }
        UpdateOutcome::NotMatched(_) => Err(AppError::StaleState),
        UpdateOutcome::NotFound => Err(AppError::NotFound(format!("order {order_id} not found"))),
    }
}

/// A target that is not the unique successor is either a replay of an
/// already-applied step (the order moved past it) or a genuinely illegal
/// jump. Replays are routine under retries and get their own recoverable
/// kind.
fn classify_mismatch(current: OrderStatus, target: OrderStatus) -> AppError {
    match (current.forward_position(), target.forward_position()) {
        (Some(cur), Some(tgt)) if tgt <= cur => AppError::StaleState,
        _ => AppError::IllegalTransition(format!(
            "cannot move from {current:?} to {target:?}"
        )),
    }
}
