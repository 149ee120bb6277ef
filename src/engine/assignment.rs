use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::location::GeoPoint;
use crate::models::order::{Order, OrderStatus};
use crate::state::AppState;
use crate::store::UpdateOutcome;

/// Resolves the many-drivers-one-order race for the `Available -> PickedUp`
/// edge with a single conditional update. The store's per-record atomicity
/// is the entire coordination mechanism: no pool, no lock, no queue, and it
/// holds across any number of stateless service instances.
pub fn accept(
    state: &AppState,
    order_id: Uuid,
    driver_id: Uuid,
    location: GeoPoint,
) -> Result<Order, AppError> {
    let now = Utc::now();

    let outcome = state.store.conditional_update(
        order_id,
        |order| order.status == OrderStatus::Available && order.driver_id.is_none(),
        |order| {
            order.status = OrderStatus::PickedUp;
            order.driver_id = Some(driver_id);
            order.driver_location = Some(location);
            order.actual_pickup_time = Some(now);
            order.updated_at = now;
        },
    );

    match outcome {
        UpdateOutcome::Updated(order) => {
            state.metrics.accepts_total.with_label_values(&["won"]).inc();
            state.publish_transition(OrderStatus::Available, &order);
            info!(order_id = %order.id, driver_id = %driver_id, "order accepted");
            Ok(order)
        }
        UpdateOutcome::NotMatched(snapshot) => {
            // Advisory read for reporting only; the CAS already decided.
            state.metrics.accepts_total.with_label_values(&["lost"]).inc();
            debug!(
                order_id = %order_id,
                driver_id = %driver_id,
                current_status = ?snapshot.status,
                "accept lost the race"
            );
            Err(AppError::AlreadyTaken)
        }
        UpdateOutcome::NotFound => Err(AppError::NotFound(format!("order {order_id} not found"))),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::accept;
    use crate::error::AppError;
    use crate::models::location::{GeoPoint, Place};
    use crate::models::order::{Order, OrderStatus};
    use crate::state::AppState;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(64, 20.0))
    }

    fn seed_order(state: &AppState) -> Uuid {
        let order = Order::new(
            Uuid::new_v4(),
            Place {
                address: "1 Market Sq".to_string(),
                point: None,
            },
            Place {
                address: "9 Harbour Rd".to_string(),
                point: None,
            },
            100.0,
        );
        let id = order.id;
        state.store.insert(order);
        id
    }

    fn here() -> GeoPoint {
        GeoPoint { lat: 52.52, lng: 13.405 }
    }

    #[test]
    fn accept_claims_available_order() {
        let state = state();
        let order_id = seed_order(&state);
        let driver = Uuid::new_v4();

        let order = accept(&state, order_id, driver, here()).unwrap();

        assert_eq!(order.status, OrderStatus::PickedUp);
        assert_eq!(order.driver_id, Some(driver));
        assert!(order.actual_pickup_time.is_some());
        assert_eq!(order.driver_location, Some(here()));
    }

    #[test]
    fn second_accept_reports_already_taken() {
        let state = state();
        let order_id = seed_order(&state);
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        accept(&state, order_id, first, here()).unwrap();
        let err = accept(&state, order_id, second, here()).unwrap_err();

        assert!(matches!(err, AppError::AlreadyTaken));
        // The record still belongs to the winner.
        assert_eq!(state.store.get(order_id).unwrap().driver_id, Some(first));
    }

    #[test]
    fn accept_missing_order_reports_not_found() {
        let state = state();
        let err = accept(&state, Uuid::new_v4(), Uuid::new_v4(), here()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn concurrent_accepts_have_exactly_one_winner() {
        let state = state();
        let order_id = seed_order(&state);

        let results: Vec<bool> = std::thread::scope(|scope| {
            (0..12)
                .map(|i| {
                    let state = Arc::clone(&state);
                    scope.spawn(move || {
                        accept(&state, order_id, Uuid::from_u128(i + 1), here()).is_ok()
                    })
                })
                .collect::<Vec<_>>()
                .into_iter()
                .map(|h| h.join().unwrap())
                .collect()
        });

        assert_eq!(results.iter().filter(|won| **won).count(), 1);

        let order = state.store.get(order_id).unwrap();
        assert_eq!(order.status, OrderStatus::PickedUp);
        assert!(order.driver_id.is_some());
    }
}
