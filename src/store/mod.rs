use dashmap::DashMap;
use uuid::Uuid;

use crate::models::order::{Order, OrderStatus};

/// Result of a conditional update. `NotMatched` carries a snapshot of the
/// record as it was at check time; callers use it for reporting only, never
/// to decide the outcome (that would reintroduce a check-then-act race).
#[derive(Debug)]
pub enum UpdateOutcome {
    Updated(Order),
    NotMatched(Order),
    NotFound,
}

/// Durable record of orders; source of truth for status and assignment.
///
/// The sole mutation primitive is [`conditional_update`]: predicate check
/// and write run under the per-key entry guard, so two concurrent callers
/// can never both believe they moved the same record from the same prior
/// state. No cross-order coordination exists because none is needed.
///
/// [`conditional_update`]: OrderStore::conditional_update
#[derive(Default)]
pub struct OrderStore {
    orders: DashMap<Uuid, Order>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, order: Order) {
        self.orders.insert(order.id, order);
    }

    pub fn get(&self, id: Uuid) -> Option<Order> {
        self.orders.get(&id).map(|entry| entry.value().clone())
    }

    pub fn list_all(&self) -> Vec<Order> {
        self.orders.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn list_available(&self) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|entry| entry.value().status == OrderStatus::Available)
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Single-record compare-and-swap. Applies `apply` only if `predicate`
    /// holds for the stored record at that moment; both run while the entry
    /// lock is held. Returns the updated record on success, a snapshot on a
    /// failed match, or `NotFound`.
    pub fn conditional_update<P, F>(&self, id: Uuid, predicate: P, apply: F) -> UpdateOutcome
    where
        P: FnOnce(&Order) -> bool,
        F: FnOnce(&mut Order),
    {
        let Some(mut entry) = self.orders.get_mut(&id) else {
            return UpdateOutcome::NotFound;
        };

        let order = entry.value_mut();
        if !predicate(order) {
            return UpdateOutcome::NotMatched(order.clone());
        }

        apply(order);
        UpdateOutcome::Updated(order.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::{OrderStore, UpdateOutcome};
    use crate::models::location::Place;
    use crate::models::order::{Order, OrderStatus};

    fn place(address: &str) -> Place {
        Place {
            address: address.to_string(),
            point: None,
        }
    }

    fn sample_order() -> Order {
        Order::new(Uuid::new_v4(), place("12 Pickup St"), place("7 Dropoff Ave"), 50.0)
    }

    #[test]
    fn conditional_update_applies_when_predicate_holds() {
        let store = OrderStore::new();
        let order = sample_order();
        let id = order.id;
        store.insert(order);

        let outcome = store.conditional_update(
            id,
            |o| o.status == OrderStatus::Available,
            |o| o.status = OrderStatus::Cancelled,
        );

        match outcome {
            UpdateOutcome::Updated(updated) => assert_eq!(updated.status, OrderStatus::Cancelled),
            other => panic!("expected Updated, got {other:?}"),
        }
        assert_eq!(store.get(id).unwrap().status, OrderStatus::Cancelled);
    }

    #[test]
    fn conditional_update_rejects_when_predicate_fails() {
        let store = OrderStore::new();
        let order = sample_order();
        let id = order.id;
        store.insert(order);

        let outcome = store.conditional_update(
            id,
            |o| o.status == OrderStatus::InTransit,
            |o| o.status = OrderStatus::Approaching,
        );

        match outcome {
            UpdateOutcome::NotMatched(snapshot) => {
                assert_eq!(snapshot.status, OrderStatus::Available);
            }
            other => panic!("expected NotMatched, got {other:?}"),
        }
        // Record untouched.
        assert_eq!(store.get(id).unwrap().status, OrderStatus::Available);
    }

    #[test]
    fn conditional_update_reports_missing_record() {
        let store = OrderStore::new();
        let outcome = store.conditional_update(Uuid::new_v4(), |_| true, |_| {});
        assert!(matches!(outcome, UpdateOutcome::NotFound));
    }

    #[test]
    fn racing_updates_have_exactly_one_winner() {
        let store = Arc::new(OrderStore::new());
        let order = sample_order();
        let id = order.id;
        store.insert(order);

        let winners: usize = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|i| {
                    let store = Arc::clone(&store);
                    scope.spawn(move || {
                        let driver = Uuid::from_u128(i + 1);
                        let outcome = store.conditional_update(
                            id,
                            |o| o.status == OrderStatus::Available && o.driver_id.is_none(),
                            |o| {
                                o.status = OrderStatus::PickedUp;
                                o.driver_id = Some(driver);
                            },
                        );
                        matches!(outcome, UpdateOutcome::Updated(_))
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|&ok| ok)
                .count()
        });

        assert_eq!(winners, 1);
        let stored = store.get(id).unwrap();
        assert_eq!(stored.status, OrderStatus::PickedUp);
        assert!(stored.driver_id.is_some());
    }

    #[test]
    fn list_available_excludes_claimed_orders() {
        let store = OrderStore::new();
        let open = sample_order();
        let mut claimed = sample_order();
        claimed.status = OrderStatus::PickedUp;
        claimed.driver_id = Some(Uuid::new_v4());

        let open_id = open.id;
        store.insert(open);
        store.insert(claimed);

        let available = store.list_available();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, open_id);
    }
}
