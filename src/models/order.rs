use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::location::{GeoPoint, Place};

/// Delivery lifecycle states. Forward movement is a single chain; the only
/// branches are the two cancellation edges out of `Available` and `PickedUp`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    Available,
    PickedUp,
    InTransit,
    Approaching,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// The unique legal successor on the forward chain, if any.
    ///
    /// `Available -> PickedUp` is deliberately absent: claiming an order goes
    /// through the assignment compare-and-swap, never through a plain
    /// transition.
    pub fn successor(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::PickedUp => Some(OrderStatus::InTransit),
            OrderStatus::InTransit => Some(OrderStatus::Approaching),
            OrderStatus::Approaching => Some(OrderStatus::Completed),
            OrderStatus::Available | OrderStatus::Completed | OrderStatus::Cancelled => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Cancellation is only allowed before pickup is finalized.
    pub fn cancellable(self) -> bool {
        matches!(self, OrderStatus::Available | OrderStatus::PickedUp)
    }

    /// Position in the forward chain, used to tell a replayed transition
    /// (target at or behind the current position) from a genuinely illegal
    /// one. `Cancelled` has no position.
    pub fn forward_position(self) -> Option<u8> {
        match self {
            OrderStatus::Available => Some(0),
            OrderStatus::PickedUp => Some(1),
            OrderStatus::InTransit => Some(2),
            OrderStatus::Approaching => Some(3),
            OrderStatus::Completed => Some(4),
            OrderStatus::Cancelled => None,
        }
    }
}

/// Payment settles independently of delivery; it is the one field that may
/// still change after the order reaches a terminal delivery status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    /// Set exactly once, by the winning accept. `None` iff status is
    /// `Available`.
    pub driver_id: Option<Uuid>,
    pub status: OrderStatus,
    pub pickup: Place,
    pub dropoff: Place,
    /// Overwritten on every forward transition; absent while `Available`.
    pub driver_location: Option<GeoPoint>,
    pub price: f64,
    /// Commission rate snapshotted at completion so later admin changes do
    /// not retroactively alter historical payouts.
    pub commission_rate: Option<f64>,
    pub platform_commission: Option<f64>,
    pub driver_payout: Option<f64>,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub actual_pickup_time: Option<DateTime<Utc>>,
    pub actual_delivery_time: Option<DateTime<Utc>>,
}

impl Order {
    pub fn new(customer_id: Uuid, pickup: Place, dropoff: Place, price: f64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_id,
            driver_id: None,
            status: OrderStatus::Available,
            pickup,
            dropoff,
            driver_location: None,
            price,
            commission_rate: None,
            platform_commission: None,
            driver_payout: None,
            payment_status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
            actual_pickup_time: None,
            actual_delivery_time: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OrderStatus;

    #[test]
    fn forward_chain_has_single_successors() {
        assert_eq!(OrderStatus::PickedUp.successor(), Some(OrderStatus::InTransit));
        assert_eq!(OrderStatus::InTransit.successor(), Some(OrderStatus::Approaching));
        assert_eq!(OrderStatus::Approaching.successor(), Some(OrderStatus::Completed));
    }

    #[test]
    fn available_has_no_plain_successor() {
        // Claiming goes through assignment, not the transition engine.
        assert_eq!(OrderStatus::Available.successor(), None);
    }

    #[test]
    fn terminal_states_have_no_successor() {
        assert_eq!(OrderStatus::Completed.successor(), None);
        assert_eq!(OrderStatus::Cancelled.successor(), None);
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn cancellable_only_before_pickup_finalized() {
        assert!(OrderStatus::Available.cancellable());
        assert!(OrderStatus::PickedUp.cancellable());
        assert!(!OrderStatus::InTransit.cancellable());
        assert!(!OrderStatus::Approaching.cancellable());
        assert!(!OrderStatus::Completed.cancellable());
        assert!(!OrderStatus::Cancelled.cancellable());
    }
}
