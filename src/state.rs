use std::sync::RwLock;

use chrono::Utc;
use tokio::sync::broadcast;

use crate::models::event::OrderEvent;
use crate::models::order::{Order, OrderStatus};
use crate::observability::metrics::Metrics;
use crate::store::OrderStore;

/// Admin-configurable commission rate, in percent. The engine reads it
/// exactly once per order, at completion, and snapshots the value onto the
/// record.
pub struct CommissionSettings {
    rate_percent: RwLock<f64>,
}

impl CommissionSettings {
    pub fn new(rate_percent: f64) -> Self {
        Self {
            rate_percent: RwLock::new(rate_percent),
        }
    }

    pub fn current_rate(&self) -> f64 {
        *self.rate_percent.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_rate(&self, rate_percent: f64) {
        *self.rate_percent.write().unwrap_or_else(|e| e.into_inner()) = rate_percent;
    }
}

pub struct AppState {
    pub store: OrderStore,
    pub commission: CommissionSettings,
    pub order_events_tx: broadcast::Sender<OrderEvent>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(event_buffer_size: usize, default_commission_rate: f64) -> Self {
        let (order_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        Self {
            store: OrderStore::new(),
            commission: CommissionSettings::new(default_commission_rate),
            order_events_tx,
            metrics: Metrics::new(),
        }
    }

    /// Emits the notification-boundary event for a committed status change.
    /// Send failures (no subscriber, lagging buffer) are ignored; the
    /// transition has already been persisted and must not roll back.
    pub fn publish_transition(&self, previous_status: OrderStatus, order: &Order) {
        let _ = self.order_events_tx.send(OrderEvent {
            order_id: order.id,
            previous_status,
            new_status: order.status,
            driver_id: order.driver_id,
            customer_id: order.customer_id,
            occurred_at: Utc::now(),
        });
    }
}
