use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::order::OrderStatus;

/// Emitted after every committed status change for the notification
/// boundary. Delivery is best-effort: a dropped event never rolls back the
/// change it describes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    pub order_id: Uuid,
    pub previous_status: OrderStatus,
    pub new_status: OrderStatus,
    pub driver_id: Option<Uuid>,
    pub customer_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}
