use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events published by the service layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Client events
    ClientCreated(Uuid),
    ClientUpdated(Uuid),
    ClientDeleted(Uuid),

    // Product events
    ProductCreated(Uuid),
    ProductUpdated(Uuid),
    ProductDeleted(Uuid),
    ProductCostRecalculated {
        product_id: Uuid,
        cost_price: Decimal,
    },

    // Stock events
    StockMovementRecorded {
        movement_id: Uuid,
        product_id: Uuid,
        movement_type: String,
        quantity: Decimal,
    },
    LowStock {
        product_id: Uuid,
        current_stock: Decimal,
        min_stock: Decimal,
    },

    // Project events
    ProjectCreated(Uuid),
    ProjectStatusChanged {
        project_id: Uuid,
        old_status: String,
        new_status: String,
    },
    ProjectDeleted(Uuid),

    // Finance events
    TransactionRecorded(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drains the event channel, logging each event. Runs for the lifetime of
/// the process; exits when every sender is dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::LowStock {
                product_id,
                current_stock,
                min_stock,
            } => {
                warn!(
                    product_id = %product_id,
                    current_stock = %current_stock,
                    min_stock = %min_stock,
                    "Product at or below minimum stock"
                );
            }
            other => {
                info!(event = ?other, "Domain event");
            }
        }
    }
    info!("Event channel closed, stopping event processor");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        let id = Uuid::new_v4();

        sender.send(Event::ProductCreated(id)).await.unwrap();

        match rx.recv().await {
            Some(Event::ProductCreated(got)) => assert_eq!(got, id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_fails_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        assert!(sender.send(Event::ClientDeleted(Uuid::new_v4())).await.is_err());
    }
}
