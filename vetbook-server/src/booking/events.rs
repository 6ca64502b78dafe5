//! Domain Events
//!
//! 预约引擎只发布事件，不执行任何 I/O 副作用。外部协作方
//! (合同生成器、通知服务) 自行订阅；滞后的订阅者不会阻塞引擎。

use serde::Serialize;
use tokio::sync::broadcast;

use crate::db::models::ReservationStatus;

use super::verification::DocumentSubject;

/// Events emitted by the booking engine
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    ReservationCreated {
        reservation_id: String,
        boarding: bool,
        status: ReservationStatus,
    },
    ReservationStatusChanged {
        reservation_id: String,
        from: ReservationStatus,
        to: ReservationStatus,
    },
    ReceiptReviewed {
        reservation_id: String,
        approved: bool,
        status: ReservationStatus,
    },
    DocumentReviewed {
        reservation_id: String,
        subject: DocumentSubject,
        approved: bool,
        status: ReservationStatus,
    },
    ReservationUpdated {
        reservation_id: String,
    },
    ReservationDeleted {
        reservation_id: String,
    },
    /// A boarding reservation was created; the external contract
    /// generator renders the boarding agreement from it
    ContractRequested {
        reservation_id: String,
    },
}

/// Fire-and-forget broadcast channel for [`DomainEvent`]
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event. Delivery is best-effort: with no subscribers the
    /// event is dropped silently.
    pub fn publish(&self, event: DomainEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!(target: "events", "No subscribers for domain event");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_reach_subscribers() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        bus.publish(DomainEvent::ReservationDeleted {
            reservation_id: "reservation:x".into(),
        });
        match rx.recv().await.unwrap() {
            DomainEvent::ReservationDeleted { reservation_id } => {
                assert_eq!(reservation_id, "reservation:x");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = EventBus::new(8);
        bus.publish(DomainEvent::ReservationDeleted {
            reservation_id: "reservation:x".into(),
        });
    }
}
