//! Snapshot bus backed by a tokio watch channel.

use std::sync::Arc;

use tokio::sync::watch;

use aqrobloom_domain::facility::FacilityState;

/// Latest-value broadcast of the facility snapshot.
///
/// Subscribers always see the most recent snapshot; intermediate ones may
/// be skipped. Publishing the same `Arc` again does not wake anybody.
pub struct SnapshotBus {
    sender: watch::Sender<Arc<FacilityState>>,
}

impl SnapshotBus {
    #[must_use]
    pub fn new(initial: Arc<FacilityState>) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    /// Subscribe to snapshot changes. The receiver starts out holding the
    /// current snapshot, marked as seen.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<FacilityState>> {
        self.sender.subscribe()
    }

    /// Publish `snapshot` unless it is the one already on the bus.
    /// Returns whether subscribers were notified.
    pub fn publish(&self, snapshot: Arc<FacilityState>) -> bool {
        self.sender.send_if_modified(|current| {
            if Arc::ptr_eq(current, &snapshot) {
                return false;
            }
            *current = snapshot;
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aqrobloom_domain::geometry::Point;
    use aqrobloom_domain::id::NodeId;

    fn moved(state: &FacilityState) -> Arc<FacilityState> {
        let mut next = state.clone();
        *next.position_mut(NodeId::Hub) = Point::new(1.0, 1.0);
        Arc::new(next)
    }

    #[tokio::test]
    async fn should_notify_subscriber_of_new_snapshot() {
        let initial = Arc::new(FacilityState::default());
        let bus = SnapshotBus::new(Arc::clone(&initial));
        let mut rx = bus.subscribe();

        let next = moved(&initial);
        assert!(bus.publish(Arc::clone(&next)));

        rx.changed().await.unwrap();
        assert!(Arc::ptr_eq(&rx.borrow_and_update(), &next));
    }

    #[tokio::test]
    async fn should_skip_republishing_same_snapshot() {
        let initial = Arc::new(FacilityState::default());
        let bus = SnapshotBus::new(Arc::clone(&initial));
        let rx = bus.subscribe();

        assert!(!bus.publish(Arc::clone(&initial)));
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn should_deliver_latest_to_late_subscriber() {
        let initial = Arc::new(FacilityState::default());
        let bus = SnapshotBus::new(Arc::clone(&initial));
        let next = moved(&initial);
        bus.publish(Arc::clone(&next));

        let rx = bus.subscribe();

        assert!(Arc::ptr_eq(&rx.borrow(), &next));
    }
}
