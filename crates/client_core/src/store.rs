use std::{collections::HashMap, sync::Arc};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use shared::domain::{OrderNumber, OrderStatus};
use storage::Storage;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::state::{reduce, Action, OrderState, SessionParams};

/// Key the order snapshot is stored under.
pub const STATE_KEY: &str = "pimpMyCase_state";

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>>;
    async fn save(&self, key: &str, value: &str) -> Result<()>;
    async fn clear(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl SnapshotStore for Storage {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load_snapshot(key).await?.map(|snapshot| snapshot.value))
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        self.save_snapshot(key, value).await
    }

    async fn clear(&self, key: &str) -> Result<()> {
        self.delete_snapshot(key).await?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySnapshotStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn value(&self, key: &str) -> Option<String> {
        self.values.lock().await.get(key).cloned()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<()> {
        self.values.lock().await.remove(key);
        Ok(())
    }
}

/// Single source of truth for the in-progress order.
///
/// Dispatches are serialized: the state lock is held across the reduce and
/// the snapshot write, so the stored snapshot always matches the most recent
/// dispatch. A failed write leaves the in-memory state untouched.
pub struct AppStateStore {
    key: String,
    snapshots: Arc<dyn SnapshotStore>,
    state: Mutex<Arc<OrderState>>,
    events: broadcast::Sender<Arc<OrderState>>,
}

impl AppStateStore {
    pub fn new(snapshots: Arc<dyn SnapshotStore>) -> Arc<Self> {
        Self::with_key(snapshots, STATE_KEY)
    }

    pub fn with_key(snapshots: Arc<dyn SnapshotStore>, key: impl Into<String>) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            key: key.into(),
            snapshots,
            state: Mutex::new(Arc::new(OrderState::default())),
            events,
        })
    }

    /// Builds a store for the live session, then merges the saved snapshot.
    /// Session fields always come from `session`, never from the snapshot.
    pub async fn open(
        snapshots: Arc<dyn SnapshotStore>,
        key: impl Into<String>,
        session: SessionParams,
    ) -> Result<Arc<Self>> {
        let store = Self::with_key(snapshots, key);
        if !session.is_empty() {
            let live = reduce(&OrderState::default(), &Action::SetQrSession(session));
            *store.state.lock().await = Arc::new(live);
        }
        store.hydrate().await?;
        Ok(store)
    }

    /// Loads the saved snapshot, if any. Unreadable snapshots are logged and
    /// the state stays at its defaults.
    pub async fn hydrate(&self) -> Result<bool> {
        let Some(raw) = self
            .snapshots
            .load(&self.key)
            .await
            .with_context(|| format!("failed to read snapshot '{}'", self.key))?
        else {
            debug!(key = %self.key, "state: no saved snapshot");
            return Ok(false);
        };

        match OrderState::from_snapshot_json(&raw) {
            Ok(saved) => {
                self.dispatch(Action::LoadState(Box::new(saved))).await?;
                info!(key = %self.key, "state: restored saved snapshot");
                Ok(true)
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "state: discarding unreadable snapshot");
                Ok(false)
            }
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn snapshot(&self) -> Arc<OrderState> {
        self.state.lock().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<OrderState>> {
        self.events.subscribe()
    }

    pub async fn dispatch(&self, action: Action) -> Result<Arc<OrderState>> {
        let mut guard = self.state.lock().await;
        let next = reduce(&guard, &action);
        if next == **guard {
            debug!(action = action.kind(), "state: dispatch left state unchanged");
            return Ok(guard.clone());
        }

        let json = next
            .to_snapshot_json()
            .context("failed to serialize order snapshot")?;
        self.snapshots
            .save(&self.key, &json)
            .await
            .with_context(|| format!("failed to persist snapshot '{}'", self.key))?;

        let next = Arc::new(next);
        *guard = next.clone();
        drop(guard);

        debug!(action = action.kind(), status = %next.order_status, "state: applied");
        let _ = self.events.send(next.clone());
        Ok(next)
    }

    pub async fn reset_state(&self) -> Result<Arc<OrderState>> {
        info!("state: reset");
        self.dispatch(Action::ResetState).await
    }

    /// Moves a paid order into the print queue and issues its order number.
    pub async fn place_order(&self, queue_position: u32) -> Result<OrderNumber> {
        let status = self.snapshot().await.order_status;
        if status != OrderStatus::Payment {
            bail!("order is not awaiting payment (status={status})");
        }

        let order_number = issue_order_number();
        self.dispatch(Action::SetOrderStatus(OrderStatus::Queue))
            .await?;
        self.dispatch(Action::SetOrderNumber(Some(order_number.clone())))
            .await?;
        self.dispatch(Action::SetQueuePosition(Some(queue_position)))
            .await?;
        info!(
            order_number = %order_number,
            queue_position,
            "state: order placed"
        );
        Ok(order_number)
    }

    /// Position 0 means the order reached the printer.
    pub async fn update_queue_position(&self, position: u32) -> Result<Arc<OrderState>> {
        let state = self
            .dispatch(Action::SetQueuePosition(Some(position)))
            .await?;
        if position == 0 && state.order_status == OrderStatus::Queue {
            info!("state: order printing");
            return self
                .dispatch(Action::SetOrderStatus(OrderStatus::Printing))
                .await;
        }
        Ok(state)
    }

    pub async fn complete_order(&self) -> Result<Arc<OrderState>> {
        let status = self.snapshot().await.order_status;
        match status {
            OrderStatus::Completed => return Ok(self.snapshot().await),
            OrderStatus::Queue => {
                self.update_queue_position(0).await?;
            }
            OrderStatus::Printing => {}
            other => bail!("order cannot complete from status={other}"),
        }
        let state = self
            .dispatch(Action::SetOrderStatus(OrderStatus::Completed))
            .await?;
        info!(order_number = ?state.order_number, "state: order completed");
        Ok(state)
    }
}

fn issue_order_number() -> OrderNumber {
    let value = Uuid::new_v4().as_u128() % 9000 + 1000;
    OrderNumber::new(value.to_string())
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
