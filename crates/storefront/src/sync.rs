//! Background reconciliation of local cart mutations with the backend.
//!
//! A cart mutation is applied locally first and always succeeds. The matching
//! [`SyncCommand`] is then spawned onto the ambient Tokio runtime and the
//! caller gets a [`PendingSync`] back, which it may await or drop. Every
//! dispatched command's [`SyncOutcome`] is also published as a [`SyncEvent`]
//! to subscribers.
//!
//! Local state is never rolled back on failure. There is no retry and no
//! ordering between commands: two rapid adds may reach the backend in either
//! order. Each command carries its own idempotency key so a backend that
//! honours `Idempotency-Key` can drop duplicate deliveries.

use brimline_core::ProductId;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::{ApiClient, ApiError};

/// Buffered events per subscriber before the slowest one starts lagging.
const EVENT_CAPACITY: usize = 64;

/// A cart mutation to mirror on the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCommand {
    AddItem {
        product_id: ProductId,
        quantity: u32,
        idempotency_key: Uuid,
    },
    RemoveItem {
        product_id: ProductId,
        idempotency_key: Uuid,
    },
    Clear {
        idempotency_key: Uuid,
    },
}

impl SyncCommand {
    /// Mirror an addition, with a fresh idempotency key.
    #[must_use]
    pub fn add_item(product_id: ProductId, quantity: u32) -> Self {
        Self::AddItem {
            product_id,
            quantity,
            idempotency_key: Uuid::new_v4(),
        }
    }

    /// Mirror a removal, with a fresh idempotency key.
    #[must_use]
    pub fn remove_item(product_id: ProductId) -> Self {
        Self::RemoveItem {
            product_id,
            idempotency_key: Uuid::new_v4(),
        }
    }

    /// Mirror a cart clear, with a fresh idempotency key.
    #[must_use]
    pub fn clear() -> Self {
        Self::Clear {
            idempotency_key: Uuid::new_v4(),
        }
    }

    #[must_use]
    pub const fn idempotency_key(&self) -> Uuid {
        match self {
            Self::AddItem {
                idempotency_key, ..
            }
            | Self::RemoveItem {
                idempotency_key, ..
            }
            | Self::Clear { idempotency_key } => *idempotency_key,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::AddItem { .. } => "add_item",
            Self::RemoveItem { .. } => "remove_item",
            Self::Clear { .. } => "clear",
        }
    }

    async fn send(&self, api: &ApiClient) -> Result<(), ApiError> {
        match self {
            Self::AddItem {
                product_id,
                quantity,
                idempotency_key,
            } => {
                api.add_cart_item(product_id, *quantity, *idempotency_key)
                    .await
            }
            Self::RemoveItem {
                product_id,
                idempotency_key,
            } => api.remove_cart_item(product_id, *idempotency_key).await,
            Self::Clear { idempotency_key } => api.clear_cart(*idempotency_key).await,
        }
    }
}

/// How a mirror attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The backend accepted the command.
    Synced,
    /// The backend call failed; the message is for display only.
    Failed(String),
    /// No Tokio runtime was available, so nothing was sent.
    Skipped,
    /// The mutation has no server counterpart (e.g. quantity updates).
    LocalOnly,
}

impl SyncOutcome {
    #[must_use]
    pub const fn is_synced(&self) -> bool {
        matches!(self, Self::Synced)
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// A finished command, as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEvent {
    pub command: SyncCommand,
    pub outcome: SyncOutcome,
}

/// Handle to a mirror attempt. Dropping it leaves the attempt running.
#[derive(Debug)]
#[must_use = "await `outcome()` or drop the handle to fire and forget"]
pub struct PendingSync {
    state: Pending,
}

#[derive(Debug)]
enum Pending {
    Ready(SyncOutcome),
    Running(JoinHandle<SyncOutcome>),
}

impl PendingSync {
    /// A mutation that is not mirrored.
    pub const fn local() -> Self {
        Self::ready(SyncOutcome::LocalOnly)
    }

    const fn ready(outcome: SyncOutcome) -> Self {
        Self {
            state: Pending::Ready(outcome),
        }
    }

    /// Whether the outcome is already known.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        match &self.state {
            Pending::Ready(_) => true,
            Pending::Running(handle) => handle.is_finished(),
        }
    }

    /// Wait for the backend call to settle.
    pub async fn outcome(self) -> SyncOutcome {
        match self.state {
            Pending::Ready(outcome) => outcome,
            Pending::Running(handle) => handle
                .await
                .unwrap_or_else(|e| SyncOutcome::Failed(format!("sync task aborted: {e}"))),
        }
    }
}

/// Spawns [`SyncCommand`]s and publishes their outcomes.
#[derive(Debug, Clone)]
pub struct SyncDispatcher {
    api: ApiClient,
    events: broadcast::Sender<SyncEvent>,
}

impl SyncDispatcher {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { api, events }
    }

    /// Receive every outcome dispatched after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Spawn `command` on the current runtime.
    ///
    /// Outside a runtime the command is not sent and the outcome is
    /// [`SyncOutcome::Skipped`].
    pub fn dispatch(&self, command: SyncCommand) -> PendingSync {
        let Ok(runtime) = Handle::try_current() else {
            warn!(command = command.label(), "No async runtime; cart change not mirrored");
            publish(&self.events, command, SyncOutcome::Skipped);
            return PendingSync::ready(SyncOutcome::Skipped);
        };

        let api = self.api.clone();
        let events = self.events.clone();
        let handle = runtime.spawn(async move {
            let outcome = match command.send(&api).await {
                Ok(()) => {
                    debug!(
                        command = command.label(),
                        idempotency_key = %command.idempotency_key(),
                        "Cart change mirrored"
                    );
                    SyncOutcome::Synced
                }
                Err(e) => {
                    warn!(
                        command = command.label(),
                        idempotency_key = %command.idempotency_key(),
                        error = %e,
                        "Failed to sync cart with server"
                    );
                    SyncOutcome::Failed(e.to_string())
                }
            };
            publish(&events, command, outcome.clone());
            outcome
        });

        PendingSync {
            state: Pending::Running(handle),
        }
    }
}

fn publish(events: &broadcast::Sender<SyncEvent>, command: SyncCommand, outcome: SyncOutcome) {
    // No subscribers is the common case
    let _ = events.send(SyncEvent { command, outcome });
}
