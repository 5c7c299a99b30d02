use std::sync::Arc;

use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
};
use tracing::debug;

use crate::{
    dispatch::{DisconnectOutcome, Dispatcher},
    peer::Peer,
};

/// Message used when a fetch fails without a usable description.
pub const FETCH_FAILED: &str = "Failed to fetch peers";
/// Message used when a disconnect fails without a usable description.
pub const DISCONNECT_FAILED: &str = "Failed to disconnect peer";

/// Observable peer view state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PeersState {
    /// Peers in backend order.
    pub peers: Vec<Peer>,
    /// `true` while a fetch or disconnect is in flight.
    pub loading: bool,
    /// Message from the last failed operation, cleared when a new one starts.
    pub error: Option<String>,
}

/// Peer state container driven through the [`Dispatcher`].
///
/// Commands are serialized by an internal guard, and every state change is published as one
/// `watch` update, so subscribers only ever see whole before/after states.
#[derive(Debug)]
pub struct PeersStore {
    dispatcher: Dispatcher,
    state: watch::Sender<PeersState>,
    op: Mutex<()>,
}

impl PeersStore {
    pub fn new(dispatcher: Dispatcher) -> Self {
        let (state, _) = watch::channel(PeersState::default());
        Self {
            dispatcher,
            state,
            op: Mutex::new(()),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> PeersState {
        self.state.borrow().clone()
    }

    /// Receive every published state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PeersState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn peers(&self) -> Vec<Peer> {
        self.state.borrow().peers.clone()
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Reload peers from the backend.
    ///
    /// On failure the previous peers are kept and `error` holds the reason.
    pub async fn fetch_peers(&self) {
        let _op = self.op.lock().await;
        let loading = self.begin();

        match self.dispatcher.list_peers().await {
            Ok(peers) => {
                debug!(target: "ln_facade::store", count = peers.len(), "peers fetched");
                loading.finish(|s| {
                    s.peers = peers;
                    s.error = None;
                });
            }
            Err(e) => {
                let message = describe(&e.to_string(), FETCH_FAILED);
                debug!(target: "ln_facade::store", error = %message, "fetch peers failed");
                loading.finish(|s| s.error = Some(message));
            }
        }
    }

    /// Fire-and-forget [`fetch_peers`](Self::fetch_peers); observe the result via
    /// [`subscribe`](Self::subscribe).
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_fetch(self: &Arc<Self>) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move { store.fetch_peers().await })
    }

    /// Disconnect `pub_key` and drop it from the peer list on success.
    ///
    /// Returns whether the disconnect worked; on failure `error` is also set.
    pub async fn disconnect_peer(&self, pub_key: &str) -> bool {
        let _op = self.op.lock().await;
        let loading = self.begin();

        let outcome = self.dispatcher.disconnect_peer_outcome(pub_key).await;
        if outcome.is_success() {
            loading.finish(|s| {
                s.peers.retain(|p| p.pub_key != pub_key);
                s.error = None;
            });
            return true;
        }

        let message = match &outcome {
            DisconnectOutcome::Failed(e) => describe(&e.to_string(), DISCONNECT_FAILED),
            _ => DISCONNECT_FAILED.to_string(),
        };
        debug!(target: "ln_facade::store", %pub_key, error = %message, "disconnect peer failed");
        loading.finish(|s| s.error = Some(message));
        false
    }

    fn begin(&self) -> LoadingGuard<'_> {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        LoadingGuard {
            state: &self.state,
            armed: true,
        }
    }
}

/// Clears `loading` if a command is dropped before it publishes its outcome.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<PeersState>,
    armed: bool,
}

impl LoadingGuard<'_> {
    /// Publish the final state of a command together with `loading = false`.
    fn finish(mut self, apply: impl FnOnce(&mut PeersState)) {
        self.armed = false;
        self.state.send_modify(|s| {
            apply(s);
            s.loading = false;
        });
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!(target: "ln_facade::store", "command cancelled before completion");
            self.state.send_modify(|s| s.loading = false);
        }
    }
}

fn describe(message: &str, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::describe;

    #[test]
    fn blank_messages_fall_back() {
        assert_eq!(describe("", "fallback"), "fallback");
        assert_eq!(describe("  ", "fallback"), "fallback");
        assert_eq!(describe("Backend error", "fallback"), "Backend error");
    }
}
