#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use ln_facade::backend::{Backend, BackendError, DisconnectPeer, ListPeers};
use ln_facade::{BackendKind, BackendResolver, Dispatcher, NodeSettings, Peer, PeersStore};
use parking_lot::Mutex;
use tokio::sync::Notify;

pub const FULL_NODE_PUBKEY: &str =
    "03e84a109cd70e57864274932fc87c5e6434c59ebb8e6e7d28532219ba38f7f6df";

pub fn full_node_peer() -> Peer {
    serde_json::from_value(serde_json::json!({
        "pub_key": FULL_NODE_PUBKEY,
        "address": "139.144.22.237:9735",
        "bytes_recv": "337874",
        "bytes_sent": "1708",
        "inbound": false,
        "ping_time": "-1",
        "sat_recv": "0",
        "sat_sent": "0",
        "sync_type": "1"
    }))
    .expect("peer fixture")
}

pub fn peers(keys: &[&str]) -> Vec<Peer> {
    keys.iter().map(|k| Peer::with_pub_key(*k)).collect()
}

#[derive(Clone)]
pub enum ListBehavior {
    Peers(Vec<Peer>),
    Fail(&'static str),
}

#[derive(Clone)]
pub enum DisconnectBehavior {
    Returns(bool),
    Fail(&'static str),
}

/// Scriptable backend. Capabilities are present only when a behavior is configured.
pub struct MockBackend {
    kind: BackendKind,
    list: Option<Mutex<ListBehavior>>,
    disconnect: Option<Mutex<DisconnectBehavior>>,
    gate: Option<Arc<Notify>>,
    pub list_calls: Mutex<usize>,
    pub disconnect_calls: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            list: None,
            disconnect: None,
            gate: None,
            list_calls: Mutex::new(0),
            disconnect_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn listing(mut self, behavior: ListBehavior) -> Self {
        self.list = Some(Mutex::new(behavior));
        self
    }

    pub fn disconnecting(mut self, behavior: DisconnectBehavior) -> Self {
        self.disconnect = Some(Mutex::new(behavior));
        self
    }

    /// Block every backend call until the gate is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn set_list(&self, behavior: ListBehavior) {
        if let Some(list) = &self.list {
            *list.lock() = behavior;
        }
    }

    async fn wait_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl ListPeers for MockBackend {
    async fn list_peers(&self) -> Result<Vec<Peer>, BackendError> {
        *self.list_calls.lock() += 1;
        self.wait_gate().await;
        let behavior = self
            .list
            .as_ref()
            .map(|l| l.lock().clone())
            .unwrap_or(ListBehavior::Peers(Vec::new()));
        match behavior {
            ListBehavior::Peers(peers) => Ok(peers),
            ListBehavior::Fail(msg) => Err(BackendError::operation_message(msg)),
        }
    }
}

#[async_trait]
impl DisconnectPeer for MockBackend {
    async fn disconnect_peer(&self, pub_key: &str) -> Result<bool, BackendError> {
        self.disconnect_calls.lock().push(pub_key.to_string());
        self.wait_gate().await;
        let behavior = self
            .disconnect
            .as_ref()
            .map(|d| d.lock().clone())
            .unwrap_or(DisconnectBehavior::Returns(false));
        match behavior {
            DisconnectBehavior::Returns(ok) => Ok(ok),
            DisconnectBehavior::Fail(msg) => Err(BackendError::rejected(msg)),
        }
    }
}

impl Backend for MockBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn as_list_peers(&self) -> Option<&dyn ListPeers> {
        self.list.as_ref().map(|_| self as &dyn ListPeers)
    }

    fn as_disconnect_peer(&self) -> Option<&dyn DisconnectPeer> {
        self.disconnect.as_ref().map(|_| self as &dyn DisconnectPeer)
    }
}

pub fn resolver_for(backend: Arc<MockBackend>) -> Arc<BackendResolver> {
    let kind = backend.kind();
    let resolver = BackendResolver::new(NodeSettings::new(kind.code()))
        .with_backend(kind, move || Some(Arc::clone(&backend) as Arc<dyn Backend>));
    Arc::new(resolver)
}

pub fn dispatcher_for(backend: Arc<MockBackend>) -> Dispatcher {
    Dispatcher::new(resolver_for(backend))
}

pub fn store_for(backend: Arc<MockBackend>) -> PeersStore {
    PeersStore::new(dispatcher_for(backend))
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
