#![deny(unsafe_code)]

//! Backend-agnostic control facade for Lightning node-management clients.
//!
//! A client talks to exactly one node backend at a time (LND, LNC, embedded LND, CLN REST,
//! LndHub or Nostr Wallet Connect), chosen by a settings value that can change at runtime.
//! This crate resolves that setting into a backend instance ([`BackendResolver`]), invokes
//! optional per-backend operations through one contract ([`Dispatcher`]), and keeps observable
//! peer state for presentation code ([`PeersStore`]).
//!
//! Backends opt into operations by implementing the capability traits in [`backend`] and
//! overriding the matching accessor on [`Backend`]. Unsupported operations return an empty
//! default instead of failing.
//!
//! Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use ln_facade::backend::{Backend, BackendError, ListPeers};
//! use ln_facade::{BackendKind, BackendResolver, Dispatcher, NodeSettings, Peer, PeersStore};
//!
//! struct MyLnd;
//!
//! #[async_trait]
//! impl ListPeers for MyLnd {
//!     async fn list_peers(&self) -> Result<Vec<Peer>, BackendError> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! impl Backend for MyLnd {
//!     fn kind(&self) -> BackendKind {
//!         BackendKind::Lnd
//!     }
//!     fn as_list_peers(&self) -> Option<&dyn ListPeers> {
//!         Some(self)
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let resolver = BackendResolver::new(NodeSettings::new("lnd"))
//!     .with_backend(BackendKind::Lnd, || Some(Arc::new(MyLnd) as Arc<dyn Backend>));
//! let store = PeersStore::new(Dispatcher::new(Arc::new(resolver)));
//! store.fetch_peers().await;
//! println!("{:?}", store.state());
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod dispatch;
pub mod peer;
pub mod resolver;
pub mod store;

pub use backend::{Backend, BackendError, Capability};
pub use config::{BackendKind, ConfigurationError, FacadeConfig, NodeSettings};
pub use dispatch::{DisconnectOutcome, DispatchError, Dispatcher, Result};
pub use peer::Peer;
pub use resolver::BackendResolver;
pub use store::{PeersState, PeersStore};
