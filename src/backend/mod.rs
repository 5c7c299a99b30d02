//! Capability surface implemented by concrete node backends.
//!
//! Every backend implements [`Backend`]. Optional operations live in their own small traits
//! ([`ListPeers`], [`DisconnectPeer`]); a backend advertises one by overriding the matching
//! `as_*` accessor, which otherwise reports the capability as absent.

use std::{borrow::Cow, error::Error, fmt, future::Future, pin::Pin};

use async_trait::async_trait;

use crate::{config::BackendKind, peer::Peer};

type BoxError = Box<dyn Error + Send + Sync>;

/// Boxed, sendable future returned by capability calls.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Failure reported by a concrete backend call.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The node understood the request and refused it.
    #[error("{context}")]
    Rejected { context: Cow<'static, str> },
    /// Network, authentication or transport failure.
    #[error("{context}")]
    Operation {
        context: Cow<'static, str>,
        #[source]
        source: Option<BoxError>,
    },
}

impl BackendError {
    /// Build an operation error with context and an underlying source.
    pub fn operation<S, E>(context: S, source: E) -> Self
    where
        S: Into<Cow<'static, str>>,
        E: Error + Send + Sync + 'static,
    {
        Self::Operation {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Build an operation error that only has context.
    pub fn operation_message<S>(context: S) -> Self
    where
        S: Into<Cow<'static, str>>,
    {
        Self::Operation {
            context: context.into(),
            source: None,
        }
    }

    /// Build a protocol-level rejection.
    pub fn rejected<S>(context: S) -> Self
    where
        S: Into<Cow<'static, str>>,
    {
        Self::Rejected {
            context: context.into(),
        }
    }
}

/// Names of the optional operations a backend may expose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    ListPeers,
    DisconnectPeer,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::ListPeers => write!(f, "listPeers"),
            Capability::DisconnectPeer => write!(f, "disconnectPeer"),
        }
    }
}

/// List the peers currently connected to the node.
#[async_trait]
pub trait ListPeers: Send + Sync {
    /// Peers in the order the node reports them.
    async fn list_peers(&self) -> Result<Vec<Peer>, BackendError>;
}

/// Drop the connection to a peer.
#[async_trait]
pub trait DisconnectPeer: Send + Sync {
    /// Disconnect the peer identified by `pub_key`. `Ok(false)` means the node declined.
    async fn disconnect_peer(&self, pub_key: &str) -> Result<bool, BackendError>;
}

/// A concrete integration with one node-control protocol.
pub trait Backend: Send + Sync {
    /// Which backend family this instance belongs to.
    fn kind(&self) -> BackendKind;

    /// Human-readable name for logs and diagnostics.
    fn name(&self) -> &str {
        self.kind().code()
    }

    /// Peer listing, if this backend has a notion of connected peers.
    fn as_list_peers(&self) -> Option<&dyn ListPeers> {
        None
    }

    /// Peer disconnection, if supported.
    fn as_disconnect_peer(&self) -> Option<&dyn DisconnectPeer> {
        None
    }

    /// Whether `capability` is available on this instance.
    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::ListPeers => self.as_list_peers().is_some(),
            Capability::DisconnectPeer => self.as_disconnect_peer().is_some(),
        }
    }
}
