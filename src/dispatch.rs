use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    backend::{Backend, BackendError, BoxFuture, Capability},
    config::ConfigurationError,
    peer::Peer,
    resolver::BackendResolver,
};

/// Error surfaced by dispatcher read operations.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Result alias that defaults to [`DispatchError`].
pub type Result<T, E = DispatchError> = std::result::Result<T, E>;

/// How a disconnect attempt ended.
#[derive(Debug)]
pub enum DisconnectOutcome {
    /// The backend confirmed the disconnect.
    Disconnected,
    /// The backend completed the call but reported failure.
    Declined,
    /// No backend, or the backend has no disconnect operation.
    Unsupported,
    /// Resolution or the backend call failed.
    Failed(DispatchError),
}

impl DisconnectOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, DisconnectOutcome::Disconnected)
    }

    /// The underlying failure, if the attempt errored.
    #[must_use]
    pub fn error(&self) -> Option<&DispatchError> {
        match self {
            DisconnectOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Uniform entry points over whichever backend is currently configured.
///
/// Each operation resolves the backend, checks that it offers the capability, and normalizes
/// the result. Missing capabilities never error: they yield the operation's empty default.
/// Read operations propagate backend failures; command operations report a boolean.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    resolver: Arc<BackendResolver>,
}

impl Dispatcher {
    pub fn new(resolver: Arc<BackendResolver>) -> Self {
        Self { resolver }
    }

    /// Invoke an optional backend operation.
    ///
    /// `invoke` selects the capability from the resolved backend and starts the call, returning
    /// `None` when the backend lacks it. Without a backend or without the capability the result
    /// is `default` and a diagnostic is emitted; a backend failure is returned unchanged.
    ///
    /// # Errors
    /// Returns [`DispatchError::Configuration`] when the configured backend code is unknown and
    /// [`DispatchError::Backend`] when the backend call fails.
    pub async fn with_capability<T, F>(
        &self,
        capability: Capability,
        default: T,
        invoke: F,
    ) -> Result<T>
    where
        F: for<'a> FnOnce(&'a dyn Backend) -> Option<BoxFuture<'a, Result<T, BackendError>>>,
    {
        let Some(backend) = self.resolver.resolve()? else {
            debug!(target: "ln_facade::dispatch", "backend does not support {capability}");
            return Ok(default);
        };
        let result = match invoke(backend.as_ref()) {
            Some(call) => Ok(call.await?),
            None => {
                debug!(
                    target: "ln_facade::dispatch",
                    backend = backend.name(),
                    "backend does not support {capability}"
                );
                Ok(default)
            }
        };
        result
    }

    /// List the peers of the active backend, in backend order.
    ///
    /// Returns an empty list when the backend cannot list peers.
    ///
    /// # Errors
    /// Returns the backend's own error unchanged when the call fails, or a configuration error
    /// when the backend cannot be resolved.
    pub async fn list_peers(&self) -> Result<Vec<Peer>> {
        let peers = self
            .with_capability(Capability::ListPeers, Vec::new(), |backend| {
                backend.as_list_peers().map(|lister| lister.list_peers())
            })
            .await?;
        debug!(target: "ln_facade::dispatch", count = peers.len(), "listPeers complete");
        Ok(peers)
    }

    /// Disconnect `pub_key`, returning `true` only when the backend confirms it.
    ///
    /// Never fails: errors are logged and reported as `false`.
    pub async fn disconnect_peer(&self, pub_key: &str) -> bool {
        self.disconnect_peer_outcome(pub_key).await.is_success()
    }

    /// Like [`disconnect_peer`](Self::disconnect_peer) but keeps the reason for a failure.
    pub async fn disconnect_peer_outcome(&self, pub_key: &str) -> DisconnectOutcome {
        let key = pub_key.to_string();
        let result = self
            .with_capability(Capability::DisconnectPeer, None, move |backend| {
                let disconnector = backend.as_disconnect_peer()?;
                let call: BoxFuture<'_, Result<Option<bool>, BackendError>> =
                    Box::pin(async move { disconnector.disconnect_peer(&key).await.map(Some) });
                Some(call)
            })
            .await;
        match result {
            Ok(Some(true)) => {
                debug!(target: "ln_facade::dispatch", %pub_key, "peer disconnected");
                DisconnectOutcome::Disconnected
            }
            Ok(Some(false)) => {
                debug!(target: "ln_facade::dispatch", %pub_key, "backend declined disconnect");
                DisconnectOutcome::Declined
            }
            Ok(None) => DisconnectOutcome::Unsupported,
            Err(e) => {
                warn!(
                    target: "ln_facade::dispatch",
                    %pub_key,
                    error = %e,
                    "Error disconnecting peer"
                );
                DisconnectOutcome::Failed(e)
            }
        }
    }
}
