use std::{
    fmt,
    str::FromStr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Backend code used when nothing else is configured.
pub const DEFAULT_BACKEND_CODE: &str = "lnd";

/// Environment variable consulted by [`FacadeConfig::from_env`].
pub const IMPLEMENTATION_ENV: &str = "LN_FACADE_IMPLEMENTATION";

/// Errors raised while turning configuration into a backend selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("unknown backend implementation: {0:?}")]
    UnknownBackend(String),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// The closed set of node backends the facade can talk to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BackendKind {
    /// Full LND daemon over gRPC/REST.
    Lnd,
    /// LND reached through the Lightning Node Connect mailbox proxy.
    LightningNodeConnect,
    /// In-process embedded LND.
    EmbeddedLnd,
    /// Core Lightning over its REST plugin.
    ClnRest,
    /// Custodial LndHub HTTP wallet.
    LndHub,
    /// Nostr Wallet Connect relay protocol.
    NostrWalletConnect,
}

impl BackendKind {
    pub const ALL: [BackendKind; 6] = [
        BackendKind::Lnd,
        BackendKind::LightningNodeConnect,
        BackendKind::EmbeddedLnd,
        BackendKind::ClnRest,
        BackendKind::LndHub,
        BackendKind::NostrWalletConnect,
    ];

    /// Settings code for this backend.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            BackendKind::Lnd => "lnd",
            BackendKind::LightningNodeConnect => "lightning-node-connect",
            BackendKind::EmbeddedLnd => "embedded-lnd",
            BackendKind::ClnRest => "cln-rest",
            BackendKind::LndHub => "lndhub",
            BackendKind::NostrWalletConnect => "nwc",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        BackendKind::ALL
            .into_iter()
            .find(|kind| kind.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| ConfigurationError::UnknownBackend(s.to_string()))
    }
}

impl TryFrom<String> for BackendKind {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BackendKind> for String {
    fn from(kind: BackendKind) -> Self {
        kind.code().to_string()
    }
}

/// Shared handle to the process-wide backend selection.
///
/// Clones share the same underlying state. Every change bumps [`revision`](Self::revision) so
/// the resolver can tell that a cached backend instance is stale.
#[derive(Clone, Debug)]
pub struct NodeSettings {
    inner: Arc<SettingsInner>,
}

#[derive(Debug)]
struct SettingsInner {
    implementation: RwLock<String>,
    revision: AtomicU64,
}

impl NodeSettings {
    pub fn new(implementation: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(SettingsInner {
                implementation: RwLock::new(implementation.into()),
                revision: AtomicU64::new(0),
            }),
        }
    }

    /// Raw implementation code as stored in settings.
    #[must_use]
    pub fn implementation(&self) -> String {
        self.inner.implementation.read().clone()
    }

    /// Replace the implementation code. The revision is bumped even when the code is unchanged.
    pub fn set_implementation(&self, implementation: impl Into<String>) {
        let mut guard = self.inner.implementation.write();
        *guard = implementation.into();
        self.inner.revision.fetch_add(1, Ordering::AcqRel);
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.inner.revision.load(Ordering::Acquire)
    }

    /// Read the code and revision together under one lock.
    pub(crate) fn snapshot(&self) -> (String, u64) {
        let guard = self.inner.implementation.read();
        (guard.clone(), self.inner.revision.load(Ordering::Acquire))
    }

    /// Parse the current implementation code.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::UnknownBackend`] when the code names no supported backend.
    pub fn backend_kind(&self) -> Result<BackendKind, ConfigurationError> {
        self.implementation().parse()
    }
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_CODE)
    }
}

/// Serializable facade configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacadeConfig {
    /// Backend implementation code, e.g. `lnd` or `cln-rest`.
    pub implementation: String,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            implementation: DEFAULT_BACKEND_CODE.to_string(),
        }
    }
}

impl FacadeConfig {
    /// Parse configuration from a JSON document. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::Invalid`] when the document is not valid JSON.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(raw).map_err(|e| ConfigurationError::Invalid(e.to_string()))
    }

    /// Build configuration from [`IMPLEMENTATION_ENV`], falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var(IMPLEMENTATION_ENV) {
            Ok(v) if !v.trim().is_empty() => Self { implementation: v },
            _ => Self::default(),
        }
    }

    /// Check that the configured implementation names a supported backend.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::UnknownBackend`] for unsupported codes.
    pub fn validate(&self) -> Result<BackendKind, ConfigurationError> {
        self.implementation.parse()
    }

    #[must_use]
    pub fn into_settings(self) -> NodeSettings {
        NodeSettings::new(self.implementation)
    }
}
