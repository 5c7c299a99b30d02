use std::{collections::HashMap, fmt, sync::Arc};

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::{
    backend::Backend,
    config::{BackendKind, ConfigurationError, NodeSettings},
};

/// Constructor for a backend instance. Must not perform network I/O; connection setup belongs
/// to the backend's first call. Factories run without resolver locks held, so they may call
/// back into the resolver (but a nested `resolve` of the same kind will build again).
pub type BackendFactory = Arc<dyn Fn() -> Option<Arc<dyn Backend>> + Send + Sync>;

struct Cached {
    kind: BackendKind,
    revision: u64,
    backend: Arc<dyn Backend>,
}

/// Resolves the configured backend kind to a shared backend instance.
///
/// The instance is cached until the settings revision changes or [`invalidate`](Self::invalidate)
/// is called. Callers receive their own `Arc`, so replacing the cache never disturbs a call
/// already running against the previous instance.
pub struct BackendResolver {
    settings: NodeSettings,
    factories: RwLock<HashMap<BackendKind, BackendFactory>>,
    cached: Mutex<Option<Cached>>,
}

impl BackendResolver {
    pub fn new(settings: NodeSettings) -> Self {
        Self {
            settings,
            factories: RwLock::new(HashMap::new()),
            cached: Mutex::new(None),
        }
    }

    /// Register the constructor used for `kind`, replacing any previous one.
    ///
    /// A cached instance of the same kind is dropped so the next resolve uses the new factory.
    pub fn register<F>(&self, kind: BackendKind, factory: F)
    where
        F: Fn() -> Option<Arc<dyn Backend>> + Send + Sync + 'static,
    {
        self.factories.write().insert(kind, Arc::new(factory));
        let mut cached = self.cached.lock();
        if cached.as_ref().is_some_and(|c| c.kind == kind) {
            *cached = None;
        }
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with_backend<F>(self, kind: BackendKind, factory: F) -> Self
    where
        F: Fn() -> Option<Arc<dyn Backend>> + Send + Sync + 'static,
    {
        self.register(kind, factory);
        self
    }

    /// Settings handle this resolver reads from.
    pub fn settings(&self) -> &NodeSettings {
        &self.settings
    }

    /// Switch the active backend and drop the cached instance.
    pub fn set_backend(&self, implementation: impl Into<String>) {
        self.settings.set_implementation(implementation);
        self.invalidate();
    }

    /// Drop the cached instance; the next [`resolve`](Self::resolve) builds a fresh one.
    pub fn invalidate(&self) {
        *self.cached.lock() = None;
    }

    /// Resolve the backend for the current settings.
    ///
    /// Returns `Ok(None)` when the kind is known but no usable backend is registered for it.
    ///
    /// # Errors
    /// Returns [`ConfigurationError`] when the configured code names no supported backend.
    pub fn resolve(&self) -> Result<Option<Arc<dyn Backend>>, ConfigurationError> {
        let (code, revision) = self.settings.snapshot();
        let kind: BackendKind = code.parse()?;

        if let Some(hit) = self.cached_for(kind, revision) {
            return Ok(Some(hit));
        }

        // Built without holding the cache lock so a factory may call back into the resolver.
        let factory = self.factories.read().get(&kind).cloned();
        let backend = factory.and_then(|f| f());

        let mut cached = self.cached.lock();
        if let Some(c) = cached.as_ref() {
            if c.kind == kind && c.revision == revision {
                // A concurrent resolve won the race; keep a single shared instance.
                return Ok(Some(Arc::clone(&c.backend)));
            }
        }
        match &backend {
            Some(b) => {
                debug!(
                    target: "ln_facade::resolver",
                    %kind,
                    revision,
                    name = b.name(),
                    "backend resolved"
                );
                *cached = Some(Cached {
                    kind,
                    revision,
                    backend: Arc::clone(b),
                });
            }
            None => {
                debug!(target: "ln_facade::resolver", %kind, "no backend registered");
                *cached = None;
            }
        }
        Ok(backend)
    }

    fn cached_for(&self, kind: BackendKind, revision: u64) -> Option<Arc<dyn Backend>> {
        self.cached
            .lock()
            .as_ref()
            .filter(|c| c.kind == kind && c.revision == revision)
            .map(|c| Arc::clone(&c.backend))
    }
}

impl fmt::Debug for BackendResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<BackendKind> = self.factories.read().keys().copied().collect();
        f.debug_struct("BackendResolver")
            .field("settings", &self.settings)
            .field("registered", &kinds)
            .field("cached", &self.cached.lock().as_ref().map(|c| c.kind))
            .finish()
    }
}
