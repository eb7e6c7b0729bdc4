//! Bootstrap and the process-wide texture application facade
//!
//! Bootstrap runs once, early, before any mutation traffic: the builder
//! assembles the registry (built-in patches most-specific first), selects
//! the first patch matching the host version, and freezes the result into a
//! [`TextureApplier`]. Selection is never retried. After that point the
//! applier is shared by reference into every mutation entry point; there is
//! no ambient global state.

use crate::error::BootstrapError;
use crate::host::{HeadBlock, HeadItem, ProfileFactory};
use crate::patch::VersionPatch;
use crate::patches::{LegacyScanPatch, OwnerProfilePatch, ResolvableProfilePatch};
use crate::registry::PatchRegistry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

type WarningSink = Box<dyn Fn(&str) + Send + Sync>;

/// Builder for [`TextureApplier`]
///
/// `version` and `factory` are required; everything else has defaults.
///
/// # Examples
///
/// ```rust
/// use headpatch::sim::{SimCapabilities, SimFactory};
/// use headpatch::TextureApplier;
/// use std::sync::Arc;
///
/// # fn main() -> Result<(), headpatch::BootstrapError> {
/// let applier = TextureApplier::builder()
///     .version("1.21.9-R0.1-SNAPSHOT")
///     .factory(Arc::new(SimFactory::new(SimCapabilities::modern())))
///     .build()?;
/// assert!(applier.ready());
/// # Ok(())
/// # }
/// ```
pub struct ApplierBuilder {
    version: Option<String>,
    factory: Option<Arc<dyn ProfileFactory>>,
    warning_sink: Option<WarningSink>,
    custom: Vec<Arc<dyn VersionPatch>>,
}

impl ApplierBuilder {
    pub fn new() -> Self {
        ApplierBuilder {
            version: None,
            factory: None,
            warning_sink: None,
            custom: Vec::new(),
        }
    }

    /// Host version string, supplied once at startup.
    pub fn version<S: Into<String>>(mut self, version: S) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Host-adapter profile factory.
    pub fn factory(mut self, factory: Arc<dyn ProfileFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Sink for the one-shot "no compatible patch" warning. Defaults to
    /// `tracing::warn!`.
    pub fn warning_sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.warning_sink = Some(Box::new(sink));
        self
    }

    /// Register a custom patch ahead of the built-in set, so it wins ties
    /// against them.
    pub fn with_patch(mut self, patch: Arc<dyn VersionPatch>) -> Self {
        self.custom.push(patch);
        self
    }

    /// Assemble the registry, run selection once, and freeze the applier.
    pub fn build(self) -> Result<TextureApplier, BootstrapError> {
        let version = self.version.ok_or(BootstrapError::MissingField("version"))?;
        let factory = self.factory.ok_or(BootstrapError::MissingField("factory"))?;

        let mut registry = PatchRegistry::new();
        for patch in self.custom {
            registry.register(patch);
        }
        // Built-ins, most specific version range first
        registry.register(Arc::new(OwnerProfilePatch::new(factory.clone())));
        registry.register(Arc::new(ResolvableProfilePatch::new(factory.clone())));
        registry.register(Arc::new(LegacyScanPatch::new(factory)));

        let active = registry.select(&version);
        match &active {
            Some(patch) => info!("selected version patch '{}' for host {}", patch.name(), version),
            None => debug!("no version patch matched host {}", version),
        }

        Ok(TextureApplier {
            version,
            registry,
            active,
            warned: AtomicBool::new(false),
            warning_sink: self
                .warning_sink
                .unwrap_or_else(|| Box::new(|message: &str| warn!("{message}"))),
        })
    }
}

impl Default for ApplierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide delegate forwarding mutation calls to the selected patch.
///
/// The public surface is total: `item` and `block` always return, never
/// raise. When no patch matched the host version, every mutation call is a
/// no-op and the first one emits a single warning through the configured
/// sink; nothing is logged per call after that.
pub struct TextureApplier {
    version: String,
    registry: PatchRegistry,
    active: Option<Arc<dyn VersionPatch>>,
    warned: AtomicBool,
    warning_sink: WarningSink,
}

impl TextureApplier {
    pub fn builder() -> ApplierBuilder {
        ApplierBuilder::new()
    }

    /// Bootstrap with defaults for everything but the required inputs.
    pub fn bootstrap(
        version: impl Into<String>,
        factory: Arc<dyn ProfileFactory>,
    ) -> Result<Self, BootstrapError> {
        Self::builder().version(version).factory(factory).build()
    }

    /// Apply the texture payload to a head item, returning it.
    ///
    /// On any internal failure the item comes back unchanged.
    pub fn item<I: HeadItem>(&self, mut item: I, payload: &str) -> I {
        match &self.active {
            Some(patch) => patch.apply_to_item(&mut item, payload),
            None => self.warn_once(),
        }
        item
    }

    /// Apply the texture payload to a placed head block, in place.
    ///
    /// On any internal failure the block is left unchanged.
    pub fn block(&self, block: &mut dyn HeadBlock, payload: &str) {
        match &self.active {
            Some(patch) => patch.apply_to_block(block, payload),
            None => self.warn_once(),
        }
    }

    /// Whether selection found a patch for this host.
    pub fn ready(&self) -> bool {
        self.active.is_some()
    }

    /// The patch selected at bootstrap, if any.
    pub fn active(&self) -> Option<&Arc<dyn VersionPatch>> {
        self.active.as_ref()
    }

    /// The host version supplied at bootstrap.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The full registry, for diagnostics.
    pub fn registry(&self) -> &PatchRegistry {
        &self.registry
    }

    /// Drop the active patch's memoized profiles.
    pub fn clear_cache(&self) {
        if let Some(patch) = &self.active {
            patch.clear_cache();
        }
    }

    /// Number of profiles the active patch has memoized.
    pub fn cache_size(&self) -> usize {
        self.active.as_ref().map_or(0, |patch| patch.cache_size())
    }

    fn warn_once(&self) {
        if !self.warned.swap(true, Ordering::Relaxed) {
            (self.warning_sink)(&format!(
                "no compatible version patch for host {}; heads will stay vanilla",
                self.version
            ));
        }
    }
}
