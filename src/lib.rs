//! # Headpatch - Version-Adaptive Head Texture Application
//!
//! `headpatch` mutates opaque host profile objects on head items and placed
//! head blocks so they render a custom texture, across host builds whose
//! profile surfaces disagree with each other:
//!
//! - **One bootstrap, one selection**: the host version is matched against an
//!   ordered patch registry exactly once, at startup
//! - **Three built-in eras**: official owner-profile setter (1.21.9+),
//!   named-field injection (1.21–1.21.8), declared-field scan (1.8–1.20)
//! - **Capability probes, not reflection**: absent host surfaces degrade to
//!   the next tier instead of raising
//! - **Profile memoization**: one construction per distinct texture payload
//!
//! ## Quick Start
//!
//! ```rust
//! use headpatch::codec::encode_skin_url;
//! use headpatch::sim::{SimCapabilities, SimFactory, SimItem};
//! use headpatch::TextureApplier;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), headpatch::BootstrapError> {
//! let factory = Arc::new(SimFactory::new(SimCapabilities::modern()));
//! let applier = TextureApplier::bootstrap("1.21.9-R0.1-SNAPSHOT", factory)?;
//!
//! let payload = encode_skin_url("https://textures.example/skin/abc123");
//! let head = applier.item(SimItem::modern_head(), &payload);
//! assert!(head.owner_profile().is_some());
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom patches
//!
//! Hosts outside the built-in eras register their own [`VersionPatch`]
//! through [`ApplierBuilder::with_patch`]; custom patches sit ahead of the
//! built-ins, so they win ties.

pub mod applier;
pub mod cache;
pub mod codec;
pub mod error;
pub mod host;
pub mod inject;
pub mod patch;
pub mod patches;
pub mod registry;
pub mod sim;
pub mod version;

pub use applier::{ApplierBuilder, TextureApplier};
pub use cache::ProfileCache;
pub use error::{BootstrapError, HostError, HostResult, PatchError};
pub use host::{
    HeadBlock, HeadItem, HeadKind, ProfileFactory, ProfileHandle, ProfileId, ProfileKind,
    ProfileProperty, ProfileShape, ProfileSlot, ProfileValue, PropertyMap, ResolvableProfile,
    SharedProfile, SkinModel, TexturesView,
};
pub use patch::VersionPatch;
pub use registry::PatchRegistry;
pub use version::VersionRule;
