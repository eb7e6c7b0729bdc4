//! Official owner-profile era (1.21.9 and newer)
//!
//! These builds expose a first-class setter accepting a fully-formed player
//! profile on both items and blocks, so the patch reduces to: fetch-or-build
//! the profile from the cache, hand it to the official setter, and ask the
//! block to persist its state. An absent setter downgrades to a no-op.

use crate::cache::ProfileCache;
use crate::error::HostResult;
use crate::host::{HeadBlock, HeadItem, ProfileFactory, ProfileKind, SharedProfile};
use crate::inject;
use crate::patch::VersionPatch;
use crate::version::{parse_rules, VersionRule};
use std::sync::Arc;
use tracing::debug;

pub struct OwnerProfilePatch {
    factory: Arc<dyn ProfileFactory>,
    cache: ProfileCache,
    rules: Vec<VersionRule>,
}

impl OwnerProfilePatch {
    pub fn new(factory: Arc<dyn ProfileFactory>) -> Self {
        OwnerProfilePatch {
            factory,
            cache: ProfileCache::new(),
            rules: parse_rules(&["1.21.9+"]),
        }
    }

    fn cached_profile(&self, payload: &str) -> HostResult<SharedProfile> {
        inject::cached_textured_profile(
            &self.cache,
            self.factory.as_ref(),
            ProfileKind::Player,
            payload,
        )
    }
}

impl VersionPatch for OwnerProfilePatch {
    fn name(&self) -> &'static str {
        "owner-profile"
    }

    fn rules(&self) -> &[VersionRule] {
        &self.rules
    }

    fn apply_to_item(&self, item: &mut dyn HeadItem, payload: &str) {
        if !item.is_head() {
            return;
        }
        let profile = match self.cached_profile(payload) {
            Ok(profile) => profile,
            Err(err) => {
                debug!("profile construction failed, item unchanged: {err}");
                return;
            }
        };
        if let Err(err) = item.set_owner_profile(profile) {
            debug!("official owner-profile setter unavailable on this build: {err}");
        }
    }

    fn apply_to_block(&self, block: &mut dyn HeadBlock, payload: &str) {
        let profile = match self.cached_profile(payload) {
            Ok(profile) => profile,
            Err(err) => {
                debug!("profile construction failed, block unchanged: {err}");
                return;
            }
        };
        match block.set_owner_profile(profile) {
            Ok(()) => {
                let _ = block.persist(true, false);
            }
            Err(err) => {
                debug!("official owner-profile setter unavailable on this build: {err}");
            }
        }
    }

    fn clear_cache(&self) {
        self.cache.clear();
    }

    fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
