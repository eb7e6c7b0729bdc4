//! Profile-field injection era (1.21 through 1.21.8)
//!
//! The official surface on these builds refuses unsigned textures, so the
//! patch bypasses it and writes into the entity's internal profile field.
//! Adjacent sub-versions disagree on the field's declared shape: some hold a
//! raw game profile, some a resolvable wrapper around one. When the raw
//! profile is not assignment-compatible, it is wrapped into the slot's
//! declared shape with safe defaults before the store.

use crate::cache::ProfileCache;
use crate::error::HostResult;
use crate::host::{
    HeadBlock, HeadItem, ProfileFactory, ProfileKind, ProfileSlot, ProfileValue, SharedProfile,
};
use crate::inject;
use crate::patch::VersionPatch;
use crate::version::{parse_rules, VersionRule};
use std::sync::Arc;
use tracing::debug;

const SUPPORTED: &[&str] = &[
    "1.21", "1.21.1", "1.21.2", "1.21.3", "1.21.4", "1.21.5", "1.21.6", "1.21.7", "1.21.8",
];

pub struct ResolvableProfilePatch {
    factory: Arc<dyn ProfileFactory>,
    cache: ProfileCache,
    rules: Vec<VersionRule>,
}

impl ResolvableProfilePatch {
    pub fn new(factory: Arc<dyn ProfileFactory>) -> Self {
        ResolvableProfilePatch {
            factory,
            cache: ProfileCache::new(),
            rules: parse_rules(SUPPORTED),
        }
    }

    fn cached_profile(&self, payload: &str) -> HostResult<SharedProfile> {
        inject::cached_textured_profile(
            &self.cache,
            self.factory.as_ref(),
            ProfileKind::Game,
            payload,
        )
    }
}

/// Store a raw profile into the slot, wrapping it first when the slot
/// declares the other shape.
fn store_into_slot(slot: &mut ProfileSlot, raw: SharedProfile) -> HostResult<()> {
    let value = ProfileValue::Game(raw.clone());
    let value = if slot.accepts(&value) {
        value
    } else {
        slot.wrap(raw)
    };
    slot.store(value)
}

impl VersionPatch for ResolvableProfilePatch {
    fn name(&self) -> &'static str {
        "resolvable-profile"
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
        match item.profile_slot() {
            Some(slot) => {
                if let Err(err) = store_into_slot(slot, profile) {
                    debug!("profile field store failed, item unchanged: {err}");
                }
            }
            None => debug!("no named profile field on this build, item unchanged"),
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
        let stored = match block.profile_slot() {
            Some(slot) => store_into_slot(slot, profile).is_ok(),
            None => {
                debug!("no named profile field on this build, block unchanged");
                false
            }
        };
        if stored {
            let _ = block.persist(true, true);
        }
    }

    fn clear_cache(&self) {
        self.cache.clear();
    }

    fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
