//! Legacy field-scan era (1.8 through 1.20)
//!
//! No named profile field exists on these builds. The patch scans the
//! entity's declared fields in order and writes the raw game profile into
//! the first one whose shape accepts it. Blocks must be marked as the player
//! sub-kind before injection; unmarked blocks silently discard the profile
//! when their state persists.
//!
//! Registered last as the broad fallback, so its minimum-version rule only
//! sees versions the newer-era patches declined.

use crate::cache::ProfileCache;
use crate::error::HostResult;
use crate::host::{
    HeadBlock, HeadItem, HeadKind, ProfileFactory, ProfileKind, ProfileSlot, ProfileValue,
    SharedProfile,
};
use crate::inject;
use crate::patch::VersionPatch;
use crate::version::{parse_rules, VersionRule};
use std::sync::Arc;
use tracing::debug;

pub struct LegacyScanPatch {
    factory: Arc<dyn ProfileFactory>,
    cache: ProfileCache,
    rules: Vec<VersionRule>,
}

impl LegacyScanPatch {
    pub fn new(factory: Arc<dyn ProfileFactory>) -> Self {
        LegacyScanPatch {
            factory,
            cache: ProfileCache::new(),
            rules: parse_rules(&["1.8+"]),
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

/// Write into the first declared field whose shape accepts a raw profile.
fn scan_and_store(slots: &mut [ProfileSlot], raw: SharedProfile) -> bool {
    let value = ProfileValue::Game(raw);
    for slot in slots {
        if slot.accepts(&value) {
            return slot.store(value).is_ok();
        }
    }
    false
}

impl VersionPatch for LegacyScanPatch {
    fn name(&self) -> &'static str {
        "legacy-scan"
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
        if !scan_and_store(item.declared_slots(), profile) {
            debug!("no compatible declared field on this build, item unchanged");
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

        // Mark before injection; the persist below discards profiles on
        // non-player heads.
        block.set_kind(HeadKind::Player);

        if !scan_and_store(block.declared_slots(), profile) {
            debug!("no compatible declared field on this build");
        }

        // Older hosts need an explicit state save either way
        let _ = block.persist(true, true);
    }

    fn clear_cache(&self) {
        self.cache.clear();
    }

    fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
