//! Version patch contract
//!
//! A patch is one version-scoped implementation of the mutation surface:
//! it knows how to locate and write the profile on the host builds its rules
//! claim. Exactly one patch is active for the life of the process once
//! selection completes (see [`crate::applier`]).

use crate::error::PatchError;
use crate::host::{HeadBlock, HeadItem};
use crate::version::{self, VersionRule};

/// One version-scoped strategy for applying head textures.
///
/// All operations are total: failures leave the target entity unchanged and
/// never propagate to the caller.
pub trait VersionPatch: Send + Sync {
    /// Short identifier used in selection logs.
    fn name(&self) -> &'static str;

    /// The version rules this patch claims.
    fn rules(&self) -> &[VersionRule];

    /// Whether this patch supports the supplied host version.
    ///
    /// The default evaluates [`rules`](VersionPatch::rules). An `Err` is
    /// treated by the registry as non-matching, never surfaced.
    fn supports(&self, version: &str) -> Result<bool, PatchError> {
        Ok(version::any_match(version, self.rules()))
    }

    /// Apply the texture payload to a head item. The item must report
    /// [`HeadItem::is_head`]; anything else is left unchanged.
    fn apply_to_item(&self, item: &mut dyn HeadItem, payload: &str);

    /// Apply the texture payload to a placed head block, persisting its
    /// state as the era requires.
    fn apply_to_block(&self, block: &mut dyn HeadBlock, payload: &str);

    /// Drop any memoized profiles.
    fn clear_cache(&self) {}

    /// Current number of memoized profiles.
    fn cache_size(&self) -> usize {
        0
    }
}
