//! Payload-keyed profile memoization

use crate::error::HostResult;
use crate::host::SharedProfile;
use ahash::AHashMap;
use parking_lot::Mutex;

/// Memoizes profile construction per payload string.
///
/// Each patch owns one of these. `get_or_create` runs the constructor under
/// the map lock, so at most one construction happens per distinct payload
/// even when mutation calls arrive from several worker threads at once.
/// Failed constructions are not recorded; the next call with the same payload
/// retries. Entries live until [`clear`](ProfileCache::clear) or process end.
#[derive(Default)]
pub struct ProfileCache {
    entries: Mutex<AHashMap<String, SharedProfile>>,
}

impl ProfileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached profile for `payload`, constructing it with `init`
    /// on first use.
    pub fn get_or_create<F>(&self, payload: &str, init: F) -> HostResult<SharedProfile>
    where
        F: FnOnce() -> HostResult<SharedProfile>,
    {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(payload) {
            return Ok(existing.clone());
        }
        let built = init()?;
        entries.insert(payload.to_string(), built.clone());
        Ok(built)
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::host::{ProfileHandle, ProfileId};
    use std::sync::Arc;

    struct Inert(ProfileId);

    impl ProfileHandle for Inert {
        fn id(&self) -> ProfileId {
            self.0
        }
    }

    fn build(payload: &str) -> HostResult<SharedProfile> {
        Ok(Arc::new(Inert(ProfileId::from_payload(payload))))
    }

    #[test]
    fn constructs_once_per_payload() {
        let cache = ProfileCache::new();
        let first = cache.get_or_create("a", || build("a")).unwrap();
        let second = cache
            .get_or_create("a", || panic!("constructor ran twice"))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_payloads_get_distinct_entries() {
        let cache = ProfileCache::new();
        cache.get_or_create("a", || build("a")).unwrap();
        cache.get_or_create("b", || build("b")).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn clear_empties_and_allows_reconstruction() {
        let cache = ProfileCache::new();
        let first = cache.get_or_create("a", || build("a")).unwrap();
        cache.clear();
        assert!(cache.is_empty());
        let rebuilt = cache.get_or_create("a", || build("a")).unwrap();
        assert!(!Arc::ptr_eq(&first, &rebuilt));
    }

    #[test]
    fn failures_are_not_memoized() {
        let cache = ProfileCache::new();
        let failed = cache.get_or_create("a", || {
            Err(HostError::Construction("transient".into()))
        });
        assert!(failed.is_err());
        assert_eq!(cache.len(), 0);

        // Retry with the same payload succeeds and caches
        cache.get_or_create("a", || build("a")).unwrap();
        assert_eq!(cache.len(), 1);
    }
}
