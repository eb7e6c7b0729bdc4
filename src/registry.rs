//! Ordered patch registry with first-match selection

use crate::patch::VersionPatch;
use std::sync::Arc;
use tracing::debug;

/// Append-only ordered sequence of version patches.
///
/// Populated during the single-threaded bootstrap phase and read-only
/// afterwards. Registration order is the tie-break for selection: the first
/// registered patch whose predicate matches wins, so more specific version
/// ranges must be registered before broader ones. Duplicate registrations
/// are harmless.
#[derive(Default)]
pub struct PatchRegistry {
    patches: Vec<Arc<dyn VersionPatch>>,
}

impl PatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a patch to the sequence.
    pub fn register(&mut self, patch: Arc<dyn VersionPatch>) {
        self.patches.push(patch);
    }

    /// First registered patch supporting `version`, if any.
    ///
    /// A patch whose predicate evaluation fails is skipped, never surfaced.
    pub fn select(&self, version: &str) -> Option<Arc<dyn VersionPatch>> {
        for patch in &self.patches {
            match patch.supports(version) {
                Ok(true) => return Some(patch.clone()),
                Ok(false) => {}
                Err(err) => {
                    debug!(
                        "patch '{}' predicate failed for '{}', skipping: {}",
                        patch.name(),
                        version,
                        err
                    );
                }
            }
        }
        None
    }

    /// Read-only view of all registered patches, for diagnostics.
    pub fn all(&self) -> &[Arc<dyn VersionPatch>] {
        &self.patches
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PatchError;
    use crate::host::{HeadBlock, HeadItem};
    use crate::version::{parse_rules, VersionRule};

    struct StubPatch {
        name: &'static str,
        rules: Vec<VersionRule>,
        faulty: bool,
    }

    impl StubPatch {
        fn new(name: &'static str, rules: &[&str]) -> Arc<Self> {
            Arc::new(StubPatch {
                name,
                rules: parse_rules(rules),
                faulty: false,
            })
        }

        fn faulty(name: &'static str) -> Arc<Self> {
            Arc::new(StubPatch {
                name,
                rules: Vec::new(),
                faulty: true,
            })
        }
    }

    impl VersionPatch for StubPatch {
        fn name(&self) -> &'static str {
            self.name
        }

        fn rules(&self) -> &[VersionRule] {
            &self.rules
        }

        fn supports(&self, version: &str) -> Result<bool, PatchError> {
            if self.faulty {
                return Err(PatchError::Predicate("stub fault".into()));
            }
            Ok(crate::version::any_match(version, &self.rules))
        }

        fn apply_to_item(&self, _item: &mut dyn HeadItem, _payload: &str) {}

        fn apply_to_block(&self, _block: &mut dyn HeadBlock, _payload: &str) {}
    }

    #[test]
    fn first_registered_match_wins() {
        let mut registry = PatchRegistry::new();
        registry.register(StubPatch::new("a", &["1.20.4"]));
        registry.register(StubPatch::new("b", &["1.20.4"]));

        for _ in 0..10 {
            let selected = registry.select("1.20.4").expect("a patch");
            assert_eq!(selected.name(), "a");
        }
    }

    #[test]
    fn faulting_predicate_is_skipped() {
        let mut registry = PatchRegistry::new();
        registry.register(StubPatch::faulty("broken"));
        registry.register(StubPatch::new("fallback", &["1.20.4"]));

        let selected = registry.select("1.20.4").expect("fallback selected");
        assert_eq!(selected.name(), "fallback");
    }

    #[test]
    fn no_match_yields_none() {
        let mut registry = PatchRegistry::new();
        registry.register(StubPatch::new("a", &["1.20.4"]));
        assert!(registry.select("0.9.1").is_none());
        assert!(PatchRegistry::new().select("1.20").is_none());
    }

    #[test]
    fn all_preserves_registration_order() {
        let mut registry = PatchRegistry::new();
        registry.register(StubPatch::new("first", &["1.21.9+"]));
        registry.register(StubPatch::new("second", &["1.21"]));
        registry.register(StubPatch::new("second", &["1.21"]));

        let names: Vec<_> = registry.all().iter().map(|p| p.name()).collect();
        assert_eq!(names, ["first", "second", "second"]);
        assert_eq!(registry.len(), 3);
    }
}
