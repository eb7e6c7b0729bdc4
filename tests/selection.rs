//! Bootstrap selection behavior across host version strings.

use headpatch::sim::{SimCapabilities, SimFactory};
use headpatch::version::{parse_rules, VersionRule};
use headpatch::{HeadBlock, HeadItem, TextureApplier, VersionPatch};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn factory() -> Arc<SimFactory> {
    Arc::new(SimFactory::new(SimCapabilities::modern()))
}

fn active_name(version: &str) -> Option<&'static str> {
    let applier = TextureApplier::bootstrap(version, factory()).unwrap();
    applier.active().map(|patch| patch.name())
}

#[test]
fn newest_era_takes_official_setter_patch() {
    assert_eq!(active_name("1.21.9-R0.1-SNAPSHOT"), Some("owner-profile"));
    assert_eq!(active_name("1.21.10"), Some("owner-profile"));
    assert_eq!(active_name("1.21.19"), Some("owner-profile"));
    assert_eq!(active_name("1.22.0"), Some("owner-profile"));
    assert_eq!(active_name("2.0"), Some("owner-profile"));
}

#[test]
fn middle_era_takes_named_field_patch() {
    assert_eq!(active_name("1.21-R0.1-SNAPSHOT"), Some("resolvable-profile"));
    assert_eq!(active_name("1.21.4"), Some("resolvable-profile"));
    assert_eq!(active_name("1.21.8-R0.1-SNAPSHOT"), Some("resolvable-profile"));
}

#[test]
fn legacy_era_takes_scan_patch() {
    assert_eq!(active_name("1.8.8-R0.1-SNAPSHOT"), Some("legacy-scan"));
    assert_eq!(active_name("1.12.2"), Some("legacy-scan"));
    assert_eq!(active_name("1.20.6"), Some("legacy-scan"));
}

#[test]
fn unmatched_host_leaves_the_applier_not_ready() {
    let applier = TextureApplier::bootstrap("1.7.10", factory()).unwrap();
    assert!(!applier.ready());
    assert!(applier.active().is_none());
}

#[test]
fn selection_is_deterministic_across_bootstraps() {
    for _ in 0..20 {
        assert_eq!(active_name("1.21.9"), Some("owner-profile"));
        assert_eq!(active_name("1.21.3"), Some("resolvable-profile"));
        assert_eq!(active_name("1.16.5"), Some("legacy-scan"));
    }
}

struct RecordingPatch {
    rules: Vec<VersionRule>,
    faulty: bool,
    applications: AtomicUsize,
}

impl RecordingPatch {
    fn new(rules: &[&str], faulty: bool) -> Self {
        RecordingPatch {
            rules: parse_rules(rules),
            faulty,
            applications: AtomicUsize::new(0),
        }
    }
}

impl VersionPatch for RecordingPatch {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn rules(&self) -> &[VersionRule] {
        &self.rules
    }

    fn supports(&self, version: &str) -> Result<bool, headpatch::PatchError> {
        if self.faulty {
            return Err(headpatch::PatchError::Predicate(
                "simulated predicate failure".to_owned(),
            ));
        }
        Ok(headpatch::version::any_match(version, &self.rules))
    }

    fn apply_to_item(&self, _item: &mut dyn HeadItem, _payload: &str) {
        self.applications.fetch_add(1, Ordering::SeqCst);
    }

    fn apply_to_block(&self, _block: &mut dyn HeadBlock, _payload: &str) {
        self.applications.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn custom_patch_registered_first_wins_over_built_ins() {
    let custom = Arc::new(RecordingPatch::new(&["1.21.9+"], false));
    let applier = TextureApplier::builder()
        .version("1.21.9")
        .factory(factory())
        .with_patch(custom.clone())
        .build()
        .unwrap();
    assert_eq!(applier.active().map(|p| p.name()), Some("recording"));

    applier.block(&mut headpatch::sim::SimBlock::modern(), "payload");
    assert_eq!(custom.applications.load(Ordering::SeqCst), 1);
}

#[test]
fn faulting_predicate_is_skipped_not_fatal() {
    let faulty = Arc::new(RecordingPatch::new(&["1.21.9+"], true));
    let applier = TextureApplier::builder()
        .version("1.21.9")
        .factory(factory())
        .with_patch(faulty)
        .build()
        .unwrap();
    // Selection fell through to the matching built-in
    assert_eq!(applier.active().map(|p| p.name()), Some("owner-profile"));
}
