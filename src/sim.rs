//! In-memory reference host adapter
//!
//! Implements the full capability surface of [`crate::host`] against plain
//! structs, with a capability matrix ([`SimCapabilities`]) deciding which
//! probes report present. Used by this crate's own tests and doctests, and
//! useful as a template when writing a real host adapter: each `impl` block
//! here mirrors one probe group a platform build may or may not have.

use crate::error::{HostError, HostResult};
use crate::host::{
    HeadBlock, HeadItem, HeadKind, ProfileFactory, ProfileHandle, ProfileId, ProfileKind,
    ProfileProperty, ProfileShape, ProfileSlot, PropertyMap, SharedProfile, SkinModel,
    TexturesView,
};
use ahash::AHashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Which property-map insert flavor a simulated build exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimPutFlavor {
    Typed,
    Untyped,
    Batch,
}

/// Capability matrix for a simulated host build
#[derive(Debug, Clone, Copy)]
pub struct SimCapabilities {
    /// Structured textures sub-object present
    pub structured_textures: bool,
    /// Single-argument skin setter absent; only the model form works
    pub textures_need_model: bool,
    /// Generic keyed string-property setter present
    pub keyed_setter: bool,
    /// Internal property collection reachable
    pub property_map: bool,
    /// Property collection rejects records without a signature field
    pub signed_properties_only: bool,
    /// Which insert flavor the property collection answers to
    pub put_flavor: SimPutFlavor,
}

impl SimCapabilities {
    /// Newest builds: structured textures plus a property collection.
    pub fn modern() -> Self {
        SimCapabilities {
            structured_textures: true,
            textures_need_model: false,
            keyed_setter: false,
            property_map: true,
            signed_properties_only: false,
            put_flavor: SimPutFlavor::Typed,
        }
    }

    /// Builds reachable only through the keyed string-property setter.
    pub fn keyed_only() -> Self {
        SimCapabilities {
            structured_textures: false,
            textures_need_model: false,
            keyed_setter: true,
            property_map: false,
            signed_properties_only: false,
            put_flavor: SimPutFlavor::Typed,
        }
    }

    /// Older builds: nothing but the raw property collection.
    pub fn authlib() -> Self {
        SimCapabilities {
            structured_textures: false,
            textures_need_model: false,
            keyed_setter: false,
            property_map: true,
            signed_properties_only: false,
            put_flavor: SimPutFlavor::Typed,
        }
    }

    /// A build with no reachable injection surface at all.
    pub fn none() -> Self {
        SimCapabilities {
            structured_textures: false,
            textures_need_model: false,
            keyed_setter: false,
            property_map: false,
            signed_properties_only: false,
            put_flavor: SimPutFlavor::Typed,
        }
    }
}

/// Staged textures sub-object; changes only land on the profile at commit.
#[derive(Debug, Default)]
struct SimTextures {
    need_model: bool,
    staged_url: Option<String>,
    staged_model: Option<SkinModel>,
}

impl TexturesView for SimTextures {
    fn set_skin(&mut self, url: &str) -> HostResult<()> {
        if self.need_model {
            return Err(HostError::CapabilityAbsent("set_skin"));
        }
        self.staged_url = Some(url.to_owned());
        Ok(())
    }

    fn set_skin_with_model(&mut self, url: &str, model: SkinModel) -> HostResult<()> {
        self.staged_url = Some(url.to_owned());
        self.staged_model = Some(model);
        Ok(())
    }
}

#[derive(Debug)]
struct SimPropertyMap {
    flavor: SimPutFlavor,
    signed_only: bool,
    records: AHashMap<String, Vec<ProfileProperty>>,
}

impl SimPropertyMap {
    fn new(flavor: SimPutFlavor, signed_only: bool) -> Self {
        SimPropertyMap {
            flavor,
            signed_only,
            records: AHashMap::new(),
        }
    }

    fn insert(&mut self, key: &str, property: ProfileProperty) -> HostResult<()> {
        if self.signed_only && property.signature.is_none() {
            return Err(HostError::ShapeMismatch(
                "this build rejects property records without a signature",
            ));
        }
        self.records.entry(key.to_owned()).or_default().push(property);
        Ok(())
    }
}

impl PropertyMap for SimPropertyMap {
    fn put_typed(&mut self, key: &str, property: ProfileProperty) -> HostResult<()> {
        if self.flavor != SimPutFlavor::Typed {
            return Err(HostError::CapabilityAbsent("put_typed"));
        }
        self.insert(key, property)
    }

    fn put_untyped(&mut self, key: &str, property: ProfileProperty) -> HostResult<()> {
        if self.flavor != SimPutFlavor::Untyped {
            return Err(HostError::CapabilityAbsent("put_untyped"));
        }
        self.insert(key, property)
    }

    fn put_all(&mut self, key: &str, properties: Vec<ProfileProperty>) -> HostResult<()> {
        if self.flavor != SimPutFlavor::Batch {
            return Err(HostError::CapabilityAbsent("put_all"));
        }
        for property in properties {
            self.insert(key, property)?;
        }
        Ok(())
    }
}

/// Simulated host profile
pub struct SimProfile {
    kind: ProfileKind,
    id: ProfileId,
    name: String,
    caps: SimCapabilities,
    textures: SimTextures,
    committed: Option<(String, Option<SkinModel>)>,
    map: SimPropertyMap,
    keyed: AHashMap<String, String>,
}

impl SimProfile {
    pub fn new(kind: ProfileKind, id: ProfileId, name: &str, caps: SimCapabilities) -> Self {
        SimProfile {
            kind,
            id,
            name: name.to_owned(),
            caps,
            textures: SimTextures {
                need_model: caps.textures_need_model,
                ..SimTextures::default()
            },
            committed: None,
            map: SimPropertyMap::new(caps.put_flavor, caps.signed_properties_only),
            keyed: AHashMap::new(),
        }
    }

    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Skin URL that made it through a commit, if any.
    pub fn skin_url(&self) -> Option<&str> {
        self.committed.as_ref().map(|(url, _)| url.as_str())
    }

    /// Model hint recorded alongside the committed skin, if the model form
    /// was used.
    pub fn skin_model(&self) -> Option<SkinModel> {
        self.committed.as_ref().and_then(|(_, model)| *model)
    }

    /// First property record stored under `key`.
    pub fn property(&self, key: &str) -> Option<&ProfileProperty> {
        self.map.records.get(key).and_then(|records| records.first())
    }

    /// Value written through the keyed string-property setter.
    pub fn keyed_value(&self, key: &str) -> Option<&str> {
        self.keyed.get(key).map(String::as_str)
    }
}

impl ProfileHandle for SimProfile {
    fn id(&self) -> ProfileId {
        self.id
    }

    fn textures_mut(&mut self) -> Option<&mut dyn TexturesView> {
        if self.caps.structured_textures {
            Some(&mut self.textures)
        } else {
            None
        }
    }

    fn commit_textures(&mut self) -> HostResult<()> {
        if !self.caps.structured_textures {
            return Err(HostError::CapabilityAbsent("commit_textures"));
        }
        if let Some(url) = self.textures.staged_url.take() {
            self.committed = Some((url, self.textures.staged_model.take()));
        }
        Ok(())
    }

    fn set_string_property(&mut self, key: &str, value: &str) -> HostResult<()> {
        if !self.caps.keyed_setter {
            return Err(HostError::CapabilityAbsent("set_string_property"));
        }
        self.keyed.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn properties(&mut self) -> Option<&mut dyn PropertyMap> {
        if self.caps.property_map {
            Some(&mut self.map)
        } else {
            None
        }
    }
}

/// Simulated profile factory with fault injection for cache tests.
pub struct SimFactory {
    caps: SimCapabilities,
    creations: AtomicUsize,
    fail_remaining: AtomicUsize,
}

impl SimFactory {
    pub fn new(caps: SimCapabilities) -> Self {
        SimFactory {
            caps,
            creations: AtomicUsize::new(0),
            fail_remaining: AtomicUsize::new(0),
        }
    }

    /// Make the next `count` constructions fail.
    pub fn fail_next(&self, count: usize) {
        self.fail_remaining.store(count, Ordering::SeqCst);
    }

    /// How many profiles were successfully constructed.
    pub fn creations(&self) -> usize {
        self.creations.load(Ordering::SeqCst)
    }
}

impl ProfileFactory for SimFactory {
    fn create(
        &self,
        kind: ProfileKind,
        id: ProfileId,
        name: &str,
    ) -> HostResult<Box<dyn ProfileHandle>> {
        let remaining = self.fail_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(HostError::Construction(
                "simulated profile construction failure".to_owned(),
            ));
        }
        self.creations.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SimProfile::new(kind, id, name, self.caps)))
    }
}

/// Simulated head item, one constructor per era
pub struct SimItem {
    head: bool,
    owner_supported: bool,
    owner: Option<SharedProfile>,
    named: Option<ProfileSlot>,
    declared: Vec<ProfileSlot>,
}

impl SimItem {
    /// 1.21.9+ item: official owner-profile setter only.
    pub fn modern_head() -> Self {
        SimItem {
            head: true,
            owner_supported: true,
            owner: None,
            named: None,
            declared: Vec::new(),
        }
    }

    /// 1.21–1.21.8 item: a named profile field of the given declared shape.
    pub fn resolvable_head(shape: ProfileShape) -> Self {
        SimItem {
            head: true,
            owner_supported: false,
            owner: None,
            named: Some(ProfileSlot::new(shape)),
            declared: Vec::new(),
        }
    }

    /// Pre-1.21 item: unnamed declared fields, profile-bearing one second.
    pub fn legacy_head() -> Self {
        Self::legacy_head_of(&[ProfileShape::Resolvable, ProfileShape::Game])
    }

    /// Pre-1.21 item with an explicit declared-field layout.
    pub fn legacy_head_of(shapes: &[ProfileShape]) -> Self {
        SimItem {
            head: true,
            owner_supported: false,
            owner: None,
            named: None,
            declared: shapes.iter().map(|shape| ProfileSlot::new(*shape)).collect(),
        }
    }

    /// An item without head metadata.
    pub fn not_a_head() -> Self {
        SimItem {
            head: false,
            owner_supported: false,
            owner: None,
            named: None,
            declared: Vec::new(),
        }
    }

    pub fn owner_profile(&self) -> Option<&SharedProfile> {
        self.owner.as_ref()
    }

    pub fn named_slot(&self) -> Option<&ProfileSlot> {
        self.named.as_ref()
    }

    pub fn slots(&self) -> &[ProfileSlot] {
        &self.declared
    }
}

impl HeadItem for SimItem {
    fn is_head(&self) -> bool {
        self.head
    }

    fn set_owner_profile(&mut self, profile: SharedProfile) -> HostResult<()> {
        if !self.owner_supported {
            return Err(HostError::CapabilityAbsent("set_owner_profile"));
        }
        self.owner = Some(profile);
        Ok(())
    }

    fn profile_slot(&mut self) -> Option<&mut ProfileSlot> {
        self.named.as_mut()
    }

    fn declared_slots(&mut self) -> &mut [ProfileSlot] {
        &mut self.declared
    }
}

/// Simulated placed head block
///
/// Starts as a skeleton head so tests can observe the legacy patch flipping
/// the sub-kind. Every `persist` call is recorded with its flags.
pub struct SimBlock {
    kind: HeadKind,
    owner_supported: bool,
    owner: Option<SharedProfile>,
    named: Option<ProfileSlot>,
    declared: Vec<ProfileSlot>,
    persist_calls: Vec<(bool, bool)>,
}

impl SimBlock {
    /// 1.21.9+ block: official owner-profile setter only.
    pub fn modern() -> Self {
        SimBlock {
            kind: HeadKind::Skeleton,
            owner_supported: true,
            owner: None,
            named: None,
            declared: Vec::new(),
            persist_calls: Vec::new(),
        }
    }

    /// 1.21–1.21.8 block: a named profile field of the given declared shape.
    pub fn resolvable(shape: ProfileShape) -> Self {
        SimBlock {
            kind: HeadKind::Skeleton,
            owner_supported: false,
            owner: None,
            named: Some(ProfileSlot::new(shape)),
            declared: Vec::new(),
            persist_calls: Vec::new(),
        }
    }

    /// Pre-1.21 block: unnamed declared fields, profile-bearing one second.
    pub fn legacy() -> Self {
        Self::legacy_of(&[ProfileShape::Resolvable, ProfileShape::Game])
    }

    /// Pre-1.21 block with an explicit declared-field layout.
    pub fn legacy_of(shapes: &[ProfileShape]) -> Self {
        SimBlock {
            kind: HeadKind::Skeleton,
            owner_supported: false,
            owner: None,
            named: None,
            declared: shapes.iter().map(|shape| ProfileSlot::new(*shape)).collect(),
            persist_calls: Vec::new(),
        }
    }

    pub fn owner_profile(&self) -> Option<&SharedProfile> {
        self.owner.as_ref()
    }

    pub fn named_slot(&self) -> Option<&ProfileSlot> {
        self.named.as_ref()
    }

    pub fn slots(&self) -> &[ProfileSlot] {
        &self.declared
    }

    pub fn persist_calls(&self) -> &[(bool, bool)] {
        &self.persist_calls
    }
}

impl HeadBlock for SimBlock {
    fn kind(&self) -> HeadKind {
        self.kind
    }

    fn set_kind(&mut self, kind: HeadKind) {
        self.kind = kind;
    }

    fn set_owner_profile(&mut self, profile: SharedProfile) -> HostResult<()> {
        if !self.owner_supported {
            return Err(HostError::CapabilityAbsent("set_owner_profile"));
        }
        self.owner = Some(profile);
        Ok(())
    }

    fn profile_slot(&mut self) -> Option<&mut ProfileSlot> {
        self.named.as_mut()
    }

    fn declared_slots(&mut self) -> &mut [ProfileSlot] {
        &mut self.declared
    }

    fn persist(&mut self, force: bool, apply_physics: bool) -> HostResult<()> {
        self.persist_calls.push((force, apply_physics));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn capability_matrix_gates_the_probes() {
        let id = ProfileId::from_payload("p");
        let mut full = SimProfile::new(ProfileKind::Player, id, "", SimCapabilities::modern());
        assert!(full.textures_mut().is_some());
        assert!(full.properties().is_some());

        let mut bare = SimProfile::new(ProfileKind::Player, id, "", SimCapabilities::none());
        assert!(bare.textures_mut().is_none());
        assert!(bare.properties().is_none());
        assert!(matches!(
            bare.set_string_property("textures", "v"),
            Err(HostError::CapabilityAbsent(_))
        ));
    }

    #[test]
    fn commit_moves_staged_skin_onto_the_profile() {
        let id = ProfileId::from_payload("p");
        let mut p = SimProfile::new(ProfileKind::Player, id, "", SimCapabilities::modern());
        p.textures_mut().unwrap().set_skin("https://x/skin").unwrap();
        assert_eq!(p.skin_url(), None);
        p.commit_textures().unwrap();
        assert_eq!(p.skin_url(), Some("https://x/skin"));
    }

    #[test]
    fn factory_fault_injection_is_bounded() {
        let factory = SimFactory::new(SimCapabilities::modern());
        factory.fail_next(1);
        let id = ProfileId::from_payload("p");
        assert!(factory.create(ProfileKind::Game, id, "").is_err());
        assert!(factory.create(ProfileKind::Game, id, "").is_ok());
        assert_eq!(factory.creations(), 1);
    }

    #[test]
    fn legacy_block_records_persist_flags() {
        let mut block = SimBlock::legacy();
        assert_eq!(block.kind(), HeadKind::Skeleton);
        block.set_kind(HeadKind::Player);
        block.persist(true, true).unwrap();
        assert_eq!(block.persist_calls(), [(true, true)]);
    }

    #[test]
    fn signed_only_map_rejects_unsigned_records() {
        let mut map = SimPropertyMap::new(SimPutFlavor::Typed, true);
        assert!(matches!(
            map.put_typed("textures", ProfileProperty::new("textures", "v")),
            Err(HostError::ShapeMismatch(_))
        ));
        map.put_typed("textures", ProfileProperty::signed("textures", "v", ""))
            .unwrap();
    }

    #[test]
    fn shared_profile_is_send_and_sync() {
        fn assert_shared(_: SharedProfile) {}
        let id = ProfileId::from_payload("p");
        assert_shared(Arc::new(SimProfile::new(
            ProfileKind::Player,
            id,
            "",
            SimCapabilities::none(),
        )));
    }
}
