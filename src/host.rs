//! Host capability model
//!
//! The host platform owns the head items, placed head blocks, and the profile
//! objects bound to them. What that profile looks like, and which entry points
//! exist to reach it, changes between host builds: some expose an official
//! owner-profile setter, some only an internal field of one of two shapes,
//! and some nothing named at all.
//!
//! Instead of probing the host at runtime, this crate declares the probes as
//! narrow traits. A host-adapter layer implements them per platform build;
//! absent capabilities keep their defaults (`None` /
//! [`HostError::CapabilityAbsent`]) and the patches fall through to the next
//! option. The [`crate::sim`] module carries an in-memory reference adapter.

use crate::error::{HostError, HostResult};
use std::fmt;
use std::sync::Arc;
use xxhash_rust::xxh3::xxh3_64;

/// Deterministic 128-bit profile identity.
///
/// Derived from the payload string so the same payload maps to the same
/// identity across process restarts. The exact derivation (xxh3-64 repeated
/// in both halves) is an internal detail, not a compatibility surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProfileId(u128);

impl ProfileId {
    /// Derive the identity for a texture payload.
    pub fn from_payload(payload: &str) -> Self {
        let h = xxh3_64(payload.as_bytes()) as u128;
        ProfileId((h << 64) | h)
    }

    /// Raw 128-bit value.
    pub fn as_u128(self) -> u128 {
        self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// Skin model hint for hosts whose textures view requires one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkinModel {
    #[default]
    Classic,
    Slim,
}

/// One record in a profile's property collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileProperty {
    pub name: String,
    pub value: String,
    /// Some builds insist on a signature field, even an empty one
    pub signature: Option<String>,
}

impl ProfileProperty {
    /// Unsigned record, the common form.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        ProfileProperty {
            name: name.into(),
            value: value.into(),
            signature: None,
        }
    }

    /// Record carrying an explicit signature field.
    pub fn signed(
        name: impl Into<String>,
        value: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        ProfileProperty {
            name: name.into(),
            value: value.into(),
            signature: Some(signature.into()),
        }
    }
}

/// Structured textures sub-object of a profile (tier 1 capability)
pub trait TexturesView {
    /// Assign the skin reference, single-argument form.
    fn set_skin(&mut self, url: &str) -> HostResult<()>;

    /// Two-argument form for builds whose single-argument setter is absent.
    fn set_skin_with_model(&mut self, _url: &str, _model: SkinModel) -> HostResult<()> {
        Err(HostError::CapabilityAbsent("set_skin_with_model"))
    }
}

/// Mutable property collection of a profile (tier 3 capability)
///
/// Hosts differ in which insert flavor their collection exposes; each method
/// defaults to absent so an adapter only implements what its build has.
pub trait PropertyMap {
    /// Typed put keyed by property name.
    fn put_typed(&mut self, _key: &str, _property: ProfileProperty) -> HostResult<()> {
        Err(HostError::CapabilityAbsent("put_typed"))
    }

    /// Untyped put fallback.
    fn put_untyped(&mut self, _key: &str, _property: ProfileProperty) -> HostResult<()> {
        Err(HostError::CapabilityAbsent("put_untyped"))
    }

    /// Batch insert fallback.
    fn put_all(&mut self, _key: &str, _properties: Vec<ProfileProperty>) -> HostResult<()> {
        Err(HostError::CapabilityAbsent("put_all"))
    }
}

/// Opaque host profile binding an identity and texture data
///
/// The three optional probes correspond to the three injection tiers in
/// [`crate::inject`]. A profile never mutates once it has been handed out as
/// a [`SharedProfile`].
pub trait ProfileHandle: Send + Sync {
    fn id(&self) -> ProfileId;

    /// Tier 1 probe: the structured textures sub-object, if this build has one.
    fn textures_mut(&mut self) -> Option<&mut dyn TexturesView> {
        None
    }

    /// Tier 1 write-back: push the mutated textures sub-object onto the profile.
    fn commit_textures(&mut self) -> HostResult<()> {
        Err(HostError::CapabilityAbsent("commit_textures"))
    }

    /// Tier 2 probe: generic named string-property setter.
    fn set_string_property(&mut self, _key: &str, _value: &str) -> HostResult<()> {
        Err(HostError::CapabilityAbsent("set_string_property"))
    }

    /// Tier 3 probe: the profile's internal property collection.
    fn properties(&mut self) -> Option<&mut dyn PropertyMap> {
        None
    }
}

/// A profile shared after construction; entries in the cache are these.
pub type SharedProfile = Arc<dyn ProfileHandle>;

/// Which profile shell a patch era constructs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    /// Raw game profile, the shape internal fields hold on older builds
    Game,
    /// First-class player profile accepted by the official setter
    Player,
}

/// Constructs empty profile shells for the active host build
pub trait ProfileFactory: Send + Sync {
    fn create(
        &self,
        kind: ProfileKind,
        id: ProfileId,
        name: &str,
    ) -> HostResult<Box<dyn ProfileHandle>>;
}

/// Declared shape of a profile-bearing host field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileShape {
    /// Field holds a raw game profile
    Game,
    /// Field holds a resolvable wrapper around a game profile
    Resolvable,
}

/// Wrapper shape some builds declare around a raw game profile
#[derive(Clone)]
pub struct ResolvableProfile {
    pub profile: SharedProfile,
    pub signature_required: bool,
    pub name: Option<String>,
}

impl ResolvableProfile {
    /// Wrap a raw profile with safe defaults for the remaining fields.
    pub fn wrap(profile: SharedProfile) -> Self {
        ResolvableProfile {
            profile,
            signature_required: false,
            name: None,
        }
    }
}

impl fmt::Debug for ResolvableProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvableProfile")
            .field("profile", &self.profile.id())
            .field("signature_required", &self.signature_required)
            .field("name", &self.name)
            .finish()
    }
}

/// A value in one of the shapes a host field can declare
#[derive(Clone)]
pub enum ProfileValue {
    Game(SharedProfile),
    Resolvable(ResolvableProfile),
}

impl ProfileValue {
    pub fn shape(&self) -> ProfileShape {
        match self {
            ProfileValue::Game(_) => ProfileShape::Game,
            ProfileValue::Resolvable(_) => ProfileShape::Resolvable,
        }
    }

    /// The underlying profile, unwrapped from either shape.
    pub fn profile(&self) -> &SharedProfile {
        match self {
            ProfileValue::Game(profile) => profile,
            ProfileValue::Resolvable(wrapper) => &wrapper.profile,
        }
    }
}

impl fmt::Debug for ProfileValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.shape(), self.profile().id())
    }
}

/// A single profile-bearing field on a host entity
///
/// Models a declared field: a fixed shape plus the value currently stored.
/// Assignment compatibility is a shape check; `wrap` builds whatever this
/// slot declares from a raw profile.
#[derive(Debug)]
pub struct ProfileSlot {
    shape: ProfileShape,
    value: Option<ProfileValue>,
}

impl ProfileSlot {
    pub fn new(shape: ProfileShape) -> Self {
        ProfileSlot { shape, value: None }
    }

    pub fn shape(&self) -> ProfileShape {
        self.shape
    }

    /// Whether `value` is assignment-compatible with this slot.
    pub fn accepts(&self, value: &ProfileValue) -> bool {
        self.shape == value.shape()
    }

    /// Store a value, rejecting incompatible shapes.
    pub fn store(&mut self, value: ProfileValue) -> HostResult<()> {
        if !self.accepts(&value) {
            return Err(HostError::ShapeMismatch(
                "value shape does not match the declared field shape",
            ));
        }
        self.value = Some(value);
        Ok(())
    }

    /// Build the shape this slot declares from a raw profile, with safe
    /// defaults for any remaining fields.
    pub fn wrap(&self, raw: SharedProfile) -> ProfileValue {
        match self.shape {
            ProfileShape::Game => ProfileValue::Game(raw),
            ProfileShape::Resolvable => ProfileValue::Resolvable(ResolvableProfile::wrap(raw)),
        }
    }

    pub fn value(&self) -> Option<&ProfileValue> {
        self.value.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }
}

/// Sub-kind marker of a generic placeable-head block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadKind {
    Skeleton,
    Wither,
    Zombie,
    Player,
    Creeper,
    Dragon,
}

/// Portable head item as the host exposes it to this crate
pub trait HeadItem {
    /// Whether the item carries head metadata at all.
    fn is_head(&self) -> bool;

    /// Official owner-profile setter (newest builds).
    fn set_owner_profile(&mut self, _profile: SharedProfile) -> HostResult<()> {
        Err(HostError::CapabilityAbsent("set_owner_profile"))
    }

    /// Named internal profile field (middle-era builds).
    fn profile_slot(&mut self) -> Option<&mut ProfileSlot> {
        None
    }

    /// Declared fields in declaration order, for the legacy scan.
    fn declared_slots(&mut self) -> &mut [ProfileSlot] {
        &mut []
    }
}

/// Placed head block state
pub trait HeadBlock {
    fn kind(&self) -> HeadKind;

    /// Mark the block's sub-kind. Unmarked blocks silently discard the
    /// profile when their state persists.
    fn set_kind(&mut self, kind: HeadKind);

    /// Official owner-profile setter (newest builds).
    fn set_owner_profile(&mut self, _profile: SharedProfile) -> HostResult<()> {
        Err(HostError::CapabilityAbsent("set_owner_profile"))
    }

    /// Named internal profile field (middle-era builds).
    fn profile_slot(&mut self) -> Option<&mut ProfileSlot> {
        None
    }

    /// Declared fields in declaration order, for the legacy scan.
    fn declared_slots(&mut self) -> &mut [ProfileSlot] {
        &mut []
    }

    /// Push the mutated state back into the world.
    fn persist(&mut self, force: bool, apply_physics: bool) -> HostResult<()>;
}
