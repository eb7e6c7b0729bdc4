//! Multi-tier texture injection
//!
//! Given a profile and an opaque texture payload, try each injection tier in
//! strict order and stop at the first success:
//!
//! 1. structured textures view: extract the skin URL from the payload and
//!    assign it on the sub-object, then write the sub-object back;
//! 2. keyed setter: set the `"textures"` string property directly;
//! 3. property map: build a property record and insert it into the profile's
//!    internal collection, walking the typed/untyped/batch put fallbacks.
//!
//! Each tier is an explicit `Option`; [`inject_texture`] itself reports
//! nothing, by design. Callers treat injection as best-effort and only
//! observe whether the entity they handed in changed.

use crate::cache::ProfileCache;
use crate::codec;
use crate::error::{HostError, HostResult};
use crate::host::{
    ProfileFactory, ProfileHandle, ProfileId, ProfileKind, ProfileProperty, PropertyMap,
    SharedProfile, SkinModel,
};
use std::sync::Arc;
use tracing::trace;

/// Fixed key under which hosts store texture data.
pub const TEXTURES_KEY: &str = "textures";

/// Best-effort payload injection into a profile.
pub fn inject_texture(profile: &mut dyn ProfileHandle, payload: &str) {
    if tier_structured_textures(profile, payload).is_some() {
        trace!("payload injected via structured textures view");
        return;
    }
    if tier_keyed_property(profile, payload).is_some() {
        trace!("payload injected via keyed property setter");
        return;
    }
    if tier_property_map(profile, payload).is_some() {
        trace!("payload injected via property map");
    } else {
        trace!("no injection tier accepted the payload");
    }
}

fn tier_structured_textures(profile: &mut dyn ProfileHandle, payload: &str) -> Option<()> {
    let url = codec::extract_skin_url(payload)?;
    {
        let view = profile.textures_mut()?;
        match view.set_skin(&url) {
            Ok(()) => {}
            Err(HostError::CapabilityAbsent(_)) => {
                view.set_skin_with_model(&url, SkinModel::default()).ok()?;
            }
            Err(_) => return None,
        }
    }
    profile.commit_textures().ok()
}

fn tier_keyed_property(profile: &mut dyn ProfileHandle, payload: &str) -> Option<()> {
    profile.set_string_property(TEXTURES_KEY, payload).ok()
}

fn tier_property_map(profile: &mut dyn ProfileHandle, payload: &str) -> Option<()> {
    let map = profile.properties()?;
    if insert_property(map, ProfileProperty::new(TEXTURES_KEY, payload)) {
        return Some(());
    }
    // Some builds reject unsigned records; retry with an explicit empty signature
    if insert_property(map, ProfileProperty::signed(TEXTURES_KEY, payload, "")) {
        return Some(());
    }
    None
}

fn insert_property(map: &mut dyn PropertyMap, property: ProfileProperty) -> bool {
    if map.put_typed(TEXTURES_KEY, property.clone()).is_ok() {
        return true;
    }
    if map.put_untyped(TEXTURES_KEY, property.clone()).is_ok() {
        return true;
    }
    map.put_all(TEXTURES_KEY, vec![property]).is_ok()
}

/// Construct an era-appropriate profile for `payload` and run the injection
/// tiers over it.
///
/// The identity is derived deterministically from the payload and the display
/// name is left empty. The result is frozen into a [`SharedProfile`]; cached
/// entries never mutate after this point.
pub fn textured_profile(
    factory: &dyn ProfileFactory,
    kind: ProfileKind,
    payload: &str,
) -> HostResult<SharedProfile> {
    let id = ProfileId::from_payload(payload);
    let mut shell = factory.create(kind, id, "")?;
    inject_texture(shell.as_mut(), payload);
    Ok(Arc::from(shell))
}

/// Cache-mediated form of [`textured_profile`]; at most one construction per
/// distinct payload.
pub fn cached_textured_profile(
    cache: &ProfileCache,
    factory: &dyn ProfileFactory,
    kind: ProfileKind,
    payload: &str,
) -> HostResult<SharedProfile> {
    cache.get_or_create(payload, || textured_profile(factory, kind, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_skin_url;
    use crate::sim::{SimCapabilities, SimProfile, SimPutFlavor};

    const URL: &str = "https://textures.example/skin/abc123";

    fn profile(caps: SimCapabilities) -> SimProfile {
        SimProfile::new(ProfileKind::Player, ProfileId::from_payload("test"), "", caps)
    }

    #[test]
    fn tier_one_sets_and_commits_the_skin() {
        let mut p = profile(SimCapabilities::modern());
        inject_texture(&mut p, &encode_skin_url(URL));
        assert_eq!(p.skin_url(), Some(URL));
        // Lower tiers were never reached
        assert!(p.property(TEXTURES_KEY).is_none());
    }

    #[test]
    fn tier_one_falls_back_to_the_model_form() {
        let mut caps = SimCapabilities::modern();
        caps.textures_need_model = true;
        let mut p = profile(caps);
        inject_texture(&mut p, &encode_skin_url(URL));
        assert_eq!(p.skin_url(), Some(URL));
        assert_eq!(p.skin_model(), Some(SkinModel::Classic));
    }

    #[test]
    fn payload_without_url_skips_tier_one() {
        let mut p = profile(SimCapabilities::modern());
        // {"textures":{}} carries no skin reference
        inject_texture(&mut p, "eyJ0ZXh0dXJlcyI6e319");
        assert_eq!(p.skin_url(), None);
        // Falls through to the property map
        let record = p.property(TEXTURES_KEY).expect("property record");
        assert_eq!(record.value, "eyJ0ZXh0dXJlcyI6e319");
    }

    #[test]
    fn tier_two_handles_keyed_setter_hosts() {
        let mut p = profile(SimCapabilities::keyed_only());
        let payload = encode_skin_url(URL);
        inject_texture(&mut p, &payload);
        assert_eq!(p.keyed_value(TEXTURES_KEY), Some(payload.as_str()));
    }

    #[test]
    fn tier_three_retries_with_an_empty_signature() {
        let mut caps = SimCapabilities::authlib();
        caps.signed_properties_only = true;
        let mut p = profile(caps);
        let payload = encode_skin_url(URL);
        inject_texture(&mut p, &payload);
        let record = p.property(TEXTURES_KEY).expect("property record");
        assert_eq!(record.signature.as_deref(), Some(""));
    }

    #[test]
    fn tier_three_walks_the_put_fallbacks() {
        for flavor in [SimPutFlavor::Typed, SimPutFlavor::Untyped, SimPutFlavor::Batch] {
            let mut caps = SimCapabilities::authlib();
            caps.put_flavor = flavor;
            let mut p = profile(caps);
            inject_texture(&mut p, &encode_skin_url(URL));
            assert!(p.property(TEXTURES_KEY).is_some(), "flavor {flavor:?}");
        }
    }

    #[test]
    fn capability_free_profile_is_left_alone() {
        let mut p = profile(SimCapabilities::none());
        inject_texture(&mut p, &encode_skin_url(URL));
        assert_eq!(p.skin_url(), None);
        assert!(p.property(TEXTURES_KEY).is_none());
        assert!(p.keyed_value(TEXTURES_KEY).is_none());
    }
}
