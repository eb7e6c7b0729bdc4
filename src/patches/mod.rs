//! Built-in version patches
//!
//! Three eras of host builds, registered most-specific first by the
//! bootstrap path in [`crate::applier`]:
//!
//! - [`OwnerProfilePatch`]: 1.21.9 and newer, official owner-profile setter
//! - [`ResolvableProfilePatch`]: 1.21 through 1.21.8, named-field injection
//! - [`LegacyScanPatch`]: 1.8 through 1.20, declared-field scan

mod legacy_scan;
mod owner_profile;
mod resolvable;

pub use legacy_scan::LegacyScanPatch;
pub use owner_profile::OwnerProfilePatch;
pub use resolvable::ResolvableProfilePatch;
