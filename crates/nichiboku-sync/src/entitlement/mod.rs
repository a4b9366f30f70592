//! Live mirror of the signed-in user's entitlement document.

mod mirror;

pub use mirror::EntitlementMirror;
