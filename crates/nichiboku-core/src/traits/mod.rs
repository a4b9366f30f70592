//! Store traits: the contract between the sync core and the authoritative
//! store. The SQLite implementation lives in `nichiboku-storage`.
//! All traits are `Send + Sync` and have blanket `Arc<T>` impls.

pub mod entitlement_source;
pub mod progress_store;

pub use entitlement_source::{EntitlementFeed, EntitlementUpdate, IEntitlementSource};
pub use progress_store::IProgressStore;
