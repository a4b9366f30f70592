//! Raw SQL, one module per table. Functions take a `&Connection` (a
//! transaction derefs to one) and never open transactions themselves.

pub mod achievement_ops;
pub mod entitlement_ops;
pub mod event_ops;
pub mod progress_ops;
pub mod xp_ops;
