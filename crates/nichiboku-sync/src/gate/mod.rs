//! Plan-based access gating for premium content.
//!
//! - **Premium**: premium plan, active
//! - **Student**: student plan, active
//! - **AnyPaid**: any paid plan (basic, student, premium), active
//!
//! Decisions are never cached: every read goes back to the mirror's current
//! snapshot.

mod access_gate;
mod requirement;

pub use access_gate::{AccessGate, BlockedNotice, GateDecision, GateView};
pub use requirement::{has_access, Requirement};
