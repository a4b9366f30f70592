use std::fmt;

use nichiboku_core::types::EntitlementSnapshot;
use serde::{Deserialize, Serialize};

/// What a gated screen asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    Premium,
    Student,
    AnyPaid,
}

impl Requirement {
    pub const ALL: [Requirement; 3] = [Self::Premium, Self::Student, Self::AnyPaid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Premium => "premium",
            Self::Student => "student",
            Self::AnyPaid => "any_paid",
        }
    }

    /// Plan name used in the blocked-screen message.
    pub fn plan_label(&self) -> &'static str {
        match self {
            Self::Premium => "Premium",
            Self::Student => "Student",
            Self::AnyPaid => "active",
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pure access predicate.
pub fn has_access(snapshot: &EntitlementSnapshot, required: Requirement) -> bool {
    match required {
        Requirement::Premium => snapshot.is_premium_active(),
        Requirement::Student => snapshot.is_student_active(),
        Requirement::AnyPaid => snapshot.has_any_paid_plan(),
    }
}
