//! Typed results of ledger operations. None of them is an error: a failed
//! write is reported as a skip and logged where it happened.

/// Why an award attempt did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// No signed-in user.
    NoSession,
    /// The same key is already being awarded in this screen scope.
    InFlight,
    /// The store transaction failed; nothing was persisted.
    WriteFailed,
}

/// Result of a success or achievement award.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwardOutcome {
    /// This call created the record and added `xp`.
    Granted { xp: u32 },
    /// The record already existed. No XP.
    AlreadyGranted,
    Skipped(SkipReason),
}

impl AwardOutcome {
    /// `true` only for the one call that created the record.
    pub fn first_time(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }

    pub fn xp_granted(&self) -> u32 {
        match self {
            Self::Granted { xp } => *xp,
            _ => 0,
        }
    }

    /// The store has answered; retrying in this scope cannot change anything.
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Skipped(_))
    }
}

/// Result of recording a screen entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterOutcome {
    First { xp: u32, visits: u32 },
    Repeat { xp: u32, visits: u32 },
    /// This scope already recorded its entry.
    AlreadyEntered,
    Skipped(SkipReason),
}

impl EnterOutcome {
    pub fn first_time(&self) -> bool {
        matches!(self, Self::First { .. })
    }

    pub fn xp_granted(&self) -> u32 {
        match self {
            Self::First { xp, .. } | Self::Repeat { xp, .. } => *xp,
            Self::AlreadyEntered | Self::Skipped(_) => 0,
        }
    }

    pub fn visits(&self) -> Option<u32> {
        match self {
            Self::First { visits, .. } | Self::Repeat { visits, .. } => Some(*visits),
            Self::AlreadyEntered | Self::Skipped(_) => None,
        }
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Skipped(_))
    }
}
