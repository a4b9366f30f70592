//! Progress ledger types: award requests, store results, read models.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::identifiers::AchievementId;

/// Award configuration for a screen entry. Supplied by the caller, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnterAward {
    /// XP for the first entry of this screen by this user.
    pub xp_on_enter: u32,
    /// XP for every later entry. 0 = nothing after the first.
    pub repeat_xp: u32,
    pub meta: Option<serde_json::Value>,
    /// Achievement granted (without XP) on entry.
    pub achievement_id: Option<AchievementId>,
    pub achievement_sub: Option<String>,
}

impl EnterAward {
    pub fn new(xp_on_enter: u32, repeat_xp: u32) -> Self {
        Self {
            xp_on_enter,
            repeat_xp,
            ..Default::default()
        }
    }

    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_achievement(mut self, id: impl Into<AchievementId>, sub: Option<&str>) -> Self {
        self.achievement_id = Some(id.into());
        self.achievement_sub = sub.map(str::to_string);
        self
    }
}

/// Award configuration for a successful screen completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuccessAward {
    /// XP for the first success. 0 still records the success marker.
    pub xp_on_success: u32,
    pub meta: Option<serde_json::Value>,
    pub achievement_id: Option<AchievementId>,
    pub achievement_sub: Option<String>,
}

impl SuccessAward {
    pub fn new(xp_on_success: u32) -> Self {
        Self {
            xp_on_success,
            ..Default::default()
        }
    }

    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_achievement(mut self, id: impl Into<AchievementId>, sub: Option<&str>) -> Self {
        self.achievement_id = Some(id.into());
        self.achievement_sub = sub.map(str::to_string);
        self
    }
}

/// Caller-side options for an achievement grant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AchievementAward {
    /// XP added only when the achievement is granted for the first time.
    pub xp: u32,
    pub sub: Option<String>,
    pub meta: Option<serde_json::Value>,
}

impl AchievementAward {
    pub fn new(xp: u32) -> Self {
        Self {
            xp,
            ..Default::default()
        }
    }

    pub fn with_sub(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Store-side achievement write command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementGrant {
    pub achievement_id: AchievementId,
    pub xp: u32,
    pub subtitle: Option<String>,
    pub meta: Option<serde_json::Value>,
}

impl AchievementGrant {
    pub fn new(achievement_id: AchievementId, award: &AchievementAward) -> Self {
        Self {
            achievement_id,
            xp: award.xp,
            subtitle: award.sub.clone(),
            meta: award.meta.clone(),
        }
    }
}

/// Result of an atomic entry write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryRecord {
    pub first_time: bool,
    pub xp_granted: u32,
    pub visits: u32,
}

/// Result of an atomic success write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuccessRecord {
    pub first_time: bool,
    pub xp_granted: u32,
}

/// A persisted achievement row. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementRecord {
    pub achievement_id: AchievementId,
    pub xp: u32,
    pub subtitle: Option<String>,
    pub meta: Option<serde_json::Value>,
    pub unlocked_at: DateTime<Utc>,
}

/// Confirmed XP totals read back from the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpTotals {
    pub points: u64,
    pub weekly_progress: u64,
    pub week_key: String,
}

/// Kinds of rows in the per-user event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserEventType {
    ScreenOpenFirst,
    ScreenOpenRepeat,
    ScreenSuccess,
    AchievementUnlocked,
}

impl UserEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScreenOpenFirst => "screen_open_first",
            Self::ScreenOpenRepeat => "screen_open_repeat",
            Self::ScreenSuccess => "screen_success",
            Self::AchievementUnlocked => "achievement_unlocked",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "screen_open_first" => Some(Self::ScreenOpenFirst),
            "screen_open_repeat" => Some(Self::ScreenOpenRepeat),
            "screen_success" => Some(Self::ScreenSuccess),
            "achievement_unlocked" => Some(Self::AchievementUnlocked),
            _ => None,
        }
    }
}

/// A row of the per-user event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEvent {
    pub id: i64,
    pub event_type: UserEventType,
    pub amount: u32,
    pub meta: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// ISO week key `YYYY_WW` used to bucket weekly progress.
pub fn week_key(at: DateTime<Utc>) -> String {
    let week = at.iso_week();
    format!("{}_{:02}", week.year(), week.week())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_week_key_format() {
        let at = Utc.with_ymd_and_hms(2025, 3, 5, 12, 0, 0).unwrap();
        assert_eq!(week_key(at), "2025_10");
    }

    #[test]
    fn test_week_key_uses_iso_year() {
        // 2024-12-30 belongs to ISO week 1 of 2025.
        let at = Utc.with_ymd_and_hms(2024, 12, 30, 0, 0, 0).unwrap();
        assert_eq!(week_key(at), "2025_01");
    }

    #[test]
    fn test_event_type_str_roundtrip() {
        for t in [
            UserEventType::ScreenOpenFirst,
            UserEventType::ScreenOpenRepeat,
            UserEventType::ScreenSuccess,
            UserEventType::AchievementUnlocked,
        ] {
            assert_eq!(UserEventType::parse(t.as_str()), Some(t));
        }
    }

    #[test]
    fn test_enter_award_builder() {
        let award = EnterAward::new(10, 0).with_achievement("n5_explorador", Some("Explorador"));
        assert_eq!(award.xp_on_enter, 10);
        assert_eq!(award.repeat_xp, 0);
        assert_eq!(award.achievement_id.unwrap().as_str(), "n5_explorador");
        assert_eq!(award.achievement_sub.as_deref(), Some("Explorador"));
    }
}
