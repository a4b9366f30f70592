//! Schema SQL constants, shared by the migrations and the table-name checks.

/// V1: entitlements, screen progress, achievements, XP balances, event log.
pub const TABLES_V1: &str = "
    CREATE TABLE IF NOT EXISTS entitlements (
        uid TEXT PRIMARY KEY NOT NULL,
        plan TEXT,
        plan_status TEXT,
        plan_expires_at TEXT,
        updated_at TEXT NOT NULL
    ) STRICT;

    CREATE TABLE IF NOT EXISTS screen_progress (
        uid TEXT NOT NULL,
        screen_key TEXT NOT NULL,
        first_open_at TEXT,
        last_open_at TEXT,
        visits INTEGER NOT NULL DEFAULT 0,
        success_at TEXT,
        PRIMARY KEY (uid, screen_key)
    ) STRICT;

    CREATE TABLE IF NOT EXISTS achievements (
        uid TEXT NOT NULL,
        achievement_id TEXT NOT NULL,
        xp INTEGER NOT NULL DEFAULT 0,
        subtitle TEXT,
        meta TEXT,
        unlocked_at TEXT NOT NULL,
        PRIMARY KEY (uid, achievement_id)
    ) STRICT;

    CREATE TABLE IF NOT EXISTS xp_ledger (
        uid TEXT PRIMARY KEY NOT NULL,
        points INTEGER NOT NULL DEFAULT 0,
        updated_at TEXT NOT NULL
    ) STRICT;

    CREATE TABLE IF NOT EXISTS xp_weekly (
        uid TEXT NOT NULL,
        week_key TEXT NOT NULL,
        points INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (uid, week_key)
    ) STRICT;

    CREATE TABLE IF NOT EXISTS user_events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        uid TEXT NOT NULL,
        event_type TEXT NOT NULL,
        amount INTEGER NOT NULL DEFAULT 0,
        meta TEXT,
        created_at TEXT NOT NULL
    ) STRICT;

    CREATE INDEX IF NOT EXISTS idx_user_events_uid ON user_events(uid, id);
";

pub const TABLE_NAMES: [&str; 6] = [
    "entitlements",
    "screen_progress",
    "achievements",
    "xp_ledger",
    "xp_weekly",
    "user_events",
];
