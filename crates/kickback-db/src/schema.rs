//! SQL schema definitions.

/// Complete schema for Kickback v1 database.
pub const SCHEMA_V1: &str = r#"
-- ============================================================
-- Users & referral graph
-- ============================================================

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    referrer_id INTEGER REFERENCES users(id),
    home_country TEXT,
    current_market TEXT,
    current_market_set_at INTEGER,
    lifetime_referral_count INTEGER NOT NULL DEFAULT 0,
    permanent_override_bps INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_users_referrer ON users(referrer_id);

-- ============================================================
-- Commissions & payouts
-- ============================================================

CREATE TABLE IF NOT EXISTS commissions (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id),
    gross_minor INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'approved', 'paid', 'rejected')),
    finalized_at INTEGER,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_commissions_user ON commissions(user_id);
CREATE INDEX IF NOT EXISTS idx_commissions_status ON commissions(status);

CREATE TABLE IF NOT EXISTS payouts (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id),
    amount_minor INTEGER NOT NULL,
    method TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'processing', 'paid', 'failed')),
    detail TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_payouts_user ON payouts(user_id);

-- ============================================================
-- Referral bonus groups
-- ============================================================

CREATE TABLE IF NOT EXISTS referral_groups (
    id INTEGER PRIMARY KEY,
    referrer_id INTEGER NOT NULL REFERENCES users(id),
    started_at INTEGER NOT NULL,
    expires_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_groups_referrer ON referral_groups(referrer_id);

-- An invitee joins at most one group per referrer; the UNIQUE constraint
-- is what makes concurrent batch formation safe.
CREATE TABLE IF NOT EXISTS referral_group_members (
    group_id INTEGER NOT NULL REFERENCES referral_groups(id) ON DELETE CASCADE,
    referrer_id INTEGER NOT NULL REFERENCES users(id),
    invitee_id INTEGER NOT NULL REFERENCES users(id),
    PRIMARY KEY (group_id, invitee_id),
    UNIQUE (referrer_id, invitee_id)
);

-- ============================================================
-- Merchant geo rules
-- ============================================================

CREATE TABLE IF NOT EXISTS merchants (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    allow_countries TEXT NOT NULL DEFAULT '[]',
    block_countries TEXT NOT NULL DEFAULT '[]'
);
"#;
