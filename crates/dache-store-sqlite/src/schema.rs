//! SQL schema for the Dache SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per contact-form submission. Rows are never deleted and only
-- `status` is ever updated.
CREATE TABLE IF NOT EXISTS contact_inquiries (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    birthdate   TEXT NOT NULL,
    phone       TEXT NOT NULL,
    email       TEXT NOT NULL,
    gender      TEXT NOT NULL,
    education   TEXT NOT NULL,
    region      TEXT NOT NULL,
    occupation  TEXT NOT NULL,
    income      TEXT NOT NULL,
    meeting1    TEXT NOT NULL,
    meeting2    TEXT,
    created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
    status      TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'contacted', 'completed', 'cancelled')),
    ip_address  TEXT,
    user_agent  TEXT
);

CREATE INDEX IF NOT EXISTS inquiries_created_idx ON contact_inquiries(created_at);
CREATE INDEX IF NOT EXISTS inquiries_status_idx  ON contact_inquiries(status);

PRAGMA user_version = 1;
";

/// Column list shared by every `SELECT` that decodes a full row.
pub const COLUMNS: &str = "id, name, birthdate, phone, email, gender, education, region, \
                           occupation, income, meeting1, meeting2, created_at, status, \
                           ip_address, user_agent";
