use rusqlite::Connection;

use crate::error::StorageError;

pub const SCHEMA_VERSION: i32 = 1;

pub fn init_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
    ",
    )?;
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at INTEGER NOT NULL
);
INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, unixepoch());

CREATE TABLE IF NOT EXISTS numbers (
    id INTEGER PRIMARY KEY,
    number TEXT NOT NULL,
    state INTEGER NOT NULL,
    UNIQUE (number, state)
);
CREATE INDEX IF NOT EXISTS idx_numbers_number ON numbers (number);

CREATE TABLE IF NOT EXISTS buddies (
    id INTEGER PRIMARY KEY,
    owner_id INTEGER NOT NULL,
    buddy_id INTEGER NOT NULL,
    nick TEXT NOT NULL,
    groups TEXT NOT NULL,
    image_hash TEXT NOT NULL,
    UNIQUE (owner_id, buddy_id)
);
CREATE INDEX IF NOT EXISTS idx_buddies_owner ON buddies (owner_id);
";
