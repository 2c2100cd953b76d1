use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: i64 = 1;

pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;

    // metadata holds the exclusion date, the checkpointed deck, the last
    // pick, and the settings fingerprint that guards deck reuse.
    // banished keeps insertion order through its AUTOINCREMENT seq so
    // undo can stay LIFO across restarts.
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS banished (
            seq      INTEGER PRIMARY KEY AUTOINCREMENT,
            film_key TEXT NOT NULL
        );
        ",
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}
