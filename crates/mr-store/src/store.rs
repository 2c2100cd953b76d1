use std::path::Path;

use rusqlite::{Connection, params};

use mr_core::BanishList;

use crate::error::Result;
use crate::schema;

/// SQLite-backed session state: the daily exclusion list, the checkpointed
/// deck, and the last pick, so successive CLI invocations behave like one
/// continuous picker session.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    // --- Metadata ---

    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM metadata WHERE key = ?1")?;
        let result = stmt.query_row([key], |row| row.get(0)).ok();
        Ok(result)
    }

    pub fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn delete_metadata(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM metadata WHERE key = ?1", [key])?;
        Ok(())
    }

    // --- Daily exclusion list ---

    /// Replace the persisted exclusion list. Insertion order is preserved
    /// through the seq column so a later load keeps undo LIFO.
    pub fn save_banished(&self, list: &BanishList) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM banished", [])?;
        tx.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES ('banish_date', ?1)",
            [&list.date],
        )?;
        {
            let mut stmt = tx.prepare("INSERT INTO banished (film_key) VALUES (?1)")?;
            for key in &list.ids {
                stmt.execute([key])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Load the persisted list as stored. Date freshness is the core's
    /// concern — a stale list is returned intact and ignored there.
    pub fn load_banished(&self) -> Result<BanishList> {
        let date = self.get_metadata("banish_date")?.unwrap_or_default();

        let mut stmt = self
            .conn
            .prepare("SELECT film_key FROM banished ORDER BY seq")?;
        let ids: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<_, _>>()?;

        Ok(BanishList { date, ids })
    }

    // --- Deck checkpoint ---

    /// Checkpoint the deck together with the settings fingerprint it was
    /// built under.
    pub fn save_deck(&self, deck: &[usize], fingerprint: &str) -> Result<()> {
        let json = serde_json::to_string(deck)?;
        self.set_metadata("deck", &json)?;
        self.set_metadata("settings", fingerprint)?;
        Ok(())
    }

    /// Restore the checkpointed deck, but only when the current settings
    /// fingerprint matches the one it was saved under — any control change
    /// invalidates the deck. An unreadable checkpoint is treated as
    /// absent, not as an error.
    pub fn load_deck(&self, fingerprint: &str) -> Result<Option<Vec<usize>>> {
        match self.get_metadata("settings")? {
            Some(stored) if stored == fingerprint => {}
            _ => return Ok(None),
        }
        let Some(json) = self.get_metadata("deck")? else {
            return Ok(None);
        };
        match serde_json::from_str(&json) {
            Ok(deck) => Ok(Some(deck)),
            Err(e) => {
                tracing::warn!("discarding unreadable deck checkpoint: {e}");
                Ok(None)
            }
        }
    }

    pub fn clear_deck(&self) -> Result<()> {
        self.delete_metadata("deck")?;
        self.delete_metadata("settings")?;
        Ok(())
    }

    // --- Last pick ---

    pub fn save_last_pick(&self, key: Option<&str>) -> Result<()> {
        match key {
            Some(key) => self.set_metadata("last_pick", key),
            None => self.delete_metadata("last_pick"),
        }
    }

    pub fn load_last_pick(&self) -> Result<Option<String>> {
        self.get_metadata("last_pick")
    }
}
