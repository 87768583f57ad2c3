use std::path::Path;

use chrono::NaiveDateTime;
use rusqlite::{Connection, Result as SqliteResult};
use thiserror::Error;

use crate::calendar::{DisplayZone, Event};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Failed to prepare database directory: {0}")]
    IoError(#[from] std::io::Error),
}

/// Events entered by administrators. Recurring services are never stored
/// here; they are recomputed on load.
pub struct EventStore {
    conn: Connection,
}

impl EventStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let store = Self::new(Connection::open(path)?);
        store.initialize()?;
        Ok(store)
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                start_at TEXT NOT NULL,
                data TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    pub fn store_event(&self, event: &Event) -> Result<(), StoreError> {
        let data = serde_json::to_string(event)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO events (id, title, start_at, data)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![&event.id, &event.title, &event.start_at, &data],
        )?;
        Ok(())
    }

    /// Stores all events in one transaction; nothing is kept if any insert
    /// fails.
    pub fn store_events(&mut self, events: &[Event]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO events (id, title, start_at, data)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for event in events {
                let data = serde_json::to_string(event)?;
                stmt.execute(rusqlite::params![&event.id, &event.title, &event.start_at, &data])?;
            }
        }
        tx.commit()?;
        Ok(events.len())
    }

    pub fn load_event(&self, id: &str) -> Result<Option<Event>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT data FROM events WHERE id = ?1")?;
        let mut rows = stmt.query([id])?;

        if let Some(row) = rows.next()? {
            let data: String = row.get(0)?;
            let event: Event = serde_json::from_str(&data)?;
            Ok(Some(event))
        } else {
            Ok(None)
        }
    }

    /// Returns whether a row was removed.
    pub fn delete_event(&self, id: &str) -> Result<bool, StoreError> {
        let removed = self.conn.execute("DELETE FROM events WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }

    pub fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT data FROM events ORDER BY start_at, id")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut events = Vec::new();
        for data in rows {
            events.push(serde_json::from_str(&data?)?);
        }
        Ok(events)
    }

    /// Events starting at or after `now`, oldest first. Rows whose start
    /// cannot be parsed are skipped.
    pub fn load_upcoming(&self, now: NaiveDateTime, zone: DisplayZone) -> Result<Vec<Event>, StoreError> {
        let mut upcoming: Vec<(NaiveDateTime, Event)> = Vec::new();

        for event in self.list_events()? {
            match event.starts_at(zone) {
                Some(start) if start >= now => upcoming.push((start, event)),
                Some(_) => {}
                None => tracing::warn!("event {} has unparseable start '{}'", event.id, event.start_at),
            }
        }

        upcoming.sort_by_key(|(start, _)| *start);
        Ok(upcoming.into_iter().map(|(_, event)| event).collect())
    }

    pub fn table_exists(&self, table_name: &str) -> bool {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table_name],
            |row| row.get(0),
        );
        result.unwrap_or(0) > 0
    }
}
