use rusqlite::{params, Connection};

use crate::config::Config;
use crate::history::History;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "history store io error: {error}"),
            Self::Sql(error) => write!(f, "history store sql error: {error}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}

const SCHEMA: &str =
    "CREATE TABLE IF NOT EXISTS history (position INTEGER NOT NULL, text TEXT PRIMARY KEY)";

pub fn open_memory() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory()?;
    conn.execute(SCHEMA, [])?;
    Ok(conn)
}

pub fn open_from_config(cfg: &Config) -> Result<Connection, StoreError> {
    if let Some(parent) = cfg.history_db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(&cfg.history_db_path)?;
    conn.execute(SCHEMA, [])?;
    Ok(conn)
}

pub fn load(db: &Connection) -> Result<History, StoreError> {
    let mut stmt = db.prepare("SELECT text FROM history ORDER BY position ASC")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let mut entries = Vec::new();
    for row in rows {
        entries.push(row?);
    }
    Ok(History::from_entries(entries))
}

/// Replaces the stored history with `history` in one transaction.
pub fn save(db: &mut Connection, history: &History) -> Result<(), StoreError> {
    let tx = db.transaction()?;
    tx.execute("DELETE FROM history", [])?;
    {
        let mut insert = tx.prepare("INSERT INTO history (position, text) VALUES (?1, ?2)")?;
        for (position, text) in history.entries().iter().enumerate() {
            insert.execute(params![position as i64, text])?;
        }
    }
    tx.commit()?;
    Ok(())
}
