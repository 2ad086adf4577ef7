use std::fs;
use std::path::Path;
use rusqlite::Connection;
use anyhow::{Result, Context};
use tracing::warn;

/// Schema applied when no schema file is supplied on disk.
pub const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS poems (
        id INTEGER PRIMARY KEY,
        title TEXT,
        author TEXT,
        dynasty TEXT,
        genre TEXT NOT NULL,
        source_file TEXT NOT NULL,
        paragraphs_json TEXT,
        content TEXT,
        tags_json TEXT,
        extra_json TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_poems_author ON poems(author);
    CREATE INDEX IF NOT EXISTS idx_poems_genre ON poems(genre);

    CREATE TABLE IF NOT EXISTS authors (
        id INTEGER PRIMARY KEY,
        name TEXT UNIQUE NOT NULL,
        dynasty TEXT,
        "desc" TEXT
    );
"#;

/// Run the schema script at `path` verbatim, or the built-in one if the
/// file does not exist.
pub fn ensure_schema(conn: &Connection, path: &Path) -> Result<()> {
    if !path.exists() {
        warn!("schema {} not found, using built-in schema", path.display());
        conn.execute_batch(SCHEMA).context("Failed to initialize schema")?;
        return Ok(());
    }

    let script = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file: {:?}", path))?;
    conn.execute_batch(&script)
        .with_context(|| format!("Failed to apply schema file: {:?}", path))?;
    Ok(())
}
