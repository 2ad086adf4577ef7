use std::path::Path;
use rusqlite::{Connection, params};
use rusqlite::types::Value as SqlValue;
use serde_json::Value;
use anyhow::{Result, Context};

use crate::database::schema;
use crate::ingest::extract::{AuthorRecord, Extraction, PoemRecord};

/// Rows written for one source file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FileWrite {
    pub poems: usize,
    pub authors: usize,
}

/// Sequential writer over the poems database.
pub struct PoemStore {
    conn: Connection,
}

impl PoemStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open database")?;
        Self::from_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .context("Failed to enable foreign_keys")?;
        Ok(Self { conn })
    }

    pub fn ensure_schema(&self, schema_path: &Path) -> Result<()> {
        schema::ensure_schema(&self.conn, schema_path)
    }

    /// Insert everything one file produced and commit it as a unit.
    pub fn write_file(&mut self, extraction: &Extraction) -> Result<FileWrite> {
        let tx = self.conn.transaction().context("Failed to begin transaction")?;
        let mut written = FileWrite::default();

        for poem in &extraction.poems {
            insert_poem(&tx, poem)
                .with_context(|| format!("Failed to insert poem from {}", poem.source_file))?;
            written.poems += 1;
        }

        if let Some(author) = &extraction.author {
            written.authors += insert_author(&tx, author)
                .with_context(|| format!("Failed to insert author {}", author.name))?;
        }

        tx.commit().context("Failed to commit transaction")?;
        Ok(written)
    }

    /// Give every author named by a poem an `authors` row. Names that
    /// already have one are left alone.
    pub fn backfill_authors(&mut self) -> Result<usize> {
        let tx = self.conn.transaction().context("Failed to begin transaction")?;
        let inserted = tx
            .execute(
                r#"INSERT OR IGNORE INTO authors (name, dynasty, "desc")
                   SELECT author, dynasty, NULL
                   FROM poems
                   WHERE author IS NOT NULL AND author <> ''
                   GROUP BY author, dynasty"#,
                [],
            )
            .context("Failed to backfill authors")?;
        tx.commit().context("Failed to commit transaction")?;
        Ok(inserted)
    }

    pub fn count_poems(&self) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM poems")
    }

    pub fn count_authors(&self) -> Result<i64> {
        self.count("SELECT COUNT(*) FROM authors")
    }

    fn count(&self, sql: &str) -> Result<i64> {
        let n = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(n)
    }

    #[cfg(test)]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn insert_poem(conn: &Connection, poem: &PoemRecord) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO poems (title, author, dynasty, genre, source_file,
                            paragraphs_json, content, tags_json, extra_json)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;

    let extra_json = match &poem.extra {
        Some(extra) => Some(serde_json::to_string(extra)?),
        None => None,
    };

    stmt.execute(params![
        poem.title.as_ref().map(to_sql_value),
        poem.author,
        poem.dynasty.as_ref().map(to_sql_value),
        poem.genre.as_str(),
        poem.source_file,
        poem.paragraphs.as_ref().map(Value::to_string),
        poem.content,
        poem.tags.as_ref().map(Value::to_string),
        extra_json,
    ])?;
    Ok(())
}

/// Returns 1 if a row was written, 0 if the name was already known.
fn insert_author(conn: &Connection, author: &AuthorRecord) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        r#"INSERT OR IGNORE INTO authors (name, dynasty, "desc") VALUES (?1, ?2, ?3)"#,
    )?;
    let changed = stmt.execute(params![
        author.name,
        author.dynasty.as_ref().map(to_sql_value),
        author.desc.as_ref().map(to_sql_value),
    ])?;
    Ok(changed)
}

/// Bind a JSON scalar as its natural SQLite type; containers go in as JSON text.
fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => n.as_f64().map(SqlValue::Real).unwrap_or_else(|| SqlValue::Text(n.to_string())),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}
