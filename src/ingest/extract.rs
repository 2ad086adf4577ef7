//! Maps parsed corpus documents onto flat poem and author rows.

use serde_json::{Map, Value};

use crate::ingest::genre::Genre;
use crate::utils::config::ImportConfig;

/// One row destined for the `poems` table.
#[derive(Debug, Clone, PartialEq)]
pub struct PoemRecord {
    pub title: Option<Value>,
    pub author: Option<String>,
    pub dynasty: Option<Value>,
    pub genre: Genre,
    pub source_file: String,
    pub paragraphs: Option<Value>,
    pub content: Option<String>,
    pub tags: Option<Value>,
    pub extra: Option<Map<String, Value>>,
}

/// One row destined for the `authors` table.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorRecord {
    pub name: String,
    pub dynasty: Option<Value>,
    pub desc: Option<Value>,
}

/// Everything a single file contributes.
#[derive(Debug, Default)]
pub struct Extraction {
    pub poems: Vec<PoemRecord>,
    pub author: Option<AuthorRecord>,
}

/// Extract rows from one parsed file.
///
/// Arrays contribute each object element as a poem. Objects contribute the
/// object elements of every list key that holds an array, and may also
/// describe an author on their own. Scalars contribute nothing.
pub fn extract_records(
    value: &Value,
    genre: Genre,
    source_file: &str,
    config: &ImportConfig,
) -> Extraction {
    let mut extraction = Extraction::default();

    match value {
        Value::Array(items) => {
            extraction.poems.extend(
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(|rec| map_poem(rec, genre, source_file, config)),
            );
        }
        Value::Object(obj) => {
            for key in &config.list_keys {
                if let Some(Value::Array(items)) = obj.get(key) {
                    extraction.poems.extend(
                        items
                            .iter()
                            .filter_map(Value::as_object)
                            .map(|rec| map_poem(rec, genre, source_file, config)),
                    );
                }
            }
            extraction.author = map_author(obj, config);
        }
        _ => {}
    }

    extraction
}

/// Map one poem object onto its columns.
pub fn map_poem(
    rec: &Map<String, Value>,
    genre: Genre,
    source_file: &str,
    config: &ImportConfig,
) -> PoemRecord {
    let paragraphs = first_truthy(rec, &config.paragraph_keys);
    let content = paragraphs.as_ref().and_then(join_paragraphs);

    let extra: Map<String, Value> = rec
        .iter()
        .filter(|(k, _)| !config.is_consumed(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    PoemRecord {
        title: present(rec.get("title")),
        author: rec.get("author").and_then(normalize_author_name),
        dynasty: present(rec.get("dynasty")),
        genre,
        source_file: source_file.to_string(),
        paragraphs,
        content,
        tags: present(rec.get("tags")),
        extra: if extra.is_empty() { None } else { Some(extra) },
    }
}

/// An object is author-shaped when it has a truthy name plus a truthy
/// description or dynasty.
fn map_author(obj: &Map<String, Value>, config: &ImportConfig) -> Option<AuthorRecord> {
    let name = first_truthy(obj, &config.author_name_keys)?;
    if !is_truthy(&name) {
        return None;
    }
    let desc = first_truthy(obj, &config.author_desc_keys).filter(is_truthy);
    let dynasty = present(obj.get("dynasty"));

    let has_dynasty = dynasty.as_ref().map(is_truthy).unwrap_or(false);
    if desc.is_none() && !has_dynasty {
        return None;
    }

    Some(AuthorRecord {
        name: normalize_author_name(&name)?,
        dynasty,
        desc,
    })
}

/// Trimmed when textual, JSON text otherwise, absent for null.
pub fn normalize_author_name(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

/// Lists are joined line by line; strings pass through; anything else has
/// no text form.
pub fn join_paragraphs(paragraphs: &Value) -> Option<String> {
    match paragraphs {
        Value::Array(lines) => Some(
            lines
                .iter()
                .map(|line| match line {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Truthiness as the corpus tooling has always applied it: empty and zero
/// values count as missing.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// First truthy value among `keys`, else whatever the last key holds.
fn first_truthy(rec: &Map<String, Value>, keys: &[String]) -> Option<Value> {
    keys.iter()
        .filter_map(|k| rec.get(k))
        .find(|v| is_truthy(v))
        .or_else(|| keys.last().and_then(|k| rec.get(k)))
        .and_then(|v| present(Some(v)))
}

fn present(value: Option<&Value>) -> Option<Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.clone()),
    }
}
