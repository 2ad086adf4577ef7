mod database;
mod error;
mod ingest;
mod utils;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use anyhow::{Result, Context};
use clap::Parser;
use tracing::info;

use crate::database::repo::PoemStore;
use crate::error::{exit_code_for, ImportError};
use crate::ingest::importer::{ImportStats, Importer};
use crate::ingest::scanner;
use crate::utils::config::ImportConfig;

/// Convert a chinese-poetry JSON checkout into a SQLite database.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the cloned poetry corpus
    #[arg(short, long, env = "POETRY_SOURCE")]
    source: PathBuf,

    /// Output SQLite database path
    #[arg(short, long, env = "POETRY_DB", default_value = "poems.sqlite3")]
    db: PathBuf,

    /// SQL script applied before import
    #[arg(long, env = "POETRY_SCHEMA", default_value = "schema.sql")]
    schema: PathBuf,
}

#[derive(Debug)]
struct Summary {
    stats: ImportStats,
    backfilled: usize,
    total_poems: i64,
    total_authors: i64,
    db_path: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    match run(&args) {
        Ok(summary) => {
            info!(
                "Imported {} files ({} skipped): {} poems, {} authors, {} backfilled authors",
                summary.stats.files_imported,
                summary.stats.files_skipped,
                summary.stats.poems,
                summary.stats.authors,
                summary.backfilled,
            );
            info!(
                "Database now holds {} poems and {} authors",
                summary.total_poems, summary.total_authors,
            );
            info!("Wrote {}", summary.db_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

fn run(args: &Args) -> Result<Summary> {
    if !args.source.exists() {
        return Err(ImportError::SourceNotFound(args.source.clone()).into());
    }
    let source = args.source.canonicalize()
        .with_context(|| format!("Failed to resolve source: {:?}", args.source))?;
    let db_path = absolute(&args.db)?;

    let mut store = PoemStore::open(&db_path)?;
    store.ensure_schema(&args.schema)?;

    let config = ImportConfig::default();
    let dirs = scanner::find_data_dirs(&source, &config);
    if dirs.is_empty() {
        return Err(ImportError::NoDataDirs(source).into());
    }
    info!("Found {} data dirs", dirs.len());

    let stats = Importer::new(&mut store, &source, &config).run(&dirs)?;
    let backfilled = store.backfill_authors()?;
    info!("Backfilled {} authors from poems", backfilled);

    Ok(Summary {
        stats,
        backfilled,
        total_poems: store.count_poems()?,
        total_authors: store.count_authors()?,
        db_path,
    })
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn args(source: &Path, db: &Path) -> Args {
        Args {
            source: source.to_path_buf(),
            db: db.to_path_buf(),
            schema: source.join("no-such-schema.sql"),
        }
    }

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    fn counts(db: &Path) -> (i64, i64) {
        let conn = rusqlite::Connection::open(db).unwrap();
        let poems = conn.query_row("SELECT COUNT(*) FROM poems", [], |r| r.get(0)).unwrap();
        let authors = conn.query_row("SELECT COUNT(*) FROM authors", [], |r| r.get(0)).unwrap();
        (poems, authors)
    }

    #[test]
    fn test_missing_source_argument_is_usage_error() {
        let err = Args::try_parse_from(["poetry-archive", "--db", "x.sqlite3"]);
        if std::env::var_os("POETRY_SOURCE").is_none() {
            assert_eq!(err.unwrap_err().exit_code(), 2);
        }
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["poetry-archive", "--source", "corpus"]).unwrap();
        assert_eq!(args.source, PathBuf::from("corpus"));
        if std::env::var_os("POETRY_DB").is_none() {
            assert_eq!(args.db, PathBuf::from("poems.sqlite3"));
        }
        if std::env::var_os("POETRY_SCHEMA").is_none() {
            assert_eq!(args.schema, PathBuf::from("schema.sql"));
        }
    }

    #[test]
    fn test_nonexistent_source_exits_2_without_touching_db() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("out.sqlite3");

        let err = run(&args(&dir.path().join("missing"), &db)).unwrap_err();
        assert_eq!(exit_code_for(&err), 2);
        assert!(!db.exists());
    }

    #[test]
    fn test_no_json_exits_3() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("corpus");
        write(&source, "README.md", "# corpus");

        let err = run(&args(&source, &dir.path().join("out.sqlite3"))).unwrap_err();
        assert!(matches!(err.downcast_ref::<ImportError>(), Some(ImportError::NoDataDirs(_))));
        assert_eq!(exit_code_for(&err), 3);
    }

    #[test]
    fn test_file_source_exits_3() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "target.json", r#"[{"title": "t"}]"#);
        write(dir.path(), "sibling/other.json", r#"[{"title": "sibling"}]"#);
        let db = dir.path().join("out.sqlite3");

        let err = run(&args(&dir.path().join("target.json"), &db)).unwrap_err();
        assert_eq!(exit_code_for(&err), 3);
        assert_eq!(counts(&db), (0, 0));
    }

    #[test]
    fn test_valid_and_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("corpus");
        let db = dir.path().join("out.sqlite3");
        write(
            &source,
            "json/poet.tang.0.json",
            r#"[{"title": "登鹳雀楼", "author": "王之涣", "dynasty": "tang",
                 "paragraphs": ["白日依山尽", "黄河入海流"]}]"#,
        );
        write(&source, "json/broken.json", "[{]");

        let summary = run(&args(&source, &db)).unwrap();
        assert_eq!(summary.stats.files_imported, 1);
        assert_eq!(summary.stats.files_skipped, 1);
        assert_eq!(summary.backfilled, 1);
        assert_eq!(counts(&db), (1, 1));
        assert_eq!((summary.total_poems, summary.total_authors), (1, 1));
    }

    #[test]
    fn test_second_run_doubles_poems_only() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("corpus");
        let db = dir.path().join("out.sqlite3");
        write(
            &source,
            "song/poet.song.0.json",
            r#"[{"title": "a", "author": "苏轼", "dynasty": "song", "paragraphs": ["x"]},
                {"title": "b", "author": "陆游", "dynasty": "song", "paragraphs": ["y"]}]"#,
        );
        write(
            &source,
            "song/authors.song.json",
            r#"{"name": "苏轼", "desc": "字子瞻", "dynasty": "song"}"#,
        );

        run(&args(&source, &db)).unwrap();
        assert_eq!(counts(&db), (2, 2));

        run(&args(&source, &db)).unwrap();
        assert_eq!(counts(&db), (4, 2));
    }

    #[test]
    fn test_author_file_beats_backfill() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("corpus");
        let db = dir.path().join("out.sqlite3");
        // Poems sort before the author file, yet the description survives.
        write(&source, "tang/a.json", r#"[{"author": "李白", "dynasty": "唐"}]"#);
        write(&source, "tang/z.json", r#"{"name": "李白", "desc": "诗仙", "dynasty": "tang"}"#);

        run(&args(&source, &db)).unwrap();

        let conn = rusqlite::Connection::open(&db).unwrap();
        let (dynasty, desc): (String, String) = conn
            .query_row(r#"SELECT dynasty, "desc" FROM authors WHERE name = '李白'"#, [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(dynasty, "tang");
        assert_eq!(desc, "诗仙");
    }
}
