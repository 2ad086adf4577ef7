use std::fs;
use std::path::{Path, PathBuf};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::{info, warn};

use crate::database::repo::PoemStore;
use crate::error::ImportError;
use crate::ingest::extract::extract_records;
use crate::ingest::genre::detect_genre;
use crate::ingest::scanner;
use crate::utils::config::ImportConfig;

/// Totals for one import run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    pub dirs: usize,
    pub files_imported: usize,
    pub files_skipped: usize,
    pub poems: usize,
    pub authors: usize,
}

/// Feeds the JSON files under a corpus root into a `PoemStore`.
pub struct Importer<'a> {
    store: &'a mut PoemStore,
    root: PathBuf,
    config: &'a ImportConfig,
    stats: ImportStats,
}

impl<'a> Importer<'a> {
    pub fn new(store: &'a mut PoemStore, root: &Path, config: &'a ImportConfig) -> Self {
        Self {
            store,
            root: root.to_path_buf(),
            config,
            stats: ImportStats::default(),
        }
    }

    /// Import every directory in order. Unreadable files are skipped; a
    /// database failure aborts the run with earlier files already committed.
    pub fn run(mut self, dirs: &[PathBuf]) -> Result<ImportStats> {
        for dir in dirs {
            info!("Importing {}", dir.display());
            self.import_dir(dir)?;
            self.stats.dirs += 1;
        }
        Ok(self.stats)
    }

    fn import_dir(&mut self, dir: &Path) -> Result<()> {
        let files = scanner::json_files(dir);

        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb.set_message(dir.display().to_string());

        for path in &files {
            self.import_file(path)?;
            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(())
    }

    fn import_file(&mut self, path: &Path) -> Result<()> {
        let data = match load_json(path) {
            Ok(data) => data,
            Err(e) => {
                warn!("skip {}: {}", path.display(), e);
                self.stats.files_skipped += 1;
                return Ok(());
            }
        };

        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        let genre = detect_genre(rel);
        let source_file = rel.to_string_lossy();

        let extraction = extract_records(&data, genre, &source_file, self.config);
        let written = self.store.write_file(&extraction)?;

        self.stats.files_imported += 1;
        self.stats.poems += written.poems;
        self.stats.authors += written.authors;
        Ok(())
    }
}

/// Read and parse one file, keeping the failure typed so callers can skip it.
pub fn load_json(path: &Path) -> Result<Value, ImportError> {
    let text = fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ImportError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
