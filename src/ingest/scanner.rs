use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use tracing::warn;

use crate::utils::config::ImportConfig;

/// Directories under `root` that should be imported.
///
/// Known corpus entries that exist are returned in configured order. When
/// none of them exist, every directory that directly holds a `.json` file is
/// returned instead, sorted. A `root` that is not a directory has no data.
/// A candidate that exists as a plain file still counts and suppresses the
/// fallback, though `json_files` finds nothing in it.
pub fn find_data_dirs(root: &Path, config: &ImportConfig) -> Vec<PathBuf> {
    let dirs: Vec<PathBuf> = config
        .candidate_dirs
        .iter()
        .map(|name| root.join(name))
        .filter(|p| p.exists())
        .collect();

    if !dirs.is_empty() {
        return dirs;
    }

    let parents: BTreeSet<PathBuf> = json_files(root)
        .into_iter()
        .filter_map(|p| p.parent().map(Path::to_path_buf))
        .collect();
    parents.into_iter().collect()
}

/// Every `.json` file under `dir`, recursively, in file-name order. Dot
/// directories are walked too. Empty when `dir` is not a directory.
pub fn json_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    let walker = WalkDir::new(dir).sort_by_file_name().into_iter();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skip unreadable entry under {}: {}", dir.display(), e);
                continue;
            }
        };
        if entry.file_type().is_file() && is_json(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files
}

fn is_json(path: &Path) -> bool {
    path.extension().map(|ext| ext == "json").unwrap_or(false)
}
