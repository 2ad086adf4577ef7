use std::path::Path;

/// Coarse corpus classification inferred from a file's location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Genre {
    Tang,
    Song,
    Ci,
    Other,
}

impl Genre {
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Tang => "tang",
            Genre::Song => "song",
            Genre::Ci => "ci",
            Genre::Other => "other",
        }
    }
}

/// Classify by whole path segments, case-insensitively. `tang` beats
/// everything and `ci` beats `song`.
pub fn detect_genre(path: &Path) -> Genre {
    let segments: Vec<String> = path
        .iter()
        .map(|s| s.to_string_lossy().to_lowercase())
        .collect();
    let has = |name: &str| segments.iter().any(|s| s == name);

    if has("tang") {
        Genre::Tang
    } else if has("ci") {
        Genre::Ci
    } else if has("song") {
        Genre::Song
    } else {
        Genre::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tang_wins_over_everything() {
        assert_eq!(detect_genre(Path::new("tang/poet.tang.0.json")), Genre::Tang);
        assert_eq!(detect_genre(Path::new("song/ci/tang/x.json")), Genre::Tang);
        assert_eq!(detect_genre(Path::new("ci/TANG/x.json")), Genre::Tang);
    }

    #[test]
    fn test_song_and_ci_is_ci() {
        assert_eq!(detect_genre(Path::new("song/ci/x.json")), Genre::Ci);
        assert_eq!(detect_genre(Path::new("ci/song/x.json")), Genre::Ci);
    }

    #[test]
    fn test_single_segments() {
        assert_eq!(detect_genre(Path::new("Ci/ci.song.1000.json")), Genre::Ci);
        assert_eq!(detect_genre(Path::new("SONG/a.json")), Genre::Song);
        assert_eq!(detect_genre(Path::new("shijing/shijing.json")), Genre::Other);
    }

    #[test]
    fn test_requires_whole_segment() {
        assert_eq!(detect_genre(Path::new("ci/ci.song/x.json")), Genre::Ci);
        assert_eq!(detect_genre(Path::new("poet/poet.song/x.json")), Genre::Other);
        assert_eq!(detect_genre(Path::new("json/tang.json")), Genre::Other);
    }

    #[test]
    fn test_column_value() {
        assert_eq!(Genre::Ci.as_str(), "ci");
        assert_eq!(Genre::Other.as_str(), "other");
    }
}
