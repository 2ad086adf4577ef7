/// Directories checked under the corpus root, in order.
pub const CANDIDATE_DIRS: &[&str] = &[
    "json",
    "ci",
    "ci/ci.song",
    "ci/ci.song.1000",
    "ci/ci.song.200k",
    "poet",
    "poet/poet.tang",
    "poet/poet.song",
    "shi",
    "shi/shi.tang",
    "shi/shi.song",
    "tang",
    "song",
];

/// Keys of a top-level object that may hold a list of poems.
pub const LIST_KEYS: &[&str] = &["poems", "data", "items", "list"];

pub const PARAGRAPH_KEYS: &[&str] = &["paragraphs", "paragraph", "content"];

pub const AUTHOR_NAME_KEYS: &[&str] = &["name", "author"];

pub const AUTHOR_DESC_KEYS: &[&str] = &["desc", "description"];

/// Poem keys mapped to named columns. Anything else lands in `extra_json`.
pub const CONSUMED_KEYS: &[&str] = &[
    "title",
    "author",
    "paragraphs",
    "paragraph",
    "content",
    "dynasty",
    "tags",
];

/// Corpus layout conventions handed to the resolver and the extractor.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub candidate_dirs: Vec<String>,
    pub list_keys: Vec<String>,
    pub paragraph_keys: Vec<String>,
    pub author_name_keys: Vec<String>,
    pub author_desc_keys: Vec<String>,
    pub consumed_keys: Vec<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            candidate_dirs: to_owned(CANDIDATE_DIRS),
            list_keys: to_owned(LIST_KEYS),
            paragraph_keys: to_owned(PARAGRAPH_KEYS),
            author_name_keys: to_owned(AUTHOR_NAME_KEYS),
            author_desc_keys: to_owned(AUTHOR_DESC_KEYS),
            consumed_keys: to_owned(CONSUMED_KEYS),
        }
    }
}

impl ImportConfig {
    pub fn is_consumed(&self, key: &str) -> bool {
        self.consumed_keys.iter().any(|k| k == key)
    }
}

fn to_owned(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}
