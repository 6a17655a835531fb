use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_MATCH_CUTOFF: f64 = 0.6;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Song {
    pub title: String,
    pub lyrics: String,
    pub source_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChordBinding {
    /// Song title when the match succeeded, otherwise the chord file's own stem.
    pub key: String,
    pub file_path: PathBuf,
    /// Similarity of the accepted match; `None` for unmatched fallbacks.
    pub similarity: Option<f64>,
}

impl ChordBinding {
    pub fn is_matched(&self) -> bool {
        self.similarity.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct CatalogueOptions {
    pub songs_dir: PathBuf,
    pub chords_dir: PathBuf,
    pub document_extension: &'static str,
    pub chord_extension: &'static str,
    pub match_cutoff: f64,
}

impl Default for CatalogueOptions {
    fn default() -> Self {
        Self {
            songs_dir: PathBuf::from("songs"),
            chords_dir: PathBuf::from("chords"),
            document_extension: "docx",
            chord_extension: "pdf",
            match_cutoff: DEFAULT_MATCH_CUTOFF,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SearchMode {
    Exact,
    Semantic,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SearchOutcome {
    Matches(Vec<Song>),
    NoMatches,
    Answer(String),
    Failed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Guidance {
    pub reflection: String,
    pub verse: String,
}

#[derive(Debug, Clone, Copy)]
pub struct DispatcherOptions {
    pub timeout: Duration,
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}
