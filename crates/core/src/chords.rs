//! Binds loosely named chord sheets to canonical song titles.
//!
//! Chord files rarely carry the exact song title: punctuation is dropped,
//! words are glued together, letters are lower-cased. Each file stem is
//! cleaned, compared with every title, and bound to the closest one when the
//! similarity reaches the cutoff. Files with no close title stay reachable
//! under their own stem.

use crate::error::LoadError;
use crate::loader::{discover_files, file_stem};
use crate::models::{ChordBinding, SkippedFile};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Keeps alphanumerics and whitespace, lower-cased.
pub fn normalize_stem(stem: &str) -> String {
    stem.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Similarity ratio in `0.0..=1.0` between two already normalized strings.
pub fn similarity(left: &str, right: &str) -> f64 {
    strsim::normalized_levenshtein(left, right)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TitleMatch {
    pub title: String,
    pub score: f64,
}

/// Best title for a cleaned stem, or `None` below `cutoff`.
///
/// Titles are normalized like the stem before comparing. Equal scores keep
/// the title that comes first in iteration order, so callers passing titles
/// in ascending order get the alphabetically first one.
pub fn best_match<'a>(
    cleaned_stem: &str,
    titles: impl IntoIterator<Item = &'a str>,
    cutoff: f64,
) -> Option<TitleMatch> {
    if cleaned_stem.trim().is_empty() {
        return None;
    }

    let mut best: Option<TitleMatch> = None;
    for title in titles {
        let score = similarity(cleaned_stem, &normalize_stem(title));
        if score < cutoff {
            continue;
        }
        let better = best.as_ref().map_or(true, |current| score > current.score);
        if better {
            best = Some(TitleMatch {
                title: title.to_string(),
                score,
            });
        }
    }

    best
}

#[derive(Debug, Clone)]
pub struct DuplicateChord {
    pub key: String,
    pub path: PathBuf,
    pub kept: PathBuf,
}

#[derive(Debug, Default)]
pub struct ChordMatchReport {
    pub bindings: BTreeMap<String, ChordBinding>,
    pub duplicates: Vec<DuplicateChord>,
    pub skipped: Vec<SkippedFile>,
}

/// Resolves the key a single chord file binds under. `titles` must be
/// ascending; a stem spelled exactly like a title always binds to it.
pub fn resolve_chord(path: &Path, titles: &[String], cutoff: f64) -> Result<ChordBinding, LoadError> {
    let stem = file_stem(path)?;
    if titles.binary_search(&stem).is_ok() {
        return Ok(ChordBinding {
            key: stem,
            file_path: path.to_path_buf(),
            similarity: Some(1.0),
        });
    }

    let cleaned = normalize_stem(&stem);
    let binding = match best_match(&cleaned, titles.iter().map(String::as_str), cutoff) {
        Some(found) => ChordBinding {
            key: found.title,
            file_path: path.to_path_buf(),
            similarity: Some(found.score),
        },
        None => ChordBinding {
            key: stem,
            file_path: path.to_path_buf(),
            similarity: None,
        },
    };

    Ok(binding)
}

/// Binds every chord file in `folder` against `titles` (ascending).
///
/// The first file in path order wins when two files resolve to the same key.
pub fn match_chord_files(
    folder: &Path,
    extension: &str,
    titles: &[String],
    cutoff: f64,
) -> Result<ChordMatchReport, LoadError> {
    let mut report = ChordMatchReport::default();

    for path in discover_files(folder, extension)? {
        let binding = match resolve_chord(&path, titles, cutoff) {
            Ok(binding) => binding,
            Err(error) => {
                report.skipped.push(SkippedFile {
                    path,
                    reason: error.to_string(),
                });
                continue;
            }
        };

        if let Some(kept) = report.bindings.get(&binding.key) {
            report.duplicates.push(DuplicateChord {
                key: binding.key,
                path,
                kept: kept.file_path.clone(),
            });
            continue;
        }

        report.bindings.insert(binding.key.clone(), binding);
    }

    Ok(report)
}
