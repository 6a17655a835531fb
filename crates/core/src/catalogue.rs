use crate::chords::{match_chord_files, DuplicateChord};
use crate::docx::DocxExtractor;
use crate::error::{LoadError, NotFound};
use crate::loader::load_songs;
use crate::models::{CatalogueOptions, ChordBinding, SkippedFile, Song};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Immutable index of songs and their chord sheets.
#[derive(Debug, Clone)]
pub struct Catalogue {
    songs: BTreeMap<String, Song>,
    chords: BTreeMap<String, ChordBinding>,
    titles: Vec<String>,
    skipped: Vec<SkippedFile>,
    duplicate_chords: Vec<DuplicateChord>,
    loaded_at: DateTime<Utc>,
}

impl Catalogue {
    /// Loads songs first, then matches chord files against their titles.
    pub fn build(options: &CatalogueOptions) -> Result<Self, LoadError> {
        let song_report = load_songs(&options.songs_dir, options.document_extension, &DocxExtractor)?;
        let titles: Vec<String> = song_report.songs.keys().cloned().collect();

        let chord_report = match_chord_files(
            &options.chords_dir,
            options.chord_extension,
            &titles,
            options.match_cutoff,
        )?;

        let mut skipped = song_report.skipped;
        skipped.extend(chord_report.skipped);

        Ok(Self {
            songs: song_report.songs,
            chords: chord_report.bindings,
            titles,
            skipped,
            duplicate_chords: chord_report.duplicates,
            loaded_at: Utc::now(),
        })
    }

    pub fn from_parts(songs: Vec<Song>, chords: Vec<ChordBinding>) -> Self {
        let songs: BTreeMap<String, Song> = songs
            .into_iter()
            .map(|song| (song.title.clone(), song))
            .collect();
        let chords = chords
            .into_iter()
            .map(|binding| (binding.key.clone(), binding))
            .collect();
        let titles = songs.keys().cloned().collect();

        Self {
            songs,
            chords,
            titles,
            skipped: Vec::new(),
            duplicate_chords: Vec::new(),
            loaded_at: Utc::now(),
        }
    }

    pub fn lookup_song(&self, title: &str) -> Result<&Song, NotFound> {
        self.songs
            .get(title)
            .ok_or_else(|| NotFound::Song(title.to_string()))
    }

    pub fn lookup_chord(&self, title: &str) -> Result<&Path, NotFound> {
        self.chords
            .get(title)
            .map(|binding| binding.file_path.as_path())
            .ok_or_else(|| NotFound::Chords(title.to_string()))
    }

    pub fn has_chords(&self, title: &str) -> bool {
        self.chords.contains_key(title)
    }

    /// Titles in ascending order.
    pub fn all_titles(&self) -> &[String] {
        &self.titles
    }

    pub fn songs(&self) -> impl Iterator<Item = &Song> {
        self.songs.values()
    }

    pub fn chord_bindings(&self) -> impl Iterator<Item = &ChordBinding> {
        self.chords.values()
    }

    /// Titles whose first character upper-cases to `letter`.
    pub fn titles_starting_with(&self, letter: char) -> Vec<&str> {
        let wanted: String = letter.to_uppercase().collect();
        self.titles
            .iter()
            .filter(|title| {
                title
                    .chars()
                    .next()
                    .is_some_and(|first| first.to_uppercase().eq(wanted.chars()))
            })
            .map(String::as_str)
            .collect()
    }

    /// Distinct upper-cased alphabetic first letters, sorted.
    pub fn available_letters(&self) -> Vec<char> {
        self.titles
            .iter()
            .filter_map(|title| title.chars().next())
            .filter(|first| first.is_alphabetic())
            .filter_map(|first| first.to_uppercase().next())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn song_count(&self) -> usize {
        self.songs.len()
    }

    pub fn chord_count(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }

    pub fn duplicate_chords(&self) -> &[DuplicateChord] {
        &self.duplicate_chords
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Content digest over titles, lyrics, and chord bindings.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for song in self.songs.values() {
            hasher.update(song.title.as_bytes());
            hasher.update([0u8]);
            hasher.update(song.lyrics.as_bytes());
            hasher.update([0u8]);
        }
        for binding in self.chords.values() {
            hasher.update(binding.key.as_bytes());
            hasher.update([0u8]);
            hasher.update(binding.file_path.to_string_lossy().as_bytes());
            hasher.update([0u8]);
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Shared access to the current catalogue.
///
/// Readers take a snapshot and keep using it for the whole request; a
/// refresh replaces the catalogue in one step.
#[derive(Debug, Clone)]
pub struct CatalogueHandle {
    inner: Arc<RwLock<Arc<Catalogue>>>,
}

impl CatalogueHandle {
    pub fn new(catalogue: Catalogue) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(catalogue))),
        }
    }

    pub fn snapshot(&self) -> Arc<Catalogue> {
        let guard = self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Swaps in `catalogue` and returns the one it replaced.
    pub fn replace(&self, catalogue: Catalogue) -> Arc<Catalogue> {
        let mut guard = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::replace(&mut *guard, Arc::new(catalogue))
    }

    /// Rebuilds from disk and swaps only when the build succeeds.
    pub fn refresh(&self, options: &CatalogueOptions) -> Result<Arc<Catalogue>, LoadError> {
        let rebuilt = Catalogue::build(options)?;
        self.replace(rebuilt);
        Ok(self.snapshot())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{hymns, song};
    use super::{Catalogue, CatalogueHandle};
    use crate::docx::fixtures::write_docx;
    use crate::error::{LoadError, NotFound};
    use crate::models::CatalogueOptions;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn build_loads_songs_then_binds_chords() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let songs_dir = dir.path().join("songs");
        let chords_dir = dir.path().join("chords");
        fs::create_dir(&songs_dir)?;
        fs::create_dir(&chords_dir)?;

        write_docx(&songs_dir.join("Amazing Grace.docx"), &["grace"])?;
        write_docx(&songs_dir.join("How Great.docx"), &["great"])?;
        fs::write(songs_dir.join("Broken.docx"), b"nope")?;
        fs::write(chords_dir.join("amazinggrace.pdf"), b"%PDF")?;
        fs::write(chords_dir.join("Something Else.pdf"), b"%PDF")?;

        let options = CatalogueOptions {
            songs_dir,
            chords_dir,
            ..CatalogueOptions::default()
        };
        let catalogue = Catalogue::build(&options)?;

        assert_eq!(catalogue.all_titles(), ["Amazing Grace", "How Great"]);
        assert!(catalogue.lookup_chord("Amazing Grace").is_ok());
        assert!(catalogue.lookup_chord("Something Else").is_ok());
        assert!(!catalogue.has_chords("How Great"));
        assert_eq!(catalogue.skipped().len(), 1);
        Ok(())
    }

    #[test]
    fn missing_songs_directory_fails_the_build() {
        let options = CatalogueOptions {
            songs_dir: "/no/such/songs".into(),
            ..CatalogueOptions::default()
        };
        assert!(matches!(
            Catalogue::build(&options),
            Err(LoadError::MissingDirectory(_))
        ));
    }

    #[test]
    fn lookups_report_not_found() {
        let catalogue = hymns();
        assert_eq!(
            catalogue.lookup_song("Nope").err(),
            Some(NotFound::Song("Nope".to_string()))
        );
        assert_eq!(
            catalogue.lookup_chord("How Great").err(),
            Some(NotFound::Chords("How Great".to_string()))
        );
        assert_eq!(catalogue.lookup_song("How Great").map(|song| song.title.as_str()), Ok("How Great"));
    }

    #[test]
    fn letters_and_letter_filter_ignore_case_and_digits() {
        let catalogue = Catalogue::from_parts(
            vec![
                song("amen", ""),
                song("Abide", ""),
                song("Be Still", ""),
                song("1000 Tongues", ""),
                song("Ёлка", ""),
            ],
            Vec::new(),
        );

        assert_eq!(catalogue.available_letters(), vec!['A', 'B', 'Ё']);
        assert_eq!(catalogue.titles_starting_with('A'), vec!["Abide", "amen"]);
        assert_eq!(catalogue.titles_starting_with('a'), vec!["Abide", "amen"]);
        assert!(catalogue.titles_starting_with('Z').is_empty());
    }

    #[test]
    fn fingerprint_tracks_content() {
        let first = hymns();
        let second = hymns();
        assert_eq!(first.fingerprint(), second.fingerprint());

        let changed = Catalogue::from_parts(vec![song("Amazing Grace", "changed")], Vec::new());
        assert_ne!(first.fingerprint(), changed.fingerprint());
    }

    #[test]
    fn replace_swaps_whole_catalogue_and_old_snapshots_stay_valid() {
        let handle = CatalogueHandle::new(hymns());
        let before = handle.snapshot();

        let previous = handle.replace(Catalogue::from_parts(vec![song("Only", "one")], Vec::new()));

        assert_eq!(previous.song_count(), 4);
        assert_eq!(before.song_count(), 4);
        assert_eq!(handle.snapshot().all_titles(), ["Only"]);
    }

    #[test]
    fn failed_refresh_keeps_the_current_catalogue() {
        let handle = CatalogueHandle::new(hymns());
        let options = CatalogueOptions {
            songs_dir: "/no/such/songs".into(),
            ..CatalogueOptions::default()
        };

        assert!(handle.refresh(&options).is_err());
        assert_eq!(handle.snapshot().song_count(), 4);
    }
}
