use crate::docx::{extract_lyrics, DocumentExtractor};
use crate::error::LoadError;
use crate::models::{SkippedFile, Song};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files directly inside `folder` whose extension matches, sorted by path.
pub fn discover_files(folder: &Path, extension: &str) -> Result<Vec<PathBuf>, LoadError> {
    if !folder.is_dir() {
        return Err(LoadError::MissingDirectory(folder.to_path_buf()));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let matches = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));

        if matches {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    Ok(files)
}

/// File name with its extension removed.
pub fn file_stem(path: &Path) -> Result<String, LoadError> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| LoadError::MissingFileName(path.to_path_buf()))
}

pub struct SongLoadReport {
    pub songs: BTreeMap<String, Song>,
    pub skipped: Vec<SkippedFile>,
}

/// Loads every document in `folder` as a song keyed by its file stem.
///
/// A document that cannot be read is skipped and recorded in the report
/// instead of failing the whole load. When two files produce the same title
/// the first one in path order is kept and the later one is rejected with
/// [`LoadError::DuplicateTitle`].
pub fn load_songs(
    folder: &Path,
    extension: &str,
    extractor: &impl DocumentExtractor,
) -> Result<SongLoadReport, LoadError> {
    let files = discover_files(folder, extension)?;

    let mut songs = BTreeMap::<String, Song>::new();
    let mut skipped = Vec::new();

    for path in files {
        let loaded = (|| {
            let title = file_stem(&path)?;
            if let Some(existing) = songs.get(&title) {
                return Err(LoadError::DuplicateTitle {
                    title,
                    path: path.clone(),
                    existing: existing.source_path.clone(),
                });
            }
            let lyrics = extract_lyrics(extractor, &path)?;
            Ok::<_, LoadError>(Song {
                title,
                lyrics,
                source_path: path.clone(),
            })
        })();

        match loaded {
            Ok(song) => {
                songs.insert(song.title.clone(), song);
            }
            Err(error) => skipped.push(SkippedFile {
                path,
                reason: error.to_string(),
            }),
        }
    }

    Ok(SongLoadReport { songs, skipped })
}

#[cfg(test)]
mod tests {
    use super::{discover_files, file_stem, load_songs};
    use crate::docx::fixtures::write_docx;
    use crate::docx::DocxExtractor;
    use crate::error::LoadError;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    #[test]
    fn discovery_is_flat_and_case_insensitive() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path();
        let nested = base.join("nested");
        fs::create_dir(&nested)?;

        fs::write(base.join("b.docx"), b"")?;
        fs::write(base.join("A.DOCX"), b"")?;
        fs::write(base.join("notes.txt"), b"")?;
        fs::write(nested.join("c.docx"), b"")?;

        let files = discover_files(base, "docx")?;
        let names: Vec<_> = files
            .iter()
            .filter_map(|path| path.file_name().and_then(|name| name.to_str()))
            .collect();
        assert_eq!(names, vec!["A.DOCX", "b.docx"]);
        Ok(())
    }

    #[test]
    fn missing_directory_is_fatal() {
        let result = discover_files(Path::new("/definitely/not/here"), "docx");
        assert!(matches!(result, Err(LoadError::MissingDirectory(_))));
    }

    #[test]
    fn titles_drop_the_extension_and_come_out_sorted() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        write_docx(&dir.path().join("How Great.docx"), &["how great thou art"])?;
        write_docx(&dir.path().join("Amazing Grace.docx"), &["amazing grace"])?;
        write_docx(&dir.path().join("amen.docx"), &["amen"])?;

        let report = load_songs(dir.path(), "docx", &DocxExtractor)?;
        let titles: Vec<_> = report.songs.keys().cloned().collect();

        assert_eq!(titles, vec!["Amazing Grace", "How Great", "amen"]);
        assert!(titles.iter().all(|title| !title.ends_with(".docx")));
        assert_eq!(report.songs["How Great"].lyrics, "how great thou art");
        assert!(report.skipped.is_empty());
        Ok(())
    }

    #[test]
    fn malformed_documents_are_skipped_not_fatal() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        write_docx(&dir.path().join("Good.docx"), &["fine"])?;
        fs::write(dir.path().join("Broken.docx"), b"garbage")?;

        let report = load_songs(dir.path(), "docx", &DocxExtractor)?;

        assert_eq!(report.songs.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(
            report.skipped[0].path.file_name().and_then(|name| name.to_str()),
            Some("Broken.docx")
        );
        Ok(())
    }

    #[test]
    fn colliding_titles_are_rejected_explicitly() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        write_docx(&dir.path().join("Hymn.DOCX"), &["upper"])?;
        write_docx(&dir.path().join("Hymn.docx"), &["lower"])?;

        let report = load_songs(dir.path(), "docx", &DocxExtractor)?;

        assert_eq!(report.songs.len(), 1);
        assert_eq!(report.songs["Hymn"].lyrics, "upper");
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].reason.contains("already loaded"));
        Ok(())
    }

    #[test]
    fn empty_directory_is_an_empty_catalogue() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let report = load_songs(dir.path(), "docx", &DocxExtractor)?;
        assert!(report.songs.is_empty());
        Ok(())
    }

    #[test]
    fn root_path_has_no_stem() {
        assert!(file_stem(Path::new("/")).is_err());
        assert_eq!(file_stem(Path::new("a/b c.pdf")).ok().as_deref(), Some("b c"));
    }
}
