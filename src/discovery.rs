use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::classify::{ArtifactDescriptor, Classifier, NoMatch};
use crate::error::{IndexError, Result};
use crate::logging::Logger;

/// Directory-name markers whose subtrees hold artifacts that are not indexed.
pub const EXCLUDED_DIR_MARKERS: &[&str] = &["archive", "upload"];

/// A regular file found below the scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Directory containing the file
    pub dir: PathBuf,
    /// `dir` relative to the scan root, `/`-separated, empty for the root
    pub subpath: String,
    pub file_name: String,
}

impl DiscoveredFile {
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// A discovered file together with its parsed name.
#[derive(Debug, Clone)]
pub struct ClassifiedFile {
    pub file: DiscoveredFile,
    pub descriptor: ArtifactDescriptor,
}

impl AsRef<ArtifactDescriptor> for ClassifiedFile {
    fn as_ref(&self) -> &ArtifactDescriptor {
        &self.descriptor
    }
}

/// Walks `root` in file-name order and returns every regular file.
///
/// Directories below the root whose name contains one of `excluded_markers`
/// are skipped with their whole subtree. Unreadable entries below the root
/// are reported and skipped; an unreadable root is an error.
pub fn discover_files(
    root: &Path,
    excluded_markers: &[&str],
    log: &Logger,
) -> Result<Vec<DiscoveredFile>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let excluded = is_excluded_dir(entry, excluded_markers);
            if excluded {
                log.verbose(1, format!("Skipping directory: {}", entry.path().display()));
            }
            !excluded
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(IndexError::WalkError(err)),
            Err(err) => {
                log.warn(format!("Skipping unreadable entry: {err}"));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Some(file_name) = entry.file_name().to_str() else {
            log.warn(format!(
                "Skipping non UTF-8 file name: {}",
                entry.path().display()
            ));
            continue;
        };

        let dir = entry
            .path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf());

        files.push(DiscoveredFile {
            subpath: relative_subpath(root, &dir),
            dir,
            file_name: file_name.to_string(),
        });
    }

    Ok(files)
}

/// Classifies discovered files, reporting the ones that are not artifacts.
///
/// Returns the artifacts in discovery order and the number of malformed
/// names.
pub fn classify_files(
    files: Vec<DiscoveredFile>,
    classifier: &Classifier,
    log: &Logger,
) -> (Vec<ClassifiedFile>, usize) {
    let mut classified = Vec::with_capacity(files.len());
    let mut malformed = 0;

    for file in files {
        match classifier.classify(&file.file_name) {
            Ok(descriptor) => classified.push(ClassifiedFile { file, descriptor }),
            Err(NoMatch::Malformed) => {
                malformed += 1;
                log.warn(format!("Failed to parse filename: {}", file.file_name));
            }
            Err(NoMatch::Foreign | NoMatch::Excluded) => {
                log.verbose(1, format!("Ignored file: {}", file.file_name));
            }
        }
    }

    (classified, malformed)
}

fn is_excluded_dir(entry: &DirEntry, markers: &[&str]) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    markers.iter().any(|marker| name.contains(marker))
}

fn relative_subpath(root: &Path, dir: &Path) -> String {
    dir.strip_prefix(root)
        .map(|relative| {
            relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_discover_files_sorted_with_subpaths() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("b.tar"));
        touch(&root.join("a.tar"));
        touch(&root.join("nightly/RPi4/c.img.gz"));

        let files = discover_files(root, EXCLUDED_DIR_MARKERS, &Logger::new(0, true)).unwrap();
        let names: Vec<(&str, &str)> = files
            .iter()
            .map(|f| (f.subpath.as_str(), f.file_name.as_str()))
            .collect();

        assert_eq!(
            names,
            vec![("", "a.tar"), ("", "b.tar"), ("nightly/RPi4", "c.img.gz")]
        );
        assert_eq!(files[2].path(), root.join("nightly/RPi4/c.img.gz"));
    }

    #[test]
    fn test_excluded_subtrees_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("keep.tar"));
        touch(&root.join("archive/old.tar"));
        touch(&root.join("11.0/upload-tmp/partial.tar"));
        touch(&root.join("11.0/deep/archive-2023/x.tar"));

        let files = discover_files(root, EXCLUDED_DIR_MARKERS, &Logger::new(0, true)).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["keep.tar"]);

        let all = discover_files(root, &[], &Logger::new(0, true)).unwrap();
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_root_inside_marker_directory_is_scanned() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("archive");
        touch(&root.join("a.tar"));

        let files = discover_files(&root, EXCLUDED_DIR_MARKERS, &Logger::new(0, true)).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = discover_files(
            &temp_dir.path().join("missing"),
            EXCLUDED_DIR_MARKERS,
            &Logger::new(0, true),
        );
        assert!(matches!(result, Err(IndexError::WalkError(_))));
    }

    #[test]
    fn test_classify_files_counts_malformed() {
        let files = ["LibreELEC-RPi2.arm-11.0.1.tar", "LibreELEC-RPi2.arm-x.tar", "notes.txt"]
            .into_iter()
            .map(|name| DiscoveredFile {
                dir: PathBuf::from("/srv"),
                subpath: String::new(),
                file_name: name.to_string(),
            })
            .collect();

        let (classified, malformed) =
            classify_files(files, &Classifier::new("LibreELEC"), &Logger::new(0, true));
        assert_eq!(classified.len(), 1);
        assert_eq!(malformed, 1);
        assert_eq!(classified[0].descriptor.device, "RPi2.arm");
    }
}
