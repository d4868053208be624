use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::digest::DigestCache;
use crate::error::{IndexError, Result};
use crate::logging::Logger;
use crate::manifest::Manifest;


/// Loads a manifest from disk.
///
/// A missing or empty file yields `Ok(None)`.
///
/// # Errors
///
/// Returns an error if:
/// - The file exists but cannot be read
/// - The file is not a well-formed manifest
pub fn load_manifest(path: &Path) -> Result<Option<Manifest>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(source) if source.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(IndexError::IoError {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if contents.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| IndexError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
}

/// Seeds a digest cache from the manifest at `path`.
///
/// Never fails: an unreadable or malformed manifest is reported and an empty
/// cache is returned, so every artifact is hashed afresh.
pub fn load_digest_cache(path: &Path, log: &Logger) -> DigestCache {
    match load_manifest(path) {
        Ok(Some(manifest)) => {
            let cache = DigestCache::from_manifest(&manifest);
            log.verbose(
                1,
                format!("Loaded {} cached digests from {}", cache.len(), path.display()),
            );
            cache
        }
        Ok(None) => {
            log.verbose(1, format!("No previous manifest at {}", path.display()));
            DigestCache::new()
        }
        Err(err) => {
            log.warn(format!("Ignoring previous manifest: {err}"));
            DigestCache::new()
        }
    }
}

/// Saves the manifest to disk atomically.
///
/// The JSON is written to a temporary sibling file first and then renamed
/// into place, so the previous manifest is never left partially written.
///
/// # Errors
///
/// Returns an error if:
/// - The manifest cannot be serialized
/// - The file cannot be written to disk
pub fn save_manifest(manifest: &Manifest, path: &Path) -> Result<()> {
    let json = manifest.to_json()?;
    let temp_path = path.with_extension("tmp");

    let mut temp_file = File::create(&temp_path).map_err(|source| IndexError::IoError {
        path: temp_path.clone(),
        source,
    })?;

    temp_file
        .write_all(json.as_bytes())
        .map_err(|source| IndexError::IoError {
            path: temp_path.clone(),
            source,
        })?;

    temp_file.sync_all().map_err(|source| IndexError::IoError {
        path: temp_path.clone(),
        source,
    })?;

    fs::rename(&temp_path, path).map_err(|source| IndexError::IoError {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
