use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use sha2::{Digest, Sha256};

use crate::error::IndexError;

/// Block size used when streaming a file through the hasher.
const HASH_BLOCK_SIZE: usize = 64 * 1024;

/// Extension of the checksum files the build system places beside artifacts.
pub const SIDECAR_EXTENSION: &str = "sha256";

/// Produces the content digest of an artifact.
///
/// The manifest builder only depends on this seam, so tests can count or
/// forbid hashing.
pub trait ContentHasher: Sync {
    fn hash_file(&self, path: &Path) -> Result<String, IndexError>;
}

/// Streaming SHA-256 over fixed-size blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl ContentHasher for Sha256Hasher {
    fn hash_file(&self, path: &Path) -> Result<String, IndexError> {
        sha256_file(path)
    }
}

/// Computes the hex-encoded SHA-256 of a file without loading it whole.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be opened or read
/// - The path points to a directory
pub fn sha256_file(path: &Path) -> Result<String, IndexError> {
    let metadata = fs::metadata(path).map_err(|source| IndexError::IoError {
        path: path.to_path_buf(),
        source,
    })?;

    if metadata.is_dir() {
        return Err(IndexError::InvalidFileType {
            path: path.to_path_buf(),
            message: "Directories are not supported".to_string(),
        });
    }

    let mut file = File::open(path).map_err(|source| IndexError::IoError {
        path: path.to_path_buf(),
        source,
    })?;

    let mut hasher = Sha256::new();
    let mut block = vec![0u8; HASH_BLOCK_SIZE];
    loop {
        let read = file.read(&mut block).map_err(|source| IndexError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        if read == 0 {
            break;
        }
        hasher.update(&block[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Path of the `<filename>.sha256` sidecar for `path`.
pub fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(SIDECAR_EXTENSION);
    PathBuf::from(name)
}

/// Reads the digest from a sidecar checksum file, if one exists.
///
/// The first whitespace-delimited token is the digest, matching the output
/// of `sha256sum`. An empty or unreadable sidecar yields `None`.
pub fn read_sidecar_digest(path: &Path) -> Option<String> {
    let contents = fs::read_to_string(sidecar_path(path)).ok()?;
    contents.split_whitespace().next().map(str::to_string)
}

/// Size in bytes and modification time of a regular file.
pub fn file_size_and_mtime(path: &Path) -> Result<(u64, SystemTime), IndexError> {
    let metadata = fs::metadata(path).map_err(|source| IndexError::IoError {
        path: path.to_path_buf(),
        source,
    })?;

    if !metadata.is_file() {
        return Err(IndexError::InvalidFileType {
            path: path.to_path_buf(),
            message: "Only regular files can be indexed".to_string(),
        });
    }

    let mtime = metadata.modified().map_err(|source| IndexError::IoError {
        path: path.to_path_buf(),
        source,
    })?;

    Ok((metadata.len(), mtime))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_sha256_file() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("test.txt");
        fs::write(&test_file, "hello world").unwrap();

        let hash = sha256_file(&test_file).unwrap();
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_sha256_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("empty.txt");
        fs::write(&test_file, "").unwrap();

        let hash = sha256_file(&test_file).unwrap();
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_spans_several_blocks() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("large.bin");
        let content = vec![b'x'; HASH_BLOCK_SIZE * 2 + 17];
        fs::write(&test_file, &content).unwrap();

        let expected = hex::encode(Sha256::digest(&content));
        assert_eq!(sha256_file(&test_file).unwrap(), expected);
    }

    #[test]
    fn test_sha256_nonexistent_file() {
        let result = sha256_file(Path::new("/nonexistent/file"));
        assert!(matches!(result, Err(IndexError::IoError { .. })));
    }

    #[test]
    fn test_sha256_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = sha256_file(temp_dir.path());
        assert!(matches!(result, Err(IndexError::InvalidFileType { .. })));
    }

    #[test]
    fn test_sidecar_digest() {
        let temp_dir = TempDir::new().unwrap();
        let artifact = temp_dir.path().join("LibreELEC-RPi2.arm-11.0.1.tar");
        fs::write(&artifact, "payload").unwrap();
        assert_eq!(read_sidecar_digest(&artifact), None);

        fs::write(
            temp_dir.path().join("LibreELEC-RPi2.arm-11.0.1.tar.sha256"),
            "abc123  LibreELEC-RPi2.arm-11.0.1.tar\n",
        )
        .unwrap();
        assert_eq!(read_sidecar_digest(&artifact).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_empty_sidecar_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let artifact = temp_dir.path().join("a.tar");
        fs::write(&artifact, "payload").unwrap();
        fs::write(sidecar_path(&artifact), "  \n").unwrap();
        assert_eq!(read_sidecar_digest(&artifact), None);
    }

    #[test]
    fn test_file_size_and_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("sized.txt");
        fs::write(&test_file, "hello world").unwrap();

        let (size, _mtime) = file_size_and_mtime(&test_file).unwrap();
        assert_eq!(size, 11);

        let result = file_size_and_mtime(temp_dir.path());
        assert!(matches!(result, Err(IndexError::InvalidFileType { .. })));
    }
}
