//! Digest cache seeded from the previous manifest.
//!
//! Hashing a multi-gigabyte archive dominates the cost of a run, so digests
//! recorded in the previous `releases.json` are reused whenever the same
//! file is still filed under the same train and device.

use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::hashing::{ContentHasher, file_size_and_mtime, read_sidecar_digest};
use crate::manifest::Manifest;
use crate::timestamp::format_timestamp;


/// Digest, size and modification time of one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestRecord {
    pub sha256: String,
    pub size: u64,
    pub timestamp: String,
}

/// Where the digest of a [`DigestRecord`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestSource {
    /// Reused from the previous manifest
    Cache,
    /// Read from a `<file>.sha256` sidecar
    Sidecar,
    /// Computed by hashing the file
    Computed,
}

/// Previously recorded digests keyed by `train;device;file`.
#[derive(Debug, Clone, Default)]
pub struct DigestCache {
    records: HashMap<String, DigestRecord>,
}

impl DigestCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(train: &str, device: &str, file_name: &str) -> String {
        format!("{train};{device};{file_name}")
    }

    /// Seed a cache from every file record of `manifest`.
    ///
    /// Records without a name or digest cannot be trusted and are skipped.
    pub fn from_manifest(manifest: &Manifest) -> Self {
        let mut cache = Self::new();
        for (train, device, record) in manifest.file_records() {
            if record.name.is_empty() || record.sha256.is_empty() {
                continue;
            }
            cache.insert(
                train,
                device,
                &record.name,
                DigestRecord {
                    sha256: record.sha256.clone(),
                    size: record.size,
                    timestamp: record.timestamp.clone(),
                },
            );
        }
        cache
    }

    pub fn insert(&mut self, train: &str, device: &str, file_name: &str, record: DigestRecord) {
        self.records
            .insert(Self::key(train, device, file_name), record);
    }

    pub fn get(&self, train: &str, device: &str, file_name: &str) -> Option<&DigestRecord> {
        self.records.get(&Self::key(train, device, file_name))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Digest, size and timestamp of `dir/file_name`.
    ///
    /// A cache hit is returned as recorded without touching the file, except
    /// that a record lacking a timestamp takes it from the file's mtime. On a
    /// miss the digest comes from a sidecar checksum when one exists and from
    /// `hasher` otherwise; size and timestamp come from the filesystem.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be stat'ed or read, e.g. because it
    /// vanished after the directory scan.
    pub fn get_details<H: ContentHasher + ?Sized>(
        &self,
        dir: &Path,
        train: &str,
        device: &str,
        file_name: &str,
        hasher: &H,
    ) -> Result<(DigestRecord, DigestSource)> {
        let path = dir.join(file_name);

        if let Some(cached) = self.get(train, device, file_name) {
            let mut record = cached.clone();
            if record.timestamp.is_empty() {
                let (_, mtime) = file_size_and_mtime(&path)?;
                record.timestamp = format_timestamp(mtime);
            }
            return Ok((record, DigestSource::Cache));
        }

        let (size, mtime) = file_size_and_mtime(&path)?;
        let (sha256, source) = match read_sidecar_digest(&path) {
            Some(digest) => (digest, DigestSource::Sidecar),
            None => (hasher.hash_file(&path)?, DigestSource::Computed),
        };

        Ok((
            DigestRecord {
                sha256,
                size,
                timestamp: format_timestamp(mtime),
            },
            source,
        ))
    }
}
