use std::collections::BTreeMap;
use std::time::SystemTime;

use rayon::prelude::*;

use super::config::IndexConfig;
use super::{FileRecord, Manifest, ProjectEntry, ReleaseEntry, TrainEntry};
use crate::classify::{ArtifactDescriptor, Classifier};
use crate::digest::{DigestCache, DigestRecord, DigestSource};
use crate::discovery::{ClassifiedFile, EXCLUDED_DIR_MARKERS, classify_files, discover_files};
use crate::error::Result;
use crate::group::group_artifacts;
use crate::hashing::{ContentHasher, file_size_and_mtime};
use crate::logging::Logger;
use crate::train::Train;

/// Counters describing one manifest build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Regular files found by the directory walk
    pub seen: usize,
    /// File records written to the manifest
    pub indexed: usize,
    /// Digests computed by hashing
    pub hashed: usize,
    /// Digests taken from sidecar checksum files
    pub sidecar: usize,
    /// Digests reused from the previous manifest
    pub reused: usize,
    /// Artifact-looking names that did not parse
    pub malformed: usize,
    /// Artifacts whose version matched no train
    pub unresolved: usize,
    /// Nightlies left out by the retention window
    pub aged: usize,
    /// Artifacts dropped because they could not be read
    pub failed: usize,
    /// Artifacts that lost their slot to an earlier artifact
    pub duplicates: usize,
}

/// A finished build: the manifest plus what happened on the way.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub manifest: Manifest,
    pub stats: BuildStats,
}

/// An artifact that survived classification, train resolution and retention.
#[derive(Debug)]
struct Candidate {
    /// Position in the candidate list, used to look up computed details
    index: usize,
    train: Train,
    artifact: ClassifiedFile,
}

impl AsRef<ArtifactDescriptor> for Candidate {
    fn as_ref(&self) -> &ArtifactDescriptor {
        &self.artifact.descriptor
    }
}

type Details = Result<(DigestRecord, DigestSource)>;

/// Builds a [`Manifest`] from the artifact tree described by an
/// [`IndexConfig`].
pub struct ManifestBuilder<'a, H: ContentHasher + ?Sized> {
    config: &'a IndexConfig,
    hasher: &'a H,
    log: &'a Logger,
}

impl<'a, H: ContentHasher + ?Sized> ManifestBuilder<'a, H> {
    pub fn new(config: &'a IndexConfig, hasher: &'a H, log: &'a Logger) -> Self {
        Self {
            config,
            hasher,
            log,
        }
    }

    /// Scan, classify, group and digest every artifact below the input
    /// directory.
    ///
    /// Per-file problems are logged and counted in [`BuildStats`]; only a
    /// failure to walk the input directory itself is an error.
    pub fn build(&self, cache: &DigestCache, now: SystemTime) -> Result<BuildOutcome> {
        let mut stats = BuildStats::default();

        let files = discover_files(self.config.input_dir(), EXCLUDED_DIR_MARKERS, self.log)?;
        stats.seen = files.len();

        let classifier = Classifier::new(self.config.distro());
        let (classified, malformed) = classify_files(files, &classifier, self.log);
        stats.malformed = malformed;

        let candidates = self.select_candidates(classified, now, &mut stats);

        let mut pairs: BTreeMap<(&Train, &str), Vec<&Candidate>> = BTreeMap::new();
        for candidate in &candidates {
            pairs
                .entry((&candidate.train, candidate.artifact.descriptor.device.as_str()))
                .or_default()
                .push(candidate);
        }

        let groupings: Vec<_> = pairs
            .iter()
            .map(|(pair, members)| (*pair, group_artifacts(members)))
            .collect();

        let needed: Vec<&Candidate> = groupings
            .iter()
            .flat_map(|(_, grouping)| grouping.groups.iter())
            .flat_map(|group| group.members())
            .copied()
            .collect();

        // Hashing is the expensive part; the cache is only read here.
        let computed: Vec<(usize, Details)> = needed
            .par_iter()
            .map(|candidate| (candidate.index, self.details(cache, candidate)))
            .collect();

        let mut details: Vec<Option<Details>> = candidates.iter().map(|_| None).collect();
        for (index, result) in computed {
            details[index] = Some(result);
        }

        let mut trains: BTreeMap<String, TrainEntry> = BTreeMap::new();

        for ((train, device), grouping) in &groupings {
            for duplicate in &grouping.duplicates {
                stats.duplicates += 1;
                self.log.warn(format!(
                    "Ignoring duplicate artifact: {}",
                    duplicate.artifact.file.file_name
                ));
            }

            let mut project = ProjectEntry {
                display_name: self
                    .config
                    .display_names()
                    .display_name(device)
                    .to_string(),
                ..Default::default()
            };

            for group in &grouping.groups {
                let mut entry = ReleaseEntry::default();
                if let Some(file) = group.file {
                    entry.file = self.record(file, &mut details, &mut stats);
                }
                if let Some(image) = group.image {
                    entry.image = self.record(image, &mut details, &mut stats);
                }
                for uboot in &group.uboot {
                    if let Some(record) = self.record(uboot, &mut details, &mut stats) {
                        entry.uboot.push(record);
                    }
                }

                if !entry.is_empty() {
                    let position = project.releases.len();
                    project.releases.insert(position, entry);
                }
            }

            if project.releases.is_empty() {
                continue;
            }

            trains
                .entry(train.to_string())
                .or_insert_with(|| self.train_entry())
                .project
                .insert(device.to_string(), project);
        }

        let mut manifest = Manifest::new();
        for (name, entry) in trains {
            manifest.insert_train(name, entry);
        }

        Ok(BuildOutcome { manifest, stats })
    }

    /// Resolve trains and apply retention, keeping scan order.
    fn select_candidates(
        &self,
        classified: Vec<ClassifiedFile>,
        now: SystemTime,
        stats: &mut BuildStats,
    ) -> Vec<Candidate> {
        let retention = self.config.retention();
        let mut candidates = Vec::with_capacity(classified.len());

        for artifact in classified {
            let descriptor = &artifact.descriptor;
            let Some(train) = self
                .config
                .resolver()
                .resolve(&descriptor.distro, &descriptor.raw_train)
            else {
                stats.unresolved += 1;
                self.log.warn(format!(
                    "Unable to resolve train for {} (version {})",
                    descriptor.file_name, descriptor.raw_train
                ));
                continue;
            };

            if descriptor.nightly && retention.window().is_some() && !retention.include_all() {
                let mtime = match file_size_and_mtime(&artifact.file.path()) {
                    Ok((_, mtime)) => mtime,
                    Err(err) => {
                        stats.failed += 1;
                        self.log.warn(format!("Skipping {}: {err}", descriptor.file_name));
                        continue;
                    }
                };
                if !retention.is_retained(true, mtime, now) {
                    stats.aged += 1;
                    self.log
                        .verbose(1, format!("Skipping aged nightly: {}", descriptor.file_name));
                    continue;
                }
            }

            candidates.push(Candidate {
                index: candidates.len(),
                train,
                artifact,
            });
        }

        candidates
    }

    fn details(&self, cache: &DigestCache, candidate: &Candidate) -> Details {
        let artifact = &candidate.artifact;
        cache.get_details(
            &artifact.file.dir,
            &candidate.train.to_string(),
            &artifact.descriptor.device,
            &artifact.file.file_name,
            self.hasher,
        )
    }

    /// Turn the computed details of `candidate` into a file record, logging
    /// how the digest was obtained.
    fn record(
        &self,
        candidate: &Candidate,
        details: &mut [Option<Details>],
        stats: &mut BuildStats,
    ) -> Option<FileRecord> {
        let file = &candidate.artifact.file;
        let result = details.get_mut(candidate.index).and_then(Option::take)?;

        let (digest, source) = match result {
            Ok(found) => found,
            Err(err) => {
                stats.failed += 1;
                self.log.warn(format!("Skipping {}: {err}", file.file_name));
                return None;
            }
        };

        match source {
            DigestSource::Computed => {
                stats.hashed += 1;
                self.log.info(format!(
                    "Adding: {} in {} train",
                    file.file_name, candidate.train
                ));
            }
            DigestSource::Sidecar => {
                stats.sidecar += 1;
                self.log.verbose(
                    1,
                    format!(
                        "Adding: {} in {} train (sidecar digest)",
                        file.file_name, candidate.train
                    ),
                );
            }
            DigestSource::Cache => {
                stats.reused += 1;
                self.log
                    .verbose(2, format!("Cached: {}", file.file_name));
            }
        }

        stats.indexed += 1;
        Some(FileRecord {
            name: file.file_name.clone(),
            sha256: digest.sha256,
            size: digest.size,
            subpath: file.subpath.clone(),
            timestamp: digest.timestamp,
        })
    }

    fn train_entry(&self) -> TrainEntry {
        TrainEntry {
            prettyname_regex: self.config.prettyname().to_string(),
            project: BTreeMap::new(),
            url: self.config.url(),
        }
    }
}
