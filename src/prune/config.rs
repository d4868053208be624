use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use super::select::{NightlyImage, select_for_purge};
use crate::classify::{ArtifactKind, Classifier, NoMatch};
use crate::discovery::discover_files;
use crate::error::{IndexError, Result};
use crate::hashing::file_size_and_mtime;
use crate::logging::Logger;
use crate::manifest::config::DEFAULT_DISTRO;
use crate::retention::RetentionWindow;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// What a pruning run selected and did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneStats {
    /// Nightly images found
    pub scanned: usize,
    /// Images inside the retention window
    pub recent: usize,
    /// Aged images kept as first of their week
    pub kept: usize,
    /// Purge candidates
    pub purged: usize,
    /// Purge candidates actually removed
    pub deleted: usize,
    pub kept_bytes: u64,
    pub purged_bytes: u64,
}

/// Archive pruning
#[derive(Debug)]
pub struct Prune {
    /// Archive directory to prune
    input_dir: PathBuf,
    /// Nightlies younger than this are never touched
    window: RetentionWindow,
    /// Remove purge candidates instead of only listing them
    delete: bool,
    /// List kept images and stop
    retained: bool,
    /// Distribution prefix of image filenames
    distro: String,
    verbose: u8,
    quiet: bool,
}

impl Prune {
    /// Creates a new builder for [`Prune`]
    pub fn builder() -> PruneBuilder {
        PruneBuilder::default()
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn window(&self) -> RetentionWindow {
        self.window
    }

    pub fn delete(&self) -> bool {
        self.delete
    }

    pub fn retained(&self) -> bool {
        self.retained
    }

    /// Prune relative to the current local time.
    ///
    /// Path lists and the verbose report are written to `out`; diagnostics
    /// about ignored files go to stderr.
    pub fn run(&self, out: &mut dyn Write) -> Result<PruneStats> {
        self.run_at(Local::now().naive_local(), out)
    }

    /// Prune relative to `now`.
    pub fn run_at(&self, now: NaiveDateTime, out: &mut dyn Write) -> Result<PruneStats> {
        let log = Logger::new(self.verbose, self.quiet);
        let mut stats = PruneStats::default();

        if !self.input_dir.is_dir() {
            return Err(IndexError::InvalidDirectory(self.input_dir.clone()));
        }
        let root = std::path::absolute(&self.input_dir).map_err(|source| IndexError::IoError {
            path: self.input_dir.clone(),
            source,
        })?;

        let images = self.scan(&root, &log)?;
        stats.scanned = images.len();

        let plan = select_for_purge(images, self.window, now);
        stats.recent = plan.recent;
        stats.kept = plan.kept.len();
        stats.purged = plan.purge.len();
        stats.kept_bytes = plan.kept.iter().map(|image| image.size).sum();
        stats.purged_bytes = plan.purge.iter().map(|image| image.size).sum();

        let verbose = self.verbose > 0 && !self.quiet;

        if !plan.kept.is_empty() && (verbose || self.retained) {
            if verbose {
                emit(out, "Below files selected for keeping:")?;
            }
            for image in &plan.kept {
                if verbose {
                    emit(out, report_line(image))?;
                } else {
                    emit(out, image.path.display())?;
                }
            }
            if verbose {
                emit(
                    out,
                    format!("Total size of kept files: {}", format_mib(stats.kept_bytes)),
                )?;
            }
        }
        if self.retained {
            return Ok(stats);
        }

        if plan.purge.is_empty() {
            emit(out, "Nothing found to delete.")?;
            return Ok(stats);
        }

        if verbose {
            emit(out, "\nBelow files selected for purging:")?;
            if !self.delete {
                emit(out, "  --delete not invoked. Keeping all files.")?;
            }
        }
        for image in &plan.purge {
            if verbose {
                emit(out, report_line(image))?;
            } else {
                emit(out, image.path.display())?;
            }

            if self.delete && image.path.is_file() {
                match fs::remove_file(&image.path) {
                    Ok(()) => stats.deleted += 1,
                    Err(err) => log.warn(format!(
                        "Failed to delete {}: {err}",
                        image.path.display()
                    )),
                }
            }
        }
        if verbose {
            emit(
                out,
                format!("Total size of purged files: {}", format_mib(stats.purged_bytes)),
            )?;
        }

        Ok(stats)
    }

    /// Every nightly disk image below `root`, in walk order.
    fn scan(&self, root: &Path, log: &Logger) -> Result<Vec<NightlyImage>> {
        let classifier = Classifier::new(&self.distro);
        let mut images = Vec::new();

        for file in discover_files(root, &[], log)? {
            let descriptor = match classifier.classify(&file.file_name) {
                Ok(descriptor) if descriptor.nightly && descriptor.kind == ArtifactKind::Image => {
                    descriptor
                }
                Err(NoMatch::Malformed) => {
                    log.warn(format!("Failed to parse filename: {}", file.file_name));
                    continue;
                }
                _ => {
                    log.verbose(1, format!("Ignored file: {}", file.file_name));
                    continue;
                }
            };
            let Some(date) = descriptor.date else {
                continue;
            };

            let path = file.path();
            let size = match file_size_and_mtime(&path) {
                Ok((size, _)) => size,
                Err(err) => {
                    log.warn(format!("Skipping {}: {err}", path.display()));
                    continue;
                }
            };

            images.push(NightlyImage {
                path,
                device: descriptor.device,
                variant: descriptor.boot_variant,
                date,
                size,
            });
        }

        Ok(images)
    }
}

fn report_line(image: &NightlyImage) -> String {
    let name = image
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{name}\t{}\t{}", image.size, image.week_label())
}

fn format_mib(bytes: u64) -> String {
    format!("{:.2}MiB", bytes as f64 / BYTES_PER_MIB)
}

fn emit(out: &mut dyn Write, line: impl std::fmt::Display) -> Result<()> {
    writeln!(out, "{line}").map_err(IndexError::OutputError)
}

/// Builder for [`Prune`]
#[derive(Debug, Default)]
pub struct PruneBuilder {
    input_dir: Option<PathBuf>,
    retention_days: Option<u32>,
    delete: bool,
    retained: bool,
    distro: Option<String>,
    verbose: u8,
    quiet: bool,
}

impl PruneBuilder {
    /// Set the archive directory
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = Some(dir.into());
        self
    }

    /// Set the number of days during which every nightly is kept
    pub fn retention_days(mut self, days: u32) -> Self {
        self.retention_days = Some(days);
        self
    }

    /// Delete purge candidates
    pub fn delete(mut self, enabled: bool) -> Self {
        self.delete = enabled;
        self
    }

    /// Only list the kept images
    pub fn retained(mut self, enabled: bool) -> Self {
        self.retained = enabled;
        self
    }

    /// Set the distribution prefix
    pub fn distro(mut self, distro: impl Into<String>) -> Self {
        self.distro = Some(distro.into());
        self
    }

    /// Set the verbosity level
    pub fn verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    /// Enable quiet mode
    pub fn quiet(mut self, enabled: bool) -> Self {
        self.quiet = enabled;
        self
    }

    /// Build the [`Prune`]
    pub fn build(self) -> Result<Prune> {
        let input_dir = self.input_dir.ok_or_else(|| IndexError::ConfigError {
            message: "Input directory is required".to_string(),
        })?;
        let days = self.retention_days.ok_or_else(|| IndexError::ConfigError {
            message: "Retention days are required".to_string(),
        })?;

        Ok(Prune {
            input_dir,
            window: RetentionWindow::new(days),
            delete: self.delete,
            retained: self.retained,
            distro: self.distro.unwrap_or_else(|| DEFAULT_DISTRO.to_string()),
            verbose: self.verbose,
            quiet: self.quiet,
        })
    }
}
