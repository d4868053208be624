use std::time::SystemTime;

use crate::error::Result;
use crate::hashing::Sha256Hasher;
use crate::logging::Logger;
use crate::manifest::{BuildOutcome, IndexConfig, ManifestBuilder};
use crate::metadata::{load_digest_cache, save_manifest};

/// Executes the manifest command.
///
/// Checks that the input and output directories exist, seeds the digest
/// cache from the previous manifest, builds the new manifest and replaces
/// `releases.json` in the output directory.
///
/// # Errors
///
/// Returns an error if a directory is missing, the input tree cannot be
/// walked, or the manifest cannot be written. Problems with individual files
/// are only reported.
pub fn manifest(config: &IndexConfig, log: &Logger) -> Result<BuildOutcome> {
    config.validate_directories()?;

    let cache = load_digest_cache(&config.manifest_input_path(), log);
    log.verbose(
        1,
        format!("Scanning {}", config.input_dir().display()),
    );

    let outcome =
        ManifestBuilder::new(config, &Sha256Hasher, log).build(&cache, SystemTime::now())?;

    let output_path = config.manifest_output_path();
    save_manifest(&outcome.manifest, &output_path)?;

    let manifest = &outcome.manifest;
    let devices: usize = manifest.trains().values().map(|t| t.project.len()).sum();
    let releases: usize = manifest
        .trains()
        .values()
        .flat_map(|t| t.project.values())
        .map(|p| p.releases.len())
        .sum();
    let stats = &outcome.stats;
    let skipped = stats.malformed + stats.unresolved + stats.failed + stats.duplicates;

    log.info(format!(
        "Wrote {}: {} trains, {} devices, {} releases",
        output_path.display(),
        manifest.trains().len(),
        devices,
        releases
    ));
    log.info(format!(
        "Files: {} hashed, {} from sidecars, {} reused, {} skipped",
        stats.hashed, stats.sidecar, stats.reused, skipped
    ));
    if stats.aged > 0 {
        log.verbose(1, format!("Left out {} aged nightlies", stats.aged));
    }

    Ok(outcome)
}
