//! # release-index
//!
//! Indexes a LibreELEC-style release archive into the `releases.json`
//! manifest consumed by update clients, and prunes aged nightly images from
//! the archive.
//!
//! ## Overview
//!
//! Build servers drop tarballs (`.tar`), disk images (`.img.gz`) and
//! bootloader-specific images into a directory tree. release-index walks
//! that tree, recognises artifacts by their filenames, files each one under
//! its release train and device, and writes a manifest listing every release
//! with its SHA-256 digest, size and modification time.
//!
//! ## Key Features
//!
//! - **Train folding**: pre-release and odd-numbered minors are filed under
//!   the stable train they lead up to
//! - **Digest reuse**: digests from the previous manifest are reused, so only
//!   new files are hashed
//! - **Deterministic output**: the same tree always produces the same bytes
//! - **Parallel hashing**: cache misses are hashed with rayon
//! - **Archive pruning**: aged nightlies are thinned to one image per week
//!
//! ## Architecture
//!
//! - [`cli`]: Command-line interface definitions using clap
//! - [`commands`]: Implementation of the `manifest` and `prune` subcommands
//! - [`error`]: Error types and handling with thiserror + miette
//! - [`classify`]: Filename parsing into artifact descriptors
//! - [`train`]: Version-stage table and train resolution
//! - [`retention`]: Age-based retention of nightlies
//! - [`group`]: Correlation of artifacts into release entries
//! - [`digest`]: Digest cache seeded from the previous manifest
//! - [`manifest`]: Manifest document, configuration and builder
//! - [`prune`]: Archive pruning
//! - [`hashing`]: Streaming SHA-256, sidecar checksums and the hasher seam
//! - [`logging`]: Verbosity-aware stderr logger
//!
//! Internal modules (not part of the public API):
//! - `discovery`: Directory walking
//! - `metadata`: Loading and atomically saving manifests
//! - `timestamp`: Timestamp formatting and ISO weeks
//!
//! ## Library Usage
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! use release_index::cli::{Cli, Commands};
//! use release_index::commands;
//!
//! let cli = Cli::builder()
//!     .verbose(1)
//!     .command(Commands::Manifest {
//!         input: PathBuf::from("/srv/releases"),
//!         url: "https://releases.libreelec.tv".to_string(),
//!         output: None,
//!         prettyname: None,
//!         retention_days: Some(30),
//!         include_all: false,
//!     })
//!     .build()?;
//!
//! commands::execute(&cli)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod classify;
pub mod cli;
pub mod commands;
pub mod digest;
pub mod error;
pub mod group;
pub mod hashing;
pub mod logging;
pub mod manifest;
pub mod prune;
pub mod retention;
pub mod train;

mod discovery;
mod metadata;
mod timestamp;
