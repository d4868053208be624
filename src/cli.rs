//! Command-line interface definitions for release-index.
//!
//! This module defines the CLI structure using clap, including both
//! subcommands and their arguments. The main entry point is the [`Cli`]
//! struct.
//!
//! # Example
//!
//! ```no_run
//! use release_index::cli::{Cli, Commands};
//!
//! let cli = Cli::parse_args();
//!
//! match cli.command() {
//!     Commands::Manifest { input, .. } => println!("Indexing {}", input.display()),
//!     Commands::Prune { keep, .. } => println!("Keeping {keep} days of nightlies"),
//! }
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::error::{IndexError, Result};
use crate::manifest::config::DEFAULT_DISTRO;

#[cfg(test)]
mod tests;

/// Main command-line interface for release-index.
///
/// Global options apply to both subcommands and may appear before or after
/// the subcommand name.
#[derive(Parser)]
#[command(
    name = "release-index",
    bin_name = "release-index",
    author,
    version,
    about = "Index and prune a LibreELEC-style release archive",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    global_opts: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

/// Global options shared by every subcommand.
#[derive(Parser)]
pub struct GlobalOpts {
    /// Distribution name prefixing every artifact filename
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_DISTRO,
        env = "RELEASE_INDEX_DISTRO"
    )]
    distro: String,

    /// Enable verbose output (use multiple times for more verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count, env = "RELEASE_INDEX_VERBOSE")]
    verbose: u8,

    /// Silence all output except for errors and requested path lists
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        env = "RELEASE_INDEX_QUIET"
    )]
    quiet: bool,
}

impl GlobalOpts {
    /// Create a new builder for constructing `GlobalOpts` programmatically.
    pub fn builder() -> GlobalOptsBuilder {
        GlobalOptsBuilder::default()
    }

    /// Get the distribution name
    pub fn distro(&self) -> &str {
        &self.distro
    }

    /// Get the verbose level
    pub fn verbose(&self) -> u8 {
        self.verbose
    }

    /// Check if quiet mode is enabled
    pub fn quiet(&self) -> bool {
        self.quiet
    }
}

/// Builder for constructing `GlobalOpts` programmatically.
#[derive(Default)]
pub struct GlobalOptsBuilder {
    distro: Option<String>,
    verbose: u8,
    quiet: bool,
}

impl GlobalOptsBuilder {
    /// Set the distribution name.
    pub fn distro(mut self, distro: impl Into<String>) -> Self {
        self.distro = Some(distro.into());
        self
    }

    /// Set the verbosity level (0 = normal, 1+ = verbose).
    pub fn verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    /// Enable or disable quiet mode.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Build the `GlobalOpts` instance with the configured values.
    pub fn build(self) -> GlobalOpts {
        GlobalOpts {
            distro: self.distro.unwrap_or_else(|| DEFAULT_DISTRO.to_string()),
            verbose: self.verbose,
            quiet: self.quiet,
        }
    }
}

impl Cli {
    /// Get the global options
    pub fn global_opts(&self) -> &GlobalOpts {
        &self.global_opts
    }

    /// Get the command
    pub fn command(&self) -> &Commands {
        &self.command
    }

    /// Create a builder for programmatic construction
    pub fn builder() -> CliBuilder {
        CliBuilder::default()
    }

    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Builder for [`Cli`]
#[derive(Debug, Default)]
pub struct CliBuilder {
    distro: Option<String>,
    verbose: u8,
    quiet: bool,
    command: Option<Commands>,
}

impl CliBuilder {
    /// Set the distribution name
    pub fn distro(mut self, distro: impl Into<String>) -> Self {
        self.distro = Some(distro.into());
        self
    }

    /// Set the verbose level
    pub fn verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    /// Enable quiet mode
    pub fn quiet(mut self, enabled: bool) -> Self {
        self.quiet = enabled;
        self
    }

    /// Set the command
    pub fn command(mut self, command: Commands) -> Self {
        self.command = Some(command);
        self
    }

    /// Build the Cli instance
    pub fn build(self) -> Result<Cli> {
        let command = self.command.ok_or(IndexError::ConfigError {
            message: "Command is required".to_string(),
        })?;

        let mut global_opts = GlobalOpts::builder()
            .verbose(self.verbose)
            .quiet(self.quiet);
        if let Some(distro) = self.distro {
            global_opts = global_opts.distro(distro);
        }

        Ok(Cli {
            global_opts: global_opts.build(),
            command,
        })
    }
}

/// Normalize a path to be absolute and clean, without requiring it to exist.
///
/// This function:
/// - Converts relative paths to absolute using the current directory
/// - Removes `.` and `..` components where possible
/// - Does NOT resolve symlinks
pub(crate) fn normalize_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();

    let absolute = if path.is_relative() {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    } else {
        path.to_path_buf()
    };

    let mut components = Vec::new();
    for component in absolute.components() {
        use std::path::Component;
        match component {
            Component::ParentDir => {
                if let Some(last) = components.last()
                    && !matches!(last, Component::ParentDir)
                {
                    components.pop();
                    continue;
                }
                components.push(component);
            }
            Component::CurDir => continue,
            _ => components.push(component),
        }
    }

    components.into_iter().collect()
}

/// Available release-index subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build releases.json for an artifact tree
    ///
    /// Walks the input directory (skipping `archive` and `upload`
    /// subtrees), groups every tarball, disk image and bootloader image by
    /// release train and device, and writes the manifest consumed by update
    /// clients. Digests recorded in the previous manifest are reused; only
    /// new files are hashed.
    Manifest {
        /// Directory holding the artifacts and the previous releases.json
        #[arg(short, long, env = "RELEASE_INDEX_INPUT")]
        input: PathBuf,

        /// Base download URL written into every train
        #[arg(short, long, env = "RELEASE_INDEX_URL")]
        url: String,

        /// Directory to write releases.json to (defaults to the input)
        #[arg(short, long, env = "RELEASE_INDEX_OUTPUT")]
        output: Option<PathBuf>,

        /// Regex clients use to extract a version from a filename
        #[arg(short, long, env = "RELEASE_INDEX_PRETTYNAME")]
        prettyname: Option<String>,

        /// Leave out nightlies older than this many days
        #[arg(long, env = "RELEASE_INDEX_RETENTION_DAYS")]
        retention_days: Option<u32>,

        /// Index every nightly regardless of its age
        #[arg(long, env = "RELEASE_INDEX_INCLUDE_ALL")]
        include_all: bool,
    },

    /// Thin out aged nightly images
    ///
    /// Nightly images older than the retention window are reduced to one
    /// image per device, bootloader variant and ISO week. By default the
    /// purge candidates are only listed.
    Prune {
        /// Release directory to prune (e.g. /srv/releases/12.0)
        #[arg(short, long, env = "RELEASE_INDEX_INPUT")]
        input: PathBuf,

        /// Number of days during which every nightly is kept
        #[arg(short, long, env = "RELEASE_INDEX_KEEP_DAYS")]
        keep: u32,

        /// Delete purge candidates instead of only listing them
        #[arg(short, long)]
        delete: bool,

        /// List the paths of retained images and exit
        #[arg(short, long)]
        retained: bool,
    },
}
