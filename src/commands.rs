//! Implementation of release-index subcommands.
//!
//! The main entry point is the [`execute`] function which turns the parsed
//! CLI into a configuration and dispatches to the command handler.
//!
//! # Commands
//!
//! - [`manifest`]: Builds `releases.json` from an artifact tree
//! - [`prune`]: Thins out aged nightly images
//!
//! # Example
//!
//! ```no_run
//! use release_index::cli::Cli;
//! use release_index::commands;
//!
//! let cli = Cli::parse_args();
//! if let Err(e) = commands::execute(&cli) {
//!     eprintln!("Error: {e:?}");
//! }
//! ```

use std::io::Write;

use crate::cli::{Cli, Commands, normalize_path};
use crate::error::Result;
use crate::logging::Logger;
use crate::manifest::IndexConfig;
use crate::prune::Prune;

mod manifest;
mod prune;

pub use manifest::manifest;
pub use prune::prune;

/// Execute the command described by `cli`, writing path lists to stdout.
pub fn execute(cli: &Cli) -> Result<()> {
    let stdout = std::io::stdout();
    execute_with_output(cli, &mut stdout.lock())
}

/// Execute the command described by `cli`, writing path lists to `out`.
pub fn execute_with_output(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    let opts = cli.global_opts();
    let quiet = opts.quiet();
    let verbose = if quiet { 0 } else { opts.verbose() };
    let log = Logger::new(verbose, quiet);

    match cli.command() {
        Commands::Manifest {
            input,
            url,
            output,
            prettyname,
            retention_days,
            include_all,
        } => {
            let config = IndexConfig::builder()
                .input_dir(normalize_path(input))
                .output_dir(output.as_ref().map(normalize_path))
                .base_url(url)
                .prettyname(prettyname.as_deref())
                .distro(opts.distro())
                .retention_days(*retention_days)
                .include_all(*include_all)
                .build()?;
            manifest(&config, &log).map(|_| ())
        }
        Commands::Prune {
            input,
            keep,
            delete,
            retained,
        } => {
            let config = Prune::builder()
                .input_dir(normalize_path(input))
                .retention_days(*keep)
                .delete(*delete)
                .retained(*retained)
                .distro(opts.distro())
                .verbose(verbose)
                .quiet(quiet)
                .build()?;
            prune(&config, &log, out).map(|_| ())
        }
    }
}
