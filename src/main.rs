//! # release-index CLI
//!
//! Builds the `releases.json` manifest for a release archive and prunes aged
//! nightly images.
//!
//! ## Commands
//!
//! - **manifest**: Index an artifact tree into releases.json
//! - **prune**: Thin out nightly images older than the retention window
//!
//! ## Quick Start
//!
//! ```bash
//! # Index the archive, reusing digests from the previous manifest
//! release-index manifest -i /srv/releases -u https://releases.libreelec.tv
//!
//! # Show which nightlies older than 30 days would be removed, then remove them
//! release-index prune -i /srv/releases/12.0 -k 30
//! release-index prune -i /srv/releases/12.0 -k 30 --delete
//! ```
//!
//! ## Environment Variables
//!
//! - `RELEASE_INDEX_DISTRO`: Distribution prefix (default: LibreELEC)
//! - `RELEASE_INDEX_VERBOSE`: Enable verbose output
//! - `RELEASE_INDEX_QUIET`: Silence all output except errors
//!
//! See individual commands for more environment variables.

use std::io::IsTerminal;

use release_index::cli::Cli;

fn main() -> miette::Result<()> {
    miette::set_panic_hook();

    if std::io::stderr().is_terminal() {
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::unicode_nocolor())
                    .with_context_lines(3),
            )
        }))?;
    } else {
        // Plain output for cron jobs and CI logs
        miette::set_hook(Box::new(|_| {
            Box::new(
                miette::GraphicalReportHandler::new()
                    .with_theme(miette::GraphicalTheme::none())
                    .with_context_lines(0),
            )
        }))?;
    }

    let cli = Cli::parse_args();

    release_index::commands::execute(&cli).map_err(Into::into)
}
