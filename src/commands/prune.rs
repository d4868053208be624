use std::io::Write;

use crate::error::Result;
use crate::logging::Logger;
use crate::prune::{Prune, PruneStats};

/// Executes the prune command.
///
/// Selected paths (or, in verbose mode, the full report) go to `out`. Files
/// are only removed when the configuration asks for deletion.
pub fn prune(config: &Prune, log: &Logger, out: &mut dyn Write) -> Result<PruneStats> {
    log.verbose(
        1,
        format!(
            "Pruning nightlies in {} older than {} days",
            config.input_dir().display(),
            config.window().days()
        ),
    );

    let stats = config.run(out)?;

    if config.delete() && !config.retained() {
        log.verbose(1, format!("Deleted {} files", stats.deleted));
    }

    Ok(stats)
}
