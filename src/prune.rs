//! Pruning of aged nightly images in a release archive.
//!
//! Nightly images older than the retention window are thinned out to one
//! image per device (and bootloader variant) per ISO week: the earliest image
//! of each week is kept, the rest are purge candidates. Images inside the
//! window are never touched.
//!
//! # Example
//!
//! ```no_run
//! use release_index::prune::Prune;
//!
//! let prune = Prune::builder()
//!     .input_dir("/srv/releases/12.0")
//!     .retention_days(30)
//!     .build()?;
//!
//! // Dry run: prints the purge candidates without deleting them.
//! let stats = prune.run(&mut std::io::stdout())?;
//! println!("{} images would be purged", stats.purged);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod select;

pub use config::{Prune, PruneBuilder, PruneStats};
pub use select::{NightlyImage, PurgePlan, select_for_purge};
