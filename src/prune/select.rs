use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};

use crate::retention::RetentionWindow;
use crate::timestamp::iso_year_week;

/// A nightly disk image found in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NightlyImage {
    pub path: PathBuf,
    pub device: String,
    /// Bootloader variant, empty for the plain image
    pub variant: String,
    /// Build date from the filename
    pub date: NaiveDate,
    pub size: u64,
}

impl NightlyImage {
    /// ISO `year-week` of the build date.
    pub fn week_label(&self) -> String {
        let (year, week) = iso_year_week(self.date);
        format!("{year}-{week}")
    }
}

/// Outcome of [`select_for_purge`]; both lists are in build-date order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgePlan {
    /// Aged images kept as the first of their week
    pub kept: Vec<NightlyImage>,
    /// Aged images sharing a week with an earlier kept image
    pub purge: Vec<NightlyImage>,
    /// Images inside the retention window
    pub recent: usize,
}

/// Split `images` into the ones to keep and the ones to purge.
///
/// Images dated before `now - window` are bucketed by device, bootloader
/// variant and ISO week; the earliest image of a bucket is kept. Images of
/// the same date keep their input order.
pub fn select_for_purge(
    mut images: Vec<NightlyImage>,
    window: RetentionWindow,
    now: NaiveDateTime,
) -> PurgePlan {
    images.sort_by_key(|image| image.date);

    let mut plan = PurgePlan::default();
    let mut occupied = HashSet::new();

    for image in images {
        if !window.is_dated_before(image.date, now) {
            plan.recent += 1;
            continue;
        }

        let bucket = (
            image.device.clone(),
            image.variant.clone(),
            iso_year_week(image.date),
        );
        if occupied.insert(bucket) {
            plan.kept.push(image);
        } else {
            plan.purge.push(image);
        }
    }

    plan
}
