//! Age-based retention of nightly artifacts.

use std::time::{Duration, SystemTime};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// A retention window measured in whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionWindow {
    days: u32,
}

impl RetentionWindow {
    pub fn new(days: u32) -> Self {
        Self { days }
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// `true` once `now - mtime >= days`.
    ///
    /// A modification time in the future is never aged.
    pub fn is_aged(&self, mtime: SystemTime, now: SystemTime) -> bool {
        let window = Duration::from_secs(u64::from(self.days) * SECONDS_PER_DAY);
        now.duration_since(mtime)
            .map(|age| age >= window)
            .unwrap_or(false)
    }

    /// `true` when a build dated `date` falls before the window ending at
    /// `now`, comparing the date at midnight.
    pub fn is_dated_before(&self, date: NaiveDate, now: NaiveDateTime) -> bool {
        let cutoff = now - TimeDelta::days(i64::from(self.days));
        date.and_time(chrono::NaiveTime::MIN) < cutoff
    }
}

/// Decides which artifacts are indexed in the manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionPolicy {
    window: Option<RetentionWindow>,
    include_all: bool,
}

impl RetentionPolicy {
    /// Retain nightlies younger than `window`; `None` retains everything.
    pub fn new(window: Option<RetentionWindow>, include_all: bool) -> Self {
        Self {
            window,
            include_all,
        }
    }

    pub fn window(&self) -> Option<RetentionWindow> {
        self.window
    }

    pub fn include_all(&self) -> bool {
        self.include_all
    }

    /// Releases are always retained; nightlies only inside the window.
    pub fn is_retained(&self, nightly: bool, mtime: SystemTime, now: SystemTime) -> bool {
        if !nightly || self.include_all {
            return true;
        }
        match self.window {
            Some(window) => !window.is_aged(mtime, now),
            None => true,
        }
    }
}
