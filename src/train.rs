//! Release-train resolution.
//!
//! A train is the lineage update clients follow, such as `LibreELEC-11.0`.
//! Pre-release minors belong to the next major train and odd (unstable)
//! minors fold forward into the following even (stable) minor:
//!
//! ```text
//! Version    Train
//! 9.0.1      9.0
//! 9.1.1      9.2
//! 9.2.1      9.2
//! 9.80.001   10.0    pre-alpha
//! 9.90.001   10.0    alpha
//! 9.95.001   10.0    beta
//! 9.97.001   10.0    rc
//! 10.1.001   10.2
//! ```
//!
//! Versions are handled in hundredths so the adjustment never suffers from
//! floating point rounding.

use std::fmt;

use regex::Regex;

use crate::error::{IndexError, Result};


/// Canonical release-train identifier.
///
/// Ordered by distro, then numerically by major and minor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Train {
    distro: String,
    major: u32,
    minor: u32,
}

impl Train {
    pub fn new(distro: impl Into<String>, major: u32, minor: u32) -> Self {
        Self {
            distro: distro.into(),
            major,
            minor,
        }
    }

    pub fn distro(&self) -> &str {
        &self.distro
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }
}

impl fmt::Display for Train {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}.{}", self.distro, self.major, self.minor)
    }
}

/// One row of the version-stage table.
#[derive(Debug, Clone)]
pub struct VersionStage {
    name: String,
    minor: Regex,
    adjustment: u32,
}

impl VersionStage {
    /// Create a stage matching minor versions against `minor_pattern`.
    ///
    /// The pattern must match the whole minor component. `adjustment` is in
    /// hundredths of a version (`20` moves `9.80` to `10.0`).
    pub fn new(name: impl Into<String>, minor_pattern: &str, adjustment: u32) -> Result<Self> {
        let anchored = format!("^(?:{minor_pattern})$");
        let minor = Regex::new(&anchored).map_err(|source| IndexError::InvalidPattern {
            pattern: minor_pattern.to_string(),
            source,
        })?;

        Ok(Self {
            name: name.into(),
            minor,
            adjustment,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches(&self, minor: &str) -> bool {
        self.minor.is_match(minor)
    }
}

/// Maps raw `major.minor` strings to [`Train`]s using an ordered stage
/// table. The first matching stage wins.
#[derive(Debug, Clone)]
pub struct TrainResolver {
    stages: Vec<VersionStage>,
}

impl TrainResolver {
    pub fn new(stages: Vec<VersionStage>) -> Self {
        Self { stages }
    }

    /// Name of the first stage whose pattern matches `minor`.
    pub fn stage_for(&self, minor: &str) -> Option<&VersionStage> {
        self.stages.iter().find(|stage| stage.matches(minor))
    }

    /// Resolve `raw_train` (`"9.80"`) for `distro` into a train.
    ///
    /// Returns `None` when the string is not `major.minor` or no stage
    /// matches the minor component.
    pub fn resolve(&self, distro: &str, raw_train: &str) -> Option<Train> {
        let (major, minor) = raw_train.split_once('.')?;
        if major.is_empty() || !major.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if minor.is_empty() || !minor.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let stage = self.stage_for(minor)?;
        let major: u32 = major.parse().ok()?;

        let hundredths = major
            .checked_mul(100)?
            .checked_add(minor_hundredths(minor))?
            .checked_add(stage.adjustment)?;
        let tenths = (hundredths + 5) / 10;

        Some(Train::new(distro, tenths / 10, tenths % 10))
    }
}

impl Default for TrainResolver {
    fn default() -> Self {
        let table = [
            ("pre-alpha", "80", 20),
            ("alpha", "90", 10),
            ("beta", "95", 5),
            ("rc", "97", 3),
            ("unstable", "[1357]", 10),
            ("stable", "[02468]", 0),
        ];

        let stages = table
            .into_iter()
            .map(|(name, pattern, adjustment)| {
                VersionStage::new(name, pattern, adjustment)
                    .expect("built-in version stage patterns should compile")
            })
            .collect();

        Self::new(stages)
    }
}

/// Value of a minor component as hundredths: `"1"` is 10, `"80"` is 80.
fn minor_hundredths(minor: &str) -> u32 {
    minor
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(2)
        .fold(0, |acc, digit| acc * 10 + u32::from(digit - b'0'))
}
