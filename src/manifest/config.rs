use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;

use super::MANIFEST_FILE_NAME;
use crate::error::{IndexError, Result};
use crate::retention::{RetentionPolicy, RetentionWindow};
use crate::train::TrainResolver;

/// Distribution whose artifacts are indexed unless configured otherwise.
pub const DEFAULT_DISTRO: &str = "LibreELEC";

/// Device identifiers and the names shown on download pages.
const DEFAULT_DISPLAY_NAMES: &[(&str, &str)] = &[
    ("A64.arm", "Allwinner A64"),
    ("AMLGX.arm", "Amlogic GXBB/GXL/GXM/G12/SM1"),
    ("Dragonboard.arm", "Qualcomm Dragonboard"),
    ("FORMAT.any", "Tools"),
    ("Generic.x86_64", "Generic AMD/Intel/NVIDIA (x86_64)"),
    ("H3.arm", "Allwinner H3"),
    ("H5.arm", "Allwinner H5"),
    ("H6.arm", "Allwinner H6"),
    ("imx6.arm", "NXP i.MX6"),
    ("iMX6.arm", "NXP i.MX6"),
    ("iMX8.arm", "NXP i.MX8"),
    ("KVIM.arm", "Amlogic 3.14"),
    ("KVIM2.arm", "Amlogic 3.14"),
    ("Khadas_VIM.arm", "Amlogic 3.14"),
    ("Khadas_VIM2.arm", "Amlogic 3.14"),
    ("LePotato.arm", "Amlogic 3.14"),
    ("MiQi.arm", "Rockchip RK3288"),
    ("Odroid_C2.aarch64", "Amlogic 3.14"),
    ("Odroid_C2.arm", "Amlogic 3.14"),
    ("R40.arm", "Allwinner R40"),
    ("RK3288.arm", "Rockchip RK3288"),
    ("RK3328.arm", "Rockchip RK3328"),
    ("RK3399.arm", "Rockchip RK3399"),
    ("RPi.arm", "Raspberry Pi Zero and 1"),
    ("RPi2.arm", "Raspberry Pi 2 and 3"),
    ("RPi3.arm", "Raspberry Pi 3"),
    ("RPi4.arm", "Raspberry Pi 4 and 400"),
    ("S905.arm", "Amlogic 3.14"),
    ("S912.arm", "Amlogic 3.14"),
    ("Slice.arm", "Slice CM1/CM3"),
    ("Slice3.arm", "Slice CM1/CM3"),
    ("TinkerBoard.arm", "Rockchip RK3288"),
    ("Virtual.x86_64", "Virtual x86_64"),
    ("WeTek_Core.arm", "Amlogic 3.10"),
    ("WeTek_Hub.aarch64", "Amlogic 3.14"),
    ("WeTek_Hub.arm", "Amlogic 3.14"),
    ("WeTek_Play.arm", "Amlogic 3.10"),
    ("WeTek_Play_2.aarch64", "Amlogic 3.14"),
    ("WeTek_Play_2.arm", "Amlogic 3.14"),
];

/// Default pattern clients use to pull `major.minor.patch` out of a name.
pub fn default_prettyname(distro: &str) -> String {
    format!(r"^{distro}-.*-([0-9]+\.[0-9]+\.[0-9]+)")
}

/// Lookup table from device identifier to display name.
///
/// Unknown devices display as their raw identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayNames {
    names: BTreeMap<String, String>,
}

impl DisplayNames {
    pub fn new(names: BTreeMap<String, String>) -> Self {
        Self { names }
    }

    /// Add or replace a single mapping.
    pub fn with(mut self, device: impl Into<String>, name: impl Into<String>) -> Self {
        self.names.insert(device.into(), name.into());
        self
    }

    pub fn display_name<'a>(&'a self, device: &'a str) -> &'a str {
        self.names.get(device).map(String::as_str).unwrap_or(device)
    }
}

impl Default for DisplayNames {
    fn default() -> Self {
        Self::new(
            DEFAULT_DISPLAY_NAMES
                .iter()
                .map(|(device, name)| (device.to_string(), name.to_string()))
                .collect(),
        )
    }
}

/// Configuration of one manifest build.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Directory tree holding the artifacts and the previous manifest
    input_dir: PathBuf,
    /// Directory the new manifest is written to
    output_dir: PathBuf,
    /// Base download URL without trailing slash
    base_url: String,
    /// Value written as `prettyname_regex`
    prettyname: String,
    /// Distribution prefix of indexed filenames
    distro: String,
    /// Which nightlies are indexed
    retention: RetentionPolicy,
    /// Version-stage table
    resolver: TrainResolver,
    /// Device display names
    display_names: DisplayNames,
}

impl IndexConfig {
    /// Creates a new builder for [`IndexConfig`]
    pub fn builder() -> IndexConfigBuilder {
        IndexConfigBuilder::default()
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Base URL with exactly one trailing `/`
    pub fn url(&self) -> String {
        format!("{}/", self.base_url)
    }

    pub fn prettyname(&self) -> &str {
        &self.prettyname
    }

    pub fn distro(&self) -> &str {
        &self.distro
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    pub fn resolver(&self) -> &TrainResolver {
        &self.resolver
    }

    pub fn display_names(&self) -> &DisplayNames {
        &self.display_names
    }

    /// The previous manifest, read to seed the digest cache
    pub fn manifest_input_path(&self) -> PathBuf {
        self.input_dir.join(MANIFEST_FILE_NAME)
    }

    /// Where the new manifest is written
    pub fn manifest_output_path(&self) -> PathBuf {
        self.output_dir.join(MANIFEST_FILE_NAME)
    }

    /// Fails unless both the input and output directories exist.
    pub fn validate_directories(&self) -> Result<()> {
        for dir in [&self.input_dir, &self.output_dir] {
            if !dir.is_dir() {
                return Err(IndexError::InvalidDirectory(dir.clone()));
            }
        }
        Ok(())
    }
}

/// Builder for [`IndexConfig`]
#[derive(Debug, Default)]
pub struct IndexConfigBuilder {
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    base_url: Option<String>,
    prettyname: Option<String>,
    distro: Option<String>,
    retention_days: Option<u32>,
    include_all: bool,
    resolver: Option<TrainResolver>,
    display_names: Option<DisplayNames>,
}

impl IndexConfigBuilder {
    /// Set the input directory
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = Some(dir.into());
        self
    }

    /// Set the output directory (defaults to the input directory)
    pub fn output_dir(mut self, dir: Option<impl Into<PathBuf>>) -> Self {
        self.output_dir = dir.map(Into::into);
        self
    }

    /// Set the base download URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Override the prettyname regex
    pub fn prettyname(mut self, regex: Option<impl Into<String>>) -> Self {
        self.prettyname = regex.map(Into::into);
        self
    }

    /// Set the distribution prefix
    pub fn distro(mut self, distro: impl Into<String>) -> Self {
        self.distro = Some(distro.into());
        self
    }

    /// Exclude nightlies older than this many days
    pub fn retention_days(mut self, days: Option<u32>) -> Self {
        self.retention_days = days;
        self
    }

    /// Index every nightly regardless of age
    pub fn include_all(mut self, enabled: bool) -> Self {
        self.include_all = enabled;
        self
    }

    /// Replace the version-stage table
    pub fn resolver(mut self, resolver: TrainResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Replace the display-name table
    pub fn display_names(mut self, names: DisplayNames) -> Self {
        self.display_names = Some(names);
        self
    }

    /// Build the [`IndexConfig`]
    pub fn build(self) -> Result<IndexConfig> {
        let input_dir = self.input_dir.ok_or_else(|| IndexError::ConfigError {
            message: "Input directory is required".to_string(),
        })?;
        let base_url = self.base_url.ok_or_else(|| IndexError::ConfigError {
            message: "Base URL is required".to_string(),
        })?;
        let distro = self.distro.unwrap_or_else(|| DEFAULT_DISTRO.to_string());
        let prettyname = self
            .prettyname
            .unwrap_or_else(|| default_prettyname(&distro));

        Regex::new(&prettyname).map_err(|source| IndexError::InvalidPattern {
            pattern: prettyname.clone(),
            source,
        })?;

        Ok(IndexConfig {
            output_dir: self.output_dir.unwrap_or_else(|| input_dir.clone()),
            input_dir,
            base_url: base_url.trim_end_matches('/').to_string(),
            prettyname,
            distro,
            retention: RetentionPolicy::new(
                self.retention_days.map(RetentionWindow::new),
                self.include_all,
            ),
            resolver: self.resolver.unwrap_or_default(),
            display_names: self.display_names.unwrap_or_default(),
        })
    }
}
