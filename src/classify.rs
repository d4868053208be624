//! Filename classification for build artifacts.
//!
//! Build outputs follow two naming schemes:
//!
//! ```text
//! release: <Distro>-<Device>.<Arch>-<Major>.<Minor>.<Patch>[-<Variant>].{tar|img.gz}
//! nightly: <Distro>-<Device>.<Arch>-<Major>.<Minor>-nightly-<YYYYMMDD>-<hash>[-<Variant>].{tar|img.gz}
//! ```
//!
//! [`Classifier::classify`] turns such a name into an [`ArtifactDescriptor`]
//! or explains through [`NoMatch`] why the file is not indexed.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;


const NIGHTLY_MARKER: &str = "-nightly-";
const TARBALL_SUFFIX: &str = ".tar";
const NOOBS_SUFFIX: &str = "-noobs.tar";
const IMAGE_SUFFIX: &str = ".img.gz";

/// The two artifact shapes a build produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// An update tarball (`.tar`)
    Tarball,
    /// A compressed disk image (`.img.gz`)
    Image,
}

impl ArtifactKind {
    /// File extension including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Tarball => TARBALL_SUFFIX,
            ArtifactKind::Image => IMAGE_SUFFIX,
        }
    }
}

/// Structured view of one artifact filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    /// The filename as found on disk
    pub file_name: String,
    /// Distribution tag, e.g. `LibreELEC`
    pub distro: String,
    /// Device and architecture, e.g. `RPi2.arm`
    pub device: String,
    /// `major.minor` exactly as written in the filename
    pub raw_train: String,
    /// Patch component of a release version (`None` for nightlies)
    pub patch: Option<String>,
    /// Build date embedded in a nightly filename
    pub date: Option<NaiveDate>,
    /// Source revision embedded in a nightly filename
    pub hash: Option<String>,
    /// Bootloader variant; empty for the primary artifact of a base name
    pub boot_variant: String,
    /// Tarball or image
    pub kind: ArtifactKind,
    /// Whether this is a nightly build
    pub nightly: bool,
}

impl ArtifactDescriptor {
    /// Filename without its extension.
    pub fn base_name(&self) -> &str {
        self.file_name
            .strip_suffix(self.kind.extension())
            .unwrap_or(&self.file_name)
    }

    /// Name under which related artifacts are grouped into one release.
    ///
    /// Bootloader-variant images drop their `-<variant>` suffix so they land
    /// beside the tarball and plain image of the same build, filling the
    /// entry's `uboot` list. Variant images therefore share an entry with the
    /// tarball instead of forming entries of their own.
    pub fn group_key(&self) -> &str {
        let base = self.base_name();
        if self.kind == ArtifactKind::Image && !self.boot_variant.is_empty() {
            return base
                .strip_suffix(self.boot_variant.as_str())
                .and_then(|rest| rest.strip_suffix('-'))
                .unwrap_or(base);
        }
        base
    }
}

impl AsRef<ArtifactDescriptor> for ArtifactDescriptor {
    fn as_ref(&self) -> &ArtifactDescriptor {
        self
    }
}

/// Why a filename was not turned into a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoMatch {
    /// Not a distribution artifact at all (other prefix or extension)
    Foreign,
    /// A distribution file deliberately kept out of the index
    Excluded,
    /// Looks like an artifact but its structure does not parse
    Malformed,
}

/// Classifies filenames belonging to one distribution.
#[derive(Debug, Clone)]
pub struct Classifier {
    distro: String,
    prefix: String,
}

impl Classifier {
    pub fn new(distro: impl Into<String>) -> Self {
        let distro = distro.into();
        let prefix = format!("{distro}-");
        Self { distro, prefix }
    }

    pub fn distro(&self) -> &str {
        &self.distro
    }

    /// Parse `file_name` into an [`ArtifactDescriptor`].
    pub fn classify(&self, file_name: &str) -> Result<ArtifactDescriptor, NoMatch> {
        if !file_name.starts_with(&self.prefix) {
            return Err(NoMatch::Foreign);
        }

        let (kind, stem) = if file_name.ends_with(NOOBS_SUFFIX) {
            return Err(NoMatch::Excluded);
        } else if let Some(stem) = file_name.strip_suffix(TARBALL_SUFFIX) {
            (ArtifactKind::Tarball, stem)
        } else if let Some(stem) = file_name.strip_suffix(IMAGE_SUFFIX) {
            (ArtifactKind::Image, stem)
        } else {
            return Err(NoMatch::Foreign);
        };

        if stem.contains(NIGHTLY_MARKER) {
            parse_nightly(file_name, stem, kind)
        } else {
            parse_release(file_name, stem, kind)
        }
    }
}

fn release_regex() -> &'static Regex {
    static RELEASE_RE: OnceLock<Regex> = OnceLock::new();
    RELEASE_RE.get_or_init(|| {
        Regex::new(r"^(\w+)-([0-9A-Za-z_-]+\.\w+)-(\d+\.\d+)\.(\d+)(?:-(\S+))?$")
            .expect("release artifact regex should compile")
    })
}

fn nightly_regex() -> &'static Regex {
    static NIGHTLY_RE: OnceLock<Regex> = OnceLock::new();
    NIGHTLY_RE.get_or_init(|| {
        Regex::new(
            r"^(\w+)-([0-9A-Za-z_-]+\.\w+)-(\d+\.\d+)-nightly-(\d{8})-([0-9a-fA-F]+)(?:-(\S+))?$",
        )
        .expect("nightly artifact regex should compile")
    })
}

fn parse_release(
    file_name: &str,
    stem: &str,
    kind: ArtifactKind,
) -> Result<ArtifactDescriptor, NoMatch> {
    let captures = release_regex().captures(stem).ok_or(NoMatch::Malformed)?;

    Ok(ArtifactDescriptor {
        file_name: file_name.to_string(),
        distro: captures[1].to_string(),
        device: captures[2].to_string(),
        raw_train: captures[3].to_string(),
        patch: Some(captures[4].to_string()),
        date: None,
        hash: None,
        boot_variant: captures
            .get(5)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
        kind,
        nightly: false,
    })
}

fn parse_nightly(
    file_name: &str,
    stem: &str,
    kind: ArtifactKind,
) -> Result<ArtifactDescriptor, NoMatch> {
    let captures = nightly_regex().captures(stem).ok_or(NoMatch::Malformed)?;
    let date =
        NaiveDate::parse_from_str(&captures[4], "%Y%m%d").map_err(|_| NoMatch::Malformed)?;

    Ok(ArtifactDescriptor {
        file_name: file_name.to_string(),
        distro: captures[1].to_string(),
        device: captures[2].to_string(),
        raw_train: captures[3].to_string(),
        patch: None,
        date: Some(date),
        hash: Some(captures[5].to_string()),
        boot_variant: captures
            .get(6)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
        kind,
        nightly: true,
    })
}
