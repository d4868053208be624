//! The release manifest (`releases.json`) consumed by update clients.
//!
//! The document is a nested mapping:
//!
//! ```text
//! train -> { url, prettyname_regex, project: device -> { displayName, releases } }
//! ```
//!
//! where `releases` is an object keyed by position (`"0"`, `"1"`, ...) whose
//! values carry optional `file`, `image` and `uboot` records. All maps are
//! ordered and struct fields are declared alphabetically, so serializing the
//! same content always yields the same bytes.
//!
//! - [`config`]: builder-style configuration and the device display names
//! - [`builder`]: the scan → classify → group → digest pipeline

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{IndexError, Result};

pub mod builder;
pub mod config;

pub use builder::{BuildOutcome, BuildStats, ManifestBuilder};
pub use config::{DisplayNames, IndexConfig, IndexConfigBuilder};

/// File name of the manifest inside the input and output directories.
pub const MANIFEST_FILE_NAME: &str = "releases.json";

/// Top-level manifest keyed by train name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    trains: BTreeMap<String, TrainEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trains(&self) -> &BTreeMap<String, TrainEntry> {
        &self.trains
    }

    pub fn train(&self, name: &str) -> Option<&TrainEntry> {
        self.trains.get(name)
    }

    pub fn insert_train(&mut self, name: impl Into<String>, entry: TrainEntry) {
        self.trains.insert(name.into(), entry);
    }

    pub fn is_empty(&self) -> bool {
        self.trains.is_empty()
    }

    /// Every file record in the manifest with the train and device it is
    /// filed under.
    pub fn file_records(&self) -> impl Iterator<Item = (&str, &str, &FileRecord)> {
        self.trains.iter().flat_map(|(train, train_entry)| {
            train_entry.project.iter().flat_map(move |(device, project)| {
                project
                    .releases
                    .values()
                    .flat_map(|release| release.records())
                    .map(move |record| (train.as_str(), device.as_str(), record))
            })
        })
    }

    /// Pretty-printed JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self).map_err(IndexError::SerializationError)?;
        json.push('\n');
        Ok(json)
    }
}

/// One release train.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainEntry {
    /// Pattern clients use to extract a human-readable version
    #[serde(default)]
    pub prettyname_regex: String,
    /// Devices built for this train
    #[serde(default)]
    pub project: BTreeMap<String, ProjectEntry>,
    /// Base download URL, ending in `/`
    #[serde(default)]
    pub url: String,
}

/// All releases of one device within a train.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(default, deserialize_with = "positions_or_list")]
    pub releases: BTreeMap<usize, ReleaseEntry>,
}

/// One logical release: the artifacts sharing a base name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<FileRecord>,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "one_or_many"
    )]
    pub uboot: Vec<FileRecord>,
}

impl ReleaseEntry {
    pub fn is_empty(&self) -> bool {
        self.file.is_none() && self.image.is_none() && self.uboot.is_empty()
    }

    /// All records of this entry: tarball, image, then bootloader images.
    pub fn records(&self) -> impl Iterator<Item = &FileRecord> {
        self.file
            .iter()
            .chain(self.image.iter())
            .chain(self.uboot.iter())
    }
}

/// Digest and location of a single artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,
    pub sha256: String,
    #[serde(serialize_with = "size_as_string", deserialize_with = "size_from_any")]
    pub size: u64,
    /// Directory of the artifact relative to the input root
    #[serde(default)]
    pub subpath: String,
    /// Modification time in UTC, formatted `YYYY-MM-DD HH:MM:SS` with no
    /// offset marker; empty when read from an older manifest
    #[serde(default)]
    pub timestamp: String,
}

fn size_as_string<S: Serializer>(size: &u64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&size.to_string())
}

fn size_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSize {
        Number(u64),
        Text(String),
    }

    match RawSize::deserialize(deserializer)? {
        RawSize::Number(size) => Ok(size),
        RawSize::Text(text) if text.trim().is_empty() => Ok(0),
        RawSize::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Older manifests wrote a single `uboot` object instead of a list.
fn one_or_many<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<FileRecord>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(FileRecord),
        Many(Vec<FileRecord>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(record) => vec![record],
        OneOrMany::Many(records) => records,
    })
}

/// Releases are written keyed by position, but a plain list is accepted and
/// numbered in order.
fn positions_or_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<BTreeMap<usize, ReleaseEntry>, D::Error> {
    struct ReleasesVisitor;

    impl<'de> Visitor<'de> for ReleasesVisitor {
        type Value = BTreeMap<usize, ReleaseEntry>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("releases keyed by position or a list of releases")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
            let mut releases = BTreeMap::new();
            while let Some((key, entry)) = map.next_entry::<String, ReleaseEntry>()? {
                let position = key.trim().parse().map_err(de::Error::custom)?;
                releases.insert(position, entry);
            }
            Ok(releases)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
            let mut releases = BTreeMap::new();
            while let Some(entry) = seq.next_element::<ReleaseEntry>()? {
                releases.insert(releases.len(), entry);
            }
            Ok(releases)
        }
    }

    deserializer.deserialize_any(ReleasesVisitor)
}
