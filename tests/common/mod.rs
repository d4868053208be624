#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use assert_fs::TempDir;
use assert_fs::prelude::*;
use filetime::FileTime;
use release_index::cli::{Cli, Commands};
use release_index::commands::execute_with_output;
use release_index::error::Result;
use release_index::manifest::Manifest;

pub const BASE_URL: &str = "https://releases.example.org";

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// A throwaway release archive.
pub struct Archive {
    dir: TempDir,
}

impl Archive {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create archive directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn add(&self, relative: &str, contents: &str) -> PathBuf {
        let child = self.dir.child(relative);
        child.write_str(contents).expect("failed to write artifact");
        child.path().to_path_buf()
    }

    /// Move the modification time of `relative` `days` into the past.
    pub fn backdate(&self, relative: &str, days: u64) {
        let time = SystemTime::now() - Duration::from_secs(days * SECONDS_PER_DAY);
        filetime::set_file_mtime(self.dir.child(relative).path(), FileTime::from_system_time(time))
            .expect("failed to set mtime");
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.path().join("releases.json")
    }

    pub fn read_manifest_json(&self) -> String {
        std::fs::read_to_string(self.manifest_path()).expect("manifest should exist")
    }

    pub fn read_manifest(&self) -> Manifest {
        serde_json::from_str(&self.read_manifest_json()).expect("manifest should parse")
    }
}

pub fn manifest_command(input: &Path, retention_days: Option<u32>) -> Commands {
    Commands::Manifest {
        input: input.to_path_buf(),
        url: BASE_URL.to_string(),
        output: None,
        prettyname: None,
        retention_days,
        include_all: false,
    }
}

pub fn prune_command(input: &Path, keep: u32, delete: bool, retained: bool) -> Commands {
    Commands::Prune {
        input: input.to_path_buf(),
        keep,
        delete,
        retained,
    }
}

/// Run `command` through the library and return what it wrote to stdout.
pub fn run(command: Commands) -> Result<String> {
    let cli = Cli::builder().quiet(true).command(command).build()?;
    let mut out = Vec::new();
    execute_with_output(&cli, &mut out)?;
    Ok(String::from_utf8(out).expect("output should be UTF-8"))
}
