#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use calldeck::config::Config;
use calldeck::workspace::Workspace;
use tempfile::{tempdir, TempDir};

/// Scratch directory plus a workspace configuration rooted inside it.
/// Cleans up automatically on drop.
pub struct TestEnv {
    temp_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the scratch directory.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    pub fn data_dir(&self) -> PathBuf {
        self.temp_dir.path().join("data")
    }

    pub fn config(&self) -> Config {
        Config {
            data_dir: self.data_dir(),
            ..Config::default()
        }
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::open(self.config()).expect("open workspace")
    }
}

/// Two-row call log used across tests: one California and one New York call.
pub const CALLS_CA_NY: &str = "CallerID,CallerState\n5551234567,CA\n5559876543,NY\n";
