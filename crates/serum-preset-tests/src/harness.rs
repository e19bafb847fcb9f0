//! Test harness for saving and reloading presets in a scratch directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use serum_preset::Preset;
use tempfile::TempDir;

/// A scratch directory for preset files, removed on drop.
pub struct TestHarness {
    /// Working directory for test outputs.
    pub work_dir: TempDir,
}

impl TestHarness {
    /// Create a new test harness.
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().expect("Failed to create work dir"),
        }
    }

    /// Get the working directory path.
    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }

    /// Path of a file inside the working directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }

    /// Copy a file into the working directory and return the new path.
    pub fn copy_in(&self, source: &Path) -> PathBuf {
        let name = source
            .file_name()
            .expect("Fixture path has no file name");
        let target = self.path().join(name);
        fs::copy(source, &target).expect("Failed to copy fixture");
        target
    }

    /// Save a preset under `name`, then load it back.
    pub fn save_and_reload(&self, preset: &Preset, name: &str) -> Preset {
        let path = self.file(name);
        preset.save(&path).expect("Failed to save preset");
        Preset::load(&path).expect("Failed to reload preset")
    }

    /// Write a raw JSON document under `name`.
    pub fn write_document(&self, name: &str, document: &Value) -> PathBuf {
        let path = self.file(name);
        let text = serde_json::to_string_pretty(document).expect("Failed to serialize document");
        fs::write(&path, text).expect("Failed to write document");
        path
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a JSON file into a raw document.
pub fn read_document(path: &Path) -> Value {
    let text = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    serde_json::from_str(&text)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e))
}

/// Assert that two documents are equal except for the listed `data` keys.
pub fn assert_data_equal_except(left: &Value, right: &Value, ignored: &[&str]) {
    let left_data = left["data"].as_object().expect("left has no data section");
    let right_data = right["data"].as_object().expect("right has no data section");

    let left_keys: Vec<&String> = left_data.keys().collect();
    let right_keys: Vec<&String> = right_data.keys().collect();
    assert_eq!(left_keys, right_keys, "data key order differs");

    for (key, value) in left_data {
        if ignored.contains(&key.as_str()) {
            continue;
        }
        assert_eq!(value, &right_data[key], "data.{} differs", key);
    }
}
