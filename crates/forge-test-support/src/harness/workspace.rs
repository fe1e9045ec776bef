use forge_config::AppConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// Descriptor directory inside a test workspace
pub const DESCRIPTORS_DIR: &str = "Configurations";
/// Output directory inside a test workspace
pub const OUTPUT_DIR: &str = "TerraDota/Items";

/// Manages a temporary directory laid out like a mod project.
/// Cleans up automatically when dropped.
pub struct TestWorkspace {
    pub temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    /// Creates a new workspace with an empty descriptor directory.
    pub fn new() -> Self {
        let workspace = Self {
            temp_dir: tempdir().expect("Failed to create temp dir"),
        };
        workspace.create_directory(DESCRIPTORS_DIR);
        workspace
    }

    /// Returns the root path of the workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Creates a file with content within the workspace.
    /// Automatically creates parent directories.
    pub fn create_file(&self, rel_path: &str, content: &str) {
        let file_path = self.path().join(rel_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent dirs for '{}': {}", rel_path, e)
            });
        }
        fs::write(&file_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", file_path.display(), e));
    }

    /// Creates a directory within the workspace.
    pub fn create_directory(&self, rel_path: &str) {
        let dir_path = self.path().join(rel_path);
        fs::create_dir_all(&dir_path).unwrap_or_else(|e| {
            panic!("Failed to create directory '{}': {}", dir_path.display(), e)
        });
    }

    /// Reads a file from the workspace.
    fn read_file(&self, rel_path: &str) -> String {
        let file_path = self.path().join(rel_path);
        fs::read_to_string(&file_path)
            .unwrap_or_else(|e| panic!("Failed to read file '{}': {}", file_path.display(), e))
    }

    /// Check if a file exists in the workspace.
    pub fn file_exists(&self, rel_path: &str) -> bool {
        self.path().join(rel_path).exists()
    }

    /// Get the absolute path to a file in the workspace.
    fn absolute_path(&self, rel_path: &str) -> PathBuf {
        self.path().join(rel_path)
    }

    /// Write `Configurations/<item_id>.json`.
    pub fn write_descriptor(&self, item_id: &str, json: &serde_json::Value) {
        let text = serde_json::to_string_pretty(json).expect("Failed to serialize descriptor");
        self.write_raw_descriptor(item_id, &text);
    }

    /// Write descriptor text as-is, for malformed-input tests.
    pub fn write_raw_descriptor(&self, item_id: &str, text: &str) {
        self.create_file(&format!("{}/{}.json", DESCRIPTORS_DIR, item_id), text);
    }

    /// Relative path of the generated file for `class_name`.
    pub fn output_rel_path(class_name: &str) -> String {
        format!("{}/{}.cs", OUTPUT_DIR, class_name)
    }

    /// Contents of the generated file for `class_name`.
    pub fn read_output(&self, class_name: &str) -> String {
        self.read_file(&Self::output_rel_path(class_name))
    }

    /// Replace the generated file for `class_name`, as an author would.
    pub fn write_output(&self, class_name: &str, content: &str) {
        self.create_file(&Self::output_rel_path(class_name), content);
    }

    pub fn output_exists(&self, class_name: &str) -> bool {
        self.file_exists(&Self::output_rel_path(class_name))
    }

    /// Configuration whose paths point into this workspace.
    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::default();
        config.paths.descriptors = self.absolute_path(DESCRIPTORS_DIR);
        config.paths.output = self.absolute_path(OUTPUT_DIR);
        config
    }
}
