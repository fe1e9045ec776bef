//! Sequential batch over a descriptor directory
//!
//! Each descriptor is loaded, generated and written before the next one is
//! touched. Failures are recorded per item; only an unreadable descriptor
//! directory stops the run.

use crate::descriptor::Descriptor;
use crate::generator::{GenerationOutcome, GenerationStatus, ItemGenerator};
use forge_config::logging::item_span;
use forge_config::AppConfig;
use forge_foundation::naming::class_name_for_item;
use forge_foundation::{ForgeError, ForgeResult};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

const DESCRIPTOR_EXTENSION: &str = "json";

#[derive(Debug)]
pub struct ItemReport {
    pub item_id: String,
    pub descriptor: PathBuf,
    pub result: ForgeResult<GenerationOutcome>,
}

impl ItemReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Whether the target was (or in a dry run, would be) written
    pub fn changed(&self) -> bool {
        matches!(&self.result, Ok(outcome) if outcome.status != GenerationStatus::Unchanged)
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<ItemReport>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }

    pub fn changed(&self) -> usize {
        self.items.iter().filter(|i| i.changed()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&ItemReport, &ForgeError)> {
        self.items
            .iter()
            .filter_map(|item| item.result.as_ref().err().map(|e| (item, e)))
    }

    /// True when every item succeeded
    pub fn is_success(&self) -> bool {
        self.items.iter().all(ItemReport::is_success)
    }
}

pub struct BatchRunner {
    descriptors_dir: PathBuf,
    generator: ItemGenerator,
    filter: Vec<String>,
}

impl BatchRunner {
    pub fn new(config: &AppConfig) -> ForgeResult<Self> {
        Ok(Self {
            descriptors_dir: config.paths.descriptors.clone(),
            generator: ItemGenerator::new(config)?,
            filter: Vec::new(),
        })
    }

    /// Only process these item ids
    pub fn with_filter(mut self, items: Vec<String>) -> Self {
        self.filter = items;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.generator = self.generator.dry_run(dry_run);
        self
    }

    /// Descriptor files in file-name order, after filtering
    pub fn discover(&self) -> ForgeResult<Vec<PathBuf>> {
        Ok(self.apply_filter(self.descriptor_files()?))
    }

    fn descriptor_files(&self) -> ForgeResult<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.descriptors_dir)
            .map_err(|e| ForgeError::io(&self.descriptors_dir, e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| ForgeError::io(&self.descriptors_dir, e))?
                .path();
            if path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(DESCRIPTOR_EXTENSION)
            {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(paths)
    }

    fn apply_filter(&self, mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
        if !self.filter.is_empty() {
            paths.retain(|path| {
                item_id_of(path).is_some_and(|id| self.filter.iter().any(|f| f == id))
            });
        }
        paths
    }

    pub fn run(&mut self) -> ForgeResult<BatchReport> {
        let all = self.descriptor_files()?;
        // Checked over the whole directory: a filtered run still shares files
        let claims = class_claims(&all);
        let paths = self.apply_filter(all);
        info!(
            descriptors = %self.descriptors_dir.display(),
            output = %self.generator.output_dir().display(),
            count = paths.len(),
            "Starting generation"
        );

        let mut report = BatchReport::default();

        // Requested items with no descriptor are failures, not silent no-ops
        for requested in &self.filter {
            if !paths.iter().any(|p| item_id_of(p) == Some(requested.as_str())) {
                let descriptor = self
                    .descriptors_dir
                    .join(format!("{}.{}", requested, DESCRIPTOR_EXTENSION));
                error!(item = %requested, "No descriptor for requested item");
                report.items.push(ItemReport {
                    item_id: requested.clone(),
                    result: Err(ForgeError::descriptor(&descriptor, "descriptor not found")),
                    descriptor,
                });
            }
        }

        for path in paths {
            let shared = item_id_of(&path)
                .and_then(|id| class_name_for_item(id).ok())
                .and_then(|class| {
                    let count = claims.get(&class).map_or(0, Vec::len);
                    (count > 1).then_some((class, count))
                });

            match shared {
                Some((class, count)) => {
                    let item_id = item_id_of(&path).unwrap_or_default().to_string();
                    error!(
                        item = %item_id,
                        class = %class,
                        descriptors = ?claims.get(&class),
                        "Descriptors map to the same class"
                    );
                    report.items.push(ItemReport {
                        item_id,
                        result: Err(ForgeError::ambiguous("class", class, count)),
                        descriptor: path,
                    });
                }
                None => report.items.push(self.run_one(&path)),
            }
        }

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            changed = report.changed(),
            "Generation finished"
        );
        Ok(report)
    }

    fn run_one(&mut self, path: &Path) -> ItemReport {
        let item_id = item_id_of(path).unwrap_or_default().to_string();
        let span = item_span(&item_id, path);
        let _enter = span.enter();

        let result = Descriptor::load(path).and_then(|d| self.generator.generate(&d));
        if let Err(e) = &result {
            error!(error = %e, kind = e.kind(), "Item failed");
        }

        ItemReport {
            item_id,
            descriptor: path.to_path_buf(),
            result,
        }
    }
}

fn item_id_of(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|s| s.to_str())
}

/// Item ids per generated class name
fn class_claims(paths: &[PathBuf]) -> HashMap<String, Vec<String>> {
    let mut claims: HashMap<String, Vec<String>> = HashMap::new();
    for id in paths.iter().filter_map(|p| item_id_of(p)) {
        if let Ok(class) = class_name_for_item(id) {
            claims.entry(class).or_default().push(id.to_string());
        }
    }
    claims
}
