//! Per-item generation pipeline
//!
//! read target → parse → bootstrap if needed → locate → synthesize and merge
//! → rebuild if dirty → render → write if the bytes changed

use crate::bootstrap::Bootstrapper;
use crate::descriptor::Descriptor;
use crate::locator::Locator;
use crate::merger::{MergeAction, Merger};
use crate::serializer::Serializer;
use crate::synthesizer::Synthesizer;
use forge_config::{AppConfig, GeneratorConfig};
use forge_foundation::naming::class_name_for_item;
use forge_foundation::{ForgeError, ForgeResult};
use forge_lang_csharp::{CsharpParser, SourceTree};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStatus {
    /// The target did not exist
    Created,
    /// The target existed and its bytes changed
    Updated,
    /// The rendered text equals the file on disk
    Unchanged,
}

impl GenerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStatus::Created => "created",
            GenerationStatus::Updated => "updated",
            GenerationStatus::Unchanged => "unchanged",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub item_id: String,
    pub class_name: String,
    pub target: PathBuf,
    pub status: GenerationStatus,
    /// A skeleton was added before merging
    pub bootstrapped: bool,
    pub actions: Vec<(String, MergeAction)>,
}

pub struct ItemGenerator {
    config: GeneratorConfig,
    output_dir: PathBuf,
    dry_run: bool,
    parser: CsharpParser,
    serializer: Serializer,
}

impl ItemGenerator {
    pub fn new(config: &AppConfig) -> ForgeResult<Self> {
        Ok(Self {
            config: config.generator.clone(),
            output_dir: config.paths.output.clone(),
            dry_run: false,
            parser: CsharpParser::new()?,
            serializer: Serializer::new(config.generator.indent_width),
        })
    }

    /// Render without writing
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Where the class for `item_id` is written
    pub fn target_path(&self, item_id: &str) -> ForgeResult<PathBuf> {
        let class_name = class_name_for_item(item_id)?;
        Ok(self.output_dir.join(format!("{}.cs", class_name)))
    }

    pub fn generate(&mut self, descriptor: &Descriptor) -> ForgeResult<GenerationOutcome> {
        let class_name = class_name_for_item(&descriptor.item_id)?;
        let target = self.output_dir.join(format!("{}.cs", class_name));

        let existing = read_existing(&target)?;
        let mut tree = match &existing {
            Some(text) => self.parser.parse(text.strip_prefix('\u{feff}').unwrap_or(text))?,
            None => SourceTree::default(),
        };

        let mut dirty = false;
        let bootstrapped = Bootstrapper::needs_bootstrap(&tree);
        if bootstrapped {
            tree = Bootstrapper::new(&self.config).bootstrap(tree, &class_name);
            dirty = true;
        }

        let position = Locator::new(&self.config.namespace, &self.config.base_type)
            .locate(&tree, &class_name)?;
        let class = tree
            .class_at(position)
            .cloned()
            .ok_or_else(|| ForgeError::internal("located class vanished from tree"))?;

        let plan = Synthesizer::new(&self.config).plan(descriptor)?;
        let merged = Merger::merge_all(class, plan)?;
        dirty |= merged.dirty;

        if dirty {
            tree = Serializer::rebuild(tree, position, merged.class)?;
        }

        let rendered = self.serializer.render(&tree);
        let status = match &existing {
            None => GenerationStatus::Created,
            Some(text) if *text == rendered => GenerationStatus::Unchanged,
            Some(_) => GenerationStatus::Updated,
        };

        if status != GenerationStatus::Unchanged {
            if self.dry_run {
                debug!(path = %target.display(), "Dry run, not writing");
            } else {
                Serializer::persist(&target, &rendered)?;
            }
        }

        info!(
            class = %class_name,
            path = %target.display(),
            status = status.as_str(),
            bootstrapped,
            "Generated item"
        );

        Ok(GenerationOutcome {
            item_id: descriptor.item_id.clone(),
            class_name,
            target,
            status,
            bootstrapped,
            actions: merged.actions,
        })
    }
}

/// The target's text, or `None` when it does not exist yet
fn read_existing(path: &Path) -> ForgeResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ForgeError::io(path, e)),
    }
}
