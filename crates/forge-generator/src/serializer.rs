//! Tree reconstruction, canonical rendering and persistence

use forge_foundation::{ForgeError, ForgeResult};
use forge_lang_csharp::{ClassNode, ClassPosition, Printer, SourceTree};
use std::fs;
use std::path::Path;
use tracing::debug;

pub struct Serializer {
    printer: Printer,
}

impl Serializer {
    pub fn new(indent_width: usize) -> Self {
        Self {
            printer: Printer::new(indent_width),
        }
    }

    /// Substitute the merged class at the position it was located at
    pub fn rebuild(
        tree: SourceTree,
        position: ClassPosition,
        class: ClassNode,
    ) -> ForgeResult<SourceTree> {
        tree.replace_class(position, class)
    }

    pub fn render(&self, tree: &SourceTree) -> String {
        self.printer.print(tree)
    }

    /// Overwrite `path` with `contents`, creating parent directories
    pub fn persist(path: &Path, contents: &str) -> ForgeResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ForgeError::io(parent, e))?;
        }
        fs::write(path, contents).map_err(|e| ForgeError::io(path, e))?;
        debug!(path = %path.display(), bytes = contents.len(), "Wrote target file");
        Ok(())
    }
}
