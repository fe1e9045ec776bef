//! Managed namespace and class lookup
//!
//! Names are matched exactly. A name that matches more than once is an
//! error rather than a first-match pick, and so is a managed class that does
//! not derive directly from the configured base type.

use forge_foundation::{ForgeError, ForgeResult};
use forge_lang_csharp::{ClassPosition, SourceTree, TypeMemberKind};

pub struct Locator<'a> {
    namespace: &'a str,
    base_type: &'a str,
}

impl<'a> Locator<'a> {
    pub fn new(namespace: &'a str, base_type: &'a str) -> Self {
        Self {
            namespace,
            base_type,
        }
    }

    /// Find the position of `class_name` inside the managed namespace
    pub fn locate(&self, tree: &SourceTree, class_name: &str) -> ForgeResult<ClassPosition> {
        let namespaces: Vec<_> = tree
            .namespaces()
            .filter(|(_, ns)| ns.name == self.namespace)
            .collect();
        let (namespace_index, ns) = match namespaces.as_slice() {
            [] => return Err(ForgeError::namespace_not_found(self.namespace)),
            [single] => *single,
            many => {
                return Err(ForgeError::ambiguous(
                    "namespace",
                    self.namespace,
                    many.len(),
                ))
            }
        };

        let matches: Vec<_> = ns
            .members
            .iter()
            .enumerate()
            .filter(|(_, member)| match &member.kind {
                TypeMemberKind::Class(class) => class.identifier == class_name,
                TypeMemberKind::Other(node) => {
                    node.kind == "class_declaration" && node.name.as_deref() == Some(class_name)
                }
            })
            .collect();

        let (class_index, member) = match matches.as_slice() {
            [] => return Err(ForgeError::class_not_found(class_name, self.namespace)),
            [single] => *single,
            many => return Err(ForgeError::ambiguous("class", class_name, many.len())),
        };

        let class = match &member.kind {
            TypeMemberKind::Class(class) => class,
            TypeMemberKind::Other(_) => {
                return Err(ForgeError::unsupported_syntax(format!(
                    "class '{}' is declared with syntax the generator cannot rewrite",
                    class_name
                )))
            }
        };

        match class.direct_base() {
            Some(base) if self.is_base_type(base) => Ok(ClassPosition {
                namespace: namespace_index,
                class: class_index,
            }),
            found => Err(ForgeError::base_type_mismatch(
                class_name,
                self.base_type,
                found.unwrap_or("(none)"),
            )),
        }
    }

    /// `ModItem` and qualified spellings such as `Terraria.ModLoader.ModItem`
    fn is_base_type(&self, written: &str) -> bool {
        let written = written.trim_start_matches("global::");
        written == self.base_type
            || written
                .strip_suffix(self.base_type)
                .is_some_and(|prefix| prefix.ends_with('.'))
    }
}
