//! Skeleton creation for new target files

use crate::synthesizer::Synthesizer;
use forge_config::GeneratorConfig;
use forge_lang_csharp::{
    ClassNode, NamespaceNode, SourceTree, TopLevelItem, TopLevelKind, Trivia, TypeMember,
    TypeMemberKind, UsingDirective, Verbatim,
};
use tracing::debug;

pub struct Bootstrapper<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> Bootstrapper<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// A tree needs a skeleton when it declares no namespace at all
    pub fn needs_bootstrap(tree: &SourceTree) -> bool {
        tree.namespaces().next().is_none()
    }

    /// Add the banner, missing imports, and the managed namespace holding a
    /// `class_name` class with the four canonical members.
    ///
    /// Whatever the tree already holds is kept in place.
    pub fn bootstrap(&self, tree: SourceTree, class_name: &str) -> SourceTree {
        let SourceTree {
            mut header,
            items,
            trailing,
        } = tree;

        if header.is_empty() && !self.config.banner.trim().is_empty() {
            header.push(Verbatim::from_text(self.config.banner.trim()));
        }

        let missing: Vec<TopLevelItem> = self
            .config
            .imports
            .iter()
            .filter(|import| {
                !items.iter().any(|item| {
                    matches!(&item.kind, TopLevelKind::Using(u) if !u.global && &u.target == *import)
                })
            })
            .map(|import| TopLevelItem {
                trivia: Trivia::none(),
                kind: TopLevelKind::Using(UsingDirective::new(import.as_str())),
            })
            .collect();

        let insert_at = items
            .iter()
            .rposition(|item| matches!(item.kind, TopLevelKind::Using(_)))
            .map_or(0, |index| index + 1);

        let mut rebuilt = Vec::with_capacity(items.len() + missing.len() + 1);
        let mut items = items.into_iter();
        rebuilt.extend(items.by_ref().take(insert_at));
        rebuilt.extend(missing);
        rebuilt.extend(items);

        rebuilt.push(TopLevelItem {
            trivia: Trivia::spaced(),
            kind: TopLevelKind::Namespace(self.namespace(class_name)),
        });

        debug!(class = %class_name, namespace = %self.config.namespace, "Bootstrapped skeleton");

        SourceTree {
            header,
            items: rebuilt,
            trailing,
        }
    }

    fn namespace(&self, class_name: &str) -> NamespaceNode {
        let synthesizer = Synthesizer::new(self.config);

        let mut class = ClassNode::new(class_name);
        class.modifiers.push("public".to_string());
        class.base_types.push(self.config.base_type.clone());
        class.members = vec![
            synthesizer.static_defaults(""),
            synthesizer.empty_defaults(),
            synthesizer.recipes(),
            synthesizer.use_item(),
        ];

        let mut ns = NamespaceNode::new(self.config.namespace.as_str());
        ns.members.push(TypeMember {
            trivia: Trivia::none(),
            kind: TypeMemberKind::Class(class),
        });
        ns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_lang_csharp::{parse_source, Printer};
    use pretty_assertions::assert_eq;

    const SKELETON: &str = r#"/***automatically generated by itemforge***/

using Terraria;
using Terraria.ID;
using Terraria.ModLoader;

namespace TerraDota.Items
{
    public class MightyBlade : ModItem
    {
        public override void SetStaticDefaults()
        {
            Tooltip.SetDefault("");
        }

        public override void SetDefaults()
        {
        }

        public override void AddRecipes()
        {
        }

        public override bool? UseItem()
        {
            return true;
        }
    }
}
"#;

    #[test]
    fn test_empty_tree_gets_full_skeleton() {
        let config = GeneratorConfig::default();
        let tree = SourceTree::default();
        assert!(Bootstrapper::needs_bootstrap(&tree));

        let tree = Bootstrapper::new(&config).bootstrap(tree, "MightyBlade");

        assert!(!Bootstrapper::needs_bootstrap(&tree));
        assert_eq!(Printer::new(4).print(&tree), SKELETON);
    }

    #[test]
    fn test_existing_content_is_kept() {
        let config = GeneratorConfig::default();
        let tree = parse_source("// My notes\n\nusing System;\nusing Terraria;\n").unwrap();

        let tree = Bootstrapper::new(&config).bootstrap(tree, "Sword");
        let printed = Printer::new(4).print(&tree);

        assert!(printed.starts_with("// My notes\n\nusing System;\nusing Terraria;\nusing Terraria.ID;\nusing Terraria.ModLoader;\n\nnamespace TerraDota.Items\n"));
        assert!(!printed.contains("automatically generated"));
    }

    #[test]
    fn test_tree_with_namespace_is_left_alone() {
        let tree = parse_source("namespace Elsewhere\n{\n}\n").unwrap();
        assert!(!Bootstrapper::needs_bootstrap(&tree));
    }
}
