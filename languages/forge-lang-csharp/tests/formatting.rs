//! Parse/print behavior on realistic item files

use forge_lang_csharp::{parse_source, MemberKind, Printer, SourceTree};
use pretty_assertions::assert_eq;

const HAND_EDITED: &str = r#"/***automatically generated by itemforge***/
using Terraria;
using Terraria.ID;
using Terraria.ModLoader;

namespace TerraDota.Items
{
	public class MightyBlade : ModItem
	{
		// Keeps track of swings between uses
		private int swingCount;

		public override void SetStaticDefaults()
		{
			Tooltip.SetDefault("A mighty blade");
		}

		public override void SetDefaults()
		{
			Item.damage = 50;
		}

		public override void AddRecipes()
		{
			Recipe recipe = CreateRecipe();
			recipe.AddIngredient(ItemID.IronBar, 10);
			recipe.Register();
		}

		public override bool? UseItem(Player player)
		{
			swingCount++;
			return true;
		}

		private void Helper() => swingCount = 0;
	}
}
"#;

fn print(tree: &SourceTree) -> String {
    Printer::new(4).print(tree)
}

#[test]
fn test_tabs_are_normalized_once_then_stable() {
    let first = print(&parse_source(HAND_EDITED).unwrap());
    let second = print(&parse_source(&first).unwrap());

    assert!(!first.contains('\t'));
    assert!(first.contains("            recipe.AddIngredient(ItemID.IronBar, 10);\n"));
    assert_eq!(first, second);
}

#[test]
fn test_hand_written_members_survive() {
    let tree = parse_source(HAND_EDITED).unwrap();
    let printed = print(&tree);

    assert!(printed.contains("// Keeps track of swings between uses\n        private int swingCount;"));
    assert!(printed.contains("private void Helper() => swingCount = 0;"));
    assert!(printed.contains("swingCount++;"));

    let (_, ns) = tree.namespaces().next().unwrap();
    let (_, class) = ns.classes().next().unwrap();
    let names: Vec<Option<&str>> = class
        .members
        .iter()
        .filter(|m| m.kind == MemberKind::Method)
        .map(|m| m.name.as_deref())
        .collect();
    assert_eq!(
        names,
        vec![
            Some("SetStaticDefaults"),
            Some("SetDefaults"),
            Some("AddRecipes"),
            Some("UseItem"),
            Some("Helper")
        ]
    );
}

#[test]
fn test_output_ends_with_single_newline() {
    let printed = print(&parse_source("namespace A\n{\n}\n\n\n").unwrap());
    assert_eq!(printed, "namespace A\n{\n}\n");
}

#[test]
fn test_crlf_input_prints_lf() {
    let source = HAND_EDITED.replace('\n', "\r\n");
    let printed = print(&parse_source(&source).unwrap());

    assert!(!printed.contains('\r'));
    assert_eq!(printed, print(&parse_source(HAND_EDITED).unwrap()));
}

const WITH_DIRECTIVES: &str = r#"namespace TerraDota.Items
{
    public class Sword : ModItem
    {
        #region Helpers
        private void Helper() { }
        #endregion

#if DEBUG
        private void Trace() { }
#endif
    }
}
"#;

#[test]
fn test_preprocessor_directives_are_stable() {
    let first = print(&parse_source(WITH_DIRECTIVES).unwrap());
    let second = print(&parse_source(&first).unwrap());
    let third = print(&parse_source(&second).unwrap());

    assert_eq!(first, second);
    assert_eq!(second, third);
    assert!(!first.contains("\n\n\n"));
    assert!(first.contains("        #region Helpers\n"));
    assert!(first.contains("        #endregion\n"));
    assert!(first.contains("#if DEBUG\n"));
    assert!(first.contains("private void Trace() { }\n"));
}

#[test]
fn test_region_keeps_single_blank_line_before_next_member() {
    let source = "namespace A\n{\n    class B\n    {\n        #region Fields\n\n        private int x;\n        #endregion\n    }\n}\n";
    let printed = print(&parse_source(source).unwrap());

    assert_eq!(printed, source);
}
