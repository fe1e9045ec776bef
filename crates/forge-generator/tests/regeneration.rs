//! End-to-end regeneration against a temporary mod project

use forge_generator::{BatchRunner, GenerationStatus, MergeAction};
use forge_lang_csharp::{parse_source, MemberKind, StatementKind};
use forge_test_support::{basic_item_descriptor, mighty_blade_descriptor, TestWorkspace};
use pretty_assertions::assert_eq;
use serde_json::json;

fn run(workspace: &TestWorkspace) -> forge_generator::BatchReport {
    let report = BatchRunner::new(&workspace.config())
        .unwrap()
        .run()
        .unwrap();
    for (item, error) in report.failures() {
        panic!("{} failed: {}", item.item_id, error);
    }
    report
}

const MIGHTY_BLADE: &str = r#"/***automatically generated by itemforge***/

using Terraria;
using Terraria.ID;
using Terraria.ModLoader;

namespace TerraDota.Items
{
    public class MightyBlade : ModItem
    {
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
        }

        public override bool? UseItem()
        {
            return true;
        }
    }
}
"#;

#[test]
fn test_scenario_mighty_blade() {
    let workspace = TestWorkspace::new();
    workspace.write_descriptor("mighty_blade", &mighty_blade_descriptor());

    let report = run(&workspace);

    assert_eq!(workspace.read_output("MightyBlade"), MIGHTY_BLADE);
    let outcome = report.items[0].result.as_ref().unwrap();
    assert_eq!(outcome.class_name, "MightyBlade");
    assert_eq!(outcome.status, GenerationStatus::Created);
}

#[test]
fn test_scenario_basic_item() {
    let workspace = TestWorkspace::new();
    workspace.write_descriptor("basic_item", &basic_item_descriptor());

    run(&workspace);

    let output = workspace.read_output("BasicItem");
    assert!(output.contains("public class BasicItem : ModItem"));
    assert!(output.contains("Tooltip.SetDefault(\"\");"));
    assert!(output.contains("public override void SetDefaults()\n        {\n        }\n"));
}

#[test]
fn test_second_run_is_byte_identical() {
    let workspace = TestWorkspace::new();
    workspace.write_descriptor("mighty_blade", &mighty_blade_descriptor());
    workspace.write_descriptor("basic_item", &basic_item_descriptor());

    run(&workspace);
    let first = (
        workspace.read_output("MightyBlade"),
        workspace.read_output("BasicItem"),
    );

    let report = run(&workspace);
    let second = (
        workspace.read_output("MightyBlade"),
        workspace.read_output("BasicItem"),
    );

    assert_eq!(first, second);
    assert_eq!(report.changed(), 0);
}

#[test]
fn test_bootstrap_shape() {
    let workspace = TestWorkspace::new();
    workspace.write_descriptor("frost-bow", &json!({"description": "Chilly"}));

    run(&workspace);

    let tree = parse_source(&workspace.read_output("FrostBow")).unwrap();
    let namespaces: Vec<_> = tree.namespaces().collect();
    assert_eq!(namespaces.len(), 1);
    let (_, ns) = namespaces[0];
    assert_eq!(ns.name, "TerraDota.Items");

    let classes: Vec<_> = ns.classes().collect();
    assert_eq!(classes.len(), 1);
    let (_, class) = classes[0];
    assert_eq!(class.identifier, "FrostBow");
    assert_eq!(class.base_types, vec!["ModItem"]);

    let names: Vec<&str> = class
        .members
        .iter()
        .filter(|m| m.kind == MemberKind::Method)
        .filter_map(|m| m.name.as_deref())
        .collect();
    assert_eq!(
        names,
        vec!["SetStaticDefaults", "SetDefaults", "AddRecipes", "UseItem"]
    );
}

const HAND_EDITED: &str = r#"/***automatically generated by itemforge***/

using Terraria;
using Terraria.ID;
using Terraria.ModLoader;

namespace TerraDota.Items
{
    public class MightyBlade : ModItem
    {
        // Counts swings since the last use
        private int swings;

        public override void SetStaticDefaults()
        {
            Tooltip.SetDefault("Old text");
        }

        public override void SetDefaults()
        {
            Item.damage = 1;
        }

        public override void AddRecipes()
        {
            Recipe recipe = CreateRecipe();
            recipe.AddIngredient(ItemID.IronBar, 10);
            recipe.Register();
        }

        public override bool? UseItem()
        {
            swings++;
            return true;
        }

        private static string Describe(int value)
        {
            return $"Deals {value} damage";
        }
    }
}
"#;

#[test]
fn test_hand_written_code_is_preserved() {
    let workspace = TestWorkspace::new();
    workspace.write_descriptor("mighty_blade", &mighty_blade_descriptor());
    workspace.write_output("MightyBlade", HAND_EDITED);

    let report = run(&workspace);
    let output = workspace.read_output("MightyBlade");

    let expected = HAND_EDITED
        .replace("Tooltip.SetDefault(\"Old text\");", "Tooltip.SetDefault(\"A mighty blade\");")
        .replace("Item.damage = 1;", "Item.damage = 50;");
    assert_eq!(output, expected);

    let outcome = report.items[0].result.as_ref().unwrap();
    assert_eq!(outcome.status, GenerationStatus::Updated);
    assert_eq!(
        outcome.actions,
        vec![
            ("SetStaticDefaults".to_string(), MergeAction::Replaced),
            ("SetDefaults".to_string(), MergeAction::Replaced),
            ("AddRecipes".to_string(), MergeAction::Kept),
            ("UseItem".to_string(), MergeAction::Kept),
        ]
    );

    // And it stays that way
    run(&workspace);
    assert_eq!(workspace.read_output("MightyBlade"), expected);
}

#[test]
fn test_changed_description_updates_single_tooltip() {
    let workspace = TestWorkspace::new();
    workspace.write_descriptor("mighty_blade", &mighty_blade_descriptor());
    run(&workspace);

    workspace.write_descriptor(
        "mighty_blade",
        &json!({"description": "An even mightier blade", "default": {"damage": 50}}),
    );
    run(&workspace);

    let output = workspace.read_output("MightyBlade");
    assert_eq!(output.matches("SetStaticDefaults").count(), 1);
    assert!(output.contains("Tooltip.SetDefault(\"An even mightier blade\");"));
    assert!(!output.contains("\"A mighty blade\""));

    let tree = parse_source(&output).unwrap();
    let (_, ns) = tree.namespaces().next().unwrap();
    let (_, class) = ns.classes().next().unwrap();
    let tooltip: Vec<_> = class.methods_named("SetStaticDefaults").collect();
    assert_eq!(tooltip.len(), 1);
    let decl = class.members[tooltip[0]].method_decl().unwrap();
    assert_eq!(decl.statements().len(), 1);
    assert!(matches!(
        decl.statements()[0].kind,
        StatementKind::Expression(_)
    ));
}

#[test]
fn test_missing_canonical_members_are_appended_after_hand_code() {
    let workspace = TestWorkspace::new();
    workspace.write_descriptor("mighty_blade", &mighty_blade_descriptor());
    workspace.write_output(
        "MightyBlade",
        "namespace TerraDota.Items\n{\n    public class MightyBlade : ModItem\n    {\n        public int Charges => 3;\n    }\n}\n",
    );

    run(&workspace);
    let output = workspace.read_output("MightyBlade");

    let charges = output.find("public int Charges => 3;").unwrap();
    let tooltip = output.find("SetStaticDefaults").unwrap();
    let use_item = output.find("UseItem").unwrap();
    assert!(charges < tooltip && tooltip < use_item);
    // No skeleton: the file already had a namespace
    assert!(!output.contains("automatically generated"));
    assert!(!output.contains("using Terraria;"));
}

#[test]
fn test_other_classes_in_file_are_untouched() {
    let workspace = TestWorkspace::new();
    workspace.write_descriptor("mighty_blade", &mighty_blade_descriptor());
    let source = format!(
        "{}\nnamespace TerraDota.Helpers\n{{\n    public class MightyBlade\n    {{\n        public void SetDefaults() {{ }}\n    }}\n}}\n",
        MIGHTY_BLADE
    );
    workspace.write_output("MightyBlade", &source);

    run(&workspace);
    let output = workspace.read_output("MightyBlade");

    assert!(output.ends_with(
        "namespace TerraDota.Helpers\n{\n    public class MightyBlade\n    {\n        public void SetDefaults() { }\n    }\n}\n"
    ));
    assert_eq!(output.matches("Item.damage = 50;").count(), 1);
}

const WITH_REGIONS: &str = r#"namespace TerraDota.Items
{
    public class MightyBlade : ModItem
    {
        #region Stuff
        private int swings;
        #endregion

#if DEBUG
        private void Trace() { }
#endif

        public override void SetStaticDefaults()
        {
            Tooltip.SetDefault("Old text");
        }
    }
}
"#;

#[test]
fn test_preprocessor_directives_reach_a_fixed_point() {
    let workspace = TestWorkspace::new();
    workspace.write_descriptor("mighty_blade", &mighty_blade_descriptor());
    workspace.write_output("MightyBlade", WITH_REGIONS);

    run(&workspace);
    let first = workspace.read_output("MightyBlade");

    let report = run(&workspace);
    assert_eq!(workspace.read_output("MightyBlade"), first);
    assert_eq!(report.changed(), 0);

    assert!(!first.contains("\n\n\n"));
    assert!(first.contains("        #region Stuff\n        private int swings;\n        #endregion\n"));
    assert!(first.contains("#if DEBUG"));
    assert!(first.contains("Tooltip.SetDefault(\"A mighty blade\");"));
    assert_eq!(first.matches("SetStaticDefaults").count(), 1);
}
