//! Batch behavior with failing items

use forge_foundation::ForgeError;
use forge_generator::BatchRunner;
use forge_test_support::{basic_item_descriptor, mighty_blade_descriptor, TestWorkspace};
use serde_json::json;

#[test]
fn test_bad_descriptor_does_not_block_others() {
    let workspace = TestWorkspace::new();
    workspace.write_descriptor("alpha_sword", &mighty_blade_descriptor());
    workspace.write_raw_descriptor("broken", "{ \"description\": ");
    workspace.write_descriptor("zeta_staff", &basic_item_descriptor());

    let report = BatchRunner::new(&workspace.config())
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.items.len(), 3);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);
    assert!(!report.is_success());

    let (failed, error) = report.failures().next().unwrap();
    assert_eq!(failed.item_id, "broken");
    assert!(matches!(error, ForgeError::Descriptor { .. }));

    assert!(workspace.output_exists("AlphaSword"));
    assert!(workspace.output_exists("ZetaStaff"));
}

#[test]
fn test_locator_failures_are_per_item() {
    let workspace = TestWorkspace::new();
    workspace.write_descriptor("wrong_base", &basic_item_descriptor());
    workspace.write_descriptor("fine", &basic_item_descriptor());
    let foreign = "namespace TerraDota.Items\n{\n    public class WrongBase : ModProjectile\n    {\n    }\n}\n";
    workspace.write_output("WrongBase", foreign);

    let report = BatchRunner::new(&workspace.config())
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.failed(), 1);
    let (failed, error) = report.failures().next().unwrap();
    assert_eq!(failed.item_id, "wrong_base");
    assert!(matches!(error, ForgeError::BaseTypeMismatch { .. }));
    // Failed targets are never rewritten
    assert_eq!(workspace.read_output("WrongBase"), foreign);
    assert!(workspace.output_exists("Fine"));
}

#[test]
fn test_unparseable_target_fails_only_that_item() {
    let workspace = TestWorkspace::new();
    workspace.write_descriptor("mangled", &basic_item_descriptor());
    workspace.write_descriptor("tidy", &basic_item_descriptor());
    workspace.write_output("Mangled", "namespace TerraDota.Items {\n    class Mangled : ModItem {\n");

    let report = BatchRunner::new(&workspace.config())
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.succeeded(), 1);
    let (_, error) = report.failures().next().unwrap();
    assert!(matches!(error, ForgeError::Parse { .. }));
}

#[test]
fn test_mistyped_default_is_reported() {
    let workspace = TestWorkspace::new();
    workspace.write_descriptor("odd", &json!({"default": {"knockBack": "strong"}}));

    let report = BatchRunner::new(&workspace.config())
        .unwrap()
        .run()
        .unwrap();

    let (_, error) = report.failures().next().unwrap();
    assert!(error.to_string().contains("default.knockBack must be a number"));
    assert!(!workspace.output_exists("Odd"));
}

#[test]
fn test_dry_run_reports_changes_without_writing() {
    let workspace = TestWorkspace::new();
    workspace.write_descriptor("mighty_blade", &mighty_blade_descriptor());

    let report = BatchRunner::new(&workspace.config())
        .unwrap()
        .dry_run(true)
        .run()
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.changed(), 1);
    assert!(!workspace.output_exists("MightyBlade"));
}

#[test]
fn test_filter_limits_items() {
    let workspace = TestWorkspace::new();
    workspace.write_descriptor("mighty_blade", &mighty_blade_descriptor());
    workspace.write_descriptor("basic_item", &basic_item_descriptor());

    let report = BatchRunner::new(&workspace.config())
        .unwrap()
        .with_filter(vec!["basic_item".to_string()])
        .run()
        .unwrap();

    assert_eq!(report.items.len(), 1);
    assert!(workspace.output_exists("BasicItem"));
    assert!(!workspace.output_exists("MightyBlade"));
}

#[test]
fn test_descriptors_sharing_a_class_both_fail() {
    let workspace = TestWorkspace::new();
    workspace.write_descriptor("mighty_blade", &mighty_blade_descriptor());
    workspace.write_descriptor("mighty-blade", &basic_item_descriptor());
    workspace.write_descriptor("fine", &basic_item_descriptor());

    let report = BatchRunner::new(&workspace.config())
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 2);
    let mut failed: Vec<_> = report
        .failures()
        .map(|(item, error)| {
            assert!(matches!(
                error,
                ForgeError::Ambiguous { kind, name, count: 2 } if kind == "class" && name == "MightyBlade"
            ));
            item.item_id.as_str()
        })
        .collect();
    failed.sort();
    assert_eq!(failed, ["mighty-blade", "mighty_blade"]);

    assert!(!workspace.output_exists("MightyBlade"));
    assert!(workspace.output_exists("Fine"));
}

#[test]
fn test_filtered_run_still_sees_shared_class() {
    let workspace = TestWorkspace::new();
    workspace.write_descriptor("mighty_blade", &mighty_blade_descriptor());
    workspace.write_descriptor("mighty-blade", &basic_item_descriptor());

    let report = BatchRunner::new(&workspace.config())
        .unwrap()
        .with_filter(vec!["mighty_blade".to_string()])
        .run()
        .unwrap();

    assert_eq!(report.items.len(), 1);
    assert!(matches!(
        report.failures().next().unwrap().1,
        ForgeError::Ambiguous { .. }
    ));
    assert!(!workspace.output_exists("MightyBlade"));
}
