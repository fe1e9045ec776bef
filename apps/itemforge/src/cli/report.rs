//! Human-readable batch summary for stdout

use forge_generator::{BatchReport, GenerationStatus};
use std::fmt::Write;

pub fn render(report: &BatchReport, dry_run: bool) -> String {
    let mut out = String::new();

    for item in &report.items {
        // Writing into a String cannot fail
        let _ = match &item.result {
            Ok(outcome) => writeln!(
                out,
                "{:<12} {} -> {}",
                status_label(outcome.status, dry_run),
                item.item_id,
                outcome.target.display()
            ),
            Err(e) => writeln!(out, "{:<12} {}: {}", "failed", item.item_id, e),
        };
    }

    let changed_label = if dry_run { "would change" } else { "changed" };
    let _ = writeln!(
        out,
        "{} item(s): {} succeeded, {} failed, {} {}",
        report.items.len(),
        report.succeeded(),
        report.failed(),
        report.changed(),
        changed_label
    );
    out
}

fn status_label(status: GenerationStatus, dry_run: bool) -> &'static str {
    match (status, dry_run) {
        (GenerationStatus::Created, false) => "created",
        (GenerationStatus::Created, true) => "would create",
        (GenerationStatus::Updated, false) => "updated",
        (GenerationStatus::Updated, true) => "would update",
        (GenerationStatus::Unchanged, _) => "unchanged",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_generator::{GenerationOutcome, ItemReport};
    use std::path::PathBuf;

    fn outcome(status: GenerationStatus) -> GenerationOutcome {
        GenerationOutcome {
            item_id: "mighty_blade".to_string(),
            class_name: "MightyBlade".to_string(),
            target: PathBuf::from("Items/MightyBlade.cs"),
            status,
            bootstrapped: false,
            actions: Vec::new(),
        }
    }

    #[test]
    fn test_summary_lines() {
        let report = BatchReport {
            items: vec![ItemReport {
                item_id: "mighty_blade".to_string(),
                descriptor: PathBuf::from("Configurations/mighty_blade.json"),
                result: Ok(outcome(GenerationStatus::Created)),
            }],
        };

        let text = render(&report, false);
        assert!(text.starts_with("created      mighty_blade -> Items/MightyBlade.cs\n"));
        assert!(text.ends_with("1 item(s): 1 succeeded, 0 failed, 1 changed\n"));

        let text = render(&report, true);
        assert!(text.starts_with("would create mighty_blade"));
        assert!(text.contains("1 would change"));
    }
}
