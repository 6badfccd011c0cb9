use crate::Selection;
use std::path::Path;
use sxres_core::ResourceService;

pub fn run(
    service: &ResourceService,
    root: &str,
    target: &Path,
    selection: Selection,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = service.extract(root, target, selection.as_filter())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Copied {} files to {} ({} skipped, {} failed)",
            report.copied.len(),
            target.display(),
            report.skipped.len(),
            report.failed.len()
        );
        for failure in &report.failed {
            println!("  failed: {} ({})", failure.entry, failure.error);
        }
    }

    report.into_result()?;
    Ok(())
}
