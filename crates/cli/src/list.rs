use crate::Selection;
use std::path::Path;
use sxres_core::ResourceService;
use tracing::info;

pub fn resolve(service: &ResourceService, root: &str) -> Result<(), Box<dyn std::error::Error>> {
    let origin = service.resolve(root)?;
    println!("{}", origin);
    Ok(())
}

pub fn run(
    service: &ResourceService,
    root: &str,
    selection: Selection,
    full: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let manifest = service.list(root, selection.as_filter())?;

    if json {
        let out = if full {
            serde_json::to_string_pretty(&manifest.paths())?
        } else {
            serde_json::to_string_pretty(&manifest)?
        };
        println!("{}", out);
    } else if full {
        for path in manifest.paths() {
            println!("{}", path);
        }
    } else {
        print!("{}", manifest.render("\n"));
    }
    info!("{} files below {}", manifest.file_count(), root);
    Ok(())
}

pub fn export(service: &ResourceService, root: &str, target: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let written = service.export_manifest(root, target, None)?;
    println!("{}", written.display());
    Ok(())
}
