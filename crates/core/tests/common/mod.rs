use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use sxres_core::host::FixedHost;
use sxres_core::{ClasspathIndex, ResourceConfig, ResourceService, ResourceServiceBuilder};

/// Writes `(relative path, content)` pairs below `root`.
#[allow(dead_code)]
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let file = root.join(relative);
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(file, content).unwrap();
    }
}

/// Writes a zip archive; names ending in `/` become directory entries and
/// every file holds its own name as content.
#[allow(dead_code)]
pub fn write_archive(path: &Path, entries: &[&str]) {
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    let options = zip::write::SimpleFileOptions::default();
    for name in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options).unwrap();
        } else {
            zip.start_file(*name, options).unwrap();
            zip.write_all(name.as_bytes()).unwrap();
        }
    }
    zip.finish().unwrap();
}

/// Service rooted at `work_dir` with a fixed classpath and app-data folder.
#[allow(dead_code)]
pub fn service(work_dir: &Path, classpath: &[&Path]) -> ResourceService {
    builder(work_dir, classpath).build()
}

#[allow(dead_code)]
pub fn builder(work_dir: &Path, classpath: &[&Path]) -> ResourceServiceBuilder {
    let entries: Vec<String> = classpath
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    ResourceServiceBuilder::new()
        .with_config(ResourceConfig::default().with_work_dir(work_dir))
        .with_host(Arc::new(FixedHost::new(work_dir.join("appdata"))))
        .with_classpath(ClasspathIndex::from_entries(entries))
}
