use sxres_core::ResourceService;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Path")]
    path: String,
}

pub fn run(service: &ResourceService, filter: &str) -> Result<(), Box<dyn std::error::Error>> {
    let classpath = service.classpath();
    let rows: Vec<EntryRow> = classpath
        .dump(filter)
        .into_iter()
        .map(|(index, entry)| EntryRow {
            index,
            kind: if classpath.is_archive(entry) {
                "archive"
            } else {
                "folder"
            },
            path: entry.path.display().to_string(),
        })
        .collect();

    if rows.is_empty() {
        println!("No classpath entries.");
        return Ok(());
    }

    println!("{}", Table::new(rows));
    Ok(())
}
