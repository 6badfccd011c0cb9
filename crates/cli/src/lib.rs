mod classpath;
mod extract;
mod list;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use sxres_core::filter::{self, ResourceFilter};
use sxres_core::{ClasspathIndex, Host, ResourceConfig, ResourceService, ResourceServiceBuilder, SystemHost};

#[derive(Parser)]
#[command(
    name = "sxres",
    version,
    about = "Locate, list and extract bundled resource trees",
    long_about = "sxres resolves logical resource roots such as /sikulixlibs/linux/libs64 to the \
                  directory, archive or classpath archive holding them, lists their content in the \
                  compact sikulixcontent format and extracts them to disk."
)]
pub struct Cli {
    /// Directory or archive the application runs from
    #[arg(long, global = true, value_name = "PATH")]
    pub reference: Option<PathBuf>,

    /// Classpath to search instead of $CLASSPATH
    #[arg(long, global = true, value_name = "PATHS")]
    pub classpath: Option<String>,

    /// Also log to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show where a logical root lives
    Resolve {
        #[arg(value_name = "ROOT")]
        root: String,
    },
    /// List the resources below a logical root
    List {
        #[arg(value_name = "ROOT")]
        root: String,
        #[command(flatten)]
        filter: FilterArgs,
        /// One folder/name line per file instead of the compact format
        #[arg(long)]
        full: bool,
        #[arg(long)]
        json: bool,
    },
    /// Copy the resources below a logical root into a directory
    Extract {
        #[arg(value_name = "ROOT")]
        root: String,
        #[arg(value_name = "TARGET")]
        target: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        json: bool,
    },
    /// Write the sikulixcontent manifest of a logical root into a directory
    Manifest {
        #[arg(value_name = "ROOT")]
        root: String,
        #[arg(value_name = "TARGET")]
        target: PathBuf,
    },
    /// Show classpath entries, optionally only those containing a text
    Classpath {
        #[arg(value_name = "FILTER")]
        filter: Option<String>,
    },
}

#[derive(Args, Default)]
pub struct FilterArgs {
    /// Skip files ending with this suffix (repeatable)
    #[arg(long = "exclude", value_name = "SUFFIX")]
    pub exclude: Vec<String>,
    /// Only files whose relative path matches this regex
    #[arg(long, value_name = "REGEX")]
    pub pattern: Option<regex::Regex>,
}

impl FilterArgs {
    fn is_empty(&self) -> bool {
        self.exclude.is_empty() && self.pattern.is_none()
    }
}

/// Owns the filters selected on the command line.
pub(crate) struct Selection {
    exclude: filter::ExcludeSuffixes,
    pattern: Option<filter::Matching>,
    active: bool,
}

impl Selection {
    pub(crate) fn new(args: FilterArgs) -> Self {
        let active = !args.is_empty();
        Self {
            exclude: filter::exclude_suffixes(args.exclude),
            pattern: args.pattern.map(filter::matching),
            active,
        }
    }

    pub(crate) fn as_filter(&self) -> Option<&dyn ResourceFilter> {
        if self.active { Some(self) } else { None }
    }
}

impl ResourceFilter for Selection {
    fn accept(&self, folder: &str, name: &str) -> bool {
        self.exclude.accept(folder, name)
            && self.pattern.as_ref().is_none_or(|p| p.accept(folder, name))
    }
}

fn build_service(cli: &Cli) -> ResourceService {
    let mut config = ResourceConfig::from_env();
    if let Some(reference) = &cli.reference {
        config = config.with_reference(reference);
    }
    let classpath = match &cli.classpath {
        Some(paths) => ClasspathIndex::from_entries(
            std::env::split_paths(paths).map(|p| p.to_string_lossy().into_owned()),
        ),
        None => ClasspathIndex::from_env(),
    };
    ResourceServiceBuilder::new()
        .with_config(config)
        .with_classpath(classpath)
        .build()
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_dir = ResourceConfig::from_env()
        .app_data_dir
        .unwrap_or_else(|| SystemHost.app_data_dir())
        .join("logs");
    let _guard = sxres_core::logging::init_logging("sxres", &log_dir, cli.verbose);

    let service = build_service(&cli);

    match cli.command {
        Commands::Resolve { root } => list::resolve(&service, &root),
        Commands::List {
            root,
            filter,
            full,
            json,
        } => list::run(&service, &root, Selection::new(filter), full, json),
        Commands::Extract {
            root,
            target,
            filter,
            json,
        } => extract::run(&service, &root, &target, Selection::new(filter), json),
        Commands::Manifest { root, target } => list::export(&service, &root, &target),
        Commands::Classpath { filter } => classpath::run(&service, filter.as_deref().unwrap_or("")),
    }
}
