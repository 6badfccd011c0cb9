use crate::manifest::MANIFEST_FILE;
use std::path::PathBuf;
use std::str::FromStr;

/// Default bound for directory recursion.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// How an archive is picked when several classpath entries match a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// First match in classpath order.
    #[default]
    FirstMatch,
    /// An entry whose file name equals the artefact (with or without an
    /// archive suffix) wins over substring matches.
    ExactFirst,
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "first-match" => Ok(MatchPolicy::FirstMatch),
            "exact" | "exact-first" => Ok(MatchPolicy::ExactFirst),
            other => Err(format!("unknown match policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResourceConfig {
    /// Base for relative logical roots.
    pub work_dir: PathBuf,
    /// Overrides the host's application-data directory.
    pub app_data_dir: Option<PathBuf>,
    /// Directory or archive the application itself runs from.
    pub reference: Option<PathBuf>,
    pub manifest_name: String,
    pub max_depth: usize,
    /// Lower-case suffixes identifying archives.
    pub archive_suffixes: Vec<String>,
    pub match_policy: MatchPolicy,
    /// Write the extracted manifest into the target directory.
    pub persist_manifest: bool,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            work_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            app_data_dir: None,
            reference: None,
            manifest_name: MANIFEST_FILE.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            archive_suffixes: vec![".jar".to_string(), ".zip".to_string()],
            match_policy: MatchPolicy::default(),
            persist_manifest: true,
        }
    }
}

impl ResourceConfig {
    /// Defaults overridden by `SXRES_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var("SXRES_WORK_DIR") {
            config.work_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("SXRES_APPDATA") {
            config.app_data_dir = Some(PathBuf::from(dir));
        }
        if let Ok(reference) = std::env::var("SXRES_REFERENCE") {
            config.reference = Some(PathBuf::from(reference));
        }
        if let Some(depth) = std::env::var("SXRES_MAX_DEPTH")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.max_depth = depth;
        }
        match std::env::var("SXRES_MATCH_POLICY").map(|v| v.parse::<MatchPolicy>()) {
            Ok(Ok(policy)) => config.match_policy = policy,
            Ok(Err(e)) => tracing::warn!("Ignoring SXRES_MATCH_POLICY: {}", e),
            Err(_) => {}
        }
        config
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn with_reference(mut self, reference: impl Into<PathBuf>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_match_policy(mut self, policy: MatchPolicy) -> Self {
        self.match_policy = policy;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn is_archive_name(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        self.archive_suffixes.iter().any(|s| lower.ends_with(s.as_str()))
    }
}
