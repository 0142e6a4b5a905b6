use std::path::PathBuf;

/// Sync direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Upload,
    Download,
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncMode::Upload => write!(f, "upload"),
            SyncMode::Download => write!(f, "download"),
        }
    }
}

/// Run arguments as given on the command line, before validation.
#[derive(Debug, Clone, Default)]
pub struct RunArguments {
    pub mode: Option<String>,
    pub encrypt: Option<String>,
    pub bucket: Option<String>,
    pub folder: Option<String>,
    pub filter: Vec<String>,
    pub exclude: Vec<String>,
    pub dot_files: Option<String>,
    pub follow_symlinks: Option<String>,
}

/// Which local files take part in an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSelection {
    pub filter: Vec<String>,
    pub exclude: Vec<String>,
    pub dot_files: bool,
    pub follow_symlinks: bool,
}

impl Default for FileSelection {
    fn default() -> Self {
        Self {
            filter: vec!["*".to_string()],
            exclude: Vec::new(),
            dot_files: true,
            follow_symlinks: true,
        }
    }
}

/// A validated run: every required argument present and defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub mode: SyncMode,
    pub encrypt: bool,
    pub bucket: String,
    pub folder: PathBuf,
    pub selection: FileSelection,
}

/// Connection settings handed to the object store adapter.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: secrecy::SecretString,
}
