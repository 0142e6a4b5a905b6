use std::path::Path;

use crate::core::errors::Result;
use crate::core::models::file_descriptor::FileDescriptor;
use crate::core::models::run_settings::FileSelection;

/// Port for enumerating local files under a sync root.
pub trait FileLister {
    /// Return every file (never a directory) under `root` that the
    /// selection admits, in a stable order.
    fn list(&self, root: &Path, selection: &FileSelection) -> Result<Vec<FileDescriptor>>;
}
