use std::path::{Path, PathBuf};

/// A local file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Directory containing the file.
    pub directory: PathBuf,
    /// File name without any directory component.
    pub name: String,
    /// Path relative to the sync root with `/` separators, used as the object key.
    pub key: String,
}

impl FileDescriptor {
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.name)
    }
}

/// Suffix marking an object or artifact as OpenPGP-encrypted.
pub const ENCRYPTED_SUFFIX: &str = ".pgp";

/// Returns the artifact name for an encrypted copy of `name`.
pub fn encrypted_name(name: &str) -> String {
    format!("{name}{ENCRYPTED_SUFFIX}")
}

/// An encrypted copy of a source file, written next to it for the
/// duration of a single upload.
///
/// The file is removed when the artifact is dropped; call
/// [`EncryptedArtifact::discard`] to remove it explicitly and log failures.
#[derive(Debug)]
pub struct EncryptedArtifact {
    pub encrypted_name: String,
    temp: tempfile::TempPath,
}

impl EncryptedArtifact {
    pub(crate) fn new(name: &str, temp: tempfile::TempPath) -> Self {
        Self {
            encrypted_name: encrypted_name(name),
            temp,
        }
    }

    pub fn path(&self) -> &Path {
        &self.temp
    }

    /// Delete the artifact. Failures are logged, never returned.
    pub fn discard(self) {
        let path = self.temp.to_path_buf();
        match self.temp.close() {
            Ok(()) => tracing::debug!("Removed temporary file {}", path.display()),
            Err(e) => tracing::error!(
                "Error while deleting temporary encrypted file {}: {e}",
                path.display()
            ),
        }
    }
}
