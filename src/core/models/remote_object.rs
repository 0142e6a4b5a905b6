use super::file_descriptor::ENCRYPTED_SUFFIX;

/// An object in the bucket, identified by its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    pub key: String,
}

impl RemoteObject {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// True when the key carries the `.pgp` suffix.
    pub fn is_encrypted(&self) -> bool {
        self.key.ends_with(ENCRYPTED_SUFFIX)
    }

    /// Key with the `.pgp` suffix removed, if it had one.
    pub fn plain_key(&self) -> &str {
        self.key.strip_suffix(ENCRYPTED_SUFFIX).unwrap_or(&self.key)
    }

    /// Folder placeholders created by some S3 consoles.
    pub fn is_folder_marker(&self) -> bool {
        self.key.ends_with('/')
    }
}

/// Result of a single list call against the bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectListing {
    pub objects: Vec<RemoteObject>,
    /// The store holds more objects than were returned.
    pub truncated: bool,
}
