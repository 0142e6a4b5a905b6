use std::path::PathBuf;

/// All domain errors for cryptsync.
///
/// Each variant provides enough context to diagnose the issue
/// without needing a debugger.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("{}", describe_missing(.config_fields, .arg_fields))]
    MissingInputs {
        config_fields: Vec<&'static str>,
        arg_fields: Vec<&'static str>,
    },

    #[error("Invalid argument: {detail}")]
    InvalidArgument { detail: String },

    #[error(
        "No config file found\n\n  \
         cryptsync searched for:\n    \
         {searched}\n\n  \
         Solutions:\n    \
         → Create ./cryptsync.toml with the bucket and PGP options\n    \
         → Generate keys and a template: cryptsync keys generate --help\n    \
         → Point to a file explicitly: cryptsync --config <path>"
    )]
    ConfigNotFound { searched: String },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(
        "Malformed stored key: {detail}\n\n  \
         The key must hold one '{header}' marker followed by its footer.\n  \
         Convert an armored key file with: cryptsync keys import <file>"
    )]
    KeyFormat { header: &'static str, detail: String },

    #[error(
        "Could not unlock PGP keys: {reason}\n\n  \
         Check pgpPassphrase, pgpPrivateKeyArmored and pgpPublicKeyArmored.\n  \
         Test your configuration with: cryptsync keys verify"
    )]
    KeyUnlock { reason: String },

    #[error(
        "Object storage bucket '{bucket}' is not accessible: {reason}\n\n  \
         Check bucketEndpoint, bucketRegion and the access/secret keys."
    )]
    BucketAccess { bucket: String, reason: String },

    #[error("Encryption failed for {}: {reason}", .path.display())]
    EncryptionFailed { path: PathBuf, reason: String },

    #[error("Decryption failed: {reason}")]
    DecryptionFailed { reason: String },

    #[error("{reason}")]
    Cipher { reason: String },

    #[error("Could not write {}: {reason}", .path.display())]
    WriteFailed { path: PathBuf, reason: String },

    #[error("Transfer of '{key}' failed: {reason}")]
    TransferFailed { key: String, reason: String },

    #[error("Could not list objects in bucket '{bucket}': {reason}")]
    BucketListing { bucket: String, reason: String },

    #[error("Could not list files under {}: {reason}", .path.display())]
    ListingFailed { path: PathBuf, reason: String },

    #[error("Refusing to write object '{key}' outside the destination folder")]
    UnsafeObjectKey { key: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SyncError>;

const CONFIG_GUIDE: &str = "\
The config file should have the following options:
    bucketSecretKey = \"...\"       (Required) Secret key or password for your object storage account.
    bucketAccessKey = \"...\"       (Required) Access key for your object storage account.
    bucketEndpoint = \"...\"        (Required) Host name of your object storage. Do not add the https:// prefix.
    bucketRegion = \"...\"          (Required) Region code of your object storage account, e.g. \"US\".
    pgpPassphrase = \"...\"         (Required) Passphrase protecting the PGP private key.
    pgpPrivateKeyArmored = \"...\"  (Required) Single-line PGP private key (see: cryptsync keys import).
    pgpPublicKeyArmored = \"...\"   (Required) Single-line PGP public key.";

const ARGUMENT_GUIDE: &str = "\
You can provide the following arguments:
    --mode <upload|download>   (Required) Sync direction. upload sends the folder to the bucket, download does the opposite.
    --encrypt <yes|no>         (Required) Enables or disables PGP file encryption.
    --bucket <name>            (Required) Bucket to upload to or download from.
    --folder <path>            (Required) Local folder to upload from or download to.
    --filter <glob>            (Optional, repeatable) Only upload matching files. Default: *
    --exclude <glob>           (Optional, repeatable) Never upload matching files.
    --dot-files <yes|no>       (Optional) Include hidden files. Default: yes
    --follow-symlinks <yes|no> (Optional) Follow symbolic links. Default: yes
Example: cryptsync sync --mode upload --encrypt yes --bucket nginx-configs --folder /etc/nginx";

fn describe_missing(config_fields: &[&'static str], arg_fields: &[&'static str]) -> String {
    let mut out = String::from("Missing required inputs\n");
    for field in config_fields {
        out.push_str(&format!("\n  ✗ Config file is missing the {field} option."));
    }
    for field in arg_fields {
        out.push_str(&format!("\n  ✗ Missing the --{field} argument."));
    }
    if !config_fields.is_empty() {
        out.push_str("\n\n");
        out.push_str(CONFIG_GUIDE);
    }
    if !arg_fields.is_empty() {
        out.push_str("\n\n");
        out.push_str(ARGUMENT_GUIDE);
    }
    out
}
