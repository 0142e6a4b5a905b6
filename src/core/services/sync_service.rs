use std::path::{Component, Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::core::errors::{Result, SyncError};
use crate::core::models::batch_report::BatchReport;
use crate::core::models::file_descriptor::{FileDescriptor, encrypted_name};
use crate::core::models::remote_object::RemoteObject;
use crate::core::models::run_settings::{FileSelection, RunPlan, SyncMode};
use crate::core::services::atomic_write::write_atomic;
use crate::core::services::encryption_service::EncryptionService;
use crate::core::traits::cipher::CipherBackend;
use crate::core::traits::file_lister::FileLister;
use crate::core::traits::object_store::{MAX_LIST_KEYS, ObjectStore};

/// What happened to a single object during a download batch.
enum ObjectStep {
    Written,
    Skipped,
    Ignored,
}

/// Drives one upload or download batch.
///
/// Items are processed strictly one after another, in listing order.
/// The first hard error aborts the batch; transfers that already
/// completed are left in place.
///
/// Encryption is enabled exactly when an `EncryptionService` is supplied.
pub struct SyncService<S: ObjectStore, L: FileLister, C: CipherBackend> {
    store: S,
    lister: L,
    encryption: Option<EncryptionService<C>>,
}

impl<S: ObjectStore, L: FileLister, C: CipherBackend> SyncService<S, L, C> {
    pub fn new(store: S, lister: L, encryption: Option<EncryptionService<C>>) -> Self {
        Self {
            store,
            lister,
            encryption,
        }
    }

    /// Run the batch described by `plan`.
    pub async fn run(&self, plan: &RunPlan) -> Result<BatchReport> {
        match plan.mode {
            SyncMode::Upload => {
                self.run_upload(&plan.folder, &plan.bucket, &plan.selection)
                    .await
            }
            SyncMode::Download => self.run_download(&plan.folder, &plan.bucket).await,
        }
    }

    /// Upload every selected file under `folder` to `bucket`.
    pub async fn run_upload(
        &self,
        folder: &Path,
        bucket: &str,
        selection: &FileSelection,
    ) -> Result<BatchReport> {
        self.verify_access(bucket).await?;

        let files = self.lister.list(folder, selection)?;
        info!(
            "Found {} files to upload in the folder: {}",
            files.len(),
            folder.display()
        );

        let mut report = BatchReport::default();
        for file in &files {
            if let Err(e) = self.upload_file(bucket, file).await {
                error!(
                    "Upload aborted at {} after {} of {} files",
                    file.key,
                    report.transferred,
                    files.len()
                );
                return Err(e);
            }
            report.transferred += 1;
        }

        Ok(report)
    }

    /// Download every listed object of `bucket` into `folder`.
    pub async fn run_download(&self, folder: &Path, bucket: &str) -> Result<BatchReport> {
        self.verify_access(bucket).await?;

        let listing = self.store.list(bucket, MAX_LIST_KEYS).await?;
        if listing.truncated {
            warn!(
                "Bucket '{bucket}' holds more than {MAX_LIST_KEYS} objects; \
                 only the first {MAX_LIST_KEYS} are handled in this run"
            );
        }
        if listing.objects.is_empty() {
            warn!("No files available to download from bucket '{bucket}'.");
            return Ok(BatchReport::default());
        }

        let mut report = BatchReport::default();
        for object in &listing.objects {
            match self.download_object(folder, bucket, object).await {
                Ok(ObjectStep::Written) => report.transferred += 1,
                Ok(ObjectStep::Skipped) => report.skipped += 1,
                Ok(ObjectStep::Ignored) => {}
                Err(e) => {
                    error!(
                        "Download aborted at '{}' after {} of {} objects",
                        object.key,
                        report.transferred,
                        listing.objects.len()
                    );
                    return Err(e);
                }
            }
        }

        Ok(report)
    }

    async fn verify_access(&self, bucket: &str) -> Result<()> {
        self.store.check_access(bucket).await?;
        info!("Connection to bucket '{bucket}' initialised.");
        Ok(())
    }

    /// Upload one file, encrypting it first when enabled.
    ///
    /// The temporary artifact is removed before returning, whatever the
    /// outcome of the transfer.
    async fn upload_file(&self, bucket: &str, file: &FileDescriptor) -> Result<()> {
        let artifact = match &self.encryption {
            Some(encryption) => Some(encryption.encrypt_file(&file.directory, &file.name)?),
            None => None,
        };

        let (path, key) = match &artifact {
            Some(a) => (a.path().to_path_buf(), encrypted_name(&file.key)),
            None => (file.path(), file.key.clone()),
        };

        let result = self.put_file(bucket, &key, &path).await;
        if let Some(artifact) = artifact {
            artifact.discard();
        }
        result?;

        info!("Successfully uploaded {} as '{key}'", file.path().display());
        Ok(())
    }

    async fn put_file(&self, bucket: &str, key: &str, path: &Path) -> Result<()> {
        info!("Uploading {} to bucket '{bucket}'...", path.display());
        self.store.put(bucket, key, path).await
    }

    async fn download_object(
        &self,
        folder: &Path,
        bucket: &str,
        object: &RemoteObject,
    ) -> Result<ObjectStep> {
        if object.is_folder_marker() {
            debug!("Ignoring folder marker '{}'", object.key);
            return Ok(ObjectStep::Ignored);
        }

        if object.is_encrypted() {
            let Some(encryption) = &self.encryption else {
                warn!(
                    "File {} is encrypted with pgp but --encrypt yes was not specified. \
                     Not downloading file.",
                    object.key
                );
                return Ok(ObjectStep::Skipped);
            };

            let destination = resolve_destination(folder, object.plain_key(), &object.key)?;
            let body = self.store.get(bucket, &object.key).await?;
            info!("Decrypting '{}' to {}", object.key, destination.display());
            encryption.decrypt_and_save_file(&body, &destination)?;
        } else {
            let destination = resolve_destination(folder, &object.key, &object.key)?;
            let body = self.store.get(bucket, &object.key).await?;
            info!(
                "Downloading unencrypted file: {} to {}",
                object.key,
                destination.display()
            );
            write_atomic(&destination, &body).map_err(|e| SyncError::WriteFailed {
                path: destination.clone(),
                reason: e.to_string(),
            })?;
        }

        info!("Downloaded file: {} successfully.", object.key);
        Ok(ObjectStep::Written)
    }
}

/// Map an object key onto a path under `folder`.
///
/// Every `/`-separated segment must be a plain file name. Absolute keys
/// and keys that would climb out of `folder` are rejected.
fn resolve_destination(folder: &Path, relative: &str, key: &str) -> Result<PathBuf> {
    let unsafe_key = || SyncError::UnsafeObjectKey {
        key: key.to_string(),
    };

    if relative.starts_with('/') || relative.starts_with('\\') {
        return Err(unsafe_key());
    }

    let mut destination = folder.to_path_buf();
    let mut segments = 0;
    for segment in relative.split('/').filter(|s| !s.is_empty() && *s != ".") {
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => destination.push(name),
            _ => return Err(unsafe_key()),
        }
        segments += 1;
    }

    if segments == 0 {
        return Err(unsafe_key());
    }
    Ok(destination)
}
