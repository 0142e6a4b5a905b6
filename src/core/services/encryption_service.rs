use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::core::errors::{Result, SyncError};
use crate::core::models::file_descriptor::{EncryptedArtifact, encrypted_name};
use crate::core::services::atomic_write::write_atomic;
use crate::core::traits::cipher::CipherBackend;

/// File-level encryption on top of a `CipherBackend`.
///
/// The backend arrives already unlocked, so holding an
/// `EncryptionService` means the run's key pair is usable.
pub struct EncryptionService<C: CipherBackend> {
    cipher: C,
}

impl<C: CipherBackend> EncryptionService<C> {
    pub fn new(cipher: C) -> Self {
        Self { cipher }
    }

    pub fn cipher_name(&self) -> &str {
        self.cipher.name()
    }

    /// Encrypt `<directory>/<name>` into the sibling `<name>.pgp`.
    ///
    /// The source is only read. An existing file at the artifact path is
    /// never overwritten, and a partially written artifact is removed
    /// before the error is returned.
    pub fn encrypt_file(&self, directory: &Path, name: &str) -> Result<EncryptedArtifact> {
        let source = directory.join(name);
        info!("Encrypting {}...", source.display());

        let failed = |reason: String| SyncError::EncryptionFailed {
            path: source.clone(),
            reason,
        };

        let plaintext =
            std::fs::read(&source).map_err(|e| failed(format!("cannot read file: {e}")))?;
        let ciphertext = self
            .cipher
            .encrypt(&plaintext)
            .map_err(|e| failed(e.to_string()))?;

        let artifact_path = directory.join(encrypted_name(name));
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&artifact_path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => failed(format!(
                    "{} already exists; move it away before syncing",
                    artifact_path.display()
                )),
                _ => failed(format!("cannot create {}: {e}", artifact_path.display())),
            })?;
        // From here on the artifact is deleted on every exit path unless handed out.
        let temp = tempfile::TempPath::try_from_path(&artifact_path).map_err(|e| {
            let _ = std::fs::remove_file(&artifact_path);
            failed(format!("cannot track {}: {e}", artifact_path.display()))
        })?;

        file.write_all(&ciphertext)
            .and_then(|()| file.sync_all())
            .map_err(|e| failed(format!("cannot write {}: {e}", artifact_path.display())))?;

        info!("Successfully encrypted {}", source.display());
        Ok(EncryptedArtifact::new(name, temp))
    }

    /// Decrypt and verify `ciphertext`, then write the plaintext to
    /// `destination`. Nothing is written unless decryption succeeded.
    pub fn decrypt_and_save_file(&self, ciphertext: &[u8], destination: &Path) -> Result<()> {
        let plaintext =
            self.cipher
                .decrypt(ciphertext)
                .map_err(|e| SyncError::DecryptionFailed {
                    reason: format!("{}: {e}", destination.display()),
                })?;

        write_atomic(destination, &plaintext).map_err(|e| SyncError::WriteFailed {
            path: destination.to_path_buf(),
            reason: e.to_string(),
        })?;

        info!("Finished decrypting and saving {}", destination.display());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Deterministic stand-in for a real cipher: tags and reverses bytes.
    pub(crate) struct MirrorCipher;

    const TAG: &[u8] = b"MIRROR:";

    impl CipherBackend for MirrorCipher {
        fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
            let mut out = TAG.to_vec();
            out.extend(plaintext.iter().rev());
            Ok(out)
        }

        fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
            let body = ciphertext
                .strip_prefix(TAG)
                .ok_or_else(|| SyncError::Cipher {
                    reason: "signature verification failed".into(),
                })?;
            Ok(body.iter().rev().copied().collect())
        }

        fn name(&self) -> &str {
            "mirror"
        }
    }

    struct BrokenCipher;

    impl CipherBackend for BrokenCipher {
        fn encrypt(&self, _plaintext: &[u8]) -> Result<Vec<u8>> {
            Err(SyncError::Cipher {
                reason: "engine failure".into(),
            })
        }

        fn decrypt(&self, _ciphertext: &[u8]) -> Result<Vec<u8>> {
            Err(SyncError::Cipher {
                reason: "engine failure".into(),
            })
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[test]
    fn encrypt_writes_sibling_artifact_and_keeps_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"abc").unwrap();

        let service = EncryptionService::new(MirrorCipher);
        let artifact = service.encrypt_file(dir.path(), "notes.txt").unwrap();

        assert_eq!(artifact.encrypted_name, "notes.txt.pgp");
        assert_eq!(artifact.path(), dir.path().join("notes.txt.pgp"));
        assert_eq!(std::fs::read(artifact.path()).unwrap(), b"MIRROR:cba");
        assert_eq!(std::fs::read(dir.path().join("notes.txt")).unwrap(), b"abc");

        artifact.discard();
        assert!(!dir.path().join("notes.txt.pgp").exists());
    }

    #[test]
    fn dropped_artifact_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.bin"), b"\x00\x01").unwrap();

        let service = EncryptionService::new(MirrorCipher);
        drop(service.encrypt_file(dir.path(), "a.bin").unwrap());

        assert!(!dir.path().join("a.bin.pgp").exists());
    }

    #[test]
    fn existing_artifact_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"data").unwrap();
        std::fs::write(dir.path().join("a.txt.pgp"), b"user file").unwrap();

        let service = EncryptionService::new(MirrorCipher);
        let err = service.encrypt_file(dir.path(), "a.txt").unwrap_err();

        assert!(matches!(err, SyncError::EncryptionFailed { .. }));
        assert_eq!(
            std::fs::read(dir.path().join("a.txt.pgp")).unwrap(),
            b"user file"
        );
    }

    #[test]
    fn cipher_failure_leaves_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"data").unwrap();

        let service = EncryptionService::new(BrokenCipher);
        let err = service.encrypt_file(dir.path(), "a.txt").unwrap_err();

        assert!(matches!(err, SyncError::EncryptionFailed { .. }));
        assert!(!dir.path().join("a.txt.pgp").exists());
        assert_eq!(std::fs::read(dir.path().join("a.txt")).unwrap(), b"data");
    }

    #[test]
    fn missing_source_is_an_encryption_error() {
        let dir = tempfile::tempdir().unwrap();
        let service = EncryptionService::new(MirrorCipher);

        let err = service.encrypt_file(dir.path(), "ghost.txt").unwrap_err();
        assert!(matches!(err, SyncError::EncryptionFailed { .. }));
    }

    #[test]
    fn decrypt_and_save_writes_plaintext() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested").join("out.txt");

        let service = EncryptionService::new(MirrorCipher);
        service.decrypt_and_save_file(b"MIRROR:olleh", &dest).unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"hello");
    }

    #[test]
    fn failed_decryption_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.txt");

        let service = EncryptionService::new(MirrorCipher);
        let err = service.decrypt_and_save_file(b"garbage", &dest).unwrap_err();

        assert!(matches!(err, SyncError::DecryptionFailed { .. }));
        assert!(!dest.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
