use crate::core::errors::Result;

/// Port for encryption/decryption backends.
///
/// A backend owns one key pair for the whole run: everything it encrypts
/// is addressed to its own public key and signed with its own private
/// key, so the same backend can later decrypt and verify it.
pub trait CipherBackend: Send + Sync {
    /// Encrypt and sign plaintext.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt ciphertext and verify its signature.
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;

    /// Human-readable name of this backend (e.g. "pgp").
    fn name(&self) -> &str;
}
