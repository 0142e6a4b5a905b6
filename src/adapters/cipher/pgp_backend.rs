use std::io::Cursor;

use pgp::crypto::hash::HashAlgorithm;
use pgp::crypto::sym::SymmetricKeyAlgorithm;
use pgp::ser::Serialize;
use pgp::types::{CompressionAlgorithm, PublicKeyTrait, SecretKeyTrait};
use pgp::{
    Deserializable, KeyType, Message, SecretKeyParamsBuilder, SignedPublicKey, SignedSecretKey,
    SubkeyParamsBuilder,
};
use secrecy::{ExposeSecret, SecretString};
use smallvec::smallvec;
use tracing::info;

use crate::core::errors::{Result, SyncError};
use crate::core::models::key_set::StoredKeySet;
use crate::core::services::pem_format::{ArmorType, wrap_key};
use crate::core::traits::cipher::CipherBackend;

const ARMORED_MESSAGE_HEADER: &[u8] = b"-----BEGIN PGP MESSAGE-----";

/// OpenPGP backend holding one key pair for the whole run.
///
/// Messages are signed with the private key and encrypted to the
/// public key's encryption subkey (or the primary key when it has none).
/// Decryption requires a valid signature from the same key pair.
pub struct PgpBackend {
    secret_key: SignedSecretKey,
    public_key: SignedPublicKey,
    passphrase: SecretString,
}

impl PgpBackend {
    /// Rebuild both armored keys from their stored lines, parse them and
    /// prove that the passphrase unlocks the private key.
    pub fn unlock(keys: &StoredKeySet) -> Result<Self> {
        info!("Unlocking PGP keys...");

        let private_armored = wrap_key(ArmorType::PGP_PRIVATE_KEY, &keys.private_key_line)?;
        let public_armored = wrap_key(ArmorType::PGP_PUBLIC_KEY, &keys.public_key_line)?;

        let (secret_key, _headers) = SignedSecretKey::from_string(&private_armored)
            .map_err(|e| key_unlock(format!("cannot read private key: {e}")))?;
        secret_key
            .verify()
            .map_err(|e| key_unlock(format!("private key self-signature is invalid: {e}")))?;

        let passphrase = keys.passphrase.clone();
        secret_key
            .unlock(|| passphrase.expose_secret().to_string(), |_| Ok(()))
            .map_err(|e| key_unlock(format!("passphrase does not unlock the private key: {e}")))?;
        info!("PGP private key unlocked");

        let (public_key, _headers) = SignedPublicKey::from_string(&public_armored)
            .map_err(|e| key_unlock(format!("cannot read public key: {e}")))?;
        public_key
            .verify()
            .map_err(|e| key_unlock(format!("public key self-signature is invalid: {e}")))?;
        info!("PGP public key loaded");

        Ok(Self {
            secret_key,
            public_key,
            passphrase,
        })
    }

    fn password(&self) -> impl FnOnce() -> String + Clone + '_ {
        || self.passphrase.expose_secret().to_string()
    }

    /// Accept the primary key or any subkey as the signer.
    fn verify_signature(&self, message: &Message) -> Result<()> {
        if message.verify(&self.public_key).is_ok() {
            return Ok(());
        }
        if self
            .public_key
            .public_subkeys
            .iter()
            .any(|subkey| message.verify(subkey).is_ok())
        {
            return Ok(());
        }
        Err(cipher("signature verification failed"))
    }
}

impl CipherBackend for PgpBackend {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut rng = rand::thread_rng();

        let signed = Message::new_literal_bytes("", plaintext)
            .sign(
                &mut rng,
                &self.secret_key,
                self.password(),
                HashAlgorithm::SHA2_256,
            )
            .map_err(|e| cipher(format!("signing failed: {e}")))?;

        let encryption_subkey = self
            .public_key
            .public_subkeys
            .iter()
            .find(|subkey| subkey.is_encryption_key());
        let encrypted = match encryption_subkey {
            Some(subkey) => {
                signed.encrypt_to_keys_seipdv1(&mut rng, SymmetricKeyAlgorithm::AES256, &[subkey])
            }
            None => signed.encrypt_to_keys_seipdv1(
                &mut rng,
                SymmetricKeyAlgorithm::AES256,
                &[&self.public_key],
            ),
        }
        .map_err(|e| cipher(format!("encryption failed: {e}")))?;

        encrypted
            .to_bytes()
            .map_err(|e| cipher(format!("cannot serialize message: {e}")))
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let message = read_message(ciphertext)?;

        let (decrypted, _key_ids) = message
            .decrypt(self.password(), &[&self.secret_key])
            .map_err(|e| cipher(format!("cannot decrypt message: {e}")))?;
        let decrypted = match decrypted {
            Message::Compressed(_) => decrypted
                .decompress()
                .map_err(|e| cipher(format!("cannot decompress message: {e}")))?,
            other => other,
        };

        self.verify_signature(&decrypted)?;

        decrypted
            .get_content()
            .map_err(|e| cipher(format!("cannot read message content: {e}")))?
            .ok_or_else(|| cipher("message has no literal data"))
    }

    fn name(&self) -> &str {
        "pgp"
    }
}

/// Parse a binary or ASCII-armored OpenPGP message.
fn read_message(ciphertext: &[u8]) -> Result<Message> {
    let parsed = if ciphertext
        .trim_ascii_start()
        .starts_with(ARMORED_MESSAGE_HEADER)
    {
        Message::from_armor_single(Cursor::new(ciphertext)).map(|(message, _headers)| message)
    } else {
        Message::from_bytes(Cursor::new(ciphertext))
    };
    parsed.map_err(|e| cipher(format!("malformed OpenPGP message: {e}")))
}

/// A freshly generated key pair in armored form.
#[derive(Debug, Clone)]
pub struct GeneratedKeyPair {
    pub private_key_armored: String,
    pub public_key_armored: String,
}

/// Generate an RSA key pair: a primary key for certifying and signing,
/// plus an encryption subkey. Both are protected by `passphrase`.
pub fn generate_key_pair(user_id: &str, passphrase: &str, bits: u32) -> Result<GeneratedKeyPair> {
    let keygen = |e: &dyn std::fmt::Display| cipher(format!("key generation failed: {e}"));
    let mut rng = rand::thread_rng();

    let mut subkey_params = SubkeyParamsBuilder::default();
    subkey_params
        .key_type(KeyType::Rsa(bits))
        .can_encrypt(true)
        .passphrase(Some(passphrase.to_string()));
    let subkey = subkey_params.build().map_err(|e| keygen(&e))?;

    let mut key_params = SecretKeyParamsBuilder::default();
    key_params
        .key_type(KeyType::Rsa(bits))
        .can_certify(true)
        .can_sign(true)
        .primary_user_id(user_id.to_string())
        .passphrase(Some(passphrase.to_string()))
        .preferred_symmetric_algorithms(smallvec![
            SymmetricKeyAlgorithm::AES256,
            SymmetricKeyAlgorithm::AES128,
        ])
        .preferred_hash_algorithms(smallvec![HashAlgorithm::SHA2_256, HashAlgorithm::SHA2_512])
        .preferred_compression_algorithms(smallvec![CompressionAlgorithm::ZLIB])
        .subkey(subkey);
    let secret_key_params = key_params.build().map_err(|e| keygen(&e))?;

    let password = || passphrase.to_string();
    let secret_key = secret_key_params
        .generate(&mut rng)
        .map_err(|e| keygen(&e))?;
    let signed_secret_key = secret_key
        .sign(&mut rng, password)
        .map_err(|e| keygen(&e))?;
    let signed_public_key = signed_secret_key
        .public_key()
        .sign(&mut rng, &signed_secret_key, password)
        .map_err(|e| keygen(&e))?;

    Ok(GeneratedKeyPair {
        private_key_armored: signed_secret_key
            .to_armored_string(None.into())
            .map_err(|e| keygen(&e))?,
        public_key_armored: signed_public_key
            .to_armored_string(None.into())
            .map_err(|e| keygen(&e))?,
    })
}

fn key_unlock(reason: String) -> SyncError {
    SyncError::KeyUnlock { reason }
}

fn cipher(reason: impl Into<String>) -> SyncError {
    SyncError::Cipher {
        reason: reason.into(),
    }
}
