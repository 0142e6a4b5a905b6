use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use regex::Regex;
use secrecy::SecretString;

use crate::adapters::cipher::pgp_backend::{PgpBackend, generate_key_pair};
use crate::cli::KeysAction;
use crate::cli::output;
use crate::config::app_config::SyncConfig;
use crate::core::errors::{Result, SyncError};
use crate::core::models::key_set::StoredKeySet;
use crate::core::services::pem_format::{ArmorType, unwrap_key, wrap_key};
use crate::core::traits::cipher::CipherBackend;

const MIN_PASSPHRASE_LEN: usize = 8;
const MIN_KEY_BITS: u32 = 2048;

/// Execute the `cryptsync keys` command.
pub fn execute(config_path: Option<&Path>, action: &KeysAction) -> Result<()> {
    match action {
        KeysAction::Generate {
            name,
            email,
            passphrase,
            bits,
            output,
        } => execute_generate(name, email, passphrase, *bits, output),
        KeysAction::Import { file } => execute_import(file),
        KeysAction::Verify => execute_verify(config_path),
    }
}

/// Generate a key pair and write a config template holding it.
fn execute_generate(
    name: &str,
    email: &str,
    passphrase: &str,
    bits: u32,
    output_path: &Path,
) -> Result<()> {
    validate_identity(name, email, passphrase, bits)?;

    if output_path.exists() {
        return Err(SyncError::InvalidArgument {
            detail: format!(
                "{} already exists; refusing to overwrite it. Choose another --output.",
                output_path.display()
            ),
        });
    }

    output::header(&format!("Generating a {bits}-bit RSA key pair for {email}"));
    let keys = generate_key_pair(&format!("{} <{}>", name.trim(), email), passphrase, bits)?;

    let template = SyncConfig {
        bucket_secret_key: Some(String::new()),
        bucket_access_key: Some(String::new()),
        bucket_endpoint: Some(String::new()),
        bucket_region: Some(String::new()),
        pgp_passphrase: Some(passphrase.to_string()),
        pgp_private_key_armored: Some(unwrap_key(&keys.private_key_armored)),
        pgp_public_key_armored: Some(unwrap_key(&keys.public_key_armored)),
    };

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(output_path)?;
    file.write_all(template.to_toml()?.as_bytes())?;
    file.sync_all()?;
    output::success(&format!("Config template written to {}", output_path.display()));

    // Read the file back so the check covers exactly what was written.
    let (written, _) = SyncConfig::load(Some(output_path))?;
    unlock_configured(&written)?;
    output::success("Keys unlock with the given passphrase");

    println!("\n  Next: fill in the bucket* options, then run:");
    println!(
        "  cryptsync --config {} sync --mode upload --encrypt yes --bucket <name> --folder <path>",
        output_path.display()
    );
    Ok(())
}

/// Print the stored single-line form of an armored key file.
fn execute_import(file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)?;
    let line = unwrap_key(content.trim());

    let armor = [ArmorType::PGP_PRIVATE_KEY, ArmorType::PGP_PUBLIC_KEY]
        .into_iter()
        .find(|armor| line.contains(armor.header))
        .ok_or_else(|| SyncError::KeyFormat {
            header: ArmorType::PGP_PUBLIC_KEY.header,
            detail: format!("{} holds no armored PGP key", file.display()),
        })?;
    wrap_key(armor, &line)?;

    println!("{line}");
    Ok(())
}

/// Unlock the configured keys and run one encrypt/decrypt round trip.
fn execute_verify(config_path: Option<&Path>) -> Result<()> {
    let (config, source) = SyncConfig::load(config_path)?;
    output::header(&format!("Verifying PGP keys from {}", source.display()));

    unlock_configured(&config)?;
    output::success("Private key unlocked and public key loaded");
    output::success("Encrypt/decrypt round trip succeeded");
    Ok(())
}

fn unlock_configured(config: &SyncConfig) -> Result<()> {
    let keys = stored_keys(config)?;
    let backend = PgpBackend::unlock(&keys)?;

    const PROBE: &[u8] = b"cryptsync key check";
    let decrypted = backend.decrypt(&backend.encrypt(PROBE)?)?;
    if decrypted != PROBE {
        return Err(SyncError::KeyUnlock {
            reason: "round trip returned different content".into(),
        });
    }
    Ok(())
}

/// The PGP part of the config, reporting every missing field at once.
fn stored_keys(config: &SyncConfig) -> Result<StoredKeySet> {
    let mut config_fields = Vec::new();
    let mut require = |name: &'static str, value: &Option<String>| {
        let found = value.clone().filter(|v| !v.trim().is_empty());
        if found.is_none() {
            config_fields.push(name);
        }
        found.unwrap_or_default()
    };
    let passphrase = require("pgpPassphrase", &config.pgp_passphrase);
    let private_key_line = require("pgpPrivateKeyArmored", &config.pgp_private_key_armored);
    let public_key_line = require("pgpPublicKeyArmored", &config.pgp_public_key_armored);

    if !config_fields.is_empty() {
        return Err(SyncError::MissingInputs {
            config_fields,
            arg_fields: Vec::new(),
        });
    }

    Ok(StoredKeySet {
        private_key_line,
        public_key_line,
        passphrase: SecretString::from(passphrase),
    })
}

fn validate_identity(name: &str, email: &str, passphrase: &str, bits: u32) -> Result<()> {
    let invalid = |detail: String| Err(SyncError::InvalidArgument { detail });

    if name.trim().is_empty() {
        return invalid("--name must not be empty".into());
    }
    let email_pattern = Regex::new(r"^[^@\s<>]+@[^@\s<>]+\.[^@\s<>]+$").map_err(|e| {
        SyncError::InvalidArgument {
            detail: e.to_string(),
        }
    })?;
    if !email_pattern.is_match(email) {
        return invalid(format!("--email '{email}' is not a valid email address"));
    }
    if passphrase.chars().count() < MIN_PASSPHRASE_LEN {
        return invalid(format!(
            "--passphrase must be at least {MIN_PASSPHRASE_LEN} characters"
        ));
    }
    if bits < MIN_KEY_BITS {
        return invalid(format!("--bits must be at least {MIN_KEY_BITS}"));
    }
    Ok(())
}
