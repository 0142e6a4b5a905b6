use secrecy::SecretString;

/// The key material configured for a run.
///
/// Both keys are kept in their stored single-line form; they are only
/// turned back into armored blocks when the cipher backend unlocks them.
#[derive(Debug, Clone)]
pub struct StoredKeySet {
    pub private_key_line: String,
    pub public_key_line: String,
    pub passphrase: SecretString,
}
