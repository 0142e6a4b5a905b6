use std::path::PathBuf;

use secrecy::SecretString;

use crate::config::app_config::SyncConfig;
use crate::core::errors::{Result, SyncError};
use crate::core::models::key_set::StoredKeySet;
use crate::core::models::run_settings::{
    FileSelection, RunArguments, RunPlan, StoreSettings, SyncMode,
};

/// Everything a sync run needs, checked before any transfer starts.
#[derive(Debug, Clone)]
pub struct ValidatedRun {
    pub plan: RunPlan,
    pub keys: StoredKeySet,
    pub store: StoreSettings,
}

/// Check every required config field and run argument, apply defaults,
/// and report all missing values at once.
pub fn validate_inputs(config: &SyncConfig, args: &RunArguments) -> Result<ValidatedRun> {
    let mut config_fields = Vec::new();
    let mut arg_fields = Vec::new();

    let mut require_config = |name: &'static str, value: &Option<String>| {
        let found = present(value);
        if found.is_none() {
            config_fields.push(name);
        }
        found.unwrap_or_default()
    };
    let secret_key = require_config("bucketSecretKey", &config.bucket_secret_key);
    let access_key = require_config("bucketAccessKey", &config.bucket_access_key);
    let endpoint = require_config("bucketEndpoint", &config.bucket_endpoint);
    let region = require_config("bucketRegion", &config.bucket_region);
    let passphrase = require_config("pgpPassphrase", &config.pgp_passphrase);
    let private_key = require_config("pgpPrivateKeyArmored", &config.pgp_private_key_armored);
    let public_key = require_config("pgpPublicKeyArmored", &config.pgp_public_key_armored);

    let mut require_arg = |name: &'static str, value: &Option<String>| {
        let found = present(value);
        if found.is_none() {
            arg_fields.push(name);
        }
        found.unwrap_or_default()
    };
    let mode = require_arg("mode", &args.mode);
    let encrypt = require_arg("encrypt", &args.encrypt);
    let bucket = require_arg("bucket", &args.bucket);
    let folder = require_arg("folder", &args.folder);

    if !config_fields.is_empty() || !arg_fields.is_empty() {
        return Err(SyncError::MissingInputs {
            config_fields,
            arg_fields,
        });
    }

    let mode = match mode.as_str() {
        "upload" => SyncMode::Upload,
        "download" => SyncMode::Download,
        other => {
            return Err(SyncError::InvalidArgument {
                detail: format!(
                    "--mode must be either \"upload\" or \"download\", got \"{other}\""
                ),
            });
        }
    };

    let defaults = FileSelection::default();
    let selection = FileSelection {
        filter: non_empty_or(&args.filter, defaults.filter),
        exclude: non_empty_or(&args.exclude, defaults.exclude),
        dot_files: yes_flag(&args.dot_files, defaults.dot_files),
        follow_symlinks: yes_flag(&args.follow_symlinks, defaults.follow_symlinks),
    };

    Ok(ValidatedRun {
        plan: RunPlan {
            mode,
            encrypt: encrypt == "yes",
            bucket,
            folder: PathBuf::from(clean_folder_path(&folder)),
            selection,
        },
        keys: StoredKeySet {
            private_key_line: private_key,
            public_key_line: public_key,
            passphrase: SecretString::from(passphrase),
        },
        store: StoreSettings {
            endpoint,
            region,
            access_key,
            secret_key: SecretString::from(secret_key),
        },
    })
}

/// Remove trailing path separators, keeping a bare root intact.
pub fn clean_folder_path(path: &str) -> String {
    let trimmed = path.trim_end_matches(std::path::is_separator);
    if trimmed.is_empty() && !path.is_empty() {
        // "/" stays the root rather than becoming the current directory.
        return path[..1].to_string();
    }
    trimmed.to_string()
}

/// Empty or whitespace-only values count as missing. Present values are
/// kept verbatim: passphrases may legitimately start or end with spaces.
fn present(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

/// Unset keeps the default; any value other than "yes" disables.
fn yes_flag(value: &Option<String>, default: bool) -> bool {
    match present(value) {
        Some(v) => v == "yes",
        None => default,
    }
}

fn non_empty_or(values: &[String], default: Vec<String>) -> Vec<String> {
    let values: Vec<String> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    if values.is_empty() { default } else { values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn full_config() -> SyncConfig {
        SyncConfig {
            bucket_secret_key: Some("secret".into()),
            bucket_access_key: Some("access".into()),
            bucket_endpoint: Some("s3.example.com".into()),
            bucket_region: Some("US".into()),
            pgp_passphrase: Some("correct horse".into()),
            pgp_private_key_armored: Some("priv".into()),
            pgp_public_key_armored: Some("pub".into()),
        }
    }

    fn full_args() -> RunArguments {
        RunArguments {
            mode: Some("upload".into()),
            encrypt: Some("yes".into()),
            bucket: Some("configs".into()),
            folder: Some("/data/sync/".into()),
            ..Default::default()
        }
    }

    #[test]
    fn applies_defaults() {
        let run = validate_inputs(&full_config(), &full_args()).unwrap();

        assert_eq!(run.plan.mode, SyncMode::Upload);
        assert!(run.plan.encrypt);
        assert_eq!(run.plan.bucket, "configs");
        assert_eq!(run.plan.folder, PathBuf::from("/data/sync"));
        assert_eq!(run.plan.selection, FileSelection::default());
        assert_eq!(run.keys.passphrase.expose_secret(), "correct horse");
        assert_eq!(run.store.secret_key.expose_secret(), "secret");
    }

    #[test]
    fn reports_every_missing_field() {
        let mut config = full_config();
        config.bucket_region = None;
        config.pgp_passphrase = Some("   ".into());
        let args = RunArguments {
            mode: Some("download".into()),
            ..Default::default()
        };

        match validate_inputs(&config, &args).unwrap_err() {
            SyncError::MissingInputs {
                config_fields,
                arg_fields,
            } => {
                assert_eq!(config_fields, vec!["bucketRegion", "pgpPassphrase"]);
                assert_eq!(arg_fields, vec!["encrypt", "bucket", "folder"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_unknown_mode() {
        let mut args = full_args();
        args.mode = Some("mirror".into());

        let err = validate_inputs(&full_config(), &args).unwrap_err();
        assert!(matches!(err, SyncError::InvalidArgument { .. }));
    }

    #[test]
    fn only_yes_enables_flags() {
        let mut args = full_args();
        args.encrypt = Some("true".into());
        args.dot_files = Some("no".into());
        args.follow_symlinks = Some("YES".into());

        let run = validate_inputs(&full_config(), &args).unwrap();
        assert!(!run.plan.encrypt);
        assert!(!run.plan.selection.dot_files);
        assert!(!run.plan.selection.follow_symlinks);
    }

    #[test]
    fn keeps_explicit_filters() {
        let mut args = full_args();
        args.filter = vec!["*.txt".into(), " ".into()];
        args.exclude = vec!["c.txt".into()];

        let run = validate_inputs(&full_config(), &args).unwrap();
        assert_eq!(run.plan.selection.filter, vec!["*.txt"]);
        assert_eq!(run.plan.selection.exclude, vec!["c.txt"]);
    }

    #[test]
    fn clean_folder_path_strips_trailing_separator() {
        assert_eq!(clean_folder_path("/data/sync/"), "/data/sync");
        assert_eq!(clean_folder_path("/data/sync"), "/data/sync");
        assert_eq!(clean_folder_path("relative/dir/"), "relative/dir");
    }

    #[test]
    fn clean_folder_path_is_idempotent() {
        for input in ["/data/sync//", "/", "a/", "a"] {
            let once = clean_folder_path(input);
            assert_eq!(clean_folder_path(&once), once);
        }
        assert_eq!(clean_folder_path("/"), "/");
    }
}
