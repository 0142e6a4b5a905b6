pub mod commands;
pub mod logging;
pub mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::core::models::run_settings::RunArguments;

/// Sync a local folder with an S3-compatible bucket, optionally
/// encrypting every file with OpenPGP.
#[derive(Parser, Debug)]
#[command(name = "cryptsync", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the config file (default: search ./, user config dir, /etc/cryptsync)
    #[arg(long, global = true, env = "CRYPTSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode: only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a folder to a bucket or download a bucket into a folder
    Sync(SyncArgs),

    /// Generate, import and verify PGP keys
    Keys {
        #[command(subcommand)]
        action: KeysAction,
    },
}

/// Run arguments. All are optional here so that every missing one can be
/// reported together.
#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    /// Sync direction: upload or download
    #[arg(long)]
    pub mode: Option<String>,

    /// Encrypt files with PGP: yes or no
    #[arg(long)]
    pub encrypt: Option<String>,

    /// Bucket to upload to or download from
    #[arg(long)]
    pub bucket: Option<String>,

    /// Local folder to upload from or download to
    #[arg(long)]
    pub folder: Option<String>,

    /// Only upload files matching this glob (repeatable, default: *)
    #[arg(long)]
    pub filter: Vec<String>,

    /// Never upload files matching this glob (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Include hidden files: yes or no (default: yes)
    #[arg(long = "dot-files", alias = "dotFiles")]
    pub dot_files: Option<String>,

    /// Follow symbolic links: yes or no (default: yes)
    #[arg(long = "follow-symlinks", alias = "followSymbolicLinks")]
    pub follow_symlinks: Option<String>,
}

impl From<SyncArgs> for RunArguments {
    fn from(args: SyncArgs) -> Self {
        Self {
            mode: args.mode,
            encrypt: args.encrypt,
            bucket: args.bucket,
            folder: args.folder,
            filter: args.filter,
            exclude: args.exclude,
            dot_files: args.dot_files,
            follow_symlinks: args.follow_symlinks,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum KeysAction {
    /// Generate a key pair and write a config template holding it
    Generate {
        /// Name for the key's user ID
        #[arg(long)]
        name: String,
        /// Email address for the key's user ID
        #[arg(long)]
        email: String,
        /// Passphrase protecting the private key (min. 8 characters)
        #[arg(long, env = "CRYPTSYNC_PASSPHRASE", hide_env_values = true)]
        passphrase: String,
        /// RSA key size in bits
        #[arg(long, default_value_t = 4096)]
        bits: u32,
        /// Where to write the config template
        #[arg(long, default_value = "cryptsync.toml")]
        output: PathBuf,
    },
    /// Print the stored single-line form of an armored key file
    Import {
        /// Armored PGP key file
        file: PathBuf,
    },
    /// Check that the configured keys unlock with the configured passphrase
    Verify,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn camel_case_aliases_are_accepted() {
        let cli = Cli::try_parse_from([
            "cryptsync",
            "sync",
            "--dotFiles",
            "no",
            "--followSymbolicLinks",
            "no",
            "--filter",
            "*.conf",
            "--filter",
            "*.txt",
        ])
        .unwrap();

        let Commands::Sync(args) = cli.command else {
            panic!("expected sync");
        };
        let run = RunArguments::from(args);
        assert_eq!(run.dot_files.as_deref(), Some("no"));
        assert_eq!(run.follow_symlinks.as_deref(), Some("no"));
        assert_eq!(run.filter, vec!["*.conf", "*.txt"]);
        assert!(run.mode.is_none());
    }
}
