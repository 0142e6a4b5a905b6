use std::path::Path;

use tracing::{debug, warn};

use crate::adapters::cipher::pgp_backend::PgpBackend;
use crate::adapters::listing::glob_lister::GlobLister;
use crate::adapters::object_store::s3_store::S3ObjectStore;
use crate::cli::SyncArgs;
use crate::cli::output;
use crate::config::app_config::SyncConfig;
use crate::core::errors::Result;
use crate::core::models::run_settings::RunArguments;
use crate::core::services::encryption_service::EncryptionService;
use crate::core::services::preflight::{ValidatedRun, validate_inputs};
use crate::core::services::sync_service::SyncService;

/// Exit status after SIGINT.
const EXIT_INTERRUPTED: i32 = 130;
/// Exit status after SIGTERM.
const EXIT_TERMINATED: i32 = 143;

/// Execute the `cryptsync sync` command.
///
/// All inputs are validated before anything touches the network. The
/// batch then runs on a single-threaded runtime; an interrupt or
/// termination signal ends the process right away.
pub fn execute(config_path: Option<&Path>, args: SyncArgs) -> Result<()> {
    let (config, source) = SyncConfig::load(config_path)?;
    debug!("using config {}", source.display());

    let run = validate_inputs(&config, &RunArguments::from(args))?;

    output::header(&format!(
        "cryptsync {} {} {}",
        run.plan.mode,
        run.plan.folder.display(),
        run.plan.bucket
    ));

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        tokio::select! {
            result = run_batch(run) => result,
            code = shutdown_signal() => {
                warn!("Received shutdown signal, exiting");
                std::process::exit(code);
            }
        }
    })
}

async fn run_batch(run: ValidatedRun) -> Result<()> {
    let encryption = if run.plan.encrypt {
        Some(EncryptionService::new(PgpBackend::unlock(&run.keys)?))
    } else {
        None
    };
    if let Some(encryption) = &encryption {
        debug!("encrypting with the {} backend", encryption.cipher_name());
    }

    let store = S3ObjectStore::new(&run.store);
    let service = SyncService::new(store, GlobLister, encryption);
    let report = service.run(&run.plan).await?;

    output::batch_summary(run.plan.mode, &report);
    Ok(())
}

/// Resolves with the exit status matching the received signal.
async fn shutdown_signal() -> i32 {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        if let Ok(mut terminate) = signal(SignalKind::terminate()) {
            return tokio::select! {
                _ = interrupted() => EXIT_INTERRUPTED,
                _ = terminate.recv() => EXIT_TERMINATED,
            };
        }
    }

    interrupted().await;
    EXIT_INTERRUPTED
}

async fn interrupted() {
    // Without a handler there is nothing to wait for.
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
