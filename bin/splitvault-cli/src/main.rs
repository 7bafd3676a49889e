//! SplitVault CLI
//!
//! Splits a file into threshold shares spread over the backends listed in a
//! stores file, and reassembles or deletes them by file id.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use splitvault_common::{Config, FileId, SharingConfig};
use splitvault_crypto::CipherSettings;
use splitvault_dist::{
    BackendDiagnostic, DeleteStatus, Distributor, DistributorOptions, RetrieveRequest,
};
use splitvault_store::{BackendFactory, BackendHandle};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "splitvault")]
#[command(about = "Split files into threshold shares across storage backends")]
#[command(version)]
struct Args {
    /// Stores file listing the backends (TOML)
    #[arg(short = 's', long, env = "SPLITVAULT_STORES_CONFIG")]
    stores_config: PathBuf,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Shorthand for --log-level debug
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a file and distribute its shares
    Store {
        /// File to protect
        #[arg(short, long)]
        file: PathBuf,

        /// Number of shares to produce
        #[arg(short = 'a', long, default_value_t = 2)]
        share_count: u8,

        /// Shares required to reconstruct
        #[arg(short = 't', long = "shares-threshold", default_value_t = 2)]
        threshold: u8,

        #[command(flatten)]
        cipher: CipherArgs,
    },
    /// Collect shares and rebuild a file
    Retrieve {
        /// File id printed by `store`
        #[arg(short = 'i', long)]
        file_id: FileId,

        /// Where to write the rebuilt file
        #[arg(short, long)]
        destination: PathBuf,

        /// Fingerprint printed by `store`; verification is skipped without it
        #[arg(short = 'c', long)]
        checksum: Option<String>,

        /// Minimum shares to insist on; the threshold stored with the shares
        /// always applies
        #[arg(short = 't', long = "shares-threshold")]
        threshold: Option<u8>,

        #[command(flatten)]
        cipher: CipherArgs,
    },
    /// Remove every share of a file
    Delete {
        /// File id printed by `store`
        #[arg(short = 'i', long)]
        file_id: FileId,
    },
}

#[derive(clap::Args)]
struct CipherArgs {
    /// Encrypt before splitting, decrypt after combining
    #[arg(short, long, requires = "key")]
    encrypt: bool,

    /// 32-byte encryption key
    #[arg(short, long, env = "SPLITVAULT_KEY", hide_env_values = true)]
    key: Option<String>,
}

impl CipherArgs {
    fn settings(&self) -> CipherSettings {
        match (&self.key, self.encrypt) {
            (Some(key), true) => CipherSettings::enabled(key.as_bytes()),
            _ => CipherSettings::disabled(),
        }
    }
}

/// Read, parse and validate the stores file
fn load_config(path: &Path) -> Result<Config> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read stores file {}", path.display()))?;
    let config: Config = toml::from_str(&raw)
        .with_context(|| format!("failed to parse stores file {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid stores file {}", path.display()))?;
    Ok(config)
}

fn log_diagnostics(diagnostics: &[BackendDiagnostic]) {
    for diag in diagnostics {
        warn!(
            backend = %diag.backend,
            stage = %diag.stage,
            "{}",
            diag.message
        );
    }
}

async fn store(
    backends: &[BackendHandle],
    options: DistributorOptions,
    file: &Path,
    config: SharingConfig,
    cipher: &CipherArgs,
) -> Result<()> {
    let distributor = Distributor::new(&cipher.settings(), options)?;
    let report = distributor
        .store_file(backends, file, config)
        .await
        .with_context(|| format!("failed to store {}", file.display()))?;

    log_diagnostics(&report.diagnostics);
    if !report.is_recoverable() {
        bail!(
            "only {} of {} shares stored for file {}, {} needed to recover it",
            report.placed(),
            config.share_count,
            report.file_id,
            config.threshold
        );
    }
    if !report.is_complete() {
        warn!(
            file_id = %report.file_id,
            placed = report.placed(),
            total = config.share_count,
            "Not every share could be stored"
        );
    }

    println!("file id:     {}", report.file_id);
    println!("fingerprint: {}", report.fingerprint);
    Ok(())
}

async fn retrieve(
    backends: &[BackendHandle],
    options: DistributorOptions,
    request: RetrieveRequest,
    destination: &Path,
    cipher: &CipherArgs,
) -> Result<()> {
    let distributor = Distributor::new(&cipher.settings(), options)?;
    let report = match distributor
        .retrieve_to_file(backends, &request, destination)
        .await
    {
        Ok(report) => report,
        Err(e) if e.is_integrity() => {
            error!(file_id = %request.file_id, error = %e, "Integrity check failed, nothing written");
            return Err(e.into());
        }
        Err(e) if e.is_not_found() => {
            error!(file_id = %request.file_id, error = %e, "Not enough shares to restore the file");
            return Err(e.into());
        }
        Err(e) => {
            return Err(anyhow::Error::from(e)
                .context(format!("failed to retrieve file {}", request.file_id)));
        }
    };

    log_diagnostics(&report.diagnostics);
    if !report.verified {
        warn!(file_id = %report.file_id, "No fingerprint given, contents were not verified");
    }
    info!(
        file_id = %report.file_id,
        destination = %destination.display(),
        shares = report.shares_used,
        "File restored"
    );
    Ok(())
}

async fn delete(
    backends: &[BackendHandle],
    options: DistributorOptions,
    file_id: &FileId,
) -> Result<()> {
    let distributor = Distributor::new(&CipherSettings::disabled(), options)?;
    let report = distributor.delete(backends, file_id).await;

    log_diagnostics(&report.diagnostics);
    match report.status() {
        DeleteStatus::Complete => {}
        DeleteStatus::Partial => warn!(
            file_id = %file_id,
            failed = report.failed,
            skipped = report.skipped,
            "Some backends could not be cleaned"
        ),
        DeleteStatus::NothingDeleted => warn!(file_id = %file_id, "No shares deleted"),
    }

    println!("deleted {} share(s) of {file_id}", report.deleted);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        "debug".to_string()
    } else {
        args.log_level.clone()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config(&args.stores_config)?;
    info!(
        stores = %args.stores_config.display(),
        backends = config.backends.len(),
        "Loaded stores file"
    );
    let backends = BackendFactory::create_all(&config);
    let options = DistributorOptions::from(&config.distribution);

    match args.command {
        Commands::Store {
            file,
            share_count,
            threshold,
            cipher,
        } => {
            store(
                &backends,
                options,
                &file,
                SharingConfig::new(share_count, threshold),
                &cipher,
            )
            .await
        }
        Commands::Retrieve {
            file_id,
            destination,
            checksum,
            threshold,
            cipher,
        } => {
            let mut request =
                RetrieveRequest::new(file_id).with_fingerprint(checksum.unwrap_or_default());
            if let Some(threshold) = threshold {
                request = request.with_threshold(threshold);
            }
            retrieve(&backends, options, request, &destination, &cipher).await
        }
        Commands::Delete { file_id } => delete(&backends, options, &file_id).await,
    }
}
