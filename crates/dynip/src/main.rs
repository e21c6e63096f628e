// # dynip - Route53 dynamic IP updater
//
// Run once (typically from cron or a systemd timer) to point a Route53 "A"
// record at this host's current public IPv4 address.
//
// This binary is a thin integration layer:
// 1. Parse flags / environment into an `UpdaterConfig`
// 2. Initialize logging
// 3. Wire the HTTP IP source, system resolver and Route53 provider
// 4. Run the `Updater` once and map the outcome to an exit status
//
// ## Configuration
//
// Every flag can also be set through the environment; flags win.
//
// - `--host` / `DYNIP_HOST`: record to keep in sync (required)
// - `--zone-id` / `DYNIP_ZONE_ID`: hosted zone id (required)
// - `--access-key` / `DYNIP_ACCESS_KEY`, `--secret-key` / `DYNIP_SECRET_KEY`:
//   explicit credentials; otherwise the standard AWS environment, the
//   shared credentials file, then the EC2 instance role are used
// - `--lock` / `DYNIP_LOCK_PATH`: lock file path
// - `--ip-url` / `DYNIP_IP_URL`: "what is my IP" endpoint
// - `--dry-run` / `DYNIP_DRY_RUN`: read everything, change nothing
// - `--log-level` / `DYNIP_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// */5 * * * * dynip --host home.example.com --zone-id Z0123456789ABC
// ```

use anyhow::{Context, Result};
use clap::Parser;
use dynip_core::{CredentialsConfig, RunOutcome, SystemResolver, Updater, UpdaterConfig};
use dynip_ip_http::HttpIpSource;
use dynip_provider_route53::Route53Provider;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes
///
/// The status only distinguishes success from failure; the log says why.
#[derive(Debug, Clone, Copy)]
enum DynipExitCode {
    /// Record already correct, or updated
    Success = 0,
    /// Any error: configuration, lock, network, record, provider
    Failure = 1,
}

impl From<DynipExitCode> for ExitCode {
    fn from(code: DynipExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "dynip",
    version,
    about = "Point a Route53 A record at this host's public IPv4 address"
)]
struct Args {
    /// Host name to update (ex. 'home.example.com')
    #[arg(long, env = "DYNIP_HOST")]
    host: String,

    /// Route53 hosted zone id (see AWS Console Route53)
    #[arg(long, env = "DYNIP_ZONE_ID")]
    zone_id: String,

    /// AWS access key id
    #[arg(long, env = "DYNIP_ACCESS_KEY", requires = "secret_key")]
    access_key: Option<String>,

    /// AWS secret access key
    #[arg(long, env = "DYNIP_SECRET_KEY", hide_env_values = true, requires = "access_key")]
    secret_key: Option<String>,

    /// Lock file path [default: <temp dir>/dynip2route53.lock]
    #[arg(long = "lock", env = "DYNIP_LOCK_PATH")]
    lock_path: Option<PathBuf>,

    /// URL returning the caller's public IP on its first line
    #[arg(long, env = "DYNIP_IP_URL", default_value = dynip_core::config::DEFAULT_IP_URL)]
    ip_url: String,

    /// List the record but do not submit a change
    #[arg(long, env = "DYNIP_DRY_RUN")]
    dry_run: bool,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, env = "DYNIP_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    /// Build the updater configuration
    fn into_config(self) -> UpdaterConfig {
        let mut config = UpdaterConfig::new(&self.host, self.zone_id)
            .with_ip_url(self.ip_url)
            .with_dry_run(self.dry_run)
            .with_credentials(CredentialsConfig {
                access_key: self.access_key,
                secret_key: self.secret_key,
            });

        if let Some(path) = self.lock_path {
            config = config.with_lock_path(path);
        }

        config
    }
}

fn parse_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "log level '{}' is not valid. Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = match parse_level(&args.log_level) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return DynipExitCode::Failure.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return DynipExitCode::Failure.into();
    }

    let config = args.into_config();

    // One network call at a time; no need for worker threads
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DynipExitCode::Failure.into();
        }
    };

    match rt.block_on(run(config)) {
        Ok(outcome) => {
            report(&outcome);
            DynipExitCode::Success.into()
        }
        Err(e) => {
            error!("{:#}", e);
            DynipExitCode::Failure.into()
        }
    }
}

/// Wire the components and run the workflow once
async fn run(config: UpdaterConfig) -> Result<RunOutcome> {
    config.validate().context("invalid configuration")?;

    info!(
        "Updating {} in zone {}{}",
        config.host,
        config.zone_id,
        if config.dry_run { " (dry run)" } else { "" }
    );

    let ip_source = HttpIpSource::new(config.ip_url.clone())?;
    // Credentials are resolved on the provider's first call, under the lock
    let provider = Route53Provider::from_config(&config)?;

    let updater = Updater::new(
        Box::new(ip_source),
        Box::new(SystemResolver),
        Box::new(provider),
        config,
    )?;

    Ok(updater.run().await?)
}

fn report(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::AlreadyCurrent { ip } => info!("Done: DNS already resolves to {}", ip),
        RunOutcome::Unchanged { ip } => info!("Done: record already holds {}", ip),
        RunOutcome::Updated {
            previous,
            current,
            change,
        } => info!(
            "Done: record updated {} -> {} (change {}, {})",
            previous, current, change.id, change.status
        ),
    }
}
