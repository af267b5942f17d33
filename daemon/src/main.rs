//! Vulcan daemon: runs the registration HTTP service and its maintenance
//! commands.

mod config;
mod shutdown;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;

use vulcan_blockchain::HttpBlockchain;
use vulcan_mail::{HttpMailTransport, MailDispatcher};
use vulcan_rpc::{RpcMetrics, RpcServer, RpcState};
use vulcan_service::RegistrationService;
use vulcan_store::{FraudStore, ReferralStore};
use vulcan_store_lmdb::LmdbEnvironment;
use vulcan_types::Timestamp;
use vulcan_utils::{format_duration, init_logging, LogFormat, SystemClock};

use crate::config::DaemonConfig;
use crate::shutdown::{join_task, ShutdownController};

#[derive(Parser)]
#[command(name = "vulcan-daemon", about = "Email to wallet registration service")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "VULCAN_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Directory holding the LMDB environment.
    #[arg(long, env = "VULCAN_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "VULCAN_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "VULCAN_LOG_FORMAT", global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the HTTP service.
    Serve {
        /// Address to listen on, e.g. "0.0.0.0:7080".
        #[arg(long, env = "VULCAN_LISTEN_ADDR")]
        listen_addr: Option<std::net::SocketAddr>,

        /// Base URL of the transfer broadcaster.
        #[arg(long, env = "VULCAN_BLOCKCHAIN_ENDPOINT")]
        blockchain_endpoint: Option<String>,

        /// Base URL of the mail delivery API.
        #[arg(long, env = "VULCAN_MAIL_ENDPOINT")]
        mail_endpoint: Option<String>,

        #[arg(long, env = "VULCAN_MAIL_API_KEY", hide_env_values = true)]
        mail_api_key: Option<String>,
    },

    /// Manage the fraud domain denylist.
    #[command(name = "fraud-domain")]
    FraudDomain {
        #[command(subcommand)]
        action: FraudDomainAction,
    },

    /// Inspect referral tracking.
    Referral {
        #[command(subcommand)]
        action: ReferralAction,
    },
}

#[derive(clap::Subcommand)]
enum FraudDomainAction {
    /// Add a domain; addresses on it and its subdomains are refused.
    Add { domain: String },
}

#[derive(clap::Subcommand)]
enum ReferralAction {
    /// List referrals installed more than `days` days ago and still unpaid.
    Stale {
        #[arg(long)]
        days: Option<u64>,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<DaemonConfig> {
    let mut config = match cli.config {
        Some(ref path) => {
            let path = path.to_string_lossy();
            DaemonConfig::from_toml_file(&path)
                .with_context(|| format!("loading config from {path}"))?
        }
        None => DaemonConfig::default(),
    };

    if let Some(ref dir) = cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(ref level) = cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    Ok(config)
}

fn open_store(config: &DaemonConfig) -> anyhow::Result<Arc<LmdbEnvironment>> {
    let env = LmdbEnvironment::open(&config.data_dir, config.map_size)
        .with_context(|| format!("opening store at {}", config.data_dir.display()))?;
    Ok(Arc::new(env))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(&cli)?;
    init_logging(config.log_format, &config.log_level);

    if let Some(ref path) = cli.config {
        tracing::info!(path = %path.display(), "loaded config");
    }

    match cli.command {
        Command::Serve {
            listen_addr,
            blockchain_endpoint,
            mail_endpoint,
            mail_api_key,
        } => {
            if let Some(addr) = listen_addr {
                config.listen_addr = addr;
            }
            if let Some(endpoint) = blockchain_endpoint {
                config.blockchain.endpoint = endpoint;
            }
            if let Some(endpoint) = mail_endpoint {
                config.mail.endpoint = endpoint;
            }
            if let Some(key) = mail_api_key {
                config.mail.api_key = key;
            }
            serve(config).await?;
        }
        Command::FraudDomain {
            action: FraudDomainAction::Add { domain },
        } => {
            let store = open_store(&config)?;
            store
                .put_fraud_domain(&domain)
                .with_context(|| format!("adding fraud domain {domain}"))?;
            println!("added fraud domain {}", domain.trim().to_ascii_lowercase());
        }
        Command::Referral {
            action: ReferralAction::Stale { days },
        } => {
            let store = open_store(&config)?;
            let days = days.unwrap_or(config.stale_referral_days);
            let now = Timestamp::now();
            let stale = store.installed_referrals_before(now.minus_days(days))?;
            for row in &stale {
                let installed_at = row.installed_at.unwrap_or(row.registered_at);
                println!(
                    "{} -> {} installed {} ago",
                    row.sender,
                    row.receiver,
                    format_duration(installed_at.elapsed_since(now)),
                );
            }
            println!("{} stale referral(s) older than {days} day(s)", stale.len());
        }
    }

    Ok(())
}

async fn serve(config: DaemonConfig) -> anyhow::Result<()> {
    let started = Instant::now();
    let store = open_store(&config)?;
    for domain in &config.fraud_domains {
        store
            .put_fraud_domain(domain)
            .with_context(|| format!("seeding fraud domain {domain}"))?;
    }
    if !config.fraud_domains.is_empty() {
        tracing::info!(count = config.fraud_domains.len(), "seeded fraud domains");
    }

    let chain = HttpBlockchain::with_timeout(
        config.blockchain.endpoint.clone(),
        config.service.address_prefix.clone(),
        Duration::from_secs(config.blockchain.timeout_secs),
    )
    .with_denom(config.blockchain.denom.clone());

    let transport = HttpMailTransport::new(config.mail.endpoint.clone(), config.mail.api_key.clone());
    let (mailer, mail_worker) = MailDispatcher::spawn(
        Arc::new(transport),
        config.mail.templates.clone(),
        config.mail.queue_capacity,
    );

    let service = RegistrationService::new(
        store,
        Arc::new(chain),
        Arc::new(mailer),
        Arc::new(SystemClock),
        config.service.clone(),
    );
    let metrics = RpcMetrics::new().context("registering metrics")?;
    let state = RpcState {
        service: service.clone(),
        metrics: Arc::new(metrics),
    };

    let shutdown = Arc::new(ShutdownController::new());
    {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            if let Err(e) = shutdown.wait_for_signal().await {
                tracing::error!(error = %e, "cannot listen for shutdown signals");
            }
        });
    }

    let reporter = tokio::spawn(report_stale_referrals(
        service.clone(),
        config.stale_referral_days,
        config.stale_report_interval_secs,
        shutdown.subscribe(),
    ));

    tracing::info!(
        listen = %config.listen_addr,
        blockchain = %config.blockchain.endpoint,
        startup = %format_duration(started.elapsed().as_secs()),
        "vulcan daemon started"
    );
    RpcServer::new(config.listen_addr, state)
        .start(shutdown.signalled())
        .await?;

    // Stops the reporter when the server exited without a signal.
    shutdown.shutdown();
    join_task("stale referral reporter", reporter).await;

    tracing::info!("waiting for background referral tasks");
    service.drain().await;

    // Dropping the last dispatcher closes the queue; the worker then flushes it.
    drop(service);
    join_task("mail worker", mail_worker).await;

    tracing::info!("vulcan daemon exited cleanly");
    Ok(())
}

/// Periodically log referrals stuck in `Installed`.
async fn report_stale_referrals(
    service: RegistrationService,
    days: u64,
    interval_secs: u64,
    mut shutdown: tokio::sync::broadcast::Receiver<()>,
) {
    if interval_secs == 0 {
        return;
    }
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.recv() => return,
        }
        match service.stale_installed_referrals(days) {
            Ok(stale) if stale.is_empty() => {}
            Ok(stale) => tracing::warn!(count = stale.len(), days, "stale installed referrals"),
            Err(e) => tracing::warn!(error = %e, "stale referral report failed"),
        }
    }
}
