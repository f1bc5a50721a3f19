//! # Adzan Admin — prayer-time console and dispatch engine
//!
//! Usage:
//!   adzan-admin                          # Start the admin gateway
//!   adzan-admin --tick                   # Gateway + built-in minute ticker
//!   adzan-admin --run-jobs               # Fire both jobs once and exit
//!   adzan-admin --create-admin \
//!     --admin-email staff@example.com    # Create a console account

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use adzan_core::AppConfig;
use adzan_jobs::JobContext;
use adzan_push::{FcmClient, PushTransport};
use adzan_store::Store;

#[derive(Parser)]
#[command(
    name = "adzan-admin",
    version,
    about = "🕌 Adzan Admin — prayer-time console and push dispatch engine"
)]
struct Cli {
    /// Config file path (default: ~/.adzan-admin/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gateway host override
    #[arg(long)]
    host: Option<String>,

    /// Gateway port override
    #[arg(short, long)]
    port: Option<u16>,

    /// Fire the minute-tick trigger inside this process
    #[arg(long)]
    tick: bool,

    /// Run both jobs once, print the JSON summary, and exit
    #[arg(long)]
    run_jobs: bool,

    /// Create a console admin account and exit
    #[arg(long)]
    create_admin: bool,

    /// Admin email (used with --create-admin)
    #[arg(long, default_value = "admin@example.com")]
    admin_email: String,

    /// Admin password (used with --create-admin; generated when omitted)
    #[arg(long)]
    admin_password: Option<String>,

    /// Admin display name (used with --create-admin)
    #[arg(long)]
    admin_name: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "adzan=debug,tower_http=debug"
    } else {
        "adzan=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let mut config = match &cli.config {
        Some(path) => {
            let mut loaded = AppConfig::load_from(path)?;
            loaded.apply_env_overrides();
            loaded
        }
        None => AppConfig::load()?,
    };
    if let Some(host) = cli.host.clone() {
        config.gateway.host = host;
    }
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }

    if let Some(parent) = std::path::Path::new(&config.database_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = Arc::new(Store::open(std::path::Path::new(&config.database_path))?);

    if cli.create_admin {
        return create_admin(&store, &cli);
    }

    config.ensure_push_ready()?;
    let push: Arc<dyn PushTransport> = Arc::new(FcmClient::new(&config.fcm)?);

    if cli.run_jobs {
        return run_jobs_once(&config, &store, push.as_ref()).await;
    }

    println!("🕌 Adzan Admin v{}", env!("CARGO_PKG_VERSION"));
    println!("   Time zone: {}", config.time_zone);
    println!("   Database:  {}", config.database_path);

    if cli.tick {
        let tick_config = config.clone();
        let tick_store = store.clone();
        let tick_push = push.clone();
        tokio::spawn(async move {
            minute_ticker(tick_config, tick_store, tick_push).await;
        });
    }

    adzan_gateway::start(config, store, push).await
}

/// Fire the combined run once per minute, aligned to minute boundaries so
/// the resolved HH:MM is stable across the run.
async fn minute_ticker(config: AppConfig, store: Arc<Store>, push: Arc<dyn PushTransport>) {
    tracing::info!("⏱️ Minute ticker active");
    loop {
        let second = chrono::Timelike::second(&chrono::Utc::now());
        let wait = u64::from(60 - second.min(59));
        tokio::time::sleep(std::time::Duration::from_secs(wait.max(1))).await;

        let ctx = JobContext {
            store: &store,
            push: push.as_ref(),
            config: &config,
        };
        let combined = adzan_jobs::run_all(&ctx).await;
        let totals = combined.totals();
        if totals.processed > 0 || !combined.is_ok() {
            tracing::info!(
                "📨 Tick: {} processed, {} sent, {} failed",
                totals.processed,
                totals.sent,
                totals.failed
            );
        }
    }
}

async fn run_jobs_once(
    config: &AppConfig,
    store: &Arc<Store>,
    push: &dyn PushTransport,
) -> Result<()> {
    let ctx = JobContext {
        store,
        push,
        config,
    };
    let combined = adzan_jobs::run_all(&ctx).await;

    let as_json = |result: &Result<adzan_jobs::JobSummary, adzan_jobs::JobError>| match result {
        Ok(summary) => serde_json::to_value(summary).unwrap_or_default(),
        Err(e) => serde_json::json!({"error": e.to_string()}),
    };
    let report = serde_json::json!({
        "ok": combined.is_ok(),
        "adzan": as_json(&combined.adzan),
        "reminder": as_json(&combined.reminder),
        "total": combined.totals(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !combined.is_ok() {
        std::process::exit(1);
    }
    Ok(())
}

fn create_admin(store: &Store, cli: &Cli) -> Result<()> {
    println!("🕌 Adzan Admin — Console Account Setup\n");

    if store.find_admin(&cli.admin_email)?.is_some() {
        println!("⚠️  Admin '{}' already exists.", cli.admin_email);
        return Ok(());
    }

    let password = cli
        .admin_password
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
    let salt = adzan_gateway::new_salt();
    let hash = adzan_gateway::hash_password(&salt, &password);
    store.insert_admin(&adzan_store::Admin {
        id: uuid::Uuid::new_v4().to_string(),
        email: cli.admin_email.clone(),
        full_name: cli.admin_name.clone(),
        password_salt: salt,
        password_hash: hash,
        last_login_at: None,
    })?;

    println!("✅ Admin account created:");
    println!("   Email:    {}", cli.admin_email);
    println!("   Password: {password}");
    println!("   ⚠️  Change this password after first login!");
    Ok(())
}
