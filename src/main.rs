//! ERP Access Service: CLI server
//!
//! ```sh
//! # Run with default config (~/.config/erp-access/config.toml)
//! erp-access-service
//!
//! # Custom config path and port
//! erp-access-service --config /etc/erp-access/config.toml --port 9090
//!
//! # Validate config without starting
//! erp-access-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use erp_access::config::AppConfig;
use erp_access::server::{init_tracing, ServerHandle, ServerOptions};

/// Accounts and role-based access control API for the ERP backend.
#[derive(Parser, Debug)]
#[command(
    name = "erp-access-service",
    version,
    about = "User accounts and role-based access control API",
    long_about = "REST API for logging in, issuing bearer tokens and managing \
                  ADMIN / MANAGER / EMPLOYEE accounts.\n\n\
                  Default config: ~/.config/erp-access/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "ERP_ACCESS_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Skip creating the default admin user.
    #[arg(long)]
    no_admin: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(erp_access::default_config_path);

    let loaded = AppConfig::load(&config_path);
    if cli.check {
        let mut config = loaded?;
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}", config.server.address());
        println!("   Database    : {}", config.database.url);
        println!("   Log level   : {}", cli.log_level.as_deref().unwrap_or(&config.logging.level));
        return Ok(());
    }

    let mut config = match loaded {
        Ok(mut cfg) => {
            if let Some(ref level) = cli.log_level {
                cfg.logging.level = level.clone();
            }
            init_tracing(&cfg);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            let mut cfg = AppConfig::default();
            cfg.apply_overrides(|key| std::env::var(key).ok());
            if let Some(ref level) = cli.log_level {
                cfg.logging.level = level.clone();
            }
            init_tracing(&cfg);
            error!("Failed to load config: {}", e);
            error!("Using default configuration.");
            cfg
        }
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.port {
        info!("CLI override: port = {}", port);
        config.server.port = port;
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
        create_default_admin: !cli.no_admin,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
