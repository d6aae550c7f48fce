//! Realmgate CLI - token-gated user provisioning for identity realms
//!
//! Run `realmgate --help` for usage information.

use clap::{Parser, Subcommand};
use realmgate::auth::AuthGate;
use realmgate::config::{Config, ConfigError, LogFormat};
use realmgate::directory::MemoryDirectory;
use realmgate::provision::Provisioner;
use realmgate::web::{WebConfig, WebServer};
use realmgate::RealmgateError;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "realmgate",
    about = "Token-gated user provisioning for identity realms",
    version
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the provisioning server
    Serve {
        /// Address to bind to, overriding the configured one
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), RealmgateError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind } => {
            let config = load_config(cli.config.as_deref()).await?;
            init_logging(&config, cli.verbose)?;
            run_server(config, bind).await
        }
        Commands::Init { force } => init_config(force).await,
    }
}

/// Load configuration from the given path or the default location
async fn load_config(path: Option<&std::path::Path>) -> Result<Config, RealmgateError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => Config::default_path(),
    };

    match Config::load(&path).await {
        Err(ConfigError::NotFound(path)) => Err(ConfigError::Invalid(format!(
            "no configuration at {}. Run 'realmgate init' first.",
            path.display()
        ))
        .into()),
        other => Ok(other?),
    }
}

/// Setup the tracing subscriber from config and verbosity flags
fn init_logging(config: &Config, verbose: u8) -> Result<(), RealmgateError> {
    let level = match verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_new(level)
        .map_err(|e| ConfigError::Invalid(format!("invalid log level '{}': {}", level, e)))?;

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }

    Ok(())
}

/// Run the provisioning server
async fn run_server(config: Config, bind: Option<String>) -> Result<(), RealmgateError> {
    let decoder = config.auth.build_decoder().await?;
    let gate = AuthGate::new(Arc::new(decoder));
    let directory = Arc::new(MemoryDirectory::new());
    let provisioner = Provisioner::new(gate, directory);

    let web_config = WebConfig {
        bind: bind.unwrap_or_else(|| config.server.bind.clone()),
    };
    let server = WebServer::new(web_config, provisioner, config.realm.name.clone());

    println!("Realmgate running at http://{}", server.bind_address());
    println!("Press Ctrl+C to stop");

    server.run().await?;

    Ok(())
}

/// Initialize configuration
async fn init_config(force: bool) -> Result<(), RealmgateError> {
    let config_path = Config::default_path();

    if config_path.exists() && !force {
        return Err(ConfigError::Invalid(format!(
            "Configuration already exists at {}. Use --force to overwrite.",
            config_path.display()
        ))
        .into());
    }

    // Create config directory
    if let Some(parent) = config_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // Write default configuration
    let default_config = r#"# Realmgate Configuration

[server]
bind = "127.0.0.1:8089"

[realm]
name = "master"

[auth]
# Shared secret for HS256-signed tokens. For RS256 issuers, remove this
# and point rs256_public_key at the issuer's PEM-encoded public key.
hs256_secret = "change-me"
# rs256_public_key = "/etc/realmgate/issuer.pem"

[logging]
level = "info"
format = "pretty"
"#;

    tokio::fs::write(&config_path, default_config).await?;

    println!("Configuration initialized at {}", config_path.display());
    println!("\nNext steps:");
    println!("1. Replace the hs256_secret with your issuer's signing secret");
    println!("2. Set the realm name your tokens are issued for");
    println!("3. Start the server: realmgate serve");

    Ok(())
}
