//! oathbridge CLI binary entry point.

use clap::Parser;
use oathbridge::cli::{auth, serve, Cli, Commands};
use oathbridge::config::BridgeConfig;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown requested");
            on_signal.cancel();
        }
    });

    let result = match BridgeConfig::from_env() {
        Ok(mut config) => {
            cli.apply(&mut config);
            match &cli.command {
                Commands::Login(args) => auth::handle_login(&config, !args.no_call, cancel).await,
                Commands::Call(_) => auth::handle_call(&config).await,
                Commands::Status => auth::handle_status(&config),
                Commands::Logout => auth::handle_logout(&config),
                Commands::Serve(_) => serve::handle_serve(&config, cancel).await,
                Commands::Echo(_) => serve::handle_echo(&config, cancel).await,
            }
        }
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, category = ?e.category(), "command failed");
        eprintln!("Error: {e}");
        if let Some(hint) = e.recovery_suggestion().hint() {
            eprintln!("Hint: {hint}");
        }
        std::process::exit(1);
    }
}
