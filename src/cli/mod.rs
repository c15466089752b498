//! CLI entry point for oathbridge.

pub mod auth;
pub mod serve;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::BridgeConfig;

/// OAuth device login and session resolution for an authenticating proxy
#[derive(Parser, Debug)]
#[command(name = "oathbridge", version, about)]
pub struct Cli {
    /// Token cache file (overrides OATHBRIDGE_TOKEN_PATH)
    #[arg(long, global = true)]
    pub token_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authorize with the device flow (or reuse the cached token), then call the API
    Login(LoginArgs),
    /// Call the API with the cached token
    Call(CallArgs),
    /// Show whether a token is cached
    Status,
    /// Remove the cached token
    Logout,
    /// Run the session resolver consumed by the proxy
    Serve(ServeArgs),
    /// Run the header echo server
    Echo(ServeArgs),
}

/// Arguments for `oathbridge login`.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// OAuth app client id (overrides OATHBRIDGE_CLIENT_ID)
    #[arg(long)]
    pub client_id: Option<String>,

    /// Requested scopes, space separated (overrides OATHBRIDGE_SCOPE)
    #[arg(long)]
    pub scope: Option<String>,

    /// API URL to call once authorized (overrides OATHBRIDGE_API_URL)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Stop after authorizing, without calling the API
    #[arg(long)]
    pub no_call: bool,
}

/// Arguments for `oathbridge call`.
#[derive(Args, Debug)]
pub struct CallArgs {
    /// API URL (overrides OATHBRIDGE_API_URL)
    #[arg(long)]
    pub api_url: Option<String>,
}

/// Arguments for `oathbridge serve` and `oathbridge echo`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address (overrides the matching OATHBRIDGE_*_ADDR)
    #[arg(long)]
    pub addr: Option<SocketAddr>,
}

impl Cli {
    /// Apply command-line overrides on top of environment configuration.
    pub fn apply(&self, config: &mut BridgeConfig) {
        if let Some(path) = &self.token_path {
            config.token_path = path.clone();
        }
        match &self.command {
            Commands::Login(args) => {
                if let Some(client_id) = &args.client_id {
                    config.client_id = Some(client_id.clone());
                }
                if let Some(scope) = &args.scope {
                    config.scope = scope.clone();
                }
                if let Some(url) = &args.api_url {
                    config.api_url = url.clone();
                }
            }
            Commands::Call(args) => {
                if let Some(url) = &args.api_url {
                    config.api_url = url.clone();
                }
            }
            Commands::Serve(args) => {
                if let Some(addr) = args.addr {
                    config.resolver_addr = addr;
                }
            }
            Commands::Echo(args) => {
                if let Some(addr) = args.addr {
                    config.echo_addr = addr;
                }
            }
            Commands::Status | Commands::Logout => {}
        }
    }
}
