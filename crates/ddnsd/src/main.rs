// # ddnsd - DDNS Daemon
//
// Thin HTTP front for `ddns-core`. Routers and gateways call
// `GET /update?hostname=...&ip=...` with their provider credential in the
// `Authorization` header; the daemon hands the request to `UpdateService`
// and writes back whatever it answers.
//
// The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Building the DNS provider and the update service
// 4. Serving HTTP until SIGTERM/SIGINT
//
// ## Configuration
//
// - `DDNS_LISTEN_ADDR`: Socket address to bind (default `0.0.0.0:8080`)
// - `DDNS_MODE`: `strict` (one zone per token) or `bulk` (account-wide)
// - `DDNS_AUTH_SCHEME`: `basic` (`email:token`) or `bearer`
// - `DDNS_ACCOUNT_ID`: Account the token belongs to (required for bulk)
// - `DDNS_PROVIDER_TYPE`: Provider type (cloudflare)
// - `DDNS_PROVIDER_API_BASE`: Override the provider API base URL
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error
//
// No provider secret is configured here: every request carries its own.
//
// ## Example
//
// ```bash
// export DDNS_LISTEN_ADDR=0.0.0.0:8080
// export DDNS_MODE=bulk
// export DDNS_ACCOUNT_ID=0123456789abcdef
//
// ddnsd
// ```

mod server;

use anyhow::Result;
use ddns_core::{AuthScheme, DnsProvider, ResolutionMode, ServiceConfig, UpdateService};
use std::env;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    listen_addr: String,
    mode: String,
    auth_scheme: String,
    account_id: Option<String>,
    provider_type: String,
    provider_api_base: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            listen_addr: non_empty("DDNS_LISTEN_ADDR")
                .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
            mode: non_empty("DDNS_MODE").unwrap_or_else(|| "strict".to_string()),
            auth_scheme: non_empty("DDNS_AUTH_SCHEME").unwrap_or_else(|| "basic".to_string()),
            account_id: non_empty("DDNS_ACCOUNT_ID"),
            provider_type: non_empty("DDNS_PROVIDER_TYPE")
                .unwrap_or_else(|| "cloudflare".to_string()),
            provider_api_base: non_empty("DDNS_PROVIDER_API_BASE"),
            log_level: non_empty("DDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.socket_addr()?;
        self.resolution_mode()?;
        self.auth_scheme()?;

        match self.provider_type.as_str() {
            "cloudflare" => {}
            _ => anyhow::bail!(
                "DDNS_PROVIDER_TYPE '{}' is not supported. \
                Supported providers: cloudflare",
                self.provider_type
            ),
        }

        if let Some(ref base) = self.provider_api_base
            && !base.starts_with("https://")
            && !base.starts_with("http://")
        {
            anyhow::bail!(
                "DDNS_PROVIDER_API_BASE must use HTTP or HTTPS scheme. Got: {}",
                base
            );
        }

        if self.resolution_mode()? == ResolutionMode::Bulk && self.account_id.is_none() {
            anyhow::bail!(
                "DDNS_ACCOUNT_ID is required when DDNS_MODE=bulk. \
                Set it via: export DDNS_ACCOUNT_ID=your_account_id"
            );
        }

        self.log_level()?;

        Ok(())
    }

    fn socket_addr(&self) -> Result<SocketAddr> {
        self.listen_addr.parse().map_err(|e| {
            anyhow::anyhow!(
                "DDNS_LISTEN_ADDR '{}' is not a valid socket address: {}",
                self.listen_addr,
                e
            )
        })
    }

    fn resolution_mode(&self) -> Result<ResolutionMode> {
        match self.mode.to_lowercase().as_str() {
            "strict" => Ok(ResolutionMode::Strict),
            "bulk" => Ok(ResolutionMode::Bulk),
            _ => anyhow::bail!(
                "DDNS_MODE '{}' is not valid. Valid modes: strict, bulk",
                self.mode
            ),
        }
    }

    fn auth_scheme(&self) -> Result<AuthScheme> {
        match self.auth_scheme.to_lowercase().as_str() {
            "basic" => Ok(AuthScheme::Basic),
            "bearer" => Ok(AuthScheme::Bearer),
            _ => anyhow::bail!(
                "DDNS_AUTH_SCHEME '{}' is not valid. Valid schemes: basic, bearer",
                self.auth_scheme
            ),
        }
    }

    fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    /// Core service configuration
    fn service_config(&self) -> Result<ServiceConfig> {
        let mut service = ServiceConfig::new()
            .with_mode(self.resolution_mode()?)
            .with_auth_scheme(self.auth_scheme()?);
        if let Some(ref account_id) = self.account_id {
            service = service.with_account_id(account_id.clone());
        }
        Ok(service)
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let log_level = config.log_level().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting ddnsd daemon");

    let service = match build_service(&config) {
        Ok(service) => service,
        Err(e) => {
            error!("Startup error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(&config, service).await {
            error!("Daemon error: {}", e);
            DdnsExitCode::RuntimeError
        } else {
            DdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Build the provider and the update service from configuration
fn build_service(config: &Config) -> Result<UpdateService> {
    let provider = build_provider(config)?;
    info!("Provider: {}", provider.provider_name());

    let service = UpdateService::new(provider, config.service_config()?)?;
    info!(
        "Mode: {:?}, auth scheme: {:?}",
        service.config().mode,
        service.config().auth_scheme
    );
    Ok(service)
}

#[cfg(feature = "cloudflare")]
fn build_provider(config: &Config) -> Result<Arc<dyn DnsProvider>> {
    use ddns_provider_cloudflare::CloudflareProvider;

    let provider = match config.provider_api_base {
        Some(ref base) => CloudflareProvider::with_api_base(base.clone())?,
        None => CloudflareProvider::new()?,
    };
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "cloudflare"))]
fn build_provider(config: &Config) -> Result<Arc<dyn DnsProvider>> {
    anyhow::bail!(
        "DDNS_PROVIDER_TYPE '{}' requires ddnsd to be built with that provider feature",
        config.provider_type
    )
}

/// Serve HTTP until a shutdown signal arrives
async fn run_daemon(config: &Config, service: UpdateService) -> Result<()> {
    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;

    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, server::router(service))
        .with_graceful_shutdown(async {
            match wait_for_shutdown().await {
                Ok(signal) => info!("Received shutdown signal: {}", signal),
                Err(e) => error!("Shutdown error: {}", e),
            }
        })
        .await?;

    info!("Shutting down daemon");
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
