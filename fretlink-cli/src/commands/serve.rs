use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use fretlink_server::{DEFAULT_PORT, ServerConfig, serve_with_shutdown};
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// `development` skips token checks.
    #[arg(long = "env", env = "ENVIRONMENT", default_value = "development")]
    pub environment: String,

    /// Comma separated CORS origins, `*` for any.
    #[arg(long, env = "ALLOWED_ORIGINS")]
    pub allowed_origins: Option<String>,

    /// Lifetime of issued access tokens in seconds.
    #[arg(long, default_value_t = 3600)]
    pub token_ttl: u64,
}

impl ServeArgs {
    pub fn config(&self) -> ServerConfig {
        let mut config = ServerConfig {
            host: self.host.clone(),
            port: self.port,
            token_ttl: Duration::from_secs(self.token_ttl),
            ..ServerConfig::default()
        }
        .with_environment(&self.environment);

        if let Some(origins) = &self.allowed_origins {
            config = config.with_allowed_origins(origins);
        }
        config
    }
}

pub async fn run(args: ServeArgs) -> Result<()> {
    let config = args.config();
    let addr = config.bind_addr();

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    println!(
        "{} on {} ({})",
        "🚀 Serving fretlink".green().bold(),
        listener.local_addr()?,
        config.environment
    );
    if !config.require_tokens {
        println!("{}", "   Access tokens are not checked".yellow());
    }

    serve_with_shutdown(listener, config, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown requested");
    })
    .await?;

    println!("{}", "👋 Server stopped".green());
    Ok(())
}
