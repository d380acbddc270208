use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use runtime::{Agent, AnthropicBackend, RegistryHost};
use tools::{ForecastClient, PythonRunner, Registry};

use server::config::{Config, DEFAULT_CONFIG_FILE};
use server::{Result, app};

const SYSTEM_PROMPT: &str = "You are Steward, a helpful assistant with access to tools. \
You can fetch weather forecasts for any location using the get_weather tool, and execute \
Python code for data analysis or calculations using the run_python tool. When asked about \
weather, call get_weather with the location's coordinates. When asked to analyze data or \
compute something, write Python code and run it. Always explain the results clearly.";

#[derive(Parser)]
#[command(name = "steward")]
#[command(about = "A streaming chat assistant with weather and Python tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides the config file)
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = if config_path.exists() {
        tracing::info!(path = %config_path.display(), "loading config");
        Config::load(&config_path)?
    } else {
        Config::default()
    };

    let api_key = config.api_key()?;

    let backend = AnthropicBackend::builder(api_key, &config.backend.model)
        .max_tokens(config.backend.max_tokens)
        .system(SYSTEM_PROMPT)
        .build();

    let forecast = match &config.forecast.base_url {
        Some(url) => ForecastClient::with_base_url(url),
        None => ForecastClient::new(),
    };

    let mut python = PythonRunner::new();
    if let Some(interpreter) = &config.python.interpreter {
        python = python.with_interpreter(interpreter);
    }
    if let Some(secs) = config.python.timeout_secs {
        python = python.with_timeout(Duration::from_secs(secs));
    }

    let agent = Arc::new(Agent::new(
        backend,
        RegistryHost::new(Registry::builtin(forecast, python)),
    ));

    let bind = cli.bind.unwrap_or_else(|| config.server.bind.clone());
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(model = %config.backend.model, addr = %bind, "steward listening");

    axum::serve(listener, app(agent).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install ctrl-c handler");
        return;
    }
    tracing::info!("ctrl-c received, shutting down");
}
