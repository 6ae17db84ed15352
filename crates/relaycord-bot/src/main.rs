use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use relaycord_agent::pipeline::RelaySettings;
use relaycord_agent::{CompletionClient, GeminiProvider, Relay};
use relaycord_core::config::{GeminiConfig, RelayConfig};

/// Discord bot that relays recent channel messages to Gemini and posts the reply.
#[derive(Debug, Parser)]
#[command(name = "relaycord", version)]
struct Cli {
    /// Path to relaycord.toml (default: $RELAYCORD_CONFIG, then ~/.relaycord/relaycord.toml)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "relaycord=info,relaycord_discord=info,relaycord_agent=info".into()
            }),
        )
        .init();

    let cli = Cli::parse();

    // config: --config > RELAYCORD_CONFIG env > ~/.relaycord/relaycord.toml
    let config_path = cli
        .config
        .or_else(|| std::env::var("RELAYCORD_CONFIG").ok());
    let config = RelayConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!(code = e.code(), "Config load failed ({}), using defaults", e);
        RelayConfig::default()
    });

    let completion = build_completion(&config.gemini);
    let relay = Arc::new(Relay::new(
        completion,
        RelaySettings::from_config(&config.discord),
    ));

    let adapter = relaycord_discord::DiscordAdapter::new(&config.discord, relay);
    info!("Discord bot starting");

    tokio::select! {
        res = adapter.run() => res?,
        _ = tokio::signal::ctrl_c() => info!("shutdown signal received"),
    }

    Ok(())
}

/// Build the Gemini-backed completion client from config.
fn build_completion(gemini: &GeminiConfig) -> CompletionClient {
    if gemini.api_key.is_empty() {
        warn!("No Gemini API key configured; every completion will fall back");
    }
    info!(model = %gemini.model, base_url = %gemini.base_url, "LLM provider: Gemini");

    let provider = GeminiProvider::new(gemini.api_key.clone(), gemini.base_url.clone());
    CompletionClient::new(Box::new(provider), gemini.model.clone())
        .with_max_tokens(gemini.max_output_tokens)
}
