mod api;
mod gateway;
mod reply;

use clap::{Parser, Subcommand};
use recepta_channels::ZapiChannel;
use recepta_core::{config, context::Context, prompt, traits::Provider};
use recepta_providers::OpenAiProvider;
use std::sync::Arc;
use tracing::warn;

#[derive(Parser)]
#[command(
    name = "recepta",
    version,
    about = "Recepta — WhatsApp receptionist relay"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook relay server.
    Start,
    /// Check configuration and provider availability.
    Status,
    /// Send a one-shot message through the receptionist prompt.
    Ask {
        /// The message to send.
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Start => {
            let cfg = config::load(&cli.config)?;
            let system_prompt = prompt::load(&cfg.agent.prompt_path);

            if cfg.provider.openai.api_key.is_empty() {
                warn!(
                    "OpenAI API key is empty; completions will fail and every \
                     reply will be the canned fallback. Set OPENAI_API_KEY."
                );
            }
            if cfg.channel.zapi.instance_id.is_empty() || cfg.channel.zapi.token.is_empty() {
                warn!(
                    "Z-API credentials are incomplete; outbound sends will fail. \
                     Set ZAPI_INSTANCE_ID and ZAPI_TOKEN."
                );
            }

            let provider = Arc::new(OpenAiProvider::from_config(&cfg.provider.openai)?);
            let channel = Arc::new(ZapiChannel::from_config(&cfg.channel.zapi)?);

            let gw = Arc::new(gateway::Gateway::new(provider, channel, system_prompt));
            api::serve(&cfg.api, gw).await?;
        }
        Commands::Status => {
            let cfg = config::load(&cli.config)?;
            println!("Recepta — Status Check\n");
            println!("Config: {}", cli.config);
            println!("Model: {}", cfg.provider.openai.model);
            println!(
                "OpenAI key: {}",
                if cfg.provider.openai.api_key.is_empty() {
                    "missing"
                } else {
                    "set"
                }
            );
            println!(
                "Z-API credentials: {}",
                if cfg.channel.zapi.instance_id.is_empty() || cfg.channel.zapi.token.is_empty() {
                    "incomplete"
                } else {
                    "set"
                }
            );
            println!(
                "Verify token: {}",
                if cfg.api.verify_token.is_empty() {
                    "missing"
                } else {
                    "set"
                }
            );
            println!();

            let provider = OpenAiProvider::from_config(&cfg.provider.openai)?;
            let available = provider.is_available().await;
            println!(
                "  {}: {}",
                provider.name(),
                if available { "available" } else { "unreachable" }
            );
        }
        Commands::Ask { message } => {
            if message.is_empty() {
                anyhow::bail!("no message provided. Usage: recepta ask <message>");
            }

            let text = message.join(" ");
            let cfg = config::load(&cli.config)?;
            let system_prompt = prompt::load(&cfg.agent.prompt_path);
            let provider = OpenAiProvider::from_config(&cfg.provider.openai)?;

            let context = Context::new(
                system_prompt,
                format!("{}\n{text}", prompt::USER_MESSAGE_PREFIX),
            );
            let raw = provider.complete(&context).await?;
            let parsed = reply::parse_reply(&raw);

            if parsed.message.is_empty() {
                println!("(no reply block)\n\nRaw response:\n{raw}");
            } else {
                println!("{}", parsed.message);
                println!("\nAction: {}", serde_json::to_string(&parsed.action)?);
            }
        }
    }

    Ok(())
}
