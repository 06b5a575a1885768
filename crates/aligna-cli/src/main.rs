use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use aligna_core::config::WidgetConfig;
use aligna_core::embed::EmbedVariant;

mod commands;

#[derive(Parser)]
#[command(name = "aligna")]
#[command(about = "Aligna chat widget - embed snippets and a terminal chat client", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/aligna/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render what a host page needs to embed the widget
    Embed {
        /// Bot id to embed
        #[arg(long)]
        bot_id: Option<String>,

        /// Loader variant: deferred or immediate
        #[arg(long, value_parser = clap::value_parser!(EmbedVariant))]
        variant: Option<EmbedVariant>,

        /// What to print
        #[arg(long, value_enum, default_value_t = commands::embed::EmbedFormat::Iframe)]
        format: commands::embed::EmbedFormat,

        /// Hosted widget page the iframe points at
        #[arg(long)]
        widget_url: Option<String>,

        /// Where host pages load the loader script from
        #[arg(long)]
        loader_url: Option<String>,
    },
    /// Chat with a bot from the terminal
    Chat {
        /// Bot id to talk to
        #[arg(long)]
        bot_id: String,

        /// Backend origin, e.g. http://localhost:8080
        #[arg(long)]
        backend: Option<String>,

        /// Pause before a reply is shown, in milliseconds
        #[arg(long)]
        reply_delay_ms: Option<u64>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<WidgetConfig> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "using config file");
            WidgetConfig::load_from(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => WidgetConfig::load().context("Failed to load ~/.config/aligna/config.toml"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = load_config(cli.config)?;

    match cli.command {
        Commands::Embed {
            bot_id,
            variant,
            format,
            widget_url,
            loader_url,
        } => {
            if let Some(url) = widget_url {
                config.widget_url = Some(url);
            }
            if let Some(url) = loader_url {
                config.loader_url = url;
            }
            let variant = variant.unwrap_or(config.embed_variant);
            commands::embed::run(&config, variant, bot_id, format)?;
        }
        Commands::Chat {
            bot_id,
            backend,
            reply_delay_ms,
        } => {
            if let Some(origin) = backend {
                config.backend_origin = origin;
            }
            if let Some(ms) = reply_delay_ms {
                config.reply_delay_ms = ms;
            }
            commands::chat::run(&config, bot_id).await?;
        }
    }

    Ok(())
}
