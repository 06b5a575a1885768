use anyhow::{Context, Result};
use clap::ValueEnum;

use aligna_core::{AlignaError, BotId};
use aligna_core::config::WidgetConfig;
use aligna_core::embed::{self, BOT_ID_ATTRIBUTE, EmbedLoader, EmbedVariant, ScriptAttributes};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EmbedFormat {
    /// The iframe the loader appends to the host page
    Iframe,
    /// The loader script itself
    Script,
    /// The script tag host pages paste in
    Tag,
}

pub fn run(
    config: &WidgetConfig,
    variant: EmbedVariant,
    bot_id: Option<String>,
    format: EmbedFormat,
) -> Result<()> {
    let mut attributes = ScriptAttributes::new().with("src", config.loader_url.clone());
    if let Some(id) = &bot_id {
        attributes = attributes.with(BOT_ID_ATTRIBUTE, id.clone());
    }

    let loader = EmbedLoader::from_attributes(variant, &attributes)
        .with_widget_url(config.widget_url_for(variant));

    match format {
        EmbedFormat::Iframe => match loader.iframe()? {
            Some(iframe) => println!("{}", iframe.to_html()),
            None => eprintln!(
                "The {} loader creates no iframe without --bot-id.",
                loader.variant()
            ),
        },
        EmbedFormat::Script => {
            print!("{}", loader.loader_script()?);
        }
        EmbedFormat::Tag => {
            let bot_id = bot_id
                .map(BotId::new)
                .ok_or(AlignaError::MissingBotId)
                .context("--bot-id is required to render the script tag")?;
            println!("{}", embed::script_tag(&config.loader_url, &bot_id));
        }
    }

    Ok(())
}
