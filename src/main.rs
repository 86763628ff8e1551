mod answer;
mod commands;
mod docs;
mod error;
mod llm;
mod session;
mod state;

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use poise::{Framework, FrameworkOptions};
use tracing::{error, info, Level};

use answer::{Category, CompletionService};
use docs::DocumentSearch;
use llm::GeminiClient;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    // Load env
    let _ = dotenv::dotenv();
    let token = dotenv::var("DISCORD_TOKEN").context("DISCORD_TOKEN required")?;
    let guild_id: Option<serenity::GuildId> = dotenv::var("DISCORD_GUILD_ID")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(serenity::GuildId::new);

    let llm_client = Arc::new(GeminiClient::from_env()?);
    info!("Gemini client initialized");

    let completion = Arc::new(CompletionService::new(llm_client.clone()));

    let search = Arc::new(DocumentSearch::from_env()?);
    info!(base_url = search.base_url(), "Knowledge base client initialized");

    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    // Parse admin user IDs from env
    let admin_ids: HashSet<u64> = dotenv::var("ADMIN_USER_IDS")
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse::<u64>().ok())
        .collect();
    if !admin_ids.is_empty() {
        info!(count = admin_ids.len(), "Admin users configured");
    }

    let default_category = dotenv::var("KB_DEFAULT_CATEGORY")
        .map(|name| Category::parse_lenient(&name))
        .unwrap_or_default();
    info!(category = default_category.as_str(), "Default category");

    let app_state = AppState::new(llm_client, completion, search, http, admin_ids)
        .with_default_category(default_category);

    let intents = serenity::GatewayIntents::GUILDS | serenity::GatewayIntents::GUILD_MESSAGES;

    let framework = Framework::builder()
        .options(FrameworkOptions {
            commands: vec![commands::kb()],
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot connected as: {} ({})", ready.user.name, ready.user.id);

                let commands = &framework.options().commands;
                for cmd in commands {
                    info!("  /{} ({} subcommands)", cmd.name, cmd.subcommands.len());
                    for sub in &cmd.subcommands {
                        info!("    /{} {}", cmd.name, sub.name);
                    }
                }

                if let Some(gid) = guild_id {
                    info!("Registering to guild {} (instant)", gid);
                    poise::builtins::register_in_guild(ctx, &framework.options().commands, gid)
                        .await?;
                } else {
                    info!("Registering globally (up to 1 hour delay)");
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                }

                Ok(app_state)
            })
        })
        .build();

    info!("Starting knowledge base assistant...");

    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    if let Err(e) = client.start().await {
        error!("Client error: {}", e);
    }

    Ok(())
}
