use tracing::info;

use super::say_private;
use crate::docs::{MAX_SEARCH_LIMIT, MIN_SEARCH_LIMIT};
use crate::llm::validate_api_key;
use crate::session::Action;
use crate::state::{Context, KbConfig};

const DEFAULT_TEST_QUERY: &str = "Hello, this is a test query to verify API key functionality.";

/// Apply one admin setting. Returns the confirmation or the reason it was refused.
pub(crate) fn apply_setting(config: &mut KbConfig, param: &str, value: u64) -> Result<String, String> {
    match param {
        "timeout_ms" => {
            if value == 0 {
                return Err("`timeout_ms` must be greater than 0".to_string());
            }
            config.timeout_ms = value;
            Ok(format!("`timeout_ms` set to {}", value))
        }
        "search_limit" => {
            let limit = (value.min(u32::MAX as u64) as u32).clamp(MIN_SEARCH_LIMIT, MAX_SEARCH_LIMIT);
            config.search_limit = limit;
            Ok(format!("`search_limit` set to {}", limit))
        }
        _ => Err(format!(
            "Unknown param `{}`. Valid: `timeout_ms`, `search_limit`",
            param
        )),
    }
}

/// Set your Gemini API key (only you see the reply)
#[poise::command(slash_command, guild_only)]
pub async fn key(
    ctx: Context<'_>,
    #[description = "Gemini API key"] value: String,
    #[description = "Send a test request with the key"] test: Option<bool>,
    #[description = "Text for the test request"] test_query: Option<String>,
) -> Result<(), anyhow::Error> {
    let value = value.trim().to_string();
    if !validate_api_key(&value) {
        say_private(
            &ctx,
            "Invalid API key format. Keys start with \"AIza\" and are longer than 30 characters.",
        )
        .await?;
        return Ok(());
    }

    if test.unwrap_or(false) {
        ctx.defer_ephemeral().await?;
        let text = test_query
            .filter(|q| !q.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TEST_QUERY.to_string());
        let probe = ctx.data().llm.probe(&value, &text).await;
        info!(user = %ctx.author().name, ok = probe.ok, "api key probe");
        if !probe.ok {
            say_private(&ctx, format!("{}\nThe key was not saved.", probe.message)).await?;
            return Ok(());
        }
        let session = ctx
            .data()
            .dispatch(ctx.author().id.get(), Action::SetApiKey(value))
            .await;
        say_private(&ctx, format!("{}\n{}", probe.message, session.status)).await?;
        return Ok(());
    }

    let session = ctx
        .data()
        .dispatch(ctx.author().id.get(), Action::SetApiKey(value))
        .await;
    say_private(&ctx, session.status).await
}

/// Configure assistant settings (admin only)
#[poise::command(slash_command, guild_only)]
pub async fn config(
    ctx: Context<'_>,
    #[description = "timeout_ms | search_limit"] param: Option<String>,
    #[description = "New value"] value: Option<u64>,
) -> Result<(), anyhow::Error> {
    let user_id = ctx.author().id.get();
    if !ctx.data().is_admin(user_id) {
        ctx.say("This command is admin-only.").await?;
        return Ok(());
    }

    match (param.as_deref(), value) {
        (None, _) => {
            let config = ctx.data().kb_config.read().await;
            ctx.say(format!(
                "**Assistant Configuration:**\n\
                 `timeout_ms`: {}\n\
                 `search_limit`: {}",
                config.timeout_ms, config.search_limit
            ))
            .await?;
        }
        (Some(key), Some(val)) => {
            let result = {
                let mut config = ctx.data().kb_config.write().await;
                apply_setting(&mut config, key, val)
            };
            match result {
                Ok(message) => {
                    info!(user = %ctx.author().name, param = key, value = val, "config updated");
                    ctx.say(message).await?;
                }
                Err(message) => {
                    ctx.say(message).await?;
                }
            }
        }
        (Some(_), None) => {
            ctx.say("Provide both `param` and `value`. Example: `/kb config timeout_ms 15000`")
                .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_timeout() {
        let mut config = KbConfig::default();
        assert!(apply_setting(&mut config, "timeout_ms", 0).is_err());
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(
            apply_setting(&mut config, "timeout_ms", 2500),
            Ok("`timeout_ms` set to 2500".to_string())
        );
        assert_eq!(config.timeout_ms, 2500);
    }

    #[test]
    fn test_search_limit_is_clamped() {
        let mut config = KbConfig::default();
        apply_setting(&mut config, "search_limit", 3).unwrap();
        assert_eq!(config.search_limit, MIN_SEARCH_LIMIT);
        apply_setting(&mut config, "search_limit", 500).unwrap();
        assert_eq!(config.search_limit, MAX_SEARCH_LIMIT);
        apply_setting(&mut config, "search_limit", 15).unwrap();
        assert_eq!(config.search_limit, 15);
    }

    #[test]
    fn test_unknown_param() {
        let mut config = KbConfig::default();
        let err = apply_setting(&mut config, "max_iterations", 5).unwrap_err();
        assert!(err.contains("timeout_ms"));
    }
}
