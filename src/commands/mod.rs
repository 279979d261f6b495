pub mod forecast;
pub mod help;

use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::utils::check_cooldown;

/// Map a chat token to the canonical command name, if it is one of ours
fn command_name(token: &str) -> Option<&'static str> {
    match token {
        "$forecast" | "$fc" => Some("$forecast"),
        "$help" => Some("$help"),
        _ => None,
    }
}

pub async fn handle_message(ctx: &Context, msg: &Message) {
    if msg.author.bot {
        return;
    }

    let parts: Vec<&str> = msg.content.split_whitespace().collect();
    let Some((&token, args)) = parts.split_first() else {
        return;
    };
    let Some(command) = command_name(token) else {
        return;
    };

    // Aliases share a cooldown
    if let Err(cooldown) = check_cooldown(msg.author.id, command).await {
        if cooldown.should_warn {
            let embed = CreateEmbed::default()
                .title("Command Cooldown")
                .description(format!(
                    "⏳ Please wait {} seconds before using this command again.",
                    cooldown.remaining_secs
                ))
                .color(0xffa500);
            let _ = msg.channel_id
                .send_message(ctx, CreateMessage::default().embed(embed))
                .await;
        }
        return;
    }

    let result = match command {
        "$forecast" => forecast::execute(ctx, msg, args).await,
        "$help" => help::execute(ctx, msg).await,
        _ => return,
    };

    if let Err(e) = result {
        tracing::error!("❌ Error executing command {}: {}", command, e);

        let user_message = if e.contains("429") || e.contains("rate limit") {
            "⚠️ **Rate Limited**: Discord is rate limiting us. Please try again in a moment.".to_string()
        } else if e.contains("HTTP request") {
            "⚠️ **Network Error**: Having trouble connecting to Discord. Please try again.".to_string()
        } else if !e.is_empty() {
            format!("❌ {}", e)
        } else {
            "❌ An error occurred while executing the command.".to_string()
        };

        let embed = CreateEmbed::default()
            .title("Command Error")
            .description(user_message)
            .color(0xff0000);

        let _ = msg.channel_id
            .send_message(ctx, CreateMessage::default().embed(embed))
            .await;
    }
}
