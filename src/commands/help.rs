use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::utils::get_cooldown_seconds;

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let embed = CreateEmbed::default()
        .title("📖 Stock Price Forecast Commands")
        .description("Charts historical prices and a model forecast for a stock ticker.")
        .color(0x00b0f4)
        .field(
            "📈 Forecast",
            "`$forecast [TICKER] [DAYS]` - Chart history + forecast (default AAPL, 30 days)\n\
             `$fc` - Short alias\n\
             `$forecast help` - Details and examples",
            false,
        )
        .field("🎯 General", "`$help` - Show this help message", false)
        .field(
            "⚡ Rate Limiting",
            format!("{}-second cooldown per command per user", get_cooldown_seconds()),
            false,
        );

    msg.channel_id
        .send_message(ctx, serenity::builder::CreateMessage::default().embed(embed))
        .await
        .map_err(|e| format!("Failed to send help message: {}", e))?;

    Ok(())
}
