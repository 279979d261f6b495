use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod commands;
mod config;
mod models;
mod services;
mod utils;

use api::forecast::ForecastClient;
use config::{ChartSize, Config};

struct Handler {
    forecast_api_url: String,
}

/// Shared client for the forecasting service
struct ForecastApi;

impl TypeMapKey for ForecastApi {
    type Value = ForecastClient;
}

struct ChartSettings;

impl TypeMapKey for ChartSettings {
    type Value = ChartSize;
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        commands::handle_message(&ctx, &msg).await;
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);
        info!("Forecasts served from {}", self.forecast_api_url);
    }
}

fn init_tracing() {
    let mut filter = EnvFilter::from_default_env();
    for directive in ["stock_forecast_bot=debug", "serenity=warn"] {
        match directive.parse() {
            Ok(d) => filter = filter.add_directive(d),
            Err(e) => eprintln!("Ignoring log directive {}: {}", directive, e),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    info!("📈 Starting stock forecast bot...");

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    let forecast_client = ForecastClient::with_base_url(config.forecast_api_url.clone());
    info!(
        "Forecast endpoint: {}/forecast, chart size {}x{}",
        forecast_client.base_url(),
        config.chart_size.width,
        config.chart_size.height
    );

    let intents = GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGES;

    let handler = Handler {
        forecast_api_url: forecast_client.base_url().to_string(),
    };

    let mut client = match Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
    {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create client: {}", e);
            return;
        }
    };

    {
        let mut data = client.data.write().await;
        data.insert::<ForecastApi>(forecast_client);
        data.insert::<ChartSettings>(config.chart_size);
    }

    if let Err(e) = client.start().await {
        error!("Client error: {}", e);
    }
}
