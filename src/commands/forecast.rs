use serenity::all::{CreateAttachment, CreateEmbed, CreateEmbedFooter, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::api::forecast::ApiError;
use crate::models::{ForecastResult, SeriesType};
use crate::services::chart_service::{self, ChartSpec};
use crate::services::forecast_service::{
    self, ForecastQuery, QueryError, DEFAULT_PERIODS, DEFAULT_TICKER, FETCH_ERROR_MESSAGE, MAX_PERIODS, MIN_PERIODS,
};
use crate::utils::{Align, Table};

const USAGE: &str = "`$forecast [TICKER] [DAYS]`";

/// Turn command arguments into a query, filling in defaults
pub fn parse_query(args: &[&str]) -> Result<ForecastQuery, QueryError> {
    match args {
        [] => Ok(ForecastQuery::default()),
        [ticker] => ForecastQuery::new(ticker, DEFAULT_PERIODS as i64),
        [ticker, days] => ForecastQuery::new(ticker, forecast_service::parse_periods(days)?),
        [_, _, _, ..] => Err(QueryError::TooManyArguments),
    }
}

/// What a finished request turns into in the channel
#[derive(Debug)]
pub enum ForecastReply {
    /// Any backend failure; the text never varies with the cause
    Failed(&'static str),
    /// Request succeeded but both series came back empty
    NoData(String),
    Chart(ForecastResult),
}

/// Decide the reply for a forecast request outcome, logging failures
pub fn reply_for(query: &ForecastQuery, outcome: Result<ForecastResult, ApiError>) -> ForecastReply {
    match outcome {
        Ok(result) if result.is_empty() => {
            tracing::warn!("Forecast service returned no points for {}", query.ticker);
            ForecastReply::NoData(format!("No data returned for {}.", query.ticker))
        }
        Ok(result) => ForecastReply::Chart(result),
        Err(e) => {
            let origin = if e.is_server_error() {
                "server"
            } else if e.is_client_error() {
                "client"
            } else {
                "transport"
            };
            tracing::warn!(
                "Forecast request for {} ({} days) failed with {} error (status: {:?}): {}",
                query.ticker,
                query.periods,
                origin,
                e.status_code(),
                e
            );
            ForecastReply::Failed(FETCH_ERROR_MESSAGE)
        }
    }
}

/// Attachment file stem, limited to characters Discord keeps in filenames
pub fn attachment_stem(query: &ForecastQuery) -> String {
    let ticker: String = query
        .ticker
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("forecast_{}_{}d", ticker, query.periods)
}

/// Code-block summary of each series shown in the chart embed
pub fn summary_table(result: &ForecastResult) -> String {
    let mut table = Table::new(&["Series", "Points", "From", "To", "Last"])
        .align(1, Align::Right)
        .align(4, Align::Right);

    for series_type in SeriesType::ALL {
        if let Some(summary) = result.summary(series_type) {
            table.add_row([
                summary.series_type.to_string(),
                summary.points.to_string(),
                summary.first_date.format(chart_service::DATE_FORMAT).to_string(),
                summary.last_date.format(chart_service::DATE_FORMAT).to_string(),
                format!("{:.2}", summary.last_value),
            ]);
        }
    }

    table.render()
}

fn help_embed() -> CreateEmbed {
    CreateEmbed::default()
        .title("📈 Stock Price Forecast")
        .description("Fetch historical prices and a forecast for a stock ticker and chart both series")
        .field("Usage", format!("{}\n`$forecast help`", USAGE), false)
        .field(
            "Defaults",
            format!(
                "Ticker: **{}**\nDays: **{}** (allowed {}-{})",
                DEFAULT_TICKER, DEFAULT_PERIODS, MIN_PERIODS, MAX_PERIODS
            ),
            false,
        )
        .field(
            "Examples",
            "`$forecast` (AAPL, 30 days)\n\
             `$forecast MSFT` (30 days)\n\
             `$forecast TSLA 90`\n\
             `$fc NVDA 365`",
            false,
        )
        .field(
            "Output",
            "• PNG chart: historical in blue, forecast in orange\n\
             • `.vl.json` Vega-Lite spec with tooltips and pan/zoom\n\
             • Per-series summary table",
            false,
        )
        .color(0x00aaff)
}

async fn send_error(ctx: &Context, msg: &Message, description: &str) -> Result<(), String> {
    let embed = CreateEmbed::default()
        .title("❌ Error")
        .description(description)
        .color(0xff0000);

    msg.channel_id
        .send_message(ctx, CreateMessage::default().embed(embed))
        .await
        .map_err(|e| e.to_string())?;
    Ok(())
}

pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    tracing::info!("📈 Forecast command from user {} with args: {:?}", msg.author.id, args);

    if args.first().is_some_and(|a| a.eq_ignore_ascii_case("help")) {
        msg.channel_id
            .send_message(ctx, CreateMessage::default().embed(help_embed()))
            .await
            .map_err(|e| e.to_string())?;
        return Ok(());
    }

    let query = match parse_query(args) {
        Ok(query) => query,
        Err(e) => {
            tracing::warn!("Rejected forecast arguments {:?}: {}", args, e);
            return send_error(ctx, msg, &format!("{}\nUsage: {}", e, USAGE)).await;
        }
    };

    let (client, chart_size) = {
        let data = ctx.data.read().await;
        let client = data
            .get::<crate::ForecastApi>()
            .ok_or("Forecast client not initialized".to_string())?
            .clone();
        let chart_size = *data
            .get::<crate::ChartSettings>()
            .ok_or("Chart settings not initialized".to_string())?;
        (client, chart_size)
    };

    // Loading: typing indicator while the request is in flight
    if let Err(e) = msg.channel_id.broadcast_typing(&ctx.http).await {
        tracing::warn!("Failed to broadcast typing: {}", e);
    }

    let outcome = forecast_service::request_forecast(&client, &query).await;
    let result = match reply_for(&query, outcome) {
        ForecastReply::Chart(result) => result,
        ForecastReply::Failed(text) => return send_error(ctx, msg, text).await,
        ForecastReply::NoData(text) => return send_error(ctx, msg, &text).await,
    };

    let spec = ChartSpec::for_ticker(&result.ticker, chart_size.width, chart_size.height);
    let vega = chart_service::vega_lite_spec(&spec, &result.rows);
    let vega_bytes = serde_json::to_vec_pretty(&vega).map_err(|e| {
        tracing::error!("Failed to serialize chart spec: {}", e);
        format!("Failed to build chart: {}", e)
    })?;

    let png = chart_service::generate_chart(spec.clone(), result.rows.clone())
        .await
        .map_err(|e| {
            tracing::error!("Chart generation error for {}: {}", result.ticker, e);
            e.to_string()
        })?;
    tracing::info!("✓ Chart generated for {}: {} bytes", result.ticker, png.len());

    let stem = attachment_stem(&query);
    let png_name = format!("{}.png", stem);
    let vega_name = format!("{}.vl.json", stem);

    let embed = CreateEmbed::default()
        .title(&spec.title)
        .description(summary_table(&result))
        .image(format!("attachment://{}", png_name))
        .footer(CreateEmbedFooter::new(format!(
            "{}-day horizon • open {} in a Vega viewer for tooltips and zoom",
            result.periods, vega_name
        )))
        .color(0x1f77b4);

    let message = CreateMessage::default()
        .embed(embed)
        .add_file(CreateAttachment::bytes(png, png_name))
        .add_file(CreateAttachment::bytes(vega_bytes, vega_name));

    msg.channel_id.send_message(ctx, message).await.map_err(|e| {
        tracing::error!("Failed to send chart: {}", e);
        format!("Failed to send chart: {}", e)
    })?;

    tracing::info!("✓ Forecast chart sent for {} ({} rows)", result.ticker, result.rows.len());
    Ok(())
}
