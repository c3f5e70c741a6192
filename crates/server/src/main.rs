//! Simple test harness for the activity service.
//!
//! Loads the configured catalog and prints a few sample views so the
//! end-to-end path can be checked without the CLI.

use anyhow::{Context, Result};
use tracing::info;

use pipeline::WeatherQuery;
use server::{ActivityService, ServiceConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server=debug,pipeline=debug".into()),
        )
        .init();

    info!("Starting activity service test harness");

    let config = ServiceConfig::from_env().context("Reading configuration")?;
    info!(
        "Filter mode: {}, weather API: {}",
        config.filter_mode,
        if config.weather_api_key.is_some() {
            "configured"
        } else {
            "disabled"
        }
    );

    let service = ActivityService::from_config(&config).context("Loading catalog")?;

    let temperature = 21.0;
    let label = "soleado";
    info!("Recommendations for {}°C '{}'", temperature, label);
    let envelope = service.recommend(temperature, label, false).await?;
    for (i, activity) in envelope.recommendations.iter().enumerate() {
        info!(
            "{}. {} ({}) [{}, {}]°C",
            i + 1,
            activity.name,
            activity.kind,
            activity.temperature_min,
            activity.temperature_max
        );
    }
    info!(
        "{} perfect, {} compatible",
        envelope.all_activities.perfect.len(),
        envelope.all_activities.compatible.len()
    );

    let avoid = service
        .not_recommended(WeatherQuery::new(Some(temperature), Some(label)))
        .await?;
    info!("{} activities not recommended", avoid.count);

    let user = service.recommend_for_user("demo-user", temperature, label, true).await?;
    info!("demo-user: {} suitable activities", user.recommendations.len());

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}
