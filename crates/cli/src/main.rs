use anyhow::{bail, Context, Result};
use catalog::{Activity, ActivityId, ActivityKind, Sky, WeatherPreference};
use clap::{Parser, Subcommand};
use colored::Colorize;
use pipeline::{FilterMode, WeatherQuery};
use serde::Serialize;
use server::envelope::{
    ActivitySource, PreferencesEnvelope, RecommendEnvelope, UserRecommendEnvelope,
};
use server::{ActivityService, ErrorEnvelope, ServiceConfig, ServiceError};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

/// Activity Recs - weather-driven activity recommendations
#[derive(Parser)]
#[command(name = "activity-recs")]
#[command(about = "Suggest activities that suit the current weather", long_about = None)]
struct Cli {
    /// Catalog directory (overrides ACTIVITY_DATA_DIR)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// How partial weather filters are treated: independent or both
    /// (overrides ACTIVITY_FILTER_MODE)
    #[arg(short, long)]
    mode: Option<FilterMode>,

    /// Print the raw JSON envelope instead of formatted output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog activities
    List {
        /// Only show indoor or outdoor activities
        #[arg(long, value_parser = parse_kind)]
        kind: Option<ActivityKind>,
    },

    /// Show a single activity
    Show {
        #[arg(long)]
        id: ActivityId,
    },

    /// Filter activities by temperature and/or sky label
    Filter {
        #[arg(short, long, allow_negative_numbers = true)]
        temperature: Option<f64>,

        /// Sky label, e.g. "sunny", "nublado", "Rain"
        #[arg(short, long)]
        sky: Option<String>,

        #[arg(long, value_parser = parse_kind)]
        kind: Option<ActivityKind>,
    },

    /// Recommend activities for a temperature and sky label
    Recommend {
        #[arg(short, long, allow_negative_numbers = true)]
        temperature: f64,

        #[arg(short, long)]
        sky: String,

        /// Include compatible activities, not just perfect matches
        #[arg(long)]
        all: bool,
    },

    /// Activities to avoid in the given weather
    NotRecommended {
        #[arg(short, long, allow_negative_numbers = true)]
        temperature: Option<f64>,

        #[arg(short, long)]
        sky: Option<String>,
    },

    /// Show a user's activity preferences
    Preferences {
        #[arg(long)]
        user: String,
    },

    /// Filter a user's preferences by temperature and/or sky label
    UserFilter {
        #[arg(long)]
        user: String,

        #[arg(short, long, allow_negative_numbers = true)]
        temperature: Option<f64>,

        #[arg(short, long)]
        sky: Option<String>,
    },

    /// A user's preferred activities to avoid in the given weather
    UserNotRecommended {
        #[arg(long)]
        user: String,

        #[arg(short, long, allow_negative_numbers = true)]
        temperature: Option<f64>,

        #[arg(short, long)]
        sky: Option<String>,
    },

    /// Recommend from a user's preferences and personal activities
    UserRecommend {
        #[arg(long)]
        user: String,

        #[arg(short, long, allow_negative_numbers = true)]
        temperature: f64,

        #[arg(short, long)]
        sky: String,

        #[arg(long)]
        all: bool,
    },

    /// Show a user's personal activities
    Personal {
        #[arg(long)]
        user: String,
    },

    /// Show the forecast for a location
    Forecast {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Aggregate per day instead of the next hours
        #[arg(long)]
        daily: bool,
    },

    /// Recommend activities for the weather at a location right now
    Now {
        #[arg(long, allow_negative_numbers = true, requires = "lon", conflicts_with = "city")]
        lat: Option<f64>,

        #[arg(long, allow_negative_numbers = true, requires = "lat")]
        lon: Option<f64>,

        /// Look the location up by city name instead of coordinates
        #[arg(long, required_unless_present = "lat")]
        city: Option<String>,

        #[arg(long)]
        all: bool,
    },

    /// Search known cities by name, or show one city's coordinates
    Cities {
        /// Part of a city name
        #[arg(long)]
        name: String,

        /// Treat the name as exact and print its coordinates
        #[arg(long)]
        exact: bool,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "1000")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

fn parse_kind(s: &str) -> std::result::Result<ActivityKind, String> {
    catalog::parser::parse_kind(s).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    match run(cli).await {
        Ok(()) => Ok(()),
        Err(err) => match err.downcast_ref::<ServiceError>() {
            Some(service_err) => {
                if json {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&ErrorEnvelope::from(service_err))?
                    );
                } else {
                    eprintln!(
                        "{} {} (status {})",
                        "✗".red(),
                        service_err,
                        service_err.status_code()
                    );
                }
                std::process::exit(1);
            }
            None => Err(err),
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ServiceConfig::from_env().context("Failed to read configuration")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(mode) = cli.mode {
        config.filter_mode = mode;
    }

    let start = Instant::now();
    let service = ActivityService::from_config(&config)?;
    if !cli.json {
        println!(
            "{} Loaded catalog from {} in {:?} (filter mode: {})",
            "✓".green(),
            config.data_dir.display(),
            start.elapsed(),
            config.filter_mode
        );
    }

    let json = cli.json;
    match cli.command {
        Commands::List { kind } => {
            let envelope = match kind {
                Some(kind) => service.list_activities_of_kind(kind).await?,
                None => service.list_activities().await,
            };
            emit(json, &envelope, || {
                print_activities(&envelope.message, &envelope.activities)
            })?
        }
        Commands::Show { id } => {
            let envelope = service.get_activity(id).await?;
            emit(json, &envelope, || {
                print_activities(&envelope.message, std::slice::from_ref(&envelope.activity))
            })?
        }
        Commands::Filter {
            temperature,
            sky,
            kind,
        } => {
            let query = WeatherQuery::new(temperature, sky.as_deref());
            let envelope = service.filter_activities(query, kind).await?;
            emit(json, &envelope, || {
                print_activities(&envelope.message, &envelope.activities)
            })?
        }
        Commands::Recommend {
            temperature,
            sky,
            all,
        } => {
            let envelope = service.recommend(temperature, &sky, all).await?;
            emit(json, &envelope, || print_recommendation(&envelope))?
        }
        Commands::NotRecommended { temperature, sky } => {
            let query = WeatherQuery::new(temperature, sky.as_deref());
            let envelope = service.not_recommended(query).await?;
            emit(json, &envelope, || {
                print_activities(&envelope.message, &envelope.activities)
            })?
        }
        Commands::Preferences { user } => {
            let envelope = service.user_preferences(&user).await?;
            emit(json, &envelope, || print_preferences(&envelope))?
        }
        Commands::UserFilter {
            user,
            temperature,
            sky,
        } => {
            let query = WeatherQuery::new(temperature, sky.as_deref());
            let envelope = service.filter_user_preferences(&user, query).await?;
            emit(json, &envelope, || print_preferences(&envelope))?
        }
        Commands::UserNotRecommended {
            user,
            temperature,
            sky,
        } => {
            let query = WeatherQuery::new(temperature, sky.as_deref());
            let envelope = service.not_recommended_for_user(&user, query).await?;
            emit(json, &envelope, || print_preferences(&envelope))?
        }
        Commands::UserRecommend {
            user,
            temperature,
            sky,
            all,
        } => {
            let envelope = service
                .recommend_for_user(&user, temperature, &sky, all)
                .await?;
            emit(json, &envelope, || print_user_recommendation(&envelope))?
        }
        Commands::Personal { user } => {
            let envelope = service.personal_activities(&user).await?;
            emit(json, &envelope, || {
                let activities: Vec<Activity> = envelope
                    .activities
                    .iter()
                    .map(|p| p.activity.clone())
                    .collect();
                print_activities(&envelope.message, &activities)
            })?
        }
        Commands::Forecast { lat, lon, daily } => {
            if daily {
                let envelope = service.daily_forecast(lat, lon).await?;
                emit(json, &envelope, || {
                    println!("{}", envelope.message.bold().blue());
                    for day in &envelope.days {
                        println!(
                            "{}  {:>5.1}°C / {:>5.1}°C  {} ({:?})",
                            day.date.green(),
                            day.temperature_min,
                            day.temperature_max,
                            day.label,
                            day.sky
                        );
                    }
                })?
            } else {
                let envelope = service.hourly_forecast(lat, lon).await?;
                emit(json, &envelope, || {
                    println!("{}", envelope.message.bold().blue());
                    for entry in &envelope.entries {
                        println!(
                            "{}  {:>5.1}°C  {}",
                            entry.dt_txt.green(),
                            entry.main.temp,
                            entry.label().unwrap_or("-")
                        );
                    }
                })?
            }
        }
        Commands::Now {
            lat,
            lon,
            city,
            all,
        } => {
            let envelope = match (lat, lon, city) {
                (Some(lat), Some(lon), _) => service.recommend_now(lat, lon, all).await?,
                (_, _, Some(city)) => service.recommend_now_in_city(&city, all).await?,
                _ => bail!("either --lat and --lon or --city is required"),
            };
            emit(json, &envelope, || print_recommendation(&envelope))?
        }
        Commands::Cities { name, exact } => {
            if exact {
                let envelope = service.coordinates(&name).await?;
                emit(json, &envelope, || {
                    println!("{}", envelope.message.bold().blue());
                    println!(
                        "{} ({})  {:.4}, {:.4}",
                        envelope.city.bold(),
                        envelope.country,
                        envelope.latitude,
                        envelope.longitude
                    );
                })?
            } else {
                let envelope = service.cities(&name).await?;
                emit(json, &envelope, || {
                    println!("{}", envelope.message.bold().blue());
                    if envelope.cities.is_empty() {
                        println!("  {}", "(none)".dimmed());
                    }
                    for (i, city) in envelope.cities.iter().enumerate() {
                        println!(
                            "{}. {} ({})  {:.4}, {:.4}",
                            (i + 1).to_string().green(),
                            city.name.bold(),
                            city.country,
                            city.latitude,
                            city.longitude
                        );
                    }
                })?
            }
        }
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(service, requests, concurrent).await?,
    }

    Ok(())
}

/// Print either the raw envelope or the formatted view.
fn emit<T: Serialize>(json: bool, envelope: &T, pretty: impl FnOnce()) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(envelope)?);
    } else {
        pretty();
    }
    Ok(())
}

fn describe_preference(preference: &WeatherPreference) -> String {
    match preference {
        WeatherPreference::Flags(flags) => {
            let skies: Vec<&str> = Sky::ALL
                .iter()
                .filter(|sky| flags.prefers(**sky))
                .map(|sky| sky.as_str())
                .collect();
            if skies.is_empty() {
                "any sky".to_string()
            } else {
                skies.join(", ")
            }
        }
        WeatherPreference::Declared { sky } => format!("{} only", sky),
    }
}

fn print_activity_line(rank: usize, activity: &Activity) {
    println!(
        "{}. {} ({}) [{}, {}]°C - {}",
        rank.to_string().green(),
        activity.name.bold(),
        activity.kind,
        activity.temperature_min,
        activity.temperature_max,
        describe_preference(&activity.preference)
    );
    if !activity.description.is_empty() {
        println!("   {}", activity.description.dimmed());
    }
}

fn print_activities(header: &str, activities: &[Activity]) {
    println!("{}", header.bold().blue());
    if activities.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for (i, activity) in activities.iter().enumerate() {
        print_activity_line(i + 1, activity);
    }
}

fn print_recommendation(envelope: &RecommendEnvelope) {
    println!(
        "{} for {}°C, '{}' ({:?})",
        envelope.message.bold().blue(),
        envelope.conditions.temperature,
        envelope.conditions.sky,
        envelope.conditions.normalized_sky
    );
    for (i, activity) in envelope.recommendations.iter().enumerate() {
        print_activity_line(i + 1, activity);
    }
    println!(
        "{} perfect, {} compatible, {} total",
        envelope.all_activities.perfect.len().to_string().green(),
        envelope.all_activities.compatible.len().to_string().yellow(),
        envelope.total
    );
}

fn print_user_recommendation(envelope: &UserRecommendEnvelope) {
    println!(
        "{} for {} at {}°C, '{}' ({:?})",
        envelope.message.bold().blue(),
        envelope.user_id.cyan(),
        envelope.conditions.temperature,
        envelope.conditions.sky,
        envelope.conditions.normalized_sky
    );
    for (i, entry) in envelope.recommendations.iter().enumerate() {
        print_activity_line(i + 1, &entry.activity);
        if entry.source == ActivitySource::Personal {
            println!("   {}", "(personal)".magenta());
        }
    }
    println!(
        "{} perfect, {} compatible, {} total",
        envelope.all_activities.perfect.len().to_string().green(),
        envelope.all_activities.compatible.len().to_string().yellow(),
        envelope.total
    );
}

fn print_preferences(envelope: &PreferencesEnvelope) {
    println!(
        "{} ({})",
        envelope.message.bold().blue(),
        envelope.user_id.cyan()
    );
    if envelope.preferences.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for (i, row) in envelope.preferences.iter().enumerate() {
        println!(
            "{}. {} [{}, {}]°C - {} {}",
            (i + 1).to_string().green(),
            row.activity.name.bold(),
            row.preference.temperature_min,
            row.preference.temperature_max,
            describe_preference(&row.activity.preference),
            format!("(preference #{})", row.preference.id).dimmed()
        );
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    service: ActivityService,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if requests == 0 || concurrent == 0 {
        bail!("requests and concurrent must both be greater than zero");
    }

    const LABELS: [&str; 8] = [
        "sunny", "soleado", "Clouds", "nublado", "rain", "lluvia", "foggy", "Clear",
    ];

    // Random weather for each request
    let queries: Vec<(f64, &'static str)> = (0..requests)
        .map(|_| {
            let temperature = rand::random::<f64>() * 50.0 - 10.0;
            let label = LABELS[rand::random::<u32>() as usize % LABELS.len()];
            (temperature, label)
        })
        .collect();

    info!(requests, concurrent, "starting benchmark");
    let limit = Arc::new(Semaphore::new(concurrent));
    let wall_clock = Instant::now();

    let mut handles = Vec::with_capacity(requests);
    for (temperature, label) in queries {
        let service = service.clone();
        let limit = limit.clone();
        handles.push(tokio::spawn(async move {
            let _permit = limit.acquire_owned().await?;
            let start = Instant::now();
            service.recommend(temperature, label, true).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    for handle in handles {
        timings.push(handle.await??);
    }
    let elapsed = wall_clock.elapsed();

    timings.sort();
    let busy: Duration = timings.iter().sum();
    let avg_latency = busy / timings.len() as u32;
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f64 / elapsed.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", elapsed);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}
