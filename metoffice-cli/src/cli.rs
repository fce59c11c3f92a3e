use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Password};
use metoffice_core::{Config, ForecastType, MetofficeClient};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "metoffice", version, about = "Met Office DataHub site-specific forecasts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store DataHub credentials and an optional default site.
    Configure,

    /// Fetch a forecast for a site.
    Forecast {
        /// Granularity: "hourly", "three-hourly" or "daily".
        granularity: String,

        /// Site latitude in degrees.
        #[arg(long)]
        lat: Option<f64>,

        /// Site longitude in degrees.
        #[arg(long)]
        lon: Option<f64>,

        /// Print the forecast as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Show conditions for the current hour.
    Now {
        /// Site latitude in degrees.
        #[arg(long)]
        lat: Option<f64>,

        /// Site longitude in degrees.
        #[arg(long)]
        lon: Option<f64>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Forecast {
                granularity,
                lat,
                lon,
                json,
            } => forecast(&granularity, lat, lon, json).await,
            Command::Now { lat, lon } => now(lat, lon).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("DataHub API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key);

    let store_site = Confirm::new("Store a default site?")
        .with_default(false)
        .prompt()?;
    if store_site {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please enter a number in degrees")
            .prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please enter a number in degrees")
            .prompt()?;
        config.set_default_location(latitude, longitude);
    }

    config.save()?;
    println!(
        "Configuration written to {}",
        Config::config_file_path()?.display()
    );

    Ok(())
}

/// Build a client from config, preferring explicit coordinates over the saved site.
fn client_for(
    config: &Config,
    lat: Option<f64>,
    lon: Option<f64>,
) -> anyhow::Result<MetofficeClient> {
    let (latitude, longitude) = match (lat, lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            let saved = config.default_location().ok_or_else(|| {
                anyhow!(
                    "No coordinates given and no default site stored.\n\
                     Hint: pass --lat/--lon or run `metoffice configure`."
                )
            })?;
            (lat.unwrap_or(saved.latitude), lon.unwrap_or(saved.longitude))
        }
    };

    let mut client = MetofficeClient::new(config.api_key()?.to_owned())?;
    client.set_coordinates(latitude, longitude)?;

    Ok(client)
}

async fn forecast(
    granularity: &str,
    lat: Option<f64>,
    lon: Option<f64>,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let forecast_type = ForecastType::try_from(granularity)?;
    let client = client_for(&config, lat, lon)?;

    match forecast_type {
        ForecastType::Hourly => {
            let response = client.get_hourly().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
                return Ok(());
            }
            print_site_header(response.location_name()?, response.height().ok(), response.model_run_date()?);
            for entry in response.time_series()? {
                println!(
                    "{}  {:>5.1}°C (feels like {:>5.1}°C)  {:>3}% precip  {}",
                    entry.time.format("%a %H:%M"),
                    entry.screen_temperature,
                    entry.feels_like_temperature,
                    entry.prob_of_precipitation,
                    entry.significant_weather()
                );
            }
        }
        ForecastType::ThreeHourly => {
            let response = client.get_three_hourly().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
                return Ok(());
            }
            print_site_header(response.location_name()?, response.height().ok(), response.model_run_date()?);
            for entry in response.time_series()? {
                println!(
                    "{}  {:>5.1}°C (feels like {:>5.1}°C)  {:>3}% precip  {}",
                    entry.time.format("%a %H:%M"),
                    entry.max_screen_air_temp,
                    entry.feels_like_temp,
                    entry.prob_of_precipitation,
                    entry.significant_weather()
                );
            }
        }
        ForecastType::Daily => {
            let response = client.get_daily().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
                return Ok(());
            }
            print_site_header(response.location_name()?, response.height().ok(), response.model_run_date()?);
            for entry in response.time_series()? {
                println!(
                    "{}  day {:>5.1}°C / night {:>5.1}°C  {:>3}% precip  {}",
                    entry.time.format("%a %d %b"),
                    entry.day_max_screen_temperature,
                    entry.night_min_screen_temperature,
                    entry.day_probability_of_precipitation,
                    entry.day_significant_weather()
                );
            }
        }
    }

    Ok(())
}

async fn now(lat: Option<f64>, lon: Option<f64>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = client_for(&config, lat, lon)?;

    let entry = client.get_current_hour_forecast().await?;

    println!(
        "{}  {:.1}°C (feels like {:.1}°C)  {}",
        entry.time.format("%a %H:%M"),
        entry.screen_temperature,
        entry.feels_like_temperature,
        entry.significant_weather()
    );
    println!(
        "wind {:.1} m/s from {}°, gusts {:.1} m/s, humidity {:.0}%, {}% chance of precipitation",
        entry.wind_speed_10m,
        entry.wind_direction_from_10m,
        entry.wind_gust_speed_10m,
        entry.screen_relative_humidity,
        entry.prob_of_precipitation
    );

    Ok(())
}

fn print_site_header(location: &str, height: Option<f64>, model_run: &str) {
    match height {
        Some(height) => println!("{location} ({height:.0} m), model run {model_run}"),
        None => println!("{location}, model run {model_run}"),
    }
    println!();
}
