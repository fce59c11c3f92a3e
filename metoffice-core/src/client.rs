//! HTTP client for the site-specific forecast endpoints.

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, StatusCode, header::ACCEPT};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    ForecastType, MetofficeError,
    model::{DailyEntry, DailyForecast, HourlyEntry, HourlyForecast, ThreeHourlyForecast, TimeSeries},
};

/// Production base URL of the Met Office Weather DataHub.
pub const DEFAULT_BASE_URL: &str = "https://data.hub.api.metoffice.gov.uk";

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Client for the DataHub site-specific forecast API.
///
/// Holds the API key and the coordinate pair used by every request. The underlying
/// connection pool is released when the client is dropped.
#[derive(Debug, Clone)]
pub struct MetofficeClient {
    http: Client,
    base_url: String,
    api_key: String,
    latitude: f64,
    longitude: f64,
    data_source: String,
    exclude_parameter_metadata: bool,
    include_location_name: bool,
}

impl MetofficeClient {
    /// Create a client for the production DataHub endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self, MetofficeError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: api_key.into(),
            latitude: 0.0,
            longitude: 0.0,
            data_source: "BD1".to_owned(),
            exclude_parameter_metadata: false,
            include_location_name: true,
        })
    }

    /// Override the service base URL. Tests point this at a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the latitude used by subsequent forecast calls.
    ///
    /// The site-specific model only covers latitudes between -85 and +85.
    pub fn set_latitude(&mut self, latitude: f64) -> Result<(), MetofficeError> {
        if !(-85.0..=85.0).contains(&latitude) {
            return Err(MetofficeError::InvalidLatitude(latitude));
        }
        self.latitude = latitude;
        Ok(())
    }

    /// Set the longitude used by subsequent forecast calls.
    pub fn set_longitude(&mut self, longitude: f64) -> Result<(), MetofficeError> {
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(MetofficeError::InvalidLongitude(longitude));
        }
        self.longitude = longitude;
        Ok(())
    }

    /// Set both coordinates at once. Rejects out-of-range values without
    /// issuing a request.
    pub fn set_coordinates(&mut self, latitude: f64, longitude: f64) -> Result<(), MetofficeError> {
        self.set_latitude(latitude)?;
        self.set_longitude(longitude)
    }

    /// The coordinate pair currently used for requests.
    pub fn coordinates(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    /// Ask the service to omit the per-parameter metadata block from responses.
    pub fn exclude_parameter_metadata(&mut self, exclude: bool) {
        self.exclude_parameter_metadata = exclude;
    }

    /// Fetch the hourly forecast for the stored coordinates.
    pub async fn get_hourly(&self) -> Result<HourlyForecast, MetofficeError> {
        self.call_api(ForecastType::Hourly).await
    }

    /// Fetch the three-hourly forecast for the stored coordinates.
    pub async fn get_three_hourly(&self) -> Result<ThreeHourlyForecast, MetofficeError> {
        self.call_api(ForecastType::ThreeHourly).await
    }

    /// Fetch the daily forecast for the stored coordinates.
    pub async fn get_daily(&self) -> Result<DailyForecast, MetofficeError> {
        self.call_api(ForecastType::Daily).await
    }

    /// Fetch the hourly forecast and return the entry covering the current hour.
    pub async fn get_current_hour_forecast(&self) -> Result<HourlyEntry, MetofficeError> {
        let forecast = self.get_hourly().await?;
        let now = Utc::now();

        forecast
            .time_series()?
            .iter()
            .min_by_key(|entry| (entry.time - now).num_seconds().abs())
            .cloned()
            .ok_or(MetofficeError::EmptyTimeSeries)
    }

    /// Fetch the daily forecast and return the entry covering today.
    pub async fn get_current_day_forecast(&self) -> Result<DailyEntry, MetofficeError> {
        let forecast = self.get_daily().await?;
        let today = Utc::now().date_naive();

        forecast
            .time_series()?
            .iter()
            .min_by_key(|entry| (entry.time.date_naive() - today).num_days().abs())
            .cloned()
            .ok_or(MetofficeError::EmptyTimeSeries)
    }

    /// Fetch a forecast of the given granularity and return just its time series.
    pub async fn get_time_series(
        &self,
        forecast: ForecastType,
    ) -> Result<TimeSeries, MetofficeError> {
        Ok(match forecast {
            ForecastType::Hourly => TimeSeries::Hourly(self.get_hourly().await?.into_time_series()?),
            ForecastType::ThreeHourly => {
                TimeSeries::ThreeHourly(self.get_three_hourly().await?.into_time_series()?)
            }
            ForecastType::Daily => TimeSeries::Daily(self.get_daily().await?.into_time_series()?),
        })
    }

    async fn call_api<T: DeserializeOwned>(
        &self,
        forecast: ForecastType,
    ) -> Result<T, MetofficeError> {
        let url = format!("{}/{}", self.base_url, forecast.endpoint_path());
        let latitude = self.latitude.to_string();
        let longitude = self.longitude.to_string();

        debug!(
            endpoint = forecast.as_str(),
            latitude = self.latitude,
            longitude = self.longitude,
            "requesting site-specific forecast"
        );

        let res = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .header("apikey", &self.api_key)
            .query(&[
                ("dataSource", self.data_source.as_str()),
                (
                    "excludeParameterMetadata",
                    bool_param(self.exclude_parameter_metadata),
                ),
                (
                    "includeLocationName",
                    bool_param(self.include_location_name),
                ),
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(MetofficeError::Auth(status));
        }
        if !status.is_success() {
            return Err(MetofficeError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn bool_param(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}
