//! Typed views over the site-specific forecast payloads.
//!
//! The DataHub returns GeoJSON-style feature collections; one feature per requested
//! point, with the forecast itself in `properties.timeSeries` and optional
//! per-parameter metadata at the top level.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{ForecastType, MetofficeError};

pub type HourlyForecast = FeatureCollection<HourlyEntry>;
pub type ThreeHourlyForecast = FeatureCollection<ThreeHourlyEntry>;
pub type DailyForecast = FeatureCollection<DailyEntry>;

/// Top-level forecast response for one granularity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCollection<T> {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature<T>>,
    /// Present unless the request set `excludeParameterMetadata=true`.
    pub parameters: Option<Vec<HashMap<String, ParameterDetails>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature<T> {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: Geometry,
    pub properties: Properties<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude, height in metres]` for the forecast site.
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Properties<T> {
    pub location: Location,
    /// Distance in metres between the requested point and the forecast site.
    pub request_point_distance: f64,
    pub model_run_date: String,
    pub time_series: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
}

/// Metadata describing a single forecast parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDetails {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub unit: Unit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub label: String,
    pub symbol: Symbol,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub value: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl<T> FeatureCollection<T> {
    fn feature(&self) -> Result<&Feature<T>, MetofficeError> {
        self.features.first().ok_or(MetofficeError::EmptyFeatures)
    }

    /// The forecast time series, oldest entry first.
    pub fn time_series(&self) -> Result<&[T], MetofficeError> {
        Ok(&self.feature()?.properties.time_series)
    }

    /// Consume the response and take ownership of the time series.
    pub fn into_time_series(mut self) -> Result<Vec<T>, MetofficeError> {
        if self.features.is_empty() {
            return Err(MetofficeError::EmptyFeatures);
        }
        Ok(self.features.swap_remove(0).properties.time_series)
    }

    /// Gazetteer name of the forecast site.
    pub fn location_name(&self) -> Result<&str, MetofficeError> {
        Ok(&self.feature()?.properties.location.name)
    }

    /// Height of the forecast site in metres above sea level.
    pub fn height(&self) -> Result<f64, MetofficeError> {
        self.feature()?
            .geometry
            .coordinates
            .get(2)
            .copied()
            .ok_or(MetofficeError::MissingHeight)
    }

    /// Timestamp of the model run the forecast was produced from.
    pub fn model_run_date(&self) -> Result<&str, MetofficeError> {
        Ok(&self.feature()?.properties.model_run_date)
    }

    fn parameter_details(&self, name: &str) -> Result<&ParameterDetails, MetofficeError> {
        let maps = self
            .parameters
            .as_ref()
            .ok_or(MetofficeError::NoParameterMetadata)?;

        maps.iter()
            .find_map(|entry| entry.get(name))
            .ok_or_else(|| MetofficeError::UnknownParameter(name.to_owned()))
    }

    /// Human-readable description of a named parameter, e.g. "Screen Air Temperature".
    pub fn parameter_description(&self, name: &str) -> Result<&str, MetofficeError> {
        Ok(&self.parameter_details(name)?.description)
    }

    /// Unit of a named parameter, including its UCUM symbol.
    pub fn parameter_unit(&self, name: &str) -> Result<&Unit, MetofficeError> {
        Ok(&self.parameter_details(name)?.unit)
    }
}

/// One hour of forecast data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyEntry {
    #[serde(deserialize_with = "de_datahub_time")]
    pub time: DateTime<Utc>,
    pub screen_temperature: f64,
    pub screen_dew_point_temperature: f64,
    pub feels_like_temperature: f64,
    pub wind_speed_10m: f64,
    pub wind_direction_from_10m: u16,
    pub wind_gust_speed_10m: f64,
    pub visibility: u32,
    pub screen_relative_humidity: f64,
    pub mslp: u32,
    pub uv_index: u8,
    pub significant_weather_code: i8,
    pub precipitation_rate: f64,
    pub prob_of_precipitation: u8,
    // Only reported on the hour boundaries the model covers.
    #[serde(default)]
    pub max_screen_air_temp: f64,
    #[serde(default)]
    pub min_screen_air_temp: f64,
    #[serde(default)]
    pub total_precip_amount: f64,
    #[serde(default)]
    pub total_snow_amount: f64,
    #[serde(default)]
    pub max_10m_wind_gust: f64,
}

impl HourlyEntry {
    pub fn significant_weather(&self) -> SignificantWeather {
        SignificantWeather::from_code(self.significant_weather_code)
    }
}

/// One three-hour block of forecast data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreeHourlyEntry {
    #[serde(deserialize_with = "de_datahub_time")]
    pub time: DateTime<Utc>,
    pub max_screen_air_temp: f64,
    pub min_screen_air_temp: f64,
    pub max_10m_wind_gust: f64,
    pub significant_weather_code: i8,
    pub total_precip_amount: f64,
    pub total_snow_amount: f64,
    pub wind_speed_10m: f64,
    pub wind_direction_from_10m: u16,
    pub wind_gust_speed_10m: f64,
    pub visibility: u32,
    pub mslp: u32,
    pub screen_relative_humidity: f64,
    pub feels_like_temp: f64,
    pub uv_index: u8,
    pub prob_of_precipitation: u8,
    pub prob_of_snow: u8,
    pub prob_of_heavy_snow: u8,
    pub prob_of_rain: u8,
    pub prob_of_heavy_rain: u8,
    pub prob_of_hail: u8,
    pub prob_of_sferics: u8,
}

impl ThreeHourlyEntry {
    pub fn significant_weather(&self) -> SignificantWeather {
        SignificantWeather::from_code(self.significant_weather_code)
    }
}

/// One day of forecast data, split into day and night halves.
///
/// Everything except `time` is defaulted: when a model run starts mid-day the first
/// record omits the fields for the half that has already passed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEntry {
    #[serde(deserialize_with = "de_datahub_time")]
    pub time: DateTime<Utc>,
    #[serde(default, rename = "midday10MWindSpeed")]
    pub midday_10m_wind_speed: f64,
    #[serde(default, rename = "midnight10MWindSpeed")]
    pub midnight_10m_wind_speed: f64,
    #[serde(default, rename = "midday10MWindDirection")]
    pub midday_10m_wind_direction: u16,
    #[serde(default, rename = "midnight10MWindDirection")]
    pub midnight_10m_wind_direction: u16,
    #[serde(default, rename = "midday10MWindGust")]
    pub midday_10m_wind_gust: f64,
    #[serde(default, rename = "midnight10MWindGust")]
    pub midnight_10m_wind_gust: f64,
    #[serde(default)]
    pub midday_visibility: u32,
    #[serde(default)]
    pub midnight_visibility: u32,
    #[serde(default)]
    pub midday_relative_humidity: f64,
    #[serde(default)]
    pub midnight_relative_humidity: f64,
    #[serde(default)]
    pub midday_mslp: u32,
    #[serde(default)]
    pub midnight_mslp: u32,
    pub day_significant_weather_code: Option<i8>,
    pub night_significant_weather_code: Option<i8>,
    #[serde(default)]
    pub day_max_screen_temperature: f64,
    #[serde(default)]
    pub night_min_screen_temperature: f64,
    #[serde(default)]
    pub day_upper_bound_max_temp: f64,
    #[serde(default)]
    pub night_upper_bound_min_temp: f64,
    #[serde(default)]
    pub day_lower_bound_max_temp: f64,
    #[serde(default)]
    pub night_lower_bound_min_temp: f64,
    #[serde(default)]
    pub day_max_feels_like_temp: f64,
    #[serde(default)]
    pub night_min_feels_like_temp: f64,
    #[serde(default)]
    pub day_upper_bound_max_feels_like_temp: f64,
    #[serde(default)]
    pub night_upper_bound_min_feels_like_temp: f64,
    #[serde(default)]
    pub day_lower_bound_max_feels_like_temp: f64,
    #[serde(default)]
    pub night_lower_bound_min_feels_like_temp: f64,
    #[serde(default)]
    pub max_uv_index: u8,
    #[serde(default)]
    pub day_probability_of_precipitation: u8,
    #[serde(default)]
    pub night_probability_of_precipitation: u8,
    #[serde(default)]
    pub day_probability_of_snow: u8,
    #[serde(default)]
    pub night_probability_of_snow: u8,
    #[serde(default)]
    pub day_probability_of_heavy_snow: u8,
    #[serde(default)]
    pub night_probability_of_heavy_snow: u8,
    #[serde(default)]
    pub day_probability_of_rain: u8,
    #[serde(default)]
    pub night_probability_of_rain: u8,
    #[serde(default)]
    pub day_probability_of_heavy_rain: u8,
    #[serde(default)]
    pub night_probability_of_heavy_rain: u8,
    #[serde(default)]
    pub day_probability_of_hail: u8,
    #[serde(default)]
    pub night_probability_of_hail: u8,
    #[serde(default)]
    pub day_probability_of_sferics: u8,
    #[serde(default)]
    pub night_probability_of_sferics: u8,
}

impl DailyEntry {
    pub fn day_significant_weather(&self) -> SignificantWeather {
        self.day_significant_weather_code
            .map(SignificantWeather::from_code)
            .unwrap_or_default()
    }

    pub fn night_significant_weather(&self) -> SignificantWeather {
        self.night_significant_weather_code
            .map(SignificantWeather::from_code)
            .unwrap_or_default()
    }
}

/// Time series for one forecast granularity, as returned by
/// [`MetofficeClient::get_time_series`](crate::MetofficeClient::get_time_series).
#[derive(Debug, Clone)]
pub enum TimeSeries {
    Hourly(Vec<HourlyEntry>),
    ThreeHourly(Vec<ThreeHourlyEntry>),
    Daily(Vec<DailyEntry>),
}

impl TimeSeries {
    pub fn forecast_type(&self) -> ForecastType {
        match self {
            TimeSeries::Hourly(_) => ForecastType::Hourly,
            TimeSeries::ThreeHourly(_) => ForecastType::ThreeHourly,
            TimeSeries::Daily(_) => ForecastType::Daily,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TimeSeries::Hourly(entries) => entries.len(),
            TimeSeries::ThreeHourly(entries) => entries.len(),
            TimeSeries::Daily(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Significant weather reported by the model, decoded from the numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignificantWeather {
    #[default]
    NotAvailable,
    TraceRain,
    ClearNight,
    SunnyDay,
    PartlyCloudyNight,
    PartlyCloudyDay,
    Mist,
    Fog,
    Cloudy,
    Overcast,
    LightRainShowerNight,
    LightRainShowerDay,
    Drizzle,
    LightRain,
    HeavyRainShowerNight,
    HeavyRainShowerDay,
    HeavyRain,
    SleetShowerNight,
    SleetShowerDay,
    Sleet,
    HailShowerNight,
    HailShowerDay,
    Hail,
    LightSnowShowerNight,
    LightSnowShowerDay,
    LightSnow,
    HeavySnowShowerNight,
    HeavySnowShowerDay,
    HeavySnow,
    ThunderShowerNight,
    ThunderShowerDay,
    Thunder,
}

impl SignificantWeather {
    /// Decode a DataHub significant weather code. Code 4 is unused upstream;
    /// it and anything out of range map to [`SignificantWeather::NotAvailable`].
    pub const fn from_code(code: i8) -> Self {
        match code {
            -1 => Self::TraceRain,
            0 => Self::ClearNight,
            1 => Self::SunnyDay,
            2 => Self::PartlyCloudyNight,
            3 => Self::PartlyCloudyDay,
            5 => Self::Mist,
            6 => Self::Fog,
            7 => Self::Cloudy,
            8 => Self::Overcast,
            9 => Self::LightRainShowerNight,
            10 => Self::LightRainShowerDay,
            11 => Self::Drizzle,
            12 => Self::LightRain,
            13 => Self::HeavyRainShowerNight,
            14 => Self::HeavyRainShowerDay,
            15 => Self::HeavyRain,
            16 => Self::SleetShowerNight,
            17 => Self::SleetShowerDay,
            18 => Self::Sleet,
            19 => Self::HailShowerNight,
            20 => Self::HailShowerDay,
            21 => Self::Hail,
            22 => Self::LightSnowShowerNight,
            23 => Self::LightSnowShowerDay,
            24 => Self::LightSnow,
            25 => Self::HeavySnowShowerNight,
            26 => Self::HeavySnowShowerDay,
            27 => Self::HeavySnow,
            28 => Self::ThunderShowerNight,
            29 => Self::ThunderShowerDay,
            30 => Self::Thunder,
            _ => Self::NotAvailable,
        }
    }

    pub const fn description(&self) -> &'static str {
        match self {
            Self::NotAvailable => "Not available",
            Self::TraceRain => "Trace rain",
            Self::ClearNight => "Clear night",
            Self::SunnyDay => "Sunny day",
            Self::PartlyCloudyNight => "Partly cloudy (night)",
            Self::PartlyCloudyDay => "Partly cloudy (day)",
            Self::Mist => "Mist",
            Self::Fog => "Fog",
            Self::Cloudy => "Cloudy",
            Self::Overcast => "Overcast",
            Self::LightRainShowerNight => "Light rain shower (night)",
            Self::LightRainShowerDay => "Light rain shower (day)",
            Self::Drizzle => "Drizzle",
            Self::LightRain => "Light rain",
            Self::HeavyRainShowerNight => "Heavy rain shower (night)",
            Self::HeavyRainShowerDay => "Heavy rain shower (day)",
            Self::HeavyRain => "Heavy rain",
            Self::SleetShowerNight => "Sleet shower (night)",
            Self::SleetShowerDay => "Sleet shower (day)",
            Self::Sleet => "Sleet",
            Self::HailShowerNight => "Hail shower (night)",
            Self::HailShowerDay => "Hail shower (day)",
            Self::Hail => "Hail",
            Self::LightSnowShowerNight => "Light snow shower (night)",
            Self::LightSnowShowerDay => "Light snow shower (day)",
            Self::LightSnow => "Light snow",
            Self::HeavySnowShowerNight => "Heavy snow shower (night)",
            Self::HeavySnowShowerDay => "Heavy snow shower (day)",
            Self::HeavySnow => "Heavy snow",
            Self::ThunderShowerNight => "Thunder shower (night)",
            Self::ThunderShowerDay => "Thunder shower (day)",
            Self::Thunder => "Thunder",
        }
    }
}

impl std::fmt::Display for SignificantWeather {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Parse the timestamp forms the DataHub emits.
///
/// Model run dates and series times come back minute-precision with a bare `Z`
/// suffix (`2024-01-15T12:00Z`), which is not valid RFC 3339.
pub(crate) fn parse_datahub_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in [
        "%Y-%m-%dT%H:%MZ",
        "%Y-%m-%dT%H:%M:%SZ",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    None
}

fn de_datahub_time<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_datahub_time(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognised DataHub timestamp '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hourly_entry_json(time: &str) -> serde_json::Value {
        json!({
            "time": time,
            "screenTemperature": 5.5,
            "screenDewPointTemperature": 2.1,
            "feelsLikeTemperature": 2.4,
            "windSpeed10m": 7.2,
            "windDirectionFrom10m": 225,
            "windGustSpeed10m": 12.8,
            "visibility": 21000,
            "screenRelativeHumidity": 81.3,
            "mslp": 101325,
            "uvIndex": 1,
            "significantWeatherCode": 8,
            "precipitationRate": 0.0,
            "probOfPrecipitation": 10
        })
    }

    fn hourly_collection_json() -> serde_json::Value {
        json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [-3.0, 54.0, 124.0]
                },
                "properties": {
                    "location": { "name": "Sca Fell" },
                    "requestPointDistance": 1081.54,
                    "modelRunDate": "2024-01-15T12:00Z",
                    "timeSeries": [
                        hourly_entry_json("2024-01-15T12:00Z"),
                        hourly_entry_json("2024-01-15T13:00Z")
                    ]
                }
            }],
            "parameters": [{
                "screenTemperature": {
                    "type": "Parameter",
                    "description": "Screen Air Temperature",
                    "unit": {
                        "label": "degrees Celsius",
                        "symbol": {
                            "value": "http://www.opengis.net/def/uom/UCUM/degC",
                            "type": "Cel"
                        }
                    }
                }
            }]
        })
    }

    #[test]
    fn hourly_collection_parses() {
        let forecast: HourlyForecast =
            serde_json::from_value(hourly_collection_json()).expect("should parse");

        let series = forecast.time_series().expect("series should be present");
        assert_eq!(series.len(), 2);
        assert!((series[0].screen_temperature - 5.5).abs() < f64::EPSILON);
        assert_eq!(series[0].wind_direction_from_10m, 225);
        assert_eq!(series[0].significant_weather(), SignificantWeather::Overcast);
        // Defaulted fields absent from the payload come back as zero.
        assert!((series[0].max_10m_wind_gust - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn accessors_read_site_fields() {
        let forecast: HourlyForecast =
            serde_json::from_value(hourly_collection_json()).expect("should parse");

        assert_eq!(forecast.location_name().expect("name"), "Sca Fell");
        assert!((forecast.height().expect("height") - 124.0).abs() < f64::EPSILON);
        assert_eq!(forecast.model_run_date().expect("run date"), "2024-01-15T12:00Z");
    }

    #[test]
    fn parameter_metadata_lookup() {
        let forecast: HourlyForecast =
            serde_json::from_value(hourly_collection_json()).expect("should parse");

        assert_eq!(
            forecast.parameter_description("screenTemperature").expect("description"),
            "Screen Air Temperature"
        );
        let unit = forecast.parameter_unit("screenTemperature").expect("unit");
        assert_eq!(unit.label, "degrees Celsius");
        assert_eq!(unit.symbol.kind, "Cel");
    }

    #[test]
    fn unknown_parameter_is_an_error() {
        let forecast: HourlyForecast =
            serde_json::from_value(hourly_collection_json()).expect("should parse");

        let err = forecast.parameter_description("doesNotExist").unwrap_err();
        assert!(matches!(err, MetofficeError::UnknownParameter(ref name) if name == "doesNotExist"));
    }

    #[test]
    fn excluded_parameter_metadata_is_an_error() {
        let mut value = hourly_collection_json();
        value.as_object_mut().expect("object").remove("parameters");
        let forecast: HourlyForecast = serde_json::from_value(value).expect("should parse");

        let err = forecast.parameter_description("screenTemperature").unwrap_err();
        assert!(matches!(err, MetofficeError::NoParameterMetadata));
    }

    #[test]
    fn empty_features_is_an_error() {
        let forecast: HourlyForecast = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [],
            "parameters": null
        }))
        .expect("should parse");

        assert!(matches!(
            forecast.location_name().unwrap_err(),
            MetofficeError::EmptyFeatures
        ));
        assert!(matches!(
            forecast.into_time_series().unwrap_err(),
            MetofficeError::EmptyFeatures
        ));
    }

    #[test]
    fn daily_entry_tolerates_missing_day_half() {
        let entry: DailyEntry = serde_json::from_value(json!({
            "time": "2024-01-15T00:00Z",
            "midnight10MWindSpeed": 4.1,
            "midnight10MWindDirection": 190,
            "midnight10MWindGust": 8.9,
            "midnightVisibility": 18000,
            "midnightRelativeHumidity": 92.4,
            "midnightMslp": 100980,
            "nightSignificantWeatherCode": 7,
            "nightMinScreenTemperature": 1.2,
            "nightProbabilityOfPrecipitation": 40
        }))
        .expect("should parse");

        assert_eq!(entry.night_significant_weather(), SignificantWeather::Cloudy);
        assert_eq!(entry.day_significant_weather(), SignificantWeather::NotAvailable);
        assert_eq!(entry.day_probability_of_precipitation, 0);
        assert_eq!(entry.night_probability_of_precipitation, 40);
    }

    #[test]
    fn weather_code_mapping() {
        assert_eq!(SignificantWeather::from_code(-1), SignificantWeather::TraceRain);
        assert_eq!(SignificantWeather::from_code(1), SignificantWeather::SunnyDay);
        assert_eq!(SignificantWeather::from_code(30), SignificantWeather::Thunder);
        // 4 is reserved upstream, 31+ undefined.
        assert_eq!(SignificantWeather::from_code(4), SignificantWeather::NotAvailable);
        assert_eq!(SignificantWeather::from_code(99), SignificantWeather::NotAvailable);
        assert_eq!(SignificantWeather::Sleet.to_string(), "Sleet");
    }

    #[test]
    fn datahub_timestamps_parse() {
        for raw in [
            "2024-01-15T12:00Z",
            "2024-01-15T12:00:00Z",
            "2024-01-15T12:00:00+00:00",
            "2024-01-15T12:00",
        ] {
            let parsed = parse_datahub_time(raw).expect("should parse");
            assert_eq!(parsed.to_rfc3339(), "2024-01-15T12:00:00+00:00");
        }

        assert!(parse_datahub_time("15/01/2024 12:00").is_none());
        assert!(parse_datahub_time("2024-01-15").is_none());
    }

    #[test]
    fn time_series_enum_reports_granularity() {
        let series = TimeSeries::Daily(Vec::new());
        assert_eq!(series.forecast_type(), ForecastType::Daily);
        assert!(series.is_empty());
    }
}
