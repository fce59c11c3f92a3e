use crate::MetofficeError;
use std::convert::TryFrom;

/// Forecast granularity offered by the site-specific API.
///
/// Each variant maps to one REST endpoint under the DataHub base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForecastType {
    Hourly,
    ThreeHourly,
    Daily,
}

impl ForecastType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastType::Hourly => "hourly",
            ForecastType::ThreeHourly => "three-hourly",
            ForecastType::Daily => "daily",
        }
    }

    pub const fn all() -> &'static [ForecastType] {
        &[
            ForecastType::Hourly,
            ForecastType::ThreeHourly,
            ForecastType::Daily,
        ]
    }

    /// Endpoint path relative to the DataHub base URL.
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            ForecastType::Hourly => "sitespecific/v0/point/hourly",
            ForecastType::ThreeHourly => "sitespecific/v0/point/three-hourly",
            ForecastType::Daily => "sitespecific/v0/point/daily",
        }
    }
}

impl std::fmt::Display for ForecastType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ForecastType {
    type Error = MetofficeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "hourly" => Ok(ForecastType::Hourly),
            "three-hourly" => Ok(ForecastType::ThreeHourly),
            "daily" => Ok(ForecastType::Daily),
            _ => Err(MetofficeError::UnknownForecastType(value.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_type_as_str_roundtrip() {
        for forecast in ForecastType::all() {
            let s = forecast.as_str();
            let parsed = ForecastType::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*forecast, parsed);
        }
    }

    #[test]
    fn unknown_forecast_type_error() {
        let err = ForecastType::try_from("weekly").unwrap_err();
        assert!(err.to_string().contains("unknown forecast type"));
    }

    #[test]
    fn endpoint_paths_are_site_specific() {
        for forecast in ForecastType::all() {
            assert!(forecast.endpoint_path().starts_with("sitespecific/v0/point/"));
        }
        assert_eq!(
            ForecastType::ThreeHourly.endpoint_path(),
            "sitespecific/v0/point/three-hourly"
        );
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(
            ForecastType::try_from("Daily").expect("should parse"),
            ForecastType::Daily
        );
    }
}
