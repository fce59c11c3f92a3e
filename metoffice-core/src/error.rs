use reqwest::StatusCode;
use thiserror::Error;

/// Errors produced by the DataHub client and the response accessors.
#[derive(Debug, Error)]
pub enum MetofficeError {
    #[error("latitude must be a number between -85 and +85, got {0}")]
    InvalidLatitude(f64),

    #[error("longitude must be a number between -180 and +180, got {0}")]
    InvalidLongitude(f64),

    #[error("request to the Met Office DataHub failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("the DataHub rejected the API key (HTTP {0})")]
    Auth(StatusCode),

    #[error("DataHub request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to parse the forecast response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown forecast type '{0}'. Supported types: hourly, three-hourly, daily")]
    UnknownForecastType(String),

    #[error("forecast response contained no features")]
    EmptyFeatures,

    #[error("forecast geometry carries no height coordinate")]
    MissingHeight,

    #[error("forecast response contained an empty time series")]
    EmptyTimeSeries,

    #[error("parameter metadata was excluded from this response")]
    NoParameterMetadata,

    #[error("no parameter named '{0}' in the response metadata")]
    UnknownParameter(String),
}
