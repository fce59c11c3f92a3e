//! Core library for the `metoffice` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The client for the Met Office Weather DataHub site-specific API
//! - Typed forecast responses and their accessors
//!
//! It is used by `metoffice-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod error;
pub mod forecast;
pub mod model;

pub use client::{DEFAULT_BASE_URL, MetofficeClient};
pub use config::{Config, SavedLocation};
pub use error::MetofficeError;
pub use forecast::ForecastType;
pub use model::{
    DailyEntry, DailyForecast, Feature, FeatureCollection, HourlyEntry, HourlyForecast,
    SignificantWeather, ThreeHourlyEntry, ThreeHourlyForecast, TimeSeries, Unit,
};
