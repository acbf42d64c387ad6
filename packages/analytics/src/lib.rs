#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spatial and temporal analytics over geotagged emotion observations.
//!
//! Every public function is a pure computation over an immutable
//! `&[EmotionRecord]` snapshot. Records with a non-finite coordinate or
//! emotion value are dropped from each computation (and the drop count is
//! logged at debug level). Operations that need geometry take a
//! [`GeometryEngine`] so the backing engine can be swapped.

pub mod accessibility;
pub mod aggregate;
pub mod autocorrelation;
pub mod clustering;
pub mod config;
pub mod density;
pub mod distribution;
pub mod interpolation;
pub mod zones;

use emotion_map_emotion_models::EmotionRecord;
use emotion_map_geometry::GeometryError;
use geo::Point;
use thiserror::Error;

pub use emotion_map_geometry::GeometryEngine;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Too few valid records for the operation to be defined.
    #[error("Insufficient input for {operation}: need at least {required}, got {actual}")]
    InsufficientInput {
        /// Operation that was attempted.
        operation: &'static str,
        /// Minimum number of valid records required.
        required: usize,
        /// Number of valid records supplied.
        actual: usize,
    },

    /// A statistic's denominator vanished (e.g. all values identical).
    #[error("Degenerate denominator in {operation}: {message}")]
    DegenerateDenominator {
        /// Operation that was attempted.
        operation: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    /// A caller-supplied parameter is out of range.
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Description of what went wrong.
        message: String,
    },

    /// Configuration text could not be parsed.
    #[error("Config error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },

    /// Geometry operation failed.
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),
}

/// Collects the valid records, logging how many were dropped.
pub(crate) fn valid_for<'a>(
    operation: &'static str,
    records: &'a [EmotionRecord],
) -> Vec<&'a EmotionRecord> {
    let valid: Vec<_> = emotion_map_emotion_models::valid_records(records).collect();
    let dropped = records.len() - valid.len();
    if dropped > 0 {
        log::debug!("{operation}: dropped {dropped} invalid record(s)");
    }
    valid
}

pub(crate) fn point_of(record: &EmotionRecord) -> Point<f64> {
    Point::new(record.longitude, record.latitude)
}

pub(crate) fn require(
    operation: &'static str,
    required: usize,
    actual: usize,
) -> Result<(), AnalyticsError> {
    if actual < required {
        return Err(AnalyticsError::InsufficientInput {
            operation,
            required,
            actual,
        });
    }
    Ok(())
}

pub(crate) fn positive_km(name: &str, value: f64) -> Result<(), AnalyticsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AnalyticsError::InvalidParameter {
            message: format!("{name} must be a positive finite number, got {value}"),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_records {
    use chrono::NaiveDate;
    use emotion_map_emotion_models::{EmotionRecord, TimeSlot};

    pub fn record(lon: f64, lat: f64, emotion: f64) -> EmotionRecord {
        EmotionRecord {
            district: "张店区".to_string(),
            poi_type: "公园".to_string(),
            time_slot: TimeSlot::Morning,
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            location_name: format!("{lon},{lat}"),
            latitude: lat,
            longitude: lon,
            emotion_value: emotion,
        }
    }

    pub fn named(name: &str, lon: f64, lat: f64, emotion: f64) -> EmotionRecord {
        EmotionRecord {
            location_name: name.to_string(),
            ..record(lon, lat, emotion)
        }
    }
}
