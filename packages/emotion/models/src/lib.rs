#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Emotion observation record types and the time-slot vocabulary.
//!
//! This crate defines the single input shape consumed by every analytics
//! operation. Records arrive already decoded from whatever serialized
//! source was used; numeric fields may be `NaN` and are filtered by the
//! engine via [`EmotionRecord::is_valid`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Time-of-day slot an observation was taken in.
///
/// Variants are declared in the order the dashboard presents them, which
/// is also their [`Ord`] order. The slot is a label only and never
/// influences any algorithm.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum TimeSlot {
    /// 深夜
    #[serde(rename = "深夜")]
    #[strum(serialize = "深夜")]
    LateNight,
    /// 凌晨
    #[serde(rename = "凌晨")]
    #[strum(serialize = "凌晨")]
    SmallHours,
    /// 早上
    #[serde(rename = "早上")]
    #[strum(serialize = "早上")]
    EarlyMorning,
    /// 上午
    #[serde(rename = "上午")]
    #[strum(serialize = "上午")]
    Morning,
    /// 中午
    #[serde(rename = "中午")]
    #[strum(serialize = "中午")]
    Noon,
    /// 下午
    #[serde(rename = "下午")]
    #[strum(serialize = "下午")]
    Afternoon,
    /// 傍晚
    #[serde(rename = "傍晚")]
    #[strum(serialize = "傍晚")]
    Dusk,
    /// 晚上
    #[serde(rename = "晚上")]
    #[strum(serialize = "晚上")]
    Evening,
}

impl TimeSlot {
    /// Parses a slot from its label, tolerating surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the label is not one of the eight known slots.
    pub fn from_label(label: &str) -> Result<Self, InvalidTimeSlotError> {
        let trimmed = label.trim();
        trimmed
            .parse::<Self>()
            .map_err(|_| InvalidTimeSlotError {
                label: trimmed.to_string(),
            })
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::LateNight,
            Self::SmallHours,
            Self::EarlyMorning,
            Self::Morning,
            Self::Noon,
            Self::Afternoon,
            Self::Dusk,
            Self::Evening,
        ]
    }
}

/// Error returned when a label does not name a [`TimeSlot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTimeSlotError {
    /// The label that failed to parse.
    pub label: String,
}

impl std::fmt::Display for InvalidTimeSlotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid time slot '{}'", self.label)
    }
}

impl std::error::Error for InvalidTimeSlotError {}

/// One geotagged emotion observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionRecord {
    /// Administrative district label (opaque key).
    pub district: String,
    /// POI type label (opaque key).
    pub poi_type: String,
    /// Time-of-day slot.
    pub time_slot: TimeSlot,
    /// Calendar date of the observation.
    pub date: NaiveDate,
    /// Name of the observed location.
    pub location_name: String,
    /// Latitude in degrees (WGS84).
    pub latitude: f64,
    /// Longitude in degrees (WGS84).
    pub longitude: f64,
    /// Raw emotion value, typically on a 0-10 scale.
    pub emotion_value: f64,
}

impl EmotionRecord {
    /// Returns `true` if coordinates and emotion value are all finite.
    ///
    /// Invalid records are dropped from every geometry- and
    /// statistics-producing operation.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite() && self.emotion_value.is_finite()
    }

    /// Returns the `(longitude, latitude)` pair.
    #[must_use]
    pub const fn lon_lat(&self) -> (f64, f64) {
        (self.longitude, self.latitude)
    }

    /// Returns the exact-coordinate identity of this record's location.
    #[must_use]
    pub fn coordinate_key(&self) -> CoordinateKey {
        CoordinateKey::new(self.longitude, self.latitude)
    }
}

/// Exact `(longitude, latitude)` identity used to deduplicate locations.
///
/// Two coordinates are the same location only if their bit patterns are
/// equal after folding `-0.0` into `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoordinateKey {
    lon_bits: u64,
    lat_bits: u64,
}

impl CoordinateKey {
    /// Builds a key from a longitude/latitude pair.
    #[must_use]
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            lon_bits: (longitude + 0.0).to_bits(),
            lat_bits: (latitude + 0.0).to_bits(),
        }
    }

    /// Longitude this key was built from.
    #[must_use]
    pub const fn longitude(self) -> f64 {
        f64::from_bits(self.lon_bits)
    }

    /// Latitude this key was built from.
    #[must_use]
    pub const fn latitude(self) -> f64 {
        f64::from_bits(self.lat_bits)
    }
}

/// Iterates over the valid records of a slice, preserving order.
pub fn valid_records(records: &[EmotionRecord]) -> impl Iterator<Item = &EmotionRecord> {
    records.iter().filter(|r| r.is_valid())
}
