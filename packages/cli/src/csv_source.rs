//! Reads emotion observations from the survey CSV export.
//!
//! Columns are matched by header name, so their order does not matter.
//! Unparseable numbers become `NaN` and are dropped later by the engine;
//! rows with an unparseable date or unknown time slot are skipped here.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use emotion_map_emotion_models::{EmotionRecord, TimeSlot};
use serde::Deserialize;

use crate::error::CliError;

const REQUIRED_COLUMNS: [&str; 8] = [
    "日期",
    "地点名称",
    "经度",
    "纬度",
    "区域",
    "类型",
    "时间段",
    "情绪值",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// One CSV row before validation.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "日期")]
    date: String,
    #[serde(rename = "地点名称")]
    location_name: String,
    #[serde(rename = "经度")]
    longitude: String,
    #[serde(rename = "纬度")]
    latitude: String,
    #[serde(rename = "区域")]
    district: String,
    #[serde(rename = "类型")]
    poi_type: String,
    #[serde(rename = "时间段")]
    time_slot: String,
    #[serde(rename = "情绪值")]
    emotion_value: String,
}

impl RawRow {
    fn to_record(&self) -> Option<EmotionRecord> {
        let Some(date) = parse_date(&self.date) else {
            log::warn!("skipping row with unparseable date {:?}", self.date);
            return None;
        };
        let time_slot = match TimeSlot::from_label(&self.time_slot) {
            Ok(slot) => slot,
            Err(e) => {
                log::warn!("skipping row: {e}");
                return None;
            }
        };

        Some(EmotionRecord {
            district: self.district.trim().to_string(),
            poi_type: self.poi_type.trim().to_string(),
            time_slot,
            date,
            location_name: self.location_name.trim().to_string(),
            latitude: parse_number(&self.latitude),
            longitude: parse_number(&self.longitude),
            emotion_value: parse_number(&self.emotion_value),
        })
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

fn parse_number(text: &str) -> f64 {
    text.trim().parse().unwrap_or(f64::NAN)
}

/// Reads every usable record from a CSV file.
///
/// # Errors
///
/// * [`CliError::Io`] if the file cannot be opened
/// * [`CliError::Csv`] if its header cannot be read
/// * [`CliError::MissingColumn`] if a required header is absent
pub fn load_path(path: &Path) -> Result<Vec<EmotionRecord>, CliError> {
    let reader = std::fs::File::open(path).map_err(|e| CliError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let records = read_records(reader, &path.display().to_string())?;
    log::info!("loaded {} record(s) from {}", records.len(), path.display());
    Ok(records)
}

/// Reads every usable record from any CSV source.
///
/// # Errors
///
/// * [`CliError::Csv`] if the header cannot be read
/// * [`CliError::MissingColumn`] if a required header is absent
pub fn read_records(reader: impl Read, label: &str) -> Result<Vec<EmotionRecord>, CliError> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = csv_reader.headers().map_err(|e| CliError::Csv {
        path: label.to_string(),
        source: e,
    })?;
    if let Some(column) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|h| h.trim() == **column))
    {
        return Err(CliError::MissingColumn { column: *column });
    }

    let mut records = Vec::new();
    let mut skipped = 0_usize;
    for result in csv_reader.deserialize::<RawRow>() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                log::trace!("  skipping malformed row: {e}");
                skipped += 1;
                continue;
            }
        };

        match row.to_record() {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        log::warn!("{label}: skipped {skipped} unusable row(s)");
    }
    Ok(records)
}
