//! Category aggregation and temporal trend.
//!
//! A single generic [`aggregate_by`] serves every grouping; the named
//! wrappers only choose the key.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use emotion_map_analytics_models::{CategoryAggregate, DailyTrend, SpatialStats};
use emotion_map_emotion_models::{EmotionRecord, TimeSlot};

use crate::{density, valid_for};

/// Groups valid records by `key` and aggregates their emotion values.
///
/// Values within each group keep input order.
pub fn aggregate_by<K, F>(records: &[EmotionRecord], key: F) -> BTreeMap<K, CategoryAggregate>
where
    K: Ord,
    F: Fn(&EmotionRecord) -> K,
{
    let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for record in valid_for("aggregate", records) {
        groups.entry(key(record)).or_default().push(record.emotion_value);
    }
    groups
        .into_iter()
        .map(|(k, values)| (k, CategoryAggregate::from_values(values)))
        .collect()
}

/// Aggregates keyed by district.
#[must_use]
pub fn by_district(records: &[EmotionRecord]) -> BTreeMap<String, CategoryAggregate> {
    aggregate_by(records, |r| r.district.clone())
}

/// Aggregates keyed by time slot, in day order.
#[must_use]
pub fn by_time_slot(records: &[EmotionRecord]) -> BTreeMap<TimeSlot, CategoryAggregate> {
    aggregate_by(records, |r| r.time_slot)
}

/// Aggregates keyed by POI type.
#[must_use]
pub fn by_poi_type(records: &[EmotionRecord]) -> BTreeMap<String, CategoryAggregate> {
    aggregate_by(records, |r| r.poi_type.clone())
}

/// Aggregates keyed by observation date.
#[must_use]
pub fn by_date(records: &[EmotionRecord]) -> BTreeMap<NaiveDate, CategoryAggregate> {
    aggregate_by(records, |r| r.date)
}

/// Daily count and mean, ascending by calendar date.
#[must_use]
pub fn temporal_trend(records: &[EmotionRecord]) -> Vec<DailyTrend> {
    by_date(records)
        .into_iter()
        .map(|(date, agg)| DailyTrend {
            date,
            count: agg.count,
            mean: agg.mean,
        })
        .collect()
}

/// Sorted distinct district labels across all records.
#[must_use]
pub fn districts(records: &[EmotionRecord]) -> Vec<String> {
    distinct_labels(records, |r| &r.district)
}

/// Sorted distinct POI type labels across all records.
#[must_use]
pub fn poi_types(records: &[EmotionRecord]) -> Vec<String> {
    distinct_labels(records, |r| &r.poi_type)
}

fn distinct_labels<'a>(
    records: &'a [EmotionRecord],
    label: impl Fn(&'a EmotionRecord) -> &'a String,
) -> Vec<String> {
    records
        .iter()
        .map(label)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect()
}

/// Density bands plus the district, time-slot and POI-type aggregates.
#[must_use]
pub fn spatial_stats(records: &[EmotionRecord]) -> SpatialStats {
    SpatialStats {
        density: density::classify_density(records),
        by_district: by_district(records),
        by_time_slot: by_time_slot(records),
        by_poi_type: by_poi_type(records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_records::record;

    fn on(date: (i32, u32, u32), emotion: f64) -> EmotionRecord {
        EmotionRecord {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            ..record(118.0, 36.8, emotion)
        }
    }

    #[test]
    fn group_counts_sum_to_valid_records() {
        let mut records = vec![
            EmotionRecord {
                district: "淄川区".to_string(),
                ..record(118.0, 36.8, 6.0)
            },
            record(118.1, 36.7, 4.0),
            record(118.2, 36.6, 8.0),
            record(f64::NAN, 36.6, 8.0),
        ];
        records.push(record(118.2, 36.6, f64::INFINITY));

        let groups = by_district(&records);
        let total: usize = groups.values().map(|a| a.count).sum();
        assert_eq!(total, 3);
        assert_eq!(groups["张店区"].values, vec![4.0, 8.0]);
        assert!((groups["张店区"].mean - 6.0).abs() < 1e-12);
        assert_eq!(groups["淄川区"].count, 1);
    }

    #[test]
    fn time_slot_groups_in_day_order() {
        let records = vec![
            EmotionRecord {
                time_slot: TimeSlot::Evening,
                ..record(118.0, 36.8, 3.0)
            },
            EmotionRecord {
                time_slot: TimeSlot::LateNight,
                ..record(118.0, 36.8, 5.0)
            },
        ];
        let keys: Vec<_> = by_time_slot(&records).into_keys().collect();
        assert_eq!(keys, vec![TimeSlot::LateNight, TimeSlot::Evening]);
    }

    #[test]
    fn trend_is_ascending_and_merges_same_day() {
        let records = vec![
            on((2024, 5, 3), 9.0),
            on((2024, 4, 30), 2.0),
            on((2024, 5, 3), 5.0),
            on((2023, 12, 31), 1.0),
        ];
        let trend = temporal_trend(&records);
        assert_eq!(trend.len(), 3);
        assert!(trend.windows(2).all(|w| w[0].date < w[1].date));
        let last = trend.last().unwrap();
        assert_eq!(last.count, 2);
        assert!((last.mean - 7.0).abs() < 1e-12);
    }

    #[test]
    fn trend_skips_invalid_emotion() {
        let trend = temporal_trend(&[on((2024, 5, 3), f64::NAN)]);
        assert!(trend.is_empty());
    }

    #[test]
    fn vocabulary_is_sorted_and_distinct() {
        let records = vec![
            EmotionRecord {
                poi_type: "商场".to_string(),
                ..record(118.0, 36.8, 3.0)
            },
            record(118.0, 36.8, 3.0),
            EmotionRecord {
                poi_type: "商场".to_string(),
                ..record(118.0, 36.8, 3.0)
            },
        ];
        let types = poi_types(&records);
        assert_eq!(types.len(), 2);
        assert!(types.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(districts(&records), vec!["张店区".to_string()]);
    }

    #[test]
    fn spatial_stats_bundle() {
        let records = vec![record(118.0, 36.8, 3.0), record(118.1, 36.8, 5.0)];
        let stats = spatial_stats(&records);
        assert_eq!(stats.density.total, 2);
        assert_eq!(stats.by_poi_type["公园"].count, 2);
        assert_eq!(stats.by_time_slot[&TimeSlot::Morning].count, 2);
    }
}
