//! Descriptive statistics: value distribution, coordinate correlation,
//! rounded-grid regional patterns, heatmap weights and a dataset overview.

use std::collections::BTreeMap;

use emotion_map_analytics_models::config::MAX_REGION_PRECISION;
use emotion_map_analytics_models::{
    CoordinateCorrelation, DatasetOverview, EmotionDistribution, HeatmapPoint, RegionalPattern,
    ValueRange,
};
use emotion_map_emotion_models::{CoordinateKey, EmotionRecord};

use crate::{AnalyticsError, density, require, valid_for};

/// Heatmap weight per valid record: `intensity = emotion / 10`.
#[must_use]
pub fn heatmap_points(records: &[EmotionRecord]) -> Vec<HeatmapPoint> {
    valid_for("heatmap_points", records)
        .into_iter()
        .map(|r| HeatmapPoint {
            lat: r.latitude,
            lng: r.longitude,
            intensity: r.emotion_value / 10.0,
        })
        .collect()
}

/// Count, range, mean, median, sample standard deviation and the
/// bias-corrected third and fourth standardized moments.
///
/// # Errors
///
/// * [`AnalyticsError::InsufficientInput`] with no valid records
#[allow(clippy::cast_precision_loss)]
pub fn emotion_distribution(
    records: &[EmotionRecord],
) -> Result<EmotionDistribution, AnalyticsError> {
    let mut values: Vec<f64> = valid_for("emotion_distribution", records)
        .into_iter()
        .map(|r| r.emotion_value)
        .collect();
    let count = values.len();
    require("emotion_distribution", 1, count)?;

    values.sort_by(f64::total_cmp);
    let n = count as f64;
    let mean = values.iter().sum::<f64>() / n;
    let median = if count % 2 == 0 {
        f64::midpoint(values[count / 2 - 1], values[count / 2])
    } else {
        values[count / 2]
    };

    let moment = |p: i32| values.iter().map(|v| (v - mean).powi(p)).sum::<f64>() / n;
    let m2 = moment(2);
    let m3 = moment(3);
    let m4 = moment(4);

    let std_dev = (count > 1).then(|| (m2 * n / (n - 1.0)).sqrt());
    let skewness = (count > 2 && m2 > 0.0).then(|| {
        let g1 = m3 / m2.powf(1.5);
        (n * (n - 1.0)).sqrt() / (n - 2.0) * g1
    });
    let kurtosis = (count > 3 && m2 > 0.0).then(|| {
        let g2 = m4 / (m2 * m2) - 3.0;
        (n + 1.0).mul_add(g2, 6.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0))
    });

    Ok(EmotionDistribution {
        count,
        min: values[0],
        max: values[count - 1],
        mean,
        median,
        std_dev,
        skewness,
        kurtosis,
    })
}

/// Pearson correlation of longitude and of latitude with emotion value.
///
/// # Errors
///
/// * [`AnalyticsError::InsufficientInput`] with fewer than two valid records
pub fn coordinate_correlation(
    records: &[EmotionRecord],
) -> Result<CoordinateCorrelation, AnalyticsError> {
    let valid = valid_for("coordinate_correlation", records);
    require("coordinate_correlation", 2, valid.len())?;

    let emotion: Vec<f64> = valid.iter().map(|r| r.emotion_value).collect();
    let longitude: Vec<f64> = valid.iter().map(|r| r.longitude).collect();
    let latitude: Vec<f64> = valid.iter().map(|r| r.latitude).collect();

    Ok(CoordinateCorrelation {
        longitude: pearson(&longitude, &emotion),
        latitude: pearson(&latitude, &emotion),
    })
}

/// Pearson r, or `None` when either series has zero variance.
#[allow(clippy::cast_precision_loss)]
fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Mean emotion per grid cell after rounding coordinates to `precision`
/// decimal places, keeping cells with more than `min_count` records.
///
/// Rounding is half away from zero. `precision` is capped at
/// [`MAX_REGION_PRECISION`]. Cells are ordered by longitude then latitude.
#[must_use]
pub fn regional_patterns(
    records: &[EmotionRecord],
    precision: u32,
    min_count: usize,
) -> Vec<RegionalPattern> {
    if precision > MAX_REGION_PRECISION {
        log::debug!("regional_patterns: precision {precision} capped at {MAX_REGION_PRECISION}");
    }
    let precision = precision.min(MAX_REGION_PRECISION);
    let factor = 10_f64.powi(i32::try_from(precision).unwrap_or(i32::MAX));
    let round = |v: f64| (v * factor).round() / factor;

    let mut cells: BTreeMap<CoordinateKey, Vec<f64>> = BTreeMap::new();
    for record in valid_for("regional_patterns", records) {
        cells
            .entry(CoordinateKey::new(round(record.longitude), round(record.latitude)))
            .or_default()
            .push(record.emotion_value);
    }

    #[allow(clippy::cast_precision_loss)]
    let mut patterns: Vec<_> = cells
        .into_iter()
        .filter(|(_, values)| values.len() > min_count)
        .map(|(key, values)| RegionalPattern {
            longitude: key.longitude(),
            latitude: key.latitude(),
            mean_emotion: values.iter().sum::<f64>() / values.len() as f64,
            count: values.len(),
        })
        .collect();
    patterns.sort_by(|a, b| {
        a.longitude
            .total_cmp(&b.longitude)
            .then(a.latitude.total_cmp(&b.latitude))
    });
    patterns
}

/// Record counts, distinct locations and value ranges.
#[must_use]
pub fn overview(records: &[EmotionRecord]) -> DatasetOverview {
    let valid = valid_for("overview", records);

    let range = |field: fn(&EmotionRecord) -> f64| {
        valid.iter().map(|r| field(r)).fold(None, |acc: Option<ValueRange>, v| {
            Some(acc.map_or(ValueRange { min: v, max: v }, |r| ValueRange {
                min: r.min.min(v),
                max: r.max.max(v),
            }))
        })
    };
    let date_range = valid
        .iter()
        .map(|r| r.date)
        .min()
        .zip(valid.iter().map(|r| r.date).max());

    DatasetOverview {
        total_records: records.len(),
        valid_records: valid.len(),
        invalid_records: records.len() - valid.len(),
        distinct_locations: density::classify_density(records).total,
        date_range,
        longitude_range: range(|r| r.longitude),
        latitude_range: range(|r| r.latitude),
        emotion_range: range(|r| r.emotion_value),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::test_records::record;

    fn values(vs: &[f64]) -> Vec<EmotionRecord> {
        vs.iter()
            .enumerate()
            .map(|(i, v)| {
                #[allow(clippy::cast_precision_loss)]
                let offset = i as f64 * 0.01;
                record(118.0 + offset, 36.8 + offset, *v)
            })
            .collect()
    }

    #[test]
    fn heatmap_scales_by_ten() {
        let points = heatmap_points(&values(&[7.5, f64::NAN]));
        assert_eq!(points.len(), 1);
        assert!((points[0].intensity - 0.75).abs() < 1e-12);
        assert!((points[0].lat - 36.8).abs() < 1e-12);
    }

    #[test]
    fn distribution_of_known_sample() {
        let dist = emotion_distribution(&values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0])).unwrap();
        assert_eq!(dist.count, 8);
        assert!((dist.mean - 5.0).abs() < 1e-12);
        assert!((dist.median - 4.5).abs() < 1e-12);
        assert!((dist.min - 2.0).abs() < 1e-12);
        assert!((dist.max - 9.0).abs() < 1e-12);
        // Sum of squares 32, n - 1 = 7.
        assert!((dist.std_dev.unwrap() - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
        // Adjusted Fisher-Pearson coefficient of this sample.
        assert!((dist.skewness.unwrap() - 0.818_487).abs() < 1e-5);
        assert!((dist.kurtosis.unwrap() - 0.940_625).abs() < 1e-5);
    }

    #[test]
    fn distribution_small_samples() {
        let one = emotion_distribution(&values(&[3.0])).unwrap();
        assert_eq!(one.std_dev, None);
        assert_eq!(one.skewness, None);
        assert!((one.median - 3.0).abs() < 1e-12);

        let flat = emotion_distribution(&values(&[3.0, 3.0, 3.0, 3.0])).unwrap();
        assert_eq!(flat.std_dev, Some(0.0));
        assert_eq!(flat.skewness, None);
        assert_eq!(flat.kurtosis, None);

        assert!(matches!(
            emotion_distribution(&[]),
            Err(AnalyticsError::InsufficientInput { .. })
        ));
    }

    #[test]
    fn correlation_of_linear_trend() {
        let records: Vec<_> = (0..5)
            .map(|i| {
                let x = f64::from(i);
                record(118.0 + x * 0.01, 36.8, 2.0 * x + 1.0)
            })
            .collect();
        let corr = coordinate_correlation(&records).unwrap();
        assert!((corr.longitude.unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(corr.latitude, None);
    }

    #[test]
    fn correlation_needs_two_records() {
        assert!(matches!(
            coordinate_correlation(&values(&[1.0])),
            Err(AnalyticsError::InsufficientInput {
                required: 2,
                ..
            })
        ));
    }

    #[test]
    fn regional_patterns_keep_busy_cells() {
        let mut records = Vec::new();
        for i in 0..6 {
            let jitter = f64::from(i) * 0.001;
            records.push(record(118.02 + jitter, 36.81 + jitter, f64::from(i)));
        }
        records.push(record(118.4, 36.5, 9.0));

        let patterns = regional_patterns(&records, 1, 5);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].count, 6);
        assert!((patterns[0].longitude - 118.0).abs() < 1e-9);
        assert!((patterns[0].latitude - 36.8).abs() < 1e-9);
        assert!((patterns[0].mean_emotion - 2.5).abs() < 1e-12);

        assert_eq!(regional_patterns(&records, 1, 0).len(), 2);
    }

    #[test]
    fn regional_precision_is_capped() {
        let records = vec![
            record(118.0, 36.8, 2.0),
            record(118.0, 36.8, 4.0),
            record(118.3, 36.9, 6.0),
        ];
        let capped = regional_patterns(&records, 400, 0);
        assert_eq!(capped, regional_patterns(&records, MAX_REGION_PRECISION, 0));
        assert_eq!(capped.len(), 2);
        assert!(capped.iter().all(|p| p.longitude.is_finite() && p.latitude.is_finite()));
        assert_eq!(capped[0].count, 2);
    }

    #[test]
    fn overview_counts_and_ranges() {
        let mut records = values(&[2.0, 8.0, 5.0]);
        records[1].date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        records.push(record(f64::NAN, 36.8, 1.0));

        let summary = overview(&records);
        assert_eq!(summary.total_records, 4);
        assert_eq!(summary.valid_records, 3);
        assert_eq!(summary.invalid_records, 1);
        assert_eq!(summary.distinct_locations, 3);
        let emotion = summary.emotion_range.unwrap();
        assert!((emotion.min - 2.0).abs() < 1e-12);
        assert!((emotion.max - 8.0).abs() < 1e-12);
        let (first, last) = summary.date_range.unwrap();
        assert!(first < last);
    }

    #[test]
    fn overview_of_empty_input() {
        let summary = overview(&[]);
        assert_eq!(summary.total_records, 0);
        assert!(summary.longitude_range.is_none());
        assert!(summary.date_range.is_none());
    }
}
