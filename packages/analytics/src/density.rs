//! Fixed-proportion density banding.
//!
//! Distinct locations are split 30% high, 30% medium, remainder low. This
//! is a display heuristic for the dashboard legend; it measures nothing
//! about how densely observations actually cluster.

use std::collections::BTreeSet;

use emotion_map_analytics_models::DensityBands;
use emotion_map_emotion_models::EmotionRecord;

use crate::valid_for;

/// Splits the distinct `(longitude, latitude)` pairs of the valid records
/// into bands.
///
/// `high = medium = floor(0.3 * total)`, computed in exact integer
/// arithmetic, and `low` takes the remainder.
#[must_use]
pub fn classify_density(records: &[EmotionRecord]) -> DensityBands {
    let total = valid_for("classify_density", records)
        .into_iter()
        .map(EmotionRecord::coordinate_key)
        .collect::<BTreeSet<_>>()
        .len();
    let high = total * 3 / 10;
    let medium = high;
    DensityBands {
        high,
        medium,
        low: total - high - medium,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_records::record;

    #[test]
    fn bands_partition_distinct_locations() {
        for n in 0_u32..40 {
            let records: Vec<_> = (0..n)
                .map(|i| record(118.0 + f64::from(i) * 0.01, 36.8, 5.0))
                .collect();
            let bands = classify_density(&records);
            assert_eq!(bands.total, usize::try_from(n).unwrap());
            assert_eq!(bands.high + bands.medium + bands.low, bands.total);
        }
    }

    #[test]
    fn ten_locations_split_three_three_four() {
        let records: Vec<_> = (0..10)
            .map(|i| record(118.0 + f64::from(i) * 0.01, 36.8, 5.0))
            .collect();
        let bands = classify_density(&records);
        assert_eq!((bands.high, bands.medium, bands.low), (3, 3, 4));
    }

    #[test]
    fn duplicates_and_invalid_records_collapse() {
        let records = vec![
            record(118.0, 36.8, 5.0),
            record(118.0, 36.8, 7.0),
            record(-0.0, 0.0, 1.0),
            record(0.0, 0.0, 1.0),
            record(118.0, f64::NAN, 1.0),
        ];
        assert_eq!(classify_density(&records).total, 2);
    }
}
