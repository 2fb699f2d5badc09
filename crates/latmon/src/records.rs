//! Per-address aggregation over raw latency samples.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::stats;
use crate::storage::models::LatencySample;

/// Derived per-address statistics. Computed on demand, never persisted.
///
/// `average` and `std_dev` are `-1.0` when the group has no successful
/// probes; `min_value`/`max_value` degenerate to `+inf`/`-inf` in the same
/// case (both serialize as `null`).
#[derive(Debug, Clone, Serialize)]
pub struct AggregateRecord {
    pub address: String,
    /// Every latency in encounter order, failed probes included.
    pub values: Vec<f64>,
    pub packet_loss_rate: f64,
    pub average: f64,
    pub std_dev: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub latest: DateTime<Utc>,
}

/// Group `samples` by address and derive statistics for each group.
///
/// Callers pass samples ordered most-recent-first, so the first sample seen
/// in a group supplies `latest`. Success means `latency_ms > 0`; loss rate
/// counts everything else. Output order follows map iteration and is not
/// guaranteed.
pub fn aggregate(samples: &[LatencySample]) -> Vec<AggregateRecord> {
    let mut groups: HashMap<&str, Vec<&LatencySample>> = HashMap::new();
    for sample in samples {
        groups.entry(sample.address.as_str()).or_default().push(sample);
    }

    groups
        .into_iter()
        .map(|(address, group)| {
            let values: Vec<f64> = group.iter().map(|sample| sample.latency_ms).collect();
            let successes: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0).collect();
            let packet_loss_rate =
                (values.len() - successes.len()) as f64 / values.len() as f64;

            let (average, std_dev) = if successes.is_empty() {
                (-1.0, -1.0)
            } else {
                let mean = stats::average(&successes);
                (mean, stats::std_deviation(&successes, mean))
            };

            AggregateRecord {
                address: address.to_string(),
                packet_loss_rate,
                average,
                std_dev,
                min_value: successes.iter().copied().fold(f64::INFINITY, f64::min),
                max_value: successes.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                latest: group[0].created_at,
                values,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn sample(address: &str, latency_ms: f64, minute: u32) -> LatencySample {
        LatencySample {
            id: None,
            target_id: Uuid::new_v4(),
            address: address.to_string(),
            latency_ms,
            created_at: Utc.with_ymd_and_hms(2026, 1, 15, 12, minute, 0).unwrap(),
        }
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn group_with_no_successes_uses_sentinels() {
        let records = aggregate(&[sample("10.0.0.1", -1.0, 5), sample("10.0.0.1", -1.0, 4)]);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.packet_loss_rate, 1.0);
        assert_eq!(record.average, -1.0);
        assert_eq!(record.std_dev, -1.0);
        assert_eq!(record.min_value, f64::INFINITY);
        assert_eq!(record.max_value, f64::NEG_INFINITY);
        assert_eq!(record.values, vec![-1.0, -1.0]);
    }

    #[test]
    fn groups_mixed_addresses_with_partial_loss() {
        let records = aggregate(&[
            sample("1.1.1.1", 10.0, 3),
            sample("1.1.1.1", -1.0, 2),
            sample("2.2.2.2", 20.0, 1),
        ]);

        assert_eq!(records.len(), 2);
        let one = records.iter().find(|r| r.address == "1.1.1.1").unwrap();
        assert_eq!(one.packet_loss_rate, 0.5);
        assert_eq!(one.average, 10.0);
        assert_eq!(one.min_value, 10.0);
        assert_eq!(one.max_value, 10.0);

        let two = records.iter().find(|r| r.address == "2.2.2.2").unwrap();
        assert_eq!(two.packet_loss_rate, 0.0);
        assert_eq!(two.average, 20.0);
        assert_eq!(two.std_dev, 0.0);
    }

    #[test]
    fn latest_comes_from_first_sample_in_group() {
        // Input is ordered most-recent-first, as storage queries return it.
        let records = aggregate(&[sample("3.3.3.3", 5.0, 30), sample("3.3.3.3", 7.0, 10)]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].latest, Utc.with_ymd_and_hms(2026, 1, 15, 12, 30, 0).unwrap());
    }

    #[test]
    fn infinite_sentinels_serialize_as_null() {
        let records = aggregate(&[sample("10.0.0.9", -1.0, 0)]);
        let json = serde_json::to_value(&records).unwrap();

        assert!(json[0]["min_value"].is_null());
        assert!(json[0]["max_value"].is_null());
    }
}
