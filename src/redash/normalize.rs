//! Reconciliation of the heterogeneous database metrics list.

use std::collections::HashMap;

use super::{MetricCell, StatusSnapshot};

/// Label of the query results storage size metric.
pub const QUERY_RESULTS_SIZE_KEY: &str = "Query Results Size";
/// Label of the database storage size metric.
pub const DB_SIZE_KEY: &str = "Redash DB Size";

/// Flatten the database metrics pairs into a name → value map.
///
/// Each pair carries one text cell (the label) and one number cell (the
/// value), in either order. Pairs missing a text or a number cell are
/// skipped. Duplicate labels resolve last-write-wins. Labels with no
/// published series stay in the map unused.
pub fn normalize(status: &StatusSnapshot) -> HashMap<String, f64> {
    let mut metrics = HashMap::new();

    for pair in &status.database_metrics.metrics {
        let mut key = None;
        let mut value = None;
        for cell in pair {
            match cell {
                MetricCell::Text(s) => key = Some(s.clone()),
                MetricCell::Number(n) => value = Some(*n),
                MetricCell::Other(_) => {}
            }
        }
        if let (Some(key), Some(value)) = (key, value) {
            metrics.insert(key, value);
        }
    }

    metrics
}
