//! Gauge registry for the published Redash series.

use std::collections::HashMap;
use std::sync::Mutex;

use prometheus::{Gauge, GaugeVec, Opts, Registry, TextEncoder};

use crate::redash::{StatusSnapshot, DB_SIZE_KEY, QUERY_RESULTS_SIZE_KEY};

/// All gauge series the exporter publishes.
///
/// Single writer (the poll loop), many concurrent readers (scrape
/// handlers). A publish pass sets every system-status series under one
/// lock so a render never mixes values from two snapshots; the task
/// count is published separately and may lag one cycle by design.
pub struct MetricRegistry {
    registry: Registry,
    publish_lock: Mutex<()>,

    info: GaugeVec,
    dashboards_count: Gauge,
    query_results_size: Gauge,
    db_size: Gauge,
    outdated_queries_count: Gauge,
    queues_celery: Gauge,
    queues_queries: Gauge,
    queues_scheduled_queries: Gauge,
    queries_count: Gauge,
    query_results_count: Gauge,
    redis_used_memory: Gauge,
    unused_query_results_count: Gauge,
    widgets_count: Gauge,
    active_tasks: Gauge,
}

fn gauge(registry: &Registry, name: &str, help: &str) -> Result<Gauge, prometheus::Error> {
    let g = Gauge::with_opts(Opts::new(name, help))?;
    registry.register(Box::new(g.clone()))?;
    Ok(g)
}

impl MetricRegistry {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let info = GaugeVec::new(
            Opts::new("redash_info", "Information of Redash."),
            &["redash_version"],
        )?;
        registry.register(Box::new(info.clone()))?;

        Ok(Self {
            info,
            dashboards_count: gauge(
                &registry,
                "redash_dashboards_count",
                "Number of dashboards in Redash.",
            )?,
            query_results_size: gauge(
                &registry,
                "redash_query_results_size_bytes",
                "Size of Redash query results.",
            )?,
            db_size: gauge(&registry, "redash_db_size_bytes", "Size of Redash database.")?,
            outdated_queries_count: gauge(
                &registry,
                "redash_outdated_queries_count",
                "Number of outdated queries.",
            )?,
            queues_celery: gauge(&registry, "redash_queues_celery", "Number of celery queues.")?,
            queues_queries: gauge(&registry, "redash_queues_queries", "Number of query queues.")?,
            queues_scheduled_queries: gauge(
                &registry,
                "redash_queues_scheduled_queries",
                "Number of scheduled query queues.",
            )?,
            queries_count: gauge(
                &registry,
                "redash_queries_count",
                "Number of queries stored in redash.",
            )?,
            query_results_count: gauge(
                &registry,
                "redash_query_results_count",
                "Number of query results.",
            )?,
            redis_used_memory: gauge(
                &registry,
                "redash_redis_used_memory_bytes",
                "Memory size used by redis in Redash.",
            )?,
            unused_query_results_count: gauge(
                &registry,
                "redash_unused_query_results_count",
                "Number of unused query results.",
            )?,
            // Metric name spelling is part of the published contract.
            widgets_count: gauge(&registry, "redash_wigets_count", "Number of widgets.")?,
            active_tasks: gauge(&registry, "redash_active_tasks", "Active tasks count.")?,
            registry,
            publish_lock: Mutex::new(()),
        })
    }

    /// Publish every system-status series from one snapshot.
    pub fn publish_status(&self, status: &StatusSnapshot, sizes: &HashMap<String, f64>) {
        let _guard = self.publish_lock.lock().unwrap();

        // One info series per version; drop the previous label on upgrade.
        self.info.reset();
        self.info
            .with_label_values(&[status.redash_version.as_str()])
            .set(1.0);

        self.dashboards_count.set(status.dashboards_count);
        self.query_results_size
            .set(sizes.get(QUERY_RESULTS_SIZE_KEY).copied().unwrap_or(0.0));
        self.db_size.set(sizes.get(DB_SIZE_KEY).copied().unwrap_or(0.0));
        self.outdated_queries_count
            .set(status.manager.outdated_queries_count);
        self.queues_celery.set(status.manager.queues.celery.size);
        self.queues_queries.set(status.manager.queues.queries.size);
        self.queues_scheduled_queries
            .set(status.manager.queues.scheduled_queries.size);
        self.queries_count.set(status.queries_count);
        self.query_results_count.set(status.query_results_count);
        self.redis_used_memory.set(status.redis_used_memory);
        self.unused_query_results_count
            .set(status.unused_query_results_count);
        self.widgets_count.set(status.widgets_count);
    }

    /// Publish the active background task count.
    pub fn publish_active_tasks(&self, count: usize) {
        let _guard = self.publish_lock.lock().unwrap();
        self.active_tasks.set(count as f64);
    }

    /// Render every series in Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let _guard = self.publish_lock.lock().unwrap();
        let mut body = String::new();
        TextEncoder::new().encode_utf8(&self.registry.gather(), &mut body)?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redash::{decode_status, normalize};

    const FIXTURE: &[u8] = br#"{
        "dashboards_count": 12,
        "database_metrics": {
            "metrics": [["Query Results Size", 500], ["Redash DB Size", 900]]
        },
        "manager": {
            "outdated_queries_count": "7",
            "queues": {
                "celery": {"size": 3},
                "queries": {"size": 1},
                "scheduled_queries": {"size": 0}
            }
        },
        "queries_count": 40,
        "query_results_count": 64,
        "redis_used_memory": 4096,
        "unused_query_results_count": 2,
        "version": "8.0.0",
        "widgets_count": 9
    }"#;

    fn publish_fixture(registry: &MetricRegistry) {
        let status = decode_status(FIXTURE).unwrap();
        let sizes = normalize(&status);
        registry.publish_status(&status, &sizes);
    }

    #[test]
    fn test_fixture_poll_renders_expected_series() {
        let registry = MetricRegistry::new().unwrap();
        publish_fixture(&registry);
        registry.publish_active_tasks(4);

        let body = registry.render().unwrap();
        assert!(body.contains(r#"redash_info{redash_version="8.0.0"} 1"#));
        assert!(body.contains("redash_dashboards_count 12"));
        assert!(body.contains("redash_query_results_size_bytes 500"));
        assert!(body.contains("redash_db_size_bytes 900"));
        assert!(body.contains("redash_outdated_queries_count 7"));
        assert!(body.contains("redash_queues_celery 3"));
        assert!(body.contains("redash_queues_queries 1"));
        assert!(body.contains("redash_queues_scheduled_queries 0"));
        assert!(body.contains("redash_queries_count 40"));
        assert!(body.contains("redash_query_results_count 64"));
        assert!(body.contains("redash_redis_used_memory_bytes 4096"));
        assert!(body.contains("redash_unused_query_results_count 2"));
        assert!(body.contains("redash_wigets_count 9"));
        assert!(body.contains("redash_active_tasks 4"));
    }

    #[test]
    fn test_missing_size_metrics_publish_as_zero() {
        let registry = MetricRegistry::new().unwrap();
        let status = decode_status(br#"{"version": "9.0.0"}"#).unwrap();
        let sizes = normalize(&status);
        registry.publish_status(&status, &sizes);

        let body = registry.render().unwrap();
        assert!(body.contains("redash_query_results_size_bytes 0"));
        assert!(body.contains("redash_db_size_bytes 0"));
    }

    #[test]
    fn test_version_upgrade_replaces_info_label() {
        let registry = MetricRegistry::new().unwrap();
        publish_fixture(&registry);

        let status = decode_status(br#"{"version": "9.0.0"}"#).unwrap();
        let sizes = normalize(&status);
        registry.publish_status(&status, &sizes);

        let body = registry.render().unwrap();
        assert!(body.contains(r#"redash_info{redash_version="9.0.0"} 1"#));
        assert!(!body.contains(r#"redash_version="8.0.0""#));
    }

    #[test]
    fn test_task_publish_leaves_status_series_alone() {
        let registry = MetricRegistry::new().unwrap();
        publish_fixture(&registry);
        registry.publish_active_tasks(7);

        let body = registry.render().unwrap();
        assert!(body.contains("redash_dashboards_count 12"));
        assert!(body.contains("redash_active_tasks 7"));
    }
}
