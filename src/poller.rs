//! Background poll loop driving the fetch, decode, normalize, publish cycle.

use std::sync::Arc;
use std::time::Duration;

use crate::metrics::MetricRegistry;
use crate::redash::{normalize, RedashClient};

/// Drives one fetch cycle per tick against the Redash status API.
pub struct Poller {
    client: RedashClient,
    registry: Arc<MetricRegistry>,
    interval: Duration,
}

impl Poller {
    pub fn new(client: RedashClient, registry: Arc<MetricRegistry>, interval: Duration) -> Self {
        Self {
            client,
            registry,
            interval,
        }
    }

    /// Run one poll cycle.
    ///
    /// The two endpoints publish independently: a failed status poll
    /// leaves every series at its last published value, and a failed
    /// task poll never undoes the status publish from the same cycle.
    pub async fn poll_once(&self) {
        match self.client.fetch_status().await {
            Ok(status) => {
                let sizes = normalize(&status);
                self.registry.publish_status(&status, &sizes);
            }
            Err(e) if e.is_decode() => {
                tracing::error!("status poll failed: {}. Is the API key correct?", e);
                return;
            }
            Err(e) => {
                tracing::error!("status poll failed: {}", e);
                return;
            }
        }

        match self.client.fetch_tasks().await {
            Ok(tasks) => self.registry.publish_active_tasks(tasks.tasks.len()),
            Err(e) if e.is_decode() => {
                tracing::error!("task poll failed: {}. Is the API key correct?", e);
            }
            Err(e) => {
                tracing::error!("task poll failed: {}", e);
            }
        }
    }

    /// Poll forever on a fixed interval. Cycles run inline in this task,
    /// so they never overlap; a cycle slower than the interval skips the
    /// missed ticks.
    pub async fn run(self) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            self.poll_once().await;
        }
    }
}
