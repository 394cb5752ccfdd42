//! In-memory collaborators
//!
//! Hold telemetry and alerts in process. Useful for replaying captured
//! buffers and for exercising the service without a backend.

use crate::{AlertStore, ConnectorError, TelemetryReader};
use chillguard_core::{Reading, Timestamp, Window};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Telemetry keyed by sensor id
#[derive(Debug, Default)]
pub struct InMemoryTelemetry {
    readings: RwLock<HashMap<String, Vec<Reading>>>,
}

impl InMemoryTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed readings for a sensor
    pub fn with_readings(mut self, sensor_id: impl Into<String>, readings: Vec<Reading>) -> Self {
        self.readings.get_mut().insert(sensor_id.into(), readings);
        self
    }

    /// Append one reading
    pub async fn push(&self, sensor_id: &str, reading: Reading) {
        self.readings
            .write()
            .await
            .entry(sensor_id.to_string())
            .or_default()
            .push(reading);
    }
}

#[async_trait::async_trait]
impl TelemetryReader for InMemoryTelemetry {
    async fn fetch(&self, sensor_id: &str, max_rows: usize) -> Result<Window, ConnectorError> {
        let store = self.readings.read().await;
        let Some(readings) = store.get(sensor_id) else {
            return Ok(Window::empty());
        };

        let mut readings = readings.clone();
        readings.sort_by_key(|r| r.timestamp);
        if readings.len() > max_rows {
            readings.drain(..readings.len() - max_rows);
        }

        Window::new(readings).map_err(|e| ConnectorError::Malformed(e.to_string()))
    }
}

/// Alert timestamps keyed by sensor id
#[derive(Debug, Default)]
pub struct InMemoryAlerts {
    alerts: RwLock<HashMap<String, Vec<Timestamp>>>,
}

impl InMemoryAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed alert timestamps for a sensor
    pub fn with_alerts(mut self, sensor_id: impl Into<String>, timestamps: Vec<Timestamp>) -> Self {
        self.alerts.get_mut().insert(sensor_id.into(), timestamps);
        self
    }

    /// Record one alert
    pub async fn record(&self, sensor_id: &str, timestamp: Timestamp) {
        self.alerts
            .write()
            .await
            .entry(sensor_id.to_string())
            .or_default()
            .push(timestamp);
    }
}

#[async_trait::async_trait]
impl AlertStore for InMemoryAlerts {
    async fn count_alerts(&self, sensor_id: &str, since: Timestamp) -> Result<u32, ConnectorError> {
        let store = self.alerts.read().await;
        let count = store
            .get(sensor_id)
            .map(|timestamps| timestamps.iter().filter(|&&t| t >= since).count())
            .unwrap_or(0);

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_sorted_and_bounded() {
        let telemetry = InMemoryTelemetry::new();
        for (t, temp) in [(3_000u64, 3.0), (1_000, 1.0), (2_000, 2.0)] {
            telemetry.push("CF-1", Reading::new(t, temp, 8.0)).await;
        }

        let window = telemetry.fetch("CF-1", 2).await.unwrap();
        let temps: Vec<f64> = window.iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![2.0, 3.0]);
    }

    #[tokio::test]
    async fn test_unknown_sensor_is_empty() {
        let telemetry = InMemoryTelemetry::new();
        assert!(telemetry.fetch("nope", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_count_alerts_since() {
        let alerts = InMemoryAlerts::new();
        for t in [100, 200, 300] {
            alerts.record("CF-1", t).await;
        }

        assert_eq!(alerts.count_alerts("CF-1", 200).await.unwrap(), 2);
        assert_eq!(alerts.count_alerts("CF-2", 0).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_seeded_builders() {
        let telemetry = InMemoryTelemetry::new().with_readings("CF-1", vec![Reading::new(0, 1.0, 8.0)]);
        let alerts = InMemoryAlerts::new().with_alerts("CF-1", vec![5]);

        assert_eq!(telemetry.fetch("CF-1", 10).await.unwrap().len(), 1);
        assert_eq!(alerts.count_alerts("CF-1", 5).await.unwrap(), 1);
    }
}
