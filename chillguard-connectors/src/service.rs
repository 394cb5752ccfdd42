//! Concurrent KPI Service
//!
//! ## Overview
//!
//! [`KpiService`] wires the three collaborators to the pure report builder:
//!
//! ```text
//!             ┌──────────────────┐
//!  telemetry ─┤                  │
//!  alerts    ─┤ join! + timeout  ├─► KpiReportBuilder ─► KpiReport
//!  prices    ─┤                  │
//!             └──────────────────┘
//! ```
//!
//! The fetches run concurrently, each under `fetch_timeout`. Telemetry and
//! alert failures abort the report; a price failure or timeout degrades to
//! the configured fallback. Nothing is retried here.
//!
//! Reports for many chambers run on a [`JoinSet`], one task per chamber,
//! and come back in request order.

use crate::{AlertStore, ConnectorError, MarketPriceFeed, TelemetryReader};
use chillguard_core::{
    time::window_start, AnalyticsConfig, AnalyticsError, KpiInputs, KpiReport, KpiReportBuilder,
    PriceSource, SystemStatistics, TimeSource,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;

/// Default bound on each collaborator fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Service errors
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A required collaborator failed or timed out
    #[error("{collaborator} fetch failed: {source}")]
    Upstream {
        collaborator: &'static str,
        source: ConnectorError,
    },

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    /// Report task panicked or was cancelled
    #[error("Report task failed: {0}")]
    Task(String),
}

/// Service configuration
#[derive(Debug, Clone, Copy)]
pub struct ServiceConfig {
    /// Calculator policy
    pub analytics: AnalyticsConfig,
    /// Bound on each collaborator fetch
    pub fetch_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            analytics: AnalyticsConfig::default(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl ServiceConfig {
    pub fn with_analytics(mut self, analytics: AnalyticsConfig) -> Self {
        self.analytics = analytics;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}

/// Fetches collaborator data and assembles KPI reports
#[derive(Clone)]
pub struct KpiService {
    telemetry: Arc<dyn TelemetryReader>,
    alerts: Arc<dyn AlertStore>,
    prices: Arc<dyn MarketPriceFeed>,
    clock: Arc<dyn TimeSource>,
    config: ServiceConfig,
}

impl KpiService {
    pub fn new(
        telemetry: Arc<dyn TelemetryReader>,
        alerts: Arc<dyn AlertStore>,
        prices: Arc<dyn MarketPriceFeed>,
        clock: Arc<dyn TimeSource>,
        config: ServiceConfig,
    ) -> Self {
        Self { telemetry, alerts, prices, clock, config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Report for one chamber over `timeframe_minutes`
    ///
    /// `None` uses the configured default timeframe.
    pub async fn report(
        &self,
        chamber_id: &str,
        timeframe_minutes: Option<u32>,
    ) -> Result<KpiReport, ServiceError> {
        let analytics = self.config.analytics.validate()?;
        let timeframe_minutes = timeframe_minutes.unwrap_or(analytics.default_timeframe_minutes);

        let now = self.clock.now();
        let since = window_start(now, timeframe_minutes);
        let limit = self.config.fetch_timeout;

        let (window, total_alerts, price) = tokio::join!(
            bounded(limit, "telemetry", self.telemetry.fetch(chamber_id, analytics.max_rows)),
            bounded(limit, "alerts", self.alerts.count_alerts(chamber_id, since)),
            self.fetch_price(analytics.fallback_price_per_kg),
        );

        let window = window?;
        let total_alerts = total_alerts?;

        log::debug!(
            "chamber {}: {} readings, {} alerts, price {:?}",
            chamber_id,
            window.len(),
            total_alerts,
            price
        );

        let report = KpiReportBuilder::new(analytics).build(KpiInputs {
            chamber_id,
            window: &window,
            now,
            timeframe_minutes,
            total_alerts,
            price,
        })?;

        Ok(report)
    }

    /// Reports for many chambers, in the order given
    pub async fn report_many(
        &self,
        chamber_ids: &[String],
        timeframe_minutes: Option<u32>,
    ) -> Vec<Result<KpiReport, ServiceError>> {
        let mut tasks = JoinSet::new();

        for (index, chamber_id) in chamber_ids.iter().enumerate() {
            let service = self.clone();
            let chamber_id = chamber_id.clone();
            tasks.spawn(async move { (index, service.report(&chamber_id, timeframe_minutes).await) });
        }

        let mut results: Vec<Option<Result<KpiReport, ServiceError>>> =
            (0..chamber_ids.len()).map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => log::error!("report task failed: {}", e),
            }
        }

        results
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| Err(ServiceError::Task("report task aborted".into()))))
            .collect()
    }

    /// Fleet statistics; unreachable chambers are counted, not fatal
    pub async fn statistics(
        &self,
        chamber_ids: &[String],
        timeframe_minutes: Option<u32>,
    ) -> Result<SystemStatistics, ServiceError> {
        let analytics = self.config.analytics.validate()?;

        let mut reports = Vec::with_capacity(chamber_ids.len());
        let mut unavailable = 0;

        for (chamber_id, result) in chamber_ids.iter().zip(self.report_many(chamber_ids, timeframe_minutes).await) {
            match result {
                Ok(report) => reports.push(report),
                Err(e) => {
                    log::warn!("chamber {} excluded from statistics: {}", chamber_id, e);
                    unavailable += 1;
                }
            }
        }

        Ok(SystemStatistics::from_reports(&reports, &analytics).with_unavailable(unavailable))
    }

    async fn fetch_price(&self, fallback: f64) -> PriceSource {
        match tokio::time::timeout(self.config.fetch_timeout, self.prices.average_price_per_kg()).await {
            Ok(PriceSource::Live(price)) => {
                let checked = PriceSource::live_or(Some(price), fallback);
                if checked.is_degraded() {
                    log::warn!("price feed returned unusable price {}, using fallback {}", price, fallback);
                }
                checked
            }
            Ok(price) => price,
            Err(_) => {
                log::warn!(
                    "price feed timed out after {:?}, using fallback {}",
                    self.config.fetch_timeout,
                    fallback
                );
                PriceSource::Fallback(fallback)
            }
        }
    }
}

/// Run a required fetch under `limit`
async fn bounded<T>(
    limit: Duration,
    collaborator: &'static str,
    fetch: impl std::future::Future<Output = Result<T, ConnectorError>>,
) -> Result<T, ServiceError> {
    let outcome = match tokio::time::timeout(limit, fetch).await {
        Ok(result) => result,
        Err(_) => Err(ConnectorError::Timeout),
    };

    outcome.map_err(|source| {
        log::warn!("{} fetch failed: {}", collaborator, source);
        ServiceError::Upstream { collaborator, source }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryAlerts, InMemoryTelemetry};
    use crate::price::StaticPriceFeed;
    use chillguard_core::{FixedTime, Reading, Timestamp, Window};

    const MINUTE: u64 = 60_000;
    const NOW: Timestamp = 1_733_956_200_000;

    struct FailingTelemetry;

    #[async_trait::async_trait]
    impl TelemetryReader for FailingTelemetry {
        async fn fetch(&self, _sensor_id: &str, _max_rows: usize) -> Result<Window, ConnectorError> {
            Err(ConnectorError::Unavailable("connection refused".into()))
        }
    }

    struct SlowPrices;

    #[async_trait::async_trait]
    impl MarketPriceFeed for SlowPrices {
        async fn average_price_per_kg(&self) -> PriceSource {
            tokio::time::sleep(Duration::from_secs(5)).await;
            PriceSource::Live(99.0)
        }
    }

    fn hot_readings() -> Vec<Reading> {
        // Three hot readings five minutes apart ending at NOW
        (0..3).map(|i| Reading::new(NOW - (10 - 5 * i) * MINUTE, 10.0, 8.0)).collect()
    }

    fn service_with(
        telemetry: Arc<dyn TelemetryReader>,
        prices: Arc<dyn MarketPriceFeed>,
    ) -> KpiService {
        let alerts = InMemoryAlerts::new().with_alerts("CF-1", vec![NOW - 90 * MINUTE, NOW - 5 * MINUTE]);
        KpiService::new(
            telemetry,
            Arc::new(alerts),
            prices,
            Arc::new(FixedTime::new(NOW)),
            ServiceConfig::default().with_fetch_timeout(Duration::from_millis(50)),
        )
    }

    #[tokio::test]
    async fn test_report_with_live_price() {
        let telemetry = InMemoryTelemetry::new().with_readings("CF-1", hot_readings());
        let service = service_with(Arc::new(telemetry), Arc::new(StaticPriceFeed::new(PriceSource::Live(30.0))));

        let report = service.report("CF-1", Some(60)).await.unwrap();

        assert_eq!(report.chamber_id, "CF-1");
        assert_eq!(report.hours_at_risk, 0.1667);
        assert_eq!(report.total_alerts, 1);
        assert_eq!(report.timeframe_minutes, 60);
        // 10/60 h of 4 h at 30/kg on 200 kg
        assert_eq!(report.estimated_cost, 250.0);
        assert_eq!(report.monthly_cost, 25.0);
        assert!(!report.is_degraded());
    }

    #[tokio::test]
    async fn test_default_timeframe() {
        let telemetry = InMemoryTelemetry::new().with_readings("CF-1", hot_readings());
        let service = service_with(Arc::new(telemetry), Arc::new(StaticPriceFeed::new(PriceSource::Live(30.0))));

        let report = service.report("CF-1", None).await.unwrap();
        assert_eq!(report.timeframe_minutes, 43_200);
        assert_eq!(report.total_alerts, 2);
    }

    #[tokio::test]
    async fn test_price_timeout_degrades() {
        let telemetry = InMemoryTelemetry::new().with_readings("CF-1", hot_readings());
        let service = service_with(Arc::new(telemetry), Arc::new(SlowPrices));

        let report = service.report("CF-1", Some(60)).await.unwrap();
        assert_eq!(report.price_source, PriceSource::Fallback(25.5));
        assert!(report.is_degraded());
    }

    #[tokio::test]
    async fn test_unusable_live_price_degrades() {
        for bad in [f64::NAN, f64::INFINITY, -3.0] {
            let telemetry = InMemoryTelemetry::new().with_readings("CF-1", hot_readings());
            let service = service_with(Arc::new(telemetry), Arc::new(StaticPriceFeed::new(PriceSource::Live(bad))));

            let report = service.report("CF-1", Some(60)).await.unwrap();
            assert_eq!(report.price_source, PriceSource::Fallback(25.5));
            assert_eq!(report.estimated_cost, 212.5);
        }
    }

    /// Six hours of hot samples every 5 s ending at NOW
    fn six_hot_hours() -> Vec<Reading> {
        (0..=6 * 720).map(|i| Reading::new(NOW - i * 5_000, 10.0, 8.0)).collect()
    }

    #[tokio::test]
    async fn test_default_timeframe_sees_whole_buffer() {
        let telemetry = InMemoryTelemetry::new().with_readings("CF-1", six_hot_hours());
        let service = service_with(Arc::new(telemetry), Arc::new(StaticPriceFeed::new(PriceSource::Live(25.5))));

        let report = service.report("CF-1", None).await.unwrap();
        assert_eq!(report.hours_at_risk, 6.0);
        assert_eq!(report.estimated_cost, 5100.0);
    }

    #[tokio::test]
    async fn test_truncated_buffer_rejected() {
        let telemetry = InMemoryTelemetry::new().with_readings("CF-1", six_hot_hours());
        let mut service = service_with(Arc::new(telemetry), Arc::new(StaticPriceFeed::new(PriceSource::Live(25.5))));
        service.config.analytics = service
            .config
            .analytics
            .with_default_timeframe_minutes(120)
            .with_max_rows(2_000);

        let err = service.report("CF-1", Some(360)).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Analytics(AnalyticsError::TruncatedWindow { rows: 2_000, timeframe_minutes: 360 })
        ));

        // Two hours fit in the same buffer
        assert!(service.report("CF-1", Some(120)).await.is_ok());
    }

    #[tokio::test]
    async fn test_telemetry_failure_is_fatal() {
        let service = service_with(Arc::new(FailingTelemetry), Arc::new(StaticPriceFeed::new(PriceSource::Live(30.0))));

        let err = service.report("CF-1", Some(60)).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Upstream { collaborator: "telemetry", source: ConnectorError::Unavailable(_) }
        ));
    }

    #[tokio::test]
    async fn test_empty_chamber_reports_zeros() {
        let service = service_with(
            Arc::new(InMemoryTelemetry::new()),
            Arc::new(StaticPriceFeed::new(PriceSource::Live(30.0))),
        );

        let report = service.report("CF-9", Some(60)).await.unwrap();
        assert_eq!(report.hours_at_risk, 0.0);
        assert_eq!(report.estimated_cost, 0.0);
        assert_eq!(report.uptime_percentage, 0.0);
        assert_eq!(report.avg_rate_of_change, 0.0);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let mut service = service_with(
            Arc::new(InMemoryTelemetry::new()),
            Arc::new(StaticPriceFeed::new(PriceSource::Live(30.0))),
        );
        service.config.analytics = service.config.analytics.with_max_rows(0);

        assert!(matches!(service.report("CF-1", None).await, Err(ServiceError::Analytics(_))));
    }

    #[tokio::test]
    async fn test_report_many_keeps_order() {
        let telemetry = InMemoryTelemetry::new()
            .with_readings("CF-1", hot_readings())
            .with_readings("CF-2", vec![Reading::new(NOW, 2.0, 8.0)]);
        let service = service_with(Arc::new(telemetry), Arc::new(StaticPriceFeed::new(PriceSource::Live(30.0))));

        let ids: Vec<String> = ["CF-2", "CF-1", "CF-3"].iter().map(|s| s.to_string()).collect();
        let reports = service.report_many(&ids, Some(60)).await;

        let names: Vec<&str> = reports.iter().map(|r| r.as_ref().unwrap().chamber_id.as_str()).collect();
        assert_eq!(names, vec!["CF-2", "CF-1", "CF-3"]);
    }

    #[tokio::test]
    async fn test_statistics_counts_unavailable() {
        let service = service_with(Arc::new(FailingTelemetry), Arc::new(StaticPriceFeed::new(PriceSource::Live(30.0))));

        let ids = vec!["CF-1".to_string(), "CF-2".to_string()];
        let stats = service.statistics(&ids, Some(60)).await.unwrap();

        assert_eq!(stats.chambers, 0);
        assert_eq!(stats.unavailable, 2);
    }
}
