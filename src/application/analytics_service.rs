// Trip analytics service - Use cases for device and fleet reports
use crate::application::data_source::AnalyticsDataSource;
use crate::domain::fleet::aggregate;
use crate::domain::idle::classify_idle_time;
use crate::domain::report::{DeviceReport, FleetReport};
use crate::domain::segmentation::detect_trips;
use crate::domain::telemetry::TelemetrySample;
use crate::infrastructure::config::AnalyticsSettings;
use anyhow::Context;
use std::sync::Arc;

#[derive(Clone)]
pub struct TripAnalyticsService {
    data_source: Arc<dyn AnalyticsDataSource>,
    settings: AnalyticsSettings,
}

impl TripAnalyticsService {
    pub fn new(data_source: Arc<dyn AnalyticsDataSource>, settings: AnalyticsSettings) -> Self {
        Self {
            data_source,
            settings,
        }
    }

    pub fn settings(&self) -> &AnalyticsSettings {
        &self.settings
    }

    pub async fn list_devices(&self) -> anyhow::Result<Vec<String>> {
        self.data_source.list_device_ids().await
    }

    pub async fn device_report(&self, device_id: &str, hours: i32) -> anyhow::Result<DeviceReport> {
        let samples = self
            .data_source
            .fetch_samples(device_id, hours)
            .await
            .with_context(|| format!("Failed to fetch telemetry for device {}", device_id))?;

        tracing::debug!("Fetched {} samples for device {}", samples.len(), device_id);
        Ok(self.analyze(device_id, &samples))
    }

    /// Run both passes over one device's samples.
    ///
    /// Trip detection and idle classification are independent scans of the
    /// same input; neither sees the other's filtering.
    pub fn analyze(&self, device_id: &str, samples: &[TelemetrySample]) -> DeviceReport {
        let trips = detect_trips(samples, &self.settings.trips);
        let idle = classify_idle_time(samples, &self.settings.idle);
        let statistics = aggregate(&trips, &self.settings.fuel);

        DeviceReport {
            device_id: device_id.to_string(),
            trips,
            idle,
            statistics,
        }
    }

    /// Analyse every device concurrently and aggregate all of their trips.
    ///
    /// Devices whose telemetry cannot be fetched are logged and left out.
    pub async fn fleet_report(&self, hours: i32) -> anyhow::Result<FleetReport> {
        let device_ids = self
            .data_source
            .list_device_ids()
            .await
            .context("Failed to list devices")?;

        let tasks = device_ids.into_iter().map(|device_id| {
            let service = self.clone();
            tokio::spawn(async move {
                let report = service.device_report(&device_id, hours).await;
                (device_id, report)
            })
        });

        let mut devices = Vec::new();
        for joined in futures::future::join_all(tasks).await {
            match joined {
                Ok((_, Ok(report))) => devices.push(report),
                Ok((device_id, Err(e))) => {
                    tracing::warn!("Skipping device {}: {:#}", device_id, e);
                }
                Err(e) => {
                    tracing::error!("Device analysis task failed: {}", e);
                }
            }
        }

        let statistics = aggregate(
            devices.iter().flat_map(|d| d.trips.iter()),
            &self.settings.fuel,
        );
        tracing::info!(
            "Fleet report over {}h: {} devices, {} trips",
            hours,
            devices.len(),
            statistics.total_trips
        );

        Ok(FleetReport {
            devices,
            statistics,
        })
    }
}
