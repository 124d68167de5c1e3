// Data source trait for raw device telemetry
use crate::domain::telemetry::TelemetrySample;
use async_trait::async_trait;

#[async_trait]
pub trait AnalyticsDataSource: Send + Sync {
    /// List every device that has reported telemetry
    async fn list_device_ids(&self) -> anyhow::Result<Vec<String>>;

    /// Raw samples for one device over the last `hours`, in any order
    async fn fetch_samples(&self, device_id: &str, hours: i32) -> anyhow::Result<Vec<TelemetrySample>>;
}
