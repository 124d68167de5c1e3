// Streaming fleet service - Progressive per-device delivery
use crate::application::analytics_service::TripAnalyticsService;
use crate::domain::report::DeviceReport;
use std::time::Instant;
use tokio::sync::mpsc;

const CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum FleetStreamMessage {
    /// Device ids about to be analysed, sent first
    Started { device_ids: Vec<String> },
    Device(DeviceReport),
    DeviceFailed { device_id: String, reason: String },
    /// Always the last message
    Complete { devices: usize, duration_ms: i64 },
}

#[derive(Clone)]
pub struct StreamingAnalyticsService {
    analytics: TripAnalyticsService,
}

impl StreamingAnalyticsService {
    pub fn new(analytics: TripAnalyticsService) -> Self {
        Self { analytics }
    }

    /// Analyse every device in its own task and forward each report as soon
    /// as it is ready.
    pub async fn stream_fleet(&self, hours: i32) -> mpsc::Receiver<FleetStreamMessage> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let start_time = Instant::now();

        let device_ids = self.analytics.list_devices().await.unwrap_or_else(|e| {
            tracing::error!("Failed to list devices for stream: {:#}", e);
            Vec::new()
        });
        tracing::debug!("Streaming analytics for {} devices", device_ids.len());

        let _ = tx
            .send(FleetStreamMessage::Started {
                device_ids: device_ids.clone(),
            })
            .await;

        let total_devices = device_ids.len();
        let mut handles = Vec::with_capacity(total_devices);
        for device_id in device_ids {
            let tx = tx.clone();
            let analytics = self.analytics.clone();

            handles.push(tokio::spawn(async move {
                let msg = match analytics.device_report(&device_id, hours).await {
                    Ok(report) => FleetStreamMessage::Device(report),
                    Err(e) => {
                        tracing::warn!("Device {} failed during stream: {:#}", device_id, e);
                        FleetStreamMessage::DeviceFailed {
                            device_id,
                            reason: format!("{:#}", e),
                        }
                    }
                };
                let _ = tx.send(msg).await;
            }));
        }

        // Completion waits for every device task, so it is always last
        tokio::spawn(async move {
            futures::future::join_all(handles).await;

            let duration_ms = start_time.elapsed().as_millis() as i64;
            let _ = tx
                .send(FleetStreamMessage::Complete {
                    devices: total_devices,
                    duration_ms,
                })
                .await;
        });

        rx
    }
}
