// InfluxDB telemetry source implementation
use crate::application::data_source::AnalyticsDataSource;
use crate::domain::telemetry::TelemetrySample;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("InfluxDB query failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("InfluxDB query error: {0}")]
    Query(String),
}

#[derive(Debug, Clone)]
pub struct InfluxRepository {
    client: reqwest::Client,
    host: String,
    token: String,
    database: String,
    retention_policy: String,
    measurement: String,
    device_tag: String,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    columns: Vec<String>,
    values: Vec<Vec<Value>>,
}

impl InfluxRepository {
    pub fn new(
        host: String,
        token: String,
        database: String,
        retention_policy: String,
        measurement: String,
        device_tag: String,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.trim_end_matches('/').to_string(),
            token,
            database,
            retention_policy,
            measurement,
            device_tag,
        }
    }

    fn build_query_url(&self, query: &str) -> String {
        let encoded_query = urlencoding::encode(query);
        format!(
            "{}/query?db={}&rp={}&q={}",
            self.host, self.database, self.retention_policy, encoded_query
        )
    }

    fn samples_query(&self, device_id: &str, hours: i32) -> String {
        format!(
            "SELECT latitude, longitude, speed, device_time FROM {} WHERE \"{}\" = '{}' AND time >= now() - {}h",
            self.measurement,
            self.device_tag,
            escape_literal(device_id),
            hours
        )
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse> {
        let url = self.build_query_url(query);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DataSourceError::Status { status, body }.into());
        }

        let data = response
            .json::<InfluxQLResponse>()
            .await
            .context("Failed to parse InfluxDB response")?;

        if let Some(error) = data.results.first().and_then(|r| r.error.clone()) {
            return Err(DataSourceError::Query(error).into());
        }

        Ok(data)
    }
}

#[async_trait]
impl AnalyticsDataSource for InfluxRepository {
    async fn list_device_ids(&self) -> Result<Vec<String>> {
        let query = format!(
            "SHOW TAG VALUES FROM {} WITH KEY = \"{}\"",
            self.measurement, self.device_tag
        );
        let response = self.execute_query(&query).await?;

        let mut devices = Vec::new();
        for series in response.results.iter().filter_map(|r| r.series.as_ref()).flatten() {
            for row in &series.values {
                if let Some(device_id) = row.get(1).and_then(Value::as_str) {
                    devices.push(device_id.to_string());
                }
            }
        }

        tracing::debug!("Found {} devices in {}", devices.len(), self.measurement);
        Ok(devices)
    }

    async fn fetch_samples(&self, device_id: &str, hours: i32) -> Result<Vec<TelemetrySample>> {
        let query = self.samples_query(device_id, hours);
        tracing::debug!("Executing samples query: {}", query);

        let response = self.execute_query(&query).await?;
        let samples: Vec<TelemetrySample> = response
            .results
            .iter()
            .filter_map(|r| r.series.as_ref())
            .flatten()
            .flat_map(|series| rows_to_samples(device_id, series))
            .collect();

        tracing::debug!("Fetched {} samples for device {}", samples.len(), device_id);
        Ok(samples)
    }
}

/// Map InfluxQL rows to samples by column name.
///
/// Missing or unparseable cells become `None`; the engine skips such
/// samples instead of failing the whole request.
fn rows_to_samples(device_id: &str, series: &InfluxQLSeries) -> Vec<TelemetrySample> {
    let column = |name: &str| series.columns.iter().position(|c| c == name);
    let time_idx = column("time");
    let lat_idx = column("latitude");
    let lon_idx = column("longitude");
    let speed_idx = column("speed");
    let device_time_idx = column("device_time");

    let cell = |row: &[Value], idx: Option<usize>| idx.and_then(|i| row.get(i)).cloned();

    series
        .values
        .iter()
        .map(|row| {
            TelemetrySample::new(
                device_id.to_string(),
                cell(row, time_idx).as_ref().and_then(parse_time),
                cell(row, device_time_idx).as_ref().and_then(parse_time),
                cell(row, lat_idx).and_then(|v| v.as_f64()),
                cell(row, lon_idx).and_then(|v| v.as_f64()),
                cell(row, speed_idx).and_then(|v| v.as_f64()).unwrap_or(0.0),
            )
        })
        .collect()
}

/// RFC 3339 strings or epoch milliseconds.
fn parse_time(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn series(columns: &[&str], values: Vec<Vec<Value>>) -> InfluxQLSeries {
        InfluxQLSeries {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            values,
        }
    }

    #[test]
    fn test_rows_to_samples() {
        let s = series(
            &["time", "latitude", "longitude", "speed", "device_time"],
            vec![
                vec![
                    json!("2024-03-01T10:00:05Z"),
                    json!(52.52),
                    json!(13.40),
                    json!(42),
                    json!("2024-03-01T10:00:00Z"),
                ],
                vec![json!("2024-03-01T10:01:00Z"), Value::Null, json!(13.41), Value::Null, Value::Null],
            ],
        );

        let samples = rows_to_samples("864502", &s);

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].device_id, "864502");
        assert_eq!(samples[0].speed_kph, 42.0);
        assert_eq!(
            samples[0].effective_time().unwrap().to_rfc3339(),
            "2024-03-01T10:00:00+00:00"
        );
        assert_eq!(samples[1].latitude, None);
        assert_eq!(samples[1].speed_kph, 0.0);
        assert!(samples[1].device_time.is_none());
        assert!(samples[1].timestamp.is_some());
    }

    #[test]
    fn test_columns_matched_by_name() {
        let s = series(
            &["time", "speed", "longitude", "latitude"],
            vec![vec![json!("2024-03-01T10:00:00Z"), json!(10.5), json!(2.35), json!(48.85)]],
        );

        let samples = rows_to_samples("a", &s);
        assert_eq!(samples[0].latitude, Some(48.85));
        assert_eq!(samples[0].longitude, Some(2.35));
        assert_eq!(samples[0].speed_kph, 10.5);
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(
            parse_time(&json!(1_700_000_000_000i64)).map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
        assert!(parse_time(&json!("yesterday")).is_none());
        assert!(parse_time(&Value::Null).is_none());
    }

    #[test]
    fn test_samples_query_escapes_device_id() {
        let repo = InfluxRepository::new(
            "http://influx:8086/".to_string(),
            "token".to_string(),
            "fleet".to_string(),
            "autogen".to_string(),
            "positions".to_string(),
            "imei".to_string(),
        );

        assert_eq!(
            repo.samples_query("86'45", 6),
            "SELECT latitude, longitude, speed, device_time FROM positions WHERE \"imei\" = '86\\'45' AND time >= now() - 6h"
        );
        assert!(repo.build_query_url("SHOW MEASUREMENTS").starts_with("http://influx:8086/query?db=fleet&rp=autogen&q="));
    }
}
