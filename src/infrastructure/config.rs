use crate::domain::fuel::FuelModel;
use crate::domain::idle::IdleConfig;
use crate::domain::segmentation::TripDetectionConfig;
use serde::Deserialize;
use thiserror::Error;

const ENV_PREFIX: &str = "FLEET";

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxConfig {
    pub influx: InfluxSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub token: String,
    pub database: String,
    pub retention_policy: String,
    #[serde(default = "default_measurement")]
    pub measurement: String,
    #[serde(default = "default_device_tag")]
    pub device_tag: String,
}

fn default_measurement() -> String {
    "positions".to_string()
}

fn default_device_tag() -> String {
    "imei".to_string()
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AnalyticsSettings {
    pub server: ServerSettings,
    pub trips: TripDetectionConfig,
    pub idle: IdleConfig,
    pub fuel: FuelModel,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_address: String,
    pub default_hours: i32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            default_hours: 24,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a positive number, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("trips.min_trip_points must be at least 1")]
    NoTripPoints,
}

impl AnalyticsSettings {
    /// Reject thresholds the engine cannot work with.
    ///
    /// `trips.min_trip_points` below the default of 3 is accepted: fleets with
    /// sparse reporting may lower it, and their trips then carry fewer points.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let trips = &self.trips;
        if trips.min_trip_points == 0 {
            return Err(ConfigError::NoTripPoints);
        }
        non_negative("trips.idle_threshold_kph", trips.idle_threshold_kph)?;
        positive("trips.time_gap_threshold_sec", trips.time_gap_threshold_sec as f64)?;
        non_negative("trips.min_trip_distance_km", trips.min_trip_distance_km)?;
        non_negative("idle.idle_threshold_kph", self.idle.idle_threshold_kph)?;
        positive("idle.outage_threshold_sec", self.idle.outage_threshold_sec as f64)?;
        positive(
            "fuel.base_consumption_l_per_100km",
            self.fuel.base_consumption_l_per_100km,
        )?;
        positive("server.default_hours", self.server.default_hours as f64)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

pub fn load_influx_config() -> anyhow::Result<InfluxConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/influx"))
        .add_source(environment())
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_analytics_config() -> anyhow::Result<AnalyticsSettings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/analytics").required(false))
        .add_source(environment())
        .build()?;

    let analytics: AnalyticsSettings = settings.try_deserialize()?;
    analytics.validate()?;
    Ok(analytics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_use_defaults() {
        let settings: AnalyticsSettings = toml::from_str(
            r#"
            [trips]
            min_trip_points = 4
            "#,
        )
        .unwrap();

        assert_eq!(settings.trips.min_trip_points, 4);
        assert_eq!(settings.trips.idle_threshold_kph, 5.0);
        assert_eq!(settings.trips.time_gap_threshold_sec, 300);
        assert_eq!(settings.idle.outage_threshold_sec, 3600);
        assert_eq!(settings.fuel.base_consumption_l_per_100km, 8.0);
        assert_eq!(settings.server.default_hours, 24);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_shipped_config_parses() {
        let settings: AnalyticsSettings =
            toml::from_str(include_str!("../../config/analytics.toml")).unwrap();
        assert_eq!(settings, AnalyticsSettings::default());
    }

    #[test]
    fn test_validate_rejects_bad_thresholds() {
        let mut settings = AnalyticsSettings::default();
        settings.trips.min_trip_points = 0;
        assert_eq!(settings.validate(), Err(ConfigError::NoTripPoints));

        let mut settings = AnalyticsSettings::default();
        settings.trips.time_gap_threshold_sec = 0;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::NotPositive { field: "trips.time_gap_threshold_sec", .. })
        ));

        let mut settings = AnalyticsSettings::default();
        settings.idle.idle_threshold_kph = -1.0;
        assert!(matches!(settings.validate(), Err(ConfigError::Negative { .. })));
    }

    #[test]
    fn test_validate_allows_lowered_point_floor() {
        let mut settings = AnalyticsSettings::default();
        settings.trips.min_trip_points = 2;
        assert_eq!(settings.validate(), Ok(()));

        settings.trips.min_trip_points = 1;
        assert_eq!(settings.validate(), Ok(()));
    }

    #[test]
    fn test_env_overrides_and_validation() {
        const KEY: &str = "FLEET__TRIPS__MIN_TRIP_POINTS";

        unsafe { std::env::set_var(KEY, "4") };
        let loaded = load_analytics_config();
        unsafe { std::env::set_var(KEY, "0") };
        let rejected = load_analytics_config();
        unsafe { std::env::remove_var(KEY) };

        let settings = loaded.unwrap();
        assert_eq!(settings.trips.min_trip_points, 4);
        assert_eq!(settings.trips.time_gap_threshold_sec, 300);

        let err = rejected.unwrap_err();
        assert_eq!(err.downcast_ref::<ConfigError>(), Some(&ConfigError::NoTripPoints));
    }

    #[test]
    fn test_influx_defaults() {
        let config: InfluxConfig = toml::from_str(
            r#"
            [influx]
            host = "http://localhost:8086"
            token = "t"
            database = "fleet"
            retention_policy = "autogen"
            "#,
        )
        .unwrap();

        assert_eq!(config.influx.measurement, "positions");
        assert_eq!(config.influx.device_tag, "imei");
    }
}
