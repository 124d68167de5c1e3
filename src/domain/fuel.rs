// Heuristic fuel consumption model
use super::statistics::round2;
use serde::Deserialize;

/// Speed-banded consumption model.
///
/// `base_consumption_l_per_100km` is the consumption at the ~60 km/h optimum;
/// city driving and high-speed driving are penalised with a multiplier.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FuelModel {
    pub base_consumption_l_per_100km: f64,
}

impl Default for FuelModel {
    fn default() -> Self {
        Self {
            base_consumption_l_per_100km: 8.0,
        }
    }
}

impl FuelModel {
    /// Estimated litres for a trip, rounded to two decimals.
    pub fn estimate(&self, distance_km: f64, avg_speed_kph: f64) -> f64 {
        if !(distance_km > 0.0 && avg_speed_kph > 0.0) {
            return 0.0;
        }
        if !distance_km.is_finite() || !avg_speed_kph.is_finite() {
            return 0.0;
        }

        let litres_per_100km = self.base_consumption_l_per_100km * efficiency_factor(avg_speed_kph);
        round2(distance_km / 100.0 * litres_per_100km)
    }
}

/// Consumption multiplier for an average speed.
///
/// 40-50 and 70-100 km/h fall through to the neutral 1.0.
pub fn efficiency_factor(avg_speed_kph: f64) -> f64 {
    if avg_speed_kph < 40.0 {
        1.3
    } else if (50.0..=70.0).contains(&avg_speed_kph) {
        0.9
    } else if avg_speed_kph > 100.0 {
        1.2 + (avg_speed_kph - 100.0) * 0.01
    } else {
        1.0
    }
}

/// Estimate with the default model.
pub fn estimate_fuel(distance_km: f64, avg_speed_kph: f64) -> f64 {
    FuelModel::default().estimate(distance_km, avg_speed_kph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_positive_inputs() {
        assert_eq!(estimate_fuel(0.0, 50.0), 0.0);
        assert_eq!(estimate_fuel(100.0, 0.0), 0.0);
        assert_eq!(estimate_fuel(-5.0, 50.0), 0.0);
        assert_eq!(estimate_fuel(f64::NAN, 50.0), 0.0);
        assert_eq!(estimate_fuel(10.0, f64::INFINITY), 0.0);
    }

    #[test]
    fn test_city_and_highway_penalties() {
        let optimal = estimate_fuel(100.0, 60.0);
        assert_eq!(optimal, 7.2);
        assert!(estimate_fuel(100.0, 30.0) > optimal);
        assert!(estimate_fuel(100.0, 120.0) > optimal);
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(efficiency_factor(39.9), 1.3);
        assert_eq!(efficiency_factor(40.0), 1.0);
        assert_eq!(efficiency_factor(50.0), 0.9);
        assert_eq!(efficiency_factor(70.0), 0.9);
        assert_eq!(efficiency_factor(85.0), 1.0);
        assert_eq!(efficiency_factor(100.0), 1.0);
        assert!((efficiency_factor(120.0) - 1.4).abs() < 1e-9);
    }

    #[test]
    fn test_rounding() {
        // 12.345 km at 45 km/h: 0.12345 * 8 = 0.9876
        assert_eq!(estimate_fuel(12.345, 45.0), 0.99);
    }

    #[test]
    fn test_custom_base_consumption() {
        let truck = FuelModel {
            base_consumption_l_per_100km: 30.0,
        };
        assert_eq!(truck.estimate(100.0, 45.0), 30.0);
    }
}
