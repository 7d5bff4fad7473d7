use serde::{Deserialize, Serialize};
use validator::Validate;

/// Latest suit, vitals and position readings for one crew member.
///
/// Updates replace the whole snapshot, so every field is required on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySnapshot {
    /// Primary oxygen tank pressure (psi)
    #[validate(range(min = 0.0, max = 6000.0, message = "Primary O2 must be between 0 and 6000 psi"))]
    pub primary_o2: f64,

    /// Secondary oxygen tank pressure (psi)
    #[validate(range(min = 0.0, max = 6000.0, message = "Secondary O2 must be between 0 and 6000 psi"))]
    pub secondary_o2: f64,

    /// Suit pressure (psi)
    #[validate(range(min = 0.0, max = 20.0, message = "Suit pressure must be between 0 and 20 psi"))]
    pub suit_pressure: f64,

    #[validate(range(min = 0.0, max = 250.0, message = "Heart rate must be between 0 and 250 bpm"))]
    pub heart_rate: f64,

    /// Suit temperature (°C)
    #[validate(range(min = -150.0, max = 150.0, message = "Temperature must be between -150 and 150 °C"))]
    pub temperature: f64,

    #[validate(nested)]
    pub position: Position,

    /// Distance to the rover (m)
    #[validate(range(min = 0.0, max = 1_000_000.0, message = "LTV distance must be between 0 and 1000000 m"))]
    pub ltv_distance: f64,

    /// Bearing to the rover (degrees)
    #[validate(range(min = 0.0, max = 360.0, message = "LTV bearing must be between 0 and 360 degrees"))]
    pub ltv_bearing: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Position {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub lon: f64,
}

impl Default for TelemetrySnapshot {
    /// Nominal readings reported before a client has pushed any telemetry.
    fn default() -> Self {
        Self {
            primary_o2: 3200.0,
            secondary_o2: 3400.0,
            suit_pressure: 4.3,
            heart_rate: 72.0,
            temperature: 21.5,
            position: Position { lat: -23.4, lon: 12.8 },
            ltv_distance: 127.0,
            ltv_bearing: 45.0,
        }
    }
}

impl TelemetrySnapshot {
    /// Plain-text rendering used as model context.
    pub fn describe(&self) -> String {
        format!(
            "Current EVA telemetry:\n\
             - Primary O2: {} psi\n\
             - Secondary O2: {} psi\n\
             - Suit pressure: {} psi\n\
             - Heart rate: {} bpm\n\
             - Temperature: {} °C\n\
             - Position: lat {}, lon {}\n\
             - LTV: {} m away, bearing {}°",
            self.primary_o2,
            self.secondary_o2,
            self.suit_pressure,
            self.heart_rate,
            self.temperature,
            self.position.lat,
            self.position.lon,
            self.ltv_distance,
            self.ltv_bearing,
        )
    }
}
