//! Threshold and keyword rules that flag a chat exchange as an emergency.

use serde::Serialize;

use crate::models::TelemetrySnapshot;

pub const O2_MIN_PSI: f64 = 2900.0;
pub const HEART_RATE_MAX_BPM: f64 = 105.0;
pub const SUIT_PRESSURE_MIN_PSI: f64 = 4.0;

/// Matched case-insensitively as substrings of the crew member's message.
pub const EMERGENCY_KEYWORDS: [&str; 5] = ["emergency", "critical", "abort", "help", "danger"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertStatus {
    pub emergency: bool,
    pub telemetry_alert: bool,
}

pub fn is_telemetry_alert(telemetry: &TelemetrySnapshot) -> bool {
    telemetry.primary_o2 < O2_MIN_PSI
        || telemetry.secondary_o2 < O2_MIN_PSI
        || telemetry.heart_rate > HEART_RATE_MAX_BPM
        || telemetry.suit_pressure < SUIT_PRESSURE_MIN_PSI
}

pub fn contains_emergency_keyword(text: &str) -> bool {
    let lowered = text.to_lowercase();
    EMERGENCY_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

/// A telemetry alert always implies an emergency.
pub fn evaluate(text: &str, telemetry: &TelemetrySnapshot) -> AlertStatus {
    let telemetry_alert = is_telemetry_alert(telemetry);
    AlertStatus {
        emergency: telemetry_alert || contains_emergency_keyword(text),
        telemetry_alert,
    }
}
