use serde::{Deserialize, Serialize};

use crate::error::{PollutionError, Result};

/// Rainfall event shared read-only by every feature in one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventParameters {
    /// Days since the previous rainfall event.
    pub antecedent_dry_days: f64,
    /// Average rainfall intensity in mm/h.
    pub avg_rain_intensity: f64,
    /// Event duration in hours.
    pub event_duration: f64,
    pub rainfall_ph: f64,
}

impl EventParameters {
    pub fn new(
        antecedent_dry_days: f64,
        avg_rain_intensity: f64,
        event_duration: f64,
        rainfall_ph: f64,
    ) -> Self {
        Self { antecedent_dry_days, avg_rain_intensity, event_duration, rainfall_ph }
    }

    /// Caller-side input check. The model functions never call this and
    /// evaluate whatever they are given.
    ///
    /// Rejects non-finite fields, `antecedent_dry_days <= 0` (raised to
    /// fractional powers), and negative intensity or duration.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("antecedent_dry_days", self.antecedent_dry_days),
            ("avg_rain_intensity", self.avg_rain_intensity),
            ("event_duration", self.event_duration),
            ("rainfall_ph", self.rainfall_ph),
        ];
        if let Some(&(field, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(PollutionError::InvalidEvent { field, value });
        }
        if self.antecedent_dry_days <= 0.0 {
            return Err(PollutionError::InvalidEvent {
                field: "antecedent_dry_days",
                value: self.antecedent_dry_days,
            });
        }
        if self.avg_rain_intensity < 0.0 {
            return Err(PollutionError::InvalidEvent {
                field: "avg_rain_intensity",
                value: self.avg_rain_intensity,
            });
        }
        if self.event_duration < 0.0 {
            return Err(PollutionError::InvalidEvent {
                field: "event_duration",
                value: self.event_duration,
            });
        }
        Ok(())
    }
}

impl Default for EventParameters {
    fn default() -> Self {
        Self {
            antecedent_dry_days: 1.0,
            avg_rain_intensity: 1.0,
            event_duration: 1.0,
            rainfall_ph: 7.0,
        }
    }
}
