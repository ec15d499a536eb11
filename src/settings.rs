//! Player Tuning
//!
//! Movement and collision constants for the character controller, loaded
//! from a RON file so they can be tweaked without recompiling. Defaults
//! match the hand-tuned feel of the reference character.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Error type for settings loading
#[derive(Debug)]
pub enum SettingsError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    ValidationError(String),
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for SettingsError {
    fn from(e: ron::error::SpannedError) -> Self {
        SettingsError::ParseError(e)
    }
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::IoError(e) => write!(f, "IO error: {}", e),
            SettingsError::ParseError(e) => write!(f, "Parse error: {}", e),
            SettingsError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

/// All tunables for one character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSettings {
    /// Gravity acceleration (units per second squared)
    pub gravity: f32,
    /// Forward acceleration multiplier while grounded
    pub ground_speed: f32,
    /// Forward acceleration multiplier while airborne (air control is
    /// intentionally weak)
    pub air_speed: f32,
    /// Exponential velocity damping rate; higher stops faster
    pub damping_rate: f32,
    /// Damping attenuation while airborne (fraction of ground damping)
    pub air_damping_scale: f32,
    /// Vertical launch speed when jumping
    pub jump_speed: f32,
    /// Turn rate at full lateral deflection (radians per second)
    pub turn_rate: f32,
    /// Input magnitude at which walking starts
    pub walk_threshold: f32,
    /// Forward input at which running starts
    pub run_threshold: f32,
    /// Collision capsule radius
    pub capsule_radius: f32,
    /// Capsule lower sphere center, height above the feet
    pub capsule_bottom: f32,
    /// Capsule upper sphere center, height above the feet
    pub capsule_top: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            gravity: 80.0,
            ground_speed: 100.0,
            air_speed: 25.0,
            damping_rate: 4.0,
            air_damping_scale: 0.1,
            jump_speed: 30.0,
            turn_rate: std::f32::consts::PI,
            walk_threshold: 0.1,
            run_threshold: 0.5,
            capsule_radius: 0.35,
            capsule_bottom: 0.35,
            capsule_top: 1.0,
        }
    }
}

impl PlayerSettings {
    /// Load and validate settings from a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path)?;
        let settings: Self = ron::from_str(&text)?;
        settings
            .validate()
            .map_err(SettingsError::ValidationError)?;
        Ok(settings)
    }

    /// Reject values that would make the simulation misbehave (NaN
    /// velocities, inverted capsules, degenerate thresholds).
    pub fn validate(&self) -> Result<(), String> {
        let positives = [
            ("gravity", self.gravity),
            ("ground_speed", self.ground_speed),
            ("air_speed", self.air_speed),
            ("damping_rate", self.damping_rate),
            ("jump_speed", self.jump_speed),
            ("turn_rate", self.turn_rate),
            ("capsule_radius", self.capsule_radius),
        ];
        for (name, value) in positives {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{name} must be positive and finite, got {value}"));
            }
        }

        if !self.air_damping_scale.is_finite()
            || self.air_damping_scale <= 0.0
            || self.air_damping_scale > 1.0
        {
            return Err(format!(
                "air_damping_scale must be in (0, 1], got {}",
                self.air_damping_scale
            ));
        }

        if !(self.walk_threshold.is_finite() && self.run_threshold.is_finite())
            || self.walk_threshold <= 0.0
            || self.walk_threshold >= self.run_threshold
            || self.run_threshold > 1.0
        {
            return Err(format!(
                "thresholds must satisfy 0 < walk ({}) < run ({}) <= 1",
                self.walk_threshold, self.run_threshold
            ));
        }

        if !(self.capsule_bottom.is_finite() && self.capsule_top.is_finite())
            || self.capsule_bottom < 0.0
            || self.capsule_top <= self.capsule_bottom
        {
            return Err(format!(
                "capsule must satisfy 0 <= bottom ({}) < top ({})",
                self.capsule_bottom, self.capsule_top
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        assert!(PlayerSettings::default().validate().is_ok());
    }

    #[test]
    fn load_round_trips_through_ron() {
        let settings = PlayerSettings::default();
        let text = ron::ser::to_string_pretty(&settings, ron::ser::PrettyConfig::new())
            .expect("serialize settings");

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(text.as_bytes()).expect("write settings");

        let loaded = PlayerSettings::load(file.path()).expect("load settings");
        assert_eq!(loaded.gravity, settings.gravity);
        assert_eq!(loaded.run_threshold, settings.run_threshold);
        assert_eq!(loaded.capsule_radius, settings.capsule_radius);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = PlayerSettings::load("does/not/exist.ron").unwrap_err();
        assert!(matches!(err, SettingsError::IoError(_)));
    }

    #[test]
    fn negative_gravity_is_rejected() {
        let settings = PlayerSettings {
            gravity: -9.8,
            ..PlayerSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let settings = PlayerSettings {
            walk_threshold: 0.6,
            run_threshold: 0.5,
            ..PlayerSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
