//! Voice anonymization settings
//!
//! `VoiceSettings` is produced once per invocation by whatever surface the
//! caller uses (JSON file, CLI flags, a UI) and is read-only afterwards.
//! The processing core does not re-validate it; `clamped()` exists for the
//! surfaces that must keep values inside the documented bounds.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VeilError};

// ============================================================================
// Bounds
// ============================================================================

/// Minimum phase multiplier
pub const MIN_PHASE_MULTIPLIER: f64 = 1.0;

/// Maximum phase multiplier
pub const MAX_PHASE_MULTIPLIER: f64 = 10.0;

/// Minimum frequency shift multiplier
pub const MIN_FREQUENCY_SHIFT: f64 = 1.0;

/// Maximum frequency shift multiplier
pub const MAX_FREQUENCY_SHIFT: f64 = 10.0;

/// Minimum time distortion drive
pub const MIN_TIME_DISTORTION: f64 = 1.0;

/// Maximum time distortion drive
pub const MAX_TIME_DISTORTION: f64 = 10.0;

/// Default scramble range, as a fraction of the window size
pub const DEFAULT_SCRAMBLE_RANGE: f64 = 0.002;

// ============================================================================
// VoiceSettings
// ============================================================================

/// Configuration for one anonymization pass.
///
/// Keys serialize in camelCase (`phaseMultiplier`, `useTimeDistortion`, ...)
/// so settings files written by other front ends load unchanged. Missing
/// keys fall back to [`VoiceSettings::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct VoiceSettings {
    /// Phase rotation factor, 1..=10
    pub phase_multiplier: f64,
    /// Per-bin linear phase ramp factor, 1..=10
    pub frequency_shift_multiplier: f64,
    /// Harmonic magnitude ripple, 0..=1
    pub harmonic_amount: f64,
    /// Random magnitude jitter, 0..=1
    pub noise_amount: f64,
    /// Move bins to nearby destinations
    pub use_frequency_scrambling: bool,
    /// Negate even bins after writing
    pub use_additional_phase_distortion: bool,
    /// Apply the tanh waveshaper after the inverse transform
    pub use_time_distortion: bool,
    /// Waveshaper drive, 1..=10
    pub time_distortion_amount: f64,
    /// Maximum scramble offset as a fraction of the window size
    pub frequency_scramble_range: f64,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            phase_multiplier: 2.0,
            frequency_shift_multiplier: 1.5,
            harmonic_amount: 0.3,
            noise_amount: 0.1,
            use_frequency_scrambling: true,
            use_additional_phase_distortion: false,
            use_time_distortion: true,
            time_distortion_amount: 2.0,
            frequency_scramble_range: DEFAULT_SCRAMBLE_RANGE,
        }
    }
}

impl VoiceSettings {
    /// Settings with every toggle off. The spectral stage and the shaper
    /// both pass audio through untouched.
    pub fn passthrough() -> Self {
        Self {
            use_frequency_scrambling: false,
            use_additional_phase_distortion: false,
            use_time_distortion: false,
            ..Self::default()
        }
    }

    /// True when at least one of the three toggles is set.
    ///
    /// The spectral effects only run when this holds; with all toggles off
    /// every bin is left as the forward transform produced it.
    pub fn any_toggle_enabled(&self) -> bool {
        self.use_frequency_scrambling
            || self.use_additional_phase_distortion
            || self.use_time_distortion
    }

    /// Return a copy with every numeric field forced into its bounds.
    ///
    /// Non-finite values fall back to the default for that field.
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        let fit = |value: f64, min: f64, max: f64, fallback: f64| {
            if value.is_finite() {
                value.clamp(min, max)
            } else {
                fallback
            }
        };

        Self {
            phase_multiplier: fit(
                self.phase_multiplier,
                MIN_PHASE_MULTIPLIER,
                MAX_PHASE_MULTIPLIER,
                defaults.phase_multiplier,
            ),
            frequency_shift_multiplier: fit(
                self.frequency_shift_multiplier,
                MIN_FREQUENCY_SHIFT,
                MAX_FREQUENCY_SHIFT,
                defaults.frequency_shift_multiplier,
            ),
            harmonic_amount: fit(self.harmonic_amount, 0.0, 1.0, defaults.harmonic_amount),
            noise_amount: fit(self.noise_amount, 0.0, 1.0, defaults.noise_amount),
            time_distortion_amount: fit(
                self.time_distortion_amount,
                MIN_TIME_DISTORTION,
                MAX_TIME_DISTORTION,
                defaults.time_distortion_amount,
            ),
            frequency_scramble_range: fit(
                self.frequency_scramble_range,
                0.0,
                0.5,
                defaults.frequency_scramble_range,
            ),
            ..self.clone()
        }
    }

    /// Load settings from a JSON file. Unknown keys are rejected.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(VeilError::FileNotFound {
                path: path.display().to_string(),
                source: None,
            });
        }

        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse settings from a JSON string.
    ///
    /// Malformed JSON is a `Serialization` error; a well-formed document
    /// that is not a settings object (wrong shape, unknown key, wrong value
    /// type) is `InvalidSettings`.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(VeilError::InvalidSettings {
                reason: "settings must be a JSON object".to_string(),
            });
        }

        serde_json::from_value(value).map_err(|e| VeilError::InvalidSettings {
            reason: e.to_string(),
        })
    }

    /// Serialize to pretty JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
