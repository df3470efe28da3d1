//! Spectral effect engine
//!
//! Rewrites every bin of a transformed window: phase inversion and
//! rotation, a linear phase ramp across bins, harmonic/noise magnitude
//! modulation, optional deterministic bin scrambling and optional
//! even-bin negation.
//!
//! # Gating
//! The effects only run when at least one of the three toggles
//! (`use_frequency_scrambling`, `use_additional_phase_distortion`,
//! `use_time_distortion`) is set. With all three off the window is left
//! exactly as the forward transform produced it, so forward + inverse is a
//! clean round trip.

use std::f64::consts::{FRAC_PI_2, TAU};

use num_complex::Complex;
use rand::Rng;

use crate::settings::VoiceSettings;

/// Multiplier that spreads consecutive bins across the scramble range
const SCRAMBLE_STRIDE: usize = 8273;

/// Per-bin spectral manipulation for one window size.
#[derive(Debug, Clone)]
pub struct EffectEngine {
    size: usize,
    active: bool,
    phase_multiplier: f64,
    frequency_shift_multiplier: f64,
    harmonic_amount: f64,
    noise_amount: f64,
    scramble: bool,
    max_offset: usize,
    phase_distortion: bool,
    /// Copy of the window taken before each pass
    snapshot: Vec<Complex<f64>>,
}

impl EffectEngine {
    pub fn new(settings: &VoiceSettings, size: usize) -> Self {
        let max_offset = (size as f64 * settings.frequency_scramble_range)
            .floor()
            .max(0.0) as usize;

        Self {
            size,
            active: settings.any_toggle_enabled(),
            phase_multiplier: settings.phase_multiplier,
            frequency_shift_multiplier: settings.frequency_shift_multiplier,
            harmonic_amount: settings.harmonic_amount,
            noise_amount: settings.noise_amount,
            scramble: settings.use_frequency_scrambling,
            max_offset,
            phase_distortion: settings.use_additional_phase_distortion,
            snapshot: vec![Complex::new(0.0, 0.0); size],
        }
    }

    /// Whether [`EffectEngine::apply`] touches the window at all
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Largest distance a bin can be moved by scrambling
    pub fn max_offset(&self) -> usize {
        self.max_offset
    }

    /// Destination of source bin `j`.
    ///
    /// Depends only on `j`, the window size and the scramble range.
    pub fn target_bin(&self, j: usize) -> usize {
        if !self.scramble {
            return j;
        }

        let modulus = 2 * self.max_offset + 1;
        let offset = ((j * SCRAMBLE_STRIDE) % modulus) as i64 - self.max_offset as i64;
        (j as i64 + offset).rem_euclid(self.size as i64) as usize
    }

    /// Apply the configured effects to `window` in place.
    ///
    /// Every bin is computed from its value before this pass. When several
    /// source bins land on the same destination, the highest source index
    /// wins; destinations nobody targets keep their original value. One
    /// uniform draw is taken from `rng` per bin.
    pub fn apply<R: Rng + ?Sized>(&mut self, window: &mut [Complex<f64>], rng: &mut R) {
        assert_eq!(window.len(), self.size, "window length must match engine size");

        if !self.active {
            return;
        }

        self.snapshot.copy_from_slice(window);

        for (j, source) in self.snapshot.iter().enumerate() {
            let magnitude = source.norm();
            let phase = source.im.atan2(source.re);

            let mut shifted = -phase * self.phase_multiplier + FRAC_PI_2;
            shifted += (j as f64 / self.size as f64) * TAU * self.frequency_shift_multiplier;

            let noise: f64 = rng.gen();
            let harmonic = j as f64 * self.harmonic_amount;
            let scaled =
                magnitude * (1.0 + harmonic.sin() + harmonic.cos() + noise * self.noise_amount);

            let mut value = Complex::new(scaled * shifted.cos(), scaled * shifted.sin());
            if self.phase_distortion && j % 2 == 0 {
                value = -value;
            }

            window[self.target_bin(j)] = value;
        }
    }
}
