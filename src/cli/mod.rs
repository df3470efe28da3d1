//! CLI Module
//!
//! Command-line interface for Voiceveil.

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::settings::VoiceSettings;

/// Voiceveil - spectral voice anonymizer
#[derive(Parser, Debug)]
#[command(name = "voiceveil")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Anonymize a recorded WAV file
    #[command(name = "anonymize")]
    Anonymize {
        /// Input WAV recording
        input: PathBuf,

        /// Output path (default: <input>_anonymized.wav)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON settings file (camelCase keys)
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Seed for the noise source; omit for a fresh random seed
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        overrides: SettingsOverrides,
    },

    /// Print the default settings as JSON
    #[command(name = "settings")]
    Settings {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the header of an encoded WAV file
    #[command(name = "inspect")]
    Inspect {
        /// WAV file produced by `anonymize`
        path: PathBuf,
    },
}

/// Per-field settings overrides, applied on top of defaults / settings file
#[derive(Args, Debug, Default, Clone)]
pub struct SettingsOverrides {
    /// Phase multiplier (1-10)
    #[arg(long)]
    pub phase_multiplier: Option<f64>,

    /// Frequency shift multiplier (1-10)
    #[arg(long)]
    pub frequency_shift: Option<f64>,

    /// Harmonic amount (0-1)
    #[arg(long)]
    pub harmonic: Option<f64>,

    /// Noise amount (0-1)
    #[arg(long)]
    pub noise: Option<f64>,

    /// Enable or disable frequency scrambling
    #[arg(long, value_name = "BOOL")]
    pub scramble: Option<bool>,

    /// Scramble range as a fraction of the window size
    #[arg(long)]
    pub scramble_range: Option<f64>,

    /// Enable or disable even-bin phase distortion
    #[arg(long, value_name = "BOOL")]
    pub phase_distortion: Option<bool>,

    /// Enable or disable the time-domain waveshaper
    #[arg(long, value_name = "BOOL")]
    pub time_distortion: Option<bool>,

    /// Waveshaper drive (1-10)
    #[arg(long)]
    pub time_distortion_amount: Option<f64>,
}

impl SettingsOverrides {
    /// Apply every override that was given
    pub fn apply(&self, mut settings: VoiceSettings) -> VoiceSettings {
        if let Some(v) = self.phase_multiplier {
            settings.phase_multiplier = v;
        }
        if let Some(v) = self.frequency_shift {
            settings.frequency_shift_multiplier = v;
        }
        if let Some(v) = self.harmonic {
            settings.harmonic_amount = v;
        }
        if let Some(v) = self.noise {
            settings.noise_amount = v;
        }
        if let Some(v) = self.scramble {
            settings.use_frequency_scrambling = v;
        }
        if let Some(v) = self.scramble_range {
            settings.frequency_scramble_range = v;
        }
        if let Some(v) = self.phase_distortion {
            settings.use_additional_phase_distortion = v;
        }
        if let Some(v) = self.time_distortion {
            settings.use_time_distortion = v;
        }
        if let Some(v) = self.time_distortion_amount {
            settings.time_distortion_amount = v;
        }
        settings
    }
}
