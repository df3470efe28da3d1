//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::cli::SettingsOverrides;
use crate::engine::{decode_wav_file, write_blob, ProcessingContext, WavHeader};
use crate::error::Result;
use crate::settings::VoiceSettings;

/// Resolve settings: defaults, then the settings file, then CLI overrides,
/// finally clamped into bounds.
pub fn resolve_settings(
    settings_path: Option<&Path>,
    overrides: &SettingsOverrides,
) -> Result<VoiceSettings> {
    let base = match settings_path {
        Some(path) => {
            info!("Loading settings from: {}", path.display());
            VoiceSettings::from_json_file(path)?
        }
        None => VoiceSettings::default(),
    };

    let requested = overrides.apply(base);
    let clamped = requested.clamped();
    if clamped != requested {
        warn!("Some settings were outside their bounds and have been clamped");
    }

    Ok(clamped)
}

/// Default output path: `<stem>_anonymized.wav` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "recording".to_string());
    input.with_file_name(format!("{}_anonymized.wav", stem))
}

/// Anonymize a WAV recording and write the result.
pub fn anonymize(
    input: &Path,
    output: Option<&Path>,
    settings_path: Option<&Path>,
    seed: Option<u64>,
    overrides: &SettingsOverrides,
) -> Result<PathBuf> {
    info!("Anonymizing: {}", input.display());

    let settings = resolve_settings(settings_path, overrides)?;
    let buffer = decode_wav_file(input)?;

    let mut ctx = match seed {
        Some(seed) => ProcessingContext::seeded(seed),
        None => ProcessingContext::new(),
    };
    let blob = ctx.anonymize(&buffer, &settings)?;

    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input));
    write_blob(&blob, &output_path)?;

    println!("Input: {}", input.display());
    println!(
        "  {} ch, {} Hz, {:.2}s, peak {:.3}, {:.1} dB RMS",
        buffer.num_channels(),
        buffer.sample_rate(),
        buffer.duration_secs(),
        buffer.peak(),
        buffer.rms_db()
    );
    println!("Output: {} ({} bytes)", output_path.display(), blob.len());

    Ok(output_path)
}

/// Print (or write) the default settings as JSON.
pub fn print_settings(output: Option<&Path>) -> Result<()> {
    let json = VoiceSettings::default().to_json_pretty()?;

    match output {
        Some(path) => {
            std::fs::write(path, &json)?;
            println!("Settings written to: {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Print the header fields of an encoded WAV file.
pub fn inspect(path: &Path) -> Result<WavHeader> {
    let bytes = std::fs::read(path)?;
    let header = WavHeader::parse(&bytes)?;

    println!("File: {} ({} bytes)", path.display(), bytes.len());
    println!("{:-<40}", "");
    println!("RIFF size:       {}", header.riff_len);
    println!("Channels:        {}", header.channels);
    println!("Sample rate:     {} Hz", header.sample_rate);
    println!("Byte rate:       {}", header.byte_rate);
    println!("Block align:     {}", header.block_align);
    println!("Bits per sample: {}", header.bits_per_sample);
    println!("Data size:       {}", header.data_len);
    println!("Samples/channel: {}", header.samples_per_channel());

    Ok(header)
}
