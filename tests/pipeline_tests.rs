//! Pipeline Tests
//!
//! End-to-end checks of the anonymization pipeline through the public API.

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use test_case::test_case;

use voiceveil::dsp::{EffectEngine, WINDOW_SIZE};
use voiceveil::engine::{
    decode_channel_major, decode_wav_bytes, encode_wav, generate_test_tone, ProcessingContext,
    SampleBuffer, WAV_HEADER_LEN,
};
use voiceveil::{VeilError, VoiceSettings};

/// Speech-ish test signal: a few harmonics with a slow amplitude wobble
fn voice_like(len: usize, sample_rate: u32) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            let envelope = 0.6 + 0.4 * (2.0 * std::f64::consts::PI * 3.0 * t).sin();
            let tone = (2.0 * std::f64::consts::PI * 140.0 * t).sin()
                + 0.5 * (2.0 * std::f64::consts::PI * 280.0 * t).sin()
                + 0.25 * (2.0 * std::f64::consts::PI * 420.0 * t).sin();
            (0.4 * envelope * tone) as f32
        })
        .collect()
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

// === Scenario ===

#[test]
fn test_silent_mono_scenario() {
    let input = SampleBuffer::silence(1, 4096, 16000);
    let settings = VoiceSettings {
        noise_amount: 0.0,
        ..VoiceSettings::default()
    };

    let mut ctx = ProcessingContext::seeded(0);
    let output = ctx.render(&input, &settings);
    assert!(output.channel(0).iter().all(|&s| s == 0.0));

    let blob = ctx.anonymize(&input, &settings).unwrap();
    let bytes = blob.as_bytes();
    assert_eq!(bytes.len(), 8236);
    assert_eq!(read_u32(bytes, 4), 8228);
    assert_eq!(read_u32(bytes, 40), 8192);
    assert!(bytes[WAV_HEADER_LEN..].iter().all(|&b| b == 0));
}

// === Round trip / identity ===

#[test]
fn test_passthrough_reproduces_input() {
    let input = SampleBuffer::mono(voice_like(5000, 16000), 16000);
    let output = ProcessingContext::seeded(4).render(&input, &VoiceSettings::passthrough());

    for (a, b) in input.channel(0).iter().zip(output.channel(0)) {
        assert_relative_eq!(*a, *b, epsilon = 1e-5, max_relative = 1e-5);
    }
}

#[test]
fn test_passthrough_identity_map() {
    let engine = EffectEngine::new(&VoiceSettings::passthrough(), WINDOW_SIZE);
    assert!(!engine.is_active());
    for j in 0..WINDOW_SIZE {
        assert_eq!(engine.target_bin(j), j);
    }
}

// === Scrambling ===

#[test_case(0.002 ; "default range")]
#[test_case(0.01 ; "wider range")]
fn test_scramble_map_is_pure(range: f64) {
    let a = VoiceSettings {
        use_frequency_scrambling: true,
        frequency_scramble_range: range,
        ..VoiceSettings::passthrough()
    };
    let b = VoiceSettings {
        phase_multiplier: 10.0,
        noise_amount: 1.0,
        use_time_distortion: true,
        ..a.clone()
    };

    let first = EffectEngine::new(&a, WINDOW_SIZE);
    let second = EffectEngine::new(&b, WINDOW_SIZE);
    let map: Vec<usize> = (0..WINDOW_SIZE).map(|j| first.target_bin(j)).collect();
    let again: Vec<usize> = (0..WINDOW_SIZE).map(|j| first.target_bin(j)).collect();
    let other: Vec<usize> = (0..WINDOW_SIZE).map(|j| second.target_bin(j)).collect();

    assert_eq!(map, again);
    assert_eq!(map, other);
}

// === Length preservation ===

#[test_case(1 ; "single sample")]
#[test_case(2047 ; "one short of a window")]
#[test_case(2048 ; "exactly one window")]
#[test_case(2049 ; "one past a window")]
#[test_case(10_000 ; "several windows with tail")]
fn test_output_length_matches_input(len: usize) {
    let input = SampleBuffer::new(
        vec![voice_like(len, 16000), voice_like(len, 16000)],
        16000,
    )
    .unwrap();

    let output = ProcessingContext::seeded(8).render(&input, &VoiceSettings::default());

    assert_eq!(output.num_channels(), 2);
    assert_eq!(output.len(), len);
    assert_eq!(output.sample_rate(), 16000);

    let blob = encode_wav(&output).unwrap();
    assert_eq!(blob.len(), WAV_HEADER_LEN + 2 * 2 * len);
}

#[test]
fn test_empty_input_encodes_header_only() {
    let input = SampleBuffer::silence(1, 0, 16000);
    let blob = ProcessingContext::seeded(0)
        .anonymize(&input, &VoiceSettings::default())
        .unwrap();

    assert_eq!(blob.len(), WAV_HEADER_LEN);
    assert_eq!(blob.header().unwrap().riff_len, 36);
}

// === WAV layout ===

#[test_case(1, 8000, 100)]
#[test_case(2, 44100, 3000)]
#[test_case(3, 16000, 2048)]
fn test_header_fields(channels: usize, rate: u32, len: usize) {
    let input = SampleBuffer::silence(channels, len, rate);
    let blob = ProcessingContext::seeded(0)
        .anonymize(&input, &VoiceSettings::default())
        .unwrap();
    let bytes = blob.as_bytes();

    assert_eq!(read_u32(bytes, 4) as usize, 36 + 2 * channels * len);
    assert_eq!(read_u32(bytes, 40) as usize, 2 * channels * len);
    assert_eq!(read_u32(bytes, 24), rate);
}

#[test]
fn test_stereo_payload_is_channel_major_not_interleaved() {
    // Conformance: payload is channel 0 in full, then channel 1. Do not
    // "fix" this to interleaved PCM.
    let left = vec![0.5_f32; 4];
    let right = vec![-0.5_f32; 4];
    let input = SampleBuffer::new(vec![left, right], 8000).unwrap();

    let blob = ProcessingContext::seeded(0)
        .anonymize(&input, &VoiceSettings::passthrough())
        .unwrap();
    let payload: Vec<i16> = blob.as_bytes()[WAV_HEADER_LEN..]
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    assert!(payload[..4].iter().all(|&s| s > 16000));
    assert!(payload[4..].iter().all(|&s| s < -16000));
}

#[test]
fn test_encoded_blob_decodes_to_rendered_output() {
    let input = SampleBuffer::mono(voice_like(3000, 16000), 16000);
    let mut ctx = ProcessingContext::seeded(21);
    let settings = VoiceSettings {
        noise_amount: 0.0,
        ..VoiceSettings::default()
    };

    let rendered = ctx.render(&input, &settings);
    let decoded = decode_channel_major(encode_wav(&rendered).unwrap().as_bytes()).unwrap();

    for (r, d) in rendered.channel(0).iter().zip(decoded.channel(0)) {
        assert!((r.clamp(-1.0, 1.0) - d).abs() < 1e-4);
    }
}

// === Non-finite propagation ===

#[test]
fn test_non_finite_output_is_clamped_on_encode() {
    let mut buffer = SampleBuffer::mono(vec![0.1, 0.2, 0.3, 0.4], 8000);
    buffer.channel_mut(0)[1] = f32::NAN;
    buffer.channel_mut(0)[2] = f32::INFINITY;
    buffer.channel_mut(0)[3] = -40.0;
    assert_eq!(buffer.non_finite_count(), 2);

    let blob = encode_wav(&buffer).unwrap();
    let payload: Vec<i16> = blob.as_bytes()[WAV_HEADER_LEN..]
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    assert_eq!(payload, vec![3276, 0, 32767, -32768]);
}

// === Channels / determinism ===

#[test]
fn test_identical_channels_stay_identical_without_noise() {
    let samples = voice_like(4500, 16000);
    let input = SampleBuffer::new(vec![samples.clone(), samples], 16000).unwrap();
    let settings = VoiceSettings {
        noise_amount: 0.0,
        use_additional_phase_distortion: true,
        ..VoiceSettings::default()
    };

    let output = ProcessingContext::seeded(77).render(&input, &settings);
    assert_eq!(output.channel(0), output.channel(1));
}

#[test_case(2 ; "stereo")]
#[test_case(3 ; "three channels")]
fn test_channel_output_does_not_depend_on_other_channels(channels: usize) {
    let voice = voice_like(5000, 16000);
    let settings = VoiceSettings {
        noise_amount: 1.0,
        ..VoiceSettings::default()
    };

    let mut quiet = vec![vec![0.0_f32; voice.len()]; channels];
    quiet[channels - 1] = voice.clone();
    let mut busy: Vec<Vec<f32>> = (0..channels)
        .map(|ch| voice_like(5000, 8000 + 1000 * ch as u32))
        .collect();
    busy[channels - 1] = voice;
    let first = busy[0].clone();

    let quiet = SampleBuffer::new(quiet, 16000).unwrap();
    let busy = SampleBuffer::new(busy, 16000).unwrap();

    let a = ProcessingContext::seeded(5).render(&quiet, &settings);
    let b = ProcessingContext::seeded(5).render(&busy, &settings);
    assert_eq!(a.channel(channels - 1), b.channel(channels - 1));

    // Channel 0 renders exactly as it would in a mono buffer
    let mono = ProcessingContext::seeded(5).render(&SampleBuffer::mono(first, 16000), &settings);
    assert_eq!(mono.channel(0), b.channel(0));
}

#[test]
fn test_seed_controls_noise() {
    let input = generate_test_tone(180.0, 0.3, 16000);
    let settings = VoiceSettings {
        noise_amount: 1.0,
        ..VoiceSettings::default()
    };

    let a = ProcessingContext::seeded(1).anonymize(&input, &settings).unwrap();
    let b = ProcessingContext::seeded(1).anonymize(&input, &settings).unwrap();
    let c = ProcessingContext::seeded(2).anonymize(&input, &settings).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_time_distortion_bounds_full_scale_output() {
    let input = SampleBuffer::mono(voice_like(4096, 16000), 16000);
    let settings = VoiceSettings {
        use_time_distortion: true,
        time_distortion_amount: 10.0,
        ..VoiceSettings::default()
    };

    let output = ProcessingContext::seeded(3).render(&input, &settings);

    // tanh(x * a) / tanh(a) never exceeds 1 / tanh(10) in magnitude
    assert!(output.peak() <= 1.0 / 10.0_f32.tanh() + 1e-6);
}

// === Decode boundary ===

#[test]
fn test_decode_failure_is_distinct_error() {
    match decode_wav_bytes(b"ID3\x04 compressed audio goes here") {
        Err(err @ VeilError::InvalidAudio { .. }) => {
            assert_eq!(err.error_code(), "INVALID_AUDIO");
        }
        other => panic!("Expected InvalidAudio, got: {:?}", other),
    }
}
