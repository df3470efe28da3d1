//! Error handling for Voiceveil
//!
//! The spectral pipeline itself never fails; errors come from the edges
//! (decoding captured audio, reading settings, encoding and writing output).

use thiserror::Error;

/// Result type alias for Voiceveil operations
pub type Result<T> = std::result::Result<T, VeilError>;

/// Main error type for Voiceveil operations
#[derive(Error, Debug)]
pub enum VeilError {
    // File Errors
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Invalid audio: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Audio contains no samples")]
    EmptyAudio,

    // Output Errors
    #[error("Malformed WAV header: {reason}")]
    MalformedWav { reason: String },

    #[error("Output too large for a WAV header: {reason}")]
    OutputTooLarge { reason: String },

    // Settings Errors
    #[error("Invalid settings: {reason}")]
    InvalidSettings { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl VeilError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            VeilError::FileNotFound { .. } => "FILE_NOT_FOUND",
            VeilError::InvalidAudio { .. } => "INVALID_AUDIO",
            VeilError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            VeilError::EmptyAudio => "EMPTY_AUDIO",
            VeilError::MalformedWav { .. } => "MALFORMED_WAV",
            VeilError::OutputTooLarge { .. } => "OUTPUT_TOO_LARGE",
            VeilError::InvalidSettings { .. } => "INVALID_SETTINGS",
            VeilError::Io(_) => "IO_ERROR",
            VeilError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable by the caller (e.g. by re-recording
    /// or fixing a settings file)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            VeilError::FileNotFound { .. }
                | VeilError::InvalidAudio { .. }
                | VeilError::UnsupportedFormat { .. }
                | VeilError::EmptyAudio
                | VeilError::InvalidSettings { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            VeilError::FileNotFound { .. } => vec![
                "Check the file path is correct",
                "Verify the recording was saved before processing",
            ],
            VeilError::InvalidAudio { .. } => vec![
                "Check if the file plays in another application",
                "Re-export the recording as PCM WAV",
            ],
            VeilError::UnsupportedFormat { .. } => vec![
                "Convert to 8, 16, 24 or 32-bit integer WAV, or 32-bit float WAV",
            ],
            VeilError::EmptyAudio => vec!["The recording is empty - record again"],
            VeilError::OutputTooLarge { .. } => vec![
                "Split the recording into shorter files",
                "Mix down to fewer channels before anonymizing",
            ],
            VeilError::InvalidSettings { .. } => vec![
                "Print the defaults with 'voiceveil-cli settings' and compare",
                "Settings keys are camelCase, e.g. phaseMultiplier",
            ],
            _ => vec![],
        }
    }
}
