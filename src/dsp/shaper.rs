//! Time-domain waveshaper
//!
//! Normalized tanh saturation applied to reconstructed samples.

/// `tanh(x * drive) / tanh(drive)` when enabled, identity otherwise.
///
/// Dividing by `tanh(drive)` keeps a full-scale input near full scale for
/// every drive setting.
#[derive(Debug, Clone, Copy)]
pub struct TimeDomainShaper {
    enabled: bool,
    drive: f64,
    norm: f64,
}

impl TimeDomainShaper {
    pub fn new(enabled: bool, drive: f64) -> Self {
        Self {
            enabled,
            drive,
            norm: drive.tanh(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn shape(&self, sample: f64) -> f64 {
        if self.enabled {
            (sample * self.drive).tanh() / self.norm
        } else {
            sample
        }
    }
}
