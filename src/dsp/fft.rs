//! Spectral Transform
//!
//! In-place iterative radix-2 Cooley-Tukey FFT over a fixed power-of-two
//! size. The inverse reuses the forward butterflies via conjugation, so
//! there is exactly one butterfly code path.

use std::f64::consts::PI;

use num_complex::Complex;

/// Forward/inverse DFT for one fixed window size.
///
/// Tables are built once in [`SpectralTransform::new`] and reused for every
/// window, so a single transform serves a whole recording.
#[derive(Debug, Clone)]
pub struct SpectralTransform {
    size: usize,
    /// `bit_reverse[i]` is `i` with its `log2(size)` low bits reversed
    bit_reverse: Vec<usize>,
    /// `e^{-2πi·k/size}` for `k` in `0..size/2`
    twiddles: Vec<Complex<f64>>,
}

impl SpectralTransform {
    /// Build a transform for `size` points.
    ///
    /// # Panics
    /// If `size` is not a power of two. Sizes are fixed at compile time by
    /// the callers, so this is a programming error rather than bad input.
    pub fn new(size: usize) -> Self {
        assert!(
            size.is_power_of_two(),
            "FFT size must be a power of two, got {}",
            size
        );

        let bits = size.trailing_zeros();
        let bit_reverse = (0..size)
            .map(|i| {
                if bits == 0 {
                    0
                } else {
                    i.reverse_bits() >> (usize::BITS - bits)
                }
            })
            .collect();

        let twiddles = (0..size / 2)
            .map(|k| Complex::from_polar(1.0, -2.0 * PI * k as f64 / size as f64))
            .collect();

        Self {
            size,
            bit_reverse,
            twiddles,
        }
    }

    /// Number of points (and bins)
    pub fn size(&self) -> usize {
        self.size
    }

    /// Forward transform in place.
    ///
    /// Bin `k` holds frequency `k * sample_rate / size`; bins above
    /// `size / 2` are the mirrored negative frequencies.
    pub fn forward(&self, data: &mut [Complex<f64>]) {
        assert_eq!(data.len(), self.size, "window length must match FFT size");

        // Bit-reversal permutation
        for i in 0..self.size {
            let j = self.bit_reverse[i];
            if i < j {
                data.swap(i, j);
            }
        }

        // Butterflies for sizes 2, 4, ..., N
        let mut span = 2;
        while span <= self.size {
            let half = span / 2;
            let stride = self.size / span;
            for start in (0..self.size).step_by(span) {
                for k in 0..half {
                    // e^{-2πi·k/span} == e^{-2πi·(k·stride)/N}
                    let twiddle = self.twiddles[k * stride];
                    let even = data[start + k];
                    let odd = data[start + k + half] * twiddle;
                    data[start + k] = even + odd;
                    data[start + k + half] = even - odd;
                }
            }
            span *= 2;
        }
    }

    /// Inverse transform in place: conjugate, forward, conjugate, scale by 1/N.
    pub fn inverse(&self, data: &mut [Complex<f64>]) {
        for value in data.iter_mut() {
            *value = value.conj();
        }

        self.forward(data);

        let scale = 1.0 / self.size as f64;
        for value in data.iter_mut() {
            *value = value.conj() * scale;
        }
    }
}
