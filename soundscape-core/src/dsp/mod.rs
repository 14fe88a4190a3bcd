//! Short-time Fourier transform substrate shared by the denoiser and the
//! index spectrogram.
//!
//! Frames are taken left-aligned with a periodic Hann window: frame `t`
//! covers samples `[t·hop, t·hop + size)` and the last partial window is
//! dropped rather than padded. Reconstruction is weighted overlap-add — the
//! synthesis window is applied a second time and the accumulator divided by
//! the summed squared window, which is exact for any hop that covers the
//! signal. A reconstructed buffer is therefore shorter than its input by
//! less than one hop.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Periodic Hann window of length `n`.
pub fn hann_window(n: usize) -> Vec<f32> {
    use std::f32::consts::PI;
    (0..n)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / n as f32).cos()))
        .collect()
}

/// Magnitude/phase frames produced by [`Stft::forward`].
///
/// Frame-major: `magnitude[t][k]` is bin `k` of frame `t`, with
/// `size / 2 + 1` bins per frame (real input, positive frequencies only).
#[derive(Debug, Clone)]
pub struct StftFrames {
    pub magnitude: Vec<Vec<f32>>,
    pub phase: Vec<Vec<f32>>,
}

impl StftFrames {
    pub fn num_frames(&self) -> usize {
        self.magnitude.len()
    }

    pub fn num_bins(&self) -> usize {
        self.magnitude.first().map(Vec::len).unwrap_or(0)
    }
}

/// Windowed forward/inverse STFT with pre-planned FFTs.
pub struct Stft {
    size: usize,
    hop: usize,
    window: Vec<f32>,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
}

impl Stft {
    pub fn new(size: usize, hop: usize) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        Self {
            size,
            hop: hop.max(1),
            window: hann_window(size),
            forward: planner.plan_fft_forward(size),
            inverse: planner.plan_fft_inverse(size),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Number of complete frames available in a buffer of `len` samples.
    pub fn num_frames(&self, len: usize) -> usize {
        if len < self.size {
            0
        } else {
            1 + (len - self.size) / self.hop
        }
    }

    /// Forward transform: magnitude and phase per frame.
    pub fn forward(&self, samples: &[f32]) -> StftFrames {
        let frames = self.num_frames(samples.len());
        let bins = self.size / 2 + 1;
        let mut magnitude = Vec::with_capacity(frames);
        let mut phase = Vec::with_capacity(frames);
        let mut buf = vec![Complex::new(0.0f32, 0.0); self.size];

        for t in 0..frames {
            let start = t * self.hop;
            for (i, v) in buf.iter_mut().enumerate() {
                *v = Complex::new(samples[start + i] * self.window[i], 0.0);
            }
            self.forward.process(&mut buf);

            let mut mag = Vec::with_capacity(bins);
            let mut ph = Vec::with_capacity(bins);
            for c in &buf[..bins] {
                mag.push(c.norm());
                ph.push(c.arg());
            }
            magnitude.push(mag);
            phase.push(ph);
        }

        StftFrames { magnitude, phase }
    }

    /// Inverse transform via weighted overlap-add.
    ///
    /// `frames` must carry `size / 2 + 1` bins per frame; the negative
    /// frequencies are restored by conjugate symmetry. Returns
    /// `(num_frames − 1) · hop + size` samples, or an empty buffer for zero
    /// frames.
    pub fn inverse(&self, frames: &StftFrames) -> Vec<f32> {
        let n = frames.num_frames();
        if n == 0 {
            return Vec::new();
        }

        let out_len = (n - 1) * self.hop + self.size;
        let mut acc = vec![0.0f32; out_len];
        let mut wsum = vec![0.0f32; out_len];
        let mut buf = vec![Complex::new(0.0f32, 0.0); self.size];
        let scale = 1.0 / self.size as f32;

        for t in 0..n {
            let mag = &frames.magnitude[t];
            let ph = &frames.phase[t];

            for k in 0..=self.size / 2 {
                buf[k] = Complex::from_polar(mag[k], ph[k]);
            }
            for k in 1..self.size / 2 {
                buf[self.size - k] = buf[k].conj();
            }
            self.inverse.process(&mut buf);

            let start = t * self.hop;
            for i in 0..self.size {
                let s = buf[i].re * scale;
                acc[start + i] += s * self.window[i];
                wsum[start + i] += self.window[i] * self.window[i];
            }
        }

        for (a, w) in acc.iter_mut().zip(&wsum) {
            if *w > 1e-8 {
                *a /= w;
            }
        }
        acc
    }
}
