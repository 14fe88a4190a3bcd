//! The six acoustic indices, computed from one power spectrogram per
//! segment.
//!
//! All six values come out of a single pass so a row is either complete or
//! not emitted at all; there is no partial-failure mode here. An epsilon of
//! `1e-10` is added to every spectrogram cell before any division or
//! logarithm, and the remaining numerical edge cases (single-bin
//! spectrogram, fewer than two frames) resolve to fixed fallback values,
//! never errors.
//!
//! | Index | Meaning |
//! |-------|---------|
//! | ADI   | mean per-frame spectral entropy |
//! | ACI   | mean frame-to-frame spectral fluctuation over energy |
//! | AEI   | complement of normalized ADI |
//! | NDSI  | biophony vs anthrophony energy balance in [−1, 1] |
//! | MFC   | fraction of frames dominated by the 2–8 kHz band |
//! | CLS   | mean count of prominent spectral peaks per frame |

use crate::config::PipelineConfig;
use crate::dsp::Stft;

/// Additive floor applied to every spectrogram cell.
pub const EPSILON: f64 = 1e-10;

/// Biological band for NDSI (Hz). The 2 kHz boundary belongs to both bands.
pub const BIO_BAND_HZ: (f64, f64) = (2_000.0, 11_000.0);
/// Anthropogenic band for NDSI (Hz).
pub const ANTHRO_BAND_HZ: (f64, f64) = (100.0, 2_000.0);
/// Mid-frequency band for MFC (Hz).
pub const MID_BAND_HZ: (f64, f64) = (2_000.0, 8_000.0);
/// A frame counts toward MFC when its mid-band energy exceeds this fraction
/// of the frame total.
pub const MFC_ENERGY_FRACTION: f64 = 0.2;
/// Minimum max-normalized height for a spectral peak to count toward CLS.
pub const PEAK_HEIGHT: f64 = 0.5;

/// The six indices for one segment. Always populated together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexSet {
    pub adi: f64,
    pub aci: f64,
    pub aei: f64,
    pub ndsi: f64,
    pub mfc: f64,
    pub cls: f64,
}

/// Spectrogram frontend + index math. One per worker.
pub struct IndexCalculator {
    stft: Stft,
    fft_size: usize,
}

impl IndexCalculator {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            stft: Stft::new(config.index_fft_size, config.index_hop()),
            fft_size: config.index_fft_size,
        }
    }

    /// Compute all six indices for one segment buffer.
    pub fn compute(&self, samples: &[f32], sample_rate: u32) -> IndexSet {
        let (freqs, sxx) = self.power_spectrogram(samples, sample_rate);
        compute_from_spectrogram(&freqs, &sxx)
    }

    /// Power spectrogram (frame-major) with the epsilon floor applied, plus
    /// the frequency axis in Hz.
    fn power_spectrogram(&self, samples: &[f32], sample_rate: u32) -> (Vec<f64>, Vec<Vec<f64>>) {
        let frames = self.stft.forward(samples);
        let sxx: Vec<Vec<f64>> = frames
            .magnitude
            .iter()
            .map(|mag| {
                mag.iter()
                    .map(|&m| m as f64 * m as f64 + EPSILON)
                    .collect()
            })
            .collect();

        let bin_hz = sample_rate as f64 / self.fft_size as f64;
        let freqs = (0..=self.fft_size / 2).map(|k| k as f64 * bin_hz).collect();
        (freqs, sxx)
    }
}

/// Pure index math over a prepared spectrogram.
///
/// `sxx` is frame-major (`sxx[t][k]`) with the epsilon floor already
/// applied; `freqs` carries one entry per bin. Exposed separately so the
/// definitions can be unit-tested against synthetic spectra.
pub fn compute_from_spectrogram(freqs: &[f64], sxx: &[Vec<f64>]) -> IndexSet {
    let n_frames = sxx.len();
    let n_bins = freqs.len();
    if n_frames == 0 || n_bins == 0 {
        return IndexSet {
            adi: 0.0,
            aci: 0.0,
            aei: 1.0,
            ndsi: 0.0,
            mfc: 0.0,
            cls: 0.0,
        };
    }

    let adi = mean_frame_entropy(sxx);
    let aei = if n_bins > 1 {
        1.0 - adi / (n_bins as f64).ln()
    } else {
        1.0
    };
    let aci = complexity(sxx, n_bins);
    let ndsi = band_balance(freqs, sxx);
    let mfc = mid_frequency_cover(freqs, sxx);
    let cls = mean_peak_count(sxx);

    IndexSet {
        adi,
        aci,
        aei,
        ndsi,
        mfc,
        cls,
    }
}

/// ADI: Shannon entropy (nats) of each frame's normalized spectrum, averaged
/// over frames.
fn mean_frame_entropy(sxx: &[Vec<f64>]) -> f64 {
    let total: f64 = sxx
        .iter()
        .map(|frame| {
            let sum: f64 = frame.iter().sum();
            frame
                .iter()
                .map(|&v| {
                    let p = v / sum;
                    -p * p.ln()
                })
                .sum::<f64>()
        })
        .sum();
    total / sxx.len() as f64
}

/// ACI: per bin, the summed frame-to-frame absolute difference divided by
/// the bin's total energy over all but the last frame; averaged over bins.
///
/// The denominator deliberately excludes the final frame — that is how the
/// index has always been computed here, and downstream series depend on it.
fn complexity(sxx: &[Vec<f64>], n_bins: usize) -> f64 {
    let n_frames = sxx.len();
    if n_frames < 2 {
        return 0.0;
    }

    let mut sum_ratios = 0.0;
    for k in 0..n_bins {
        let mut delta = 0.0;
        let mut energy = 0.0;
        for t in 0..n_frames - 1 {
            delta += (sxx[t + 1][k] - sxx[t][k]).abs();
            energy += sxx[t][k];
        }
        sum_ratios += delta / energy;
    }
    sum_ratios / n_bins as f64
}

/// NDSI: (B − A) / (B + A) over the biological and anthropogenic bands.
fn band_balance(freqs: &[f64], sxx: &[Vec<f64>]) -> f64 {
    let b = band_energy(freqs, sxx, BIO_BAND_HZ);
    let a = band_energy(freqs, sxx, ANTHRO_BAND_HZ);
    if b + a == 0.0 {
        return 0.0;
    }
    (b - a) / (b + a)
}

fn band_energy(freqs: &[f64], sxx: &[Vec<f64>], band: (f64, f64)) -> f64 {
    let mut sum = 0.0;
    for frame in sxx {
        for (k, &f) in freqs.iter().enumerate() {
            if f >= band.0 && f <= band.1 {
                sum += frame[k];
            }
        }
    }
    sum
}

/// MFC: fraction of frames whose 2–8 kHz energy exceeds 20 % of the frame
/// total.
fn mid_frequency_cover(freqs: &[f64], sxx: &[Vec<f64>]) -> f64 {
    let covered = sxx
        .iter()
        .filter(|frame| {
            let mut mid = 0.0;
            let mut total = 0.0;
            for (k, &f) in freqs.iter().enumerate() {
                total += frame[k];
                if f >= MID_BAND_HZ.0 && f <= MID_BAND_HZ.1 {
                    mid += frame[k];
                }
            }
            mid > MFC_ENERGY_FRACTION * total
        })
        .count();
    covered as f64 / sxx.len() as f64
}

/// CLS: per frame, count interior local maxima whose max-normalized height
/// reaches [`PEAK_HEIGHT`]; averaged over frames.
fn mean_peak_count(sxx: &[Vec<f64>]) -> f64 {
    let total: usize = sxx
        .iter()
        .map(|frame| {
            let max = frame.iter().cloned().fold(f64::MIN, f64::max);
            frame
                .windows(3)
                .filter(|w| w[1] > w[0] && w[1] > w[2] && w[1] / max >= PEAK_HEIGHT)
                .count()
        })
        .sum();
    total as f64 / sxx.len() as f64
}
