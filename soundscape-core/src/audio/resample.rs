//! Offline sample-rate conversion using a rubato `FastFixedIn` resampler.
//!
//! ## Design
//!
//! Recorders in the field ship WAVs at 22.05, 44.1 or 48 kHz; the analysis
//! runs at one fixed rate so that frequency-band boundaries (NDSI, MFC) mean
//! the same thing across deployments. Unlike a streaming converter this one
//! sees the whole clip at once: input is fed to rubato in fixed chunks and
//! the final partial chunk is zero-padded, with the padded tail trimmed from
//! the output.
//!
//! When the native rate already matches the target, this is a plain copy —
//! no rubato session is created at all.

use rubato::{FastFixedIn, PolynomialDegree, Resampler};

use crate::error::{Result, SoundscapeError};

/// Input frames fed to rubato per process call.
const CHUNK: usize = 1024;

/// Resample a whole mono buffer from `from_rate` to `to_rate`.
///
/// # Errors
/// Returns `SoundscapeError::Resample` if rubato fails to initialise or
/// process; for equal rates this never fails.
pub fn resample_buffer(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate {
        return Ok(samples.to_vec());
    }

    let ratio = to_rate as f64 / from_rate as f64;

    let mut resampler = FastFixedIn::<f32>::new(
        ratio,
        1.0, // fixed ratio — no dynamic adjustment
        PolynomialDegree::Cubic,
        CHUNK,
        1, // mono
    )
    .map_err(|e| SoundscapeError::Resample(format!("init: {e}")))?;

    let mut output_buf = vec![vec![0f32; resampler.output_frames_max()]; 1];
    let mut out = Vec::with_capacity((samples.len() as f64 * ratio) as usize + CHUNK);

    let mut pos = 0;
    while pos + CHUNK <= samples.len() {
        let (_consumed, produced) = resampler
            .process_into_buffer(&[&samples[pos..pos + CHUNK]], &mut output_buf, None)
            .map_err(|e| SoundscapeError::Resample(format!("process: {e}")))?;
        out.extend_from_slice(&output_buf[0][..produced]);
        pos += CHUNK;
    }

    // Zero-pad the final partial chunk; keep only the frames that correspond
    // to real input.
    let tail = samples.len() - pos;
    if tail > 0 {
        let mut last = vec![0f32; CHUNK];
        last[..tail].copy_from_slice(&samples[pos..]);
        let (_consumed, produced) = resampler
            .process_into_buffer(&[last.as_slice()], &mut output_buf, None)
            .map_err(|e| SoundscapeError::Resample(format!("process: {e}")))?;
        let keep = ((tail as f64 * ratio).round() as usize).min(produced);
        out.extend_from_slice(&output_buf[0][..keep]);
    }

    Ok(out)
}
