//! Batch orchestration.
//!
//! ## Per-batch state machine
//!
//! ```text
//! Init → LoadNoiseProfile → ForEachFile {
//!     Extract → (skip | Decode+Resample) → Denoise → Segment →
//!         (skip | ForEachSegment { ComputeIndices → AppendRow })
//! } → Sort → Flush
//! ```
//!
//! Files are independent, so the runner fans them out over a fixed worker
//! pool: a crossbeam job channel feeds paths to `std::thread` workers, each
//! of which owns its own denoiser and index calculator and shares the one
//! immutable noise profile. Rows land in a mutex-guarded accumulator and are
//! sorted by (filename, segment) before the single flush, so output is
//! reproducible regardless of scheduling.
//!
//! Failure boundaries: a missing noise reference aborts the batch before any
//! file is touched; anything wrong with one recording becomes a logged
//! [`SkipReason`] and the batch continues; zero accumulated rows is reported
//! as batch failure and no output file is written.

pub mod table;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use parking_lot::Mutex;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::audio::{self, resample::resample_buffer};
use crate::config::PipelineConfig;
use crate::denoise::{Denoiser, NoiseProfile};
use crate::error::{Result, SkipReason, SoundscapeError};
use crate::indices::IndexCalculator;
use crate::metadata;
use crate::segment;

pub use table::{sort_rows, write_csv, IndexRecord, CSV_HEADER};

/// Everything a batch run needs.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    /// WAV files and/or directories to scan recursively.
    pub inputs: Vec<PathBuf>,
    /// The static-noise reference WAV.
    pub noise_path: PathBuf,
    /// Where the CSV lands.
    pub output_path: PathBuf,
    pub config: PipelineConfig,
}

/// Counters reported after a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub files_seen: usize,
    pub files_processed: usize,
    pub files_skipped: usize,
    pub rows_written: usize,
}

/// Per-file result the orchestrator branches on.
///
/// Fatal conditions never appear here — they abort the batch through
/// [`SoundscapeError`] instead.
#[derive(Debug)]
pub enum FileOutcome {
    Rows(Vec<IndexRecord>),
    Skipped { file: String, reason: SkipReason },
}

/// Run a whole batch: scan, process, sort, flush.
///
/// # Errors
/// - [`SoundscapeError::NoInputs`] when no `.wav` files are found.
/// - [`SoundscapeError::NoiseProfile`] when the reference clip cannot load.
/// - [`SoundscapeError::EmptyBatch`] when every file was skipped; no output
///   file is written in that case.
pub fn run_batch(request: &BatchRequest) -> Result<BatchSummary> {
    let mut config = request.config.clone();
    config.normalize();

    let files = collect_recordings(&request.inputs);
    if files.is_empty() {
        return Err(SoundscapeError::NoInputs);
    }

    let noise = NoiseProfile::load(&request.noise_path, config.target_sample_rate)?;

    let workers = config.effective_workers().min(files.len());
    info!(
        files = files.len(),
        workers,
        rate = config.target_sample_rate,
        "batch started"
    );

    let rows: Mutex<Vec<IndexRecord>> = Mutex::new(Vec::new());
    let processed = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(0);
    let timeout = Duration::from_secs(config.file_timeout_secs);

    let (job_tx, job_rx) = bounded::<PathBuf>(files.len());
    for file in &files {
        // Capacity equals the file count, so this never blocks.
        let _ = job_tx.send(file.clone());
    }
    drop(job_tx);

    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let noise = Arc::clone(&noise);
            let config = &config;
            let rows = &rows;
            let processed = &processed;
            let skipped = &skipped;

            scope.spawn(move || {
                let denoiser = Denoiser::new(config);
                let calculator = IndexCalculator::new(config);

                while let Ok(path) = job_rx.recv() {
                    let started = Instant::now();
                    let mut outcome = process_file(&path, &noise, &denoiser, &calculator, config);
                    if started.elapsed() > timeout {
                        outcome = FileOutcome::Skipped {
                            file: display_name(&path),
                            reason: SkipReason::Timeout,
                        };
                    }

                    match outcome {
                        FileOutcome::Rows(file_rows) => {
                            info!(
                                file = %display_name(&path),
                                segments = file_rows.len(),
                                elapsed_ms = started.elapsed().as_millis() as u64,
                                "file processed"
                            );
                            processed.fetch_add(1, Ordering::Relaxed);
                            rows.lock().extend(file_rows);
                        }
                        FileOutcome::Skipped { file, reason } => {
                            warn!(file = %file, reason = %reason, "file skipped");
                            skipped.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            });
        }
    });

    let mut rows = rows.into_inner();
    if rows.is_empty() {
        return Err(SoundscapeError::EmptyBatch);
    }

    sort_rows(&mut rows);
    write_csv(&request.output_path, &rows)?;

    let summary = BatchSummary {
        files_seen: files.len(),
        files_processed: processed.into_inner(),
        files_skipped: skipped.into_inner(),
        rows_written: rows.len(),
    };
    info!(
        files = summary.files_seen,
        processed = summary.files_processed,
        skipped = summary.files_skipped,
        rows = summary.rows_written,
        output = %request.output_path.display(),
        "batch finished"
    );
    Ok(summary)
}

/// Run the whole per-file sequence, mapping every failure to a skip.
fn process_file(
    path: &Path,
    noise: &NoiseProfile,
    denoiser: &Denoiser,
    calculator: &IndexCalculator,
    config: &PipelineConfig,
) -> FileOutcome {
    let filename = display_name(path);

    let Some(meta) = metadata::extract(&filename) else {
        return FileOutcome::Skipped {
            file: filename,
            reason: SkipReason::NoTimestamp,
        };
    };

    let decoded = match audio::read_wav_mono(path) {
        Ok(d) => d,
        Err(e) => {
            return FileOutcome::Skipped {
                file: filename,
                reason: SkipReason::DecodeFailed(e.to_string()),
            }
        }
    };
    let samples = match resample_buffer(
        &decoded.samples,
        decoded.sample_rate,
        config.target_sample_rate,
    ) {
        Ok(s) => s,
        Err(e) => {
            return FileOutcome::Skipped {
                file: filename,
                reason: SkipReason::DecodeFailed(e.to_string()),
            }
        }
    };

    let cleaned = denoiser.denoise(&samples, noise);

    let segments = segment::plan(cleaned.len(), config);
    if segments.is_empty() {
        return FileOutcome::Skipped {
            file: filename,
            reason: SkipReason::TooShort,
        };
    }

    let rows = segments
        .iter()
        .map(|seg| {
            let indices =
                calculator.compute(&cleaned[seg.range.clone()], config.target_sample_rate);
            IndexRecord::new(
                &filename,
                seg.index,
                &meta,
                seg.offset_secs(config),
                indices,
            )
        })
        .collect();
    FileOutcome::Rows(rows)
}

/// Expand files/directories into a sorted, deduplicated list of WAV paths.
fn collect_recordings(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).into_iter() {
                match entry {
                    Ok(e) if e.file_type().is_file() && is_wav(e.path()) => {
                        files.push(e.into_path());
                    }
                    Ok(_) => {}
                    Err(e) => warn!(input = %input.display(), error = %e, "scan error"),
                }
            }
        } else if input.is_file() {
            if is_wav(input) {
                files.push(input.clone());
            } else {
                warn!(input = %input.display(), "not a .wav file — ignored");
            }
        } else {
            warn!(input = %input.display(), "input path does not exist");
        }
    }
    files.sort();
    files.dedup();
    files
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("wav"))
        .unwrap_or(false)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
