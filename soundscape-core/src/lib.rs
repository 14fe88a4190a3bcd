//! # soundscape-core
//!
//! Batch pipeline that reduces long field recordings to rows of six
//! standardized acoustic indices.
//!
//! ## Architecture
//!
//! ```text
//! *.wav ─► MetadataExtractor ─► decode + resample (48 kHz mono)
//!                                        │
//!                            Denoiser(NoiseProfile) — subtraction + spectral gate
//!                                        │
//!                                   Segmenter
//!                                        │
//!                        IndexCalculator ─► ADI ACI AEI NDSI MFC CLS
//!                                        │
//!                             batch accumulator ─► results.csv
//! ```
//!
//! Files are independent: the batch runner fans them out over a fixed worker
//! pool, sharing one immutable [`denoise::NoiseProfile`]. A file that cannot
//! be processed is skipped with a logged reason; only a missing noise
//! reference or an entirely empty result aborts the batch.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod audio;
pub mod batch;
pub mod config;
pub mod denoise;
pub mod dsp;
pub mod error;
pub mod indices;
pub mod metadata;
pub mod segment;

// Convenience re-exports for downstream crates
pub use batch::{run_batch, BatchRequest, BatchSummary};
pub use config::PipelineConfig;
pub use denoise::{Denoiser, NoiseProfile};
pub use error::{SkipReason, SoundscapeError};
pub use indices::{IndexCalculator, IndexSet};
pub use metadata::RecordingMetadata;
