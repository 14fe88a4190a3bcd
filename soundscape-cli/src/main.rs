//! Soundscape batch runner.
//!
//! Walks the given recordings, computes the six acoustic indices per
//! segment, and writes one CSV row per segment. Exits non-zero when the
//! noise reference cannot be loaded or when the run produces no rows — an
//! empty table is never a valid success.

mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use soundscape_core::{run_batch, BatchRequest, PipelineConfig};
use tracing::{error, info};

use settings::load_settings;

#[derive(Parser, Debug)]
#[command(
    name = "soundscape",
    version,
    about = "Compute acoustic biodiversity indices from field recordings"
)]
struct Cli {
    /// WAV files and/or directories to scan for recordings
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Static-noise reference WAV, captured once on site
    #[arg(long)]
    noise_file: PathBuf,

    /// Output CSV path
    #[arg(long)]
    output_file: PathBuf,

    /// JSON settings file; individual flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Analysis sample rate in Hz
    #[arg(long)]
    target_sr: Option<u32>,

    /// Segment length in seconds
    #[arg(long)]
    segment_duration: Option<f64>,

    /// Gap between segments in seconds
    #[arg(long)]
    skip_duration: Option<f64>,

    /// Maximum segments per recording
    #[arg(long)]
    total_segments: Option<usize>,

    /// Target SNR in dB for noise subtraction
    #[arg(long)]
    snr_db: Option<f64>,

    /// Spectral-gate threshold multiplier
    #[arg(long)]
    gate_factor: Option<f32>,

    /// Worker threads (default: one per core)
    #[arg(long)]
    workers: Option<usize>,

    /// Per-file wall-clock budget in seconds
    #[arg(long)]
    file_timeout: Option<u64>,
}

impl Cli {
    fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = PipelineConfig::default();

        if let Some(path) = &self.config {
            let file_settings =
                load_settings(path).context("cannot load the settings file")?;
            file_settings.apply(&mut config);
        }

        if let Some(v) = self.target_sr {
            config.target_sample_rate = v;
        }
        if let Some(v) = self.segment_duration {
            config.segment_secs = v;
        }
        if let Some(v) = self.skip_duration {
            config.skip_secs = v;
        }
        if let Some(v) = self.total_segments {
            config.segments_per_file = v;
        }
        if let Some(v) = self.snr_db {
            config.snr_db = v;
        }
        if let Some(v) = self.gate_factor {
            config.gate_factor = v;
        }
        if let Some(v) = self.workers {
            config.workers = v;
        }
        if let Some(v) = self.file_timeout {
            config.file_timeout_secs = v;
        }

        config.normalize();
        Ok(config)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soundscape=info,soundscape_core=info".parse().unwrap()),
        )
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("batch failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.pipeline_config()?;

    let request = BatchRequest {
        inputs: cli.inputs.clone(),
        noise_path: cli.noise_file.clone(),
        output_path: cli.output_file.clone(),
        config,
    };

    let summary = run_batch(&request)?;
    info!(
        rows = summary.rows_written,
        processed = summary.files_processed,
        skipped = summary.files_skipped,
        output = %cli.output_file.display(),
        "results saved"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings_path = dir.path().join("settings.json");
        std::fs::write(&settings_path, r#"{"segmentSecs": 30.0, "snrDb": 6.0}"#).unwrap();

        let cli = Cli::parse_from([
            "soundscape",
            "recordings/",
            "--noise-file",
            "noise.wav",
            "--output-file",
            "out.csv",
            "--config",
            settings_path.to_str().unwrap(),
            "--snr-db",
            "24",
        ]);
        let config = cli.pipeline_config().unwrap();

        assert_eq!(config.segment_secs, 30.0); // from the file
        assert_eq!(config.snr_db, 24.0); // flag wins
        assert_eq!(config.segments_per_file, 2); // default
    }

    #[test]
    fn defaults_match_the_field_deployment() {
        let cli = Cli::parse_from([
            "soundscape",
            "in.wav",
            "--noise-file",
            "noise.wav",
            "--output-file",
            "out.csv",
        ]);
        let config = cli.pipeline_config().unwrap();
        assert_eq!(config.target_sample_rate, 48_000);
        assert_eq!(config.segment_secs, 120.0);
        assert_eq!(config.skip_secs, 60.0);
        assert_eq!(config.segments_per_file, 2);
        assert_eq!(config.snr_db, 18.0);
    }
}
