//! Optional JSON settings file.
//!
//! A deployment keeps its tuning (segment policy, SNR target, gate factor)
//! in one JSON file checked in next to the data, and the CLI flags override
//! individual values per run. Unknown or missing fields fall back to the
//! pipeline defaults; out-of-range values are clamped, not rejected.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use soundscape_core::PipelineConfig;

/// Mirrors [`PipelineConfig`] with every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct BatchSettings {
    pub target_sample_rate: Option<u32>,
    pub segment_secs: Option<f64>,
    pub skip_secs: Option<f64>,
    pub segments_per_file: Option<usize>,
    pub snr_db: Option<f64>,
    pub gate_factor: Option<f32>,
    pub denoise_fft_size: Option<usize>,
    pub denoise_hop: Option<usize>,
    pub index_fft_size: Option<usize>,
    pub index_overlap: Option<usize>,
    pub workers: Option<usize>,
    pub file_timeout_secs: Option<u64>,
}

impl BatchSettings {
    /// Overlay these settings on top of the defaults.
    pub fn apply(&self, config: &mut PipelineConfig) {
        macro_rules! overlay {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = self.$field {
                    config.$field = v;
                })*
            };
        }
        overlay!(
            target_sample_rate,
            segment_secs,
            skip_secs,
            segments_per_file,
            snr_db,
            gate_factor,
            denoise_fft_size,
            denoise_hop,
            index_fft_size,
            index_overlap,
            workers,
            file_timeout_secs,
        );
    }
}

/// Load settings from a JSON file.
pub fn load_settings(path: &Path) -> anyhow::Result<BatchSettings> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading settings file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("parsing settings file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_overlay_defaults() {
        let settings: BatchSettings =
            serde_json::from_str(r#"{"segmentSecs": 30.0, "segmentsPerFile": 5}"#).unwrap();
        let mut config = PipelineConfig::default();
        settings.apply(&mut config);

        assert_eq!(config.segment_secs, 30.0);
        assert_eq!(config.segments_per_file, 5);
        // Untouched fields keep their defaults.
        assert_eq!(config.target_sample_rate, 48_000);
        assert_eq!(config.gate_factor, 1.2);
    }

    #[test]
    fn empty_object_changes_nothing() {
        let settings: BatchSettings = serde_json::from_str("{}").unwrap();
        let mut config = PipelineConfig::default();
        settings.apply(&mut config);
        assert_eq!(config.segment_secs, 120.0);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let settings: Result<BatchSettings, _> =
            serde_json::from_str(r#"{"snrDb": 12.0, "futureKnob": true}"#);
        assert!(settings.is_ok());
    }

    #[test]
    fn load_reports_missing_file() {
        assert!(load_settings(Path::new("/no/such/settings.json")).is_err());
    }
}
