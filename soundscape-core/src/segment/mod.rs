//! Deterministic segmentation of a cleaned recording.
//!
//! Windows are fixed-length and fixed-offset: start at sample 0, take one
//! segment, jump forward by segment + skip, repeat. A window that would run
//! past the end of the buffer is never emitted, so every segment is exactly
//! `segment_secs × rate` samples. Zero complete windows means the file is
//! too short and is skipped by the caller.

use std::ops::Range;

use crate::config::PipelineConfig;

/// One analysis window into a denoised buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// 1-based position within the recording.
    pub index: usize,
    /// Sample range into the source buffer.
    pub range: Range<usize>,
}

impl Segment {
    /// Elapsed seconds from the start of the recording to this segment.
    pub fn offset_secs(&self, config: &PipelineConfig) -> f64 {
        (self.index - 1) as f64 * (config.segment_secs + config.skip_secs)
    }
}

/// Plan up to `segments_per_file` windows over a buffer of `len` samples.
pub fn plan(len: usize, config: &PipelineConfig) -> Vec<Segment> {
    let segment_samples = config.segment_samples();
    let skip_samples = config.skip_samples();
    if segment_samples == 0 {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut start = 0usize;
    for index in 1..=config.segments_per_file {
        let end = start + segment_samples;
        if end > len {
            break;
        }
        segments.push(Segment {
            index,
            range: start..end,
        });
        start += segment_samples + skip_samples;
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(segment_secs: f64, skip_secs: f64, count: usize, rate: u32) -> PipelineConfig {
        PipelineConfig {
            target_sample_rate: rate,
            segment_secs,
            skip_secs,
            segments_per_file: count,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn exact_fit_yields_all_segments() {
        // N segments + (N−1) gaps, nothing to spare.
        let cfg = config(2.0, 1.0, 3, 1_000);
        let len = 3 * 2_000 + 2 * 1_000;
        let segments = plan(len, &cfg);

        assert_eq!(segments.len(), 3);
        for (i, seg) in segments.iter().enumerate() {
            assert_eq!(seg.index, i + 1);
            assert_eq!(seg.range.len(), 2_000);
            assert_eq!(seg.range.start, i * 3_000);
        }
    }

    #[test]
    fn shorter_than_one_segment_yields_none() {
        let cfg = config(2.0, 1.0, 3, 1_000);
        assert!(plan(1_999, &cfg).is_empty());
    }

    #[test]
    fn partial_final_window_is_dropped() {
        let cfg = config(2.0, 1.0, 3, 1_000);
        // The third window would need samples up to 8000; stop one short.
        let segments = plan(7_999, &cfg);
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn segment_count_caps_the_plan() {
        let cfg = config(2.0, 1.0, 2, 1_000);
        let segments = plan(100_000, &cfg);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].range.start, 3_000);
    }

    #[test]
    fn offsets_follow_the_sampling_policy() {
        let cfg = config(120.0, 60.0, 2, 48_000);
        let segments = plan(48_000 * 300, &cfg);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].offset_secs(&cfg), 0.0);
        assert_eq!(segments[1].offset_secs(&cfg), 180.0);
    }

    #[test]
    fn zero_skip_packs_segments_back_to_back() {
        let cfg = config(1.0, 0.0, 4, 1_000);
        let segments = plan(3_500, &cfg);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[2].range, 2_000..3_000);
    }
}
