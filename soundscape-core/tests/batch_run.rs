//! End-to-end batch behavior against real files on disk: per-file failure
//! isolation, deterministic output ordering, and the empty-batch failure
//! contract.

use std::fs;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use soundscape_core::{run_batch, BatchRequest, PipelineConfig, SoundscapeError};

const RATE: u32 = 8_000;

fn test_config() -> PipelineConfig {
    PipelineConfig {
        target_sample_rate: RATE,
        segment_secs: 1.0,
        skip_secs: 0.5,
        segments_per_file: 2,
        workers: 2,
        ..PipelineConfig::default()
    }
}

fn write_tone_wav(path: &Path, freq: f32, secs: f32) {
    let spec = WavSpec {
        channels: 1,
        sample_rate: RATE,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec).expect("create wav");
    let len = (secs * RATE as f32) as usize;
    for i in 0..len {
        let t = i as f32 / RATE as f32;
        writer
            .write_sample(0.4 * (2.0 * std::f32::consts::PI * freq * t).sin())
            .unwrap();
    }
    writer.finalize().expect("finalize wav");
}

/// Lay out `<dir>/recordings/` + `<dir>/noise.wav` and build the request.
fn setup(dir: &Path, recordings: &[(&str, f32)]) -> BatchRequest {
    let rec_dir = dir.join("recordings");
    fs::create_dir(&rec_dir).unwrap();
    for (name, secs) in recordings {
        write_tone_wav(&rec_dir.join(name), 3_000.0, *secs);
    }
    write_tone_wav(&dir.join("noise.wav"), 60.0, 0.5);
    BatchRequest {
        inputs: vec![rec_dir],
        noise_path: dir.join("noise.wav"),
        output_path: dir.join("results.csv"),
        config: test_config(),
    }
}

#[test]
fn bad_filename_is_isolated_and_the_rest_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let req = setup(
        dir.path(),
        &[
            ("A1_20250602_060000.wav", 3.0),
            ("badname.wav", 3.0),
            ("A1_20250602_070000.wav", 3.0),
        ],
    );

    let summary = run_batch(&req).expect("batch should succeed");

    assert_eq!(summary.files_seen, 3);
    assert_eq!(summary.files_processed, 2);
    assert_eq!(summary.files_skipped, 1);
    assert_eq!(summary.rows_written, 4); // 2 files × 2 segments

    let text = fs::read_to_string(dir.path().join("results.csv")).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "Filename,Segment,Year,Month,Date,Hour,Minute,Second,ADI,ACI,AEI,NDSI,MFC,CLS"
    );
    assert_eq!(lines.len(), 5);

    // Sorted by (filename, segment) regardless of worker scheduling.
    let keys: Vec<(String, String)> = lines[1..]
        .iter()
        .map(|l| {
            let mut cols = l.split(',');
            (
                cols.next().unwrap().to_owned(),
                cols.next().unwrap().to_owned(),
            )
        })
        .collect();
    assert_eq!(
        keys,
        vec![
            ("A1_20250602_060000.wav".into(), "1".into()),
            ("A1_20250602_060000.wav".into(), "2".into()),
            ("A1_20250602_070000.wav".into(), "1".into()),
            ("A1_20250602_070000.wav".into(), "2".into()),
        ]
    );
    assert!(!text.contains("badname.wav"));

    // Metadata and elapsed-seconds columns round-trip.
    let first: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(&first[2..8], &["2025", "06", "02", "6", "0", "0"]);
    let second_row: Vec<&str> = lines[2].split(',').collect();
    assert_eq!(second_row[7], "1.5"); // segment 2 starts at 1.0 s + 0.5 s skip
}

#[test]
fn too_short_audio_is_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let req = setup(
        dir.path(),
        &[
            ("A1_20250602_060000.wav", 0.25),
            ("A1_20250602_070000.wav", 3.0),
        ],
    );

    let summary = run_batch(&req).expect("batch should succeed");

    assert_eq!(summary.files_processed, 1);
    assert_eq!(summary.files_skipped, 1);
    assert_eq!(summary.rows_written, 2);
}

#[test]
fn zero_usable_files_is_a_batch_failure_with_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let req = setup(dir.path(), &[("badname.wav", 3.0)]);

    let err = run_batch(&req).expect_err("batch must fail");
    assert!(matches!(err, SoundscapeError::EmptyBatch));
    assert!(!dir.path().join("results.csv").exists());
}

#[test]
fn no_inputs_at_all_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let req = setup(dir.path(), &[]);

    let err = run_batch(&req).expect_err("batch must fail");
    assert!(matches!(err, SoundscapeError::NoInputs));
}

#[test]
fn missing_noise_reference_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut req = setup(dir.path(), &[("A1_20250602_060000.wav", 3.0)]);
    req.noise_path = dir.path().join("absent.wav");

    let err = run_batch(&req).expect_err("batch must fail");
    assert!(matches!(err, SoundscapeError::NoiseProfile { .. }));
    assert!(!dir.path().join("results.csv").exists());
}

#[test]
fn undecodable_wav_is_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let req = setup(dir.path(), &[("A1_20250602_060000.wav", 3.0)]);
    // Right name, garbage bytes.
    fs::write(
        dir.path().join("recordings").join("A1_20250602_070000.wav"),
        b"not a wav",
    )
    .unwrap();

    let summary = run_batch(&req).expect("batch should succeed");

    assert_eq!(summary.files_seen, 2);
    assert_eq!(summary.files_processed, 1);
    assert_eq!(summary.files_skipped, 1);
    assert_eq!(summary.rows_written, 2);
}
