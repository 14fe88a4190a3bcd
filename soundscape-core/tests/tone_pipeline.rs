//! The reference scenario: a 300 s synthetic recording at 48 kHz carrying a
//! pure 5 kHz tone (inside the biological band) must classify as strongly
//! biophonic in every segment the default policy selects.

use soundscape_core::{
    segment, Denoiser, IndexCalculator, NoiseProfile, PipelineConfig,
};

#[test]
fn pure_biological_tone_scores_biophonic_in_every_segment() {
    let config = PipelineConfig::default();
    let rate = config.target_sample_rate;

    let len = 300 * rate as usize;
    let audio: Vec<f32> = (0..len)
        .map(|i| {
            let t = i as f32 / rate as f32;
            0.5 * (2.0 * std::f32::consts::PI * 5_000.0 * t).sin()
        })
        .collect();

    // A silent reference clip: zero power short-circuits denoising, so the
    // tone reaches the calculator untouched.
    let noise = NoiseProfile::from_samples(vec![0.0; rate as usize]);
    let denoiser = Denoiser::new(&config);
    let cleaned = denoiser.denoise(&audio, &noise);
    assert_eq!(cleaned, audio);

    let segments = segment::plan(cleaned.len(), &config);
    assert_eq!(segments.len(), 2, "default policy takes two segments");
    assert_eq!(segments[0].offset_secs(&config), 0.0);
    assert_eq!(segments[1].offset_secs(&config), 180.0);

    let calculator = IndexCalculator::new(&config);
    for seg in &segments {
        let set = calculator.compute(&cleaned[seg.range.clone()], rate);
        assert!(set.ndsi > 0.9, "segment {}: ndsi={}", seg.index, set.ndsi);
        assert!(set.mfc > 0.5, "segment {}: mfc={}", seg.index, set.mfc);
        assert!(set.adi >= 0.0);
        assert!((-1.0..=1.0).contains(&set.ndsi));
        assert!((0.0..=1.0).contains(&set.mfc));
    }
}
