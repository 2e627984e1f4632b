use spinflow_core::{
    ByteSpectrumAnalyzer, SpectrumAnalyzerConfig, SpectrumSource, VolumeAnimator,
};

fn tone(bin: usize, fft_size: usize, count: usize) -> Vec<f32> {
    (0..count)
        .map(|i| (2.0 * std::f32::consts::PI * bin as f32 * i as f32 / fft_size as f32).sin() * 0.5)
        .collect()
}

#[test]
fn test_analyzer_feeds_animator_end_to_end() {
    let config = SpectrumAnalyzerConfig {
        smoothing: 0.0,
        ..Default::default()
    };
    let mut analyzer = ByteSpectrumAnalyzer::new(config).unwrap();
    let mut animator = VolumeAnimator::default();
    let mut bins = vec![0u8; analyzer.bin_count()];

    // Steady tone for the warm-up, then louder material.
    for tick in 0..20 {
        let gain = if tick < 10 { 1.0 } else { 2.0 };
        let samples: Vec<f32> = tone(32, 256, 256).iter().map(|s| s * gain).collect();
        analyzer.push_samples(&samples);
        analyzer.frequency_snapshot(&mut bins);
        animator.ingest(&bins);
    }

    let frame = animator.frame().expect("baseline defined after 20 ticks");
    assert!(frame.volume > 0.0);
    assert!(frame.baseline > 0.0);
    assert!((0.0..360.0).contains(&frame.rotation_angle));
    assert!((0.5..=1.5).contains(&frame.saturation));
}

#[test]
fn test_bin_count_matches_fft_size() {
    let analyzer = ByteSpectrumAnalyzer::new(SpectrumAnalyzerConfig::default()).unwrap();
    // 256-point transform exposes 128 bins, matching the conventional
    // analyser resolution the animator was designed against.
    assert_eq!(analyzer.bin_count(), 128);
}
