#![no_main]
use impulse_charger::config::SamplingConfig;
use impulse_charger::termination::DeltaVDetector;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Interpret the input as a big-endian stream of raw readings, any width
    let sampling = SamplingConfig {
        readings_count: 3,
        average_length: 4,
        ..SamplingConfig::default()
    };
    let mut detector = DeltaVDetector::new(&sampling);

    let mut last_max = 0;
    for b in data.chunks_exact(2) {
        let _ = detector.record_sample(u16::from_be_bytes([b[0], b[1]]));
        assert!(detector.max_voltage_mv() >= last_max);
        assert!(detector.window().len() == sampling.average_length);
        last_max = detector.max_voltage_mv();
    }
});
