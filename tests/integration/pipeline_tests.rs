//! Acquisition pipeline driven through the firmware service.

use bioreactor::protocol::engine::DEFAULT_INFO;

use crate::mock_hw::{MockAdc, NoopDelay, default_firmware};

#[test]
fn spikes_inside_the_window_are_rejected() {
    let fw = default_firmware();
    let mut pipeline = fw.activities(DEFAULT_INFO).pipeline;
    let mut delay = NoopDelay::default();

    // Samples at 0, 20, .., 800; the last ten fill the window.
    let mut codes = vec![512u16; 41];
    codes[35] = 1023;
    codes[38] = 0;
    let mut adc = MockAdc::constant(512, 512);
    adc.script_ph(&codes);

    for now in (0..=800).step_by(10) {
        fw.acquire_step(&mut pipeline, now, &mut adc, &mut delay);
    }
    assert!(adc.ph.is_empty());

    let snap = fw.sensors();
    assert!((snap.ph - 8.75).abs() < 1e-4, "pH {}", snap.ph);
    assert!((snap.gravity_voltage - 2.5).abs() < 1e-4);
}

#[test]
fn readings_hold_between_publishes() {
    let fw = default_firmware();
    let mut pipeline = fw.activities(DEFAULT_INFO).pipeline;
    let mut delay = NoopDelay::default();
    let mut adc = MockAdc::constant(512, 512);

    assert!(fw.acquire_step(&mut pipeline, 0, &mut adc, &mut delay));
    let first = fw.sensors();

    adc = MockAdc::constant(256, 512);
    let mut published = false;
    for now in (10..800).step_by(10) {
        published |= fw.acquire_step(&mut pipeline, now, &mut adc, &mut delay);
    }
    assert!(!published);
    assert_eq!(fw.sensors(), first);

    assert!(fw.acquire_step(&mut pipeline, 800, &mut adc, &mut delay));
    assert!(fw.sensors().ph < first.ph);
}

#[test]
fn temperature_burst_waits_between_samples() {
    let fw = default_firmware();
    let mut pipeline = fw.activities(DEFAULT_INFO).pipeline;
    let mut delay = NoopDelay::default();
    fw.acquire_step(&mut pipeline, 0, &mut MockAdc::constant(512, 512), &mut delay);

    let config = fw.config();
    let gaps = u64::from(config.temp_samples - 1) * u64::from(config.temp_sample_delay_ms);
    assert_eq!(delay.total_ms, gaps);
    assert!((fw.sensors().temperature_c - 25.0).abs() < 0.01);
}
