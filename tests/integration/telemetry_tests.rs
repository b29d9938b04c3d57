//! Telemetry publisher against the coordinated link.

use bioreactor::protocol::engine::DEFAULT_INFO;

use crate::mock_hw::{MockAdc, NoopDelay, default_firmware, exchange};

#[test]
fn nothing_is_sent_while_flags_are_off() {
    let fw = default_firmware();
    assert_eq!(fw.telemetry_step(&mut NoopDelay::default()), 0);
    assert!(fw.link().try_acquire().unwrap().output.is_empty());
}

#[test]
fn fast_frame_carries_published_readings() {
    let fw = default_firmware();
    let mut activities = fw.activities(DEFAULT_INFO);
    let mut delay = NoopDelay::default();
    assert!(fw.acquire_step(&mut activities.pipeline, 0, &mut MockAdc::constant(512, 512), &mut delay));

    exchange(&fw, &mut activities.terminal, "CMD,DEBUG_FAST,1\n");
    assert_eq!(fw.telemetry_step(&mut delay), 1);
    let lines = fw.link().try_acquire().unwrap().take_lines();
    assert_eq!(lines, vec!["$<DF?PH:8.750,TEMP:25.000,GS:2.500>&"]);
}

#[test]
fn fast_frame_precedes_pump_frame() {
    let fw = default_firmware();
    let mut terminal = fw.activities(DEFAULT_INFO).terminal;
    exchange(
        &fw,
        &mut terminal,
        "CMD,DEBUG_PUMP,1\nCMD,DEBUG_FAST,1\nCMD,SET_PUMP,3,-64\n",
    );

    assert_eq!(fw.telemetry_step(&mut NoopDelay::default()), 2);
    let lines = fw.link().try_acquire().unwrap().take_lines();
    assert_eq!(
        lines,
        vec![
            "$<DF?PH:0.000,TEMP:0.000,GS:0.000>&",
            "$<DP?0:0,1:0,2:0,3:-64>&",
        ]
    );
}

#[test]
fn busy_link_drops_the_cycle() {
    let fw = default_firmware();
    let mut terminal = fw.activities(DEFAULT_INFO).terminal;
    exchange(&fw, &mut terminal, "CMD,DEBUG_PUMP,1\n");

    let mut delay = NoopDelay::default();
    {
        let _held = fw.link().try_acquire().unwrap();
        assert_eq!(fw.telemetry_step(&mut delay), 0);
    }
    assert_eq!(delay.total_ms, u64::from(fw.link().max_wait_ms()));
    assert!(fw.link().try_acquire().unwrap().output.is_empty());

    // Skipped frames are not queued.
    assert_eq!(fw.telemetry_step(&mut delay), 1);
    assert_eq!(fw.link().try_acquire().unwrap().take_lines().len(), 1);
}

#[test]
fn disabling_a_flag_stops_its_frame() {
    let fw = default_firmware();
    let mut terminal = fw.activities(DEFAULT_INFO).terminal;
    exchange(&fw, &mut terminal, "CMD,DEBUG_PUMP,1\nCMD,DEBUG_FAST,1\n");
    exchange(&fw, &mut terminal, "CMD,DEBUG_FAST,0\n");

    assert_eq!(fw.telemetry_step(&mut NoopDelay::default()), 1);
    let lines = fw.link().try_acquire().unwrap().take_lines();
    assert!(lines[0].starts_with("$<DP?"));
}
