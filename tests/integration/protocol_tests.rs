//! End-to-end command handling: bytes in on the serial link, responses
//! out, actuator line writes recorded.

use bioreactor::protocol::engine::DEFAULT_INFO;
use bioreactor::protocol::terminal::{CONNECTED_BANNER, TerminalStep};

use crate::mock_hw::{NoopDelay, default_firmware, exchange, firmware, three_pump_config};

/// Exchange that drops the one-time banner from the first step.
fn session(input: &str) -> (crate::mock_hw::TestFirmware, Vec<String>) {
    let fw = default_firmware();
    let mut terminal = fw.activities(DEFAULT_INFO).terminal;
    let mut out = exchange(&fw, &mut terminal, input);
    assert_eq!(out.remove(0), CONNECTED_BANNER);
    (fw, out)
}

// ── Scenarios ─────────────────────────────────────────────────

#[test]
fn set_pump_drives_channel_and_echoes_ok() {
    let (fw, out) = session("CMD,SET_PUMP,1,100\n");
    assert_eq!(out, vec!["CMD,SET_PUMP,1,100|ERROR:0"]);
    assert_eq!(fw.current_speed(1).unwrap(), 100);
    fw.with_lines(|l| {
        assert_eq!(l.last_pwm(1), Some(100));
        assert_eq!(l.last_digital(6), Some(true));
        assert_eq!(l.last_digital(7), Some(false));
    });
}

#[test]
fn channel_out_of_range_is_invalid_parameter() {
    let (fw, out) = session("CMD,SET_PUMP,9,100\n");
    assert_eq!(out, vec!["CMD,SET_PUMP,9,100|ERROR:3"]);
    assert!(fw.speeds().iter().all(|&s| s == 0));
}

#[test]
fn unknown_command_is_invalid_command() {
    let (_, out) = session("CMD,FOO,1\n");
    assert_eq!(out, vec!["CMD,FOO,1|ERROR:2"]);
}

#[test]
fn garbage_is_bad_syntax() {
    let (_, out) = session("garbage\n");
    assert_eq!(out, vec!["garbage|ERROR:1"]);
}

#[test]
fn pump_frame_lists_every_channel() {
    let fw = firmware(three_pump_config());
    let mut terminal = fw.activities(DEFAULT_INFO).terminal;
    let out = exchange(
        &fw,
        &mut terminal,
        "CMD,SET_PUMP,0,10\nCMD,SET_PUMP,1,-20\nCMD,SET_PUMP,2,30\nCMD,DEBUG_PUMP,1\n",
    );
    assert_eq!(out.len(), 5);
    assert!(out[1..].iter().all(|l| l.ends_with("|ERROR:0")));

    assert_eq!(fw.telemetry_step(&mut NoopDelay::default()), 1);
    let frames = fw.link().try_acquire().unwrap().take_lines();
    assert_eq!(frames, vec!["$<DP?0:10,1:-20,2:30>&"]);
}

// ── Session behaviour ─────────────────────────────────────────

#[test]
fn banner_is_sent_once() {
    let fw = default_firmware();
    let mut terminal = fw.activities(DEFAULT_INFO).terminal;
    assert_eq!(exchange(&fw, &mut terminal, ""), vec![CONNECTED_BANNER]);
    assert!(exchange(&fw, &mut terminal, "").is_empty());
    assert_eq!(
        exchange(&fw, &mut terminal, "CMD,DEBUG_FAST,0\n"),
        vec!["CMD,DEBUG_FAST,0|ERROR:0"]
    );
}

#[test]
fn question_mark_prints_info_without_envelope() {
    let (_, out) = session("?\n");
    let expected: Vec<&str> = DEFAULT_INFO.lines().collect();
    assert_eq!(out, expected);
    assert!(out.iter().all(|l| !l.contains("|ERROR:")));
}

#[test]
fn one_response_per_line_in_order() {
    let (_, out) = session("CMD,FOO\r\nCMD,DEBUG_FAST,2\nCMD,DEBUG_PUMP,1\n");
    assert_eq!(
        out,
        vec![
            "CMD,FOO|ERROR:2",
            "CMD,DEBUG_FAST,2|ERROR:3",
            "CMD,DEBUG_PUMP,1|ERROR:0",
        ]
    );
}

#[test]
fn partial_line_waits_for_newline() {
    let fw = default_firmware();
    let mut terminal = fw.activities(DEFAULT_INFO).terminal;
    let first = exchange(&fw, &mut terminal, "CMD,SET_PU");
    assert_eq!(first, vec![CONNECTED_BANNER]);
    assert_eq!(
        exchange(&fw, &mut terminal, "MP,2,-7\n"),
        vec!["CMD,SET_PUMP,2,-7|ERROR:0"]
    );
    assert_eq!(fw.current_speed(2).unwrap(), -7);
}

#[test]
fn debug_flags_are_idempotent() {
    let (fw, out) = session("CMD,DEBUG_FAST,1\nCMD,DEBUG_FAST,1\n");
    assert_eq!(out.len(), 2);
    assert!(fw.flags().fast_telemetry());
    assert!(!fw.flags().pump_telemetry());

    let fw2 = default_firmware();
    let mut terminal = fw2.activities(DEFAULT_INFO).terminal;
    exchange(&fw2, &mut terminal, "CMD,DEBUG_FAST,1\nCMD,DEBUG_FAST,0\n");
    assert!(!fw2.flags().fast_telemetry());
}

#[test]
fn strict_integers_only() {
    let (fw, out) = session(
        "CMD,SET_PUMP,1,+5\nCMD,SET_PUMP,1, 5\nCMD,SET_PUMP,1,1.5\nCMD,SET_PUMP,1,\nCMD,SET_PUMP,-1,5\n",
    );
    assert_eq!(out.len(), 5);
    assert!(out.iter().all(|l| l.ends_with("|ERROR:3")), "{out:?}");
    assert!(fw.speeds().iter().all(|&s| s == 0));
}

#[test]
fn speed_range_is_inclusive() {
    let (fw, out) = session("CMD,SET_PUMP,3,-255\nCMD,SET_PUMP,2,255\nCMD,SET_PUMP,1,256\n");
    assert_eq!(
        out,
        vec![
            "CMD,SET_PUMP,3,-255|ERROR:0",
            "CMD,SET_PUMP,2,255|ERROR:0",
            "CMD,SET_PUMP,1,256|ERROR:3",
        ]
    );
    assert_eq!(fw.speeds().as_slice(), &[0, 0, 255, -255]);
}

#[test]
fn wrong_field_count_is_invalid_parameter() {
    let (_, out) = session("CMD,SET_PUMP,1\nCMD,SET_PUMP,1,2,3\nCMD,DEBUG_PUMP\n");
    assert!(out.iter().all(|l| l.ends_with("|ERROR:3")), "{out:?}");
}

#[test]
fn prefix_mismatch_is_bad_syntax() {
    let (fw, out) = session("cmd,SET_PUMP,1,100\nCMD\n");
    assert_eq!(out, vec!["cmd,SET_PUMP,1,100|ERROR:1", "CMD|ERROR:1"]);
    assert_eq!(fw.current_speed(1).unwrap(), 0);
}

#[test]
fn unipolar_channel_reports_commanded_endpoints() {
    let (fw, _) = session("CMD,SET_PUMP,0,255\n");
    assert_eq!(fw.current_speed(0).unwrap(), 255);
    fw.with_lines(|l| assert_eq!(l.last_servo(0), Some(180)));

    let fw = default_firmware();
    let mut terminal = fw.activities(DEFAULT_INFO).terminal;
    exchange(&fw, &mut terminal, "CMD,SET_PUMP,0,-255\n");
    assert_eq!(fw.current_speed(0).unwrap(), -255);
    fw.with_lines(|l| assert_eq!(l.last_servo(0), Some(0)));
}

#[test]
fn over_long_line_gets_one_error() {
    let long = format!("CMD,SET_PUMP,1,{}\n", "9".repeat(80));
    let (fw, out) = session(&format!("{long}CMD,SET_PUMP,1,5\n"));
    assert_eq!(out.len(), 2);
    assert!(out[0].ends_with("|ERROR:1"));
    assert_eq!(out[1], "CMD,SET_PUMP,1,5|ERROR:0");
    assert_eq!(fw.current_speed(1).unwrap(), 5);
}

#[test]
fn busy_link_skips_the_step_and_keeps_input() {
    let fw = default_firmware();
    let mut terminal = fw.activities(DEFAULT_INFO).terminal;
    fw.link().try_acquire().unwrap().push_input("CMD,SET_PUMP,1,42\n");

    let mut delay = NoopDelay::default();
    {
        let _held = fw.link().try_acquire().unwrap();
        assert_eq!(fw.terminal_step(&mut terminal, &mut delay), TerminalStep::Skipped);
    }
    assert_eq!(fw.current_speed(1).unwrap(), 0);
    assert_eq!(delay.total_ms, u64::from(fw.link().max_wait_ms()));

    assert_eq!(
        fw.terminal_step(&mut terminal, &mut delay),
        TerminalStep::Served { lines: 1 }
    );
    assert_eq!(fw.current_speed(1).unwrap(), 42);
}

#[test]
fn lone_non_ascii_byte_is_bad_syntax_not_info() {
    let fw = default_firmware();
    let mut terminal = fw.activities(DEFAULT_INFO).terminal;
    fw.link().try_acquire().unwrap().input.extend(b"\xff\nCMD,\xfe,1\n");
    fw.terminal_step(&mut terminal, &mut NoopDelay::default());
    let out = fw.link().try_acquire().unwrap().take_lines();
    assert_eq!(out, vec![CONNECTED_BANNER, "?|ERROR:1", "CMD,?,1|ERROR:1"]);
}

#[test]
fn full_length_line_with_crlf_is_accepted() {
    let line = format!("CMD,SET_PUMP,1,{}5", "0".repeat(48));
    assert_eq!(line.len(), 64);
    let (fw, out) = session(&format!("{line}\r\n"));
    assert_eq!(out, vec![format!("{line}|ERROR:0")]);
    assert_eq!(fw.current_speed(1).unwrap(), 5);
}
