//! Both scheduling variants over the same shared state.

use bioreactor::adapters::time::ThreadDelay;
use bioreactor::protocol::engine::DEFAULT_INFO;
use bioreactor::protocol::terminal::{CONNECTED_BANNER, TerminalStep};

use crate::mock_hw::{MockAdc, NoopDelay, default_firmware, exchange};

#[test]
fn cooperative_loop_runs_every_activity() {
    let fw = default_firmware();
    let mut activities = fw.activities(DEFAULT_INFO);
    let mut adc = MockAdc::constant(512, 512);
    let mut delay = NoopDelay::default();
    fw.link().try_acquire().unwrap().push_input("CMD,DEBUG_FAST,1\n");

    for now in (0..=1000).step_by(10) {
        fw.run_cooperative_once(&mut activities, now, &mut adc, &mut delay);
    }

    let lines = fw.link().try_acquire().unwrap().take_lines();
    assert_eq!(lines[0], CONNECTED_BANNER);
    assert_eq!(lines[1], "CMD,DEBUG_FAST,1|ERROR:0");
    // Telemetry at 0, 200, .., 1000.
    let frames: Vec<_> = lines[2..].iter().filter(|l| l.starts_with("$<DF?")).collect();
    assert_eq!(frames.len(), 6);
    assert!(frames.iter().all(|f| f.as_str() == "$<DF?PH:8.750,TEMP:25.000,GS:2.500>&"));
}

#[test]
fn threaded_activities_never_interleave_output() {
    const COMMANDS: usize = 40;

    let fw = default_firmware();
    let mut terminal = fw.activities(DEFAULT_INFO).terminal;
    exchange(&fw, &mut terminal, "CMD,DEBUG_PUMP,1\n");
    {
        let mut port = fw.link().try_acquire().unwrap();
        for i in 0..COMMANDS {
            port.push_input(&format!("CMD,SET_PUMP,1,{}\n", i));
        }
    }

    let fw = &fw;
    let frames = std::thread::scope(|s| {
        let telemetry = s.spawn(move || {
            let mut delay = ThreadDelay;
            (0..30).map(|_| fw.telemetry_step(&mut delay)).sum::<usize>()
        });
        s.spawn(move || {
            let mut delay = ThreadDelay;
            let mut answered = 0;
            for _ in 0..200 {
                if let TerminalStep::Served { lines } = fw.terminal_step(&mut terminal, &mut delay) {
                    answered += lines;
                }
                if answered == COMMANDS {
                    break;
                }
            }
            assert_eq!(answered, COMMANDS);
        });
        telemetry.join().unwrap()
    });

    let lines = fw.link().try_acquire().unwrap().take_lines();
    let responses = lines.iter().filter(|l| l.starts_with("CMD,SET_PUMP,1,")).count();
    let pump_frames = lines.iter().filter(|l| l.starts_with("$<DP?")).count();
    assert_eq!(responses, COMMANDS);
    assert_eq!(pump_frames, frames);
    assert_eq!(responses + pump_frames, lines.len());
    for l in &lines {
        let well_formed = (l.starts_with("$<DP?") && l.ends_with(">&")) || l.ends_with("|ERROR:0");
        assert!(well_formed, "interleaved output: {l:?}");
    }
    assert_eq!(fw.current_speed(1).unwrap(), (COMMANDS - 1) as i16);
}

#[test]
fn cooperative_loop_paced_by_next_deadline() {
    let fw = default_firmware();
    let mut activities = fw.activities(DEFAULT_INFO);
    let mut adc = MockAdc::constant(512, 512);
    let mut delay = NoopDelay::default();
    fw.link().try_acquire().unwrap().push_input("CMD,DEBUG_PUMP,1\n");

    let mut now = 0;
    let mut passes = 0;
    while now <= 1000 {
        fw.run_cooperative_once(&mut activities, now, &mut adc, &mut delay);
        passes += 1;
        let next = activities.scheduler.next_due_ms().unwrap();
        assert!(next > now);
        now = next;
    }

    // At most one pass per acquire or terminal deadline.
    let sample = u64::from(fw.config().sample_interval_ms);
    assert!(passes <= 1000 / sample + 1 + 1000 / u64::from(fw.config().terminal_interval_ms) + 1);
    let lines = fw.link().try_acquire().unwrap().take_lines();
    let frames = lines.iter().filter(|l| l.starts_with("$<DP?")).count();
    assert_eq!(frames, 6);
}
