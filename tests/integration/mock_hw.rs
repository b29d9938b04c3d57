//! Mock adapters for integration tests.
//!
//! Records every actuator line write and every byte written to the serial
//! link so tests can assert on the full history without touching real
//! GPIO/PWM/UART registers.

use std::collections::VecDeque;

use bioreactor::app::ports::{ActuatorLines, AnalogInput, AnalogPort};
use bioreactor::app::service::Firmware;
use bioreactor::config::{ChannelConfig, SystemConfig};
use bioreactor::protocol::transport::Transport;
use embedded_hal::delay::DelayNs;

// ── Actuator line record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineWrite {
    Digital { pin: i32, high: bool },
    Pwm { line: u32, duty: u8 },
    Servo { line: u32, native: u16 },
}

#[derive(Default)]
pub struct MockLines {
    pub writes: Vec<LineWrite>,
}

#[allow(dead_code)]
impl MockLines {
    pub fn last_pwm(&self, line: u32) -> Option<u8> {
        self.writes.iter().rev().find_map(|w| match *w {
            LineWrite::Pwm { line: l, duty } if l == line => Some(duty),
            _ => None,
        })
    }

    pub fn last_digital(&self, pin: i32) -> Option<bool> {
        self.writes.iter().rev().find_map(|w| match *w {
            LineWrite::Digital { pin: p, high } if p == pin => Some(high),
            _ => None,
        })
    }

    pub fn last_servo(&self, line: u32) -> Option<u16> {
        self.writes.iter().rev().find_map(|w| match *w {
            LineWrite::Servo { line: l, native } if l == line => Some(native),
            _ => None,
        })
    }
}

impl ActuatorLines for MockLines {
    fn digital_write(&mut self, pin: i32, high: bool) {
        self.writes.push(LineWrite::Digital { pin, high });
    }

    fn pwm_write(&mut self, line: u32, duty: u8) {
        self.writes.push(LineWrite::Pwm { line, duty });
    }

    fn servo_write(&mut self, line: u32, native: u16) {
        self.writes.push(LineWrite::Servo { line, native });
    }
}

// ── Serial link ───────────────────────────────────────────────

/// In-memory serial link: tests push input, the firmware writes output.
#[derive(Default)]
pub struct MockSerial {
    pub input: VecDeque<u8>,
    pub output: Vec<u8>,
    /// Max bytes returned per read call (0 = unlimited).
    pub read_chunk: usize,
}

#[allow(dead_code)]
impl MockSerial {
    pub fn push_input(&mut self, data: &str) {
        self.input.extend(data.bytes());
    }

    /// Everything written so far, split into lines, and cleared.
    pub fn take_lines(&mut self) -> Vec<String> {
        let text = String::from_utf8(std::mem::take(&mut self.output)).unwrap();
        text.lines().map(str::to_owned).collect()
    }
}

impl Transport for MockSerial {
    type Error = ();

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
        let limit = if self.read_chunk == 0 { buf.len() } else { self.read_chunk.min(buf.len()) };
        let mut n = 0;
        while n < limit {
            match self.input.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        self.output.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }

    fn available(&self) -> bool {
        !self.input.is_empty()
    }
}

// ── Analog inputs ─────────────────────────────────────────────

/// Returns scripted codes per input; the last code repeats.
pub struct MockAdc {
    pub ph: VecDeque<u16>,
    pub temperature: u16,
    last_ph: u16,
}

#[allow(dead_code)]
impl MockAdc {
    pub fn constant(ph: u16, temperature: u16) -> Self {
        Self {
            ph: VecDeque::new(),
            temperature,
            last_ph: ph,
        }
    }

    pub fn script_ph(&mut self, codes: &[u16]) {
        self.ph.extend(codes);
    }
}

impl AnalogPort for MockAdc {
    fn read_analog(&mut self, input: AnalogInput) -> u16 {
        match input {
            AnalogInput::Ph => {
                if let Some(c) = self.ph.pop_front() {
                    self.last_ph = c;
                }
                self.last_ph
            }
            AnalogInput::Temperature => self.temperature,
        }
    }
}

// ── Delay ─────────────────────────────────────────────────────

/// Records requested delays without sleeping.
#[derive(Default)]
pub struct NoopDelay {
    pub total_ms: u64,
}

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ms += u64::from(ns) / 1_000_000;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ms += u64::from(ms);
    }
}

// ── Fixtures ──────────────────────────────────────────────────

pub type TestFirmware = Firmware<MockLines, MockSerial>;

pub fn firmware(config: SystemConfig) -> TestFirmware {
    Firmware::new(config, MockLines::default(), MockSerial::default()).unwrap()
}

/// Default board: one unipolar + three bidirectional channels.
pub fn default_firmware() -> TestFirmware {
    firmware(SystemConfig::default())
}

/// Three bidirectional channels, no servo.
#[allow(dead_code)]
pub fn three_pump_config() -> SystemConfig {
    let mut config = SystemConfig::default();
    config.channels.clear();
    for (pwm_line, dir_a, dir_b) in [(1, 6, 7), (2, 9, 10), (3, 12, 13)] {
        config
            .channels
            .push(ChannelConfig::Bidirectional { pwm_line, dir_a, dir_b })
            .unwrap();
    }
    config
}

/// Push `input` onto the link, run one terminal step, return the output lines.
#[allow(dead_code)]
pub fn exchange(
    fw: &TestFirmware,
    terminal: &mut bioreactor::protocol::terminal::Terminal,
    input: &str,
) -> Vec<String> {
    fw.link().try_acquire().unwrap().push_input(input);
    fw.terminal_step(terminal, &mut NoopDelay::default());
    fw.link().try_acquire().unwrap().take_lines()
}
