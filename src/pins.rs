//! GPIO / peripheral pin assignments for the bioreactor controller board.
//!
//! Single source of truth: the default channel layout and hardware init
//! reference this module rather than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sensors: Analog (ADC1)
// ---------------------------------------------------------------------------

/// pH probe amplifier output.  ADC1 channel 0 (GPIO 1 on ESP32-S3).
pub const PH_ADC_GPIO: i32 = 1;
/// NTC thermistor voltage divider.  ADC1 channel 1 (GPIO 2 on ESP32-S3).
pub const TEMP_ADC_GPIO: i32 = 2;

pub const ADC1_CH_PH: u32 = 0;
pub const ADC1_CH_TEMP: u32 = 1;

// ---------------------------------------------------------------------------
// Pump 0: servo-driven dosing valve (unipolar)
// ---------------------------------------------------------------------------

pub const PUMP0_SERVO_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Pumps 1–3: DC peristaltic pumps behind dual H-bridges
// ---------------------------------------------------------------------------

pub const PUMP1_PWM_GPIO: i32 = 5;
pub const PUMP1_DIR_A_GPIO: i32 = 6;
pub const PUMP1_DIR_B_GPIO: i32 = 7;

pub const PUMP2_PWM_GPIO: i32 = 8;
pub const PUMP2_DIR_A_GPIO: i32 = 9;
pub const PUMP2_DIR_B_GPIO: i32 = 10;

pub const PUMP3_PWM_GPIO: i32 = 11;
pub const PUMP3_DIR_A_GPIO: i32 = 12;
pub const PUMP3_DIR_B_GPIO: i32 = 13;

/// Every direction line, for output configuration at boot.
pub const DIR_GPIOS: [i32; 6] = [
    PUMP1_DIR_A_GPIO,
    PUMP1_DIR_B_GPIO,
    PUMP2_DIR_A_GPIO,
    PUMP2_DIR_B_GPIO,
    PUMP3_DIR_A_GPIO,
    PUMP3_DIR_B_GPIO,
];

// ---------------------------------------------------------------------------
// LEDC channel assignment (one per PWM/servo line)
// ---------------------------------------------------------------------------

pub const LEDC_CH_PUMP0: u32 = 0;
pub const LEDC_CH_PUMP1: u32 = 1;
pub const LEDC_CH_PUMP2: u32 = 2;
pub const LEDC_CH_PUMP3: u32 = 3;

/// LEDC output GPIO per channel, indexed by LEDC channel number.
pub const LEDC_GPIOS: [i32; 4] = [
    PUMP0_SERVO_GPIO,
    PUMP1_PWM_GPIO,
    PUMP2_PWM_GPIO,
    PUMP3_PWM_GPIO,
];

// ---------------------------------------------------------------------------
// UART (operator terminal)
// ---------------------------------------------------------------------------

pub const UART_PORT: i32 = 0;
pub const UART_TX_GPIO: i32 = 43;
pub const UART_RX_GPIO: i32 = 44;
pub const UART_BAUD: u32 = 115_200;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// DC pump PWM resolution (bits).  8-bit gives 0 – 255 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 8;
/// DC pump PWM frequency (25 kHz, inaudible).
pub const PUMP_PWM_FREQ_HZ: u32 = 25_000;
/// Servo frame rate.
pub const SERVO_FREQ_HZ: u32 = 50;
/// Servo timer resolution (bits).
pub const SERVO_RESOLUTION_BITS: u32 = 14;
/// Servo pulse width at native 0 and native max (microseconds).
pub const SERVO_MIN_PULSE_US: u32 = 500;
pub const SERVO_MAX_PULSE_US: u32 = 2_500;
/// Servo travel covered by the pulse range (degrees).
pub const SERVO_RANGE_DEG: u32 = 180;

/// ESP32-S3 ADC1 oneshot conversion width.
pub const ADC_NATIVE_BITS: u32 = 12;
