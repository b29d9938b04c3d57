//! One-shot hardware peripheral initialization.
//!
//! Configures the ADC channels, the H-bridge direction outputs, the LEDC
//! timers/channels for pump PWM and the servo, and the UART driver, using
//! raw ESP-IDF sys calls.  Called once from `main()` before any activity
//! starts.  On the host every function is a no-op stub.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    LedcInitFailed(i32),
    UartInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc)    => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed(rc)   => write!(f, "LEDC timer/channel config failed (rc={})", rc),
            Self::UartInitFailed(rc)   => write!(f, "UART driver install failed (rc={})", rc),
        }
    }
}

impl core::error::Error for HwInitError {}

#[cfg(target_os = "espidf")]
use log::info;

use crate::error::SensorError;
use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before any activity thread exists.
    unsafe {
        init_adc()?;
        init_gpio_outputs()?;
        init_ledc()?;
        init_uart()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

#[cfg(target_os = "espidf")]
fn check(ret: esp_err_t, err: fn(i32) -> HwInitError) -> Result<(), HwInitError> {
    if ret == ESP_OK as i32 { Ok(()) } else { Err(err(ret)) }
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: The handle is written once by `init_adc()` before any reader
/// exists and is never written again.  Only the acquisition activity reads
/// the ADC.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    check(ret, HwInitError::AdcInitFailed)?;

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    for ch in [pins::ADC1_CH_PH, pins::ADC1_CH_TEMP] {
        let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), ch, &chan_cfg) };
        check(ret, HwInitError::AdcInitFailed)?;
    }

    info!("hw_init: ADC1 configured (CH{}=pH, CH{}=temp)", pins::ADC1_CH_PH, pins::ADC1_CH_TEMP);
    Ok(())
}

/// One raw 12-bit conversion.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> Result<u16, SensorError> {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract, single reader after init.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return Err(SensorError::AdcReadFailed);
    }
    Ok(raw.max(0) as u16)
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> Result<u16, SensorError> {
    Ok(0)
}

// ── GPIO Outputs (H-bridge direction lines) ───────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    for &pin in &pins::DIR_GPIOS {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        check(ret, HwInitError::GpioConfigFailed)?;
        unsafe { gpio_set_level(pin, 0) };
    }

    info!("hw_init: {} direction outputs configured", pins::DIR_GPIOS.len());
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin.
    unsafe { gpio_set_level(pin, if high { 1 } else { 0 }); }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── LEDC PWM ─────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
const PUMP_TIMER: ledc_timer_t = ledc_timer_t_LEDC_TIMER_0;
#[cfg(target_os = "espidf")]
const SERVO_TIMER: ledc_timer_t = ledc_timer_t_LEDC_TIMER_1;

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<(), HwInitError> {
    // Timer 0: DC pumps (25 kHz, 8-bit)
    let pump_timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: PUMP_TIMER,
        duty_resolution: pins::PWM_RESOLUTION_BITS,
        freq_hz: pins::PUMP_PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    check(unsafe { ledc_timer_config(&pump_timer) }, HwInitError::LedcInitFailed)?;

    // Timer 1: servo (50 Hz, 14-bit)
    let servo_timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: SERVO_TIMER,
        duty_resolution: pins::SERVO_RESOLUTION_BITS,
        freq_hz: pins::SERVO_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    check(unsafe { ledc_timer_config(&servo_timer) }, HwInitError::LedcInitFailed)?;

    for (channel, &gpio) in pins::LEDC_GPIOS.iter().enumerate() {
        let channel = channel as u32;
        let timer_sel = if channel == pins::LEDC_CH_PUMP0 { SERVO_TIMER } else { PUMP_TIMER };
        let ret = unsafe { ledc_channel_config(&ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel,
            timer_sel,
            gpio_num: gpio,
            duty: 0,
            hpoint: 0,
            ..Default::default()
        }) };
        check(ret, HwInitError::LedcInitFailed)?;
    }

    info!("hw_init: LEDC configured (servo=CH0, pumps=CH1-3)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn ledc_set(channel: u32, duty: u32) {
    // SAFETY: LEDC channels were configured in init_ledc(); each channel is
    // written only by the holder of the actuator bank lock.
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, duty);
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set(_channel: u32, _duty: u32) {}

/// Servo position (degrees) → LEDC duty at the servo timer resolution.
pub fn servo_duty(degrees: u16) -> u32 {
    let degrees = u32::from(degrees).min(pins::SERVO_RANGE_DEG);
    let span = pins::SERVO_MAX_PULSE_US - pins::SERVO_MIN_PULSE_US;
    let pulse_us = pins::SERVO_MIN_PULSE_US + degrees * span / pins::SERVO_RANGE_DEG;
    let period_us = 1_000_000 / pins::SERVO_FREQ_HZ;
    pulse_us * (1 << pins::SERVO_RESOLUTION_BITS) / period_us
}

// ── UART ──────────────────────────────────────────────────────

pub const UART_RX_BUF: i32 = 256;
pub const UART_TX_BUF: i32 = 256;

#[cfg(target_os = "espidf")]
unsafe fn init_uart() -> Result<(), HwInitError> {
    let cfg = uart_config_t {
        baud_rate: pins::UART_BAUD as i32,
        data_bits: uart_word_length_t_UART_DATA_8_BITS,
        parity: uart_parity_t_UART_PARITY_DISABLE,
        stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
        flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
        ..Default::default()
    };
    let port = pins::UART_PORT;
    check(unsafe { uart_param_config(port, &cfg) }, HwInitError::UartInitFailed)?;
    check(
        unsafe { uart_set_pin(port, pins::UART_TX_GPIO, pins::UART_RX_GPIO, -1, -1) },
        HwInitError::UartInitFailed,
    )?;
    check(
        unsafe { uart_driver_install(port, UART_RX_BUF, UART_TX_BUF, 0, core::ptr::null_mut(), 0) },
        HwInitError::UartInitFailed,
    )?;

    info!("hw_init: UART{} at {} baud", port, pins::UART_BAUD);
    Ok(())
}
