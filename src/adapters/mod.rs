//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter    | Implements          | Connects to              |
//! |------------|---------------------|--------------------------|
//! | `hardware` | AnalogPort          | ESP32 ADC1               |
//! |            | ActuatorLines       | ESP32 GPIO, LEDC PWM     |
//! | `uart`     | Transport           | UART0 terminal           |
//! | `time`     | Clock, DelayNs      | ESP32 system timer       |

pub mod hardware;
pub mod time;
pub mod uart;
