//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements   | Connects to                         |
//! |------------|--------------|-------------------------------------|
//! | `hardware` | SensorPort   | Ultrasonic, signal ADC, PIR latch   |
//! |            | ActuatorPort | Enclosure servo, indicator LED      |
//! |            | DisplayPort  | Two HD44780 character displays      |
//! | `log_sink` | EventSink    | Serial log output                   |
//! | `time`     | ClockPort    | ESP32 system timer                  |

pub mod hardware;
pub mod log_sink;
pub mod time;
