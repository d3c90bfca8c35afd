//! GPIO / peripheral pin assignments for the PulseGate board (ESP32-S3).
//!
//! `hw_init` configures the raw-numbered pins from here.  `main` takes the
//! typed `esp-idf-hal` pins (`p.pins.gpioN`), which cannot be indexed by
//! number; each of those sites names the constant it must match.

// ---------------------------------------------------------------------------
// Ultrasonic range sensor (HC-SR04)
// ---------------------------------------------------------------------------

/// Digital output: 10 µs trigger pulse.
pub const RANGE_TRIGGER_GPIO: i32 = 5;
/// Digital input: echo, high for the round-trip time.
pub const RANGE_ECHO_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Presence sensor (PIR)
// ---------------------------------------------------------------------------

/// Digital input, rising-edge interrupt.  Each edge toggles arming.
pub const PRESENCE_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Pulse signal input (ADC1)
// ---------------------------------------------------------------------------

/// Signal front end: ADC1 channel 0 (GPIO 1 on ESP32-S3).
pub const SIGNAL_ADC_GPIO: i32 = 1;

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

/// Enclosure servo, LEDC PWM at 50 Hz.
pub const SERVO_PWM_GPIO: i32 = 2;
/// LEDC frequency for the servo.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// Sampling indicator LED (active HIGH).
pub const INDICATOR_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// Character displays (HD44780, 4-bit)
// ---------------------------------------------------------------------------

/// Status display: RS, EN, D4..D7.
pub const PRIMARY_LCD_GPIOS: [i32; 6] = [8, 9, 10, 11, 12, 13];
/// Prompt display: RS, EN, D4..D7.
pub const SECONDARY_LCD_GPIOS: [i32; 6] = [14, 15, 16, 17, 18, 21];
