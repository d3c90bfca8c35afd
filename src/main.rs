//! PulseGate Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter              LogEventSink    MonotonicClock   │
//! │  (Sensor+Actuator+Display)    (EventSink)     (ClockPort)      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Presence · Range gate · Enclosure · Session FSM       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  PIR ISR ──▶ EdgeLatch ──▶ poll loop (PollCadence)             │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use esp_idf_hal::delay::{Delay, FreeRtos};
use esp_idf_hal::gpio::{AnyOutputPin, InputPin, OutputPin, PinDriver};
use esp_idf_hal::ledc::config::TimerConfig;
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::FromValueType;
use log::{info, warn};

use pulsegate::adapters::hardware::HardwareAdapter;
use pulsegate::adapters::log_sink::LogEventSink;
use pulsegate::adapters::time::MonotonicClock;
use pulsegate::app::ports::ClockPort;
use pulsegate::app::service::AppService;
use pulsegate::config::SystemConfig;
use pulsegate::drivers::indicator::Indicator;
use pulsegate::drivers::lcd::Lcd1602;
use pulsegate::drivers::servo::Servo;
use pulsegate::drivers::hw_init;
use pulsegate::drivers::ultrasonic::Ultrasonic;
use pulsegate::error::Error;
use pulsegate::events::PRESENCE_EDGES;
use pulsegate::pins;
use pulsegate::scheduler::PollCadence;
use pulsegate::sensors::AnalogSignal;

/// Optional build-time configuration override (JSON, partial allowed).
const CONFIG_JSON: Option<&str> = option_env!("PULSEGATE_CONFIG");

fn load_config() -> SystemConfig {
    match CONFIG_JSON.map(SystemConfig::from_json) {
        Some(Ok(cfg)) => {
            info!("Config loaded from build environment");
            cfg
        }
        Some(Err(e)) => {
            warn!("Build-time config rejected ({}), using defaults", e);
            SystemConfig::default()
        }
        None => SystemConfig::default(),
    }
}

fn output(pin: AnyOutputPin) -> Result<PinDriver<'static, AnyOutputPin, esp_idf_hal::gpio::Output>> {
    PinDriver::output(pin).context("output pin")
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  PulseGate v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Raw peripherals: signal ADC, presence interrupt ────
    hw_init::init_peripherals().map_err(Error::from)?;
    hw_init::init_isr_service().map_err(Error::from)?;

    let config = load_config();
    let clock = MonotonicClock::new();
    let p = Peripherals::take().context("peripherals already taken")?;

    // ── 3. embedded-hal drivers (GPIO numbers match `pins`) ───
    let ultrasonic = Ultrasonic::new(
        output(p.pins.gpio5.downgrade_output())?, // RANGE_TRIGGER_GPIO
        PinDriver::input(p.pins.gpio4.downgrade_input()).context("echo pin")?, // RANGE_ECHO_GPIO
        Delay::new_default(),
        clock,
        config.echo_timeout_us,
    );

    let servo_timer = LedcTimerDriver::new(
        p.ledc.timer0,
        &TimerConfig::default()
            .frequency(pins::SERVO_PWM_FREQ_HZ.Hz().into())
            .resolution(Resolution::Bits14),
    )?;
    // SERVO_PWM_GPIO
    let servo_pwm = LedcDriver::new(p.ledc.channel0, servo_timer, p.pins.gpio2)?;
    let servo = Servo::from_config(servo_pwm, Delay::new_default(), &config).map_err(Error::from)?;

    // INDICATOR_GPIO
    let indicator = Indicator::new(output(p.pins.gpio7.downgrade_output())?).map_err(Error::from)?;

    // PRIMARY_LCD_GPIOS
    let primary = Lcd1602::new(
        output(p.pins.gpio8.downgrade_output())?,
        output(p.pins.gpio9.downgrade_output())?,
        [
            output(p.pins.gpio10.downgrade_output())?,
            output(p.pins.gpio11.downgrade_output())?,
            output(p.pins.gpio12.downgrade_output())?,
            output(p.pins.gpio13.downgrade_output())?,
        ],
        Delay::new_default(),
    )
    .map_err(Error::from)?;
    // SECONDARY_LCD_GPIOS
    let secondary = Lcd1602::new(
        output(p.pins.gpio14.downgrade_output())?,
        output(p.pins.gpio15.downgrade_output())?,
        [
            output(p.pins.gpio16.downgrade_output())?,
            output(p.pins.gpio17.downgrade_output())?,
            output(p.pins.gpio18.downgrade_output())?,
            output(p.pins.gpio21.downgrade_output())?,
        ],
        Delay::new_default(),
    )
    .map_err(Error::from)?;

    let mut hw = HardwareAdapter::new(
        ultrasonic,
        AnalogSignal::new(config.signal_offset),
        servo,
        indicator,
        [primary, secondary],
        &PRESENCE_EDGES,
        clock,
        config.scroll_step_ms,
    );

    // ── 4. Application core ───────────────────────────────────
    let mut log_sink = LogEventSink::new();
    let mut cadence = PollCadence::from_config(&config);
    let mut app = AppService::new(config);
    app.start(&mut hw, &mut log_sink);

    // ── 5. Poll loop ──────────────────────────────────────────
    loop {
        let started = clock.now_ms();
        app.poll_once(&mut hw, &mut log_sink);
        let sleep_ms = cadence.remaining_ms(started, clock.now_ms());
        FreeRtos::delay_ms(sleep_ms);
    }
}
