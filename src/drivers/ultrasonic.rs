//! Ultrasonic ranging driver (HC-SR04 style trigger/echo pair).
//!
//! A 10 µs trigger pulse starts a measurement; the sensor then holds the
//! echo line high for the acoustic round-trip time.  The driver times the
//! high phase against a [`ClockPort`] and gives up after the configured
//! timeout, which is reported as "no echo" rather than an error.
//!
//! ```text
//!  trigger ─┐▔▔▔▔┌──────────────────────────────
//!           │10µs│
//!  echo    ────────────┌▔▔▔▔▔▔▔▔▔▔▔▔▔▔▔▔┐──────────
//!                      ├── round trip ──┤
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::ClockPort;
use crate::error::SensorError;

/// Width of the trigger pulse.
pub const TRIGGER_PULSE_US: u32 = 10;
/// Low time before the trigger pulse so the edge is clean.
pub const TRIGGER_SETTLE_US: u32 = 2;

pub struct Ultrasonic<T, E, D, C> {
    trigger: T,
    echo: E,
    delay: D,
    clock: C,
    timeout_us: u32,
}

impl<T, E, D, C> Ultrasonic<T, E, D, C>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: ClockPort,
{
    pub fn new(trigger: T, echo: E, delay: D, clock: C, timeout_us: u32) -> Self {
        Self {
            trigger,
            echo,
            delay,
            clock,
            timeout_us,
        }
    }

    /// Fire one measurement.
    ///
    /// `Ok(None)` when the echo never rose, or never fell, within the
    /// timeout.
    pub fn round_trip_us(&mut self) -> Result<Option<u32>, SensorError> {
        self.fire_trigger()?;

        let timeout = u64::from(self.timeout_us);
        let armed_at = self.clock.now_us();
        while !self.echo_high()? {
            if self.clock.now_us().saturating_sub(armed_at) >= timeout {
                return Ok(None);
            }
        }

        let rise = self.clock.now_us();
        loop {
            let now = self.clock.now_us();
            if !self.echo_high()? {
                return Ok(Some(now.saturating_sub(rise).min(u64::from(u32::MAX)) as u32));
            }
            if now.saturating_sub(rise) >= timeout {
                return Ok(None);
            }
        }
    }

    fn fire_trigger(&mut self) -> Result<(), SensorError> {
        self.trigger
            .set_low()
            .map_err(|_| SensorError::TriggerFailed)?;
        self.delay.delay_us(TRIGGER_SETTLE_US);
        self.trigger
            .set_high()
            .map_err(|_| SensorError::TriggerFailed)?;
        self.delay.delay_us(TRIGGER_PULSE_US);
        self.trigger
            .set_low()
            .map_err(|_| SensorError::TriggerFailed)
    }

    fn echo_high(&mut self) -> Result<bool, SensorError> {
        self.echo.is_high().map_err(|_| SensorError::GpioReadFailed)
    }
}
