//! Sampling indicator LED.
//!
//! Mirrors the sampler's high/low classification while a run is in
//! progress.  Writes are skipped when the level is unchanged.

use embedded_hal::digital::OutputPin;

use crate::error::ActuatorError;

pub struct Indicator<P> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> Indicator<P> {
    /// Wrap the pin and drive it low.
    pub fn new(mut pin: P) -> Result<Self, ActuatorError> {
        pin.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
        Ok(Self { pin, on: false })
    }

    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        if on == self.on {
            return Ok(());
        }
        let result = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.on = on;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
