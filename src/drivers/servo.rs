//! Hobby servo driver for the sensor enclosure.
//!
//! 50 Hz PWM; the pulse width encodes the angle (544 µs at 0°, 2400 µs at
//! 180°).  Moves are stepped: the angle changes by at most `step_deg`
//! per step with `step_ms` between steps, always in one direction, and
//! the last step lands exactly on the target.

use embedded_hal::delay::DelayNs;
use embedded_hal::pwm::SetDutyCycle;
use log::debug;

use crate::config::{SystemConfig, MAX_ENCLOSURE_ANGLE};
use crate::error::ActuatorError;

pub const SERVO_PERIOD_US: u16 = 20_000;
pub const MIN_PULSE_US: u32 = 544;
pub const MAX_PULSE_US: u32 = 2_400;
/// Mechanical full scale of the pulse mapping.
pub const FULL_SCALE_DEG: u32 = 180;

/// Pulse width for `angle` degrees.
pub fn pulse_width_us(angle: u8) -> u16 {
    let span = MAX_PULSE_US - MIN_PULSE_US;
    (MIN_PULSE_US + u32::from(angle) * span / FULL_SCALE_DEG) as u16
}

pub struct Servo<P, D> {
    pwm: P,
    delay: D,
    angle: u8,
    step_deg: u8,
    step_ms: u32,
}

impl<P: SetDutyCycle, D: DelayNs> Servo<P, D> {
    /// Wrap the PWM channel.  The servo is driven to `initial` once so the
    /// tracked angle matches the horn.
    pub fn new(
        pwm: P,
        delay: D,
        initial: u8,
        step_deg: u8,
        step_ms: u32,
    ) -> Result<Self, ActuatorError> {
        let mut servo = Self {
            pwm,
            delay,
            angle: initial,
            step_deg: step_deg.max(1),
            step_ms,
        };
        servo.write_angle(initial)?;
        Ok(servo)
    }

    pub fn from_config(pwm: P, delay: D, config: &SystemConfig) -> Result<Self, ActuatorError> {
        Self::new(
            pwm,
            delay,
            config.enclosure_closed_angle,
            config.enclosure_step_deg,
            config.enclosure_step_ms,
        )
    }

    /// Step monotonically to `target`.
    pub fn move_to(&mut self, target: u8) -> Result<(), ActuatorError> {
        if target > MAX_ENCLOSURE_ANGLE {
            return Err(ActuatorError::AngleOutOfRange(target));
        }
        debug!("servo: {} -> {} deg", self.angle, target);
        while self.angle != target {
            let next = if target > self.angle {
                self.angle.saturating_add(self.step_deg).min(target)
            } else {
                self.angle.saturating_sub(self.step_deg).max(target)
            };
            self.write_angle(next)?;
            self.delay.delay_ms(self.step_ms);
        }
        Ok(())
    }

    pub fn angle(&self) -> u8 {
        self.angle
    }

    fn write_angle(&mut self, angle: u8) -> Result<(), ActuatorError> {
        self.pwm
            .set_duty_cycle_fraction(pulse_width_us(angle), SERVO_PERIOD_US)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.angle = angle;
        Ok(())
    }
}
