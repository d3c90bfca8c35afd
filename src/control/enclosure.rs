//! Enclosure gate: opens the sensor enclosure while a finger is in range.
//!
//! The gate only decides; the servo driver performs the monotonic move.
//! Decisions compare against the actuator's *current* angle so an
//! interrupted or partially applied move is corrected on the next poll.

use crate::config::SystemConfig;
use crate::sensors::RangeReading;

#[derive(Debug, Clone, Copy)]
pub struct EnclosureGate {
    open_angle: u8,
    closed_angle: u8,
}

impl EnclosureGate {
    pub fn new(open_angle: u8, closed_angle: u8) -> Self {
        Self {
            open_angle,
            closed_angle,
        }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(config.enclosure_open_angle, config.enclosure_closed_angle)
    }

    /// Target angle for this poll, if a move is needed.
    ///
    /// In range and closed ⇒ open; out of range and open ⇒ close.
    pub fn target(&self, range: RangeReading, current_angle: u8) -> Option<u8> {
        if range.in_range && current_angle <= self.closed_angle {
            Some(self.open_angle)
        } else if !range.in_range && current_angle >= self.open_angle {
            Some(self.closed_angle)
        } else {
            None
        }
    }

    /// Target used when the system is reset: close if not already closed.
    pub fn retract(&self, current_angle: u8) -> Option<u8> {
        (current_angle > self.closed_angle).then_some(self.closed_angle)
    }

    pub fn open_angle(&self) -> u8 {
        self.open_angle
    }

    pub fn closed_angle(&self) -> u8 {
        self.closed_angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(in_range: bool) -> RangeReading {
        RangeReading {
            distance_mm: if in_range { 120 } else { 400 },
            in_range,
        }
    }

    #[test]
    fn opens_when_in_range_and_closed() {
        let g = EnclosureGate::new(90, 0);
        assert_eq!(g.target(reading(true), 0), Some(90));
        assert_eq!(g.target(reading(true), 90), None);
    }

    #[test]
    fn closes_when_out_of_range_and_open() {
        let g = EnclosureGate::new(90, 0);
        assert_eq!(g.target(reading(false), 90), Some(0));
        assert_eq!(g.target(reading(false), 0), None);
    }

    #[test]
    fn mid_travel_angle_is_left_alone() {
        let g = EnclosureGate::new(90, 0);
        assert_eq!(g.target(reading(true), 45), None);
        assert_eq!(g.target(reading(false), 45), None);
    }

    #[test]
    fn retract_only_when_open() {
        let g = EnclosureGate::new(90, 0);
        assert_eq!(g.retract(90), Some(0));
        assert_eq!(g.retract(45), Some(0));
        assert_eq!(g.retract(0), None);
    }
}
