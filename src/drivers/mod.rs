//! Peripheral drivers and one-shot hardware initialisation.
//!
//! Drivers are generic over `embedded-hal` 1.0 traits so they run against
//! `esp-idf-hal` on the board and against hand-written mock pins on the
//! host.

pub mod hw_init;
pub mod indicator;
pub mod lcd;
pub mod servo;
pub mod ultrasonic;
