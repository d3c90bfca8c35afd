//! Pulse signal input (function generator / optical pulse front end).
//!
//! Reads one instantaneous ADC sample and re-centres it by a configured
//! offset so the sampler can compare magnitudes on a signed scale.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the signal ADC channel via the oneshot API
//! (initialised by hw_init).
//! On host/test: reads from a static `AtomicI32` for injection.

use core::sync::atomic::{AtomicI32, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

static SIM_SIGNAL_RAW: AtomicI32 = AtomicI32::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_signal_raw(raw: i32) {
    SIM_SIGNAL_RAW.store(raw, Ordering::Relaxed);
}

pub struct AnalogSignal {
    offset: i32,
    total_reads: u32,
}

impl AnalogSignal {
    pub fn new(offset: i32) -> Self {
        Self {
            offset,
            total_reads: 0,
        }
    }

    /// One signed reading: raw counts minus the offset.
    pub fn read_signed(&mut self) -> i32 {
        self.total_reads = self.total_reads.saturating_add(1);
        self.read_raw().saturating_sub(self.offset)
    }

    pub fn total_reads(&self) -> u32 {
        self.total_reads
    }

    #[cfg(target_os = "espidf")]
    fn read_raw(&self) -> i32 {
        i32::from(hw_init::adc1_read(hw_init::ADC1_CH_SIGNAL))
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_raw(&self) -> i32 {
        SIM_SIGNAL_RAW.load(Ordering::Relaxed)
    }
}
