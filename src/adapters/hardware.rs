//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns every driver and exposes them through [`SensorPort`],
//! [`ActuatorPort`] and [`DisplayPort`].  This is the only module in the
//! system that touches actual hardware.  Driver failures are logged and
//! degraded here (no echo, low sample, skipped display write) so the poll
//! loop never aborts.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::{ActuatorPort, ClockPort, DisplayPort, SensorPort};
use crate::drivers::indicator::Indicator;
use crate::drivers::lcd::Lcd1602;
use crate::drivers::servo::Servo;
use crate::drivers::ultrasonic::Ultrasonic;
use crate::events::EdgeLatch;
use crate::fsm::context::Surface;
use crate::sensors::AnalogSignal;

/// Every driver the firmware owns.
///
/// * `O`: push-pull output pin (trigger, indicator, display lines)
/// * `E`: echo input pin
/// * `P`: servo PWM channel
/// * `D`: blocking delay
/// * `C`: monotonic clock
pub struct HardwareAdapter<O, E, P, D, C> {
    ultrasonic: Ultrasonic<O, E, D, C>,
    signal: AnalogSignal,
    servo: Servo<P, D>,
    indicator: Indicator<O>,
    displays: [Lcd1602<O, D>; 2],
    presence: &'static EdgeLatch,
    clock: C,
    scroll_step_ms: u32,
}

impl<O, E, P, D, C> HardwareAdapter<O, E, P, D, C>
where
    O: OutputPin,
    E: InputPin,
    P: SetDutyCycle,
    D: DelayNs,
    C: ClockPort,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ultrasonic: Ultrasonic<O, E, D, C>,
        signal: AnalogSignal,
        servo: Servo<P, D>,
        indicator: Indicator<O>,
        displays: [Lcd1602<O, D>; 2],
        presence: &'static EdgeLatch,
        clock: C,
        scroll_step_ms: u32,
    ) -> Self {
        Self {
            ultrasonic,
            signal,
            servo,
            indicator,
            displays,
            presence,
            clock,
            scroll_step_ms,
        }
    }

    fn lcd(&mut self, surface: Surface) -> &mut Lcd1602<O, D> {
        &mut self.displays[surface.index()]
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<O, E, P, D, C> SensorPort for HardwareAdapter<O, E, P, D, C>
where
    O: OutputPin,
    E: InputPin,
    P: SetDutyCycle,
    D: DelayNs,
    C: ClockPort,
{
    fn echo_round_trip_us(&mut self) -> Option<u32> {
        self.ultrasonic.round_trip_us().unwrap_or_else(|e| {
            warn!("range sensor: {}", e);
            None
        })
    }

    fn read_signal(&mut self) -> i32 {
        self.signal.read_signed()
    }

    fn take_presence_edges(&mut self) -> u32 {
        self.presence.take()
    }

    fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<O, E, P, D, C> ActuatorPort for HardwareAdapter<O, E, P, D, C>
where
    O: OutputPin,
    E: InputPin,
    P: SetDutyCycle,
    D: DelayNs,
    C: ClockPort,
{
    fn set_indicator(&mut self, on: bool) {
        if let Err(e) = self.indicator.set(on) {
            warn!("indicator: {}", e);
        }
    }

    fn move_enclosure(&mut self, angle: u8) {
        if let Err(e) = self.servo.move_to(angle) {
            warn!("enclosure: {}", e);
        }
    }

    fn enclosure_angle(&self) -> u8 {
        self.servo.angle()
    }
}

// ── DisplayPort implementation ────────────────────────────────

impl<O, E, P, D, C> DisplayPort for HardwareAdapter<O, E, P, D, C>
where
    O: OutputPin,
    E: InputPin,
    P: SetDutyCycle,
    D: DelayNs,
    C: ClockPort,
{
    fn clear(&mut self, surface: Surface) {
        if let Err(e) = self.lcd(surface).clear() {
            warn!("{:?} display: {}", surface, e);
        }
    }

    fn set_cursor(&mut self, surface: Surface, col: u8, row: u8) {
        if let Err(e) = self.lcd(surface).set_cursor(col, row) {
            warn!("{:?} display: {}", surface, e);
        }
    }

    fn print_line(&mut self, surface: Surface, text: &str) {
        if let Err(e) = self.lcd(surface).print(text) {
            warn!("{:?} display: {}", surface, e);
        }
    }

    fn scroll_left(&mut self, surface: Surface, steps: u8) {
        let pause = self.scroll_step_ms;
        let lcd = self.lcd(surface);
        for _ in 0..steps {
            if let Err(e) = lcd.scroll_left() {
                warn!("{:?} display: {}", surface, e);
                return;
            }
            lcd.delay().delay_ms(pause);
        }
    }

    fn set_visible(&mut self, surface: Surface, visible: bool) {
        if let Err(e) = self.lcd(surface).set_visible(visible) {
            warn!("{:?} display: {}", surface, e);
        }
    }
}
