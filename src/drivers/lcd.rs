//! HD44780 16x2 character LCD in 4-bit mode.
//!
//! Six GPIO lines: RS, EN and D4..D7.  Every byte goes out as two
//! nibbles, high first, each latched on the falling edge of EN.
//!
//! Only the commands the firmware uses are implemented: clear, cursor
//! addressing, text, whole-display left shift and display on/off.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::DisplayError;

pub const COLUMNS: u8 = 16;
pub const ROWS: u8 = 2;
/// DDRAM width of one line; text past column 16 is reachable by scrolling.
pub const LINE_WIDTH: u8 = 40;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE: u8 = 0x06; // increment, no shift
const CMD_DISPLAY: u8 = 0x08;
const DISPLAY_ON: u8 = 0x04;
const CMD_SHIFT_LEFT: u8 = 0x18;
const CMD_FUNCTION_SET: u8 = 0x28; // 4-bit, 2 lines, 5x8
const CMD_SET_DDRAM: u8 = 0x80;
const ROW_OFFSETS: [u8; ROWS as usize] = [0x00, 0x40];

pub struct Lcd1602<P, D> {
    rs: P,
    en: P,
    data: [P; 4],
    delay: D,
}

impl<P: OutputPin, D: DelayNs> Lcd1602<P, D> {
    /// Run the 4-bit power-on initialisation sequence.
    pub fn new(rs: P, en: P, data: [P; 4], delay: D) -> Result<Self, DisplayError> {
        let mut lcd = Self {
            rs,
            en,
            data,
            delay,
        };
        lcd.init()?;
        Ok(lcd)
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        self.delay.delay_ms(50);
        set(&mut self.rs, false)?;
        set(&mut self.en, false)?;

        // Three times 0x3 forces 8-bit mode from any state, then 0x2
        // switches to 4-bit.
        self.write_nibble(0x03)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x03)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x03)?;
        self.delay.delay_us(150);
        self.write_nibble(0x02)?;

        self.command(CMD_FUNCTION_SET)?;
        self.command(CMD_DISPLAY | DISPLAY_ON)?;
        self.clear()?;
        self.command(CMD_ENTRY_MODE)
    }

    pub fn clear(&mut self) -> Result<(), DisplayError> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        Ok(())
    }

    pub fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        if row >= ROWS || col >= LINE_WIDTH {
            return Err(DisplayError::CursorOutOfRange { col, row });
        }
        self.command(CMD_SET_DDRAM | (ROW_OFFSETS[row as usize] + col))
    }

    /// Write text at the cursor.  Characters outside printable ASCII are
    /// shown as `?`.
    pub fn print(&mut self, text: &str) -> Result<(), DisplayError> {
        for c in text.chars() {
            let byte = if c.is_ascii_graphic() || c == ' ' {
                c as u8
            } else {
                b'?'
            };
            self.send(byte, true)?;
        }
        Ok(())
    }

    /// Shift the whole display one column left.
    pub fn scroll_left(&mut self) -> Result<(), DisplayError> {
        self.command(CMD_SHIFT_LEFT)
    }

    pub fn set_visible(&mut self, visible: bool) -> Result<(), DisplayError> {
        let flag = if visible { DISPLAY_ON } else { 0 };
        self.command(CMD_DISPLAY | flag)
    }

    /// Borrow the delay, for callers pacing scroll steps.
    pub fn delay(&mut self) -> &mut D {
        &mut self.delay
    }

    fn command(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.send(byte, false)
    }

    fn send(&mut self, byte: u8, is_data: bool) -> Result<(), DisplayError> {
        set(&mut self.rs, is_data)?;
        self.write_nibble(byte >> 4)?;
        self.write_nibble(byte & 0x0F)
    }

    fn write_nibble(&mut self, nibble: u8) -> Result<(), DisplayError> {
        for (bit, pin) in self.data.iter_mut().enumerate() {
            set(pin, nibble & (1 << bit) != 0)?;
        }
        set(&mut self.en, false)?;
        self.delay.delay_us(1);
        set(&mut self.en, true)?;
        self.delay.delay_us(1);
        set(&mut self.en, false)?;
        // Commands need > 37 µs to settle.
        self.delay.delay_us(100);
        Ok(())
    }
}

fn set<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), DisplayError> {
    let result = if high { pin.set_high() } else { pin.set_low() };
    result.map_err(|_| DisplayError::BusWriteFailed)
}
