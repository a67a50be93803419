//! HD44780 16x2 module behind a PCF8574 I2C backpack.
//!
//! Nibble-mode transfers; the expander wires RS/EN/backlight to the
//! low bits and the data nibble to the high bits. Power-off blanks
//! the glass and backlight but leaves DDRAM intact, so waking does
//! not need a repaint.

use std::thread::sleep;
use std::time::Duration;

use rppal::i2c::I2c;

use super::{Screen, COLS, ROWS};

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE: u8 = 0x06; // increment, no shift
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_DISPLAY_OFF: u8 = 0x08;
const CMD_SET_DDRAM: u8 = 0x80;

pub const DEFAULT_I2C_ADDR: u16 = 0x27;

pub struct LcdScreen {
    bus: I2c,
    backlight: u8,
    col: usize,
}

impl LcdScreen {
    pub fn new(addr: u16) -> anyhow::Result<Self> {
        let mut bus = I2c::new()?;
        bus.set_slave_address(addr)?;
        let mut lcd = Self {
            bus,
            backlight: BACKLIGHT,
            col: 0,
        };

        // 4-bit init dance per datasheet
        sleep(Duration::from_millis(50));
        for _ in 0..3 {
            lcd.write_nibble(0x30, false)?;
            sleep(Duration::from_millis(5));
        }
        lcd.write_nibble(0x20, false)?;
        sleep(Duration::from_millis(1));

        lcd.command(CMD_FUNCTION_4BIT_2LINE)?;
        lcd.command(CMD_DISPLAY_ON)?;
        lcd.command(CMD_ENTRY_MODE)?;
        lcd.command(CMD_CLEAR)?;
        sleep(Duration::from_millis(2));
        Ok(lcd)
    }

    fn write_nibble(&mut self, bits: u8, rs: bool) -> anyhow::Result<()> {
        let base = (bits & 0xF0) | self.backlight | if rs { RS } else { 0 };
        self.bus.write(&[base | EN])?;
        sleep(Duration::from_micros(1));
        self.bus.write(&[base])?;
        sleep(Duration::from_micros(50));
        Ok(())
    }

    fn send(&mut self, byte: u8, rs: bool) -> anyhow::Result<()> {
        self.write_nibble(byte & 0xF0, rs)?;
        self.write_nibble(byte << 4, rs)
    }

    fn command(&mut self, cmd: u8) -> anyhow::Result<()> {
        self.send(cmd, false)
    }

    fn data(&mut self, byte: u8) -> anyhow::Result<()> {
        self.send(byte, true)
    }
}

impl Screen for LcdScreen {
    fn clear(&mut self) -> anyhow::Result<()> {
        self.command(CMD_CLEAR)?;
        sleep(Duration::from_millis(2));
        self.col = 0;
        Ok(())
    }

    fn set_cursor(&mut self, col: usize, row: usize) -> anyhow::Result<()> {
        let row_base = if row.min(ROWS - 1) == 0 { 0x00 } else { 0x40 };
        self.col = col.min(COLS);
        self.command(CMD_SET_DDRAM | (row_base + self.col as u8))
    }

    fn put_str(&mut self, s: &str) -> anyhow::Result<()> {
        for c in s.chars() {
            if self.col >= COLS {
                break;
            }
            let byte = if c.is_ascii() { c as u8 } else { b'?' };
            self.data(byte)?;
            self.col += 1;
        }
        Ok(())
    }

    fn power(&mut self, on: bool) -> anyhow::Result<()> {
        self.backlight = if on { BACKLIGHT } else { 0 };
        self.command(if on { CMD_DISPLAY_ON } else { CMD_DISPLAY_OFF })
    }
}
