//! Terminal emulation of the 16x2 display, for developing without the
//! appliance. Draws a boxed 16x2 window under a key-binding legend.

use std::io::{Stdout, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::Print;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};

use super::{Screen, COLS, ROWS};

const HELP: [&str; 6] = [
    "p/space: play/pause   s: stop   x: exit",
    "arrows or u/d: up/down, left/right",
    "m: menu   o/enter: ok",
    "q: quit",
    "",
    "display:",
];

/// Top-left corner of the box border.
const BOX_X: u16 = 0;
const BOX_Y: u16 = 7;

pub struct TermScreen {
    out: Stdout,
    col: usize,
    row: usize,
    /// Retained image, like the LCD's DDRAM: power-off blanks the
    /// glass but keeps the content for power-on.
    cells: [[char; COLS]; ROWS],
    powered: bool,
}

impl TermScreen {
    pub fn new() -> anyhow::Result<Self> {
        let mut out = std::io::stdout();
        enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;

        for (i, line) in HELP.iter().enumerate() {
            queue!(out, MoveTo(0, i as u16), Print(line))?;
        }
        let horizontal = format!("+{}+", "-".repeat(COLS));
        queue!(out, MoveTo(BOX_X, BOX_Y), Print(&horizontal))?;
        for row in 0..ROWS as u16 {
            queue!(
                out,
                MoveTo(BOX_X, BOX_Y + 1 + row),
                Print(format!("|{}|", " ".repeat(COLS)))
            )?;
        }
        queue!(
            out,
            MoveTo(BOX_X, BOX_Y + 1 + ROWS as u16),
            Print(&horizontal)
        )?;
        out.flush()?;

        Ok(Self {
            out,
            col: 0,
            row: 0,
            cells: [[' '; COLS]; ROWS],
            powered: true,
        })
    }

    fn paint_cell_row(&mut self, row: usize) -> anyhow::Result<()> {
        let text: String = if self.powered {
            self.cells[row].iter().collect()
        } else {
            " ".repeat(COLS)
        };
        queue!(
            self.out,
            MoveTo(BOX_X + 1, BOX_Y + 1 + row as u16),
            Print(text)
        )?;
        Ok(())
    }
}

impl Screen for TermScreen {
    fn clear(&mut self) -> anyhow::Result<()> {
        self.cells = [[' '; COLS]; ROWS];
        self.col = 0;
        self.row = 0;
        for row in 0..ROWS {
            self.paint_cell_row(row)?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn set_cursor(&mut self, col: usize, row: usize) -> anyhow::Result<()> {
        self.col = col.min(COLS);
        self.row = row.min(ROWS - 1);
        Ok(())
    }

    fn put_str(&mut self, s: &str) -> anyhow::Result<()> {
        for c in s.chars() {
            if self.col >= COLS {
                break;
            }
            self.cells[self.row][self.col] = c;
            self.col += 1;
        }
        if self.powered {
            let row = self.row;
            self.paint_cell_row(row)?;
            self.out.flush()?;
        }
        Ok(())
    }

    fn power(&mut self, on: bool) -> anyhow::Result<()> {
        self.powered = on;
        let marker = if on { "   " } else { "off" };
        queue!(
            self.out,
            MoveTo(BOX_X + COLS as u16 + 3, BOX_Y),
            Print(marker)
        )?;
        for row in 0..ROWS {
            self.paint_cell_row(row)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

impl Drop for TermScreen {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.out, Show, LeaveAlternateScreen);
    }
}
