//! 16x2 character display: driver seam, frame model and renderer.

pub mod mock;
pub mod renderer;
pub mod term;
pub mod textfit;

#[cfg(feature = "hardware")]
pub mod lcd;

pub use renderer::Renderer;

pub const COLS: usize = 16;
pub const ROWS: usize = 2;

/// Byte-level display driver. Implementations must clip writes to the
/// end of the current row; cursor addressing is (col, row).
pub trait Screen: Send {
    fn clear(&mut self) -> anyhow::Result<()>;
    fn set_cursor(&mut self, col: usize, row: usize) -> anyhow::Result<()>;
    fn put_str(&mut self, s: &str) -> anyhow::Result<()>;
    fn power(&mut self, on: bool) -> anyhow::Result<()>;

    fn put_char(&mut self, c: char) -> anyhow::Result<()> {
        let mut buf = [0u8; 4];
        self.put_str(c.encode_utf8(&mut buf))
    }
}

/// One full display image: ROWS x COLS cells, space padded. Frames are
/// value types; the renderer diffs consecutive frames to keep writes
/// to the slow display minimal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    cells: [[char; COLS]; ROWS],
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            cells: [[' '; COLS]; ROWS],
        }
    }
}

impl Frame {
    /// Builds a frame from up to two lines, folded to the display
    /// character set and clipped to the row width.
    pub fn from_lines(top: &str, bottom: &str) -> Self {
        let mut frame = Frame::default();
        frame.write(0, 0, top);
        frame.write(0, 1, bottom);
        frame
    }

    /// Writes text at (col, row), clipped to the end of the row.
    pub fn write(&mut self, col: usize, row: usize, text: &str) {
        if row >= ROWS || col >= COLS {
            return;
        }
        for (i, c) in textfit::fold(text).chars().enumerate() {
            let at = col + i;
            if at >= COLS {
                break;
            }
            self.cells[row][at] = c;
        }
    }

    pub fn row(&self, row: usize) -> String {
        self.cells[row].iter().collect()
    }

    /// Returns the changed span of `row` against `prev` as
    /// `(start_col, replacement_text)`, or `None` when identical.
    pub fn diff_row(&self, prev: &Frame, row: usize) -> Option<(usize, String)> {
        let old = &prev.cells[row];
        let new = &self.cells[row];
        let first = (0..COLS).find(|&i| old[i] != new[i])?;
        let last = (0..COLS).rfind(|&i| old[i] != new[i]).unwrap_or(first);
        Some((first, new[first..=last].iter().collect()))
    }
}
