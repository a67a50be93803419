//! Incremental renderer over the display driver.
//!
//! The physical display is slow, so the renderer keeps the last frame
//! and only rewrites the cells that changed. Moving the selection
//! inside a two-row window therefore costs a couple of bytes (the
//! cursor marker) instead of a full repaint.

use super::{Frame, Screen, COLS};

pub struct Renderer {
    driver: Box<dyn Screen>,
    last: Option<Frame>,
    asleep: bool,
}

impl Renderer {
    pub fn new(driver: Box<dyn Screen>) -> Self {
        Self {
            driver,
            last: None,
            asleep: false,
        }
    }

    pub fn is_asleep(&self) -> bool {
        self.asleep
    }

    pub fn draw(&mut self, frame: Frame) -> anyhow::Result<()> {
        match self.last.take() {
            None => {
                self.driver.clear()?;
                for row in 0..super::ROWS {
                    self.driver.set_cursor(0, row)?;
                    self.driver.put_str(frame.row(row).trim_end())?;
                }
            }
            Some(prev) => {
                for row in 0..super::ROWS {
                    if let Some((col, text)) = frame.diff_row(&prev, row) {
                        self.driver.set_cursor(col, row)?;
                        self.driver.put_str(&text)?;
                    }
                }
            }
        }
        self.last = Some(frame);
        Ok(())
    }

    pub fn lines(&mut self, top: &str, bottom: &str) -> anyhow::Result<()> {
        self.draw(Frame::from_lines(top, bottom))
    }

    /// Overwrites the top row with a truncated message, keeping the
    /// bottom row. The display is the only output channel the
    /// appliance user has, so transient errors land here.
    pub fn error_banner(&mut self, message: &str) -> anyhow::Result<()> {
        let mut frame = self.last.clone().unwrap_or_default();
        frame.write(0, 0, &format!("{:<width$}", message, width = COLS));
        self.draw(frame)
    }

    /// Powers the display down. Idempotent: a second call while
    /// already asleep issues no driver command.
    pub fn sleep(&mut self) -> anyhow::Result<()> {
        if !self.asleep {
            self.driver.power(false)?;
            self.asleep = true;
        }
        Ok(())
    }

    pub fn wake(&mut self) -> anyhow::Result<()> {
        if self.asleep {
            self.driver.power(true)?;
            self.asleep = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::mock::{MockScreen, Op};
    use super::*;

    fn renderer() -> (Renderer, std::sync::Arc<std::sync::Mutex<Vec<Op>>>) {
        let mock = MockScreen::default();
        let ops = mock.ops();
        (Renderer::new(Box::new(mock)), ops)
    }

    #[test]
    fn first_draw_clears_then_paints() {
        let (mut r, ops) = renderer();
        r.lines("> Resume...", "  List...").unwrap();
        let ops = ops.lock().unwrap();
        assert_eq!(ops[0], Op::Clear);
        assert!(ops.contains(&Op::Put("> Resume...".to_string())));
    }

    #[test]
    fn redraw_writes_only_changed_span() {
        let (mut r, ops) = renderer();
        r.lines("> Replace", "  Append").unwrap();
        ops.lock().unwrap().clear();

        // cursor marker moves: one cell per row
        r.lines("  Replace", "> Append").unwrap();
        let recorded = ops.lock().unwrap().clone();
        assert_eq!(
            recorded,
            vec![
                Op::SetCursor(0, 0),
                Op::Put(" ".to_string()),
                Op::SetCursor(0, 1),
                Op::Put(">".to_string()),
            ]
        );
    }

    #[test]
    fn identical_frame_issues_no_io() {
        let (mut r, ops) = renderer();
        r.lines("same", "frame").unwrap();
        ops.lock().unwrap().clear();
        r.lines("same", "frame").unwrap();
        assert!(ops.lock().unwrap().is_empty());
    }

    #[test]
    fn sleep_is_idempotent() {
        let (mut r, ops) = renderer();
        r.sleep().unwrap();
        r.sleep().unwrap();
        let offs = ops
            .lock()
            .unwrap()
            .iter()
            .filter(|op| **op == Op::Power(false))
            .count();
        assert_eq!(offs, 1);
        assert!(r.is_asleep());

        r.wake().unwrap();
        r.wake().unwrap();
        let ons = ops
            .lock()
            .unwrap()
            .iter()
            .filter(|op| **op == Op::Power(true))
            .count();
        assert_eq!(ons, 1);
    }

    #[test]
    fn error_banner_keeps_bottom_row() {
        let (mut r, _) = renderer();
        r.lines("Some Title", "Some Artist").unwrap();
        r.error_banner("E: no volume").unwrap();
        let last = r.last.as_ref().unwrap();
        assert_eq!(last.row(0).trim_end(), "E: no volume");
        assert_eq!(last.row(1).trim_end(), "Some Artist");
    }
}
