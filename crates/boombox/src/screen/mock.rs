//! Recording display driver for tests.

use std::sync::{Arc, Mutex};

use super::{Screen, COLS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Clear,
    SetCursor(usize, usize),
    Put(String),
    Power(bool),
}

#[derive(Default)]
pub struct MockScreen {
    ops: Arc<Mutex<Vec<Op>>>,
    col: usize,
}

impl MockScreen {
    /// Shared handle to the recorded operations.
    pub fn ops(&self) -> Arc<Mutex<Vec<Op>>> {
        self.ops.clone()
    }
}

impl Screen for MockScreen {
    fn clear(&mut self) -> anyhow::Result<()> {
        self.col = 0;
        self.ops.lock().unwrap().push(Op::Clear);
        Ok(())
    }

    fn set_cursor(&mut self, col: usize, row: usize) -> anyhow::Result<()> {
        self.col = col;
        self.ops.lock().unwrap().push(Op::SetCursor(col, row));
        Ok(())
    }

    fn put_str(&mut self, s: &str) -> anyhow::Result<()> {
        let clipped: String = s.chars().take(COLS.saturating_sub(self.col)).collect();
        self.col += clipped.chars().count();
        self.ops.lock().unwrap().push(Op::Put(clipped));
        Ok(())
    }

    fn power(&mut self, on: bool) -> anyhow::Result<()> {
        self.ops.lock().unwrap().push(Op::Power(on));
        Ok(())
    }
}
