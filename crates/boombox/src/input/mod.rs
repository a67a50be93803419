//! Input sources. Every source runs as its own task and feeds the
//! same channel; the event loop never knows which device a control
//! came from.

pub mod ir;
pub mod keyboard;

#[cfg(feature = "hardware")]
pub mod gpio;

/// Logical controls, shared by buttons, IR remote and keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    PlayPause,
    Up,
    Down,
    Left,
    Right,
    Menu,
    Ok,
    Stop,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Control(Control),
    Quit,
}
