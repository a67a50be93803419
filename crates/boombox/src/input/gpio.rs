//! Front-panel push buttons on the Pi's GPIO header.

use std::time::{Duration, Instant};

use rppal::gpio::{Gpio, InputPin, Level, Trigger};
use tokio::sync::mpsc;
use tracing::warn;

use super::{Control, InputEvent};

// BCM pin numbering
const PIN_PLAY: u8 = 17;
const PIN_UP: u8 = 27;
const PIN_DOWN: u8 = 22;
const PIN_MENU: u8 = 23;
const PIN_OK: u8 = 24;
const PIN_STOP: u8 = 25;

const DEBOUNCE: Duration = Duration::from_millis(200);

/// Owns the interrupt-configured pins; dropping it detaches the
/// button callbacks.
pub struct Buttons {
    _pins: Vec<InputPin>,
}

/// Configures the buttons as pull-down inputs with a rising-edge
/// interrupt each. Bounces inside the debounce window are dropped.
pub fn listen(tx: mpsc::Sender<InputEvent>) -> anyhow::Result<Buttons> {
    let gpio = Gpio::new()?;
    let table = [
        (PIN_PLAY, Control::PlayPause),
        (PIN_UP, Control::Up),
        (PIN_DOWN, Control::Down),
        (PIN_MENU, Control::Menu),
        (PIN_OK, Control::Ok),
        (PIN_STOP, Control::Stop),
    ];

    let mut pins = Vec::with_capacity(table.len());
    for (number, control) in table {
        let mut pin = gpio.get(number)?.into_input_pulldown();
        let tx = tx.clone();
        let mut last: Option<Instant> = None;
        pin.set_async_interrupt(Trigger::RisingEdge, move |level| {
            if level != Level::High {
                return;
            }
            let now = Instant::now();
            if last.is_some_and(|t| now.duration_since(t) < DEBOUNCE) {
                return;
            }
            last = Some(now);
            if tx.blocking_send(InputEvent::Control(control)).is_err() {
                warn!("input channel closed, dropping button press");
            }
        })?;
        pins.push(pin);
    }
    Ok(Buttons { _pins: pins })
}
