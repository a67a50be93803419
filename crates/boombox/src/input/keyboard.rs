//! Keyboard input source, used alongside the terminal display
//! emulator on a desktop.

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::warn;

use super::{Control, InputEvent};

pub fn spawn(tx: mpsc::Sender<InputEvent>) {
    tokio::spawn(async move {
        let mut events = EventStream::new();
        while let Some(event) = events.next().await {
            let key = match event {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => key,
                Ok(_) => continue,
                Err(err) => {
                    warn!(%err, "keyboard read failed");
                    continue;
                }
            };
            let Some(mapped) = map_key(&key) else {
                continue;
            };
            if tx.send(mapped).await.is_err() {
                break;
            }
        }
    });
}

fn map_key(key: &KeyEvent) -> Option<InputEvent> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(InputEvent::Quit);
    }
    let control = match key.code {
        KeyCode::Char('p') | KeyCode::Char(' ') => Control::PlayPause,
        KeyCode::Up | KeyCode::Char('u') => Control::Up,
        KeyCode::Down | KeyCode::Char('d') => Control::Down,
        KeyCode::Left => Control::Left,
        KeyCode::Right => Control::Right,
        KeyCode::Char('m') => Control::Menu,
        KeyCode::Char('o') | KeyCode::Enter => Control::Ok,
        KeyCode::Char('s') => Control::Stop,
        KeyCode::Char('x') | KeyCode::Esc => Control::Exit,
        KeyCode::Char('q') => return Some(InputEvent::Quit),
        _ => return None,
    };
    Some(InputEvent::Control(control))
}
