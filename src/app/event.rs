//! Terminal input pump.
//!
//! Crossterm's `poll`/`read` block, so they run on a blocking worker that
//! forwards a reduced event set over a channel.  A `Frame` event is emitted
//! whenever the poll window elapses quietly, which drives the scroll glide.

use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEventKind};
use tokio::sync::mpsc;

/// Events the main loop reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    Key(KeyEvent),
    /// Mouse wheel: `-1` toward earlier cards, `+1` toward later ones.
    Wheel(i8),
    Resize(u16, u16),
    Frame,
}

/// Map a crossterm event, dropping the ones the app ignores.
fn translate(ev: Event) -> Option<AppEvent> {
    match ev {
        // Release/repeat reports only arrive on terminals with the kitty
        // protocol enabled; acting on them would double every key.
        Event::Key(k) if k.kind == KeyEventKind::Press => Some(AppEvent::Key(k)),
        Event::Mouse(m) => match m.kind {
            MouseEventKind::ScrollUp | MouseEventKind::ScrollLeft => Some(AppEvent::Wheel(-1)),
            MouseEventKind::ScrollDown | MouseEventKind::ScrollRight => Some(AppEvent::Wheel(1)),
            _ => None,
        },
        Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        _ => None,
    }
}

/// Start the input pump.  The worker exits once the receiver is dropped.
pub fn spawn_event_reader(frame_rate: Duration) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::task::spawn_blocking(move || loop {
        let next = match event::poll(frame_rate) {
            Ok(true) => match event::read() {
                Ok(ev) => match translate(ev) {
                    Some(app_event) => app_event,
                    None => continue,
                },
                Err(e) => {
                    tracing::warn!("terminal read failed: {e}");
                    continue;
                }
            },
            Ok(false) => AppEvent::Frame,
            Err(e) => {
                tracing::warn!("terminal poll failed: {e}");
                break;
            }
        };
        if tx.send(next).is_err() {
            break;
        }
    });

    rx
}
