use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;

/// Terminal events feeding the app loop
#[derive(Debug)]
pub enum Event {
  /// Key press
  Key(KeyEvent),
  /// Terminal was resized; a redraw is enough
  Resize,
  /// Periodic tick for query polling and UI refresh
  Tick,
}

/// Produces events from terminal input and a tick timer
pub struct EventPump {
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventPump {
  /// Spawn the reader task with the given tick rate
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
      loop {
        if event::poll(tick_rate).unwrap_or(false) {
          match event::read() {
            // Only presses: release/repeat events double keystrokes on some
            // terminals
            Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
              if tx.send(Event::Key(key)).is_err() {
                break;
              }
            }
            Ok(CrosstermEvent::Resize(_, _)) => {
              if tx.send(Event::Resize).is_err() {
                break;
              }
            }
            _ => {}
          }
        } else if tx.send(Event::Tick).is_err() {
          break;
        }
      }
    });

    Self { rx }
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}
