//! Terminal input merged with the tick and render clocks into one channel.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[derive(Debug, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// (columns, rows)
    Resize(u16, u16),
    /// Clock tiles and notification expiry.
    Tick,
    Render,
}

impl Event {
    /// Key presses and resizes pass; releases, repeats, mouse, focus and
    /// paste events are dropped.
    fn from_terminal(event: CrosstermEvent) -> Option<Self> {
        match event {
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Self::Key(key)),
            CrosstermEvent::Resize(w, h) => Some(Self::Resize(w, h)),
            _ => None,
        }
    }
}

/// Owns the background reader; dropping it stops the task.
pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    pub fn new(tick_rate: Duration, render_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(pump(tx, cancel.clone(), tick_rate, render_rate));
        Self { rx, cancel }
    }

    /// `None` once the reader task has ended.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn pump(
    tx: mpsc::UnboundedSender<Event>,
    cancel: CancellationToken,
    tick_rate: Duration,
    render_rate: Duration,
) {
    let mut input = EventStream::new();
    let mut tick = clock(tick_rate);
    let mut render = clock(render_rate);

    loop {
        let event = tokio::select! {
            () = cancel.cancelled() => return,
            _ = tick.tick() => Event::Tick,
            _ = render.tick() => Event::Render,
            next = input.next() => match next {
                Some(Ok(raw)) => match Event::from_terminal(raw) {
                    Some(event) => event,
                    None => continue,
                },
                Some(Err(e)) => {
                    warn!(error = %e, "terminal input error");
                    continue;
                }
                None => return,
            },
        };

        if tx.send(event).is_err() {
            return;
        }
    }
}

fn clock(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    #[test]
    fn only_presses_and_resizes_pass() {
        let press = KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE);
        let release =
            KeyEvent::new_with_kind(KeyCode::Char('e'), KeyModifiers::NONE, KeyEventKind::Release);

        assert_eq!(
            Event::from_terminal(CrosstermEvent::Key(press)),
            Some(Event::Key(press))
        );
        assert_eq!(Event::from_terminal(CrosstermEvent::Key(release)), None);
        assert_eq!(
            Event::from_terminal(CrosstermEvent::Resize(120, 40)),
            Some(Event::Resize(120, 40))
        );
        assert_eq!(Event::from_terminal(CrosstermEvent::FocusGained), None);
    }
}
