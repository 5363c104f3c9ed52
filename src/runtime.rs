use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};
use tracing::debug;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum CalcEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    /// Nothing arrived within the poll interval.
    Idle,
    /// The event source hung up; no further input will arrive.
    Closed,
}

/// Source of terminal events (keyboard, mouse, resize)
pub trait CalcEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<CalcEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<CalcEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let event = match event::read() {
                Ok(CtEvent::Key(key)) => CalcEvent::Key(key),
                Ok(CtEvent::Mouse(mouse)) => CalcEvent::Mouse(mouse),
                Ok(CtEvent::Resize(_, _)) => CalcEvent::Resize,
                Ok(_) => continue,
                Err(err) => {
                    debug!(error = %err, "terminal event reader stopped");
                    break;
                }
            };
            if tx.send(event).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CalcEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<CalcEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<CalcEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<CalcEvent>) -> Self {
        Self { rx }
    }
}

impl CalcEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<CalcEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that hands the application one event at a time
pub struct Runner<E: CalcEventSource> {
    event_source: E,
    poll_interval: Duration,
}

impl<E: CalcEventSource> Runner<E> {
    pub fn new(event_source: E, poll_interval: Duration) -> Self {
        Self {
            event_source,
            poll_interval,
        }
    }

    /// Blocks up to the poll interval and returns the next event, Idle on timeout,
    /// or Closed once the source is gone
    pub fn step(&self) -> CalcEvent {
        match self.event_source.recv_timeout(self.poll_interval) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => CalcEvent::Idle,
            Err(RecvTimeoutError::Disconnected) => CalcEvent::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn step_returns_idle_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let runner = Runner::new(es, Duration::from_millis(1));

        // With no events available, step should yield Idle
        match runner.step() {
            CalcEvent::Idle => {}
            _ => panic!("expected Idle on timeout"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(CalcEvent::Resize).unwrap();
        let es = TestEventSource::new(rx);
        let runner = Runner::new(es, Duration::from_millis(10));

        match runner.step() {
            CalcEvent::Resize => {}
            _ => panic!("expected Resize event"),
        }
    }

    #[test]
    fn step_after_disconnect_is_closed() {
        let (tx, rx) = mpsc::channel::<CalcEvent>();
        drop(tx);
        let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(10));
        assert!(matches!(runner.step(), CalcEvent::Closed));
        // stays closed rather than turning into idle polling
        assert!(matches!(runner.step(), CalcEvent::Closed));
    }

    #[test]
    fn queued_events_drain_before_closed() {
        let (tx, rx) = mpsc::channel();
        tx.send(CalcEvent::Resize).unwrap();
        drop(tx);
        let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(10));
        assert!(matches!(runner.step(), CalcEvent::Resize));
        assert!(matches!(runner.step(), CalcEvent::Closed));
    }
}
