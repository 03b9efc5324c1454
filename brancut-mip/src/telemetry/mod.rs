//! Event telemetry for an external search observer.
//!
//! Every emission follows the observer's rendezvous discipline: receive one
//! message, then send one JSON-encoded [`Event`]. With telemetry disabled
//! no event is even built. A channel failure disables telemetry for the
//! rest of the run; search decisions never depend on delivery.

mod channel;
mod event;

pub use channel::{StreamChannel, TelemetryChannel};
pub use event::{Direction, Event, EventKind};

use crate::error::TelemetryError;

/// Event sink owned by the engine.
pub struct Telemetry {
    channel: Option<Box<dyn TelemetryChannel>>,
    sent: u64,
}

impl std::fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Telemetry")
            .field("enabled", &self.is_enabled())
            .field("sent", &self.sent)
            .finish()
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::disabled()
    }
}

impl Telemetry {
    /// No-op sink.
    pub fn disabled() -> Self {
        Self {
            channel: None,
            sent: 0,
        }
    }

    /// Sink over an established channel.
    pub fn new(channel: Box<dyn TelemetryChannel>) -> Self {
        Self {
            channel: Some(channel),
            sent: 0,
        }
    }

    /// Wait for an observer on `port` (localhost).
    pub fn listen(port: u16) -> Result<Self, TelemetryError> {
        Ok(Self::new(Box::new(StreamChannel::listen(port)?)))
    }

    /// Whether events are still being delivered.
    pub fn is_enabled(&self) -> bool {
        self.channel.is_some()
    }

    /// Events delivered so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Build and deliver an event; `build` only runs when enabled.
    pub fn emit(&mut self, build: impl FnOnce() -> Event) {
        let Some(channel) = self.channel.as_mut() else {
            return;
        };
        let event = build();
        match deliver(channel.as_mut(), &event) {
            Ok(()) => self.sent += 1,
            Err(e) => {
                log::warn!(
                    "Telemetry disabled after failing to deliver event for node {}: {}",
                    event.node_id,
                    e
                );
                self.channel = None;
            }
        }
    }
}

fn deliver(channel: &mut dyn TelemetryChannel, event: &Event) -> Result<(), TelemetryError> {
    let message = event.to_json()?;
    channel.receive()?;
    channel.send(&message)
}
