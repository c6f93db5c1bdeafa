//! The seam between the engine and the home-automation host that owns entity
//! state, delivers change notifications and runs the periodic timer.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use tracing::trace;

/// State an output entity reports while its device is offline.
pub const UNAVAILABLE: &str = "unavailable";

/// Read side of the host's state store.
pub trait StateProvider {
    /// Current state of `entity`, or `None` if the host has never seen it.
    fn get_state(&self, entity: &str) -> Option<String>;
}

/// Write side: fire-and-forget commands to actuators.
pub trait Actuator {
    fn turn_on(&mut self, entity: &str);
    fn turn_off(&mut self, entity: &str);
}

/// A host that can be both read from and commanded.
pub trait Host: StateProvider + Actuator {}

impl<T: StateProvider + Actuator + ?Sized> Host for T {}

impl StateProvider for HashMap<String, String> {
    fn get_state(&self, entity: &str) -> Option<String> {
        self.get(entity).cloned()
    }
}

/// A command issued to an output entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    TurnOn(String),
    TurnOff(String),
}

impl Command {
    /// The command that drives `entity` to `on`.
    #[must_use]
    pub fn set(entity: &str, on: bool) -> Self {
        if on {
            Command::TurnOn(entity.to_owned())
        } else {
            Command::TurnOff(entity.to_owned())
        }
    }

    #[must_use]
    pub fn entity(&self) -> &str {
        match self {
            Command::TurnOn(e) | Command::TurnOff(e) => e,
        }
    }

    /// Send this command to `actuator`.
    pub fn send<A: Actuator + ?Sized>(&self, actuator: &mut A) {
        trace!(command = %self, "sending");
        match self {
            Command::TurnOn(e) => actuator.turn_on(e),
            Command::TurnOff(e) => actuator.turn_off(e),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::TurnOn(e) => write!(f, "turn_on({e})"),
            Command::TurnOff(e) => write!(f, "turn_off({e})"),
        }
    }
}

/// Something the host delivers to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// An entity's state changed. `None` means the entity was unknown.
    StateChanged {
        entity: String,
        old: Option<String>,
        new: Option<String>,
    },
    /// The periodic resync timer fired.
    Tick,
}

impl Event {
    #[must_use]
    pub fn state_changed(entity: &str, old: Option<&str>, new: Option<&str>) -> Self {
        Event::StateChanged {
            entity: entity.to_owned(),
            old: old.map(str::to_owned),
            new: new.map(str::to_owned),
        }
    }
}

/// What the host has to wire up for an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscriptions {
    /// Entities whose every change must be delivered.
    pub inputs: Vec<String>,
    /// Output entities to watch, filtered on a prior state of [`UNAVAILABLE`].
    pub outputs: Vec<String>,
    /// Prior-state filter for the `outputs` subscription.
    pub old_state: &'static str,
    /// Period of the resync timer.
    pub interval: Duration,
}
