use std::fmt;
use std::time::Duration;

use crate::host::Command;

/// What started an evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Startup or periodic full resync.
    Resync,
    /// An input entity changed state.
    InputChanged(String),
    /// An output entity came back from being unavailable.
    OutputAvailable(String),
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Resync => write!(f, "resync"),
            Trigger::InputChanged(entity) => write!(f, "input {entity} changed"),
            Trigger::OutputAvailable(entity) => write!(f, "output {entity} available"),
        }
    }
}

/// Outcome of one pass through the engine.
///
/// Lists the outputs whose rules were evaluated, the outputs whose computed
/// value flipped, every command sent, how many entity states were read and
/// the wall-clock duration of the pass.
#[derive(Debug, Clone)]
#[must_use]
pub struct PassReport {
    trigger: Trigger,
    evaluated: Vec<String>,
    changed: Vec<String>,
    commands: Vec<Command>,
    reads: usize,
    duration: Duration,
}

impl PassReport {
    pub(crate) fn new(
        trigger: Trigger,
        evaluated: Vec<String>,
        changed: Vec<String>,
        commands: Vec<Command>,
        reads: usize,
        duration: Duration,
    ) -> Self {
        Self {
            trigger,
            evaluated,
            changed,
            commands,
            reads,
            duration,
        }
    }

    #[must_use]
    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    /// Output entities whose rules were evaluated, in rule order.
    #[must_use]
    pub fn evaluated(&self) -> &[String] {
        &self.evaluated
    }

    /// Output entities whose computed value changed during this pass.
    #[must_use]
    pub fn changed(&self) -> &[String] {
        &self.changed
    }

    /// Commands sent to the host, in the order they were sent.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Distinct entity states read from the host.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} rules evaluated, {} changed",
            self.trigger,
            self.evaluated.len(),
            self.changed.len()
        )?;
        if !self.commands.is_empty() {
            let commands: Vec<String> = self.commands.iter().map(ToString::to_string).collect();
            write!(f, ", commands: [{}]", commands.join(", "))?;
        }
        write!(f, ", duration: {:?}", self.duration)?;
        Ok(())
    }
}
