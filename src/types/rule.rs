use std::collections::BTreeSet;
use std::fmt;

use super::cache::StateCache;
use super::expr::Expr;
use crate::host::{Actuator, Command, StateProvider};

/// Last computed value of an output rule.
///
/// `Unknown` equals neither `On` nor `Off`, so the first evaluation of a rule
/// always reports a change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TriState {
    #[default]
    Unknown,
    On,
    Off,
}

impl TriState {
    /// `true` only for `On`.
    #[must_use]
    pub fn is_on(self) -> bool {
        self == TriState::On
    }

    #[must_use]
    pub fn matches(self, value: bool) -> bool {
        self == TriState::from(value)
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value {
            TriState::On
        } else {
            TriState::Off
        }
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriState::Unknown => write!(f, "unknown"),
            TriState::On => write!(f, "on"),
            TriState::Off => write!(f, "off"),
        }
    }
}

/// Binds one output entity to a list of input expressions. The output should
/// be on when any expression holds.
///
/// Expressions are already alias-resolved. Only `last_state` changes after
/// construction.
#[derive(Debug, Clone)]
pub struct OutputRule {
    output: String,
    inputs: Vec<Expr>,
    entities: BTreeSet<String>,
    last_state: TriState,
}

impl OutputRule {
    #[must_use]
    pub fn new(output: &str, inputs: Vec<Expr>) -> Self {
        let entities = inputs
            .iter()
            .flat_map(|expr| expr.entities())
            .map(str::to_owned)
            .collect();
        Self {
            output: output.to_owned(),
            inputs,
            entities,
            last_state: TriState::Unknown,
        }
    }

    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    #[must_use]
    pub fn inputs(&self) -> &[Expr] {
        &self.inputs
    }

    /// Every entity referenced by any input expression.
    #[must_use]
    pub fn entities(&self) -> &BTreeSet<String> {
        &self.entities
    }

    #[must_use]
    pub fn last_state(&self) -> TriState {
        self.last_state
    }

    /// Recompute the output value. Returns `Some(value)` when it differs from
    /// the last computed value, `None` otherwise.
    pub fn evaluate<P: StateProvider + ?Sized>(
        &mut self,
        cache: &mut StateCache<'_, P>,
    ) -> Option<bool> {
        let value = self
            .inputs
            .iter()
            .fold(false, |acc, expr| crate::evaluate::evaluate(expr, cache) | acc);

        if self.last_state.matches(value) {
            None
        } else {
            self.last_state = TriState::from(value);
            Some(value)
        }
    }

    /// Drive the output to the last computed value. Always issues a command;
    /// `Unknown` turns the output off.
    pub fn apply<A: Actuator + ?Sized>(&self, actuator: &mut A) -> Command {
        let command = Command::set(&self.output, self.last_state.is_on());
        command.send(actuator);
        command
    }
}

impl fmt::Display for OutputRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = [", self.output)?;
        for (i, expr) in self.inputs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{expr}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use crate::Snapshot;

    fn rule(output: &str, inputs: &[&str]) -> OutputRule {
        OutputRule::new(output, inputs.iter().map(|i| parse(i).unwrap()).collect())
    }

    #[test]
    fn tri_state_from_bool() {
        assert_eq!(TriState::from(true), TriState::On);
        assert_eq!(TriState::from(false), TriState::Off);
        assert!(!TriState::Unknown.matches(true));
        assert!(!TriState::Unknown.matches(false));
        assert!(!TriState::Unknown.is_on());
    }

    #[test]
    fn first_evaluation_always_reports() {
        let snap = Snapshot::new();
        let mut r = rule("light.test", &["a"]);
        assert_eq!(r.last_state(), TriState::Unknown);
        assert_eq!(r.evaluate(&mut StateCache::new(&snap)), Some(false));
        assert_eq!(r.last_state(), TriState::Off);
    }

    #[test]
    fn repeated_evaluation_is_debounced() {
        let snap = Snapshot::new().set("a", "on");
        let mut r = rule("light.test", &["a"]);
        assert_eq!(r.evaluate(&mut StateCache::new(&snap)), Some(true));
        assert_eq!(r.evaluate(&mut StateCache::new(&snap)), None);
        assert_eq!(r.evaluate(&mut StateCache::new(&snap)), None);
        assert_eq!(r.last_state(), TriState::On);

        let snap = snap.set("a", "off");
        assert_eq!(r.evaluate(&mut StateCache::new(&snap)), Some(false));
        assert_eq!(r.last_state(), TriState::Off);
    }

    #[test]
    fn inputs_are_ored() {
        let snap = Snapshot::new().set("c", "on");
        let mut r = rule("light.test", &["a & b", "c"]);
        assert_eq!(r.evaluate(&mut StateCache::new(&snap)), Some(true));
    }

    #[test]
    fn every_input_is_evaluated() {
        let snap = Snapshot::new().set("a", "on");
        let mut r = rule("light.test", &["a", "b", "c"]);
        let mut cache = StateCache::new(&snap);
        r.evaluate(&mut cache);
        assert_eq!(cache.reads(), 3);
    }

    #[test]
    fn apply_follows_last_state() {
        let mut host = Snapshot::new().set("a", "on");
        let mut r = rule("light.test", &["a"]);

        assert_eq!(r.apply(&mut host), Command::TurnOff("light.test".into()));
        assert_eq!(host.get("light.test"), Some("off"));

        r.evaluate(&mut StateCache::new(&host.clone()));
        assert_eq!(r.apply(&mut host), Command::TurnOn("light.test".into()));
        assert_eq!(r.apply(&mut host), Command::TurnOn("light.test".into()));
        assert_eq!(host.get("light.test"), Some("on"));
    }

    #[test]
    fn entities_union_across_inputs() {
        let r = rule("light.test", &["a & b", "b | !c", "d=off"]);
        let names: Vec<&str> = r.entities().iter().map(String::as_str).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);
    }

    #[test]
    fn display_lists_inputs() {
        let r = rule("light.test", &["a & b", "c"]);
        assert_eq!(r.to_string(), "light.test = [(a & b), c]");
    }
}
