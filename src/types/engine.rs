use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace};

use super::cache::StateCache;
use super::error::BuildError;
use super::report::{PassReport, Trigger};
use super::rule::OutputRule;
use crate::alias::AliasTable;
use crate::config::Config;
use crate::host::{Command, Event, Host, Subscriptions, UNAVAILABLE};

/// Default period of the drift-correcting resync.
pub const DEFAULT_RESYNC_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Raw definition of one output before parsing.
#[derive(Debug, Clone)]
pub(crate) struct OutputDef {
    pub(crate) output: String,
    pub(crate) inputs: Vec<String>,
}

/// Builder for constructing an [`Engine`].
///
/// Outputs are defined via closures listing their input expressions as text.
/// Aliases are parsed first and substituted into every input expression.
///
/// # Example
///
/// ```
/// use reactive_rules::EngineBuilder;
///
/// let engine = EngineBuilder::new()
///     .alias("is_dark", "binary_sensor.dark | input_boolean.bedtime")
///     .output("light.hall", |o| {
///         o.when("binary_sensor.motion & is_dark")
///             .when("binary_sensor.lightswitch")
///     })
///     .build()
///     .unwrap();
/// assert_eq!(engine.rules().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct EngineBuilder {
    outputs: Vec<OutputDef>,
    aliases: Vec<(String, String)>,
    resync_interval: Option<Duration>,
}

/// Intermediate builder passed to the output definition closure.
#[derive(Debug)]
pub struct OutputBuilder {
    inputs: Vec<String>,
}

impl EngineBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Define an alias usable by name in any input expression.
    #[must_use]
    pub fn alias(mut self, name: &str, expr: &str) -> Self {
        self.aliases.push((name.to_owned(), expr.to_owned()));
        self
    }

    /// Define an output. The closure must call `.when(expr)` at least once;
    /// the output is on whenever any of its expressions holds.
    ///
    /// If `.when()` is never called, building fails with [`BuildError::NoInputs`].
    #[must_use]
    pub fn output(mut self, output: &str, f: impl FnOnce(OutputBuilder) -> OutputBuilder) -> Self {
        let builder = f(OutputBuilder { inputs: Vec::new() });
        self.outputs.push(OutputDef {
            output: output.to_owned(),
            inputs: builder.inputs,
        });
        self
    }

    /// Period the host should use for its resync timer.
    #[must_use]
    pub fn resync_interval(mut self, interval: Duration) -> Self {
        self.resync_interval = Some(interval);
        self
    }

    /// Parse, resolve and index everything into an [`Engine`].
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if any alias or input expression is invalid.
    pub fn build(self) -> Result<Engine, BuildError> {
        let aliases =
            AliasTable::parse(self.aliases.iter().map(|(n, e)| (n.as_str(), e.as_str())))?;
        crate::compile::compile(
            &self.outputs,
            &aliases,
            self.resync_interval.unwrap_or(DEFAULT_RESYNC_INTERVAL),
        )
    }
}

impl OutputBuilder {
    /// Add an input expression, e.g. `"binary_sensor.motion & !sun=above_horizon"`.
    #[must_use]
    pub fn when(mut self, expr: &str) -> Self {
        self.inputs.push(expr.to_owned());
        self
    }
}

/// The reactive rule engine: owns every [`OutputRule`] and the indices used to
/// find the rules affected by a change.
///
/// Both indices are built once and never change. Only the rules' last computed
/// states change, and only through `&mut self`, so events must be delivered
/// one at a time.
#[derive(Debug)]
pub struct Engine {
    pub(crate) rules: Vec<OutputRule>,
    /// input entity -> indices of the rules referencing it
    pub(crate) dependents: HashMap<String, Vec<usize>>,
    /// output entity -> index of its rule
    pub(crate) outputs: HashMap<String, usize>,
    pub(crate) resync_interval: Duration,
}

impl Engine {
    /// Build an engine from a loaded [`Config`].
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if any alias or input expression is invalid.
    pub fn from_config(config: &Config) -> Result<Self, BuildError> {
        let mut builder = EngineBuilder::new().resync_interval(config.resync_interval());
        for (name, expr) in &config.aliases {
            builder = builder.alias(name, expr);
        }
        for (output, inputs) in &config.outputs {
            builder = builder.output(output, |mut o| {
                for input in inputs {
                    o = o.when(input);
                }
                o
            });
        }
        builder.build()
    }

    /// Parse a YAML configuration and build an engine from it.
    ///
    /// # Errors
    ///
    /// Returns [`ReactiveError`](crate::ReactiveError) on YAML or build failure.
    pub fn from_yaml(input: &str) -> Result<Self, crate::ReactiveError> {
        let config = Config::from_yaml(input)?;
        Ok(Self::from_config(&config)?)
    }

    /// Read a YAML configuration file and build an engine from it.
    ///
    /// # Errors
    ///
    /// Returns [`ReactiveError`](crate::ReactiveError) on I/O, YAML or build failure.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::ReactiveError> {
        let config = Config::from_file(path)?;
        Ok(Self::from_config(&config)?)
    }

    /// What the host must subscribe to on behalf of this engine.
    #[must_use]
    pub fn subscriptions(&self) -> Subscriptions {
        Subscriptions {
            inputs: self.input_entities().into_iter().map(str::to_owned).collect(),
            outputs: self.rules.iter().map(|r| r.output().to_owned()).collect(),
            old_state: UNAVAILABLE,
            interval: self.resync_interval,
        }
    }

    /// Run the startup resync. Every output is evaluated and commanded.
    pub fn start<H: Host + ?Sized>(&mut self, host: &mut H) -> PassReport {
        info!(
            outputs = self.rules.len(),
            inputs = self.dependents.len(),
            "starting reactive engine"
        );
        self.trigger_all(host)
    }

    /// Dispatch one host event to the matching triggering paths.
    ///
    /// A state change of an input re-evaluates its dependent rules. A state
    /// change of an output away from [`UNAVAILABLE`] re-applies its stored
    /// value. A tick resyncs everything.
    pub fn handle<H: Host + ?Sized>(&mut self, event: &Event, host: &mut H) -> Vec<PassReport> {
        match event {
            Event::Tick => vec![self.trigger_all(&mut *host)],
            Event::StateChanged { entity, old, new } => {
                trace!(%entity, ?old, ?new, "state changed");
                let mut reports = Vec::new();
                if let Some(report) = self.input_changed(entity, &mut *host) {
                    if !report.changed().is_empty() {
                        info!(
                            "{entity} ({} -> {}): {} rules triggered, {} output states changed",
                            old.as_deref().unwrap_or("unknown"),
                            new.as_deref().unwrap_or("unknown"),
                            report.evaluated().len(),
                            report.changed().len()
                        );
                    }
                    reports.push(report);
                }
                if old.as_deref() == Some(UNAVAILABLE) && new != old {
                    if let Some(report) = self.output_available(entity, &mut *host) {
                        reports.push(report);
                    }
                }
                reports
            }
        }
    }

    /// Full resync: evaluate every rule with one fresh cache, then command
    /// every output whether or not its value changed. Corrects outputs that
    /// were toggled behind the engine's back.
    pub fn trigger_all<H: Host + ?Sized>(&mut self, host: &mut H) -> PassReport {
        let started = Instant::now();

        let (changed, reads) = {
            let mut cache = StateCache::new(&*host);
            let changed: Vec<String> = self
                .rules
                .iter_mut()
                .filter_map(|rule| {
                    rule.evaluate(&mut cache)
                        .map(|_| rule.output().to_owned())
                })
                .collect();
            (changed, cache.reads())
        };

        let commands: Vec<Command> = self.rules.iter().map(|r| r.apply(&mut *host)).collect();
        let evaluated = self.rules.iter().map(|r| r.output().to_owned()).collect();

        let report = PassReport::new(
            Trigger::Resync,
            evaluated,
            changed,
            commands,
            reads,
            started.elapsed(),
        );
        debug!(%report, "resync complete");
        report
    }

    /// Incremental update after `entity` changed. Only rules that reference
    /// `entity` are evaluated, and only those whose value flipped are
    /// commanded. Returns `None` if no rule references `entity`.
    pub fn input_changed<H: Host + ?Sized>(
        &mut self,
        entity: &str,
        host: &mut H,
    ) -> Option<PassReport> {
        let Some(indices) = self.dependents.get(entity) else {
            trace!(%entity, "not an input of any rule");
            return None;
        };
        let started = Instant::now();

        let mut flipped = Vec::new();
        let reads = {
            let mut cache = StateCache::new(&*host);
            for &i in indices {
                if self.rules[i].evaluate(&mut cache).is_some() {
                    flipped.push(i);
                }
            }
            cache.reads()
        };

        let commands: Vec<Command> = flipped
            .iter()
            .map(|&i| self.rules[i].apply(&mut *host))
            .collect();
        let evaluated = indices
            .iter()
            .map(|&i| self.rules[i].output().to_owned())
            .collect();
        let changed = flipped
            .iter()
            .map(|&i| self.rules[i].output().to_owned())
            .collect();

        let report = PassReport::new(
            Trigger::InputChanged(entity.to_owned()),
            evaluated,
            changed,
            commands,
            reads,
            started.elapsed(),
        );
        debug!(%report, "input pass complete");
        Some(report)
    }

    /// Re-send the stored value of `output` without reading any input.
    /// Returns `None` if `output` is not an output of this engine.
    pub fn output_available<H: Host + ?Sized>(
        &mut self,
        output: &str,
        host: &mut H,
    ) -> Option<PassReport> {
        let &i = self.outputs.get(output)?;
        let started = Instant::now();
        info!("output {output} became available again");

        let command = self.rules[i].apply(host);
        Some(PassReport::new(
            Trigger::OutputAvailable(output.to_owned()),
            Vec::new(),
            Vec::new(),
            vec![command],
            0,
            started.elapsed(),
        ))
    }

    /// All rules, in definition order.
    #[must_use]
    pub fn rules(&self) -> &[OutputRule] {
        &self.rules
    }

    /// The rule driving `output`.
    #[must_use]
    pub fn rule(&self, output: &str) -> Option<&OutputRule> {
        self.outputs.get(output).map(|&i| &self.rules[i])
    }

    /// Every entity referenced by any rule, sorted.
    #[must_use]
    pub fn input_entities(&self) -> BTreeSet<&str> {
        self.dependents.keys().map(String::as_str).collect()
    }

    /// Outputs whose rules are re-evaluated when `entity` changes, in rule order.
    ///
    /// Empty if no rule references `entity`.
    #[must_use]
    pub fn dependents_of(&self, entity: &str) -> Vec<&str> {
        self.dependents
            .get(entity)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&i| self.rules[i].output())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn resync_interval(&self) -> Duration {
        self.resync_interval
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Engine({} outputs, {} inputs, resync every {:?})",
            self.rules.len(),
            self.dependents.len(),
            self.resync_interval,
        )
    }
}
