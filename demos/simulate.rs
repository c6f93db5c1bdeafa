//! Drive an engine through a short day in a simulated house.
//!
//! ```text
//! RUST_LOG=reactive_rules=debug cargo run --example simulate [config.yaml]
//! ```

use reactive_rules::{Engine, Event, ReactiveError, Snapshot};
use tracing::info;
use tracing_subscriber::EnvFilter;

const HOUSE: &str = r"
aliases:
  is_dark: sun=below_horizon | input_boolean.bedtime
  switch: binary_sensor.hall_switch
outputs:
  light.hall:
    - binary_sensor.hall_motion & is_dark
    - switch
  light.porch:
    - is_dark & !binary_sensor.door
resync_interval_secs: 600
";

/// (entity, new state) in arrival order. `None` is a resync tick.
const SCRIPT: &[Option<(&str, &str)>] = &[
    Some(("sun", "above_horizon")),
    Some(("binary_sensor.hall_motion", "on")),
    Some(("sun", "below_horizon")),
    Some(("binary_sensor.door", "on")),
    Some(("light.porch", "unavailable")),
    Some(("binary_sensor.door", "off")),
    Some(("light.porch", "off")),
    Some(("binary_sensor.hall_motion", "off")),
    Some(("light.hall", "on")),
    None,
];

fn main() -> Result<(), ReactiveError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let mut engine = match std::env::args().nth(1) {
        Some(path) => Engine::from_file(path)?,
        None => Engine::from_yaml(HOUSE)?,
    };
    info!(%engine, "engine built");
    for rule in engine.rules() {
        info!("{rule}");
    }

    let subs = engine.subscriptions();
    info!(inputs = ?subs.inputs, outputs = ?subs.outputs, every = ?subs.interval, "subscribed");

    let mut house = Snapshot::new();
    let report = engine.start(&mut house);
    info!(%report, "startup");

    for step in SCRIPT {
        let event = match *step {
            Some((entity, state)) => {
                let old = house.insert(entity, state);
                Event::state_changed(entity, old.as_deref(), Some(state))
            }
            None => Event::Tick,
        };
        for report in engine.handle(&event, &mut house) {
            info!(%report, "pass");
        }
    }

    for rule in engine.rules() {
        info!(
            output = rule.output(),
            computed = %rule.last_state(),
            actual = house.get(rule.output()).unwrap_or("unknown"),
            "final state"
        );
    }
    Ok(())
}
