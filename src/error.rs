use thiserror::Error;

use crate::parse::ParseError;
use crate::BuildError;

/// Anything that can go wrong between a configuration file and a running engine.
///
/// [`Engine::from_yaml()`](crate::Engine::from_yaml) and
/// [`Engine::from_file()`](crate::Engine::from_file) return this; the lower-level
/// builders return [`BuildError`] directly. A bare [`ParseError`] from
/// [`parse()`](crate::parse::parse) converts as well, so host code can check
/// ad-hoc expressions next to loading its configuration:
///
/// ```
/// use reactive_rules::parse::parse;
/// use reactive_rules::{Engine, ReactiveError};
///
/// /// Entities in `expr` that no rule of the engine listens to.
/// fn unwatched(engine: &Engine, expr: &str) -> Result<Vec<String>, ReactiveError> {
///     let watched = engine.input_entities();
///     Ok(parse(expr)?
///         .entities()
///         .into_iter()
///         .filter(|e| !watched.contains(e))
///         .map(str::to_owned)
///         .collect())
/// }
///
/// let engine = Engine::from_yaml("outputs:\n  light.a: [sensor.x]\n")?;
/// assert_eq!(unwatched(&engine, "sensor.x & sensor.y")?, ["sensor.y"]);
/// assert!(matches!(
///     unwatched(&engine, "sensor.x &"),
///     Err(ReactiveError::Parse(_))
/// ));
/// # Ok::<(), ReactiveError>(())
/// ```
#[derive(Debug, Error)]
pub enum ReactiveError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
