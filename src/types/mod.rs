mod cache;
mod engine;
mod error;
mod expr;
mod report;
mod rule;
mod snapshot;

pub use cache::StateCache;
pub(crate) use engine::OutputDef;
pub use engine::{Engine, EngineBuilder, OutputBuilder, DEFAULT_RESYNC_INTERVAL};
pub use error::{AliasError, BuildError};
pub use expr::{entity, BinaryOp, EntityExpr, Expr, DEFAULT_EXPECTED, MAX_DEPTH};
pub use report::{PassReport, Trigger};
pub use rule::{OutputRule, TriState};
pub use snapshot::Snapshot;
