mod alias;
mod compile;
mod config;
mod error;
mod evaluate;
pub mod host;
pub mod parse;
mod types;

pub use alias::AliasTable;
pub use config::Config;
pub use error::ReactiveError;
pub use evaluate::evaluate;
pub use host::{Actuator, Command, Event, Host, StateProvider, Subscriptions};
pub use types::{
    entity, AliasError, BinaryOp, BuildError, Engine, EngineBuilder, EntityExpr, Expr,
    OutputBuilder, OutputRule, PassReport, Snapshot, StateCache, TriState, Trigger,
    DEFAULT_EXPECTED, DEFAULT_RESYNC_INTERVAL, MAX_DEPTH,
};
