//! Built-in edge-event sources.
//!
//! Both are software stand-ins for a hardware edge line: `clock_edge` makes
//! real scheduler wakeups into edges, `synthetic` replays a scripted or
//! randomized timestamp sequence. A GPIO-backed source is an external
//! integration; anything implementing
//! [`EdgeSource`](crate::source::EdgeSource) slots into the same pipelines.

mod clock;
mod synthetic;

pub use clock::ClockEdgeSource;
pub use synthetic::SyntheticEdgeSource;

use crate::source::EdgeSource;

/// All registered sources, in listing order.
pub fn available_sources() -> Vec<Box<dyn EdgeSource>> {
    vec![
        Box::new(ClockEdgeSource::new()),
        Box::new(SyntheticEdgeSource::default_jittered()),
    ]
}

/// Look up a registered source by its exact name.
pub fn source_by_name(name: &str) -> Option<Box<dyn EdgeSource>> {
    match name {
        "clock_edge" => Some(Box::new(ClockEdgeSource::new())),
        "synthetic" => Some(Box::new(SyntheticEdgeSource::default_jittered())),
        _ => None,
    }
}
