mod cancel;
mod engine;
mod timeline;
mod track;

#[cfg(test)]
pub(crate) mod fixtures;
#[cfg(test)]
pub(crate) mod synthetic_chart;

pub use cancel::CancelFlag;
pub use engine::{BearingSource, SessionStage, SimulationEngine};
