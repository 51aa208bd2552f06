pub mod analysis;
pub mod config;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
pub mod simulation;
pub mod visualization;

pub use config::EngineSettings;
pub use error::PlannerError;
pub use io::{ModelStore, SeriesReader};
pub use models::{CurveModel, CurveModelRegistry, LineCategory, StandMetadata, ThinningEvent};
pub use simulation::{BearingSource, CancelFlag, SessionStage, SimulationEngine};
