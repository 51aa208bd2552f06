mod category;
mod curve;
mod registry;
mod stand;
mod thinning;

pub use category::LineCategory;
pub use curve::{CurveModel, FittedSurface};
pub use registry::{BulkReport, CurveModelRegistry};
pub use stand::StandMetadata;
pub use thinning::{BaseLines, SampledCurve, ThinningEvent, ThinningTrack};
