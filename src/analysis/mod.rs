mod fit_quality;

pub use fit_quality::{check_fit, FitReport, Inflection, SeriesFit, INFLECTION_THRESHOLD};
