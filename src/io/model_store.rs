use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::PlannerError;
use crate::models::{CurveModel, CurveModelRegistry, FittedSurface, LineCategory, StandMetadata};

/// Persistence of fitted charts, keyed by stand name.
pub trait ModelStore {
    fn save(&self, stand: &StandMetadata, registry: &CurveModelRegistry) -> Result<(), PlannerError>;

    fn load(&self, name: &str) -> Result<(StandMetadata, CurveModelRegistry), PlannerError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredModel {
    category: LineCategory,
    surface: FittedSurface,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredChart {
    stand: StandMetadata,
    models: Vec<StoredModel>,
}

/// One `<name>.json` document per stand in a directory.
#[derive(Debug, Clone)]
pub struct JsonModelStore {
    pub directory: PathBuf,
    pub pretty: bool,
}

impl JsonModelStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            pretty: true,
        }
    }

    /// File backing the chart called `name`.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, PlannerError> {
        let valid = !name.trim().is_empty()
            && !name.contains(['/', '\\'])
            && name != "."
            && name != "..";
        if !valid {
            return Err(PlannerError::InvalidArgument(format!(
                "'{name}' cannot be used as a model name"
            )));
        }
        Ok(self.directory.join(format!("{name}.json")))
    }
}

impl ModelStore for JsonModelStore {
    fn save(&self, stand: &StandMetadata, registry: &CurveModelRegistry) -> Result<(), PlannerError> {
        let path = self.path_for(&stand.name)?;
        let mut models = Vec::new();
        for model in registry.models() {
            match model.surface() {
                Some(surface) => models.push(StoredModel {
                    category: model.category(),
                    surface: surface.clone(),
                }),
                None => warn!(category = %model.category(), "not saving unfitted model"),
            }
        }

        let chart = StoredChart {
            stand: stand.clone(),
            models,
        };
        let content = if self.pretty {
            serde_json::to_string_pretty(&chart)?
        } else {
            serde_json::to_string(&chart)?
        };
        std::fs::create_dir_all(&self.directory)?;
        std::fs::write(&path, content)?;
        info!(path = %path.display(), models = chart.models.len(), "saved chart");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<(StandMetadata, CurveModelRegistry), PlannerError> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(PlannerError::NotFound(format!(
                "no stored chart '{name}' in {}",
                self.directory.display()
            )));
        }
        load_chart_file(&path, Some(name))
    }
}

/// Read a stored chart document, checking its stand name when `expected` is given.
pub fn load_chart_file(
    path: &Path,
    expected: Option<&str>,
) -> Result<(StandMetadata, CurveModelRegistry), PlannerError> {
    let content = std::fs::read_to_string(path)?;
    let chart: StoredChart = serde_json::from_str(&content)?;
    if let Some(expected) = expected {
        if chart.stand.name != expected {
            return Err(PlannerError::InvalidArgument(format!(
                "stored chart is named '{}', expected '{expected}'",
                chart.stand.name
            )));
        }
    }

    let mut registry = CurveModelRegistry::new();
    for stored in chart.models {
        let model = CurveModel::from_surface(stored.category, stored.surface)?;
        registry.add_model(stored.category, model);
    }
    Ok((chart.stand, registry))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted() -> (StandMetadata, CurveModelRegistry) {
        let mut stand = StandMetadata::new("pine_sorrel", 80.0, 100.0);
        let mut registry = CurveModelRegistry::new();
        for k in 1..=4 {
            let s = k as f64 * 0.1;
            let xs: Vec<f64> = (0..=10).map(|i| i as f64 * 10.0).collect();
            let ys: Vec<f64> = xs.iter().map(|x| s + 0.005 * x).collect();
            stand.extend_bounds(LineCategory::Growth, &xs, &ys);
            registry
                .model_or_insert(LineCategory::Growth, 2)
                .append_samples(&xs, &ys, None)
                .unwrap();
        }
        registry.add_model(LineCategory::Recovery, CurveModel::new(LineCategory::Recovery, 2));
        registry.fit_all();
        (stand, registry)
    }

    #[test]
    fn test_save_and_load() {
        let (stand, registry) = fitted();
        let dir = tempfile::tempdir().unwrap();
        let store = JsonModelStore::new(dir.path());
        store.save(&stand, &registry).unwrap();
        assert!(dir.path().join("pine_sorrel.json").exists());

        let (loaded_stand, loaded) = store.load("pine_sorrel").unwrap();
        assert_eq!(loaded_stand, stand);
        assert_eq!(loaded.categories(), vec![LineCategory::Growth]);
        let expected = registry.predict(LineCategory::Growth, 35.0, 0.25).unwrap();
        let actual = loaded.predict(LineCategory::Growth, 35.0, 0.25).unwrap();
        assert!((expected - actual).abs() < 1e-12);
    }

    #[test]
    fn test_load_missing_chart() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonModelStore::new(dir.path());
        assert!(matches!(store.load("absent"), Err(PlannerError::NotFound(_))));
    }

    #[test]
    fn test_load_name_mismatch() {
        let (stand, registry) = fitted();
        let dir = tempfile::tempdir().unwrap();
        let store = JsonModelStore::new(dir.path());
        store.save(&stand, &registry).unwrap();
        std::fs::rename(
            dir.path().join("pine_sorrel.json"),
            dir.path().join("spruce.json"),
        )
        .unwrap();
        assert!(matches!(
            store.load("spruce"),
            Err(PlannerError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rejects_path_like_names() {
        let store = JsonModelStore::new("models");
        assert!(store.path_for("../etc").is_err());
        assert!(store.path_for("").is_err());
        assert!(store.path_for("pine_sorrel").is_ok());
    }
}
