use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::SampleSeries;
use crate::error::PlannerError;
use crate::models::LineCategory;

/// Top level of a plot digitizer project file.
#[derive(Debug, Deserialize)]
struct DigitizerProject {
    #[serde(rename = "datasetColl")]
    datasets: Vec<Dataset>,
}

#[derive(Debug, Deserialize)]
struct Dataset {
    name: String,
    #[serde(default)]
    data: Vec<DigitizedPoint>,
}

#[derive(Debug, Deserialize)]
struct DigitizedPoint {
    value: Vec<f64>,
}

fn parse_project(project: DigitizerProject) -> Result<Vec<SampleSeries>, PlannerError> {
    let mut datasets = project.datasets;
    datasets.sort_by(|a, b| a.name.cmp(&b.name));

    let mut series = Vec::new();
    for dataset in datasets {
        let category = match dataset.name.parse::<LineCategory>() {
            Ok(category) if category.is_loadable() => category,
            Ok(category) => {
                debug!(name = %dataset.name, %category, "skipping line not used for planning");
                continue;
            }
            Err(_) => {
                debug!(name = %dataset.name, "skipping unrecognized line");
                continue;
            }
        };
        if dataset.data.is_empty() {
            debug!(name = %dataset.name, "skipping empty line");
            continue;
        }

        let mut x = Vec::with_capacity(dataset.data.len());
        let mut y = Vec::with_capacity(dataset.data.len());
        for (i, point) in dataset.data.iter().enumerate() {
            match point.value.as_slice() {
                [px, py] => {
                    x.push(*px);
                    y.push(*py);
                }
                other => {
                    return Err(PlannerError::ParseError(format!(
                        "'{}' point {i}: expected [x, y], got {} values",
                        dataset.name,
                        other.len()
                    )))
                }
            }
        }
        series.push(SampleSeries {
            name: dataset.name,
            category,
            x,
            y,
        });
    }
    Ok(series)
}

/// Read the loadable lines of a digitizer project file.
///
/// Lines are returned in name order; lines of unknown or unused categories
/// are skipped.
pub fn read_digitizer(path: impl AsRef<Path>) -> Result<Vec<SampleSeries>, PlannerError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let project: DigitizerProject = serde_json::from_str(&content)?;
    parse_project(project)
}

/// Read the loadable lines of a digitizer project from raw bytes.
pub fn read_digitizer_from_bytes(data: &[u8]) -> Result<Vec<SampleSeries>, PlannerError> {
    let content = std::str::from_utf8(data)
        .map_err(|e| PlannerError::ParseError(format!("Invalid UTF-8: {e}")))?;
    let project: DigitizerProject = serde_json::from_str(content)?;
    parse_project(project)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = r#"{
        "version": [4, 2],
        "datasetColl": [
            {"name": "recovery line 2", "data": [{"x": 1, "y": 2, "value": [40.0, 0.3]}, {"value": [60.0, 0.5]}]},
            {"name": "min level logging", "data": [{"value": [0.0, 0.2]}, {"value": [100.0, 0.25]}]},
            {"name": "standard growth line", "data": [{"value": [0.0, 0.4]}]},
            {"name": "legend", "data": [{"value": [1.0, 1.0]}]},
            {"name": "growth line 1", "data": [{"value": [0.0, 0.5]}, {"value": [50.0, 0.8]}]}
        ]
    }"#;

    #[test]
    fn test_reads_loadable_lines_in_name_order() {
        let series = read_digitizer_from_bytes(PROJECT.as_bytes()).unwrap();
        let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["growth line 1", "min level logging", "recovery line 2"]
        );
        assert_eq!(series[0].category, LineCategory::Growth);
        assert_eq!(series[2].category, LineCategory::Recovery);
        assert_eq!(series[2].x, vec![40.0, 60.0]);
        assert_eq!(series[2].y, vec![0.3, 0.5]);
    }

    #[test]
    fn test_missing_dataset_collection() {
        let err = read_digitizer_from_bytes(br#"{"version": [4, 2]}"#).unwrap_err();
        assert!(matches!(err, PlannerError::Json(_)));
    }

    #[test]
    fn test_malformed_point() {
        let data = br#"{"datasetColl": [{"name": "growth line 1", "data": [{"value": [1.0]}]}]}"#;
        assert!(matches!(
            read_digitizer_from_bytes(data),
            Err(PlannerError::ParseError(_))
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        assert!(matches!(
            read_digitizer_from_bytes(&[0xff, 0xfe]),
            Err(PlannerError::ParseError(_))
        ));
    }
}
