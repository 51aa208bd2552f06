use serde::{Deserialize, Serialize};

/// A planned cut from `value_before` down to `value_after` at age `x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThinningEvent {
    pub x: f64,
    pub value_before: f64,
    pub value_after: f64,
}

impl ThinningEvent {
    pub fn new(x: f64, value_before: f64, value_after: f64) -> Self {
        Self {
            x,
            value_before,
            value_after,
        }
    }

    /// Density removed by this cut.
    pub fn removed(&self) -> f64 {
        self.value_before - self.value_after
    }
}

/// One curve sampled on the simulation grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledCurve {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// The three density bounds sampled on a shared grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseLines {
    pub grid: Vec<f64>,
    pub min_logging: Vec<f64>,
    pub max_logging: Vec<f64>,
    pub economic_min: Vec<f64>,
}

impl BaseLines {
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Last grid age, the end of the simulated horizon.
    pub fn horizon(&self) -> Option<f64> {
        self.grid.last().copied()
    }

    /// Index of the first grid age `>= x`.
    pub fn first_at_or_after(&self, x: f64) -> Option<usize> {
        self.grid.iter().position(|&g| g >= x)
    }
}

/// Dense polyline of the planned stand density, cuts drawn as vertical runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThinningTrack {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl ThinningTrack {
    pub fn push(&mut self, x: f64, y: f64) {
        self.x.push(x);
        self.y.push(y);
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_removed() {
        let event = ThinningEvent::new(40.0, 0.7, 0.3);
        assert!((event.removed() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_first_at_or_after() {
        let lines = BaseLines {
            grid: vec![0.0, 0.5, 1.0],
            min_logging: vec![0.2; 3],
            max_logging: vec![0.8; 3],
            economic_min: vec![0.5; 3],
        };
        assert_eq!(lines.first_at_or_after(0.2), Some(1));
        assert_eq!(lines.first_at_or_after(1.0), Some(2));
        assert_eq!(lines.first_at_or_after(1.1), None);
        assert_eq!(lines.horizon(), Some(1.0));
    }

    #[test]
    fn test_track_points() {
        let mut track = ThinningTrack::default();
        track.push(1.0, 0.5);
        track.push(1.0, 0.4);
        assert_eq!(track.len(), 2);
        assert_eq!(track.points().collect::<Vec<_>>(), vec![(1.0, 0.5), (1.0, 0.4)]);
    }
}
