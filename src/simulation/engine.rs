use tracing::{debug, info};

use super::timeline::{closest_candidate, TimelinePlanner};
use super::CancelFlag;
use crate::config::EngineSettings;
use crate::error::PlannerError;
use crate::math::{arange, enforce_non_decreasing};
use crate::models::{
    BaseLines, CurveModelRegistry, LineCategory, SampledCurve, StandMetadata, ThinningEvent,
    ThinningTrack,
};

/// Lines that must have a fitted model before base lines can be sampled.
const BOUND_LINES: [LineCategory; 3] = [
    LineCategory::MinLogging,
    LineCategory::MaxLogging,
    LineCategory::EconomicMin,
];

/// How far a session has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionStage {
    Uninitialized,
    BaseLinesReady,
    BearingReady,
    TimelineReady,
}

/// How the Growth start parameter of the bearing line is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BearingSource {
    /// Pick the start whose Growth curve passes closest to this point.
    Point { x: f64, y: f64 },
    /// Use the given start parameter as is.
    Parameter(f64),
    /// Midway between the minimum and maximum logging lines at the first grid age.
    Midpoint,
}

/// One planning session over a fitted registry.
///
/// The session moves through base lines, the bearing line and the thinning
/// timeline in order; an operation run before its prerequisite stage fails
/// with [`PlannerError::InvalidState`]. Timeline edits are computed on a
/// snapshot and only replace the session state when they fully succeed.
pub struct SimulationEngine<'a> {
    registry: &'a CurveModelRegistry,
    stand: StandMetadata,
    settings: EngineSettings,
    cancel: Option<CancelFlag>,
    base_lines: Option<BaseLines>,
    bearing_parameter: Option<f64>,
    bearing_line: Option<Vec<f64>>,
    timeline: Option<Vec<ThinningEvent>>,
    track: Option<ThinningTrack>,
}

impl<'a> SimulationEngine<'a> {
    pub fn new(
        registry: &'a CurveModelRegistry,
        stand: StandMetadata,
        settings: EngineSettings,
    ) -> Self {
        Self {
            registry,
            stand,
            settings,
            cancel: None,
            base_lines: None,
            bearing_parameter: None,
            bearing_line: None,
            timeline: None,
            track: None,
        }
    }

    /// Poll `flag` during parameter scans and simulation loops.
    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn stage(&self) -> SessionStage {
        match (&self.base_lines, &self.bearing_line, &self.timeline) {
            (None, _, _) => SessionStage::Uninitialized,
            (Some(_), None, _) => SessionStage::BaseLinesReady,
            (Some(_), Some(_), None) => SessionStage::BearingReady,
            (Some(_), Some(_), Some(_)) => SessionStage::TimelineReady,
        }
    }

    pub fn registry(&self) -> &CurveModelRegistry {
        self.registry
    }

    pub fn stand(&self) -> &StandMetadata {
        &self.stand
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Switch the protective forest mode used by later simulations and pruning.
    pub fn set_protective(&mut self, protective: bool) {
        self.stand.set_protective(protective);
    }

    fn check_cancelled(&self, during: &str) -> Result<(), PlannerError> {
        match &self.cancel {
            Some(flag) => flag.check(during),
            None => Ok(()),
        }
    }

    fn require_base_lines(&self) -> Result<&BaseLines, PlannerError> {
        self.base_lines.as_ref().ok_or_else(|| {
            PlannerError::InvalidState("base lines are not initialized".to_string())
        })
    }

    fn planner(&self) -> Result<TimelinePlanner<'_>, PlannerError> {
        let base = self.require_base_lines()?;
        let bearing = self.bearing_line.as_deref().ok_or_else(|| {
            PlannerError::InvalidState("bearing line is not initialized".to_string())
        })?;
        let bearing_parameter = self.bearing_parameter.ok_or_else(|| {
            PlannerError::InvalidState("bearing parameter is not set".to_string())
        })?;
        Ok(TimelinePlanner {
            registry: self.registry,
            stand: &self.stand,
            settings: &self.settings,
            cancel: self.cancel.as_ref(),
            base,
            bearing,
            bearing_parameter,
        })
    }

    fn drop_derived(&mut self) {
        self.bearing_line = None;
        self.timeline = None;
        self.track = None;
    }

    /// Sample the minimum logging, maximum logging and economic minimum lines
    /// on a fresh grid.
    ///
    /// The grid runs from `x_start` (default `x_min`) to `x_end` (default
    /// `x_max`) in steps of `step` (default from the settings). Each line is
    /// repaired to be non-decreasing; below the economic threshold the
    /// economic minimum is lifted to the maximum logging line. Anything derived
    /// from older base lines is discarded, the bearing parameter is kept.
    pub fn initialize_base_lines(
        &mut self,
        x_start: Option<f64>,
        x_end: Option<f64>,
        step: Option<f64>,
    ) -> Result<&BaseLines, PlannerError> {
        for category in BOUND_LINES {
            if !self.registry.contains(category) {
                return Err(PlannerError::NotFound(format!(
                    "base lines need a {category} model"
                )));
            }
        }

        let (x_min, x_max) = self.stand.x_bounds()?;
        let start = x_start.unwrap_or(x_min);
        let end = x_end.unwrap_or(x_max);
        let step = step.unwrap_or(self.settings.grid_step);
        if !(step.is_finite() && step > 0.0) {
            return Err(PlannerError::InvalidArgument(format!(
                "grid step must be positive, got {step}"
            )));
        }
        if !(start.is_finite() && end.is_finite() && start < end) {
            return Err(PlannerError::InvalidArgument(format!(
                "invalid grid range: start {start}, end {end}"
            )));
        }

        let grid = arange(start, end + step, step);
        let sample = |category: LineCategory| -> Result<Vec<f64>, PlannerError> {
            let mut values = self.registry.predict_many(category, &grid, 0.0)?;
            enforce_non_decreasing(&mut values);
            Ok(values)
        };
        let min_logging = sample(LineCategory::MinLogging)?;
        let max_logging = sample(LineCategory::MaxLogging)?;
        let mut economic_min = sample(LineCategory::EconomicMin)?;

        let economic_from = self.stand.economic_threshold()?;
        for (value, (&x, &ceiling)) in economic_min
            .iter_mut()
            .zip(grid.iter().zip(max_logging.iter()))
        {
            if x < economic_from {
                *value = ceiling;
            }
        }

        info!(
            stand = %self.stand.name,
            points = grid.len(),
            start,
            end,
            step,
            "initialized base lines"
        );
        self.drop_derived();
        Ok(self.base_lines.insert(BaseLines {
            grid,
            min_logging,
            max_logging,
            economic_min,
        }))
    }

    /// Choose the Growth start parameter of the bearing line.
    ///
    /// With [`BearingSource::Point`] the candidates run from the minimum to the
    /// maximum logging value at the first grid age in `value_step`
    /// increments; the first candidate with the smallest error at the point
    /// wins. Any existing bearing line and timeline are discarded.
    pub fn set_bearing_parameter(&mut self, source: BearingSource) -> Result<f64, PlannerError> {
        let base = self.require_base_lines()?;
        let low = base.min_logging[0];
        let high = base.max_logging[0];

        let parameter = match source {
            BearingSource::Parameter(p) => {
                if !p.is_finite() {
                    return Err(PlannerError::InvalidArgument(format!(
                        "bearing parameter must be finite, got {p}"
                    )));
                }
                p
            }
            BearingSource::Midpoint => (low + high) / 2.0,
            BearingSource::Point { x, y } => {
                if !(x.is_finite() && y.is_finite()) {
                    return Err(PlannerError::InvalidArgument(format!(
                        "bearing point must be finite, got ({x}, {y})"
                    )));
                }
                self.registry.get_model(LineCategory::Growth)?;
                let candidates = arange(low, high, self.settings.value_step);
                let found = closest_candidate(candidates, false, |candidate| {
                    self.check_cancelled("bearing parameter search")?;
                    let predicted = self.registry.predict(LineCategory::Growth, x, candidate)?;
                    Ok((predicted - y).abs())
                })?;
                let (best, min_diff) = found.unwrap_or((low, f64::INFINITY));
                debug!(x, y, parameter = best, error = min_diff, "bearing parameter from point");
                best
            }
        };

        self.bearing_parameter = Some(parameter);
        self.drop_derived();
        Ok(parameter)
    }

    /// Sample the Growth curve at the bearing parameter on the grid.
    ///
    /// Falls back to [`BearingSource::Midpoint`] when no parameter was set;
    /// the fallback is stored only together with a successfully sampled line.
    /// Drops the current timeline.
    pub fn initialize_bearing_line(&mut self) -> Result<&[f64], PlannerError> {
        let base = self.require_base_lines()?;
        let parameter = self
            .bearing_parameter
            .unwrap_or_else(|| (base.min_logging[0] + base.max_logging[0]) / 2.0);
        let mut line = self
            .registry
            .predict_many(LineCategory::Growth, &base.grid, parameter)?;
        enforce_non_decreasing(&mut line);

        info!(parameter, points = line.len(), "initialized bearing line");
        self.bearing_parameter = Some(parameter);
        self.timeline = None;
        self.track = None;
        Ok(self.bearing_line.insert(line).as_slice())
    }

    /// Simulate cuts forward from `start_date` (or from the start of the grid).
    ///
    /// The first simulation of a session becomes the session timeline; later
    /// calls only return their result.
    pub fn simulate_thinning(
        &mut self,
        start_date: Option<f64>,
        parameter: Option<f64>,
    ) -> Result<Vec<ThinningEvent>, PlannerError> {
        let (events, track) = {
            let planner = self.planner()?;
            let events = planner.simulate(start_date, parameter)?;
            let track = match self.timeline {
                Some(_) => None,
                None => Some(planner.track(&events)?),
            };
            (events, track)
        };

        debug!(?start_date, ?parameter, events = events.len(), "simulated thinning");
        if let Some(track) = track {
            self.timeline = Some(events.clone());
            self.track = Some(track);
        }
        Ok(events)
    }

    fn apply_edit<F>(&mut self, allow_empty: bool, edit: F) -> Result<(), PlannerError>
    where
        F: FnOnce(&TimelinePlanner<'_>, &[ThinningEvent]) -> Result<Vec<ThinningEvent>, PlannerError>,
    {
        let (events, track) = {
            let planner = self.planner()?;
            let current: &[ThinningEvent] = match self.timeline.as_deref() {
                Some(events) => events,
                None if allow_empty => &[],
                None => {
                    return Err(PlannerError::InvalidState(
                        "no thinning timeline; simulate thinning first".to_string(),
                    ))
                }
            };
            let events = edit(&planner, current)?;
            let track = planner.track(&events)?;
            (events, track)
        };

        debug!(
            events = events.len(),
            track_points = track.len(),
            "committed thinning timeline"
        );
        self.timeline = Some(events);
        self.track = Some(track);
        Ok(())
    }

    /// Insert a cut at `date` from density `value` and re-plan everything after it.
    pub fn add_thinning(&mut self, date: f64, value: f64) -> Result<(), PlannerError> {
        self.apply_edit(true, |planner, current| {
            planner.with_added(current, date, value)
        })
    }

    /// Change what the cut at `date` leaves standing and re-plan everything after it.
    pub fn correct_thinning(&mut self, date: f64, value_after: f64) -> Result<(), PlannerError> {
        self.apply_edit(false, |planner, current| {
            planner.with_corrected(current, date, value_after)
        })
    }

    /// Remove the cut at `index`. The terminal event cannot be removed.
    pub fn delete_thinning(&mut self, index: usize) -> Result<(), PlannerError> {
        self.apply_edit(false, |planner, current| planner.without(current, index))
    }

    /// Overwrite the event at `index` and re-plan from its age.
    pub fn rewrite_thinning(
        &mut self,
        index: usize,
        event: ThinningEvent,
    ) -> Result<(), PlannerError> {
        self.apply_edit(false, |planner, current| {
            planner.rewritten(current, index, event)
        })
    }

    /// Drop trailing cuts beyond the protective age limit.
    pub fn check_save_forest(&mut self) -> Result<(), PlannerError> {
        self.apply_edit(false, |planner, current| planner.pruned(current))
    }

    /// Rebuild the density polyline from the current timeline.
    pub fn initialize_track(&mut self) -> Result<&ThinningTrack, PlannerError> {
        let track = {
            let planner = self.planner()?;
            let events = self.timeline.as_deref().ok_or_else(|| {
                PlannerError::InvalidState("no thinning timeline to draw".to_string())
            })?;
            planner.track(events)?
        };
        Ok(self.track.insert(track))
    }

    /// Run the whole pipeline with default grid settings and return the timeline.
    pub fn plan(&mut self, bearing: BearingSource) -> Result<&[ThinningEvent], PlannerError> {
        self.initialize_base_lines(None, None, None)?;
        self.set_bearing_parameter(bearing)?;
        self.initialize_bearing_line()?;
        self.simulate_thinning(None, None)?;
        self.timeline()
    }

    pub fn base_lines(&self) -> Result<&BaseLines, PlannerError> {
        self.require_base_lines()
    }

    pub fn bearing_parameter(&self) -> Result<f64, PlannerError> {
        self.bearing_parameter.ok_or_else(|| {
            PlannerError::InvalidState("bearing parameter is not set".to_string())
        })
    }

    pub fn bearing_curve(&self) -> Result<SampledCurve, PlannerError> {
        let base = self.require_base_lines()?;
        let line = self.bearing_line.as_ref().ok_or_else(|| {
            PlannerError::InvalidState("bearing line is not initialized".to_string())
        })?;
        Ok(SampledCurve {
            x: base.grid.clone(),
            y: line.clone(),
        })
    }

    pub fn timeline(&self) -> Result<&[ThinningEvent], PlannerError> {
        self.timeline.as_deref().ok_or_else(|| {
            PlannerError::InvalidState("thinning timeline is not initialized".to_string())
        })
    }

    pub fn track(&self) -> Result<&ThinningTrack, PlannerError> {
        self.track.as_ref().ok_or_else(|| {
            PlannerError::InvalidState("thinning track is not initialized".to_string())
        })
    }
}
