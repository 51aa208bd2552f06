//! Timeline algorithms over a fixed set of sampled curves.
//!
//! Every edit here is a pure function from the current event list to a new
//! one. The engine commits the result only when the whole edit, including the
//! track rebuild, succeeded.

use crate::config::EngineSettings;
use crate::error::PlannerError;
use crate::models::{BaseLines, CurveModelRegistry, LineCategory, StandMetadata, ThinningEvent};

use super::CancelFlag;

/// Ages closer than this are treated as the same event date.
pub(crate) const DATE_TOLERANCE: f64 = 1e-9;

/// Borrowed view of a session's curves, enough to simulate and edit timelines.
pub(crate) struct TimelinePlanner<'a> {
    pub registry: &'a CurveModelRegistry,
    pub stand: &'a StandMetadata,
    pub settings: &'a EngineSettings,
    pub cancel: Option<&'a CancelFlag>,
    pub base: &'a BaseLines,
    pub bearing: &'a [f64],
    pub bearing_parameter: f64,
}

/// Conditions under which the simulation schedules a cut.
struct ThinRule {
    economic_from: f64,
    cutting_limit: f64,
}

impl ThinRule {
    fn applies(&self, x: f64, current: f64, bearing: f64, economic_min: f64) -> bool {
        current >= bearing
            && x > self.economic_from
            && current >= economic_min
            && x <= self.cutting_limit
    }
}

/// Scan `candidates` in order for the smallest `error`, keeping the first of
/// equal minima. With `stop_when_worse` the scan ends at the first candidate
/// that does not strictly improve on the best so far.
pub(crate) fn closest_candidate<I, F>(
    candidates: I,
    stop_when_worse: bool,
    mut error: F,
) -> Result<Option<(f64, f64)>, PlannerError>
where
    I: IntoIterator<Item = f64>,
    F: FnMut(f64) -> Result<f64, PlannerError>,
{
    let mut best: Option<(f64, f64)> = None;
    for candidate in candidates {
        let diff = error(candidate)?;
        let min_diff = best.map_or(f64::INFINITY, |(_, d)| d);
        if diff < min_diff {
            best = Some((candidate, diff));
        } else if stop_when_worse {
            break;
        }
    }
    Ok(best)
}

impl TimelinePlanner<'_> {
    pub(crate) fn check_cancelled(&self, during: &str) -> Result<(), PlannerError> {
        match self.cancel {
            Some(flag) => flag.check(during),
            None => Ok(()),
        }
    }

    pub(crate) fn recovery(&self, x: f64, cut_age: f64) -> Result<f64, PlannerError> {
        self.registry.predict(LineCategory::Recovery, x, cut_age)
    }

    fn horizon(&self) -> Result<(usize, f64), PlannerError> {
        let horizon = self
            .base
            .horizon()
            .ok_or_else(|| PlannerError::InvalidState("simulation grid is empty".to_string()))?;
        Ok((self.base.len() - 1, horizon))
    }

    /// Forward simulation of cuts over the grid.
    ///
    /// Without `start_date` the stand follows the bearing line from the start
    /// of the grid. With one, the stand is taken as just cut: it follows the
    /// Recovery curve started at `parameter` (or at the first grid age
    /// `>= start_date`). Every cut restarts Recovery at its own age. The list
    /// always ends with a terminal event at the last grid age whose
    /// `value_after` is the configured sentinel.
    pub fn simulate(
        &self,
        start_date: Option<f64>,
        parameter: Option<f64>,
    ) -> Result<Vec<ThinningEvent>, PlannerError> {
        let grid = &self.base.grid;
        let offset = match start_date {
            None => 0,
            Some(date) => self.base.first_at_or_after(date).unwrap_or(grid.len()),
        };
        let continuation = match start_date {
            None => self.bearing_parameter,
            Some(date) => parameter.unwrap_or_else(|| grid.get(offset).copied().unwrap_or(date)),
        };
        self.run_from(offset, start_date.is_some(), continuation)
    }

    /// Simulate the stand after a cut at `date` whose Recovery starts at
    /// `continuation`. The scan begins at the first grid age strictly after
    /// `date`, so the cut itself is never re-evaluated.
    pub fn simulate_after(
        &self,
        date: f64,
        continuation: f64,
    ) -> Result<Vec<ThinningEvent>, PlannerError> {
        let offset = self
            .base
            .grid
            .iter()
            .position(|&x| x > date + DATE_TOLERANCE)
            .unwrap_or(self.base.len());
        self.run_from(offset, true, continuation)
    }

    fn run_from(
        &self,
        offset: usize,
        mut thinning: bool,
        mut continuation: f64,
    ) -> Result<Vec<ThinningEvent>, PlannerError> {
        let (last, horizon) = self.horizon()?;
        let grid = &self.base.grid;
        let rule = ThinRule {
            economic_from: self.stand.economic_threshold()?,
            cutting_limit: self.stand.cutting_limit(),
        };
        let mut events = Vec::new();

        // The last grid age is reserved for the terminal event.
        for i in offset..last {
            let x = grid[i];
            if x > self.stand.age_thinning {
                break;
            }
            self.check_cancelled("thinning simulation")?;

            let bearing = self.bearing[i];
            let floor = self.base.min_logging[i];
            let current = if thinning {
                self.recovery(x, continuation)?
            } else {
                bearing
            }
            .max(floor);

            if rule.applies(x, current, bearing, self.base.economic_min[i]) {
                events.push(ThinningEvent::new(x, current, floor));
                thinning = true;
                continuation = x;
            }
        }

        let closing = if thinning {
            self.recovery(horizon, continuation)?
        } else {
            self.bearing[last]
        }
        .max(self.base.min_logging[last]);
        events.push(ThinningEvent::new(
            horizon,
            closing,
            self.settings.terminal_sentinel,
        ));

        Ok(events)
    }

    /// Backward local search for the Recovery start age that reproduces
    /// `target_y` at `target_x`.
    ///
    /// Candidates are visited in the order given; the scan stops at the first
    /// candidate that does not strictly improve the error, so on an error
    /// profile with several minima only the nearest one is found.
    pub fn recovery_search<I>(
        &self,
        candidates: I,
        target_x: f64,
        target_y: f64,
    ) -> Result<Option<f64>, PlannerError>
    where
        I: IntoIterator<Item = f64>,
    {
        let found = closest_candidate(candidates, true, |candidate| {
            self.check_cancelled("recovery parameter search")?;
            Ok((self.recovery(target_x, candidate)? - target_y).abs())
        })?;
        Ok(found.map(|(candidate, _)| candidate))
    }

    /// Insert a cut at `date` and re-derive every later event.
    pub fn with_added(
        &self,
        timeline: &[ThinningEvent],
        date: f64,
        value: f64,
    ) -> Result<Vec<ThinningEvent>, PlannerError> {
        let (_, horizon) = self.horizon()?;
        let first = self.base.grid[0];
        if !(date >= first && date < horizon) {
            return Err(PlannerError::InvalidArgument(format!(
                "thinning age {date} is outside the planning range [{first}, {horizon})"
            )));
        }
        if !value.is_finite() {
            return Err(PlannerError::InvalidArgument(format!(
                "thinning value must be finite, got {value}"
            )));
        }

        let cut_index = self.base.first_at_or_after(date).ok_or_else(|| {
            PlannerError::InvalidArgument(format!("no grid age at or after {date}"))
        })?;
        let value_after = self.base.min_logging[cut_index];

        let keep = timeline
            .iter()
            .position(|e| e.x >= date)
            .unwrap_or(timeline.len());
        let mut events = timeline[..keep].to_vec();
        events.push(ThinningEvent::new(date, value, value_after));

        let continuation = self.base.grid[cut_index];
        events.extend(self.simulate_after(date, continuation)?);
        Ok(events)
    }

    /// Change the density left by the cut at `date` and re-derive later events.
    pub fn with_corrected(
        &self,
        timeline: &[ThinningEvent],
        date: f64,
        value_after: f64,
    ) -> Result<Vec<ThinningEvent>, PlannerError> {
        let index = timeline
            .iter()
            .position(|e| (e.x - date).abs() <= DATE_TOLERANCE)
            .ok_or_else(|| PlannerError::NotFound(format!("no thinning planned at age {date}")))?;
        if index + 1 == timeline.len() {
            return Err(PlannerError::InvalidArgument(
                "the terminal event closes the horizon and cannot be corrected".to_string(),
            ));
        }
        let date = timeline[index].x;

        let candidates = self
            .base
            .grid
            .iter()
            .rev()
            .copied()
            .skip_while(|&x| x >= date);
        let continuation = self
            .recovery_search(candidates, date, value_after)?
            .unwrap_or(date);

        let mut events = timeline[..=index].to_vec();
        events[index].value_after = value_after;
        events.extend(self.simulate_after(date, continuation)?);
        Ok(events)
    }

    /// Remove the cut at `index`; the following event's `value_before` is
    /// re-predicted from whatever growth precedes it now.
    pub fn without(
        &self,
        timeline: &[ThinningEvent],
        index: usize,
    ) -> Result<Vec<ThinningEvent>, PlannerError> {
        if index >= timeline.len() {
            return Err(PlannerError::InvalidArgument(format!(
                "index {index} out of range for {} events",
                timeline.len()
            )));
        }
        if index + 1 == timeline.len() {
            return Err(PlannerError::InvalidArgument(
                "the terminal event cannot be deleted".to_string(),
            ));
        }

        let next = timeline[index + 1];
        let value_before = if index == 0 {
            self.registry
                .predict(LineCategory::Growth, next.x, self.bearing_parameter)?
        } else {
            self.recovery(next.x, timeline[index - 1].x)?
        };

        let mut events = timeline.to_vec();
        events.remove(index);
        events[index] = ThinningEvent::new(next.x, value_before, next.value_after);
        Ok(events)
    }

    /// Replace the event at `index`, then re-plan from its age as if it had been added.
    pub fn rewritten(
        &self,
        timeline: &[ThinningEvent],
        index: usize,
        event: ThinningEvent,
    ) -> Result<Vec<ThinningEvent>, PlannerError> {
        if index >= timeline.len() {
            return Err(PlannerError::InvalidArgument(format!(
                "index {index} out of range for {} events",
                timeline.len()
            )));
        }
        let mut events = timeline.to_vec();
        events[index] = event;
        self.with_added(&events, event.x, event.value_before)
    }

    /// Drop trailing cuts past the active age limit, keeping the terminal
    /// event and at least one cut.
    pub fn pruned(&self, timeline: &[ThinningEvent]) -> Result<Vec<ThinningEvent>, PlannerError> {
        if timeline.len() < 2 {
            return Err(PlannerError::InvalidState(format!(
                "protective pruning needs at least 2 events, timeline has {}",
                timeline.len()
            )));
        }
        let limit = self.stand.cutting_limit();
        let mut events = timeline.to_vec();
        while events.len() > 2 && events[events.len() - 2].x > limit {
            events.remove(events.len() - 2);
        }
        Ok(events)
    }
}
