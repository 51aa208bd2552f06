use crate::error::PlannerError;
use crate::math::arange;
use crate::models::{ThinningEvent, ThinningTrack};

use super::timeline::TimelinePlanner;

impl TimelinePlanner<'_> {
    /// Rebuild the dense density polyline for `timeline`.
    ///
    /// The stand follows the bearing line until the first cut, then Recovery
    /// floored by the minimum logging line. Each cut is drawn as a vertical run
    /// at its grid age from `value_before` down towards `value_after`. The
    /// Recovery start after a cut is chosen so the curve meets the next
    /// event's `value_before`.
    pub fn track(&self, timeline: &[ThinningEvent]) -> Result<ThinningTrack, PlannerError> {
        if timeline.is_empty() {
            return Err(PlannerError::InvalidState(
                "no planned thinnings to draw".to_string(),
            ));
        }

        let grid = &self.base.grid;
        let mut track = ThinningTrack::default();
        let mut continuation = self.bearing_parameter;
        let mut thinning = false;
        let mut next = 0;

        for (i, &x) in grid.iter().enumerate() {
            self.check_cancelled("track reconstruction")?;
            let current = if thinning {
                self.recovery(x, continuation)?.max(self.base.min_logging[i])
            } else {
                self.bearing[i]
            };
            track.push(x, current);

            let Some(event) = timeline.get(next) else {
                continue;
            };
            if x < event.x {
                continue;
            }
            thinning = true;
            next += 1;

            if let Some(following) = timeline.get(next) {
                let candidates = grid[..=i].iter().rev().copied();
                if let Some(age) =
                    self.recovery_search(candidates, following.x, following.value_before)?
                {
                    continuation = age;
                }
            }

            for y in arange(event.value_before, event.value_after, -self.settings.value_step) {
                track.push(x, y);
            }
        }

        Ok(track)
    }
}
