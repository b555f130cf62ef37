//! Time-to-position mapping for the day-schedule grid.
//!
//! Events and the current-time marker are both expressed as fractional
//! offsets into a fixed visible window, then normalized to `[0, 1]`.
//! The rendering layer scales those fractions to whatever area it has;
//! nothing in here knows about rows, pixels, or widgets.

use chrono::{NaiveTime, Timelike};

use crate::model::{EventColor, PlannerError, ScheduledEvent};

/// Minute granularity of the add-event form selectors.
pub const MINUTE_STEP: u32 = 15;

/// The visible span of the schedule grid, in whole hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for TimeWindow {
    fn default() -> Self {
        TimeWindow {
            start_hour: 8,
            end_hour: 20,
        }
    }
}

impl TimeWindow {
    pub fn new(start_hour: u32, end_hour: u32) -> Option<Self> {
        if end_hour > start_hour {
            Some(TimeWindow {
                start_hour,
                end_hour,
            })
        } else {
            None
        }
    }

    /// Window length in hours.
    pub fn span(&self) -> f64 {
        f64::from(self.end_hour - self.start_hour)
    }

    /// Fractional hours since `start_hour`. Callers are expected to pass
    /// times drawn from the selectable sets; out-of-window inputs are not
    /// clamped here.
    pub fn offset(&self, hour: u32, minute: u32) -> f64 {
        f64::from(hour) - f64::from(self.start_hour) + f64::from(minute) / 60.0
    }

    /// Maps an offset to `[0, 1]` within the window. Shared by event
    /// edges and the current-time marker.
    pub fn normalized(&self, offset: f64) -> f64 {
        offset / self.span()
    }

    /// Normalized position of the current-time marker, or `None` when
    /// the time falls outside the window and no marker should be drawn.
    pub fn marker(&self, now: NaiveTime) -> Option<f64> {
        let hour = now.hour();
        if hour >= self.start_hour && hour < self.end_hour {
            Some(self.normalized(self.offset(hour, now.minute())))
        } else {
            None
        }
    }

    /// Hours offered by the form selectors: every hour that can start an
    /// event, i.e. all but the window's closing hour.
    pub fn selectable_hours(&self) -> Vec<u32> {
        (self.start_hour..self.end_hour).collect()
    }

    pub fn selectable_minutes(&self) -> Vec<u32> {
        (0..60).step_by(MINUTE_STEP as usize).collect()
    }

    /// Inverse of `offset`, used when writing `HH:MM` strings back out.
    pub fn clock_of(&self, offset: f64) -> (u32, u32) {
        let minutes = (offset * 60.0).round() as i64;
        let hour = self.start_hour as i64 + minutes.div_euclid(60);
        (hour as u32, minutes.rem_euclid(60) as u32)
    }
}

/// The one business rule: an event must end after it starts. Equal or
/// inverted bounds are rejected outright, never clamped.
pub fn validate_range(start: f64, end: f64) -> Result<(), PlannerError> {
    if start >= end {
        return Err(PlannerError::InvalidRange);
    }
    Ok(())
}

/// View descriptor for one event: vertical placement as fractions of the
/// schedule area. Produced here, consumed verbatim by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct EventBlock {
    pub top: f64,
    pub height: f64,
    pub label: String,
    pub color: EventColor,
}

/// Maps events to view descriptors in insertion order. Overlap is
/// allowed; blocks rendered later cover earlier ones.
pub fn layout_events(window: &TimeWindow, events: &[ScheduledEvent]) -> Vec<EventBlock> {
    events
        .iter()
        .map(|event| {
            let top = window.normalized(event.start);
            EventBlock {
                top,
                height: window.normalized(event.end) - top,
                label: event.title.clone(),
                color: event.color,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> TimeWindow {
        TimeWindow::new(8, 20).unwrap()
    }

    fn t(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn window_requires_positive_span() {
        assert!(TimeWindow::new(8, 8).is_none());
        assert!(TimeWindow::new(20, 8).is_none());
        assert_eq!(TimeWindow::default(), window());
    }

    #[test]
    fn offset_is_monotonic_over_the_window() {
        let w = window();
        let mut prev = f64::NEG_INFINITY;
        for hour in w.start_hour..=w.end_hour {
            for minute in 0..60 {
                let off = w.offset(hour, minute);
                assert!(off >= prev, "offset went backwards at {hour:02}:{minute:02}");
                prev = off;
            }
        }
    }

    #[test]
    fn normalized_endpoints() {
        let w = window();
        assert_eq!(w.normalized(w.offset(w.start_hour, 0)), 0.0);
        assert_eq!(w.normalized(w.offset(w.end_hour, 0)), 1.0);
    }

    #[test]
    fn validate_range_fails_iff_start_not_before_end() {
        assert!(matches!(
            validate_range(2.0, 2.0),
            Err(PlannerError::InvalidRange)
        ));
        assert!(matches!(
            validate_range(2.0, 1.0),
            Err(PlannerError::InvalidRange)
        ));
        assert!(validate_range(1.0, 1.25).is_ok());
    }

    #[test]
    fn marker_hidden_outside_window() {
        let w = window();
        assert_eq!(w.marker(t(7, 59)), None);
        assert_eq!(w.marker(t(20, 0)), None);
        assert_eq!(w.marker(t(23, 30)), None);
    }

    #[test]
    fn marker_in_unit_range_inside_window() {
        let w = window();
        for hour in w.start_hour..w.end_hour {
            let pos = w.marker(t(hour, 30)).unwrap();
            assert!((0.0..1.0).contains(&pos), "marker {pos} out of range");
        }
        assert_eq!(w.marker(t(8, 0)), Some(0.0));
        assert_eq!(w.marker(t(14, 0)), Some(0.5));
    }

    #[test]
    fn standup_scenario_offsets_and_positions() {
        let w = window();
        let start = w.offset(9, 0);
        let end = w.offset(9, 30);
        assert_eq!(start, 1.0);
        assert_eq!(end, 1.5);
        assert!((w.normalized(start) - 0.0833).abs() < 1e-3);
        assert!((w.normalized(end) - 0.125).abs() < 1e-9);
    }

    #[test]
    fn clock_of_inverts_offset() {
        let w = window();
        for hour in w.selectable_hours() {
            for minute in w.selectable_minutes() {
                assert_eq!(w.clock_of(w.offset(hour, minute)), (hour, minute));
            }
        }
    }

    #[test]
    fn blocks_carry_fractional_geometry() {
        use crate::model::ScheduledEvent;
        let w = window();
        let events = vec![
            ScheduledEvent::new("Standup", 1.0, 1.5, EventColor::LightBlue).unwrap(),
            ScheduledEvent::new("Review", 1.0, 2.0, EventColor::Pink).unwrap(),
        ];
        let blocks = layout_events(&w, &events);
        assert_eq!(blocks.len(), 2);
        assert!((blocks[0].top - 1.0 / 12.0).abs() < 1e-9);
        assert!((blocks[0].height - 0.5 / 12.0).abs() < 1e-9);
        assert_eq!(blocks[0].label, "Standup");
        // Overlapping events both get blocks; order follows insertion.
        assert_eq!(blocks[1].label, "Review");
    }
}
