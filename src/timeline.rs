//! A stack of charts following one view context.

use crate::context::ViewContext;
use crate::task::UpdateOutcome;
use crate::time::TimeRange;
use crate::widget::{ApplySummary, TimelineWidget};

/// Outcome of one timeline tick, per chart in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// `(chart name, update outcome, applied results)` for every chart.
    pub charts: Vec<(String, UpdateOutcome, ApplySummary)>,
}

impl TickReport {
    /// Check whether any chart changed what it displays.
    pub fn repainted(&self) -> bool {
        self.charts.iter().any(|(_, outcome, summary)| {
            matches!(outcome, UpdateOutcome::Painted | UpdateOutcome::Cleared)
                || summary.painted > 0
        })
    }
}

/// Charts sharing a [`ViewContext`], ordered by weight.
pub struct Timeline {
    context: ViewContext,
    widgets: Vec<Box<dyn TimelineWidget>>,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new(context: ViewContext) -> Self {
        Self {
            context,
            widgets: Vec::new(),
        }
    }

    /// Shared view context.
    pub fn context(&self) -> &ViewContext {
        &self.context
    }

    /// Add a chart, keeping the list sorted by weight.
    pub fn add_widget(&mut self, widget: Box<dyn TimelineWidget>) {
        let index = self
            .widgets
            .partition_point(|existing| existing.weight() <= widget.weight());
        log::debug!("timeline: adding {} at {}", widget.name(), index);
        self.widgets.insert(index, widget);
    }

    /// Charts in display order.
    pub fn widgets(&self) -> &[Box<dyn TimelineWidget>] {
        &self.widgets
    }

    /// Charts in display order, mutably.
    pub fn widgets_mut(&mut self) -> &mut [Box<dyn TimelineWidget>] {
        &mut self.widgets
    }

    /// Run every chart's update task, then apply whatever their workers
    /// delivered.
    pub fn tick(&mut self) -> TickReport {
        let charts = self
            .widgets
            .iter_mut()
            .map(|widget| {
                let outcome = widget.run_update();
                let summary = widget.apply_pending();
                (widget.name().to_string(), outcome, summary)
            })
            .collect();
        TickReport { charts }
    }

    /// Seek the main view, then let every chart follow.
    ///
    /// Returns the range actually applied after clamping.
    pub fn seek_visible_range(&mut self, range: TimeRange) -> TimeRange {
        let applied = self.context.request_visible_range(range);
        if applied.is_uninitialized() {
            return applied;
        }
        for widget in &mut self.widgets {
            widget.seek_visible_range(applied);
        }
        applied
    }

    /// Clear every chart.
    pub fn clear(&mut self) {
        for widget in &mut self.widgets {
            widget.clear();
        }
    }

    /// Stop every chart's worker.
    pub fn dispose(&mut self) {
        for widget in &mut self.widgets {
            widget.dispose();
        }
    }
}

impl Drop for Timeline {
    fn drop(&mut self) {
        self.dispose();
    }
}
