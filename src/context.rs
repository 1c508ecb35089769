//! Shared view context: active project and the time ranges every chart of a
//! timeline follows.
//!
//! The application is the only writer; widgets read snapshots from any thread
//! and send seek or selection requests back.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::time::{TimeRange, Timestamp};

static PROJECT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a trace project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectId(u64);

impl ProjectId {
    fn next() -> Self {
        Self(PROJECT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// A loaded trace project, as seen by the charts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceProject {
    id: ProjectId,
    name: String,
    full_range: TimeRange,
}

impl TraceProject {
    /// Create a project with a fresh identity.
    pub fn new(name: impl Into<String>, full_range: TimeRange) -> Self {
        Self {
            id: ProjectId::next(),
            name: name.into(),
            full_range,
        }
    }

    /// Project identity. Two loads of the same trace are different projects.
    pub fn id(&self) -> ProjectId {
        self.id
    }

    /// Project name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Span from the first to the last event.
    pub fn full_range(&self) -> TimeRange {
        self.full_range
    }
}

/// Consistent copy of the context, taken under one lock.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSnapshot {
    /// Active project, if any.
    pub project: Option<TraceProject>,
    /// Range shown by the main view.
    pub visible_range: TimeRange,
    /// Range selected by the user.
    pub selection_range: TimeRange,
    /// Set while the application switches projects.
    pub listener_freeze: bool,
    /// Incremented on every effective write.
    pub generation: u64,
}

impl ContextSnapshot {
    /// Full range of the active project, or [`TimeRange::UNINITIALIZED`].
    pub fn full_range(&self) -> TimeRange {
        self.project
            .as_ref()
            .map_or(TimeRange::UNINITIALIZED, TraceProject::full_range)
    }
}

#[derive(Debug)]
struct ContextState {
    project: Option<TraceProject>,
    visible_range: TimeRange,
    selection_range: TimeRange,
    listener_freeze: bool,
    generation: u64,
    initial_range_offset: i64,
}

impl ContextState {
    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Handle to the shared view context. Clones share the same state.
#[derive(Debug, Clone)]
pub struct ViewContext {
    inner: Arc<RwLock<ContextState>>,
}

impl ViewContext {
    /// Create a context with no project. A newly set project shows its full
    /// range.
    pub fn new() -> Self {
        Self::with_initial_range_offset(i64::MAX)
    }

    /// Create a context whose initial visible range on project load spans at
    /// most `offset` nanoseconds from the project start.
    pub fn with_initial_range_offset(offset: i64) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ContextState {
                project: None,
                visible_range: TimeRange::UNINITIALIZED,
                selection_range: TimeRange::UNINITIALIZED,
                listener_freeze: false,
                generation: 0,
                initial_range_offset: offset.max(0),
            })),
        }
    }

    /// Copy the whole context at once.
    pub fn snapshot(&self) -> ContextSnapshot {
        let state = self.inner.read();
        ContextSnapshot {
            project: state.project.clone(),
            visible_range: state.visible_range,
            selection_range: state.selection_range,
            listener_freeze: state.listener_freeze,
            generation: state.generation,
        }
    }

    /// Active project, if any.
    pub fn current_project(&self) -> Option<TraceProject> {
        self.inner.read().project.clone()
    }

    /// Range shown by the main view.
    pub fn visible_range(&self) -> TimeRange {
        self.inner.read().visible_range
    }

    /// Full range of the active project.
    pub fn full_range(&self) -> TimeRange {
        self.inner
            .read()
            .project
            .as_ref()
            .map_or(TimeRange::UNINITIALIZED, TraceProject::full_range)
    }

    /// Range selected by the user.
    pub fn selection_range(&self) -> TimeRange {
        self.inner.read().selection_range
    }

    /// Whether listeners should hold off while a project switch settles.
    pub fn listener_freeze(&self) -> bool {
        self.inner.read().listener_freeze
    }

    /// Write counter, for hosts that only tick on change.
    pub fn generation(&self) -> u64 {
        self.inner.read().generation
    }

    /// Switch the active project, resetting the visible and selection ranges.
    pub fn set_project(&self, project: Option<TraceProject>) {
        let mut state = self.inner.write();
        match &project {
            Some(project) => {
                let full = project.full_range();
                let end = full
                    .start()
                    .saturating_add(state.initial_range_offset)
                    .min(full.end());
                state.visible_range = TimeRange::new(full.start(), end);
                state.selection_range = TimeRange::new(full.start(), full.start());
                log::debug!("active project {:?}, full range {}", project.name(), full);
            }
            None => {
                state.visible_range = TimeRange::UNINITIALIZED;
                state.selection_range = TimeRange::UNINITIALIZED;
                log::debug!("active project cleared");
            }
        }
        state.project = project;
        state.bump();
    }

    /// Extend or shrink the active project's full range (live traces).
    ///
    /// Does nothing when no project is active.
    pub fn update_full_range(&self, full_range: TimeRange) {
        let mut state = self.inner.write();
        let Some(project) = state.project.as_mut() else {
            return;
        };
        if project.full_range == full_range {
            return;
        }
        project.full_range = full_range;
        let visible = state.visible_range;
        state.visible_range = clamp_range(visible, full_range);
        state.bump();
    }

    /// Seek the main view to `range`, clamped to the project's full range.
    ///
    /// Returns the range actually applied, or [`TimeRange::UNINITIALIZED`]
    /// when no project is active.
    pub fn request_visible_range(&self, range: TimeRange) -> TimeRange {
        let mut state = self.inner.write();
        let Some(full) = state.project.as_ref().map(TraceProject::full_range) else {
            return TimeRange::UNINITIALIZED;
        };
        let clamped = clamp_range(range, full);
        if state.visible_range != clamped {
            state.visible_range = clamped;
            state.bump();
        }
        clamped
    }

    /// Set the selection, clamped to the project's full range.
    pub fn set_selection_range(&self, range: TimeRange) {
        let mut state = self.inner.write();
        let Some(full) = state.project.as_ref().map(TraceProject::full_range) else {
            return;
        };
        let clamped = clamp_range(range, full);
        if state.selection_range != clamped {
            state.selection_range = clamped;
            state.bump();
        }
    }

    /// Freeze or release listeners during bulk project operations.
    pub fn set_listener_freeze(&self, freeze: bool) {
        let mut state = self.inner.write();
        if state.listener_freeze != freeze {
            state.listener_freeze = freeze;
            state.bump();
        }
    }
}

impl Default for ViewContext {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_range(range: TimeRange, bounds: TimeRange) -> TimeRange {
    let clamp = |ts: Timestamp| bounds.clamp(ts);
    TimeRange::new(clamp(range.start()), clamp(range.end()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_has_uninitialized_ranges() {
        let context = ViewContext::new();
        assert!(context.current_project().is_none());
        assert!(context.visible_range().is_uninitialized());
        assert!(context.full_range().is_uninitialized());
        assert!(context.request_visible_range(TimeRange::new(0, 10)).is_uninitialized());
    }

    #[test]
    fn project_load_sets_initial_visible_range() {
        let context = ViewContext::with_initial_range_offset(100);
        context.set_project(Some(TraceProject::new("trace", TimeRange::new(1_000, 5_000))));
        assert_eq!(context.visible_range(), TimeRange::new(1_000, 1_100));
        assert_eq!(context.full_range(), TimeRange::new(1_000, 5_000));

        let context = ViewContext::new();
        context.set_project(Some(TraceProject::new("trace", TimeRange::new(1_000, 5_000))));
        assert_eq!(context.visible_range(), TimeRange::new(1_000, 5_000));
    }

    #[test]
    fn seek_is_clamped_and_deduplicated() {
        let context = ViewContext::new();
        context.set_project(Some(TraceProject::new("trace", TimeRange::new(0, 1_000))));
        let applied = context.request_visible_range(TimeRange::new(900, 2_000));
        assert_eq!(applied, TimeRange::new(900, 1_000));

        let generation = context.generation();
        context.request_visible_range(TimeRange::new(900, 1_000));
        assert_eq!(context.generation(), generation);
    }

    #[test]
    fn projects_have_distinct_identities() {
        let a = TraceProject::new("trace", TimeRange::new(0, 10));
        let b = TraceProject::new("trace", TimeRange::new(0, 10));
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
    }

    #[test]
    fn growing_trace_keeps_identity() {
        let context = ViewContext::new();
        let project = TraceProject::new("live", TimeRange::new(0, 100));
        let id = project.id();
        context.set_project(Some(project));
        context.update_full_range(TimeRange::new(0, 500));
        let snapshot = context.snapshot();
        assert_eq!(snapshot.project.map(|project| project.id()), Some(id));
        assert_eq!(snapshot.visible_range, TimeRange::new(0, 100));
    }

    #[test]
    fn clearing_project_resets_ranges() {
        let context = ViewContext::new();
        context.set_project(Some(TraceProject::new("trace", TimeRange::new(0, 10))));
        context.set_project(None);
        let snapshot = context.snapshot();
        assert!(snapshot.project.is_none());
        assert!(snapshot.visible_range.is_uninitialized());
        assert!(snapshot.full_range().is_uninitialized());
    }
}
