use std::sync::Arc;

use gpui::prelude::*;
use gpui::{
    MouseButton, MouseDownEvent, MouseMoveEvent, MouseUpEvent, Pixels, Point, ScrollDelta,
    ScrollWheelEvent, Window, canvas, div,
};
use parking_lot::Mutex;

use crate::geom::ScreenPoint;
use crate::interaction::ScrollInput;
use crate::task::UpdateOutcome;
use crate::widget::TimelineWidget;

use super::config::TimelineViewConfig;
use super::paint::{paint_render_list, to_hsla};

struct HostState {
    widget: Box<dyn TimelineWidget>,
    origin: ScreenPoint,
}

/// A GPUI view hosting one timeline chart.
///
/// Every frame the view sizes the chart from its layout bounds, runs its
/// update task, applies delivered results, and paints the chart's frame.
/// Pointer and scroll input is forwarded to the chart.
#[derive(Clone)]
pub struct GpuiTimelineView {
    state: Arc<Mutex<HostState>>,
    config: TimelineViewConfig,
}

impl GpuiTimelineView {
    /// Create a view for `widget`.
    ///
    /// Uses the default [`TimelineViewConfig`]. The chart is ticked while
    /// painting, so it should keep the default background execution mode
    /// unless its provider never blocks.
    pub fn new(widget: Box<dyn TimelineWidget>) -> Self {
        Self::with_config(widget, TimelineViewConfig::default())
    }

    /// Create a view with a custom configuration.
    pub fn with_config(widget: Box<dyn TimelineWidget>, config: TimelineViewConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(HostState {
                widget,
                origin: ScreenPoint::new(0.0, 0.0),
            })),
            config,
        }
    }

    /// Get a handle on the hosted chart.
    pub fn widget_handle(&self) -> TimelineWidgetHandle {
        TimelineWidgetHandle {
            state: Arc::clone(&self.state),
        }
    }

    fn local_x(&self, position: Point<Pixels>) -> f32 {
        let origin = self.state.lock().origin;
        f32::from(position.x) - origin.x
    }

    fn on_mouse_down(&mut self, ev: &MouseDownEvent, cx: &mut Context<Self>) {
        let x = self.local_x(ev.position);
        self.state.lock().widget.on_pointer_down(x);
        cx.notify();
    }

    fn on_mouse_move(&mut self, ev: &MouseMoveEvent, cx: &mut Context<Self>) {
        if ev.pressed_button != Some(MouseButton::Left) {
            return;
        }
        let x = self.local_x(ev.position);
        self.state.lock().widget.on_pointer_move(x);
        cx.notify();
    }

    fn on_mouse_up(&mut self, ev: &MouseUpEvent, cx: &mut Context<Self>) {
        let x = self.local_x(ev.position);
        self.state.lock().widget.on_pointer_up(x);
        cx.notify();
    }

    fn on_scroll(&mut self, ev: &ScrollWheelEvent, cx: &mut Context<Self>) {
        let (lines_x, lines_y) = match ev.delta {
            ScrollDelta::Pixels(delta) => (
                f32::from(delta.x) / self.config.scroll_line_px,
                f32::from(delta.y) / self.config.scroll_line_px,
            ),
            ScrollDelta::Lines(delta) => (delta.x, delta.y),
        };
        if lines_x.abs() < 0.01 && lines_y.abs() < 0.01 {
            return;
        }
        let input = ScrollInput {
            position_x: self.local_x(ev.position),
            delta_x: -lines_x,
            delta_y: -lines_y,
            zoom: ev.modifiers.control || ev.modifiers.platform,
        };
        self.state.lock().widget.on_scroll(input);
        cx.notify();
    }
}

impl Render for GpuiTimelineView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let state = Arc::clone(&self.state);
        let continuous = self.config.continuous_ticks;
        let height = self.state.lock().widget.preferred_height();

        div()
            .w_full()
            .h(gpui::px(height))
            .bg(to_hsla(self.config.background))
            .child(
                canvas(
                    move |bounds, window, _| {
                        let mut state = state.lock();
                        state.origin = ScreenPoint::new(
                            f32::from(bounds.origin.x),
                            f32::from(bounds.origin.y),
                        );
                        let widget = &mut state.widget;
                        widget.set_size(
                            f32::from(bounds.size.width),
                            f32::from(bounds.size.height),
                        );
                        let outcome = widget.run_update();
                        let summary = widget.apply_pending();
                        if continuous
                            || matches!(outcome, UpdateOutcome::Requested | UpdateOutcome::InFlight)
                            || summary.painted > 0
                        {
                            window.request_animation_frame();
                        }
                        (state.origin, state.widget.build_frame())
                    },
                    move |_, (origin, render), window, cx| {
                        paint_render_list(&render, origin, window, cx);
                    },
                )
                .size_full(),
            )
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, ev, _, cx| {
                    this.on_mouse_down(ev, cx);
                }),
            )
            .on_mouse_move(cx.listener(|this, ev, _, cx| {
                this.on_mouse_move(ev, cx);
            }))
            .on_mouse_up(
                MouseButton::Left,
                cx.listener(|this, ev, _, cx| {
                    this.on_mouse_up(ev, cx);
                }),
            )
            .on_scroll_wheel(cx.listener(|this, ev, _, cx| {
                this.on_scroll(ev, cx);
            }))
    }
}

/// A handle on the chart held inside a `GpuiTimelineView`.
///
/// The handle clones cheaply and can be moved into async tasks.
#[derive(Clone)]
pub struct TimelineWidgetHandle {
    state: Arc<Mutex<HostState>>,
}

impl TimelineWidgetHandle {
    /// Read the chart.
    ///
    /// The chart is locked for the duration of the callback.
    pub fn read<R>(&self, f: impl FnOnce(&dyn TimelineWidget) -> R) -> R {
        let state = self.state.lock();
        f(state.widget.as_ref())
    }

    /// Mutate the chart.
    ///
    /// The chart is locked for the duration of the callback.
    pub fn write<R>(&self, f: impl FnOnce(&mut dyn TimelineWidget) -> R) -> R {
        let mut state = self.state.lock();
        f(state.widget.as_mut())
    }
}
