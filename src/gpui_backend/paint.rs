use gpui::{
    App, BorderStyle, Bounds, ContentMask, Corners, Edges, PathBuilder, Pixels, TextRun, Window,
    font, point, px, quad,
};

use crate::geom::{ScreenPoint, ScreenRect};
use crate::render::{
    Color, LineSegment, LineStyle, MarkerShape, MarkerStyle, RectStyle, RenderCommand, RenderList,
    TextStyle,
};

/// Paint `render` with its origin at `origin` in window coordinates.
pub(crate) fn paint_render_list(
    render: &RenderList,
    origin: ScreenPoint,
    window: &mut Window,
    cx: &mut App,
) {
    let at = |pt: ScreenPoint| ScreenPoint::new(pt.x + origin.x, pt.y + origin.y);
    let rect_at = |rect: ScreenRect| ScreenRect::new(at(rect.min), at(rect.max));

    let mut clip_stack: Vec<ContentMask<Pixels>> = Vec::new();
    for command in render.commands() {
        match command {
            RenderCommand::ClipRect(rect) => {
                clip_stack.push(ContentMask {
                    bounds: to_bounds(rect_at(*rect)),
                });
            }
            RenderCommand::ClipEnd => {
                clip_stack.pop();
            }
            RenderCommand::Area { vertices, fill } => {
                let vertices: Vec<ScreenPoint> = vertices.iter().copied().map(at).collect();
                with_clip(window, &clip_stack, |window| {
                    paint_area(window, &vertices, *fill);
                });
            }
            RenderCommand::LineSegments { segments, style } => {
                let segments: Vec<LineSegment> = segments
                    .iter()
                    .map(|segment| LineSegment::new(at(segment.start), at(segment.end)))
                    .collect();
                with_clip(window, &clip_stack, |window| {
                    paint_lines(window, &segments, *style);
                });
            }
            RenderCommand::Points { points, style } => {
                let points: Vec<ScreenPoint> = points.iter().copied().map(at).collect();
                with_clip(window, &clip_stack, |window| {
                    paint_points(window, &points, *style);
                });
            }
            RenderCommand::Rect { rect, style } => {
                with_clip(window, &clip_stack, |window| {
                    paint_rect(window, rect_at(*rect), *style);
                });
            }
            RenderCommand::Text {
                position,
                text,
                style,
            } => {
                with_clip(window, &clip_stack, |window| {
                    paint_text(window, cx, at(*position), text, style);
                });
            }
        }
    }
}

fn paint_area(window: &mut Window, vertices: &[ScreenPoint], fill: Color) {
    let Some((first, rest)) = vertices.split_first() else {
        return;
    };
    if rest.len() < 2 {
        return;
    }
    let mut builder = PathBuilder::fill();
    builder.move_to(point(px(first.x), px(first.y)));
    for vertex in rest {
        builder.line_to(point(px(vertex.x), px(vertex.y)));
    }
    builder.close();
    if let Ok(path) = builder.build() {
        window.paint_path(path, to_rgba(fill));
    }
}

fn paint_lines(window: &mut Window, segments: &[LineSegment], style: LineStyle) {
    if segments.is_empty() {
        return;
    }
    let width = style.width.max(0.5);
    let mut builder = PathBuilder::stroke(px(width));
    for segment in segments {
        builder.move_to(point(px(segment.start.x), px(segment.start.y)));
        builder.line_to(point(px(segment.end.x), px(segment.end.y)));
    }
    if let Ok(path) = builder.build() {
        window.paint_path(path, to_rgba(style.color));
    }
}

fn paint_points(window: &mut Window, points: &[ScreenPoint], style: MarkerStyle) {
    if points.is_empty() {
        return;
    }

    let half = style.size.max(2.0) * 0.5;
    let corner = match style.shape {
        MarkerShape::Circle => half,
        MarkerShape::Square => 0.0,
    };
    for pt in points {
        let bounds = Bounds::from_corners(
            point(px(pt.x - half), px(pt.y - half)),
            point(px(pt.x + half), px(pt.y + half)),
        );
        window.paint_quad(quad(
            bounds,
            Corners::all(px(corner)),
            to_rgba(style.color),
            Edges::all(px(0.0)),
            to_rgba(style.color),
            BorderStyle::default(),
        ));
    }
}

fn paint_rect(window: &mut Window, rect: ScreenRect, style: RectStyle) {
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return;
    }
    window.paint_quad(quad(
        to_bounds(rect),
        Corners::all(px(style.corner_radius)),
        to_rgba(style.fill),
        Edges::all(px(style.stroke_width)),
        to_rgba(style.stroke),
        BorderStyle::default(),
    ));
}

fn paint_text(
    window: &mut Window,
    cx: &mut App,
    position: ScreenPoint,
    text: &str,
    style: &TextStyle,
) {
    if text.is_empty() {
        return;
    }
    let font_size = px(style.size);
    let run = TextRun {
        len: text.len(),
        font: font(".SystemUIFont"),
        color: to_hsla(style.color),
        background_color: None,
        underline: None,
        strikethrough: None,
    };
    let shaped = window
        .text_system()
        .shape_line(text.to_string().into(), font_size, &[run], None);
    let line_height = shaped.ascent + shaped.descent;
    let origin = point(px(position.x), px(position.y));
    let _ = shaped.paint(origin, line_height, window, cx);
}

fn to_rgba(color: Color) -> gpui::Rgba {
    gpui::Rgba {
        r: color.r,
        g: color.g,
        b: color.b,
        a: color.a,
    }
}

pub(crate) fn to_hsla(color: Color) -> gpui::Hsla {
    gpui::Hsla::from(to_rgba(color))
}

fn to_bounds(rect: ScreenRect) -> Bounds<Pixels> {
    Bounds::from_corners(
        point(px(rect.min.x), px(rect.min.y)),
        point(px(rect.max.x), px(rect.max.y)),
    )
}

fn with_clip(window: &mut Window, stack: &[ContentMask<Pixels>], f: impl FnOnce(&mut Window)) {
    if let Some(mask) = stack.last() {
        window.with_content_mask(Some(mask.clone()), f);
    } else {
        f(window);
    }
}
