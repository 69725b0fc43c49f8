//! Geometry elements: `circle`, `ellipse`, `line`, `path`, `polygon`,
//! `polyline` and `rect`.

use crate::attributes::{lookup, AttributeMap, AttributeValue};
use crate::color::Color;
use crate::path::{parse_path_data, Path};

use super::{apply_style, number_attribute, optional_number, DrawContext, Element};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Circle,
    Ellipse,
    Line,
    Path,
    Polygon,
    Polyline,
    Rect,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::Circle,
        ShapeKind::Ellipse,
        ShapeKind::Line,
        ShapeKind::Path,
        ShapeKind::Polygon,
        ShapeKind::Polyline,
        ShapeKind::Rect,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag_name() == tag)
    }

    pub fn tag_name(self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Line => "line",
            ShapeKind::Path => "path",
            ShapeKind::Polygon => "polygon",
            ShapeKind::Polyline => "polyline",
            ShapeKind::Rect => "rect",
        }
    }
}

/// A drawable element whose geometry is fixed at construction.
pub struct ShapeElement {
    kind: ShapeKind,
    attributes: AttributeMap,
    path: Path,
}

impl ShapeElement {
    pub fn new(kind: ShapeKind, mut attributes: AttributeMap) -> Self {
        apply_style(kind.tag_name(), &mut attributes);
        let path = build_path(kind, &attributes);
        Self {
            kind,
            attributes,
            path,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }
}

fn build_path(kind: ShapeKind, attrs: &AttributeMap) -> Path {
    let n = |name| number_attribute(attrs, name);
    let text = |name| {
        lookup(attrs, name)
            .and_then(AttributeValue::as_text)
            .unwrap_or("")
    };

    match kind {
        ShapeKind::Circle => Path::circle(n("cx"), n("cy"), n("r")),
        ShapeKind::Ellipse => Path::ellipse(n("cx"), n("cy"), n("rx"), n("ry")),
        ShapeKind::Line => Path::line(n("x1"), n("y1"), n("x2"), n("y2")),
        ShapeKind::Polygon => Path::polygon(text("points")),
        ShapeKind::Polyline => Path::polyline(text("points")),
        ShapeKind::Rect => Path::rect(
            n("x"),
            n("y"),
            n("width"),
            n("height"),
            optional_number(attrs, "rx"),
            optional_number(attrs, "ry"),
        ),
        ShapeKind::Path => match parse_path_data(text("d")) {
            Ok(path) => path,
            Err(err) => {
                let id = text("id");
                log::warn!("Ignoring path data of <path id=\"{id}\">: {err}");
                Path::empty()
            }
        },
    }
}

impl Element for ShapeElement {
    fn tag_name(&self) -> &str {
        self.kind.tag_name()
    }

    fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut AttributeMap {
        &mut self.attributes
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn draw_start(&self, ctx: &mut DrawContext<'_>) {
        if self.path.is_empty() {
            return;
        }

        let fill = inherited_paint(ctx, "fill", Color::BLACK);
        let stroke = inherited_paint(ctx, "stroke", Color::TRANSPARENT);
        let stroke_width = inherited_number(ctx, "stroke-width", 1.0);
        let opacity = inherited_number(ctx, "opacity", 1.0);
        let fill_opacity = inherited_number(ctx, "fill-opacity", 1.0) * opacity;
        let stroke_opacity = inherited_number(ctx, "stroke-opacity", 1.0) * opacity;

        ctx.canvas.set_fill_color(fill);
        ctx.canvas.set_stroke_color(stroke);
        ctx.canvas.set_stroke_width(stroke_width);
        ctx.canvas.set_fill_opacity(fill_opacity);
        ctx.canvas.set_stroke_opacity(stroke_opacity);
        ctx.canvas.draw(&self.path);
    }
}

/// Paints that are not plain colors (gradients, `currentColor`) fall back
/// to `default`.
fn inherited_paint(ctx: &DrawContext<'_>, name: &str, default: Color) -> Color {
    ctx.inherited(name, AttributeValue::Color(default))
        .as_color()
        .unwrap_or(default)
}

fn inherited_number(ctx: &DrawContext<'_>, name: &str, default: f64) -> f64 {
    ctx.inherited(name, AttributeValue::Number(default))
        .as_number()
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::attributes_from_markup;
    use crate::path::DrawCommand;

    fn shape(kind: ShapeKind, pairs: &[(&str, &str)]) -> ShapeElement {
        ShapeElement::new(kind, attributes_from_markup(pairs.iter().copied()))
    }

    #[test]
    fn tags_round_trip_through_kind() {
        for kind in ShapeKind::ALL {
            assert_eq!(ShapeKind::from_tag(kind.tag_name()), Some(kind));
        }
        assert_eq!(ShapeKind::from_tag("g"), None);
    }

    #[test]
    fn circle_builds_arcs() {
        let c = shape(ShapeKind::Circle, &[("cx", "5"), ("cy", "5"), ("r", "2")]);
        let commands = c.path().unwrap().commands();
        assert_eq!(commands[0], DrawCommand::MoveTo { x: 7.0, y: 5.0 });
        assert_eq!(commands.len(), 6);
    }

    #[test]
    fn zero_radius_circle_is_empty() {
        let c = shape(ShapeKind::Circle, &[("cx", "5"), ("cy", "5"), ("r", "0")]);
        assert!(c.path().unwrap().is_empty());
        let c = shape(ShapeKind::Circle, &[("cx", "5")]);
        assert!(c.path().unwrap().is_empty());
    }

    #[test]
    fn polygon_reads_points() {
        let p = shape(ShapeKind::Polygon, &[("points", "0,0 10,0 10,10")]);
        assert_eq!(
            p.path().unwrap().commands(),
            &[
                DrawCommand::MoveTo { x: 0.0, y: 0.0 },
                DrawCommand::LineTo { x: 10.0, y: 0.0 },
                DrawCommand::LineTo { x: 10.0, y: 10.0 },
                DrawCommand::ClosePath,
            ]
        );
    }

    #[test]
    fn style_geometry_is_used() {
        let r = shape(ShapeKind::Rect, &[("style", "width: 4; height: 3")]);
        assert!(!r.path().unwrap().is_empty());
    }

    #[test]
    fn bad_path_data_gives_empty_path() {
        let p = shape(ShapeKind::Path, &[("id", "broken"), ("d", "M 0 0 X 4")]);
        assert!(p.path().unwrap().is_empty());
        let p = shape(ShapeKind::Path, &[("d", "M0 0 L10 0 Z")]);
        assert_eq!(p.path().unwrap().len(), 3);
    }
}
