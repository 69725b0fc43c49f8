//! Draw command sequences for geometry elements.
//!
//! A [`Path`] is built once when its element is constructed and never
//! changes afterwards. Shapes are expressed with the same commands as
//! their SVG equivalent path, so a circle is four arcs rather than an
//! ellipse primitive.

use std::sync::LazyLock;

use kurbo::{BezPath, PathEl};
use regex::Regex;

use crate::error::{Error, Result};

/// Separator between the numbers of a `points` attribute: a comma with
/// optional whitespace around it, or whitespace alone.
static POINTS_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*,\s*|\s+").expect("separator pattern is valid"));

/// A single drawing instruction, in absolute user-space coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    MoveTo {
        x: f64,
        y: f64,
    },
    LineTo {
        x: f64,
        y: f64,
    },
    QuadTo {
        x1: f64,
        y1: f64,
        x: f64,
        y: f64,
    },
    CubicTo {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x: f64,
        y: f64,
    },
    /// Elliptical arc, SVG endpoint parameterization. `rotation` is in
    /// degrees.
    ArcTo {
        rx: f64,
        ry: f64,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    },
    ClosePath,
}

/// An immutable sequence of draw commands holding one or more subpaths.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    commands: Vec<DrawCommand>,
}

impl Path {
    /// The empty path. Drawing it touches no pixels.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Circle of radius `r` centered on `(cx, cy)`; empty when `r <= 0`.
    pub fn circle(cx: f64, cy: f64, r: f64) -> Self {
        Self::ellipse(cx, cy, r, r)
    }

    /// Ellipse as four quarter arcs starting at `(cx + rx, cy)`; empty when
    /// either radius is not positive.
    pub fn ellipse(cx: f64, cy: f64, rx: f64, ry: f64) -> Self {
        if rx <= 0.0 || ry <= 0.0 {
            return Self::empty();
        }
        PathBuilder::new()
            .move_to(cx + rx, cy)
            .arc_to(rx, ry, 0.0, false, true, cx, cy + ry)
            .arc_to(rx, ry, 0.0, false, true, cx - rx, cy)
            .arc_to(rx, ry, 0.0, false, true, cx, cy - ry)
            .arc_to(rx, ry, 0.0, false, true, cx + rx, cy)
            .close()
            .build()
    }

    /// Rectangle with optional rounded corners.
    ///
    /// A missing `rx`/`ry` takes the other one's value; both are clamped to
    /// half of the corresponding side. Empty when width or height is not
    /// positive.
    pub fn rect(x: f64, y: f64, width: f64, height: f64, rx: Option<f64>, ry: Option<f64>) -> Self {
        if width <= 0.0 || height <= 0.0 {
            return Self::empty();
        }
        let (rx, ry) = match (rx.filter(|v| *v > 0.0), ry.filter(|v| *v > 0.0)) {
            (None, None) => (0.0, 0.0),
            (Some(rx), None) => (rx, rx),
            (None, Some(ry)) => (ry, ry),
            (Some(rx), Some(ry)) => (rx, ry),
        };
        let rx = rx.min(width / 2.0);
        let ry = ry.min(height / 2.0);

        if rx == 0.0 || ry == 0.0 {
            return PathBuilder::new()
                .move_to(x, y)
                .line_to(x + width, y)
                .line_to(x + width, y + height)
                .line_to(x, y + height)
                .close()
                .build();
        }

        PathBuilder::new()
            .move_to(x + rx, y)
            .line_to(x + width - rx, y)
            .arc_to(rx, ry, 0.0, false, true, x + width, y + ry)
            .line_to(x + width, y + height - ry)
            .arc_to(rx, ry, 0.0, false, true, x + width - rx, y + height)
            .line_to(x + rx, y + height)
            .arc_to(rx, ry, 0.0, false, true, x, y + height - ry)
            .line_to(x, y + ry)
            .arc_to(rx, ry, 0.0, false, true, x + rx, y)
            .close()
            .build()
    }

    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        PathBuilder::new().move_to(x1, y1).line_to(x2, y2).build()
    }

    /// Closed polygon through the pairs found in a `points` string.
    pub fn polygon(points: &str) -> Self {
        Self::from_points(points, true)
    }

    /// Open polyline through the pairs found in a `points` string.
    pub fn polyline(points: &str) -> Self {
        Self::from_points(points, false)
    }

    fn from_points(points: &str, closed: bool) -> Self {
        let pairs = parse_points(points);
        let Some((&(x, y), rest)) = pairs.split_first() else {
            return Self::empty();
        };
        let mut builder = PathBuilder::new().move_to(x, y);
        for &(x, y) in rest {
            builder = builder.line_to(x, y);
        }
        if closed {
            builder = builder.close();
        }
        builder.build()
    }
}

/// Incremental construction of a [`Path`].
#[derive(Debug, Default)]
pub struct PathBuilder {
    commands: Vec<DrawCommand>,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, x: f64, y: f64) -> Self {
        self.commands.push(DrawCommand::MoveTo { x, y });
        self
    }

    pub fn line_to(mut self, x: f64, y: f64) -> Self {
        self.commands.push(DrawCommand::LineTo { x, y });
        self
    }

    pub fn quad_to(mut self, x1: f64, y1: f64, x: f64, y: f64) -> Self {
        self.commands.push(DrawCommand::QuadTo { x1, y1, x, y });
        self
    }

    pub fn cubic_to(mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) -> Self {
        self.commands.push(DrawCommand::CubicTo {
            x1,
            y1,
            x2,
            y2,
            x,
            y,
        });
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn arc_to(
        mut self,
        rx: f64,
        ry: f64,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    ) -> Self {
        self.commands.push(DrawCommand::ArcTo {
            rx,
            ry,
            rotation,
            large_arc,
            sweep,
            x,
            y,
        });
        self
    }

    pub fn close(mut self) -> Self {
        self.commands.push(DrawCommand::ClosePath);
        self
    }

    pub fn push(mut self, command: DrawCommand) -> Self {
        self.commands.push(command);
        self
    }

    pub fn build(self) -> Path {
        Path {
            commands: self.commands,
        }
    }
}

impl FromIterator<DrawCommand> for Path {
    fn from_iter<I: IntoIterator<Item = DrawCommand>>(iter: I) -> Self {
        Path {
            commands: iter.into_iter().collect(),
        }
    }
}

/// Extract the `(x, y)` pairs of a `points` attribute.
///
/// Numbers are read up to the first token that is not a number. A
/// trailing unpaired number is dropped.
pub fn parse_points(points: &str) -> Vec<(f64, f64)> {
    let numbers: Vec<f64> = POINTS_SEPARATOR
        .split(points.trim())
        .filter(|token| !token.is_empty())
        .map_while(|token| token.parse::<f64>().ok().filter(|n| n.is_finite()))
        .collect();
    if numbers.len() % 2 == 1 {
        log::debug!("Ignoring unpaired coordinate in points {points:?}");
    }
    numbers
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect()
}

/// Parse SVG path data (`d` attribute).
///
/// Relative and shorthand commands are resolved to absolute ones; arcs
/// arrive already converted to cubic segments.
pub fn parse_path_data(data: &str) -> Result<Path> {
    let bez = BezPath::from_svg(data).map_err(|e| Error::PathData(e.to_string()))?;
    Ok(bez
        .elements()
        .iter()
        .map(|el| match *el {
            PathEl::MoveTo(p) => DrawCommand::MoveTo { x: p.x, y: p.y },
            PathEl::LineTo(p) => DrawCommand::LineTo { x: p.x, y: p.y },
            PathEl::QuadTo(p1, p) => DrawCommand::QuadTo {
                x1: p1.x,
                y1: p1.y,
                x: p.x,
                y: p.y,
            },
            PathEl::CurveTo(p1, p2, p) => DrawCommand::CubicTo {
                x1: p1.x,
                y1: p1.y,
                x2: p2.x,
                y2: p2.y,
                x: p.x,
                y: p.y,
            },
            PathEl::ClosePath => DrawCommand::ClosePath,
        })
        .collect())
}
