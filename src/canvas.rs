//! Vector canvas the element tree draws into.
//!
//! Elements talk to a [`Canvas`] only through paint state setters and
//! [`Canvas::draw`]. [`PixmapCanvas`] rasterizes paths with tiny-skia; the
//! result is composited into the [`Renderer`](crate::renderer::Renderer)
//! as an image.

use bitflags::bitflags;
use kurbo::{Arc, PathEl, Point, SvgArc, Vec2};
use resvg::tiny_skia;

use crate::color::Color;
use crate::path::{DrawCommand, Path};
use crate::renderer::image::Image;

/// Flattening tolerance for arcs converted to cubics.
const ARC_TOLERANCE: f64 = 0.1;

bitflags! {
    /// Which passes a draw call performs.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PaintMode: u8 {
        const FILL   = 0b01;
        const STROKE = 0b10;
    }
}

pub trait Canvas {
    fn set_fill_color(&mut self, color: Color);
    fn set_stroke_color(&mut self, color: Color);
    fn set_stroke_width(&mut self, width: f64);
    fn set_fill_opacity(&mut self, opacity: f64);
    fn set_stroke_opacity(&mut self, opacity: f64);

    /// Fill and/or stroke `path` with the current paint state.
    fn draw(&mut self, path: &Path);

    /// Reset every pixel to transparent.
    fn clear(&mut self);
    fn resize(&mut self, width: u32, height: u32);
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// Canvas state shared by the fill and stroke passes.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PaintState {
    fill: Color,
    stroke: Color,
    stroke_width: f64,
    fill_opacity: f64,
    stroke_opacity: f64,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            fill: Color::BLACK,
            stroke: Color::TRANSPARENT,
            stroke_width: 1.0,
            fill_opacity: 1.0,
            stroke_opacity: 1.0,
        }
    }
}

impl PaintState {
    fn fill_color(&self) -> Color {
        self.fill.with_opacity(self.fill_opacity as f32)
    }

    fn stroke_color(&self) -> Color {
        self.stroke.with_opacity(self.stroke_opacity as f32)
    }

    fn mode(&self) -> PaintMode {
        let mut mode = PaintMode::empty();
        if self.fill_color().a > 0 {
            mode |= PaintMode::FILL;
        }
        if self.stroke_color().a > 0 && self.stroke_width > 0.0 {
            mode |= PaintMode::STROKE;
        }
        mode
    }
}

/// A [`Canvas`] backed by a tiny-skia pixmap.
pub struct PixmapCanvas {
    /// `None` while either dimension is zero.
    pixmap: Option<tiny_skia::Pixmap>,
    width: u32,
    height: u32,
    state: PaintState,
}

impl PixmapCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixmap: tiny_skia::Pixmap::new(width, height),
            width,
            height,
            state: PaintState::default(),
        }
    }

    /// The passes the next [`Canvas::draw`] call will perform.
    pub fn paint_mode(&self) -> PaintMode {
        self.state.mode()
    }

    /// Copy the canvas out as a straight-alpha BGRA image.
    pub fn to_image(&self) -> Image {
        let pixels = match &self.pixmap {
            Some(pixmap) => pixmap
                .pixels()
                .iter()
                .map(|p| {
                    let c = p.demultiply();
                    Color::rgba(c.red(), c.green(), c.blue(), c.alpha())
                })
                .collect(),
            None => Vec::new(),
        };
        Image::from_parts(self.width, self.height, pixels)
    }

    fn paint(color: Color) -> tiny_skia::Paint<'static> {
        let mut paint = tiny_skia::Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        paint.anti_alias = true;
        paint
    }
}

impl Canvas for PixmapCanvas {
    fn set_fill_color(&mut self, color: Color) {
        self.state.fill = color;
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.state.stroke = color;
    }

    fn set_stroke_width(&mut self, width: f64) {
        self.state.stroke_width = width;
    }

    fn set_fill_opacity(&mut self, opacity: f64) {
        self.state.fill_opacity = opacity.clamp(0.0, 1.0);
    }

    fn set_stroke_opacity(&mut self, opacity: f64) {
        self.state.stroke_opacity = opacity.clamp(0.0, 1.0);
    }

    fn draw(&mut self, path: &Path) {
        let mode = self.state.mode();
        if mode.is_empty() {
            return;
        }
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        let Some(skia_path) = to_skia_path(path) else {
            return;
        };

        if mode.contains(PaintMode::FILL) {
            pixmap.fill_path(
                &skia_path,
                &Self::paint(self.state.fill_color()),
                tiny_skia::FillRule::Winding,
                tiny_skia::Transform::identity(),
                None,
            );
        }
        if mode.contains(PaintMode::STROKE) {
            let stroke = tiny_skia::Stroke {
                width: self.state.stroke_width as f32,
                ..tiny_skia::Stroke::default()
            };
            pixmap.stroke_path(
                &skia_path,
                &Self::paint(self.state.stroke_color()),
                &stroke,
                tiny_skia::Transform::identity(),
                None,
            );
        }
    }

    fn clear(&mut self) {
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(tiny_skia::Color::TRANSPARENT);
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        log::debug!("Resizing canvas to {width}x{height}");
        self.pixmap = tiny_skia::Pixmap::new(width, height);
        self.width = width;
        self.height = height;
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

/// Convert draw commands to a tiny-skia path, turning arcs into cubics.
fn to_skia_path(path: &Path) -> Option<tiny_skia::Path> {
    let mut builder = tiny_skia::PathBuilder::new();
    let mut current = Point::ZERO;
    let mut subpath_start = Point::ZERO;

    for command in path.commands() {
        match *command {
            DrawCommand::MoveTo { x, y } => {
                builder.move_to(x as f32, y as f32);
                current = Point::new(x, y);
                subpath_start = current;
            }
            DrawCommand::LineTo { x, y } => {
                builder.line_to(x as f32, y as f32);
                current = Point::new(x, y);
            }
            DrawCommand::QuadTo { x1, y1, x, y } => {
                builder.quad_to(x1 as f32, y1 as f32, x as f32, y as f32);
                current = Point::new(x, y);
            }
            DrawCommand::CubicTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => {
                builder.cubic_to(
                    x1 as f32, y1 as f32, x2 as f32, y2 as f32, x as f32, y as f32,
                );
                current = Point::new(x, y);
            }
            DrawCommand::ArcTo {
                rx,
                ry,
                rotation,
                large_arc,
                sweep,
                x,
                y,
            } => {
                let to = Point::new(x, y);
                let svg_arc = SvgArc {
                    from: current,
                    to,
                    radii: Vec2::new(rx, ry),
                    x_rotation: rotation.to_radians(),
                    large_arc,
                    sweep,
                };
                match Arc::from_svg_arc(&svg_arc) {
                    Some(arc) => {
                        for el in arc.append_iter(ARC_TOLERANCE) {
                            append_element(&mut builder, el);
                        }
                    }
                    // Degenerate radii or coincident endpoints.
                    None => builder.line_to(x as f32, y as f32),
                }
                current = to;
            }
            DrawCommand::ClosePath => {
                builder.close();
                current = subpath_start;
            }
        }
    }

    builder.finish()
}

fn append_element(builder: &mut tiny_skia::PathBuilder, el: PathEl) {
    match el {
        PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
        PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
        PathEl::QuadTo(p1, p) => builder.quad_to(p1.x as f32, p1.y as f32, p.x as f32, p.y as f32),
        PathEl::CurveTo(p1, p2, p) => builder.cubic_to(
            p1.x as f32,
            p1.y as f32,
            p2.x as f32,
            p2.y as f32,
            p.x as f32,
            p.y as f32,
        ),
        PathEl::ClosePath => builder.close(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(canvas: &PixmapCanvas, x: u32, y: u32) -> Color {
        let image = canvas.to_image();
        image.pixels()[(y * image.width() + x) as usize]
    }

    #[test]
    fn paint_mode_follows_state() {
        let mut canvas = PixmapCanvas::new(4, 4);
        assert_eq!(canvas.paint_mode(), PaintMode::FILL);

        canvas.set_stroke_color(Color::WHITE);
        assert_eq!(canvas.paint_mode(), PaintMode::FILL | PaintMode::STROKE);

        canvas.set_fill_opacity(0.0);
        canvas.set_stroke_width(0.0);
        assert!(canvas.paint_mode().is_empty());
    }

    #[test]
    fn filled_rect_covers_its_interior() {
        let mut canvas = PixmapCanvas::new(20, 20);
        canvas.set_fill_color(Color::rgb(255, 0, 0));
        canvas.draw(&Path::rect(5.0, 5.0, 10.0, 10.0, None, None));

        assert_eq!(pixel(&canvas, 10, 10), Color::rgb(255, 0, 0));
        assert_eq!(pixel(&canvas, 1, 1), Color::TRANSPARENT);
    }

    #[test]
    fn circle_arcs_are_rasterized() {
        let mut canvas = PixmapCanvas::new(40, 40);
        canvas.set_fill_color(Color::rgb(0, 0, 255));
        canvas.draw(&Path::circle(20.0, 20.0, 10.0));

        assert_eq!(pixel(&canvas, 20, 20), Color::rgb(0, 0, 255));
        assert_eq!(pixel(&canvas, 2, 2), Color::TRANSPARENT);
        // Just inside the rightmost point of the circle.
        assert_eq!(pixel(&canvas, 28, 20).b, 255);
    }

    #[test]
    fn stroke_only_leaves_interior_empty() {
        let mut canvas = PixmapCanvas::new(30, 30);
        canvas.set_fill_color(Color::TRANSPARENT);
        canvas.set_stroke_color(Color::BLACK);
        canvas.set_stroke_width(2.0);
        canvas.draw(&Path::rect(5.0, 5.0, 20.0, 20.0, None, None));

        assert_eq!(pixel(&canvas, 15, 15), Color::TRANSPARENT);
        assert_eq!(pixel(&canvas, 15, 5).a, 255);
    }

    #[test]
    fn clear_and_resize() {
        let mut canvas = PixmapCanvas::new(8, 8);
        canvas.draw(&Path::rect(0.0, 0.0, 8.0, 8.0, None, None));
        canvas.clear();
        assert!(canvas.to_image().pixels().iter().all(|p| p.a == 0));

        canvas.resize(3, 2);
        assert_eq!((canvas.width(), canvas.height()), (3, 2));
        assert_eq!(canvas.to_image().pixels().len(), 6);
    }

    #[test]
    fn zero_sized_canvas_ignores_draws() {
        let mut canvas = PixmapCanvas::new(0, 0);
        canvas.draw(&Path::circle(1.0, 1.0, 1.0));
        assert!(canvas.to_image().pixels().is_empty());
    }
}
