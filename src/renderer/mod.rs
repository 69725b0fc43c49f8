//! Software rasterizer.
//!
//! The [`Renderer`] owns a BGRA pixel buffer and draws into it on the CPU:
//! rectangle fills and outlines, scaled image blits and glyph runs. Every
//! write is clipped to the buffer and composited source-over.

pub mod image;
pub mod resample;
pub mod types;

use std::rc::Rc;

use crate::color::Color;
use crate::font::Font;
use crate::widgets::{Widget, WidgetChain};

use self::image::Image;
use self::resample::{lanczos_1d, nearest_2d};

pub use types::Rect;

/// How [`Renderer::draw_image`] maps destination pixels to the source.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Scaling {
    None,
    /// Width matches, each column is resampled with Lanczos.
    Vertical { ratio: f32 },
    /// Height matches, each row is resampled with Lanczos.
    Horizontal { ratio: f32 },
    /// Both axes differ, nearest neighbor.
    Both { ratio_w: f32, ratio_h: f32 },
}

pub struct Renderer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
    font: Option<Rc<dyn Font>>,
    widgets: WidgetChain,
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Self {
        let mut renderer = Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
            font: None,
            widgets: WidgetChain::new(),
        };
        renderer.change_screen_size(width, height);
        renderer
    }

    /// Reallocate the pixel buffer. Previous contents are discarded and the
    /// new buffer is fully transparent.
    pub fn change_screen_size(&mut self, width: u32, height: u32) {
        log::debug!("Renderer screen size {}x{} -> {width}x{height}", self.width, self.height);
        self.width = width;
        self.height = height;
        self.pixels = vec![Color::TRANSPARENT; width as usize * height as usize];
    }

    /// Overwrite every pixel with `color` (no blending).
    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    pub fn set_font(&mut self, font: Option<Rc<dyn Font>>) {
        self.font = font;
    }

    pub fn font(&self) -> Option<&Rc<dyn Font>> {
        self.font.as_ref()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The pixel buffer, row-major, `width * height` entries.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Blend `color` into a pixel known to be on screen.
    fn blend_at(&mut self, x: i64, y: i64, color: Color) {
        let index = y as usize * self.width as usize + x as usize;
        self.pixels[index].blend(color);
    }

    /// Fill `rect`, clipped to the screen.
    pub fn draw_rect(&mut self, color: Color, rect: &Rect) {
        let x1 = (rect.left() as i64).max(0);
        let x2 = rect.right().min(self.width as i64);
        let y1 = (rect.top() as i64).max(0);
        let y2 = rect.bottom().min(self.height as i64);

        for y in y1..y2 {
            for x in x1..x2 {
                self.blend_at(x, y, color);
            }
        }
    }

    /// Draw the one pixel wide border of `rect`, clipped to the screen.
    ///
    /// Top and bottom rows include the corners; the side columns only
    /// cover the rows in between, so each border pixel is blended once.
    pub fn draw_rect_outline(&mut self, color: Color, rect: &Rect) {
        if rect.is_empty() {
            return;
        }
        let (w, h) = (self.width as i64, self.height as i64);
        let left = rect.left() as i64;
        let right = rect.right() - 1;
        let top = rect.top() as i64;
        let bottom = rect.bottom() - 1;

        let rows = if top == bottom { vec![top] } else { vec![top, bottom] };
        for y in rows.into_iter().filter(|y| (0..h).contains(y)) {
            for x in left.max(0)..=right.min(w - 1) {
                self.blend_at(x, y, color);
            }
        }

        let columns = if left == right { vec![left] } else { vec![left, right] };
        for x in columns.into_iter().filter(|x| (0..w).contains(x)) {
            for y in (top + 1).max(0)..=(bottom - 1).min(h - 1) {
                self.blend_at(x, y, color);
            }
        }
    }

    /// Blit `image` with its top-left corner at (`x`, `y`), scaled to
    /// `w * h`. A zero `w` or `h` means the image's own size.
    pub fn draw_image(&mut self, image: &Image, x: i32, y: i32, w: u32, h: u32) {
        let (iw, ih) = (image.width(), image.height());
        if iw == 0 || ih == 0 {
            return;
        }
        let w = if w == 0 { iw } else { w };
        let h = if h == 0 { ih } else { h };

        let scaling = match (w == iw, h == ih) {
            (true, true) => Scaling::None,
            (true, false) => Scaling::Vertical {
                ratio: ih as f32 / h as f32,
            },
            (false, true) => Scaling::Horizontal {
                ratio: iw as f32 / w as f32,
            },
            (false, false) => Scaling::Both {
                ratio_w: iw as f32 / w as f32,
                ratio_h: ih as f32 / h as f32,
            },
        };

        // Visible part of the destination, in image-relative coordinates.
        let (x, y) = (x as i64, y as i64);
        let ix_range = (-x).max(0)..(self.width as i64 - x).min(w as i64);
        let iy_range = (-y).max(0)..(self.height as i64 - y).min(h as i64);
        if ix_range.is_empty() || iy_range.is_empty() {
            return;
        }

        let src = image.pixels();
        let (iw, ih) = (iw as usize, ih as usize);
        for iy in iy_range {
            for ix in ix_range.clone() {
                let color = match scaling {
                    Scaling::None => src[iy as usize * iw + ix as usize],
                    Scaling::Vertical { ratio } => {
                        lanczos_1d(iy as f32 * ratio, &src[ix as usize..], ih, iw)
                    }
                    Scaling::Horizontal { ratio } => {
                        lanczos_1d(ix as f32 * ratio, &src[iy as usize * iw..], iw, 1)
                    }
                    Scaling::Both { ratio_w, ratio_h } => {
                        nearest_2d(ix as f32 * ratio_w, iy as f32 * ratio_h, iw, ih, src)
                    }
                };
                self.blend_at(x + ix, y + iy, color);
            }
        }
    }

    /// Draw `text` with its baseline at `y`, starting at pen position `x`.
    ///
    /// Glyph coverage from the font atlas is used as alpha (scaled by the
    /// color's own alpha). Characters without a glyph are skipped.
    pub fn draw_string(&mut self, color: Color, x: i32, y: i32, text: &str) {
        let Some(font) = self.font.clone() else {
            log::warn!("draw_string({text:?}) without a font");
            return;
        };
        let map = font.glyph_map();
        let map_width = font.map_width() as i64;
        let (w, h) = (self.width as i64, self.height as i64);

        let mut pen = x as i64;
        for ch in text.chars() {
            let Some(glyph) = font.glyph(ch) else {
                continue;
            };

            let mut cy = y as i64 - glyph.top as i64;
            for gy in glyph.min[1]..glyph.max[1] {
                if (0..h).contains(&cy) {
                    let mut cx = pen + glyph.left as i64;
                    for gx in glyph.min[0]..glyph.max[0] {
                        if (0..w).contains(&cx) {
                            let coverage = map
                                .get((gy as i64 * map_width + gx as i64) as usize)
                                .copied()
                                .unwrap_or(0);
                            let alpha = (coverage as u16 * color.a as u16 + 127) / 255;
                            self.blend_at(cx, cy, Color { a: alpha as u8, ..color });
                        }
                        cx += 1;
                    }
                }
                cy += 1;
            }
            pen += glyph.advance[0] as i64;
        }
    }

    /// Append a widget to the render chain. The chain does not keep it alive.
    pub fn add_widget(&mut self, widget: &Rc<dyn Widget>) {
        self.widgets.add(widget);
    }

    /// Remove a widget from the render chain; unknown widgets are ignored.
    pub fn remove_widget(&mut self, widget: &Rc<dyn Widget>) -> bool {
        self.widgets.remove(widget)
    }

    pub fn widgets(&self) -> &WidgetChain {
        &self.widgets
    }

    /// Render every live widget in insertion order.
    pub fn render_widgets(&mut self) {
        let mut chain = std::mem::take(&mut self.widgets);
        chain.render(self);
        // Keep anything widgets registered while rendering.
        chain.append(std::mem::take(&mut self.widgets));
        self.widgets = chain;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{BitmapFont, Glyph};

    fn count_changed(renderer: &Renderer) -> usize {
        renderer.pixels().iter().filter(|p| p.a != 0).count()
    }

    #[test]
    fn change_screen_size_zeroes_buffer() {
        let mut r = Renderer::new(4, 4);
        r.clear(Color::WHITE);
        r.change_screen_size(3, 5);
        assert_eq!(r.pixels().len(), 15);
        assert!(r.pixels().iter().all(|&p| p == Color::TRANSPARENT));
    }

    #[test]
    fn draw_rect_is_clipped() {
        let mut r = Renderer::new(10, 10);
        r.draw_rect(Color::WHITE, &Rect::new(-5, 8, 8, 10));
        assert_eq!(count_changed(&r), 3 * 2);
        assert_eq!(r.pixel(2, 9), Some(Color::WHITE));
        assert_eq!(r.pixel(3, 9), Some(Color::TRANSPARENT));
    }

    #[test]
    fn draw_rect_off_screen_is_noop() {
        let mut r = Renderer::new(10, 10);
        r.draw_rect(Color::WHITE, &Rect::new(10, 0, 5, 5));
        r.draw_rect(Color::WHITE, &Rect::new(-6, -6, 5, 5));
        assert_eq!(count_changed(&r), 0);
    }

    #[test]
    fn outline_touches_border_pixels_once() {
        let mut r = Renderer::new(10, 10);
        // Low alpha makes double blends visible.
        let color = Color::rgba(255, 0, 0, 10);
        r.draw_rect_outline(color, &Rect::new(0, 0, 10, 10));

        let touched: Vec<_> = r.pixels().iter().filter(|p| p.a != 0).collect();
        assert_eq!(touched.len(), 36);
        assert!(touched.iter().all(|&&p| p == color));
        assert_eq!(r.pixel(5, 5), Some(Color::TRANSPARENT));
    }

    #[test]
    fn thin_outlines_blend_once() {
        let color = Color::rgba(0, 255, 0, 10);
        let mut r = Renderer::new(10, 10);
        r.draw_rect_outline(color, &Rect::new(2, 2, 5, 1));
        assert_eq!(count_changed(&r), 5);
        assert!(r.pixels().iter().all(|&p| p.a == 0 || p == color));

        let mut r = Renderer::new(10, 10);
        r.draw_rect_outline(color, &Rect::new(2, 2, 1, 4));
        assert_eq!(count_changed(&r), 4);
        assert!(r.pixels().iter().all(|&p| p.a == 0 || p == color));
    }

    #[test]
    fn rects_near_coordinate_limits_are_clipped() {
        let mut r = Renderer::new(10, 10);
        r.draw_rect(Color::WHITE, &Rect::new(i32::MAX - 5, 0, 10, 10));
        r.draw_rect(Color::WHITE, &Rect::new(0, i32::MAX - 5, 10, 10));
        r.draw_rect_outline(Color::WHITE, &Rect::new(0, i32::MAX - 5, 10, 10));
        r.draw_rect_outline(Color::WHITE, &Rect::new(i32::MAX - 5, 0, 10, 10));
        assert_eq!(count_changed(&r), 0);

        // Far left edge, huge width: covers the whole screen.
        r.draw_rect(Color::WHITE, &Rect::new(i32::MIN, 0, i32::MAX, 10));
        assert_eq!(count_changed(&r), 0);
        r.draw_rect(Color::WHITE, &Rect::new(-5, -5, i32::MAX, i32::MAX));
        assert_eq!(count_changed(&r), 100);
    }

    #[test]
    fn outline_is_clipped() {
        let mut r = Renderer::new(10, 10);
        r.draw_rect_outline(Color::WHITE, &Rect::new(-2, -2, 6, 6));
        // Bottom row y=3 for x in 0..=3, right column x=3 for y in 0..=2.
        assert_eq!(count_changed(&r), 4 + 3);
        assert_eq!(r.pixel(3, 0), Some(Color::WHITE));
        assert_eq!(r.pixel(0, 0), Some(Color::TRANSPARENT));
    }

    fn gradient(width: u32, height: u32) -> Image {
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| Color::rgba(x as u8 * 20, y as u8 * 20, 7, 200)))
            .collect();
        Image::from_pixels(width, height, pixels).unwrap()
    }

    #[test]
    fn same_size_blit_onto_transparent_is_exact() {
        let image = gradient(6, 4);
        let mut r = Renderer::new(6, 4);
        r.draw_image(&image, 0, 0, 0, 0);
        assert_eq!(r.pixels(), image.pixels());
    }

    #[test]
    fn blit_is_clipped_per_pixel() {
        let image = gradient(4, 4);
        let mut r = Renderer::new(4, 4);
        r.draw_image(&image, 2, -1, 4, 4);
        assert_eq!(r.pixel(2, 0), image.pixel(0, 1));
        assert_eq!(r.pixel(3, 2), image.pixel(1, 3));
        assert_eq!(r.pixel(1, 0), Some(Color::TRANSPARENT));
        assert_eq!(r.pixel(2, 3), Some(Color::TRANSPARENT));
    }

    #[test]
    fn blit_fully_off_screen_is_noop() {
        let image = gradient(4, 4);
        let mut r = Renderer::new(4, 4);
        r.draw_image(&image, 4, 0, 0, 0);
        r.draw_image(&image, 0, -10, 8, 8);
        assert_eq!(count_changed(&r), 0);
    }

    #[test]
    fn horizontal_stretch_keeps_rows() {
        let image = Image::from_pixels(
            2,
            2,
            vec![Color::WHITE, Color::WHITE, Color::BLACK, Color::BLACK],
        )
        .unwrap();
        let mut r = Renderer::new(5, 2);
        r.draw_image(&image, 0, 0, 5, 0);
        for x in 0..5 {
            assert_eq!(r.pixel(x, 0), Some(Color::WHITE));
            assert_eq!(r.pixel(x, 1), Some(Color::BLACK));
        }
    }

    #[test]
    fn vertical_stretch_keeps_columns() {
        let image = Image::from_pixels(
            2,
            2,
            vec![Color::WHITE, Color::BLACK, Color::WHITE, Color::BLACK],
        )
        .unwrap();
        let mut r = Renderer::new(2, 6);
        r.draw_image(&image, 0, 0, 0, 6);
        for y in 0..6 {
            assert_eq!(r.pixel(0, y), Some(Color::WHITE));
            assert_eq!(r.pixel(1, y), Some(Color::BLACK));
        }
    }

    #[test]
    fn both_axes_use_nearest_neighbor() {
        let image = Image::from_pixels(
            2,
            2,
            vec![
                Color::rgb(1, 0, 0),
                Color::rgb(2, 0, 0),
                Color::rgb(3, 0, 0),
                Color::rgb(4, 0, 0),
            ],
        )
        .unwrap();
        let mut r = Renderer::new(4, 4);
        r.draw_image(&image, 0, 0, 4, 4);
        // ratio 0.5: 0, 0.5 -> 0; 1.0, 1.5 -> 1
        let row: Vec<u8> = (0..4).map(|x| r.pixel(x, 0).unwrap().r).collect();
        assert_eq!(row, [1, 1, 2, 2]);
        assert_eq!(r.pixel(3, 3).unwrap().r, 4);
    }

    fn test_font() -> Rc<dyn Font> {
        // 3x2 atlas: glyph 'i' is a full 1x2 column, 'o' a 2x2 block.
        let atlas = vec![255, 255, 255, 255, 255, 255];
        let glyphs = [
            (
                'i',
                Glyph {
                    min: [0, 0],
                    max: [1, 2],
                    left: 0,
                    top: 2,
                    advance: [2, 0],
                },
            ),
            (
                'o',
                Glyph {
                    min: [1, 0],
                    max: [3, 2],
                    left: 0,
                    top: 2,
                    advance: [3, 0],
                },
            ),
        ];
        Rc::new(BitmapFont::new(atlas, 3, glyphs))
    }

    #[test]
    fn draw_string_without_font_draws_nothing() {
        let mut r = Renderer::new(8, 8);
        r.draw_string(Color::WHITE, 0, 4, "io");
        assert_eq!(count_changed(&r), 0);
    }

    #[test]
    fn draw_string_blits_glyphs_and_advances() {
        let mut r = Renderer::new(8, 4);
        r.set_font(Some(test_font()));
        r.draw_string(Color::WHITE, 1, 3, "i?o");

        // 'i' at x=1, rows 1..3; unknown '?' skipped; 'o' at x=3..5.
        assert_eq!(count_changed(&r), 2 + 4);
        assert_eq!(r.pixel(1, 1), Some(Color::WHITE));
        assert_eq!(r.pixel(1, 2), Some(Color::WHITE));
        assert_eq!(r.pixel(3, 1), Some(Color::WHITE));
        assert_eq!(r.pixel(4, 2), Some(Color::WHITE));
        assert_eq!(r.pixel(2, 1), Some(Color::TRANSPARENT));
        assert_eq!(r.pixel(1, 0), Some(Color::TRANSPARENT));
    }

    #[test]
    fn draw_string_scales_coverage_by_color_alpha() {
        // One pixel glyph at half coverage.
        let font: Rc<dyn Font> = Rc::new(BitmapFont::new(
            vec![128],
            1,
            [(
                '.',
                Glyph {
                    min: [0, 0],
                    max: [1, 1],
                    left: 0,
                    top: 1,
                    advance: [1, 0],
                },
            )],
        ));
        let mut r = Renderer::new(2, 1);
        r.set_font(Some(font));
        r.draw_string(Color::rgba(255, 255, 255, 128), 0, 1, "..");

        // (128 * 128 + 127) / 255 = 64
        assert_eq!(r.pixel(0, 0), Some(Color::rgba(255, 255, 255, 64)));
        assert_eq!(r.pixel(1, 0), Some(Color::rgba(255, 255, 255, 64)));
    }

    #[test]
    fn translucent_text_keeps_full_coverage_alpha() {
        let mut r = Renderer::new(8, 4);
        r.set_font(Some(test_font()));
        let color = Color::rgba(10, 20, 30, 100);
        r.draw_string(color, 1, 3, "i");
        assert_eq!(r.pixel(1, 1), Some(color));
        assert_eq!(r.pixel(1, 2), Some(color));
    }

    #[test]
    fn draw_string_is_clipped() {
        let mut r = Renderer::new(2, 2);
        r.set_font(Some(test_font()));
        r.draw_string(Color::WHITE, -1, 1, "oo");
        // First 'o' covers x=-1..1 and y=-1..1, only (0,0) is visible.
        // Second 'o' starts at x=2, off screen.
        assert_eq!(count_changed(&r), 1);
        assert_eq!(r.pixel(0, 0), Some(Color::WHITE));
    }
}
