//! Decoded images the renderer can blit.

use std::path::PathBuf;
use std::sync::Arc;

use crate::color::Color;
use crate::error::{Error, Result};

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Raster image from a file path (PNG, JPEG, GIF, WebP)
    Path(PathBuf),
    /// Raster image from in-memory bytes
    Bytes(Arc<[u8]>),
    /// SVG from a file path
    SvgPath(PathBuf),
    /// SVG from in-memory bytes
    SvgBytes(Arc<[u8]>),
}

impl ImageSource {
    /// Check if this is an SVG source
    pub fn is_svg(&self) -> bool {
        matches!(self, ImageSource::SvgPath(_) | ImageSource::SvgBytes(_))
    }
}

impl From<&str> for ImageSource {
    fn from(path: &str) -> Self {
        ImageSource::from(PathBuf::from(path))
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
        {
            ImageSource::SvgPath(path)
        } else {
            ImageSource::Path(path)
        }
    }
}

/// A `width * height` straight-alpha BGRA bitmap, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Image {
    /// Wrap existing pixels; `pixels.len()` must equal `width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> Result<Self> {
        if pixels.len() != width as usize * height as usize {
            return Err(Error::ImageSize {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self::from_parts(width, height, pixels))
    }

    /// Convert tightly packed RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, rgba: &[u8]) -> Result<Self> {
        let pixels = rgba
            .chunks_exact(4)
            .map(|p| Color::rgba(p[0], p[1], p[2], p[3]))
            .collect();
        Self::from_pixels(width, height, pixels)
    }

    /// A single-color image.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self::from_parts(width, height, vec![color; width as usize * height as usize])
    }

    pub(crate) fn from_parts(width: u32, height: u32, pixels: Vec<Color>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Decode an image. SVGs are rasterized at their intrinsic size.
    pub fn load(source: &ImageSource) -> Result<Self> {
        match source {
            ImageSource::Path(path) => {
                if !path.exists() {
                    return Err(Error::NotFound(path.clone()));
                }
                let img = image::open(path)?;
                Ok(Self::from_dynamic(img))
            }
            ImageSource::Bytes(bytes) => Ok(Self::from_dynamic(image::load_from_memory(bytes)?)),
            ImageSource::SvgPath(path) => {
                if !path.exists() {
                    return Err(Error::NotFound(path.clone()));
                }
                let data = std::fs::read(path)?;
                Self::rasterize_svg(&data)
            }
            ImageSource::SvgBytes(bytes) => Self::rasterize_svg(bytes),
        }
    }

    fn from_dynamic(img: image::DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels = rgba
            .pixels()
            .map(|p| Color::rgba(p[0], p[1], p[2], p[3]))
            .collect();
        Self::from_parts(width, height, pixels)
    }

    fn rasterize_svg(bytes: &[u8]) -> Result<Self> {
        let tree = resvg::usvg::Tree::from_data(bytes, &resvg::usvg::Options::default())
            .map_err(|e| Error::Svg(e.to_string()))?;
        let size = tree.size();
        let width = size.width().ceil() as u32;
        let height = size.height().ceil() as u32;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| Error::Svg(format!("cannot allocate {width}x{height} pixmap")))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );

        // tiny-skia stores premultiplied RGBA
        let pixels = pixmap
            .pixels()
            .iter()
            .map(|p| {
                let c = p.demultiply();
                Color::rgba(c.red(), c.green(), c.blue(), c.alpha())
            })
            .collect();
        Ok(Self::from_parts(width, height, pixels))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Tightly packed RGBA8 bytes, the layout the `image` crate expects.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|c| [c.r, c.g, c.b, c.a])
            .collect()
    }
}
