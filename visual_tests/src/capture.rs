use crate::{Result, VisualTestError};
use image::imageops::FilterType;
use image::RgbaImage;
use std::path::Path;
use vellum::prelude::*;

type RenderFn = fn() -> Result<RgbaImage>;

/// A frame rendered by the engine plus an independent reference rendering
/// of the same content.
pub struct Scene {
    pub name: &'static str,
    render: RenderFn,
    reference: RenderFn,
}

impl Scene {
    pub fn render(&self) -> Result<RgbaImage> {
        (self.render)()
    }

    pub fn reference(&self) -> Result<RgbaImage> {
        (self.reference)()
    }
}

pub const SCENES: &[Scene] = &[
    Scene {
        name: "lanczos_horizontal",
        render: || scale_with_renderer(32, 16, 64, 16),
        reference: || Ok(scale_with_image(32, 16, 64, 16, FilterType::Lanczos3)),
    },
    Scene {
        name: "lanczos_vertical",
        render: || scale_with_renderer(16, 32, 16, 64),
        reference: || Ok(scale_with_image(16, 32, 16, 64, FilterType::Lanczos3)),
    },
    Scene {
        name: "nearest_scaled",
        render: || scale_with_renderer(16, 16, 32, 24),
        reference: || Ok(scale_with_image(16, 16, 32, 24, FilterType::Nearest)),
    },
    Scene {
        name: "document_shapes",
        render: render_document,
        reference: render_document_with_resvg,
    },
];

pub fn find_scene(name: &str) -> Result<&'static Scene> {
    SCENES
        .iter()
        .find(|scene| scene.name == name)
        .ok_or_else(|| VisualTestError::Capture(format!("Unknown scene '{}'", name)))
}

/// Render a scene, save the frame as PNG and hand it back for comparison.
pub fn capture_scene(scene: &Scene, output_path: &Path) -> Result<RgbaImage> {
    let frame = scene.render()?;
    frame.save(output_path)?;
    Ok(frame)
}

/// Smooth two-channel gradient, opaque.
fn gradient_pixel(x: u32, y: u32, width: u32, height: u32) -> [u8; 4] {
    let r = (x * 255 / (width - 1).max(1)) as u8;
    let g = (y * 255 / (height - 1).max(1)) as u8;
    [r, g, 128, 255]
}

fn scale_with_renderer(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> Result<RgbaImage> {
    let rgba: Vec<u8> = (0..src_h)
        .flat_map(|y| (0..src_w).flat_map(move |x| gradient_pixel(x, y, src_w, src_h)))
        .collect();
    let source = Image::from_rgba8(src_w, src_h, &rgba)?;

    let mut renderer = Renderer::new(dst_w, dst_h);
    renderer.draw_image(&source, 0, 0, dst_w, dst_h);
    let frame = Image::from_pixels(dst_w, dst_h, renderer.pixels().to_vec())?;
    to_rgba_image(&frame)
}

fn scale_with_image(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32, filter: FilterType) -> RgbaImage {
    let source = RgbaImage::from_fn(src_w, src_h, |x, y| {
        image::Rgba(gradient_pixel(x, y, src_w, src_h))
    });
    image::imageops::resize(&source, dst_w, dst_h, filter)
}

const DOCUMENT: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="64">
    <rect x="4" y="4" width="56" height="56" rx="6" fill="#3366cc"/>
    <g fill="#ffcc00">
        <circle cx="32" cy="32" r="18" stroke="#000000" stroke-width="2"/>
    </g>
    <polygon points="32,18 44,42 20,42" fill="#cc3333"/>
</svg>"##;

fn render_document() -> Result<RgbaImage> {
    let mut window = Window::with_config(WindowConfig {
        width: 64,
        height: 64,
        background_color: Color::WHITE,
    });
    let mut runtime = Runtime::initialize(RuntimeConfig {
        init_logging: false,
    });
    window.set_document(Some(Document::parse(DOCUMENT)?), runtime.context_mut())?;
    window.draw();
    to_rgba_image(&window.snapshot())
}

fn render_document_with_resvg() -> Result<RgbaImage> {
    let tree = resvg::usvg::Tree::from_data(DOCUMENT.as_bytes(), &resvg::usvg::Options::default())
        .map_err(|e| VisualTestError::Capture(format!("resvg failed to parse: {}", e)))?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(64, 64)
        .ok_or_else(|| VisualTestError::Capture("Failed to allocate pixmap".to_string()))?;
    pixmap.fill(resvg::tiny_skia::Color::WHITE);
    resvg::render(&tree, resvg::tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    // Opaque background, so premultiplied and straight alpha agree.
    RgbaImage::from_raw(64, 64, pixmap.data().to_vec())
        .ok_or_else(|| VisualTestError::Capture("Pixmap size mismatch".to_string()))
}

fn to_rgba_image(frame: &Image) -> Result<RgbaImage> {
    RgbaImage::from_raw(frame.width(), frame.height(), frame.to_rgba8())
        .ok_or_else(|| VisualTestError::Capture("Frame size mismatch".to_string()))
}
