use std::rc::Rc;

use vellum::prelude::*;

const DOCUMENT: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="320" height="240">
    <rect x="16" y="16" width="288" height="208" rx="12" fill="#2a2a3c" stroke="#5577aa" stroke-width="2"/>
    <g fill="#88aaff" opacity="0.8">
        <circle cx="96" cy="120" r="48"/>
        <ellipse cx="224" cy="120" rx="56" ry="32" fill="#ffaa55"/>
    </g>
    <polyline points="40,200 80,170 120,190 160,150 200,180 240,140 280,160"
              fill="none" stroke="#aaffaa" stroke-width="3"/>
    <path d="M 140 60 A 20 20 0 0 1 180 60 L 160 90 Z" style="fill: #ff5577"/>
    <script>console.log("loaded")</script>
</svg>"##;

fn main() -> vellum::Result<()> {
    let mut runtime = Runtime::initialize(RuntimeConfig::default());

    let mut window = Window::new()
        .width(320)
        .height(240)
        .background_color(Color::rgb(20, 20, 28));
    window.set_document(Some(Document::parse(DOCUMENT)?), runtime.context_mut())?;

    // Status bar drawn on top of the document every frame
    let status: Rc<dyn Widget> = Rc::new(|renderer: &mut Renderer| {
        let width = renderer.width() as i32;
        let height = renderer.height() as i32;
        let bar = Rect::new(0, height - 12, width, 12);
        renderer.draw_rect(Color::rgba(0, 0, 0, 160), &bar);
        renderer.draw_rect_outline(Color::rgb(85, 119, 170), &bar);
        renderer.draw_string(Color::WHITE, 4, height - 2, "vellum");
    });
    window.add_widget(&status);

    let font: Rc<dyn Font> = Rc::new(BitmapFont::rasterize(
        &FontFamily::SansSerif,
        FontWeight::NORMAL,
        10.0,
        'a'..='z',
    ));
    window.renderer_mut().set_font(Some(font));

    window.draw();

    let frame = window.snapshot();
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "render_document.png".to_string());
    if let Some(png) = image::RgbaImage::from_raw(frame.width(), frame.height(), frame.to_rgba8()) {
        png.save(&output)?;
        log::info!("Wrote {}", output);
    }

    window.set_document(None, runtime.context_mut())?;
    runtime.finalize();
    Ok(())
}
