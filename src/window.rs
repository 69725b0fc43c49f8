//! Per-frame driver tying a document, the canvas and the renderer together.

use std::rc::Rc;

use crate::canvas::{Canvas, PixmapCanvas};
use crate::color::Color;
use crate::document::Document;
use crate::error::Result;
use crate::renderer::image::Image;
use crate::renderer::Renderer;
use crate::script::ScriptContext;
use crate::widgets::Widget;

#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub background_color: Color,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background_color: Color::rgb(26, 26, 38),
        }
    }
}

/// An off-screen window: each [`Window::draw`] produces one frame in the
/// renderer's pixel buffer.
pub struct Window {
    config: WindowConfig,
    renderer: Renderer,
    canvas: PixmapCanvas,
    document: Option<Document>,
}

impl Window {
    pub fn new() -> Self {
        Self::with_config(WindowConfig::default())
    }

    pub fn with_config(config: WindowConfig) -> Self {
        log::info!("Creating {}x{} window", config.width, config.height);
        Self {
            renderer: Renderer::new(config.width, config.height),
            canvas: PixmapCanvas::new(config.width, config.height),
            document: None,
            config,
        }
    }

    pub fn width(mut self, width: u32) -> Self {
        self.resize(width, self.config.height);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.resize(self.config.width, height);
        self
    }

    pub fn background_color(mut self, color: Color) -> Self {
        self.config.background_color = color;
        self
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Reallocate the frame buffers. The next frame must be drawn again.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width;
        self.config.height = height;
        self.renderer.change_screen_size(width, height);
        self.canvas.resize(width, height);
    }

    /// Replace the displayed document.
    ///
    /// The previous document (if any) is unloaded and returned; the new one
    /// is loaded. Both run their element hooks against `ctx`.
    ///
    /// On error the window keeps showing the previous document. If the new
    /// document fails to load, it is unloaded again and the previous one is
    /// reloaded before the error is returned.
    pub fn set_document(
        &mut self,
        document: Option<Document>,
        ctx: &mut dyn ScriptContext,
    ) -> Result<Option<Document>> {
        if let Some(current) = self.document.as_mut() {
            current.unload(ctx)?;
        }
        let previous = self.document.take();

        let Some(mut new) = document else {
            return Ok(previous);
        };
        if let Err(err) = new.load(ctx) {
            if let Err(unload_err) = new.unload(ctx) {
                log::warn!("Failed to unload rejected document: {unload_err}");
            }
            if let Some(mut previous) = previous {
                if let Err(reload_err) = previous.load(ctx) {
                    log::warn!("Failed to reload previous document: {reload_err}");
                }
                self.document = Some(previous);
            }
            return Err(err);
        }
        self.document = Some(new);
        Ok(previous)
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn document_mut(&mut self) -> Option<&mut Document> {
        self.document.as_mut()
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    pub fn add_widget(&mut self, widget: &Rc<dyn Widget>) {
        self.renderer.add_widget(widget);
    }

    pub fn remove_widget(&mut self, widget: &Rc<dyn Widget>) -> bool {
        self.renderer.remove_widget(widget)
    }

    /// Render one frame: background, document, then widgets on top.
    pub fn draw(&mut self) {
        self.renderer.clear(self.config.background_color);
        if let Some(document) = &self.document {
            self.canvas.clear();
            document.draw(&mut self.canvas);
            self.renderer.draw_image(&self.canvas.to_image(), 0, 0, 0, 0);
        }
        self.renderer.render_widgets();
    }

    pub fn pixels(&self) -> &[Color] {
        self.renderer.pixels()
    }

    /// Copy of the current frame.
    pub fn snapshot(&self) -> Image {
        Image::from_parts(
            self.renderer.width(),
            self.renderer.height(),
            self.renderer.pixels().to_vec(),
        )
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeMap;
    use crate::elements::{Element, ElementFactory};
    use crate::error::Error;
    use crate::renderer::Rect;
    use crate::script::RecordingScriptContext;

    /// Reports its load/unload hooks to the script context.
    struct HookElement {
        attributes: AttributeMap,
    }

    impl Element for HookElement {
        fn tag_name(&self) -> &str {
            "hook"
        }

        fn attributes(&self) -> &AttributeMap {
            &self.attributes
        }

        fn attributes_mut(&mut self) -> &mut AttributeMap {
            &mut self.attributes
        }

        fn load(&mut self, ctx: &mut dyn ScriptContext) -> Result<()> {
            let source = format!("load {}", self.id().unwrap_or_default());
            ctx.evaluate(&source)
        }

        fn unload(&mut self, ctx: &mut dyn ScriptContext) -> Result<()> {
            let source = format!("unload {}", self.id().unwrap_or_default());
            ctx.evaluate(&source)
        }
    }

    /// Records every source and fails on one of them.
    #[derive(Default)]
    struct FailingContext {
        fail_on: Option<&'static str>,
        evaluated: Vec<String>,
    }

    impl ScriptContext for FailingContext {
        fn evaluate(&mut self, source: &str) -> Result<()> {
            self.evaluated.push(source.to_string());
            if self.fail_on == Some(source) {
                return Err(Error::Script(format!("{source} failed")));
            }
            Ok(())
        }
    }

    fn hooked(id: &str) -> Document {
        let mut factory = ElementFactory::default();
        factory.register("hook", |_, attributes| Box::new(HookElement { attributes }));
        let markup = format!(r#"<svg><hook id="{id}"/></svg>"#);
        Document::parse_with_factory(&markup, &factory).unwrap()
    }

    fn shows(window: &Window, id: &str) -> bool {
        window
            .document()
            .and_then(|doc| doc.element_by_id(id))
            .is_some()
    }

    #[test]
    fn failed_load_restores_previous_document() {
        let mut window = Window::with_config(WindowConfig {
            width: 4,
            height: 4,
            background_color: Color::BLACK,
        });
        let mut ctx = FailingContext {
            fail_on: Some("load b"),
            ..Default::default()
        };
        window.set_document(Some(hooked("a")), &mut ctx).unwrap();

        let result = window.set_document(Some(hooked("b")), &mut ctx);
        assert!(matches!(result, Err(Error::Script(_))));
        assert!(shows(&window, "a"));
        assert_eq!(
            ctx.evaluated,
            ["load a", "unload a", "load b", "unload b", "load a"]
        );
    }

    #[test]
    fn failed_unload_keeps_current_document() {
        let mut window = Window::with_config(WindowConfig {
            width: 4,
            height: 4,
            background_color: Color::BLACK,
        });
        let mut ctx = FailingContext {
            fail_on: Some("unload a"),
            ..Default::default()
        };
        window.set_document(Some(hooked("a")), &mut ctx).unwrap();

        assert!(window.set_document(Some(hooked("b")), &mut ctx).is_err());
        assert!(shows(&window, "a"));
        assert!(!ctx.evaluated.iter().any(|s| s == "load b"));

        ctx.fail_on = None;
        let previous = window.set_document(None, &mut ctx).unwrap();
        assert!(previous.is_some());
        assert!(window.document().is_none());
    }

    #[test]
    fn empty_window_shows_background() {
        let mut window = Window::with_config(WindowConfig {
            width: 4,
            height: 3,
            background_color: Color::rgb(1, 2, 3),
        });
        window.draw();
        assert!(window.pixels().iter().all(|&p| p == Color::rgb(1, 2, 3)));
    }

    #[test]
    fn builder_setters_resize() {
        let window = Window::new().width(10).height(5).background_color(Color::WHITE);
        assert_eq!(window.pixels().len(), 50);
        assert_eq!(window.config().background_color, Color::WHITE);
    }

    #[test]
    fn document_is_composited_under_widgets() {
        let mut window = Window::with_config(WindowConfig {
            width: 20,
            height: 20,
            background_color: Color::BLACK,
        });
        let doc = Document::parse(
            r#"<svg><rect x="0" y="0" width="20" height="20" fill="white"/></svg>"#,
        )
        .unwrap();
        let mut ctx = RecordingScriptContext::default();
        assert!(window.set_document(Some(doc), &mut ctx).unwrap().is_none());

        let widget: Rc<dyn Widget> = Rc::new(|renderer: &mut Renderer| {
            renderer.draw_rect(Color::rgb(255, 0, 0), &Rect::new(0, 0, 5, 5));
        });
        window.add_widget(&widget);
        window.draw();

        let frame = window.snapshot();
        assert_eq!(frame.pixel(2, 2), Some(Color::rgb(255, 0, 0)));
        assert_eq!(frame.pixel(10, 10), Some(Color::WHITE));

        assert!(window.remove_widget(&widget));
        let previous = window.set_document(None, &mut ctx).unwrap();
        assert!(previous.is_some());
        window.draw();
        assert_eq!(window.pixels()[0], Color::BLACK);
    }
}
