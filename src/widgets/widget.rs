use crate::renderer::Renderer;

/// Something that draws itself into the renderer once per frame.
///
/// Widgets are owned by the host; the renderer only keeps weak references
/// to them (see [`WidgetChain`](super::WidgetChain)).
pub trait Widget {
    fn render(&self, renderer: &mut Renderer);
}

impl<F> Widget for F
where
    F: Fn(&mut Renderer),
{
    fn render(&self, renderer: &mut Renderer) {
        self(renderer)
    }
}
