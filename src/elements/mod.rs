//! Element kinds stored in the [`Tree`](crate::tree::Tree).

pub mod factory;
pub mod generic;
pub mod script;
pub mod shape;

use crate::attributes::{lookup, AttributeMap, AttributeValue};
use crate::canvas::Canvas;
use crate::error::Result;
use crate::path::Path;
use crate::script::ScriptContext;
use crate::style::parse_style;
use crate::tree::{ElementId, Tree};

pub use factory::{ElementConstructor, ElementFactory};
pub use generic::GenericElement;
pub use script::ScriptElement;
pub use shape::{ShapeElement, ShapeKind};

/// What an element sees while the document is drawn.
pub struct DrawContext<'a> {
    pub canvas: &'a mut dyn Canvas,
    pub tree: &'a Tree,
    /// The element being drawn.
    pub id: ElementId,
}

impl DrawContext<'_> {
    /// Inherited attribute of the element being drawn.
    pub fn inherited(&self, name: &str, default: AttributeValue) -> AttributeValue {
        self.tree.get_inherited_attribute(self.id, name, default)
    }
}

pub trait Element {
    fn tag_name(&self) -> &str;
    fn attributes(&self) -> &AttributeMap;
    fn attributes_mut(&mut self) -> &mut AttributeMap;

    /// Local attribute, `None` when not set.
    fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        lookup(self.attributes(), name)
    }

    /// The markup `id` attribute.
    fn id(&self) -> Option<&str> {
        self.attribute("id").and_then(AttributeValue::as_text)
    }

    /// Whether the draw walk descends into this element's children.
    fn is_draw_enabled(&self) -> bool {
        true
    }

    /// Called when the draw walk arrives at this element.
    fn draw_start(&self, ctx: &mut DrawContext<'_>) {
        let _ = ctx;
    }

    /// Called when the draw walk leaves this element, after its children.
    fn draw_finish(&self, ctx: &mut DrawContext<'_>) {
        let _ = ctx;
    }

    /// Called top-down when the document is attached to a window.
    fn load(&mut self, ctx: &mut dyn ScriptContext) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called bottom-up when the document is detached from a window.
    fn unload(&mut self, ctx: &mut dyn ScriptContext) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Geometry of shape elements.
    fn path(&self) -> Option<&Path> {
        None
    }

    /// Character data found directly inside the element in markup.
    fn append_text(&mut self, text: &str) {
        let _ = text;
    }
}

impl std::fmt::Debug for dyn Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag_name())
            .field("id", &self.id())
            .finish()
    }
}

/// Merge the `style` attribute into `attributes`.
///
/// A malformed style is logged and dropped; the plain attributes stay.
pub(crate) fn apply_style(tag: &str, attributes: &mut AttributeMap) {
    let Some(style) = lookup(attributes, "style")
        .and_then(AttributeValue::as_text)
        .map(str::to_owned)
    else {
        return;
    };

    if let Err(err) = parse_style(attributes, &style) {
        let id = lookup(attributes, "id")
            .and_then(AttributeValue::as_text)
            .unwrap_or("<anonymous>");
        log::warn!("Ignoring style of <{tag} id=\"{id}\">: {err}");
    }
}

/// Numeric attribute or `0.0`.
pub(crate) fn number_attribute(attributes: &AttributeMap, name: &str) -> f64 {
    optional_number(attributes, name).unwrap_or(0.0)
}

pub(crate) fn optional_number(attributes: &AttributeMap, name: &str) -> Option<f64> {
    lookup(attributes, name).and_then(AttributeValue::as_number)
}
