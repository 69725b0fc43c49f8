//! A software-rendered SVG element tree and rasterizer for embeddable GUIs.
//!
//! Markup is parsed into a [`Document`](document::Document): an arena
//! [`Tree`](tree::Tree) of typed elements with attribute inheritance and
//! recursion-free traversals. Shapes are drawn onto a vector
//! [`Canvas`](canvas::Canvas), and the CPU [`Renderer`](renderer::Renderer)
//! composites canvas output, images, text and widgets into a BGRA pixel
//! buffer.

pub mod attributes;
pub mod canvas;
pub mod color;
pub mod document;
pub mod elements;
pub mod error;
pub mod font;
pub mod path;
pub mod renderer;
pub mod script;
pub mod style;
pub mod tree;
pub mod widgets;
pub mod window;

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::attributes::{AttributeMap, AttributeValue};
    pub use crate::canvas::{Canvas, PixmapCanvas};
    pub use crate::color::Color;
    pub use crate::document::Document;
    pub use crate::elements::{DrawContext, Element, ElementFactory};
    pub use crate::font::{BitmapFont, Font, FontFamily, FontWeight, Glyph};
    pub use crate::path::{DrawCommand, Path, PathBuilder};
    pub use crate::renderer::image::{Image, ImageSource};
    pub use crate::renderer::{Rect, Renderer};
    pub use crate::script::{Runtime, RuntimeConfig, ScriptContext};
    pub use crate::tree::{ElementId, Tree, Visit, Walker};
    pub use crate::widgets::{Widget, WidgetChain};
    pub use crate::window::{Window, WindowConfig};
    pub use crate::{Error, Result};
}
