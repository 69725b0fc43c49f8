//! Markup loading and whole-document operations.

use std::cell::RefCell;
use std::path::Path;

use crate::attributes::attributes_from_markup;
use crate::canvas::Canvas;
use crate::elements::{DrawContext, ElementFactory};
use crate::error::{Error, Result};
use crate::script::ScriptContext;
use crate::tree::{ElementId, Tree};

/// An element tree built from markup.
pub struct Document {
    tree: Tree,
    root: ElementId,
}

impl Document {
    /// Parse markup with the built-in element kinds.
    pub fn parse(markup: &str) -> Result<Self> {
        Self::parse_with_factory(markup, &ElementFactory::default())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let markup = std::fs::read_to_string(path)?;
        log::info!("Loading document {}", path.display());
        Self::parse(&markup)
    }

    /// Parse markup, building elements through `factory`.
    pub fn parse_with_factory(markup: &str, factory: &ElementFactory) -> Result<Self> {
        let xml = roxmltree::Document::parse(markup)?;
        let xml_root = xml.root_element();

        let mut tree = Tree::new();
        let root = tree.register(create_element(factory, xml_root));

        // Explicit stack; children are pushed reversed to pop in document order.
        let mut pending: Vec<(roxmltree::Node, ElementId)> = xml_root
            .children()
            .rev()
            .map(|child| (child, root))
            .collect();

        while let Some((node, parent)) = pending.pop() {
            if node.is_text() {
                if let (Some(text), Some(element)) = (node.text(), tree.get_mut(parent)) {
                    element.append_text(text);
                }
                continue;
            }
            if !node.is_element() {
                continue;
            }
            let id = tree.append(parent, create_element(factory, node))?;
            pending.extend(node.children().rev().map(|child| (child, id)));
        }

        log::debug!("Parsed document with {} elements", tree.element_count());
        Ok(Self { tree, root })
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// First element (in document order) whose `id` attribute is `id`.
    pub fn element_by_id(&self, id: &str) -> Option<ElementId> {
        self.tree
            .descendants(self.root)
            .find(|&node| self.tree.get(node).and_then(|e| e.id()) == Some(id))
    }

    /// Draw the document onto `canvas`.
    ///
    /// Subtrees under elements that are not draw enabled are skipped; such
    /// an element still gets its own start/finish calls.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        let tree = &self.tree;
        let canvas = RefCell::new(canvas);
        tree.traverse_pre_post_while(
            self.root,
            |id, element| {
                let mut canvas = canvas.borrow_mut();
                element.draw_start(&mut DrawContext {
                    canvas: &mut **canvas,
                    tree,
                    id,
                });
            },
            |id, element| {
                let mut canvas = canvas.borrow_mut();
                element.draw_finish(&mut DrawContext {
                    canvas: &mut **canvas,
                    tree,
                    id,
                });
            },
            |_, element| element.is_draw_enabled(),
        );
    }

    /// Run every element's `load`, parents before children.
    ///
    /// Stops at the first failing element and returns its error.
    pub fn load(&mut self, ctx: &mut dyn ScriptContext) -> Result<()> {
        let mut result = Ok(());
        self.tree.traverse_pre_order_mut(self.root, |id, element| {
            if result.is_ok() {
                result = element.load(ctx).inspect_err(|err| {
                    log::error!("Failed to load {:?} ({id:?}): {err}", element.tag_name())
                });
            }
        });
        result
    }

    /// Run every element's `unload`, children before parents.
    pub fn unload(&mut self, ctx: &mut dyn ScriptContext) -> Result<()> {
        let mut result = Ok(());
        self.tree.traverse_post_order_mut(self.root, |id, element| {
            if result.is_ok() {
                result = element.unload(ctx).inspect_err(|err| {
                    log::error!("Failed to unload {:?} ({id:?}): {err}", element.tag_name())
                });
            }
        });
        result
    }
}

fn create_element(
    factory: &ElementFactory,
    node: roxmltree::Node,
) -> Box<dyn crate::elements::Element> {
    let attributes = attributes_from_markup(node.attributes().map(|a| (a.name(), a.value())));
    factory.create(node.tag_name().name(), attributes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeValue;
    use crate::color::Color;
    use crate::path::Path as GeometryPath;
    use crate::script::RecordingScriptContext;

    /// Records draw calls instead of rasterizing.
    #[derive(Default)]
    struct RecordingCanvas {
        fills: Vec<Color>,
        drawn: Vec<usize>,
    }

    impl Canvas for RecordingCanvas {
        fn set_fill_color(&mut self, color: Color) {
            self.fills.push(color);
        }
        fn set_stroke_color(&mut self, _: Color) {}
        fn set_stroke_width(&mut self, _: f64) {}
        fn set_fill_opacity(&mut self, _: f64) {}
        fn set_stroke_opacity(&mut self, _: f64) {}
        fn draw(&mut self, path: &GeometryPath) {
            self.drawn.push(path.len());
        }
        fn clear(&mut self) {}
        fn resize(&mut self, _: u32, _: u32) {}
        fn width(&self) -> u32 {
            0
        }
        fn height(&self) -> u32 {
            0
        }
    }

    const MARKUP: &str = r##"
        <svg xmlns="http://www.w3.org/2000/svg" width="100" height="100" fill="red">
            <title>ignored</title>
            <g id="layer">
                <circle id="dot" cx="10" cy="10" r="5"/>
                <rect x="0" y="0" width="4" height="4" fill="#00ff00"/>
            </g>
            <defs>
                <circle id="hidden" cx="1" cy="1" r="1"/>
            </defs>
            <script>first();</script>
        </svg>"##;

    #[test]
    fn builds_tree_in_document_order() {
        let doc = Document::parse(MARKUP).unwrap();
        let tree = doc.tree();
        let tags: Vec<_> = tree
            .descendants(doc.root())
            .map(|id| tree.get(id).unwrap().tag_name().to_string())
            .collect();
        assert_eq!(
            tags,
            ["svg", "title", "g", "circle", "rect", "defs", "circle", "script"]
        );
    }

    #[test]
    fn finds_elements_by_id() {
        let doc = Document::parse(MARKUP).unwrap();
        let dot = doc.element_by_id("dot").unwrap();
        let layer = doc.element_by_id("layer").unwrap();
        assert_eq!(doc.tree().parent(dot), Some(layer));
        assert!(doc.element_by_id("missing").is_none());
    }

    #[test]
    fn fill_is_inherited_from_root() {
        let doc = Document::parse(MARKUP).unwrap();
        let dot = doc.element_by_id("dot").unwrap();
        assert_eq!(
            doc.tree()
                .get_inherited_attribute(dot, "fill", AttributeValue::Absent),
            AttributeValue::Color(Color::rgb(255, 0, 0))
        );
    }

    #[test]
    fn draw_skips_non_rendering_subtrees() {
        let doc = Document::parse(MARKUP).unwrap();
        let mut canvas = RecordingCanvas::default();
        doc.draw(&mut canvas);

        // Only the circle and the rect in <g>; nothing under <defs>.
        assert_eq!(canvas.drawn, [6, 5]);
        assert_eq!(
            canvas.fills,
            [Color::rgb(255, 0, 0), Color::rgb(0, 255, 0)]
        );
    }

    #[test]
    fn load_runs_scripts() {
        let mut doc = Document::parse(MARKUP).unwrap();
        let mut ctx = RecordingScriptContext::default();
        doc.load(&mut ctx).unwrap();
        assert_eq!(ctx.evaluated, ["first();"]);
        doc.unload(&mut ctx).unwrap();
    }

    #[test]
    fn deep_nesting_does_not_recurse() {
        let depth = 512;
        let markup = format!("{}{}", "<g>".repeat(depth), "</g>".repeat(depth));
        let doc = Document::parse(&markup).unwrap();
        assert_eq!(doc.tree().element_count(), depth);
        assert_eq!(doc.tree().walk(doc.root()).count(), 2 * depth);
    }

    #[test]
    fn malformed_markup_is_an_error() {
        assert!(matches!(
            Document::parse("<svg><g></svg>"),
            Err(Error::Markup(_))
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        assert!(matches!(
            Document::from_file("no/such/file.svg"),
            Err(Error::NotFound(_))
        ));
    }
}
