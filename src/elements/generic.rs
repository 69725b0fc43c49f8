use crate::attributes::AttributeMap;

use super::{apply_style, Element};

/// Tags that describe content but never paint it.
const NON_RENDERING: &[&str] = &["defs", "title", "desc", "metadata", "symbol"];

/// Container and unknown elements (`svg`, `g`, `defs`, ...).
///
/// Draws nothing itself; it only carries attributes its descendants inherit.
pub struct GenericElement {
    tag: String,
    attributes: AttributeMap,
}

impl GenericElement {
    pub fn new(tag: impl Into<String>, mut attributes: AttributeMap) -> Self {
        let tag = tag.into();
        apply_style(&tag, &mut attributes);
        Self { tag, attributes }
    }
}

impl Element for GenericElement {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut AttributeMap {
        &mut self.attributes
    }

    fn is_draw_enabled(&self) -> bool {
        !NON_RENDERING.contains(&self.tag.as_str())
    }
}
