use crate::attributes::AttributeMap;
use crate::error::Result;
use crate::script::ScriptContext;

use super::{apply_style, Element};

/// `<script>`: collects its character data and runs it when the document
/// is loaded.
pub struct ScriptElement {
    attributes: AttributeMap,
    source: String,
}

impl ScriptElement {
    pub fn new(mut attributes: AttributeMap) -> Self {
        apply_style("script", &mut attributes);
        Self {
            attributes,
            source: String::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl Element for ScriptElement {
    fn tag_name(&self) -> &str {
        "script"
    }

    fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut AttributeMap {
        &mut self.attributes
    }

    fn is_draw_enabled(&self) -> bool {
        false
    }

    fn append_text(&mut self, text: &str) {
        self.source.push_str(text);
    }

    fn load(&mut self, ctx: &mut dyn ScriptContext) -> Result<()> {
        if self.source.trim().is_empty() {
            return Ok(());
        }
        log::debug!("Evaluating script ({} bytes)", self.source.len());
        ctx.evaluate(&self.source)
    }
}
