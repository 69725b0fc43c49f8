use std::rc::{Rc, Weak};

use crate::renderer::Renderer;

use super::Widget;

/// Ordered, non-owning list of widgets rendered each frame.
///
/// Later widgets draw over earlier ones. Widgets dropped by their owner are
/// skipped and pruned on the next render.
#[derive(Default)]
pub struct WidgetChain {
    entries: Vec<Weak<dyn Widget>>,
}

impl WidgetChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `widget` to the end of the chain.
    pub fn add(&mut self, widget: &Rc<dyn Widget>) {
        self.entries.push(Rc::downgrade(widget));
    }

    /// Remove `widget` by identity. Returns whether it was in the chain.
    pub fn remove(&mut self, widget: &Rc<dyn Widget>) -> bool {
        let target = Rc::downgrade(widget);
        match self.entries.iter().position(|w| Weak::ptr_eq(w, &target)) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, widget: &Rc<dyn Widget>) -> bool {
        let target = Rc::downgrade(widget);
        self.entries.iter().any(|w| Weak::ptr_eq(w, &target))
    }

    /// Number of entries, including widgets dropped since the last render.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move every entry of `other` to the end of this chain.
    pub fn append(&mut self, mut other: WidgetChain) {
        self.entries.append(&mut other.entries);
    }

    /// Render live widgets in order and forget the dropped ones.
    pub fn render(&mut self, renderer: &mut Renderer) {
        self.entries.retain(|w| w.strong_count() > 0);
        for entry in &self.entries {
            if let Some(widget) = entry.upgrade() {
                widget.render(renderer);
            }
        }
    }
}
