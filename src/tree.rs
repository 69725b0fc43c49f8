//! Arena-based element storage and the traversal engine.
//!
//! The Tree stores every element of a document in a sparse-set arena with
//! generational indices. Structure is kept beside the elements: each node
//! holds its parent handle and the ordered handles of the children it owns.
//!
//! ## Key Features
//!
//! - **Generational Indices**: ElementId contains index + generation so a
//!   stale handle to a destroyed element never resolves to a newer one.
//!
//! - **Exclusive Ownership**: a node owns its children; destroying a node
//!   destroys its whole subtree. `remove_element` hands a subtree back to
//!   the caller as a detached root.
//!
//! - **Recursion-free Traversal**: the [`Walker`] keeps an explicit stack
//!   of `(node, next child)` frames, so walks neither grow the native stack
//!   with document depth nor leave state behind in the nodes. A walk can be
//!   paused between steps and several walks may run over the same tree.
//!
//! - **Attribute Inheritance**: `get_inherited_attribute` resolves a value
//!   by walking the parent chain.

use crate::attributes::AttributeValue;
use crate::elements::Element;
use crate::error::{Error, Result};

/// Unique identifier for an element in the tree.
///
/// Uses a generational index design:
/// - `index`: Position in the sparse array (reusable after removal)
/// - `generation`: Version counter that increments when a slot is reused
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ElementId {
    index: u32,
    generation: u32,
}

impl ElementId {
    fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Combines generation (high bits) with index (low bits).
    pub fn as_u64(self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }
}

/// Entry in the sparse map, pointing to a dense array slot.
struct SparseEntry {
    dense_index: usize,
    generation: u32,
}

/// A node in the tree, containing an element and its structure.
struct Node {
    element: Box<dyn Element>,
    /// Parent element (None for roots and detached subtrees)
    parent: Option<ElementId>,
    /// Owned children, in document order
    children: Vec<ElementId>,
    /// Back-pointer to sparse array index (for swap-remove fixup)
    sparse_index: u32,
}

/// Element arena holding one or more rooted subtrees.
pub struct Tree {
    dense: Vec<Node>,
    sparse: Vec<Option<SparseEntry>>,
    free_indices: Vec<u32>,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            dense: Vec::new(),
            sparse: Vec::new(),
            free_indices: Vec::new(),
        }
    }

    /// Store an element as a new detached root and return its id.
    pub fn register(&mut self, element: Box<dyn Element>) -> ElementId {
        let (sparse_index, generation) = if let Some(idx) = self.free_indices.pop() {
            let old_gen = self.sparse[idx as usize]
                .as_ref()
                .map(|e| e.generation)
                .unwrap_or(0);
            (idx, old_gen.wrapping_add(1))
        } else {
            let idx = self.sparse.len() as u32;
            self.sparse.push(None);
            (idx, 0)
        };

        let dense_index = self.dense.len();
        self.dense.push(Node {
            element,
            parent: None,
            children: Vec::new(),
            sparse_index,
        });
        self.sparse[sparse_index as usize] = Some(SparseEntry {
            dense_index,
            generation,
        });

        ElementId::new(sparse_index, generation)
    }

    /// Destroy an element together with its whole subtree.
    ///
    /// The element is unlinked from its parent first. Stale ids are ignored.
    pub fn destroy(&mut self, id: ElementId) {
        if !self.contains(id) {
            return;
        }
        if let Some(parent) = self.parent(id) {
            self.unlink(parent, id);
        }

        let mut doomed = Vec::new();
        let mut walker = Walker::new(id);
        while let Some(visit) = walker.next(self) {
            if let Visit::Leave(node) = visit {
                doomed.push(node);
            }
        }
        for node in doomed {
            self.release_slot(node);
        }
    }

    /// Swap-remove a single node from the arena without touching links.
    fn release_slot(&mut self, id: ElementId) {
        let Some(dense_index) = self.dense_index(id) else {
            return;
        };
        let last_dense_index = self.dense.len() - 1;
        let removed = self.dense.swap_remove(dense_index);

        if dense_index != last_dense_index {
            let moved_sparse_idx = self.dense[dense_index].sparse_index;
            if let Some(ref mut entry) = self.sparse[moved_sparse_idx as usize] {
                entry.dense_index = dense_index;
            }
        }

        // Keep the generation so the next allocation of this slot bumps it.
        self.sparse[id.index as usize] = Some(SparseEntry {
            dense_index: usize::MAX,
            generation: id.generation,
        });
        self.free_indices.push(id.index);
        drop(removed);
    }

    fn dense_index(&self, id: ElementId) -> Option<usize> {
        self.sparse
            .get(id.index as usize)
            .and_then(|e| e.as_ref())
            .filter(|e| e.generation == id.generation && e.dense_index != usize::MAX)
            .map(|e| e.dense_index)
    }

    fn node(&self, id: ElementId) -> Option<&Node> {
        self.dense_index(id).map(|idx| &self.dense[idx])
    }

    fn node_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.dense_index(id).map(move |idx| &mut self.dense[idx])
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.dense_index(id).is_some()
    }

    pub fn get(&self, id: ElementId) -> Option<&dyn Element> {
        self.node(id).map(|n| &*n.element)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut dyn Element> {
        match self.node_mut(id) {
            Some(node) => Some(&mut *node.element),
            None => None,
        }
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Children of an element in document order (empty for stale ids).
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Whether `ancestor` is `id` itself or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Make `child` the last child of `parent`.
    ///
    /// A child that is still attached elsewhere is moved. Inserting a node
    /// beneath itself is rejected.
    pub fn add_element(&mut self, parent: ElementId, child: ElementId) -> Result<ElementId> {
        if !self.contains(parent) {
            return Err(Error::UnknownElement(parent));
        }
        if !self.contains(child) {
            return Err(Error::UnknownElement(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(Error::CyclicInsertion { parent, child });
        }
        if let Some(old_parent) = self.parent(child) {
            log::debug!("Moving {:?} from {:?} to {:?}", child, old_parent, parent);
            self.unlink(old_parent, child);
        }

        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        Ok(child)
    }

    /// Register `element` and append it under `parent` in one step.
    pub fn append(&mut self, parent: ElementId, element: Box<dyn Element>) -> Result<ElementId> {
        let child = self.register(element);
        self.add_element(parent, child).inspect_err(|_| self.destroy(child))
    }

    /// Detach `child` from `parent` and hand its subtree to the caller.
    ///
    /// Returns `None` when `child` is not one of `parent`'s children.
    pub fn remove_element(&mut self, parent: ElementId, child: ElementId) -> Option<ElementId> {
        if self.parent(child) != Some(parent) {
            return None;
        }
        self.unlink(parent, child);
        Some(child)
    }

    fn unlink(&mut self, parent: ElementId, child: ElementId) {
        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|&c| c != child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = None;
        }
    }

    /// Local attribute lookup, `default` when not set.
    pub fn get_attribute(&self, id: ElementId, name: &str, default: AttributeValue) -> AttributeValue {
        self.get(id)
            .and_then(|e| e.attribute(name))
            .cloned()
            .unwrap_or(default)
    }

    /// Attribute lookup that falls back to the closest ancestor defining it.
    pub fn get_inherited_attribute(
        &self,
        id: ElementId,
        name: &str,
        default: AttributeValue,
    ) -> AttributeValue {
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(value) = self.get(node).and_then(|e| e.attribute(name)) {
                return value.clone();
            }
            current = self.parent(node);
        }
        default
    }

    /// Iterate `Enter`/`Leave` events for the subtree rooted at `root`.
    pub fn walk(&self, root: ElementId) -> Traverse<'_> {
        Traverse {
            tree: self,
            walker: Walker::new(root),
        }
    }

    /// Ids of the subtree rooted at `root`, in pre-order.
    pub fn descendants(&self, root: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        self.walk(root).filter_map(|visit| match visit {
            Visit::Enter(id) => Some(id),
            Visit::Leave(_) => None,
        })
    }

    /// Apply `action` to every element of the subtree, parents first.
    pub fn traverse_pre_order(&self, root: ElementId, mut action: impl FnMut(ElementId, &dyn Element)) {
        for id in self.descendants(root) {
            if let Some(element) = self.get(id) {
                action(id, element);
            }
        }
    }

    /// Mutable variant of [`Tree::traverse_pre_order`].
    ///
    /// The action sees each element after its ancestors and before its
    /// children, so it may still edit the children list of the element it
    /// is given through a later step.
    pub fn traverse_pre_order_mut(
        &mut self,
        root: ElementId,
        mut action: impl FnMut(ElementId, &mut dyn Element),
    ) {
        let mut walker = Walker::new(root);
        while let Some(visit) = walker.next(self) {
            if let Visit::Enter(id) = visit {
                if let Some(element) = self.get_mut(id) {
                    action(id, element);
                }
            }
        }
    }

    /// Apply `action` to every element of the subtree, children first.
    pub fn traverse_post_order(&self, root: ElementId, mut action: impl FnMut(ElementId, &dyn Element)) {
        for visit in self.walk(root) {
            if let Visit::Leave(id) = visit {
                if let Some(element) = self.get(id) {
                    action(id, element);
                }
            }
        }
    }

    /// Mutable variant of [`Tree::traverse_post_order`].
    pub fn traverse_post_order_mut(
        &mut self,
        root: ElementId,
        mut action: impl FnMut(ElementId, &mut dyn Element),
    ) {
        let mut walker = Walker::new(root);
        while let Some(visit) = walker.next(self) {
            if let Visit::Leave(id) = visit {
                if let Some(element) = self.get_mut(id) {
                    action(id, element);
                }
            }
        }
    }

    /// Run `preamble` on arrival and `postamble` on departure of every
    /// element, the root included.
    pub fn traverse_pre_post(
        &self,
        root: ElementId,
        preamble: impl FnMut(ElementId, &dyn Element),
        postamble: impl FnMut(ElementId, &dyn Element),
    ) {
        self.traverse_pre_post_while(root, preamble, postamble, |_, _| true);
    }

    /// Like [`Tree::traverse_pre_post`], pruned by `predicate`.
    ///
    /// If the predicate rejects the root nothing is visited at all. Any other
    /// rejected element still gets its preamble and postamble, but its
    /// children are skipped.
    pub fn traverse_pre_post_while(
        &self,
        root: ElementId,
        mut preamble: impl FnMut(ElementId, &dyn Element),
        mut postamble: impl FnMut(ElementId, &dyn Element),
        mut predicate: impl FnMut(ElementId, &dyn Element) -> bool,
    ) {
        match self.get(root) {
            Some(element) if predicate(root, element) => {}
            _ => return,
        }

        let mut walker = Walker::new(root);
        while let Some(visit) = walker.next(self) {
            match visit {
                Visit::Enter(id) => {
                    let Some(element) = self.get(id) else { continue };
                    preamble(id, element);
                    if id != root && !predicate(id, element) {
                        walker.skip_children();
                    }
                }
                Visit::Leave(id) => {
                    if let Some(element) = self.get(id) {
                        postamble(id, element);
                    }
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.dense.clear();
        self.sparse.clear();
        self.free_indices.clear();
    }

    /// Number of live elements across all subtrees.
    pub fn element_count(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// One step of a depth-first walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// The walk arrived at an element (before its children).
    Enter(ElementId),
    /// The walk is leaving an element (after its children).
    Leave(ElementId),
}

struct Frame {
    id: ElementId,
    next_child: usize,
}

/// Resumable depth-first walker over a [`Tree`].
///
/// The walker does not borrow the tree between steps, so the caller may
/// mutate elements (or the tree) in between. Children added to or removed
/// from an element that is still on the walk stack are picked up by
/// position.
pub struct Walker {
    start: Option<ElementId>,
    stack: Vec<Frame>,
}

impl Walker {
    pub fn new(root: ElementId) -> Self {
        Self {
            start: Some(root),
            stack: Vec::new(),
        }
    }

    /// Produce the next event, or `None` once the root has been left.
    pub fn next(&mut self, tree: &Tree) -> Option<Visit> {
        if let Some(root) = self.start.take() {
            if !tree.contains(root) {
                return None;
            }
            self.stack.push(Frame {
                id: root,
                next_child: 0,
            });
            return Some(Visit::Enter(root));
        }

        let top = self.stack.last_mut()?;
        let children = tree.children(top.id);
        if let Some(&child) = children.get(top.next_child) {
            top.next_child += 1;
            self.stack.push(Frame {
                id: child,
                next_child: 0,
            });
            Some(Visit::Enter(child))
        } else {
            self.stack.pop().map(|frame| Visit::Leave(frame.id))
        }
    }

    /// Do not descend into the children of the element entered last; the
    /// next event will be its `Leave`.
    pub fn skip_children(&mut self) {
        if let Some(top) = self.stack.last_mut() {
            top.next_child = usize::MAX;
        }
    }

    /// Number of elements currently entered but not yet left.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_finished(&self) -> bool {
        self.start.is_none() && self.stack.is_empty()
    }
}

/// Borrowing iterator adapter around a [`Walker`].
pub struct Traverse<'a> {
    tree: &'a Tree,
    walker: Walker,
}

impl Traverse<'_> {
    /// See [`Walker::skip_children`].
    pub fn skip_children(&mut self) {
        self.walker.skip_children();
    }
}

impl Iterator for Traverse<'_> {
    type Item = Visit;

    fn next(&mut self) -> Option<Visit> {
        self.walker.next(self.tree)
    }
}
