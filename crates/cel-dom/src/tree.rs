//! DOM Tree (arena-based allocation)
//!
//! Structural edits here are raw link operations. Validation and mutation
//! records live one layer up, in [`Document`](crate::Document).

use crate::{Namespace, Node, NodeData, NodeId};

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    slots: Vec<Slot>,
    /// Indices of freed slots, reused LIFO
    free: Vec<u32>,
    root: NodeId,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId::NONE,
        };
        tree.root = tree.alloc(Node::document());
        tree
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId::from_raw_parts(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId::from_raw_parts(index, 0)
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_ref()
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_mut()
    }

    /// Check the id resolves to a live node
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live nodes in the tree
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Check if the tree holds only the document node
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.alloc(Node::element(name, Namespace::Html))
    }

    pub fn create_element_ns(&mut self, namespace: Namespace, name: &str) -> NodeId {
        self.alloc(Node::element(name, namespace))
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.alloc(Node::text(content))
    }

    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.alloc(Node::comment(content))
    }

    pub fn create_document_fragment(&mut self) -> NodeId {
        self.alloc(Node::fragment())
    }

    /// Parent of a node, if it has one
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)
            .map(|n| n.parent)
            .filter(|p| p.is_valid())
    }

    /// Children of a node, empty when its `childNodes` surface is masked
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let first = match self.get(id) {
            Some(node) if !node.child_nodes_masked => node.first_child,
            _ => NodeId::NONE,
        };
        Children {
            tree: self,
            next: first,
        }
    }

    /// First child, `None` when childless or masked
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).next()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)
            .map(|n| n.next_sibling)
            .filter(|s| s.is_valid())
    }

    /// Children ignoring surface masks
    pub(crate) fn raw_children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut next = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
        while let Some(node) = self.get(next) {
            out.push(next);
            next = node.next_sibling;
        }
        out
    }

    /// Tag name of an element, `None` for other nodes or masked elements
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        let node = self.get(id)?;
        if node.tag_name_masked {
            return None;
        }
        node.as_element().map(|e| e.name.as_str())
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id)?.as_element()?.get_attr(name)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    /// Attribute names in insertion order
    pub fn attribute_names(&self, id: NodeId) -> Vec<String> {
        self.get(id)
            .and_then(Node::as_element)
            .map(|e| e.attrs.iter().map(|a| a.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Check `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        while let Some(n) = self.get(current) {
            if current == ancestor {
                return true;
            }
            current = n.parent;
        }
        false
    }

    /// Check the node is reachable from the document node
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(id) && self.is_inclusive_ancestor(self.root, id)
    }

    /// Elements under `root` (inclusive) with the given local name, in tree order
    pub fn elements_by_tag_name(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&id| self.tag_name(id) == Some(name))
            .collect()
    }

    /// Link `child` into `parent` before `reference` (append if NONE).
    ///
    /// `child` must already be unlinked.
    pub(crate) fn link(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        let prev = if reference.is_valid() {
            self.get(reference).map_or(NodeId::NONE, |n| n.prev_sibling)
        } else {
            self.get(parent).map_or(NodeId::NONE, |n| n.last_child)
        };

        if let Some(node) = self.get_mut(child) {
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = reference;
        }
        match self.get_mut(prev) {
            Some(p) => p.next_sibling = child,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.first_child = child;
                }
            }
        }
        match self.get_mut(reference) {
            Some(r) => r.prev_sibling = child,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.last_child = child;
                }
            }
        }
    }

    /// Unlink a node from its parent and siblings
    pub(crate) fn unlink(&mut self, child: NodeId) {
        let Some(node) = self.get(child) else {
            return;
        };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);

        match self.get_mut(prev) {
            Some(p) => p.next_sibling = next,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.first_child = next;
                }
            }
        }
        match self.get_mut(next) {
            Some(n) => n.prev_sibling = prev,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.last_child = prev;
                }
            }
        }
        if let Some(node) = self.get_mut(child) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    /// Free an unlinked subtree; its ids go stale
    pub(crate) fn free_subtree(&mut self, root: NodeId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            stack.extend(self.raw_children(id));
            let slot = &mut self.slots[id.index() as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index());
        }
    }

    pub(crate) fn is_document(&self, id: NodeId) -> bool {
        matches!(self.get(id).map(|n| &n.data), Some(NodeData::Document))
    }
}

/// Iterator over the children of a node
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.tree.get(self.next)?;
        let current = self.next;
        self.next = node.next_sibling;
        Some(current)
    }
}
