//! TreeWalker
//!
//! Depth-first, pre-order traversal of a subtree (the root included).
//!
//! [`TreeWalker`] is a cursor: it holds no borrow between steps and is
//! advanced against a `&DomTree`. [`Descendants`] wraps it as an iterator.
//! [`walk`] freezes the sequence at call time so the visitor may mutate the
//! document while the walk continues.

use crate::{Document, DomTree, NodeId};

/// Node filter result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterResult {
    /// Visit the node and its descendants
    Accept,
    /// Skip this node and all of its descendants
    Reject,
    /// Skip this node but visit its descendants
    Skip,
}

/// Pre-order cursor over a subtree
#[derive(Debug, Clone)]
pub struct TreeWalker {
    /// The root node of the traversal
    pub root: NodeId,
    /// Next node to yield (NONE once exhausted)
    current_node: NodeId,
}

impl TreeWalker {
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            current_node: root,
        }
    }

    /// Node the next call to [`next_node`](Self::next_node) will consider
    pub fn current_node(&self) -> NodeId {
        self.current_node
    }

    /// Restart from the root
    pub fn reset(&mut self) {
        self.current_node = self.root;
    }

    /// Yield the next node, applying `filter`
    pub fn next_node<F>(&mut self, tree: &DomTree, mut filter: F) -> Option<NodeId>
    where
        F: FnMut(&DomTree, NodeId) -> FilterResult,
    {
        loop {
            let current = self.current_node;
            if !tree.contains(current) {
                self.current_node = NodeId::NONE;
                return None;
            }
            let verdict = filter(tree, current);
            let descend = verdict != FilterResult::Reject;
            self.current_node = self.successor(tree, current, descend);
            if verdict == FilterResult::Accept {
                return Some(current);
            }
        }
    }

    fn successor(&self, tree: &DomTree, node: NodeId, descend: bool) -> NodeId {
        if descend {
            if let Some(first) = tree.children(node).next() {
                return first;
            }
        }
        let mut current = node;
        while current != self.root {
            let Some(n) = tree.get(current) else {
                break;
            };
            if n.next_sibling.is_valid() {
                return n.next_sibling;
            }
            current = n.parent;
        }
        NodeId::NONE
    }
}

/// Lazy pre-order iterator over a subtree
pub struct Descendants<'a, F = fn(&DomTree, NodeId) -> FilterResult> {
    tree: &'a DomTree,
    walker: TreeWalker,
    filter: F,
}

fn accept_all(_: &DomTree, _: NodeId) -> FilterResult {
    FilterResult::Accept
}

impl<'a> Descendants<'a> {
    pub fn new(tree: &'a DomTree, root: NodeId) -> Self {
        Self {
            tree,
            walker: TreeWalker::new(root),
            filter: accept_all,
        }
    }
}

impl<'a, F> Descendants<'a, F>
where
    F: FnMut(&DomTree, NodeId) -> FilterResult,
{
    pub fn with_filter(tree: &'a DomTree, root: NodeId, filter: F) -> Self {
        Self {
            tree,
            walker: TreeWalker::new(root),
            filter,
        }
    }
}

impl<F> Iterator for Descendants<'_, F>
where
    F: FnMut(&DomTree, NodeId) -> FilterResult,
{
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        self.walker.next_node(self.tree, &mut self.filter)
    }
}

impl DomTree {
    /// `root` and its descendants in pre-order
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants::new(self, root)
    }
}

/// Visit `root` and its descendants in pre-order.
///
/// The sequence is fixed when the walk starts: nodes inserted by `visit` are
/// not visited, and nodes destroyed by `visit` are skipped.
pub fn walk<E, V>(doc: &mut Document, root: NodeId, mut visit: V) -> Result<(), E>
where
    V: FnMut(&mut Document, NodeId) -> Result<(), E>,
{
    let nodes: Vec<NodeId> = doc.tree().descendants(root).collect();
    for id in nodes {
        if doc.tree().contains(id) {
            visit(doc, id)?;
        }
    }
    Ok(())
}
