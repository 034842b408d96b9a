//! Document - High-level document API
//!
//! All mutations go through [`Document`] so that mutation records are queued
//! and attribute hooks run. The document also owns the microtask queue that
//! drives record delivery.

use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::observer::MutationObservers;
use crate::{
    AttributeChange, DomError, DomResult, DomTree, MutationObserverInit, MutationRecord, Namespace,
    NodeId, ObserverId,
};

/// Deferred unit of work run at the next microtask checkpoint
pub type Microtask = Box<dyn FnOnce(&mut Document) -> anyhow::Result<()>>;

/// Synchronous attribute mutation hook.
///
/// Runs after the new value is stored, before the mutating call returns.
pub trait AttributeHook {
    fn attribute_changed(
        &self,
        doc: &mut Document,
        element: NodeId,
        change: &AttributeChange,
    ) -> anyhow::Result<()>;
}

/// Handle returned by [`Document::add_attribute_hook`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

/// HTML Document
pub struct Document {
    tree: DomTree,
    observers: MutationObservers,
    hooks: Vec<(HookId, Rc<dyn AttributeHook>)>,
    next_hook: u64,
    microtasks: VecDeque<Microtask>,
    /// Destroyed subtrees still named by undelivered records
    deferred_frees: Vec<NodeId>,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.tree.len())
            .field("hooks", &self.hooks.len())
            .field("microtasks", &self.microtasks.len())
            .field("mutation_observers", &self.observers.is_supported())
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with `<html><head></head><body></body></html>`
    pub fn new() -> Self {
        let mut doc = Self::empty();
        let root = doc.tree.root();
        let html = doc.tree.create_element("html");
        let head = doc.tree.create_element("head");
        let body = doc.tree.create_element("body");

        doc.tree.link(root, html, NodeId::NONE);
        doc.tree.link(html, head, NodeId::NONE);
        doc.tree.link(html, body, NodeId::NONE);

        doc.html_element = html;
        doc.head_element = head;
        doc.body_element = body;
        doc
    }

    /// Create an empty document (no structure)
    pub fn empty() -> Self {
        Self {
            tree: DomTree::new(),
            observers: MutationObservers::new(true),
            hooks: Vec::new(),
            next_hook: 1,
            microtasks: VecDeque::new(),
            deferred_frees: Vec::new(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
        }
    }

    /// A document whose host offers no mutation observers
    pub fn without_mutation_observers() -> Self {
        let mut doc = Self::new();
        doc.observers = MutationObservers::new(false);
        doc
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.tree.create_element(name)
    }

    pub fn create_element_ns(&mut self, namespace: Namespace, name: &str) -> NodeId {
        self.tree.create_element_ns(namespace, name)
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.tree.create_text(content)
    }

    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.tree.create_comment(content)
    }

    pub fn create_document_fragment(&mut self) -> NodeId {
        self.tree.create_document_fragment()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.parent(id)
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        self.tree.is_connected(id)
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.tree.get_attribute(id, name)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.tree.has_attribute(id, name)
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Append a child node
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (append if `None`).
    ///
    /// Inserting a fragment moves its children and leaves it empty.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<NodeId> {
        self.check_insertable(parent, child)?;

        let mut reference = match reference {
            Some(r) if self.tree.parent(r) != Some(parent) => return Err(DomError::NotAChild),
            Some(r) => r,
            None => NodeId::NONE,
        };
        if reference == child {
            reference = self.tree.get(child).map_or(NodeId::NONE, |n| n.next_sibling);
        }

        let is_fragment = self.tree.get(child).is_some_and(|n| n.is_fragment());
        let nodes = if is_fragment {
            let nodes = self.tree.raw_children(child);
            if nodes.is_empty() {
                return Ok(child);
            }
            for &node in &nodes {
                self.tree.unlink(node);
            }
            self.queue_record(MutationRecord::child_list(child, Vec::new(), nodes.clone(), None, None));
            nodes
        } else {
            if let Some(old_parent) = self.tree.parent(child) {
                self.detach_child(old_parent, child);
            }
            vec![child]
        };

        self.insert_nodes(parent, &nodes, reference);
        Ok(child)
    }

    /// Remove a child node
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        if !self.tree.contains(child) {
            return Err(DomError::NotFound);
        }
        if self.tree.parent(child) != Some(parent) {
            return Err(DomError::NotAChild);
        }
        self.detach_child(parent, child);
        Ok(child)
    }

    /// Replace all children of `parent` with `nodes` in one mutation.
    ///
    /// The bulk content replacement of `innerHTML = ...`; an empty slice
    /// clears the node.
    pub fn replace_children(&mut self, parent: NodeId, nodes: &[NodeId]) -> DomResult<()> {
        for &node in nodes {
            self.check_insertable(parent, node)?;
        }

        let removed = self.tree.raw_children(parent);
        for &node in &removed {
            self.tree.unlink(node);
        }

        let mut added = Vec::with_capacity(nodes.len());
        for &node in nodes {
            if self.tree.get(node).is_some_and(|n| n.is_fragment()) {
                let children = self.tree.raw_children(node);
                for &c in &children {
                    self.tree.unlink(c);
                }
                if !children.is_empty() {
                    self.queue_record(MutationRecord::child_list(
                        node,
                        Vec::new(),
                        children.clone(),
                        None,
                        None,
                    ));
                }
                added.extend(children);
            } else {
                if let Some(old_parent) = self.tree.parent(node) {
                    self.detach_child(old_parent, node);
                }
                added.push(node);
            }
        }

        for &node in &added {
            self.tree.link(parent, node, NodeId::NONE);
        }
        if !added.is_empty() || !removed.is_empty() {
            self.queue_record(MutationRecord::child_list(parent, added, removed, None, None));
        }
        Ok(())
    }

    /// Free a detached subtree. Its ids (and all descendants') go stale.
    ///
    /// While undelivered mutation records still name a node of the subtree,
    /// the free waits until the end of the next microtask checkpoint, so
    /// observers always see live nodes.
    pub fn destroy(&mut self, id: NodeId) -> DomResult<()> {
        if !self.tree.contains(id) {
            return Err(DomError::NotFound);
        }
        if self.tree.parent(id).is_some() || self.tree.is_document(id) {
            return Err(DomError::InvalidState);
        }
        if self.observers.references(&self.tree, id) {
            tracing::trace!("Free of {:?} deferred until records are delivered", id);
            self.deferred_frees.push(id);
            return Ok(());
        }
        self.tree.free_subtree(id);
        Ok(())
    }

    /// Destroy requested but not yet carried out
    pub fn is_destroy_pending(&self, id: NodeId) -> bool {
        self.deferred_frees.contains(&id)
    }

    fn free_deferred(&mut self) {
        for id in std::mem::take(&mut self.deferred_frees) {
            // Re-inserted since: keep it
            if self.tree.contains(id) && self.tree.parent(id).is_none() {
                self.tree.free_subtree(id);
            }
        }
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        let parent_node = self.tree.get(parent).ok_or(DomError::NotFound)?;
        if !parent_node.is_container() {
            return Err(DomError::HierarchyRequest);
        }
        if !self.tree.contains(child) {
            return Err(DomError::NotFound);
        }
        if self.tree.is_document(child) || self.tree.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest);
        }
        Ok(())
    }

    fn insert_nodes(&mut self, parent: NodeId, nodes: &[NodeId], reference: NodeId) {
        let previous = if reference.is_valid() {
            self.tree.get(reference).map(|n| n.prev_sibling)
        } else {
            self.tree.get(parent).map(|n| n.last_child)
        }
        .filter(|id| id.is_valid());

        for &node in nodes {
            self.tree.link(parent, node, reference);
        }
        let next = Some(reference).filter(|id| id.is_valid());
        self.queue_record(MutationRecord::child_list(
            parent,
            nodes.to_vec(),
            Vec::new(),
            previous,
            next,
        ));
    }

    fn detach_child(&mut self, parent: NodeId, child: NodeId) {
        let (previous, next) = self
            .tree
            .get(child)
            .map(|n| (n.prev_sibling, n.next_sibling))
            .unwrap_or((NodeId::NONE, NodeId::NONE));
        self.tree.unlink(child);
        self.queue_record(MutationRecord::child_list(
            parent,
            Vec::new(),
            vec![child],
            Some(previous).filter(|id| id.is_valid()),
            Some(next).filter(|id| id.is_valid()),
        ));
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    /// Set an attribute, then run attribute hooks
    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> DomResult<()> {
        let node = self.tree.get_mut(element).ok_or(DomError::NotFound)?;
        let elem = node.as_element_mut().ok_or(DomError::InvalidNodeType)?;
        let name = match elem.namespace {
            Namespace::Html => name.to_ascii_lowercase(),
            Namespace::Svg => name.to_string(),
        };
        let old_value = elem.set_attr(&name, value);

        self.queue_record(MutationRecord::attributes(element, &name, old_value.clone()));
        self.notify_attribute_hooks(
            element,
            AttributeChange {
                name,
                old_value,
                new_value: Some(value.to_string()),
            },
        )
    }

    /// Remove an attribute, then run attribute hooks. Absent attributes are
    /// a no-op.
    pub fn remove_attribute(&mut self, element: NodeId, name: &str) -> DomResult<()> {
        let node = self.tree.get_mut(element).ok_or(DomError::NotFound)?;
        let elem = node.as_element_mut().ok_or(DomError::InvalidNodeType)?;
        let name = match elem.namespace {
            Namespace::Html => name.to_ascii_lowercase(),
            Namespace::Svg => name.to_string(),
        };
        let Some(old_value) = elem.remove_attr(&name) else {
            return Ok(());
        };

        self.queue_record(MutationRecord::attributes(element, &name, Some(old_value.clone())));
        self.notify_attribute_hooks(
            element,
            AttributeChange {
                name,
                old_value: Some(old_value),
                new_value: None,
            },
        )
    }

    pub fn add_attribute_hook(&mut self, hook: Rc<dyn AttributeHook>) -> HookId {
        let id = HookId(self.next_hook);
        self.next_hook += 1;
        self.hooks.push((id, hook));
        id
    }

    pub fn remove_attribute_hook(&mut self, id: HookId) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|(hook_id, _)| *hook_id != id);
        before != self.hooks.len()
    }

    fn notify_attribute_hooks(&mut self, element: NodeId, change: AttributeChange) -> DomResult<()> {
        let hooks: Vec<Rc<dyn AttributeHook>> = self.hooks.iter().map(|(_, h)| Rc::clone(h)).collect();
        for hook in hooks {
            hook.attribute_changed(self, element, &change)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Host quirks
    // ------------------------------------------------------------------

    /// Make the node report no tag name, like a host object whose
    /// `tagName` getter returns undefined
    pub fn mask_tag_name(&mut self, id: NodeId) {
        if let Some(node) = self.tree.get_mut(id) {
            node.tag_name_masked = true;
        }
    }

    /// Make the node report no children, like a host object whose
    /// `childNodes` getter returns undefined
    pub fn mask_child_nodes(&mut self, id: NodeId) {
        if let Some(node) = self.tree.get_mut(id) {
            node.child_nodes_masked = true;
        }
    }

    // ------------------------------------------------------------------
    // Mutation observers
    // ------------------------------------------------------------------

    pub fn supports_mutation_observers(&self) -> bool {
        self.observers.is_supported()
    }

    /// Start observing `target`; records are delivered to `callback` in
    /// batches at microtask checkpoints
    pub fn observe<F>(
        &mut self,
        target: NodeId,
        options: MutationObserverInit,
        callback: F,
    ) -> DomResult<ObserverId>
    where
        F: Fn(&mut Document, &[MutationRecord]) -> anyhow::Result<()> + 'static,
    {
        if !self.observers.is_supported() {
            return Err(DomError::NotSupported("MutationObserver"));
        }
        if !self.tree.contains(target) {
            return Err(DomError::NotFound);
        }
        let id = self
            .observers
            .observe(target, options, Rc::new(callback))
            .ok_or(DomError::InvalidObserverOptions)?;
        tracing::trace!("Mutation observer {:?} attached to {:?}", id, target);
        Ok(id)
    }

    /// Stop an observer; its undelivered records are dropped
    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        self.observers.disconnect(id)
    }

    pub fn is_observing(&self, id: ObserverId) -> bool {
        self.observers.is_observing(id)
    }

    /// Take an observer's queued records without delivering them
    pub fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.observers.take_records(id)
    }

    fn queue_record(&mut self, record: MutationRecord) {
        self.observers.record(&self.tree, &record);
    }

    // ------------------------------------------------------------------
    // Scheduling
    // ------------------------------------------------------------------

    pub fn queue_microtask<F>(&mut self, task: F)
    where
        F: FnOnce(&mut Document) -> anyhow::Result<()> + 'static,
    {
        self.microtasks.push_back(Box::new(task));
    }

    pub fn has_pending_work(&self) -> bool {
        !self.microtasks.is_empty() || self.observers.has_pending() || !self.deferred_frees.is_empty()
    }

    /// Run microtasks and deliver mutation batches until both queues are
    /// empty. Stops at the first failing callback.
    pub fn perform_microtask_checkpoint(&mut self) -> DomResult<()> {
        loop {
            if let Some(task) = self.microtasks.pop_front() {
                task(self)?;
                continue;
            }
            let Some((callback, records)) = self.observers.take_next_batch() else {
                self.free_deferred();
                break;
            };
            tracing::trace!("Delivering {} mutation records", records.len());
            callback(self, &records)?;
        }
        Ok(())
    }
}
