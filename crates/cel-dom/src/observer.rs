//! Mutation Observers
//!
//! Structural and attribute mutation records, queued per observer and
//! delivered in batches at the document's microtask checkpoint.

use std::rc::Rc;

use crate::{Document, DomTree, NodeId};

/// Mutation type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    Attributes,
    ChildList,
}

/// Mutation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub previous_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub attribute_name: Option<String>,
    pub old_value: Option<String>,
}

impl MutationRecord {
    pub fn child_list(
        target: NodeId,
        added_nodes: Vec<NodeId>,
        removed_nodes: Vec<NodeId>,
        previous_sibling: Option<NodeId>,
        next_sibling: Option<NodeId>,
    ) -> Self {
        Self {
            mutation_type: MutationType::ChildList,
            target,
            added_nodes,
            removed_nodes,
            previous_sibling,
            next_sibling,
            attribute_name: None,
            old_value: None,
        }
    }

    pub fn attributes(target: NodeId, name: &str, old_value: Option<String>) -> Self {
        Self {
            mutation_type: MutationType::Attributes,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            previous_sibling: None,
            next_sibling: None,
            attribute_name: Some(name.to_string()),
            old_value,
        }
    }
}

/// Mutation observer options
#[derive(Debug, Clone, Default)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub attributes: bool,
    pub subtree: bool,
    pub attribute_old_value: bool,
    pub attribute_filter: Option<Vec<String>>,
}

impl MutationObserverInit {
    fn is_valid(&self) -> bool {
        self.child_list || self.attributes
    }
}

/// Batch delivery callback
pub type MutationCallback = Rc<dyn Fn(&mut Document, &[MutationRecord]) -> anyhow::Result<()>>;

/// Handle returned by [`Document::observe`](crate::Document::observe)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

struct Registration {
    id: ObserverId,
    target: NodeId,
    options: MutationObserverInit,
    callback: MutationCallback,
    pending: Vec<MutationRecord>,
}

/// Per-document observer bookkeeping
pub(crate) struct MutationObservers {
    supported: bool,
    next_id: u64,
    registrations: Vec<Registration>,
}

impl MutationObservers {
    pub(crate) fn new(supported: bool) -> Self {
        Self {
            supported,
            next_id: 1,
            registrations: Vec::new(),
        }
    }

    pub(crate) fn is_supported(&self) -> bool {
        self.supported
    }

    /// Returns `None` if the options observe nothing
    pub(crate) fn observe(
        &mut self,
        target: NodeId,
        options: MutationObserverInit,
        callback: MutationCallback,
    ) -> Option<ObserverId> {
        if !options.is_valid() {
            return None;
        }
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.registrations.push(Registration {
            id,
            target,
            options,
            callback,
            pending: Vec::new(),
        });
        Some(id)
    }

    /// Stop observing; undelivered records are dropped
    pub(crate) fn disconnect(&mut self, id: ObserverId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.id != id);
        before != self.registrations.len()
    }

    pub(crate) fn is_observing(&self, id: ObserverId) -> bool {
        self.registrations.iter().any(|r| r.id == id)
    }

    /// Queue a record on every observer interested in it
    pub(crate) fn record(&mut self, tree: &DomTree, mutation: &MutationRecord) {
        for registration in &mut self.registrations {
            let options = &registration.options;
            let matches_target = registration.target == mutation.target
                || (options.subtree && tree.is_inclusive_ancestor(registration.target, mutation.target));
            if !matches_target {
                continue;
            }

            let matches_type = match mutation.mutation_type {
                MutationType::ChildList => options.child_list,
                MutationType::Attributes => {
                    options.attributes
                        && match (&options.attribute_filter, &mutation.attribute_name) {
                            (Some(filter), Some(name)) => filter.contains(name),
                            _ => true,
                        }
                }
            };
            if !matches_type {
                continue;
            }

            let mut record = mutation.clone();
            if record.mutation_type == MutationType::Attributes && !options.attribute_old_value {
                record.old_value = None;
            }
            registration.pending.push(record);
        }
    }

    pub(crate) fn has_pending(&self) -> bool {
        self.registrations.iter().any(|r| !r.pending.is_empty())
    }

    /// Some undelivered record names a node inside `root`'s subtree
    pub(crate) fn references(&self, tree: &DomTree, root: NodeId) -> bool {
        self.registrations
            .iter()
            .flat_map(|r| &r.pending)
            .flat_map(|record| {
                std::iter::once(&record.target)
                    .chain(&record.added_nodes)
                    .chain(&record.removed_nodes)
            })
            .any(|&node| tree.is_inclusive_ancestor(root, node))
    }

    /// Take the next observer batch, in observer creation order
    pub(crate) fn take_next_batch(&mut self) -> Option<(MutationCallback, Vec<MutationRecord>)> {
        let registration = self
            .registrations
            .iter_mut()
            .find(|r| !r.pending.is_empty())?;
        Some((
            Rc::clone(&registration.callback),
            std::mem::take(&mut registration.pending),
        ))
    }

    /// Take records without delivering them
    pub(crate) fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.registrations
            .iter_mut()
            .find(|r| r.id == id)
            .map(|r| std::mem::take(&mut r.pending))
            .unwrap_or_default()
    }
}
