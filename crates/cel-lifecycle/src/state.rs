//! Per-element lifecycle state
//!
//! Kept in an engine-owned side table keyed by `NodeId`; host nodes carry
//! nothing. Ids of destroyed nodes never come back (generation tags), so
//! stale entries are harmless until [`StateTable::retain_live`] drops them.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use cel_dom::{Document, DomTree, NodeId};

use crate::Definition;

/// Initialization status of an element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InitStatus {
    #[default]
    Uninitialized,
    Initializing,
    Initialized,
}

/// Callback waiting for an element to finish initializing
pub type ReadyCallback = Box<dyn FnOnce(&mut Document, NodeId) -> anyhow::Result<()>>;

#[derive(Default)]
pub(crate) struct ElementState {
    pub(crate) status: InitStatus,
    /// Definition the element was created with
    pub(crate) definition: Option<Rc<Definition>>,
    pub(crate) attached: bool,
    pub(crate) in_ready_hook: bool,
    pub(crate) pending_ready: Vec<ReadyCallback>,
}

impl ElementState {
    /// `created` already ran for this definition
    pub(crate) fn created_with(&self, definition: &Rc<Definition>) -> bool {
        self.status != InitStatus::Uninitialized
            && self
                .definition
                .as_ref()
                .is_some_and(|d| Rc::ptr_eq(d, definition))
    }

    pub(crate) fn suppresses_attribute_changes(&self) -> bool {
        self.status != InitStatus::Initialized || self.in_ready_hook
    }
}

impl fmt::Debug for ElementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementState")
            .field("status", &self.status)
            .field("definition", &self.definition.as_ref().map(|d| d.name()))
            .field("attached", &self.attached)
            .field("in_ready_hook", &self.in_ready_hook)
            .field("pending_ready", &self.pending_ready.len())
            .finish()
    }
}

#[derive(Debug, Default)]
pub(crate) struct StateTable {
    entries: HashMap<NodeId, ElementState>,
}

impl StateTable {
    pub(crate) fn get(&self, id: NodeId) -> Option<&ElementState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut ElementState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn entry(&mut self, id: NodeId) -> &mut ElementState {
        self.entries.entry(id).or_default()
    }

    pub(crate) fn status(&self, id: NodeId) -> InitStatus {
        self.get(id).map(|s| s.status).unwrap_or_default()
    }

    /// Drop entries of nodes no longer in `tree`; returns how many went
    pub(crate) fn retain_live(&mut self, tree: &DomTree) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, _| tree.contains(*id));
        before - self.entries.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DefinitionConfig;

    #[test]
    fn test_status_defaults_to_uninitialized() {
        let table = StateTable::default();
        let doc = Document::new();
        assert_eq!(table.status(doc.body()), InitStatus::Uninitialized);
    }

    #[test]
    fn test_created_with_tracks_definition_identity() {
        let a = Rc::new(Definition::new("x-a", 1, DefinitionConfig::new()));
        let b = Rc::new(Definition::new("x-a", 2, DefinitionConfig::new()));
        let state = ElementState {
            status: InitStatus::Initialized,
            definition: Some(Rc::clone(&a)),
            ..Default::default()
        };
        assert!(state.created_with(&a));
        assert!(!state.created_with(&b));
    }

    #[test]
    fn test_suppression() {
        let mut state = ElementState::default();
        assert!(state.suppresses_attribute_changes());
        state.status = InitStatus::Initialized;
        assert!(!state.suppresses_attribute_changes());
        state.in_ready_hook = true;
        assert!(state.suppresses_attribute_changes());
    }

    #[test]
    fn test_retain_live() {
        let mut doc = Document::new();
        let kept = doc.create_element("div");
        let gone = doc.create_element("div");
        let mut table = StateTable::default();
        table.entry(kept);
        table.entry(gone);

        doc.destroy(gone).unwrap();
        assert_eq!(table.retain_live(doc.tree()), 1);
        assert_eq!(table.len(), 1);
        assert!(table.get(kept).is_some());
    }
}
