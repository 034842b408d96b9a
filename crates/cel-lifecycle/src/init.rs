//! Element initialization and teardown
//!
//! `init` walks a subtree in document order and runs each matching element
//! through `created`, `render`, attribute replay and `ready`, then
//! `attached` when it is (or is treated as) in the document. `teardown`
//! runs `detached` over a removed subtree.
//!
//! No engine borrow is held while user code runs; callbacks are free to
//! call back into the engine.

use std::rc::Rc;

use anyhow::Context;
use cel_dom::{walk, AttributeChange, Descendants, Document, FilterResult, Node, NodeId};

use crate::ignored::is_ignored;
use crate::state::InitStatus;
use crate::{Definition, Engine, Lifecycle, Result};

/// Options for [`Engine::init`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitOptions {
    /// Only fire `attached` for nodes connected to the document. Mutation
    /// batches pass `false`: an added node counts as attached.
    pub check_if_is_in_dom: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            check_if_is_in_dom: true,
        }
    }
}

impl Engine {
    /// Initialize `node` and its descendants
    pub fn init(&self, doc: &mut Document, node: NodeId, options: InitOptions) -> Result<()> {
        let ignore = self.inner.config.ignore_attribute.as_str();
        if !doc.tree().contains(node) {
            return Ok(());
        }
        if is_ignored(doc.tree(), node, ignore) {
            tracing::trace!("Skipping init of {:?}: inside an ignored subtree", node);
            return Ok(());
        }

        let nodes: Vec<NodeId> = Descendants::with_filter(doc.tree(), node, |tree, id| {
            if tree.has_attribute(id, ignore) {
                FilterResult::Reject
            } else {
                FilterResult::Accept
            }
        })
        .collect();

        for id in nodes {
            // An earlier callback may have destroyed it
            if !doc.tree().contains(id) {
                continue;
            }
            let Some(definition) = self.lookup(doc, id) else {
                continue;
            };
            self.init_element(doc, id, &definition, options)?;
        }
        Ok(())
    }

    fn init_element(
        &self,
        doc: &mut Document,
        id: NodeId,
        definition: &Rc<Definition>,
        options: InitOptions,
    ) -> Result<()> {
        let created = self
            .inner
            .states
            .borrow()
            .get(id)
            .is_some_and(|s| s.created_with(definition));
        if !created {
            // Taken over from a replaced definition: it sees the element leave
            self.detach_element(doc, id)?;
            self.create_element(doc, id, definition)?;
        }

        if !options.check_if_is_in_dom || doc.is_connected(id) {
            self.attach_element(doc, id)?;
        }
        Ok(())
    }

    fn create_element(&self, doc: &mut Document, id: NodeId, definition: &Rc<Definition>) -> Result<()> {
        {
            let mut states = self.inner.states.borrow_mut();
            let state = states.entry(id);
            state.status = InitStatus::Initializing;
            state.definition = Some(Rc::clone(definition));
            state.attached = false;
        }
        tracing::debug!("<{}> {:?}: created", definition.name(), id);

        self.invoke(doc, id, definition, Lifecycle::Created)?;
        self.invoke(doc, id, definition, Lifecycle::Render)?;

        if !doc.tree().contains(id) {
            return Ok(());
        }
        if let Some(attr) = &self.inner.config.defined_attribute {
            doc.set_attribute(id, attr, "")?;
        }
        self.replay_attributes(doc, id, definition)?;

        let pending = {
            let mut states = self.inner.states.borrow_mut();
            let state = states.entry(id);
            state.status = InitStatus::Initialized;
            std::mem::take(&mut state.pending_ready)
        };
        for callback in pending {
            callback(doc, id)
                .with_context(|| format!("ready callback for <{}> failed", definition.name()))?;
        }

        self.set_in_ready_hook(id, true);
        let result = self.invoke(doc, id, definition, Lifecycle::Ready);
        self.set_in_ready_hook(id, false);
        result
    }

    /// `attributeChanged` for each observed attribute the element already
    /// has, as if it had just been added
    fn replay_attributes(&self, doc: &mut Document, id: NodeId, definition: &Definition) -> Result<()> {
        let Some(callback) = definition.callbacks().attribute_changed.clone() else {
            return Ok(());
        };
        let present = doc
            .tree()
            .get(id)
            .and_then(Node::as_element)
            .map(|el| el.attrs.clone())
            .unwrap_or_default();

        for attr in present.into_iter().filter(|a| definition.observes(&a.name)) {
            let change = AttributeChange {
                name: attr.name,
                old_value: None,
                new_value: Some(attr.value),
            };
            callback(doc, id, &change).with_context(|| {
                format!("{} callback of <{}> failed", Lifecycle::AttributeChanged, definition.name())
            })?;
        }
        Ok(())
    }

    fn attach_element(&self, doc: &mut Document, id: NodeId) -> Result<()> {
        let definition = {
            let mut states = self.inner.states.borrow_mut();
            let Some(state) = states.get_mut(id) else {
                return Ok(());
            };
            if state.status != InitStatus::Initialized || state.attached {
                return Ok(());
            }
            state.attached = true;
            state.definition.clone()
        };
        let Some(definition) = definition else {
            return Ok(());
        };
        tracing::debug!("<{}> {:?}: attached", definition.name(), id);
        self.invoke(doc, id, &definition, Lifecycle::Attached)
    }

    /// Run `detached` for every attached element in a removed subtree
    pub(crate) fn teardown(&self, doc: &mut Document, root: NodeId) -> Result<()> {
        walk(doc, root, |doc, id| self.detach_element(doc, id))
    }

    fn detach_element(&self, doc: &mut Document, id: NodeId) -> Result<()> {
        let definition = {
            let mut states = self.inner.states.borrow_mut();
            let Some(state) = states.get_mut(id) else {
                return Ok(());
            };
            if !state.attached {
                return Ok(());
            }
            state.attached = false;
            state.definition.clone()
        };
        let Some(definition) = definition else {
            return Ok(());
        };
        tracing::debug!("<{}> {:?}: detached", definition.name(), id);
        self.invoke(doc, id, &definition, Lifecycle::Detached)
    }

    fn set_in_ready_hook(&self, id: NodeId, value: bool) {
        if let Some(state) = self.inner.states.borrow_mut().get_mut(id) {
            state.in_ready_hook = value;
        }
    }

    fn invoke(&self, doc: &mut Document, id: NodeId, definition: &Definition, lifecycle: Lifecycle) -> Result<()> {
        let Some(callback) = definition.callbacks().get(lifecycle).cloned() else {
            return Ok(());
        };
        callback(doc, id)
            .with_context(|| format!("{} callback of <{}> failed", lifecycle, definition.name()))?;
        Ok(())
    }
}
