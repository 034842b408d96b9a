//! Attribute change dispatch

use std::rc::Weak;

use anyhow::Context;
use cel_dom::{AttributeChange, AttributeHook, Document, NodeId};

use crate::engine::EngineInner;
use crate::{Engine, Lifecycle, Result};

/// Document attribute hook forwarding changes to `attributeChanged`
pub(crate) struct AttributeDispatcher {
    engine: Weak<EngineInner>,
}

impl AttributeDispatcher {
    pub(crate) fn new(engine: Weak<EngineInner>) -> Self {
        Self { engine }
    }
}

impl AttributeHook for AttributeDispatcher {
    fn attribute_changed(
        &self,
        doc: &mut Document,
        element: NodeId,
        change: &AttributeChange,
    ) -> anyhow::Result<()> {
        let Some(inner) = self.engine.upgrade() else {
            return Ok(());
        };
        Engine::from_inner(inner).dispatch_attribute_change(doc, element, change)?;
        Ok(())
    }
}

impl Engine {
    /// Fire `attributeChanged` if the element is initialized, outside its
    /// own initialization hooks, and observes `change.name`
    pub fn dispatch_attribute_change(
        &self,
        doc: &mut Document,
        element: NodeId,
        change: &AttributeChange,
    ) -> Result<()> {
        let definition = {
            let states = self.inner.states.borrow();
            match states.get(element) {
                Some(state) if state.suppresses_attribute_changes() => {
                    tracing::trace!("Suppressed '{}' change on {:?} during init", change.name, element);
                    None
                }
                Some(state) => state.definition.clone(),
                None => None,
            }
        };
        let Some(definition) = definition else {
            return Ok(());
        };
        if !definition.observes(&change.name) {
            return Ok(());
        }
        let Some(callback) = definition.callbacks().attribute_changed.clone() else {
            return Ok(());
        };

        tracing::debug!(
            "<{}> {:?}: {} '{}' {:?} -> {:?}",
            definition.name(),
            element,
            Lifecycle::AttributeChanged,
            change.name,
            change.old_value,
            change.new_value
        );
        callback(doc, element, change).with_context(|| {
            format!("{} callback of <{}> failed", Lifecycle::AttributeChanged, definition.name())
        })?;
        Ok(())
    }
}
