//! Document Observer
//!
//! Subscribes to structural mutations of the whole document. Each delivered
//! batch initializes added subtrees and tears down removed ones.

use std::cell::Cell;
use std::rc::Weak;

use cel_dom::{Document, MutationObserverInit, MutationRecord, ObserverId};

use crate::engine::EngineInner;
use crate::ignored::is_ignored;
use crate::init::InitOptions;
use crate::{Engine, LifecycleError, Result};

#[derive(Debug)]
pub struct DocumentObserver {
    engine: Weak<EngineInner>,
    id: Cell<Option<ObserverId>>,
}

impl DocumentObserver {
    pub(crate) fn new(engine: Weak<EngineInner>) -> Self {
        Self {
            engine,
            id: Cell::new(None),
        }
    }

    /// Start observing `doc`. A no-op while already registered.
    pub fn register(&self, doc: &mut Document) -> Result<()> {
        if self.id.get().is_some_and(|id| doc.is_observing(id)) {
            return Ok(());
        }
        if !doc.supports_mutation_observers() {
            tracing::error!("Host has no mutation observer support");
            return Err(LifecycleError::MutationObserversUnsupported);
        }

        let engine = self.engine.clone();
        let root = doc.root();
        let options = MutationObserverInit {
            child_list: true,
            subtree: true,
            ..Default::default()
        };
        let id = doc.observe(root, options, move |doc, records| {
            let Some(inner) = engine.upgrade() else {
                return Ok(());
            };
            Engine::from_inner(inner).handle_mutations(doc, records)?;
            Ok(())
        })?;

        self.id.set(Some(id));
        tracing::info!("Document observer registered ({:?})", id);
        Ok(())
    }

    /// Stop observing. Undelivered records are dropped.
    pub fn unregister(&self, doc: &mut Document) {
        if let Some(id) = self.id.take() {
            doc.disconnect(id);
            tracing::info!("Document observer unregistered ({:?})", id);
        }
    }

    pub fn is_registered(&self) -> bool {
        self.id.get().is_some()
    }
}

impl Engine {
    /// Process one batch of child-list records
    pub fn handle_mutations(&self, doc: &mut Document, records: &[MutationRecord]) -> Result<()> {
        tracing::debug!("Processing {} mutation records", records.len());
        let ignore = self.inner.config.ignore_attribute.as_str();

        for record in records {
            if let Some(&first) = record.added_nodes.first() {
                let parent_ignored = doc
                    .parent(first)
                    .is_some_and(|parent| is_ignored(doc.tree(), parent, ignore));
                if parent_ignored {
                    tracing::trace!("Skipping {} nodes added under an ignored subtree", record.added_nodes.len());
                } else {
                    for &node in &record.added_nodes {
                        self.init(doc, node, InitOptions { check_if_is_in_dom: false })?;
                    }
                }
            }

            for &node in &record.removed_nodes {
                self.teardown(doc, node)?;
            }
        }
        Ok(())
    }
}
