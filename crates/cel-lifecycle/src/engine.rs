//! Lifecycle engine handle
//!
//! An [`Engine`] owns a registry, a per-element state table and the
//! document observer. Handles are cheap `Rc` clones; every engine is fully
//! isolated from every other one, even when they share a document and
//! register the same names.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use cel_dom::{Document, HookId, NodeId};

use crate::attributes::AttributeDispatcher;
use crate::document_observer::DocumentObserver;
use crate::init::InitOptions;
use crate::registry::Registry;
use crate::state::{InitStatus, StateTable};
use crate::{Definition, DefinitionConfig, EngineConfig, Result};

pub(crate) struct EngineInner {
    pub(crate) config: EngineConfig,
    pub(crate) registry: RefCell<Registry>,
    pub(crate) states: RefCell<StateTable>,
    pub(crate) observer: DocumentObserver,
    pub(crate) hook: Cell<Option<HookId>>,
}

/// Custom element lifecycle engine
#[derive(Clone)]
pub struct Engine {
    pub(crate) inner: Rc<EngineInner>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<EngineInner>| EngineInner {
            config,
            registry: RefCell::new(Registry::new()),
            states: RefCell::new(StateTable::default()),
            observer: DocumentObserver::new(weak.clone()),
            hook: Cell::new(None),
        });
        Self { inner }
    }

    pub(crate) fn from_inner(inner: Rc<EngineInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<EngineInner> {
        Rc::downgrade(&self.inner)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Hook the engine into a document: attribute changes start flowing to
    /// `attributeChanged`, and (unless disabled) the document observer is
    /// registered.
    pub fn attach(&self, doc: &mut Document) -> Result<()> {
        if self.inner.config.observe_on_attach {
            self.inner.observer.register(doc)?;
        }
        if self.inner.hook.get().is_none() {
            let dispatcher = AttributeDispatcher::new(self.downgrade());
            self.inner.hook.set(Some(doc.add_attribute_hook(Rc::new(dispatcher))));
        }
        tracing::debug!("Lifecycle engine attached");
        Ok(())
    }

    /// Undo [`Engine::attach`]. Element state is kept.
    pub fn detach(&self, doc: &mut Document) {
        self.inner.observer.unregister(doc);
        if let Some(hook) = self.inner.hook.take() {
            doc.remove_attribute_hook(hook);
        }
        tracing::debug!("Lifecycle engine detached");
    }

    pub fn document_observer(&self) -> &DocumentObserver {
        &self.inner.observer
    }

    /// Register a definition and upgrade matching nodes already in the
    /// document.
    ///
    /// Replacing a name hands its connected elements to the new definition:
    /// the old one gets `detached`, the new one runs the full lifecycle.
    pub fn register(
        &self,
        doc: &mut Document,
        name: &str,
        config: DefinitionConfig,
    ) -> Result<ElementHandle> {
        let definition = self.inner.registry.borrow_mut().register(name, config)?;
        tracing::debug!(
            "Registered <{}> (#{}, observing {:?})",
            definition.name(),
            definition.sequence(),
            definition.observed_attributes()
        );

        let root = doc.root();
        self.init(doc, root, InitOptions::default())?;

        Ok(ElementHandle {
            engine: self.clone(),
            definition,
        })
    }

    pub fn definition(&self, name: &str) -> Option<Rc<Definition>> {
        self.inner.registry.borrow().get(name).cloned()
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.inner.registry.borrow().is_defined(name)
    }

    /// Definition a node currently matches
    pub fn lookup(&self, doc: &Document, node: NodeId) -> Option<Rc<Definition>> {
        self.inner.registry.borrow().lookup(doc.tree(), node)
    }

    pub fn status(&self, node: NodeId) -> InitStatus {
        self.inner.states.borrow().status(node)
    }

    /// `attached` has fired and `detached` has not fired since
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.inner
            .states
            .borrow()
            .get(node)
            .is_some_and(|s| s.attached)
    }

    /// Forget state of destroyed nodes; returns the number of entries dropped
    pub fn collect_garbage(&self, doc: &Document) -> usize {
        let dropped = self.inner.states.borrow_mut().retain_live(doc.tree());
        if dropped > 0 {
            tracing::trace!("Dropped {} stale element states", dropped);
        }
        dropped
    }

    /// Number of nodes the engine holds state for
    pub fn tracked_elements(&self) -> usize {
        self.inner.states.borrow().len()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.inner.config)
            .field("definitions", &self.inner.registry.borrow().len())
            .field("tracked", &self.inner.states.borrow().len())
            .field("observing", &self.inner.observer.is_registered())
            .finish()
    }
}

/// Returned by [`Engine::register`]; constructs elements of its definition
#[derive(Debug, Clone)]
pub struct ElementHandle {
    engine: Engine,
    definition: Rc<Definition>,
}

impl ElementHandle {
    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn definition(&self) -> &Rc<Definition> {
        &self.definition
    }

    /// Create a detached element (`<name>` or `<base is="name">`) and
    /// initialize it
    pub fn create(&self, doc: &mut Document) -> Result<NodeId> {
        let definition = &self.definition;
        let id = match definition.extends() {
            Some(base) => {
                let id = doc.create_element_ns(definition.namespace(), base);
                doc.set_attribute(id, "is", definition.name())?;
                id
            }
            None => doc.create_element_ns(definition.namespace(), definition.name()),
        };
        self.engine.init(doc, id, InitOptions::default())?;
        Ok(id)
    }
}
