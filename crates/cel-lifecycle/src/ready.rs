//! Ready queue

use cel_dom::{Document, NodeId};

use crate::state::InitStatus;
use crate::Engine;

impl Engine {
    /// Run `callback` once `node` has finished initializing.
    ///
    /// Never runs synchronously: for an element that is already initialized
    /// the callback is queued as a microtask; otherwise it waits on the
    /// element and runs right after initialization.
    pub fn ready<F>(&self, doc: &mut Document, node: NodeId, callback: F)
    where
        F: FnOnce(&mut Document, NodeId) -> anyhow::Result<()> + 'static,
    {
        if self.status(node) == InitStatus::Initialized {
            doc.queue_microtask(move |doc| callback(doc, node));
            return;
        }
        self.inner
            .states
            .borrow_mut()
            .entry(node)
            .pending_ready
            .push(Box::new(callback));
    }
}
