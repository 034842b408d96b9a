//! cel DOM - host document model
//!
//! Arena-allocated document tree used as the host for the lifecycle engine.
//! Provides the pieces a browser would: element attributes, document
//! fragments, structural mutation observation, attribute hooks and a
//! cooperative microtask queue.

mod document;
mod error;
mod node;
mod observer;
mod tree;
mod tree_walker;

pub use document::{AttributeHook, Document, HookId, Microtask};
pub use error::{DomError, DomResult};
pub use node::{Attribute, AttributeChange, ElementData, Namespace, Node, NodeData};
pub use observer::{
    MutationCallback, MutationObserverInit, MutationRecord, MutationType, ObserverId,
};
pub use tree::{Children, DomTree};
pub use tree_walker::{walk, Descendants, FilterResult, TreeWalker};

/// Node identifier: arena slot plus the slot's generation.
///
/// A destroyed slot bumps its generation, so a stale id never resolves to
/// whatever node later reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Sentinel for "no node" (no parent, no sibling)
    pub const NONE: NodeId = NodeId {
        index: u32::MAX,
        generation: 0,
    };

    pub const fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Check this is not [`NodeId::NONE`]
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.index != u32::MAX
    }
}
