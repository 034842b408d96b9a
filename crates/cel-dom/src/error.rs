//! DOM operation errors

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    /// Node id does not resolve to a live node
    #[error("node not found")]
    NotFound,

    /// Hierarchy error (e.g., inserting an ancestor into its descendant)
    #[error("hierarchy request error")]
    HierarchyRequest,

    /// Reference node is not a child of the given parent
    #[error("node is not a child of the given parent")]
    NotAChild,

    /// Operation does not apply to this kind of node
    #[error("invalid node type for this operation")]
    InvalidNodeType,

    /// Node is still linked into a tree
    #[error("node is still attached to a parent")]
    InvalidState,

    /// Host capability missing from this document
    #[error("{0} is not supported by this document")]
    NotSupported(&'static str),

    /// Observer options select neither child list nor attributes
    #[error("mutation observer options must observe child list or attributes")]
    InvalidObserverOptions,

    /// A hook or observer callback failed
    #[error(transparent)]
    Callback(#[from] anyhow::Error),
}
