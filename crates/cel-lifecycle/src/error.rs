//! Lifecycle engine errors

use cel_dom::DomError;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, LifecycleError>;

/// Lifecycle engine errors
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("invalid custom element name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// Fatal: the host cannot report structural mutations
    #[error(
        "Mutation observers are not supported by this host. The lifecycle engine requires them \
         in order to emulate custom element behaviour. Provide a document with mutation observer \
         support before attaching the engine."
    )]
    MutationObserversUnsupported,

    #[error("invalid engine configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Dom(#[from] DomError),

    /// A user lifecycle callback failed
    #[error(transparent)]
    Callback(#[from] anyhow::Error),
}
