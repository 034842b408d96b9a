//! cel-lifecycle: custom element lifecycle engine
//!
//! Keeps user-defined element lifecycles in sync with a [`cel_dom::Document`]:
//! elements are created and rendered once, notified when they enter and leave
//! the document, and told about changes to the attributes they observe.
//!
//! ```ignore
//! let engine = Engine::new(EngineConfig::default());
//! engine.attach(&mut doc)?;
//! let handle = engine.register(&mut doc, "x-counter", DefinitionConfig::new()
//!     .observed_attributes(["count"])
//!     .attached(|_, _| Ok(())))?;
//! let el = handle.create(&mut doc)?;
//! ```

mod attributes;
mod config;
mod definition;
mod document_observer;
mod engine;
mod error;
mod ignored;
mod init;
mod ready;
mod registry;
mod state;

pub use config::EngineConfig;
pub use definition::{
    dash_case, AttributeChangedHook, Callbacks, Definition, DefinitionConfig, Lifecycle,
    LifecycleHook, PropConfig,
};
pub use document_observer::DocumentObserver;
pub use engine::{ElementHandle, Engine};
pub use error::{LifecycleError, Result};
pub use ignored::{closest_ignored, is_ignored};
pub use init::InitOptions;
pub use registry::Registry;
pub use state::{InitStatus, ReadyCallback};
