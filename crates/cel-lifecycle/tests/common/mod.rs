//! Shared helpers for cel-lifecycle integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use cel_dom::{AttributeChange, Document};
use cel_lifecycle::{DefinitionConfig, Engine, EngineConfig};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Ordered record of lifecycle calls
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.borrow().iter().filter(|e| *e == entry).count()
    }

    /// Entries starting with `prefix`
    pub fn matching(&self, prefix: &str) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// `attributeChanged name old new`, with absent values written as `null`
pub fn describe_change(change: &AttributeChange) -> String {
    format!(
        "attributeChanged {} {} {}",
        change.name,
        change.old_value.as_deref().unwrap_or("null"),
        change.new_value.as_deref().unwrap_or("null")
    )
}

/// Definition logging every callback to `log`
pub fn logging_definition(log: &CallLog) -> DefinitionConfig {
    let (created, render, ready) = (log.clone(), log.clone(), log.clone());
    let (attached, detached, changed) = (log.clone(), log.clone(), log.clone());
    DefinitionConfig::new()
        .created(move |_, _| {
            created.push("created");
            Ok(())
        })
        .render(move |_, _| {
            render.push("render");
            Ok(())
        })
        .ready(move |_, _| {
            ready.push("ready");
            Ok(())
        })
        .attached(move |_, _| {
            attached.push("attached");
            Ok(())
        })
        .detached(move |_, _| {
            detached.push("detached");
            Ok(())
        })
        .attribute_changed(move |_, _, change| {
            changed.push(describe_change(change));
            Ok(())
        })
}

/// Fresh document with a default engine attached to it
pub fn setup() -> (Document, Engine) {
    setup_with(EngineConfig::default())
}

pub fn setup_with(config: EngineConfig) -> (Document, Engine) {
    init_tracing();
    let mut doc = Document::new();
    let engine = Engine::new(config);
    engine.attach(&mut doc).unwrap();
    (doc, engine)
}
