//! attributeChanged dispatch tests

mod common;

use cel_lifecycle::{DefinitionConfig, PropConfig};
use common::{describe_change, logging_definition, setup, CallLog};

// ============================================================================
// DISPATCH
// ============================================================================

#[test]
fn test_set_update_remove_chain() {
    let (mut doc, engine) = setup();
    let log = CallLog::new();
    let handle = engine
        .register(&mut doc, "x-a", logging_definition(&log).observed_attributes(["name"]))
        .unwrap();
    let el = handle.create(&mut doc).unwrap();
    log.clear();

    doc.set_attribute(el, "name", "created").unwrap();
    doc.set_attribute(el, "name", "updated").unwrap();
    doc.remove_attribute(el, "name").unwrap();

    assert_eq!(
        log.entries(),
        [
            "attributeChanged name null created",
            "attributeChanged name created updated",
            "attributeChanged name updated null",
        ]
    );
}

#[test]
fn test_unobserved_attributes_are_ignored() {
    let (mut doc, engine) = setup();
    let log = CallLog::new();
    let handle = engine
        .register(&mut doc, "x-a", logging_definition(&log).observed_attributes(["name"]))
        .unwrap();
    let el = handle.create(&mut doc).unwrap();
    log.clear();

    doc.set_attribute(el, "title", "hello").unwrap();
    doc.remove_attribute(el, "title").unwrap();
    assert!(log.entries().is_empty());
}

#[test]
fn test_dispatch_is_synchronous_for_connected_elements() {
    let (mut doc, engine) = setup();
    let log = CallLog::new();
    let handle = engine
        .register(&mut doc, "x-a", logging_definition(&log).observed_attributes(["open"]))
        .unwrap();
    let el = handle.create(&mut doc).unwrap();
    let body = doc.body();
    doc.append_child(body, el).unwrap();
    doc.perform_microtask_checkpoint().unwrap();
    log.clear();

    doc.set_attribute(el, "open", "").unwrap();
    assert_eq!(log.entries(), ["attributeChanged open null "]);
}

// ============================================================================
// INITIALIZATION
// ============================================================================

#[test]
fn test_existing_attributes_replayed_during_init() {
    let (mut doc, engine) = setup();
    let log = CallLog::new();
    engine
        .register(&mut doc, "x-a", logging_definition(&log).observed_attributes(["name"]))
        .unwrap();

    let el = doc.create_element("x-a");
    doc.set_attribute(el, "name", "initial").unwrap();
    doc.set_attribute(el, "title", "not observed").unwrap();
    let body = doc.body();
    doc.append_child(body, el).unwrap();
    doc.perform_microtask_checkpoint().unwrap();

    assert_eq!(
        log.entries(),
        [
            "created",
            "render",
            "attributeChanged name null initial",
            "ready",
            "attached"
        ]
    );
}

#[test]
fn test_own_hooks_do_not_trigger_attribute_changed() {
    let (mut doc, engine) = setup();
    let log = CallLog::new();
    let entry = log.clone();
    let config = DefinitionConfig::new()
        .observed_attributes(["name"])
        .created(|doc, id| {
            doc.set_attribute(id, "name", "from-created")?;
            Ok(())
        })
        .render(|doc, id| {
            doc.set_attribute(id, "name", "from-render")?;
            Ok(())
        })
        .ready(|doc, id| {
            doc.set_attribute(id, "name", "from-ready")?;
            Ok(())
        })
        .attribute_changed(move |_, _, change| {
            entry.push(describe_change(change));
            Ok(())
        });
    let handle = engine.register(&mut doc, "x-a", config).unwrap();

    let el = handle.create(&mut doc).unwrap();
    // Only the replay of what render left behind
    assert_eq!(log.entries(), ["attributeChanged name null from-render"]);

    doc.set_attribute(el, "name", "later").unwrap();
    assert_eq!(
        log.entries(),
        [
            "attributeChanged name null from-render",
            "attributeChanged name from-ready later"
        ]
    );
}

#[test]
fn test_uninitialized_elements_are_not_dispatched() {
    let (mut doc, engine) = setup();
    let log = CallLog::new();
    engine
        .register(&mut doc, "x-a", logging_definition(&log).observed_attributes(["name"]))
        .unwrap();

    // Detached and never initialized
    let el = doc.create_element("x-a");
    doc.set_attribute(el, "name", "value").unwrap();
    assert!(log.entries().is_empty());
}

// ============================================================================
// LINKED PROPS
// ============================================================================

#[test]
fn test_linked_props_are_observed_once() {
    let (mut doc, engine) = setup();
    let log = CallLog::new();
    let config = logging_definition(&log)
        .observed_attributes(["test-prop"])
        .prop("testProp", PropConfig { attribute: true })
        .prop("plainProp", PropConfig::default());
    let handle = engine.register(&mut doc, "x-a", config).unwrap();
    assert_eq!(handle.definition().observed_attributes(), ["test-prop"]);

    let el = handle.create(&mut doc).unwrap();
    log.clear();
    doc.set_attribute(el, "test-prop", "1").unwrap();
    doc.set_attribute(el, "plain-prop", "1").unwrap();
    assert_eq!(log.entries(), ["attributeChanged test-prop null 1"]);
}

#[test]
fn test_prop_without_observed_attributes() {
    let (mut doc, engine) = setup();
    let log = CallLog::new();
    let config = logging_definition(&log).prop("ariaLabel", PropConfig { attribute: true });
    let handle = engine.register(&mut doc, "x-a", config).unwrap();

    let el = handle.create(&mut doc).unwrap();
    log.clear();
    doc.set_attribute(el, "aria-label", "close").unwrap();
    assert_eq!(log.entries(), ["attributeChanged aria-label null close"]);
}
