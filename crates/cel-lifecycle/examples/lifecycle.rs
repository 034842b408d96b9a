//! Lifecycle walkthrough
//!
//! Run with `RUST_LOG=cel_lifecycle=debug` to see every transition.

use cel_dom::Document;
use cel_lifecycle::{DefinitionConfig, Engine, EngineConfig, PropConfig};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut doc = Document::new();
    let engine = Engine::new(EngineConfig::default());
    engine.attach(&mut doc)?;

    let counter = engine.register(
        &mut doc,
        "x-counter",
        DefinitionConfig::new()
            .prop("startAt", PropConfig { attribute: true })
            .render(|doc, id| {
                let label = doc.create_text("0");
                doc.append_child(id, label)?;
                Ok(())
            })
            .attached(|_, id| {
                println!("{id:?} attached");
                Ok(())
            })
            .detached(|_, id| {
                println!("{id:?} detached");
                Ok(())
            })
            .attribute_changed(|_, id, change| {
                println!("{id:?} {} = {:?}", change.name, change.new_value);
                Ok(())
            }),
    )?;

    let el = counter.create(&mut doc)?;
    engine.ready(&mut doc, el, |_, id| {
        println!("{id:?} ready");
        Ok(())
    });

    let body = doc.body();
    doc.append_child(body, el)?;
    doc.perform_microtask_checkpoint()?;

    doc.set_attribute(el, "start-at", "10")?;

    doc.remove_child(body, el)?;
    doc.perform_microtask_checkpoint()?;

    println!("{engine:?}");
    Ok(())
}
