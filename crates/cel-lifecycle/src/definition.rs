//! Element definitions
//!
//! A definition is a bag of optional lifecycle callbacks plus the metadata
//! used to match and construct elements. Every callback is an explicit
//! `Option`; absence means "nothing to run".

use std::fmt;
use std::rc::Rc;

use cel_dom::{AttributeChange, Document, Namespace, NodeId};

/// Lifecycle transitions an element goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    Created,
    Render,
    Ready,
    Attached,
    Detached,
    AttributeChanged,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Render => "render",
            Self::Ready => "ready",
            Self::Attached => "attached",
            Self::Detached => "detached",
            Self::AttributeChanged => "attributeChanged",
        };
        f.write_str(name)
    }
}

/// Callback for `created`, `render`, `ready`, `attached` and `detached`
pub type LifecycleHook = Rc<dyn Fn(&mut Document, NodeId) -> anyhow::Result<()>>;

/// Callback for `attributeChanged`
pub type AttributeChangedHook =
    Rc<dyn Fn(&mut Document, NodeId, &AttributeChange) -> anyhow::Result<()>>;

/// Lifecycle callbacks of a definition
#[derive(Clone, Default)]
pub struct Callbacks {
    pub created: Option<LifecycleHook>,
    pub render: Option<LifecycleHook>,
    pub ready: Option<LifecycleHook>,
    pub attached: Option<LifecycleHook>,
    pub detached: Option<LifecycleHook>,
    pub attribute_changed: Option<AttributeChangedHook>,
}

impl Callbacks {
    /// Node-only callback for a transition (`AttributeChanged` has its own
    /// signature and is never returned here)
    pub fn get(&self, lifecycle: Lifecycle) -> Option<&LifecycleHook> {
        match lifecycle {
            Lifecycle::Created => self.created.as_ref(),
            Lifecycle::Render => self.render.as_ref(),
            Lifecycle::Ready => self.ready.as_ref(),
            Lifecycle::Attached => self.attached.as_ref(),
            Lifecycle::Detached => self.detached.as_ref(),
            Lifecycle::AttributeChanged => None,
        }
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("created", &self.created.is_some())
            .field("render", &self.render.is_some())
            .field("ready", &self.ready.is_some())
            .field("attached", &self.attached.is_some())
            .field("detached", &self.detached.is_some())
            .field("attribute_changed", &self.attribute_changed.is_some())
            .finish()
    }
}

/// Property declaration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropConfig {
    /// Link the property to its dash-cased attribute
    pub attribute: bool,
}

/// Definition options, built up before registration
#[derive(Debug, Clone, Default)]
pub struct DefinitionConfig {
    callbacks: Callbacks,
    observed_attributes: Vec<String>,
    props: Vec<(String, PropConfig)>,
    extends: Option<String>,
    namespace: Namespace,
}

impl DefinitionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Document, NodeId) -> anyhow::Result<()> + 'static,
    {
        self.callbacks.created = Some(Rc::new(f));
        self
    }

    pub fn render<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Document, NodeId) -> anyhow::Result<()> + 'static,
    {
        self.callbacks.render = Some(Rc::new(f));
        self
    }

    pub fn ready<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Document, NodeId) -> anyhow::Result<()> + 'static,
    {
        self.callbacks.ready = Some(Rc::new(f));
        self
    }

    pub fn attached<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Document, NodeId) -> anyhow::Result<()> + 'static,
    {
        self.callbacks.attached = Some(Rc::new(f));
        self
    }

    pub fn detached<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Document, NodeId) -> anyhow::Result<()> + 'static,
    {
        self.callbacks.detached = Some(Rc::new(f));
        self
    }

    pub fn attribute_changed<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Document, NodeId, &AttributeChange) -> anyhow::Result<()> + 'static,
    {
        self.callbacks.attribute_changed = Some(Rc::new(f));
        self
    }

    pub fn observed_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.observed_attributes.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn prop(mut self, name: &str, config: PropConfig) -> Self {
        self.props.push((name.to_string(), config));
        self
    }

    /// Customize a native element: matches `<tag is="name">`
    pub fn extends(mut self, tag: &str) -> Self {
        self.extends = Some(tag.to_string());
        self
    }

    /// Native interface the element is built on
    pub fn namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = namespace;
        self
    }
}

/// Registered element definition. Immutable once registered.
#[derive(Debug)]
pub struct Definition {
    name: String,
    /// Registration order, used for match precedence
    sequence: u64,
    callbacks: Callbacks,
    /// Union of observed attributes and linked props, first occurrence wins
    observed: Vec<String>,
    props: Vec<(String, PropConfig)>,
    extends: Option<String>,
    namespace: Namespace,
}

impl Definition {
    pub(crate) fn new(name: &str, sequence: u64, config: DefinitionConfig) -> Self {
        let linked = config
            .props
            .iter()
            .filter(|(_, prop)| prop.attribute)
            .map(|(prop, _)| dash_case(prop));

        let mut observed: Vec<String> = Vec::new();
        for attr in config.observed_attributes.iter().cloned().chain(linked) {
            if !observed.contains(&attr) {
                observed.push(attr);
            }
        }

        let extends = match config.namespace {
            Namespace::Html => config.extends.map(|tag| tag.to_ascii_lowercase()),
            Namespace::Svg => config.extends,
        };

        Self {
            name: name.to_string(),
            sequence,
            callbacks: config.callbacks,
            observed,
            props: config.props,
            extends,
            namespace: config.namespace,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn callbacks(&self) -> &Callbacks {
        &self.callbacks
    }

    /// Attribute names that trigger `attributeChanged`
    pub fn observed_attributes(&self) -> &[String] {
        &self.observed
    }

    pub fn observes(&self, attribute: &str) -> bool {
        self.observed.iter().any(|a| a == attribute)
    }

    pub fn props(&self) -> &[(String, PropConfig)] {
        &self.props
    }

    pub fn extends(&self) -> Option<&str> {
        self.extends.as_deref()
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Check an element with this local name and `is` value matches
    pub fn matches(&self, tag: &str, is: Option<&str>) -> bool {
        match &self.extends {
            Some(base) => base == tag && is == Some(self.name.as_str()),
            None => tag == self.name,
        }
    }
}

/// `testProp` -> `test-prop`
pub fn dash_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
