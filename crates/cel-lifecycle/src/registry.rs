//! Element Registry
//!
//! Maps element names to definitions. Re-registering a name replaces the
//! previous definition. When a node matches both a plain tag definition and
//! an `is=` extension, the most recently registered one wins.

use std::collections::HashMap;
use std::rc::Rc;

use cel_dom::{DomTree, NodeId};

use crate::{Definition, DefinitionConfig, LifecycleError, Result};

/// Element definitions keyed by name
#[derive(Debug, Default)]
pub struct Registry {
    definitions: HashMap<String, Rc<Definition>>,
    next_sequence: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the definition for `name`
    pub fn register(&mut self, name: &str, config: DefinitionConfig) -> Result<Rc<Definition>> {
        Self::validate_name(name)?;

        self.next_sequence += 1;
        let definition = Rc::new(Definition::new(name, self.next_sequence, config));
        if let Some(previous) = self
            .definitions
            .insert(name.to_string(), Rc::clone(&definition))
        {
            tracing::warn!(
                "Replacing definition #{} for <{}> with #{}",
                previous.sequence(),
                name,
                definition.sequence()
            );
        }
        Ok(definition)
    }

    /// Get element definition by name
    pub fn get(&self, name: &str) -> Option<&Rc<Definition>> {
        self.definitions.get(name)
    }

    /// Check if element is defined
    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definition matching a node, if any. Nodes without a tag name never
    /// match.
    pub fn lookup(&self, tree: &DomTree, node: NodeId) -> Option<Rc<Definition>> {
        let tag = tree.tag_name(node)?;
        let by_tag = self
            .definitions
            .get(tag)
            .filter(|def| def.matches(tag, None));
        let by_is = tree
            .get_attribute(node, "is")
            .and_then(|is| self.definitions.get(is).filter(|def| def.matches(tag, Some(is))));

        match (by_tag, by_is) {
            (Some(a), Some(b)) if a.sequence() > b.sequence() => Some(Rc::clone(a)),
            (_, Some(b)) => Some(Rc::clone(b)),
            (a, None) => a.cloned(),
        }
    }

    /// Validate custom element name
    pub fn is_valid_name(name: &str) -> bool {
        Self::validate_name(name).is_ok()
    }

    fn validate_name(name: &str) -> Result<()> {
        let invalid = |reason| {
            Err(LifecycleError::InvalidName {
                name: name.to_string(),
                reason,
            })
        };

        // Must contain a hyphen
        if !name.contains('-') {
            return invalid("must contain a hyphen");
        }

        // Must start with lowercase ASCII
        if !name.starts_with(|c: char| c.is_ascii_lowercase()) {
            return invalid("must start with a lowercase ASCII letter");
        }

        const RESERVED: &[&str] = &[
            "annotation-xml",
            "color-profile",
            "font-face",
            "font-face-src",
            "font-face-uri",
            "font-face-format",
            "font-face-name",
            "missing-glyph",
        ];
        if RESERVED.contains(&name) {
            return invalid("reserved element name");
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.'))
        {
            return invalid("may only contain lowercase letters, digits, '-', '_' and '.'");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cel_dom::{Document, Namespace};

    #[test]
    fn test_valid_names() {
        assert!(Registry::is_valid_name("my-element"));
        assert!(Registry::is_valid_name("app-header"));
        assert!(Registry::is_valid_name("x-foo-bar"));
        assert!(!Registry::is_valid_name("myelement")); // no hyphen
        assert!(!Registry::is_valid_name("My-Element")); // uppercase
        assert!(!Registry::is_valid_name("my-Element")); // uppercase later
        assert!(!Registry::is_valid_name("1-element")); // starts with number
        assert!(!Registry::is_valid_name("font-face")); // reserved
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = Registry::new();
        let first = registry.register("my-element", DefinitionConfig::new()).unwrap();
        let second = registry.register("my-element", DefinitionConfig::new()).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(second.sequence() > first.sequence());
        assert!(Rc::ptr_eq(registry.get("my-element").unwrap(), &second));
    }

    #[test]
    fn test_register_rejects_invalid_name() {
        let mut registry = Registry::new();
        let err = registry.register("nohyphen", DefinitionConfig::new()).unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidName { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_lookup_by_tag_and_is() {
        let mut registry = Registry::new();
        registry.register("x-plain", DefinitionConfig::new()).unwrap();
        registry
            .register("x-shape", DefinitionConfig::new().extends("path").namespace(Namespace::Svg))
            .unwrap();

        let mut doc = Document::new();
        let plain = doc.create_element("x-plain");
        let path = doc.create_element_ns(Namespace::Svg, "path");
        doc.set_attribute(path, "is", "x-shape").unwrap();
        let circle = doc.create_element_ns(Namespace::Svg, "circle");
        doc.set_attribute(circle, "is", "x-shape").unwrap();

        assert_eq!(registry.lookup(doc.tree(), plain).unwrap().name(), "x-plain");
        assert_eq!(registry.lookup(doc.tree(), path).unwrap().name(), "x-shape");
        assert!(registry.lookup(doc.tree(), circle).is_none());

        let text = doc.create_text("x-plain");
        assert!(registry.lookup(doc.tree(), text).is_none());
    }

    #[test]
    fn test_lookup_precedence_latest_wins() {
        let mut registry = Registry::new();
        registry.register("x-base", DefinitionConfig::new()).unwrap();
        registry
            .register("x-ext", DefinitionConfig::new().extends("x-base"))
            .unwrap();

        let mut doc = Document::new();
        let node = doc.create_element("x-base");
        doc.set_attribute(node, "is", "x-ext").unwrap();
        assert_eq!(registry.lookup(doc.tree(), node).unwrap().name(), "x-ext");

        // Re-registering the tag definition makes it the newest
        registry.register("x-base", DefinitionConfig::new()).unwrap();
        assert_eq!(registry.lookup(doc.tree(), node).unwrap().name(), "x-base");
    }

    #[test]
    fn test_masked_tag_never_matches() {
        let mut registry = Registry::new();
        registry.register("x-plain", DefinitionConfig::new()).unwrap();
        let mut doc = Document::new();
        let node = doc.create_element("x-plain");
        doc.mask_tag_name(node);
        assert!(registry.lookup(doc.tree(), node).is_none());
    }
}
