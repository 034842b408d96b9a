//! DOM Node
//!
//! Nodes live in the [`DomTree`](crate::DomTree) arena and link to each
//! other through [`NodeId`]s instead of pointers.

use crate::NodeId;

/// DOM Node - Core structure
#[derive(Debug)]
pub struct Node {
    /// Parent node (NONE if detached or root)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
    /// `tagName` surface is missing on this node
    pub(crate) tag_name_masked: bool,
    /// `childNodes` surface is missing on this node
    pub(crate) child_nodes_masked: bool,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
            tag_name_masked: false,
            child_nodes_masked: false,
        }
    }

    /// Create a new element node
    pub fn element(name: &str, namespace: Namespace) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(name, namespace)))
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Self::with_data(NodeData::Text(content.to_string()))
    }

    /// Create a new comment node
    pub fn comment(content: &str) -> Self {
        Self::with_data(NodeData::Comment(content.to_string()))
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    /// Create a document fragment node
    pub fn fragment() -> Self {
        Self::with_data(NodeData::DocumentFragment)
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is a document fragment
    #[inline]
    pub fn is_fragment(&self) -> bool {
        matches!(self.data, NodeData::DocumentFragment)
    }

    /// Check if this node may have children
    #[inline]
    pub fn is_container(&self) -> bool {
        matches!(
            self.data,
            NodeData::Document | NodeData::DocumentFragment | NodeData::Element(_)
        )
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Document root
    Document,
    /// Detached container whose children move on insertion
    DocumentFragment,
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
    /// Comment
    Comment(String),
}

/// Element namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Namespace {
    #[default]
    Html,
    Svg,
}

/// Element-specific data
#[derive(Debug)]
pub struct ElementData {
    /// Local name, ASCII-lowercased for HTML elements
    pub name: String,
    pub namespace: Namespace,
    /// Attributes in insertion order
    pub attrs: Vec<Attribute>,
}

impl ElementData {
    pub fn new(name: &str, namespace: Namespace) -> Self {
        let name = match namespace {
            Namespace::Html => name.to_ascii_lowercase(),
            Namespace::Svg => name.to_string(),
        };
        Self {
            name,
            namespace,
            attrs: Vec::new(),
        }
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, returning the previous value
    pub fn set_attr(&mut self, name: &str, value: &str) -> Option<String> {
        if let Some(attr) = self.attrs.iter_mut().find(|a| a.name == name) {
            return Some(std::mem::replace(&mut attr.value, value.to_string()));
        }
        self.attrs.push(Attribute {
            name: name.to_string(),
            value: value.to_string(),
        });
        None
    }

    /// Remove an attribute, returning its value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|a| a.name == name)?;
        Some(self.attrs.remove(pos).value)
    }
}

/// Attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Attribute mutation as seen by hooks and `attributeChanged`.
///
/// `None` stands for an absent attribute on either side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeChange {
    pub name: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_names_are_lowercased() {
        let elem = ElementData::new("X-Foo", Namespace::Html);
        assert_eq!(elem.name, "x-foo");

        let svg = ElementData::new("linearGradient", Namespace::Svg);
        assert_eq!(svg.name, "linearGradient");
    }

    #[test]
    fn test_set_attr_returns_previous() {
        let mut elem = ElementData::new("div", Namespace::Html);
        assert_eq!(elem.set_attr("title", "a"), None);
        assert_eq!(elem.set_attr("title", "b"), Some("a".to_string()));
        assert_eq!(elem.get_attr("title"), Some("b"));
        assert_eq!(elem.attrs.len(), 1);
    }

    #[test]
    fn test_remove_attr() {
        let mut elem = ElementData::new("div", Namespace::Html);
        elem.set_attr("id", "main");
        assert_eq!(elem.remove_attr("id"), Some("main".to_string()));
        assert_eq!(elem.remove_attr("id"), None);
        assert!(elem.attrs.is_empty());
    }

    #[test]
    fn test_node_kinds() {
        assert!(Node::element("div", Namespace::Html).is_container());
        assert!(Node::fragment().is_fragment());
        assert!(!Node::text("hi").is_container());
        assert_eq!(Node::text("hi").as_text(), Some("hi"));
        assert!(Node::comment("c").as_element().is_none());
    }
}
