//! In-memory XML tree with typed accessors.
//!
//! Lookups go by local name; new children inherit their parent's namespace
//! unless they were created in an explicit one.

use crate::error::Result;

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    namespace: Option<String>,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
    verbatim: bool,
}

impl Element {
    /// Create an element with no namespace of its own. It picks up the
    /// parent's namespace once pushed.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            attributes: Vec::new(),
            children: Vec::new(),
            verbatim: false,
        }
    }

    pub fn in_namespace(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.namespace = Some(namespace.into());
        element
    }

    /// Parse a single-rooted XML fragment.
    pub fn parse(xml: &str) -> Result<Self> {
        super::parse::parse_element(xml)
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    /// Qualified name as written, e.g. `component` or `wcm:action`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    pub(crate) fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub(crate) fn set_namespace(&mut self, namespace: Option<String>) {
        self.namespace = namespace;
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First child element with the given local name.
    pub fn child(&self, local_name: &str) -> Option<&Element> {
        self.elements().find(|e| e.local_name() == local_name)
    }

    pub fn child_mut(&mut self, local_name: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.local_name() == local_name)
    }

    /// Walk a chain of local names.
    pub fn descend(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |element, name| element.child(name))
    }

    /// Get the first child with this local name, creating it on first use.
    pub fn child_or_insert(&mut self, local_name: &str) -> &mut Element {
        self.child_or_insert_with(|e| e.local_name() == local_name, || Element::new(local_name))
    }

    /// Get the first child matching `pred`, or push the one `create` builds.
    pub fn child_or_insert_with(
        &mut self,
        pred: impl Fn(&Element) -> bool,
        create: impl FnOnce() -> Element,
    ) -> &mut Element {
        let existing = self
            .children
            .iter()
            .position(|node| matches!(node, Node::Element(e) if pred(e)));
        let index = match existing {
            Some(index) => index,
            None => {
                self.push(create());
                self.children.len() - 1
            }
        };
        self.element_at_mut(index)
    }

    /// Append a child element and return it.
    pub fn push(&mut self, mut child: Element) -> &mut Element {
        child.inherit_namespace(self.namespace.as_deref());
        self.children.push(Node::Element(child));
        let index = self.children.len() - 1;
        self.element_at_mut(index)
    }

    /// Insert a child element before every existing child.
    pub fn prepend(&mut self, mut child: Element) {
        child.inherit_namespace(self.namespace.as_deref());
        self.children.insert(0, Node::Element(child));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    /// Replace all children with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![Node::Text(text.into())];
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    pub fn retain_elements(&mut self, mut keep: impl FnMut(&Element) -> bool) {
        self.children.retain(|node| match node {
            Node::Element(element) => keep(element),
            Node::Text(_) => true,
        });
    }

    /// Whether this element came from caller-supplied markup.
    pub fn is_verbatim(&self) -> bool {
        self.verbatim
    }

    /// Flag this subtree as caller-supplied.
    pub fn mark_verbatim(&mut self) {
        self.verbatim = true;
        for child in self.elements_mut() {
            child.mark_verbatim();
        }
    }

    /// Serialize with tab indentation and CRLF line endings.
    pub fn to_canonical_string(&self) -> String {
        super::writer::write_canonical(self)
    }

    pub(crate) fn push_node(&mut self, node: Node) {
        self.children.push(node);
    }

    fn inherit_namespace(&mut self, namespace: Option<&str>) {
        if self.namespace.is_none() && self.prefix().is_none() {
            self.namespace = namespace.map(str::to_string);
        }
        let own = self.namespace.clone();
        for child in self.elements_mut() {
            child.inherit_namespace(own.as_deref());
        }
    }

    fn element_at_mut(&mut self, index: usize) -> &mut Element {
        match &mut self.children[index] {
            Node::Element(element) => element,
            Node::Text(_) => unreachable!("index {index} was taken from an element node"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_or_insert_reuses_existing() {
        let mut root = Element::in_namespace("root", "urn:test");
        root.child_or_insert("a").set_text("one");
        root.child_or_insert("a").push_text("two");
        assert_eq!(root.elements().count(), 1);
        assert_eq!(root.child("a").unwrap().text(), "onetwo");
    }

    #[test]
    fn test_children_inherit_namespace() {
        let mut root = Element::in_namespace("root", "urn:test");
        root.push(Element::new("a").with_child(Element::new("b")));
        root.push(Element::in_namespace("c", "urn:other"));
        let a = root.child("a").unwrap();
        assert_eq!(a.namespace(), Some("urn:test"));
        assert_eq!(a.child("b").unwrap().namespace(), Some("urn:test"));
        assert_eq!(root.child("c").unwrap().namespace(), Some("urn:other"));
    }

    #[test]
    fn test_set_attr_replaces_in_place() {
        let mut e = Element::new("x").with_attr("a", "1").with_attr("b", "2");
        e.set_attr("a", "3");
        let attrs: Vec<_> = e.attributes().collect();
        assert_eq!(attrs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_prepend_and_local_name() {
        let mut e = Element::new("list");
        e.push(Element::new("second"));
        e.prepend(Element::new("wcm:first"));
        let names: Vec<_> = e.elements().map(|c| c.local_name()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_descend_and_retain() {
        let mut root = Element::new("a").with_child(Element::new("b").with_child(Element::new("c")));
        assert!(root.descend(&["b", "c"]).is_some());
        assert!(root.descend(&["b", "d"]).is_none());
        root.retain_elements(|e| e.local_name() != "b");
        assert!(root.is_empty());
    }

    #[test]
    fn test_mark_verbatim_is_recursive() {
        let mut e = Element::new("a").with_child(Element::new("b"));
        e.mark_verbatim();
        assert!(e.is_verbatim());
        assert!(e.child("b").unwrap().is_verbatim());
    }
}
