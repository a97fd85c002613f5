//! Detached elements and the arena-backed document they are attached to.
//!
//! Builders return an [`Element`], a plain owned tree with no links to any
//! document. Attaching it with [`Document::append`] copies it into the arena,
//! where every node is addressed by a [`NodeId`] and every node carrying an
//! `ID` attribute can also be found through [`Document::element_by_id`].
//! Nodes are only ever added, never removed, so a `NodeId` stays valid for
//! the lifetime of its document.

use std::collections::HashMap;

use crate::namespace::Namespace;

/// Attribute holding the cross-reference identifier of a section.
const ID_ATTRIBUTE: &str = "ID";

/// Namespace-qualified element or attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    namespace: Option<String>,
    local: String,
}

impl QName {
    /// Name in one of the registered namespaces.
    pub fn new(namespace: Namespace, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.uri().to_string()),
            local: local.into(),
        }
    }

    /// Name without a namespace (the usual case for METS attributes).
    pub fn unqualified(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    /// Name in an arbitrary namespace URI, as found in parsed documents.
    pub fn with_uri(namespace: Option<String>, local: impl Into<String>) -> Self {
        Self {
            namespace,
            local: local.into(),
        }
    }

    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local
    }

    #[must_use]
    pub fn namespace_uri(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Whether this name is `local` in namespace `ns`.
    #[must_use]
    pub fn is(&self, ns: Namespace, local: &str) -> bool {
        self.local == local && self.namespace.as_deref() == Some(ns.uri())
    }
}

/// Attribute name and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

/// An owned element tree that is not attached to any document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: QName,
    pub attributes: Vec<Attribute>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    /// Empty element in a registered namespace.
    pub fn new(namespace: Namespace, local: impl Into<String>) -> Self {
        Self::with_name(QName::new(namespace, local))
    }

    pub fn with_name(name: QName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Add an unqualified attribute.
    #[must_use]
    pub fn attr(mut self, local: &str, value: impl Into<String>) -> Self {
        self.set_attribute(QName::unqualified(local), value);
        self
    }

    /// Add a namespace-qualified attribute such as `xlink:href`.
    #[must_use]
    pub fn ns_attr(mut self, namespace: Namespace, local: &str, value: impl Into<String>) -> Self {
        self.set_attribute(QName::new(namespace, local), value);
        self
    }

    /// Set the text content.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append a child element.
    #[must_use]
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Append a child element in place.
    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Replace the value of an attribute with the same name, or add it.
    pub fn set_attribute(&mut self, name: QName, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    /// Value of the first attribute with this local name, ignoring namespaces.
    #[must_use]
    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.local_name() == local)
            .map(|a| a.value.as_str())
    }

    /// First direct child with this local name.
    #[must_use]
    pub fn find(&self, local: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name.local_name() == local)
    }
}

/// Index of a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    name: QName,
    attributes: Vec<Attribute>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed XML document.
///
/// The root element is always node 0. Cloning a document yields an
/// independent copy that can be amended without touching the original.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    ids: HashMap<String, NodeId>,
}

impl Document {
    /// Create a document whose root is `root`.
    pub fn new(root: Element) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            ids: HashMap::new(),
        };
        doc.insert(None, root);
        doc
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Attach `element` (and its subtree) as the last child of `parent`.
    ///
    /// # Returns
    /// Id of the newly attached element
    pub fn append(&mut self, parent: NodeId, element: Element) -> NodeId {
        self.insert(Some(parent), element)
    }

    fn insert(&mut self, parent: Option<NodeId>, element: Element) -> NodeId {
        let id = NodeId(self.nodes.len());
        let Element {
            name,
            attributes,
            text,
            children,
        } = element;

        if let Some(value) = id_value(&attributes) {
            self.ids.entry(value.to_string()).or_insert(id);
        }
        self.nodes.push(Node {
            name,
            attributes,
            text,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        for child in children {
            self.insert(Some(id), child);
        }
        id
    }

    #[must_use]
    pub fn name(&self, id: NodeId) -> &QName {
        &self.nodes[id.0].name
    }

    #[must_use]
    pub fn local_name(&self, id: NodeId) -> &str {
        self.nodes[id.0].name.local_name()
    }

    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        &self.nodes[id.0].attributes
    }

    /// Value of the first attribute with this local name, ignoring namespaces.
    #[must_use]
    pub fn attribute(&self, id: NodeId, local: &str) -> Option<&str> {
        self.nodes[id.0]
            .attributes
            .iter()
            .find(|a| a.name.local_name() == local)
            .map(|a| a.value.as_str())
    }

    /// Set (or add) an attribute on an attached node.
    pub fn set_attribute(&mut self, id: NodeId, name: QName, value: impl Into<String>) {
        let value = value.into();
        if name.namespace_uri().is_none() && name.local_name() == ID_ATTRIBUTE {
            self.ids.entry(value.clone()).or_insert(id);
        }
        let node = &mut self.nodes[id.0];
        match node.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => node.attributes.push(Attribute { name, value }),
        }
    }

    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].text.as_deref()
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// The node itself followed by all its descendants, in document order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![id],
        }
    }

    /// Node whose `ID` attribute equals `value`.
    #[must_use]
    pub fn element_by_id(&self, value: &str) -> Option<NodeId> {
        self.ids.get(value).copied()
    }

    /// Number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Copy a subtree back out as a detached element.
    #[must_use]
    pub fn to_element(&self, id: NodeId) -> Element {
        let node = &self.nodes[id.0];
        Element {
            name: node.name.clone(),
            attributes: node.attributes.clone(),
            text: node.text.clone(),
            children: node.children.iter().map(|c| self.to_element(*c)).collect(),
        }
    }
}

fn id_value(attributes: &[Attribute]) -> Option<&str> {
    attributes
        .iter()
        .find(|a| a.name.namespace_uri().is_none() && a.name.local_name() == ID_ATTRIBUTE)
        .map(|a| a.value.as_str())
}

/// Pre-order iterator returned by [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}
