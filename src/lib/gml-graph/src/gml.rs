/*!
Object types that represent a parsed GML graph.

A [`Graph`] owns all of its [`Node`]s and [`Edge`]s. Nodes and edges refer to each other only by
node id and edge index, and the graph resolves those references through its accessors.
*/

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// The value types supported by GML. A `List` is a nested `[ ... ]` block whose key-value pairs
/// are kept in source order, including repeated keys.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Int(i64),
    Float(f64),
    Str(Cow<'a, str>),
    List(Vec<(Cow<'a, str>, Value<'a>)>),
}

impl<'a> Value<'a> {
    /// Returns an integer if the value is an integer. Otherwise returns `None`.
    pub fn as_int(&self) -> Option<i64> {
        if let Self::Int(x) = self {
            return Some(*x);
        }
        None
    }

    /// Returns a float if the value is a float. Integers are not converted.
    pub fn as_float(&self) -> Option<f64> {
        if let Self::Float(x) = self {
            return Some(*x);
        }
        None
    }

    /// Returns a string if the value is a string. Otherwise returns `None`.
    pub fn as_str(&self) -> Option<&str> {
        if let Self::Str(s) = self {
            return Some(s);
        }
        None
    }

    /// Returns the key-value pairs if the value is a nested block. Otherwise returns `None`.
    pub fn as_list(&self) -> Option<&[(Cow<'a, str>, Value<'a>)]> {
        if let Self::List(items) = self {
            return Some(items);
        }
        None
    }

    /// Convert any borrowed references to owned values.
    pub fn upgrade_to_owned(&self) -> Value<'static> {
        match self {
            Self::Int(x) => Value::Int(*x),
            Self::Float(x) => Value::Float(*x),
            Self::Str(s) => Value::Str(Cow::Owned(s.clone().into_owned())),
            Self::List(items) => Value::List(
                items
                    .iter()
                    .map(|(k, v)| (Cow::Owned(k.clone().into_owned()), v.upgrade_to_owned()))
                    .collect(),
            ),
        }
    }
}

/// Formats the value as GML text.
impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(x) => write!(f, "{x}"),
            // debug formatting keeps the fractional part of whole floats ("3.0", not "3")
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::List(items) => {
                f.write_str("[")?;
                for (k, v) in items {
                    write!(f, " {k} {v}")?;
                }
                f.write_str(" ]")
            }
        }
    }
}

/// The key-value pairs of a declaration. A GML key may repeat within a block, so each key maps to
/// all of its values in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes<'a> {
    values: HashMap<Cow<'a, str>, Vec<Value<'a>>>,
}

impl<'a> Attributes<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, key: Cow<'a, str>, value: Value<'a>) {
        self.values.entry(key).or_default().push(value);
    }

    pub(crate) fn remove(&mut self, key: &str) -> Vec<Value<'a>> {
        self.values.remove(key).unwrap_or_default()
    }

    /// All values given for `key`, in source order. Empty if the key is absent.
    pub fn get(&self, key: &str) -> &[Value<'a>] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The first value given for `key`.
    pub fn first(&self, key: &str) -> Option<&Value<'a>> {
        self.get(key).first()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_ref())
    }

    /// Each key with all of its values. Keys are visited in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value<'a>])> {
        self.values.iter().map(|(k, v)| (k.as_ref(), v.as_slice()))
    }

    /// The number of distinct keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Convert any borrowed references to owned values.
    pub fn upgrade_to_owned(&self) -> Attributes<'static> {
        Attributes {
            values: self
                .values
                .iter()
                .map(|(k, v)| {
                    (
                        Cow::Owned(k.clone().into_owned()),
                        v.iter().map(Value::upgrade_to_owned).collect(),
                    )
                })
                .collect(),
        }
    }
}

impl<'a, K> FromIterator<(K, Value<'a>)> for Attributes<'a>
where
    K: Into<Cow<'a, str>>,
{
    fn from_iter<I: IntoIterator<Item = (K, Value<'a>)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (k, v) in iter {
            attributes.push(k.into(), v);
        }
        attributes
    }
}

/// A graph node. Nodes that were only referenced by an edge are anonymous and have no
/// attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<'a> {
    id: i64,
    is_anon: bool,
    attributes: Attributes<'a>,
    forward_edges: Vec<usize>,
    backward_edges: Vec<usize>,
}

impl<'a> Node<'a> {
    pub(crate) fn new(id: i64, attributes: Attributes<'a>) -> Self {
        Self {
            id,
            is_anon: false,
            attributes,
            forward_edges: Vec::new(),
            backward_edges: Vec::new(),
        }
    }

    pub(crate) fn anonymous(id: i64) -> Self {
        Self {
            is_anon: true,
            ..Self::new(id, Attributes::new())
        }
    }

    pub(crate) fn add_forward_edge(&mut self, index: usize) {
        self.forward_edges.push(index);
    }

    pub(crate) fn add_backward_edge(&mut self, index: usize) {
        self.backward_edges.push(index);
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// True if the node was never declared and only exists because an edge references it.
    pub fn is_anon(&self) -> bool {
        self.is_anon
    }

    /// The node's key-value pairs, excluding `id`.
    pub fn attributes(&self) -> &Attributes<'a> {
        &self.attributes
    }

    /// Indexes into [`Graph::edges`] of the edges whose source is this node, in edge order.
    pub fn forward_edge_indices(&self) -> &[usize] {
        &self.forward_edges
    }

    /// Indexes into [`Graph::edges`] of the edges whose target is this node, in edge order.
    pub fn backward_edge_indices(&self) -> &[usize] {
        &self.backward_edges
    }

    /// Convert any borrowed references to owned values.
    pub fn upgrade_to_owned(&self) -> Node<'static> {
        Node {
            id: self.id,
            is_anon: self.is_anon,
            attributes: self.attributes.upgrade_to_owned(),
            forward_edges: self.forward_edges.clone(),
            backward_edges: self.backward_edges.clone(),
        }
    }
}

/// A graph edge from node `source` to node `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge<'a> {
    source: i64,
    target: i64,
    attributes: Attributes<'a>,
}

impl<'a> Edge<'a> {
    pub(crate) fn new(source: i64, target: i64, attributes: Attributes<'a>) -> Self {
        Self {
            source,
            target,
            attributes,
        }
    }

    pub fn source(&self) -> i64 {
        self.source
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    /// The edge's key-value pairs, excluding `source` and `target`.
    pub fn attributes(&self) -> &Attributes<'a> {
        &self.attributes
    }

    /// Convert any borrowed references to owned values.
    pub fn upgrade_to_owned(&self) -> Edge<'static> {
        Edge {
            source: self.source,
            target: self.target,
            attributes: self.attributes.upgrade_to_owned(),
        }
    }
}

/// A GML graph. Immutable once built; every edge endpoint resolves to a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph<'a> {
    nodes: HashMap<i64, Node<'a>>,
    edges: Vec<Edge<'a>>,
    attributes: Attributes<'a>,
}

impl<'a> Graph<'a> {
    pub(crate) fn new(
        nodes: HashMap<i64, Node<'a>>,
        edges: Vec<Edge<'a>>,
        attributes: Attributes<'a>,
    ) -> Self {
        Self {
            nodes,
            edges,
            attributes,
        }
    }

    /// Look up a node by id.
    pub fn node(&self, id: i64) -> Option<&Node<'a>> {
        self.nodes.get(&id)
    }

    /// All nodes, declared and anonymous, in arbitrary order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<'a>> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All edges in the order they were declared.
    pub fn edges(&self) -> &[Edge<'a>] {
        &self.edges
    }

    pub fn edge(&self, index: usize) -> Option<&Edge<'a>> {
        self.edges.get(index)
    }

    /// The graph's own key-value pairs (everything that isn't a `node` or `edge`).
    pub fn attributes(&self) -> &Attributes<'a> {
        &self.attributes
    }

    /// Whether the graph sets a non-zero `directed` value. GML graphs are undirected by default.
    pub fn is_directed(&self) -> bool {
        matches!(self.attributes.first("directed"), Some(Value::Int(x)) if *x != 0)
    }

    /// Edges whose source is `node`, in edge order.
    ///
    /// Panics if the node doesn't belong to this graph.
    pub fn forward_edges<'g>(&'g self, node: &'g Node<'a>) -> impl Iterator<Item = &'g Edge<'a>> {
        node.forward_edges.iter().map(move |&i| &self.edges[i])
    }

    /// Edges whose target is `node`, in edge order.
    ///
    /// Panics if the node doesn't belong to this graph.
    pub fn backward_edges<'g>(&'g self, node: &'g Node<'a>) -> impl Iterator<Item = &'g Edge<'a>> {
        node.backward_edges.iter().map(move |&i| &self.edges[i])
    }

    /// The node at the edge's source.
    ///
    /// Panics if the edge doesn't belong to this graph.
    pub fn source_node(&self, edge: &Edge) -> &Node<'a> {
        &self.nodes[&edge.source]
    }

    /// The node at the edge's target.
    ///
    /// Panics if the edge doesn't belong to this graph.
    pub fn target_node(&self, edge: &Edge) -> &Node<'a> {
        &self.nodes[&edge.target]
    }

    /// Convert any borrowed references to owned values.
    pub fn upgrade_to_owned(&self) -> Graph<'static> {
        Graph {
            nodes: self
                .nodes
                .iter()
                .map(|(id, node)| (*id, node.upgrade_to_owned()))
                .collect(),
            edges: self.edges.iter().map(|e| e.upgrade_to_owned()).collect(),
            attributes: self.attributes.upgrade_to_owned(),
        }
    }
}
