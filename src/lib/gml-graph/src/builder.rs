/*!
Builds a [`Graph`] from the parsed key-value tree.

The first pass collects the declared nodes, the edges in order, and the graph's own attributes.
The second pass creates an anonymous node for every edge endpoint that was never declared, and
records each edge in its endpoints' forward and backward edge lists.
*/

use std::borrow::Cow;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use log::*;

use crate::error::{Declaration, Error, SemanticErrorKind};
use crate::gml::{Attributes, Edge, Graph, Node, Value};
use crate::options::ParserOptions;
use crate::parser::{Item, ItemValue};

pub fn build<'a>(
    source: &'a str,
    items: Vec<Item<'a>>,
    options: &ParserOptions,
) -> Result<Graph<'a>, Error> {
    let (mut attributes, body) = graph_body(source, items, options)?;

    let mut nodes = HashMap::new();
    let mut edges = Vec::new();

    for item in body {
        match item.key {
            "node" => {
                let offset = item.offset;
                let node = node_declaration(source, item)?;
                match nodes.entry(node.id()) {
                    Entry::Occupied(e) => {
                        return Err(Error::semantic(
                            source,
                            offset,
                            Declaration::Node,
                            SemanticErrorKind::DuplicateNode { id: *e.key() },
                        ));
                    }
                    Entry::Vacant(e) => {
                        e.insert(node);
                    }
                }
            }
            "edge" => edges.push(edge_declaration(source, item)?),
            key => attributes.push(Cow::Borrowed(key), item.value.into_value()),
        }
    }

    let declared = nodes.len();

    for (index, edge) in edges.iter().enumerate() {
        resolve(&mut nodes, edge.source()).add_forward_edge(index);
        resolve(&mut nodes, edge.target()).add_backward_edge(index);
    }

    debug!(
        "Built graph with {} declared nodes, {} anonymous nodes, and {} edges",
        declared,
        nodes.len() - declared,
        edges.len()
    );

    Ok(Graph::new(nodes, edges, attributes))
}

/// Split the outermost block into the graph's body and any attributes given outside of it.
fn graph_body<'a>(
    source: &'a str,
    items: Vec<Item<'a>>,
    options: &ParserOptions,
) -> Result<(Attributes<'a>, Vec<Item<'a>>), Error> {
    let mut body = None;
    let mut outside = Vec::new();

    for item in items {
        if item.key != "graph" {
            outside.push(item);
            continue;
        }

        if body.is_some() {
            return Err(Error::semantic(
                source,
                item.offset,
                Declaration::Graph,
                SemanticErrorKind::MultipleGraphs,
            ));
        }
        body = Some(block(source, item, Declaration::Graph)?);
    }

    match body {
        Some(body) => {
            if let Some(item) = outside.iter().find(|x| matches!(x.key, "node" | "edge")) {
                let (declaration, key) = match item.key {
                    "node" => (Declaration::Node, "node"),
                    _ => (Declaration::Edge, "edge"),
                };
                return Err(Error::semantic(
                    source,
                    item.offset,
                    declaration,
                    SemanticErrorKind::OutsideGraph { key },
                ));
            }

            let attributes: Attributes = outside
                .into_iter()
                .map(|item| (item.key, item.value.into_value()))
                .collect();
            Ok((attributes, body))
        }
        None if options.require_graph_block => Err(Error::semantic(
            source,
            0,
            Declaration::Graph,
            SemanticErrorKind::MissingGraph,
        )),
        None => {
            debug!("No top-level 'graph' block; reading the outermost level as the graph body");
            Ok((Attributes::new(), outside))
        }
    }
}

/// Insert an anonymous node for `id` if it wasn't declared.
fn resolve<'n, 'a>(nodes: &'n mut HashMap<i64, Node<'a>>, id: i64) -> &'n mut Node<'a> {
    nodes.entry(id).or_insert_with(|| {
        trace!("Adding anonymous node {id}");
        Node::anonymous(id)
    })
}

fn node_declaration<'a>(source: &str, item: Item<'a>) -> Result<Node<'a>, Error> {
    let offset = item.offset;
    let mut attributes: Attributes = block(source, item, Declaration::Node)?
        .into_iter()
        .map(|item| (item.key, item.value.into_value()))
        .collect();

    let id = take_integer(&mut attributes, "id")
        .map_err(|kind| Error::semantic(source, offset, Declaration::Node, kind))?;

    Ok(Node::new(id, attributes))
}

fn edge_declaration<'a>(source: &str, item: Item<'a>) -> Result<Edge<'a>, Error> {
    let offset = item.offset;
    let mut attributes: Attributes = block(source, item, Declaration::Edge)?
        .into_iter()
        .map(|item| (item.key, item.value.into_value()))
        .collect();

    let mut endpoint = |key| {
        take_integer(&mut attributes, key)
            .map_err(|kind| Error::semantic(source, offset, Declaration::Edge, kind))
    };
    let edge_source = endpoint("source")?;
    let edge_target = endpoint("target")?;

    Ok(Edge::new(edge_source, edge_target, attributes))
}

/// The items of a declaration, which must be a `[ ... ]` block.
fn block<'a>(
    source: &str,
    item: Item<'a>,
    declaration: Declaration,
) -> Result<Vec<Item<'a>>, Error> {
    match item.value {
        ItemValue::Block { items, .. } => Ok(items),
        ItemValue::Scalar(value) => Err(Error::semantic(
            source,
            item.offset,
            declaration,
            SemanticErrorKind::NotABlock {
                found: value.to_string(),
            },
        )),
    }
}

/// Remove `key` from the attributes, requiring it to have exactly one integer value.
fn take_integer(
    attributes: &mut Attributes<'_>,
    key: &'static str,
) -> Result<i64, SemanticErrorKind> {
    match attributes.remove(key).as_slice() {
        [] => Err(SemanticErrorKind::MissingAttribute { key }),
        [Value::Int(x)] => Ok(*x),
        [other] => Err(SemanticErrorKind::NonInteger {
            key,
            found: other.to_string(),
        }),
        _ => Err(SemanticErrorKind::DuplicateAttribute { key }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_items;

    fn build_str(input: &str) -> Result<Graph<'_>, Error> {
        build_with(input, &ParserOptions::default())
    }

    fn build_with<'a>(input: &'a str, options: &ParserOptions) -> Result<Graph<'a>, Error> {
        let items = parse_items(input, options)?;
        build(input, items, options)
    }

    fn semantic_error(input: &str) -> (Declaration, SemanticErrorKind) {
        match build_str(input) {
            Err(Error::Semantic {
                declaration, kind, ..
            }) => (declaration, kind),
            x => panic!("Unexpected result: {:?}", x),
        }
    }

    #[test]
    fn test_nodes_and_edges() {
        let graph = build_str(
            r#"graph [
              directed 1
              node [ id 0 label "zero" ]
              node [ id 1 ]
              edge [ source 0 target 1 weight 2 ]
              edge [ source 1 target 0 ]
            ]"#,
        )
        .unwrap();

        assert!(graph.is_directed());
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edges().len(), 2);

        let zero = graph.node(0).unwrap();
        assert!(!zero.is_anon());
        assert!(!zero.attributes().contains_key("id"));
        assert_eq!(
            zero.attributes().first("label").and_then(Value::as_str),
            Some("zero")
        );
        assert_eq!(zero.forward_edge_indices(), &[0]);
        assert_eq!(zero.backward_edge_indices(), &[1]);

        let edge = &graph.edges()[0];
        assert!(!edge.attributes().contains_key("source"));
        assert_eq!(edge.attributes().get("weight"), &[Value::Int(2)]);
    }

    #[test]
    fn test_anonymous_nodes() {
        let graph = build_str("graph [ node [ id 1 ] edge [ source 1 target 7 ] edge [ source 7 target 7 ] ]").unwrap();

        assert_eq!(graph.node_count(), 2);
        let seven = graph.node(7).unwrap();
        assert!(seven.is_anon());
        assert!(seven.attributes().is_empty());
        assert_eq!(seven.forward_edge_indices(), &[1]);
        assert_eq!(seven.backward_edge_indices(), &[0, 1]);
        assert!(!graph.node(1).unwrap().is_anon());
    }

    #[test]
    fn test_graph_attributes_keep_repeats() {
        let graph = build_str(r#"graph [ comment "a" comment "b" nested [ x 1 ] ]"#).unwrap();
        assert_eq!(
            graph.attributes().get("comment"),
            &[Value::Str("a".into()), Value::Str("b".into())]
        );
        assert_eq!(
            graph.attributes().first("nested"),
            Some(&Value::List(vec![("x".into(), Value::Int(1))]))
        );
    }

    #[test]
    fn test_attributes_outside_graph() {
        let graph = build_str(r#"Creator "me" graph [ Creator "inner" ]"#).unwrap();
        assert_eq!(
            graph.attributes().get("Creator"),
            &[Value::Str("me".into()), Value::Str("inner".into())]
        );
    }

    #[test]
    fn test_without_graph_block() {
        let graph = build_str("node [ id 1 ] edge [ source 1 target 2 ] directed 1").unwrap();
        assert_eq!(graph.node_count(), 2);
        assert!(graph.is_directed());

        let options = ParserOptions {
            require_graph_block: true,
            ..Default::default()
        };
        match build_with("node [ id 1 ]", &options) {
            Err(Error::Semantic {
                kind: SemanticErrorKind::MissingGraph,
                ..
            }) => {}
            x => panic!("Unexpected result: {:?}", x),
        }
    }

    #[test]
    fn test_declarations_outside_graph_block() {
        assert_eq!(
            semantic_error("graph [ ] node [ id 1 ]"),
            (
                Declaration::Node,
                SemanticErrorKind::OutsideGraph { key: "node" }
            )
        );
        assert_eq!(
            semantic_error("edge [ source 1 target 2 ] graph [ node [ id 1 ] ]"),
            (
                Declaration::Edge,
                SemanticErrorKind::OutsideGraph { key: "edge" }
            )
        );
    }

    #[test]
    fn test_edge_before_node_declaration() {
        let graph =
            build_str(r#"graph [ edge [ source 1 target 2 ] node [ id 1 label "x" ] ]"#).unwrap();

        let one = graph.node(1).unwrap();
        assert!(!one.is_anon());
        assert_eq!(
            one.attributes().first("label").and_then(Value::as_str),
            Some("x")
        );
        assert_eq!(one.forward_edge_indices(), &[0]);

        let two = graph.node(2).unwrap();
        assert!(two.is_anon());
        assert_eq!(two.backward_edge_indices(), &[0]);
    }

    #[test]
    fn test_multiple_graphs() {
        assert_eq!(
            semantic_error("graph [ ] graph [ ]"),
            (Declaration::Graph, SemanticErrorKind::MultipleGraphs)
        );
    }

    #[test]
    fn test_not_a_block() {
        assert_eq!(
            semantic_error("graph 1"),
            (
                Declaration::Graph,
                SemanticErrorKind::NotABlock { found: "1".into() }
            )
        );
        assert_eq!(
            semantic_error(r#"graph [ node "x" ]"#),
            (
                Declaration::Node,
                SemanticErrorKind::NotABlock {
                    found: "\"x\"".into()
                }
            )
        );
    }

    #[test]
    fn test_node_id_errors() {
        assert_eq!(
            semantic_error("graph [ node [ label \"a\" ] ]"),
            (
                Declaration::Node,
                SemanticErrorKind::MissingAttribute { key: "id" }
            )
        );
        assert_eq!(
            semantic_error("graph [ node [ id 1.5 ] ]"),
            (
                Declaration::Node,
                SemanticErrorKind::NonInteger {
                    key: "id",
                    found: "1.5".into()
                }
            )
        );
        assert_eq!(
            semantic_error("graph [ node [ id \"1\" ] ]"),
            (
                Declaration::Node,
                SemanticErrorKind::NonInteger {
                    key: "id",
                    found: "\"1\"".into()
                }
            )
        );
        assert_eq!(
            semantic_error("graph [ node [ id 1 id 2 ] ]"),
            (
                Declaration::Node,
                SemanticErrorKind::DuplicateAttribute { key: "id" }
            )
        );
    }

    #[test]
    fn test_edge_endpoint_errors() {
        assert_eq!(
            semantic_error("graph [ edge [ target 1 ] ]"),
            (
                Declaration::Edge,
                SemanticErrorKind::MissingAttribute { key: "source" }
            )
        );
        assert_eq!(
            semantic_error("graph [ edge [ source 1 ] ]"),
            (
                Declaration::Edge,
                SemanticErrorKind::MissingAttribute { key: "target" }
            )
        );
        assert_eq!(
            semantic_error("graph [ edge [ source 1 target [ ] ] ]"),
            (
                Declaration::Edge,
                SemanticErrorKind::NonInteger {
                    key: "target",
                    found: "[ ]".into()
                }
            )
        );
    }

    #[test]
    fn test_duplicate_node() {
        let input = "graph [\n  node [ id 1 ]\n  node [ id 1 ]\n]";
        match build_str(input) {
            Err(Error::Semantic {
                position,
                declaration: Declaration::Node,
                kind: SemanticErrorKind::DuplicateNode { id: 1 },
            }) => assert_eq!((position.line, position.column), (3, 3)),
            x => panic!("Unexpected result: {:?}", x),
        }
    }
}
