/*!
A parser for the [Graph Modelling Language (GML)](https://web.archive.org/web/20190303094704/http://www.fim.uni-passau.de:80/fileadmin/files/lehrstuhl/brandenburg/projekte/gml/gml-technical-report.pdf) format.

Example graph:

```gml
graph [
  directed 1
  node [
    id 0
    label "Node 0"
  ]
  node [
    id 1
    label "Node 1"
  ]
  edge [
    source 0
    target 0
  ]
  edge [
    source 1
    target 2
  ]
]
```

Parsing happens in three stages: the [`token`] module splits the text into tokens, the [`parser`]
module builds a generic tree of key-value items, and the graph builder turns that tree into a
[`Graph`]. Edges may reference node ids that were never declared (node `2` above); those nodes
are added to the graph as anonymous nodes.
*/

mod builder;
pub mod error;
pub mod gml;
pub mod options;
pub mod parser;
pub mod token;

use std::path::Path;

use log::*;

pub use error::Error;
pub use gml::{Attributes, Edge, Graph, Node, Value};
pub use options::ParserOptions;

/// A GML parser for one input buffer. Parsing doesn't modify the parser, so [`Parser::parse`] may
/// be called any number of times, each call producing an independent [`Graph`].
#[derive(Debug, Clone)]
pub struct Parser<'a> {
    input: &'a str,
    options: ParserOptions,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_options(input, ParserOptions::default())
    }

    pub fn with_options(input: &'a str, options: ParserOptions) -> Self {
        Self { input, options }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse the input into a graph. The returned graph borrows strings from the input where it
    /// can; use [`Graph::upgrade_to_owned`] to detach it.
    pub fn parse(&self) -> Result<Graph<'a>, Error> {
        let start = std::time::Instant::now();

        let tokens = token::tokenize(self.input)?;
        let items = parser::parse_tokens(self.input, tokens, self.options.max_depth)?;
        let graph = builder::build(self.input, items, &self.options)?;

        debug!(
            "Finished parsing GML graph: {:?}, {} nodes, {} edges",
            start.elapsed(),
            graph.node_count(),
            graph.edges().len(),
        );

        Ok(graph)
    }
}

/// Parse the graph string into a [`Graph`] object. If the graph contains errors, the first one is
/// returned.
/// ```
/// let graph = r#"
/// graph [
///   node [
///     id 0
///   ]
///   edge [
///     source 0
///     target 1
///   ]
/// ]"#;
/// let graph = match gml_graph::parse(graph) {
///     Ok(g) => g,
///     Err(e) => panic!("Could not parse graph: {}", e),
/// };
/// assert_eq!(graph.node_count(), 2);
/// assert!(graph.node(1).unwrap().is_anon());
/// ```
pub fn parse(gml_str: &str) -> Result<Graph<'_>, Error> {
    Parser::new(gml_str).parse()
}

/// Read a GML file and parse it with the default options.
pub fn load(path: impl AsRef<Path>) -> Result<Graph<'static>, Error> {
    load_with_options(path, ParserOptions::default())
}

/// Read a GML file and parse it. The whole file is read into memory before parsing.
pub fn load_with_options(
    path: impl AsRef<Path>,
    options: ParserOptions,
) -> Result<Graph<'static>, Error> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Loaded {} bytes of GML from '{}'", text.len(), path.display());

    let graph = Parser::with_options(&text, options).parse()?;
    Ok(graph.upgrade_to_owned())
}
