/*!
Options that control how strictly a GML document is interpreted.
*/

use serde::{Deserialize, Serialize};

/// Parser settings. Can be embedded in a larger serde configuration; unset fields take their
/// default values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
pub struct ParserOptions {
    /// Maximum number of nested `[ ... ]` blocks. Deeper input is rejected with a syntax error
    /// instead of recursing further.
    pub max_depth: usize,
    /// Reject documents whose outermost level has no `graph [ ... ]` block. When unset, such
    /// documents are read as if the outermost level were the graph body.
    pub require_graph_block: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: 256,
            require_graph_block: false,
        }
    }
}
