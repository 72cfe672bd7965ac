//! One-input convenience: count, build, derive and code with a single value.

use tracing::{debug, warn};

use crate::code::{BitStr, Bits, CodeTable};
use crate::decode::{decode_with_table, decode_with_tree};
use crate::encode::encode;
use crate::error::Result;
use crate::frequency::FrequencyTable;
use crate::tree::Tree;

/// the tree and code table built from one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codebook<S: Ord> {
    tree: Option<Tree<S>>,
    table: CodeTable<S>,
}

impl<S: Ord + Clone> Codebook<S> {
    pub fn from_frequencies(frequencies: &FrequencyTable<S>) -> Self {
        if frequencies.is_empty() {
            warn!("empty input, codebook has no symbols");
            return Codebook {
                tree: None,
                table: CodeTable::empty(),
            };
        }
        let tree = Tree::build(frequencies);
        let table = tree.as_ref().map(CodeTable::from_tree).unwrap_or_else(CodeTable::empty);
        debug!(
            symbols = frequencies.total(),
            distinct = table.len(),
            longest = table.max_code_len(),
            bits = table.encoded_len(frequencies),
            "built codebook"
        );
        Codebook { tree, table }
    }

    pub fn from_symbols<I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        Self::from_frequencies(&FrequencyTable::count(symbols))
    }

    /// `None` for empty input
    pub fn tree(&self) -> Option<&Tree<S>> {
        self.tree.as_ref()
    }

    pub fn table(&self) -> &CodeTable<S> {
        &self.table
    }

    pub fn encode<I>(&self, symbols: I) -> Result<Bits>
    where
        I: IntoIterator<Item = S>,
    {
        encode(symbols, &self.table)
    }

    /// decode with the tree; [`decode_with_table`] gives the same result
    pub fn decode(&self, bits: &BitStr) -> Result<Vec<S>> {
        decode_with_tree(bits, self.tree())
    }

    pub fn decode_with_table(&self, bits: &BitStr) -> Result<Vec<S>> {
        decode_with_table(bits, &self.table)
    }
}
