//! Bitstream back to symbols.
//!
//! Two strategies that agree on every well-formed stream: walking the tree
//! one bit at a time, and matching an accumulating buffer against the code
//! table. Both treat a codebook with a single symbol specially: every bit
//! stands for one more copy of that symbol.

use std::collections::HashMap;

use tracing::debug;

use crate::code::{BitStr, Code, CodeTable};
use crate::error::{Error, Result, StreamFault};
use crate::tree::{Node, Tree};

/// decode by walking from the root, emitting a symbol at every leaf
pub fn decode_with_tree<S: Clone>(bits: &BitStr, tree: Option<&Tree<S>>) -> Result<Vec<S>> {
    let tree = match tree {
        Some(tree) => tree,
        None if bits.is_empty() => return Ok(Vec::new()),
        None => return Err(Error::stream(0, StreamFault::MissingCodebook(bits.len()))),
    };

    let root = tree.root();
    if let Node::Leaf { symbol, .. } = root {
        return Ok(vec![symbol.clone(); bits.len()]);
    }

    let mut out = Vec::new();
    let mut cursor = root;
    // where the code currently being walked started
    let mut code_start = 0;
    for (offset, bit) in bits.iter().by_vals().enumerate() {
        cursor = match cursor {
            Node::Internal { left, right, .. } => tree.node(if bit { *right } else { *left }),
            // the cursor is reset at every leaf, so it only ever rests on internal nodes
            Node::Leaf { .. } => return Err(Error::stream(offset, StreamFault::UnmatchedCode)),
        };
        if let Node::Leaf { symbol, .. } = cursor {
            out.push(symbol.clone());
            cursor = root;
            code_start = offset + 1;
        }
    }

    if code_start != bits.len() {
        return Err(Error::stream(code_start, StreamFault::Truncated));
    }
    debug!(bits = bits.len(), symbols = out.len(), "decoded by tree walk");
    Ok(out)
}

/// decode by growing a buffer bit by bit until it equals one of the codes
pub fn decode_with_table<S: Ord + Clone>(bits: &BitStr, table: &CodeTable<S>) -> Result<Vec<S>> {
    if table.is_empty() {
        if bits.is_empty() {
            return Ok(Vec::new());
        }
        return Err(Error::stream(0, StreamFault::MissingCodebook(bits.len())));
    }

    if table.len() == 1 {
        let (symbol, _) = table
            .iter()
            .next()
            .ok_or_else(|| Error::stream(0, StreamFault::UnmatchedCode))?;
        return Ok(vec![symbol.clone(); bits.len()]);
    }

    let lookup: HashMap<&Code, &S> = table.iter().map(|(symbol, code)| (code, symbol)).collect();
    let longest = table.max_code_len();

    let mut out = Vec::new();
    let mut buffer = Code::new();
    let mut code_start = 0;
    for (offset, bit) in bits.iter().by_vals().enumerate() {
        buffer.push(bit);
        if let Some(&symbol) = lookup.get(&buffer) {
            out.push(symbol.clone());
            buffer.clear();
            code_start = offset + 1;
        } else if buffer.len() >= longest {
            return Err(Error::stream(code_start, StreamFault::UnmatchedCode));
        }
    }

    if !buffer.is_empty() {
        return Err(Error::stream(code_start, StreamFault::Truncated));
    }
    debug!(bits = bits.len(), symbols = out.len(), "decoded by prefix match");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Bits;
    use crate::encode::encode;

    fn bits(s: &str) -> Bits {
        s.bytes().map(|b| b == b'1').collect()
    }

    fn tree_for(input: &str) -> Tree<char> {
        Tree::from_symbols(input.chars()).unwrap()
    }

    #[test]
    fn both_strategies_round_trip_aaabbc() {
        let tree = tree_for("aaabbc");
        let table = CodeTable::from_tree(&tree);
        let encoded = encode("aaabbc".chars(), &table).unwrap();

        let walked: String = decode_with_tree(&encoded, Some(&tree)).unwrap().into_iter().collect();
        let matched: String = decode_with_table(&encoded, &table).unwrap().into_iter().collect();
        assert_eq!(walked, "aaabbc");
        assert_eq!(matched, "aaabbc");
    }

    #[test]
    fn lone_leaf_repeats_symbol_per_bit() {
        let tree = tree_for("k");
        let table = CodeTable::from_tree(&tree);
        // the bit value carries no information for a single symbol
        assert_eq!(decode_with_tree(&bits("0101"), Some(&tree)).unwrap(), vec!['k'; 4]);
        assert_eq!(decode_with_table(&bits("0101"), &table).unwrap(), vec!['k'; 4]);
    }

    #[test]
    fn empty_stream_without_codebook_is_empty() {
        assert_eq!(decode_with_tree::<char>(&bits(""), None).unwrap(), Vec::<char>::new());
        assert_eq!(
            decode_with_table(&bits(""), &CodeTable::<char>::empty()).unwrap(),
            Vec::<char>::new()
        );
    }

    #[test]
    fn bits_without_codebook_are_corrupt() {
        let err = decode_with_tree::<char>(&bits("01"), None).unwrap_err();
        assert!(matches!(
            err,
            Error::CorruptStream {
                offset: 0,
                fault: StreamFault::MissingCodebook(2)
            }
        ));
    }

    #[test]
    fn stream_ending_mid_code_is_truncated() {
        let tree = tree_for("aaabbc");
        let table = CodeTable::from_tree(&tree);
        // "0" is a, then "1" starts c or b and never finishes
        for result in vec![
            decode_with_tree(&bits("01"), Some(&tree)),
            decode_with_table(&bits("01"), &table),
        ] {
            assert!(matches!(
                result.unwrap_err(),
                Error::CorruptStream {
                    offset: 1,
                    fault: StreamFault::Truncated
                }
            ));
        }
    }

    #[test]
    fn buffer_longer_than_any_code_is_unmatched() {
        use std::collections::BTreeMap;
        // an incomplete table: "11" has no symbol
        let mut codes = BTreeMap::new();
        codes.insert('a', "0".parse().unwrap());
        codes.insert('b', "10".parse().unwrap());
        let table = CodeTable::from_validated(codes);
        let err = decode_with_table(&bits("0110"), &table).unwrap_err();
        assert!(matches!(
            err,
            Error::CorruptStream {
                offset: 1,
                fault: StreamFault::UnmatchedCode
            }
        ));
    }
}
