//! Prefix codes and the code table derived from a tree.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use bitvec::prelude::*;

use crate::error::ParseCodeError;
use crate::frequency::FrequencyTable;
use crate::tree::{Node, Tree};

/// bit storage shared by codes and encoded payloads, most significant bit first
pub type Bits = BitVec<u8, Msb0>;

/// borrowed view into [`Bits`]
pub type BitStr = BitSlice<u8, Msb0>;

/// path from the root to a leaf; `0` is left, `1` is right
#[derive(Clone, Default)]
pub struct Code(Bits);

impl Code {
    pub fn new() -> Self {
        Code(Bits::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, bit: bool) {
        self.0.push(bit);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn as_bits(&self) -> &BitStr {
        self.0.as_bitslice()
    }

    /// whether `self` is a prefix of `other`
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.0.starts_with(self.as_bits())
    }

    fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().by_vals()
    }
}

impl PartialEq for Code {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.bits().eq(other.bits())
    }
}

impl Eq for Code {}

impl Hash for Code {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for bit in self.bits() {
            bit.hash(state);
        }
    }
}

/// lexicographic on the bits, so a prefix sorts directly before its extensions
impl Ord for Code {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bits().cmp(other.bits())
    }
}

impl PartialOrd for Code {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for bit in self.bits() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Code({})", self)
    }
}

impl FromStr for Code {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseCodeError::Empty);
        }
        let mut code = Code::new();
        for byte in s.bytes() {
            match byte {
                b'0' => code.push(false),
                b'1' => code.push(true),
                _ => return Err(ParseCodeError::NonBinary),
            }
        }
        Ok(code)
    }
}

impl std::iter::FromIterator<bool> for Code {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Code(iter.into_iter().collect())
    }
}

/// maps every symbol to its code
///
/// Codes produced by [`CodeTable::from_tree`] are prefix-free. Tables loaded
/// from an artifact are checked for the same property before they are handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable<S: Ord> {
    codes: BTreeMap<S, Code>,
}

impl<S: Ord + Clone> CodeTable<S> {
    /// walk the tree depth-first, appending 0 on the left and 1 on the right
    pub fn from_tree(tree: &Tree<S>) -> Self {
        let mut codes = BTreeMap::new();

        // a lone leaf has no path; give it a single bit so it still takes space in the stream
        if let Node::Leaf { symbol, .. } = tree.root() {
            codes.insert(symbol.clone(), std::iter::once(false).collect());
            return CodeTable { codes };
        }

        let mut work: Vec<(&Node<S>, Code)> = vec![(tree.root(), Code::new())];
        while let Some((node, path)) = work.pop() {
            match node {
                Node::Leaf { symbol, .. } => {
                    codes.insert(symbol.clone(), path);
                }
                Node::Internal { left, right, .. } => {
                    let mut right_path = path.clone();
                    right_path.push(true);
                    work.push((tree.node(*right), right_path));

                    let mut left_path = path;
                    left_path.push(false);
                    work.push((tree.node(*left), left_path));
                }
            }
        }
        CodeTable { codes }
    }
}

impl<S: Ord> CodeTable<S> {
    /// table with no symbols, for empty input
    pub fn empty() -> Self {
        CodeTable {
            codes: BTreeMap::new(),
        }
    }

    /// caller guarantees the codes are unique and prefix-free
    pub(crate) fn from_validated(codes: BTreeMap<S, Code>) -> Self {
        CodeTable { codes }
    }

    pub fn get(&self, symbol: &S) -> Option<&Code> {
        self.codes.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// entries in ascending symbol order
    pub fn iter(&self) -> impl Iterator<Item = (&S, &Code)> + '_ {
        self.codes.iter()
    }

    pub fn max_code_len(&self) -> usize {
        self.codes.values().map(Code::len).max().unwrap_or(0)
    }

    /// number of bits needed to encode the input `frequencies` were counted from
    ///
    /// Symbols missing from the table are ignored.
    pub fn encoded_len(&self, frequencies: &FrequencyTable<S>) -> u64 {
        frequencies
            .iter()
            .filter_map(|(symbol, count)| self.get(symbol).map(|code| code.len() as u64 * count))
            .sum()
    }
}
