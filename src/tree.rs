//! Huffman tree construction by greedy least-frequency merging.
//!
//! # Tie-break policy
//!
//! Every node gets an insertion sequence number: leaves are numbered
//! `0..n` in ascending symbol order, and each merged node takes the next
//! number when it is created. The two nodes removed at each step are the
//! smallest by `(frequency, sequence)`, so equal frequencies are resolved
//! first-created, first-removed. The first node removed becomes the left
//! child.
//!
//! The minimum is found with two queues instead of a heap: leaves sorted
//! by `(frequency, sequence)`, and merged nodes in creation order. Merged
//! nodes are created with non-decreasing frequency and increasing sequence
//! numbers, so that queue stays sorted by the same key and comparing the
//! two fronts yields the global minimum. A leaf always has a smaller
//! sequence number than a merged node, so it wins ties between the fronts.

use std::cmp::Ordering;
use std::collections::VecDeque;

use tracing::trace;

use crate::frequency::FrequencyTable;

/// position of a node inside the tree that created it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// node of a Huffman tree
///
/// Internal nodes always own exactly two children, referenced by id.
#[derive(Debug, Clone)]
pub enum Node<S> {
    Leaf {
        symbol: S,
        frequency: u64,
    },
    Internal {
        frequency: u64,
        left: NodeId,
        right: NodeId,
    },
}

impl<S> Node<S> {
    /// occurrence of the symbol, or the sum over the subtree
    pub fn frequency(&self) -> u64 {
        match self {
            Node::Leaf { frequency, .. } | Node::Internal { frequency, .. } => *frequency,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

/// a full binary tree whose leaves are the coded symbols
///
/// Nodes live in one flat vector and point at their children by index, so
/// a tree of any height is cloned and dropped without recursion.
#[derive(Debug, Clone)]
pub struct Tree<S> {
    nodes: Vec<Node<S>>,
    root: NodeId,
}

impl<S> Tree<S> {
    pub fn root(&self) -> &Node<S> {
        self.node(self.root)
    }

    /// look up a node of this tree
    ///
    /// # Panics
    ///
    /// if `id` came from another tree and is out of range here
    pub fn node(&self, id: NodeId) -> &Node<S> {
        &self.nodes[id.0]
    }

    /// length of the input the tree was built from
    pub fn frequency(&self) -> u64 {
        self.root().frequency()
    }

    /// number of coded symbols
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// length of the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        self.nodes_with_depth().map(|(_, depth)| depth).max().unwrap_or(0)
    }

    /// every node with its depth, in preorder
    fn nodes_with_depth(&self) -> impl Iterator<Item = (&Node<S>, usize)> + '_ {
        let mut stack = vec![(self.root(), 0)];
        std::iter::from_fn(move || {
            let (node, depth) = stack.pop()?;
            if let Node::Internal { left, right, .. } = node {
                stack.push((self.node(*right), depth + 1));
                stack.push((self.node(*left), depth + 1));
            }
            Some((node, depth))
        })
    }
}

/// trees are equal when they have the same shape, symbols and frequencies,
/// however their nodes happen to be stored
impl<S: PartialEq> PartialEq for Tree<S> {
    fn eq(&self, other: &Self) -> bool {
        if self.nodes.len() != other.nodes.len() {
            return false;
        }
        let mut pairs = vec![(self.root, other.root)];
        while let Some((mine, theirs)) = pairs.pop() {
            match (self.node(mine), other.node(theirs)) {
                (
                    Node::Leaf { symbol, frequency },
                    Node::Leaf {
                        symbol: other_symbol,
                        frequency: other_frequency,
                    },
                ) => {
                    if symbol != other_symbol || frequency != other_frequency {
                        return false;
                    }
                }
                (
                    Node::Internal {
                        frequency,
                        left,
                        right,
                    },
                    Node::Internal {
                        frequency: other_frequency,
                        left: other_left,
                        right: other_right,
                    },
                ) => {
                    if frequency != other_frequency {
                        return false;
                    }
                    pairs.push((*right, *other_right));
                    pairs.push((*left, *other_left));
                }
                _ => return false,
            }
        }
        true
    }
}

impl<S: Eq> Eq for Tree<S> {}

/// append-only node storage for assembling a tree bottom-up
pub(crate) struct NodeArena<S> {
    nodes: Vec<Node<S>>,
}

impl<S> NodeArena<S> {
    pub(crate) fn new() -> Self {
        NodeArena { nodes: Vec::new() }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        NodeArena {
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn leaf(&mut self, symbol: S, frequency: u64) -> NodeId {
        self.push(Node::Leaf { symbol, frequency })
    }

    /// the caller supplies the summed frequency so it can pick how to handle overflow
    pub(crate) fn internal(&mut self, frequency: u64, left: NodeId, right: NodeId) -> NodeId {
        self.push(Node::Internal {
            frequency,
            left,
            right,
        })
    }

    pub(crate) fn frequency(&self, id: NodeId) -> u64 {
        self.nodes[id.0].frequency()
    }

    /// every node pushed must be reachable from `root`
    pub(crate) fn finish(self, root: NodeId) -> Tree<S> {
        debug_assert!(root.0 < self.nodes.len());
        Tree {
            nodes: self.nodes,
            root,
        }
    }

    fn push(&mut self, node: Node<S>) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }
}

impl<S: Ord + Clone> Tree<S> {
    /// creates the canonical Huffman tree from a frequency table
    /// returns None at empty input
    pub fn build(frequencies: &FrequencyTable<S>) -> Option<Self> {
        if frequencies.is_empty() {
            return None;
        }

        let mut arena = NodeArena::with_capacity(2 * frequencies.len() - 1);
        let mut leaves: Vec<Pending> = frequencies
            .iter()
            .enumerate()
            .map(|(sequence, (symbol, frequency))| Pending {
                frequency,
                sequence,
                id: arena.leaf(symbol.clone(), frequency),
            })
            .collect();
        leaves.sort_unstable();

        let mut next_sequence = leaves.len();
        let mut leaves: VecDeque<Pending> = leaves.into();
        let mut merged: VecDeque<Pending> = VecDeque::new();

        loop {
            match (
                Pending::pop_rarer(&mut leaves, &mut merged),
                Pending::pop_rarer(&mut leaves, &mut merged),
            ) {
                (Some(left), Some(right)) => {
                    trace!(
                        left = left.sequence,
                        right = right.sequence,
                        sequence = next_sequence,
                        "merging nodes"
                    );
                    // counts of one in-memory input; their sum cannot pass u64::MAX
                    let frequency = left.frequency + right.frequency;
                    merged.push_back(Pending {
                        frequency,
                        sequence: next_sequence,
                        id: arena.internal(frequency, left.id, right.id),
                    });
                    next_sequence += 1;
                }
                (Some(root), None) | (None, Some(root)) => {
                    return Some(arena.finish(root.id));
                }
                (None, None) => return None,
            }
        }
    }

    /// count occurrences in the sequence and construct the Huffman tree
    pub fn from_symbols<I>(symbols: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
    {
        Self::build(&FrequencyTable::count(symbols))
    }
}

/// a subtree waiting to be merged
#[derive(Debug, Clone, Copy)]
struct Pending {
    frequency: u64,
    /// insertion sequence number, the secondary ordering key
    sequence: usize,
    id: NodeId,
}

impl Pending {
    /// pop the rarer element at the front of two queues
    fn pop_rarer(leaves: &mut VecDeque<Self>, merged: &mut VecDeque<Self>) -> Option<Self> {
        match (leaves.front(), merged.front()) {
            (Some(leaf), Some(node)) => {
                if leaf <= node {
                    leaves.pop_front()
                } else {
                    merged.pop_front()
                }
            }
            (Some(_), None) => leaves.pop_front(),
            (_, _) => merged.pop_front(),
        }
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.frequency, self.sequence).cmp(&(other.frequency, other.sequence))
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        matches!(self.cmp(other), Ordering::Equal)
    }
}

impl Eq for Pending {}
