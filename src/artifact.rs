//! Persisted codebooks.
//!
//! The table form is canonical: one `<symbol>:<code>` line per entry.
//!
//! ```text
//! a:0
//! b:11
//! c:10
//! ```
//!
//! The symbol field is escaped so that any symbol fits on one line and the
//! delimiter is always the first unescaped `:`. A backslash is written as
//! `\\`, a colon as `\:`, line feed and carriage return as `\n` and `\r`.
//! In byte mode anything outside printable ASCII becomes `\xHH`. Every
//! other symbol is written literally.
//!
//! The tree form keeps the whole merge tree, frequencies included, as a
//! preorder node list under a `huffman-tree v1` header:
//!
//! ```text
//! huffman-tree v1
//! I
//! L:3:a
//! I
//! L:1:c
//! L:2:b
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use tracing::debug;

use crate::code::{Code, CodeTable};
use crate::error::{Error, FormatFault, Result};
use crate::tree::{Node, NodeArena, NodeId, Tree};

/// header line of the tree form; it holds no ':' so it never reads as a table entry
pub const TREE_HEADER: &str = "huffman-tree v1";

/// a symbol alphabet that can be written into a codebook line
pub trait TextSymbol: Ord + Clone + Sized {
    /// append the escaped form of the symbol
    fn write_escaped(&self, out: &mut String);

    /// parse one complete escaped symbol field
    fn parse_escaped(field: &str) -> Option<Self>;
}

impl TextSymbol for char {
    fn write_escaped(&self, out: &mut String) {
        match self {
            '\\' => out.push_str("\\\\"),
            ':' => out.push_str("\\:"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(*c),
        }
    }

    fn parse_escaped(field: &str) -> Option<Self> {
        let mut chars = field.chars();
        let symbol = match chars.next()? {
            '\\' => match chars.next()? {
                '\\' => '\\',
                ':' => ':',
                'n' => '\n',
                'r' => '\r',
                _ => return None,
            },
            c => c,
        };
        match chars.next() {
            None => Some(symbol),
            Some(_) => None,
        }
    }
}

impl TextSymbol for u8 {
    fn write_escaped(&self, out: &mut String) {
        match self {
            b'\\' => out.push_str("\\\\"),
            b':' => out.push_str("\\:"),
            b' '..=b'~' => out.push(*self as char),
            _ => {
                let _ = write!(out, "\\x{:02x}", self);
            }
        }
    }

    fn parse_escaped(field: &str) -> Option<Self> {
        let bytes = field.as_bytes();
        match bytes {
            [b'\\', b'\\'] => Some(b'\\'),
            [b'\\', b':'] => Some(b':'),
            [b'\\', b'n'] => Some(b'\n'),
            [b'\\', b'r'] => Some(b'\r'),
            [b'\\', b'x', hi, lo] if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                u8::from_str_radix(&field[2..], 16).ok()
            }
            [b] if b.is_ascii() && *b != b'\\' => Some(*b),
            _ => None,
        }
    }
}

/// split a line at the first ':' that is not escaped
fn split_field(line: &str) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (index, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ':' => return Some((&line[..index], &line[index + 1..])),
            _ => (),
        }
    }
    None
}

fn parse_symbol<S: TextSymbol>(line: usize, field: &str) -> Result<S> {
    S::parse_escaped(field)
        .ok_or_else(|| Error::format(line, FormatFault::InvalidSymbol(field.to_string())))
}

/// format the code table, one `symbol:code` line per entry in symbol order
pub fn write_table<S: TextSymbol>(table: &CodeTable<S>) -> String {
    let mut out = String::new();
    for (symbol, code) in table.iter() {
        symbol.write_escaped(&mut out);
        let _ = writeln!(out, ":{}", code);
    }
    out
}

/// parse and validate a code table, failing at the first bad line
pub fn read_table<S: TextSymbol>(text: &str) -> Result<CodeTable<S>> {
    let mut codes: BTreeMap<S, Code> = BTreeMap::new();
    // line number of each code, for reporting collisions
    let mut origins: Vec<(Code, usize)> = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        let (field, code) =
            split_field(line).ok_or_else(|| Error::format(line_number, FormatFault::MissingDelimiter))?;
        let symbol: S = parse_symbol(line_number, field)?;
        let code: Code = code
            .parse()
            .map_err(|err| Error::format(line_number, FormatFault::InvalidCode(err)))?;
        if codes.contains_key(&symbol) {
            return Err(Error::format(line_number, FormatFault::DuplicateSymbol));
        }
        origins.push((code.clone(), line_number));
        codes.insert(symbol, code);
    }

    // after sorting, a code that prefixes another sits directly before some extension of it
    origins.sort();
    for pair in origins.windows(2) {
        let ((shorter, _), (longer, line)) = (&pair[0], &pair[1]);
        if shorter == longer {
            return Err(Error::format(*line, FormatFault::DuplicateCode(longer.to_string())));
        }
        if shorter.is_prefix_of(longer) {
            return Err(Error::format(
                *line,
                FormatFault::NotPrefixFree {
                    prefix: shorter.to_string(),
                    code: longer.to_string(),
                },
            ));
        }
    }

    debug!(symbols = codes.len(), "loaded code table");
    Ok(CodeTable::from_validated(codes))
}

/// format the tree as a header and its preorder node list
pub fn write_tree<S: TextSymbol>(tree: Option<&Tree<S>>) -> String {
    let mut out = String::from(TREE_HEADER);
    out.push('\n');
    let tree = match tree {
        Some(tree) => tree,
        None => return out,
    };
    let mut stack = vec![tree.root()];
    while let Some(node) = stack.pop() {
        match node {
            Node::Leaf { symbol, frequency } => {
                let _ = write!(out, "L:{}:", frequency);
                symbol.write_escaped(&mut out);
                out.push('\n');
            }
            Node::Internal { left, right, .. } => {
                out.push_str("I\n");
                stack.push(tree.node(*right));
                stack.push(tree.node(*left));
            }
        }
    }
    out
}

/// an internal node still collecting its children
struct Frame {
    line: usize,
    left: Option<NodeId>,
}

/// rebuild a tree written by [`write_tree`]; a header with no nodes is the empty tree
pub fn read_tree<S: TextSymbol>(text: &str) -> Result<Option<Tree<S>>> {
    let mut lines = text.lines().enumerate();
    match lines.next() {
        Some((_, header)) if header == TREE_HEADER => (),
        Some((_, header)) => return Err(Error::format(1, FormatFault::InvalidNode(header.to_string()))),
        None => return Err(Error::format(1, FormatFault::TruncatedTree)),
    }

    let mut arena = NodeArena::new();
    let mut seen: BTreeSet<S> = BTreeSet::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<NodeId> = None;
    let mut last_line = 1;

    for (index, line) in lines {
        let line_number = index + 1;
        last_line = line_number;
        if root.is_some() {
            return Err(Error::format(line_number, FormatFault::TrailingNodes));
        }

        let mut node = if line == "I" {
            stack.push(Frame {
                line: line_number,
                left: None,
            });
            continue;
        } else if let Some(rest) = line.strip_prefix("L:") {
            let (frequency, field) = rest.split_once(':').ok_or_else(|| {
                Error::format(line_number, FormatFault::InvalidNode(line.to_string()))
            })?;
            let frequency: u64 = frequency.parse().map_err(|_| {
                Error::format(line_number, FormatFault::InvalidFrequency(frequency.to_string()))
            })?;
            let symbol: S = parse_symbol(line_number, field)?;
            if !seen.insert(symbol.clone()) {
                return Err(Error::format(line_number, FormatFault::DuplicateSymbol));
            }
            arena.leaf(symbol, frequency)
        } else {
            return Err(Error::format(line_number, FormatFault::InvalidNode(line.to_string())));
        };

        // attach the finished node, closing every internal node it completes
        loop {
            let frame = match stack.last_mut() {
                Some(frame) => frame,
                None => {
                    root = Some(node);
                    break;
                }
            };
            let left = match frame.left.take() {
                Some(left) => left,
                None => {
                    frame.left = Some(node);
                    break;
                }
            };
            let frame_line = frame.line;
            stack.pop();
            let frequency = arena
                .frequency(left)
                .checked_add(arena.frequency(node))
                .ok_or_else(|| {
                    Error::format(frame_line, FormatFault::InvalidFrequency("overflow".to_string()))
                })?;
            node = arena.internal(frequency, left, node);
        }
    }

    if !stack.is_empty() {
        return Err(Error::format(last_line, FormatFault::TruncatedTree));
    }
    debug!(symbols = seen.len(), "loaded code tree");
    Ok(root.map(|root| arena.finish(root)))
}

/// a loaded codebook in either form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact<S: Ord> {
    Table(CodeTable<S>),
    Tree(Option<Tree<S>>),
}

/// read a codebook, choosing the form by its first line
pub fn read_artifact<S: TextSymbol>(text: &str) -> Result<Artifact<S>> {
    if text.lines().next() == Some(TREE_HEADER) {
        read_tree(text).map(Artifact::Tree)
    } else {
        read_table(text).map(Artifact::Table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Bits;
    use crate::decode::decode_with_tree;

    fn table_for(input: &str) -> CodeTable<char> {
        CodeTable::from_tree(&Tree::from_symbols(input.chars()).unwrap())
    }

    fn format_fault<T: std::fmt::Debug>(result: Result<T>) -> (usize, FormatFault) {
        match result.unwrap_err() {
            Error::Format { line, fault } => (line, fault),
            other => panic!("expected a format error, got {:?}", other),
        }
    }

    #[test]
    fn writes_plain_lines_in_symbol_order() {
        assert_eq!(write_table(&table_for("aaabbc")), "a:0\nb:11\nc:10\n");
    }

    #[test]
    fn table_survives_a_round_trip() {
        let table = table_for("a\\b:c\nd\r\n::");
        let text = write_table(&table);
        assert_eq!(read_table::<char>(&text).unwrap(), table);
    }

    #[test]
    fn line_order_is_insignificant() {
        let table: CodeTable<char> = read_table("c:10\na:0\nb:11").unwrap();
        assert_eq!(table, table_for("aaabbc"));
    }

    #[test]
    fn empty_text_is_empty_table() {
        assert!(read_table::<char>("").unwrap().is_empty());
    }

    #[test]
    fn escaped_colon_is_not_the_delimiter() {
        let table: CodeTable<char> = read_table("\\::0\n\\\\:1\n").unwrap();
        assert_eq!(table.get(&':').map(Code::to_string), Some("0".to_string()));
        assert_eq!(table.get(&'\\').map(Code::to_string), Some("1".to_string()));
    }

    #[test]
    fn rejects_missing_delimiter() {
        let (line, fault) = format_fault(read_table::<char>("a:0\nb11\n"));
        assert_eq!(line, 2);
        assert_eq!(fault, FormatFault::MissingDelimiter);
    }

    #[test]
    fn rejects_empty_and_non_binary_codes() {
        use crate::error::ParseCodeError;
        let (_, fault) = format_fault(read_table::<char>("a:\n"));
        assert_eq!(fault, FormatFault::InvalidCode(ParseCodeError::Empty));
        let (_, fault) = format_fault(read_table::<char>("a:0 \n"));
        assert_eq!(fault, FormatFault::InvalidCode(ParseCodeError::NonBinary));
    }

    #[test]
    fn rejects_bad_symbol_fields() {
        let (_, fault) = format_fault(read_table::<char>(":0\n"));
        assert_eq!(fault, FormatFault::InvalidSymbol(String::new()));
        let (_, fault) = format_fault(read_table::<char>("ab:0\n"));
        assert_eq!(fault, FormatFault::InvalidSymbol("ab".to_string()));
    }

    #[test]
    fn rejects_duplicates() {
        let (line, fault) = format_fault(read_table::<char>("a:0\na:1\n"));
        assert_eq!((line, fault), (2, FormatFault::DuplicateSymbol));
        let (_, fault) = format_fault(read_table::<char>("a:01\nb:01\n"));
        assert_eq!(fault, FormatFault::DuplicateCode("01".to_string()));
    }

    #[test]
    fn rejects_tables_that_are_not_prefix_free() {
        let (line, fault) = format_fault(read_table::<char>("a:1\nb:00\nc:10\n"));
        assert_eq!(line, 3);
        assert_eq!(
            fault,
            FormatFault::NotPrefixFree {
                prefix: "1".to_string(),
                code: "10".to_string()
            }
        );
    }

    #[test]
    fn byte_symbols_escape_non_printable_values() {
        let mut out = String::new();
        for byte in [b'a', b':', 0u8, 0xff, b'\n'].iter() {
            byte.write_escaped(&mut out);
            out.push(' ');
        }
        assert_eq!(out, "a \\: \\x00 \\xff \\x0a ");
        assert_eq!(u8::parse_escaped("\\xff"), Some(0xff));
        assert_eq!(u8::parse_escaped("\\n"), Some(b'\n'));
        assert_eq!(u8::parse_escaped("\\xzz"), None);
        assert_eq!(u8::parse_escaped("ab"), None);
    }

    #[test]
    fn tree_form_matches_documented_layout() {
        let tree = Tree::from_symbols("aaabbc".chars()).unwrap();
        assert_eq!(
            write_tree(Some(&tree)),
            "huffman-tree v1\nI\nL:3:a\nI\nL:1:c\nL:2:b\n"
        );
    }

    #[test]
    fn tree_survives_a_round_trip() {
        let tree = Tree::from_symbols("she sells sea shells: \\o/\n".chars()).unwrap();
        let loaded: Option<Tree<char>> = read_tree(&write_tree(Some(&tree))).unwrap();
        assert_eq!(loaded, Some(tree));
    }

    #[test]
    fn empty_and_lone_leaf_trees_round_trip() {
        assert_eq!(read_tree::<char>(&write_tree::<char>(None)).unwrap(), None);
        let lone = Tree::from_symbols("zz".chars()).unwrap();
        assert_eq!(read_tree(&write_tree(Some(&lone))).unwrap(), Some(lone));
    }

    #[test]
    fn rejects_incomplete_and_overlong_trees() {
        let (line, fault) = format_fault(read_tree::<char>("huffman-tree v1\nI\nL:1:a\n"));
        assert_eq!((line, fault), (3, FormatFault::TruncatedTree));
        let (line, fault) = format_fault(read_tree::<char>("huffman-tree v1\nL:1:a\nL:1:b\n"));
        assert_eq!((line, fault), (3, FormatFault::TrailingNodes));
        let (_, fault) = format_fault(read_tree::<char>("huffman-tree v1\nX\n"));
        assert_eq!(fault, FormatFault::InvalidNode("X".to_string()));
        let (_, fault) = format_fault(read_tree::<char>("huffman-tree v1\nL:many:a\n"));
        assert_eq!(fault, FormatFault::InvalidFrequency("many".to_string()));
    }

    #[test]
    fn rejects_trees_with_a_repeated_symbol() {
        let (line, fault) = format_fault(read_tree::<char>("huffman-tree v1\nI\nL:1:a\nL:1:a\n"));
        assert_eq!((line, fault), (4, FormatFault::DuplicateSymbol));
        let (line, fault) =
            format_fault(read_tree::<u8>("huffman-tree v1\nI\nL:1:\\x00\nI\nL:1:b\nL:1:\\x00\n"));
        assert_eq!((line, fault), (6, FormatFault::DuplicateSymbol));
    }

    #[test]
    fn rejects_frequency_sums_that_overflow() {
        let text = format!("huffman-tree v1\nI\nL:{}:a\nL:1:b\n", u64::MAX);
        let (line, fault) = format_fault(read_tree::<char>(&text));
        assert_eq!((line, fault), (2, FormatFault::InvalidFrequency("overflow".to_string())));
    }

    #[test]
    fn loads_and_drops_a_deeply_skewed_tree() {
        let height = 200_000;
        let mut text = String::from(TREE_HEADER);
        text.push('\n');
        text.push_str(&"I\n".repeat(height));
        for symbol in (0x4e00u32..).filter_map(std::char::from_u32).take(height + 1) {
            text.push_str("L:1:");
            symbol.write_escaped(&mut text);
            text.push('\n');
        }

        let tree = read_tree::<char>(&text).unwrap().unwrap();
        assert_eq!(tree.depth(), height);
        assert_eq!(tree.leaf_count(), height + 1);
        assert_eq!(tree.frequency(), height as u64 + 1);
        assert!(write_tree(Some(&tree)) == text);

        let leftmost: Bits = std::iter::repeat(false).take(height).collect();
        assert_eq!(decode_with_tree(&leftmost, Some(&tree)).unwrap(), vec!['\u{4e00}']);
        drop(tree);
    }

    #[test]
    fn detects_artifact_form() {
        let tree = Tree::from_symbols("abb".chars()).unwrap();
        let table = CodeTable::from_tree(&tree);
        assert_eq!(
            read_artifact::<char>(&write_tree(Some(&tree))).unwrap(),
            Artifact::Tree(Some(tree))
        );
        assert_eq!(
            read_artifact::<char>(&write_table(&table)).unwrap(),
            Artifact::Table(table)
        );
    }
}
