//! # Huffman coding
//!
//! Builds an optimal prefix-free code for an alphabet weighted by observed
//! frequency, and uses it to turn a symbol sequence into a bitstream and back.
//!
//! ```text
//! symbols -> FrequencyTable -> Tree -> CodeTable -> encode -> Bits
//!                                          |
//!                                          +-> artifact::write_table
//!
//! artifact::read_artifact -> decode_with_table / decode_with_tree -> symbols
//! ```
//!
//! Tree construction is deterministic: ties between equal frequencies are
//! broken by insertion order (see [`tree`]), so the same input always yields
//! the same codes on every run.
//!
//! ```
//! use huffman_codec::{artifact, Codebook};
//!
//! let codebook = Codebook::from_symbols("aaabbc".chars());
//! let bits = codebook.encode("aaabbc".chars())?;
//! assert_eq!(huffman_codec::wire::to_text(&bits), "000111110");
//!
//! let table = artifact::read_table::<char>(&artifact::write_table(codebook.table()))?;
//! let decoded: String = huffman_codec::decode_with_table(&bits, &table)?.into_iter().collect();
//! assert_eq!(decoded, "aaabbc");
//! # Ok::<(), huffman_codec::Error>(())
//! ```

#![warn(clippy::all)]

pub mod artifact;
pub mod code;
pub mod codec;
pub mod decode;
pub mod encode;
pub mod error;
pub mod frequency;
pub mod tree;
pub mod wire;

pub use artifact::{Artifact, TextSymbol};
pub use code::{BitStr, Bits, Code, CodeTable};
pub use codec::Codebook;
pub use decode::{decode_with_table, decode_with_tree};
pub use encode::{encode, encode_into};
pub use error::{Error, FormatFault, ParseCodeError, Result, StreamFault};
pub use frequency::FrequencyTable;
pub use tree::{Node, NodeId, Tree};
pub use wire::WireFormat;
