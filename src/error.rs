//! Error types for the coding engine.

use thiserror::Error;

/// Error variants for frequency analysis, coding and artifact loading.
#[derive(Debug, Error)]
pub enum Error {
    /// The encoder was given a symbol that has no entry in the code table.
    #[error("symbol at position {position} has no code in the table")]
    UnknownSymbol {
        /// zero-based index of the first offending symbol
        position: usize,
    },

    /// The bitstream cannot be decoded with the given codebook.
    #[error("corrupt stream at bit {offset}: {fault}")]
    CorruptStream {
        /// zero-based bit (or byte, for wire-level faults) offset where decoding stopped
        offset: usize,
        fault: StreamFault,
    },

    /// A persisted codec artifact could not be parsed.
    #[error("malformed codebook at line {line}: {fault}")]
    Format {
        /// one-based line number
        line: usize,
        fault: FormatFault,
    },

    /// An I/O error occurred while reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// what went wrong inside an encoded payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamFault {
    /// something other than '0' or '1' in a textual payload
    #[error("byte {0:#04x} is not a binary digit")]
    NonBinaryDigit(u8),

    /// input ended in the middle of a code
    #[error("stream ends in the middle of a code")]
    Truncated,

    /// the bits read so far are not a prefix of any code
    #[error("bits do not match any code")]
    UnmatchedCode,

    /// there are bits to decode but the codebook is empty
    #[error("no codebook to decode {0} bits with")]
    MissingCodebook(usize),

    /// packed payload does not start with the expected magic and version
    #[error("packed payload has an invalid header")]
    BadHeader,

    /// packed payload length disagrees with its declared bit length
    #[error("packed payload declares {declared} bits but carries {actual} bytes")]
    LengthMismatch { declared: u64, actual: usize },
}

/// what went wrong inside a codebook line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatFault {
    /// no unescaped ':' between symbol and code
    #[error("missing ':' delimiter")]
    MissingDelimiter,

    /// the symbol field is empty, holds more than one symbol or a bad escape
    #[error("invalid symbol field {0:?}")]
    InvalidSymbol(String),

    /// the code field does not parse
    #[error("invalid code: {0}")]
    InvalidCode(ParseCodeError),

    /// the same symbol was defined twice
    #[error("symbol is defined more than once")]
    DuplicateSymbol,

    /// two symbols share one code
    #[error("code {0} is assigned to more than one symbol")]
    DuplicateCode(String),

    /// a code is a prefix of another
    #[error("code {prefix} is a prefix of {code}")]
    NotPrefixFree { prefix: String, code: String },

    /// a tree artifact line is neither an internal nor a leaf node
    #[error("unrecognised tree node {0:?}")]
    InvalidNode(String),

    /// the frequency of a tree leaf does not parse, or a sum overflows
    #[error("invalid frequency {0:?}")]
    InvalidFrequency(String),

    /// the tree artifact ends before every internal node has two children
    #[error("tree ends before it is complete")]
    TruncatedTree,

    /// nodes follow a complete tree
    #[error("unexpected node after the tree is complete")]
    TrailingNodes,
}

/// reasons a textual code fails to parse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCodeError {
    #[error("code is empty")]
    Empty,
    #[error("code contains something other than 0s and 1s")]
    NonBinary,
}

impl Error {
    pub(crate) fn stream(offset: usize, fault: StreamFault) -> Self {
        Error::CorruptStream { offset, fault }
    }

    pub(crate) fn format(line: usize, fault: FormatFault) -> Self {
        Error::Format { line, fault }
    }
}

/// A specialized Result type for coding operations.
pub type Result<T> = std::result::Result<T, Error>;
