//! Symbol sequence to bitstream.

use tracing::debug;

use crate::code::{Bits, CodeTable};
use crate::error::{Error, Result};

/// concatenate the code of each symbol, in input order
pub fn encode<S, I>(symbols: I, table: &CodeTable<S>) -> Result<Bits>
where
    S: Ord,
    I: IntoIterator<Item = S>,
{
    let mut bits = Bits::new();
    let count = encode_into(symbols, table, &mut bits)?;
    debug!(symbols = count, bits = bits.len(), "encoded sequence");
    Ok(bits)
}

/// append the codes of `symbols` to `out`, returning how many symbols were written
///
/// The table is read-only, so a long input can be fed through in chunks.
/// On error `out` is left with the codes of the symbols before the offending one,
/// and the reported position is relative to this call.
pub fn encode_into<S, I>(symbols: I, table: &CodeTable<S>, out: &mut Bits) -> Result<usize>
where
    S: Ord,
    I: IntoIterator<Item = S>,
{
    let mut written = 0;
    for (position, symbol) in symbols.into_iter().enumerate() {
        let code = table
            .get(&symbol)
            .ok_or(Error::UnknownSymbol { position })?;
        out.extend_from_bitslice(code.as_bits());
        written += 1;
    }
    Ok(written)
}
