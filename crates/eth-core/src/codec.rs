use alloy_rlp::Decodable;

use crate::error::EthError;
use crate::transaction::SignedTx;

/// Encodes a signed transaction as the canonical RLP list
/// `[nonce, gasPrice, gasLimit, to, value, data, v, r, s]`.
pub fn encode(tx: &SignedTx) -> Vec<u8> {
    alloy_rlp::encode(tx)
}

/// Decodes a canonical encoding back into a signed transaction.
///
/// Strict inverse of [`encode`]: wrong list arity, truncated input,
/// non-canonical length prefixes, and trailing bytes are all rejected.
/// `decode(encode(tx)) == tx` holds for every valid transaction.
pub fn decode(bytes: &[u8]) -> Result<SignedTx, EthError> {
    let mut buf = bytes;
    let tx = SignedTx::decode(&mut buf)
        .map_err(|e| EthError::MalformedEncoding(e.to_string()))?;

    if !buf.is_empty() {
        return Err(EthError::MalformedEncoding(format!(
            "{} trailing bytes after transaction",
            buf.len()
        )));
    }

    Ok(tx)
}
