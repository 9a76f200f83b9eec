use alloy_primitives::{Address, U256};

use crate::abi::{self, AbiParam};
use crate::error::EthError;

/// Canonical signature of `transfer(address,uint256)`.
pub const TRANSFER_SIGNATURE: &str = "transfer(address,uint256)";

const BALANCE_OF_SIGNATURE: &str = "balanceOf(address)";
const NAME_SIGNATURE: &str = "name()";
const SYMBOL_SIGNATURE: &str = "symbol()";

/// Calldata for `transfer(address,uint256)`: selector plus two padded words,
/// exactly 68 bytes.
pub fn transfer_calldata(to: Address, amount: U256) -> Result<Vec<u8>, EthError> {
    abi::encode_call(
        abi::selector(TRANSFER_SIGNATURE),
        &[AbiParam::Address(to), AbiParam::Uint256(amount)],
    )
}

/// Calldata for `balanceOf(address)`: selector plus one padded word, 36 bytes.
pub fn balance_of_calldata(owner: Address) -> Result<Vec<u8>, EthError> {
    abi::encode_call(
        abi::selector(BALANCE_OF_SIGNATURE),
        &[AbiParam::Address(owner)],
    )
}

/// Calldata for `name()`.
pub fn name_calldata() -> Result<Vec<u8>, EthError> {
    abi::encode_call(abi::selector(NAME_SIGNATURE), &[])
}

/// Calldata for `symbol()`.
pub fn symbol_calldata() -> Result<Vec<u8>, EthError> {
    abi::encode_call(abi::selector(SYMBOL_SIGNATURE), &[])
}

/// Decodes the uint256 returned by `balanceOf`.
pub fn decode_balance(ret: &[u8]) -> Result<U256, EthError> {
    abi::decode_uint256(ret)
}

/// Decodes the string returned by `name()` / `symbol()`.
pub fn decode_string_return(ret: &[u8]) -> Result<String, EthError> {
    abi::decode_string(ret)
}
