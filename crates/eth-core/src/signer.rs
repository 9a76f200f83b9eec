use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_rlp::RlpEncodable;
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

use crate::address::address_from_pubkey;
use crate::error::EthError;
use crate::key::KeyMaterial;
use crate::transaction::{SignedTx, UnsignedTx};

/// EIP-155 signing payload: the six transaction fields followed by the chain
/// id and two zero placeholders.
#[derive(RlpEncodable)]
struct SigningPayload {
    nonce: u64,
    gas_price: U256,
    gas_limit: u64,
    to: Address,
    value: U256,
    data: Bytes,
    chain_id: u64,
    r: u64,
    s: u64,
}

/// The replay-protected digest a signature commits to.
///
/// Keccak-256 of `rlp([nonce, gasPrice, gasLimit, to, value, data,
/// chainId, 0, 0])`.
pub fn sighash(tx: &UnsignedTx, chain_id: u64) -> B256 {
    let payload = SigningPayload {
        nonce: tx.nonce,
        gas_price: tx.gas_price,
        gas_limit: tx.gas_limit,
        to: tx.to,
        value: tx.value,
        data: tx.data.clone(),
        chain_id,
        r: 0,
        s: 0,
    };

    let encoded = alloy_rlp::encode(&payload);
    B256::from_slice(&Keccak256::digest(&encoded))
}

/// Signs a transaction for the given chain.
///
/// Deterministic ECDSA over secp256k1 (RFC 6979 nonce), low-s normalized;
/// `v` encodes the recovery parity folded with the chain id so the signature
/// is only valid on that chain.
pub fn sign(tx: &UnsignedTx, key: &KeyMaterial, chain_id: u64) -> Result<SignedTx, EthError> {
    let digest = sighash(tx, chain_id);

    let (signature, recovery_id): (Signature, RecoveryId) = key
        .signing_key()
        .sign_prehash(digest.as_slice())
        .map_err(|e| EthError::SigningFailed(e.to_string()))?;

    let v = recovery_id.is_y_odd() as u64 + chain_id * 2 + 35;

    Ok(SignedTx {
        nonce: tx.nonce,
        gas_price: tx.gas_price,
        gas_limit: tx.gas_limit,
        to: tx.to,
        value: tx.value,
        data: tx.data.clone(),
        v,
        r: U256::from_be_slice(&signature.r().to_bytes()),
        s: U256::from_be_slice(&signature.s().to_bytes()),
    })
}

/// Recovers the sender address of a signed transaction.
///
/// Fails when `v` does not encode `chain_id` — a signature produced for one
/// chain never recovers under another — or when `(r, s)` is not a valid
/// signature over the transaction digest.
pub fn recover_sender(tx: &SignedTx, chain_id: u64) -> Result<Address, EthError> {
    let parity = tx
        .v
        .checked_sub(chain_id * 2 + 35)
        .filter(|p| *p <= 1)
        .ok_or_else(|| {
            EthError::SigningFailed(format!(
                "v={} does not encode chain id {chain_id}",
                tx.v
            ))
        })?;

    let signature = Signature::from_scalars(
        tx.r.to_be_bytes::<32>(),
        tx.s.to_be_bytes::<32>(),
    )
    .map_err(|e| EthError::SigningFailed(format!("invalid signature scalars: {e}")))?;

    let recovery_id = RecoveryId::from_byte(parity as u8)
        .ok_or_else(|| EthError::SigningFailed("invalid recovery id".into()))?;

    let digest = sighash(&tx.unsigned(), chain_id);
    let pubkey = VerifyingKey::recover_from_prehash(digest.as_slice(), &signature, recovery_id)
        .map_err(|e| EthError::SigningFailed(format!("recovery failed: {e}")))?;

    Ok(address_from_pubkey(&pubkey))
}

/// Canonical transaction identifier: Keccak-256 of the signed encoding.
pub fn tx_hash(tx: &SignedTx) -> B256 {
    let encoded = alloy_rlp::encode(tx);
    B256::from_slice(&Keccak256::digest(&encoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::build_transfer;
    use std::str::FromStr;

    /// The worked example from EIP-155 itself: nonce 9, 20 gwei, 21000 gas,
    /// value 1 ether, chain id 1, key 0x46..46.
    fn eip155_example() -> (UnsignedTx, KeyMaterial) {
        let tx = build_transfer(
            9,
            "0x3535353535353535353535353535353535353535",
            U256::from(1_000_000_000_000_000_000u64),
            U256::from(20_000_000_000u64),
        )
        .unwrap();
        let key = KeyMaterial::from_hex(
            "4646464646464646464646464646464646464646464646464646464646464646",
        )
        .unwrap();
        (tx, key)
    }

    #[test]
    fn sighash_matches_eip155_example() {
        let (tx, _) = eip155_example();
        assert_eq!(
            hex::encode(sighash(&tx, 1)),
            "daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        );
    }

    #[test]
    fn signature_matches_eip155_example() {
        let (tx, key) = eip155_example();
        let signed = sign(&tx, &key, 1).unwrap();

        assert_eq!(signed.v, 37);
        assert_eq!(
            signed.r,
            U256::from_str(
                "18515461264373351373200002665853028612451056578545711640558177340181847433846"
            )
            .unwrap()
        );
        assert_eq!(
            signed.s,
            U256::from_str(
                "46948507304638947509940763649030358759909902576025900602547168820602576006531"
            )
            .unwrap()
        );
    }

    #[test]
    fn recovered_sender_matches_eip155_example() {
        let (tx, key) = eip155_example();
        let signed = sign(&tx, &key, 1).unwrap();

        let sender = recover_sender(&signed, 1).unwrap();
        assert_eq!(sender, key.address());
        assert_eq!(
            crate::address::checksum_address(&sender),
            "0x9d8A62f656a8d1615C1294fd71e9CFb3E4855A4F"
        );
    }

    #[test]
    fn signing_is_deterministic() {
        let (tx, key) = eip155_example();
        let a = sign(&tx, &key, 1).unwrap();
        let b = sign(&tx, &key, 1).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn same_key_both_signatures_recover_to_same_address() {
        let (tx, key) = eip155_example();
        let mut other = tx.clone();
        other.nonce += 1;

        let first = sign(&tx, &key, 1).unwrap();
        let second = sign(&other, &key, 1).unwrap();

        assert_eq!(
            recover_sender(&first, 1).unwrap(),
            recover_sender(&second, 1).unwrap()
        );
    }

    #[test]
    fn different_chain_ids_produce_different_signatures() {
        let (tx, key) = eip155_example();
        let mainnet = sign(&tx, &key, 1).unwrap();
        let testnet = sign(&tx, &key, 1112u64).unwrap();

        assert_ne!(mainnet.v, testnet.v);
        assert_ne!((mainnet.r, mainnet.s), (testnet.r, testnet.s));
    }

    #[test]
    fn signature_rejected_under_foreign_chain_id() {
        let (tx, key) = eip155_example();
        let signed = sign(&tx, &key, 1).unwrap();

        let result = recover_sender(&signed, 2);
        assert!(matches!(result, Err(EthError::SigningFailed(_))));
    }

    #[test]
    fn v_folds_chain_id() {
        let (tx, key) = eip155_example();
        for chain_id in [1u64, 137, 1112, 11155111] {
            let signed = sign(&tx, &key, chain_id).unwrap();
            let parity = signed.v - chain_id * 2 - 35;
            assert!(parity <= 1, "chain {chain_id}: parity {parity}");
        }
    }

    #[test]
    fn tx_hash_is_stable_and_32_bytes() {
        let (tx, key) = eip155_example();
        let signed = sign(&tx, &key, 1).unwrap();

        let h1 = tx_hash(&signed);
        let h2 = tx_hash(&signed);
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 32);
    }

    #[test]
    fn tampered_value_recovers_to_different_sender() {
        let (tx, key) = eip155_example();
        let mut signed = sign(&tx, &key, 1).unwrap();
        signed.value = U256::from(2_000_000_000_000_000_000u64);

        // Recovery still succeeds mathematically but yields some other
        // address, so the forgery is detectable.
        match recover_sender(&signed, 1) {
            Ok(sender) => assert_ne!(sender, key.address()),
            Err(_) => {}
        }
    }
}
