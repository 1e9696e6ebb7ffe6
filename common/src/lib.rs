use ethereum_types::{Address, H256, U256};

/// The hash value of an account empty EVM code.
/// 0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470
pub const EMPTY_CODE_HASH: H256 = H256([
    197, 210, 70, 1, 134, 247, 35, 60, 146, 126, 125, 178, 220, 199, 3, 192, 229, 0, 182, 83, 202,
    130, 39, 59, 123, 250, 216, 4, 93, 133, 164, 112,
]);

/// Left-pads an address into a full EVM word.
pub fn address_to_u256(address: Address) -> U256 {
    U256::from_big_endian(address.as_bytes())
}

/// Returns the 128 most significant bits of a word.
pub fn u256_hi(word: U256) -> u128 {
    (word >> 128).low_u128()
}

/// Returns the 128 least significant bits of a word.
pub fn u256_lo(word: U256) -> u128 {
    word.low_u128()
}

#[test]
fn test_empty_code_hash() {
    assert_eq!(EMPTY_CODE_HASH, keccak_hash::keccak([]));
}

#[test]
fn test_address_to_u256() {
    let address = Address::from(hex_literal::hex!(
        "95222290dd7278aa3ddd389cc1e1d165cc4bafe5"
    ));
    let word = address_to_u256(address);

    assert_eq!(u256_hi(word), 0x95222290);
    assert_eq!(u256_lo(word), 0xdd7278aa3ddd389cc1e1d165cc4bafe5);
    assert_eq!(word >> 160, U256::zero());
}

#[test]
fn test_hi_lo_split() {
    let word = (U256::from(7) << 128) | U256::from(u128::MAX);

    assert_eq!(u256_hi(word), 7);
    assert_eq!(u256_lo(word), u128::MAX);
    assert_eq!(u256_hi(U256::MAX), u128::MAX);
}
