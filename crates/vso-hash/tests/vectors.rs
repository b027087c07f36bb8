//! Published VSO-Hash vectors and hasher behaviour.

use sha2::{Digest as _, Sha256};
use vso_hash::{BLOCK_SIZE, Hasher, PAGE_SIZE, SIZE, VsoError};

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn sequential(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i & 0xff) as u8).collect()
}

const SEQUENTIAL_VECTORS: &[(usize, &str)] = &[
    (0, "1e57cf2792a900d06c1cdfb3c453f35bc86f72788aa9724c96c929d1cc6b456a00"),
    (1, "3da32150b5e69b54e7ad1765d9573bc5e6e05d3b6529556c1b4a436a76a511f400"),
    (PAGE_SIZE - 1, "4ae1ad6462d75d117a5dafcf98167981371a4b21e1cee49d0b982de2ce01032300"),
    (PAGE_SIZE, "85840e1cb7cbfd78b464921c54c96f68c19066f20860efa8cce671b40ba5162300"),
    (PAGE_SIZE + 1, "d92a37c547f9d5b6b7b791a24f587da8189cca14ebc8511d2482e7448763e2bd00"),
    (BLOCK_SIZE - 1, "1c3c73f7e829e84a5ba05631195105fb49e033fa23bda6d379b3e46b5d73ef3700"),
    (BLOCK_SIZE, "6dae3ed3e623aed293297c289c3d20a53083529138b7631e99920ef0d93af3cd00"),
    (BLOCK_SIZE + 1, "1f9f3c008ea37ecb65bc5fb14a420cebb3ca72a9601ec056709a6b431f91807100"),
    (2 * BLOCK_SIZE - 1, "df0e0db15e866592dbfa9bca74e6d547d67789f7eb088839fc1a5cefa862353700"),
    (2 * BLOCK_SIZE, "5e3a80b2acb2284cd21a08979c49cbb80874e1377940699b07a8abee9175113200"),
    (2 * BLOCK_SIZE + 1, "b9a44a420593fa18453b3be7b63922df43c93ff52d88f2cab26fe1fadba7003100"),
];

#[test]
fn sequential_blob_ids_are_stable() {
    let mut hasher = Hasher::new(100).unwrap();
    for &(len, expected) in SEQUENTIAL_VECTORS {
        let id = hasher.hash(sequential(len).as_slice()).unwrap();
        assert_eq!(hex(&id), expected, "length {len}");
    }
}

#[test]
fn zeroed_five_blocks_is_stable() {
    let mut hasher = Hasher::new(100).unwrap();
    let id = hasher.hash(vec![0u8; 5 * BLOCK_SIZE].as_slice()).unwrap();
    assert_eq!(
        hex(&id),
        "36668b653db0b48d3aa1f2fddcea481b34a310c166b9b041a5b23b59be02e5db00"
    );
}

#[test]
fn parallelism_does_not_change_result() {
    let data = sequential(BLOCK_SIZE + 3 * PAGE_SIZE + 5);
    let expected = vso_hash::sum(&data).unwrap();
    for parallelism in [1, 2, 7, 32, 33] {
        let mut hasher = Hasher::new(parallelism).unwrap();
        assert_eq!(hasher.hash(data.as_slice()).unwrap(), expected, "parallelism {parallelism}");
    }
}

#[test]
fn identifier_ends_with_zero() {
    let id = vso_hash::sum(b"trailing byte").unwrap();
    assert_eq!(id.len(), SIZE);
    assert_eq!(id[SIZE - 1], 0);
}

#[test]
fn sha256_sums_match_reference() {
    let mut hasher = Hasher::new(4).unwrap();
    let inputs = [sequential(0), sequential(55), sequential(PAGE_SIZE), sequential(1000)];
    let sums = hasher.sha256_sums(&inputs).unwrap();
    for (sum, input) in sums.iter().zip(&inputs) {
        assert_eq!(sum.as_slice(), Sha256::digest(input).as_slice());
    }
}

#[test]
fn sha256_sums_rejects_too_many_inputs() {
    let mut hasher = Hasher::new(2).unwrap();
    let inputs: [&[u8]; 3] = [b"a", b"b", b"c"];
    assert!(matches!(
        hasher.sha256_sums(&inputs),
        Err(VsoError::TooManyInputs { max: 2, got: 3 })
    ));
}

#[test]
fn sha256_sums_rejects_oversized_page() {
    let mut hasher = Hasher::new(2).unwrap();
    let inputs = [vec![0u8; 10], vec![0u8; PAGE_SIZE + 1]];
    assert!(matches!(
        hasher.sha256_sums(&inputs),
        Err(VsoError::PageTooLarge { len }) if len == PAGE_SIZE + 1
    ));
}

#[test]
fn hasher_is_reusable() {
    let mut hasher = Hasher::new(3).unwrap();
    let first = hasher.hash(&b"first input"[..]).unwrap();
    let _ = hasher.hash(sequential(PAGE_SIZE * 4).as_slice()).unwrap();
    assert_eq!(hasher.hash(&b"first input"[..]).unwrap(), first);
}
