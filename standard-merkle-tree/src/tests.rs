use alloy_primitives::{Address, U256};
use alloy_sol_types::SolValue;
use assert_matches::assert_matches;
use proptest::prelude::*;

use super::*;
use crate::hash::{parse_hash, to_hex};

fn address(n: u64) -> [u8; 20] {
    let mut a = [0u8; 20];
    a[12..].copy_from_slice(&n.to_be_bytes());
    a
}

fn airdrop_types() -> Vec<AbiType> {
    vec![AbiType::Address, AbiType::Uint(256)]
}

/// `(0x..01, 0), (0x..02, 1), ...`, the layout of the reference airdrop list.
fn airdrop_records(count: u64) -> Vec<Record> {
    (0..count)
        .map(|i| {
            Record::new(vec![
                AbiValue::Address(address(i + 1)),
                AbiValue::Uint(U256::from(i)),
            ])
        })
        .collect()
}

fn build(count: u64, sort_leaves: bool) -> (Hash, MerkleTree) {
    TreeBuilder::with_options(TreeOptions { sort_leaves })
        .build(airdrop_records(count), &airdrop_types())
        .expect("build should succeed")
}

fn h(s: &str) -> Hash {
    parse_hash(s).expect("valid hash literal")
}

// ── Reference vectors ────────────────────────────────────────────────

#[test]
fn test_reference_airdrop_root() {
    let (root, _) = build(9, true);
    assert_eq!(
        to_hex(&root),
        "0xa297e088bf87eea455a2cbb55853136013d1f0c222822827516f97639984ec19"
    );
}

#[test]
fn test_reference_airdrop_proofs() {
    let (_, tree) = build(9, true);

    let first = Record::parse(&["0x0000000000000000000000000000000000000001", "0"], &airdrop_types())
        .unwrap();
    let proof = tree.prove_by_record(&first).expect("record is in the tree");
    assert_eq!(
        proof.siblings,
        vec![
            h("0x50bca9edd621e0f97582fa25f616d475cabe2fd783c8117900e5fed83ec22a7c"),
            h("0x63340ab877f112a2b7ccdbf0eb0f6d9f757ab36ecf6f6e660df145bcdfb67a19"),
            h("0x4faf7b0021ef54912575fc1dca53650228f33fe7ae7f3bf151ce2b9faa8e6ffd"),
        ]
    );

    let second = tree.prove_by_index(1).unwrap();
    assert_eq!(
        second.siblings,
        vec![
            h("0x5fa3dab1e0e1070445c119c6fd10edd16d6aa2f25a5899217f919c041d474318"),
            h("0x895c5cff012220658437b539cdf2ce853576fc0a881d814e6c7da6b20e9b8d8d"),
            h("0x4faf7b0021ef54912575fc1dca53650228f33fe7ae7f3bf151ce2b9faa8e6ffd"),
        ]
    );
}

// ── Encoding ─────────────────────────────────────────────────────────

#[test]
fn test_record_encoding_matches_abi_encode() {
    let record = airdrop_records(3).remove(2);
    let expected = (Address::from(address(3)), U256::from(2u64)).abi_encode();
    assert_eq!(record.abi_encode(), expected);
}

#[test]
fn test_equivalent_spellings_encode_identically() {
    let types = [AbiType::Address, AbiType::Uint(256), AbiType::FixedBytes(4)];
    let a = Record::parse(
        &["0x00000000000000000000000000000000000000aB", "10", "0xDEADBEEF"],
        &types,
    )
    .unwrap();
    let b = Record::parse(
        &["00000000000000000000000000000000000000AB", "0x000a", "deadbeef"],
        &types,
    )
    .unwrap();
    assert_eq!(a, b);
    assert_eq!(standard_leaf_hash(&a), standard_leaf_hash(&b));
}

#[test]
fn test_abi_type_parsing() {
    assert_eq!(AbiType::parse("uint").unwrap(), AbiType::Uint(256));
    assert_eq!(AbiType::parse("int8").unwrap(), AbiType::Int(8));
    assert_eq!(AbiType::parse("bytes32").unwrap(), AbiType::FixedBytes(32));
    assert_eq!(
        AbiType::parse_list("address, uint256").unwrap(),
        airdrop_types()
    );
    assert_eq!(AbiType::Uint(64).to_string(), "uint64");

    for bad in ["uint7", "uint264", "bytes", "bytes0", "bytes33", "string", "tuple"] {
        assert_matches!(
            AbiType::parse(bad),
            Err(MerkleTreeError::UnsupportedType(_)),
            "{} should be rejected",
            bad
        );
    }
}

#[test]
fn test_signed_integer_range_and_encoding() {
    let minus_one = AbiValue::parse(AbiType::Int(8), "-1").unwrap();
    assert_eq!(minus_one.abi_word(), [0xff; 32]);
    assert_eq!(minus_one.to_string(), "-1");

    assert!(AbiValue::parse(AbiType::Int(8), "-128").is_ok());
    assert!(AbiValue::parse(AbiType::Int(8), "127").is_ok());
    assert!(AbiValue::parse(AbiType::Int(8), "-129").is_err());
    assert!(AbiValue::parse(AbiType::Int(8), "128").is_err());

    let min = AbiValue::parse(
        AbiType::Int(256),
        "-57896044618658097711785492504343953926634992332820282019728792003956564819968",
    )
    .unwrap();
    let mut expected = [0u8; 32];
    expected[0] = 0x80;
    assert_eq!(min.abi_word(), expected);
}

#[test]
fn test_unsigned_range() {
    assert!(AbiValue::parse(AbiType::Uint(8), "255").is_ok());
    assert!(AbiValue::parse(AbiType::Uint(8), "256").is_err());
    assert!(AbiValue::parse(AbiType::Uint(256), "-1").is_err());
    assert!(AbiValue::parse(AbiType::Bool, "yes").is_err());
    assert!(AbiValue::parse(AbiType::Address, "0x1234").is_err());
}

// ── Build ────────────────────────────────────────────────────────────

#[test]
fn test_two_record_proof_is_the_other_leaf() {
    let (root, tree) = build(2, true);
    let proof = tree.prove_by_index(0).unwrap();
    let leaf0 = tree.leaf_hash(0).unwrap();
    let leaf1 = tree.leaf_hash(1).unwrap();

    assert_eq!(proof.siblings, vec![leaf1]);
    assert_eq!(root, hash_pair(&leaf0, &leaf1));
    assert!(verify(&root, &leaf0, &MerkleProof::new(vec![leaf1])));
}

#[test]
fn test_nine_records_depth_and_proof_lengths() {
    let (_, tree) = build(9, true);
    assert_eq!(tree.depth(), 4);
    assert_eq!(tree.nodes().len(), 17);

    let lengths: Vec<usize> = tree.prove_all().iter().map(MerkleProof::len).collect();
    assert_eq!(lengths.iter().filter(|&&l| l == 3).count(), 7);
    assert_eq!(lengths.iter().filter(|&&l| l == 4).count(), 2);
}

#[test]
fn test_single_record_tree() {
    let (root, tree) = build(1, true);
    assert_eq!(root, tree.leaf_hash(0).unwrap());
    assert_eq!(tree.depth(), 0);
    let proof = tree.prove_by_index(0).unwrap();
    assert!(proof.is_empty());
    assert!(verify(&root, &root, &proof));
}

#[test]
fn test_empty_input_is_rejected() {
    assert_matches!(
        TreeBuilder::new().build(Vec::new(), &airdrop_types()),
        Err(MerkleTreeError::EmptyInput)
    );
    assert_matches!(
        TreeBuilder::new().build_simple(Vec::new()),
        Err(MerkleTreeError::EmptyInput)
    );
}

#[test]
fn test_invalid_records_are_rejected() {
    let short = vec![Record::new(vec![AbiValue::Address(address(1))])];
    assert_matches!(
        TreeBuilder::new().build(short, &airdrop_types()),
        Err(MerkleTreeError::InvalidRecord(_))
    );

    let wrong_type = vec![Record::new(vec![
        AbiValue::Uint(U256::from(1u8)),
        AbiValue::Uint(U256::from(1u8)),
    ])];
    assert_matches!(
        TreeBuilder::new().build(wrong_type, &airdrop_types()),
        Err(MerkleTreeError::InvalidRecord(_))
    );

    let too_wide = vec![Record::new(vec![AbiValue::Uint(U256::from(300u32))])];
    let err = TreeBuilder::new()
        .build(too_wide, &[AbiType::Uint(8)])
        .unwrap_err();
    assert_matches!(err, MerkleTreeError::InvalidRecord(ref msg) if msg.starts_with("record 0"));
}

#[test]
fn test_sorted_root_is_order_independent() {
    let mut records = airdrop_records(7);
    let (root, _) = TreeBuilder::new()
        .build(records.clone(), &airdrop_types())
        .unwrap();
    records.reverse();
    let (reversed_root, reversed) = TreeBuilder::new()
        .build(records, &airdrop_types())
        .unwrap();
    assert_eq!(root, reversed_root);
    // Leaf indices follow the new input order.
    assert_eq!(
        reversed.record(0).unwrap().values()[0],
        AbiValue::Address(address(7))
    );
}

#[test]
fn test_unsorted_root_depends_on_order() {
    let records = airdrop_records(3);
    let options = TreeOptions { sort_leaves: false };
    let (root, tree) = TreeBuilder::with_options(options)
        .build(records.clone(), &airdrop_types())
        .unwrap();
    let (permuted_root, _) = TreeBuilder::with_options(options)
        .build(records.into_iter().rev().collect(), &airdrop_types())
        .unwrap();
    assert_ne!(root, permuted_root);

    // Unsorted layout places input leaf k at position len - 1 - k.
    assert_eq!(tree.tree_index(0).unwrap(), 4);
    assert_eq!(tree.tree_index(2).unwrap(), 2);
}

// ── Proof lookup ─────────────────────────────────────────────────────

#[test]
fn test_prove_by_record_uses_value_equality() {
    let (root, tree) = build(5, true);
    let spelled_differently = Record::parse(
        &["0X0000000000000000000000000000000000000003", "0x02"],
        &airdrop_types(),
    )
    .unwrap();
    let proof = tree.prove_by_record(&spelled_differently).unwrap();
    assert_eq!(proof, tree.prove_by_index(2).unwrap());
    assert!(verify(&root, &tree.leaf_hash(2).unwrap(), &proof));
}

#[test]
fn test_prove_by_record_absent() {
    let (_, tree) = build(5, true);
    let absent = Record::new(vec![
        AbiValue::Address(address(1)),
        AbiValue::Uint(U256::from(99u8)),
    ]);
    assert_matches!(
        tree.prove_by_record(&absent),
        Err(MerkleTreeError::RecordNotFound(_))
    );
    let malformed = Record::new(vec![AbiValue::Bool(true)]);
    assert_matches!(
        tree.prove_by_record(&malformed),
        Err(MerkleTreeError::InvalidRecord(_))
    );
}

#[test]
fn test_prove_by_index_out_of_range() {
    let (_, tree) = build(3, true);
    assert_matches!(
        tree.prove_by_index(3),
        Err(MerkleTreeError::IndexOutOfRange {
            index: 3,
            leaf_count: 3
        })
    );
}

#[test]
fn test_prove_many_matches_single_lookups() {
    let (_, tree) = build(9, true);
    let wanted: Vec<Record> = [8usize, 0, 4]
        .iter()
        .map(|&i| tree.record(i).unwrap().clone())
        .collect();
    let proofs = tree.prove_many(&wanted).unwrap();
    assert_eq!(
        proofs.iter().map(|(i, _)| *i).collect::<Vec<_>>(),
        vec![8, 0, 4]
    );
    for (index, proof) in proofs {
        assert_eq!(proof, tree.prove_by_index(index).unwrap());
        assert!(tree.verify_index(index, &proof).unwrap());
    }
}

#[test]
fn test_duplicate_records_resolve_to_first_index() {
    let mut records = airdrop_records(3);
    records.push(records[1].clone());
    let (root, tree) = TreeBuilder::new().build(records, &airdrop_types()).unwrap();
    assert_eq!(tree.leaf_count(), 4);
    assert_eq!(tree.index_of(tree.record(3).unwrap()).unwrap(), 1);
    // Both copies still have valid proofs.
    for i in 0..4 {
        let proof = tree.prove_by_index(i).unwrap();
        assert!(verify(&root, &tree.leaf_hash(i).unwrap(), &proof));
    }
}

#[test]
fn test_proofs_are_deterministic() {
    let (_, tree) = build(13, true);
    let again = tree.clone();
    for i in 0..13 {
        assert_eq!(tree.prove_by_index(i).unwrap(), again.prove_by_index(i).unwrap());
    }
}

// ── Simple leaves ────────────────────────────────────────────────────

#[test]
fn test_simple_tree_uses_leaves_verbatim() {
    let leaves: Vec<Hash> = (0u8..5).map(|i| keccak256([i])).collect();
    let (root, tree) = TreeBuilder::new().build_simple(leaves.clone()).unwrap();
    for (i, leaf) in leaves.iter().enumerate() {
        assert_eq!(&tree.leaf_hash(i).unwrap(), leaf);
        let proof = tree.prove_by_index(i).unwrap();
        assert!(verify(&root, leaf, &proof));
    }
    let by_value = Record::new(vec![AbiValue::FixedBytes(leaves[3].to_vec())]);
    assert_eq!(tree.index_of(&by_value).unwrap(), 3);
}

// ── Artifact round trip and validation ───────────────────────────────

#[test]
fn test_json_round_trip_preserves_root_and_proofs() {
    let (root, tree) = build(9, true);
    let json = tree.to_json().unwrap();
    let loaded = MerkleTree::from_json(&json).unwrap();
    assert_eq!(loaded, tree);
    assert_eq!(loaded.root(), root);
    assert_eq!(loaded.prove_all(), tree.prove_all());

    let (_, simple) = TreeBuilder::new()
        .build_simple(vec![[1u8; 32], [2u8; 32], [3u8; 32]])
        .unwrap();
    let loaded = MerkleTree::from_json(&simple.to_json().unwrap()).unwrap();
    assert_eq!(loaded, simple);
}

#[test]
fn test_dump_shape() {
    let (_, tree) = build(2, true);
    let value: serde_json::Value = serde_json::from_str(&tree.to_json().unwrap()).unwrap();
    assert_eq!(value["format"], "standard-v1");
    assert_eq!(value["leafEncoding"][1], "uint256");
    assert_eq!(value["tree"].as_array().unwrap().len(), 3);
    assert_eq!(
        value["values"][1]["value"][0],
        "0x0000000000000000000000000000000000000002"
    );
    assert_eq!(value["values"][1]["value"][1], "1");
    assert!(value["values"][0]["treeIndex"].is_u64());
}

#[test]
fn test_load_rejects_corrupt_artifacts() {
    let (_, tree) = build(5, true);
    let good = tree.dump();

    let mut bad_node = good.clone();
    bad_node.tree[0] = to_hex(&[7u8; 32]);
    assert_matches!(
        MerkleTree::load(bad_node),
        Err(MerkleTreeError::Deserialization(_))
    );

    let mut bad_value = good.clone();
    bad_value.values[0].value = DumpRecord::Fields(vec![
        "0x00000000000000000000000000000000000000ff".to_string(),
        "0".to_string(),
    ]);
    assert_matches!(
        MerkleTree::load(bad_value),
        Err(MerkleTreeError::Deserialization(_))
    );

    let mut internal_index = good.clone();
    internal_index.values[0].tree_index = 0;
    assert_matches!(
        MerkleTree::load(internal_index),
        Err(MerkleTreeError::Deserialization(_))
    );

    let mut missing_value = good.clone();
    missing_value.values.pop();
    assert_matches!(
        MerkleTree::load(missing_value),
        Err(MerkleTreeError::Deserialization(_))
    );

    let mut unknown_format = good.clone();
    unknown_format.format = "standard-v2".to_string();
    assert_matches!(
        MerkleTree::load(unknown_format),
        Err(MerkleTreeError::Deserialization(_))
    );

    let mut no_encoding = good;
    no_encoding.leaf_encoding = None;
    assert_matches!(
        MerkleTree::load(no_encoding),
        Err(MerkleTreeError::Deserialization(_))
    );

    assert_matches!(
        MerkleTree::from_json("{\"format\": \"standard-v1\""),
        Err(MerkleTreeError::Deserialization(_))
    );
}

#[test]
fn test_load_rejects_malformed_nodes_and_mismatched_shapes() {
    let (_, tree) = build(5, true);
    let good = tree.dump();

    for node in ["0xzz", "0x1234"] {
        let mut bad_hash = good.clone();
        bad_hash.tree[1] = node.to_string();
        assert_matches!(
            MerkleTree::load(bad_hash),
            Err(MerkleTreeError::Deserialization(_))
        );
    }

    let mut leaf_in_standard = good;
    leaf_in_standard.values[0].value = DumpRecord::Leaf(to_hex(&[1u8; 32]));
    assert_matches!(
        MerkleTree::load(leaf_in_standard),
        Err(MerkleTreeError::Deserialization(_))
    );

    let (_, simple) = TreeBuilder::new()
        .build_simple(vec![[1u8; 32], [2u8; 32], [3u8; 32]])
        .unwrap();
    let simple_dump = simple.dump();

    let mut fields_in_simple = simple_dump.clone();
    fields_in_simple.values[0].value = DumpRecord::Fields(vec![to_hex(&[1u8; 32])]);
    assert_matches!(
        MerkleTree::load(fields_in_simple),
        Err(MerkleTreeError::Deserialization(_))
    );

    let mut simple_with_encoding = simple_dump;
    simple_with_encoding.leaf_encoding = Some(vec!["garbage".to_string()]);
    assert_matches!(
        MerkleTree::load(simple_with_encoding),
        Err(MerkleTreeError::Deserialization(_))
    );
}

#[test]
fn test_load_rejects_shared_tree_index() {
    let records = airdrop_records(2);
    let duplicated = vec![records[0].clone(), records[1].clone(), records[0].clone()];
    let (_, tree) = TreeBuilder::new()
        .build(duplicated, &airdrop_types())
        .unwrap();
    let mut dump = tree.dump();
    assert!(MerkleTree::load(dump.clone()).is_ok());

    // Both copies hash to the same leaf, so only slot uniqueness catches this.
    dump.values[2].tree_index = dump.values[0].tree_index;
    assert_matches!(
        MerkleTree::load(dump),
        Err(MerkleTreeError::Deserialization(_))
    );
}

// ── Properties ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn prop_every_leaf_verifies(count in 1u64..80, sort_leaves in any::<bool>()) {
        let (root, tree) = build(count, sort_leaves);
        for i in 0..count as usize {
            let proof = tree.prove_by_index(i).unwrap();
            prop_assert!(verify(&root, &tree.leaf_hash(i).unwrap(), &proof));
        }
    }

    #[test]
    fn prop_tampered_sibling_fails(
        count in 2u64..40,
        pick in any::<prop::sample::Index>(),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let (root, tree) = build(count, true);
        let index = pick.index(count as usize);
        let mut proof = tree.prove_by_index(index).unwrap();
        let sibling = position.index(proof.len());
        let byte = (sibling * 7) % 32;
        proof.siblings[sibling][byte] ^= 1 << bit;
        prop_assert!(!verify(&root, &tree.leaf_hash(index).unwrap(), &proof));
    }

    #[test]
    fn prop_sorted_root_is_permutation_invariant(
        order in Just((0u64..12).collect::<Vec<_>>()).prop_shuffle(),
    ) {
        let records = airdrop_records(12);
        let (root, _) = TreeBuilder::new().build(records.clone(), &airdrop_types()).unwrap();
        let shuffled = order.iter().map(|&i| records[i as usize].clone()).collect();
        let (shuffled_root, _) = TreeBuilder::new().build(shuffled, &airdrop_types()).unwrap();
        prop_assert_eq!(root, shuffled_root);
    }
}
