use hex_literal::hex;

use super::*;

const EXPECTED_ROOT_HASH: &[u8] = &hex!("681965c4ab");

fn build_test_challenge() -> ChallengeId {
    let mut bytes = [0u8; 64];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = i as u8;
    }
    ChallengeId {
        bytes: bytes.to_vec(),
    }
}

fn build_test_tree(config: Config) -> (ChallengeId, Memory, MerkleTree) {
    let challenge_id = build_test_challenge();

    let mut memory = Memory::new(config);
    memory.build_all_chunks(&challenge_id, 1);

    let mut tree = MerkleTree::new(config);
    tree.compute_leaf_hashes(&challenge_id, &memory);
    tree.compute_intermediate_nodes(&challenge_id);

    (challenge_id, memory, tree)
}

#[test]
fn node_size_follows_difficulty() {
    let mut config = Config::default();

    config.difficulty_bits = 24;
    config.search_length = 9;
    assert_eq!(MerkleTree::calculate_node_size(&config), 5);

    config.difficulty_bits = 70;
    assert_eq!(MerkleTree::calculate_node_size(&config), 10);
}

#[test]
fn allocation_covers_all_nodes() {
    let config = Config {
        chunk_count: 2,
        chunk_size: 8,
        ..Config::default()
    };
    let tree = MerkleTree::new(config);

    let total_elements = config.element_count();
    let expected_nodes_count = 2 * total_elements - 1;
    assert_eq!(tree.node_size(), MerkleTree::calculate_node_size(&config));
    assert_eq!(
        tree.nodes.len(),
        expected_nodes_count * tree.node_size()
    );
    // Last node is addressable, one past is not
    assert!(tree.get_node(expected_nodes_count - 1).is_some());
    assert!(tree.get_node(expected_nodes_count).is_none());
}

#[test]
fn merkle_root_matches_golden() {
    let config = Config {
        chunk_count: 2,
        chunk_size: 8,
        ..Config::default()
    };
    let (_, _, tree) = build_test_tree(config);

    let root_hash = tree.get_node(0).unwrap();
    assert_eq!(&root_hash[..5], EXPECTED_ROOT_HASH);
}

#[test]
fn leaf_nodes_match_recomputed_hashes() {
    let config = Config {
        chunk_count: 2,
        chunk_size: 8,
        ..Config::default()
    };
    let (challenge_id, memory, tree) = build_test_tree(config);

    let element_count = config.element_count();
    let mut recomputed = vec![0u8; tree.node_size()];
    for i in 0..element_count {
        MerkleTree::compute_leaf_hash(&challenge_id, memory.get(i).unwrap(), &mut recomputed);
        assert_eq!(
            tree.get_node(element_count - 1 + i).unwrap(),
            recomputed.as_slice()
        );
    }
}

#[test]
fn intermediate_nodes_hash_their_children() {
    let config = Config {
        chunk_count: 2,
        chunk_size: 8,
        ..Config::default()
    };
    let (challenge_id, _, tree) = build_test_tree(config);

    let mut recomputed = vec![0u8; tree.node_size()];
    for parent in 0..config.element_count() - 1 {
        let (left, right) = MerkleTree::children_of(parent);
        let compute = MerkleTree::compute_intermediate_hash(
            &challenge_id,
            tree.get_node(left).unwrap(),
            tree.get_node(right).unwrap(),
        );
        compute(&mut recomputed);
        assert_eq!(tree.get_node(parent).unwrap(), recomputed.as_slice());
    }
}

#[test]
fn trace_node_collects_full_authentication_path() {
    let config = Config {
        chunk_count: 2,
        chunk_size: 8,
        ..Config::default()
    };
    let (_, _, tree) = build_test_tree(config);

    // Element 15 of 16 sits at node 30; its path covers nine nodes.
    let element_index = 15;
    let leaf_node_index = config.element_count() - 1 + element_index;

    let mut traced = BTreeMap::new();
    tree.trace_node(leaf_node_index, &mut traced);

    let expected_indices = [0, 1, 2, 5, 6, 13, 14, 29, 30];
    assert_eq!(traced.len(), expected_indices.len());
    for index in expected_indices {
        assert_eq!(
            traced.get(&index).map(|bytes| bytes.as_ref()),
            tree.get_node(index),
            "missing or wrong hash for node {}",
            index
        );
    }
}

#[test]
fn trace_of_root_is_just_the_root() {
    let config = Config {
        chunk_count: 2,
        chunk_size: 8,
        ..Config::default()
    };
    let (_, _, tree) = build_test_tree(config);

    let mut traced = BTreeMap::new();
    tree.trace_node(0, &mut traced);

    assert_eq!(traced.len(), 1);
    assert!(traced.contains_key(&0));
}
