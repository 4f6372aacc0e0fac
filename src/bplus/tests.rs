use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use super::BPlusTree;
use crate::tree_base::{
    comparator::FnComparator,
    error::TreeError,
    iter::{CursorPos, IterMode, TreeCursor},
};

fn small_tree() -> BPlusTree<i32> {
    let mut tree = BPlusTree::with_fanout(4).unwrap();
    for k in [10, 20, 5, 15, 25, 30, 1] {
        tree.insert(k).unwrap();
        tree.check_consistency();
    }
    tree
}

#[test]
fn test_small_scenario() {
    let mut tree = small_tree();
    assert_eq!(tree.to_array(), vec![1, 5, 10, 15, 20, 25, 30]);
    assert_eq!(tree.height(), 2);
    assert_eq!(tree.stats().leaves, 2);
    assert_eq!(tree.stats().inner_nodes, 1);
    assert!((tree.stats().avgfill_leaves() - 7.0 / 8.0).abs() < f64::EPSILON);

    assert_eq!(tree.delete(&15), Ok(15));
    assert_eq!(tree.check_consistency(), 6);
    assert_eq!(tree.to_array(), vec![1, 5, 10, 20, 25, 30]);
    assert_eq!(tree.search(&15), Err(TreeError::KeyNotFound));
    assert_eq!(tree.search(&20), Ok(&20));
    assert_eq!(tree.min(), Ok(&1));
    assert_eq!(tree.max(), Ok(&30));
}

#[test]
fn test_duplicate_and_missing() {
    let mut tree = small_tree();
    assert_eq!(tree.insert(25), Err(TreeError::DuplicateKey));
    assert_eq!(tree.len(), 7);
    assert_eq!(tree.delete(&26), Err(TreeError::KeyNotFound));
    tree.check_consistency();

    let mut empty = BPlusTree::<i32>::new();
    assert_eq!(empty.delete(&1), Err(TreeError::EmptyTree));
    assert_eq!(empty.min(), Err(TreeError::EmptyTree));
    assert_eq!(empty.balance(), Err(TreeError::EmptyTree));
    assert_eq!(empty.height(), 0);
}

#[test]
fn test_fanout_validation() {
    assert!(matches!(
        BPlusTree::<i32>::with_fanout(1),
        Err(TreeError::InvalidArgument(_))
    ));
    assert_eq!(BPlusTree::<i32>::with_fanout(2).unwrap().fanout(), 2);
    assert_eq!(BPlusTree::<u64>::new().fanout(), 32);
}

#[test]
fn test_delete_down_to_empty() {
    let mut tree = small_tree();
    for k in [1, 5, 10, 15, 20, 25, 30] {
        assert_eq!(tree.delete(&k), Ok(k));
        tree.check_consistency();
    }
    assert!(tree.is_empty());
    assert_eq!(tree.height(), 0);
    assert_eq!(tree.stats().nodes(), 0);
    assert!(tree.cursor(IterMode::Begin).unwrap().is_end());

    tree.insert(7).unwrap();
    assert_eq!(tree.to_array(), vec![7]);
    assert_eq!(tree.height(), 1);
}

fn random_ops(fanout: usize, n: i32, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tree = BPlusTree::with_fanout(fanout).unwrap();
    let mut keys: Vec<i32> = (0..n).collect();
    keys.shuffle(&mut rng);

    for &k in &keys {
        tree.insert(k).unwrap();
        tree.check_consistency();
    }
    assert_eq!(tree.to_array(), (0..n).collect::<Vec<_>>());

    keys.shuffle(&mut rng);
    let (gone, kept) = keys.split_at(keys.len() / 2);
    for &k in gone {
        assert_eq!(tree.delete(&k), Ok(k));
        tree.check_consistency();
    }
    for &k in gone {
        assert!(!tree.key_exists(&k));
    }
    for &k in kept {
        assert_eq!(tree.search(&k), Ok(&k));
    }

    // mix inserts back in with the remaining deletes
    for (&back, &k) in gone.iter().zip(kept) {
        if rng.gen_bool(0.5) {
            tree.insert(back).unwrap();
        }
        tree.delete(&k).unwrap();
        tree.check_consistency();
    }
}

#[test]
fn test_random_small_fanouts() {
    random_ops(2, 300, 1);
    random_ops(3, 300, 2);
    random_ops(4, 500, 3);
    random_ops(5, 500, 4);
}

#[test]
fn test_random_default_fanout() {
    random_ops(32, 5_000, 5);
}

#[test]
fn test_cursor_walks_leaf_chain() {
    let mut tree = BPlusTree::with_fanout(3).unwrap();
    for k in (0..50).rev() {
        tree.insert(k).unwrap();
    }

    let mut cur = tree.cursor(IterMode::Begin).unwrap();
    let mut seen = Vec::new();
    while let Some(&k) = cur.get_data() {
        assert!(matches!(cur.get_node(), Some(CursorPos::Slot { .. })));
        seen.push(k);
        cur.next();
    }
    assert_eq!(seen, (0..50).collect::<Vec<_>>());
    cur.next();
    assert!(cur.is_end());

    let mut cur = tree.cursor(IterMode::End).unwrap();
    let mut seen = Vec::new();
    while let Some(&k) = cur.get_data() {
        seen.push(k);
        cur.prev();
    }
    assert_eq!(seen, (0..50).rev().collect::<Vec<_>>());

    assert!(matches!(
        tree.cursor(IterMode::Root),
        Err(TreeError::InvalidArgument(_))
    ));
    assert!(tree.iter().rev().copied().eq((0..50).rev()));
    assert_eq!(tree.iter().len(), 50);
}

#[test]
fn test_bounds() {
    let mut tree = BPlusTree::with_fanout(4).unwrap();
    for k in (0..100).step_by(10) {
        tree.insert(k).unwrap();
    }
    assert_eq!(tree.lower_bound(&30).get_data(), Some(&30));
    assert_eq!(tree.lower_bound(&31).get_data(), Some(&40));
    assert_eq!(tree.upper_bound(&30).get_data(), Some(&40));
    assert_eq!(tree.lower_bound(&-5).get_data(), Some(&0));
    assert!(tree.lower_bound(&91).is_end());
    assert!(tree.upper_bound(&90).is_end());
    assert_eq!(tree.find(&50).get_data(), Some(&50));
    assert!(tree.find(&55).is_end());

    let mut cur = tree.lower_bound(&35);
    cur.prev();
    assert_eq!(cur.get_data(), Some(&30));
}

#[test]
fn test_bulk_load() {
    for fanout in [2, 3, 4, 8] {
        for n in [0, 1, 2, 5, 17, 100, 1000] {
            let mut tree = BPlusTree::with_fanout(fanout).unwrap();
            tree.bulk_load(0..n).unwrap();
            assert_eq!(tree.check_consistency(), n as usize);
            assert_eq!(tree.to_array(), (0..n).collect::<Vec<_>>());
            for k in (0..n).step_by(3) {
                tree.delete(&k).unwrap();
                tree.check_consistency();
            }
        }
    }

    let mut tree = small_tree();
    assert!(matches!(
        tree.bulk_load(40..50),
        Err(TreeError::InvalidArgument(_))
    ));
    let mut tree = BPlusTree::with_fanout(4).unwrap();
    assert!(matches!(
        tree.bulk_load(vec![1, 3, 3, 4]),
        Err(TreeError::InvalidArgument(_))
    ));
    assert!(tree.is_empty());
}

#[test]
fn test_custom_comparator() {
    let cmp = FnComparator::new(|a: &i32, b: &i32| b.cmp(a));
    let mut tree = BPlusTree::with_comparator(cmp, 3).unwrap();
    for k in 0..20 {
        tree.insert(k).unwrap();
    }
    tree.check_consistency();
    assert_eq!(tree.min(), Ok(&19));
    assert_eq!(tree.to_array(), (0..20).rev().collect::<Vec<_>>());
}

#[test]
fn test_destructor_and_debug() {
    use crate::tree_base::config::{TreeConfig, TreeKind};
    use std::{cell::RefCell, rc::Rc};

    let dropped = Rc::new(RefCell::new(Vec::new()));
    let sink = dropped.clone();
    let config = TreeConfig::new(TreeKind::BPlus)
        .fanout(3)
        .destructor(move |k: i32| sink.borrow_mut().push(k));
    let mut tree = BPlusTree::from_config(config).unwrap();
    for k in 0..10 {
        tree.insert(k).unwrap();
    }
    let printed = format!("{:?}", tree);
    assert!(printed.contains("leaves:"));

    tree.delete_entry(&4).unwrap();
    assert_eq!(*dropped.borrow(), vec![4]);
    tree.clear_with_entries();
    assert!(tree.is_empty());
    assert_eq!(dropped.borrow().len(), 10);
    assert_eq!(tree.stats().nodes(), 0);
}
