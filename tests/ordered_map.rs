use std::{cell::Cell, collections::BTreeSet, rc::Rc};

use ordtree::{
    create_tree, FnComparator, IterMode, OrderedTree, TreeConfig, TreeCursor, TreeError, TreeKind,
};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

const KINDS: [TreeKind; 4] = [
    TreeKind::Bst,
    TreeKind::Avl,
    TreeKind::RedBlack,
    TreeKind::BPlus,
];

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn make(kind: TreeKind) -> Box<dyn OrderedTree<i32>> {
    create_tree(TreeConfig::new(kind).fanout(4)).unwrap()
}

fn walk_forward(tree: &dyn OrderedTree<i32>) -> Vec<i32> {
    let mut cur = tree.cursor(IterMode::Begin).unwrap();
    let mut out = Vec::new();
    while let Some(&k) = cur.get_data() {
        out.push(k);
        cur.next();
    }
    out
}

fn walk_backward(tree: &dyn OrderedTree<i32>) -> Vec<i32> {
    let mut cur = tree.cursor(IterMode::End).unwrap();
    let mut out = Vec::new();
    while let Some(&k) = cur.get_data() {
        out.push(k);
        cur.prev();
    }
    out
}

#[test]
fn ordered_map_works() {
    init();
    for kind in KINDS {
        let mut tree = make(kind);
        assert_eq!(tree.kind(), kind);
        for k in [10, 20, 5, 15, 25, 30, 1] {
            tree.insert(k).unwrap();
        }
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.to_array(), vec![1, 5, 10, 15, 20, 25, 30]);
        assert_eq!(tree.min(), Ok(&1));
        assert_eq!(tree.max(), Ok(&30));
        assert_eq!(tree.search(&15), Ok(&15));

        assert_eq!(tree.insert(15), Err(TreeError::DuplicateKey), "{:?}", kind);
        assert_eq!(tree.len(), 7);

        assert_eq!(tree.delete(&15), Ok(15));
        assert_eq!(tree.search(&15), Err(TreeError::KeyNotFound));
        assert!(!tree.key_exists(&15));
        assert_eq!(tree.delete(&15), Err(TreeError::KeyNotFound));
        assert_eq!(tree.to_array(), vec![1, 5, 10, 20, 25, 30]);
    }
}

#[test]
fn empty_tree_errors() {
    init();
    for kind in KINDS {
        let mut tree = make(kind);
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.min(), Err(TreeError::EmptyTree));
        assert_eq!(tree.max(), Err(TreeError::EmptyTree));
        assert_eq!(tree.delete(&3), Err(TreeError::EmptyTree));
        assert_eq!(tree.balance(), Err(TreeError::EmptyTree));
        assert!(tree.cursor(IterMode::Begin).unwrap().is_end());
        assert!(tree.cursor(IterMode::End).unwrap().is_end());
        assert!(tree.to_array().is_empty());
    }
}

#[test]
fn root_cursor_only_on_binary_trees() {
    init();
    for kind in KINDS {
        let mut tree = make(kind);
        for k in 0..10 {
            tree.insert(k).unwrap();
        }
        let cur = tree.cursor(IterMode::Root);
        if kind == TreeKind::BPlus {
            assert!(matches!(cur, Err(TreeError::InvalidArgument(_))));
        } else {
            let mut cur = cur.unwrap();
            assert!(cur.get_data().is_some());
            // from the root the cursor still moves in key order
            let mid = *cur.get_data().unwrap();
            cur.next();
            let next = mid + 1;
            assert_eq!(cur.get_data(), if mid == 9 { None } else { Some(&next) });
        }
    }
}

#[test]
fn random_op_test() {
    init();
    let n = 3_000;
    for kind in KINDS {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut tree = make(kind);
        let mut model = BTreeSet::new();

        for _ in 0..n {
            let key = rng.gen_range(0..n / 2);
            if rng.gen_bool(0.6) {
                let res = tree.insert(key);
                if model.insert(key) {
                    assert_eq!(res, Ok(()));
                } else {
                    assert_eq!(res, Err(TreeError::DuplicateKey));
                }
            } else {
                let res = tree.delete(&key);
                if model.remove(&key) {
                    assert_eq!(res, Ok(key));
                } else {
                    assert!(res.is_err());
                }
            }
        }

        let expected: Vec<i32> = model.iter().copied().collect();
        assert_eq!(tree.len(), expected.len(), "{:?}", kind);
        assert_eq!(tree.to_array(), expected);
        assert_eq!(walk_forward(&*tree), expected);
        assert_eq!(
            walk_backward(&*tree),
            expected.iter().rev().copied().collect::<Vec<_>>()
        );
    }
}

#[test]
fn balanced_backends_stay_shallow() {
    init();
    let n: usize = 1 << 12;
    let log2 = (n as f64).log2();
    let mut keys: Vec<i32> = (0..n as i32).collect();
    keys.shuffle(&mut StdRng::seed_from_u64(7));

    for kind in [TreeKind::Avl, TreeKind::RedBlack] {
        for input in [&keys, &(0..n as i32).collect::<Vec<_>>()] {
            let mut tree = make(kind);
            for &k in input.iter() {
                tree.insert(k).unwrap();
            }
            assert!((tree.height() as f64) <= 2.0 * log2 + 1.0, "{:?}", kind);
            assert_eq!(tree.balance(), Ok(()));
        }
    }

    let mut tree = make(TreeKind::BPlus);
    for k in 0..n as i32 {
        tree.insert(k).unwrap();
    }
    // fanout 4 keeps at least two keys in every non-root node
    assert!((tree.height() as f64) <= log2 / 3f64.log2() + 1.0);
}

#[test]
fn search_tree_balance_flattens_chain() {
    init();
    let mut tree = make(TreeKind::Bst);
    for k in 0..255 {
        tree.insert(k).unwrap();
    }
    assert_eq!(tree.height(), 255);
    tree.balance().unwrap();
    assert_eq!(tree.height(), 8);
    assert_eq!(tree.to_array(), (0..255).collect::<Vec<_>>());

    tree.delete(&100).unwrap();
    tree.insert(1000).unwrap();
    assert_eq!(tree.len(), 255);
}

#[test]
fn custom_comparator_reverses_order() {
    init();
    for kind in KINDS {
        let cmp = FnComparator::new(|a: &String, b: &String| b.cmp(a));
        let mut tree = create_tree(TreeConfig::with_comparator(kind, cmp).fanout(3)).unwrap();
        for word in ["pear", "apple", "fig", "kiwi", "banana"] {
            tree.insert(word.to_string()).unwrap();
        }
        assert_eq!(tree.min().unwrap(), "pear");
        assert_eq!(
            tree.to_array(),
            vec!["pear", "kiwi", "fig", "banana", "apple"]
        );
    }
}

#[test]
fn destructor_sees_every_record() {
    init();
    for kind in KINDS {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let config = TreeConfig::new(kind)
            .fanout(3)
            .destructor(move |_: i32| counter.set(counter.get() + 1));
        let mut tree = create_tree(config).unwrap();
        for k in 0..100 {
            tree.insert(k).unwrap();
        }

        tree.delete_entry(&50).unwrap();
        assert_eq!(calls.get(), 1);
        // plain delete hands the record back instead
        assert_eq!(tree.delete(&51), Ok(51));
        assert_eq!(calls.get(), 1);

        tree.destroy_with_entries();
        assert_eq!(calls.get(), 99, "{:?}", kind);
    }

    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    let config = TreeConfig::new(TreeKind::Avl).destructor(move |_: i32| counter.set(counter.get() + 1));
    let mut tree = create_tree(config).unwrap();
    tree.insert(1).unwrap();
    tree.destroy();
    assert_eq!(calls.get(), 0);
}

#[test]
fn invalid_configs_are_rejected() {
    init();
    assert!(matches!(
        create_tree(TreeConfig::<i32>::new(TreeKind::BPlus).fanout(1)),
        Err(TreeError::InvalidArgument(_))
    ));
    assert!(matches!(
        create_tree(TreeConfig::<()>::new(TreeKind::Avl)),
        Err(TreeError::InvalidArgument(_))
    ));
    // fanout means nothing to the binary backends
    assert!(create_tree(TreeConfig::<i32>::new(TreeKind::RedBlack).fanout(0)).is_ok());
}
