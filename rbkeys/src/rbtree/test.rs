use super::{Color, Direction, NodeId, RbTree, NIL};
use crate::{Config, Key, LoadError, TreeError, Violation};
use std::collections::BTreeSet;

use Color::{Black, Red};

fn tree_of(keys: impl IntoIterator<Item = Key>) -> RbTree {
    let mut tree = RbTree::new();
    for key in keys {
        tree.insert(key).unwrap();
    }
    tree
}

fn keys(tree: &RbTree) -> Vec<Key> {
    tree.iter().collect()
}

/// Hook a fresh node under `parent` without any rebalancing.
fn attach(tree: &mut RbTree, parent: NodeId, side: Direction, key: Key) -> NodeId {
    let id = tree.arena.allocate(key).unwrap();
    tree.arena[id].color = Black;
    tree.arena[id].parent = parent;
    if parent == NIL {
        tree.root = id;
    } else {
        tree.set_child(parent, side, id);
    }
    tree.len += 1;
    id
}

fn assert_links(tree: &RbTree, id: NodeId, parent: NodeId, left: NodeId, right: NodeId) {
    let node = tree.node(id);
    assert_eq!(node.parent, parent, "parent of {}", node.key);
    assert_eq!(node.left, left, "left child of {}", node.key);
    assert_eq!(node.right, right, "right child of {}", node.key);
}

fn assert_sentinel_untouched(tree: &RbTree) {
    let nil = tree.node(NIL);
    assert_eq!(nil.color, Black);
    assert_eq!((nil.parent, nil.left, nil.right), (NIL, NIL, NIL));
}

#[test]
fn insert_and_contains() {
    let mut tree = RbTree::new();
    assert!(tree.is_empty());

    for key in [5, 3, 8, 1, 4, 7, 9] {
        assert_eq!(tree.insert(key), Ok(()));
    }

    assert_eq!(tree.len(), 7);
    for key in [5, 3, 8, 1, 4, 7, 9] {
        assert!(tree.contains(key));
    }
    for key in [0, 2, 6, 10, -1] {
        assert!(!tree.contains(key));
    }
    assert_eq!(keys(&tree), vec![1, 3, 4, 5, 7, 8, 9]);
}

#[test]
fn first_insert_becomes_black_root() {
    let mut tree = RbTree::new();
    tree.insert(42).unwrap();
    assert_eq!(tree.traverse(), vec![(42, Black)]);
    assert_eq!(tree.black_height(), 1);
    assert_eq!(tree.height(), 1);
}

#[test]
fn ascending_inserts_rebalance() {
    let tree = tree_of(1..=7);
    assert_eq!(
        tree.traverse(),
        vec![
            (2, Black),
            (1, Black),
            (4, Red),
            (3, Black),
            (6, Black),
            (5, Red),
            (7, Red),
        ]
    );
    assert_eq!(tree.black_height(), 2);
}

#[test]
fn inner_insert_rotates_twice() {
    // 3 then 1 then 2: the new node sits on the uncle's side of its parent.
    let tree = tree_of([3, 1, 2]);
    assert_eq!(tree.traverse(), vec![(2, Black), (1, Red), (3, Red)]);

    let tree = tree_of([1, 3, 2]);
    assert_eq!(tree.traverse(), vec![(2, Black), (1, Red), (3, Red)]);
}

#[test]
fn duplicate_insert_is_a_no_op() {
    let mut tree = tree_of([10, 5, 15, 3]);
    let before = tree.traverse();

    assert_eq!(tree.insert(5), Err(TreeError::DuplicateKey(5)));
    assert_eq!(tree.insert(10), Err(TreeError::DuplicateKey(10)));

    assert_eq!(tree.traverse(), before);
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.validate(), Ok(()));
}

#[test]
fn missing_delete_is_a_no_op() {
    let mut tree = tree_of(1..=10);
    let before = tree.traverse();

    assert_eq!(tree.delete(11), Err(TreeError::NotFound(11)));
    assert_eq!(tree.delete(0), Err(TreeError::NotFound(0)));
    assert_eq!(RbTree::new().delete(1), Err(TreeError::NotFound(1)));

    assert_eq!(tree.traverse(), before);
    assert_eq!(tree.len(), 10);
}

#[test]
fn simple_delete_test() {
    let mut t = tree_of([1, 2, 3]);

    t.delete(1).unwrap();
    assert!(!t.contains(1));
    assert!(t.contains(2));
    assert!(t.contains(3));

    t.delete(2).unwrap();
    assert!(!t.contains(2));
    assert!(t.contains(3));

    t.delete(3).unwrap();
    assert!(!t.contains(3));
    assert!(t.is_empty());
    assert_eq!(t.validate(), Ok(()));
}

#[test]
fn delete_odd_keys_of_fifty() {
    let mut tree = tree_of(1..=50);

    for key in (1..=50).step_by(2) {
        tree.delete(key).unwrap();
    }

    assert_eq!(keys(&tree), (2..=50).step_by(2).collect::<Vec<_>>());
    assert_eq!(tree.len(), 25);
    assert_eq!(tree.validate(), Ok(()));
}

#[test]
fn delete_odd_keys_of_eight() {
    let mut tree = tree_of(1..=8);

    for key in [1, 3, 5, 7] {
        tree.delete(key).unwrap();
        assert_eq!(tree.validate(), Ok(()));
    }

    assert_eq!(keys(&tree), vec![2, 4, 6, 8]);
    for key in [1, 3, 5, 7] {
        assert!(!tree.contains(key));
    }
}

#[test]
fn delete_with_red_sibling() {
    let mut tree =
        RbTree::from_preorder(vec![(2, Black), (1, Black), (4, Red), (3, Black), (5, Black)])
            .unwrap();

    tree.delete(1).unwrap();
    assert_eq!(
        tree.traverse(),
        vec![(4, Black), (2, Black), (3, Red), (5, Black)]
    );
}

#[test]
fn delete_with_red_near_nephew() {
    let mut tree = RbTree::from_preorder(vec![(2, Black), (1, Black), (4, Black), (3, Red)])
        .unwrap();

    tree.delete(1).unwrap();
    assert_eq!(tree.traverse(), vec![(3, Black), (2, Black), (4, Black)]);
}

#[test]
fn delete_with_red_far_nephew() {
    let mut tree = RbTree::from_preorder(vec![(2, Black), (1, Black), (3, Black), (4, Red)])
        .unwrap();
    tree.delete(1).unwrap();
    assert_eq!(tree.traverse(), vec![(3, Black), (2, Black), (4, Black)]);

    // mirror image
    let mut tree = RbTree::from_preorder(vec![(3, Black), (2, Black), (1, Red), (4, Black)])
        .unwrap();
    tree.delete(4).unwrap();
    assert_eq!(tree.traverse(), vec![(2, Black), (1, Black), (3, Black)]);
}

#[test]
fn delete_root_with_successor_as_right_child() {
    let mut tree = RbTree::from_preorder(vec![(2, Black), (1, Black), (3, Black)]).unwrap();

    tree.delete(2).unwrap();
    assert_eq!(tree.traverse(), vec![(3, Black), (1, Red)]);
    assert_sentinel_untouched(&tree);
}

#[test]
fn delete_root_with_deep_successor() {
    let mut tree =
        RbTree::from_preorder(vec![(2, Black), (1, Black), (4, Black), (3, Red), (5, Red)])
            .unwrap();

    tree.delete(2).unwrap();
    assert_eq!(
        tree.traverse(),
        vec![(3, Black), (1, Black), (4, Black), (5, Red)]
    );
}

#[test]
fn delete_everything_in_both_orders() {
    let mut tree = tree_of(0..200);
    for key in 0..200 {
        tree.delete(key).unwrap();
        assert!(!tree.contains(key));
    }
    assert!(tree.is_empty());

    let mut tree = tree_of(0..200);
    for key in (0..200).rev() {
        tree.delete(key).unwrap();
    }
    assert!(tree.is_empty());
    assert_sentinel_untouched(&tree);
}

#[test]
fn repeatedly_delete_root() {
    let mut tree = tree_of(0..100);
    while !tree.is_empty() {
        let root = tree.node(tree.root).key;
        tree.delete(root).unwrap();
        assert!(!tree.contains(root));
    }
    assert_eq!(tree.len(), 0);
}

#[test]
fn rotate_three_node_chain() {
    let mut tree = RbTree::new();
    let a = attach(&mut tree, NIL, Direction::Left, 1);
    let b = attach(&mut tree, a, Direction::Right, 2);
    let c = attach(&mut tree, b, Direction::Right, 3);

    tree.rotate(a, Direction::Left);
    assert_eq!(tree.root, b);
    assert_links(&tree, b, NIL, a, c);
    assert_links(&tree, a, b, NIL, NIL);
    assert_links(&tree, c, b, NIL, NIL);
    assert_sentinel_untouched(&tree);

    tree.rotate(b, Direction::Right);
    assert_eq!(tree.root, a);
    assert_links(&tree, a, NIL, NIL, b);
    assert_links(&tree, b, a, NIL, c);
    assert_links(&tree, c, b, NIL, NIL);
    assert_sentinel_untouched(&tree);
}

#[test]
fn rotate_left_leaning_chain() {
    let mut tree = RbTree::new();
    let c = attach(&mut tree, NIL, Direction::Left, 3);
    let b = attach(&mut tree, c, Direction::Left, 2);
    let a = attach(&mut tree, b, Direction::Left, 1);

    tree.rotate(c, Direction::Right);
    assert_eq!(tree.root, b);
    assert_links(&tree, b, NIL, a, c);
    assert_links(&tree, a, b, NIL, NIL);
    assert_links(&tree, c, b, NIL, NIL);
    assert_eq!(keys(&tree), vec![1, 2, 3]);
}

#[test]
fn rotate_moves_inner_subtree() {
    // 2 -> 6 -> {4, 7} hanging below 10, 4 moves over to 2.
    let mut tree = RbTree::new();
    let top = attach(&mut tree, NIL, Direction::Left, 10);
    let pivot = attach(&mut tree, top, Direction::Left, 2);
    let riser = attach(&mut tree, pivot, Direction::Right, 6);
    let inner = attach(&mut tree, riser, Direction::Left, 4);
    let outer = attach(&mut tree, riser, Direction::Right, 7);

    tree.rotate(pivot, Direction::Left);
    assert_eq!(tree.root, top);
    assert_links(&tree, top, NIL, riser, NIL);
    assert_links(&tree, riser, top, pivot, outer);
    assert_links(&tree, pivot, riser, NIL, inner);
    assert_links(&tree, inner, pivot, NIL, NIL);
    assert_eq!(keys(&tree), vec![2, 4, 6, 7, 10]);
    assert_sentinel_untouched(&tree);
}

#[test]
fn transplant_and_minimum() {
    let tree = tree_of(1..=15);
    assert_eq!(tree.node(tree.minimum(tree.root)).key, 1);

    let mut tree = tree_of([2, 1, 3]);
    let (one, two, three) = (tree.find(1), tree.find(2), tree.find(3));
    tree.transplant(two, three);
    assert_eq!(tree.root, three);
    assert_eq!(tree.node(three).parent, NIL);
    // the replaced node still points at its old subtree, only the slot moved.
    assert_eq!(tree.node(two).left, one);
}

#[test]
fn find_returns_sentinel_when_missing() {
    let tree = tree_of([4, 2, 6]);
    assert_eq!(tree.find(5), NIL);
    assert_ne!(tree.find(6), NIL);
    assert_eq!(RbTree::new().find(0), NIL);
}

#[test]
fn node_slots_are_reused() {
    let mut tree = tree_of(0..100);
    for key in 0..100 {
        tree.delete(key).unwrap();
    }
    assert_eq!(tree.pooled_nodes(), 100);

    for key in 100..150 {
        tree.insert(key).unwrap();
    }
    assert_eq!(tree.pooled_nodes(), 50);
    assert_eq!(tree.len(), 50);

    tree.clear();
    assert_eq!(tree.pooled_nodes(), 0);
    assert!(tree.is_empty());
    assert_eq!(tree.validate(), Ok(()));
}

#[test]
fn out_of_memory_leaves_tree_unchanged() {
    let mut tree = RbTree::with_config(Config::new().node_limit(3));
    for key in 1..=3 {
        tree.insert(key).unwrap();
    }
    let before = tree.traverse();

    assert_eq!(tree.insert(4), Err(TreeError::OutOfMemory));
    assert_eq!(tree.traverse(), before);
    assert!(!tree.contains(4));

    tree.delete(2).unwrap();
    assert_eq!(tree.insert(4), Ok(()));
}

#[test]
fn preorder_round_trip() {
    let mut tree = tree_of((0..300).map(|i| (i * 37) % 301));
    for key in (0..300).step_by(3) {
        let _ = tree.delete(key);
    }

    let copy = RbTree::from_preorder(tree.traverse()).unwrap();
    assert_eq!(copy.traverse(), tree.traverse());
    assert_eq!(copy.len(), tree.len());
}

#[test]
fn from_preorder_rejects_bad_input() {
    assert_eq!(
        RbTree::from_preorder(vec![(2, Black), (2, Red)]).err(),
        Some(LoadError::Tree(TreeError::DuplicateKey(2)))
    );
    // a duplicate off the current spine lands out of order.
    assert_eq!(
        RbTree::from_preorder(vec![(2, Black), (1, Red), (3, Red), (1, Red)]).err(),
        Some(LoadError::Violation(Violation::Order(1)))
    );
    // 2 lands in the right subtree of 5 although it is smaller.
    assert_eq!(
        RbTree::from_preorder(vec![
            (10, Black),
            (5, Red),
            (1, Black),
            (7, Black),
            (2, Red),
            (12, Black),
        ])
        .err(),
        Some(LoadError::Violation(Violation::Order(2)))
    );
    assert!(matches!(
        RbTree::from_preorder(vec![(1, Black), (2, Black)]),
        Err(LoadError::Violation(Violation::BlackHeight { .. }))
    ));
    assert!(matches!(
        RbTree::from_preorder(vec![(2, Black), (1, Red), (0, Red)]),
        Err(LoadError::Violation(Violation::RedRed { .. }))
    ));

    let limited = Config::new().node_limit(2);
    assert_eq!(
        RbTree::from_preorder_with_config(vec![(2, Black), (1, Red), (3, Red)], limited).err(),
        Some(LoadError::Tree(TreeError::OutOfMemory))
    );
}

#[test]
fn from_preorder_recolors_red_root() {
    let mut tree = RbTree::from_preorder(vec![(2, Red), (1, Black), (3, Black)]).unwrap();
    assert_eq!(tree.traverse(), vec![(2, Black), (1, Black), (3, Black)]);

    // the loaded tree is a regular tree afterwards.
    tree.insert(4).unwrap();
    tree.delete(1).unwrap();
    assert_eq!(keys(&tree), vec![2, 3, 4]);
}

#[test]
fn height_stays_logarithmic() {
    let mut tree = RbTree::new();
    for key in 0..2000 {
        tree.insert(key).unwrap();
        let bound = 2.0 * ((tree.len() + 1) as f64).log2();
        assert!(tree.height() as f64 <= bound, "height {} at {}", tree.height(), key);
    }
}

#[test]
fn debug_view() {
    let tree = tree_of([2, 1]);
    assert_eq!(
        format!("{:?}", tree),
        "[B] 2\n  [R] 1\n    [B] <nil>\n    [B] <nil>\n  [B] <nil>\n"
    );
}

#[test]
fn set_model_test() {
    use rand::seq::SliceRandom;
    use rand::thread_rng;

    let mut model = BTreeSet::new();
    let mut tree = RbTree::new();

    let mut inserts: Vec<Key> = (0..500).map(|i| i * 7 - 1000).collect();
    inserts.shuffle(&mut thread_rng());

    for &key in &inserts {
        model.insert(key);
        tree.insert(key).unwrap();
        assert_eq!(tree.len(), model.len());
    }
    assert!(tree.iter().eq(model.iter().copied()));

    let mut deletes = inserts.clone();
    deletes.shuffle(&mut thread_rng());

    for key in deletes {
        model.remove(&key);

        assert!(tree.contains(key));
        tree.delete(key).unwrap();
        assert!(!tree.contains(key));

        assert!(tree.iter().eq(model.iter().copied()));
    }
    assert_sentinel_untouched(&tree);
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Insert(Key),
        Delete(Key),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..64 as Key).prop_map(Op::Insert),
            (0..64 as Key).prop_map(Op::Delete),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn ops_match_model(ops in proptest::collection::vec(op(), 0..300)) {
            let mut model = BTreeSet::new();
            let mut tree = RbTree::new();

            for op in ops {
                let before = tree.traverse();
                let (result, accepted) = match op {
                    Op::Insert(key) => (tree.insert(key), model.insert(key)),
                    Op::Delete(key) => (tree.delete(key), model.remove(&key)),
                };

                prop_assert_eq!(result.is_ok(), accepted);
                if !accepted {
                    prop_assert_eq!(tree.traverse(), before);
                }
                prop_assert_eq!(tree.validate(), Ok(()));
                prop_assert!(tree.iter().eq(model.iter().copied()));

                let bound = 2.0 * ((tree.len() + 1) as f64).log2();
                prop_assert!(tree.height() as f64 <= bound);
            }
        }

        #[test]
        fn membership_after_deletes(
            inserts in proptest::collection::btree_set(-1000..1000 as Key, 0..200),
            picks in proptest::collection::vec(any::<prop::sample::Index>(), 0..100),
        ) {
            let inserts: Vec<Key> = inserts.into_iter().collect();
            let mut tree = RbTree::new();
            for &key in &inserts {
                tree.insert(key).unwrap();
            }

            let mut deleted = BTreeSet::new();
            if !inserts.is_empty() {
                for pick in picks {
                    let key = inserts[pick.index(inserts.len())];
                    if deleted.insert(key) {
                        prop_assert_eq!(tree.delete(key), Ok(()));
                    }
                }
            }

            for key in -1000..1000 {
                let expected = inserts.binary_search(&key).is_ok() && !deleted.contains(&key);
                prop_assert_eq!(tree.contains(key), expected);
            }
            prop_assert_eq!(tree.len(), inserts.len() - deleted.len());
        }
    }
}
