use std::collections::BTreeMap;

use cairn_store::{ReadView, Store, StoreOptions, StoreIterator};

fn open() -> Store {
    Store::open(StoreOptions { cache_size: 64 }).unwrap()
}

fn forward_scan(mut it: StoreIterator) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut out = Vec::new();
    let mut ok = it.seek_to_first();
    while ok {
        out.push((it.key().unwrap().to_vec(), it.value().unwrap().to_vec()));
        ok = it.next();
    }
    out
}

fn reverse_scan(mut it: StoreIterator) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut out = Vec::new();
    let mut ok = it.seek_to_last();
    while ok {
        out.push((it.key().unwrap().to_vec(), it.value().unwrap().to_vec()));
        ok = it.prev();
    }
    out
}

#[test]
fn test_committed_scan_equals_pre_commit_transaction_scan() {
    let store = open();
    store.put(b"base1", b"a");
    store.put(b"base2", b"b");
    store.put(b"gone", b"c");

    let mut txn = store.new_transaction();
    txn.put(b"added", b"d");
    txn.put(b"base2", b"overwritten");
    txn.delete(b"gone");

    let pre_commit = forward_scan(txn.iter());
    let mut pre_commit_reverse = reverse_scan(txn.iter());
    pre_commit_reverse.reverse();
    assert_eq!(pre_commit, pre_commit_reverse);

    txn.commit();
    assert_eq!(forward_scan(store.iter()), pre_commit);
}

#[test]
fn test_abandon_leaves_full_scan_identical() {
    let store = open();
    store.put(b"k1", b"v1");
    store.put(b"k2", b"v2");
    let before = forward_scan(store.iter());

    let mut txn = store.new_transaction();
    txn.put(b"k1", b"changed");
    txn.put(b"k3", b"new");
    txn.delete(b"k2");
    txn.abandon();

    assert_eq!(forward_scan(store.iter()), before);
}

#[test]
fn test_snapshot_never_observes_later_writes() {
    let store = open();
    store.put(b"k", b"v1");
    let snap = store.new_snapshot();
    store.put(b"k", b"v2");
    assert_eq!(snap.get(b"k"), Some(b"v1".to_vec()));
    assert_eq!(store.get(b"k"), Some(b"v2".to_vec()));
    assert_eq!(forward_scan(snap.iter()), vec![(b"k".to_vec(), b"v1".to_vec())]);
}

#[test]
fn test_randomized_merge_matches_model() {
    fastrand::seed(0x5eed);

    for _ in 0..50 {
        let store = open();
        let mut model: BTreeMap<Vec<u8>, Vec<u8>> = BTreeMap::new();

        // Seed the base store.
        for _ in 0..fastrand::usize(0..40) {
            let key = format!("k{:03}", fastrand::u32(0..60)).into_bytes();
            let value = format!("b{}", fastrand::u32(..)).into_bytes();
            store.put(&key, &value);
            model.insert(key, value);
        }

        // Random mutations inside a transaction.
        let mut txn = store.new_transaction();
        for _ in 0..fastrand::usize(0..40) {
            let key = format!("k{:03}", fastrand::u32(0..60)).into_bytes();
            if fastrand::bool() {
                let value = format!("t{}", fastrand::u32(..)).into_bytes();
                txn.put(&key, &value);
                model.insert(key, value);
            } else {
                txn.delete(&key);
                model.remove(&key);
            }
        }

        let expected: Vec<(Vec<u8>, Vec<u8>)> =
            model.iter().map(|(k, v)| (k.clone(), v.clone())).collect();

        // Pre-commit merged scans equal the model, forward and reverse.
        assert_eq!(forward_scan(txn.iter()), expected);
        let mut reversed = reverse_scan(txn.iter());
        reversed.reverse();
        assert_eq!(reversed, expected);

        // Random point reads agree with the model.
        for _ in 0..20 {
            let key = format!("k{:03}", fastrand::u32(0..60)).into_bytes();
            assert_eq!(txn.get(&key), model.get(&key).cloned());
        }

        // Post-commit base scans equal the model.
        txn.commit();
        assert_eq!(forward_scan(store.iter()), expected);
    }
}

#[test]
fn test_randomized_direction_reversal() {
    fastrand::seed(0xfeed);

    let store = open();
    for i in 0..30 {
        store.put(format!("base{i:02}").as_bytes(), b"v");
    }
    let mut txn = store.new_transaction();
    for i in 0..30 {
        if i % 3 == 0 {
            txn.delete(format!("base{i:02}").as_bytes());
        }
        if i % 4 == 0 {
            txn.put(format!("ovl{i:02}").as_bytes(), b"v");
        }
    }

    // Random walk: reversing direction from any valid position must return
    // to the key observed immediately before the reversal.
    let mut it = txn.iter();
    assert!(it.seek_to_first());
    for _ in 0..200 {
        let here = it.key().unwrap().to_vec();
        if fastrand::bool() {
            if it.next() {
                assert!(it.prev());
                assert_eq!(it.key().unwrap(), &here[..]);
            } else {
                // Walked off the end; reversing lands on the last key.
                assert!(it.prev());
                assert_eq!(it.key().unwrap(), &here[..]);
            }
        } else if it.prev() {
            assert!(it.next());
            assert_eq!(it.key().unwrap(), &here[..]);
        } else {
            assert!(it.next());
            assert_eq!(it.key().unwrap(), &here[..]);
        }
    }
}

#[test]
fn test_concurrent_transactions_are_independent_until_commit() {
    let store = open();
    let mut a = store.new_transaction();
    let mut b = store.new_transaction();

    a.put(b"k", b"from-a");
    b.put(b"k", b"from-b");
    assert_eq!(a.get(b"k"), Some(b"from-a".to_vec()));
    assert_eq!(b.get(b"k"), Some(b"from-b".to_vec()));

    a.commit();
    // b still reads its own overlay, and its commit wins afterwards.
    assert_eq!(b.get(b"k"), Some(b"from-b".to_vec()));
    b.commit();
    assert_eq!(store.get(b"k"), Some(b"from-b".to_vec()));
}
