//! The concurrent Adaptive Radix Tree.
//!
//! Traversals use optimistic lock coupling: readers never lock, writers take
//! short per-node write locks via CAS on the node's version word, and any
//! operation that observes a concurrent mutation abandons its traversal and
//! re-enters from the root.

use std::cmp::min;
use std::ptr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicPtr, AtomicU64, Ordering};

use crate::node::{Node, NodeInner, TERMINATOR};
use crate::partial::Prefix;
use crate::stats::{TreeStats, record_inner_node};
use crate::utils::optimistic_lock::Restart;

/// An Adaptive Radix Tree (ART) shared between any number of threads.
///
/// Keys are arbitrary byte strings **not containing `0xFF`** (that byte is
/// reserved internally to mark "key ends here" edges); values are a uniform
/// type `V`. `insert` is an upsert and `search` is a point lookup; both may
/// be called concurrently from any number of threads with no external
/// synchronization.
///
/// ## Concurrency
///
/// Every node carries a 64-bit version word combining a counter, a write
/// lock bit and an obsolete bit. Readers capture the version, traverse
/// optimistically and validate the word after every decision they derive
/// from shared state; writers CAS the lock bit in and bump the counter on
/// release. A node replaced by a wider copy is marked obsolete so readers
/// still holding it restart instead of trusting detached state. Per-key
/// operations are linearizable.
///
/// ## Examples
///
/// ```rust
/// use cart::ConcurrentAdaptiveRadixTree;
///
/// let tree = ConcurrentAdaptiveRadixTree::<i32>::new();
/// tree.insert("apple", 1);
/// tree.insert("application", 2);
///
/// assert_eq!(tree.search("apple"), Some(1));
/// assert_eq!(tree.search("app"), None);
///
/// // Upsert: the last write wins.
/// tree.insert("apple", 3);
/// assert_eq!(tree.search("apple"), Some(3));
/// ```
pub struct ConcurrentAdaptiveRadixTree<V> {
    root: AtomicPtr<Node<V>>,
    /// Nodes detached by growth. They stay allocated until the tree drops so
    /// that readers still traversing them only ever dereference live memory.
    retired: Mutex<Vec<*mut Node<V>>>,
    restarts: AtomicU64,
}

unsafe impl<V: Send> Send for ConcurrentAdaptiveRadixTree<V> {}
unsafe impl<V: Send + Sync> Sync for ConcurrentAdaptiveRadixTree<V> {}

impl<V> Default for ConcurrentAdaptiveRadixTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// The node a traversal descended from, with the version captured when it
/// was read. An empty handle (above the root) locks and validates trivially.
type ParentHandle<'a, V> = Option<(&'a Node<V>, u64)>;

fn validate_parent<V>(parent: &ParentHandle<'_, V>) -> Result<(), Restart> {
    match parent {
        Some((node, version)) => node.version.validate(*version),
        None => Ok(()),
    }
}

fn lock_parent<V>(parent: &ParentHandle<'_, V>) -> Result<(), Restart> {
    match parent {
        Some((node, version)) => node.version.upgrade_to_write_lock(*version),
        None => Ok(()),
    }
}

fn unlock_parent<V>(parent: &ParentHandle<'_, V>) {
    if let Some((node, _)) = parent {
        node.version.write_unlock();
    }
}

/// The edge byte for `key` at `depth`; the terminator once the key is
/// exhausted.
#[inline(always)]
fn edge_byte(key: &[u8], depth: usize) -> u8 {
    if depth >= key.len() {
        TERMINATOR
    } else {
        key[depth]
    }
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    let len = min(a.len(), b.len());
    let mut idx = 0;
    while idx < len && a[idx] == b[idx] {
        idx += 1;
    }
    idx
}

fn take_value<V>(value: &mut Option<V>) -> V {
    value.take().expect("insert value consumed twice")
}

impl<V> ConcurrentAdaptiveRadixTree<V> {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            root: AtomicPtr::new(ptr::null_mut()),
            retired: Mutex::new(Vec::new()),
            restarts: AtomicU64::new(0),
        }
    }

    /// Insert a key-value pair, overwriting any previous value for the key.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if the key contains `0xFF`.
    pub fn insert(&self, key: impl AsRef<[u8]>, value: V) {
        let key = key.as_ref();
        debug_assert!(
            !key.contains(&TERMINATOR),
            "keys must not contain the 0xff terminator byte"
        );
        let mut value = Some(value);
        while let Err(Restart) = self.insert_attempt(key, &mut value) {
            self.restarts.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Look up a key, returning a copy of its value.
    pub fn search(&self, key: impl AsRef<[u8]>) -> Option<V>
    where
        V: Clone,
    {
        let key = key.as_ref();
        loop {
            match self.search_attempt(key) {
                Ok(result) => return result,
                Err(Restart) => {
                    self.restarts.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }

    /// Whether the tree currently holds no keys.
    pub fn is_empty(&self) -> bool {
        self.root.load(Ordering::Acquire).is_null()
    }

    /// The number of traversal restarts absorbed so far. Restarts are not
    /// failures; under contention an operation may observe a concurrent
    /// mutation and re-run from the root.
    pub fn restarts(&self) -> u64 {
        self.restarts.load(Ordering::Relaxed)
    }

    /// Structural statistics. Takes `&mut self` because the numbers are only
    /// meaningful for a quiescent tree.
    pub fn stats(&mut self) -> TreeStats {
        let mut stats = TreeStats {
            restarts: *self.restarts.get_mut(),
            ..TreeStats::default()
        };
        let root = *self.root.get_mut();
        if !root.is_null() {
            unsafe { Self::stats_recurse(root, &mut stats, 1) };
        }

        let total_inner_nodes = stats
            .node_stats
            .values()
            .map(|ns| ns.total_nodes)
            .sum::<usize>();
        let mut total_children = 0;
        let mut total_width = 0;
        for ns in stats.node_stats.values_mut() {
            total_children += ns.total_children;
            total_width += ns.width * ns.total_nodes;
            ns.density = ns.total_children as f64 / (ns.width * ns.total_nodes) as f64;
        }
        stats.num_inner_nodes = total_inner_nodes;
        if total_width > 0 {
            stats.total_density = total_children as f64 / total_width as f64;
        }
        stats
    }

    fn search_attempt(&self, key: &[u8]) -> Result<Option<V>, Restart>
    where
        V: Clone,
    {
        let mut parent: ParentHandle<'_, V> = None;
        let mut depth = 0usize;
        let mut slot: &AtomicPtr<Node<V>> = &self.root;

        loop {
            let node_ptr = slot.load(Ordering::Acquire);
            if node_ptr.is_null() {
                return Ok(None);
            }
            let node: &Node<V> = unsafe { &*node_ptr };
            let version = node.version.read_lock()?;
            validate_parent(&parent)?;

            match unsafe { node.read() } {
                NodeInner::Leaf(leaf) => {
                    let result = (leaf.key.as_ref() == key).then(|| leaf.value.clone());
                    node.version.validate(version)?;
                    return Ok(result);
                }
                NodeInner::Inner(inner) => {
                    let matched = inner.prefix.match_len(key, depth);
                    if matched != inner.prefix.len() {
                        node.version.validate(version)?;
                        return Ok(None);
                    }
                    depth += inner.prefix.len();
                    let child = inner.children.seek_child(edge_byte(key, depth));
                    node.version.validate(version)?;
                    let Some(child_slot) = child else {
                        return Ok(None);
                    };
                    parent = Some((node, version));
                    slot = child_slot;
                    depth += 1;
                }
            }
        }
    }

    fn insert_attempt(&self, key: &[u8], value: &mut Option<V>) -> Result<(), Restart> {
        let mut parent: ParentHandle<'_, V> = None;
        let mut depth = 0usize;
        let mut slot: &AtomicPtr<Node<V>> = &self.root;

        loop {
            let node_ptr = slot.load(Ordering::Acquire);
            if node_ptr.is_null() {
                // Empty tree. The transition to a rooted tree is a single
                // compare-exchange; the losing writer restarts.
                debug_assert!(parent.is_none());
                let leaf = Node::new_leaf(key, take_value(value));
                return match slot.compare_exchange(
                    ptr::null_mut(),
                    leaf,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                ) {
                    Ok(_) => Ok(()),
                    Err(_) => {
                        *value = Some(unsafe { Node::into_leaf_value(leaf) });
                        Err(Restart)
                    }
                };
            }

            let node: &Node<V> = unsafe { &*node_ptr };
            let version = node.version.read_lock()?;
            validate_parent(&parent)?;

            if unsafe { node.read() }.is_leaf() {
                lock_parent(&parent)?;
                if let Err(restart) = node.version.upgrade_to_write_lock(version) {
                    unlock_parent(&parent);
                    return Err(restart);
                }
                let NodeInner::Leaf(leaf) = (unsafe { node.write() }) else {
                    unreachable!()
                };
                if leaf.key.as_ref() == key {
                    // Upsert under the leaf's lock; readers see the old
                    // value before it or the new value after the version
                    // bump, never a torn one.
                    leaf.value = take_value(value);
                    unlock_parent(&parent);
                    node.version.write_unlock();
                    return Ok(());
                }

                // Two distinct keys: branch on the first byte past their
                // common prefix, with the old leaf and the new one as
                // siblings.
                debug_assert!(depth <= key.len() && depth <= leaf.key.len());
                let common = common_prefix_len(&key[depth..], &leaf.key[depth..]);
                let split_depth = depth + common;
                let branch = Node::new_node4(Prefix::from_slice(&key[depth..split_depth]));
                {
                    let NodeInner::Inner(b) = (unsafe { (*branch).write() }) else {
                        unreachable!()
                    };
                    b.children
                        .add_child(edge_byte(&leaf.key, split_depth), node_ptr);
                    b.children.add_child(
                        edge_byte(key, split_depth),
                        Node::new_leaf(key, take_value(value)),
                    );
                }
                slot.store(branch, Ordering::Release);
                unlock_parent(&parent);
                node.version.write_unlock();
                return Ok(());
            }

            let (prefix_len, matched) = {
                let NodeInner::Inner(inner) = (unsafe { node.read() }) else {
                    unreachable!()
                };
                (inner.prefix.len(), inner.prefix.match_len(key, depth))
            };
            node.version.validate(version)?;

            if matched != prefix_len {
                // The key diverges inside this node's prefix. Split it: the
                // shared bytes move to a fresh branch node, the byte at the
                // divergence becomes the edge down to this node, and this
                // node keeps what follows it.
                lock_parent(&parent)?;
                if let Err(restart) = node.version.upgrade_to_write_lock(version) {
                    unlock_parent(&parent);
                    return Err(restart);
                }
                let NodeInner::Inner(inner) = (unsafe { node.write() }) else {
                    unreachable!()
                };
                let split_depth = depth + matched;
                let branch = Node::new_node4(inner.prefix.before(matched));
                {
                    let NodeInner::Inner(b) = (unsafe { (*branch).write() }) else {
                        unreachable!()
                    };
                    b.children.add_child(
                        edge_byte(key, split_depth),
                        Node::new_leaf(key, take_value(value)),
                    );
                    b.children.add_child(inner.prefix.at(matched), node_ptr);
                }
                inner.prefix = inner.prefix.after(matched + 1);
                slot.store(branch, Ordering::Release);
                unlock_parent(&parent);
                node.version.write_unlock();
                return Ok(());
            }

            depth += prefix_len;
            let byte = edge_byte(key, depth);
            let child = {
                let NodeInner::Inner(inner) = (unsafe { node.read() }) else {
                    unreachable!()
                };
                inner.children.seek_child(byte)
            };
            node.version.validate(version)?;

            let Some(child_slot) = child else {
                // No edge for this byte yet; attach a new leaf, growing the
                // node first if its fan-out class is exhausted.
                lock_parent(&parent)?;
                if let Err(restart) = node.version.upgrade_to_write_lock(version) {
                    unlock_parent(&parent);
                    return Err(restart);
                }
                let NodeInner::Inner(inner) = (unsafe { node.write() }) else {
                    unreachable!()
                };
                let leaf = Node::new_leaf(key, take_value(value));
                if inner.children.is_full() {
                    // Build the wider replacement completely, swing the
                    // parent slot, then retire this node. Readers that
                    // still hold it observe the obsolete bit and restart.
                    let grown = Node::new_inner(inner.prefix.clone(), inner.children.grow());
                    {
                        let NodeInner::Inner(g) = (unsafe { (*grown).write() }) else {
                            unreachable!()
                        };
                        g.children.add_child(byte, leaf);
                    }
                    slot.store(grown, Ordering::Release);
                    unlock_parent(&parent);
                    node.version.write_unlock_obsolete();
                    self.retire(node_ptr);
                } else {
                    inner.children.add_child(byte, leaf);
                    unlock_parent(&parent);
                    node.version.write_unlock();
                }
                return Ok(());
            };

            // Re-check before committing the descent, closing the window in
            // which a writer could have detached this subtree.
            node.version.validate(version)?;
            parent = Some((node, version));
            slot = child_slot;
            depth += 1;
        }
    }

    fn retire(&self, ptr: *mut Node<V>) {
        self.retired
            .lock()
            .expect("retired list poisoned")
            .push(ptr);
    }

    unsafe fn stats_recurse(ptr: *mut Node<V>, stats: &mut TreeStats, height: usize) {
        if height > stats.max_height {
            stats.max_height = height;
        }
        match unsafe { (*ptr).read() } {
            NodeInner::Leaf(_) => {
                stats.num_leaves += 1;
            }
            NodeInner::Inner(inner) => {
                record_inner_node(stats, inner.children.capacity(), inner.children.num_children());
                for (_, child) in inner.children.iter() {
                    unsafe { Self::stats_recurse(child, stats, height + 1) };
                }
            }
        }
    }
}

impl<V> Drop for ConcurrentAdaptiveRadixTree<V> {
    fn drop(&mut self) {
        let root = *self.root.get_mut();
        if !root.is_null() {
            unsafe { Node::dealloc_subtree(root) };
        }
        // Retired nodes still point at children owned by the live tree;
        // free the shells only.
        if let Ok(retired) = self.retired.get_mut() {
            for ptr in retired.drain(..) {
                unsafe { Node::dealloc(ptr) };
            }
        }
    }
}

#[cfg(test)]
impl<V> ConcurrentAdaptiveRadixTree<V> {
    /// Quiescent structural check: every inner node has at least two
    /// children, every leaf's key agrees with the path leading to it, and no
    /// key is stored twice.
    fn assert_structure(&mut self) {
        let root = *self.root.get_mut();
        if root.is_null() {
            return;
        }
        let mut keys = Vec::new();
        unsafe { Self::check_node(root, Vec::new(), &mut keys) };
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(total, keys.len(), "a key is stored in more than one leaf");
    }

    unsafe fn check_node(ptr: *mut Node<V>, path: Vec<u8>, keys: &mut Vec<Vec<u8>>) {
        match unsafe { (*ptr).read() } {
            NodeInner::Leaf(leaf) => {
                assert!(
                    leaf.key.starts_with(&path),
                    "leaf key {:?} does not extend its path {:?}",
                    leaf.key,
                    path
                );
                keys.push(leaf.key.to_vec());
            }
            NodeInner::Inner(inner) => {
                assert!(
                    inner.children.num_children() >= 2,
                    "inner node with fewer than two children"
                );
                let mut base = path;
                base.extend_from_slice(inner.prefix.as_slice());
                for (byte, child) in inner.children.iter() {
                    if byte == TERMINATOR {
                        let NodeInner::Leaf(leaf) = (unsafe { (*child).read() }) else {
                            panic!("terminator edge must point at a leaf");
                        };
                        assert_eq!(
                            leaf.key.as_ref(),
                            &base[..],
                            "terminator leaf key disagrees with its path"
                        );
                        keys.push(leaf.key.to_vec());
                        continue;
                    }
                    let mut child_path = base.clone();
                    child_path.push(byte);
                    unsafe { Self::check_node(child, child_path, keys) };
                }
            }
        }
    }

    /// The root's prefix bytes and sorted edge bytes, when it is an inner
    /// node.
    fn root_shape(&mut self) -> Option<(Vec<u8>, Vec<u8>)> {
        let root = *self.root.get_mut();
        if root.is_null() {
            return None;
        }
        match unsafe { (*root).read() } {
            NodeInner::Leaf(_) => None,
            NodeInner::Inner(inner) => {
                let mut edges: Vec<u8> = inner.children.iter().map(|(byte, _)| byte).collect();
                edges.sort_unstable();
                Some((inner.prefix.as_slice().to_vec(), edges))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::seq::SliceRandom;
    use rand::{Rng, rng};

    use crate::tree::ConcurrentAdaptiveRadixTree;

    #[test]
    fn test_root_set_get() {
        let tree = ConcurrentAdaptiveRadixTree::<i32>::new();
        assert!(tree.is_empty());
        tree.insert("abc", 1);
        assert!(!tree.is_empty());
        assert_eq!(tree.search("abc"), Some(1));
    }

    #[test]
    fn test_basic_insert_and_search() {
        let tree = ConcurrentAdaptiveRadixTree::<String>::new();
        tree.insert("hello", "world".to_string());
        assert_eq!(tree.search("hello"), Some("world".to_string()));
        assert_eq!(tree.search("goodbye"), None);
    }

    #[test]
    fn test_shared_prefix_family() {
        let mut tree = ConcurrentAdaptiveRadixTree::<i32>::new();
        tree.insert("test", 1);
        tree.insert("testing", 2);
        tree.insert("tester", 3);
        tree.insert("tea", 4);
        tree.insert("team", 5);

        assert_eq!(tree.search("test"), Some(1));
        assert_eq!(tree.search("testing"), Some(2));
        assert_eq!(tree.search("tester"), Some(3));
        assert_eq!(tree.search("tea"), Some(4));
        assert_eq!(tree.search("team"), Some(5));
        assert_eq!(tree.search("te"), None);
        assert_eq!(tree.search("teams"), None);

        // The root compresses the shared "te" and branches on 'a'/'s'.
        let (prefix, edges) = tree.root_shape().unwrap();
        assert_eq!(prefix, b"te");
        assert_eq!(edges, vec![b'a', b's']);
        tree.assert_structure();
    }

    #[test]
    fn test_empty_and_nul_keys() {
        let mut tree = ConcurrentAdaptiveRadixTree::<String>::new();
        tree.insert("", "empty".to_string());
        assert_eq!(tree.search(""), Some("empty".to_string()));

        tree.insert([0u8], "zero".to_string());
        assert_eq!(tree.search(""), Some("empty".to_string()));
        assert_eq!(tree.search([0u8]), Some("zero".to_string()));
        assert_eq!(tree.search([0u8, 0u8]), None);
        tree.assert_structure();
    }

    #[test]
    fn test_key_prefix_of_another() {
        let mut tree = ConcurrentAdaptiveRadixTree::<i32>::new();
        tree.insert("testing", 2);
        tree.insert("test", 1);
        assert_eq!(tree.search("test"), Some(1));
        assert_eq!(tree.search("testing"), Some(2));
        assert_eq!(tree.search("tes"), None);
        assert_eq!(tree.search("testin"), None);
        tree.assert_structure();
    }

    #[test]
    fn test_overwrite_returns_latest() {
        let tree = ConcurrentAdaptiveRadixTree::<i32>::new();
        tree.insert("key1", 100);
        assert_eq!(tree.search("key1"), Some(100));
        tree.insert("key1", 200);
        assert_eq!(tree.search("key1"), Some(200));
        tree.insert("key1", 300);
        assert_eq!(tree.search("key1"), Some(300));
        tree.insert("key2", 400);
        assert_eq!(tree.search("key1"), Some(300));
        assert_eq!(tree.search("key2"), Some(400));
    }

    #[test]
    fn test_keys_differing_only_in_final_byte() {
        let mut tree = ConcurrentAdaptiveRadixTree::<u8>::new();
        for b in b'a'..=b'z' {
            let mut key = b"shared_stem_".to_vec();
            key.push(b);
            tree.insert(key, b);
        }
        for b in b'a'..=b'z' {
            let mut key = b"shared_stem_".to_vec();
            key.push(b);
            assert_eq!(tree.search(key), Some(b));
        }
        tree.assert_structure();
    }

    #[test]
    fn test_numbered_keys() {
        let mut tree = ConcurrentAdaptiveRadixTree::<usize>::new();
        for i in 0..1000 {
            tree.insert(format!("key_{i:010}"), i);
        }
        for i in 0..1000 {
            assert_eq!(tree.search(format!("key_{i:010}")), Some(i));
        }
        assert_eq!(tree.search("key_9999999999"), None);
        let stats = tree.stats();
        assert_eq!(stats.num_leaves, 1000);
        assert!(stats.max_height > 1);
        tree.assert_structure();
    }

    #[test]
    fn test_growth_chain() {
        let mut tree = ConcurrentAdaptiveRadixTree::<u32>::new();
        // Single-byte keys spread over the byte range (0xff excluded) force
        // one node through every fan-out class.
        let bytes: Vec<u8> = (0..=0xFEu8).collect();
        for (i, &b) in bytes.iter().enumerate() {
            tree.insert([b], i as u32);
        }
        // The empty key rides on the terminator edge of the same node.
        tree.insert("", u32::MAX);

        {
            let stats = tree.stats();
            assert_eq!(stats.num_leaves, 256);
            assert!(stats.node_stats.contains_key(&256));
        }
        for (i, &b) in bytes.iter().enumerate() {
            assert_eq!(tree.search([b]), Some(i as u32));
        }
        assert_eq!(tree.search(""), Some(u32::MAX));
        tree.assert_structure();
    }

    #[test]
    fn test_growth_stops_at_each_class() {
        let mut tree = ConcurrentAdaptiveRadixTree::<u32>::new();
        for (count, expected_width) in [(5u8, 16usize), (17, 48), (49, 256)] {
            for b in 0..count {
                tree.insert([b], b as u32);
            }
            let stats = tree.stats();
            assert!(
                stats.node_stats.contains_key(&expected_width),
                "expected a node of width {expected_width} after {count} inserts"
            );
        }
    }

    #[test]
    fn test_long_common_prefix() {
        let mut tree = ConcurrentAdaptiveRadixTree::<&str>::new();
        let a1000 = "a".repeat(1000);
        let mut a999b = "a".repeat(999);
        a999b.push('b');

        tree.insert(&a1000, "A");
        tree.insert(&a999b, "B");

        assert_eq!(tree.search(&a1000), Some("A"));
        assert_eq!(tree.search(&a999b), Some("B"));
        assert_eq!(tree.search("a".repeat(999)), None);
        assert_eq!(tree.search("a".repeat(1001)), None);
        tree.assert_structure();
    }

    #[test]
    fn test_restart_counter_starts_at_zero() {
        let tree = ConcurrentAdaptiveRadixTree::<i32>::new();
        tree.insert("solo", 1);
        assert_eq!(tree.search("solo"), Some(1));
        // No contention, no restarts.
        assert_eq!(tree.restarts(), 0);
    }

    fn gen_random_string_keys(l1_prefix: usize, l2_prefix: usize, suffix: usize) -> Vec<String> {
        let mut keys = Vec::new();
        let chars: Vec<char> = ('a'..='z').collect();
        let mut rng = rng();
        for l1 in chars.iter() {
            let level1 = l1.to_string().repeat(l1_prefix);
            for l2 in chars.iter() {
                let level2 = l2.to_string().repeat(l2_prefix);
                for _ in 0..4 {
                    let tail: String = (0..suffix)
                        .map(|_| chars[rng.random_range(0..chars.len())])
                        .collect();
                    keys.push(format!("{level1}{level2}{tail}"));
                }
            }
        }
        keys.shuffle(&mut rng);
        keys
    }

    #[test]
    fn test_bulk_random_string_query() {
        let mut tree = ConcurrentAdaptiveRadixTree::<String>::new();
        let mut reference = BTreeMap::new();
        for key in gen_random_string_keys(3, 2, 3) {
            let value = format!("value-of-{key}");
            tree.insert(&key, value.clone());
            reference.insert(key, value);
        }
        for (key, value) in &reference {
            assert_eq!(tree.search(key).as_ref(), Some(value));
        }
        assert_eq!(tree.search("zzzzzz-not-there"), None);
        let stats = tree.stats();
        assert_eq!(stats.num_leaves, reference.len());
        tree.assert_structure();
    }

    #[test]
    fn test_random_numeric_insert_get() {
        let mut tree = ConcurrentAdaptiveRadixTree::<u64>::new();
        let mut reference = BTreeMap::new();
        let mut rng = rng();
        for _ in 0..20_000 {
            let n: u64 = rng.random_range(0..(1u64 << 40));
            let key = n.to_be_bytes();
            // 0xff can appear in raw integer bytes; skip those keys.
            if key.contains(&0xFF) {
                continue;
            }
            tree.insert(key, n);
            reference.insert(key.to_vec(), n);
        }
        for (key, value) in &reference {
            assert_eq!(tree.search(key), Some(*value));
        }
        tree.assert_structure();
    }

    #[test]
    fn test_stats_density() {
        let mut tree = ConcurrentAdaptiveRadixTree::<u32>::new();
        for b in 0..4u8 {
            tree.insert([b], b as u32);
        }
        let stats = tree.stats();
        let n4 = &stats.node_stats[&4];
        assert_eq!(n4.total_nodes, 1);
        assert_eq!(n4.total_children, 4);
        assert!((n4.density - 1.0).abs() < f64::EPSILON);
    }
}
