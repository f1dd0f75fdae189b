use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

use crate::mapping::NodeMapping;
use crate::mapping::keyed_mapping::KeyedMapping;
use crate::node::Node;

/// Marks an absent entry in the byte index. Distinct from every valid child
/// position (0..48).
const EMPTY: u8 = u8::MAX;

/// A mapping from edge bytes to child slots through a 256-entry index:
/// `child_index[b]` is either `EMPTY` or the position of the slot for `b`.
pub(crate) struct IndexedMapping<V> {
    pub(crate) child_index: [u8; 256],
    pub(crate) children: [AtomicPtr<Node<V>>; 48],
    pub(crate) num_children: u8,
}

impl<V> IndexedMapping<V> {
    pub(crate) fn new() -> Self {
        Self {
            child_index: [EMPTY; 256],
            children: std::array::from_fn(|_| AtomicPtr::new(ptr::null_mut())),
            num_children: 0,
        }
    }

    /// Widen from a keyed mapping, building the byte index from its key
    /// array.
    pub(crate) fn from_keyed<const WIDTH: usize>(km: &KeyedMapping<V, WIDTH>) -> Self {
        let mut im = IndexedMapping::new();
        for (key, child) in km.iter() {
            im.add_child(key, child);
        }
        im
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (u8, *mut Node<V>)> + '_ {
        (0..256usize).filter_map(move |byte| {
            let pos = self.child_index[byte];
            if pos == EMPTY {
                return None;
            }
            Some((byte as u8, self.children[pos as usize].load(Ordering::Relaxed)))
        })
    }
}

impl<V> NodeMapping<V, 48> for IndexedMapping<V> {
    fn add_child(&mut self, key: u8, child: *mut Node<V>) {
        let pos = self.num_children as usize;
        assert!(pos < 48, "add_child on a full node");
        debug_assert_eq!(self.child_index[key as usize], EMPTY);
        self.children[pos].store(child, Ordering::Release);
        self.child_index[key as usize] = pos as u8;
        self.num_children += 1;
    }

    fn seek_child(&self, key: u8) -> Option<&AtomicPtr<Node<V>>> {
        let pos = self.child_index[key as usize];
        if pos == EMPTY {
            return None;
        }
        Some(&self.children[pos as usize])
    }

    #[inline(always)]
    fn num_children(&self) -> usize {
        self.num_children as usize
    }
}
