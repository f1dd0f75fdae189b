use std::cell::UnsafeCell;
use std::sync::atomic::AtomicPtr;

use crate::mapping::NodeMapping;
use crate::mapping::direct_mapping::DirectMapping;
use crate::mapping::indexed_mapping::IndexedMapping;
use crate::mapping::keyed_mapping::KeyedMapping;
use crate::partial::Prefix;
use crate::utils::optimistic_lock::OptimisticVersion;

/// Edge byte for children whose key ends at the owning node. User keys must
/// not contain this byte.
pub(crate) const TERMINATOR: u8 = 0xFF;

/// A tree node: a version word for optimistic lock coupling plus the
/// payload. The payload is read without synchronization and every decision
/// derived from it is validated against the version word before being acted
/// on; mutation requires holding the write lock.
///
/// A published node's kind never changes in place: leaves stay leaves and
/// inner nodes stay inner. Replacing a node with a different kind or a wider
/// fan-out goes through the parent's child slot.
pub(crate) struct Node<V> {
    pub(crate) version: OptimisticVersion,
    inner: UnsafeCell<NodeInner<V>>,
}

pub(crate) enum NodeInner<V> {
    Leaf(Leaf<V>),
    Inner(InnerNode<V>),
}

/// One key binding. The full key is kept so a lookup can do its final
/// equality check without reconstructing the path.
pub(crate) struct Leaf<V> {
    pub(crate) key: Box<[u8]>,
    pub(crate) value: V,
}

pub(crate) struct InnerNode<V> {
    pub(crate) prefix: Prefix,
    pub(crate) children: Children<V>,
}

/// The four fan-out classes. Grows only ever widen:
/// Node4 → Node16 → Node48 → Node256.
pub(crate) enum Children<V> {
    Node4(KeyedMapping<V, 4>),
    Node16(KeyedMapping<V, 16>),
    Node48(IndexedMapping<V>),
    Node256(DirectMapping<V>),
}

impl<V> Node<V> {
    pub(crate) fn new_leaf(key: &[u8], value: V) -> *mut Node<V> {
        Box::into_raw(Box::new(Node {
            version: OptimisticVersion::new(),
            inner: UnsafeCell::new(NodeInner::Leaf(Leaf {
                key: Box::from(key),
                value,
            })),
        }))
    }

    pub(crate) fn new_node4(prefix: Prefix) -> *mut Node<V> {
        Self::new_inner(prefix, Children::Node4(KeyedMapping::new()))
    }

    pub(crate) fn new_inner(prefix: Prefix, children: Children<V>) -> *mut Node<V> {
        Box::into_raw(Box::new(Node {
            version: OptimisticVersion::new(),
            inner: UnsafeCell::new(NodeInner::Inner(InnerNode { prefix, children })),
        }))
    }

    /// Optimistic read access. The caller must validate the node's version
    /// before acting on anything derived from the result.
    pub(crate) unsafe fn read(&self) -> &NodeInner<V> {
        unsafe { &*self.inner.get() }
    }

    /// Mutable access. The caller must hold the node's write lock, or have
    /// exclusive access to a node not yet published to the tree.
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn write(&self) -> &mut NodeInner<V> {
        unsafe { &mut *self.inner.get() }
    }

    /// Reclaim a leaf that was never published, returning its value.
    pub(crate) unsafe fn into_leaf_value(ptr: *mut Node<V>) -> V {
        let node = unsafe { Box::from_raw(ptr) };
        match node.inner.into_inner() {
            NodeInner::Leaf(leaf) => leaf.value,
            NodeInner::Inner(_) => unreachable!("not a leaf"),
        }
    }

    /// Free a single node without touching its children.
    pub(crate) unsafe fn dealloc(ptr: *mut Node<V>) {
        drop(unsafe { Box::from_raw(ptr) });
    }

    /// Free a whole subtree. Only sound when no operation is in flight.
    pub(crate) unsafe fn dealloc_subtree(ptr: *mut Node<V>) {
        let node = unsafe { Box::from_raw(ptr) };
        if let NodeInner::Inner(inner) = node.inner.into_inner() {
            for (_, child) in inner.children.iter() {
                unsafe { Self::dealloc_subtree(child) };
            }
        }
    }
}

impl<V> NodeInner<V> {
    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, NodeInner::Leaf(_))
    }
}

impl<V> Children<V> {
    #[inline]
    pub(crate) fn seek_child(&self, key: u8) -> Option<&AtomicPtr<Node<V>>> {
        match self {
            Children::Node4(km) => km.seek_child(key),
            Children::Node16(km) => km.seek_child(key),
            Children::Node48(im) => im.seek_child(key),
            Children::Node256(dm) => dm.seek_child(key),
        }
    }

    pub(crate) fn add_child(&mut self, key: u8, child: *mut Node<V>) {
        match self {
            Children::Node4(km) => km.add_child(key, child),
            Children::Node16(km) => km.add_child(key, child),
            Children::Node48(im) => im.add_child(key, child),
            Children::Node256(dm) => dm.add_child(key, child),
        }
    }

    pub(crate) fn num_children(&self) -> usize {
        match self {
            Children::Node4(km) => km.num_children(),
            Children::Node16(km) => km.num_children(),
            Children::Node48(im) => im.num_children(),
            Children::Node256(dm) => dm.num_children(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        match self {
            Children::Node4(_) => 4,
            Children::Node16(_) => 16,
            Children::Node48(_) => 48,
            Children::Node256(_) => 256,
        }
    }

    pub(crate) fn is_full(&self) -> bool {
        match self {
            Children::Node4(km) => km.num_children() >= km.width(),
            Children::Node16(km) => km.num_children() >= km.width(),
            Children::Node48(im) => im.num_children() >= im.width(),
            // A node256 has a slot for every possible edge byte.
            Children::Node256(_) => false,
        }
    }

    /// The next wider representation, holding the same children. The
    /// receiver is left untouched; it goes obsolete along with its node.
    pub(crate) fn grow(&self) -> Children<V> {
        match self {
            Children::Node4(km) => Children::Node16(KeyedMapping::from_resized_grow(km)),
            Children::Node16(km) => Children::Node48(IndexedMapping::from_keyed(km)),
            Children::Node48(im) => Children::Node256(DirectMapping::from_indexed(im)),
            Children::Node256(_) => unreachable!("a node256 cannot grow"),
        }
    }

    pub(crate) fn iter(&self) -> Box<dyn Iterator<Item = (u8, *mut Node<V>)> + '_> {
        match self {
            Children::Node4(km) => Box::new(km.iter()),
            Children::Node16(km) => Box::new(km.iter()),
            Children::Node48(im) => Box::new(im.iter()),
            Children::Node256(dm) => Box::new(dm.iter()),
        }
    }
}
