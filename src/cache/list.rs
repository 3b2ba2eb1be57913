//! Fixed-capacity recency list backing the quote cache
//!
//! Nodes live in an arena and link to each other through stable [`NodeId`]
//! indices. Head is the most recently used node, tail the least recently
//! used. Slots freed by eviction are recycled, so the arena holds at most
//! `capacity + 1` slots.

/// Stable handle to a node in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

/// Doubly-linked recency list with tail eviction
#[derive(Debug)]
pub(crate) struct RecencyList<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
    capacity: usize,
}

impl<K, V> RecencyList<K, V> {
    /// `capacity` must be non-zero; the cache config validates this.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity + 1),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
            capacity,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn tail(&self) -> Option<NodeId> {
        self.tail
    }

    /// Link a new node as head.
    ///
    /// If that pushes the list over capacity, the previous tail is unlinked
    /// and its contents returned. The caller must drop any index entry that
    /// still points at the evicted key.
    pub(crate) fn add_head(&mut self, key: K, value: V) -> (NodeId, Option<(K, V)>) {
        let id = self.alloc(Node {
            key,
            value,
            prev: None,
            next: None,
        });
        self.link_front(id);

        if self.len <= self.capacity {
            return (id, None);
        }

        let evicted = match self.tail {
            Some(tail) => {
                self.unlink(tail);
                self.release(tail)
            }
            None => None,
        };
        (id, evicted)
    }

    /// Promote a node to head. No-op if it is already there.
    pub(crate) fn move_to_head(&mut self, id: NodeId) {
        if self.head == Some(id) || !self.contains(id) {
            return;
        }
        self.unlink(id);
        self.link_front(id);
    }

    pub(crate) fn value(&self, id: NodeId) -> Option<&V> {
        self.node(id).map(|node| &node.value)
    }

    pub(crate) fn value_mut(&mut self, id: NodeId) -> Option<&mut V> {
        self.node_mut(id).map(|node| &mut node.value)
    }

    pub(crate) fn key(&self, id: NodeId) -> Option<&K> {
        self.node(id).map(|node| &node.key)
    }

    /// Walk from head to tail
    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    fn node(&self, id: NodeId) -> Option<&Node<K, V>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<K, V>> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    fn release(&mut self, id: NodeId) -> Option<(K, V)> {
        let node = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        Some((node.key, node.value))
    }

    fn link_front(&mut self, id: NodeId) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(id) {
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head) => {
                if let Some(head_node) = self.node_mut(head) {
                    head_node.prev = Some(id);
                }
            }
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        self.len += 1;
    }

    fn unlink(&mut self, id: NodeId) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        let (prev, next) = (node.prev.take(), node.next.take());

        match prev {
            Some(p) => {
                if let Some(prev_node) = self.node_mut(p) {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(next_node) = self.node_mut(n) {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
        self.len -= 1;
    }
}

/// Head-to-tail iterator over `(key, value)` pairs
pub(crate) struct Iter<'a, K, V> {
    list: &'a RecencyList<K, V>,
    cursor: Option<NodeId>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.cursor?)?;
        self.cursor = node.next;
        Some((&node.key, &node.value))
    }
}
