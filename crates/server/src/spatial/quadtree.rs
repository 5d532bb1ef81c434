//! QuadTree for spatial indexing.
//!
//! Nodes and objects live in two slot maps, so a stale key misses instead of
//! aliasing a recycled slot. Each object keeps a handle to the node holding
//! it plus its slot in that node's item list, so removal is O(1) without
//! searching the tree.

use crate::geometry::Rect;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Handle to an object stored in a [`QuadTree`].
    pub struct ObjectKey;
    struct NodeKey;
}

/// A bounded object and its back-reference into the tree.
#[derive(Debug, Clone)]
pub struct Collidable<T> {
    bound: Rect,
    payload: T,
    node: Option<NodeKey>,
    slot: usize,
}

impl<T> Collidable<T> {
    #[inline]
    pub fn bound(&self) -> &Rect {
        &self.bound
    }

}

#[derive(Debug)]
struct Node {
    bounds: Rect,
    level: u32,
    parent: Option<NodeKey>,
    children: Option<[NodeKey; 4]>,
    items: Vec<ObjectKey>,
    /// Item count that triggers the next subdivide attempt. Raised when an
    /// attempt finds nothing that fits a quadrant.
    split_at: usize,
}

impl Node {
    fn new(bounds: Rect, level: u32, parent: Option<NodeKey>) -> Self {
        Self {
            bounds,
            level,
            parent,
            children: None,
            items: Vec::new(),
            split_at: 0,
        }
    }
}

/// Index statistics for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuadTreeStats {
    /// Objects currently held by a node.
    pub objects: usize,
    pub nodes: usize,
    pub leaves: usize,
    /// Deepest level in use (root is 0).
    pub depth: u32,
}

/// Center-origin quadtree of movable bounded objects.
pub struct QuadTree<T> {
    root: NodeKey,
    nodes: SlotMap<NodeKey, Node>,
    objects: SlotMap<ObjectKey, Collidable<T>>,
    capacity: usize,
    max_depth: u32,
}

/// Quadrant of `bounds` that fully contains `rect`, decided by `rect`'s edges
/// against the center of `bounds`.
fn quadrant_for(bounds: &Rect, rect: &Rect) -> Option<usize> {
    let center = bounds.center();
    let north = rect.bottom() >= center.y;
    let south = rect.top() <= center.y;
    let east = rect.left() >= center.x;
    let west = rect.right() <= center.x;

    if north && east {
        Some(0)
    } else if north && west {
        Some(1)
    } else if south && west {
        Some(2)
    } else if south && east {
        Some(3)
    } else {
        None
    }
}

/// Whether objects stored under quadrant `index` of `bounds` could intersect `rect`.
fn quadrant_may_overlap(bounds: &Rect, rect: &Rect, index: usize) -> bool {
    let center = bounds.center();
    match index {
        0 => rect.right() >= center.x && rect.top() >= center.y,
        1 => rect.left() <= center.x && rect.top() >= center.y,
        2 => rect.left() <= center.x && rect.bottom() <= center.y,
        _ => rect.right() >= center.x && rect.bottom() <= center.y,
    }
}

impl<T> QuadTree<T> {
    /// Create an empty tree covering `bounds`.
    pub fn new(bounds: Rect, capacity: usize, max_depth: u32) -> Self {
        let mut nodes = SlotMap::with_capacity_and_key(64);
        let root = nodes.insert(Node::new(bounds, 0, None));
        Self {
            root,
            nodes,
            objects: SlotMap::with_capacity_and_key(1024),
            capacity: capacity.max(1),
            max_depth,
        }
    }

    /// Bounds of the root node.
    pub fn bounds(&self) -> Rect {
        self.nodes
            .get(self.root)
            .map(|node| node.bounds)
            .unwrap_or_default()
    }

    /// Number of objects owned by the tree, attached or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    #[inline]
    pub fn get(&self, key: ObjectKey) -> Option<&Collidable<T>> {
        self.objects.get(key)
    }

    /// Create an object and insert it.
    pub fn insert(&mut self, bound: Rect, payload: T) -> ObjectKey {
        let key = self.objects.insert(Collidable {
            bound,
            payload,
            node: None,
            slot: 0,
        });
        self.place(self.root, key);
        key
    }

    /// Re-insert a detached object. Fails if it already belongs to a node.
    pub fn attach(&mut self, key: ObjectKey) -> bool {
        match self.objects.get(key) {
            Some(obj) if obj.node.is_none() => {
                self.place(self.root, key);
                true
            }
            _ => false,
        }
    }

    /// Take an object out of the tree without dropping it.
    pub fn detach(&mut self, key: ObjectKey) -> bool {
        match self.unlink(key) {
            Some(node) => {
                self.prune(node);
                true
            }
            None => false,
        }
    }

    /// Remove an object, returning its payload.
    pub fn remove(&mut self, key: ObjectKey) -> Option<T> {
        if let Some(node) = self.unlink(key) {
            self.prune(node);
        }
        self.objects.remove(key).map(|obj| obj.payload)
    }

    /// Move an object to a new bound.
    ///
    /// Stays in place when the holding node is still the right one. Otherwise
    /// insertion restarts from the nearest ancestor whose bounds contain the
    /// new bound (the root if none does).
    pub fn update(&mut self, key: ObjectKey, bound: Rect) -> bool {
        let Some(obj) = self.objects.get_mut(key) else {
            return false;
        };
        obj.bound = bound;
        let Some(old) = obj.node else {
            return false;
        };

        let mut start = old;
        while start != self.root {
            let Some(node) = self.nodes.get(start) else {
                start = self.root;
                break;
            };
            if node.bounds.contains(&bound) {
                break;
            }
            start = node.parent.unwrap_or(self.root);
        }

        if start == old {
            let stays = match self.nodes.get(old) {
                Some(node) => node.children.is_none() || quadrant_for(&node.bounds, &bound).is_none(),
                None => false,
            };
            if stays {
                return true;
            }
        }

        self.unlink(key);
        self.place(start, key);
        self.prune(old);
        true
    }

    /// Visit every object whose bound intersects `rect`.
    pub fn for_each_in_range(&self, rect: &Rect, mut f: impl FnMut(ObjectKey, &Collidable<T>)) {
        let mut stack = vec![self.root];
        while let Some(node_key) = stack.pop() {
            let Some(node) = self.nodes.get(node_key) else {
                continue;
            };
            for &item in &node.items {
                if let Some(obj) = self.objects.get(item) {
                    if obj.bound.intersects(rect) {
                        f(item, obj);
                    }
                }
            }
            if let Some(children) = node.children {
                for (index, child) in children.into_iter().enumerate() {
                    if quadrant_may_overlap(&node.bounds, rect, index) {
                        stack.push(child);
                    }
                }
            }
        }
    }

    /// Payloads of every object whose bound intersects `rect`.
    pub fn query_range(&self, rect: &Rect) -> Vec<T>
    where
        T: Copy,
    {
        let mut found = Vec::new();
        self.for_each_in_range(rect, |_, obj| found.push(obj.payload));
        found
    }

    pub fn stats(&self) -> QuadTreeStats {
        let mut stats = QuadTreeStats::default();
        for (_, node) in self.nodes.iter() {
            stats.nodes += 1;
            stats.objects += node.items.len();
            if node.children.is_none() {
                stats.leaves += 1;
            }
            stats.depth = stats.depth.max(node.level);
        }
        stats
    }

    /// Descend from `start` to the deepest node that fully contains the
    /// object's bound, store it there and subdivide if the node overflows.
    fn place(&mut self, start: NodeKey, key: ObjectKey) {
        let Some(bound) = self.objects.get(key).map(|obj| obj.bound) else {
            return;
        };

        let mut current = start;
        loop {
            let Some(node) = self.nodes.get(current) else {
                return;
            };
            let next = node
                .children
                .and_then(|children| quadrant_for(&node.bounds, &bound).map(|i| children[i]));
            match next {
                Some(child) => current = child,
                None => break,
            }
        }

        let Some(node) = self.nodes.get_mut(current) else {
            return;
        };
        node.items.push(key);
        let slot = node.items.len() - 1;
        let overflow = node.children.is_none()
            && node.items.len() > self.capacity.max(node.split_at)
            && node.level < self.max_depth;

        if let Some(obj) = self.objects.get_mut(key) {
            obj.node = Some(current);
            obj.slot = slot;
        }

        if overflow {
            self.subdivide(current);
        }
    }

    fn subdivide(&mut self, key: NodeKey) {
        let Some((bounds, level)) = self.nodes.get(key).map(|node| (node.bounds, node.level)) else {
            return;
        };

        let children = [0, 1, 2, 3]
            .map(|i| self.nodes.insert(Node::new(bounds.quadrant(i), level + 1, Some(key))));
        let items = match self.nodes.get_mut(key) {
            Some(node) => {
                node.children = Some(children);
                std::mem::take(&mut node.items)
            }
            None => return,
        };

        for item in items {
            if let Some(obj) = self.objects.get_mut(item) {
                obj.node = None;
            }
            self.place(key, item);
        }

        // Nothing fit a quadrant: stay a leaf rather than keep four empty
        // children, and wait for the leaf to double before trying again.
        if children.iter().all(|&child| self.is_empty_leaf(child)) {
            self.collapse(key);
            if let Some(node) = self.nodes.get_mut(key) {
                node.split_at = node.items.len() * 2;
            }
        }
    }

    /// Detach an object from its node in O(1), returning the node it was in.
    fn unlink(&mut self, key: ObjectKey) -> Option<NodeKey> {
        let obj = self.objects.get_mut(key)?;
        let node_key = obj.node.take()?;
        let slot = obj.slot;

        let node = self.nodes.get_mut(node_key)?;
        debug_assert_eq!(node.items.get(slot), Some(&key));
        node.items.swap_remove(slot);
        if node.items.len() <= self.capacity {
            node.split_at = 0;
        }
        if let Some(&moved) = node.items.get(slot) {
            if let Some(moved_obj) = self.objects.get_mut(moved) {
                moved_obj.slot = slot;
            }
        }
        Some(node_key)
    }

    fn is_empty_leaf(&self, key: NodeKey) -> bool {
        self.nodes
            .get(key)
            .is_some_and(|node| node.children.is_none() && node.items.is_empty())
    }

    /// Free the children of `key`, turning it back into a leaf.
    fn collapse(&mut self, key: NodeKey) {
        let children = self.nodes.get_mut(key).and_then(|node| node.children.take());
        for child in children.into_iter().flatten() {
            self.nodes.remove(child);
        }
    }

    /// Walk upward from `key`, merging every node whose four children are
    /// empty leaves, until a node still holds something.
    fn prune(&mut self, mut key: NodeKey) {
        loop {
            let Some(node) = self.nodes.get(key) else {
                return;
            };
            if let Some(children) = node.children {
                if !children.iter().all(|&child| self.is_empty_leaf(child)) {
                    return;
                }
                self.collapse(key);
            }

            let Some(node) = self.nodes.get(key) else {
                return;
            };
            if !node.items.is_empty() {
                return;
            }
            match node.parent {
                Some(parent) => key = parent,
                None => return,
            }
        }
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        for (key, obj) in self.objects.iter() {
            if let Some(node_key) = obj.node {
                let node = self.nodes.get(node_key).expect("object points at a dead node");
                assert_eq!(node.items[obj.slot], key);
            }
        }
        for (_, node) in self.nodes.iter() {
            if let Some(children) = node.children {
                assert!(
                    !children.iter().all(|&child| self.is_empty_leaf(child)),
                    "node left with four empty leaves"
                );
            }
        }
    }
}

impl<T> std::fmt::Debug for QuadTree<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuadTree")
            .field("objects", &self.objects.len())
            .field("nodes", &self.nodes.len())
            .field("bounds", &self.bounds())
            .finish()
    }
}
