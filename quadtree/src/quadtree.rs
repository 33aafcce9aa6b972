use crate::entry::EntryRef;
use crate::error::{QuadtreeError, QuadtreeResult};
use crate::overlap;
use crate::pool::{Pool, Poolable};

use common::shapes::{Rectangle, Shape, ShapeEnum};
use smallvec::{smallvec, SmallVec};
use std::rc::Rc;

// Inline stack for iterative traversals. Four-way fanout at the default
// depth limit stays comfortably under this without spilling to the heap.
type NodeStack<'a> = SmallVec<[&'a QuadNode; 64]>;

struct QuadNode {
    bounds: Rectangle,
    depth: usize,
    max_depth: usize,
    max_contents: usize,
    // Empty for a leaf, exactly four children for a branch, in
    // (-x -y), (+x -y), (-x +y), (+x +y) quadrant order.
    children: Vec<QuadNode>,
    // Non-empty only on leaves. An entry overlapping several quadrants is
    // stored in every leaf it overlaps.
    contents: Vec<EntryRef>,
    pooled: bool,
}

impl Poolable for QuadNode {
    fn pooled(&self) -> bool {
        self.pooled
    }

    fn set_pooled(&mut self, pooled: bool) {
        self.pooled = pooled;
    }

    fn reset(&mut self) {
        self.bounds = Rectangle::default();
        self.depth = 0;
        self.max_depth = 0;
        self.max_contents = 0;
        self.children.clear();
        self.contents.clear();
    }
}

impl QuadNode {
    // Pull a node from the pool and point it at a coverage region. Depth and
    // limits are assigned by the caller.
    fn acquire(pool: &mut Pool<QuadNode>, bounds: Rectangle) -> QuadNode {
        let mut node = pool.acquire();
        node.bounds = bounds;
        node
    }

    // Return a node and its whole subtree to the pool. Releasing a node that
    // is already pooled is a no-op.
    fn release(mut node: QuadNode, pool: &mut Pool<QuadNode>) {
        if node.pooled {
            return;
        }
        for child in node.children.drain(..) {
            Self::release(child, pool);
        }
        node.contents.clear();
        pool.release(node);
    }

    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    // Store an entry in every leaf its bounds overlap. Entries without
    // bounds, or with bounds outside this node, are ignored.
    fn insert(&mut self, entry: &EntryRef, pool: &mut Pool<QuadNode>) {
        let bounds = match entry.borrow().bounds() {
            Some(bounds) => bounds,
            None => return,
        };
        if !overlap::rectangle_rectangle(&bounds, &self.bounds) {
            return;
        }
        if self.is_leaf()
            && self.contents.len() + 1 > self.max_contents
            && self.depth + 1 < self.max_depth
        {
            self.split(pool);
        }
        if self.is_leaf() {
            self.contents.push(Rc::clone(entry));
        } else {
            for child in &mut self.children {
                child.insert(entry, pool);
            }
        }
    }

    // Create the four quadrant children and push this node's contents down
    // through the normal insert path, duplicating straddlers.
    fn split(&mut self, pool: &mut Pool<QuadNode>) {
        let half_width = self.bounds.half_width * 0.5;
        let half_height = self.bounds.half_height * 0.5;
        for (dx, dy) in [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)] {
            let child_bounds = Rectangle::from_half_extents(
                self.bounds.x + dx * half_width,
                self.bounds.y + dy * half_height,
                half_width,
                half_height,
            );
            let mut child = QuadNode::acquire(pool, child_bounds);
            child.depth = self.depth + 1;
            child.max_depth = self.max_depth;
            child.max_contents = self.max_contents;
            self.children.push(child);
        }

        let mut old_contents = std::mem::take(&mut self.contents);
        for entry in old_contents.drain(..) {
            for child in &mut self.children {
                child.insert(&entry, pool);
            }
        }
        // Hand the emptied vector back so the allocation survives a later merge.
        self.contents = old_contents;
    }

    // Drop every stored occurrence of the entry. Straddlers can live in
    // several subtrees at once, so every child is walked unconditionally.
    // Shaking on the way out lets deep branches merge before their ancestors.
    fn remove(&mut self, entry: &EntryRef, pool: &mut Pool<QuadNode>) {
        if self.is_leaf() {
            self.contents.retain(|existing| !Rc::ptr_eq(existing, entry));
        } else {
            for child in &mut self.children {
                child.remove(entry, pool);
            }
            self.shake(pool);
        }
    }

    // Merge a branch back into a leaf once its deduplicated population drops
    // below capacity, returning the children to the pool. A branch still at
    // or over capacity is left untouched.
    fn shake(&mut self, pool: &mut Pool<QuadNode>) {
        if self.is_leaf() {
            return;
        }
        let remaining = self.count();
        if remaining == 0 {
            self.release_children(pool);
        } else if remaining < self.max_contents {
            self.reset_flags();
            // The gather borrows the children; scope it so they can be
            // released afterwards.
            {
                let QuadNode {
                    children, contents, ..
                } = self;
                let mut stack: NodeStack = children.iter().collect();
                while let Some(node) = stack.pop() {
                    for entry in &node.contents {
                        let mut inner = entry.borrow_mut();
                        if !inner.flag {
                            inner.flag = true;
                            drop(inner);
                            contents.push(Rc::clone(entry));
                        }
                    }
                    for child in &node.children {
                        stack.push(child);
                    }
                }
            }
            self.release_children(pool);
        }
    }

    fn release_children(&mut self, pool: &mut Pool<QuadNode>) {
        for child in self.children.drain(..) {
            Self::release(child, pool);
        }
    }

    // Deduplicated entry count: clear every reachable flag, then count each
    // entry the first time it is seen and mark it.
    fn count(&self) -> usize {
        self.reset_flags();
        let mut total = 0;
        let mut stack: NodeStack = smallvec![self];
        while let Some(node) = stack.pop() {
            for entry in &node.contents {
                let mut inner = entry.borrow_mut();
                if !inner.flag {
                    inner.flag = true;
                    total += 1;
                }
            }
            for child in &node.children {
                stack.push(child);
            }
        }
        total
    }

    fn reset_flags(&self) {
        let mut stack: NodeStack = smallvec![self];
        while let Some(node) = stack.pop() {
            for entry in &node.contents {
                entry.borrow_mut().flag = false;
            }
            for child in &node.children {
                stack.push(child);
            }
        }
    }

    // Nodes are pruned with the query shape's bounding box; entries are
    // tested against the shape itself.
    fn query(&self, shape: &ShapeEnum, shape_bounds: &Rectangle, results: &mut Vec<EntryRef>) {
        if !overlap::rectangle_rectangle(shape_bounds, &self.bounds) {
            return;
        }
        for entry in &self.contents {
            if let Some(bounds) = entry.borrow().bounds() {
                if overlap::shape_rectangle(shape, &bounds) {
                    results.push(Rc::clone(entry));
                }
            }
        }
        for child in &self.children {
            child.query(shape, shape_bounds, results);
        }
    }

    // Propagate new limits. Existing structure is left as is; only future
    // inserts and shakes see the new values.
    fn configure(&mut self, max_depth: usize, max_contents: usize) {
        self.max_depth = max_depth;
        self.max_contents = max_contents;
        for child in &mut self.children {
            child.configure(max_depth, max_contents);
        }
    }

    fn node_count(&self) -> usize {
        1 + self.children.iter().map(QuadNode::node_count).sum::<usize>()
    }

    fn node_bounding_boxes(&self, bounding_boxes: &mut Vec<Rectangle>) {
        bounding_boxes.push(self.bounds);
        for child in &self.children {
            child.node_bounding_boxes(bounding_boxes);
        }
    }
}

impl Default for QuadNode {
    fn default() -> Self {
        Self {
            bounds: Rectangle::default(),
            depth: 0,
            max_depth: 0,
            max_contents: 0,
            children: Vec::new(),
            contents: Vec::new(),
            pooled: false,
        }
    }
}

// Broad-phase index over axis-aligned bounds. Queries return overlap
// candidates and may repeat an entry that straddles a quadrant seam;
// count() deduplicates.
pub struct QuadTree {
    root: QuadNode,
    node_pool: Pool<QuadNode>,
}

impl QuadTree {
    pub fn new_with_config(bounds: Rectangle, config: Config) -> QuadtreeResult<Self> {
        validate_bounds(&bounds)?;
        if config.max_contents == 0 {
            return Err(QuadtreeError::InvalidConfig {
                max_depth: config.max_depth,
                max_contents: config.max_contents,
            });
        }
        let mut node_pool = Pool::new(config.pool_size);
        let mut root = QuadNode::acquire(&mut node_pool, bounds);
        root.configure(config.max_depth, config.max_contents);
        Ok(QuadTree { root, node_pool })
    }

    pub fn new(bounds: Rectangle) -> QuadtreeResult<Self> {
        Self::new_with_config(bounds, Config::default())
    }

    // Store an entry wherever its current bounds overlap coverage. An entry
    // with no bounds, or bounds entirely outside coverage, is ignored.
    pub fn insert(&mut self, entry: &EntryRef) {
        self.root.insert(entry, &mut self.node_pool);
    }

    // Drop every stored occurrence of the entry and merge underpopulated
    // branches back into leaves. Removing an absent entry is a no-op.
    pub fn remove(&mut self, entry: &EntryRef) {
        self.root.remove(entry, &mut self.node_pool);
    }

    // Reposition an entry after its owner rewrote the bounds: a removal by
    // identity followed by a fresh insert.
    pub fn update(&mut self, entry: &EntryRef) {
        self.remove(entry);
        self.insert(entry);
    }

    // Collect candidate entries whose bounds overlap the query shape.
    // Callers that need distinct owners dedupe on their side.
    pub fn query(&self, shape: &ShapeEnum, results: &mut Vec<EntryRef>) {
        let shape_bounds = shape.bounding_box();
        self.root.query(shape, &shape_bounds, results);
    }

    // Number of distinct entries currently stored.
    pub fn count(&self) -> usize {
        self.root.count()
    }

    // Change the depth and capacity limits. Takes effect on future inserts
    // and merges; existing structure is not revisited.
    pub fn configure(&mut self, max_depth: usize, max_contents: usize) -> QuadtreeResult<()> {
        if max_contents == 0 {
            return Err(QuadtreeError::InvalidConfig {
                max_depth,
                max_contents,
            });
        }
        self.root.configure(max_depth, max_contents);
        Ok(())
    }

    // Drop all entries and collapse back to an empty root leaf, returning
    // interior nodes to the pool.
    pub fn clear(&mut self) {
        self.root.release_children(&mut self.node_pool);
        self.root.contents.clear();
    }

    pub fn bounds(&self) -> Rectangle {
        self.root.bounds
    }

    // Diagnostics: live node count (root included) and idle pooled nodes.
    pub fn storage_counts(&self) -> (usize, usize) {
        (self.root.node_count(), self.node_pool.len())
    }

    // Retrieve the coverage boxes of every live node, depth first.
    pub fn all_node_bounding_boxes(&self, bounding_boxes: &mut Vec<Rectangle>) {
        self.root.node_bounding_boxes(bounding_boxes);
    }
}

fn validate_bounds(bounds: &Rectangle) -> QuadtreeResult<()> {
    let valid = bounds.x.is_finite()
        && bounds.y.is_finite()
        && bounds.half_width.is_finite()
        && bounds.half_height.is_finite()
        && bounds.half_width > 0.0
        && bounds.half_height > 0.0;
    if valid {
        Ok(())
    } else {
        Err(QuadtreeError::InvalidBounds {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width(),
            height: bounds.height(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub pool_size: usize,
    pub max_depth: usize,
    pub max_contents: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            // With a max depth of 6, there could be up to 1365 nodes.
            // Let's set a reasonable max pool size of 4000.
            pool_size: 4000,
            max_depth: 6,
            max_contents: 4,
        }
    }
}
