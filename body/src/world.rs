use crate::body::Body;

use common::shapes::{Rectangle, ShapeEnum};
use fxhash::{FxHashMap, FxHashSet};
use quadtree::entry::{EntryRef, IndexEntry};
use quadtree::error::QuadtreeResult;
use quadtree::quadtree::{Config, QuadTree};
use std::rc::Rc;

// Owns the bodies and the broad-phase index over the static ones. All
// post-attach mutation goes through the world, so a body's entry and its
// placement in the index cannot drift apart.
pub struct World {
    index: QuadTree,
    bodies: FxHashMap<u32, Body>,
    next_body: u32,
}

impl World {
    pub fn new(bounds: Rectangle) -> QuadtreeResult<Self> {
        Self::new_with_config(bounds, Config::default())
    }

    pub fn new_with_config(bounds: Rectangle, config: Config) -> QuadtreeResult<Self> {
        Ok(World {
            index: QuadTree::new_with_config(bounds, config)?,
            bodies: FxHashMap::default(),
            next_body: 0,
        })
    }

    // Take ownership of a body and give it its index entry. Static bodies
    // enter the persistent index here; dynamic bodies keep their entry
    // current but are broad-phased per step by the simulation loop.
    pub fn add_body(&mut self, mut body: Body) -> u32 {
        let id = self.next_body;
        self.next_body += 1;

        let entry = IndexEntry::new_ref(id);
        if let Some(bounds) = body.bounds() {
            entry.borrow_mut().set_bounds(bounds);
        }
        body.attach_entry(Rc::clone(&entry));
        if body.is_static() {
            self.index.insert(&entry);
        }
        self.bodies.insert(id, body);
        id
    }

    // Detach a body from the world: its entry leaves the index and its
    // bounds are released before the body is handed back.
    pub fn remove_body(&mut self, id: u32) -> Option<Body> {
        let mut body = self.bodies.remove(&id)?;
        if let Some(entry) = body.detach_entry() {
            self.index.remove(&entry);
            entry.borrow_mut().clear_bounds();
        }
        Some(body)
    }

    pub fn set_body_position(&mut self, id: u32, x: f32, y: f32) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.set_position(x, y);
            Self::sync_entry(&mut self.index, body);
        }
    }

    pub fn set_body_rotation(&mut self, id: u32, rotation: f32) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.set_rotation(rotation);
            Self::sync_entry(&mut self.index, body);
        }
    }

    pub fn add_body_collider(&mut self, id: u32, shape: ShapeEnum) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.add_collider(shape);
            Self::sync_entry(&mut self.index, body);
        }
    }

    pub fn clear_body_colliders(&mut self, id: u32) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.clear_colliders();
            Self::sync_entry(&mut self.index, body);
        }
    }

    // Recompute the body's bounds into its entry, then reposition the entry
    // for static bodies. A body whose collider set became empty falls out of
    // the index: the removal half of update still applies, the insert half
    // is a no-op without bounds.
    fn sync_entry(index: &mut QuadTree, body: &Body) {
        let entry = match body.entry() {
            Some(entry) => entry,
            None => return,
        };
        match body.bounds() {
            Some(bounds) => entry.borrow_mut().set_bounds(bounds),
            None => entry.borrow_mut().clear_bounds(),
        }
        if body.is_static() {
            index.update(entry);
        }
    }

    // Broad-phase candidates overlapping the query shape, one id per
    // distinct body. The index can return a straddling entry once per leaf;
    // owners are deduplicated here, preserving first-seen order.
    pub fn query_candidates(&self, shape: &ShapeEnum, results: &mut Vec<u32>) {
        let mut hits: Vec<EntryRef> = Vec::new();
        self.index.query(shape, &mut hits);

        let mut seen: FxHashSet<u32> = FxHashSet::default();
        for hit in &hits {
            let owner = hit.borrow().owner();
            if seen.insert(owner) {
                results.push(owner);
            }
        }
    }

    pub fn body(&self, id: u32) -> Option<&Body> {
        self.bodies.get(&id)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn bounds(&self) -> Rectangle {
        self.index.bounds()
    }

    pub fn index(&self) -> &QuadTree {
        &self.index
    }
}
