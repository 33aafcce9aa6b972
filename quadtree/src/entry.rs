use common::shapes::Rectangle;

use std::cell::RefCell;
use std::rc::Rc;

// Shared handle to an index entry. The owning body holds the defining
// reference; leaves hold clones of it, and identity checks go through
// `Rc::ptr_eq`.
pub type EntryRef = Rc<RefCell<IndexEntry>>;

// One entry per owning body. `owner` is an opaque handle the index never
// resolves or frees; `bounds` is written by the owner and only read here.
pub struct IndexEntry {
    owner: u32,
    bounds: Option<Rectangle>,
    // Traversal mark used by the deduplicating count and merge passes.
    pub(crate) flag: bool,
}

impl IndexEntry {
    pub fn new(owner: u32) -> Self {
        Self {
            owner,
            bounds: None,
            flag: false,
        }
    }

    pub fn new_ref(owner: u32) -> EntryRef {
        Rc::new(RefCell::new(Self::new(owner)))
    }

    pub fn owner(&self) -> u32 {
        self.owner
    }

    pub fn bounds(&self) -> Option<Rectangle> {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Rectangle) {
        self.bounds = Some(bounds);
    }

    pub fn clear_bounds(&mut self) {
        self.bounds = None;
    }
}
