// Pooled instances carry their own "currently pooled" flag so a double
// release is a no-op instead of a duplicate pool slot.
pub trait Poolable: Default {
    fn pooled(&self) -> bool;
    fn set_pooled(&mut self, pooled: bool);
    fn reset(&mut self);
}

pub struct Pool<T: Poolable> {
    items: Vec<T>,
    max_size: usize,
}

impl<T> Pool<T>
where
    T: Poolable,
{
    // Create a new Pool with a specified maximum number of idle instances
    pub fn new(max_size: usize) -> Self {
        Pool {
            items: Vec::new(),
            max_size,
        }
    }

    // Reuse an idle instance if one is available, otherwise construct a default one
    pub fn acquire(&mut self) -> T {
        let mut item = match self.items.pop() {
            Some(item) => item,
            None => T::default(),
        };
        item.set_pooled(false);
        item
    }

    // Mark the instance pooled, reset it, and keep it for reuse. Instances
    // that are already pooled, or that arrive while the pool is full, are
    // dropped instead.
    pub fn release(&mut self, mut item: T) {
        if item.pooled() {
            return;
        }
        item.set_pooled(true);
        item.reset();
        if self.items.len() < self.max_size {
            self.items.push(item);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
