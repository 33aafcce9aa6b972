use common::shapes::{Circle, Rectangle, Shape, ShapeEnum};
use quadtree::entry::EntryRef;

// A physical object described by collider shapes in body-local coordinates.
// Zero mass marks the body static: it lives in the persistent broad-phase
// index and every change to its placement must be pushed into its entry.
pub struct Body {
    x: f32,
    y: f32,
    rotation: f32,
    mass: f32,
    colliders: Vec<ShapeEnum>,
    entry: Option<EntryRef>,
}

impl Body {
    pub fn new(x: f32, y: f32, mass: f32) -> Self {
        Self {
            x,
            y,
            rotation: 0.0,
            mass,
            colliders: Vec::new(),
            entry: None,
        }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn colliders(&self) -> &[ShapeEnum] {
        &self.colliders
    }

    // The entry this body owns once attached to a world. The index holds
    // non-owning references to it; only the body creates or releases it.
    pub fn entry(&self) -> Option<&EntryRef> {
        self.entry.as_ref()
    }

    pub fn is_static(&self) -> bool {
        self.mass == 0.0
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
    }

    pub fn add_collider(&mut self, shape: ShapeEnum) {
        self.colliders.push(shape);
    }

    pub fn clear_colliders(&mut self) {
        self.colliders.clear();
    }

    // World-space axis-aligned bounds covering every collider, or None for
    // a body with no colliders. Collider offsets rotate with the body.
    pub fn bounds(&self) -> Option<Rectangle> {
        let mut colliders = self.colliders.iter();
        let first = colliders.next()?;
        let mut bounds = self.collider_bounds(first);
        for collider in colliders {
            bounds.expand_to_include(&self.collider_bounds(collider));
        }
        Some(bounds)
    }

    fn collider_bounds(&self, collider: &ShapeEnum) -> Rectangle {
        let (sin, cos) = self.rotation.sin_cos();
        match collider {
            ShapeEnum::Circle(circle) => {
                let x = self.x + circle.x * cos - circle.y * sin;
                let y = self.y + circle.x * sin + circle.y * cos;
                Circle::new(x, y, circle.radius).bounding_box()
            }
            ShapeEnum::Rectangle(rect) => {
                let x = self.x + rect.x * cos - rect.y * sin;
                let y = self.y + rect.x * sin + rect.y * cos;
                // Tightest axis-aligned cover of the rotated rectangle.
                let half_width = cos.abs() * rect.half_width + sin.abs() * rect.half_height;
                let half_height = sin.abs() * rect.half_width + cos.abs() * rect.half_height;
                Rectangle::from_half_extents(x, y, half_width, half_height)
            }
        }
    }

    pub(crate) fn attach_entry(&mut self, entry: EntryRef) {
        self.entry = Some(entry);
    }

    pub(crate) fn detach_entry(&mut self) -> Option<EntryRef> {
        self.entry.take()
    }
}
