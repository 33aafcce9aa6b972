use rand::Rng;
use std::fmt::Debug;

pub trait Shape: Debug {
    fn bounding_box(&self) -> Rectangle;
}

#[derive(Debug, Copy, Clone)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl Circle {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self { x, y, radius }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl Default for Circle {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            radius: 0.0,
        }
    }
}

impl Shape for Circle {
    fn bounding_box(&self) -> Rectangle {
        Rectangle::new(self.x, self.y, self.radius * 2.0, self.radius * 2.0)
    }
}

// Axis-aligned rectangle stored as a center point plus half-extents.
#[derive(Debug, Copy, Clone)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub half_width: f32,
    pub half_height: f32,
}

impl Rectangle {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            half_width: width / 2.0,
            half_height: height / 2.0,
        }
    }

    pub fn from_half_extents(x: f32, y: f32, half_width: f32, half_height: f32) -> Self {
        Self {
            x,
            y,
            half_width,
            half_height,
        }
    }

    pub fn width(&self) -> f32 {
        self.half_width * 2.0
    }

    pub fn height(&self) -> f32 {
        self.half_height * 2.0
    }

    pub fn left(&self) -> f32 {
        self.x - self.half_width
    }

    pub fn right(&self) -> f32 {
        self.x + self.half_width
    }

    pub fn top(&self) -> f32 {
        self.y - self.half_height
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.half_height
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.left() && x <= self.right() && y >= self.top() && y <= self.bottom()
    }

    pub fn expand_to_include(&mut self, other: &Rectangle) {
        let left = f32::min(self.left(), other.left());
        let right = f32::max(self.right(), other.right());
        let top = f32::min(self.top(), other.top());
        let bottom = f32::max(self.bottom(), other.bottom());
        self.x = (left + right) / 2.0;
        self.y = (top + bottom) / 2.0;
        self.half_width = (right - left) / 2.0;
        self.half_height = (bottom - top) / 2.0;
    }

    // Random point at least `margin` inside every edge.
    pub fn random_point_inside<R: Rng>(&self, margin: f32, rng: &mut R) -> (f32, f32) {
        (
            self._safe_randf32(rng, self.left() + margin, self.right() - margin),
            self._safe_randf32(rng, self.top() + margin, self.bottom() - margin),
        )
    }

    fn _safe_randf32<R: Rng>(&self, rng: &mut R, min: f32, max: f32) -> f32 {
        if min > max {
            return min;
        }
        rng.gen_range(min..=max)
    }
}

impl Default for Rectangle {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            half_width: 0.0,
            half_height: 0.0,
        }
    }
}

impl Shape for Rectangle {
    fn bounding_box(&self) -> Rectangle {
        *self
    }
}

#[derive(Clone, Debug)]
pub enum ShapeEnum {
    Circle(Circle),
    Rectangle(Rectangle),
}

impl Shape for ShapeEnum {
    fn bounding_box(&self) -> Rectangle {
        match self {
            ShapeEnum::Circle(circle) => circle.bounding_box(),
            ShapeEnum::Rectangle(rectangle) => rectangle.bounding_box(),
        }
    }
}
