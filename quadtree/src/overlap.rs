use common::shapes::{Circle, Rectangle, ShapeEnum};

// Strict overlap: rectangles that only touch along an edge do not count.
// A zero-extent rectangle therefore overlaps nothing.
pub fn rectangle_rectangle(a: &Rectangle, b: &Rectangle) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

pub fn circle_rectangle(circle: &Circle, rectangle: &Rectangle) -> bool {
    let dx = (circle.x - rectangle.x).abs();
    let dy = (circle.y - rectangle.y).abs();
    if dx > rectangle.half_width + circle.radius || dy > rectangle.half_height + circle.radius {
        return false;
    }
    if dx <= rectangle.half_width || dy <= rectangle.half_height {
        return true;
    }
    let corner_distance_sq =
        (dx - rectangle.half_width).powi(2) + (dy - rectangle.half_height).powi(2);
    corner_distance_sq <= circle.radius.powi(2)
}

pub fn shape_rectangle(shape: &ShapeEnum, rectangle: &Rectangle) -> bool {
    match shape {
        ShapeEnum::Circle(circle) => circle_rectangle(circle, rectangle),
        ShapeEnum::Rectangle(rect) => rectangle_rectangle(rect, rectangle),
    }
}
