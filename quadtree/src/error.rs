use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuadtreeError {
    InvalidBounds {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    InvalidConfig {
        max_depth: usize,
        max_contents: usize,
    },
}

pub type QuadtreeResult<T> = Result<T, QuadtreeError>;

impl fmt::Display for QuadtreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuadtreeError::InvalidBounds {
                x,
                y,
                width,
                height,
            } => {
                write!(
                    f,
                    "coverage bounds must be finite with positive extents (x: {}, y: {}, width: {}, height: {})",
                    x, y, width, height
                )
            }
            QuadtreeError::InvalidConfig {
                max_depth,
                max_contents,
            } => {
                write!(
                    f,
                    "node capacity must be at least one (max_depth: {}, max_contents: {})",
                    max_depth, max_contents
                )
            }
        }
    }
}

impl std::error::Error for QuadtreeError {}
