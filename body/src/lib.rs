pub mod body;
pub mod world;

pub use crate::body::Body;
pub use crate::world::World;
