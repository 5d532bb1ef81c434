//! Spatial indexing utilities.

mod quadtree;

pub use quadtree::{Collidable, ObjectKey, QuadTree, QuadTreeStats};
