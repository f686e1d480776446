//! Pure domain types with minimal dependencies
//!
//! This module contains the coordinate, address and zone types shared by
//! the draw controller, the normalizer and the map surface.
//! Types here should have no I/O or runtime dependencies.

pub mod address;
pub mod geometry;
pub mod zone;

pub use address::*;
pub use geometry::*;
pub use zone::*;
