//! Draw-mode controller and geometry normalizer
//!
//! This module provides:
//! - Message handlers for DrawMsg (tool state machine)
//! - Conversion of collected points into ZoneGeometry

pub mod handlers;
pub mod normalize;
