//! Map editing session
//!
//! This module contains:
//! - Draw session state and the phase it implies
//! - Message types for map interactions
//! - Keyboard shortcuts

pub mod messages;
pub mod shortcuts;
pub mod state;
