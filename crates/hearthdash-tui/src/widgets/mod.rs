//! Reusable rendering helpers for the dashboard screen.

pub mod grid;
pub mod palette;
pub mod tile;
