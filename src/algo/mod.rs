//! Vertex editing algorithms.
//!
//! This module contains the algorithms behind the track block tools:
//!
//! - **Chains**: nearest-neighbor ordering of a block's vertices ([`chain`])
//! - **Rotation**: cyclic shifts along a chain, quarter turns ([`rotate`])
//! - **Grids**: quarter turns of a 3×3 rectangular block ([`grid`])
//! - **Welding**: single-linkage merge of nearby vertices across objects ([`weld`])
//! - **Snapping**: move vertices onto the closest vertex of other objects ([`snap`])
//! - **Swapping**: mirror three collinear vertices ([`swap`])
//! - **Aligning**: flatten a selection onto an axis-aligned plane ([`align`])

pub mod align;
pub mod chain;
pub mod grid;
mod progress;
pub mod rotate;
pub mod snap;
pub mod spatial;
pub mod swap;
pub mod weld;

pub use progress::Progress;
