//! Cyclic rotation of chain positions.
//!
//! Rotating a chain shifts coordinates along the ring while every vertex keeps
//! its index, so the topology of the block is untouched and only its shape
//! turns. Two steps around the eight-vertex rim of a quadblock is a quarter
//! turn.
//!
//! # Direction
//!
//! After `rotate_chain(chain, k)` the link at position `i` holds the
//! coordinate that was at position `(i + k) mod n`. Positive shifts are the
//! "R90" direction of the track tools, negative shifts "R-90".
//!
//! # Example
//!
//! ```
//! use trackverts::algo::chain::build_chain;
//! use trackverts::algo::rotate::rotate_chain;
//! use nalgebra::Point3;
//!
//! let ring = vec![
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(-1.0, 0.0, 0.0),
//!     Point3::new(0.0, -1.0, 0.0),
//! ];
//! let chain = build_chain(&ring).unwrap();
//! let turned = rotate_chain(&chain, 1).unwrap();
//! let back = rotate_chain(&turned, -1).unwrap();
//! assert_eq!(back, chain);
//! ```

use crate::error::{Result, VertexError};
use crate::mesh::PointSource;

use super::chain::{build_chain_with_options, Chain, ChainLink, ChainOptions};

/// Rotation direction for the quarter-turn tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// "R90": shift forward along the ring.
    Clockwise,
    /// "R-90": shift backward along the ring.
    CounterClockwise,
}

impl Turn {
    /// Chain shift corresponding to a quarter turn of an eight-vertex rim.
    #[inline]
    pub fn ring_shift(self) -> isize {
        match self {
            Turn::Clockwise => 2,
            Turn::CounterClockwise => -2,
        }
    }

    /// The opposite direction.
    #[inline]
    pub fn reverse(self) -> Self {
        match self {
            Turn::Clockwise => Turn::CounterClockwise,
            Turn::CounterClockwise => Turn::Clockwise,
        }
    }
}

/// Circularly shift the positions of a chain by `shift` steps.
///
/// Indices stay fixed; link `i` receives the position previously held by link
/// `(i + shift) mod n`. Any shift magnitude is accepted and reduced modulo the
/// chain length.
///
/// # Errors
///
/// Returns [`VertexError::EmptyInput`] for an empty chain.
pub fn rotate_chain(chain: &Chain, shift: isize) -> Result<Chain> {
    let n = chain.len();
    if n == 0 {
        return Err(VertexError::EmptyInput);
    }

    let step = shift.rem_euclid(n as isize) as usize;
    let links = chain.links();
    let rotated: Vec<ChainLink> = links
        .iter()
        .enumerate()
        .map(|(i, link)| ChainLink::new(link.index, links[(i + step) % n].position))
        .collect();

    Ok(chain.with_links(rotated))
}

/// Write every link's position back into `source`.
///
/// All indices are validated before the first write, so either every link is
/// applied or none is. Returns the number of positions written.
pub fn apply_chain<S: PointSource + ?Sized>(source: &mut S, chain: &Chain) -> Result<usize> {
    let len = source.len();
    if let Some(link) = chain.links().iter().find(|l| l.index >= len) {
        return Err(VertexError::InvalidVertexIndex {
            index: link.index,
            len,
        });
    }

    for link in chain.links() {
        source.set_position(link.index, link.position)?;
    }
    Ok(chain.len())
}

/// Rotate a block's rim by a quarter turn and write the result back.
///
/// Builds a chain over every point of `source`. When the chain starts at a hub
/// vertex sitting on the centroid (the centre of a 3×3 quadblock) that vertex
/// is left in place and only the rim is rotated, by two steps in the direction
/// of `turn`. Returns the rotated chain.
pub fn quarter_turn<S: PointSource + ?Sized>(source: &mut S, turn: Turn) -> Result<Chain> {
    quarter_turn_with_options(source, turn, &ChainOptions::default())
}

/// [`quarter_turn`] with explicit chain options.
pub fn quarter_turn_with_options<S: PointSource + ?Sized>(
    source: &mut S,
    turn: Turn,
    options: &ChainOptions,
) -> Result<Chain> {
    let points = source.positions();
    let chain = build_chain_with_options(&points, options)?;

    let head_is_hub = chain
        .links()
        .first()
        .map(|l| (l.position - chain.centroid()).norm() < options.centroid_epsilon)
        .unwrap_or(false);

    let ring = if head_is_hub && chain.len() > 1 {
        Chain::from_links(chain.links()[1..].to_vec())
    } else {
        chain
    };

    let rotated = rotate_chain(&ring, turn.ring_shift())?;
    apply_chain(source, &rotated)?;

    log::debug!(
        "quarter turn {:?} on '{}': {} rim vertices{}",
        turn,
        source.name(),
        rotated.len(),
        if head_is_hub { " (hub kept)" } else { "" }
    );

    Ok(rotated)
}
