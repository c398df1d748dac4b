//! Triangular grid geometry for amoebot simulations.
//!
//! The amoebot model places particles on the nodes of an infinite
//! triangular lattice. This crate defines everything about that lattice
//! that is independent of particles and algorithms:
//!
//! - [`GridCoord`]: axial node coordinates
//! - [`Direction`]: six cardinal and six half directions
//! - [`Orientation`]: the compass/chirality mapping between a particle's
//!   local directions and global grid directions
//! - [`ports`]: port labelling for contracted and expanded particles
//! - [`Shape`]: node/edge/face shape descriptions loaded from JSON

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod coord;
pub mod direction;
pub mod error;
pub mod orientation;
pub mod ports;
pub mod shape;

pub use coord::GridCoord;
pub use direction::Direction;
pub use error::SpaceError;
pub use orientation::Orientation;
pub use ports::Port;
pub use shape::{Shape, ShapeEdge, ShapeFace};
