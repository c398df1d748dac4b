//! Reconfigurable circuits for amoebot simulations.
//!
//! Every particle owns a fixed number of pins per incident edge. A
//! [`PinConfiguration`] groups those pins into partition sets; pins of
//! neighbouring particles that face each other across an edge are wired
//! together. The connected components of this wiring are **circuits**,
//! and a beep or [`Message`] sent on any partition set of a circuit
//! reaches every partition set of that circuit in the same round.
//!
//! # Architecture
//!
//! - [`PinConfiguration`], [`PartitionSet`], [`Pin`]: per-particle wiring
//! - [`Message`], [`MessageBox`], [`MessageRegistry`]: typed payloads and
//!   their reconstruction from persisted fields
//! - [`CircuitBuilder`]: union-find over partition sets that resolves
//!   beeps and messages into per-particle [`Delivery`] values

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod circuit;
pub mod configuration;
pub mod error;
pub mod message;
pub mod pin;

pub use circuit::{facing_offset, CircuitBuilder, CircuitOutcome, Delivery};
pub use configuration::{PartitionSet, PinConfiguration, MAX_PINS_PER_EDGE};
pub use error::CircuitError;
pub use message::{Message, MessageBox, MessageRegistry};
pub use pin::Pin;
