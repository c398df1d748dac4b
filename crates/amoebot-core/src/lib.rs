//! Core types for the amoebot simulation workspace.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! building blocks every other crate shares: particle identifiers, the
//! RGBA [`Color`] value type, the time-travel [`ValueHistory`] that backs
//! every mutable particle field, and the [`HasNamedFields`] contract used
//! to persist attributes and messages without reflection.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod color;
pub mod error;
pub mod fields;
pub mod history;
pub mod id;

pub use color::Color;
pub use error::{FieldError, HistoryError, ParseValueError};
pub use fields::{assign_named_fields, parse_field, FieldTag, HasNamedFields, NamedField};
pub use history::ValueHistory;
pub use id::ParticleId;
