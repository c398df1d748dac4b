//! Reflection-free named field access.
//!
//! Persistence stores algorithm attributes and circuit messages as
//! `(name, tag, string)` triples. Types opt in by implementing
//! [`HasNamedFields`]; restore then goes through a default value followed
//! by [`assign_named_fields`].

use crate::error::FieldError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The value type of a named field.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldTag {
    /// Signed 32-bit integer.
    Int,
    /// Boolean flag.
    Bool,
    /// 32-bit float.
    Float,
    /// Free text.
    Text,
    /// Optional grid direction.
    Direction,
    /// RGBA color.
    Color,
    /// Enum value; carries the enum's fully-qualified type name.
    Enum(String),
}

impl fmt::Display for FieldTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Bool => write!(f, "bool"),
            Self::Float => write!(f, "float"),
            Self::Text => write!(f, "text"),
            Self::Direction => write!(f, "direction"),
            Self::Color => write!(f, "color"),
            Self::Enum(name) => write!(f, "enum {name}"),
        }
    }
}

/// One field of a [`HasNamedFields`] value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedField {
    /// Field name, unique within its owner.
    pub name: String,
    /// Value type.
    pub tag: FieldTag,
    /// Value encoded as a string.
    pub value: String,
}

impl NamedField {
    /// Build a field from any displayable value.
    pub fn new(name: impl Into<String>, tag: FieldTag, value: impl fmt::Display) -> Self {
        Self {
            name: name.into(),
            tag,
            value: value.to_string(),
        }
    }
}

/// Enumerate and assign fields by name.
///
/// Implementors must round-trip: assigning every field returned by
/// [`named_fields`](HasNamedFields::named_fields) to a default value
/// reproduces the original.
pub trait HasNamedFields {
    /// All fields with their current values, in a stable order.
    fn named_fields(&self) -> Vec<NamedField>;

    /// Parse `value` into the field called `name`.
    ///
    /// On error the field keeps its previous value.
    fn set_named_field(&mut self, name: &str, value: &str) -> Result<(), FieldError>;
}

/// Assign every `(name, value)` pair, collecting failures instead of
/// stopping at the first one.
pub fn assign_named_fields<'a, I>(target: &mut dyn HasNamedFields, fields: I) -> Vec<FieldError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    fields
        .into_iter()
        .filter_map(|(name, value)| target.set_named_field(name, value).err())
        .collect()
}

/// Parse a field value, mapping failure to [`FieldError::Unparsable`].
pub fn parse_field<T: FromStr>(
    name: &str,
    value: &str,
    expected: &'static str,
) -> Result<T, FieldError> {
    value.trim().parse().map_err(|_| FieldError::Unparsable {
        name: name.to_string(),
        value: value.to_string(),
        expected,
    })
}
