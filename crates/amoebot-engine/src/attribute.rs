//! Historied, typed particle attributes.
//!
//! Algorithms keep all mutable state in attributes so that moving the
//! system's round marker also rewinds the algorithm. Attributes are
//! declared once per particle through
//! [`ParticleSetup`](crate::context::ParticleSetup), which hands back a
//! copyable [`Attr<T>`] handle used for every later read and write.

use crate::error::ActionError;
use amoebot_core::{Color, FieldError, HasNamedFields, HistoryError, NamedField, ValueHistory};
use amoebot_space::Direction;
use indexmap::IndexMap;
use std::fmt;
use std::marker::PhantomData;

pub use amoebot_core::FieldTag;

/// A dynamically typed attribute value.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    /// Signed integer.
    Int(i32),
    /// Boolean flag.
    Bool(bool),
    /// Float.
    Float(f32),
    /// Text.
    Text(String),
    /// Optional local direction.
    Direction(Option<Direction>),
    /// RGBA color.
    Color(Color),
    /// Enum variant by name.
    Enum {
        /// The enum's type name.
        type_name: &'static str,
        /// The variant name.
        variant: &'static str,
    },
}

impl AttributeValue {
    /// The tag describing this value's type.
    pub fn tag(&self) -> FieldTag {
        match self {
            Self::Int(_) => FieldTag::Int,
            Self::Bool(_) => FieldTag::Bool,
            Self::Float(_) => FieldTag::Float,
            Self::Text(_) => FieldTag::Text,
            Self::Direction(_) => FieldTag::Direction,
            Self::Color(_) => FieldTag::Color,
            Self::Enum { type_name, .. } => FieldTag::Enum((*type_name).to_string()),
        }
    }
}

/// `NONE` stands for an absent direction.
impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Direction(Some(d)) => write!(f, "{d}"),
            Self::Direction(None) => f.write_str("NONE"),
            Self::Color(c) => write!(f, "{c}"),
            Self::Enum { variant, .. } => f.write_str(variant),
        }
    }
}

/// A Rust type that can be stored in an attribute.
pub trait AttributeType: Clone + Sized + 'static {
    /// Tag of the stored values.
    fn tag() -> FieldTag;

    /// Wrap a value.
    fn into_value(self) -> AttributeValue;

    /// Unwrap a value of the matching kind.
    fn from_value(value: &AttributeValue) -> Option<Self>;

    /// Variant names for enum attributes, used to parse persisted values.
    fn variant_names() -> Vec<&'static str> {
        Vec::new()
    }
}

macro_rules! plain_attribute {
    ($ty:ty, $variant:ident) => {
        impl AttributeType for $ty {
            fn tag() -> FieldTag {
                FieldTag::$variant
            }

            fn into_value(self) -> AttributeValue {
                AttributeValue::$variant(self)
            }

            fn from_value(value: &AttributeValue) -> Option<Self> {
                match value {
                    AttributeValue::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

plain_attribute!(i32, Int);
plain_attribute!(bool, Bool);
plain_attribute!(f32, Float);
plain_attribute!(String, Text);
plain_attribute!(Option<Direction>, Direction);
plain_attribute!(Color, Color);

/// A fieldless enum usable as an attribute. Implement it with
/// [`impl_attribute_enum!`](crate::impl_attribute_enum).
pub trait AttributeEnum: Copy + PartialEq + Send + 'static {
    /// Name persisted alongside values.
    const TYPE_NAME: &'static str;
    /// Every variant.
    const VARIANTS: &'static [Self];

    /// Name of this variant.
    fn variant_name(self) -> &'static str;
}

/// Implement [`AttributeEnum`] and [`AttributeType`] for a fieldless enum.
///
/// ```
/// use amoebot_engine::impl_attribute_enum;
///
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// enum Role { Idle, Leader, Follower }
/// impl_attribute_enum!(Role { Idle, Leader, Follower });
///
/// use amoebot_engine::attribute::AttributeEnum;
/// assert_eq!(Role::Leader.variant_name(), "Leader");
/// ```
#[macro_export]
macro_rules! impl_attribute_enum {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::attribute::AttributeEnum for $ty {
            const TYPE_NAME: &'static str = stringify!($ty);
            const VARIANTS: &'static [Self] = &[$($ty::$variant),+];

            fn variant_name(self) -> &'static str {
                match self {
                    $($ty::$variant => stringify!($variant)),+
                }
            }
        }

        impl $crate::attribute::AttributeType for $ty {
            fn tag() -> $crate::attribute::FieldTag {
                $crate::attribute::FieldTag::Enum(
                    <$ty as $crate::attribute::AttributeEnum>::TYPE_NAME.to_string(),
                )
            }

            fn into_value(self) -> $crate::attribute::AttributeValue {
                $crate::attribute::AttributeValue::Enum {
                    type_name: <$ty as $crate::attribute::AttributeEnum>::TYPE_NAME,
                    variant: $crate::attribute::AttributeEnum::variant_name(self),
                }
            }

            fn from_value(value: &$crate::attribute::AttributeValue) -> Option<Self> {
                match value {
                    $crate::attribute::AttributeValue::Enum { type_name, variant }
                        if *type_name == <$ty as $crate::attribute::AttributeEnum>::TYPE_NAME =>
                    {
                        <$ty as $crate::attribute::AttributeEnum>::VARIANTS
                            .iter()
                            .copied()
                            .find(|v| $crate::attribute::AttributeEnum::variant_name(*v) == *variant)
                    }
                    _ => None,
                }
            }

            fn variant_names() -> Vec<&'static str> {
                <$ty as $crate::attribute::AttributeEnum>::VARIANTS
                    .iter()
                    .map(|v| $crate::attribute::AttributeEnum::variant_name(*v))
                    .collect()
            }
        }
    };
}

/// Typed handle to one attribute slot.
///
/// Every particle of a run is built by the same factory, so a handle
/// obtained during setup addresses the same slot on every particle.
pub struct Attr<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Attr<T> {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    /// Slot index within the particle's attribute store.
    pub fn index(self) -> usize {
        self.index
    }
}

impl<T> Clone for Attr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Attr<T> {}

impl<T> fmt::Debug for Attr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Attr({})", self.index)
    }
}

/// Parse a persisted value of a non-enum tag. Enum values need the
/// variant list of their slot; see [`AttributeSlot::parse`].
pub fn parse_attribute_value(tag: &FieldTag, text: &str) -> Option<AttributeValue> {
    let trimmed = text.trim();
    match tag {
        FieldTag::Int => trimmed.parse().ok().map(AttributeValue::Int),
        FieldTag::Bool => trimmed.parse().ok().map(AttributeValue::Bool),
        FieldTag::Float => trimmed.parse().ok().map(AttributeValue::Float),
        FieldTag::Text => Some(AttributeValue::Text(text.to_string())),
        FieldTag::Direction if trimmed.eq_ignore_ascii_case("none") => {
            Some(AttributeValue::Direction(None))
        }
        FieldTag::Direction => trimmed
            .parse()
            .ok()
            .map(|d| AttributeValue::Direction(Some(d))),
        FieldTag::Color => trimmed.parse().ok().map(AttributeValue::Color),
        FieldTag::Enum(_) => None,
    }
}

/// One declared attribute and its history.
#[derive(Clone, Debug)]
pub struct AttributeSlot {
    name: String,
    tag: FieldTag,
    enum_type: Option<&'static str>,
    variants: Vec<&'static str>,
    history: ValueHistory<AttributeValue>,
}

impl AttributeSlot {
    /// Attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value type.
    pub fn tag(&self) -> &FieldTag {
        &self.tag
    }

    /// The value at the marker.
    pub fn value(&self) -> &AttributeValue {
        self.history.marked_value()
    }

    /// Full history.
    pub fn history(&self) -> &ValueHistory<AttributeValue> {
        &self.history
    }

    /// Parse a persisted string into a value of this slot's type.
    pub fn parse(&self, text: &str) -> Option<AttributeValue> {
        match (&self.tag, self.enum_type) {
            (FieldTag::Enum(_), Some(type_name)) => {
                let text = text.trim();
                let variant = self.variants.iter().copied().find(|v| *v == text)?;
                Some(AttributeValue::Enum { type_name, variant })
            }
            (tag, _) => parse_attribute_value(tag, text),
        }
    }

    pub(crate) fn history_mut(&mut self) -> &mut ValueHistory<AttributeValue> {
        &mut self.history
    }

    pub(crate) fn replace_history(&mut self, history: ValueHistory<AttributeValue>) {
        self.history = history;
    }
}

/// Ordered, name-unique attribute slots of one particle.
#[derive(Clone, Debug, Default)]
pub struct AttributeStore {
    slots: Vec<AttributeSlot>,
    index: IndexMap<String, usize>,
}

impl AttributeStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an attribute with its initial value at `round`.
    pub fn add<T: AttributeType>(
        &mut self,
        name: &str,
        initial: T,
        round: u64,
    ) -> Result<Attr<T>, ActionError> {
        if self.index.contains_key(name) {
            return Err(ActionError::DuplicateAttribute {
                name: name.to_string(),
            });
        }
        let value = initial.into_value();
        let enum_type = match &value {
            AttributeValue::Enum { type_name, .. } => Some(*type_name),
            _ => None,
        };
        let index = self.slots.len();
        self.slots.push(AttributeSlot {
            name: name.to_string(),
            tag: T::tag(),
            enum_type,
            variants: T::variant_names(),
            history: ValueHistory::new(value, round),
        });
        self.index.insert(name.to_string(), index);
        Ok(Attr::new(index))
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no attribute was declared.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots in declaration order.
    pub fn slots(&self) -> &[AttributeSlot] {
        &self.slots
    }

    /// The slot called `name`.
    pub fn slot_by_name(&self, name: &str) -> Option<&AttributeSlot> {
        self.index.get(name).map(|&i| &self.slots[i])
    }

    /// Index of the slot called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Read a typed value at the marker.
    pub fn get<T: AttributeType>(&self, attr: Attr<T>) -> Result<T, ActionError> {
        let slot = self.slot(attr.index)?;
        Self::typed(slot, slot.value())
    }

    pub(crate) fn slot(&self, index: usize) -> Result<&AttributeSlot, ActionError> {
        self.slots
            .get(index)
            .ok_or(ActionError::UnknownAttribute { index })
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut AttributeSlot> {
        self.slots.get_mut(index)
    }

    pub(crate) fn slots_mut(&mut self) -> impl Iterator<Item = &mut AttributeSlot> {
        self.slots.iter_mut()
    }

    /// Convert `value` from `slot` to `T`, reporting a type mismatch.
    pub(crate) fn typed<T: AttributeType>(
        slot: &AttributeSlot,
        value: &AttributeValue,
    ) -> Result<T, ActionError> {
        T::from_value(value).ok_or_else(|| ActionError::AttributeType {
            name: slot.name.clone(),
            expected: T::tag().to_string(),
            found: slot.tag.to_string(),
        })
    }

    /// Check that a handle of type `T` may write to its slot.
    pub(crate) fn check_kind<T: AttributeType>(&self, attr: Attr<T>) -> Result<(), ActionError> {
        let slot = self.slot(attr.index)?;
        if slot.tag != T::tag() {
            return Err(ActionError::AttributeType {
                name: slot.name.clone(),
                expected: T::tag().to_string(),
                found: slot.tag.to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn for_each_history(
        &mut self,
        mut f: impl FnMut(&mut ValueHistory<AttributeValue>) -> Result<(), HistoryError>,
    ) -> Result<(), HistoryError> {
        for slot in &mut self.slots {
            f(&mut slot.history)?;
        }
        Ok(())
    }
}

/// Exposes the marked value of every attribute.
///
/// Assigning a field records the parsed value at the marked round, which
/// discards this store's later rounds when the marker is in the past.
impl HasNamedFields for AttributeStore {
    fn named_fields(&self) -> Vec<NamedField> {
        self.slots
            .iter()
            .map(|s| NamedField::new(s.name.clone(), s.tag.clone(), s.value()))
            .collect()
    }

    fn set_named_field(&mut self, name: &str, value: &str) -> Result<(), FieldError> {
        let (index, parsed) = self.parse_named(name, value)?;
        self.record_at_marker(index, parsed, name, value)
    }
}

impl AttributeStore {
    /// Resolve `name` and parse `value` for it without recording anything.
    pub(crate) fn parse_named(
        &self,
        name: &str,
        value: &str,
    ) -> Result<(usize, AttributeValue), FieldError> {
        let index = self
            .index_of(name)
            .ok_or_else(|| FieldError::UnknownField {
                name: name.to_string(),
            })?;
        let parsed = self.slots[index]
            .parse(value)
            .ok_or_else(|| FieldError::Unparsable {
                name: name.to_string(),
                value: value.to_string(),
                expected: "attribute value",
            })?;
        Ok((index, parsed))
    }

    /// Record an already parsed value in the marked round of slot `index`.
    pub(crate) fn record_at_marker(
        &mut self,
        index: usize,
        parsed: AttributeValue,
        name: &str,
        value: &str,
    ) -> Result<(), FieldError> {
        let unrecordable = || FieldError::Unparsable {
            name: name.to_string(),
            value: value.to_string(),
            expected: "recordable value",
        };
        let slot = self.slots.get_mut(index).ok_or_else(unrecordable)?;
        let round = slot.history.marked_round();
        slot.history
            .record_value_in_round(parsed, round)
            .map_err(|_| unrecordable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Role {
        Idle,
        Leader,
    }
    crate::impl_attribute_enum!(Role { Idle, Leader });

    #[test]
    fn typed_roundtrip() {
        let mut store = AttributeStore::new();
        let hops = store.add("hops", 3i32, 0).unwrap();
        let dir = store.add("dir", Some(Direction::W), 0).unwrap();
        let role = store.add("role", Role::Leader, 0).unwrap();
        assert_eq!(store.get(hops).unwrap(), 3);
        assert_eq!(store.get(dir).unwrap(), Some(Direction::W));
        assert_eq!(store.get(role).unwrap(), Role::Leader);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut store = AttributeStore::new();
        store.add("x", true, 0).unwrap();
        assert_eq!(
            store.add("x", 1i32, 0).unwrap_err(),
            ActionError::DuplicateAttribute {
                name: "x".to_string()
            }
        );
    }

    #[test]
    fn mismatched_handle_reports_types() {
        let mut store = AttributeStore::new();
        let flag = store.add("flag", true, 0).unwrap();
        let wrong: Attr<i32> = Attr::new(flag.index());
        assert!(matches!(
            store.get(wrong),
            Err(ActionError::AttributeType { .. })
        ));
        assert!(store.check_kind(wrong).is_err());
        assert!(matches!(
            store.get(Attr::<bool>::new(9)),
            Err(ActionError::UnknownAttribute { index: 9 })
        ));
    }

    #[test]
    fn display_and_parse_agree() {
        let mut store = AttributeStore::new();
        store.add("i", -4i32, 0).unwrap();
        store.add("f", 0.25f32, 0).unwrap();
        store.add("s", "hello world".to_string(), 0).unwrap();
        store.add("d", None::<Direction>, 0).unwrap();
        store.add("c", Color::RED, 0).unwrap();
        store.add("e", Role::Idle, 0).unwrap();
        for slot in store.slots() {
            let text = slot.value().to_string();
            assert_eq!(slot.parse(&text).as_ref(), Some(slot.value()), "{}", slot.name());
        }
        let role = store.slot_by_name("e").unwrap();
        assert_eq!(role.parse("Leader"), Some(Role::Leader.into_value()));
        assert_eq!(role.parse("Boss"), None);
    }

    #[test]
    fn named_fields_expose_marked_values() {
        let mut store = AttributeStore::new();
        store.add("hops", 1i32, 0).unwrap();
        store.add("role", Role::Idle, 0).unwrap();
        let fields = store.named_fields();
        assert_eq!(fields[0].value, "1");
        assert_eq!(fields[1].tag, FieldTag::Enum("Role".to_string()));

        store.set_named_field("hops", "7").unwrap();
        assert_eq!(store.slot_by_name("hops").unwrap().value(), &AttributeValue::Int(7));
        assert!(store.set_named_field("hops", "seven").is_err());
        assert!(store.set_named_field("missing", "1").is_err());
    }

    #[test]
    fn tags_match_values() {
        assert_eq!(AttributeValue::Int(1).tag(), i32::tag());
        assert_eq!(Role::Idle.into_value().tag(), Role::tag());
        assert_eq!(Role::variant_names(), vec!["Idle", "Leader"]);
    }
}
