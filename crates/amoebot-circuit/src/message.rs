//! Typed circuit messages.
//!
//! Algorithms define their own message types. When several partition
//! sets of one circuit send a message in the same round, only the
//! greatest one is delivered, so every type defines a strict order
//! through [`Message::greater_than`].

use crate::error::CircuitError;
use amoebot_core::{assign_named_fields, FieldError, HasNamedFields};
use indexmap::IndexMap;
use std::any::Any;
use std::fmt;

/// A payload that can be sent over a circuit.
///
/// Implementations are plain data. Persistence goes through
/// [`HasNamedFields`]; reconstruction uses [`MessageRegistry`], which
/// needs a `Default` value to assign fields into.
pub trait Message: HasNamedFields + fmt::Debug + Send + 'static {
    /// Stable type name used for persistence.
    fn type_name(&self) -> &'static str;

    /// An independent copy of this message.
    fn copy(&self) -> Box<dyn Message>;

    /// Value equality with another message of any type.
    fn equals(&self, other: &dyn Message) -> bool;

    /// Whether this message takes precedence over `other`.
    ///
    /// Must be a strict order among messages of one circuit. If neither
    /// message is greater and they are not equal, the first sender in
    /// particle order wins and the circuit reports the ambiguity.
    fn greater_than(&self, other: &dyn Message) -> bool;

    /// Downcasting support for `equals` and `greater_than`.
    fn as_any(&self) -> &dyn Any;
}

/// Owned message with value semantics.
pub struct MessageBox(Box<dyn Message>);

impl MessageBox {
    /// Box a concrete message.
    pub fn new(message: impl Message) -> Self {
        Self(Box::new(message))
    }

    /// Wrap an already boxed message.
    pub fn from_boxed(message: Box<dyn Message>) -> Self {
        Self(message)
    }

    /// The wrapped message.
    pub fn get(&self) -> &dyn Message {
        self.0.as_ref()
    }

    /// The wrapped message as `T`, if it is one.
    pub fn downcast_ref<T: Message>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref()
    }

    /// Unwrap into the boxed message.
    pub fn into_inner(self) -> Box<dyn Message> {
        self.0
    }
}

impl Clone for MessageBox {
    fn clone(&self) -> Self {
        Self(self.0.copy())
    }
}

impl PartialEq for MessageBox {
    fn eq(&self, other: &Self) -> bool {
        self.0.equals(other.0.as_ref())
    }
}

impl fmt::Debug for MessageBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.0.as_ref(), f)
    }
}

fn construct<M: Message + Default>() -> Box<dyn Message> {
    Box::new(M::default())
}

/// Constructors for message types by persisted type name.
#[derive(Default)]
pub struct MessageRegistry {
    constructors: IndexMap<&'static str, fn() -> Box<dyn Message>>,
}

impl MessageRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `M` under its [`Message::type_name`]. Registering a name
    /// twice keeps the latest constructor.
    pub fn register<M: Message + Default>(&mut self) -> &mut Self {
        let name = M::default().type_name();
        self.constructors.insert(name, construct::<M>);
        self
    }

    /// Whether `type_name` is registered.
    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    /// Registered names in registration order.
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.constructors.keys().copied()
    }

    /// A default-valued message of the given type.
    pub fn create(&self, type_name: &str) -> Result<Box<dyn Message>, CircuitError> {
        self.constructors
            .get(type_name)
            .map(|ctor| ctor())
            .ok_or_else(|| CircuitError::UnknownMessageType {
                type_name: type_name.to_string(),
            })
    }

    /// Rebuild a message from persisted fields.
    ///
    /// Fields that fail to parse or are unknown keep their default values
    /// and are returned alongside the message.
    pub fn restore<'a, I>(
        &self,
        type_name: &str,
        fields: I,
    ) -> Result<(MessageBox, Vec<FieldError>), CircuitError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut message = self.create(type_name)?;
        let issues = assign_named_fields(message.as_mut(), fields);
        Ok((MessageBox::from_boxed(message), issues))
    }
}

impl fmt::Debug for MessageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.constructors.keys()).finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use amoebot_core::{parse_field, FieldTag, NamedField};

    /// Integer payload ordered by value.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub(crate) struct Counter {
        pub value: i32,
    }

    impl HasNamedFields for Counter {
        fn named_fields(&self) -> Vec<NamedField> {
            vec![NamedField::new("value", FieldTag::Int, self.value)]
        }

        fn set_named_field(&mut self, name: &str, value: &str) -> Result<(), FieldError> {
            match name {
                "value" => self.value = parse_field(name, value, "int")?,
                _ => {
                    return Err(FieldError::UnknownField {
                        name: name.to_string(),
                    })
                }
            }
            Ok(())
        }
    }

    impl Message for Counter {
        fn type_name(&self) -> &'static str {
            "Counter"
        }

        fn copy(&self) -> Box<dyn Message> {
            Box::new(self.clone())
        }

        fn equals(&self, other: &dyn Message) -> bool {
            other.as_any().downcast_ref::<Self>() == Some(self)
        }

        fn greater_than(&self, other: &dyn Message) -> bool {
            other
                .as_any()
                .downcast_ref::<Self>()
                .is_some_and(|o| self.value > o.value)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    /// Payload with no order at all.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub(crate) struct Unordered {
        pub tag: i32,
    }

    impl HasNamedFields for Unordered {
        fn named_fields(&self) -> Vec<NamedField> {
            vec![NamedField::new("tag", FieldTag::Int, self.tag)]
        }

        fn set_named_field(&mut self, name: &str, value: &str) -> Result<(), FieldError> {
            self.tag = parse_field(name, value, "int")?;
            Ok(())
        }
    }

    impl Message for Unordered {
        fn type_name(&self) -> &'static str {
            "Unordered"
        }

        fn copy(&self) -> Box<dyn Message> {
            Box::new(self.clone())
        }

        fn equals(&self, other: &dyn Message) -> bool {
            other.as_any().downcast_ref::<Self>() == Some(self)
        }

        fn greater_than(&self, _other: &dyn Message) -> bool {
            false
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn box_has_value_semantics() {
        let a = MessageBox::new(Counter { value: 3 });
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, MessageBox::new(Counter { value: 4 }));
        assert_ne!(a, MessageBox::new(Unordered { tag: 3 }));
        assert_eq!(b.downcast_ref::<Counter>().unwrap().value, 3);
        assert!(b.downcast_ref::<Unordered>().is_none());
    }

    #[test]
    fn registry_restores_fields() {
        let mut registry = MessageRegistry::new();
        registry.register::<Counter>().register::<Unordered>();
        assert!(registry.contains("Counter"));
        assert_eq!(registry.type_names().collect::<Vec<_>>(), vec!["Counter", "Unordered"]);

        let (msg, issues) = registry.restore("Counter", [("value", "42")]).unwrap();
        assert!(issues.is_empty());
        assert_eq!(msg, MessageBox::new(Counter { value: 42 }));
    }

    #[test]
    fn registry_reports_bad_fields() {
        let mut registry = MessageRegistry::new();
        registry.register::<Counter>();
        let (msg, issues) = registry
            .restore("Counter", [("value", "x"), ("extra", "1")])
            .unwrap();
        assert_eq!(issues.len(), 2);
        assert_eq!(msg, MessageBox::new(Counter::default()));
        assert!(matches!(
            registry.create("Missing"),
            Err(CircuitError::UnknownMessageType { .. })
        ));
    }
}
