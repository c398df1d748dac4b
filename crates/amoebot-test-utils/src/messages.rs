//! Message types for circuit tests.
//!
//! - [`PriorityMessage`]: totally ordered by its priority.
//! - [`TextMessage`]: has no order, so two different texts on one
//!   circuit are ambiguous.

use std::any::Any;

use amoebot_circuit::Message;
use amoebot_core::{parse_field, FieldError, FieldTag, HasNamedFields, NamedField};

/// A message where the higher priority wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PriorityMessage {
    pub priority: i32,
}

impl PriorityMessage {
    pub fn new(priority: i32) -> Self {
        Self { priority }
    }
}

impl HasNamedFields for PriorityMessage {
    fn named_fields(&self) -> Vec<NamedField> {
        vec![NamedField::new("priority", FieldTag::Int, self.priority)]
    }

    fn set_named_field(&mut self, name: &str, value: &str) -> Result<(), FieldError> {
        match name {
            "priority" => self.priority = parse_field(name, value, "int")?,
            _ => {
                return Err(FieldError::UnknownField {
                    name: name.to_string(),
                })
            }
        }
        Ok(())
    }
}

impl Message for PriorityMessage {
    fn type_name(&self) -> &'static str {
        "PriorityMessage"
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
            .is_some_and(|o| self.priority > o.priority)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A free-text message without any order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextMessage {
    pub text: String,
}

impl TextMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl HasNamedFields for TextMessage {
    fn named_fields(&self) -> Vec<NamedField> {
        vec![NamedField::new("text", FieldTag::Text, &self.text)]
    }

    fn set_named_field(&mut self, name: &str, value: &str) -> Result<(), FieldError> {
        match name {
            "text" => self.text = value.to_string(),
            _ => {
                return Err(FieldError::UnknownField {
                    name: name.to_string(),
                })
            }
        }
        Ok(())
    }
}

impl Message for TextMessage {
    fn type_name(&self) -> &'static str {
        "TextMessage"
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
